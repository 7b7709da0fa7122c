//! Engine error types.
//!
//! Every failure the core can report is an `EngineError`. Errors never
//! escape as panics: executors fold them into `ExecutionResult::Error`
//! together with the last committed state.

use thiserror::Error;

use super::entity::EntityId;
use crate::decisions::DecisionId;
use crate::effects::EffectKind;

/// Errors produced by the rules engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    // === Validation ===
    #[error("entity not found: {0}")]
    EntityNotFound(EntityId),

    #[error("{entity} is not in the expected zone ({expected})")]
    NotInZone { entity: EntityId, expected: String },

    #[error("invalid target: {0}")]
    InvalidTarget(String),

    #[error("context is missing a binding: {0}")]
    MissingBinding(String),

    #[error("response does not match decision: expected {expected}, got {actual}")]
    InvalidResponse { expected: String, actual: String },

    #[error("response out of bounds: {0}")]
    ResponseOutOfBounds(String),

    // === Protocol ===
    #[error("no decision is pending")]
    NoPendingDecision,

    #[error("a decision is pending ({0}); resume it before executing")]
    DecisionPending(DecisionId),

    #[error("no continuation frame available to consume {0}")]
    NoContinuation(DecisionId),

    #[error("decision id mismatch: expected {expected}, got {actual}")]
    DecisionMismatch {
        expected: DecisionId,
        actual: DecisionId,
    },

    #[error("continuation chain exceeded {0} steps")]
    ChainLimitExceeded(usize),

    #[error("state invariant violated: {0}")]
    InvariantViolated(String),

    // === Construction ===
    #[error("no executor registered for effect kind {0:?}")]
    MissingExecutor(EffectKind),

    #[error("executor for {expected:?} received {actual:?}")]
    WrongEffectKind {
        expected: &'static str,
        actual: EffectKind,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    // === Persistence ===
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl EngineError {
    /// Whether this error means the caller is out of sync with the engine.
    #[must_use]
    pub fn is_protocol_violation(&self) -> bool {
        matches!(
            self,
            Self::NoPendingDecision
                | Self::DecisionPending(_)
                | Self::NoContinuation(_)
                | Self::DecisionMismatch { .. }
        )
    }
}

impl From<bincode::Error> for EngineError {
    fn from(err: bincode::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;
