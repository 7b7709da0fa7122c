//! Execution results.
//!
//! `ExecutionResult` is what callers see. Inside the engine, executors work
//! on a `Resolution`: a private clone of the input state plus the events
//! emitted so far. Only a successful (or paused) resolution is ever handed
//! back; on error the caller gets its own input state.

use tracing::debug;

use crate::continuation::{Continuation, ContinuationFrame};
use crate::core::{EngineError, EntityId, GameState, PlayerId};
use crate::decisions::{DecisionKind, PendingDecision};
use crate::events::GameEvent;

/// Result of `execute` or `resume`.
#[derive(Clone, Debug, PartialEq)]
pub enum ExecutionResult {
    /// The effect ran to completion.
    Success {
        state: GameState,
        events: Vec<GameEvent>,
    },
    /// The effect needs player input. `state` holds the continuation.
    Paused {
        state: GameState,
        decision: PendingDecision,
        events: Vec<GameEvent>,
    },
    /// Nothing was applied; `state` is the last committed state.
    Error { state: GameState, error: EngineError },
}

impl ExecutionResult {
    /// The resulting state, whatever the outcome.
    #[must_use]
    pub fn state(&self) -> &GameState {
        match self {
            Self::Success { state, .. } | Self::Paused { state, .. } | Self::Error { state, .. } => {
                state
            }
        }
    }

    #[must_use]
    pub fn into_state(self) -> GameState {
        match self {
            Self::Success { state, .. } | Self::Paused { state, .. } | Self::Error { state, .. } => {
                state
            }
        }
    }

    /// Events emitted, empty on error.
    #[must_use]
    pub fn events(&self) -> &[GameEvent] {
        match self {
            Self::Success { events, .. } | Self::Paused { events, .. } => events,
            Self::Error { .. } => &[],
        }
    }

    #[must_use]
    pub fn decision(&self) -> Option<&PendingDecision> {
        match self {
            Self::Paused { decision, .. } => Some(decision),
            _ => None,
        }
    }

    #[must_use]
    pub fn error(&self) -> Option<&EngineError> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self, Self::Paused { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

/// How a piece of work inside a resolution ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Paused(PendingDecision),
}

impl Outcome {
    #[must_use]
    pub fn is_paused(&self) -> bool {
        matches!(self, Outcome::Paused(_))
    }
}

/// Working copy of the state during one `execute` or `resume` call.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub state: GameState,
    pub events: Vec<GameEvent>,
}

impl Resolution {
    /// Start from a clone of `state`.
    #[must_use]
    pub fn new(state: &GameState) -> Self {
        Self {
            state: state.clone(),
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Suspend: push a frame keyed by a fresh decision id and record the
    /// pending decision.
    pub fn pause(
        &mut self,
        player: PlayerId,
        prompt: impl Into<String>,
        kind: DecisionKind,
        source: Option<EntityId>,
        continuation: Continuation,
    ) -> Outcome {
        let id = self.state.allocate_decision_id();
        let decision = PendingDecision::new(id, player, prompt, kind).with_source(source);
        debug!(%id, %player, kind = decision.kind.name(), "pausing for decision");
        self.state.push_continuation(ContinuationFrame::awaiting(id, continuation));
        self.state.set_pending_decision(decision.clone());
        self.emit(GameEvent::DecisionRequested { id, player });
        Outcome::Paused(decision)
    }

    /// Convert into the public result.
    #[must_use]
    pub fn finish(self, outcome: Outcome) -> ExecutionResult {
        match outcome {
            Outcome::Done => ExecutionResult::Success {
                state: self.state,
                events: self.events,
            },
            Outcome::Paused(decision) => ExecutionResult::Paused {
                state: self.state,
                decision,
                events: self.events,
            },
        }
    }
}
