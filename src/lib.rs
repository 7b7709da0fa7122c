//! # ccg-rules
//!
//! The effect resolution core of a trading-card game rules interpreter.
//!
//! ## Design Principles
//!
//! 1. **State is a value**: `GameState` is an immutable snapshot built on
//!    `im-rs` persistent collections. Every engine call takes a state and
//!    returns a new one; on error the input comes back untouched.
//!
//! 2. **Pausing is data**: when a player must choose, the work left to do is
//!    stored on the state as a continuation frame. A paused state can be
//!    serialized and resumed later with the player's answer.
//!
//! 3. **Read through the projection**: rules queries go through the
//!    projected state, where continuous effects have been applied in layer
//!    order, never through the raw components.
//!
//! ## Modules
//!
//! - `core`: entity ids, players, `GameState`, RNG, configuration, errors
//! - `components`: typed per-entity data (card characteristics, tapped, counters, ...)
//! - `zones`: per-player zones with ordered contents
//! - `cards`: card definitions, static abilities and the card registry
//! - `filters`: object filters and their evaluator
//! - `amounts`: dynamic amounts, player selectors and conditions
//! - `layers`: floating effects, the state projector and expiry hooks
//! - `targeting`: target requirements and legal target resolution
//! - `effects`: the effect vocabulary, executors and their registry
//! - `decisions`: pending decisions, answers and their validation
//! - `continuation`: suspended work waiting on a decision
//! - `events`: the audit log emitted by every state change
//! - `rules`: `RulesEngine`, the `execute` / `resume` entry points

pub mod amounts;
pub mod cards;
pub mod components;
pub mod continuation;
pub mod core;
pub mod decisions;
pub mod effects;
pub mod events;
pub mod filters;
pub mod layers;
pub mod rules;
pub mod targeting;
pub mod zones;

// Re-export commonly used types
pub use crate::core::{
    EngineConfig, EngineError, EntityId, GameConfig, GameRng, GameState, PlayerId, Result,
};

pub use crate::zones::{ZoneKey, ZoneKind, ZoneManager, ZonePosition};

pub use crate::cards::{CardDefinition, CardId, CardRegistry, StaticAbility};

pub use crate::filters::{ObjectFilter, PredicateEvaluator};

pub use crate::amounts::{AmountEvaluator, Condition, DynamicAmount, EntityReference, PlayerSelector};

pub use crate::layers::{project, Characteristics, Duration, Modification, ProjectedState};

pub use crate::targeting::{TargetRequirement, TargetResolver, TargetSpec};

pub use crate::effects::{
    Effect, EffectContext, EffectExecutor, EffectKind, ExecutionResult, ExecutorRegistry,
};

pub use crate::decisions::{DecisionAnswer, DecisionId, DecisionKind, DecisionResponse, PendingDecision};

pub use crate::continuation::{Continuation, ContinuationFrame, SequentialChoice};

pub use crate::events::GameEvent;

pub use crate::rules::RulesEngine;
