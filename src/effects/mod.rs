//! Effects and their execution.
//!
//! An `Effect` is plain data describing what a card does. Executors turn
//! effects into state changes; the `ExecutorRegistry` maps each
//! `EffectKind` to the executor that handles it.
//!
//! ## Key Types
//!
//! - `Effect`: the effect vocabulary, nested freely (composite, conditional, modal)
//! - `EffectContext`: source, controller, targets and X of a resolving effect
//! - `EffectExecutor`: the per-family execution trait
//! - `ExecutionResult`: success, paused on a decision, or error
//!
//! ## Resolution model
//!
//! Execution never mutates its input. Executors work on a `Resolution`, a
//! private copy of the state plus the events emitted so far. Effects that
//! need a player's answer store a continuation on that copy and return
//! `Outcome::Paused`; see [`crate::continuation`].

mod context;
mod effect;
mod executor;
pub mod executors;
mod ops;
mod registry;
mod result;

pub use context::EffectContext;
pub use effect::{AlternativeCost, Effect, EffectKind, Mode, TokenSpec};
pub use executor::EffectExecutor;
pub use executors::{
    ChoiceExecutor, ContinuousExecutor, DamageExecutor, LibraryExecutor, PermanentExecutor,
    RemovalExecutor,
};
pub use registry::ExecutorRegistry;
pub use result::{ExecutionResult, Outcome, Resolution};
