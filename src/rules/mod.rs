//! The rules engine entry points.
//!
//! Callers (a turn scheduler, a stack implementation, a test harness) hand
//! the engine a state and an effect with its context, and get back the new
//! state, the events, and possibly a decision to put to a player.

pub mod engine;

pub use engine::RulesEngine;
