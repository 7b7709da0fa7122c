//! Suspended effect resolution.
//!
//! When an effect needs a player's answer it stores a [`ContinuationFrame`]
//! on the game state and returns. The frame holds everything needed to
//! finish the work, so a paused state can be serialized, cloned and resumed
//! later with [`RulesEngine::resume`](crate::rules::RulesEngine::resume).
//!
//! ## Key Types
//!
//! - `ContinuationFrame`: a continuation plus the decision it waits on
//! - `Continuation`: one variant per kind of suspended work
//! - `SequentialChoice`: a choice each player makes in APNAP order

mod frame;
pub(crate) mod resume;
pub mod sequence;

pub use frame::{Continuation, ContinuationFrame};
pub use sequence::{Pick, SequentialChoice};
