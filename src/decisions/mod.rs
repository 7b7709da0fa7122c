//! Pause/resume decision protocol types.
//!
//! ## Key Types
//!
//! - `DecisionId`: correlates a response with the decision it answers
//! - `PendingDecision` / `DecisionKind`: what the engine is waiting for
//! - `DecisionResponse` / `DecisionAnswer`: what the caller sends back
//! - `validate_response`: shape, bounds and membership checks

pub mod decision;
pub mod validate;

pub use decision::{DecisionAnswer, DecisionId, DecisionKind, DecisionResponse, PendingDecision};
pub use validate::validate_response;
