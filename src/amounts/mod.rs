//! Dynamic amounts, player selectors and conditions.
//!
//! ## Key Types
//!
//! - `DynamicAmount`: numeric expression tree
//! - `PlayerSelector` / `EntityReference`: resolved against the effect context
//! - `Condition`: boolean algebra over amounts and board state
//! - `AmountEvaluator`: recursive, never-failing evaluation

pub mod amount;
pub mod condition;
pub mod evaluator;

pub use amount::{DynamicAmount, EntityReference, PlayerSelector};
pub use condition::{CompareOp, Condition};
pub use evaluator::AmountEvaluator;
