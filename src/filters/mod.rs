//! Predicate and filter evaluation.
//!
//! ## Key Types
//!
//! - `ObjectFilter`: card, state and controller axes combined with AND
//! - `PredicateEvaluator`: side-effect free matching against a state
//! - `FilterContext`: the acting player, source and chosen targets

pub mod evaluator;
pub mod predicate;

pub use evaluator::{FilterContext, PredicateEvaluator};
pub use predicate::{CardPredicate, Comparison, ControllerPredicate, ObjectFilter, StatePredicate};
