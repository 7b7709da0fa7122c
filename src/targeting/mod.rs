//! Target requirements and legal target resolution.
//!
//! ## Key Types
//!
//! - `TargetRequirement`: creature, player, permanent, card in zone, spell,
//!   any target, other-than
//! - `TargetSpec`: requirement with count bounds
//! - `TargetResolver`: legal targets against the projected state

pub mod requirement;
pub mod resolver;

pub use requirement::{PlayerFilter, TargetCount, TargetRequirement, TargetSpec};
pub use resolver::TargetResolver;
