//! Outbound event log.

pub mod event;

pub use event::GameEvent;
