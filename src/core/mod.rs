//! Core engine types: entities, players, state, RNG, configuration, errors.
//!
//! These are the building blocks every other module works over. The
//! `GameState` snapshot is immutable from the caller's point of view: every
//! engine operation returns a new state and leaves its input untouched.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod error;
pub mod state;

pub use entity::EntityId;
pub use player::PlayerId;
pub use rng::{GameRng, GameRngState};
pub use config::{EngineConfig, GameConfig};
pub use error::{EngineError, Result};
pub use state::{GameState, Step, TurnState};
