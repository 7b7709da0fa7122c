//! Game and engine configuration.
//!
//! The scheduler configures the core at startup by providing:
//! - `GameConfig`: table shape (players, starting life, RNG seed)
//! - `EngineConfig`: resolution knobs (chain limit, static abilities)
//!
//! Both are plain serde data and can be loaded from JSON.

use serde::{Deserialize, Serialize};

use super::error::{EngineError, Result};

/// Table configuration used to build the initial `GameState`.
///
/// ```
/// use ccg_rules::core::GameConfig;
///
/// let config = GameConfig::new(4).with_starting_life(40).with_seed(7);
/// assert!(config.validate().is_ok());
/// assert_eq!(config.starting_life, 40);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Number of players (1-255).
    pub player_count: usize,

    /// Life total each player starts with.
    #[serde(default = "default_starting_life")]
    pub starting_life: i32,

    /// Seed for the deterministic game RNG.
    #[serde(default)]
    pub seed: u64,
}

fn default_starting_life() -> i32 {
    20
}

impl GameConfig {
    /// Create a configuration with default life (20) and seed (0).
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        Self {
            player_count,
            starting_life: default_starting_life(),
            seed: 0,
        }
    }

    /// Set the starting life total.
    #[must_use]
    pub fn with_starting_life(mut self, life: i32) -> Self {
        self.starting_life = life;
        self
    }

    /// Set the RNG seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.player_count == 0 {
            return Err(EngineError::InvalidConfig(
                "must have at least 1 player".to_string(),
            ));
        }
        if self.player_count > 255 {
            return Err(EngineError::InvalidConfig(
                "at most 255 players supported".to_string(),
            ));
        }
        if self.starting_life <= 0 {
            return Err(EngineError::InvalidConfig(format!(
                "starting life must be positive, got {}",
                self.starting_life
            )));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Knobs for the resolution engine itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum number of pending-effect frames a single `resume` may chain
    /// through before giving up with an error.
    #[serde(default = "default_max_chain_steps")]
    pub max_chain_steps: usize,

    /// Whether static abilities of permanents take part in projection.
    #[serde(default = "default_true")]
    pub apply_static_abilities: bool,
}

fn default_max_chain_steps() -> usize {
    256
}

fn default_true() -> bool {
    true
}

impl EngineConfig {
    /// Set the chain limit.
    #[must_use]
    pub fn with_max_chain_steps(mut self, steps: usize) -> Self {
        self.max_chain_steps = steps;
        self
    }

    /// Enable or disable static abilities in projection.
    #[must_use]
    pub fn with_static_abilities(mut self, enabled: bool) -> Self {
        self.apply_static_abilities = enabled;
        self
    }

    /// Check the configuration is usable.
    pub fn validate(&self) -> Result<()> {
        if self.max_chain_steps == 0 {
            return Err(EngineError::InvalidConfig(
                "max_chain_steps must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse and validate a configuration from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_chain_steps: default_max_chain_steps(),
            apply_static_abilities: true,
        }
    }
}
