//! Card catalog lookup.
//!
//! The `CardRegistry` is the read-only catalog collaborator: the rules
//! core looks definitions up by `CardId` when instantiating cards and never
//! mutates them during play.

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};
use crate::core::error::{EngineError, Result};

/// Registry of card definitions.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardRegistry, CardDefinition, CardId};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::creature(CardId::new(1), "Grizzly Bears", 2, 2)).unwrap();
///
/// let found = registry.get(CardId::new(1)).unwrap();
/// assert_eq!(found.name, "Grizzly Bears");
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, CardDefinition>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition. Duplicate ids are rejected.
    pub fn register(&mut self, card: CardDefinition) -> Result<()> {
        if self.cards.contains_key(&card.id) {
            return Err(EngineError::InvalidConfig(format!(
                "card {} already registered",
                card.id
            )));
        }
        self.cards.insert(card.id, card);
        Ok(())
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Get a card definition or a lookup error.
    pub fn require(&self, id: CardId) -> Result<&CardDefinition> {
        self.get(id)
            .ok_or_else(|| EngineError::InvalidConfig(format!("unknown card {id}")))
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}
