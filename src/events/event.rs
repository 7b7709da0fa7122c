//! Game events.
//!
//! Every state change the engine makes is reported as a `GameEvent`, in
//! the order it happened. The log is an outbound audit trail: trigger
//! detection, replays and UIs consume it, the engine never reads it back.

use serde::{Deserialize, Serialize};

use crate::components::{Color, CounterKind};
use crate::core::{EntityId, PlayerId};
use crate::decisions::DecisionId;
use crate::layers::{FloatingEffectId, Modification};
use crate::zones::ZoneKey;

/// A game event with contextual data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    // === Zones ===
    ZoneChanged {
        entity: EntityId,
        from: ZoneKey,
        to: ZoneKey,
    },
    CardDrawn {
        player: PlayerId,
        entity: EntityId,
    },
    CardDiscarded {
        player: PlayerId,
        entity: EntityId,
    },
    /// A token left the battlefield and ceased to exist.
    TokenCeasedToExist { entity: EntityId },
    TokenCreated {
        entity: EntityId,
        controller: PlayerId,
    },
    LibraryShuffled { player: PlayerId },
    LibraryReordered { player: PlayerId },
    CardsRevealed {
        player: PlayerId,
        cards: Vec<EntityId>,
    },

    // === Permanents ===
    Destroyed { entity: EntityId },
    Sacrificed {
        player: PlayerId,
        entity: EntityId,
    },
    Regenerated { entity: EntityId },
    Tapped { entity: EntityId },
    Untapped { entity: EntityId },
    CountersAdded {
        entity: EntityId,
        kind: CounterKind,
        amount: u32,
    },
    CountersRemoved {
        entity: EntityId,
        kind: CounterKind,
        amount: u32,
    },

    // === Damage & life ===
    DamageDealt {
        source: Option<EntityId>,
        target: EntityId,
        amount: i32,
    },
    LifeChanged {
        player: PlayerId,
        old: i32,
        new: i32,
    },

    // === Continuous effects ===
    FloatingEffectCreated {
        id: FloatingEffectId,
        modification: Modification,
        affected: Vec<EntityId>,
    },
    FloatingEffectExpired { id: FloatingEffectId },

    // === Decisions ===
    DecisionRequested {
        id: DecisionId,
        player: PlayerId,
    },
    DecisionResolved {
        id: DecisionId,
        player: PlayerId,
    },
    ColorChosen {
        player: PlayerId,
        color: Color,
    },
    ModesChosen {
        player: PlayerId,
        modes: Vec<usize>,
    },
    OptionChosen {
        player: PlayerId,
        option: String,
    },
}

impl GameEvent {
    /// The entity the event is about, if any.
    #[must_use]
    pub fn entity(&self) -> Option<EntityId> {
        match self {
            GameEvent::ZoneChanged { entity, .. }
            | GameEvent::CardDrawn { entity, .. }
            | GameEvent::CardDiscarded { entity, .. }
            | GameEvent::TokenCeasedToExist { entity }
            | GameEvent::TokenCreated { entity, .. }
            | GameEvent::Destroyed { entity }
            | GameEvent::Sacrificed { entity, .. }
            | GameEvent::Regenerated { entity }
            | GameEvent::Tapped { entity }
            | GameEvent::Untapped { entity }
            | GameEvent::CountersAdded { entity, .. }
            | GameEvent::CountersRemoved { entity, .. } => Some(*entity),
            GameEvent::DamageDealt { target, .. } => Some(*target),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_accessor() {
        let event = GameEvent::DamageDealt {
            source: None,
            target: EntityId(7),
            amount: 3,
        };
        assert_eq!(event.entity(), Some(EntityId(7)));
        assert_eq!(GameEvent::LibraryShuffled { player: PlayerId::new(0) }.entity(), None);
    }
}
