//! Floating (temporary) continuous effects.
//!
//! A floating effect is created by a resolving effect ("target creature gets
//! +3/+3 until end of turn") and modifies a fixed set of objects, captured
//! when it was created. Each carries the layer it applies in, a timestamp
//! that orders it within that layer, and a duration that decides when the
//! cleanup hooks remove it.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::components::{AttachedToComponent, CardType, ColorSet, Keyword, Subtype};
use crate::core::{EntityId, GameState, PlayerId};

/// Identifier of an active floating effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FloatingEffectId(pub u32);

impl std::fmt::Display for FloatingEffectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FloatingEffect({})", self.0)
    }
}

/// Layers, applied in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Layer {
    Control,
    Type,
    Color,
    Ability,
    PowerToughness,
    /// Rules markers such as exile-on-death and regeneration shields.
    RulesMarkers,
}

/// Sublayers of the power/toughness layer, applied in declaration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PtSublayer {
    /// Setting base P/T (characteristic-defining abilities first).
    SetBase,
    /// +N/+N style modifications.
    Modify,
    /// +1/+1 and -1/-1 counters.
    Counters,
}

/// What a continuous effect changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Modification {
    ChangeController(PlayerId),
    AddCardTypes(BTreeSet<CardType>),
    RemoveCardTypes(BTreeSet<CardType>),
    AddSubtypes(BTreeSet<Subtype>),
    SetColors(ColorSet),
    AddColors(ColorSet),
    GrantKeyword(Keyword),
    RemoveKeyword(Keyword),
    SetBasePowerToughness { power: i32, toughness: i32 },
    ModifyPowerToughness { power: i32, toughness: i32 },
    ExileOnDeath,
    RegenerationShield,
}

impl Modification {
    /// The layer and sublayer this modification applies in.
    #[must_use]
    pub fn placement(&self) -> (Layer, Option<PtSublayer>) {
        match self {
            Modification::ChangeController(_) => (Layer::Control, None),
            Modification::AddCardTypes(_)
            | Modification::RemoveCardTypes(_)
            | Modification::AddSubtypes(_) => (Layer::Type, None),
            Modification::SetColors(_) | Modification::AddColors(_) => (Layer::Color, None),
            Modification::GrantKeyword(_) | Modification::RemoveKeyword(_) => (Layer::Ability, None),
            Modification::SetBasePowerToughness { .. } => {
                (Layer::PowerToughness, Some(PtSublayer::SetBase))
            }
            Modification::ModifyPowerToughness { .. } => {
                (Layer::PowerToughness, Some(PtSublayer::Modify))
            }
            Modification::ExileOnDeath | Modification::RegenerationShield => {
                (Layer::RulesMarkers, None)
            }
        }
    }
}

/// A modification tagged with its layer placement.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingModification {
    pub layer: Layer,
    pub sublayer: Option<PtSublayer>,
    pub modification: Modification,
}

impl FloatingModification {
    /// Wrap a modification, deriving its placement.
    #[must_use]
    pub fn new(modification: Modification) -> Self {
        let (layer, sublayer) = modification.placement();
        Self {
            layer,
            sublayer,
            modification,
        }
    }
}

/// How long a floating effect lasts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Duration {
    Permanent,
    EndOfTurn,
    EndOfCombat,
    /// Until the creating player's next turn begins.
    UntilYourNextTurn,
    WhileSourceOnBattlefield,
    /// While the source is attached to the affected object.
    WhileAttached,
    /// Through the end of this many turns, counting the current one.
    ForTurns(u32),
}

/// A registered floating effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFloatingEffect {
    pub id: FloatingEffectId,
    pub modification: FloatingModification,
    /// Objects affected, captured at creation.
    pub affected: BTreeSet<EntityId>,
    pub duration: Duration,
    pub source: Option<EntityId>,
    pub controller: PlayerId,
    pub timestamp: u64,
    pub created_turn: u32,
}

impl ActiveFloatingEffect {
    #[must_use]
    pub fn layer(&self) -> Layer {
        self.modification.layer
    }

    /// Whether the effect currently applies.
    ///
    /// Source-dependent durations stop applying the moment their condition
    /// fails, even before a sweep removes them.
    #[must_use]
    pub fn is_active(&self, state: &GameState) -> bool {
        if !self.affected.iter().any(|e| state.is_on_battlefield(*e)) {
            return false;
        }
        match self.duration {
            Duration::WhileSourceOnBattlefield => {
                self.source.is_some_and(|s| state.is_on_battlefield(s))
            }
            Duration::WhileAttached => self.source.is_some_and(|s| {
                state.is_on_battlefield(s)
                    && state
                        .get::<AttachedToComponent>(s)
                        .is_some_and(|a| self.affected.contains(&a.host))
            }),
            Duration::ForTurns(0) => false,
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_order() {
        assert!(Layer::Control < Layer::Type);
        assert!(Layer::Type < Layer::Color);
        assert!(Layer::Color < Layer::Ability);
        assert!(Layer::Ability < Layer::PowerToughness);
        assert!(Layer::PowerToughness < Layer::RulesMarkers);
        assert!(PtSublayer::SetBase < PtSublayer::Modify);
        assert!(PtSublayer::Modify < PtSublayer::Counters);
    }

    #[test]
    fn test_placement() {
        let m = FloatingModification::new(Modification::ModifyPowerToughness {
            power: 3,
            toughness: 3,
        });
        assert_eq!(m.layer, Layer::PowerToughness);
        assert_eq!(m.sublayer, Some(PtSublayer::Modify));

        let m = FloatingModification::new(Modification::GrantKeyword(Keyword::Flying));
        assert_eq!(m.layer, Layer::Ability);
        assert_eq!(m.sublayer, None);

        let m = FloatingModification::new(Modification::ChangeController(PlayerId::new(1)));
        assert_eq!(m.layer, Layer::Control);
    }
}
