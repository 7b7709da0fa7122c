//! Dynamic amount expressions.
//!
//! Card text is full of numbers that depend on the game: "damage equal to
//! its power", "X life", "one card for each Elf you control". A
//! `DynamicAmount` is an immutable expression tree over those quantities,
//! evaluated recursively by [`crate::amounts::AmountEvaluator`].

use serde::{Deserialize, Serialize};

use super::condition::Condition;
use crate::components::CounterKind;
use crate::core::{EntityId, PlayerId};
use crate::filters::ObjectFilter;
use crate::zones::ZoneKind;

/// A reference to one entity, resolved against the effect context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityReference {
    Source,
    Target(usize),
    Sacrificed(usize),
    Triggering,
    Fixed(EntityId),
}

/// Selects zero or more players.
///
/// Selectors that cannot be resolved (no such target, no opponent) select
/// nobody rather than failing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerSelector {
    You,
    /// The context's singular opponent, or the next player in turn order.
    Opponent,
    EachOpponent,
    EachPlayer,
    ActivePlayer,
    TargetPlayer(usize),
    TriggeringPlayer,
    /// Projected controller on the battlefield. Off the battlefield this is
    /// the owner, not the last controller the object had there.
    ControllerOf(EntityReference),
    OwnerOf(EntityReference),
    Specific(PlayerId),
}

/// A numeric expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DynamicAmount {
    Fixed(i32),
    X,
    /// Sum of the selected players' life totals.
    LifeTotal(PlayerSelector),

    // === Arithmetic ===
    Add(Box<DynamicAmount>, Box<DynamicAmount>),
    Subtract(Box<DynamicAmount>, Box<DynamicAmount>),
    Multiply(Box<DynamicAmount>, i32),
    Max(Box<DynamicAmount>, Box<DynamicAmount>),
    Min(Box<DynamicAmount>, Box<DynamicAmount>),
    /// Clamp at zero.
    NonNegative(Box<DynamicAmount>),
    Conditional {
        condition: Box<Condition>,
        then: Box<DynamicAmount>,
        otherwise: Box<DynamicAmount>,
    },

    // === Object characteristics ===
    PowerOf(EntityReference),
    ToughnessOf(EntityReference),
    ManaValueOf(EntityReference),
    CountersOn {
        entity: EntityReference,
        kind: CounterKind,
    },

    // === Counting ===
    /// Objects matching `filter` in `zone`, controlled (battlefield) or owned
    /// (other zones) by the selected players.
    Count {
        player: PlayerSelector,
        zone: ZoneKind,
        filter: ObjectFilter,
    },
    CardsInHand(PlayerSelector),

    /// Needs per-turn damage history, which the state does not record.
    DamageDealtThisTurn(EntityReference),
}

impl DynamicAmount {
    #[must_use]
    pub fn fixed(n: i32) -> Self {
        Self::Fixed(n)
    }

    #[must_use]
    pub fn plus(self, other: DynamicAmount) -> Self {
        Self::Add(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn minus(self, other: DynamicAmount) -> Self {
        Self::Subtract(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn times(self, factor: i32) -> Self {
        Self::Multiply(Box::new(self), factor)
    }

    #[must_use]
    pub fn non_negative(self) -> Self {
        Self::NonNegative(Box::new(self))
    }

    /// "the number of `filter` you control".
    #[must_use]
    pub fn count_you_control(filter: ObjectFilter) -> Self {
        Self::Count {
            player: PlayerSelector::You,
            zone: ZoneKind::Battlefield,
            filter,
        }
    }

    /// Whether the evaluator computes this expression (and all its parts).
    ///
    /// Unimplemented parts evaluate to 0 and log a warning.
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        match self {
            Self::DamageDealtThisTurn(_) => false,
            Self::Add(a, b) | Self::Subtract(a, b) | Self::Max(a, b) | Self::Min(a, b) => {
                a.is_implemented() && b.is_implemented()
            }
            Self::Multiply(a, _) | Self::NonNegative(a) => a.is_implemented(),
            Self::Conditional {
                condition,
                then,
                otherwise,
            } => condition.is_implemented() && then.is_implemented() && otherwise.is_implemented(),
            Self::Count { filter, .. } => filter.is_fully_implemented(),
            _ => true,
        }
    }
}

impl From<i32> for DynamicAmount {
    fn from(n: i32) -> Self {
        Self::Fixed(n)
    }
}
