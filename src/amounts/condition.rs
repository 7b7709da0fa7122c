//! Boolean conditions over the game state.
//!
//! Conditions gate conditional effects ("if you control an Elf, ...") and
//! conditional amounts. They share the amount evaluator's context, so they
//! can compare any two dynamic amounts.

use serde::{Deserialize, Serialize};

use super::amount::{DynamicAmount, PlayerSelector};
use crate::filters::ObjectFilter;

/// Comparison operator for [`Condition::Compare`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    #[must_use]
    pub fn apply(self, left: i32, right: i32) -> bool {
        match self {
            CompareOp::Eq => left == right,
            CompareOp::Ne => left != right,
            CompareOp::Lt => left < right,
            CompareOp::Le => left <= right,
            CompareOp::Gt => left > right,
            CompareOp::Ge => left >= right,
        }
    }
}

/// A condition checked at resolution time.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Condition {
    // === Combinators ===
    /// All conditions must be true (vacuously true when empty).
    All(Vec<Condition>),
    /// At least one condition must be true.
    Any(Vec<Condition>),
    Not(Box<Condition>),

    // === Checks ===
    Compare {
        left: DynamicAmount,
        op: CompareOp,
        right: DynamicAmount,
    },
    /// Every selected player has at least `amount` life. False when the
    /// selector resolves to nobody.
    LifeAtLeast { player: PlayerSelector, amount: i32 },
    /// The selected players together control at least `count` permanents
    /// matching `filter`.
    ControlsMatching {
        player: PlayerSelector,
        filter: ObjectFilter,
        count: u32,
    },
    SourceOnBattlefield,
    /// Target `index` is still a player or a permanent on the battlefield.
    TargetOnBattlefield(usize),
    XAtLeast(i32),
}

impl Condition {
    #[must_use]
    pub fn always() -> Self {
        Self::All(Vec::new())
    }

    #[must_use]
    pub fn all(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    #[must_use]
    pub fn any(conditions: impl IntoIterator<Item = Condition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: Condition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }

    /// Add another condition with OR.
    #[must_use]
    pub fn or(self, other: Condition) -> Self {
        match self {
            Self::Any(mut conditions) => {
                conditions.push(other);
                Self::Any(conditions)
            }
            _ => Self::Any(vec![self, other]),
        }
    }

    /// "if you control a `filter`".
    #[must_use]
    pub fn you_control(filter: ObjectFilter) -> Self {
        Self::ControlsMatching {
            player: PlayerSelector::You,
            filter,
            count: 1,
        }
    }

    #[must_use]
    pub fn is_implemented(&self) -> bool {
        match self {
            Self::All(cs) | Self::Any(cs) => cs.iter().all(Condition::is_implemented),
            Self::Not(c) => c.is_implemented(),
            Self::Compare { left, right, .. } => left.is_implemented() && right.is_implemented(),
            Self::ControlsMatching { filter, .. } => filter.is_fully_implemented(),
            _ => true,
        }
    }
}
