//! Declarative object filters.
//!
//! An `ObjectFilter` has three independent axes:
//! - card predicates (characteristics: type, color, keyword, ...)
//! - state predicates (permanent status: tapped, attacking, counters, ...)
//! - a controller relation (you, opponent, target player, ...)
//!
//! Every present axis must hold. An empty axis is vacuously true, so
//! `ObjectFilter::default()` matches every object.

use serde::{Deserialize, Serialize};

use crate::components::{CardType, Color, CounterKind, Keyword, Subtype, Supertype};
use crate::core::PlayerId;

/// Numeric comparison used by mana value / power / toughness predicates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    Equal(i32),
    AtLeast(i32),
    AtMost(i32),
    /// Inclusive range.
    Between(i32, i32),
}

impl Comparison {
    #[must_use]
    pub fn matches(self, value: i32) -> bool {
        match self {
            Comparison::Equal(n) => value == n,
            Comparison::AtLeast(n) => value >= n,
            Comparison::AtMost(n) => value <= n,
            Comparison::Between(lo, hi) => value >= lo && value <= hi,
        }
    }
}

/// Predicates over an object's characteristics.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardPredicate {
    IsCardType(CardType),
    HasSubtype(Subtype),
    HasSupertype(Supertype),
    HasColor(Color),
    Colorless,
    /// Two or more colors.
    Multicolored,
    ManaValue(Comparison),
    Power(Comparison),
    Toughness(Comparison),
    HasKeyword(Keyword),
    IsToken,
    IsNontoken,
    NameIs(String),

    // === Combinators ===
    And(Vec<CardPredicate>),
    Or(Vec<CardPredicate>),
    Not(Box<CardPredicate>),
}

impl CardPredicate {
    /// Negate this predicate.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Predicates over an object's game status.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatePredicate {
    Tapped,
    Untapped,
    Attacking,
    Blocking,
    Blocked,
    /// Attacking and not blocked.
    Unblocked,
    EnteredThisTurn,
    HasCounter(CounterKind),
    Attached,
    FaceDown,
    /// Needs per-turn damage history, which the state does not record.
    WasDealtDamageThisTurn,
    /// Needs per-turn damage history, which the state does not record.
    DealtDamageThisTurn,
}

impl StatePredicate {
    /// Whether the evaluator computes this predicate.
    ///
    /// Unimplemented predicates always evaluate to `false` and log a warning.
    #[must_use]
    pub fn is_implemented(&self) -> bool {
        !matches!(
            self,
            StatePredicate::WasDealtDamageThisTurn | StatePredicate::DealtDamageThisTurn
        )
    }
}

/// Relation between an object and the acting player.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ControllerPredicate {
    You,
    Opponent,
    /// Controlled by the player chosen as target `index`.
    TargetPlayer(usize),
    Specific(PlayerId),
    ActivePlayer,
    OwnedByYou,
    OwnedByOpponent,
    OwnedByTargetPlayer(usize),
}

/// A composable object filter.
///
/// ## Example
///
/// ```
/// use ccg_rules::components::{CardType, Keyword};
/// use ccg_rules::filters::{ControllerPredicate, ObjectFilter, StatePredicate};
///
/// // "untapped creatures with flying you control"
/// let filter = ObjectFilter::creature()
///     .with_keyword(Keyword::Flying)
///     .with_state(StatePredicate::Untapped)
///     .controlled_by(ControllerPredicate::You);
///
/// assert_eq!(filter.card_predicates.len(), 2);
/// assert!(filter.controller.is_some());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectFilter {
    /// All must hold.
    #[serde(default)]
    pub card_predicates: Vec<CardPredicate>,
    /// All must hold.
    #[serde(default)]
    pub state_predicates: Vec<StatePredicate>,
    #[serde(default)]
    pub controller: Option<ControllerPredicate>,
    /// Exclude the effect's source ("other creatures").
    #[serde(default)]
    pub exclude_source: bool,
}

impl ObjectFilter {
    /// A filter matching everything.
    #[must_use]
    pub fn any() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn of_type(card_type: CardType) -> Self {
        Self::default().with_card(CardPredicate::IsCardType(card_type))
    }

    #[must_use]
    pub fn creature() -> Self {
        Self::of_type(CardType::Creature)
    }

    #[must_use]
    pub fn land() -> Self {
        Self::of_type(CardType::Land)
    }

    /// Any permanent type.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default().with_card(CardPredicate::Or(
            [
                CardType::Artifact,
                CardType::Battle,
                CardType::Creature,
                CardType::Enchantment,
                CardType::Land,
                CardType::Planeswalker,
            ]
            .into_iter()
            .map(CardPredicate::IsCardType)
            .collect(),
        ))
    }

    #[must_use]
    pub fn with_card(mut self, predicate: CardPredicate) -> Self {
        self.card_predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn with_state(mut self, predicate: StatePredicate) -> Self {
        self.state_predicates.push(predicate);
        self
    }

    #[must_use]
    pub fn with_subtype(self, subtype: impl Into<String>) -> Self {
        self.with_card(CardPredicate::HasSubtype(Subtype::new(subtype)))
    }

    #[must_use]
    pub fn with_color(self, color: Color) -> Self {
        self.with_card(CardPredicate::HasColor(color))
    }

    #[must_use]
    pub fn with_keyword(self, keyword: Keyword) -> Self {
        self.with_card(CardPredicate::HasKeyword(keyword))
    }

    #[must_use]
    pub fn controlled_by(mut self, relation: ControllerPredicate) -> Self {
        self.controller = Some(relation);
        self
    }

    /// "Other": never match the source.
    #[must_use]
    pub fn other(mut self) -> Self {
        self.exclude_source = true;
        self
    }

    /// Whether every predicate in this filter is implemented.
    #[must_use]
    pub fn is_fully_implemented(&self) -> bool {
        self.state_predicates.iter().all(StatePredicate::is_implemented)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison() {
        assert!(Comparison::Equal(3).matches(3));
        assert!(!Comparison::Equal(3).matches(4));
        assert!(Comparison::AtLeast(2).matches(2));
        assert!(Comparison::AtMost(2).matches(-1));
        assert!(Comparison::Between(1, 3).matches(3));
        assert!(!Comparison::Between(1, 3).matches(4));
    }

    #[test]
    fn test_builders() {
        let filter = ObjectFilter::creature()
            .with_subtype("Goblin")
            .controlled_by(ControllerPredicate::Opponent)
            .other();

        assert_eq!(filter.card_predicates.len(), 2);
        assert_eq!(filter.controller, Some(ControllerPredicate::Opponent));
        assert!(filter.exclude_source);
    }

    #[test]
    fn test_implemented_flags() {
        assert!(ObjectFilter::creature().is_fully_implemented());
        let filter = ObjectFilter::creature().with_state(StatePredicate::WasDealtDamageThisTurn);
        assert!(!filter.is_fully_implemented());
    }

    #[test]
    fn test_filter_json_round_trip() {
        let filter = ObjectFilter::permanent()
            .with_state(StatePredicate::HasCounter(CounterKind::PlusOnePlusOne))
            .controlled_by(ControllerPredicate::TargetPlayer(0));
        let json = serde_json::to_string(&filter).unwrap();
        let back: ObjectFilter = serde_json::from_str(&json).unwrap();
        assert_eq!(filter, back);
    }
}
