//! Card definitions - static catalog data.
//!
//! `CardDefinition` holds the printed properties of a card: its type line,
//! colors, base power/toughness, keywords and static abilities. The catalog
//! itself lives outside the rules core; the core only reads definitions when
//! a card is instantiated into a `GameState`.
//!
//! Instance data (zone, tapped, counters, damage) lives in components.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::statics::StaticAbility;
use crate::components::{CardComponent, CardType, Color, ColorSet, Keyword, Subtype, Supertype};

/// Unique identifier for a card definition.
///
/// This identifies the "kind" of card (e.g., "Grizzly Bears"),
/// not a specific object in a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CardId(pub u32);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card({})", self.0)
    }
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId};
/// use ccg_rules::components::{Color, Keyword};
///
/// let drake = CardDefinition::creature(CardId::new(1), "Wind Drake", 2, 2)
///     .with_color(Color::Blue)
///     .with_subtype("Drake")
///     .with_keyword(Keyword::Flying)
///     .with_mana_value(3);
///
/// assert!(drake.keywords.contains(&Keyword::Flying));
/// assert_eq!(drake.power, Some(2));
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    /// Unique identifier for this card definition.
    pub id: CardId,

    /// Display name.
    pub name: String,

    pub mana_value: u32,
    pub colors: ColorSet,
    pub supertypes: BTreeSet<Supertype>,
    pub types: BTreeSet<CardType>,
    pub subtypes: BTreeSet<Subtype>,

    /// Base power (creatures only).
    pub power: Option<i32>,
    /// Base toughness (creatures only).
    pub toughness: Option<i32>,

    pub keywords: BTreeSet<Keyword>,

    /// Static abilities that apply while this card is on the battlefield.
    #[serde(default)]
    pub static_abilities: Vec<StaticAbility>,
}

impl CardDefinition {
    /// Create a definition with the given types and nothing else.
    pub fn new(id: CardId, name: impl Into<String>, types: impl IntoIterator<Item = CardType>) -> Self {
        Self {
            id,
            name: name.into(),
            mana_value: 0,
            colors: ColorSet::COLORLESS,
            supertypes: BTreeSet::new(),
            types: types.into_iter().collect(),
            subtypes: BTreeSet::new(),
            power: None,
            toughness: None,
            keywords: BTreeSet::new(),
            static_abilities: Vec::new(),
        }
    }

    /// Create a creature definition.
    pub fn creature(id: CardId, name: impl Into<String>, power: i32, toughness: i32) -> Self {
        let mut def = Self::new(id, name, [CardType::Creature]);
        def.power = Some(power);
        def.toughness = Some(toughness);
        def
    }

    /// Create a land definition.
    pub fn land(id: CardId, name: impl Into<String>) -> Self {
        Self::new(id, name, [CardType::Land])
    }

    #[must_use]
    pub fn with_mana_value(mut self, mana_value: u32) -> Self {
        self.mana_value = mana_value;
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.colors = self.colors.with(color);
        self
    }

    #[must_use]
    pub fn with_type(mut self, card_type: CardType) -> Self {
        self.types.insert(card_type);
        self
    }

    #[must_use]
    pub fn with_supertype(mut self, supertype: Supertype) -> Self {
        self.supertypes.insert(supertype);
        self
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.insert(Subtype::new(subtype));
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    #[must_use]
    pub fn with_static(mut self, ability: StaticAbility) -> Self {
        self.static_abilities.push(ability);
        self
    }

    /// Build the card-identity component for an instance of this card.
    #[must_use]
    pub fn to_component(&self) -> CardComponent {
        CardComponent {
            definition: Some(self.id),
            name: self.name.clone(),
            mana_value: self.mana_value,
            colors: self.colors,
            supertypes: self.supertypes.clone(),
            types: self.types.clone(),
            subtypes: self.subtypes.clone(),
            power: self.power,
            toughness: self.toughness,
            keywords: self.keywords.clone(),
            static_abilities: self.static_abilities.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creature_definition() {
        let bears = CardDefinition::creature(CardId::new(2), "Grizzly Bears", 2, 2)
            .with_color(Color::Green)
            .with_subtype("Bear")
            .with_mana_value(2);

        assert!(bears.types.contains(&CardType::Creature));
        assert!(bears.colors.contains(Color::Green));
        assert!(bears.subtypes.contains(&Subtype::new("Bear")));
        assert_eq!(bears.toughness, Some(2));
    }

    #[test]
    fn test_to_component_copies_characteristics() {
        let land = CardDefinition::land(CardId::new(3), "Forest")
            .with_supertype(Supertype::Basic)
            .with_subtype("Forest");
        let component = land.to_component();

        assert_eq!(component.definition, Some(CardId::new(3)));
        assert_eq!(component.name, "Forest");
        assert!(component.supertypes.contains(&Supertype::Basic));
        assert_eq!(component.power, None);
    }

    #[test]
    fn test_definition_serialization() {
        let def = CardDefinition::creature(CardId::new(9), "Test", 1, 1).with_keyword(Keyword::Haste);
        let json = serde_json::to_string(&def).unwrap();
        let back: CardDefinition = serde_json::from_str(&json).unwrap();
        assert_eq!(def, back);
    }
}
