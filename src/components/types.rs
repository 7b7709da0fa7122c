//! Card characteristic vocabulary: types, colors, keywords, counters.

use serde::{Deserialize, Serialize};

/// Card types on the type line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CardType {
    Artifact,
    Battle,
    Creature,
    Enchantment,
    Instant,
    Land,
    Planeswalker,
    Sorcery,
}

impl CardType {
    /// Whether objects of this type can exist on the battlefield.
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        !matches!(self, CardType::Instant | CardType::Sorcery)
    }
}

/// Supertypes (legendary, basic, ...).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Supertype {
    Basic,
    Legendary,
    Snow,
    World,
}

/// A subtype such as a creature type ("Goblin") or land type ("Forest").
///
/// Subtypes are an open set, so they are names rather than an enum.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Subtype(pub String);

impl Subtype {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Subtype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The five colors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Color {
    White,
    Blue,
    Black,
    Red,
    Green,
}

impl Color {
    pub const ALL: [Color; 5] = [
        Color::White,
        Color::Blue,
        Color::Black,
        Color::Red,
        Color::Green,
    ];

    const fn bit(self) -> u8 {
        match self {
            Color::White => 1,
            Color::Blue => 1 << 1,
            Color::Black => 1 << 2,
            Color::Red => 1 << 3,
            Color::Green => 1 << 4,
        }
    }
}

impl std::fmt::Display for Color {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Color::White => "white",
            Color::Blue => "blue",
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
        };
        f.write_str(name)
    }
}

/// A set of colors packed into one byte.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorSet(u8);

impl ColorSet {
    pub const COLORLESS: ColorSet = ColorSet(0);

    #[must_use]
    pub fn of(colors: &[Color]) -> Self {
        colors.iter().fold(Self::COLORLESS, |set, c| set.with(*c))
    }

    #[must_use]
    pub fn with(self, color: Color) -> Self {
        Self(self.0 | color.bit())
    }

    #[must_use]
    pub fn union(self, other: ColorSet) -> Self {
        Self(self.0 | other.0)
    }

    #[must_use]
    pub fn contains(self, color: Color) -> bool {
        self.0 & color.bit() != 0
    }

    #[must_use]
    pub fn intersects(self, other: ColorSet) -> bool {
        self.0 & other.0 != 0
    }

    #[must_use]
    pub fn is_colorless(self) -> bool {
        self.0 == 0
    }

    #[must_use]
    pub fn count(self) -> u32 {
        self.0.count_ones()
    }

    pub fn iter(self) -> impl Iterator<Item = Color> {
        Color::ALL.into_iter().filter(move |c| self.contains(*c))
    }
}

/// Keyword abilities the rules core knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Keyword {
    Deathtouch,
    Defender,
    DoubleStrike,
    FirstStrike,
    Flying,
    Haste,
    Hexproof,
    Indestructible,
    Lifelink,
    Menace,
    Reach,
    Shroud,
    Trample,
    Vigilance,
    ProtectionFrom(Color),
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Keyword::ProtectionFrom(color) => write!(f, "protection from {color}"),
            other => write!(f, "{other:?}"),
        }
    }
}

/// Kinds of counters that can sit on a permanent.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CounterKind {
    PlusOnePlusOne,
    MinusOneMinusOne,
    Loyalty,
    Charge,
    Named(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_set_ops() {
        let set = ColorSet::of(&[Color::Red, Color::Green]);
        assert!(set.contains(Color::Red));
        assert!(!set.contains(Color::Blue));
        assert_eq!(set.count(), 2);
        assert!(set.intersects(ColorSet::of(&[Color::Green])));
        assert!(!set.is_colorless());
        assert!(ColorSet::COLORLESS.is_colorless());
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Color::Red, Color::Green]);
    }

    #[test]
    fn test_permanent_types() {
        assert!(CardType::Creature.is_permanent());
        assert!(CardType::Land.is_permanent());
        assert!(!CardType::Instant.is_permanent());
    }

    #[test]
    fn test_keyword_display() {
        assert_eq!(Keyword::Flying.to_string(), "Flying");
        assert_eq!(
            Keyword::ProtectionFrom(Color::Black).to_string(),
            "protection from black"
        );
    }
}
