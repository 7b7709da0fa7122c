//! Target requirements.
//!
//! Defines what an effect may target and how many:
//! - `TargetRequirement`: what kind of entity is a legal target
//! - `TargetCount`: how many targets to select
//! - `TargetSpec`: requirement + count + optional flag

use serde::{Deserialize, Serialize};

use crate::amounts::EntityReference;
use crate::filters::ObjectFilter;
use crate::zones::ZoneKind;

/// Which players may be targeted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerFilter {
    Any,
    You,
    Opponent,
}

/// The type of entity that can be targeted.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetRequirement {
    /// A creature on the battlefield matching the filter.
    Creature(ObjectFilter),
    /// A permanent on the battlefield matching the filter.
    Permanent(ObjectFilter),
    Player(PlayerFilter),
    /// A card in some player's `zone` (graveyard, hand, library, exile).
    CardInZone { zone: ZoneKind, filter: ObjectFilter },
    /// A spell on the stack.
    Spell(ObjectFilter),
    /// A creature, planeswalker, or player.
    AnyTarget,
    /// The base requirement, minus one referenced entity.
    OtherThan {
        requirement: Box<TargetRequirement>,
        excluded: EntityReference,
    },
}

impl TargetRequirement {
    #[must_use]
    pub fn creature() -> Self {
        Self::Creature(ObjectFilter::any())
    }

    #[must_use]
    pub fn permanent() -> Self {
        Self::Permanent(ObjectFilter::any())
    }

    #[must_use]
    pub fn player() -> Self {
        Self::Player(PlayerFilter::Any)
    }

    #[must_use]
    pub fn opponent() -> Self {
        Self::Player(PlayerFilter::Opponent)
    }

    #[must_use]
    pub fn card_in_graveyard(filter: ObjectFilter) -> Self {
        Self::CardInZone {
            zone: ZoneKind::Graveyard,
            filter,
        }
    }

    /// "another target ...": exclude the source.
    #[must_use]
    pub fn other_than_source(self) -> Self {
        Self::OtherThan {
            requirement: Box::new(self),
            excluded: EntityReference::Source,
        }
    }
}

/// Number of targets to select.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetCount {
    /// Exactly N targets.
    Exactly(usize),
    /// Up to N targets.
    UpTo(usize),
    /// At least N targets.
    AtLeast(usize),
    /// Between min and max targets.
    Range { min: usize, max: usize },
    /// All valid targets.
    All,
}

impl TargetCount {
    /// `(min, max)` given how many legal targets exist.
    #[must_use]
    pub fn bounds(self, available: usize) -> (usize, usize) {
        match self {
            TargetCount::Exactly(n) => (n, n),
            TargetCount::UpTo(n) => (0, n),
            TargetCount::AtLeast(n) => (n, available.max(n)),
            TargetCount::Range { min, max } => (min, max),
            TargetCount::All => (available, available),
        }
    }
}

/// Specification for effect targeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub requirement: TargetRequirement,
    pub count: TargetCount,
    /// Whether choosing no targets is acceptable.
    pub optional: bool,
}

impl TargetSpec {
    /// A single target of the given requirement.
    #[must_use]
    pub fn single(requirement: TargetRequirement) -> Self {
        Self {
            requirement,
            count: TargetCount::Exactly(1),
            optional: false,
        }
    }

    #[must_use]
    pub fn with_count(mut self, count: TargetCount) -> Self {
        self.count = count;
        self
    }

    /// Make targeting optional (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// `(min, max)` for a selection out of `available` legal targets.
    #[must_use]
    pub fn bounds(&self, available: usize) -> (usize, usize) {
        let (min, max) = self.count.bounds(available);
        let min = if self.optional { 0 } else { min };
        (min.min(max), max)
    }
}
