//! Static abilities printed on permanents.
//!
//! Unlike floating effects, static abilities have no snapshot: the set of
//! objects they affect is recomputed every time the state is projected, so
//! "creatures you control get +1/+1" picks up a creature the moment it
//! enters. They stop applying as soon as their source leaves the
//! battlefield.

use serde::{Deserialize, Serialize};

use crate::amounts::DynamicAmount;
use crate::components::{CardType, Keyword};
use crate::filters::ObjectFilter;

/// A static ability of a permanent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum StaticAbility {
    /// "Creatures you control get +1/+1" (layer: P/T modify).
    ModifyStatsForGroup {
        filter: ObjectFilter,
        power: i32,
        toughness: i32,
    },

    /// "Other Elves you control have flying" (layer: ability).
    GrantKeywordToGroup { filter: ObjectFilter, keyword: Keyword },

    /// "Lands you control are creatures" style type grants (layer: type).
    AddCardTypeToGroup { filter: ObjectFilter, card_type: CardType },

    /// Characteristic-defining P/T, e.g. "power and toughness are each equal
    /// to the number of cards in your hand". Applies to the source itself,
    /// first within the P/T-set sublayer.
    CharacteristicDefiningPt {
        power: DynamicAmount,
        toughness: DynamicAmount,
    },
}

impl StaticAbility {
    /// Anthem builder.
    #[must_use]
    pub fn anthem(filter: ObjectFilter, power: i32, toughness: i32) -> Self {
        Self::ModifyStatsForGroup {
            filter,
            power,
            toughness,
        }
    }

    /// Whether this ability defines its source's own characteristics.
    #[must_use]
    pub fn is_characteristic_defining(&self) -> bool {
        matches!(self, Self::CharacteristicDefiningPt { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cda_flag() {
        let cda = StaticAbility::CharacteristicDefiningPt {
            power: DynamicAmount::Fixed(1),
            toughness: DynamicAmount::Fixed(1),
        };
        assert!(cda.is_characteristic_defining());
        assert!(!StaticAbility::anthem(ObjectFilter::creature(), 1, 1).is_characteristic_defining());
    }
}
