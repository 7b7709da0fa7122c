//! Effective characteristics of objects.
//!
//! `Characteristics` is what the rest of the engine reads when it asks
//! "is this a creature", "who controls it", "what is its power". The base
//! values come from the card component; a `ProjectedState` holds the values
//! after every layer has been applied.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::components::{
    CardComponent, CardType, ColorSet, FaceDownComponent, Keyword, Subtype, Supertype,
};
use crate::core::{EntityId, GameState, PlayerId};

/// The characteristics of one object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristics {
    pub name: String,
    pub owner: Option<PlayerId>,
    pub controller: Option<PlayerId>,
    pub mana_value: u32,
    pub types: BTreeSet<CardType>,
    pub supertypes: BTreeSet<Supertype>,
    pub subtypes: BTreeSet<Subtype>,
    pub colors: ColorSet,
    pub keywords: BTreeSet<Keyword>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,

    // Rules markers.
    /// Exiled instead of put into a graveyard when it would die.
    pub exile_on_death: bool,
    /// Regeneration shields currently on the object.
    pub regeneration_shields: u32,
}

impl Characteristics {
    /// Printed characteristics, before any layer.
    ///
    /// Face-down objects are nameless colorless 2/2 creatures.
    #[must_use]
    pub fn base(state: &GameState, entity: EntityId) -> Option<Self> {
        let card = state.get::<CardComponent>(entity)?;
        let owner = state.owner_of(entity);
        let controller = state.base_controller_of(entity);

        if state.has::<FaceDownComponent>(entity) {
            return Some(Self {
                name: String::new(),
                owner,
                controller,
                mana_value: 0,
                types: BTreeSet::from([CardType::Creature]),
                supertypes: BTreeSet::new(),
                subtypes: BTreeSet::new(),
                colors: ColorSet::COLORLESS,
                keywords: BTreeSet::new(),
                power: Some(2),
                toughness: Some(2),
                exile_on_death: false,
                regeneration_shields: 0,
            });
        }

        Some(Self {
            name: card.name.clone(),
            owner,
            controller,
            mana_value: card.mana_value,
            types: card.types.clone(),
            supertypes: card.supertypes.clone(),
            subtypes: card.subtypes.clone(),
            colors: card.colors,
            keywords: card.keywords.clone(),
            power: card.power,
            toughness: card.toughness,
            exile_on_death: false,
            regeneration_shields: 0,
        })
    }

    #[must_use]
    pub fn is(&self, card_type: CardType) -> bool {
        self.types.contains(&card_type)
    }

    #[must_use]
    pub fn is_creature(&self) -> bool {
        self.is(CardType::Creature)
    }

    #[must_use]
    pub fn has_keyword(&self, keyword: Keyword) -> bool {
        self.keywords.contains(&keyword)
    }
}

/// Effective characteristics of every object, after all layers.
///
/// Produced by [`crate::layers::project`]; never cached on the state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProjectedState {
    objects: BTreeMap<EntityId, Characteristics>,
}

impl ProjectedState {
    pub(crate) fn from_objects(objects: BTreeMap<EntityId, Characteristics>) -> Self {
        Self { objects }
    }

    pub(crate) fn get_mut(&mut self, entity: EntityId) -> Option<&mut Characteristics> {
        self.objects.get_mut(&entity)
    }

    #[must_use]
    pub fn get(&self, entity: EntityId) -> Option<&Characteristics> {
        self.objects.get(&entity)
    }

    #[must_use]
    pub fn controller_of(&self, entity: EntityId) -> Option<PlayerId> {
        self.get(entity).and_then(|c| c.controller)
    }

    #[must_use]
    pub fn power(&self, entity: EntityId) -> Option<i32> {
        self.get(entity).and_then(|c| c.power)
    }

    #[must_use]
    pub fn toughness(&self, entity: EntityId) -> Option<i32> {
        self.get(entity).and_then(|c| c.toughness)
    }

    #[must_use]
    pub fn has_keyword(&self, entity: EntityId, keyword: Keyword) -> bool {
        self.get(entity).is_some_and(|c| c.has_keyword(keyword))
    }

    #[must_use]
    pub fn is_type(&self, entity: EntityId, card_type: CardType) -> bool {
        self.get(entity).is_some_and(|c| c.is(card_type))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Characteristics)> {
        self.objects.iter().map(|(id, c)| (*id, c))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
