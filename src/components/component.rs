//! Typed component storage.
//!
//! Each entity carries a `ComponentSet`: a map from `ComponentKind` to one
//! `Component` value. The map guarantees at most one component of a kind per
//! entity. Access is typed through [`ComponentType`], so callers write
//! `set.get::<TappedComponent>()` and the compiler checks the kind.
//!
//! ```
//! use ccg_rules::components::{ComponentSet, TappedComponent, DamageComponent};
//!
//! let set = ComponentSet::new()
//!     .with(TappedComponent)
//!     .with(DamageComponent { amount: 2 });
//! assert!(set.has::<TappedComponent>());
//! assert_eq!(set.get::<DamageComponent>().map(|d| d.amount), Some(2));
//!
//! let set = set.without::<TappedComponent>();
//! assert!(!set.has::<TappedComponent>());
//! ```

use std::collections::{BTreeMap, BTreeSet};

use im::OrdMap;
use serde::{Deserialize, Serialize};

use super::types::{CardType, ColorSet, CounterKind, Keyword, Subtype, Supertype};
use crate::cards::{CardId, StaticAbility};
use crate::core::{EntityId, PlayerId};

/// Implemented by every concrete component struct.
pub trait ComponentType: Sized + Clone {
    /// The registry key for this component.
    const KIND: ComponentKind;

    /// Wrap into the tagged union.
    fn into_component(self) -> Component;

    /// Borrow out of the tagged union if the kind matches.
    fn from_component(component: &Component) -> Option<&Self>;
}

macro_rules! components {
    ($($kind:ident => $ty:ident),* $(,)?) => {
        /// Tag identifying a component kind.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub enum ComponentKind {
            $($kind),*
        }

        /// Tagged union of every component value.
        #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
        pub enum Component {
            $($kind($ty)),*
        }

        impl Component {
            /// The kind tag of this value.
            #[must_use]
            pub fn kind(&self) -> ComponentKind {
                match self {
                    $(Component::$kind(_) => ComponentKind::$kind),*
                }
            }
        }

        $(
            impl ComponentType for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                fn into_component(self) -> Component {
                    Component::$kind(self)
                }

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$kind(value) => Some(value),
                        #[allow(unreachable_patterns)]
                        _ => None,
                    }
                }
            }
        )*
    };
}

components! {
    Card => CardComponent,
    Owner => OwnerComponent,
    Controller => ControllerComponent,
    Tapped => TappedComponent,
    EnteredBattlefield => EnteredBattlefieldComponent,
    Attacking => AttackingComponent,
    Blocking => BlockingComponent,
    Blocked => BlockedComponent,
    Counters => CountersComponent,
    Damage => DamageComponent,
    AttachedTo => AttachedToComponent,
    Token => TokenComponent,
    FaceDown => FaceDownComponent,
    Player => PlayerComponent,
}

// =============================================================================
// Component values
// =============================================================================

/// Printed characteristics of a card or token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CardComponent {
    /// Catalog definition this object was created from. `None` for tokens
    /// described inline by an effect.
    pub definition: Option<CardId>,
    pub name: String,
    pub mana_value: u32,
    pub colors: ColorSet,
    pub supertypes: BTreeSet<Supertype>,
    pub types: BTreeSet<CardType>,
    pub subtypes: BTreeSet<Subtype>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: BTreeSet<Keyword>,
    #[serde(default)]
    pub static_abilities: Vec<StaticAbility>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerComponent(pub PlayerId);

/// Explicit controller. Objects without one are controlled by their owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControllerComponent(pub PlayerId);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TappedComponent;

/// When the permanent entered the battlefield.
///
/// The timestamp orders its static abilities within a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnteredBattlefieldComponent {
    pub turn: u32,
    pub timestamp: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttackingComponent {
    pub defender: EntityId,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockingComponent {
    pub attackers: Vec<EntityId>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockedComponent;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountersComponent {
    pub counters: BTreeMap<CounterKind, u32>,
}

impl CountersComponent {
    #[must_use]
    pub fn count(&self, kind: &CounterKind) -> u32 {
        self.counters.get(kind).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn added(mut self, kind: CounterKind, amount: u32) -> Self {
        *self.counters.entry(kind).or_insert(0) += amount;
        self
    }

    /// Remove up to `amount`; returns the new component and how many were removed.
    #[must_use]
    pub fn removed(mut self, kind: &CounterKind, amount: u32) -> (Self, u32) {
        let current = self.count(kind);
        let taken = current.min(amount);
        if current - taken == 0 {
            self.counters.remove(kind);
        } else {
            self.counters.insert(kind.clone(), current - taken);
        }
        (self, taken)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.is_empty()
    }
}

/// Damage marked on a permanent this turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageComponent {
    pub amount: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachedToComponent {
    pub host: EntityId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenComponent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceDownComponent;

/// Per-player data.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerComponent {
    pub life: i32,
    pub poison: u32,
}

// =============================================================================
// Container
// =============================================================================

/// All components attached to one entity.
///
/// Backed by a persistent ordered map so snapshots share structure and
/// iteration order is deterministic.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentSet {
    components: OrdMap<ComponentKind, Component>,
}

impl ComponentSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Borrow a typed component.
    #[must_use]
    pub fn get<T: ComponentType>(&self) -> Option<&T> {
        self.components.get(&T::KIND).and_then(T::from_component)
    }

    #[must_use]
    pub fn has<T: ComponentType>(&self) -> bool {
        self.components.contains_key(&T::KIND)
    }

    /// Insert or replace the component of `T`'s kind.
    pub fn insert<T: ComponentType>(&mut self, value: T) {
        self.components.insert(T::KIND, value.into_component());
    }

    /// Insert an already-wrapped component, replacing any of the same kind.
    pub fn insert_raw(&mut self, component: Component) {
        self.components.insert(component.kind(), component);
    }

    /// Remove and return the component of `T`'s kind.
    pub fn remove<T: ComponentType>(&mut self) -> Option<T> {
        self.components
            .remove(&T::KIND)
            .and_then(|c| T::from_component(&c).cloned())
    }

    /// Builder form of `insert`.
    #[must_use]
    pub fn with<T: ComponentType>(mut self, value: T) -> Self {
        self.insert(value);
        self
    }

    /// Builder form of `remove`.
    #[must_use]
    pub fn without<T: ComponentType>(mut self) -> Self {
        self.remove::<T>();
        self
    }

    pub fn kinds(&self) -> impl Iterator<Item = ComponentKind> + '_ {
        self.components.keys().copied()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
