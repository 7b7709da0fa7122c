//! Entity-component data model.
//!
//! ## Key Types
//!
//! - `ComponentSet`: per-entity map, one component per kind
//! - `ComponentType`: compile-time typed accessor trait
//! - Characteristic vocabulary: `CardType`, `Color`, `Keyword`, ...

pub mod component;
pub mod types;

pub use component::{
    AttachedToComponent, AttackingComponent, BlockedComponent, BlockingComponent, CardComponent,
    Component, ComponentKind, ComponentSet, ComponentType, ControllerComponent, CountersComponent,
    DamageComponent, EnteredBattlefieldComponent, FaceDownComponent, OwnerComponent,
    PlayerComponent, TappedComponent, TokenComponent,
};
pub use types::{CardType, Color, ColorSet, CounterKind, Keyword, Subtype, Supertype};
