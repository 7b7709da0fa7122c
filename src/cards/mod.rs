//! Card catalog: definitions, static abilities, and registry.
//!
//! ## Key Types
//!
//! - `CardId`: identifier for card definitions
//! - `CardDefinition`: printed card data
//! - `StaticAbility`: continuous abilities of permanents
//! - `CardRegistry`: read-only definition lookup

pub mod definition;
pub mod registry;
pub mod statics;

pub use definition::{CardDefinition, CardId};
pub use registry::CardRegistry;
pub use statics::StaticAbility;
