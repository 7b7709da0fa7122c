//! Zone system for card locations.
//!
//! Every player owns one zone of each kind (library, hand, graveyard,
//! battlefield, stack, exile). Permanents stay in their owner's battlefield
//! zone when control changes; control is a projected characteristic.
//!
//! ## Key Types
//!
//! - `ZoneKind` / `ZoneKey`: which zone
//! - `ZoneManager`: location tracking and movement
//! - `ZonePosition`: insertion point in an ordered zone

pub mod manager;

pub use manager::{ZoneKey, ZoneKind, ZoneManager, ZonePosition};
