//! Zone manager for card locations and movement.
//!
//! Zones are ordered lists keyed by `(owner, kind)`. Index 0 is the bottom,
//! the last element is the top (top of library, top of stack). A reverse
//! index guarantees every entity sits in at most one zone.
//!
//! Both maps are persistent (`im`), so cloning a manager is O(1) and
//! snapshots share structure.

use im::{HashMap as ImHashMap, Vector};
use serde::{Deserialize, Serialize};

use crate::core::error::{EngineError, Result};
use crate::core::rng::GameRng;
use crate::core::{EntityId, PlayerId};

/// The six zone kinds the rules core tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ZoneKind {
    Library,
    Hand,
    Graveyard,
    Battlefield,
    Stack,
    Exile,
}

impl ZoneKind {
    pub const ALL: [ZoneKind; 6] = [
        ZoneKind::Library,
        ZoneKind::Hand,
        ZoneKind::Graveyard,
        ZoneKind::Battlefield,
        ZoneKind::Stack,
        ZoneKind::Exile,
    ];
}

impl std::fmt::Display for ZoneKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A concrete zone: one player's library, hand, graveyard, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ZoneKey {
    pub owner: PlayerId,
    pub kind: ZoneKind,
}

impl ZoneKey {
    #[must_use]
    pub const fn new(owner: PlayerId, kind: ZoneKind) -> Self {
        Self { owner, kind }
    }

    #[must_use]
    pub const fn library(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Library)
    }

    #[must_use]
    pub const fn hand(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Hand)
    }

    #[must_use]
    pub const fn graveyard(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Graveyard)
    }

    #[must_use]
    pub const fn battlefield(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Battlefield)
    }

    #[must_use]
    pub const fn exile(owner: PlayerId) -> Self {
        Self::new(owner, ZoneKind::Exile)
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}'s {}", self.owner, self.kind)
    }
}

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to top of zone (e.g., top of library).
    Top,
    /// Add to bottom of zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Tracks which zone every entity is in, and the order within each zone.
///
/// ```
/// use ccg_rules::core::{EntityId, PlayerId};
/// use ccg_rules::zones::{ZoneKey, ZoneManager, ZonePosition};
///
/// let p0 = PlayerId::new(0);
/// let mut zones = ZoneManager::new(2);
/// zones.add(EntityId(10), ZoneKey::library(p0), ZonePosition::Top).unwrap();
/// zones.add(EntityId(11), ZoneKey::library(p0), ZonePosition::Top).unwrap();
///
/// assert_eq!(zones.top(ZoneKey::library(p0), 1), vec![EntityId(11)]);
/// zones.move_to(EntityId(11), ZoneKey::hand(p0), ZonePosition::Top).unwrap();
/// assert_eq!(zones.zone_of(EntityId(11)), Some(ZoneKey::hand(p0)));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneManager {
    /// Entity locations: entity -> zone
    locations: ImHashMap<EntityId, ZoneKey>,

    /// Ordered contents per zone (bottom first).
    contents: ImHashMap<ZoneKey, Vector<EntityId>>,

    player_count: usize,
}

impl ZoneManager {
    /// Create empty zones of every kind for every player.
    #[must_use]
    pub fn new(player_count: usize) -> Self {
        let mut contents = ImHashMap::new();
        for owner in PlayerId::all(player_count) {
            for kind in ZoneKind::ALL {
                contents.insert(ZoneKey::new(owner, kind), Vector::new());
            }
        }
        Self {
            locations: ImHashMap::new(),
            contents,
            player_count,
        }
    }

    fn insert_at(order: &mut Vector<EntityId>, entity: EntityId, position: ZonePosition) {
        match position {
            ZonePosition::Top => order.push_back(entity),
            ZonePosition::Bottom => order.push_front(entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Add an entity that is not yet in any zone.
    pub fn add(&mut self, entity: EntityId, zone: ZoneKey, position: ZonePosition) -> Result<()> {
        if let Some(existing) = self.locations.get(&entity) {
            return Err(EngineError::InvariantViolated(format!(
                "{entity} is already in {existing}"
            )));
        }
        let order = self
            .contents
            .get_mut(&zone)
            .ok_or_else(|| EngineError::InvariantViolated(format!("unknown zone {zone}")))?;
        Self::insert_at(order, entity, position);
        self.locations.insert(entity, zone);
        Ok(())
    }

    /// Move an entity to another zone (or reposition it in the same one).
    ///
    /// Returns the zone it came from.
    pub fn move_to(
        &mut self,
        entity: EntityId,
        zone: ZoneKey,
        position: ZonePosition,
    ) -> Result<ZoneKey> {
        let old_zone = self.remove(entity).ok_or(EngineError::EntityNotFound(entity))?;
        if let Err(err) = self.add(entity, zone, position) {
            // Put it back where it was so the manager stays consistent.
            let _ = self.add(entity, old_zone, ZonePosition::Top);
            return Err(err);
        }
        Ok(old_zone)
    }

    /// Remove an entity entirely. Returns the zone it was in.
    pub fn remove(&mut self, entity: EntityId) -> Option<ZoneKey> {
        let zone = self.locations.remove(&entity)?;
        if let Some(order) = self.contents.get_mut(&zone) {
            order.retain(|e| *e != entity);
        }
        Some(zone)
    }

    /// Get the zone an entity is in.
    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneKey> {
        self.locations.get(&entity).copied()
    }

    /// Check if an entity is in a zone of the given kind (any owner).
    #[must_use]
    pub fn is_in_kind(&self, entity: EntityId, kind: ZoneKind) -> bool {
        self.zone_of(entity).is_some_and(|z| z.kind == kind)
    }

    /// Contents of a zone, bottom first.
    pub fn contents(&self, zone: ZoneKey) -> impl Iterator<Item = EntityId> + '_ {
        self.contents.get(&zone).into_iter().flat_map(|v| v.iter().copied())
    }

    /// Up to `count` entities from the top of a zone, topmost first.
    #[must_use]
    pub fn top(&self, zone: ZoneKey, count: usize) -> Vec<EntityId> {
        self.contents
            .get(&zone)
            .map(|v| v.iter().rev().take(count).copied().collect())
            .unwrap_or_default()
    }

    /// Every entity in zones of `kind`, walking owners in seat order.
    #[must_use]
    pub fn all_of_kind(&self, kind: ZoneKind) -> Vec<EntityId> {
        PlayerId::all(self.player_count)
            .flat_map(|owner| self.contents(ZoneKey::new(owner, kind)))
            .collect()
    }

    /// Get the number of entities in a zone.
    #[must_use]
    pub fn size(&self, zone: ZoneKey) -> usize {
        self.contents.get(&zone).map_or(0, Vector::len)
    }

    /// Replace the order of a zone with a permutation of its contents.
    pub fn reorder(&mut self, zone: ZoneKey, order: Vec<EntityId>) -> Result<()> {
        let current = self
            .contents
            .get(&zone)
            .ok_or_else(|| EngineError::InvariantViolated(format!("unknown zone {zone}")))?;
        let mut a: Vec<_> = current.iter().copied().collect();
        let mut b = order.clone();
        a.sort_unstable();
        b.sort_unstable();
        if a != b {
            return Err(EngineError::InvariantViolated(format!(
                "reorder of {zone} is not a permutation"
            )));
        }
        self.contents.insert(zone, order.into_iter().collect());
        Ok(())
    }

    /// Shuffle a zone with the game RNG.
    pub fn shuffle(&mut self, zone: ZoneKey, rng: &mut GameRng) {
        if let Some(order) = self.contents.get_mut(&zone) {
            let mut cards: Vec<_> = order.iter().copied().collect();
            rng.shuffle(&mut cards);
            *order = cards.into_iter().collect();
        }
    }

    /// Get total number of entities tracked.
    #[must_use]
    pub fn total(&self) -> usize {
        self.locations.len()
    }

    /// Check every located entity appears exactly once in its zone list.
    pub fn check_consistency(&self) -> Result<()> {
        let listed: usize = self.contents.values().map(Vector::len).sum();
        if listed != self.locations.len() {
            return Err(EngineError::InvariantViolated(format!(
                "{listed} zone entries for {} located entities",
                self.locations.len()
            )));
        }
        for (entity, zone) in &self.locations {
            let count = self.contents(*zone).filter(|e| e == entity).count();
            if count != 1 {
                return Err(EngineError::InvariantViolated(format!(
                    "{entity} appears {count} times in {zone}"
                )));
            }
        }
        Ok(())
    }
}
