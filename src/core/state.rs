//! The immutable game snapshot.
//!
//! ## GameState
//!
//! One value holding everything the rules core reads and writes:
//! - entity → component sets
//! - zone contents and locations
//! - active floating effects
//! - the continuation stack and the pending decision
//! - turn bookkeeping (owned by the scheduler, read by the core)
//! - the deterministic RNG and id/timestamp counters
//!
//! All collections are `im` persistent structures, so `clone()` is cheap and
//! the engine works by cloning the input, applying changes to the clone, and
//! returning it. Callers never observe a partially applied state.

use im::{HashMap as ImHashMap, Vector};
use serde::{Deserialize, Serialize};

use super::config::GameConfig;
use super::entity::EntityId;
use super::error::{EngineError, Result};
use super::player::PlayerId;
use super::rng::GameRng;
use crate::cards::{CardDefinition, CardId, CardRegistry};
use crate::components::{
    AttachedToComponent, AttackingComponent, BlockedComponent, BlockingComponent, CardComponent,
    ComponentSet, ComponentType, ControllerComponent, CountersComponent, DamageComponent,
    EnteredBattlefieldComponent, OwnerComponent, PlayerComponent, TappedComponent, TokenComponent,
};
use crate::continuation::ContinuationFrame;
use crate::decisions::{DecisionId, PendingDecision};
use crate::layers::{ActiveFloatingEffect, Duration, FloatingEffectId, FloatingModification};
use crate::zones::{ZoneKey, ZoneKind, ZoneManager, ZonePosition};

/// Steps of a turn. The scheduler advances these; the core only reads them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Step {
    Untap,
    Upkeep,
    Draw,
    #[default]
    PrecombatMain,
    BeginCombat,
    DeclareAttackers,
    DeclareBlockers,
    CombatDamage,
    EndCombat,
    PostcombatMain,
    End,
    Cleanup,
}

/// Turn bookkeeping referenced by the core.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    /// Turn number (starts at 1).
    pub turn_number: u32,
    /// Whose turn it is.
    pub active_player: PlayerId,
    /// Who currently holds priority.
    pub priority_player: PlayerId,
    pub step: Step,
}

impl Default for TurnState {
    fn default() -> Self {
        Self {
            turn_number: 1,
            active_player: PlayerId::new(0),
            priority_player: PlayerId::new(0),
            step: Step::default(),
        }
    }
}

/// Complete game snapshot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    player_count: usize,

    entities: ImHashMap<EntityId, ComponentSet>,

    /// Zone contents and locations.
    pub zones: ZoneManager,

    floating_effects: Vector<ActiveFloatingEffect>,

    /// Suspended work, top = last.
    continuations: Vector<ContinuationFrame>,

    pending_decision: Option<PendingDecision>,

    /// Turn bookkeeping (scheduler-owned).
    pub turn: TurnState,

    /// Deterministic RNG.
    pub rng: GameRng,

    next_entity_id: u32,
    next_timestamp: u64,
    next_floating_id: u32,
    next_decision_id: u32,
}

impl GameState {
    /// Create a new game with one player entity per seat and empty zones.
    pub fn new(config: &GameConfig) -> Result<Self> {
        config.validate()?;

        let mut entities = ImHashMap::new();
        for player in PlayerId::all(config.player_count) {
            entities.insert(
                EntityId::player(player),
                ComponentSet::new().with(PlayerComponent {
                    life: config.starting_life,
                    poison: 0,
                }),
            );
        }

        Ok(Self {
            player_count: config.player_count,
            entities,
            zones: ZoneManager::new(config.player_count),
            floating_effects: Vector::new(),
            continuations: Vector::new(),
            pending_decision: None,
            turn: TurnState::default(),
            rng: GameRng::new(config.seed),
            next_entity_id: EntityId::first_non_player(config.player_count),
            next_timestamp: 1,
            next_floating_id: 1,
            next_decision_id: 1,
        })
    }

    // === Players ===

    /// Get player count.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.player_count
    }

    /// Iterate over all player IDs in seat order.
    pub fn players(&self) -> impl Iterator<Item = PlayerId> {
        PlayerId::all(self.player_count)
    }

    /// All players, active player first.
    #[must_use]
    pub fn apnap_order(&self) -> Vec<PlayerId> {
        PlayerId::apnap(self.turn.active_player, self.player_count)
    }

    #[must_use]
    pub fn opponents_of(&self, player: PlayerId) -> Vec<PlayerId> {
        player.opponents(self.player_count).collect()
    }

    /// The player an entity id refers to, if it is a player id.
    #[must_use]
    pub fn as_player(&self, entity: EntityId) -> Option<PlayerId> {
        entity.as_player(self.player_count)
    }

    /// Life total of a player (0 for an unknown seat).
    #[must_use]
    pub fn life(&self, player: PlayerId) -> i32 {
        self.get::<PlayerComponent>(EntityId::player(player))
            .map_or(0, |p| p.life)
    }

    pub fn set_life(&mut self, player: PlayerId, life: i32) -> Result<()> {
        let entity = EntityId::player(player);
        let mut data = self
            .get::<PlayerComponent>(entity)
            .cloned()
            .ok_or(EngineError::EntityNotFound(entity))?;
        data.life = life;
        self.insert_component(entity, data)
    }

    // === Entities & components ===

    #[must_use]
    pub fn exists(&self, entity: EntityId) -> bool {
        self.entities.contains_key(&entity)
    }

    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys().copied()
    }

    #[must_use]
    pub fn components(&self, entity: EntityId) -> Option<&ComponentSet> {
        self.entities.get(&entity)
    }

    /// Borrow a typed component of an entity.
    #[must_use]
    pub fn get<T: ComponentType>(&self, entity: EntityId) -> Option<&T> {
        self.entities.get(&entity)?.get::<T>()
    }

    #[must_use]
    pub fn has<T: ComponentType>(&self, entity: EntityId) -> bool {
        self.entities.get(&entity).is_some_and(ComponentSet::has::<T>)
    }

    /// Insert or replace a component on an existing entity.
    pub fn insert_component<T: ComponentType>(&mut self, entity: EntityId, value: T) -> Result<()> {
        let set = self
            .entities
            .get_mut(&entity)
            .ok_or(EngineError::EntityNotFound(entity))?;
        set.insert(value);
        Ok(())
    }

    /// Remove a component; missing entities or components are a no-op.
    pub fn remove_component<T: ComponentType>(&mut self, entity: EntityId) -> Option<T> {
        self.entities.get_mut(&entity)?.remove::<T>()
    }

    /// Owner of an entity. Players own themselves.
    #[must_use]
    pub fn owner_of(&self, entity: EntityId) -> Option<PlayerId> {
        if let Some(player) = self.as_player(entity) {
            return Some(player);
        }
        self.get::<OwnerComponent>(entity).map(|o| o.0)
    }

    /// Controller before continuous effects: explicit controller, else owner.
    #[must_use]
    pub fn base_controller_of(&self, entity: EntityId) -> Option<PlayerId> {
        self.get::<ControllerComponent>(entity)
            .map(|c| c.0)
            .or_else(|| self.owner_of(entity))
    }

    fn alloc_entity(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        id
    }

    /// Instantiate a catalog card into a zone owned by `owner`.
    pub fn spawn_card(
        &mut self,
        definition: &CardDefinition,
        owner: PlayerId,
        kind: ZoneKind,
    ) -> Result<EntityId> {
        self.spawn_object(definition.to_component(), owner, kind, false)
    }

    /// Look `id` up in the catalog and instantiate it.
    pub fn spawn_from_registry(
        &mut self,
        registry: &CardRegistry,
        id: CardId,
        owner: PlayerId,
        kind: ZoneKind,
    ) -> Result<EntityId> {
        let definition = registry.require(id)?;
        self.spawn_card(definition, owner, kind)
    }

    /// Instantiate an object from an explicit card component.
    pub fn spawn_object(
        &mut self,
        card: CardComponent,
        owner: PlayerId,
        kind: ZoneKind,
        token: bool,
    ) -> Result<EntityId> {
        let id = self.alloc_entity();
        let mut set = ComponentSet::new().with(card).with(OwnerComponent(owner));
        if token {
            set.insert(TokenComponent);
        }
        self.entities.insert(id, set);
        self.zones.add(id, ZoneKey::new(owner, kind), ZonePosition::Top)?;
        if kind == ZoneKind::Battlefield {
            self.enter_battlefield(id, owner)?;
        }
        Ok(id)
    }

    fn enter_battlefield(&mut self, entity: EntityId, controller: PlayerId) -> Result<()> {
        let timestamp = self.next_timestamp();
        let turn = self.turn.turn_number;
        self.insert_component(entity, EnteredBattlefieldComponent { turn, timestamp })?;
        self.insert_component(entity, ControllerComponent(controller))
    }

    fn leave_battlefield(&mut self, entity: EntityId) {
        self.remove_component::<TappedComponent>(entity);
        self.remove_component::<EnteredBattlefieldComponent>(entity);
        self.remove_component::<AttackingComponent>(entity);
        self.remove_component::<BlockingComponent>(entity);
        self.remove_component::<BlockedComponent>(entity);
        self.remove_component::<CountersComponent>(entity);
        self.remove_component::<DamageComponent>(entity);
        self.remove_component::<AttachedToComponent>(entity);
        self.remove_component::<ControllerComponent>(entity);

        // A permanent that changes zones is a new object; floating effects
        // captured against the old object no longer apply to it.
        let mut kept = Vector::new();
        for mut effect in self.floating_effects.iter().cloned() {
            if effect.affected.remove(&entity) && effect.affected.is_empty() {
                continue;
            }
            kept.push_back(effect);
        }
        self.floating_effects = kept;
    }

    // === Zones ===

    #[must_use]
    pub fn zone_of(&self, entity: EntityId) -> Option<ZoneKey> {
        self.zones.zone_of(entity)
    }

    #[must_use]
    pub fn is_on_battlefield(&self, entity: EntityId) -> bool {
        self.zones.is_in_kind(entity, ZoneKind::Battlefield)
    }

    /// Every permanent on the battlefield, owners in seat order.
    #[must_use]
    pub fn battlefield(&self) -> Vec<EntityId> {
        self.zones.all_of_kind(ZoneKind::Battlefield)
    }

    /// Contents of one player's zone, bottom first.
    #[must_use]
    pub fn zone(&self, owner: PlayerId, kind: ZoneKind) -> Vec<EntityId> {
        self.zones.contents(ZoneKey::new(owner, kind)).collect()
    }

    #[must_use]
    pub fn hand(&self, player: PlayerId) -> Vec<EntityId> {
        self.zone(player, ZoneKind::Hand)
    }

    #[must_use]
    pub fn graveyard(&self, player: PlayerId) -> Vec<EntityId> {
        self.zone(player, ZoneKind::Graveyard)
    }

    #[must_use]
    pub fn library(&self, player: PlayerId) -> Vec<EntityId> {
        self.zone(player, ZoneKind::Library)
    }

    /// Move an entity to a zone, applying the bookkeeping of leaving and
    /// entering the battlefield.
    ///
    /// Tokens that leave the battlefield cease to exist. Returns the zone the
    /// entity came from.
    pub fn move_entity(
        &mut self,
        entity: EntityId,
        to: ZoneKey,
        position: ZonePosition,
        controller_on_entry: Option<PlayerId>,
    ) -> Result<ZoneKey> {
        let from = self
            .zones
            .zone_of(entity)
            .ok_or(EngineError::EntityNotFound(entity))?;
        self.zones.move_to(entity, to, position)?;

        let left = from.kind == ZoneKind::Battlefield && to.kind != ZoneKind::Battlefield;
        let entered = from.kind != ZoneKind::Battlefield && to.kind == ZoneKind::Battlefield;
        if left {
            self.leave_battlefield(entity);
            if self.has::<TokenComponent>(entity) {
                self.zones.remove(entity);
                self.entities.remove(&entity);
            }
        } else if entered {
            let controller = controller_on_entry.unwrap_or(to.owner);
            self.enter_battlefield(entity, controller)?;
        }
        Ok(from)
    }

    /// Shuffle one player's library with the game RNG.
    pub fn shuffle_library(&mut self, player: PlayerId) {
        self.zones.shuffle(ZoneKey::library(player), &mut self.rng);
    }

    // === Floating effects ===

    pub fn floating_effects(&self) -> impl Iterator<Item = &ActiveFloatingEffect> {
        self.floating_effects.iter()
    }

    #[must_use]
    pub fn floating_effect(&self, id: FloatingEffectId) -> Option<&ActiveFloatingEffect> {
        self.floating_effects.iter().find(|e| e.id == id)
    }

    /// Register a new floating effect, stamping id, timestamp and turn.
    pub fn add_floating_effect(
        &mut self,
        modification: FloatingModification,
        affected: impl IntoIterator<Item = EntityId>,
        duration: Duration,
        source: Option<EntityId>,
        controller: PlayerId,
    ) -> FloatingEffectId {
        let id = FloatingEffectId(self.next_floating_id);
        self.next_floating_id += 1;
        let timestamp = self.next_timestamp();
        self.floating_effects.push_back(ActiveFloatingEffect {
            id,
            modification,
            affected: affected.into_iter().collect(),
            duration,
            source,
            controller,
            timestamp,
            created_turn: self.turn.turn_number,
        });
        id
    }

    pub fn remove_floating_effect(&mut self, id: FloatingEffectId) -> Option<ActiveFloatingEffect> {
        let index = self.floating_effects.iter().position(|e| e.id == id)?;
        Some(self.floating_effects.remove(index))
    }

    /// Keep effects for which `keep` returns true; returns the removed ones.
    pub fn retain_floating_effects(
        &mut self,
        mut keep: impl FnMut(&ActiveFloatingEffect) -> bool,
    ) -> Vec<ActiveFloatingEffect> {
        let mut kept = Vector::new();
        let mut removed = Vec::new();
        for effect in self.floating_effects.iter().cloned() {
            if keep(&effect) {
                kept.push_back(effect);
            } else {
                removed.push(effect);
            }
        }
        self.floating_effects = kept;
        removed
    }

    /// Rewrite every floating effect in place (duration countdowns).
    pub fn update_floating_effects(&mut self, mut update: impl FnMut(&mut ActiveFloatingEffect)) {
        let mut updated = Vector::new();
        for mut effect in self.floating_effects.iter().cloned() {
            update(&mut effect);
            updated.push_back(effect);
        }
        self.floating_effects = updated;
    }

    /// Allocate the next timestamp.
    pub fn next_timestamp(&mut self) -> u64 {
        let ts = self.next_timestamp;
        self.next_timestamp += 1;
        ts
    }

    // === Continuations ===

    pub fn push_continuation(&mut self, frame: ContinuationFrame) {
        self.continuations.push_back(frame);
    }

    pub fn pop_continuation(&mut self) -> Option<ContinuationFrame> {
        self.continuations.pop_back()
    }

    #[must_use]
    pub fn peek_continuation(&self) -> Option<&ContinuationFrame> {
        self.continuations.back()
    }

    /// Insert a frame at `depth`, beneath every frame pushed since.
    ///
    /// A composite whose sub-effect paused parks its remaining work here, so
    /// it runs after whatever the nested effect left on the stack.
    pub fn insert_continuation_at(&mut self, depth: usize, frame: ContinuationFrame) {
        let depth = depth.min(self.continuations.len());
        self.continuations.insert(depth, frame);
    }

    #[must_use]
    pub fn continuation_depth(&self) -> usize {
        self.continuations.len()
    }

    /// Frames bottom to top.
    pub fn continuations(&self) -> impl Iterator<Item = &ContinuationFrame> {
        self.continuations.iter()
    }

    // === Pending decision ===

    #[must_use]
    pub fn pending_decision(&self) -> Option<&PendingDecision> {
        self.pending_decision.as_ref()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.pending_decision.is_some()
    }

    pub fn set_pending_decision(&mut self, decision: PendingDecision) {
        self.pending_decision = Some(decision);
    }

    pub fn take_pending_decision(&mut self) -> Option<PendingDecision> {
        self.pending_decision.take()
    }

    /// Allocate a fresh decision id. Ids are never reused within a game.
    pub fn allocate_decision_id(&mut self) -> DecisionId {
        let id = DecisionId::new(self.next_decision_id);
        self.next_decision_id += 1;
        id
    }

    // === Invariants & persistence ===

    /// Verify the structural invariants of the snapshot.
    pub fn check_invariants(&self) -> Result<()> {
        self.zones.check_consistency()?;

        let mut seen = Vec::new();
        for frame in &self.continuations {
            if let Some(id) = frame.decision_id {
                if seen.contains(&id) {
                    return Err(EngineError::InvariantViolated(format!(
                        "{id} appears on more than one continuation frame"
                    )));
                }
                seen.push(id);
            }
        }

        if let Some(decision) = &self.pending_decision {
            let top = self.continuations.back().and_then(|f| f.decision_id);
            if top != Some(decision.id) {
                return Err(EngineError::InvariantViolated(format!(
                    "pending {} has no matching top continuation frame",
                    decision.id
                )));
            }
        }
        Ok(())
    }

    /// Serialize the full snapshot, continuations and pending decision included.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    /// Restore a snapshot written by [`GameState::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let state: Self = bincode::deserialize(bytes)?;
        state.check_invariants()?;
        Ok(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layers::Modification;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn bears() -> CardDefinition {
        CardDefinition::creature(CardId::new(1), "Grizzly Bears", 2, 2)
    }

    #[test]
    fn test_new_state() {
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        assert_eq!(state.player_count(), 2);
        assert_eq!(state.life(P0), 20);
        assert_eq!(state.life(P1), 20);
        assert!(!state.is_paused());
        assert_eq!(state.turn.turn_number, 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        assert!(GameState::new(&GameConfig::new(0)).is_err());
    }

    #[test]
    fn test_spawn_on_battlefield_sets_components() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let bear = state.spawn_card(&bears(), P1, ZoneKind::Battlefield).unwrap();

        assert_eq!(bear, EntityId(2));
        assert!(state.is_on_battlefield(bear));
        assert_eq!(state.base_controller_of(bear), Some(P1));
        assert!(state.has::<EnteredBattlefieldComponent>(bear));
        assert_eq!(state.owner_of(bear), Some(P1));
    }

    #[test]
    fn test_spawn_from_registry() {
        let mut registry = CardRegistry::new();
        registry.register(bears()).unwrap();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();

        let bear = state
            .spawn_from_registry(&registry, CardId::new(1), P0, ZoneKind::Hand)
            .unwrap();
        assert_eq!(state.hand(P0), vec![bear]);

        let unknown = state.spawn_from_registry(&registry, CardId::new(99), P0, ZoneKind::Hand);
        assert!(matches!(unknown, Err(EngineError::InvalidConfig(_))));
        assert_eq!(state.hand(P0).len(), 1);
    }

    #[test]
    fn test_move_off_battlefield_strips_permanent_state() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let bear = state.spawn_card(&bears(), P0, ZoneKind::Battlefield).unwrap();
        state.insert_component(bear, TappedComponent).unwrap();
        state.add_floating_effect(
            FloatingModification::new(Modification::ModifyPowerToughness { power: 1, toughness: 1 }),
            [bear],
            Duration::EndOfTurn,
            None,
            P0,
        );

        let from = state
            .move_entity(bear, ZoneKey::graveyard(P0), ZonePosition::Top, None)
            .unwrap();

        assert_eq!(from, ZoneKey::battlefield(P0));
        assert!(!state.has::<TappedComponent>(bear));
        assert!(!state.has::<ControllerComponent>(bear));
        assert_eq!(state.floating_effects().count(), 0);
        assert_eq!(state.graveyard(P0), vec![bear]);
    }

    #[test]
    fn test_tokens_cease_to_exist_off_battlefield() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let token = state
            .spawn_object(bears().to_component(), P0, ZoneKind::Battlefield, true)
            .unwrap();
        state
            .move_entity(token, ZoneKey::graveyard(P0), ZonePosition::Top, None)
            .unwrap();

        assert!(!state.exists(token));
        assert!(state.graveyard(P0).is_empty());
        assert!(state.check_invariants().is_ok());
    }

    #[test]
    fn test_clone_is_independent() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let snapshot = state.clone();
        state.set_life(P0, 5).unwrap();

        assert_eq!(snapshot.life(P0), 20);
        assert_eq!(state.life(P0), 5);
    }

    #[test]
    fn test_timestamps_increase() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let a = state.next_timestamp();
        let b = state.next_timestamp();
        assert!(b > a);
    }

    #[test]
    fn test_bytes_round_trip() {
        let mut state = GameState::new(&GameConfig::new(3).with_seed(11)).unwrap();
        state.spawn_card(&bears(), P1, ZoneKind::Hand).unwrap();
        let bytes = state.to_bytes().unwrap();
        let restored = GameState::from_bytes(&bytes).unwrap();
        assert_eq!(state, restored);
    }
}
