//! Primitive state changes shared by the executors and resume handlers.
//!
//! Every operation mutates the working state of a `Resolution` and records
//! the matching events. Higher-level rules (indestructible, regeneration,
//! exile-on-death) live here too, so a destroy caused by a resumed choice
//! behaves exactly like one caused by a direct effect.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::effect::TokenSpec;
use super::result::Resolution;
use crate::components::{
    AttackingComponent, BlockedComponent, BlockingComponent, CardComponent, CardType,
    ControllerComponent, CounterKind, CountersComponent, DamageComponent, Keyword, TappedComponent,
};
use crate::core::{EngineError, EntityId, PlayerId, Result};
use crate::events::GameEvent;
use crate::layers::{
    Characteristics, Duration, FloatingEffectId, FloatingModification, Modification,
};
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

impl Resolution {
    // === Lookups ===

    /// Fail unless `entity` exists.
    pub fn require(&self, entity: EntityId) -> Result<()> {
        if self.state.exists(entity) {
            Ok(())
        } else {
            Err(EngineError::EntityNotFound(entity))
        }
    }

    /// Fail unless `entity` is in a zone of `kind`.
    pub fn require_in(&self, entity: EntityId, kind: ZoneKind) -> Result<()> {
        self.require(entity)?;
        if self.state.zones.is_in_kind(entity, kind) {
            Ok(())
        } else {
            Err(EngineError::NotInZone {
                entity,
                expected: kind.to_string(),
            })
        }
    }

    fn owner(&self, entity: EntityId) -> Result<PlayerId> {
        self.state
            .owner_of(entity)
            .ok_or(EngineError::EntityNotFound(entity))
    }

    // === Zone changes ===

    /// Move `entity` to `to`, recording the zone change.
    pub fn move_to(
        &mut self,
        entity: EntityId,
        to: ZoneKey,
        position: ZonePosition,
        controller: Option<PlayerId>,
    ) -> Result<ZoneKey> {
        let from = self.state.move_entity(entity, to, position, controller)?;
        trace!(%entity, %from, %to, "zone change");
        self.emit(GameEvent::ZoneChanged { entity, from, to });
        if !self.state.exists(entity) {
            self.emit(GameEvent::TokenCeasedToExist { entity });
        }
        Ok(from)
    }

    /// Move to a zone of the owner's.
    pub fn move_to_owners(&mut self, entity: EntityId, kind: ZoneKind) -> Result<ZoneKey> {
        let owner = self.owner(entity)?;
        self.move_to(entity, ZoneKey::new(owner, kind), ZonePosition::Top, None)
    }

    /// Put a card onto the battlefield under `controller` (its owner if `None`).
    pub fn put_onto_battlefield(
        &mut self,
        entity: EntityId,
        controller: Option<PlayerId>,
        tapped: bool,
    ) -> Result<()> {
        let owner = self.owner(entity)?;
        self.move_to(entity, ZoneKey::battlefield(owner), ZonePosition::Top, controller)?;
        if tapped {
            self.tap(entity)?;
        }
        Ok(())
    }

    /// Draw up to `count` cards. Drawing from an empty library draws nothing.
    pub fn draw(&mut self, player: PlayerId, count: u32) -> Result<Vec<EntityId>> {
        let cards = self.state.zones.top(ZoneKey::library(player), count as usize);
        for card in &cards {
            self.move_to(*card, ZoneKey::hand(player), ZonePosition::Top, None)?;
            self.emit(GameEvent::CardDrawn {
                player,
                entity: *card,
            });
        }
        if cards.len() < count as usize {
            debug!(%player, requested = count, drawn = cards.len(), "library ran out");
        }
        Ok(cards)
    }

    /// Discard specific cards from `player`'s hand.
    pub fn discard(&mut self, player: PlayerId, cards: &[EntityId]) -> Result<()> {
        for card in cards {
            if self.state.zone_of(*card) != Some(ZoneKey::hand(player)) {
                return Err(EngineError::NotInZone {
                    entity: *card,
                    expected: ZoneKey::hand(player).to_string(),
                });
            }
            self.move_to_owners(*card, ZoneKind::Graveyard)?;
            self.emit(GameEvent::CardDiscarded {
                player,
                entity: *card,
            });
        }
        Ok(())
    }

    /// Mill up to `count` cards.
    pub fn mill(&mut self, player: PlayerId, count: u32) -> Result<Vec<EntityId>> {
        let cards = self.state.zones.top(ZoneKey::library(player), count as usize);
        for card in &cards {
            self.move_to_owners(*card, ZoneKind::Graveyard)?;
        }
        Ok(cards)
    }

    pub fn shuffle_library(&mut self, player: PlayerId) {
        self.state.shuffle_library(player);
        self.emit(GameEvent::LibraryShuffled { player });
    }

    // === Removal ===

    /// Destroy a permanent, honoring indestructible, regeneration shields and
    /// exile-on-death. `chars` are its projected characteristics.
    ///
    /// Returns whether the permanent left the battlefield.
    pub fn destroy(&mut self, entity: EntityId, chars: &Characteristics) -> Result<bool> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        if chars.has_keyword(Keyword::Indestructible) {
            debug!(%entity, "indestructible; destroy has no effect");
            return Ok(false);
        }
        if chars.regeneration_shields > 0 {
            self.regenerate(entity)?;
            return Ok(false);
        }
        self.emit(GameEvent::Destroyed { entity });
        self.dies(entity, chars)?;
        Ok(true)
    }

    /// Move a permanent from the battlefield to its owner's graveyard, or to
    /// exile when it carries an exile-on-death marker.
    pub fn dies(&mut self, entity: EntityId, chars: &Characteristics) -> Result<()> {
        let kind = if chars.exile_on_death {
            ZoneKind::Exile
        } else {
            ZoneKind::Graveyard
        };
        self.move_to_owners(entity, kind)?;
        Ok(())
    }

    /// Consume the oldest regeneration shield: tap, clear damage, remove
    /// from combat.
    fn regenerate(&mut self, entity: EntityId) -> Result<()> {
        let shield = self
            .state
            .floating_effects()
            .filter(|e| {
                e.modification.modification == Modification::RegenerationShield
                    && e.affected.contains(&entity)
            })
            .min_by_key(|e| e.timestamp)
            .map(|e| e.id);
        if let Some(id) = shield {
            self.state.remove_floating_effect(id);
            self.emit(GameEvent::FloatingEffectExpired { id });
        }
        self.tap(entity)?;
        self.state.remove_component::<DamageComponent>(entity);
        self.state.remove_component::<AttackingComponent>(entity);
        self.state.remove_component::<BlockingComponent>(entity);
        self.state.remove_component::<BlockedComponent>(entity);
        debug!(%entity, "regenerated");
        self.emit(GameEvent::Regenerated { entity });
        Ok(())
    }

    /// Sacrifice a permanent `player` controls.
    pub fn sacrifice(
        &mut self,
        player: PlayerId,
        entity: EntityId,
        chars: &Characteristics,
    ) -> Result<()> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        if chars.controller != Some(player) {
            return Err(EngineError::InvalidTarget(format!(
                "{player} cannot sacrifice {entity}, which they do not control"
            )));
        }
        self.emit(GameEvent::Sacrificed { player, entity });
        self.dies(entity, chars)
    }

    // === Permanent state ===

    /// Tap; tapping a tapped permanent does nothing.
    pub fn tap(&mut self, entity: EntityId) -> Result<()> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        if !self.state.has::<TappedComponent>(entity) {
            self.state.insert_component(entity, TappedComponent)?;
            self.emit(GameEvent::Tapped { entity });
        }
        Ok(())
    }

    pub fn untap(&mut self, entity: EntityId) -> Result<()> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        if self.state.remove_component::<TappedComponent>(entity).is_some() {
            self.emit(GameEvent::Untapped { entity });
        }
        Ok(())
    }

    pub fn add_counters(&mut self, entity: EntityId, kind: CounterKind, amount: u32) -> Result<()> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        if amount == 0 {
            return Ok(());
        }
        let counters = self
            .state
            .get::<CountersComponent>(entity)
            .cloned()
            .unwrap_or_default()
            .added(kind.clone(), amount);
        self.state.insert_component(entity, counters)?;
        self.emit(GameEvent::CountersAdded {
            entity,
            kind,
            amount,
        });
        Ok(())
    }

    /// Remove up to `amount` counters; returns how many were removed.
    pub fn remove_counters(&mut self, entity: EntityId, kind: CounterKind, amount: u32) -> Result<u32> {
        self.require_in(entity, ZoneKind::Battlefield)?;
        let Some(counters) = self.state.get::<CountersComponent>(entity).cloned() else {
            return Ok(0);
        };
        let (counters, removed) = counters.removed(&kind, amount);
        if counters.is_empty() {
            self.state.remove_component::<CountersComponent>(entity);
        } else {
            self.state.insert_component(entity, counters)?;
        }
        if removed > 0 {
            self.emit(GameEvent::CountersRemoved {
                entity,
                kind,
                amount: removed,
            });
        }
        Ok(removed)
    }

    // === Damage & life ===

    /// Set a player's life total to `old + delta`.
    pub fn change_life(&mut self, player: PlayerId, delta: i32) -> Result<()> {
        if delta == 0 {
            return Ok(());
        }
        let old = self.state.life(player);
        let new = old.saturating_add(delta);
        self.state.set_life(player, new)?;
        self.emit(GameEvent::LifeChanged { player, old, new });
        Ok(())
    }

    /// Deal damage to a player, creature or planeswalker.
    ///
    /// Players lose that much life, creatures have it marked, planeswalkers
    /// lose loyalty. Lethal damage is left for state-based actions.
    pub fn deal_damage(
        &mut self,
        source: Option<EntityId>,
        target: EntityId,
        amount: i32,
        chars: Option<&Characteristics>,
    ) -> Result<()> {
        if amount <= 0 {
            return Ok(());
        }
        if let Some(player) = self.state.as_player(target) {
            self.emit(GameEvent::DamageDealt {
                source,
                target,
                amount,
            });
            return self.change_life(player, -amount);
        }

        self.require_in(target, ZoneKind::Battlefield)?;
        let chars = chars.ok_or(EngineError::EntityNotFound(target))?;
        if !chars.is(CardType::Creature) && !chars.is(CardType::Planeswalker) {
            return Err(EngineError::InvalidTarget(format!(
                "{target} cannot be dealt damage"
            )));
        }
        self.emit(GameEvent::DamageDealt {
            source,
            target,
            amount,
        });
        if chars.is(CardType::Creature) {
            let marked = self
                .state
                .get::<DamageComponent>(target)
                .map_or(0, |d| d.amount);
            self.state.insert_component(
                target,
                DamageComponent {
                    amount: marked.saturating_add(amount),
                },
            )?;
        }
        if chars.is(CardType::Planeswalker) {
            let loyalty = u32::try_from(amount).unwrap_or(0);
            self.remove_counters(target, CounterKind::Loyalty, loyalty)?;
        }
        Ok(())
    }

    // === Floating effects ===

    /// Register a floating effect and record its creation.
    pub fn add_floating(
        &mut self,
        modification: Modification,
        affected: BTreeSet<EntityId>,
        duration: Duration,
        source: Option<EntityId>,
        controller: PlayerId,
    ) -> FloatingEffectId {
        let id = self.state.add_floating_effect(
            FloatingModification::new(modification.clone()),
            affected.iter().copied(),
            duration,
            source,
            controller,
        );
        trace!(%id, ?modification, affected = affected.len(), "floating effect created");
        self.emit(GameEvent::FloatingEffectCreated {
            id,
            modification,
            affected: affected.into_iter().collect(),
        });
        id
    }

    // === Tokens ===

    /// Create a token on the battlefield under `controller`.
    pub fn create_token(&mut self, token: &TokenSpec, controller: PlayerId) -> Result<EntityId> {
        let card = CardComponent {
            definition: None,
            name: token.name.clone(),
            mana_value: 0,
            colors: token.colors,
            supertypes: BTreeSet::new(),
            types: token.types.clone(),
            subtypes: token.subtypes.clone(),
            power: token.power,
            toughness: token.toughness,
            keywords: token.keywords.clone(),
            static_abilities: Vec::new(),
        };
        let entity = self
            .state
            .spawn_object(card, controller, ZoneKind::Battlefield, true)?;
        self.state.insert_component(entity, ControllerComponent(controller))?;
        self.emit(GameEvent::TokenCreated { entity, controller });
        Ok(entity)
    }
}
