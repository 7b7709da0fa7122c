//! Filter evaluation.
//!
//! The evaluator is read-only: it borrows a state (and optionally a
//! projection of it) and answers whether objects match filters. When a
//! projection is supplied, type, keyword and controller changes made by
//! continuous effects are visible to the predicates.

use std::borrow::Cow;

use tracing::warn;

use super::predicate::{CardPredicate, ControllerPredicate, ObjectFilter, StatePredicate};
use crate::components::{
    AttachedToComponent, AttackingComponent, BlockedComponent, BlockingComponent,
    CountersComponent, EnteredBattlefieldComponent, FaceDownComponent, TappedComponent,
    TokenComponent,
};
use crate::core::{EntityId, GameState, PlayerId};
use crate::layers::{Characteristics, ProjectedState};
use crate::zones::ZoneKind;

/// Who is asking: the relation predicates ("you", "target player") are
/// resolved against this.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterContext {
    pub controller: PlayerId,
    pub source: Option<EntityId>,
    /// Chosen targets, for `TargetPlayer(index)` relations.
    pub targets: Vec<EntityId>,
}

impl FilterContext {
    #[must_use]
    pub fn new(controller: PlayerId) -> Self {
        Self {
            controller,
            source: None,
            targets: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: Vec<EntityId>) -> Self {
        self.targets = targets;
        self
    }

    /// The player chosen as target `index`, if that target is a player.
    #[must_use]
    pub fn target_player(&self, state: &GameState, index: usize) -> Option<PlayerId> {
        self.targets
            .get(index)
            .and_then(|e| state.as_player(*e))
    }
}

/// Evaluates filters against a state.
#[derive(Clone, Copy, Debug)]
pub struct PredicateEvaluator<'a> {
    state: &'a GameState,
    projection: Option<&'a ProjectedState>,
}

impl<'a> PredicateEvaluator<'a> {
    /// Evaluate against base (printed) characteristics.
    #[must_use]
    pub fn new(state: &'a GameState) -> Self {
        Self {
            state,
            projection: None,
        }
    }

    /// Evaluate against projected characteristics.
    #[must_use]
    pub fn with_projection(state: &'a GameState, projection: &'a ProjectedState) -> Self {
        Self {
            state,
            projection: Some(projection),
        }
    }

    #[must_use]
    pub fn state(&self) -> &'a GameState {
        self.state
    }

    /// Effective characteristics of an object; projected when available.
    #[must_use]
    pub fn characteristics(&self, entity: EntityId) -> Option<Cow<'a, Characteristics>> {
        if let Some(chars) = self.projection.and_then(|p| p.get(entity)) {
            return Some(Cow::Borrowed(chars));
        }
        Characteristics::base(self.state, entity).map(Cow::Owned)
    }

    /// Whether `entity` matches every axis of `filter`.
    #[must_use]
    pub fn matches(&self, filter: &ObjectFilter, entity: EntityId, ctx: &FilterContext) -> bool {
        if filter.exclude_source && ctx.source == Some(entity) {
            return false;
        }
        let Some(chars) = self.characteristics(entity) else {
            return false;
        };

        filter
            .card_predicates
            .iter()
            .all(|p| self.matches_card(p, &chars, entity))
            && filter
                .state_predicates
                .iter()
                .all(|p| self.matches_state(p, entity))
            && filter
                .controller
                .as_ref()
                .is_none_or(|r| self.matches_controller(r, &chars, ctx))
    }

    /// Keep only the candidates matching `filter`, preserving order.
    pub fn select(
        &self,
        filter: &ObjectFilter,
        candidates: impl IntoIterator<Item = EntityId>,
        ctx: &FilterContext,
    ) -> Vec<EntityId> {
        candidates
            .into_iter()
            .filter(|e| self.matches(filter, *e, ctx))
            .collect()
    }

    /// Battlefield permanents matching `filter`.
    #[must_use]
    pub fn battlefield_matching(&self, filter: &ObjectFilter, ctx: &FilterContext) -> Vec<EntityId> {
        self.select(filter, self.state.battlefield(), ctx)
    }

    // === Axes ===

    pub fn matches_card(
        &self,
        predicate: &CardPredicate,
        chars: &Characteristics,
        entity: EntityId,
    ) -> bool {
        match predicate {
            CardPredicate::IsCardType(t) => chars.is(*t),
            CardPredicate::HasSubtype(s) => chars.subtypes.contains(s),
            CardPredicate::HasSupertype(s) => chars.supertypes.contains(s),
            CardPredicate::HasColor(c) => chars.colors.contains(*c),
            CardPredicate::Colorless => chars.colors.is_colorless(),
            CardPredicate::Multicolored => chars.colors.count() >= 2,
            CardPredicate::ManaValue(cmp) => {
                i32::try_from(chars.mana_value).is_ok_and(|mv| cmp.matches(mv))
            }
            CardPredicate::Power(cmp) => chars.power.is_some_and(|p| cmp.matches(p)),
            CardPredicate::Toughness(cmp) => chars.toughness.is_some_and(|t| cmp.matches(t)),
            CardPredicate::HasKeyword(k) => chars.has_keyword(*k),
            CardPredicate::IsToken => self.state.has::<TokenComponent>(entity),
            CardPredicate::IsNontoken => !self.state.has::<TokenComponent>(entity),
            CardPredicate::NameIs(name) => chars.name == *name,
            CardPredicate::And(all) => all.iter().all(|p| self.matches_card(p, chars, entity)),
            CardPredicate::Or(any) => any.iter().any(|p| self.matches_card(p, chars, entity)),
            CardPredicate::Not(inner) => !self.matches_card(inner, chars, entity),
        }
    }

    pub fn matches_state(&self, predicate: &StatePredicate, entity: EntityId) -> bool {
        let state = self.state;
        match predicate {
            StatePredicate::Tapped => state.has::<TappedComponent>(entity),
            StatePredicate::Untapped => {
                state.zones.is_in_kind(entity, ZoneKind::Battlefield)
                    && !state.has::<TappedComponent>(entity)
            }
            StatePredicate::Attacking => state.has::<AttackingComponent>(entity),
            StatePredicate::Blocking => state.has::<BlockingComponent>(entity),
            StatePredicate::Blocked => state.has::<BlockedComponent>(entity),
            StatePredicate::Unblocked => {
                state.has::<AttackingComponent>(entity) && !state.has::<BlockedComponent>(entity)
            }
            StatePredicate::EnteredThisTurn => state
                .get::<EnteredBattlefieldComponent>(entity)
                .is_some_and(|e| e.turn == state.turn.turn_number),
            StatePredicate::HasCounter(kind) => state
                .get::<CountersComponent>(entity)
                .is_some_and(|c| c.count(kind) > 0),
            StatePredicate::Attached => state.has::<AttachedToComponent>(entity),
            StatePredicate::FaceDown => state.has::<FaceDownComponent>(entity),
            StatePredicate::WasDealtDamageThisTurn | StatePredicate::DealtDamageThisTurn => {
                warn!(?predicate, %entity, "damage-history predicate is not tracked; evaluating to false");
                false
            }
        }
    }

    pub fn matches_controller(
        &self,
        relation: &ControllerPredicate,
        chars: &Characteristics,
        ctx: &FilterContext,
    ) -> bool {
        let you = ctx.controller;
        match relation {
            ControllerPredicate::You => chars.controller == Some(you),
            ControllerPredicate::Opponent => chars.controller.is_some_and(|c| c != you),
            ControllerPredicate::TargetPlayer(index) => ctx
                .target_player(self.state, *index)
                .is_some_and(|p| chars.controller == Some(p)),
            ControllerPredicate::Specific(player) => chars.controller == Some(*player),
            ControllerPredicate::ActivePlayer => {
                chars.controller == Some(self.state.turn.active_player)
            }
            ControllerPredicate::OwnedByYou => chars.owner == Some(you),
            ControllerPredicate::OwnedByOpponent => chars.owner.is_some_and(|o| o != you),
            ControllerPredicate::OwnedByTargetPlayer(index) => ctx
                .target_player(self.state, *index)
                .is_some_and(|p| chars.owner == Some(p)),
        }
    }
}
