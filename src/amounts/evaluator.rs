//! Recursive evaluation of amounts, selectors and conditions.

use tracing::warn;

use super::amount::{DynamicAmount, EntityReference, PlayerSelector};
use super::condition::Condition;
use crate::components::CountersComponent;
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::EffectContext;
use crate::filters::PredicateEvaluator;
use crate::layers::ProjectedState;
use crate::zones::ZoneKind;

/// Evaluates dynamic amounts against a state and an effect context.
///
/// Evaluation never fails: references that do not resolve contribute 0
/// (amounts) or nobody (selectors).
#[derive(Clone, Copy, Debug)]
pub struct AmountEvaluator<'a> {
    predicates: PredicateEvaluator<'a>,
}

impl<'a> AmountEvaluator<'a> {
    #[must_use]
    pub fn new(state: &'a GameState) -> Self {
        Self {
            predicates: PredicateEvaluator::new(state),
        }
    }

    #[must_use]
    pub fn with_projection(state: &'a GameState, projection: &'a ProjectedState) -> Self {
        Self {
            predicates: PredicateEvaluator::with_projection(state, projection),
        }
    }

    fn state(&self) -> &'a GameState {
        self.predicates.state()
    }

    // === References ===

    #[must_use]
    pub fn resolve_entity(&self, reference: EntityReference, ctx: &EffectContext) -> Option<EntityId> {
        match reference {
            EntityReference::Source => ctx.source,
            EntityReference::Target(i) => ctx.target(i),
            EntityReference::Sacrificed(i) => ctx.sacrificed.get(i).copied(),
            EntityReference::Triggering => ctx.triggering_entity,
            EntityReference::Fixed(e) => Some(e),
        }
    }

    /// Controller of an entity: the projected controller on the battlefield,
    /// the owner anywhere else. Players control themselves.
    #[must_use]
    pub fn controller_of(&self, entity: EntityId) -> Option<PlayerId> {
        let state = self.state();
        if let Some(player) = state.as_player(entity) {
            return Some(player);
        }
        if state.is_on_battlefield(entity) {
            self.predicates
                .characteristics(entity)
                .and_then(|c| c.controller)
        } else {
            state.owner_of(entity)
        }
    }

    /// Players picked by a selector, in turn order from the active player.
    #[must_use]
    pub fn resolve_players(&self, selector: PlayerSelector, ctx: &EffectContext) -> Vec<PlayerId> {
        let state = self.state();
        let count = state.player_count();
        let single = |p: Option<PlayerId>| p.into_iter().collect::<Vec<_>>();
        match selector {
            PlayerSelector::You => vec![ctx.controller],
            PlayerSelector::Opponent => {
                let fallback = (count > 1).then(|| ctx.controller.next(count));
                single(ctx.opponent.or(fallback))
            }
            PlayerSelector::EachOpponent => state
                .apnap_order()
                .into_iter()
                .filter(|p| *p != ctx.controller)
                .collect(),
            PlayerSelector::EachPlayer => state.apnap_order(),
            PlayerSelector::ActivePlayer => vec![state.turn.active_player],
            PlayerSelector::TargetPlayer(i) => {
                single(ctx.target(i).and_then(|e| state.as_player(e)))
            }
            PlayerSelector::TriggeringPlayer => single(ctx.triggering_player),
            PlayerSelector::ControllerOf(r) => {
                single(self.resolve_entity(r, ctx).and_then(|e| self.controller_of(e)))
            }
            PlayerSelector::OwnerOf(r) => {
                single(self.resolve_entity(r, ctx).and_then(|e| state.owner_of(e)))
            }
            PlayerSelector::Specific(p) => single((p.index() < count).then_some(p)),
        }
    }

    // === Amounts ===

    /// Evaluate an amount.
    #[must_use]
    pub fn evaluate(&self, amount: &DynamicAmount, ctx: &EffectContext) -> i32 {
        let state = self.state();
        match amount {
            DynamicAmount::Fixed(n) => *n,
            DynamicAmount::X => ctx.x_value,
            DynamicAmount::LifeTotal(sel) => self
                .resolve_players(*sel, ctx)
                .into_iter()
                .map(|p| state.life(p))
                .fold(0, i32::saturating_add),

            DynamicAmount::Add(a, b) => self.evaluate(a, ctx).saturating_add(self.evaluate(b, ctx)),
            DynamicAmount::Subtract(a, b) => {
                self.evaluate(a, ctx).saturating_sub(self.evaluate(b, ctx))
            }
            DynamicAmount::Multiply(a, k) => self.evaluate(a, ctx).saturating_mul(*k),
            DynamicAmount::Max(a, b) => self.evaluate(a, ctx).max(self.evaluate(b, ctx)),
            DynamicAmount::Min(a, b) => self.evaluate(a, ctx).min(self.evaluate(b, ctx)),
            DynamicAmount::NonNegative(a) => self.evaluate(a, ctx).max(0),
            DynamicAmount::Conditional {
                condition,
                then,
                otherwise,
            } => {
                if self.check(condition, ctx) {
                    self.evaluate(then, ctx)
                } else {
                    self.evaluate(otherwise, ctx)
                }
            }

            DynamicAmount::PowerOf(r) => self
                .resolve_entity(*r, ctx)
                .and_then(|e| self.predicates.characteristics(e))
                .and_then(|c| c.power)
                .unwrap_or(0),
            DynamicAmount::ToughnessOf(r) => self
                .resolve_entity(*r, ctx)
                .and_then(|e| self.predicates.characteristics(e))
                .and_then(|c| c.toughness)
                .unwrap_or(0),
            DynamicAmount::ManaValueOf(r) => self
                .resolve_entity(*r, ctx)
                .and_then(|e| self.predicates.characteristics(e))
                .map_or(0, |c| i32::try_from(c.mana_value).unwrap_or(i32::MAX)),
            DynamicAmount::CountersOn { entity, kind } => self
                .resolve_entity(*entity, ctx)
                .and_then(|e| state.get::<CountersComponent>(e))
                .map_or(0, |c| i32::try_from(c.count(kind)).unwrap_or(i32::MAX)),

            DynamicAmount::Count {
                player,
                zone,
                filter,
            } => {
                let fctx = ctx.filter_context();
                let mut total = 0usize;
                for p in self.resolve_players(*player, ctx) {
                    let candidates: Vec<EntityId> = if *zone == ZoneKind::Battlefield {
                        state
                            .battlefield()
                            .into_iter()
                            .filter(|e| self.controller_of(*e) == Some(p))
                            .collect()
                    } else {
                        state.zone(p, *zone)
                    };
                    total += self.predicates.select(filter, candidates, &fctx).len();
                }
                i32::try_from(total).unwrap_or(i32::MAX)
            }
            DynamicAmount::CardsInHand(sel) => {
                let total: usize = self
                    .resolve_players(*sel, ctx)
                    .into_iter()
                    .map(|p| state.hand(p).len())
                    .sum();
                i32::try_from(total).unwrap_or(i32::MAX)
            }

            DynamicAmount::DamageDealtThisTurn(r) => {
                warn!(reference = ?r, "damage-history amount is not tracked; evaluating to 0");
                0
            }
        }
    }

    /// Evaluate and clamp at zero, for counts of things.
    #[must_use]
    pub fn evaluate_count(&self, amount: &DynamicAmount, ctx: &EffectContext) -> u32 {
        u32::try_from(self.evaluate(amount, ctx).max(0)).unwrap_or(0)
    }

    // === Conditions ===

    #[must_use]
    pub fn check(&self, condition: &Condition, ctx: &EffectContext) -> bool {
        let state = self.state();
        match condition {
            Condition::All(cs) => cs.iter().all(|c| self.check(c, ctx)),
            Condition::Any(cs) => cs.iter().any(|c| self.check(c, ctx)),
            Condition::Not(c) => !self.check(c, ctx),
            Condition::Compare { left, op, right } => {
                op.apply(self.evaluate(left, ctx), self.evaluate(right, ctx))
            }
            Condition::LifeAtLeast { player, amount } => {
                let players = self.resolve_players(*player, ctx);
                !players.is_empty() && players.iter().all(|p| state.life(*p) >= *amount)
            }
            Condition::ControlsMatching {
                player,
                filter,
                count,
            } => {
                let amount = DynamicAmount::Count {
                    player: *player,
                    zone: ZoneKind::Battlefield,
                    filter: filter.clone(),
                };
                self.evaluate_count(&amount, ctx) >= *count
            }
            Condition::SourceOnBattlefield => {
                ctx.source.is_some_and(|s| state.is_on_battlefield(s))
            }
            Condition::TargetOnBattlefield(i) => ctx
                .target(*i)
                .is_some_and(|t| state.as_player(t).is_some() || state.is_on_battlefield(t)),
            Condition::XAtLeast(n) => ctx.x_value >= *n,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::CompareOp;
    use crate::cards::{CardDefinition, CardId};
    use crate::components::{CounterKind, Keyword};
    use crate::core::{EngineConfig, GameConfig};
    use crate::effects::Effect;
    use crate::filters::ObjectFilter;
    use crate::layers::Duration;
    use crate::rules::RulesEngine;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);
    const P2: PlayerId = PlayerId::new(2);

    fn three_player() -> GameState {
        GameState::new(&GameConfig::new(3)).unwrap()
    }

    fn elf() -> CardDefinition {
        CardDefinition::creature(CardId::new(1), "Elf", 1, 1).with_subtype("Elf")
    }

    #[test]
    fn test_arithmetic() {
        let state = three_player();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_x(4);

        let amount = DynamicAmount::X.plus(DynamicAmount::fixed(2)).times(3);
        assert_eq!(eval.evaluate(&amount, &ctx), 18);

        let negative = DynamicAmount::fixed(1).minus(DynamicAmount::X);
        assert_eq!(eval.evaluate(&negative, &ctx), -3);
        assert_eq!(eval.evaluate(&negative.non_negative(), &ctx), 0);

        let max = DynamicAmount::Max(Box::new(DynamicAmount::X), Box::new(DynamicAmount::fixed(9)));
        assert_eq!(eval.evaluate(&max, &ctx), 9);
    }

    #[test]
    fn test_player_selectors() {
        let mut state = three_player();
        state.turn.active_player = P1;
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_target(EntityId::player(P2));

        assert_eq!(eval.resolve_players(PlayerSelector::EachPlayer, &ctx), vec![P1, P2, P0]);
        assert_eq!(eval.resolve_players(PlayerSelector::EachOpponent, &ctx), vec![P1, P2]);
        assert_eq!(eval.resolve_players(PlayerSelector::Opponent, &ctx), vec![P1]);
        assert_eq!(eval.resolve_players(PlayerSelector::TargetPlayer(0), &ctx), vec![P2]);
        assert!(eval.resolve_players(PlayerSelector::TargetPlayer(5), &ctx).is_empty());
        assert!(eval.resolve_players(PlayerSelector::TriggeringPlayer, &ctx).is_empty());
        assert_eq!(eval.resolve_players(PlayerSelector::ActivePlayer, &ctx), vec![P1]);
    }

    #[test]
    fn test_owner_of() {
        let mut state = three_player();
        let elf = state.spawn_card(&elf(), P2, ZoneKind::Battlefield).unwrap();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_target(elf);

        assert_eq!(
            eval.resolve_players(PlayerSelector::OwnerOf(EntityReference::Target(0)), &ctx),
            vec![P2]
        );
        assert_eq!(
            eval.resolve_players(PlayerSelector::OwnerOf(EntityReference::Source), &ctx),
            Vec::<PlayerId>::new()
        );
    }

    /// A stolen permanent answers to its new controller while it stays on
    /// the battlefield.
    #[test]
    fn test_controller_of_follows_control_change() {
        let engine = RulesEngine::new(EngineConfig::default()).unwrap();
        let mut state = three_player();
        let elf = state.spawn_card(&elf(), P2, ZoneKind::Battlefield).unwrap();
        let steal = Effect::GainControl {
            target: EntityReference::Target(0),
            duration: Duration::EndOfTurn,
        };
        let ctx = EffectContext::new(P0).with_target(elf);
        let stolen = engine.execute(&state, &steal, &ctx).into_state();

        let projection = engine.project(&stolen);
        let eval = AmountEvaluator::with_projection(&stolen, &projection);
        let controller = PlayerSelector::ControllerOf(EntityReference::Target(0));
        assert_eq!(eval.resolve_players(controller, &ctx), vec![P0]);
        assert_eq!(
            eval.resolve_players(PlayerSelector::OwnerOf(EntityReference::Target(0)), &ctx),
            vec![P2]
        );
    }

    #[test]
    fn test_unbound_reference_selects_nobody() {
        let state = three_player();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0);

        assert!(eval
            .resolve_players(PlayerSelector::ControllerOf(EntityReference::Target(3)), &ctx)
            .is_empty());
        assert!(eval
            .resolve_players(PlayerSelector::OwnerOf(EntityReference::Target(3)), &ctx)
            .is_empty());
    }

    #[test]
    fn test_controller_of_falls_back_to_owner() {
        let mut state = three_player();
        let in_hand = state.spawn_card(&elf(), P2, ZoneKind::Hand).unwrap();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_target(in_hand);

        assert_eq!(
            eval.resolve_players(PlayerSelector::ControllerOf(EntityReference::Target(0)), &ctx),
            vec![P2]
        );
    }

    #[test]
    fn test_counting() {
        let mut state = three_player();
        for _ in 0..3 {
            state.spawn_card(&elf(), P0, ZoneKind::Battlefield).unwrap();
        }
        state.spawn_card(&elf(), P1, ZoneKind::Battlefield).unwrap();
        state.spawn_card(&elf(), P1, ZoneKind::Graveyard).unwrap();
        state.spawn_card(&elf(), P0, ZoneKind::Hand).unwrap();

        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0);
        let elves = ObjectFilter::creature().with_subtype("Elf");

        assert_eq!(eval.evaluate(&DynamicAmount::count_you_control(elves.clone()), &ctx), 3);
        let all_graveyards = DynamicAmount::Count {
            player: PlayerSelector::EachPlayer,
            zone: ZoneKind::Graveyard,
            filter: elves,
        };
        assert_eq!(eval.evaluate(&all_graveyards, &ctx), 1);
        assert_eq!(eval.evaluate(&DynamicAmount::CardsInHand(PlayerSelector::You), &ctx), 1);
    }

    #[test]
    fn test_characteristics_and_counters() {
        let mut state = three_player();
        let drake = state
            .spawn_card(
                &CardDefinition::creature(CardId::new(2), "Drake", 2, 3)
                    .with_keyword(Keyword::Flying)
                    .with_mana_value(3),
                P0,
                ZoneKind::Battlefield,
            )
            .unwrap();
        state
            .insert_component(drake, CountersComponent::default().added(CounterKind::Charge, 2))
            .unwrap();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_source(drake);

        assert_eq!(eval.evaluate(&DynamicAmount::PowerOf(EntityReference::Source), &ctx), 2);
        assert_eq!(eval.evaluate(&DynamicAmount::ToughnessOf(EntityReference::Source), &ctx), 3);
        assert_eq!(eval.evaluate(&DynamicAmount::ManaValueOf(EntityReference::Source), &ctx), 3);
        let counters = DynamicAmount::CountersOn {
            entity: EntityReference::Source,
            kind: CounterKind::Charge,
        };
        assert_eq!(eval.evaluate(&counters, &ctx), 2);
        assert_eq!(eval.evaluate(&DynamicAmount::PowerOf(EntityReference::Target(0)), &ctx), 0);
    }

    #[test]
    fn test_damage_history_is_zero() {
        let state = three_player();
        let eval = AmountEvaluator::new(&state);
        let amount = DynamicAmount::DamageDealtThisTurn(EntityReference::Source);
        assert_eq!(eval.evaluate(&amount, &EffectContext::new(P0)), 0);
    }

    #[test]
    fn test_conditions() {
        let mut state = three_player();
        state.set_life(P1, 5).unwrap();
        let source = state.spawn_card(&elf(), P0, ZoneKind::Battlefield).unwrap();
        let eval = AmountEvaluator::new(&state);
        let ctx = EffectContext::new(P0).with_source(source).with_x(2);

        assert!(eval.check(&Condition::you_control(ObjectFilter::creature()), &ctx));
        assert!(eval.check(&Condition::SourceOnBattlefield, &ctx));
        assert!(!eval.check(
            &Condition::LifeAtLeast { player: PlayerSelector::EachOpponent, amount: 10 },
            &ctx
        ));
        assert!(!eval.check(
            &Condition::LifeAtLeast { player: PlayerSelector::TriggeringPlayer, amount: 0 },
            &ctx
        ));
        let cmp = Condition::Compare {
            left: DynamicAmount::LifeTotal(PlayerSelector::Specific(P1)),
            op: CompareOp::Lt,
            right: DynamicAmount::X.times(3),
        };
        assert!(eval.check(&cmp, &ctx));
        assert!(eval.check(&Condition::XAtLeast(2).and(cmp.negate()).negate(), &ctx));
        assert!(eval.check(&Condition::always(), &ctx));

        let conditional = DynamicAmount::Conditional {
            condition: Box::new(Condition::XAtLeast(3)),
            then: Box::new(DynamicAmount::fixed(10)),
            otherwise: Box::new(DynamicAmount::fixed(1)),
        };
        assert_eq!(eval.evaluate(&conditional, &ctx), 1);
    }
}
