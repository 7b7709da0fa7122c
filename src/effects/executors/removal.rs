//! Destroy, exile, bounce and sacrifice.

use tracing::debug;

use super::{count, entity, permanent, players, wrong_kind};
use crate::continuation::{sequence, SequentialChoice};
use crate::core::{EngineError, Result};
use crate::effects::{Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution};
use crate::filters::PredicateEvaluator;
use crate::rules::RulesEngine;
use crate::zones::ZoneKind;

#[derive(Clone, Copy, Debug, Default)]
pub struct RemovalExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::Destroy,
    EffectKind::DestroyAll,
    EffectKind::Exile,
    EffectKind::ReturnToHand,
    EffectKind::Sacrifice,
];

impl EffectExecutor for RemovalExecutor {
    fn name(&self) -> &'static str {
        "removal"
    }

    fn kinds(&self) -> &'static [EffectKind] {
        KINDS
    }

    fn apply(
        &self,
        engine: &RulesEngine,
        res: &mut Resolution,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> Result<Outcome> {
        match effect {
            Effect::Destroy { target } => {
                let (target, chars) = permanent(engine, res, *target, ctx)?;
                res.destroy(target, &chars)?;
            }
            Effect::DestroyAll { filter } => {
                // Everything is destroyed at once, so use one projection.
                let projection = engine.project(&res.state);
                let doomed = PredicateEvaluator::with_projection(&res.state, &projection)
                    .battlefield_matching(filter, &ctx.filter_context());
                debug!(count = doomed.len(), "destroying all matching permanents");
                for victim in doomed {
                    let chars = projection
                        .get(victim)
                        .ok_or(EngineError::EntityNotFound(victim))?;
                    res.destroy(victim, chars)?;
                }
            }
            Effect::Exile { target } => {
                let target = entity(res, *target, ctx)?;
                res.require(target)?;
                if res.state.as_player(target).is_some() {
                    return Err(EngineError::InvalidTarget(format!("{target} is a player")));
                }
                res.move_to_owners(target, ZoneKind::Exile)?;
            }
            Effect::ReturnToHand { target } => {
                let target = entity(res, *target, ctx)?;
                res.require(target)?;
                if res.state.as_player(target).is_some() {
                    return Err(EngineError::InvalidTarget(format!("{target} is a player")));
                }
                if res.state.zones.is_in_kind(target, ZoneKind::Hand) {
                    return Err(EngineError::NotInZone {
                        entity: target,
                        expected: "a zone other than hand".to_string(),
                    });
                }
                res.move_to_owners(target, ZoneKind::Hand)?;
            }
            Effect::Sacrifice {
                player,
                filter,
                count: amount,
            } => {
                let n = count(engine, res, amount, ctx);
                let who = players(engine, res, *player, ctx);
                let choice = SequentialChoice::Sacrifice {
                    filter: filter.clone(),
                    count: n,
                };
                return sequence::begin(engine, res, &who, choice, ctx);
            }
            other => return Err(wrong_kind(self.name(), other)),
        }
        Ok(Outcome::Done)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::{DynamicAmount, EntityReference, PlayerSelector};
    use crate::cards::{CardDefinition, CardId};
    use crate::components::Keyword;
    use crate::core::{EngineConfig, GameConfig, GameState, PlayerId};
    use crate::decisions::DecisionKind;
    use crate::events::GameEvent;
    use crate::filters::ObjectFilter;
    use crate::zones::ZoneKey;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn engine() -> RulesEngine {
        RulesEngine::new(EngineConfig::default()).unwrap()
    }

    fn bear() -> CardDefinition {
        CardDefinition::creature(CardId::new(1), "Bear", 2, 2)
    }

    #[test]
    fn test_destroy_target() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let victim = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let result = RemovalExecutor.execute(
            &engine,
            &state,
            &Effect::destroy_target(),
            &EffectContext::new(P0).with_target(victim),
        );
        assert_eq!(result.state().zone_of(victim), Some(ZoneKey::graveyard(P1)));
        assert_eq!(result.events()[0], GameEvent::Destroyed { entity: victim });
    }

    #[test]
    fn test_destroy_all_spares_indestructible() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let a = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        let b = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let tough = state
            .spawn_card(&bear().with_keyword(Keyword::Indestructible), P1, ZoneKind::Battlefield)
            .unwrap();

        let effect = Effect::DestroyAll {
            filter: ObjectFilter::creature(),
        };
        let result = RemovalExecutor.execute(&engine, &state, &effect, &EffectContext::new(P0));
        let next = result.state();
        assert!(!next.is_on_battlefield(a));
        assert!(!next.is_on_battlefield(b));
        assert!(next.is_on_battlefield(tough));
    }

    #[test]
    fn test_exile_and_bounce() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let a = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let b = state.spawn_card(&bear(), P1, ZoneKind::Graveyard).unwrap();

        let ctx = EffectContext::new(P0).with_targets([a, b]);
        let exiled = RemovalExecutor.execute(&engine, &state, &Effect::Exile { target: EntityReference::Target(1) }, &ctx);
        assert_eq!(exiled.state().zone_of(b), Some(ZoneKey::exile(P1)));

        let bounced = RemovalExecutor.execute(
            &engine,
            &state,
            &Effect::ReturnToHand {
                target: EntityReference::Target(0),
            },
            &ctx,
        );
        assert_eq!(bounced.state().zone_of(a), Some(ZoneKey::hand(P1)));
    }

    #[test]
    fn test_forced_sacrifice_needs_no_decision() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let only = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let effect = Effect::Sacrifice {
            player: PlayerSelector::EachOpponent,
            filter: ObjectFilter::creature(),
            count: DynamicAmount::fixed(1),
        };
        let result = RemovalExecutor.execute(&engine, &state, &effect, &EffectContext::new(P0));
        assert!(result.is_success());
        assert_eq!(result.state().graveyard(P1), vec![only]);
        assert!(result.events().contains(&GameEvent::Sacrificed { player: P1, entity: only }));
    }

    #[test]
    fn test_sacrifice_with_options_pauses() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let a = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let b = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let effect = Effect::Sacrifice {
            player: PlayerSelector::Opponent,
            filter: ObjectFilter::creature(),
            count: DynamicAmount::fixed(1),
        };
        let result = RemovalExecutor.execute(&engine, &state, &effect, &EffectContext::new(P0));
        let decision = result.decision().unwrap();
        assert_eq!(decision.player, P1);
        assert_eq!(
            decision.kind,
            DecisionKind::SelectCards {
                options: vec![a, b],
                min: 1,
                max: 1,
                ordered: false
            }
        );
    }
}
