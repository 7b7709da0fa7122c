//! Damage and life.

use std::collections::BTreeMap;

use super::{amount, entity, players, wrong_kind};
use crate::continuation::Continuation;
use crate::core::{EngineError, EntityId, Result};
use crate::decisions::DecisionKind;
use crate::effects::{Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution};
use crate::rules::RulesEngine;

#[derive(Clone, Copy, Debug, Default)]
pub struct DamageExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::DealDamage,
    EffectKind::DealDividedDamage,
    EffectKind::GainLife,
    EffectKind::LoseLife,
];

impl EffectExecutor for DamageExecutor {
    fn name(&self) -> &'static str {
        "damage"
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
            Effect::DealDamage {
                target,
                amount: dealt,
            } => {
                let n = amount(engine, res, dealt, ctx);
                let target = entity(res, *target, ctx)?;
                let distribution = BTreeMap::from([(target, n)]);
                deal_distribution(engine, res, ctx.source, &distribution)?;
            }
            Effect::DealDividedDamage { amount: dealt } => {
                let total = amount(engine, res, dealt, ctx).max(0);
                if !ctx.damage_distribution.is_empty() {
                    check_division(&ctx.damage_distribution, &ctx.targets, total)?;
                    deal_distribution(engine, res, ctx.source, &ctx.damage_distribution)?;
                    return Ok(Outcome::Done);
                }
                match ctx.targets.as_slice() {
                    [] => {}
                    [only] => {
                        let distribution = BTreeMap::from([(*only, total)]);
                        deal_distribution(engine, res, ctx.source, &distribution)?;
                    }
                    targets => {
                        let total = u32::try_from(total).unwrap_or(0);
                        if (total as usize) < targets.len() {
                            return Err(EngineError::InvalidTarget(format!(
                                "cannot divide {total} damage among {} targets",
                                targets.len()
                            )));
                        }
                        return Ok(res.pause(
                            ctx.controller,
                            format!("Divide {total} damage"),
                            DecisionKind::DistributeAmount {
                                total,
                                targets: targets.to_vec(),
                                min_per_target: 1,
                            },
                            ctx.source,
                            Continuation::DividedDamage {
                                context: ctx.clone(),
                            },
                        ));
                    }
                }
            }
            Effect::GainLife {
                player,
                amount: gained,
            } => {
                let n = amount(engine, res, gained, ctx).max(0);
                for p in players(engine, res, *player, ctx) {
                    res.change_life(p, n)?;
                }
            }
            Effect::LoseLife {
                player,
                amount: lost,
            } => {
                let n = amount(engine, res, lost, ctx).max(0);
                for p in players(engine, res, *player, ctx) {
                    res.change_life(p, -n)?;
                }
            }
            other => return Err(wrong_kind(self.name(), other)),
        }
        Ok(Outcome::Done)
    }
}

/// A committed division must give every target at least 1 and add up to
/// the total.
fn check_division(division: &BTreeMap<EntityId, i32>, targets: &[EntityId], total: i32) -> Result<()> {
    if let Some(stray) = division.keys().find(|e| !targets.contains(e)) {
        return Err(EngineError::InvalidTarget(format!(
            "damage assigned to {stray}, which is not a target"
        )));
    }
    for target in targets {
        match division.get(target) {
            Some(share) if *share >= 1 => {}
            Some(share) => {
                return Err(EngineError::InvalidTarget(format!(
                    "{target} is assigned {share} damage, minimum is 1"
                )))
            }
            None => {
                return Err(EngineError::InvalidTarget(format!(
                    "{target} is assigned no damage"
                )))
            }
        }
    }
    let sum = division
        .values()
        .try_fold(0i32, |acc, n| acc.checked_add(*n))
        .ok_or_else(|| EngineError::InvalidTarget("damage division overflows".to_string()))?;
    if sum != total {
        return Err(EngineError::InvalidTarget(format!(
            "divided {sum} damage, expected {total}"
        )));
    }
    Ok(())
}

/// Deal damage to each recipient. Creatures and planeswalkers are checked
/// against one projection taken before any damage is dealt.
pub(crate) fn deal_distribution(
    engine: &RulesEngine,
    res: &mut Resolution,
    source: Option<EntityId>,
    distribution: &BTreeMap<EntityId, i32>,
) -> Result<()> {
    let projection = engine.project(&res.state);
    for (recipient, n) in distribution {
        res.deal_damage(source, *recipient, *n, projection.get(*recipient))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::{DynamicAmount, EntityReference, PlayerSelector};
    use crate::cards::{CardDefinition, CardId};
    use crate::components::DamageComponent;
    use crate::core::{EngineConfig, GameConfig, GameState, PlayerId};
    use crate::zones::ZoneKind;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn setup() -> (RulesEngine, GameState, EntityId) {
        let engine = RulesEngine::new(EngineConfig::default()).unwrap();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let bear = state
            .spawn_card(&CardDefinition::creature(CardId::new(1), "Bear", 2, 2), P1, ZoneKind::Battlefield)
            .unwrap();
        (engine, state, bear)
    }

    #[test]
    fn test_damage_to_player_and_creature() {
        let (engine, state, bear) = setup();
        let ctx = EffectContext::new(P0).with_targets([EntityId::player(P1), bear]);
        let face = DamageExecutor.execute(&engine, &state, &Effect::damage_target(3), &ctx);
        assert_eq!(face.state().life(P1), 17);

        let creature = Effect::DealDamage {
            target: EntityReference::Target(1),
            amount: DynamicAmount::fixed(1),
        };
        let result = DamageExecutor.execute(&engine, &state, &creature, &ctx);
        assert_eq!(result.state().get::<DamageComponent>(bear), Some(&DamageComponent { amount: 1 }));
    }

    #[test]
    fn test_divided_damage_uses_committed_division() {
        let (engine, state, bear) = setup();
        let p1 = EntityId::player(P1);
        let ctx = EffectContext::new(P0)
            .with_targets([p1, bear])
            .with_distribution(BTreeMap::from([(p1, 2), (bear, 1)]));
        let effect = Effect::DealDividedDamage {
            amount: DynamicAmount::fixed(3),
        };
        let result = DamageExecutor.execute(&engine, &state, &effect, &ctx);
        assert!(result.is_success());
        assert_eq!(result.state().life(P1), 18);

        let bad = ctx.clone().with_distribution(BTreeMap::from([(p1, 3), (bear, 1)]));
        assert!(DamageExecutor.execute(&engine, &state, &effect, &bad).is_error());
    }

    /// A negative share cannot be balanced by a larger one elsewhere.
    #[test]
    fn test_divided_damage_rejects_negative_share() {
        let (engine, state, bear) = setup();
        let p1 = EntityId::player(P1);
        let ctx = EffectContext::new(P0)
            .with_targets([p1, bear])
            .with_distribution(BTreeMap::from([(p1, -5), (bear, 8)]));
        let effect = Effect::DealDividedDamage {
            amount: DynamicAmount::fixed(3),
        };
        let result = DamageExecutor.execute(&engine, &state, &effect, &ctx);
        assert!(matches!(result.error(), Some(EngineError::InvalidTarget(_))));
        assert_eq!(result.state().life(P1), 20);
        assert_eq!(result.state().get::<DamageComponent>(bear), None);
    }

    #[test]
    fn test_divided_damage_requires_every_target() {
        let (engine, state, bear) = setup();
        let p1 = EntityId::player(P1);
        let ctx = EffectContext::new(P0)
            .with_targets([p1, bear])
            .with_distribution(BTreeMap::from([(p1, 3)]));
        let effect = Effect::DealDividedDamage {
            amount: DynamicAmount::fixed(3),
        };
        let result = DamageExecutor.execute(&engine, &state, &effect, &ctx);
        assert!(result.is_error());
        assert_eq!(result.state().life(P1), 20);
    }

    #[test]
    fn test_divided_damage_overflow_rejected() {
        let (engine, state, bear) = setup();
        let p1 = EntityId::player(P1);
        let ctx = EffectContext::new(P0)
            .with_targets([p1, bear])
            .with_distribution(BTreeMap::from([(p1, i32::MAX), (bear, 4)]));
        let effect = Effect::DealDividedDamage {
            amount: DynamicAmount::fixed(3),
        };
        assert!(DamageExecutor.execute(&engine, &state, &effect, &ctx).is_error());
    }

    #[test]
    fn test_divided_damage_asks_for_division() {
        let (engine, state, bear) = setup();
        let ctx = EffectContext::new(P0).with_targets([EntityId::player(P1), bear]);
        let effect = Effect::DealDividedDamage {
            amount: DynamicAmount::fixed(4),
        };
        let result = DamageExecutor.execute(&engine, &state, &effect, &ctx);
        assert!(matches!(
            result.decision().map(|d| &d.kind),
            Some(DecisionKind::DistributeAmount { total: 4, .. })
        ));
    }

    #[test]
    fn test_life_for_each_player() {
        let (engine, state, _) = setup();
        let drain = Effect::LoseLife {
            player: PlayerSelector::EachOpponent,
            amount: DynamicAmount::fixed(2),
        };
        let result = DamageExecutor.execute(&engine, &state, &drain, &EffectContext::new(P0));
        assert_eq!(result.state().life(P0), 20);
        assert_eq!(result.state().life(P1), 18);

        let gain = Effect::GainLife {
            player: PlayerSelector::EachPlayer,
            amount: DynamicAmount::X,
        };
        let result = DamageExecutor.execute(&engine, result.state(), &gain, &EffectContext::new(P0).with_x(5));
        assert_eq!(result.state().life(P0), 25);
        assert_eq!(result.state().life(P1), 23);
    }
}
