//! Tapping and counters.

use std::collections::BTreeMap;

use super::{count, entity, permanent, wrong_kind};
use crate::components::CounterKind;
use crate::continuation::Continuation;
use crate::core::{EngineError, EntityId, Result};
use crate::decisions::DecisionKind;
use crate::effects::{Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution};
use crate::rules::RulesEngine;
use crate::zones::ZoneKind;

#[derive(Clone, Copy, Debug, Default)]
pub struct PermanentExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::Tap,
    EffectKind::Untap,
    EffectKind::AddCounters,
    EffectKind::RemoveCounters,
    EffectKind::DistributeCounters,
];

impl EffectExecutor for PermanentExecutor {
    fn name(&self) -> &'static str {
        "permanents"
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
            Effect::Tap { target } => {
                let (target, _) = permanent(engine, res, *target, ctx)?;
                res.tap(target)?;
            }
            Effect::Untap { target } => {
                let (target, _) = permanent(engine, res, *target, ctx)?;
                res.untap(target)?;
            }
            Effect::AddCounters {
                target,
                kind,
                amount,
            } => {
                let n = count(engine, res, amount, ctx);
                let target = entity(res, *target, ctx)?;
                res.add_counters(target, kind.clone(), n)?;
            }
            Effect::RemoveCounters {
                target,
                kind,
                amount,
            } => {
                let n = count(engine, res, amount, ctx);
                let target = entity(res, *target, ctx)?;
                res.remove_counters(target, kind.clone(), n)?;
            }
            Effect::DistributeCounters { kind, amount } => {
                let total = count(engine, res, amount, ctx);
                let recipients = ctx.targets.clone();
                for recipient in &recipients {
                    res.require_in(*recipient, ZoneKind::Battlefield)?;
                }
                match recipients.as_slice() {
                    [] => {}
                    [only] => res.add_counters(*only, kind.clone(), total)?,
                    _ => {
                        if (total as usize) < recipients.len() {
                            return Err(EngineError::InvalidTarget(format!(
                                "cannot distribute {total} counters among {} targets",
                                recipients.len()
                            )));
                        }
                        return Ok(res.pause(
                            ctx.controller,
                            format!("Distribute {total} counters"),
                            DecisionKind::DistributeAmount {
                                total,
                                targets: recipients,
                                min_per_target: 1,
                            },
                            ctx.source,
                            Continuation::DistributeCounters {
                                kind: kind.clone(),
                                context: ctx.clone(),
                            },
                        ));
                    }
                }
            }
            other => return Err(wrong_kind(self.name(), other)),
        }
        Ok(Outcome::Done)
    }
}

/// Place counters as distributed by a resolved decision.
pub(crate) fn place_counters(
    res: &mut Resolution,
    kind: &CounterKind,
    distribution: &BTreeMap<EntityId, u32>,
) -> Result<()> {
    for (recipient, amount) in distribution {
        res.add_counters(*recipient, kind.clone(), *amount)?;
    }
    Ok(())
}
