//! Effects that create floating continuous effects.

use std::collections::BTreeSet;

use tracing::debug;

use super::{amount, permanent, wrong_kind};
use crate::components::{CardType, Color};
use crate::continuation::Continuation;
use crate::core::Result;
use crate::decisions::DecisionKind;
use crate::effects::{Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution};
use crate::filters::{ObjectFilter, PredicateEvaluator};
use crate::layers::{Duration, Modification};
use crate::rules::RulesEngine;

/// Stat changes, keywords, control, animation and rules markers.
#[derive(Clone, Copy, Debug, Default)]
pub struct ContinuousExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::ModifyStats,
    EffectKind::SetBasePowerToughness,
    EffectKind::Animate,
    EffectKind::GrantKeyword,
    EffectKind::RemoveKeyword,
    EffectKind::ModifyStatsForGroup,
    EffectKind::GrantKeywordToGroup,
    EffectKind::GainControl,
    EffectKind::Regenerate,
    EffectKind::ExileOnDeath,
    EffectKind::ChooseColorProtection,
];

impl EffectExecutor for ContinuousExecutor {
    fn name(&self) -> &'static str {
        "continuous"
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
        // Single-target effects: (reference, modifications, duration).
        let (reference, modifications, duration) = match effect {
            Effect::ModifyStats {
                target,
                power,
                toughness,
                duration,
            } => {
                let modification = Modification::ModifyPowerToughness {
                    power: amount(engine, res, power, ctx),
                    toughness: amount(engine, res, toughness, ctx),
                };
                (*target, vec![modification], *duration)
            }
            Effect::SetBasePowerToughness {
                target,
                power,
                toughness,
                duration,
            } => (
                *target,
                vec![Modification::SetBasePowerToughness {
                    power: *power,
                    toughness: *toughness,
                }],
                *duration,
            ),
            Effect::Animate {
                target,
                power,
                toughness,
                subtypes,
                duration,
            } => {
                let mut modifications =
                    vec![Modification::AddCardTypes(BTreeSet::from([CardType::Creature]))];
                if !subtypes.is_empty() {
                    modifications.push(Modification::AddSubtypes(subtypes.clone()));
                }
                modifications.push(Modification::SetBasePowerToughness {
                    power: *power,
                    toughness: *toughness,
                });
                (*target, modifications, *duration)
            }
            Effect::GrantKeyword {
                target,
                keyword,
                duration,
            } => (*target, vec![Modification::GrantKeyword(*keyword)], *duration),
            Effect::RemoveKeyword {
                target,
                keyword,
                duration,
            } => (*target, vec![Modification::RemoveKeyword(*keyword)], *duration),
            Effect::GainControl { target, duration } => (
                *target,
                vec![Modification::ChangeController(ctx.controller)],
                *duration,
            ),
            Effect::Regenerate { target } => (
                *target,
                vec![Modification::RegenerationShield],
                Duration::EndOfTurn,
            ),
            Effect::ExileOnDeath { target } => {
                (*target, vec![Modification::ExileOnDeath], Duration::EndOfTurn)
            }

            Effect::ModifyStatsForGroup {
                filter,
                power,
                toughness,
                duration,
            } => {
                let modification = Modification::ModifyPowerToughness {
                    power: amount(engine, res, power, ctx),
                    toughness: amount(engine, res, toughness, ctx),
                };
                return Ok(group(engine, res, filter, modification, *duration, ctx));
            }
            Effect::GrantKeywordToGroup {
                filter,
                keyword,
                duration,
            } => {
                let modification = Modification::GrantKeyword(*keyword);
                return Ok(group(engine, res, filter, modification, *duration, ctx));
            }
            Effect::ChooseColorProtection { target, duration } => {
                let (target, _) = permanent(engine, res, *target, ctx)?;
                return Ok(res.pause(
                    ctx.controller,
                    "Choose a color",
                    DecisionKind::ChooseColor {
                        options: Color::ALL.to_vec(),
                    },
                    ctx.source,
                    Continuation::ChooseColor {
                        target,
                        duration: *duration,
                        context: ctx.clone(),
                    },
                ));
            }
            other => return Err(wrong_kind(self.name(), other)),
        };

        let (target, _) = permanent(engine, res, reference, ctx)?;
        for modification in modifications {
            res.add_floating(
                modification,
                BTreeSet::from([target]),
                duration,
                ctx.source,
                ctx.controller,
            );
        }
        Ok(Outcome::Done)
    }
}

/// Apply `modification` to the permanents matching `filter` right now.
fn group(
    engine: &RulesEngine,
    res: &mut Resolution,
    filter: &ObjectFilter,
    modification: Modification,
    duration: Duration,
    ctx: &EffectContext,
) -> Outcome {
    let projection = engine.project(&res.state);
    let affected: BTreeSet<_> = PredicateEvaluator::with_projection(&res.state, &projection)
        .battlefield_matching(filter, &ctx.filter_context())
        .into_iter()
        .collect();
    if affected.is_empty() {
        debug!(?modification, "no permanents matched; group effect does nothing");
        return Outcome::Done;
    }
    res.add_floating(modification, affected, duration, ctx.source, ctx.controller);
    Outcome::Done
}
