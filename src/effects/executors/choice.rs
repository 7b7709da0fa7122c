//! Composition and player choice.

use tracing::debug;

use super::{players, wrong_kind};
use crate::amounts::AmountEvaluator;
use crate::continuation::{sequence, Continuation};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::decisions::DecisionKind;
use crate::effects::{
    AlternativeCost, Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution,
};
use crate::filters::{ObjectFilter, PredicateEvaluator};
use crate::rules::RulesEngine;
use crate::targeting::TargetResolver;

/// Composite, conditional, optional and modal effects, and effects that
/// ask a player something before doing anything else.
#[derive(Clone, Copy, Debug, Default)]
pub struct ChoiceExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::Composite,
    EffectKind::Conditional,
    EffectKind::May,
    EffectKind::Modal,
    EffectKind::PayOrSuffer,
    EffectKind::TargetOnResolution,
    EffectKind::EachPlayerChooses,
];

impl EffectExecutor for ChoiceExecutor {
    fn name(&self) -> &'static str {
        "choice"
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
            Effect::Composite(effects) => engine.run_sequence(res, effects, ctx),
            Effect::Conditional {
                condition,
                then,
                otherwise,
            } => {
                let holds = {
                    let projection = engine.project(&res.state);
                    AmountEvaluator::with_projection(&res.state, &projection).check(condition, ctx)
                };
                debug!(holds, "conditional effect");
                match (holds, otherwise) {
                    (true, _) => engine.dispatch(res, then, ctx),
                    (false, Some(otherwise)) => engine.dispatch(res, otherwise, ctx),
                    (false, None) => Ok(Outcome::Done),
                }
            }
            Effect::May { prompt, effect } => Ok(res.pause(
                ctx.controller,
                prompt.clone(),
                DecisionKind::YesNo,
                ctx.source,
                Continuation::May {
                    effect: (**effect).clone(),
                    context: ctx.clone(),
                },
            )),
            Effect::Modal { modes, min, max } => {
                if modes.is_empty() {
                    return Ok(Outcome::Done);
                }
                let max = (*max).min(modes.len());
                let min = (*min).min(max);
                Ok(res.pause(
                    ctx.controller,
                    "Choose mode(s)",
                    DecisionKind::ChooseMode {
                        modes: modes.iter().map(|m| m.description.clone()).collect(),
                        min,
                        max,
                    },
                    ctx.source,
                    Continuation::Modal {
                        modes: modes.clone(),
                        context: ctx.clone(),
                    },
                ))
            }
            Effect::PayOrSuffer {
                payer,
                cost,
                suffer,
            } => {
                let Some(payer) = players(engine, res, *payer, ctx).first().copied() else {
                    return Ok(Outcome::Done);
                };
                if !can_pay(engine, &res.state, payer, cost, ctx) {
                    debug!(%payer, ?cost, "cost cannot be paid");
                    return engine.dispatch(res, suffer, ctx);
                }
                Ok(res.pause(
                    payer,
                    describe(cost),
                    DecisionKind::YesNo,
                    ctx.source,
                    Continuation::PayOrSuffer {
                        payer,
                        cost: cost.clone(),
                        suffer: (**suffer).clone(),
                        context: ctx.clone(),
                    },
                ))
            }
            Effect::TargetOnResolution { spec, effect } => {
                let legal = {
                    let projection = engine.project(&res.state);
                    TargetResolver::new(&res.state, &projection).legal_targets(&spec.requirement, ctx)
                };
                let (min, max) = spec.bounds(legal.len());
                let max = max.min(legal.len());
                if legal.len() < min {
                    debug!(legal = legal.len(), min, "not enough legal targets; effect does nothing");
                    return Ok(Outcome::Done);
                }
                if max == 0 {
                    return engine.dispatch(res, effect, &ctx.clone().with_targets(Vec::new()));
                }
                Ok(res.pause(
                    ctx.controller,
                    "Choose targets",
                    DecisionKind::ChooseTargets { legal, min, max },
                    ctx.source,
                    Continuation::TargetOnResolution {
                        effect: (**effect).clone(),
                        context: ctx.clone(),
                    },
                ))
            }
            Effect::EachPlayerChooses {
                players: selector,
                choice,
            } => {
                let who = players(engine, res, *selector, ctx);
                sequence::begin(engine, res, &who, choice.clone(), ctx)
            }
            other => Err(wrong_kind(self.name(), other)),
        }
    }
}

fn describe(cost: &AlternativeCost) -> String {
    match cost {
        AlternativeCost::PayLife(n) => format!("Pay {n} life?"),
        AlternativeCost::DiscardCards(n) => format!("Discard {n} card(s)?"),
        AlternativeCost::SacrificePermanents { count, .. } => {
            format!("Sacrifice {count} permanent(s)?")
        }
    }
}

fn sacrifice_options(
    engine: &RulesEngine,
    state: &GameState,
    payer: PlayerId,
    filter: &ObjectFilter,
    ctx: &EffectContext,
) -> Vec<EntityId> {
    let projection = engine.project(state);
    PredicateEvaluator::with_projection(state, &projection)
        .battlefield_matching(filter, &ctx.for_player(payer).filter_context())
        .into_iter()
        .filter(|e| projection.controller_of(*e) == Some(payer))
        .collect()
}

/// Whether `payer` is able to pay `cost` right now.
pub(crate) fn can_pay(
    engine: &RulesEngine,
    state: &GameState,
    payer: PlayerId,
    cost: &AlternativeCost,
    ctx: &EffectContext,
) -> bool {
    match cost {
        AlternativeCost::PayLife(n) => state.life(payer) >= *n,
        AlternativeCost::DiscardCards(n) => state.hand(payer).len() >= *n as usize,
        AlternativeCost::SacrificePermanents { filter, count } => {
            sacrifice_options(engine, state, payer, filter, ctx).len() >= *count as usize
        }
    }
}

/// Pay `cost` after the payer agreed, asking which objects when there is
/// a choice. Falls back to `suffer` if the cost became unpayable.
pub(crate) fn pay(
    engine: &RulesEngine,
    res: &mut Resolution,
    payer: PlayerId,
    cost: AlternativeCost,
    suffer: &Effect,
    ctx: &EffectContext,
) -> Result<Outcome> {
    if !can_pay(engine, &res.state, payer, &cost, ctx) {
        debug!(%payer, "cost no longer payable");
        return engine.dispatch(res, suffer, ctx);
    }
    let (options, count) = match &cost {
        AlternativeCost::PayLife(n) => {
            res.change_life(payer, -n)?;
            return Ok(Outcome::Done);
        }
        AlternativeCost::DiscardCards(n) => (res.state.hand(payer), *n as usize),
        AlternativeCost::SacrificePermanents { filter, count } => (
            sacrifice_options(engine, &res.state, payer, filter, ctx),
            *count as usize,
        ),
    };
    if options.len() == count {
        pay_with(engine, res, payer, &cost, &options)?;
        return Ok(Outcome::Done);
    }
    Ok(res.pause(
        payer,
        format!("Choose {count} to pay with"),
        DecisionKind::SelectCards {
            options,
            min: count,
            max: count,
            ordered: false,
        },
        ctx.source,
        Continuation::PayCost { payer, cost },
    ))
}

/// Discard or sacrifice the chosen objects.
pub(crate) fn pay_with(
    engine: &RulesEngine,
    res: &mut Resolution,
    payer: PlayerId,
    cost: &AlternativeCost,
    chosen: &[EntityId],
) -> Result<()> {
    match cost {
        AlternativeCost::PayLife(n) => res.change_life(payer, -n),
        AlternativeCost::DiscardCards(_) => res.discard(payer, chosen),
        AlternativeCost::SacrificePermanents { .. } => {
            let projection = engine.project(&res.state);
            for permanent in chosen {
                let chars = projection
                    .get(*permanent)
                    .ok_or(EngineError::EntityNotFound(*permanent))?;
                res.sacrifice(payer, *permanent, chars)?;
            }
            Ok(())
        }
    }
}
