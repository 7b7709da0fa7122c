//! Built-in executors, one per effect family.

mod choice;
mod continuous;
mod damage;
mod library;
mod permanents;
mod removal;

pub use choice::ChoiceExecutor;
pub use continuous::ContinuousExecutor;
pub use damage::DamageExecutor;
pub use library::LibraryExecutor;
pub use permanents::PermanentExecutor;
pub use removal::RemovalExecutor;

pub(crate) use choice::{pay, pay_with};
pub(crate) use damage::deal_distribution;
pub(crate) use permanents::place_counters;

use super::context::EffectContext;
use super::effect::Effect;
use super::result::Resolution;
use crate::amounts::{AmountEvaluator, DynamicAmount, EntityReference, PlayerSelector};
use crate::core::{EngineError, EntityId, PlayerId, Result};
use crate::layers::Characteristics;
use crate::rules::RulesEngine;
use crate::zones::ZoneKind;

fn wrong_kind(executor: &'static str, effect: &Effect) -> EngineError {
    EngineError::WrongEffectKind {
        expected: executor,
        actual: effect.kind(),
    }
}

/// Resolve a reference, failing when the context does not bind it.
fn entity(res: &Resolution, reference: EntityReference, ctx: &EffectContext) -> Result<EntityId> {
    AmountEvaluator::new(&res.state)
        .resolve_entity(reference, ctx)
        .ok_or_else(|| EngineError::MissingBinding(format!("{reference:?}")))
}

/// Resolve a reference to a permanent and its projected characteristics.
fn permanent(
    engine: &RulesEngine,
    res: &Resolution,
    reference: EntityReference,
    ctx: &EffectContext,
) -> Result<(EntityId, Characteristics)> {
    let target = entity(res, reference, ctx)?;
    res.require_in(target, ZoneKind::Battlefield)?;
    let chars = engine
        .project(&res.state)
        .get(target)
        .cloned()
        .ok_or(EngineError::EntityNotFound(target))?;
    Ok((target, chars))
}

fn amount(engine: &RulesEngine, res: &Resolution, amount: &DynamicAmount, ctx: &EffectContext) -> i32 {
    let projection = engine.project(&res.state);
    AmountEvaluator::with_projection(&res.state, &projection).evaluate(amount, ctx)
}

fn count(engine: &RulesEngine, res: &Resolution, amount: &DynamicAmount, ctx: &EffectContext) -> u32 {
    let projection = engine.project(&res.state);
    AmountEvaluator::with_projection(&res.state, &projection).evaluate_count(amount, ctx)
}

fn players(
    engine: &RulesEngine,
    res: &Resolution,
    selector: PlayerSelector,
    ctx: &EffectContext,
) -> Vec<PlayerId> {
    let projection = engine.project(&res.state);
    AmountEvaluator::with_projection(&res.state, &projection).resolve_players(selector, ctx)
}
