//! The executor trait.

use super::context::EffectContext;
use super::effect::{Effect, EffectKind};
use super::result::{ExecutionResult, Outcome, Resolution};
use crate::core::{GameState, Result};
use crate::rules::RulesEngine;

/// Runs one family of effects.
///
/// Implementors provide `apply`, which works on a `Resolution` so nested
/// effects share one working copy of the state. `execute` is the
/// standalone entry: it clones the input, applies, and on error hands the
/// input back untouched.
///
/// An executor given an effect kind it does not handle returns
/// `EngineError::WrongEffectKind`.
pub trait EffectExecutor: Send + Sync {
    /// Name for logs and errors.
    fn name(&self) -> &'static str;

    /// The effect kinds this executor handles.
    fn kinds(&self) -> &'static [EffectKind];

    fn apply(
        &self,
        engine: &RulesEngine,
        res: &mut Resolution,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> Result<Outcome>;

    fn execute(
        &self,
        engine: &RulesEngine,
        state: &GameState,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> ExecutionResult {
        let mut res = Resolution::new(state);
        match self.apply(engine, &mut res, effect, ctx) {
            Ok(outcome) => res.finish(outcome),
            Err(error) => ExecutionResult::Error {
                state: state.clone(),
                error,
            },
        }
    }
}
