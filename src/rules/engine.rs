//! The rules engine: effect execution and decision resumption.
//!
//! `RulesEngine` owns the executor registry and the engine configuration.
//! It never holds game state; every call takes a `GameState` and returns a
//! new one inside an `ExecutionResult`.

use tracing::{debug, trace, warn};

use crate::continuation::resume::resume_continuation;
use crate::continuation::{Continuation, ContinuationFrame};
use crate::core::{EngineConfig, EngineError, EntityId, GameState, Result};
use crate::decisions::{validate_response, DecisionResponse};
use crate::effects::{Effect, EffectContext, ExecutionResult, ExecutorRegistry, Outcome, Resolution};
use crate::events::GameEvent;
use crate::layers::{cleanup, project_with, ProjectedState};
use crate::targeting::{TargetRequirement, TargetResolver};

/// Executes effects and resumes them after player decisions.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::{EngineConfig, GameConfig, GameState, PlayerId};
/// use ccg_rules::effects::{Effect, EffectContext};
/// use ccg_rules::rules::RulesEngine;
///
/// let engine = RulesEngine::new(EngineConfig::default()).unwrap();
/// let state = GameState::new(&GameConfig::new(2)).unwrap();
/// let me = PlayerId::new(0);
///
/// let result = engine.execute(&state, &Effect::gain_life(3), &EffectContext::new(me));
/// assert!(result.is_success());
/// assert_eq!(result.state().life(me), 23);
/// // The input is untouched.
/// assert_eq!(state.life(me), 20);
/// ```
#[derive(Clone, Debug)]
pub struct RulesEngine {
    registry: ExecutorRegistry,
    config: EngineConfig,
}

impl RulesEngine {
    /// An engine with the standard executors.
    ///
    /// Fails if the configuration is invalid or some effect kind has no
    /// executor.
    pub fn new(config: EngineConfig) -> Result<Self> {
        Self::with_registry(config, ExecutorRegistry::standard())
    }

    /// An engine with a custom registry. The registry must still cover
    /// every effect kind.
    pub fn with_registry(config: EngineConfig, registry: ExecutorRegistry) -> Result<Self> {
        config.validate()?;
        registry.validate()?;
        debug!(executors = registry.len(), "rules engine ready");
        Ok(Self { registry, config })
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    #[must_use]
    pub fn registry(&self) -> &ExecutorRegistry {
        &self.registry
    }

    /// Project `state` under this engine's configuration.
    #[must_use]
    pub fn project(&self, state: &GameState) -> ProjectedState {
        project_with(state, &self.config)
    }

    /// Legal targets for `requirement` in the current projected state.
    #[must_use]
    pub fn legal_targets(
        &self,
        state: &GameState,
        requirement: &TargetRequirement,
        ctx: &EffectContext,
    ) -> Vec<EntityId> {
        let projection = self.project(state);
        TargetResolver::new(state, &projection).legal_targets(requirement, ctx)
    }

    // === Execution ===

    /// Execute `effect`.
    ///
    /// Fails with `DecisionPending` if `state` is waiting on a decision.
    /// On error the returned state is `state` itself.
    #[must_use]
    pub fn execute(&self, state: &GameState, effect: &Effect, ctx: &EffectContext) -> ExecutionResult {
        if let Some(pending) = state.pending_decision() {
            return ExecutionResult::Error {
                state: state.clone(),
                error: EngineError::DecisionPending(pending.id),
            };
        }
        debug!(kind = ?effect.kind(), controller = %ctx.controller, "executing effect");
        let mut res = Resolution::new(state);
        match self.dispatch(&mut res, effect, ctx) {
            Ok(outcome) => settle(res, outcome),
            Err(error) => {
                warn!(%error, "effect failed; state unchanged");
                ExecutionResult::Error {
                    state: state.clone(),
                    error,
                }
            }
        }
    }

    /// Run one effect with the executor registered for its kind.
    pub(crate) fn dispatch(
        &self,
        res: &mut Resolution,
        effect: &Effect,
        ctx: &EffectContext,
    ) -> Result<Outcome> {
        let kind = effect.kind();
        let executor = self.registry.require(kind)?;
        trace!(?kind, executor = executor.name(), "dispatch");
        executor.apply(self, res, effect, ctx)
    }

    /// Run `effects` in order. If one pauses, the rest are stored in a
    /// pending-effects frame directly under the frames that pause pushed.
    pub(crate) fn run_sequence(
        &self,
        res: &mut Resolution,
        effects: &[Effect],
        ctx: &EffectContext,
    ) -> Result<Outcome> {
        for (k, effect) in effects.iter().enumerate() {
            let depth = res.state.continuation_depth();
            let outcome = self.dispatch(res, effect, ctx)?;
            if outcome.is_paused() {
                let remaining = &effects[k + 1..];
                if !remaining.is_empty() {
                    trace!(remaining = remaining.len(), "storing rest of sequence");
                    res.state.insert_continuation_at(
                        depth,
                        ContinuationFrame::chained(Continuation::PendingEffects {
                            remaining: remaining.to_vec(),
                            context: ctx.clone(),
                        }),
                    );
                }
                return Ok(outcome);
            }
        }
        Ok(Outcome::Done)
    }

    // === Resumption ===

    /// Answer the pending decision and continue until the work completes
    /// or another decision is needed.
    ///
    /// On any error the returned state is `state` itself, still waiting on
    /// the same decision.
    #[must_use]
    pub fn resume(&self, state: &GameState, response: &DecisionResponse) -> ExecutionResult {
        match self.try_resume(state, response) {
            Ok((res, outcome)) => settle(res, outcome),
            Err(error) => {
                warn!(%error, id = %response.decision_id, "resume rejected; state unchanged");
                ExecutionResult::Error {
                    state: state.clone(),
                    error,
                }
            }
        }
    }

    fn try_resume(
        &self,
        state: &GameState,
        response: &DecisionResponse,
    ) -> Result<(Resolution, Outcome)> {
        let pending = state.pending_decision().ok_or(EngineError::NoPendingDecision)?;
        if pending.id != response.decision_id {
            return Err(EngineError::DecisionMismatch {
                expected: pending.id,
                actual: response.decision_id,
            });
        }
        match state.peek_continuation() {
            Some(frame) if frame.decision_id == Some(pending.id) => {}
            _ => return Err(EngineError::NoContinuation(pending.id)),
        }
        validate_response(&pending.kind, &response.answer)?;

        let mut res = Resolution::new(state);
        let decision = res
            .state
            .take_pending_decision()
            .ok_or(EngineError::NoPendingDecision)?;
        let frame = res
            .state
            .pop_continuation()
            .ok_or(EngineError::NoContinuation(decision.id))?;
        res.emit(GameEvent::DecisionResolved {
            id: decision.id,
            player: decision.player,
        });

        let outcome = resume_continuation(self, &mut res, frame.continuation, &decision, &response.answer)?;
        let outcome = self.chain(&mut res, outcome)?;
        Ok((res, outcome))
    }

    /// Run pending-effects frames left on the stack once the frame above
    /// them has completed.
    fn chain(&self, res: &mut Resolution, mut outcome: Outcome) -> Result<Outcome> {
        let mut steps = 0;
        while !outcome.is_paused() {
            let Some(frame) = res.state.peek_continuation() else {
                break;
            };
            if let Some(id) = frame.decision_id {
                return Err(EngineError::InvariantViolated(format!(
                    "{id} is on the continuation stack but no decision is pending"
                )));
            }
            steps += 1;
            if steps > self.config.max_chain_steps {
                return Err(EngineError::ChainLimitExceeded(self.config.max_chain_steps));
            }
            let Some(frame) = res.state.pop_continuation() else {
                break;
            };
            match frame.continuation {
                Continuation::PendingEffects { remaining, context } => {
                    trace!(remaining = remaining.len(), step = steps, "chaining");
                    outcome = self.run_sequence(res, &remaining, &context)?;
                }
                other => {
                    return Err(EngineError::InvariantViolated(format!(
                        "{} frame has no decision id",
                        other.name()
                    )))
                }
            }
        }
        Ok(outcome)
    }
}

/// Drop floating effects that stopped applying, then hand the result out.
fn settle(mut res: Resolution, outcome: Outcome) -> ExecutionResult {
    let (swept, expired) = cleanup::sweep(&res.state);
    res.state = swept;
    res.events.extend(expired);
    res.finish(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::{DynamicAmount, PlayerSelector};
    use crate::cards::{CardDefinition, CardId};
    use crate::core::{GameConfig, PlayerId};
    use crate::decisions::{DecisionAnswer, DecisionId, DecisionKind};
    use crate::effects::{AlternativeCost, Mode};
    use crate::zones::ZoneKind;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn engine() -> RulesEngine {
        RulesEngine::new(EngineConfig::default()).unwrap()
    }

    fn may_gain(n: i32) -> Effect {
        Effect::may("Gain life?", Effect::gain_life(n))
    }

    #[test]
    fn test_empty_registry_is_rejected() {
        let err = RulesEngine::with_registry(EngineConfig::default(), ExecutorRegistry::new()).unwrap_err();
        assert!(matches!(err, EngineError::MissingExecutor(_)));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = EngineConfig::default().with_max_chain_steps(0);
        assert!(matches!(RulesEngine::new(config), Err(EngineError::InvalidConfig(_))));
    }

    #[test]
    fn test_execute_while_paused_is_an_error() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let paused = engine.execute(&state, &may_gain(1), &EffectContext::new(P0));
        let again = engine.execute(paused.state(), &Effect::gain_life(1), &EffectContext::new(P0));
        assert!(matches!(again.error(), Some(EngineError::DecisionPending(_))));
        assert_eq!(again.state(), paused.state());
    }

    #[test]
    fn test_error_returns_input_state() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        // Gains life, then fails on an unbound target.
        let effect = Effect::composite(vec![Effect::gain_life(5), Effect::destroy_target()]);
        let result = engine.execute(&state, &effect, &EffectContext::new(P0));
        assert!(matches!(result.error(), Some(EngineError::MissingBinding(_))));
        assert_eq!(result.state(), &state);
    }

    #[test]
    fn test_resume_without_pending_decision() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let result = engine.resume(&state, &DecisionResponse::yes_no(DecisionId::new(0), true));
        assert_eq!(result.error(), Some(&EngineError::NoPendingDecision));
    }

    #[test]
    fn test_wrong_answer_shape_keeps_decision() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let paused = engine.execute(&state, &may_gain(2), &EffectContext::new(P0));
        let id = paused.decision().unwrap().id;
        let result = engine.resume(paused.state(), &DecisionResponse::option(id, 0));
        assert!(result.is_error());
        assert_eq!(result.state(), paused.state());
        assert!(result.state().is_paused());
    }

    #[test]
    fn test_composite_resumes_remaining_effects() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let effect = Effect::composite(vec![
            Effect::gain_life(1),
            may_gain(10),
            Effect::LoseLife {
                player: PlayerSelector::Opponent,
                amount: DynamicAmount::fixed(4),
            },
        ]);
        let paused = engine.execute(&state, &effect, &EffectContext::new(P0));
        assert_eq!(paused.state().life(P0), 21);
        assert_eq!(paused.state().continuation_depth(), 2);

        let id = paused.decision().unwrap().id;
        let done = engine.resume(paused.state(), &DecisionResponse::yes_no(id, false));
        assert!(done.is_success());
        assert_eq!(done.state().life(P0), 21);
        assert_eq!(done.state().life(P1), 16);
        assert_eq!(done.state().continuation_depth(), 0);
    }

    #[test]
    fn test_nested_composites_resume_inner_rest_first() {
        let engine = engine();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let inner = Effect::composite(vec![may_gain(1), Effect::gain_life(2)]);
        let outer = Effect::composite(vec![inner, Effect::gain_life(4)]);
        let paused = engine.execute(&state, &outer, &EffectContext::new(P0));
        assert_eq!(paused.state().continuation_depth(), 3);

        let id = paused.decision().unwrap().id;
        let done = engine.resume(paused.state(), &DecisionResponse::yes_no(id, true));
        let gains: Vec<i32> = done
            .events()
            .iter()
            .filter_map(|e| match e {
                GameEvent::LifeChanged { old, new, .. } => Some(new - old),
                _ => None,
            })
            .collect();
        assert_eq!(gains, vec![1, 2, 4]);
    }

    #[test]
    fn test_chain_limit() {
        let engine = RulesEngine::new(EngineConfig::default().with_max_chain_steps(1)).unwrap();
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let inner = Effect::composite(vec![may_gain(1), Effect::gain_life(2)]);
        let outer = Effect::composite(vec![inner, Effect::gain_life(4)]);
        let paused = engine.execute(&state, &outer, &EffectContext::new(P0));
        let id = paused.decision().unwrap().id;
        let result = engine.resume(paused.state(), &DecisionResponse::yes_no(id, true));
        assert_eq!(result.error(), Some(&EngineError::ChainLimitExceeded(1)));
        assert_eq!(result.state(), paused.state());
    }

    #[test]
    fn test_modal_runs_chosen_modes_in_order() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        state
            .spawn_card(&CardDefinition::land(CardId::new(1), "Forest"), P0, ZoneKind::Library)
            .unwrap();
        let effect = Effect::Modal {
            modes: vec![
                Mode::new("Gain 3 life", Effect::gain_life(3)),
                Mode::new("Draw a card", Effect::draw(1)),
                Mode::new("Nothing", Effect::composite(Vec::new())),
            ],
            min: 1,
            max: 2,
        };
        let paused = engine.execute(&state, &effect, &EffectContext::new(P0));
        let id = paused.decision().unwrap().id;
        let done = engine.resume(paused.state(), &DecisionResponse::modes(id, vec![1, 0]));
        assert!(done.is_success());
        assert_eq!(done.state().life(P0), 23);
        assert_eq!(done.state().hand(P0).len(), 1);
        assert!(done.events().contains(&GameEvent::ModesChosen {
            player: P0,
            modes: vec![0, 1]
        }));
    }

    #[test]
    fn test_pay_or_suffer_declined() {
        let engine = engine();
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        state
            .spawn_card(&CardDefinition::land(CardId::new(1), "Forest"), P1, ZoneKind::Hand)
            .unwrap();
        state
            .spawn_card(&CardDefinition::land(CardId::new(2), "Island"), P1, ZoneKind::Hand)
            .unwrap();
        let effect = Effect::PayOrSuffer {
            payer: PlayerSelector::Opponent,
            cost: AlternativeCost::DiscardCards(1),
            suffer: Box::new(Effect::LoseLife {
                player: PlayerSelector::Opponent,
                amount: DynamicAmount::fixed(5),
            }),
        };
        let ctx = EffectContext::new(P0);

        let paused = engine.execute(&state, &effect, &ctx);
        let id = paused.decision().unwrap().id;
        let declined = engine.resume(paused.state(), &DecisionResponse::yes_no(id, false));
        assert_eq!(declined.state().life(P1), 15);
        assert_eq!(declined.state().hand(P1).len(), 2);

        let accepted = engine.resume(paused.state(), &DecisionResponse::yes_no(id, true));
        let pick = accepted.decision().unwrap();
        assert!(matches!(pick.kind, DecisionKind::SelectCards { min: 1, max: 1, .. }));
        let card = paused.state().hand(P1)[0];
        let paid = engine.resume(
            accepted.state(),
            &DecisionResponse::new(pick.id, DecisionAnswer::Cards(vec![card])),
        );
        assert!(paid.is_success());
        assert_eq!(paid.state().life(P1), 20);
        assert_eq!(paid.state().graveyard(P1), vec![card]);
    }
}
