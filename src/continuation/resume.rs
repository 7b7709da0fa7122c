//! Applying an answer to the frame that asked for it.

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::frame::Continuation;
use super::sequence;
use crate::components::Keyword;
use crate::core::{EngineError, EntityId, Result};
use crate::decisions::{DecisionAnswer, DecisionKind, PendingDecision};
use crate::effects::executors::{deal_distribution, pay, pay_with, place_counters};
use crate::effects::{Outcome, Resolution};
use crate::events::GameEvent;
use crate::layers::Modification;
use crate::rules::RulesEngine;
use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

fn mismatch(decision: &PendingDecision, answer: &DecisionAnswer) -> EngineError {
    EngineError::InvalidResponse {
        expected: decision.kind.name().to_string(),
        actual: answer.name().to_string(),
    }
}

/// Continue `continuation` with an answer already validated against
/// `decision`.
pub(crate) fn resume_continuation(
    engine: &RulesEngine,
    res: &mut Resolution,
    continuation: Continuation,
    decision: &PendingDecision,
    answer: &DecisionAnswer,
) -> Result<Outcome> {
    debug!(continuation = continuation.name(), id = %decision.id, "resuming");
    match (continuation, answer) {
        (
            Continuation::SearchLibrary {
                player,
                destination,
                tapped,
            },
            DecisionAnswer::Cards(chosen),
        ) => {
            for card in chosen {
                if destination == ZoneKind::Battlefield {
                    res.put_onto_battlefield(*card, Some(player), tapped)?;
                } else {
                    res.move_to_owners(*card, destination)?;
                }
            }
            res.shuffle_library(player);
            Ok(Outcome::Done)
        }
        (Continuation::Scry { player }, DecisionAnswer::Cards(chosen)) => {
            // Each card goes under the previous one.
            for card in chosen {
                res.state
                    .zones
                    .move_to(*card, ZoneKey::library(player), ZonePosition::Bottom)?;
            }
            res.emit(GameEvent::LibraryReordered { player });
            Ok(Outcome::Done)
        }
        (Continuation::Reorder { player }, DecisionAnswer::Order(order)) => {
            let library = ZoneKey::library(player);
            let mut contents: Vec<EntityId> = res
                .state
                .zones
                .contents(library)
                .filter(|card| !order.contains(card))
                .collect();
            contents.extend(order.iter().rev());
            res.state.zones.reorder(library, contents)?;
            res.emit(GameEvent::LibraryReordered { player });
            Ok(Outcome::Done)
        }
        (
            Continuation::SeparatePiles {
                chooser,
                revealed,
                source,
            },
            DecisionAnswer::FirstPile(pile),
        ) => {
            let second: Vec<EntityId> = revealed
                .iter()
                .copied()
                .filter(|card| !pile.contains(card))
                .collect();
            let options = vec![
                format!("First pile ({} cards)", pile.len()),
                format!("Second pile ({} cards)", second.len()),
            ];
            Ok(res.pause(
                chooser,
                "Choose a pile to put into your hand",
                DecisionKind::ChooseOption { options },
                source,
                Continuation::ChoosePile {
                    player: chooser,
                    first: pile.clone(),
                    second,
                },
            ))
        }
        (
            Continuation::ChoosePile {
                player,
                first,
                second,
            },
            DecisionAnswer::Option(index),
        ) => {
            let (kept, rest) = match *index {
                0 => (first, second),
                1 => (second, first),
                _ => {
                    return Err(EngineError::ResponseOutOfBounds(format!(
                        "pile {index} does not exist"
                    )))
                }
            };
            if let DecisionKind::ChooseOption { options } = &decision.kind {
                if let Some(option) = options.get(*index) {
                    res.emit(GameEvent::OptionChosen {
                        player,
                        option: option.clone(),
                    });
                }
            }
            for card in kept {
                res.move_to_owners(card, ZoneKind::Hand)?;
            }
            for card in rest {
                res.move_to_owners(card, ZoneKind::Graveyard)?;
            }
            Ok(Outcome::Done)
        }
        (Continuation::May { effect, context }, DecisionAnswer::YesNo(yes)) => {
            if *yes {
                engine.dispatch(res, &effect, &context)
            } else {
                Ok(Outcome::Done)
            }
        }
        (Continuation::Modal { modes, context }, DecisionAnswer::Modes(chosen)) => {
            let mut chosen = chosen.clone();
            chosen.sort_unstable();
            chosen.dedup();
            let effects = chosen
                .iter()
                .map(|i| {
                    modes.get(*i).map(|m| m.effect.clone()).ok_or_else(|| {
                        EngineError::ResponseOutOfBounds(format!("mode {i} does not exist"))
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            res.emit(GameEvent::ModesChosen {
                player: decision.player,
                modes: chosen,
            });
            engine.run_sequence(res, &effects, &context)
        }
        (
            Continuation::PayOrSuffer {
                payer,
                cost,
                suffer,
                context,
            },
            DecisionAnswer::YesNo(yes),
        ) => {
            if *yes {
                pay(engine, res, payer, cost, &suffer, &context)
            } else {
                engine.dispatch(res, &suffer, &context)
            }
        }
        (Continuation::PayCost { payer, cost }, DecisionAnswer::Cards(chosen)) => {
            pay_with(engine, res, payer, &cost, chosen)?;
            Ok(Outcome::Done)
        }
        (
            Continuation::ChooseColor {
                target,
                duration,
                context,
            },
            DecisionAnswer::Color(color),
        ) => {
            res.emit(GameEvent::ColorChosen {
                player: decision.player,
                color: *color,
            });
            if !res.state.is_on_battlefield(target) {
                debug!(%target, "protection target left the battlefield");
                return Ok(Outcome::Done);
            }
            res.add_floating(
                Modification::GrantKeyword(Keyword::ProtectionFrom(*color)),
                BTreeSet::from([target]),
                duration,
                context.source,
                context.controller,
            );
            Ok(Outcome::Done)
        }
        (Continuation::TargetOnResolution { effect, context }, DecisionAnswer::Targets(targets)) => {
            let context = context.with_targets(targets.iter().copied());
            engine.dispatch(res, &effect, &context)
        }
        (Continuation::DistributeCounters { kind, .. }, DecisionAnswer::Distribution(amounts)) => {
            place_counters(res, &kind, amounts)?;
            Ok(Outcome::Done)
        }
        (Continuation::DividedDamage { context }, DecisionAnswer::Distribution(amounts)) => {
            let distribution: BTreeMap<EntityId, i32> = amounts
                .iter()
                .map(|(target, n)| (*target, i32::try_from(*n).unwrap_or(i32::MAX)))
                .collect();
            deal_distribution(engine, res, context.source, &distribution)?;
            Ok(Outcome::Done)
        }
        (
            Continuation::EachPlayerChooses {
                choice,
                current,
                remaining,
                picks,
                context,
            },
            answer,
        ) => sequence::resume(
            engine, res, choice, current, remaining, picks, context, decision, answer,
        ),
        (Continuation::PendingEffects { .. }, _) => Err(EngineError::InvariantViolated(
            "pending effects frame resumed with an answer".to_string(),
        )),
        (_, answer) => Err(mismatch(decision, answer)),
    }
}
