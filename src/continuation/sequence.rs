//! Choices made by several players in turn order.
//!
//! "Each player discards a card", "each opponent sacrifices a creature" and
//! "each player chooses a creature type" share one shape: walk the players
//! in APNAP order, ask each one (or pick for them when the choice is
//! forced), then apply every pick at once. The walk pauses on the first
//! player who has a real decision and carries the remaining players and
//! the picks so far in a single `EachPlayerChooses` frame.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::frame::Continuation;
use crate::components::{CardComponent, CardType, Subtype};
use crate::core::{EngineError, EntityId, GameState, PlayerId, Result};
use crate::decisions::{DecisionAnswer, DecisionKind, PendingDecision};
use crate::effects::{EffectContext, Outcome, Resolution};
use crate::events::GameEvent;
use crate::filters::{ObjectFilter, PredicateEvaluator};
use crate::layers::ProjectedState;
use crate::rules::RulesEngine;
use crate::zones::ZoneKind;

/// The per-player choice of a sequence.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SequentialChoice {
    /// Discard `count` cards of the player's choice.
    Discard { count: u32 },
    /// Sacrifice `count` permanents matching `filter` (evaluated with the
    /// choosing player as "you").
    Sacrifice { filter: ObjectFilter, count: u32 },
    /// Name a creature type among the creature cards in graveyards; every
    /// creature card of a chosen type returns to the battlefield.
    ChooseCreatureType,
}

/// What one player picked.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pick {
    Objects(Vec<EntityId>),
    CreatureType(Subtype),
    /// No legal option existed.
    Nothing,
}

enum Ask {
    Forced(Pick),
    Decide { prompt: String, kind: DecisionKind },
}

/// Creature types of creature cards in any graveyard, sorted.
#[must_use]
pub fn graveyard_creature_types(state: &GameState) -> Vec<Subtype> {
    let types: BTreeSet<Subtype> = state
        .zones
        .all_of_kind(ZoneKind::Graveyard)
        .into_iter()
        .filter_map(|e| state.get::<CardComponent>(e))
        .filter(|card| card.types.contains(&CardType::Creature))
        .flat_map(|card| card.subtypes.iter().cloned())
        .collect();
    types.into_iter().collect()
}

fn sacrifice_candidates(
    state: &GameState,
    projection: &ProjectedState,
    filter: &ObjectFilter,
    player: PlayerId,
    ctx: &EffectContext,
) -> Vec<EntityId> {
    let fctx = ctx.for_player(player).filter_context();
    PredicateEvaluator::with_projection(state, projection)
        .battlefield_matching(filter, &fctx)
        .into_iter()
        .filter(|e| projection.controller_of(*e) == Some(player))
        .collect()
}

fn ask(
    state: &GameState,
    projection: &ProjectedState,
    choice: &SequentialChoice,
    player: PlayerId,
    ctx: &EffectContext,
) -> Ask {
    let select = |options: Vec<EntityId>, count: u32, what: &str| {
        let count = count as usize;
        if count == 0 || options.is_empty() {
            Ask::Forced(Pick::Nothing)
        } else if options.len() <= count {
            Ask::Forced(Pick::Objects(options))
        } else {
            Ask::Decide {
                prompt: format!("Choose {count} {what}"),
                kind: DecisionKind::SelectCards {
                    options,
                    min: count,
                    max: count,
                    ordered: false,
                },
            }
        }
    };

    match choice {
        SequentialChoice::Discard { count } => select(state.hand(player), *count, "card(s) to discard"),
        SequentialChoice::Sacrifice { filter, count } => select(
            sacrifice_candidates(state, projection, filter, player, ctx),
            *count,
            "permanent(s) to sacrifice",
        ),
        SequentialChoice::ChooseCreatureType => {
            let mut options = graveyard_creature_types(state);
            match options.len() {
                0 => Ask::Forced(Pick::Nothing),
                1 => Ask::Forced(Pick::CreatureType(options.remove(0))),
                _ => Ask::Decide {
                    prompt: "Choose a creature type".to_string(),
                    kind: DecisionKind::ChooseOption {
                        options: options.iter().map(ToString::to_string).collect(),
                    },
                },
            }
        }
    }
}

/// Start a sequence over `players` (reordered APNAP).
pub fn begin(
    engine: &RulesEngine,
    res: &mut Resolution,
    players: &[PlayerId],
    choice: SequentialChoice,
    ctx: &EffectContext,
) -> Result<Outcome> {
    let players = PlayerId::sort_apnap(
        players,
        res.state.turn.active_player,
        res.state.player_count(),
    );
    debug!(players = players.len(), ?choice, "starting player sequence");
    advance(engine, res, choice, players, Vec::new(), ctx.clone())
}

/// Ask the remaining players in order, pausing on the first real decision.
fn advance(
    engine: &RulesEngine,
    res: &mut Resolution,
    choice: SequentialChoice,
    players: Vec<PlayerId>,
    mut picks: Vec<(PlayerId, Pick)>,
    ctx: EffectContext,
) -> Result<Outcome> {
    let projection = engine.project(&res.state);
    let mut queue = players.into_iter();
    while let Some(player) = queue.next() {
        match ask(&res.state, &projection, &choice, player, &ctx) {
            Ask::Forced(pick) => picks.push((player, pick)),
            Ask::Decide { prompt, kind } => {
                let source = ctx.source;
                let frame = Continuation::EachPlayerChooses {
                    choice,
                    current: player,
                    remaining: queue.collect(),
                    picks,
                    context: ctx,
                };
                return Ok(res.pause(player, prompt, kind, source, frame));
            }
        }
    }
    apply(engine, res, &choice, picks)?;
    Ok(Outcome::Done)
}

/// Record `current`'s answer and continue with the remaining players.
#[allow(clippy::too_many_arguments)]
pub fn resume(
    engine: &RulesEngine,
    res: &mut Resolution,
    choice: SequentialChoice,
    current: PlayerId,
    remaining: Vec<PlayerId>,
    mut picks: Vec<(PlayerId, Pick)>,
    ctx: EffectContext,
    decision: &PendingDecision,
    answer: &DecisionAnswer,
) -> Result<Outcome> {
    let pick = match (&decision.kind, answer) {
        (_, DecisionAnswer::Cards(cards)) => Pick::Objects(cards.clone()),
        (DecisionKind::ChooseOption { options }, DecisionAnswer::Option(index)) => {
            let name = options.get(*index).ok_or_else(|| {
                EngineError::ResponseOutOfBounds(format!("option {index} does not exist"))
            })?;
            Pick::CreatureType(Subtype::new(name.clone()))
        }
        (kind, answer) => {
            return Err(EngineError::InvalidResponse {
                expected: kind.name().to_string(),
                actual: answer.name().to_string(),
            })
        }
    };
    picks.push((current, pick));
    advance(engine, res, choice, remaining, picks, ctx)
}

fn apply(
    engine: &RulesEngine,
    res: &mut Resolution,
    choice: &SequentialChoice,
    picks: Vec<(PlayerId, Pick)>,
) -> Result<()> {
    match choice {
        SequentialChoice::Discard { .. } => {
            for (player, pick) in picks {
                if let Pick::Objects(cards) = pick {
                    res.discard(player, &cards)?;
                }
            }
        }
        SequentialChoice::Sacrifice { .. } => {
            let projection = engine.project(&res.state);
            for (player, pick) in picks {
                let Pick::Objects(permanents) = pick else {
                    continue;
                };
                for permanent in permanents {
                    let chars = projection
                        .get(permanent)
                        .ok_or(EngineError::EntityNotFound(permanent))?;
                    res.sacrifice(player, permanent, chars)?;
                }
            }
        }
        SequentialChoice::ChooseCreatureType => {
            let mut chosen = BTreeSet::new();
            for (player, pick) in picks {
                if let Pick::CreatureType(subtype) = pick {
                    res.emit(GameEvent::OptionChosen {
                        player,
                        option: subtype.to_string(),
                    });
                    chosen.insert(subtype);
                }
            }
            let returning: Vec<EntityId> = res
                .state
                .zones
                .all_of_kind(ZoneKind::Graveyard)
                .into_iter()
                .filter(|e| {
                    res.state.get::<CardComponent>(*e).is_some_and(|card| {
                        card.types.contains(&CardType::Creature)
                            && card.subtypes.iter().any(|s| chosen.contains(s))
                    })
                })
                .collect();
            debug!(types = chosen.len(), returning = returning.len(), "returning chosen creature types");
            for card in returning {
                res.put_onto_battlefield(card, None, false)?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId};
    use crate::core::GameConfig;

    #[test]
    fn test_graveyard_creature_types() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let goblin = CardDefinition::creature(CardId::new(1), "Goblin", 1, 1).with_subtype("Goblin");
        let elf = CardDefinition::creature(CardId::new(2), "Elf", 1, 1).with_subtype("Elf");
        let forest = CardDefinition::land(CardId::new(3), "Forest").with_subtype("Forest");
        state.spawn_card(&goblin, PlayerId::new(0), ZoneKind::Graveyard).unwrap();
        state.spawn_card(&elf, PlayerId::new(1), ZoneKind::Graveyard).unwrap();
        state.spawn_card(&forest, PlayerId::new(1), ZoneKind::Graveyard).unwrap();
        state.spawn_card(&elf.clone().with_subtype("Druid"), PlayerId::new(1), ZoneKind::Hand).unwrap();

        assert_eq!(
            graveyard_creature_types(&state),
            vec![Subtype::new("Elf"), Subtype::new("Goblin")]
        );
    }
}
