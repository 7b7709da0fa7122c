//! Library, hand and token effects.

use tracing::debug;

use super::{count, players, wrong_kind};
use crate::continuation::{sequence, Continuation, SequentialChoice};
use crate::core::{EngineError, Result};
use crate::decisions::DecisionKind;
use crate::effects::{Effect, EffectContext, EffectExecutor, EffectKind, Outcome, Resolution};
use crate::events::GameEvent;
use crate::filters::PredicateEvaluator;
use crate::rules::RulesEngine;
use crate::zones::ZoneKey;

#[derive(Clone, Copy, Debug, Default)]
pub struct LibraryExecutor;

const KINDS: &[EffectKind] = &[
    EffectKind::Draw,
    EffectKind::Discard,
    EffectKind::DiscardAtRandom,
    EffectKind::Mill,
    EffectKind::ShuffleLibrary,
    EffectKind::Scry,
    EffectKind::LookAtTopAndReorder,
    EffectKind::SearchLibrary,
    EffectKind::RevealAndSeparate,
    EffectKind::CreateToken,
];

impl EffectExecutor for LibraryExecutor {
    fn name(&self) -> &'static str {
        "library"
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
            Effect::Draw { player, count: n } => {
                let n = count(engine, res, n, ctx);
                for p in players(engine, res, *player, ctx) {
                    res.draw(p, n)?;
                }
            }
            Effect::Discard { player, count: n } => {
                let n = count(engine, res, n, ctx);
                let who = players(engine, res, *player, ctx);
                return sequence::begin(engine, res, &who, SequentialChoice::Discard { count: n }, ctx);
            }
            Effect::DiscardAtRandom { player, count: n } => {
                let n = count(engine, res, n, ctx);
                for p in players(engine, res, *player, ctx) {
                    let hand = res.state.hand(p);
                    let picked: Vec<_> = res
                        .state
                        .rng
                        .sample_indices(hand.len(), n as usize)
                        .into_iter()
                        .map(|i| hand[i])
                        .collect();
                    res.discard(p, &picked)?;
                }
            }
            Effect::Mill { player, count: n } => {
                let n = count(engine, res, n, ctx);
                for p in players(engine, res, *player, ctx) {
                    res.mill(p, n)?;
                }
            }
            Effect::ShuffleLibrary { player } => {
                for p in players(engine, res, *player, ctx) {
                    res.shuffle_library(p);
                }
            }
            Effect::Scry { count: n } => {
                let n = count(engine, res, n, ctx);
                let player = ctx.controller;
                let top = res.state.zones.top(ZoneKey::library(player), n as usize);
                if top.is_empty() {
                    return Ok(Outcome::Done);
                }
                let max = top.len();
                return Ok(res.pause(
                    player,
                    format!("Scry {max}: choose cards to put on the bottom"),
                    DecisionKind::SelectCards {
                        options: top,
                        min: 0,
                        max,
                        ordered: true,
                    },
                    ctx.source,
                    Continuation::Scry { player },
                ));
            }
            Effect::LookAtTopAndReorder { count: n } => {
                let n = count(engine, res, n, ctx);
                let player = ctx.controller;
                let top = res.state.zones.top(ZoneKey::library(player), n as usize);
                if top.len() < 2 {
                    return Ok(Outcome::Done);
                }
                return Ok(res.pause(
                    player,
                    "Put the cards back in any order (first is on top)",
                    DecisionKind::OrderObjects { objects: top },
                    ctx.source,
                    Continuation::Reorder { player },
                ));
            }
            Effect::SearchLibrary {
                filter,
                count: n,
                destination,
                tapped,
            } => {
                let player = ctx.controller;
                let library = res.state.library(player);
                let found = PredicateEvaluator::new(&res.state).select(
                    filter,
                    library,
                    &ctx.filter_context(),
                );
                if found.is_empty() || *n == 0 {
                    debug!(%player, "search found nothing to take");
                    res.shuffle_library(player);
                    return Ok(Outcome::Done);
                }
                let max = found.len().min(*n as usize);
                return Ok(res.pause(
                    player,
                    format!("Search your library for up to {max} card(s)"),
                    DecisionKind::SelectCards {
                        options: found,
                        min: 0,
                        max,
                        ordered: false,
                    },
                    ctx.source,
                    Continuation::SearchLibrary {
                        player,
                        destination: *destination,
                        tapped: *tapped,
                    },
                ));
            }
            Effect::RevealAndSeparate {
                count: n,
                separator,
            } => {
                let n = count(engine, res, n, ctx);
                let chooser = ctx.controller;
                let revealed = res.state.zones.top(ZoneKey::library(chooser), n as usize);
                if revealed.is_empty() {
                    return Ok(Outcome::Done);
                }
                let separator = players(engine, res, *separator, ctx)
                    .first()
                    .copied()
                    .ok_or_else(|| EngineError::MissingBinding(format!("{separator:?}")))?;
                res.emit(GameEvent::CardsRevealed {
                    player: chooser,
                    cards: revealed.clone(),
                });
                return Ok(res.pause(
                    separator,
                    "Separate the revealed cards into two piles",
                    DecisionKind::SplitPiles {
                        objects: revealed.clone(),
                    },
                    ctx.source,
                    Continuation::SeparatePiles {
                        chooser,
                        revealed,
                        source: ctx.source,
                    },
                ));
            }
            Effect::CreateToken {
                token,
                count: n,
                controller,
            } => {
                let n = count(engine, res, n, ctx);
                for p in players(engine, res, *controller, ctx) {
                    for _ in 0..n {
                        res.create_token(token, p)?;
                    }
                }
            }
            other => return Err(wrong_kind(self.name(), other)),
        }
        Ok(Outcome::Done)
    }
}
