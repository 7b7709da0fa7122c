//! Continuation frames.
//!
//! A frame is suspended work stored in the `GameState`. Frames that wait on
//! a decision carry its id; frames holding the rest of a composite effect
//! carry none and are run by the chaining step of `resume` once the frame
//! above them completes.

use serde::{Deserialize, Serialize};

use super::sequence::{Pick, SequentialChoice};
use crate::components::CounterKind;
use crate::core::{EntityId, PlayerId};
use crate::decisions::DecisionId;
use crate::effects::{AlternativeCost, Effect, EffectContext, Mode};
use crate::layers::Duration;
use crate::zones::ZoneKind;

/// One entry of the continuation stack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinuationFrame {
    /// The decision this frame consumes, if any.
    pub decision_id: Option<DecisionId>,
    pub continuation: Continuation,
}

impl ContinuationFrame {
    /// A frame waiting on `id`.
    #[must_use]
    pub fn awaiting(id: DecisionId, continuation: Continuation) -> Self {
        Self {
            decision_id: Some(id),
            continuation,
        }
    }

    /// A frame run by chaining, with no decision of its own.
    #[must_use]
    pub fn chained(continuation: Continuation) -> Self {
        Self {
            decision_id: None,
            continuation,
        }
    }
}

/// Suspended work, one variant per effect that can pause.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Continuation {
    /// The rest of a composite effect.
    PendingEffects {
        remaining: Vec<Effect>,
        context: EffectContext,
    },
    /// A choice made by each player in turn order; `picks` are applied
    /// together once every player has chosen.
    EachPlayerChooses {
        choice: SequentialChoice,
        current: PlayerId,
        remaining: Vec<PlayerId>,
        picks: Vec<(PlayerId, Pick)>,
        context: EffectContext,
    },
    SearchLibrary {
        player: PlayerId,
        destination: ZoneKind,
        tapped: bool,
    },
    /// Chosen cards go to the bottom; the rest stay on top.
    Scry { player: PlayerId },
    /// The top of the library is put back in the chosen order.
    Reorder { player: PlayerId },
    /// The separator splits the revealed cards; `chooser` then picks a pile.
    SeparatePiles {
        chooser: PlayerId,
        revealed: Vec<EntityId>,
        source: Option<EntityId>,
    },
    ChoosePile {
        player: PlayerId,
        first: Vec<EntityId>,
        second: Vec<EntityId>,
    },
    May {
        effect: Effect,
        context: EffectContext,
    },
    Modal {
        modes: Vec<Mode>,
        context: EffectContext,
    },
    /// The payer decides whether to pay.
    PayOrSuffer {
        payer: PlayerId,
        cost: AlternativeCost,
        suffer: Effect,
        context: EffectContext,
    },
    /// The payer picks the cards or permanents that pay the cost.
    PayCost {
        payer: PlayerId,
        cost: AlternativeCost,
    },
    ChooseColor {
        target: EntityId,
        duration: Duration,
        context: EffectContext,
    },
    TargetOnResolution {
        effect: Effect,
        context: EffectContext,
    },
    DistributeCounters {
        kind: CounterKind,
        context: EffectContext,
    },
    DividedDamage { context: EffectContext },
}

impl Continuation {
    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Continuation::PendingEffects { .. } => "pending effects",
            Continuation::EachPlayerChooses { .. } => "each player chooses",
            Continuation::SearchLibrary { .. } => "search library",
            Continuation::Scry { .. } => "scry",
            Continuation::Reorder { .. } => "reorder",
            Continuation::SeparatePiles { .. } => "separate piles",
            Continuation::ChoosePile { .. } => "choose pile",
            Continuation::May { .. } => "may",
            Continuation::Modal { .. } => "modal",
            Continuation::PayOrSuffer { .. } => "pay or suffer",
            Continuation::PayCost { .. } => "pay cost",
            Continuation::ChooseColor { .. } => "choose color",
            Continuation::TargetOnResolution { .. } => "target on resolution",
            Continuation::DistributeCounters { .. } => "distribute counters",
            Continuation::DividedDamage { .. } => "divided damage",
        }
    }
}
