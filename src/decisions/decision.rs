//! Player decisions: what the engine asks for and what the caller answers.
//!
//! When an effect cannot continue without a choice, the engine stores a
//! `PendingDecision` on the state and returns `Paused`. The caller shows the
//! prompt, collects a `DecisionResponse` carrying the same `DecisionId`, and
//! hands it to `resume`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::components::Color;
use crate::core::{EntityId, PlayerId};

/// Identifier of a decision. Unique within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DecisionId(pub u32);

impl DecisionId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for DecisionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Decision({})", self.0)
    }
}

/// The shape of a requested choice.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionKind {
    ChooseTargets {
        legal: Vec<EntityId>,
        min: usize,
        max: usize,
    },
    SelectCards {
        options: Vec<EntityId>,
        min: usize,
        max: usize,
        /// Whether the order of the selection is meaningful.
        ordered: bool,
    },
    YesNo,
    ChooseMode {
        modes: Vec<String>,
        min: usize,
        max: usize,
    },
    ChooseColor { options: Vec<Color> },
    ChooseOption { options: Vec<String> },
    ChooseNumber { min: i32, max: i32 },
    DistributeAmount {
        total: u32,
        targets: Vec<EntityId>,
        min_per_target: u32,
    },
    /// Put every object in an order (first = top).
    OrderObjects { objects: Vec<EntityId> },
    /// Pick the objects forming the first pile; the rest form the second.
    SplitPiles { objects: Vec<EntityId> },
}

impl DecisionKind {
    /// Short name used in error messages.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DecisionKind::ChooseTargets { .. } => "choose targets",
            DecisionKind::SelectCards { .. } => "select cards",
            DecisionKind::YesNo => "yes/no",
            DecisionKind::ChooseMode { .. } => "choose mode",
            DecisionKind::ChooseColor { .. } => "choose color",
            DecisionKind::ChooseOption { .. } => "choose option",
            DecisionKind::ChooseNumber { .. } => "choose number",
            DecisionKind::DistributeAmount { .. } => "distribute amount",
            DecisionKind::OrderObjects { .. } => "order objects",
            DecisionKind::SplitPiles { .. } => "split piles",
        }
    }
}

/// A decision the engine is waiting on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingDecision {
    pub id: DecisionId,
    /// Who must decide.
    pub player: PlayerId,
    /// Human-readable prompt.
    pub prompt: String,
    pub source: Option<EntityId>,
    pub kind: DecisionKind,
}

impl PendingDecision {
    pub fn new(id: DecisionId, player: PlayerId, prompt: impl Into<String>, kind: DecisionKind) -> Self {
        Self {
            id,
            player,
            prompt: prompt.into(),
            source: None,
            kind,
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<EntityId>) -> Self {
        self.source = source;
        self
    }
}

/// The content of an answer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionAnswer {
    Targets(Vec<EntityId>),
    Cards(Vec<EntityId>),
    YesNo(bool),
    Modes(Vec<usize>),
    Color(Color),
    /// Index into the offered options.
    Option(usize),
    Number(i32),
    Distribution(BTreeMap<EntityId, u32>),
    Order(Vec<EntityId>),
    FirstPile(Vec<EntityId>),
}

impl DecisionAnswer {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            DecisionAnswer::Targets(_) => "targets",
            DecisionAnswer::Cards(_) => "cards",
            DecisionAnswer::YesNo(_) => "yes/no",
            DecisionAnswer::Modes(_) => "modes",
            DecisionAnswer::Color(_) => "color",
            DecisionAnswer::Option(_) => "option",
            DecisionAnswer::Number(_) => "number",
            DecisionAnswer::Distribution(_) => "distribution",
            DecisionAnswer::Order(_) => "order",
            DecisionAnswer::FirstPile(_) => "pile",
        }
    }
}

/// A caller's answer to a pending decision.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::EntityId;
/// use ccg_rules::decisions::{DecisionAnswer, DecisionId, DecisionResponse};
///
/// let response = DecisionResponse::cards(DecisionId::new(1), vec![EntityId(7)]);
/// assert_eq!(response.decision_id, DecisionId::new(1));
/// assert_eq!(response.answer, DecisionAnswer::Cards(vec![EntityId(7)]));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionResponse {
    pub decision_id: DecisionId,
    pub answer: DecisionAnswer,
}

impl DecisionResponse {
    #[must_use]
    pub fn new(decision_id: DecisionId, answer: DecisionAnswer) -> Self {
        Self {
            decision_id,
            answer,
        }
    }

    #[must_use]
    pub fn targets(decision_id: DecisionId, targets: Vec<EntityId>) -> Self {
        Self::new(decision_id, DecisionAnswer::Targets(targets))
    }

    #[must_use]
    pub fn cards(decision_id: DecisionId, cards: Vec<EntityId>) -> Self {
        Self::new(decision_id, DecisionAnswer::Cards(cards))
    }

    #[must_use]
    pub fn yes_no(decision_id: DecisionId, answer: bool) -> Self {
        Self::new(decision_id, DecisionAnswer::YesNo(answer))
    }

    #[must_use]
    pub fn modes(decision_id: DecisionId, modes: Vec<usize>) -> Self {
        Self::new(decision_id, DecisionAnswer::Modes(modes))
    }

    #[must_use]
    pub fn color(decision_id: DecisionId, color: Color) -> Self {
        Self::new(decision_id, DecisionAnswer::Color(color))
    }

    #[must_use]
    pub fn option(decision_id: DecisionId, index: usize) -> Self {
        Self::new(decision_id, DecisionAnswer::Option(index))
    }

    #[must_use]
    pub fn number(decision_id: DecisionId, value: i32) -> Self {
        Self::new(decision_id, DecisionAnswer::Number(value))
    }

    #[must_use]
    pub fn distribution(decision_id: DecisionId, amounts: BTreeMap<EntityId, u32>) -> Self {
        Self::new(decision_id, DecisionAnswer::Distribution(amounts))
    }

    #[must_use]
    pub fn order(decision_id: DecisionId, order: Vec<EntityId>) -> Self {
        Self::new(decision_id, DecisionAnswer::Order(order))
    }

    #[must_use]
    pub fn first_pile(decision_id: DecisionId, pile: Vec<EntityId>) -> Self {
        Self::new(decision_id, DecisionAnswer::FirstPile(pile))
    }
}
