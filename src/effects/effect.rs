//! Effect definitions.
//!
//! An `Effect` is the declarative script attached to a card or ability.
//! It is a closed enum: every variant has exactly one executor, and the
//! registry refuses to start if one is missing. Parameters that depend on
//! the game are `DynamicAmount`s, `EntityReference`s and `ObjectFilter`s,
//! resolved when the effect executes.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::amounts::{Condition, DynamicAmount, EntityReference, PlayerSelector};
use crate::components::{CardType, ColorSet, CounterKind, Keyword, Subtype};
use crate::continuation::SequentialChoice;
use crate::filters::ObjectFilter;
use crate::layers::Duration;
use crate::targeting::TargetSpec;
use crate::zones::ZoneKind;

/// A token to create.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenSpec {
    pub name: String,
    pub colors: ColorSet,
    pub types: BTreeSet<CardType>,
    pub subtypes: BTreeSet<Subtype>,
    pub power: Option<i32>,
    pub toughness: Option<i32>,
    pub keywords: BTreeSet<Keyword>,
}

impl TokenSpec {
    /// A creature token.
    pub fn creature(name: impl Into<String>, power: i32, toughness: i32) -> Self {
        Self {
            name: name.into(),
            colors: ColorSet::COLORLESS,
            types: BTreeSet::from([CardType::Creature]),
            subtypes: BTreeSet::new(),
            power: Some(power),
            toughness: Some(toughness),
            keywords: BTreeSet::new(),
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtypes.insert(Subtype::new(subtype));
        self
    }

    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword) -> Self {
        self.keywords.insert(keyword);
        self
    }

    #[must_use]
    pub fn with_colors(mut self, colors: ColorSet) -> Self {
        self.colors = colors;
        self
    }
}

/// One option of a modal effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mode {
    pub description: String,
    pub effect: Effect,
}

impl Mode {
    pub fn new(description: impl Into<String>, effect: Effect) -> Self {
        Self {
            description: description.into(),
            effect,
        }
    }
}

/// A cost a player may pay to avoid a punishment.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlternativeCost {
    PayLife(i32),
    DiscardCards(u32),
    SacrificePermanents { filter: ObjectFilter, count: u32 },
}

/// Declarative effect.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    // === Continuous ===
    /// "target creature gets +N/+N".
    ModifyStats {
        target: EntityReference,
        power: DynamicAmount,
        toughness: DynamicAmount,
        duration: Duration,
    },
    SetBasePowerToughness {
        target: EntityReference,
        power: i32,
        toughness: i32,
        duration: Duration,
    },
    /// "becomes a N/N creature" (type layer + P/T set).
    Animate {
        target: EntityReference,
        power: i32,
        toughness: i32,
        subtypes: BTreeSet<Subtype>,
        duration: Duration,
    },
    GrantKeyword {
        target: EntityReference,
        keyword: Keyword,
        duration: Duration,
    },
    RemoveKeyword {
        target: EntityReference,
        keyword: Keyword,
        duration: Duration,
    },
    /// "creatures you control get +N/+N": the group is captured now.
    ModifyStatsForGroup {
        filter: ObjectFilter,
        power: DynamicAmount,
        toughness: DynamicAmount,
        duration: Duration,
    },
    GrantKeywordToGroup {
        filter: ObjectFilter,
        keyword: Keyword,
        duration: Duration,
    },
    GainControl {
        target: EntityReference,
        duration: Duration,
    },
    /// The next time the target would be destroyed this turn, regenerate it.
    Regenerate { target: EntityReference },
    /// If the target would die this turn, exile it instead.
    ExileOnDeath { target: EntityReference },

    // === Permanent state ===
    Tap { target: EntityReference },
    Untap { target: EntityReference },
    AddCounters {
        target: EntityReference,
        kind: CounterKind,
        amount: DynamicAmount,
    },
    RemoveCounters {
        target: EntityReference,
        kind: CounterKind,
        amount: DynamicAmount,
    },
    /// Distribute counters among the chosen targets, at least one each.
    DistributeCounters {
        kind: CounterKind,
        amount: DynamicAmount,
    },

    // === Removal ===
    Destroy { target: EntityReference },
    DestroyAll { filter: ObjectFilter },
    Exile { target: EntityReference },
    ReturnToHand { target: EntityReference },
    /// Each selected player sacrifices `count` permanents matching `filter`.
    Sacrifice {
        player: PlayerSelector,
        filter: ObjectFilter,
        count: DynamicAmount,
    },

    // === Damage & life ===
    DealDamage {
        target: EntityReference,
        amount: DynamicAmount,
    },
    /// Divide damage among the chosen targets, at least one each.
    DealDividedDamage { amount: DynamicAmount },
    GainLife {
        player: PlayerSelector,
        amount: DynamicAmount,
    },
    LoseLife {
        player: PlayerSelector,
        amount: DynamicAmount,
    },

    // === Library & hand ===
    Draw {
        player: PlayerSelector,
        count: DynamicAmount,
    },
    /// Each selected player discards cards of their choice.
    Discard {
        player: PlayerSelector,
        count: DynamicAmount,
    },
    DiscardAtRandom {
        player: PlayerSelector,
        count: DynamicAmount,
    },
    Mill {
        player: PlayerSelector,
        count: DynamicAmount,
    },
    ShuffleLibrary { player: PlayerSelector },
    /// The controller scries N.
    Scry { count: DynamicAmount },
    /// The controller looks at the top N and puts them back in any order.
    LookAtTopAndReorder { count: DynamicAmount },
    /// The controller searches their library for up to `count` cards.
    SearchLibrary {
        filter: ObjectFilter,
        count: u32,
        destination: ZoneKind,
        /// Enter the battlefield tapped.
        tapped: bool,
    },
    /// Reveal the top N; `separator` splits them into two piles, the
    /// controller puts one into their hand and the other into the graveyard.
    RevealAndSeparate {
        count: DynamicAmount,
        separator: PlayerSelector,
    },
    CreateToken {
        token: TokenSpec,
        count: DynamicAmount,
        controller: PlayerSelector,
    },

    // === Choice & composition ===
    Composite(Vec<Effect>),
    Conditional {
        condition: Condition,
        then: Box<Effect>,
        otherwise: Option<Box<Effect>>,
    },
    /// "you may ...".
    May { prompt: String, effect: Box<Effect> },
    Modal {
        modes: Vec<Mode>,
        min: usize,
        max: usize,
    },
    /// "`payer` may pay `cost`. If they don't, `suffer`."
    PayOrSuffer {
        payer: PlayerSelector,
        cost: AlternativeCost,
        suffer: Box<Effect>,
    },
    /// "target gains protection from the color of your choice".
    ChooseColorProtection {
        target: EntityReference,
        duration: Duration,
    },
    /// Choose targets while resolving, then run the inner effect with them.
    TargetOnResolution { spec: TargetSpec, effect: Box<Effect> },
    /// Each selected player, in turn order, makes the same choice.
    EachPlayerChooses {
        players: PlayerSelector,
        choice: SequentialChoice,
    },
}

/// Fieldless discriminant of [`Effect`], used to key the executor registry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EffectKind {
    ModifyStats,
    SetBasePowerToughness,
    Animate,
    GrantKeyword,
    RemoveKeyword,
    ModifyStatsForGroup,
    GrantKeywordToGroup,
    GainControl,
    Regenerate,
    ExileOnDeath,
    Tap,
    Untap,
    AddCounters,
    RemoveCounters,
    DistributeCounters,
    Destroy,
    DestroyAll,
    Exile,
    ReturnToHand,
    Sacrifice,
    DealDamage,
    DealDividedDamage,
    GainLife,
    LoseLife,
    Draw,
    Discard,
    DiscardAtRandom,
    Mill,
    ShuffleLibrary,
    Scry,
    LookAtTopAndReorder,
    SearchLibrary,
    RevealAndSeparate,
    CreateToken,
    Composite,
    Conditional,
    May,
    Modal,
    PayOrSuffer,
    ChooseColorProtection,
    TargetOnResolution,
    EachPlayerChooses,
}

impl EffectKind {
    pub const ALL: [EffectKind; 42] = [
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
        EffectKind::Tap,
        EffectKind::Untap,
        EffectKind::AddCounters,
        EffectKind::RemoveCounters,
        EffectKind::DistributeCounters,
        EffectKind::Destroy,
        EffectKind::DestroyAll,
        EffectKind::Exile,
        EffectKind::ReturnToHand,
        EffectKind::Sacrifice,
        EffectKind::DealDamage,
        EffectKind::DealDividedDamage,
        EffectKind::GainLife,
        EffectKind::LoseLife,
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
        EffectKind::Composite,
        EffectKind::Conditional,
        EffectKind::May,
        EffectKind::Modal,
        EffectKind::PayOrSuffer,
        EffectKind::ChooseColorProtection,
        EffectKind::TargetOnResolution,
        EffectKind::EachPlayerChooses,
    ];
}

impl Effect {
    /// The registry key of this effect.
    #[must_use]
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::ModifyStats { .. } => EffectKind::ModifyStats,
            Effect::SetBasePowerToughness { .. } => EffectKind::SetBasePowerToughness,
            Effect::Animate { .. } => EffectKind::Animate,
            Effect::GrantKeyword { .. } => EffectKind::GrantKeyword,
            Effect::RemoveKeyword { .. } => EffectKind::RemoveKeyword,
            Effect::ModifyStatsForGroup { .. } => EffectKind::ModifyStatsForGroup,
            Effect::GrantKeywordToGroup { .. } => EffectKind::GrantKeywordToGroup,
            Effect::GainControl { .. } => EffectKind::GainControl,
            Effect::Regenerate { .. } => EffectKind::Regenerate,
            Effect::ExileOnDeath { .. } => EffectKind::ExileOnDeath,
            Effect::Tap { .. } => EffectKind::Tap,
            Effect::Untap { .. } => EffectKind::Untap,
            Effect::AddCounters { .. } => EffectKind::AddCounters,
            Effect::RemoveCounters { .. } => EffectKind::RemoveCounters,
            Effect::DistributeCounters { .. } => EffectKind::DistributeCounters,
            Effect::Destroy { .. } => EffectKind::Destroy,
            Effect::DestroyAll { .. } => EffectKind::DestroyAll,
            Effect::Exile { .. } => EffectKind::Exile,
            Effect::ReturnToHand { .. } => EffectKind::ReturnToHand,
            Effect::Sacrifice { .. } => EffectKind::Sacrifice,
            Effect::DealDamage { .. } => EffectKind::DealDamage,
            Effect::DealDividedDamage { .. } => EffectKind::DealDividedDamage,
            Effect::GainLife { .. } => EffectKind::GainLife,
            Effect::LoseLife { .. } => EffectKind::LoseLife,
            Effect::Draw { .. } => EffectKind::Draw,
            Effect::Discard { .. } => EffectKind::Discard,
            Effect::DiscardAtRandom { .. } => EffectKind::DiscardAtRandom,
            Effect::Mill { .. } => EffectKind::Mill,
            Effect::ShuffleLibrary { .. } => EffectKind::ShuffleLibrary,
            Effect::Scry { .. } => EffectKind::Scry,
            Effect::LookAtTopAndReorder { .. } => EffectKind::LookAtTopAndReorder,
            Effect::SearchLibrary { .. } => EffectKind::SearchLibrary,
            Effect::RevealAndSeparate { .. } => EffectKind::RevealAndSeparate,
            Effect::CreateToken { .. } => EffectKind::CreateToken,
            Effect::Composite(_) => EffectKind::Composite,
            Effect::Conditional { .. } => EffectKind::Conditional,
            Effect::May { .. } => EffectKind::May,
            Effect::Modal { .. } => EffectKind::Modal,
            Effect::PayOrSuffer { .. } => EffectKind::PayOrSuffer,
            Effect::ChooseColorProtection { .. } => EffectKind::ChooseColorProtection,
            Effect::TargetOnResolution { .. } => EffectKind::TargetOnResolution,
            Effect::EachPlayerChooses { .. } => EffectKind::EachPlayerChooses,
        }
    }

    // === Convenience constructors ===

    /// "target creature gets +P/+T until end of turn".
    #[must_use]
    pub fn pump_target(power: i32, toughness: i32) -> Self {
        Effect::ModifyStats {
            target: EntityReference::Target(0),
            power: DynamicAmount::Fixed(power),
            toughness: DynamicAmount::Fixed(toughness),
            duration: Duration::EndOfTurn,
        }
    }

    #[must_use]
    pub fn destroy_target() -> Self {
        Effect::Destroy {
            target: EntityReference::Target(0),
        }
    }

    #[must_use]
    pub fn damage_target(amount: i32) -> Self {
        Effect::DealDamage {
            target: EntityReference::Target(0),
            amount: DynamicAmount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn draw(count: i32) -> Self {
        Effect::Draw {
            player: PlayerSelector::You,
            count: DynamicAmount::Fixed(count),
        }
    }

    #[must_use]
    pub fn gain_life(amount: i32) -> Self {
        Effect::GainLife {
            player: PlayerSelector::You,
            amount: DynamicAmount::Fixed(amount),
        }
    }

    #[must_use]
    pub fn discard(player: PlayerSelector, count: i32) -> Self {
        Effect::Discard {
            player,
            count: DynamicAmount::Fixed(count),
        }
    }

    #[must_use]
    pub fn composite(effects: impl IntoIterator<Item = Effect>) -> Self {
        Effect::Composite(effects.into_iter().collect())
    }

    #[must_use]
    pub fn may(prompt: impl Into<String>, effect: Effect) -> Self {
        Effect::May {
            prompt: prompt.into(),
            effect: Box::new(effect),
        }
    }
}
