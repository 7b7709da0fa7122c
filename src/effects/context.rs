//! Effect execution context.
//!
//! The context is the "who and what" of a resolving effect: its source, its
//! controller, the chosen targets, X, and so on. It is threaded unchanged
//! through nested sub-effects; continuations may update parts of it (targets
//! chosen on resolution, for example) before the remaining work runs.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::filters::FilterContext;

/// Context for resolving an effect.
///
/// ## Example
///
/// ```
/// use ccg_rules::core::{EntityId, PlayerId};
/// use ccg_rules::effects::EffectContext;
///
/// let ctx = EffectContext::new(PlayerId::new(0))
///     .with_source(EntityId(5))
///     .with_target(EntityId(1))
///     .with_x(3);
///
/// assert_eq!(ctx.target(0), Some(EntityId(1)));
/// assert_eq!(ctx.x_value, 3);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectContext {
    /// The card or ability the effect comes from.
    pub source: Option<EntityId>,
    /// The player the effect acts for ("you").
    pub controller: PlayerId,
    /// The singular opponent, when the effect names one.
    pub opponent: Option<PlayerId>,
    /// Chosen targets, in declaration order. Players are entities too.
    pub targets: Vec<EntityId>,
    pub x_value: i32,
    /// Permanents sacrificed as part of the cost.
    pub sacrificed: Vec<EntityId>,
    pub triggering_entity: Option<EntityId>,
    pub triggering_player: Option<PlayerId>,
    /// Damage division committed when the effect was put on the stack.
    pub damage_distribution: BTreeMap<EntityId, i32>,
}

impl EffectContext {
    #[must_use]
    pub fn new(controller: PlayerId) -> Self {
        Self {
            source: None,
            controller,
            opponent: None,
            targets: Vec::new(),
            x_value: 0,
            sacrificed: Vec::new(),
            triggering_entity: None,
            triggering_player: None,
            damage_distribution: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_source(mut self, source: EntityId) -> Self {
        self.source = Some(source);
        self
    }

    #[must_use]
    pub fn with_opponent(mut self, opponent: PlayerId) -> Self {
        self.opponent = Some(opponent);
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: EntityId) -> Self {
        self.targets.push(target);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: impl IntoIterator<Item = EntityId>) -> Self {
        self.targets = targets.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_x(mut self, x: i32) -> Self {
        self.x_value = x;
        self
    }

    #[must_use]
    pub fn with_sacrificed(mut self, sacrificed: impl IntoIterator<Item = EntityId>) -> Self {
        self.sacrificed = sacrificed.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_triggering_entity(mut self, entity: EntityId) -> Self {
        self.triggering_entity = Some(entity);
        self
    }

    #[must_use]
    pub fn with_triggering_player(mut self, player: PlayerId) -> Self {
        self.triggering_player = Some(player);
        self
    }

    #[must_use]
    pub fn with_distribution(mut self, distribution: BTreeMap<EntityId, i32>) -> Self {
        self.damage_distribution = distribution;
        self
    }

    /// The same context acting for another player ("each player ...").
    #[must_use]
    pub fn for_player(&self, player: PlayerId) -> Self {
        let mut ctx = self.clone();
        ctx.controller = player;
        ctx
    }

    #[must_use]
    pub fn target(&self, index: usize) -> Option<EntityId> {
        self.targets.get(index).copied()
    }

    /// Context for filter evaluation.
    #[must_use]
    pub fn filter_context(&self) -> FilterContext {
        FilterContext {
            controller: self.controller,
            source: self.source,
            targets: self.targets.clone(),
        }
    }
}
