//! Legal target computation.
//!
//! The resolver works against the projected state, so a land animated into
//! a creature is a legal "target creature" and a creature that gained
//! hexproof is not. Results are sorted by entity id.

use crate::amounts::AmountEvaluator;
use crate::components::{CardType, Keyword};
use crate::core::{EntityId, GameState, PlayerId};
use crate::effects::EffectContext;
use crate::filters::{ObjectFilter, PredicateEvaluator};
use crate::layers::{Characteristics, ProjectedState};
use crate::zones::ZoneKind;

use super::requirement::{PlayerFilter, TargetRequirement, TargetSpec};

/// Computes and validates target selections.
#[derive(Clone, Copy, Debug)]
pub struct TargetResolver<'a> {
    state: &'a GameState,
    projection: &'a ProjectedState,
}

impl<'a> TargetResolver<'a> {
    #[must_use]
    pub fn new(state: &'a GameState, projection: &'a ProjectedState) -> Self {
        Self { state, projection }
    }

    /// Every legal target for `requirement`, sorted.
    #[must_use]
    pub fn legal_targets(&self, requirement: &TargetRequirement, ctx: &EffectContext) -> Vec<EntityId> {
        let mut targets = self.collect(requirement, ctx);
        targets.sort();
        targets.dedup();
        targets
    }

    fn collect(&self, requirement: &TargetRequirement, ctx: &EffectContext) -> Vec<EntityId> {
        let eval = PredicateEvaluator::with_projection(self.state, self.projection);
        let fctx = ctx.filter_context();

        match requirement {
            TargetRequirement::Creature(filter) => self
                .battlefield_matching(&eval, filter, ctx)
                .into_iter()
                .filter(|e| self.projection.is_type(*e, CardType::Creature))
                .collect(),
            TargetRequirement::Permanent(filter) => self.battlefield_matching(&eval, filter, ctx),
            TargetRequirement::Player(filter) => self.players(*filter, ctx.controller),
            TargetRequirement::CardInZone { zone, filter } => {
                let mut found = Vec::new();
                for player in self.state.players() {
                    let contents = self.state.zone(player, *zone);
                    found.extend(eval.select(filter, contents, &fctx));
                }
                found
            }
            TargetRequirement::Spell(filter) => {
                let stack = self.state.zones.all_of_kind(ZoneKind::Stack);
                eval.select(filter, stack, &fctx)
                    .into_iter()
                    .filter(|e| self.targetable_by(*e, ctx))
                    .collect()
            }
            TargetRequirement::AnyTarget => {
                let mut found: Vec<EntityId> = self
                    .battlefield_matching(&eval, &ObjectFilter::any(), ctx)
                    .into_iter()
                    .filter(|e| {
                        self.projection.is_type(*e, CardType::Creature)
                            || self.projection.is_type(*e, CardType::Planeswalker)
                    })
                    .collect();
                found.extend(self.players(PlayerFilter::Any, ctx.controller));
                found
            }
            TargetRequirement::OtherThan {
                requirement,
                excluded,
            } => {
                let excluded = AmountEvaluator::with_projection(self.state, self.projection)
                    .resolve_entity(*excluded, ctx);
                self.collect(requirement, ctx)
                    .into_iter()
                    .filter(|e| Some(*e) != excluded)
                    .collect()
            }
        }
    }

    fn battlefield_matching(
        &self,
        eval: &PredicateEvaluator<'_>,
        filter: &ObjectFilter,
        ctx: &EffectContext,
    ) -> Vec<EntityId> {
        eval.battlefield_matching(filter, &ctx.filter_context())
            .into_iter()
            .filter(|e| self.targetable_by(*e, ctx))
            .collect()
    }

    fn players(&self, filter: PlayerFilter, you: PlayerId) -> Vec<EntityId> {
        self.state
            .players()
            .filter(|p| match filter {
                PlayerFilter::Any => true,
                PlayerFilter::You => *p == you,
                PlayerFilter::Opponent => *p != you,
            })
            .map(EntityId::player)
            .collect()
    }

    /// Shroud, hexproof and protection from the source's colors.
    #[must_use]
    pub fn targetable_by(&self, entity: EntityId, ctx: &EffectContext) -> bool {
        let Some(chars) = self.projection.get(entity) else {
            return true;
        };
        if chars.has_keyword(Keyword::Shroud) {
            return false;
        }
        if chars.has_keyword(Keyword::Hexproof) && chars.controller != Some(ctx.controller) {
            return false;
        }
        let source_colors = ctx
            .source
            .and_then(|s| {
                self.projection
                    .get(s)
                    .cloned()
                    .or_else(|| Characteristics::base(self.state, s))
            })
            .map(|c| c.colors);
        if let Some(colors) = source_colors {
            let protected = chars.keywords.iter().any(|k| match k {
                Keyword::ProtectionFrom(color) => colors.contains(*color),
                _ => false,
            });
            if protected {
                return false;
            }
        }
        true
    }

    /// Whether enough legal targets exist for `spec`.
    #[must_use]
    pub fn has_enough_targets(&self, spec: &TargetSpec, ctx: &EffectContext) -> bool {
        let available = self.legal_targets(&spec.requirement, ctx).len();
        let (min, _) = spec.bounds(available);
        available >= min
    }

    /// Validate a selection of targets.
    #[must_use]
    pub fn validate_selection(&self, spec: &TargetSpec, ctx: &EffectContext, selected: &[EntityId]) -> bool {
        let legal = self.legal_targets(&spec.requirement, ctx);
        let (min, max) = spec.bounds(legal.len());
        if selected.len() < min || selected.len() > max {
            return false;
        }
        let mut seen = Vec::with_capacity(selected.len());
        for entity in selected {
            if !legal.contains(entity) || seen.contains(entity) {
                return false;
            }
            seen.push(*entity);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{CardDefinition, CardId};
    use crate::components::Color;
    use crate::core::GameConfig;
    use crate::filters::ControllerPredicate;
    use crate::layers::project;
    use crate::targeting::TargetCount;

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn creature(id: u32, name: &str) -> CardDefinition {
        CardDefinition::creature(CardId::new(id), name, 2, 2)
    }

    #[test]
    fn test_creature_targets_exclude_shroud_and_hexproof() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let plain = state.spawn_card(&creature(1, "Bear"), P1, ZoneKind::Battlefield).unwrap();
        let shroud = state
            .spawn_card(&creature(2, "Shroud").with_keyword(Keyword::Shroud), P0, ZoneKind::Battlefield)
            .unwrap();
        let hexproof_theirs = state
            .spawn_card(&creature(3, "Hex").with_keyword(Keyword::Hexproof), P1, ZoneKind::Battlefield)
            .unwrap();
        let hexproof_mine = state
            .spawn_card(&creature(3, "Hex").with_keyword(Keyword::Hexproof), P0, ZoneKind::Battlefield)
            .unwrap();

        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let targets = resolver.legal_targets(&TargetRequirement::creature(), &EffectContext::new(P0));

        assert!(targets.contains(&plain));
        assert!(targets.contains(&hexproof_mine));
        assert!(!targets.contains(&shroud));
        assert!(!targets.contains(&hexproof_theirs));
    }

    #[test]
    fn test_protection_from_source_color() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let source = state
            .spawn_card(&creature(1, "Black Knight").with_color(Color::Black), P0, ZoneKind::Battlefield)
            .unwrap();
        let white_knight = state
            .spawn_card(
                &creature(2, "White Knight").with_keyword(Keyword::ProtectionFrom(Color::Black)),
                P1,
                ZoneKind::Battlefield,
            )
            .unwrap();

        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let ctx = EffectContext::new(P0).with_source(source);
        assert!(!resolver.legal_targets(&TargetRequirement::creature(), &ctx).contains(&white_knight));
        assert!(resolver
            .legal_targets(&TargetRequirement::creature(), &EffectContext::new(P0))
            .contains(&white_knight));
    }

    #[test]
    fn test_other_than_excludes_source() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let source = state.spawn_card(&creature(1, "A"), P0, ZoneKind::Battlefield).unwrap();
        let other = state.spawn_card(&creature(2, "B"), P0, ZoneKind::Battlefield).unwrap();

        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let ctx = EffectContext::new(P0).with_source(source);
        let targets =
            resolver.legal_targets(&TargetRequirement::creature().other_than_source(), &ctx);
        assert_eq!(targets, vec![other]);
    }

    #[test]
    fn test_card_in_zone_scans_every_player() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let mine = state.spawn_card(&creature(1, "A"), P0, ZoneKind::Graveyard).unwrap();
        let theirs = state.spawn_card(&creature(2, "B"), P1, ZoneKind::Graveyard).unwrap();
        state.spawn_card(&creature(3, "C"), P1, ZoneKind::Hand).unwrap();

        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let ctx = EffectContext::new(P0);

        let all = resolver.legal_targets(&TargetRequirement::card_in_graveyard(ObjectFilter::creature()), &ctx);
        assert_eq!(all, vec![mine, theirs]);

        let own = TargetRequirement::card_in_graveyard(
            ObjectFilter::creature().controlled_by(ControllerPredicate::OwnedByYou),
        );
        assert_eq!(resolver.legal_targets(&own, &ctx), vec![mine]);
    }

    #[test]
    fn test_any_target_and_players() {
        let mut state = GameState::new(&GameConfig::new(2)).unwrap();
        let bear = state.spawn_card(&creature(1, "Bear"), P1, ZoneKind::Battlefield).unwrap();
        state
            .spawn_card(&CardDefinition::land(CardId::new(2), "Forest"), P1, ZoneKind::Battlefield)
            .unwrap();

        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let ctx = EffectContext::new(P0);
        assert_eq!(
            resolver.legal_targets(&TargetRequirement::AnyTarget, &ctx),
            vec![EntityId::player(P0), EntityId::player(P1), bear]
        );
        assert_eq!(
            resolver.legal_targets(&TargetRequirement::opponent(), &ctx),
            vec![EntityId::player(P1)]
        );
    }

    #[test]
    fn test_validate_selection() {
        let state = GameState::new(&GameConfig::new(2)).unwrap();
        let projection = project(&state);
        let resolver = TargetResolver::new(&state, &projection);
        let ctx = EffectContext::new(P0);
        let spec = TargetSpec::single(TargetRequirement::opponent());

        assert!(resolver.validate_selection(&spec, &ctx, &[EntityId::player(P1)]));
        assert!(!resolver.validate_selection(&spec, &ctx, &[EntityId::player(P0)]));
        assert!(!resolver.validate_selection(&spec, &ctx, &[]));

        let optional = spec.clone().optional();
        assert!(resolver.validate_selection(&optional, &ctx, &[]));

        let many = TargetSpec::single(TargetRequirement::player()).with_count(TargetCount::UpTo(2));
        assert!(resolver.validate_selection(&many, &ctx, &[EntityId::player(P0), EntityId::player(P1)]));
        assert!(!resolver.validate_selection(&many, &ctx, &[EntityId::player(P0), EntityId::player(P0)]));
        assert!(resolver.has_enough_targets(&many, &ctx));
    }
}
