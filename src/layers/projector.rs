//! The state projector.
//!
//! ## Algorithm
//!
//! 1. Start from the printed characteristics of every object.
//! 2. Gather layer items: active floating effects, static abilities of
//!    battlefield permanents, and characteristic-defining abilities.
//! 3. Walk the stages in order: control, type, color, ability, P/T set,
//!    P/T modify, counters, rules markers. Within a stage, apply
//!    characteristic-defining abilities first, then everything else oldest
//!    timestamp first.
//!
//! Static abilities pick their affected objects when their stage is
//! reached, by evaluating their filter against the projection built so
//! far. A creature that became a Goblin in the type layer is therefore seen
//! by "Goblins you control get +1/+1". Floating effects keep the set they
//! captured at creation.
//!
//! There is no dependency ordering between effects in the same layer.

use std::collections::{BTreeMap, BTreeSet};

use smallvec::SmallVec;
use tracing::trace;

use super::floating::{ActiveFloatingEffect, Layer, Modification, PtSublayer};
use super::projected::{Characteristics, ProjectedState};
use crate::amounts::AmountEvaluator;
use crate::cards::StaticAbility;
use crate::components::{CardComponent, CounterKind, CountersComponent, EnteredBattlefieldComponent};
use crate::core::{EngineConfig, EntityId, GameState};
use crate::effects::EffectContext;
use crate::filters::{FilterContext, PredicateEvaluator};

type Stage = (Layer, Option<PtSublayer>);

const STAGES: [Stage; 8] = [
    (Layer::Control, None),
    (Layer::Type, None),
    (Layer::Color, None),
    (Layer::Ability, None),
    (Layer::PowerToughness, Some(PtSublayer::SetBase)),
    (Layer::PowerToughness, Some(PtSublayer::Modify)),
    (Layer::PowerToughness, Some(PtSublayer::Counters)),
    (Layer::RulesMarkers, None),
];

enum ItemSource<'a> {
    Floating(&'a ActiveFloatingEffect),
    Static {
        source: EntityId,
        ability: &'a StaticAbility,
    },
}

struct LayerItem<'a> {
    stage: Stage,
    characteristic_defining: bool,
    timestamp: u64,
    source: ItemSource<'a>,
}

/// Project with the default engine configuration.
///
/// ## Example
///
/// ```
/// use ccg_rules::cards::{CardDefinition, CardId};
/// use ccg_rules::core::{GameConfig, GameState, PlayerId};
/// use ccg_rules::layers::{self, Duration, FloatingModification, Modification};
/// use ccg_rules::zones::ZoneKind;
///
/// let mut state = GameState::new(&GameConfig::new(2)).unwrap();
/// let bear = state
///     .spawn_card(&CardDefinition::creature(CardId::new(1), "Bear", 2, 2), PlayerId::new(0), ZoneKind::Battlefield)
///     .unwrap();
/// state.add_floating_effect(
///     FloatingModification::new(Modification::ModifyPowerToughness { power: 3, toughness: 3 }),
///     [bear],
///     Duration::EndOfTurn,
///     None,
///     PlayerId::new(0),
/// );
///
/// let projected = layers::project(&state);
/// assert_eq!(projected.power(bear), Some(5));
/// assert_eq!(projected.toughness(bear), Some(5));
/// ```
#[must_use]
pub fn project(state: &GameState) -> ProjectedState {
    project_with(state, &EngineConfig::default())
}

/// Compute the effective characteristics of every object.
///
/// Pure: the same state always yields the same projection.
#[must_use]
pub fn project_with(state: &GameState, config: &EngineConfig) -> ProjectedState {
    let mut objects = BTreeMap::new();
    for entity in state.entities() {
        if let Some(chars) = Characteristics::base(state, entity) {
            objects.insert(entity, chars);
        }
    }
    let mut projected = ProjectedState::from_objects(objects);

    let items = collect_items(state, config);
    for stage in STAGES {
        let mut stage_items: SmallVec<[&LayerItem<'_>; 8]> =
            items.iter().filter(|item| item.stage == stage).collect();
        stage_items.sort_by_key(|item| (!item.characteristic_defining, item.timestamp));

        for item in stage_items {
            apply_item(state, &mut projected, item);
        }
        if stage.1 == Some(PtSublayer::Counters) {
            apply_counters(state, &mut projected);
        }
    }

    trace!(objects = projected.len(), items = items.len(), "projected state");
    projected
}

fn collect_items<'a>(state: &'a GameState, config: &EngineConfig) -> Vec<LayerItem<'a>> {
    let mut items: Vec<LayerItem<'a>> = state
        .floating_effects()
        .map(|effect| LayerItem {
            stage: (effect.modification.layer, effect.modification.sublayer),
            characteristic_defining: false,
            timestamp: effect.timestamp,
            source: ItemSource::Floating(effect),
        })
        .collect();

    if !config.apply_static_abilities {
        return items;
    }

    let mut holders: Vec<EntityId> = state.entities().collect();
    holders.sort();
    for entity in holders {
        let Some(card) = state.get::<CardComponent>(entity) else {
            continue;
        };
        let on_battlefield = state.is_on_battlefield(entity);
        let timestamp = state
            .get::<EnteredBattlefieldComponent>(entity)
            .map_or(0, |e| e.timestamp);

        for ability in &card.static_abilities {
            let cda = ability.is_characteristic_defining();
            if !on_battlefield && !cda {
                continue;
            }
            items.push(LayerItem {
                stage: static_stage(ability),
                characteristic_defining: cda,
                timestamp,
                source: ItemSource::Static {
                    source: entity,
                    ability,
                },
            });
        }
    }
    items
}

fn static_stage(ability: &StaticAbility) -> Stage {
    match ability {
        StaticAbility::ModifyStatsForGroup { .. } => {
            (Layer::PowerToughness, Some(PtSublayer::Modify))
        }
        StaticAbility::GrantKeywordToGroup { .. } => (Layer::Ability, None),
        StaticAbility::AddCardTypeToGroup { .. } => (Layer::Type, None),
        StaticAbility::CharacteristicDefiningPt { .. } => {
            (Layer::PowerToughness, Some(PtSublayer::SetBase))
        }
    }
}

fn apply_item(state: &GameState, projected: &mut ProjectedState, item: &LayerItem<'_>) {
    match &item.source {
        ItemSource::Floating(effect) => {
            if !effect.is_active(state) {
                return;
            }
            for entity in &effect.affected {
                if let Some(chars) = projected.get_mut(*entity) {
                    apply_modification(chars, &effect.modification.modification);
                }
            }
        }
        ItemSource::Static { source, ability } => {
            apply_static(state, projected, *source, ability);
        }
    }
}

fn apply_static(
    state: &GameState,
    projected: &mut ProjectedState,
    source: EntityId,
    ability: &StaticAbility,
) {
    let Some(controller) = projected
        .controller_of(source)
        .or_else(|| state.owner_of(source))
    else {
        return;
    };

    let (filter, modification) = match ability {
        StaticAbility::CharacteristicDefiningPt { power, toughness } => {
            let ctx = EffectContext::new(controller).with_source(source);
            let eval = AmountEvaluator::with_projection(state, projected);
            let power = eval.evaluate(power, &ctx);
            let toughness = eval.evaluate(toughness, &ctx);
            if let Some(chars) = projected.get_mut(source) {
                apply_modification(
                    chars,
                    &Modification::SetBasePowerToughness { power, toughness },
                );
            }
            return;
        }
        StaticAbility::ModifyStatsForGroup {
            filter,
            power,
            toughness,
        } => (
            filter,
            Modification::ModifyPowerToughness {
                power: *power,
                toughness: *toughness,
            },
        ),
        StaticAbility::GrantKeywordToGroup { filter, keyword } => {
            (filter, Modification::GrantKeyword(*keyword))
        }
        StaticAbility::AddCardTypeToGroup { filter, card_type } => {
            (filter, Modification::AddCardTypes(BTreeSet::from([*card_type])))
        }
    };

    let fctx = FilterContext::new(controller).with_source(source);
    let affected = PredicateEvaluator::with_projection(state, projected).battlefield_matching(filter, &fctx);
    for entity in affected {
        if let Some(chars) = projected.get_mut(entity) {
            apply_modification(chars, &modification);
        }
    }
}

fn apply_counters(state: &GameState, projected: &mut ProjectedState) {
    for entity in state.battlefield() {
        let Some(counters) = state.get::<CountersComponent>(entity) else {
            continue;
        };
        let plus = i32::try_from(counters.count(&CounterKind::PlusOnePlusOne)).unwrap_or(i32::MAX);
        let minus = i32::try_from(counters.count(&CounterKind::MinusOneMinusOne)).unwrap_or(i32::MAX);
        if let Some(chars) = projected.get_mut(entity) {
            apply_modification(
                chars,
                &Modification::ModifyPowerToughness {
                    power: plus - minus,
                    toughness: plus - minus,
                },
            );
        }
    }
}

/// Apply one modification to a set of characteristics.
pub fn apply_modification(chars: &mut Characteristics, modification: &Modification) {
    match modification {
        Modification::ChangeController(player) => chars.controller = Some(*player),
        Modification::AddCardTypes(types) => chars.types.extend(types.iter().copied()),
        Modification::RemoveCardTypes(types) => chars.types.retain(|t| !types.contains(t)),
        Modification::AddSubtypes(subtypes) => chars.subtypes.extend(subtypes.iter().cloned()),
        Modification::SetColors(colors) => chars.colors = *colors,
        Modification::AddColors(colors) => chars.colors = chars.colors.union(*colors),
        Modification::GrantKeyword(keyword) => {
            chars.keywords.insert(*keyword);
        }
        Modification::RemoveKeyword(keyword) => {
            chars.keywords.remove(keyword);
        }
        Modification::SetBasePowerToughness { power, toughness } => {
            chars.power = Some(*power);
            chars.toughness = Some(*toughness);
        }
        Modification::ModifyPowerToughness { power, toughness } => {
            if let Some(p) = chars.power.as_mut() {
                *p = p.saturating_add(*power);
            }
            if let Some(t) = chars.toughness.as_mut() {
                *t = t.saturating_add(*toughness);
            }
        }
        Modification::ExileOnDeath => chars.exile_on_death = true,
        Modification::RegenerationShield => chars.regeneration_shields += 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amounts::{DynamicAmount, PlayerSelector};
    use crate::cards::{CardDefinition, CardId};
    use crate::components::{CardType, Color, ColorSet, Keyword};
    use crate::core::{GameConfig, PlayerId};
    use crate::filters::{ControllerPredicate, ObjectFilter};
    use crate::layers::{Duration, FloatingModification};
    use crate::zones::{ZoneKey, ZoneKind, ZonePosition};

    const P0: PlayerId = PlayerId::new(0);
    const P1: PlayerId = PlayerId::new(1);

    fn state() -> GameState {
        GameState::new(&GameConfig::new(2)).unwrap()
    }

    fn bear() -> CardDefinition {
        CardDefinition::creature(CardId::new(1), "Bear", 2, 2).with_subtype("Bear")
    }

    fn float(state: &mut GameState, m: Modification, target: EntityId) {
        state.add_floating_effect(FloatingModification::new(m), [target], Duration::EndOfTurn, None, P0);
    }

    #[test]
    fn test_base_characteristics_without_effects() {
        let mut state = state();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        let projected = project(&state);
        let chars = projected.get(bear).unwrap();
        assert_eq!(chars.power, Some(2));
        assert_eq!(chars.controller, Some(P0));
        assert!(projected.get(EntityId::player(P0)).is_none());
    }

    #[test]
    fn test_set_base_then_modify() {
        let mut state = state();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        // Modify created first still applies after the set.
        float(&mut state, Modification::ModifyPowerToughness { power: 2, toughness: 2 }, bear);
        float(&mut state, Modification::SetBasePowerToughness { power: 0, toughness: 1 }, bear);

        let projected = project(&state);
        assert_eq!(projected.power(bear), Some(2));
        assert_eq!(projected.toughness(bear), Some(3));
    }

    #[test]
    fn test_later_timestamp_wins_set_base() {
        let mut state = state();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        float(&mut state, Modification::SetBasePowerToughness { power: 1, toughness: 1 }, bear);
        float(&mut state, Modification::SetBasePowerToughness { power: 4, toughness: 4 }, bear);

        assert_eq!(project(&state).power(bear), Some(4));
    }

    #[test]
    fn test_counters_after_modify() {
        let mut state = state();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        state
            .insert_component(
                bear,
                CountersComponent::default()
                    .added(CounterKind::PlusOnePlusOne, 2)
                    .added(CounterKind::MinusOneMinusOne, 1),
            )
            .unwrap();
        float(&mut state, Modification::SetBasePowerToughness { power: 0, toughness: 1 }, bear);

        let projected = project(&state);
        assert_eq!(projected.power(bear), Some(1));
        assert_eq!(projected.toughness(bear), Some(2));
    }

    #[test]
    fn test_control_change_feeds_static_abilities() {
        let mut state = state();
        let anthem = CardDefinition::new(CardId::new(2), "Anthem", [CardType::Enchantment]).with_static(
            StaticAbility::anthem(ObjectFilter::creature().controlled_by(ControllerPredicate::You), 1, 1),
        );
        state.spawn_card(&anthem, P0, ZoneKind::Battlefield).unwrap();
        let stolen = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        let theirs = state.spawn_card(&bear(), P1, ZoneKind::Battlefield).unwrap();
        float(&mut state, Modification::ChangeController(P0), stolen);

        let projected = project(&state);
        assert_eq!(projected.controller_of(stolen), Some(P0));
        assert_eq!(projected.power(stolen), Some(3));
        assert_eq!(projected.power(theirs), Some(2));
    }

    #[test]
    fn test_type_change_feeds_group_keyword() {
        let mut state = state();
        let lord = CardDefinition::new(CardId::new(3), "Lord", [CardType::Enchantment]).with_static(
            StaticAbility::GrantKeywordToGroup {
                filter: ObjectFilter::creature(),
                keyword: Keyword::Flying,
            },
        );
        state.spawn_card(&lord, P0, ZoneKind::Battlefield).unwrap();
        let land = state
            .spawn_card(&CardDefinition::land(CardId::new(4), "Forest"), P0, ZoneKind::Battlefield)
            .unwrap();
        float(&mut state, Modification::AddCardTypes(BTreeSet::from([CardType::Creature])), land);

        assert!(project(&state).has_keyword(land, Keyword::Flying));
    }

    #[test]
    fn test_static_stops_when_source_leaves() {
        let mut state = state();
        let anthem = CardDefinition::new(CardId::new(2), "Anthem", [CardType::Enchantment])
            .with_static(StaticAbility::anthem(ObjectFilter::creature(), 1, 1));
        let source = state.spawn_card(&anthem, P0, ZoneKind::Battlefield).unwrap();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        assert_eq!(project(&state).power(bear), Some(3));

        state
            .move_entity(source, ZoneKey::graveyard(P0), ZonePosition::Top, None)
            .unwrap();
        assert_eq!(project(&state).power(bear), Some(2));
    }

    #[test]
    fn test_static_abilities_can_be_disabled() {
        let mut state = state();
        let anthem = CardDefinition::new(CardId::new(2), "Anthem", [CardType::Enchantment])
            .with_static(StaticAbility::anthem(ObjectFilter::creature(), 1, 1));
        state.spawn_card(&anthem, P0, ZoneKind::Battlefield).unwrap();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();

        let config = EngineConfig::default().with_static_abilities(false);
        assert_eq!(project_with(&state, &config).power(bear), Some(2));
    }

    #[test]
    fn test_characteristic_defining_pt() {
        let mut state = state();
        let def = CardDefinition::creature(CardId::new(5), "Hand Counter", 0, 0).with_static(
            StaticAbility::CharacteristicDefiningPt {
                power: DynamicAmount::CardsInHand(PlayerSelector::You),
                toughness: DynamicAmount::CardsInHand(PlayerSelector::You).plus(DynamicAmount::fixed(1)),
            },
        );
        let creature = state.spawn_card(&def, P0, ZoneKind::Battlefield).unwrap();
        state.spawn_card(&bear(), P0, ZoneKind::Hand).unwrap();
        state.spawn_card(&bear(), P0, ZoneKind::Hand).unwrap();
        // A later set-base effect overrides the CDA.
        let projected = project(&state);
        assert_eq!(projected.power(creature), Some(2));
        assert_eq!(projected.toughness(creature), Some(3));

        float(&mut state, Modification::SetBasePowerToughness { power: 7, toughness: 7 }, creature);
        assert_eq!(project(&state).power(creature), Some(7));
    }

    #[test]
    fn test_color_layer() {
        let mut state = state();
        let bear = state
            .spawn_card(&bear().with_color(Color::Green), P0, ZoneKind::Battlefield)
            .unwrap();
        float(&mut state, Modification::SetColors(ColorSet::of(&[Color::Black])), bear);

        let projected = project(&state);
        let colors = projected.get(bear).unwrap().colors;
        assert!(colors.contains(Color::Black));
        assert!(!colors.contains(Color::Green));
    }

    #[test]
    fn test_projection_is_idempotent() {
        let mut state = state();
        let bear = state.spawn_card(&bear(), P0, ZoneKind::Battlefield).unwrap();
        float(&mut state, Modification::GrantKeyword(Keyword::Trample), bear);
        float(&mut state, Modification::RegenerationShield, bear);

        let first = project(&state);
        let second = project(&state);
        assert_eq!(first, second);
        assert_eq!(first.get(bear).unwrap().regeneration_shields, 1);
    }
}
