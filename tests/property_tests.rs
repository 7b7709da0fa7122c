//! Property tests for filters and projection.

use proptest::prelude::*;

use ccg_rules::amounts::EntityReference;
use ccg_rules::cards::{CardDefinition, CardId};
use ccg_rules::components::{CardType, Color, Keyword};
use ccg_rules::core::{EngineConfig, EntityId, GameConfig, GameState, PlayerId};
use ccg_rules::effects::{Effect, EffectContext};
use ccg_rules::filters::{CardPredicate, Comparison, FilterContext, ObjectFilter, PredicateEvaluator, StatePredicate};
use ccg_rules::layers::Duration;
use ccg_rules::rules::RulesEngine;
use ccg_rules::zones::ZoneKind;

const COLORS: [Color; 5] = [Color::White, Color::Blue, Color::Black, Color::Red, Color::Green];
const KEYWORDS: [Keyword; 4] = [Keyword::Flying, Keyword::Trample, Keyword::Reach, Keyword::Haste];

#[derive(Clone, Debug)]
struct CardShape {
    creature: bool,
    color: usize,
    keyword: Option<usize>,
    power: i32,
    owner: u8,
}

fn card_shape() -> impl Strategy<Value = CardShape> {
    (any::<bool>(), 0..5usize, proptest::option::of(0..4usize), 0..6i32, 0..2u8).prop_map(
        |(creature, color, keyword, power, owner)| CardShape {
            creature,
            color,
            keyword,
            power,
            owner,
        },
    )
}

fn leaf() -> impl Strategy<Value = CardPredicate> {
    prop_oneof![
        Just(CardPredicate::IsCardType(CardType::Creature)),
        Just(CardPredicate::IsCardType(CardType::Artifact)),
        (0..5usize).prop_map(|i| CardPredicate::HasColor(COLORS[i])),
        (0..4usize).prop_map(|i| CardPredicate::HasKeyword(KEYWORDS[i])),
        (0..6i32).prop_map(|n| CardPredicate::Power(Comparison::AtLeast(n))),
        Just(CardPredicate::Colorless),
    ]
}

fn predicate() -> impl Strategy<Value = CardPredicate> {
    leaf().prop_recursive(3, 12, 3, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..3).prop_map(CardPredicate::And),
            prop::collection::vec(inner.clone(), 0..3).prop_map(CardPredicate::Or),
            inner.prop_map(|p| CardPredicate::Not(Box::new(p))),
        ]
    })
}

fn build(shapes: &[CardShape]) -> (GameState, Vec<EntityId>) {
    let mut state = GameState::new(&GameConfig::new(2)).unwrap();
    let mut ids = Vec::new();
    for (i, shape) in shapes.iter().enumerate() {
        let id = CardId::new(u32::try_from(i).unwrap());
        let mut def = if shape.creature {
            CardDefinition::creature(id, "Creature", shape.power, shape.power)
        } else {
            CardDefinition::new(id, "Relic", [CardType::Artifact])
        };
        def = def.with_color(COLORS[shape.color]);
        if let Some(k) = shape.keyword {
            def = def.with_keyword(KEYWORDS[k]);
        }
        ids.push(
            state
                .spawn_card(&def, PlayerId::new(shape.owner), ZoneKind::Battlefield)
                .unwrap(),
        );
    }
    (state, ids)
}

proptest! {
    /// A filter holding two predicates matches exactly when both do, and
    /// `Not` flips the result.
    #[test]
    fn prop_filter_composability(
        shapes in prop::collection::vec(card_shape(), 1..8),
        a in predicate(),
        b in predicate(),
        tapped in any::<bool>(),
    ) {
        let (state, ids) = build(&shapes);
        let eval = PredicateEvaluator::new(&state);
        let ctx = FilterContext::new(PlayerId::new(0));
        let only = |p: &CardPredicate| ObjectFilter::any().with_card(p.clone());

        for entity in ids {
            let ma = eval.matches(&only(&a), entity, &ctx);
            let mb = eval.matches(&only(&b), entity, &ctx);
            let both = ObjectFilter::any().with_card(a.clone()).with_card(b.clone());
            prop_assert_eq!(eval.matches(&both, entity, &ctx), ma && mb);
            let and = only(&CardPredicate::And(vec![a.clone(), b.clone()]));
            prop_assert_eq!(eval.matches(&and, entity, &ctx), ma && mb);
            let not = only(&CardPredicate::Not(Box::new(a.clone())));
            prop_assert_eq!(eval.matches(&not, entity, &ctx), !ma);

            // Axes combine the same way.
            let state_pred = if tapped { StatePredicate::Tapped } else { StatePredicate::Untapped };
            let ms = eval.matches(&ObjectFilter::any().with_state(state_pred.clone()), entity, &ctx);
            let axes = only(&a).with_state(state_pred);
            prop_assert_eq!(eval.matches(&axes, entity, &ctx), ma && ms);
        }
    }

    /// Projecting twice gives the same result.
    #[test]
    fn prop_projection_idempotent(
        shapes in prop::collection::vec(card_shape(), 1..6),
        pumps in prop::collection::vec((0..6usize, -3..4i32), 0..6),
    ) {
        let engine = RulesEngine::new(EngineConfig::default()).unwrap();
        let (mut state, ids) = build(&shapes);
        for (index, amount) in pumps {
            let target = ids[index % ids.len()];
            let effect = Effect::GrantKeyword {
                target: EntityReference::Target(0),
                keyword: Keyword::Vigilance,
                duration: Duration::EndOfTurn,
            };
            let chosen = if amount % 2 == 0 { effect } else { Effect::pump_target(amount, amount) };
            let result = engine.execute(&state, &chosen, &EffectContext::new(PlayerId::new(0)).with_target(target));
            state = result.into_state();
        }
        let first = engine.project(&state);
        let second = engine.project(&state);
        prop_assert_eq!(first, second);
    }
}
