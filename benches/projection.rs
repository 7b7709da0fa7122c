//! Benchmarks for state projection and effect execution.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use ccg_rules::amounts::{DynamicAmount, EntityReference};
use ccg_rules::cards::{CardDefinition, CardId, StaticAbility};
use ccg_rules::core::{EngineConfig, GameConfig, GameState, PlayerId};
use ccg_rules::effects::{Effect, EffectContext};
use ccg_rules::filters::{ControllerPredicate, ObjectFilter};
use ccg_rules::layers::Duration;
use ccg_rules::rules::RulesEngine;
use ccg_rules::zones::ZoneKind;

/// A board of `size` creatures per player, one lord each, and one
/// floating pump per creature.
fn board(engine: &RulesEngine, size: u32) -> GameState {
    let mut state = GameState::new(&GameConfig::new(2)).unwrap();
    let lord = CardDefinition::creature(CardId::new(0), "Lord", 2, 2).with_static(
        StaticAbility::ModifyStatsForGroup {
            filter: ObjectFilter::creature()
                .controlled_by(ControllerPredicate::You)
                .other(),
            power: 1,
            toughness: 1,
        },
    );
    let bear = CardDefinition::creature(CardId::new(1), "Bear", 2, 2);
    let mut creatures = Vec::new();
    for player in PlayerId::all(2) {
        state.spawn_card(&lord, player, ZoneKind::Battlefield).unwrap();
        for _ in 0..size {
            creatures.push(state.spawn_card(&bear, player, ZoneKind::Battlefield).unwrap());
        }
    }
    for creature in creatures {
        let pump = Effect::ModifyStats {
            target: EntityReference::Target(0),
            power: DynamicAmount::fixed(1),
            toughness: DynamicAmount::fixed(1),
            duration: Duration::EndOfTurn,
        };
        let ctx = EffectContext::new(PlayerId::new(0)).with_target(creature);
        state = engine.execute(&state, &pump, &ctx).into_state();
    }
    state
}

fn bench_project(c: &mut Criterion) {
    let engine = RulesEngine::new(EngineConfig::default()).unwrap();
    let mut group = c.benchmark_group("project");
    for size in [5, 20, 50] {
        let state = board(&engine, size);
        group.bench_with_input(BenchmarkId::from_parameter(size), &state, |b, state| {
            b.iter(|| engine.project(black_box(state)));
        });
    }
    group.finish();
}

fn bench_destroy_all(c: &mut Criterion) {
    let engine = RulesEngine::new(EngineConfig::default()).unwrap();
    let state = board(&engine, 20);
    let wrath = Effect::DestroyAll {
        filter: ObjectFilter::creature(),
    };
    let ctx = EffectContext::new(PlayerId::new(0));
    c.bench_function("destroy_all_40", |b| {
        b.iter(|| engine.execute(black_box(&state), &wrath, &ctx));
    });
}

criterion_group!(benches, bench_project, bench_destroy_all);
criterion_main!(benches);
