use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use piste_on_piste::{
    Ball, GameConfig, GameState, History, RulesEngine, StateSnapshot,
};

/// A state a few visits into a frame, with breaks logged for everyone.
fn played_state() -> GameState {
    let mut state = GameState::new(&GameConfig::new(["Ann", "Bo", "Cid"]), 0);
    for _ in 0..3 {
        state.pot_ball(Ball::Red);
        state.pot_ball(Ball::Black);
        state.commit_foul(Ball::Pink);
    }
    state
}

fn bench_state_clone(c: &mut Criterion) {
    let state = played_state();

    c.bench_function("state_clone", |b| {
        b.iter(|| black_box(&state).clone());
    });
}

/// Benchmark pushing commands onto a history of increasing length
fn bench_history_push(c: &mut Criterion) {
    let state = played_state();
    let mut group = c.benchmark_group("history_push");

    for len in [10, 100, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let mut history = History::new();
            for _ in 0..len {
                history.push(state.clone());
            }
            b.iter(|| {
                let mut history = history.clone();
                history.push(black_box(&state).clone());
                history
            });
        });
    }

    group.finish();
}

fn bench_legal_actions(c: &mut Criterion) {
    let state = played_state();

    c.bench_function("legal_actions", |b| {
        b.iter(|| black_box(&state).legal_actions());
    });
}

fn bench_snapshot_encode(c: &mut Criterion) {
    let state = played_state();

    c.bench_function("snapshot_bincode", |b| {
        b.iter(|| bincode::serialize(&StateSnapshot::from(black_box(&state))));
    });
}

criterion_group!(
    benches,
    bench_state_clone,
    bench_history_push,
    bench_legal_actions,
    bench_snapshot_encode
);
criterion_main!(benches);
