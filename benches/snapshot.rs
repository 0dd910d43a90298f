//! Snapshot cost: recording, undoing, and a full apply/undo cycle.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use darts_engine::core::action::{CricketAction, FlightsAction, ObjectiveOutcome};
use darts_engine::{Action, Engine, EngineConfig, GameOptions, History, ModeId, TeamSetup};

fn options(teams: usize) -> GameOptions {
    let setups = (0..teams)
        .map(|i| {
            let name = format!("Team {i}");
            TeamSetup::new(name.clone(), &[name.as_str(), "Second"])
        })
        .collect();
    GameOptions::with_teams(setups)
}

fn bench_history(c: &mut Criterion) {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1));
    let game = engine
        .start_game(ModeId::ThreeFf, &options(8))
        .cloned()
        .expect("game starts");

    c.bench_function("history_record_20", |b| {
        b.iter(|| {
            let mut history = History::new(20);
            for _ in 0..20 {
                history.record(black_box(&game));
            }
            history
        });
    });

    c.bench_function("history_record_undo", |b| {
        let mut history = History::new(20);
        history.record(&game);
        b.iter(|| {
            history.record(black_box(&game));
            black_box(history.undo())
        });
    });
}

fn bench_apply_undo(c: &mut Criterion) {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1));
    engine
        .start_game(ModeId::ThreeFf, &options(8))
        .expect("game starts");
    let missed = Action::ThreeFf(FlightsAction::Objective {
        participant: None,
        outcome: ObjectiveOutcome::Missed,
    });

    c.bench_function("three_ff_apply_undo", |b| {
        b.iter(|| {
            let _ = engine.apply(black_box(&missed));
            black_box(engine.undo().is_some())
        });
    });

    let mut engine = Engine::new(EngineConfig::default().with_seed(1));
    engine
        .start_game(ModeId::Cricket, &options(4))
        .expect("game starts");
    let mark = Action::Cricket(CricketAction::Mark {
        participant: 0,
        objective: "20".to_string(),
    });

    c.bench_function("cricket_apply_undo", |b| {
        b.iter(|| {
            let _ = engine.apply(black_box(&mark));
            black_box(engine.undo().is_some())
        });
    });
}

criterion_group!(benches, bench_history, bench_apply_undo);
criterion_main!(benches);
