//! Undo is a left-inverse of applying one action.
//!
//! For any valid action the engine accepts, undoing it must restore the exact
//! previous game and win counters.

use std::sync::{Arc, Mutex};

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use darts_engine::core::action::{BaseballAction, BeersAction, KillerAction, KillerActor};
use darts_engine::{
    Action, Engine, EngineConfig, GameOptions, ModeId, ParticipantId, TeamSetup, WinStats,
};

fn teams(names: &[&str]) -> Vec<TeamSetup> {
    names
        .iter()
        .map(|n| TeamSetup::new(*n, &[*n]).with_id(n.to_lowercase()))
        .collect()
}

/// Apply `action`, and if it was recorded, check that undo restores the
/// prior state exactly before re-applying it.
fn apply_and_check_undo(engine: &mut Engine, action: &Action) -> Result<(), TestCaseError> {
    let before = engine.game().cloned();
    let stats_before = engine.stats().clone();
    let recorded_before = engine.history().len();

    if engine.apply(action).is_err() {
        prop_assert_eq!(engine.game().cloned(), before);
        prop_assert_eq!(engine.stats(), &stats_before);
        return Ok(());
    }
    if engine.history().len() == recorded_before && engine.game().cloned() == before {
        return Ok(());
    }
    let after = engine.game().cloned();
    let stats_after = engine.stats().clone();

    prop_assert!(engine.undo().is_some());
    prop_assert_eq!(engine.game().cloned(), before);
    prop_assert_eq!(engine.stats(), &stats_before);

    prop_assert!(engine.apply(action).is_ok());
    prop_assert_eq!(engine.game().cloned(), after);
    prop_assert_eq!(engine.stats(), &stats_after);
    Ok(())
}

fn baseball_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Baseball(BaseballAction::RequestScoreEntry)),
        3 => (-5i64..200).prop_map(|score| Action::Baseball(BaseballAction::SubmitScore { score })),
        1 => Just(Action::Baseball(BaseballAction::CancelScoreEntry)),
    ]
}

fn beers_action() -> impl Strategy<Value = Action> {
    prop_oneof![
        3 => Just(Action::Beers(BeersAction::RequestScoreEntry)),
        3 => (0i64..181).prop_map(|score| Action::Beers(BeersAction::SubmitScore { score })),
        1 => Just(Action::Beers(BeersAction::CancelScoreEntry)),
        2 => Just(Action::Beers(BeersAction::AcknowledgeLetter)),
    ]
}

proptest! {
    #[test]
    fn baseball_undo_is_left_inverse(actions in prop::collection::vec(baseball_action(), 1..60)) {
        let mut engine = Engine::new(EngineConfig::default().with_seed(3));
        let options = GameOptions::with_teams(teams(&["A", "B"])).baseball_innings(2);
        engine.start_game(ModeId::Baseball, &options).unwrap();

        for action in &actions {
            apply_and_check_undo(&mut engine, action)?;
        }
    }

    #[test]
    fn beers_undo_is_left_inverse(actions in prop::collection::vec(beers_action(), 1..80)) {
        let mut engine = Engine::new(EngineConfig::default().with_seed(5));
        let options = GameOptions::with_teams(teams(&["A", "B", "C"]));
        engine.start_game(ModeId::Beers, &options).unwrap();

        for action in &actions {
            apply_and_check_undo(&mut engine, action)?;
        }
    }
}

fn killer_engine(notifier: Arc<Mutex<Vec<u32>>>) -> Engine {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1)).with_notifier(
        move |stats: &WinStats| {
            notifier.lock().unwrap().push(stats.team_wins("A"));
        },
    );
    engine.start_killer_game(&teams(&["A", "B"])).unwrap();
    for (player, number) in [("a", 1), ("b", 2)] {
        engine
            .apply(&Action::Killer(KillerAction::ChooseNumber {
                player_id: ParticipantId::new(player),
                number,
            }))
            .unwrap();
    }
    engine
        .apply(&Action::Killer(KillerAction::BecomeKiller {
            player_id: ParticipantId::new("a"),
        }))
        .unwrap();
    engine
}

fn hit_b(engine: &mut Engine) {
    engine
        .apply(&Action::Killer(KillerAction::RemoveLife {
            from: KillerActor::Participant(ParticipantId::new("a")),
            target_id: ParticipantId::new("b"),
        }))
        .unwrap();
}

#[test]
fn undoing_the_winning_action_reverts_stats() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut engine = killer_engine(Arc::clone(&seen));

    hit_b(&mut engine);
    hit_b(&mut engine);
    let before_win = engine.game().cloned().unwrap();
    hit_b(&mut engine);
    assert!(engine.game().unwrap().game_over);
    assert_eq!(engine.stats().team_wins("A"), 1);

    let restored = engine.undo().cloned().unwrap();
    assert_eq!(restored, before_win);
    assert_eq!(engine.stats().team_wins("A"), 0);
    assert!(engine.stats().is_empty());
    assert_eq!(*seen.lock().unwrap(), vec![1, 0]);

    // Undoing a non-concluding action leaves the counters alone.
    engine.undo().unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
}

#[test]
fn undo_with_nothing_recorded_is_a_no_op() {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1));
    assert!(engine.undo().is_none());

    let options = GameOptions::with_teams(teams(&["A", "B"]));
    engine.start_game(ModeId::Baseball, &options).unwrap();
    let start = engine.game().cloned();
    assert!(!engine.can_undo());
    assert!(engine.undo().is_none());
    assert_eq!(engine.game().cloned(), start);
}

#[test]
fn undo_walks_back_one_action_at_a_time() {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1));
    let options = GameOptions::with_teams(teams(&["A", "B"]));
    engine.start_game(ModeId::Baseball, &options).unwrap();

    let mut states = vec![engine.game().cloned().unwrap()];
    for action in [
        BaseballAction::RequestScoreEntry,
        BaseballAction::SubmitScore { score: 12 },
        BaseballAction::RequestScoreEntry,
        BaseballAction::SubmitScore { score: 7 },
    ] {
        engine.apply(&Action::Baseball(action)).unwrap();
        states.push(engine.game().cloned().unwrap());
    }

    states.pop();
    while let Some(expected) = states.pop() {
        assert_eq!(engine.undo().cloned(), Some(expected));
    }
    assert!(engine.undo().is_none());
}

#[test]
fn history_limit_caps_undo_depth() {
    let mut engine = Engine::new(EngineConfig::default().with_seed(1).with_history_limit(3));
    let options = GameOptions::with_teams(teams(&["A", "B"]));
    engine.start_game(ModeId::Baseball, &options).unwrap();

    for _ in 0..3 {
        engine
            .apply(&Action::Baseball(BaseballAction::RequestScoreEntry))
            .unwrap();
        engine
            .apply(&Action::Baseball(BaseballAction::SubmitScore { score: 1 }))
            .unwrap();
    }
    assert_eq!(engine.history().len(), 3);
    assert!(engine.undo().is_some());
    assert!(engine.undo().is_some());
    assert!(engine.undo().is_none());
}
