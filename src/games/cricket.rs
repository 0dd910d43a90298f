//! Closing-numbers game (Cricket).
//!
//! ## Rules
//!
//! - Targets: `B` (25), `T` and `D` (special, value entered by hand), `20`..`15`.
//! - Each mark on a target counts toward closing it (3 marks closes).
//! - Marks beyond the third score while any other participant still has the
//!   target open: numeric targets add their value, special targets open a
//!   keypad for the value (0..=180).
//! - A participant wins once they have closed every target and no one holds
//!   a higher score. Several closers sharing the top score is a tie.
//!
//! Turns are slot-major; the controller ends each turn explicitly.

use im::Vector;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::action::{Action, CricketAction};
use crate::core::config::GameOptions;
use crate::core::objective::{Objective, ObjectiveKind};
use crate::core::participant::{Participant, ParticipantId, ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState};
use crate::rules::engine::{
    ensure_running, ensure_turn, validate_score, ActionError, ModeRules, WinnerRecord,
};
use crate::rules::turn::{TurnPolicy, TurnSearch};

/// Marks needed to close a target.
pub const MARKS_TO_CLOSE: u32 = 3;

/// Highest manual score for a special target (one turn of darts).
pub const MAX_TURN_SCORE: i64 = 180;

/// Board targets in display order. `None` marks a special target.
pub const TARGETS: [(&str, Option<i64>); 9] = [
    ("B", Some(25)),
    ("T", None),
    ("D", None),
    ("20", Some(20)),
    ("19", Some(19)),
    ("18", Some(18)),
    ("17", Some(17)),
    ("16", Some(16)),
    ("15", Some(15)),
];

/// Per-participant marks and score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CricketScore {
    pub score: i64,
    pub marks: FxHashMap<String, u32>,
    pub darts_thrown_this_turn: u32,
}

impl CricketScore {
    /// Zero marks on every target.
    #[must_use]
    pub fn new() -> Self {
        Self {
            score: 0,
            marks: TARGETS.iter().map(|(name, _)| ((*name).to_string(), 0)).collect(),
            darts_thrown_this_turn: 0,
        }
    }

    #[must_use]
    pub fn marks_on(&self, target: &str) -> u32 {
        self.marks.get(target).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn has_closed(&self, target: &str) -> bool {
        self.marks_on(target) >= MARKS_TO_CLOSE
    }

    /// Closed every target on the board.
    #[must_use]
    pub fn has_closed_all(&self) -> bool {
        TARGETS.iter().all(|(name, _)| self.has_closed(name))
    }
}

/// Keypad opened for a special target's manual value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreKeypad {
    pub participant_index: usize,
    pub player_in_team_index: usize,
    pub objective_name: String,
}

/// The most recent score, for display highlighting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastScored {
    pub participant_id: ParticipantId,
    pub score: i64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CricketBoard {
    pub objectives: Vector<Objective>,
    pub keypad: Option<ScoreKeypad>,
    pub last_scored: Option<LastScored>,
}

impl Default for CricketBoard {
    fn default() -> Self {
        let objectives = TARGETS
            .iter()
            .enumerate()
            .map(|(index, (name, value))| {
                let kind = match value {
                    Some(value) => ObjectiveKind::Numeric { value: *value },
                    None => ObjectiveKind::Special,
                };
                Objective::new(format!("cricket_obj_{index}"), *name, kind)
            })
            .collect();
        Self {
            objectives,
            keypad: None,
            last_scored: None,
        }
    }
}

/// Closing-numbers rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cricket;

fn score_of(participant: &Participant) -> i64 {
    participant.state.cricket().map_or(0, |s| s.score)
}

fn board_mut(game: &mut Game) -> Result<&mut CricketBoard, ActionError> {
    let active = game.mode();
    game.board.cricket_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::Cricket,
    })
}

impl Cricket {
    fn mark(&self, game: &mut Game, participant: usize, target: &str) -> Result<(), ActionError> {
        let value = board_mut(game)?
            .objectives
            .iter()
            .find(|o| o.name == target)
            .map(Objective::numeric_value)
            .ok_or_else(|| ActionError::NotFound(format!("objective {target}")))?;
        if participant >= game.participants.len() {
            return Err(ActionError::NotFound(format!("participant {participant}")));
        }
        ensure_turn(game, Some(participant))?;

        let slot = game.current_player_slot;
        let opponent_open = game
            .participants
            .iter()
            .enumerate()
            .any(|(i, p)| i != participant && p.state.cricket().is_some_and(|s| !s.has_closed(target)));

        let (id, marks) = {
            let p = game
                .participant_mut(participant)
                .ok_or_else(|| ActionError::NotFound(format!("participant {participant}")))?;
            let id = p.id.clone();
            let score = p.state.cricket_mut().ok_or(ActionError::ModeMismatch {
                active: ModeId::Cricket,
                action: ModeId::Cricket,
            })?;
            let marks = score.marks.entry(target.to_string()).or_insert(0);
            *marks += 1;
            let marks = *marks;
            score.darts_thrown_this_turn += 1;
            if marks > MARKS_TO_CLOSE && opponent_open {
                if let Some(points) = value {
                    score.score += points;
                }
            }
            (id, marks)
        };

        let board = board_mut(game)?;
        board.last_scored = None;
        if marks > MARKS_TO_CLOSE && opponent_open {
            match value {
                Some(points) => {
                    board.last_scored = Some(LastScored {
                        participant_id: id,
                        score: points,
                    });
                }
                None => {
                    board.keypad = Some(ScoreKeypad {
                        participant_index: participant,
                        player_in_team_index: slot,
                        objective_name: target.to_string(),
                    });
                }
            }
        }

        tracing::debug!(game = %game.id, participant, objective = target, marks, "cricket mark");
        self.conclude_if_won(game);
        Ok(())
    }

    fn submit_score(&self, game: &mut Game, score: i64) -> Result<(), ActionError> {
        let keypad = board_mut(game)?.keypad.clone().ok_or(ActionError::NoPrompt)?;
        let score = validate_score(score, 0..=MAX_TURN_SCORE)?;

        let participant = game
            .participant_mut(keypad.participant_index)
            .ok_or_else(|| ActionError::NotFound(format!("participant {}", keypad.participant_index)))?;
        let id = participant.id.clone();
        if let Some(state) = participant.state.cricket_mut() {
            state.score += score;
        }

        let board = board_mut(game)?;
        board.keypad = None;
        board.last_scored = Some(LastScored {
            participant_id: id,
            score,
        });
        self.conclude_if_won(game);
        Ok(())
    }

    fn cancel_keypad(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        if board.keypad.take().is_none() {
            return Err(ActionError::NoPrompt);
        }
        board.last_scored = None;
        Ok(())
    }

    fn end_turn(&self, game: &mut Game, participant_id: &ParticipantId) -> Result<(), ActionError> {
        let current = game.current_participant().ok_or(ActionError::StaleTurn)?;
        if &current.id != participant_id {
            tracing::warn!(
                game = %game.id,
                requested = %participant_id,
                current = %current.id,
                "end of turn for a participant who is not up"
            );
            return Err(ActionError::StaleTurn);
        }

        {
            let board = board_mut(game)?;
            board.last_scored = None;
            board.keypad = None;
        }
        if let Some(state) = game
            .current_participant_mut()
            .and_then(|p| p.state.cricket_mut())
        {
            state.darts_thrown_this_turn = 0;
        }

        if self.conclude_if_won(game) {
            return Ok(());
        }
        self.advance(game);
        Ok(())
    }

    fn advance(&self, game: &mut Game) {
        match game.advance_turn(TurnPolicy::SlotMajor, |_| false) {
            TurnSearch::Found(_) => {
                if let Some(state) = game
                    .current_participant_mut()
                    .and_then(|p| p.state.cricket_mut())
                {
                    state.darts_thrown_this_turn = 0;
                }
            }
            TurnSearch::Exhausted { .. } => {
                game.conclude(WinnerRecord::error("Error - No Next Turn"));
            }
        }
    }

    fn conclude_if_won(&self, game: &mut Game) -> bool {
        match self.evaluate(game) {
            Some(winner) => {
                if let Ok(board) = board_mut(game) {
                    board.keypad = None;
                }
                game.conclude(winner);
                true
            }
            None => false,
        }
    }
}

impl ModeRules for Cricket {
    fn mode(&self) -> ModeId {
        ModeId::Cricket
    }

    fn initialize(&self, roster: Vec<Roster>, _options: &GameOptions, _rng: &mut GameRng) -> Game {
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Cricket(CricketScore::new())))
            .collect();
        let mut game = Game::new(ModeState::Cricket(CricketBoard::default()), participants);
        self.advance(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::Cricket(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::Cricket,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            CricketAction::Mark {
                participant,
                objective,
            } => self.mark(game, *participant, objective),
            CricketAction::SubmitScore { score } => self.submit_score(game, *score),
            CricketAction::CancelKeypad => Self::cancel_keypad(game),
            CricketAction::EndTurn { participant_id } => self.end_turn(game, participant_id),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        let closers: Vec<&Participant> = game
            .participants
            .iter()
            .filter(|p| p.state.cricket().is_some_and(CricketScore::has_closed_all))
            .collect();
        if closers.is_empty() {
            return None;
        }

        let top = game.participants.iter().map(score_of).max()?;
        let leaders: Vec<&Participant> = closers
            .into_iter()
            .filter(|p| score_of(p) >= top)
            .collect();

        match leaders.as_slice() {
            [] => None,
            [winner] => Some(WinnerRecord::team(winner, top)),
            _ => Some(WinnerRecord::tie(leaders.iter().copied(), top)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::TeamSetup;
    use crate::rules::engine::{DisplayScore, WinnerKind};

    fn start(names: &[&str]) -> Game {
        let setups: Vec<TeamSetup> = names.iter().map(|n| TeamSetup::new(*n, &[*n])).collect();
        Cricket.initialize(
            Roster::from_setups(&setups),
            &GameOptions::default(),
            &mut GameRng::new(1),
        )
    }

    fn mark(game: &mut Game, participant: usize, target: &str) -> Result<(), ActionError> {
        Cricket.apply(
            game,
            &Action::Cricket(CricketAction::Mark {
                participant,
                objective: target.to_string(),
            }),
        )
    }

    fn set_state(game: &mut Game, index: usize, closed: bool, score: i64) {
        let state = game.participants[index].state.cricket_mut().unwrap();
        state.score = score;
        if closed {
            for (name, _) in TARGETS {
                state.marks.insert(name.to_string(), 3);
            }
        }
    }

    #[test]
    fn test_initial_state() {
        let game = start(&["A", "B"]);
        assert_eq!(game.current_participant_index, Some(0));
        assert_eq!(game.board.cricket().unwrap().objectives.len(), 9);
        let state = game.participants[0].state.cricket().unwrap();
        assert_eq!(state.marks.len(), 9);
        assert_eq!(state.score, 0);
    }

    #[test]
    fn test_marks_close_then_score() {
        let mut game = start(&["A", "B"]);
        for _ in 0..4 {
            mark(&mut game, 0, "20").unwrap();
        }
        let state = game.participants[0].state.cricket().unwrap();
        assert_eq!(state.marks_on("20"), 4);
        assert_eq!(state.score, 20);
        assert_eq!(state.darts_thrown_this_turn, 4);
        assert_eq!(game.board.cricket().unwrap().last_scored.as_ref().unwrap().score, 20);
    }

    #[test]
    fn test_no_score_when_everyone_closed() {
        let mut game = start(&["A", "B"]);
        game.participants[1]
            .state
            .cricket_mut()
            .unwrap()
            .marks
            .insert("19".into(), 3);
        for _ in 0..5 {
            mark(&mut game, 0, "19").unwrap();
        }
        assert_eq!(game.participants[0].state.cricket().unwrap().score, 0);
    }

    #[test]
    fn test_special_target_opens_keypad() {
        let mut game = start(&["A", "B"]);
        for _ in 0..4 {
            mark(&mut game, 0, "T").unwrap();
        }
        let keypad = game.board.cricket().unwrap().keypad.clone().unwrap();
        assert_eq!(keypad.objective_name, "T");
        assert_eq!(keypad.participant_index, 0);

        let bad = Cricket.apply(&mut game, &Action::Cricket(CricketAction::SubmitScore { score: -1 }));
        assert!(matches!(bad, Err(ActionError::InvalidInput(_))));

        Cricket
            .apply(&mut game, &Action::Cricket(CricketAction::SubmitScore { score: 45 }))
            .unwrap();
        assert_eq!(game.participants[0].state.cricket().unwrap().score, 45);
        assert!(game.board.cricket().unwrap().keypad.is_none());
    }

    #[test]
    fn test_manual_score_capped_at_one_turn() {
        let mut game = start(&["A", "B"]);
        for _ in 0..4 {
            mark(&mut game, 0, "D").unwrap();
        }
        let before = game.clone();
        for score in [MAX_TURN_SCORE + 1, i64::MAX] {
            let result = Cricket.apply(&mut game, &Action::Cricket(CricketAction::SubmitScore { score }));
            assert!(matches!(result, Err(ActionError::InvalidInput(_))));
        }
        assert_eq!(game, before);

        Cricket
            .apply(
                &mut game,
                &Action::Cricket(CricketAction::SubmitScore { score: MAX_TURN_SCORE }),
            )
            .unwrap();
        assert_eq!(game.participants[0].state.cricket().unwrap().score, MAX_TURN_SCORE);
    }

    #[test]
    fn test_submit_without_keypad() {
        let mut game = start(&["A", "B"]);
        let result = Cricket.apply(&mut game, &Action::Cricket(CricketAction::SubmitScore { score: 5 }));
        assert_eq!(result, Err(ActionError::NoPrompt));
        let result = Cricket.apply(&mut game, &Action::Cricket(CricketAction::CancelKeypad));
        assert_eq!(result, Err(ActionError::NoPrompt));
    }

    #[test]
    fn test_mark_rejects_stale_participant() {
        let mut game = start(&["A", "B"]);
        assert_eq!(mark(&mut game, 1, "20"), Err(ActionError::StaleTurn));
        assert!(matches!(mark(&mut game, 0, "14"), Err(ActionError::NotFound(_))));
        assert_eq!(game.participants[1].state.cricket().unwrap().marks_on("20"), 0);
    }

    #[test]
    fn test_end_turn_advances() {
        let mut game = start(&["A", "B"]);
        mark(&mut game, 0, "20").unwrap();
        let a = game.participants[0].id.clone();
        let b = game.participants[1].id.clone();

        let stale = Cricket.apply(
            &mut game,
            &Action::Cricket(CricketAction::EndTurn { participant_id: b.clone() }),
        );
        assert_eq!(stale, Err(ActionError::StaleTurn));

        Cricket
            .apply(&mut game, &Action::Cricket(CricketAction::EndTurn { participant_id: a }))
            .unwrap();
        assert_eq!(game.current_participant_index, Some(1));
        assert_eq!(game.participants[0].state.cricket().unwrap().darts_thrown_this_turn, 0);
    }

    #[test]
    fn test_no_eligible_next_turn_ends_in_error() {
        let mut game = start(&["A", "B"]);
        let a = game.participants[0].id.clone();
        for participant in game.participants.iter_mut() {
            participant.players.clear();
        }

        Cricket
            .apply(&mut game, &Action::Cricket(CricketAction::EndTurn { participant_id: a }))
            .unwrap();

        assert!(game.game_over);
        let winner = game.winner.as_ref().unwrap();
        assert_eq!(winner.kind, WinnerKind::Error);
        assert_eq!(winner.name, "Error - No Next Turn");
        assert!(!winner.is_countable());
    }

    #[test]
    fn test_highest_closer_wins() {
        let mut game = start(&["A", "B", "C"]);
        set_state(&mut game, 0, true, 40);
        set_state(&mut game, 1, true, 55);
        set_state(&mut game, 2, false, 10);

        let winner = Cricket.evaluate(&game).unwrap();
        assert_eq!(winner.name, "B");
        assert_eq!(winner.kind, WinnerKind::Team);
        assert_eq!(winner.score, DisplayScore::Points(55));
    }

    #[test]
    fn test_closer_behind_open_participant_does_not_win() {
        let mut game = start(&["A", "B"]);
        set_state(&mut game, 0, true, 40);
        set_state(&mut game, 1, false, 60);
        assert!(Cricket.evaluate(&game).is_none());
    }

    #[test]
    fn test_tied_closers_is_tie() {
        let mut game = start(&["A", "B"]);
        set_state(&mut game, 0, true, 50);
        set_state(&mut game, 1, true, 50);
        let winner = Cricket.evaluate(&game).unwrap();
        assert_eq!(winner.kind, WinnerKind::Tie);
        assert_eq!(winner.name, "Tie (A & B)");
    }

    #[test]
    fn test_closing_last_target_ends_game() {
        let mut game = start(&["A", "B"]);
        set_state(&mut game, 0, true, 0);
        game.participants[0]
            .state
            .cricket_mut()
            .unwrap()
            .marks
            .insert("15".into(), 2);

        mark(&mut game, 0, "15").unwrap();
        assert!(game.game_over);
        assert_eq!(game.winner.as_ref().unwrap().name, "A");
        assert_eq!(mark(&mut game, 0, "20"), Err(ActionError::GameOver));
    }
}
