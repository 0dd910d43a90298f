//! Per-round team score game (Baseball).
//!
//! Each team posts one score (0..=180) per inning, in roster order. After the
//! last team of an inning the next inning starts; after the last inning the
//! highest total wins, and a shared highest total is a tie.

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, BaseballAction};
use crate::core::config::GameOptions;
use crate::core::participant::{Participant, ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState, TurnCursor};
use crate::rules::engine::{
    ensure_running, validate_score, ActionError, ModeRules, WinnerRecord,
};

/// Default game length.
pub const DEFAULT_INNINGS: usize = 9;

/// Longest game accepted; anything outside `1..=MAX_INNINGS` plays the default.
pub const MAX_INNINGS: usize = 20;

/// Highest score for one inning.
pub const MAX_INNING_SCORE: i64 = 180;

/// Per-team line score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseballLine {
    pub innings: Vec<Option<i64>>,
    pub total_score: i64,
}

impl BaseballLine {
    #[must_use]
    pub fn new(innings: usize) -> Self {
        Self {
            innings: vec![None; innings],
            total_score: 0,
        }
    }

    /// Record an inning (1-based) and refresh the total.
    pub fn record(&mut self, inning: usize, score: i64) {
        if let Some(slot) = inning.checked_sub(1).and_then(|i| self.innings.get_mut(i)) {
            *slot = Some(score);
        }
        self.total_score = self.innings.iter().flatten().sum();
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BaseballPrompt {
    Action { participant_index: usize, inning: usize },
    Keypad { participant_index: usize, inning: usize },
    #[default]
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseballBoard {
    pub num_innings: usize,
    /// 1-based; one past `num_innings` once the game is over.
    pub current_inning: usize,
    pub prompt: BaseballPrompt,
}

impl BaseballBoard {
    #[must_use]
    pub fn new(num_innings: usize) -> Self {
        Self {
            num_innings,
            current_inning: 1,
            prompt: BaseballPrompt::None,
        }
    }
}

/// Per-round rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Baseball;

fn board_mut(game: &mut Game) -> Result<&mut BaseballBoard, ActionError> {
    let active = game.mode();
    game.board.baseball_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::Baseball,
    })
}

fn total_of(participant: &Participant) -> i64 {
    participant.state.baseball().map_or(0, |line| line.total_score)
}

impl Baseball {
    fn advance(&self, game: &mut Game) {
        let mut next = game.current_participant_index.map_or(0, |i| i + 1);
        let count = game.participants.len();
        let Some(board) = game.board.baseball_mut() else {
            return;
        };

        if next >= count {
            next = 0;
            board.current_inning += 1;
            if board.current_inning > board.num_innings {
                board.prompt = BaseballPrompt::None;
                if let Some(winner) = self.evaluate(game) {
                    game.conclude(winner);
                }
                return;
            }
            tracing::debug!(inning = board.current_inning, "inning started");
        }

        board.prompt = BaseballPrompt::Action {
            participant_index: next,
            inning: board.current_inning,
        };
        game.set_cursor(TurnCursor::new(next, 0));
    }

    fn request_score_entry(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BaseballPrompt::Action {
            participant_index,
            inning,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = BaseballPrompt::Keypad {
            participant_index,
            inning,
        };
        Ok(())
    }

    fn submit_score(&self, game: &mut Game, score: i64) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BaseballPrompt::Keypad {
            participant_index,
            inning,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        if game.current_participant_index != Some(participant_index) {
            return Err(ActionError::StaleTurn);
        }
        let score = validate_score(score, 0..=MAX_INNING_SCORE)?;

        let line = game
            .participant_mut(participant_index)
            .and_then(|p| p.state.baseball_mut())
            .ok_or(ActionError::StaleTurn)?;
        line.record(inning, score);

        board_mut(game)?.prompt = BaseballPrompt::None;
        self.advance(game);
        Ok(())
    }

    fn cancel_keypad(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BaseballPrompt::Keypad {
            participant_index,
            inning,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = BaseballPrompt::Action {
            participant_index,
            inning,
        };
        Ok(())
    }
}

impl ModeRules for Baseball {
    fn mode(&self) -> ModeId {
        ModeId::Baseball
    }

    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, _rng: &mut GameRng) -> Game {
        let innings = match options.baseball_num_innings {
            n @ 1..=MAX_INNINGS => n,
            _ => DEFAULT_INNINGS,
        };
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Baseball(BaseballLine::new(innings))))
            .collect();
        let mut game = Game::new(ModeState::Baseball(BaseballBoard::new(innings)), participants);
        self.advance(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::Baseball(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::Baseball,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            BaseballAction::RequestScoreEntry => Self::request_score_entry(game),
            BaseballAction::SubmitScore { score } => self.submit_score(game, *score),
            BaseballAction::CancelScoreEntry => Self::cancel_keypad(game),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        let board = game.board.baseball()?;
        if board.current_inning <= board.num_innings {
            return None;
        }
        Some(WinnerRecord::from_standings(&game.participants, total_of, false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::TeamSetup;
    use crate::rules::engine::{DisplayScore, WinnerKind};

    fn start(names: &[&str], innings: usize) -> Game {
        let setups: Vec<TeamSetup> = names.iter().map(|n| TeamSetup::new(*n, &[*n])).collect();
        Baseball.initialize(
            Roster::from_setups(&setups),
            &GameOptions::default().baseball_innings(innings),
            &mut GameRng::new(1),
        )
    }

    fn post(game: &mut Game, score: i64) -> Result<(), ActionError> {
        Baseball.apply(game, &Action::Baseball(BaseballAction::RequestScoreEntry))?;
        Baseball.apply(game, &Action::Baseball(BaseballAction::SubmitScore { score }))
    }

    #[test]
    fn test_rotation_and_innings() {
        let mut game = start(&["A", "B"], 3);
        assert_eq!(game.current_participant_index, Some(0));

        post(&mut game, 10).unwrap();
        assert_eq!(game.current_participant_index, Some(1));
        post(&mut game, 20).unwrap();

        let board = game.board.baseball().unwrap();
        assert_eq!(board.current_inning, 2);
        assert_eq!(
            board.prompt,
            BaseballPrompt::Action {
                participant_index: 0,
                inning: 2
            }
        );
        let line = game.participants[1].state.baseball().unwrap();
        assert_eq!(line.innings, vec![Some(20), None, None]);
        assert_eq!(line.total_score, 20);
    }

    #[test]
    fn test_highest_total_wins() {
        let mut game = start(&["A", "B"], 2);
        for score in [10, 20, 30, 5] {
            post(&mut game, score).unwrap();
        }
        assert!(game.game_over);
        let winner = game.winner.as_ref().unwrap();
        assert_eq!(winner.name, "A");
        assert_eq!(winner.score, DisplayScore::Points(40));
        assert_eq!(
            game.board.baseball().unwrap().prompt,
            BaseballPrompt::None
        );
    }

    #[test]
    fn test_tie() {
        let mut game = start(&["A", "B"], 1);
        post(&mut game, 15).unwrap();
        post(&mut game, 15).unwrap();
        assert_eq!(game.winner.as_ref().unwrap().kind, WinnerKind::Tie);
    }

    #[test]
    fn test_inning_count_bounds() {
        for (requested, expected) in [
            (0, DEFAULT_INNINGS),
            (MAX_INNINGS, MAX_INNINGS),
            (MAX_INNINGS + 1, DEFAULT_INNINGS),
            (usize::MAX, DEFAULT_INNINGS),
        ] {
            let game = start(&["A"], requested);
            assert_eq!(game.board.baseball().unwrap().num_innings, expected);
            assert_eq!(game.participants[0].state.baseball().unwrap().innings.len(), expected);
        }
    }

    #[test]
    fn test_invalid_score_keeps_keypad() {
        let mut game = start(&["A", "B"], 1);
        assert!(matches!(post(&mut game, -5), Err(ActionError::InvalidInput(_))));
        assert!(matches!(
            game.board.baseball().unwrap().prompt,
            BaseballPrompt::Keypad { .. }
        ));
        Baseball
            .apply(&mut game, &Action::Baseball(BaseballAction::CancelScoreEntry))
            .unwrap();
        assert!(matches!(
            game.board.baseball().unwrap().prompt,
            BaseballPrompt::Action { .. }
        ));
    }
}
