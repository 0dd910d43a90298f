//! Countdown game (501).
//!
//! ## Rules
//!
//! - Everyone starts on the start score (501) and subtracts each turn's
//!   three-dart total (0..=180).
//! - With double-in, nothing is deducted until the first scoring turn,
//!   which also counts.
//! - Landing on exactly 0 wins.
//! - Going below 0, landing on 1, or (with double-out) dropping below 2 is a
//!   bust: the score reverts to its value at the start of the turn and the
//!   same participant stays up until the bust is acknowledged.
//!
//! Turns are slot-major.

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, CountdownAction, TurnChoice};
use crate::core::config::GameOptions;
use crate::core::participant::{ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState, TurnCursor};
use crate::rules::engine::{
    ensure_running, ensure_turn, validate_score, ActionError, ModeRules, WinnerRecord,
};
use crate::rules::turn::{TurnPolicy, TurnSearch};

/// Default start score.
pub const START_SCORE: i64 = 501;

/// Highest three-dart total.
pub const MAX_TURN_SCORE: i64 = 180;

/// Per-participant countdown state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownScore {
    pub score: i64,
    pub is_doubled_in: bool,
    /// Score at the start of the current turn; busts revert to it.
    pub previous_score_this_turn: i64,
    pub darts_thrown_this_turn: u32,
    pub last_turn_score: i64,
}

impl CountdownScore {
    #[must_use]
    pub fn new(start: i64) -> Self {
        Self {
            score: start,
            is_doubled_in: false,
            previous_score_this_turn: start,
            darts_thrown_this_turn: 0,
            last_turn_score: 0,
        }
    }
}

/// What the controller is being asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CountdownPrompt {
    /// Choose between scoring, no score, or acknowledging a bust.
    Action { cursor: TurnCursor },
    /// Enter the turn total.
    Keypad { cursor: TurnCursor },
    #[default]
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CountdownBoard {
    pub double_in: bool,
    pub double_out: bool,
    pub start_score: i64,
    pub prompt: CountdownPrompt,
    pub bust_message: Option<String>,
}

impl Default for CountdownBoard {
    fn default() -> Self {
        Self {
            double_in: true,
            double_out: false,
            start_score: START_SCORE,
            prompt: CountdownPrompt::None,
            bust_message: None,
        }
    }
}

/// Countdown rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct FiveZeroOne;

fn board_mut(game: &mut Game) -> Result<&mut CountdownBoard, ActionError> {
    let active = game.mode();
    game.board.five_zero_one_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::FiveZeroOne,
    })
}

fn current_mut(game: &mut Game) -> Result<&mut CountdownScore, ActionError> {
    game.current_participant_mut()
        .and_then(|p| p.state.five_zero_one_mut())
        .ok_or(ActionError::StaleTurn)
}

impl FiveZeroOne {
    /// Hand the turn to the next participant and show the action prompt.
    fn advance(game: &mut Game) {
        if let Some(state) = game
            .current_participant_mut()
            .and_then(|p| p.state.five_zero_one_mut())
        {
            state.darts_thrown_this_turn = 0;
        }

        let search = game.advance_turn(TurnPolicy::SlotMajor, |_| false);
        let prompt = match search {
            TurnSearch::Found(cursor) => {
                if let Some(state) = game
                    .current_participant_mut()
                    .and_then(|p| p.state.five_zero_one_mut())
                {
                    state.previous_score_this_turn = state.score;
                }
                CountdownPrompt::Action { cursor }
            }
            TurnSearch::Exhausted { .. } => CountdownPrompt::None,
        };

        if let Some(board) = game.board.five_zero_one_mut() {
            board.prompt = prompt;
            board.bust_message = match search {
                TurnSearch::Found(_) => None,
                TurnSearch::Exhausted { .. } => {
                    Some("Error: Could not determine next player.".to_string())
                }
            };
        }
        if !search.is_found() {
            game.conclude(WinnerRecord::error("Error - No Next Turn"));
        }
    }

    fn turn_choice(
        game: &mut Game,
        participant: Option<usize>,
        choice: TurnChoice,
    ) -> Result<(), ActionError> {
        let CountdownPrompt::Action { cursor } = board_mut(game)?.prompt else {
            return Err(ActionError::NoPrompt);
        };
        ensure_turn(game, participant)?;

        board_mut(game)?.bust_message = None;
        match choice {
            TurnChoice::ScoreCounts => {
                board_mut(game)?.prompt = CountdownPrompt::Keypad { cursor };
            }
            TurnChoice::NoScore => {
                let state = current_mut(game)?;
                state.darts_thrown_this_turn = 3;
                state.last_turn_score = 0;
                Self::advance(game);
            }
            TurnChoice::BustAcknowledged => Self::advance(game),
        }
        Ok(())
    }

    fn submit_score(
        &self,
        game: &mut Game,
        participant: Option<usize>,
        score: i64,
    ) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let cursor = match board.prompt {
            CountdownPrompt::Action { cursor } | CountdownPrompt::Keypad { cursor } => cursor,
            CountdownPrompt::None => return Err(ActionError::NoPrompt),
        };
        let (double_in, double_out) = (board.double_in, board.double_out);
        ensure_turn(game, participant)?;
        let score = validate_score(score, 0..=MAX_TURN_SCORE)?;

        let name = game
            .current_participant()
            .map(|p| p.name.clone())
            .unwrap_or_default();
        let state = current_mut(game)?;
        if double_in && !state.is_doubled_in && score > 0 {
            state.is_doubled_in = true;
        }
        if !double_in || state.is_doubled_in {
            state.score -= score;
        }
        state.darts_thrown_this_turn += 3;
        state.last_turn_score = score;

        let remaining = state.score;
        let bust = remaining < 0 || remaining == 1 || (double_out && remaining < 2 && remaining != 0);
        if bust {
            state.score = state.previous_score_this_turn;
            let reverted = state.score;
            tracing::debug!(game = %game.id, participant = %name, reverted, "bust");
            let board = board_mut(game)?;
            board.bust_message = Some(format!("BUST! {name} reverts to {reverted}."));
            board.prompt = CountdownPrompt::Action { cursor };
            return Ok(());
        }

        board_mut(game)?.prompt = CountdownPrompt::None;
        match self.evaluate(game) {
            Some(winner) => game.conclude(winner),
            None => Self::advance(game),
        }
        Ok(())
    }

    fn cancel_keypad(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let CountdownPrompt::Keypad { cursor } = board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = CountdownPrompt::Action { cursor };
        board.bust_message = None;
        Ok(())
    }
}

impl ModeRules for FiveZeroOne {
    fn mode(&self) -> ModeId {
        ModeId::FiveZeroOne
    }

    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, _rng: &mut GameRng) -> Game {
        let start_score = if options.start_score > 1 {
            options.start_score
        } else {
            START_SCORE
        };
        let board = CountdownBoard {
            double_in: options.double_in.unwrap_or(true),
            double_out: options.double_out,
            start_score,
            ..CountdownBoard::default()
        };
        tracing::debug!(
            double_in = board.double_in,
            double_out = board.double_out,
            start_score,
            "countdown options"
        );

        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::FiveZeroOne(CountdownScore::new(start_score))))
            .collect();
        let mut game = Game::new(ModeState::FiveZeroOne(board), participants);
        Self::advance(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::FiveZeroOne(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::FiveZeroOne,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            CountdownAction::Turn { participant, choice } => {
                Self::turn_choice(game, *participant, *choice)
            }
            CountdownAction::SubmitScore { participant, score } => {
                self.submit_score(game, *participant, *score)
            }
            CountdownAction::CancelKeypad => Self::cancel_keypad(game),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        game.participants
            .iter()
            .find(|p| p.state.five_zero_one().is_some_and(|s| s.score == 0))
            .map(|p| WinnerRecord::team(p, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::TeamSetup;
    use crate::rules::engine::WinnerKind;

    fn start(names: &[&str], options: GameOptions) -> Game {
        let setups: Vec<TeamSetup> = names.iter().map(|n| TeamSetup::new(*n, &[*n])).collect();
        FiveZeroOne.initialize(Roster::from_setups(&setups), &options, &mut GameRng::new(1))
    }

    fn choose(game: &mut Game, choice: TurnChoice) -> Result<(), ActionError> {
        FiveZeroOne.apply(
            game,
            &Action::FiveZeroOne(CountdownAction::Turn {
                participant: game.current_participant_index,
                choice,
            }),
        )
    }

    fn submit(game: &mut Game, score: i64) -> Result<(), ActionError> {
        FiveZeroOne.apply(
            game,
            &Action::FiveZeroOne(CountdownAction::SubmitScore {
                participant: game.current_participant_index,
                score,
            }),
        )
    }

    fn score(game: &Game, index: usize) -> i64 {
        game.participants[index].state.five_zero_one().unwrap().score
    }

    fn set_score(game: &mut Game, index: usize, value: i64) {
        let state = game.participants[index].state.five_zero_one_mut().unwrap();
        state.score = value;
        state.previous_score_this_turn = value;
        state.is_doubled_in = true;
    }

    #[test]
    fn test_initial_prompt() {
        let game = start(&["A", "B"], GameOptions::default());
        let board = game.board.five_zero_one().unwrap();
        assert!(board.double_in);
        assert!(!board.double_out);
        assert_eq!(
            board.prompt,
            CountdownPrompt::Action { cursor: TurnCursor::new(0, 0) }
        );
        assert_eq!(score(&game, 0), 501);
    }

    #[test]
    fn test_score_deducts_and_advances() {
        let mut game = start(&["A", "B"], GameOptions::default());
        choose(&mut game, TurnChoice::ScoreCounts).unwrap();
        submit(&mut game, 60).unwrap();

        assert_eq!(score(&game, 0), 441);
        assert!(game.participants[0].state.five_zero_one().unwrap().is_doubled_in);
        assert_eq!(game.current_participant_index, Some(1));
    }

    #[test]
    fn test_double_in_ignores_zero_turn() {
        let mut game = start(&["A", "B"], GameOptions::default());
        submit(&mut game, 0).unwrap();
        let state = game.participants[0].state.five_zero_one().unwrap();
        assert!(!state.is_doubled_in);
        assert_eq!(state.score, 501);
    }

    #[test]
    fn test_no_double_in_deducts_immediately() {
        let mut game = start(&["A"], GameOptions::default().double_in(false));
        submit(&mut game, 100).unwrap();
        assert_eq!(score(&game, 0), 401);
    }

    #[test]
    fn test_out_of_range_score_rejected() {
        let mut game = start(&["A", "B"], GameOptions::default());
        choose(&mut game, TurnChoice::ScoreCounts).unwrap();
        let before = game.clone();
        assert!(matches!(submit(&mut game, 181), Err(ActionError::InvalidInput(_))));
        assert_eq!(game, before);
    }

    #[test]
    fn test_bust_reverts_and_keeps_player() {
        for (remaining, thrown, double_out) in [(40, 41, false), (40, 39, false), (40, 39, true)] {
            let mut game = start(&["A", "B"], GameOptions::default().double_out(double_out));
            set_score(&mut game, 0, remaining);

            submit(&mut game, thrown).unwrap();

            assert_eq!(score(&game, 0), remaining);
            assert_eq!(game.current_participant_index, Some(0));
            let board = game.board.five_zero_one().unwrap();
            assert_eq!(board.bust_message.as_deref(), Some("BUST! A reverts to 40."));
            assert!(matches!(board.prompt, CountdownPrompt::Action { .. }));

            choose(&mut game, TurnChoice::BustAcknowledged).unwrap();
            assert_eq!(game.current_participant_index, Some(1));
        }
    }

    #[test]
    fn test_exact_zero_wins() {
        for double_out in [false, true] {
            let mut game = start(&["A", "B"], GameOptions::default().double_out(double_out));
            set_score(&mut game, 0, 32);
            submit(&mut game, 32).unwrap();
            assert!(game.game_over);
            let winner = game.winner.as_ref().unwrap();
            assert_eq!(winner.name, "A");
            assert!(winner.is_countable());
        }
    }

    #[test]
    fn test_no_score_advances() {
        let mut game = start(&["A", "B"], GameOptions::default());
        choose(&mut game, TurnChoice::NoScore).unwrap();
        assert_eq!(game.current_participant_index, Some(1));
        assert_eq!(game.participants[0].state.five_zero_one().unwrap().last_turn_score, 0);
    }

    #[test]
    fn test_no_eligible_next_turn_ends_in_error() {
        let mut game = start(&["A", "B"], GameOptions::default());
        for participant in game.participants.iter_mut() {
            participant.players.clear();
        }

        choose(&mut game, TurnChoice::NoScore).unwrap();

        assert!(game.game_over);
        let board = game.board.five_zero_one().unwrap();
        assert_eq!(board.prompt, CountdownPrompt::None);
        assert_eq!(
            board.bust_message.as_deref(),
            Some("Error: Could not determine next player.")
        );
        let winner = game.winner.as_ref().unwrap();
        assert_eq!(winner.kind, WinnerKind::Error);
        assert_eq!(winner.name, "Error - No Next Turn");
    }

    #[test]
    fn test_cancel_keypad() {
        let mut game = start(&["A", "B"], GameOptions::default());
        assert_eq!(
            FiveZeroOne.apply(&mut game, &Action::FiveZeroOne(CountdownAction::CancelKeypad)),
            Err(ActionError::NoPrompt)
        );
        choose(&mut game, TurnChoice::ScoreCounts).unwrap();
        FiveZeroOne
            .apply(&mut game, &Action::FiveZeroOne(CountdownAction::CancelKeypad))
            .unwrap();
        assert!(matches!(
            game.board.five_zero_one().unwrap().prompt,
            CountdownPrompt::Action { .. }
        ));
    }

    #[test]
    fn test_stale_turn_rejected() {
        let mut game = start(&["A", "B"], GameOptions::default());
        let result = FiveZeroOne.apply(
            &mut game,
            &Action::FiveZeroOne(CountdownAction::SubmitScore {
                participant: Some(1),
                score: 20,
            }),
        );
        assert_eq!(result, Err(ActionError::StaleTurn));
    }
}
