//! Elimination-by-comparison game (Beers).
//!
//! ## Rules
//!
//! - The first posted score just sets the score to beat.
//! - Every later score is compared with the previous one under the game's
//!   rule: with `HIGHER` it must be strictly higher, with `LOWER` strictly
//!   lower. Failing gives the thrower the next letter of `BEERS`.
//! - Collecting all five letters eliminates the participant.
//! - The last participant left standing wins; their score is the number of
//!   letters they collected.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::action::{Action, BeersAction};
use crate::core::config::GameOptions;
use crate::core::participant::{ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState};
use crate::rules::engine::{
    ensure_running, validate_score, ActionError, ModeRules, WinnerRecord,
};
use crate::rules::turn::{TurnPolicy, TurnSearch};

/// Letters handed out, in order.
pub const PENALTY_WORD: [char; 5] = ['B', 'E', 'E', 'R', 'S'];

/// Highest three-dart total.
pub const MAX_SCORE: i64 = 180;

/// Direction a score has to beat the previous one in.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ComparisonRule {
    #[default]
    Higher,
    Lower,
}

impl ComparisonRule {
    /// Whether `score` fails to beat `to_beat`.
    #[must_use]
    pub fn fails(self, score: i64, to_beat: i64) -> bool {
        match self {
            ComparisonRule::Higher => score <= to_beat,
            ComparisonRule::Lower => score >= to_beat,
        }
    }
}

/// Per-participant letters.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeersRecord {
    pub letters_given: SmallVec<[char; 5]>,
    pub is_eliminated: bool,
    pub last_score: Option<i64>,
}

impl BeersRecord {
    /// Hand out the next letter; returns it.
    pub fn give_letter(&mut self) -> char {
        let letter = PENALTY_WORD[self.letters_given.len() % PENALTY_WORD.len()];
        self.letters_given.push(letter);
        if self.letters_given.len() >= PENALTY_WORD.len() {
            self.is_eliminated = true;
        }
        letter
    }
}

/// What the controller is being asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum BeersPrompt {
    PlayerAction {
        participant_index: usize,
    },
    Keypad {
        participant_index: usize,
        is_setting_initial_score: bool,
    },
    /// The thrower must acknowledge the letter they just took.
    TakeLetter {
        participant_index: usize,
        letter: char,
    },
    #[default]
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeersBoard {
    pub rule: ComparisonRule,
    pub score_to_beat: Option<i64>,
    pub prompt: BeersPrompt,
}

/// Elimination-by-comparison rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Beers;

fn board_mut(game: &mut Game) -> Result<&mut BeersBoard, ActionError> {
    let active = game.mode();
    game.board.beers_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::Beers,
    })
}

fn set_prompt(game: &mut Game, prompt: BeersPrompt) {
    if let Some(board) = game.board.beers_mut() {
        board.prompt = prompt;
    }
}

impl Beers {
    fn conclude_if_won(&self, game: &mut Game) -> bool {
        match self.evaluate(game) {
            Some(winner) => {
                set_prompt(game, BeersPrompt::None);
                game.conclude(winner);
                true
            }
            None => false,
        }
    }

    fn advance(&self, game: &mut Game) {
        if self.conclude_if_won(game) {
            return;
        }
        match game.advance_turn(TurnPolicy::ParticipantMajor, |_| false) {
            TurnSearch::Found(cursor) => set_prompt(
                game,
                BeersPrompt::PlayerAction {
                    participant_index: cursor.participant,
                },
            ),
            TurnSearch::Exhausted { .. } => {
                set_prompt(game, BeersPrompt::None);
                game.conclude(WinnerRecord::error("Error - Turn Stuck"));
            }
        }
    }

    fn request_score_entry(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BeersPrompt::PlayerAction { participant_index } = board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        let is_setting_initial_score = board.score_to_beat.is_none();
        if game.current_participant().map_or(true, |p| p.is_eliminated()) {
            return Err(ActionError::StaleTurn);
        }
        board_mut(game)?.prompt = BeersPrompt::Keypad {
            participant_index,
            is_setting_initial_score,
        };
        Ok(())
    }

    fn submit_score(&self, game: &mut Game, score: i64) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BeersPrompt::Keypad { participant_index, .. } = board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        let score = validate_score(score, 0..=MAX_SCORE)?;
        let take_letter = board
            .score_to_beat
            .is_some_and(|to_beat| board.rule.fails(score, to_beat));
        board.score_to_beat = Some(score);
        board.prompt = BeersPrompt::None;

        let record = game
            .participant_mut(participant_index)
            .and_then(|p| p.state.beers_mut())
            .ok_or(ActionError::StaleTurn)?;
        record.last_score = Some(score);

        if take_letter {
            let letter = record.give_letter();
            let eliminated = record.is_eliminated;
            tracing::debug!(game = %game.id, participant_index, %letter, eliminated, "letter given");
            set_prompt(
                game,
                BeersPrompt::TakeLetter {
                    participant_index,
                    letter,
                },
            );
            self.conclude_if_won(game);
        } else {
            self.advance(game);
        }
        Ok(())
    }

    fn cancel_score_entry(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BeersPrompt::Keypad { participant_index, .. } = board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = BeersPrompt::PlayerAction { participant_index };
        Ok(())
    }

    fn acknowledge_letter(&self, game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let BeersPrompt::TakeLetter { .. } = board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = BeersPrompt::None;
        self.advance(game);
        Ok(())
    }
}

impl ModeRules for Beers {
    fn mode(&self) -> ModeId {
        ModeId::Beers
    }

    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, _rng: &mut GameRng) -> Game {
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Beers(BeersRecord::default())))
            .collect();
        let board = BeersBoard {
            rule: options.beers_rule,
            ..BeersBoard::default()
        };
        let mut game = Game::new(ModeState::Beers(board), participants);
        self.advance(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::Beers(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::Beers,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            BeersAction::RequestScoreEntry => Self::request_score_entry(game),
            BeersAction::SubmitScore { score } => self.submit_score(game, *score),
            BeersAction::CancelScoreEntry => Self::cancel_score_entry(game),
            BeersAction::AcknowledgeLetter => self.acknowledge_letter(game),
        }
    }

    /// Last one standing, once at least one participant is out.
    ///
    /// A lone participant never wins: with nobody eliminated the game keeps
    /// going, so a one-team game runs until it is ended by hand.
    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        let mut active = game.participants.iter().filter(|p| !p.is_eliminated());
        let eliminated = game.participants.len() - game.active_count();
        if eliminated == 0 {
            return None;
        }

        match (active.next(), active.next()) {
            (Some(winner), None) => {
                let letters = winner.state.beers().map_or(0, |r| r.letters_given.len());
                Some(WinnerRecord::team(winner, letters as i64))
            }
            (None, _) => Some(WinnerRecord::none()),
            _ => None,
        }
    }
}
