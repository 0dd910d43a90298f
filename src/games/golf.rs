//! Stroke-count game (Golf).
//!
//! ## Rules
//!
//! - One score per participant per hole, 1..=6; the total is the sum.
//! - Lowest total after the last hole wins; a shared lowest total is a tie.
//!
//! ## Honors
//!
//! The throwing order is rebuilt at the start of every hole: the best score
//! on the previous hole throws first ("has the honors"), then everyone else
//! in roster order. If several tie for best, the current honors holder keeps
//! it when among them, otherwise the first of them takes it.

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, GolfAction};
use crate::core::config::GameOptions;
use crate::core::participant::{ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState, TurnCursor};
use crate::rules::engine::{
    ensure_running, validate_score, ActionError, ModeRules, WinnerRecord,
};

/// Default round length.
pub const DEFAULT_HOLES: usize = 18;

/// Longest round accepted; anything outside `1..=MAX_HOLES` plays the default.
pub const MAX_HOLES: usize = 36;

/// Lowest and highest stroke count for a hole.
pub const MIN_STROKES: i64 = 1;
pub const MAX_STROKES: i64 = 6;

/// Per-participant scorecard.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GolfCard {
    /// One entry per hole; `None` until played.
    pub scores: Vec<Option<u8>>,
    pub total_score: i64,
}

impl GolfCard {
    #[must_use]
    pub fn new(holes: usize) -> Self {
        Self {
            scores: vec![None; holes],
            total_score: 0,
        }
    }

    /// Record a hole (1-based) and refresh the total.
    pub fn record(&mut self, hole: usize, strokes: u8) {
        if let Some(slot) = hole.checked_sub(1).and_then(|i| self.scores.get_mut(i)) {
            *slot = Some(strokes);
        }
        self.total_score = self.scores.iter().flatten().map(|s| i64::from(*s)).sum();
    }

    #[must_use]
    pub fn score_on(&self, hole: usize) -> Option<u8> {
        hole.checked_sub(1)
            .and_then(|i| self.scores.get(i))
            .copied()
            .flatten()
    }
}

/// What the controller is being asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum GolfPrompt {
    ScoreEntry {
        participant_index: usize,
        current_hole: usize,
    },
    Keypad {
        participant_index: usize,
        current_hole: usize,
    },
    #[default]
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GolfBoard {
    pub num_holes: usize,
    /// 1-based; one past `num_holes` once the round is over.
    pub current_hole: usize,
    pub turn_order: Vec<usize>,
    pub turn_order_index: usize,
    pub honors_holder_index: usize,
    pub prompt: GolfPrompt,
}

impl GolfBoard {
    #[must_use]
    pub fn new(num_holes: usize) -> Self {
        Self {
            num_holes,
            current_hole: 1,
            turn_order: Vec::new(),
            turn_order_index: 0,
            honors_holder_index: 0,
            prompt: GolfPrompt::None,
        }
    }

    /// Participant whose turn it is, per the honors order.
    #[must_use]
    pub fn up_next(&self) -> Option<usize> {
        self.turn_order.get(self.turn_order_index).copied()
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.current_hole > self.num_holes
    }
}

/// Stroke-count rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Golf;

fn board_mut(game: &mut Game) -> Result<&mut GolfBoard, ActionError> {
    let active = game.mode();
    game.board.golf_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::Golf,
    })
}

fn total_of(participant: &crate::core::participant::Participant) -> i64 {
    participant.state.golf().map_or(0, |card| card.total_score)
}

/// Rebuild the throwing order for the board's current hole.
fn determine_honors(game: &mut Game) {
    let Some(board) = game.board.golf() else {
        return;
    };
    let hole = board.current_hole;
    let holder = board.honors_holder_index;

    let mut honors = 0;
    if hole > 1 {
        let mut best: Option<u8> = None;
        let mut candidates: Vec<usize> = Vec::new();
        for (index, participant) in game.participants.iter().enumerate() {
            let Some(score) = participant.state.golf().and_then(|c| c.score_on(hole - 1)) else {
                continue;
            };
            match best {
                Some(b) if score > b => {}
                Some(b) if score == b => candidates.push(index),
                _ => {
                    best = Some(score);
                    candidates = vec![index];
                }
            }
        }
        honors = match candidates.as_slice() {
            [] => holder,
            [only] => *only,
            [first, ..] if !candidates.contains(&holder) => *first,
            _ => holder,
        };
    }

    let order: Vec<usize> = std::iter::once(honors)
        .chain((0..game.participants.len()).filter(|&i| i != honors))
        .collect();
    tracing::debug!(game = %game.id, hole, honors, ?order, "golf honors");

    if let Some(board) = game.board.golf_mut() {
        board.honors_holder_index = honors;
        board.turn_order = order;
        board.turn_order_index = 0;
    }
}

impl Golf {
    /// Point the cursor and prompt at whoever is up.
    fn prompt_next(game: &mut Game) {
        let Some(board) = game.board.golf_mut() else {
            return;
        };
        let hole = board.current_hole;
        match board.up_next() {
            Some(participant_index) => {
                board.prompt = GolfPrompt::ScoreEntry {
                    participant_index,
                    current_hole: hole,
                };
                game.set_cursor(TurnCursor::new(participant_index, 0));
            }
            None => {
                board.prompt = GolfPrompt::None;
                game.conclude(WinnerRecord::error("Error: Turn order failure"));
            }
        }
    }

    fn advance(&self, game: &mut Game) {
        let Some(board) = game.board.golf_mut() else {
            return;
        };
        board.turn_order_index += 1;
        if board.turn_order_index >= board.turn_order.len() {
            board.current_hole += 1;
            if board.is_finished() {
                board.prompt = GolfPrompt::None;
                if let Some(winner) = self.evaluate(game) {
                    game.conclude(winner);
                }
                return;
            }
            determine_honors(game);
        }
        Self::prompt_next(game);
    }

    fn request_score_entry(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let GolfPrompt::ScoreEntry {
            participant_index,
            current_hole,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        if board.up_next() != Some(participant_index) {
            return Err(ActionError::StaleTurn);
        }
        board.prompt = GolfPrompt::Keypad {
            participant_index,
            current_hole,
        };
        Ok(())
    }

    fn submit_score(&self, game: &mut Game, score: i64) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let GolfPrompt::Keypad {
            participant_index,
            current_hole,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        if board.up_next() != Some(participant_index) {
            return Err(ActionError::StaleTurn);
        }
        let strokes = validate_score(score, MIN_STROKES..=MAX_STROKES)?;
        let strokes = u8::try_from(strokes)
            .map_err(|_| ActionError::InvalidInput(format!("score {strokes}")))?;

        let card = game
            .participant_mut(participant_index)
            .and_then(|p| p.state.golf_mut())
            .ok_or(ActionError::StaleTurn)?;
        card.record(current_hole, strokes);

        board_mut(game)?.prompt = GolfPrompt::None;
        self.advance(game);
        Ok(())
    }

    fn cancel_score_entry(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let GolfPrompt::Keypad {
            participant_index,
            current_hole,
        } = board.prompt
        else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = GolfPrompt::ScoreEntry {
            participant_index,
            current_hole,
        };
        Ok(())
    }
}

impl ModeRules for Golf {
    fn mode(&self) -> ModeId {
        ModeId::Golf
    }

    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, _rng: &mut GameRng) -> Game {
        let holes = match options.golf_num_holes {
            n @ 1..=MAX_HOLES => n,
            _ => DEFAULT_HOLES,
        };
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Golf(GolfCard::new(holes))))
            .collect();
        let mut game = Game::new(ModeState::Golf(GolfBoard::new(holes)), participants);
        determine_honors(&mut game);
        Self::prompt_next(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::Golf(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::Golf,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            GolfAction::RequestScoreEntry => Self::request_score_entry(game),
            GolfAction::SubmitScore { score } => self.submit_score(game, *score),
            GolfAction::CancelScoreEntry => Self::cancel_score_entry(game),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        let board = game.board.golf()?;
        if !board.is_finished() {
            return None;
        }
        Some(WinnerRecord::from_standings(&game.participants, total_of, true))
    }
}
