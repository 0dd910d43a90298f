//! Objective-round game (3 Friendly Flights).
//!
//! ## Objectives
//!
//! The board is the static numbers `20..15` and `B`, interleaved with a
//! shuffled pool: one `3FF` grouping special, one hard score drawn from
//! [`HARD_SCORES`], and a number of random challenges drawn from
//! [`CHALLENGE_POOL`]. Objective ids are assigned in creation order
//! (statics first), so ids do not follow board order.
//!
//! ## Rounds
//!
//! One objective is active at a time. Every (participant, slot) in slot-major
//! order gets one turn against it: "missed" halves the participant's score
//! (rounding up), "met" opens a keypad whose value is added. When the cursor
//! returns to the slot that opened the round, the objective closes and the
//! next one activates. After the last objective the highest score wins.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::action::{Action, FlightsAction, ObjectiveOutcome};
use crate::core::config::GameOptions;
use crate::core::objective::{Objective, ObjectiveKind};
use crate::core::participant::{Participant, ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState, TurnCursor};
use crate::rules::engine::{
    ensure_running, ensure_turn, validate_score, ActionError, ModeRules, WinnerRecord,
};
use crate::rules::turn::{TurnPolicy, TurnSearch};

/// Random challenges added when the options do not say otherwise.
pub const DEFAULT_RANDOM_CHALLENGES: usize = 4;

/// Static numeric objectives, in board order.
pub const STATIC_OBJECTIVES: [&str; 7] = ["20", "19", "18", "17", "16", "15", "B"];

/// Exact-score objectives; one is always on the board.
pub const HARD_SCORES: [i64; 3] = [61, 65, 69];

/// Name of the guaranteed grouping objective.
pub const SPECIAL_NAME: &str = "3FF";

/// Random challenge names and descriptions.
pub const CHALLENGE_POOL: [(&str, &str); 11] = [
    ("3C#", "Hit 3 Consecutive Numbers in one turn (Must call up or down)."),
    ("D", "Hit any Double."),
    ("EOE", "Hit Even, Odd, Even numbers in sequence."),
    ("OEO", "Hit Odd, Even, Odd numbers in sequence."),
    ("ASC", "Hit all the same colour."),
    ("3DC", "Hit 3 different Doubles or Trebles in one turn (e.g., D20, T10, D5)."),
    ("Holes", "Hit a hole in outside ring of numbers on the dartboard."),
    ("T", "Hit any Triple."),
    ("AS#", "Score the same number with all darts as your first dart thrown."),
    ("B", "Hit a Bullseye (either single or double). Enter 25 or 50."),
    ("Nines", "Achieve a score that ends in the number 9. Enter your total score for the turn."),
];

/// Highest entry for a met objective.
pub const MAX_TURN_SCORE: i64 = 180;

/// Per-participant score.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightsScore {
    pub score: i64,
    /// Set by a miss; cleared by the next objective action.
    pub just_halved_score: bool,
}

impl FlightsScore {
    fn halve(&mut self) {
        self.score = (self.score + 1).div_euclid(2);
        self.just_halved_score = true;
    }
}

/// Turn and objective a prompt was opened for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectivePrompt {
    pub cursor: TurnCursor,
    pub objective_id: String,
    pub objective_name: String,
    pub objective_description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FlightsPrompt {
    MetMiss(ObjectivePrompt),
    Keypad(ObjectivePrompt),
    #[default]
    None,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlightsBoard {
    pub objectives: Vector<Objective>,
    pub active_objective_index: usize,
    /// Slot that opened the current objective's round.
    pub round_start: TurnCursor,
    pub prompt: FlightsPrompt,
}

impl FlightsBoard {
    #[must_use]
    pub fn new(objectives: Vector<Objective>) -> Self {
        Self {
            objectives,
            active_objective_index: 0,
            round_start: TurnCursor::default(),
            prompt: FlightsPrompt::None,
        }
    }

    #[must_use]
    pub fn active_objective(&self) -> Option<&Objective> {
        self.objectives.get(self.active_objective_index)
    }

    fn prompt_for(&self, cursor: TurnCursor) -> Option<ObjectivePrompt> {
        self.active_objective().map(|objective| ObjectivePrompt {
            cursor,
            objective_id: objective.id.clone(),
            objective_name: objective.name.clone(),
            objective_description: objective.description.clone(),
        })
    }
}

/// Build the board for one game.
///
/// `random_challenges` is capped at the pool size.
pub fn generate_objectives(random_challenges: usize, rng: &mut GameRng) -> Vector<Objective> {
    let mut next_id = 0usize;
    let mut make_id = || {
        let id = format!("3ff_obj_{next_id}");
        next_id += 1;
        id
    };

    let statics: Vec<Objective> = STATIC_OBJECTIVES
        .iter()
        .map(|&name| {
            let (value, label) = match name {
                "B" => (25, "Bullseye".to_string()),
                _ => (name.parse::<i64>().unwrap_or(0), name.to_string()),
            };
            Objective::new(make_id(), name, ObjectiveKind::Numeric { value })
                .with_description(format!("Hit a {label}."))
        })
        .collect();

    let mut pool = vec![Objective::new(make_id(), SPECIAL_NAME, ObjectiveKind::Special)
        .with_description(
            "Nice Grouping! (Flights must be touching, add up all darts with a score)",
        )];

    let hard = rng.choose(&HARD_SCORES[..]).copied().unwrap_or(HARD_SCORES[0]);
    pool.push(
        Objective::new(make_id(), hard.to_string(), ObjectiveKind::HardScore { value: hard })
            .with_description(format!("Achieve exactly {hard} points.")),
    );

    let mut challenges = CHALLENGE_POOL.to_vec();
    rng.shuffle(&mut challenges);
    for (name, description) in challenges.into_iter().take(random_challenges) {
        pool.push(
            Objective::new(make_id(), name, ObjectiveKind::RandomChallenge)
                .with_description(description),
        );
    }

    rng.shuffle(&mut pool);

    let mut board = Vector::new();
    let mut extras = pool.into_iter();
    for objective in statics {
        board.push_back(objective);
        if let Some(extra) = extras.next() {
            board.push_back(extra);
        }
    }
    board.extend(extras);
    board
}

/// Objective-round rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreeFf;

fn board_mut(game: &mut Game) -> Result<&mut FlightsBoard, ActionError> {
    let active = game.mode();
    game.board.three_ff_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::ThreeFf,
    })
}

fn set_prompt(game: &mut Game, prompt: FlightsPrompt) {
    if let Some(board) = game.board.three_ff_mut() {
        board.prompt = prompt;
    }
}

fn score_of(participant: &Participant) -> i64 {
    participant.state.three_ff().map_or(0, |s| s.score)
}

impl ThreeFf {
    fn finish(&self, game: &mut Game) {
        set_prompt(game, FlightsPrompt::None);
        game.conclude(WinnerRecord::from_standings(&game.participants, score_of, false));
    }

    fn advance(&self, game: &mut Game) {
        let cursor = match game.advance_turn(TurnPolicy::SlotMajor, |_| false) {
            TurnSearch::Found(cursor) => cursor,
            TurnSearch::Exhausted { .. } => {
                self.finish(game);
                return;
            }
        };

        let Some(board) = game.board.three_ff_mut() else {
            return;
        };
        if cursor == board.round_start {
            if let Some(objective) = board.objectives.get_mut(board.active_objective_index) {
                objective.close();
                tracing::debug!(game = %game.id, objective = %objective.name, "objective closed");
            }
            board.active_objective_index += 1;
            if board.active_objective_index >= board.objectives.len() {
                self.finish(game);
                return;
            }
            board.round_start = cursor;
        }
        board.prompt = board
            .prompt_for(cursor)
            .map_or(FlightsPrompt::None, FlightsPrompt::MetMiss);
    }

    fn objective_action(
        &self,
        game: &mut Game,
        participant: Option<usize>,
        outcome: ObjectiveOutcome,
    ) -> Result<(), ActionError> {
        ensure_turn(game, participant)?;
        let board = board_mut(game)?;
        let FlightsPrompt::MetMiss(prompt) = &board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        let active_id = board.active_objective().map(|o| o.id.as_str());
        if active_id != Some(prompt.objective_id.as_str()) {
            return Err(ActionError::StaleTurn);
        }
        let prompt = prompt.clone();
        if game.cursor() != Some(prompt.cursor) {
            return Err(ActionError::StaleTurn);
        }

        for p in game.participants.iter_mut() {
            if let Some(score) = p.state.three_ff_mut() {
                score.just_halved_score = false;
            }
        }

        match outcome {
            ObjectiveOutcome::Met => set_prompt(game, FlightsPrompt::Keypad(prompt)),
            ObjectiveOutcome::Missed => {
                let score = game
                    .participant_mut(prompt.cursor.participant)
                    .and_then(|p| p.state.three_ff_mut())
                    .ok_or(ActionError::StaleTurn)?;
                score.halve();
                set_prompt(game, FlightsPrompt::None);
                self.advance(game);
            }
        }
        Ok(())
    }

    fn submit_score(&self, game: &mut Game, score: i64) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let FlightsPrompt::Keypad(prompt) = &board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        let participant_index = prompt.cursor.participant;
        let score = validate_score(score, 0..=MAX_TURN_SCORE)?;

        let entry = game
            .participant_mut(participant_index)
            .and_then(|p| p.state.three_ff_mut())
            .ok_or(ActionError::StaleTurn)?;
        entry.score += score;

        set_prompt(game, FlightsPrompt::None);
        self.advance(game);
        Ok(())
    }

    fn cancel_keypad(game: &mut Game) -> Result<(), ActionError> {
        let board = board_mut(game)?;
        let FlightsPrompt::Keypad(prompt) = &board.prompt else {
            return Err(ActionError::NoPrompt);
        };
        board.prompt = FlightsPrompt::MetMiss(prompt.clone());
        Ok(())
    }
}

impl ModeRules for ThreeFf {
    fn mode(&self) -> ModeId {
        ModeId::ThreeFf
    }

    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, rng: &mut GameRng) -> Game {
        let objectives = generate_objectives(options.num_random_challenges, rng);
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::ThreeFf(FlightsScore::default())))
            .collect();
        let mut game = Game::new(ModeState::ThreeFf(FlightsBoard::new(objectives)), participants);

        let start = TurnCursor::new(0, 0);
        game.set_cursor(start);
        if let Some(board) = game.board.three_ff_mut() {
            board.round_start = start;
            board.prompt = board
                .prompt_for(start)
                .map_or(FlightsPrompt::None, FlightsPrompt::MetMiss);
        }
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::ThreeFf(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::ThreeFf,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            FlightsAction::Objective {
                participant,
                outcome,
            } => self.objective_action(game, *participant, *outcome),
            FlightsAction::SubmitScore { score } => self.submit_score(game, *score),
            FlightsAction::CancelKeypad => Self::cancel_keypad(game),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        let board = game.board.three_ff()?;
        if board.active_objective_index < board.objectives.len() {
            return None;
        }
        Some(WinnerRecord::from_standings(&game.participants, score_of, false))
    }
}
