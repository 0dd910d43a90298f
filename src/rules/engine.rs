//! Mode rules trait and shared outcome/error types.
//!
//! Each game mode implements [`ModeRules`]:
//! - `initialize`: build participants, payload and the first prompt
//! - `apply`: validate and apply one action
//! - `evaluate`: decide whether the game is won
//!
//! [`rules_for`] is the single dispatch table from [`ModeId`] to rules.
//!
//! ## Implementation Notes
//!
//! - `apply` must leave the game untouched when it returns `Err`. The engine
//!   additionally applies actions to a clone, so partial mutation before an
//!   error is discarded, but handlers validate before mutating anyway.
//! - A failed turn search is not an error: the handler concludes the game
//!   with an error-kind [`WinnerRecord`] and returns `Ok`.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

use crate::core::action::Action;
use crate::core::config::GameOptions;
use crate::core::participant::{Participant, ParticipantId, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId};
use crate::games::{
    around_the_world::AroundTheWorld, baseball::Baseball, beers::Beers, cricket::Cricket,
    five_zero_one::FiveZeroOne, golf::Golf, killer::Killer, three_ff::ThreeFf,
};

/// Whether a winner record counts toward statistics.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WinnerKind {
    Team,
    Tie,
    None,
    Error,
}

/// Score shown next to the winner: points, or a label such as `WIN!`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DisplayScore {
    Points(i64),
    Label(String),
}

impl From<i64> for DisplayScore {
    fn from(points: i64) -> Self {
        DisplayScore::Points(points)
    }
}

/// Outcome of a concluded game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinnerRecord {
    /// Winning participant; absent for ties, no-winner and errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<ParticipantId>,
    pub name: String,
    pub score: DisplayScore,
    #[serde(rename = "type")]
    pub kind: WinnerKind,
}

impl WinnerRecord {
    /// A single participant won.
    #[must_use]
    pub fn team(participant: &Participant, score: impl Into<DisplayScore>) -> Self {
        Self {
            id: Some(participant.id.clone()),
            name: participant.name.clone(),
            score: score.into(),
            kind: WinnerKind::Team,
        }
    }

    /// Several participants share the win.
    #[must_use]
    pub fn tie<'a>(
        participants: impl IntoIterator<Item = &'a Participant>,
        score: impl Into<DisplayScore>,
    ) -> Self {
        let names: Vec<&str> = participants.into_iter().map(|p| p.name.as_str()).collect();
        Self::tie_named(format!("Tie ({})", names.join(" & ")), score)
    }

    /// A tie with a fixed label.
    #[must_use]
    pub fn tie_named(name: impl Into<String>, score: impl Into<DisplayScore>) -> Self {
        Self {
            id: None,
            name: name.into(),
            score: score.into(),
            kind: WinnerKind::Tie,
        }
    }

    /// The game ended without anyone winning.
    #[must_use]
    pub fn none() -> Self {
        Self {
            id: None,
            name: "No Winner".to_string(),
            score: DisplayScore::Points(0),
            kind: WinnerKind::None,
        }
    }

    /// The game could not continue.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            id: None,
            name: message.into(),
            score: DisplayScore::Points(0),
            kind: WinnerKind::Error,
        }
    }

    /// Best-score standings over `participants`.
    ///
    /// One leader is a team win, several are a tie, an empty list is
    /// no-winner.
    pub fn from_standings<'a, I, F>(participants: I, key: F, lowest_wins: bool) -> Self
    where
        I: IntoIterator<Item = &'a Participant>,
        F: Fn(&Participant) -> i64,
    {
        let mut best: Option<i64> = None;
        let mut leaders: Vec<&Participant> = Vec::new();

        for participant in participants {
            let value = key(participant);
            let better = match best {
                None => true,
                Some(current) if lowest_wins => value < current,
                Some(current) => value > current,
            };
            if better {
                best = Some(value);
                leaders.clear();
                leaders.push(participant);
            } else if best == Some(value) {
                leaders.push(participant);
            }
        }

        match (leaders.as_slice(), best) {
            ([winner], Some(score)) => Self::team(winner, score),
            (_, Some(score)) => Self::tie(leaders.iter().copied(), score),
            _ => Self::none(),
        }
    }

    /// Whether statistics should count this record.
    #[must_use]
    pub fn is_countable(&self) -> bool {
        self.kind == WinnerKind::Team && self.id.is_some()
    }
}

/// Why an action was not applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("no game is active")]
    NoActiveGame,

    #[error("the game is already over")]
    GameOver,

    #[error("action for {action} does not match the active {active} game")]
    ModeMismatch { active: ModeId, action: ModeId },

    #[error("action is not for the current turn")]
    StaleTurn,

    #[error("no prompt is open for this action")]
    NoPrompt,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Rule violation with a message meant for the player.
    #[error("{0}")]
    Rejected(String),
}

/// Why a game could not be started.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StartError {
    #[error("unknown game mode: {0}")]
    UnknownMode(String),

    #[error("For KILLER mode, please use the 'startKillerGame' event.")]
    UseKillerStart,

    #[error("Cannot start Killer game: Invalid player data.")]
    NoParticipants,
}

/// Rules for one game mode.
///
/// Implementations are stateless; all state lives in [`Game`].
pub trait ModeRules: Sync {
    /// Mode these rules implement.
    fn mode(&self) -> ModeId;

    /// Build a fresh game from a normalized roster.
    ///
    /// `roster` is never empty.
    fn initialize(&self, roster: Vec<Roster>, options: &GameOptions, rng: &mut GameRng) -> Game;

    /// Validate and apply one action.
    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError>;

    /// Winner, if the current state satisfies the mode's win condition.
    fn evaluate(&self, game: &Game) -> Option<WinnerRecord>;
}

/// Rules for `mode`.
#[must_use]
pub fn rules_for(mode: ModeId) -> &'static dyn ModeRules {
    match mode {
        ModeId::Cricket => &Cricket,
        ModeId::FiveZeroOne => &FiveZeroOne,
        ModeId::AroundTheWorld => &AroundTheWorld,
        ModeId::Beers => &Beers,
        ModeId::Golf => &Golf,
        ModeId::Baseball => &Baseball,
        ModeId::Killer => &Killer,
        ModeId::ThreeFf => &ThreeFf,
    }
}

// === Shared validation ===

/// Reject actions on a finished game.
pub fn ensure_running(game: &Game) -> Result<(), ActionError> {
    if game.game_over {
        Err(ActionError::GameOver)
    } else {
        Ok(())
    }
}

/// Reject actions naming a participant other than the current one.
///
/// `None` means the controller did not name anyone.
pub fn ensure_turn(game: &Game, participant: Option<usize>) -> Result<(), ActionError> {
    match participant {
        Some(index) if game.current_participant_index != Some(index) => {
            Err(ActionError::StaleTurn)
        }
        _ => Ok(()),
    }
}

/// Range-check a score.
pub fn validate_score(score: i64, range: RangeInclusive<i64>) -> Result<i64, ActionError> {
    if range.contains(&score) {
        Ok(score)
    } else {
        Err(ActionError::InvalidInput(format!(
            "score {score} outside {}..={}",
            range.start(),
            range.end()
        )))
    }
}
