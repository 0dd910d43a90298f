//! Actions reported by controllers.
//!
//! Each mode has its own action enum; [`Action`] wraps them so the engine
//! can route an action to the active mode and reject mismatches.
//!
//! Participant indices refer to positions in `Game::participants`. Where a
//! controller names the acting participant, the handler checks it against
//! the recorded turn and rejects stale messages.

use serde::{Deserialize, Serialize};

use super::participant::ParticipantId;
use super::state::ModeId;

/// An action for the active game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "action", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Action {
    Cricket(CricketAction),
    FiveZeroOne(CountdownAction),
    AroundTheWorld(AtwAction),
    Beers(BeersAction),
    Golf(GolfAction),
    Baseball(BaseballAction),
    Killer(KillerAction),
    ThreeFf(FlightsAction),
}

impl Action {
    /// Mode this action belongs to.
    #[must_use]
    pub fn mode(&self) -> ModeId {
        match self {
            Action::Cricket(_) => ModeId::Cricket,
            Action::FiveZeroOne(_) => ModeId::FiveZeroOne,
            Action::AroundTheWorld(_) => ModeId::AroundTheWorld,
            Action::Beers(_) => ModeId::Beers,
            Action::Golf(_) => ModeId::Golf,
            Action::Baseball(_) => ModeId::Baseball,
            Action::Killer(_) => ModeId::Killer,
            Action::ThreeFf(_) => ModeId::ThreeFf,
        }
    }
}

// === Closing-numbers ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CricketAction {
    /// One dart landed on `objective` (by name, e.g. `"20"`, `"B"`, `"T"`).
    Mark { participant: usize, objective: String },
    /// Manual value for a special target, while the keypad is open.
    SubmitScore { score: i64 },
    CancelKeypad,
    /// The controller ends the named participant's turn.
    EndTurn { participant_id: ParticipantId },
}

// === Countdown ===

/// Choice offered by the countdown action prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnChoice {
    /// Open the keypad to enter the turn total.
    ScoreCounts,
    /// Record a zero turn and move on.
    NoScore,
    /// Dismiss a bust and move on.
    BustAcknowledged,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CountdownAction {
    Turn { participant: Option<usize>, choice: TurnChoice },
    SubmitScore { participant: Option<usize>, score: i64 },
    CancelKeypad,
}

// === Progressive-target ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AtwAction {
    /// Open the hit selector.
    RequestSelector { participant: Option<usize> },
    /// Report a hit: 0 (miss), 1..=20, 25 (single bull) or 50 (double bull).
    ReportHit { participant: Option<usize>, value: i64 },
    CancelSelector,
}

// === Elimination-by-comparison ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BeersAction {
    RequestScoreEntry,
    SubmitScore { score: i64 },
    CancelScoreEntry,
    AcknowledgeLetter,
}

// === Stroke-count ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GolfAction {
    RequestScoreEntry,
    SubmitScore { score: i64 },
    CancelScoreEntry,
}

// === Per-round ===

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BaseballAction {
    RequestScoreEntry,
    SubmitScore { score: i64 },
    CancelScoreEntry,
}

// === Last-player-standing ===

/// Who is removing a life.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KillerActor {
    /// The shared controller device, acting on behalf of any killer.
    Controller,
    Participant(ParticipantId),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum KillerAction {
    ChooseNumber { player_id: ParticipantId, number: i64 },
    BecomeKiller { player_id: ParticipantId },
    RemoveLife { from: KillerActor, target_id: ParticipantId },
}

// === Objective-round ===

/// Result of a turn against the active objective.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveOutcome {
    Met,
    Missed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FlightsAction {
    Objective {
        participant: Option<usize>,
        outcome: ObjectiveOutcome,
    },
    SubmitScore { score: i64 },
    CancelKeypad,
}
