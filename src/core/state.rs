//! The active game: participants, turn position, outcome and mode payload.
//!
//! ## Game
//!
//! One `Game` is live per engine. It holds:
//! - the ordered participant list (persistent `im::Vector`, O(1) clone)
//! - the turn cursor (`current_participant_index`, `current_player_slot`)
//! - `game_over` / `winner`
//! - the mode payload ([`ModeState`]): objectives, holes, innings, prompts
//!
//! Cloning a `Game` is cheap, which is what makes per-action snapshots and
//! apply-on-a-copy affordable.
//!
//! ## Invariants
//!
//! - `game_over` implies `winner.is_some()`.
//! - Whenever a turn is expected, the cursor points at a non-eliminated
//!   participant that owns the player slot.

use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::participant::{Participant, ParticipantId};
use crate::games::around_the_world::AtwBoard;
use crate::games::baseball::BaseballBoard;
use crate::games::beers::BeersBoard;
use crate::games::cricket::CricketBoard;
use crate::games::five_zero_one::CountdownBoard;
use crate::games::golf::GolfBoard;
use crate::games::killer::KillerBoard;
use crate::games::three_ff::FlightsBoard;
use crate::rules::engine::WinnerRecord;
use crate::rules::turn::{self, TurnPolicy, TurnSearch};

/// Game mode identifier, as used on the wire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeId {
    Cricket,
    FiveZeroOne,
    AroundTheWorld,
    Beers,
    Golf,
    Baseball,
    Killer,
    ThreeFf,
}

impl ModeId {
    /// All modes, in menu order.
    pub const ALL: [ModeId; 8] = [
        ModeId::Cricket,
        ModeId::FiveZeroOne,
        ModeId::AroundTheWorld,
        ModeId::Beers,
        ModeId::Golf,
        ModeId::Baseball,
        ModeId::Killer,
        ModeId::ThreeFf,
    ];

    /// Wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ModeId::Cricket => "CRICKET",
            ModeId::FiveZeroOne => "FIVE_ZERO_ONE",
            ModeId::AroundTheWorld => "AROUND_THE_WORLD",
            ModeId::Beers => "BEERS",
            ModeId::Golf => "GOLF",
            ModeId::Baseball => "BASEBALL",
            ModeId::Killer => "KILLER",
            ModeId::ThreeFf => "THREE_FF",
        }
    }
}

impl fmt::Display for ModeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a mode name is not recognised.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown game mode: {0}")]
pub struct UnknownMode(pub String);

impl FromStr for ModeId {
    type Err = UnknownMode;

    /// Case-insensitive; `"cricket"` and `"CRICKET"` both parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        ModeId::ALL
            .into_iter()
            .find(|mode| mode.as_str() == upper)
            .ok_or_else(|| UnknownMode(s.to_string()))
    }
}

/// Position of the turn: which participant, and which of its player slots.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnCursor {
    pub participant: usize,
    pub slot: usize,
}

impl TurnCursor {
    #[must_use]
    pub fn new(participant: usize, slot: usize) -> Self {
        Self { participant, slot }
    }
}

/// Mode-specific game payload. The tag doubles as the game's mode field.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ModeState {
    Cricket(CricketBoard),
    FiveZeroOne(CountdownBoard),
    AroundTheWorld(AtwBoard),
    Beers(BeersBoard),
    Golf(GolfBoard),
    Baseball(BaseballBoard),
    Killer(KillerBoard),
    ThreeFf(FlightsBoard),
}

macro_rules! board_accessors {
    ($($variant:ident => $ty:ty, $get:ident, $get_mut:ident;)*) => {
        impl ModeState {
            /// Mode this payload belongs to.
            #[must_use]
            pub fn mode(&self) -> ModeId {
                match self {
                    $(Self::$variant(_) => ModeId::$variant,)*
                }
            }

            $(
                #[must_use]
                pub fn $get(&self) -> Option<&$ty> {
                    match self {
                        Self::$variant(board) => Some(board),
                        _ => None,
                    }
                }

                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        Self::$variant(board) => Some(board),
                        _ => None,
                    }
                }
            )*
        }
    };
}

board_accessors! {
    Cricket => CricketBoard, cricket, cricket_mut;
    FiveZeroOne => CountdownBoard, five_zero_one, five_zero_one_mut;
    AroundTheWorld => AtwBoard, around_the_world, around_the_world_mut;
    Beers => BeersBoard, beers, beers_mut;
    Golf => GolfBoard, golf, golf_mut;
    Baseball => BaseballBoard, baseball, baseball_mut;
    Killer => KillerBoard, killer, killer_mut;
    ThreeFf => FlightsBoard, three_ff, three_ff_mut;
}

/// The active game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,

    // === Mode ===
    #[serde(flatten)]
    pub board: ModeState,

    // === Participants ===
    pub participants: Vector<Participant>,

    // === Turn ===
    /// `None` before the first turn and in modes without turns.
    pub current_participant_index: Option<usize>,
    pub current_player_slot: usize,

    // === Outcome ===
    pub game_over: bool,
    pub winner: Option<WinnerRecord>,
}

impl Game {
    /// Create a game with no turn assigned yet.
    #[must_use]
    pub fn new(board: ModeState, participants: Vector<Participant>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            board,
            participants,
            current_participant_index: None,
            current_player_slot: 0,
            game_over: false,
            winner: None,
        }
    }

    #[must_use]
    pub fn mode(&self) -> ModeId {
        self.board.mode()
    }

    // === Turn Queries ===

    /// Current turn position, if a turn is assigned.
    #[must_use]
    pub fn cursor(&self) -> Option<TurnCursor> {
        self.current_participant_index
            .map(|participant| TurnCursor::new(participant, self.current_player_slot))
    }

    /// Move the cursor directly.
    pub fn set_cursor(&mut self, cursor: TurnCursor) {
        self.current_participant_index = Some(cursor.participant);
        self.current_player_slot = cursor.slot;
    }

    #[must_use]
    pub fn current_participant(&self) -> Option<&Participant> {
        self.current_participant_index
            .and_then(|index| self.participants.get(index))
    }

    pub fn current_participant_mut(&mut self) -> Option<&mut Participant> {
        let index = self.current_participant_index?;
        self.participants.get_mut(index)
    }

    pub fn participant_mut(&mut self, index: usize) -> Option<&mut Participant> {
        self.participants.get_mut(index)
    }

    /// Index of the participant with `id`.
    #[must_use]
    pub fn index_of(&self, id: &ParticipantId) -> Option<usize> {
        self.participants.iter().position(|p| &p.id == id)
    }

    /// Number of participants still in the game.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.participants.iter().filter(|p| !p.is_eliminated()).count()
    }

    // === Turn Advancement ===

    /// Move the cursor to the next eligible participant.
    ///
    /// Eliminated participants are always skipped; `skip` adds mode-specific
    /// exclusions. On exhaustion the cursor is left unchanged.
    pub fn advance_turn<F>(&mut self, policy: TurnPolicy, skip: F) -> TurnSearch
    where
        F: Fn(&Participant) -> bool,
    {
        let search = turn::next_turn(&self.participants, self.cursor(), policy, |p| {
            p.is_eliminated() || skip(p)
        });

        match search {
            TurnSearch::Found(cursor) => {
                self.set_cursor(cursor);
                tracing::debug!(
                    game = %self.id,
                    participant = cursor.participant,
                    slot = cursor.slot,
                    "turn advanced"
                );
            }
            TurnSearch::Exhausted { attempts } => {
                tracing::warn!(game = %self.id, mode = %self.mode(), attempts, "no eligible next turn");
            }
        }
        search
    }

    // === Outcome ===

    /// End the game with the given winner record.
    pub fn conclude(&mut self, winner: WinnerRecord) {
        tracing::info!(
            game = %self.id,
            mode = %self.mode(),
            winner = %winner.name,
            kind = ?winner.kind,
            "game over"
        );
        self.game_over = true;
        self.winner = Some(winner);
    }
}
