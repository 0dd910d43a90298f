//! Core engine types: participants, objectives, game state, actions, RNG,
//! configuration.
//!
//! These are shared by every mode. Modes plug their payloads into
//! [`ParticipantState`] and [`ModeState`] rather than extending `Game`.

pub mod action;
pub mod config;
pub mod objective;
pub mod participant;
pub mod rng;
pub mod state;

pub use action::Action;
pub use config::{EngineConfig, GameOptions, DEFAULT_HISTORY_LIMIT};
pub use objective::{Objective, ObjectiveKind, ObjectiveStatus};
pub use participant::{Participant, ParticipantId, ParticipantState, Roster, TeamSetup};
pub use rng::GameRng;
pub use state::{Game, ModeId, ModeState, TurnCursor, UnknownMode};
