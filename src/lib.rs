//! # darts-engine
//!
//! Authoritative game-state engine for a shared multiplayer darts scoreboard.
//!
//! One game is active at a time. Controllers send actions, the engine
//! validates and applies them, and every observer receives the full updated
//! game.
//!
//! ## Design Principles
//!
//! 1. **One Turn Model**: Every mode shares the same participant list and
//!    `(participant, player slot)` turn cursor. Modes differ only in their
//!    payloads and in how they advance the cursor.
//!
//! 2. **Apply on a Copy**: Actions mutate a clone of the live game. A
//!    rejected action drops the clone, so observers never see partial state.
//!
//! 3. **Undo by Snapshot**: Every applied action records the resulting game.
//!    Undo restores the previous snapshot and reverses any win it counted.
//!
//! ## Architecture
//!
//! - **Persistent Data Structures**: O(1) cloning via `im-rs` keeps
//!   per-action snapshots cheap.
//!
//! - **Stateless Rules**: Each mode is a unit struct implementing
//!   [`ModeRules`]; all state lives in [`Game`].
//!
//! ## Modules
//!
//! - `core`: Participants, objectives, game state, actions, RNG, configuration
//! - `rules`: `ModeRules` trait, winner records, errors, turn sequencer
//! - `games`: The eight game modes
//! - `history`: Bounded snapshot history for undo
//! - `stats`: Win counters and change notification
//! - `session`: The engine and its wire protocol

pub mod core;
pub mod rules;
pub mod games;
pub mod history;
pub mod stats;
pub mod session;

// Re-export commonly used types
pub use crate::core::{
    Action, EngineConfig, Game, GameOptions, GameRng, ModeId, ModeState,
    Objective, ObjectiveKind, ObjectiveStatus, Participant, ParticipantId, ParticipantState,
    TeamSetup, TurnCursor,
};

pub use crate::rules::{
    ActionError, DisplayScore, ModeRules, StartError, TurnPolicy, TurnSearch, WinnerKind,
    WinnerRecord,
};

pub use crate::history::History;

pub use crate::stats::{NoopNotifier, StatNotifier, WinStats};

pub use crate::session::{Audience, ClientMessage, Engine, Outbound, ServerMessage};
