//! Mode rules and turn sequencing.
//!
//! Games implement [`ModeRules`] to define initialization, action handling
//! and win evaluation. [`turn`] holds the shared turn sequencer.

pub mod engine;
pub mod turn;

pub use engine::{
    ensure_running, ensure_turn, rules_for, validate_score, ActionError, DisplayScore,
    ModeRules, StartError, WinnerKind, WinnerRecord,
};
pub use turn::{next_turn, TurnPolicy, TurnSearch};
