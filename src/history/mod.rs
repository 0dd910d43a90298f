//! Undo history.
//!
//! Every successful action records a full snapshot of the resulting game.
//! The newest snapshot always equals the live game, so undo discards it and
//! restores the one before. Snapshots are cheap because `Game` is built on
//! persistent `im` structures that share unchanged data.

mod snapshot;

pub use snapshot::{History, Undone};
