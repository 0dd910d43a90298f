//! Win statistics.
//!
//! [`WinStats`] counts wins per team name and per player name. The engine
//! updates it when a game concludes with a countable winner and reverses the
//! update when that conclusion is undone; after every change the configured
//! [`StatNotifier`] is told.

mod tracker;

pub use tracker::{NoopNotifier, StatNotifier, WinStats};
