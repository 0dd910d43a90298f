//! Bounded snapshot ring.

use std::collections::VecDeque;

use crate::core::config::DEFAULT_HISTORY_LIMIT;
use crate::core::state::Game;

/// Result of a successful undo.
#[derive(Clone, Debug)]
pub struct Undone {
    /// Snapshot that was discarded (the state before undo).
    pub reverted: Game,
    /// Snapshot that is live again.
    pub restored: Game,
}

/// Bounded snapshot history (oldest first).
#[derive(Clone, Debug)]
pub struct History {
    snapshots: VecDeque<Game>,
    limit: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}

impl History {
    /// Create an empty history keeping at most `limit` snapshots (min 2).
    #[must_use]
    pub fn new(limit: usize) -> Self {
        let limit = limit.max(2);
        Self {
            snapshots: VecDeque::with_capacity(limit),
            limit,
        }
    }

    /// Record the state produced by an action, evicting the oldest snapshot
    /// when full.
    pub fn record(&mut self, game: &Game) {
        self.snapshots.push_back(game.clone());
        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
        }
    }

    /// Whether there is a state to go back to.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.snapshots.len() >= 2
    }

    /// Drop the newest snapshot and return it along with the one now on top.
    ///
    /// Returns `None` (and changes nothing) with fewer than two snapshots.
    pub fn undo(&mut self) -> Option<Undone> {
        if !self.can_undo() {
            return None;
        }
        let reverted = self.snapshots.pop_back()?;
        let restored = self.snapshots.back()?.clone();
        Some(Undone { reverted, restored })
    }

    /// Newest snapshot.
    #[must_use]
    pub fn latest(&self) -> Option<&Game> {
        self.snapshots.back()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::{ParticipantState, Roster, TeamSetup};
    use crate::core::state::ModeState;
    use crate::games::killer::{KillerBoard, KillerStatus};

    fn game_with_lives(lives: i64) -> Game {
        let participants = Roster::from_setups(&[TeamSetup::new("A", &["A"])])
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Killer(KillerStatus::new(lives))))
            .collect();
        Game::new(ModeState::Killer(KillerBoard::default()), participants)
    }

    #[test]
    fn test_undo_needs_two_snapshots() {
        let mut history = History::new(20);
        assert!(history.undo().is_none());

        history.record(&game_with_lives(3));
        assert!(!history.can_undo());
        assert!(history.undo().is_none());
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_undo_restores_previous() {
        let mut history = History::new(20);
        let first = game_with_lives(3);
        let second = game_with_lives(2);
        history.record(&first);
        history.record(&second);

        let undone = history.undo().unwrap();
        assert_eq!(undone.reverted, second);
        assert_eq!(undone.restored, first);
        assert_eq!(history.latest(), Some(&first));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_oldest_evicted() {
        let mut history = History::new(3);
        for lives in 0..5 {
            history.record(&game_with_lives(lives));
        }
        assert_eq!(history.len(), 3);

        let mut restored = Vec::new();
        while let Some(undone) = history.undo() {
            restored.push(undone.restored.participants[0].state.killer().unwrap().lives);
        }
        assert_eq!(restored, vec![3, 2]);
    }

    #[test]
    fn test_limit_floor() {
        assert_eq!(History::new(0).limit(), 2);
        assert_eq!(History::default().limit(), DEFAULT_HISTORY_LIMIT);
    }
}
