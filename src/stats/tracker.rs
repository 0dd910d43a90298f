//! Two-category win counters and the change callback.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::participant::Participant;

/// Win counts keyed by name.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WinStats {
    pub teams: FxHashMap<String, u32>,
    pub players: FxHashMap<String, u32>,
}

fn increment(map: &mut FxHashMap<String, u32>, name: &str) {
    *map.entry(name.to_string()).or_insert(0) += 1;
}

fn decrement(map: &mut FxHashMap<String, u32>, name: &str) {
    if let Some(count) = map.get_mut(name) {
        *count = count.saturating_sub(1);
        if *count == 0 {
            map.remove(name);
        }
    }
}

impl WinStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a win for `team` and each of its players.
    pub fn record_win(&mut self, team: &Participant) {
        increment(&mut self.teams, &team.name);
        for player in team.players.iter().filter(|p| !p.is_empty()) {
            increment(&mut self.players, player);
        }
    }

    /// Reverse [`record_win`](Self::record_win). Entries that reach zero are
    /// removed.
    pub fn revert_win(&mut self, team: &Participant) {
        decrement(&mut self.teams, &team.name);
        for player in team.players.iter().filter(|p| !p.is_empty()) {
            decrement(&mut self.players, player);
        }
    }

    #[must_use]
    pub fn team_wins(&self, name: &str) -> u32 {
        self.teams.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn player_wins(&self, name: &str) -> u32 {
        self.players.get(name).copied().unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty() && self.players.is_empty()
    }

    pub fn clear(&mut self) {
        self.teams.clear();
        self.players.clear();
    }
}

/// Told whenever the win counters change.
pub trait StatNotifier: Send {
    fn stats_changed(&mut self, stats: &WinStats);
}

/// Notifier that ignores every change.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopNotifier;

impl StatNotifier for NoopNotifier {
    fn stats_changed(&mut self, _stats: &WinStats) {}
}

impl<F> StatNotifier for F
where
    F: FnMut(&WinStats) + Send,
{
    fn stats_changed(&mut self, stats: &WinStats) {
        self(stats);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::{ParticipantState, Roster, TeamSetup};
    use crate::games::golf::GolfCard;

    fn team(name: &str, players: &[&str]) -> Participant {
        Roster::from_setups(&[TeamSetup::new(name, players)])
            .remove(0)
            .into_participant(ParticipantState::Golf(GolfCard::new(1)))
    }

    #[test]
    fn test_record_and_revert() {
        let mut stats = WinStats::new();
        let pair = team("Pair", &["Ann", "Bob"]);

        stats.record_win(&pair);
        stats.record_win(&pair);
        assert_eq!(stats.team_wins("Pair"), 2);
        assert_eq!(stats.player_wins("Ann"), 2);

        stats.revert_win(&pair);
        assert_eq!(stats.team_wins("Pair"), 1);
        stats.revert_win(&pair);
        assert!(stats.is_empty());
        assert!(!stats.teams.contains_key("Pair"));
    }

    #[test]
    fn test_revert_unknown_is_noop() {
        let mut stats = WinStats::new();
        stats.record_win(&team("A", &["Ann"]));
        stats.revert_win(&team("B", &["Bob"]));
        assert_eq!(stats.team_wins("A"), 1);
        assert_eq!(stats.player_wins("Ann"), 1);
    }

    #[test]
    fn test_closure_notifier() {
        let mut seen = Vec::new();
        {
            let mut notifier = |stats: &WinStats| seen.push(stats.team_wins("A"));
            let mut stats = WinStats::new();
            stats.record_win(&team("A", &["Ann"]));
            notifier.stats_changed(&stats);
        }
        assert_eq!(seen, vec![1]);
    }
}
