//! Engine and per-game configuration.
//!
//! - `EngineConfig`: fixed for the lifetime of an [`Engine`](crate::session::Engine)
//!   (history depth, RNG seed).
//! - `GameOptions`: supplied by the controller with every `startGame`
//!   request. Every field has a default so partial option objects work.

use serde::{Deserialize, Serialize};

use super::participant::TeamSetup;
use crate::games::beers::ComparisonRule;

/// Default number of snapshots kept for undo.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Engine-wide settings.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Maximum snapshots kept; the oldest is evicted first.
    pub history_limit: usize,

    /// Seed for objective selection. `None` draws one from the OS.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            history_limit: DEFAULT_HISTORY_LIMIT,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Set the snapshot cap (at least 2, so one action can always be undone).
    #[must_use]
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit.max(2);
        self
    }

    /// Fix the RNG seed for reproducible objective lists.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

/// Options for a single game, as sent alongside `startGame`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GameOptions {
    /// Teams taking part.
    pub names: Vec<TeamSetup>,

    /// Countdown: a turn only counts once a double has been hit.
    /// Unset means on.
    pub double_in: Option<bool>,

    /// Countdown: finishing requires a double.
    pub double_out: bool,

    /// Countdown starting score.
    pub start_score: i64,

    /// Elimination-by-comparison: whether each score must beat or undercut
    /// the previous one.
    pub beers_rule: ComparisonRule,

    /// Stroke-count game length, 1..=36 holes; anything else plays 18.
    pub golf_num_holes: usize,

    /// Per-round game length, 1..=20 innings; anything else plays 9.
    pub baseball_num_innings: usize,

    /// Objective-round: number of random challenges drawn into the list.
    pub num_random_challenges: usize,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            names: Vec::new(),
            double_in: None,
            double_out: false,
            start_score: crate::games::five_zero_one::START_SCORE,
            beers_rule: ComparisonRule::Higher,
            golf_num_holes: crate::games::golf::DEFAULT_HOLES,
            baseball_num_innings: crate::games::baseball::DEFAULT_INNINGS,
            num_random_challenges: crate::games::three_ff::DEFAULT_RANDOM_CHALLENGES,
        }
    }
}

impl GameOptions {
    /// Options for the given teams with every other field defaulted.
    pub fn with_teams(names: Vec<TeamSetup>) -> Self {
        Self {
            names,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn double_in(mut self, enabled: bool) -> Self {
        self.double_in = Some(enabled);
        self
    }

    #[must_use]
    pub fn double_out(mut self, enabled: bool) -> Self {
        self.double_out = enabled;
        self
    }

    #[must_use]
    pub fn beers_rule(mut self, rule: ComparisonRule) -> Self {
        self.beers_rule = rule;
        self
    }

    #[must_use]
    pub fn golf_holes(mut self, holes: usize) -> Self {
        self.golf_num_holes = holes;
        self
    }

    #[must_use]
    pub fn baseball_innings(mut self, innings: usize) -> Self {
        self.baseball_num_innings = innings;
        self
    }

    #[must_use]
    pub fn random_challenges(mut self, count: usize) -> Self {
        self.num_random_challenges = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.history_limit, 20);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_builder_pattern() {
        let config = EngineConfig::default().with_history_limit(1).with_seed(7);
        assert_eq!(config.history_limit, 2);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn test_partial_options_deserialize() {
        let options: GameOptions = serde_json::from_str(
            r#"{"names": [{"name": "A"}], "doubleOut": true, "beersRule": "LOWER"}"#,
        )
        .unwrap();

        assert_eq!(options.names.len(), 1);
        assert!(options.double_out);
        assert_eq!(options.double_in, None);
        assert_eq!(options.beers_rule, ComparisonRule::Lower);
        assert_eq!(options.start_score, 501);
        assert_eq!(options.golf_num_holes, 18);
        assert_eq!(options.baseball_num_innings, 9);
        assert_eq!(options.num_random_challenges, 4);
    }
}
