//! The engine: one active game, its undo history and the win counters.
//!
//! ## Action Flow
//!
//! 1. Clone the live game (O(1) thanks to persistent structures).
//! 2. Let the active mode's rules validate and apply the action to the clone.
//! 3. On `Err` the clone is dropped; nothing changes and nothing is recorded.
//! 4. On `Ok` the clone becomes the live game and is recorded in history.
//! 5. If the action concluded the game with a countable winner, the win
//!    counters are bumped and the notifier is told.
//!
//! Undo reverses step 4 and, when the discarded snapshot was the concluding
//! one, step 5.

use crate::core::action::Action;
use crate::core::config::{EngineConfig, GameOptions};
use crate::core::participant::{Participant, Roster, TeamSetup};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId};
use crate::history::{History, Undone};
use crate::rules::engine::{rules_for, ActionError, StartError};
use crate::stats::{NoopNotifier, StatNotifier, WinStats};

/// Owner of the active game.
pub struct Engine {
    config: EngineConfig,
    game: Option<Game>,
    history: History,
    stats: WinStats,
    notifier: Box<dyn StatNotifier>,
    rng: GameRng,
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("game", &self.game.as_ref().map(|g| &g.id))
            .field("history", &self.history.len())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

/// Winning participant of a concluded game, if the win counts.
fn countable_winner(game: &Game) -> Option<&Participant> {
    let winner = game.winner.as_ref().filter(|w| w.is_countable())?;
    let id = winner.id.as_ref()?;
    game.participants.iter().find(|p| &p.id == id)
}

impl Engine {
    /// Create an engine with no active game.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        };
        Self {
            history: History::new(config.history_limit),
            config,
            game: None,
            stats: WinStats::new(),
            notifier: Box::new(NoopNotifier),
            rng,
        }
    }

    /// Install the callback told about every win-counter change.
    #[must_use]
    pub fn with_notifier(mut self, notifier: impl StatNotifier + 'static) -> Self {
        self.notifier = Box::new(notifier);
        self
    }

    // === Queries ===

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The live game, if any.
    #[must_use]
    pub fn game(&self) -> Option<&Game> {
        self.game.as_ref()
    }

    #[must_use]
    pub fn stats(&self) -> &WinStats {
        &self.stats
    }

    #[must_use]
    pub fn history(&self) -> &History {
        &self.history
    }

    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.game.is_some() && self.history.can_undo()
    }

    // === Game Lifecycle ===

    /// Start a game of `mode`, replacing any active game.
    ///
    /// Killer has its own entry point ([`start_killer_game`](Self::start_killer_game)).
    /// With no teams in `options` a single default team is created.
    pub fn start_game(&mut self, mode: ModeId, options: &GameOptions) -> Result<&Game, StartError> {
        if mode == ModeId::Killer {
            tracing::warn!("killer requested through the generic start");
            return Err(StartError::UseKillerStart);
        }
        let roster = Roster::from_setups(&options.names);
        Ok(self.install(mode, roster, options))
    }

    /// Start a game from a wire mode name (case-insensitive).
    pub fn start_game_named(&mut self, mode: &str, options: &GameOptions) -> Result<&Game, StartError> {
        let mode: ModeId = mode
            .parse()
            .map_err(|_| StartError::UnknownMode(mode.trim().to_ascii_uppercase()))?;
        self.start_game(mode, options)
    }

    /// Start a Killer game. Unlike other modes an empty team list is an error.
    pub fn start_killer_game(&mut self, players: &[TeamSetup]) -> Result<&Game, StartError> {
        if players.is_empty() {
            return Err(StartError::NoParticipants);
        }
        let roster = Roster::from_setups(players);
        Ok(self.install(ModeId::Killer, roster, &GameOptions::default()))
    }

    fn install(&mut self, mode: ModeId, roster: Vec<Roster>, options: &GameOptions) -> &Game {
        let game = rules_for(mode).initialize(roster, options, &mut self.rng);
        tracing::info!(
            game = %game.id,
            %mode,
            participants = game.participants.len(),
            "game started"
        );

        self.history.clear();
        self.history.record(&game);
        let concluded = game.game_over;
        let game = self.game.insert(game);
        if concluded {
            if let Some(team) = countable_winner(game) {
                self.stats.record_win(team);
                self.notifier.stats_changed(&self.stats);
            }
        }
        game
    }

    /// Discard the active game. Returns it, if there was one.
    pub fn end_game(&mut self) -> Option<Game> {
        let game = self.game.take()?;
        self.history.clear();
        tracing::info!(game = %game.id, mode = %game.mode(), "game ended");
        Some(game)
    }

    // === Actions ===

    /// Apply one action to the live game.
    ///
    /// On error the live game, history and statistics are untouched. An
    /// action that changes nothing is accepted without recording a snapshot.
    pub fn apply(&mut self, action: &Action) -> Result<&Game, ActionError> {
        let current = self.game.as_ref().ok_or(ActionError::NoActiveGame)?;
        let rules = rules_for(current.mode());

        let mut next = current.clone();
        if let Err(error) = rules.apply(&mut next, action) {
            tracing::warn!(game = %current.id, mode = %current.mode(), %error, "action rejected");
            return Err(error);
        }

        let unchanged = next == *current;
        let concluded = !current.game_over && next.game_over;
        if unchanged {
            tracing::debug!(game = %next.id, "action changed nothing");
            return self.game.as_ref().ok_or(ActionError::NoActiveGame);
        }
        tracing::debug!(game = %next.id, mode = %next.mode(), ?action, "action applied");

        self.history.record(&next);
        let game = self.game.insert(next);
        if concluded {
            if let Some(team) = countable_winner(game) {
                self.stats.record_win(team);
                tracing::info!(team = %team.name, "win recorded");
                self.notifier.stats_changed(&self.stats);
            }
        }
        Ok(game)
    }

    /// Undo the last applied action.
    ///
    /// Returns the restored game, or `None` (a no-op) when there is no game or
    /// nothing to undo. Undoing the concluding action also reverses its win.
    pub fn undo(&mut self) -> Option<&Game> {
        self.game.as_ref()?;
        let Undone { reverted, restored } = self.history.undo()?;

        if reverted.game_over && !restored.game_over {
            if let Some(team) = countable_winner(&reverted) {
                self.stats.revert_win(team);
                tracing::info!(team = %team.name, "win reverted");
                self.notifier.stats_changed(&self.stats);
            }
        }

        tracing::info!(game = %restored.id, remaining = self.history.len(), "undo");
        Some(self.game.insert(restored))
    }

    // === Statistics ===

    /// Clear the session win counters.
    pub fn reset_session_stats(&mut self) {
        self.stats.clear();
        tracing::info!("session stats reset");
        self.notifier.stats_changed(&self.stats);
    }
}
