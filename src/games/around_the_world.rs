//! Progressive-target game (Around the World).
//!
//! ## Rules
//!
//! - Each participant works through 1..=20 in order. A reported number equal
//!   to or above the current target advances the target by one; anything
//!   lower leaves it where it is.
//! - After 20 the target is the single bull, or the double bull if a bull
//!   has already been hit this game.
//! - A bull (25 or 50) hit while still on a number jumps straight to the
//!   double bull. A bull hit that does not win keeps the same participant
//!   throwing.
//! - Winning: five bull hits in total, or a double bull while already on a
//!   bull target.
//!
//! Turns are slot-major; participants who have won are skipped.

use im::Vector;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::action::{Action, AtwAction};
use crate::core::config::GameOptions;
use crate::core::participant::{Participant, ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState, TurnCursor};
use crate::rules::engine::{
    ensure_running, ensure_turn, ActionError, DisplayScore, ModeRules, WinnerRecord,
};
use crate::rules::turn::{TurnPolicy, TurnSearch};

/// Highest numbered target.
pub const LAST_NUMBER: u8 = 20;

/// Bull hits that win outright.
pub const BULL_HITS_TO_WIN: u32 = 5;

/// Reported values for a miss and the two bulls.
pub const MISS: i64 = 0;
pub const SINGLE_BULL: i64 = 25;
pub const DOUBLE_BULL: i64 = 50;

/// Where a participant is on the board.
///
/// Serialized as its numeric code: 1..=20, 21 (single bull), 22 (double
/// bull), 23/24 (won via single/double bull).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum AtwTarget {
    Number(u8),
    SingleBull,
    DoubleBull,
    WonViaSingleBull,
    WonViaDoubleBull,
}

impl AtwTarget {
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            AtwTarget::Number(n) => n,
            AtwTarget::SingleBull => 21,
            AtwTarget::DoubleBull => 22,
            AtwTarget::WonViaSingleBull => 23,
            AtwTarget::WonViaDoubleBull => 24,
        }
    }

    #[must_use]
    pub fn is_number(self) -> bool {
        matches!(self, AtwTarget::Number(_))
    }

    /// On the single or double bull target.
    #[must_use]
    pub fn is_bull(self) -> bool {
        matches!(self, AtwTarget::SingleBull | AtwTarget::DoubleBull)
    }

    /// Display label: the number, `SB`, `DB` or `WIN!`.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            AtwTarget::Number(n) => n.to_string(),
            AtwTarget::SingleBull => "SB".to_string(),
            AtwTarget::DoubleBull => "DB".to_string(),
            AtwTarget::WonViaSingleBull | AtwTarget::WonViaDoubleBull => "WIN!".to_string(),
        }
    }
}

impl fmt::Display for AtwTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl From<AtwTarget> for u8 {
    fn from(target: AtwTarget) -> Self {
        target.code()
    }
}

impl TryFrom<u8> for AtwTarget {
    type Error = String;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1..=LAST_NUMBER => Ok(AtwTarget::Number(code)),
            21 => Ok(AtwTarget::SingleBull),
            22 => Ok(AtwTarget::DoubleBull),
            23 => Ok(AtwTarget::WonViaSingleBull),
            24 => Ok(AtwTarget::WonViaDoubleBull),
            other => Err(format!("invalid target code {other}")),
        }
    }
}

fn hit_label(value: i64) -> String {
    match value {
        MISS => "Miss".to_string(),
        SINGLE_BULL => "SB".to_string(),
        DOUBLE_BULL => "DB".to_string(),
        n => n.to_string(),
    }
}

/// Per-participant progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtwProgress {
    pub current_target: AtwTarget,
    pub sb_hit_count: u32,
    pub has_hit_sb_this_game: bool,
    pub hits_log: Vector<String>,
    pub is_winner: bool,
}

impl Default for AtwProgress {
    fn default() -> Self {
        Self {
            current_target: AtwTarget::Number(1),
            sb_hit_count: 0,
            has_hit_sb_this_game: false,
            hits_log: Vector::new(),
            is_winner: false,
        }
    }
}

impl AtwProgress {
    /// Apply one reported value. Returns whether it was a bull hit.
    fn record(&mut self, value: i64) -> bool {
        let old = self.current_target;
        let bull = value == SINGLE_BULL || value == DOUBLE_BULL;

        let entry = if bull {
            self.has_hit_sb_this_game = true;
            self.sb_hit_count += 1;
            if old.is_number() {
                self.current_target = AtwTarget::DoubleBull;
            }

            if self.sb_hit_count >= BULL_HITS_TO_WIN {
                self.is_winner = true;
                self.current_target = AtwTarget::WonViaSingleBull;
                format!("Hit Bull, reaching {} SBs - Player Wins!", self.sb_hit_count)
            } else if value == DOUBLE_BULL && old.is_bull() {
                self.is_winner = true;
                self.current_target = AtwTarget::WonViaDoubleBull;
                "Hit DB while qualified - Player Wins!".to_string()
            } else {
                format!(
                    "Hit {}. Next: {}. (SBs: {})",
                    hit_label(value),
                    self.current_target,
                    self.sb_hit_count
                )
            }
        } else if value == MISS {
            format!("Missed (Target: {old}).")
        } else {
            match old {
                AtwTarget::Number(n) if value >= i64::from(n) => {
                    self.current_target = if n >= LAST_NUMBER {
                        if self.has_hit_sb_this_game {
                            AtwTarget::DoubleBull
                        } else {
                            AtwTarget::SingleBull
                        }
                    } else {
                        AtwTarget::Number(n + 1)
                    };
                    format!("Hit {value}. Next: {}.", self.current_target)
                }
                _ => format!("Hit {value} (Target: {old}). No advance."),
            }
        };

        self.hits_log.push_back(entry);
        bull
    }
}

/// What the controller is being asked for.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AtwPrompt {
    /// Report a miss or open the hit selector.
    Action { cursor: TurnCursor, current_target: AtwTarget },
    /// Pick the value that was hit.
    Selector { cursor: TurnCursor, current_target: AtwTarget },
    #[default]
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AtwBoard {
    pub prompt: AtwPrompt,
}

/// Progressive-target rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct AroundTheWorld;

fn board_mut(game: &mut Game) -> Result<&mut AtwBoard, ActionError> {
    let active = game.mode();
    game.board.around_the_world_mut().ok_or(ActionError::ModeMismatch {
        active,
        action: ModeId::AroundTheWorld,
    })
}

fn is_winner(participant: &Participant) -> bool {
    participant.state.around_the_world().is_some_and(|s| s.is_winner)
}

fn target_of(participant: &Participant) -> AtwTarget {
    participant
        .state
        .around_the_world()
        .map_or(AtwTarget::Number(1), |s| s.current_target)
}

impl AroundTheWorld {
    fn set_prompt(game: &mut Game, prompt: AtwPrompt) {
        if let Some(board) = game.board.around_the_world_mut() {
            board.prompt = prompt;
        }
    }

    /// Action prompt for whoever is up.
    fn action_prompt(game: &Game) -> AtwPrompt {
        match (game.cursor(), game.current_participant()) {
            (Some(cursor), Some(p)) => AtwPrompt::Action {
                cursor,
                current_target: target_of(p),
            },
            _ => AtwPrompt::None,
        }
    }

    fn advance(game: &mut Game) {
        match game.advance_turn(TurnPolicy::SlotMajor, is_winner) {
            TurnSearch::Found(_) => {
                let prompt = Self::action_prompt(game);
                Self::set_prompt(game, prompt);
            }
            TurnSearch::Exhausted { .. } => {
                Self::set_prompt(game, AtwPrompt::None);
                let everyone_won =
                    !game.participants.is_empty() && game.participants.iter().all(is_winner);
                if everyone_won {
                    game.conclude(WinnerRecord::tie_named(
                        "All Players Won",
                        DisplayScore::Label("WIN!".to_string()),
                    ));
                } else {
                    game.conclude(WinnerRecord::error("Error - No Next Turn"));
                }
            }
        }
    }

    fn request_selector(game: &mut Game, participant: Option<usize>) -> Result<(), ActionError> {
        let AtwPrompt::Action { cursor, current_target } = board_mut(game)?.prompt else {
            return Err(ActionError::NoPrompt);
        };
        ensure_turn(game, participant)?;
        if game.current_participant().map_or(true, is_winner) {
            return Err(ActionError::StaleTurn);
        }
        board_mut(game)?.prompt = AtwPrompt::Selector { cursor, current_target };
        Ok(())
    }

    fn report_hit(
        &self,
        game: &mut Game,
        participant: Option<usize>,
        value: i64,
    ) -> Result<(), ActionError> {
        match board_mut(game)?.prompt {
            AtwPrompt::Selector { .. } => {}
            AtwPrompt::Action { .. } if value == MISS => {}
            _ => return Err(ActionError::NoPrompt),
        }
        ensure_turn(game, participant)?;
        if !matches!(value, MISS | 1..=20 | SINGLE_BULL | DOUBLE_BULL) {
            return Err(ActionError::InvalidInput(format!("unknown hit value {value}")));
        }

        let progress = game
            .current_participant_mut()
            .and_then(|p| p.state.around_the_world_mut())
            .ok_or(ActionError::StaleTurn)?;
        if progress.is_winner {
            return Err(ActionError::StaleTurn);
        }
        let bull = progress.record(value);
        let won = progress.is_winner;
        let target = progress.current_target;
        tracing::debug!(game = %game.id, value, next = %target, won, "atw hit");

        if won {
            Self::set_prompt(game, AtwPrompt::None);
            if let Some(winner) = self.evaluate(game) {
                game.conclude(winner);
            }
        } else if bull {
            let prompt = Self::action_prompt(game);
            Self::set_prompt(game, prompt);
        } else {
            Self::advance(game);
        }
        Ok(())
    }

    fn cancel_selector(game: &mut Game) -> Result<(), ActionError> {
        let AtwPrompt::Selector { .. } = board_mut(game)?.prompt else {
            return Err(ActionError::NoPrompt);
        };
        if game.current_participant().is_some_and(|p| !is_winner(p)) {
            let prompt = Self::action_prompt(game);
            Self::set_prompt(game, prompt);
        } else {
            Self::advance(game);
        }
        Ok(())
    }
}

impl ModeRules for AroundTheWorld {
    fn mode(&self) -> ModeId {
        ModeId::AroundTheWorld
    }

    fn initialize(&self, roster: Vec<Roster>, _options: &GameOptions, _rng: &mut GameRng) -> Game {
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::AroundTheWorld(AtwProgress::default())))
            .collect();
        let mut game = Game::new(ModeState::AroundTheWorld(AtwBoard::default()), participants);
        Self::advance(&mut game);
        game
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::AroundTheWorld(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::AroundTheWorld,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            AtwAction::RequestSelector { participant } => Self::request_selector(game, *participant),
            AtwAction::ReportHit { participant, value } => {
                self.report_hit(game, *participant, *value)
            }
            AtwAction::CancelSelector => Self::cancel_selector(game),
        }
    }

    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        game.participants
            .iter()
            .find(|p| is_winner(p))
            .map(|p| WinnerRecord::team(p, DisplayScore::Label(target_of(p).label())))
    }
}
