//! Wire contract between controllers/displays and the engine.
//!
//! Messages are JSON objects of the form `{"event": <name>, "data": {...}}`.
//! [`Engine::handle_message`] turns one inbound [`ClientMessage`] into the
//! outbound messages it causes, each addressed either to the sender or to
//! every connected observer. Transport is the caller's business.
//!
//! ## Outcomes
//!
//! - Successful mutation: broadcast `gameStateUpdate` with the full game.
//! - Rejected Killer action: `killerError` with the message, to the sender.
//! - Any other rejected action: `actionRejected` plus a `gameStateUpdate`
//!   re-sync, both to the sender.
//! - Win counters changed: broadcast `statsUpdate`.

use serde::{Deserialize, Serialize};

use crate::core::action::{
    Action, AtwAction, BaseballAction, BeersAction, CountdownAction, CricketAction,
    FlightsAction, GolfAction, KillerAction, KillerActor, ObjectiveOutcome, TurnChoice,
};
use crate::core::config::GameOptions;
use crate::core::participant::{ParticipantId, TeamSetup};
use crate::core::state::{Game, ModeId};
use crate::rules::engine::ActionError;
use crate::stats::WinStats;

use super::engine::Engine;

/// Actor id a shared controller uses when it removes a life on a killer's
/// behalf.
pub const CONTROLLER_DEVICE_ACTION_ID: &str = "CONTROLLER_DEVICE_ACTION";

/// Inbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientMessage {
    // === Lifecycle ===
    StartGame {
        mode_id: String,
        #[serde(default)]
        options: GameOptions,
    },
    StartKillerGame {
        #[serde(default)]
        players: Vec<TeamSetup>,
    },
    UndoLastAction,
    RequestGameState,
    EndGame,
    RequestMainMenu,
    RequestStats,
    ResetSessionStats,

    // === Closing-numbers ===
    CricketMark {
        participant_index: usize,
        objective_name: String,
    },
    SubmitCricketScore {
        score: i64,
    },
    CancelCricketKeypad,
    CricketControllerEndTurn {
        participant_id: ParticipantId,
    },

    // === Objective-round ===
    #[serde(rename = "threeFFObjectiveAction")]
    ThreeFfObjectiveAction {
        action: ObjectiveOutcome,
        #[serde(default)]
        participant_index: Option<usize>,
    },
    #[serde(rename = "submitThreeFFScore")]
    SubmitThreeFfScore {
        score: i64,
    },
    #[serde(rename = "cancelThreeFFKeypad")]
    CancelThreeFfKeypad,

    // === Countdown ===
    FiveZeroOneTurnAction {
        action: TurnChoice,
        #[serde(default)]
        participant_index: Option<usize>,
    },
    SubmitFiveZeroOneScore {
        score: i64,
        #[serde(default)]
        participant_index: Option<usize>,
    },
    CancelFiveZeroOneKeypad,

    // === Progressive-target ===
    AroundTheWorldClientRequestsObjectiveModal,
    AroundTheWorldTurnResult {
        reported_value: i64,
        #[serde(default)]
        participant_index: Option<usize>,
    },
    AroundTheWorldCancelObjectiveEntry,

    // === Elimination-by-comparison ===
    BeersRequestScoreEntry,
    BeersSubmitScore {
        score: i64,
    },
    BeersCancelScoreEntry,
    BeersAcknowledgeLetter,

    // === Stroke-count ===
    GolfRequestScoreEntry,
    GolfSubmitScore {
        score: i64,
    },
    GolfCancelScoreEntry,

    // === Per-round ===
    BaseballRequestScoreEntry,
    BaseballSubmitInningScore {
        score: i64,
    },
    BaseballCancelKeypad,

    // === Last-player-standing ===
    KillerChooseNumber {
        player_id: ParticipantId,
        chosen_number: i64,
    },
    KillerBecomeKiller {
        player_id: ParticipantId,
    },
    KillerRemoveLife {
        from_player_id: String,
        target_player_id: ParticipantId,
    },
}

impl ClientMessage {
    /// The game action this message carries, if it is one.
    #[must_use]
    pub fn to_action(&self) -> Option<Action> {
        let action = match self {
            ClientMessage::CricketMark {
                participant_index,
                objective_name,
            } => Action::Cricket(CricketAction::Mark {
                participant: *participant_index,
                objective: objective_name.clone(),
            }),
            ClientMessage::SubmitCricketScore { score } => {
                Action::Cricket(CricketAction::SubmitScore { score: *score })
            }
            ClientMessage::CancelCricketKeypad => Action::Cricket(CricketAction::CancelKeypad),
            ClientMessage::CricketControllerEndTurn { participant_id } => {
                Action::Cricket(CricketAction::EndTurn {
                    participant_id: participant_id.clone(),
                })
            }

            ClientMessage::ThreeFfObjectiveAction {
                action,
                participant_index,
            } => Action::ThreeFf(FlightsAction::Objective {
                participant: *participant_index,
                outcome: *action,
            }),
            ClientMessage::SubmitThreeFfScore { score } => {
                Action::ThreeFf(FlightsAction::SubmitScore { score: *score })
            }
            ClientMessage::CancelThreeFfKeypad => Action::ThreeFf(FlightsAction::CancelKeypad),

            ClientMessage::FiveZeroOneTurnAction {
                action,
                participant_index,
            } => Action::FiveZeroOne(CountdownAction::Turn {
                participant: *participant_index,
                choice: *action,
            }),
            ClientMessage::SubmitFiveZeroOneScore {
                score,
                participant_index,
            } => Action::FiveZeroOne(CountdownAction::SubmitScore {
                participant: *participant_index,
                score: *score,
            }),
            ClientMessage::CancelFiveZeroOneKeypad => {
                Action::FiveZeroOne(CountdownAction::CancelKeypad)
            }

            ClientMessage::AroundTheWorldClientRequestsObjectiveModal => {
                Action::AroundTheWorld(AtwAction::RequestSelector { participant: None })
            }
            ClientMessage::AroundTheWorldTurnResult {
                reported_value,
                participant_index,
            } => Action::AroundTheWorld(AtwAction::ReportHit {
                participant: *participant_index,
                value: *reported_value,
            }),
            ClientMessage::AroundTheWorldCancelObjectiveEntry => {
                Action::AroundTheWorld(AtwAction::CancelSelector)
            }

            ClientMessage::BeersRequestScoreEntry => Action::Beers(BeersAction::RequestScoreEntry),
            ClientMessage::BeersSubmitScore { score } => {
                Action::Beers(BeersAction::SubmitScore { score: *score })
            }
            ClientMessage::BeersCancelScoreEntry => Action::Beers(BeersAction::CancelScoreEntry),
            ClientMessage::BeersAcknowledgeLetter => Action::Beers(BeersAction::AcknowledgeLetter),

            ClientMessage::GolfRequestScoreEntry => Action::Golf(GolfAction::RequestScoreEntry),
            ClientMessage::GolfSubmitScore { score } => {
                Action::Golf(GolfAction::SubmitScore { score: *score })
            }
            ClientMessage::GolfCancelScoreEntry => Action::Golf(GolfAction::CancelScoreEntry),

            ClientMessage::BaseballRequestScoreEntry => {
                Action::Baseball(BaseballAction::RequestScoreEntry)
            }
            ClientMessage::BaseballSubmitInningScore { score } => {
                Action::Baseball(BaseballAction::SubmitScore { score: *score })
            }
            ClientMessage::BaseballCancelKeypad => Action::Baseball(BaseballAction::CancelScoreEntry),

            ClientMessage::KillerChooseNumber {
                player_id,
                chosen_number,
            } => Action::Killer(KillerAction::ChooseNumber {
                player_id: player_id.clone(),
                number: *chosen_number,
            }),
            ClientMessage::KillerBecomeKiller { player_id } => {
                Action::Killer(KillerAction::BecomeKiller {
                    player_id: player_id.clone(),
                })
            }
            ClientMessage::KillerRemoveLife {
                from_player_id,
                target_player_id,
            } => {
                let from = if from_player_id == CONTROLLER_DEVICE_ACTION_ID {
                    KillerActor::Controller
                } else {
                    KillerActor::Participant(ParticipantId::new(from_player_id.as_str()))
                };
                Action::Killer(KillerAction::RemoveLife {
                    from,
                    target_id: target_player_id.clone(),
                })
            }

            ClientMessage::StartGame { .. }
            | ClientMessage::StartKillerGame { .. }
            | ClientMessage::UndoLastAction
            | ClientMessage::RequestGameState
            | ClientMessage::EndGame
            | ClientMessage::RequestMainMenu
            | ClientMessage::RequestStats
            | ClientMessage::ResetSessionStats => return None,
        };
        Some(action)
    }
}

/// Outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ServerMessage {
    /// Full game, sent on request and when a game starts.
    GameState(Game),
    /// Game after a change; `None` once the game is discarded.
    GameStateUpdate(Option<Game>),
    NoGameActive,
    GameStartError(String),
    KillerError(String),
    ActionRejected(String),
    StatsUpdate { session_stats: WinStats },
}

/// Who an outbound message is for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Audience {
    /// The client whose message caused it.
    Sender,
    /// Every connected observer.
    Broadcast,
}

/// An addressed outbound message.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Outbound {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Outbound {
    #[must_use]
    pub fn sender(message: ServerMessage) -> Self {
        Self {
            audience: Audience::Sender,
            message,
        }
    }

    #[must_use]
    pub fn broadcast(message: ServerMessage) -> Self {
        Self {
            audience: Audience::Broadcast,
            message,
        }
    }
}

impl Engine {
    /// Parse and handle one JSON message.
    pub fn handle_json(&mut self, text: &str) -> Result<Vec<Outbound>, serde_json::Error> {
        let message: ClientMessage = serde_json::from_str(text)?;
        Ok(self.handle_message(message))
    }

    /// Handle one inbound message and return what should be sent.
    pub fn handle_message(&mut self, message: ClientMessage) -> Vec<Outbound> {
        let stats_before = self.stats().clone();
        let mut out = self.dispatch(message);
        if *self.stats() != stats_before {
            out.push(self.stats_update(Audience::Broadcast));
        }
        out
    }

    fn dispatch(&mut self, message: ClientMessage) -> Vec<Outbound> {
        if let Some(action) = message.to_action() {
            return self.handle_action(&action);
        }

        match message {
            ClientMessage::StartGame { mode_id, options } => {
                match self.start_game_named(&mode_id, &options) {
                    Ok(game) => vec![Outbound::broadcast(ServerMessage::GameState(game.clone()))],
                    Err(error) => {
                        tracing::warn!(mode = %mode_id, %error, "game start rejected");
                        vec![Outbound::sender(ServerMessage::GameStartError(error.to_string()))]
                    }
                }
            }
            ClientMessage::StartKillerGame { players } => match self.start_killer_game(&players) {
                Ok(game) => vec![Outbound::broadcast(ServerMessage::GameStateUpdate(Some(
                    game.clone(),
                )))],
                Err(error) => {
                    vec![Outbound::sender(ServerMessage::GameStartError(error.to_string()))]
                }
            },
            ClientMessage::UndoLastAction => match self.undo() {
                Some(game) => vec![Outbound::broadcast(ServerMessage::GameStateUpdate(Some(
                    game.clone(),
                )))],
                None => {
                    tracing::debug!("nothing to undo");
                    Vec::new()
                }
            },
            ClientMessage::RequestGameState => match self.game() {
                Some(game) => vec![Outbound::sender(ServerMessage::GameState(game.clone()))],
                None => vec![Outbound::sender(ServerMessage::NoGameActive)],
            },
            ClientMessage::EndGame => match self.end_game() {
                Some(_) => Self::discarded(),
                None => Vec::new(),
            },
            ClientMessage::RequestMainMenu => {
                self.end_game();
                Self::discarded()
            }
            ClientMessage::RequestStats => vec![self.stats_update(Audience::Sender)],
            ClientMessage::ResetSessionStats => {
                self.reset_session_stats();
                vec![self.stats_update(Audience::Broadcast)]
            }
            // Game actions were handled above.
            _ => Vec::new(),
        }
    }

    fn handle_action(&mut self, action: &Action) -> Vec<Outbound> {
        match self.apply(action) {
            Ok(game) => vec![Outbound::broadcast(ServerMessage::GameStateUpdate(Some(
                game.clone(),
            )))],
            Err(ActionError::Rejected(message) | ActionError::NotFound(message))
                if action.mode() == ModeId::Killer =>
            {
                vec![Outbound::sender(ServerMessage::KillerError(message))]
            }
            Err(ActionError::NoActiveGame) => vec![Outbound::sender(ServerMessage::NoGameActive)],
            Err(error) => vec![
                Outbound::sender(ServerMessage::ActionRejected(error.to_string())),
                Outbound::sender(ServerMessage::GameStateUpdate(self.game().cloned())),
            ],
        }
    }

    fn discarded() -> Vec<Outbound> {
        vec![
            Outbound::broadcast(ServerMessage::GameStateUpdate(None)),
            Outbound::broadcast(ServerMessage::NoGameActive),
        ]
    }

    fn stats_update(&self, audience: Audience) -> Outbound {
        Outbound {
            audience,
            message: ServerMessage::StatsUpdate {
                session_stats: self.stats().clone(),
            },
        }
    }
}
