//! Participant identification and per-participant scoring payloads.
//!
//! ## Participant
//!
//! Every side in a game is a team. A team of one is just a team whose
//! `players` list holds a single name. Each participant carries a
//! mode-specific [`ParticipantState`] that the active mode's rules mutate.
//!
//! ## Roster
//!
//! Setup data arrives from controllers as loosely-filled [`TeamSetup`]
//! records. [`Roster::from_setups`] fills in ids, names and player slots so
//! that mode initializers always see well-formed teams.

use serde::{Deserialize, Serialize};

use crate::games::around_the_world::AtwProgress;
use crate::games::baseball::BaseballLine;
use crate::games::beers::BeersRecord;
use crate::games::cricket::CricketScore;
use crate::games::five_zero_one::CountdownScore;
use crate::games::golf::GolfCard;
use crate::games::killer::KillerStatus;
use crate::games::three_ff::FlightsScore;

/// Stable participant identifier.
///
/// Controllers may supply their own ids (persistent roster ids); otherwise
/// a UUID v4 is generated when the game starts.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Create a participant ID from an existing string.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the raw ID.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Team setup as sent by a controller when starting a game.
///
/// Every field is optional on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamSetup {
    pub id: Option<String>,
    pub name: Option<String>,
    pub players: Vec<String>,
}

impl TeamSetup {
    /// Create a named team with the given players.
    pub fn new(name: impl Into<String>, players: &[&str]) -> Self {
        Self {
            id: None,
            name: Some(name.into()),
            players: players.iter().map(|p| (*p).to_string()).collect(),
        }
    }

    /// Set an explicit ID.
    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A normalized team entry, ready to receive a mode payload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Roster {
    pub id: ParticipantId,
    pub name: String,
    pub players: Vec<String>,
}

impl Roster {
    /// Normalize controller setup data.
    ///
    /// - Missing ids become UUIDs, missing names become `Team N`.
    /// - Blank player names are dropped; a team left without players gets
    ///   its own name as its only player.
    /// - An empty setup list yields a single default team.
    pub fn from_setups(setups: &[TeamSetup]) -> Vec<Self> {
        if setups.is_empty() {
            return vec![Self {
                id: ParticipantId::new(format!("team_{}", uuid::Uuid::new_v4())),
                name: "Team 1 (Default)".to_string(),
                players: vec!["Player 1".to_string()],
            }];
        }

        setups
            .iter()
            .enumerate()
            .map(|(index, setup)| {
                let name = setup
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map_or_else(|| format!("Team {}", index + 1), str::to_string);

                let mut players: Vec<String> = setup
                    .players
                    .iter()
                    .map(|p| p.trim())
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
                    .collect();
                if players.is_empty() {
                    players.push(name.clone());
                }

                let id = setup
                    .id
                    .as_deref()
                    .filter(|id| !id.is_empty())
                    .map_or_else(ParticipantId::generate, ParticipantId::new);

                Self { id, name, players }
            })
            .collect()
    }

    /// Attach a mode payload, producing a participant.
    #[must_use]
    pub fn into_participant(self, state: ParticipantState) -> Participant {
        Participant {
            id: self.id,
            name: self.name,
            players: self.players,
            state,
        }
    }
}

/// A team taking part in the active game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    /// Underlying player names, in throwing order.
    pub players: Vec<String>,
    /// Mode-specific scoring payload.
    pub state: ParticipantState,
}

impl Participant {
    /// Number of player slots on this team.
    #[must_use]
    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    /// Check whether the team has a player in `slot`.
    #[must_use]
    pub fn has_slot(&self, slot: usize) -> bool {
        slot < self.players.len()
    }

    /// Name of the player in `slot`, if any.
    #[must_use]
    pub fn player_name(&self, slot: usize) -> Option<&str> {
        self.players.get(slot).map(String::as_str)
    }

    /// Check whether this participant is out of the game.
    #[must_use]
    pub fn is_eliminated(&self) -> bool {
        self.state.is_eliminated()
    }
}

/// Per-participant payload, one variant per game mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ParticipantState {
    Cricket(CricketScore),
    FiveZeroOne(CountdownScore),
    AroundTheWorld(AtwProgress),
    Beers(BeersRecord),
    Golf(GolfCard),
    Baseball(BaseballLine),
    Killer(KillerStatus),
    ThreeFf(FlightsScore),
}

macro_rules! state_accessors {
    ($($variant:ident => $ty:ty, $get:ident, $get_mut:ident;)*) => {
        impl ParticipantState {
            $(
                #[must_use]
                pub fn $get(&self) -> Option<&$ty> {
                    match self {
                        Self::$variant(state) => Some(state),
                        _ => None,
                    }
                }

                pub fn $get_mut(&mut self) -> Option<&mut $ty> {
                    match self {
                        Self::$variant(state) => Some(state),
                        _ => None,
                    }
                }
            )*
        }
    };
}

state_accessors! {
    Cricket => CricketScore, cricket, cricket_mut;
    FiveZeroOne => CountdownScore, five_zero_one, five_zero_one_mut;
    AroundTheWorld => AtwProgress, around_the_world, around_the_world_mut;
    Beers => BeersRecord, beers, beers_mut;
    Golf => GolfCard, golf, golf_mut;
    Baseball => BaseballLine, baseball, baseball_mut;
    Killer => KillerStatus, killer, killer_mut;
    ThreeFf => FlightsScore, three_ff, three_ff_mut;
}

impl ParticipantState {
    /// Elimination as defined by the modes that have it.
    #[must_use]
    pub fn is_eliminated(&self) -> bool {
        match self {
            Self::Beers(record) => record.is_eliminated,
            Self::Killer(status) => status.is_eliminated,
            _ => false,
        }
    }
}
