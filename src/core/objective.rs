//! Board objectives for the closing-numbers and objective-round games.
//!
//! Objectives are created once when a game starts and afterwards only change
//! status. Closing-numbers games use a fixed list; objective-round games draw
//! part of theirs at random.

use serde::{Deserialize, Serialize};

/// What kind of target an objective is.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "category", rename_all = "snake_case")]
pub enum ObjectiveKind {
    /// A number (or bullseye) with a fixed point value.
    Numeric { value: i64 },
    /// A composite target whose score is entered by hand.
    Special,
    /// A randomly drawn challenge.
    RandomChallenge,
    /// Score exactly `value` points in one turn.
    HardScore { value: i64 },
}

/// Whether an objective is still in play.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectiveStatus {
    #[default]
    Open,
    Closed,
}

/// A single objective.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Objective {
    pub id: String,
    pub name: String,
    pub kind: ObjectiveKind,
    pub description: String,
    pub status: ObjectiveStatus,
}

impl Objective {
    /// Create an open objective.
    pub fn new(id: impl Into<String>, name: impl Into<String>, kind: ObjectiveKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            description: String::new(),
            status: ObjectiveStatus::Open,
        }
    }

    /// Attach a human-readable description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Point value for numeric targets.
    #[must_use]
    pub fn numeric_value(&self) -> Option<i64> {
        match self.kind {
            ObjectiveKind::Numeric { value } => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == ObjectiveStatus::Open
    }

    pub fn close(&mut self) {
        self.status = ObjectiveStatus::Closed;
    }
}
