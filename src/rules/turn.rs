//! Turn sequencing.
//!
//! Finds the next `(participant, slot)` pair that may throw. Two policies:
//!
//! - **Slot-major**: every participant's slot 0 plays before anyone's slot 1.
//!   Bounded by `participants × max_slots + 5` attempts.
//! - **Participant-major**: a participant's slots are exhausted before moving
//!   on. Bounded by `participants × (max_slots + 1) + 5` attempts.
//!
//! The search is a plain function over the participant list so it can be
//! exercised without a full game.

use im::Vector;
use serde::{Deserialize, Serialize};

use crate::core::participant::Participant;
use crate::core::state::TurnCursor;

/// Order in which player slots are visited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnPolicy {
    SlotMajor,
    ParticipantMajor,
}

/// Outcome of a turn search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TurnSearch {
    /// An eligible cursor was found.
    Found(TurnCursor),
    /// No eligible participant within the attempt bound.
    Exhausted { attempts: usize },
}

impl TurnSearch {
    #[must_use]
    pub fn cursor(self) -> Option<TurnCursor> {
        match self {
            TurnSearch::Found(cursor) => Some(cursor),
            TurnSearch::Exhausted { .. } => None,
        }
    }

    #[must_use]
    pub fn is_found(self) -> bool {
        matches!(self, TurnSearch::Found(_))
    }
}

/// Largest player count on any team, never below 1.
#[must_use]
pub fn max_slots(participants: &Vector<Participant>) -> usize {
    participants
        .iter()
        .map(Participant::player_count)
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Attempt bound for `policy`.
#[must_use]
pub fn attempt_bound(policy: TurnPolicy, participants: usize, max_slots: usize) -> usize {
    match policy {
        TurnPolicy::SlotMajor => participants * max_slots + 5,
        TurnPolicy::ParticipantMajor => participants * (max_slots + 1) + 5,
    }
}

/// Find the turn after `current`.
///
/// With no current cursor the search starts at participant 0, slot 0.
/// `skip` excludes participants (eliminated, already won, ...).
pub fn next_turn<F>(
    participants: &Vector<Participant>,
    current: Option<TurnCursor>,
    policy: TurnPolicy,
    skip: F,
) -> TurnSearch
where
    F: Fn(&Participant) -> bool,
{
    let count = participants.len();
    if count == 0 {
        return TurnSearch::Exhausted { attempts: 0 };
    }

    let slots = max_slots(participants);
    let bound = attempt_bound(policy, count, slots);
    let eligible = |cursor: TurnCursor| {
        participants
            .get(cursor.participant)
            .is_some_and(|p| p.has_slot(cursor.slot) && !skip(p))
    };

    let mut position = current;
    for _ in 0..bound {
        let candidate = match policy {
            TurnPolicy::SlotMajor => step_slot_major(position, count, slots),
            TurnPolicy::ParticipantMajor => step_participant_major(participants, position, count),
        };
        if eligible(candidate) {
            return TurnSearch::Found(candidate);
        }
        position = Some(candidate);
    }

    TurnSearch::Exhausted { attempts: bound }
}

fn step_slot_major(position: Option<TurnCursor>, count: usize, slots: usize) -> TurnCursor {
    let Some(cursor) = position else {
        return TurnCursor::new(0, 0);
    };

    let mut participant = cursor.participant + 1;
    let mut slot = cursor.slot;
    if participant >= count {
        participant = 0;
        slot += 1;
    }
    if slot >= slots {
        slot = 0;
    }
    TurnCursor::new(participant, slot)
}

fn step_participant_major(
    participants: &Vector<Participant>,
    position: Option<TurnCursor>,
    count: usize,
) -> TurnCursor {
    let Some(cursor) = position else {
        return TurnCursor::new(0, 0);
    };

    let has_next_slot = participants
        .get(cursor.participant)
        .is_some_and(|p| p.has_slot(cursor.slot + 1));
    if has_next_slot {
        TurnCursor::new(cursor.participant, cursor.slot + 1)
    } else {
        TurnCursor::new((cursor.participant + 1) % count, 0)
    }
}
