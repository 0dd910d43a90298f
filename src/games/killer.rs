//! Free-for-all elimination game (Killer).
//!
//! There is no turn order. Players claim a number, become killers once every
//! player holds one, and killers take lives from the others. The last player
//! standing wins.
//!
//! Killer is started through its own entry point and its rule violations are
//! reported to the acting controller with a player-facing message
//! ([`ActionError::Rejected`]).

use serde::{Deserialize, Serialize};

use crate::core::action::{Action, KillerAction, KillerActor};
use crate::core::config::GameOptions;
use crate::core::participant::{ParticipantId, ParticipantState, Roster};
use crate::core::rng::GameRng;
use crate::core::state::{Game, ModeId, ModeState};
use crate::rules::engine::{ensure_running, ActionError, ModeRules, WinnerRecord};

/// Lives every player starts with.
pub const LIVES_START: i64 = 3;

/// Numbers players may claim.
pub const NUMBER_RANGE: std::ops::RangeInclusive<u8> = 1..=20;

/// Per-player status.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillerStatus {
    pub number: Option<u8>,
    pub is_killer: bool,
    pub is_eliminated: bool,
    pub lives: i64,
}

impl KillerStatus {
    #[must_use]
    pub fn new(lives: i64) -> Self {
        Self {
            number: None,
            is_killer: false,
            is_eliminated: false,
            lives,
        }
    }

    fn is_active_killer(&self) -> bool {
        self.is_killer && !self.is_eliminated
    }

    /// Take one life; returns whether that eliminated the player.
    fn lose_life(&mut self) -> bool {
        self.lives -= 1;
        if self.lives <= 0 {
            self.is_eliminated = true;
            self.is_killer = false;
        }
        self.is_eliminated
    }
}

impl Default for KillerStatus {
    fn default() -> Self {
        Self::new(LIVES_START)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KillerBoard {
    pub numbers_to_choose_from: Vec<u8>,
    pub lives_start: i64,
}

impl Default for KillerBoard {
    fn default() -> Self {
        Self {
            numbers_to_choose_from: NUMBER_RANGE.collect(),
            lives_start: LIVES_START,
        }
    }
}

/// Free-for-all rules.
#[derive(Clone, Copy, Debug, Default)]
pub struct Killer;

fn rejected(message: impl Into<String>) -> ActionError {
    ActionError::Rejected(message.into())
}

fn status_of<'a>(game: &'a Game, id: &ParticipantId) -> Option<&'a KillerStatus> {
    game.participants
        .iter()
        .find(|p| &p.id == id)
        .and_then(|p| p.state.killer())
}

fn status_mut<'a>(game: &'a mut Game, id: &ParticipantId) -> Option<&'a mut KillerStatus> {
    let index = game.index_of(id)?;
    game.participant_mut(index)?.state.killer_mut()
}

fn statuses(game: &Game) -> impl Iterator<Item = &KillerStatus> {
    game.participants.iter().filter_map(|p| p.state.killer())
}

impl Killer {
    fn choose_number(
        game: &mut Game,
        player_id: &ParticipantId,
        number: i64,
    ) -> Result<(), ActionError> {
        let allowed = game
            .board
            .killer()
            .map(|board| board.numbers_to_choose_from.clone())
            .unwrap_or_default();
        let status = status_of(game, player_id)
            .ok_or_else(|| ActionError::NotFound(format!("player {player_id}")))?;

        if let Some(chosen) = status.number {
            return Err(rejected(format!("You have already chosen number {chosen}.")));
        }
        if statuses(game).any(|s| s.number.is_some_and(|n| i64::from(n) == number)) {
            return Err(rejected(format!("Number {number} is already taken.")));
        }
        let valid = u8::try_from(number).ok().filter(|n| allowed.contains(n));
        let Some(number) = valid else {
            return Err(rejected(format!(
                "Invalid number {number}. Please choose from 1-20."
            )));
        };

        if let Some(status) = status_mut(game, player_id) {
            status.number = Some(number);
        }
        tracing::debug!(game = %game.id, player = %player_id, number, "number chosen");
        Ok(())
    }

    fn become_killer(game: &mut Game, player_id: &ParticipantId) -> Result<(), ActionError> {
        let status = status_of(game, player_id)
            .ok_or_else(|| ActionError::NotFound(format!("player {player_id}")))?;

        if status.number.is_none() {
            return Err(rejected("You must choose a number first."));
        }
        if status.is_killer {
            return Ok(());
        }
        if status.is_eliminated {
            return Err(rejected("Eliminated players cannot become killers."));
        }
        if statuses(game).any(|s| s.number.is_none()) {
            return Err(rejected(
                "All players must choose a number before anyone can become a Killer.",
            ));
        }

        if let Some(status) = status_mut(game, player_id) {
            status.is_killer = true;
        }
        tracing::debug!(game = %game.id, player = %player_id, "became killer");
        Ok(())
    }

    fn authorize(game: &Game, from: &KillerActor, target_id: &ParticipantId) -> Result<(), ActionError> {
        match from {
            KillerActor::Controller => {
                if !statuses(game).any(KillerStatus::is_active_killer) {
                    return Err(rejected("Action requires an active killer in the game."));
                }
            }
            KillerActor::Participant(attacker_id) => {
                let attacker = status_of(game, attacker_id)
                    .ok_or_else(|| rejected("Attacker player not found."))?;
                if !attacker.is_killer {
                    return Err(rejected("Only Killers can remove lives."));
                }
                if attacker.is_eliminated {
                    return Err(rejected("Eliminated players cannot act."));
                }
                if attacker_id == target_id {
                    return Err(rejected("You cannot target yourself to remove a life."));
                }
            }
        }
        Ok(())
    }

    fn remove_life(
        &self,
        game: &mut Game,
        from: &KillerActor,
        target_id: &ParticipantId,
    ) -> Result<(), ActionError> {
        let index = game
            .index_of(target_id)
            .ok_or_else(|| ActionError::NotFound("Target player not found.".to_string()))?;
        let target = &game.participants[index];
        if target.is_eliminated() {
            return Err(rejected(format!("{} is already eliminated.", target.name)));
        }
        Self::authorize(game, from, target_id)?;

        let eliminated = game
            .participant_mut(index)
            .and_then(|p| p.state.killer_mut())
            .is_some_and(KillerStatus::lose_life);
        tracing::debug!(game = %game.id, target = %target_id, eliminated, "life removed");

        if let Some(winner) = self.evaluate(game) {
            game.conclude(winner);
        }
        Ok(())
    }
}

impl ModeRules for Killer {
    fn mode(&self) -> ModeId {
        ModeId::Killer
    }

    fn initialize(&self, roster: Vec<Roster>, _options: &GameOptions, _rng: &mut GameRng) -> Game {
        let board = KillerBoard::default();
        let participants = roster
            .into_iter()
            .map(|r| r.into_participant(ParticipantState::Killer(KillerStatus::new(board.lives_start))))
            .collect();
        Game::new(ModeState::Killer(board), participants)
    }

    fn apply(&self, game: &mut Game, action: &Action) -> Result<(), ActionError> {
        let Action::Killer(action) = action else {
            return Err(ActionError::ModeMismatch {
                active: ModeId::Killer,
                action: action.mode(),
            });
        };
        ensure_running(game)?;

        match action {
            KillerAction::ChooseNumber { player_id, number } => {
                Self::choose_number(game, player_id, *number)
            }
            KillerAction::BecomeKiller { player_id } => Self::become_killer(game, player_id),
            KillerAction::RemoveLife { from, target_id } => self.remove_life(game, from, target_id),
        }
    }

    /// Last one alive wins once someone has been knocked out.
    fn evaluate(&self, game: &Game) -> Option<WinnerRecord> {
        if game.active_count() == game.participants.len() {
            return None;
        }
        let mut alive = game.participants.iter().filter(|p| !p.is_eliminated());
        match (alive.next(), alive.next()) {
            (Some(winner), None) => {
                let lives = winner.state.killer().map_or(0, |s| s.lives);
                Some(WinnerRecord::team(winner, lives))
            }
            (None, _) => Some(WinnerRecord::tie_named("Draw - All players eliminated", 0)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::participant::TeamSetup;
    use crate::rules::engine::WinnerKind;

    fn start(names: &[&str]) -> Game {
        let setups: Vec<TeamSetup> = names
            .iter()
            .map(|n| TeamSetup::new(*n, &[*n]).with_id(n.to_lowercase()))
            .collect();
        Killer.initialize(
            Roster::from_setups(&setups),
            &GameOptions::default(),
            &mut GameRng::new(1),
        )
    }

    fn id(s: &str) -> ParticipantId {
        ParticipantId::new(s)
    }

    fn act(game: &mut Game, action: KillerAction) -> Result<(), ActionError> {
        Killer.apply(game, &Action::Killer(action))
    }

    fn choose(game: &mut Game, player: &str, number: i64) -> Result<(), ActionError> {
        act(
            game,
            KillerAction::ChooseNumber {
                player_id: id(player),
                number,
            },
        )
    }

    fn arm(game: &mut Game, player: &str) -> Result<(), ActionError> {
        act(game, KillerAction::BecomeKiller { player_id: id(player) })
    }

    fn hit(game: &mut Game, from: KillerActor, target: &str) -> Result<(), ActionError> {
        act(
            game,
            KillerAction::RemoveLife {
                from,
                target_id: id(target),
            },
        )
    }

    #[test]
    fn test_initial_state() {
        let game = start(&["A", "B"]);
        let board = game.board.killer().unwrap();
        assert_eq!(board.numbers_to_choose_from.len(), 20);
        assert_eq!(board.lives_start, 3);
        assert_eq!(game.current_participant_index, None);
        assert_eq!(game.participants[0].state.killer(), Some(&KillerStatus::new(3)));
    }

    #[test]
    fn test_choose_number_errors() {
        let mut game = start(&["A", "B"]);
        choose(&mut game, "a", 7).unwrap();

        assert_eq!(
            choose(&mut game, "a", 8),
            Err(rejected("You have already chosen number 7."))
        );
        assert_eq!(
            choose(&mut game, "b", 7),
            Err(rejected("Number 7 is already taken."))
        );
        assert_eq!(
            choose(&mut game, "b", 21),
            Err(rejected("Invalid number 21. Please choose from 1-20."))
        );
        assert!(matches!(choose(&mut game, "zed", 3), Err(ActionError::NotFound(_))));
    }

    #[test]
    fn test_become_killer_requires_all_numbers() {
        let mut game = start(&["A", "B"]);
        assert_eq!(
            arm(&mut game, "a"),
            Err(rejected("You must choose a number first."))
        );
        choose(&mut game, "a", 1).unwrap();
        assert_eq!(
            arm(&mut game, "a"),
            Err(rejected(
                "All players must choose a number before anyone can become a Killer."
            ))
        );
        choose(&mut game, "b", 2).unwrap();
        arm(&mut game, "a").unwrap();
        assert!(game.participants[0].state.killer().unwrap().is_killer);

        // Becoming a killer twice is a no-op.
        let before = game.clone();
        arm(&mut game, "a").unwrap();
        assert_eq!(game, before);
    }

    #[test]
    fn test_remove_life_authorization() {
        let mut game = start(&["A", "B"]);
        assert_eq!(
            hit(&mut game, KillerActor::Controller, "b"),
            Err(rejected("Action requires an active killer in the game."))
        );
        assert_eq!(
            hit(&mut game, KillerActor::Participant(id("a")), "b"),
            Err(rejected("Only Killers can remove lives."))
        );
        assert_eq!(
            hit(&mut game, KillerActor::Participant(id("nobody")), "b"),
            Err(rejected("Attacker player not found."))
        );
        assert!(matches!(
            hit(&mut game, KillerActor::Controller, "nobody"),
            Err(ActionError::NotFound(_))
        ));

        choose(&mut game, "a", 1).unwrap();
        choose(&mut game, "b", 2).unwrap();
        arm(&mut game, "a").unwrap();
        assert_eq!(
            hit(&mut game, KillerActor::Participant(id("a")), "a"),
            Err(rejected("You cannot target yourself to remove a life."))
        );
    }

    #[test]
    fn test_last_player_standing_wins() {
        let mut game = start(&["A", "B", "C"]);
        for (player, number) in [("a", 1), ("b", 2), ("c", 3)] {
            choose(&mut game, player, number).unwrap();
        }
        arm(&mut game, "a").unwrap();

        for _ in 0..3 {
            hit(&mut game, KillerActor::Participant(id("a")), "b").unwrap();
        }
        assert!(game.participants[1].is_eliminated());
        assert!(!game.game_over);
        assert_eq!(
            hit(&mut game, KillerActor::Controller, "b"),
            Err(rejected("B is already eliminated."))
        );

        for _ in 0..3 {
            hit(&mut game, KillerActor::Controller, "c").unwrap();
        }
        assert!(game.game_over);
        let winner = game.winner.as_ref().unwrap();
        assert_eq!(winner.kind, WinnerKind::Team);
        assert_eq!(winner.id, Some(id("a")));
    }

    #[test]
    fn test_eliminated_killer_loses_status() {
        let mut game = start(&["A", "B", "C"]);
        for (player, number) in [("a", 1), ("b", 2), ("c", 3)] {
            choose(&mut game, player, number).unwrap();
        }
        arm(&mut game, "a").unwrap();
        arm(&mut game, "b").unwrap();
        for _ in 0..3 {
            hit(&mut game, KillerActor::Participant(id("b")), "a").unwrap();
        }
        let status = game.participants[0].state.killer().unwrap();
        assert!(status.is_eliminated);
        assert!(!status.is_killer);
        assert_eq!(status.lives, 0);
        assert_eq!(
            hit(&mut game, KillerActor::Participant(id("a")), "c"),
            Err(rejected("Only Killers can remove lives."))
        );
    }

    #[test]
    fn test_game_over_blocks_actions() {
        let mut game = start(&["A", "B"]);
        choose(&mut game, "a", 1).unwrap();
        choose(&mut game, "b", 2).unwrap();
        arm(&mut game, "b").unwrap();
        for _ in 0..3 {
            hit(&mut game, KillerActor::Controller, "a").unwrap();
        }
        assert!(game.game_over);
        assert_eq!(arm(&mut game, "b"), Err(ActionError::GameOver));
    }
}
