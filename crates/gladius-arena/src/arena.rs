//! The battle state machine for one two-player arena.
//!
//! `Arena` is plain data with synchronous methods. It has no locking of
//! its own: the arena actor owns it and is the only code that calls the
//! mutating methods, so every method here runs inside that arena's
//! critical section.

use gladius_protocol::{ArenaId, BattleStatus, Combatant, PlayerId};

use crate::{ArenaError, ArenaStatus};

/// One of the two places at the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Seat {
    pub player_id: PlayerId,
    pub username: String,
}

impl Seat {
    pub fn new(player_id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            player_id,
            username: username.into(),
        }
    }
}

/// A single battle between player A (seat 0) and player B (seat 1).
///
/// Seat order is fixed at creation and decides who moves first.
#[derive(Debug, Clone)]
pub struct Arena {
    id: ArenaId,
    seats: [Seat; 2],
    combatants: [Option<Combatant>; 2],
    status: ArenaStatus,
    /// Seat index whose turn it is. Only meaningful while InProgress.
    current_turn: usize,
    turns_taken: u32,
}

impl Arena {
    /// Creates an arena awaiting both combatants.
    pub fn new(id: ArenaId, player_a: Seat, player_b: Seat) -> Self {
        Self {
            id,
            seats: [player_a, player_b],
            combatants: [None, None],
            status: ArenaStatus::AwaitingCombatants,
            current_turn: 0,
            turns_taken: 0,
        }
    }

    pub fn id(&self) -> ArenaId {
        self.id
    }

    pub fn status(&self) -> ArenaStatus {
        self.status
    }

    pub fn seats(&self) -> &[Seat; 2] {
        &self.seats
    }

    /// Number of completed turns since the battle started.
    pub fn turns_taken(&self) -> u32 {
        self.turns_taken
    }

    /// Returns the seat index (0 = A, 1 = B) of `player`.
    ///
    /// # Errors
    /// [`ArenaError::NotAMember`] if `player` is not seated here.
    pub fn seat_of(&self, player: PlayerId) -> Result<usize, ArenaError> {
        self.seats
            .iter()
            .position(|seat| seat.player_id == player)
            .ok_or(ArenaError::NotAMember(player, self.id))
    }

    /// Returns the seat facing `player`.
    pub fn opponent_of(&self, player: PlayerId) -> Result<&Seat, ArenaError> {
        let seat = self.seat_of(player)?;
        Ok(&self.seats[1 - seat])
    }

    /// Returns the combatant `player` chose, if any.
    pub fn combatant(&self, player: PlayerId) -> Option<&Combatant> {
        let seat = self.seat_of(player).ok()?;
        self.combatants[seat].as_ref()
    }

    /// Records `player`'s combatant. First submission wins.
    ///
    /// When this completes the pair, the arena moves to InProgress and
    /// player A gets the first turn. Returns `true` exactly when that
    /// transition happened on this call.
    ///
    /// # Errors
    /// - [`ArenaError::NotAMember`] — caller is not seated here
    /// - [`ArenaError::AlreadySet`] — caller already chose
    /// - [`ArenaError::Finished`] — the battle is over
    pub fn set_combatant(
        &mut self,
        player: PlayerId,
        combatant: Combatant,
    ) -> Result<bool, ArenaError> {
        let seat = self.seat_of(player)?;
        if self.combatants[seat].is_some() {
            return Err(ArenaError::AlreadySet(player, self.id));
        }
        if self.status.is_finished() {
            return Err(ArenaError::Finished(self.id));
        }

        self.combatants[seat] = Some(combatant);

        let both_chosen = self.combatants.iter().all(Option::is_some);
        if both_chosen && self.status == ArenaStatus::AwaitingCombatants {
            self.transition(ArenaStatus::InProgress);
            self.current_turn = 0;
            return Ok(true);
        }
        Ok(false)
    }

    /// `true` once both combatants are in (or the arena has finished).
    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    /// `true` iff the battle is in progress and it is `player`'s turn.
    pub fn is_my_turn(&self, player: PlayerId) -> bool {
        self.current_turn() == Some(player)
    }

    /// The player whose turn it is, while the battle is in progress.
    pub fn current_turn(&self) -> Option<PlayerId> {
        (self.status == ArenaStatus::InProgress)
            .then(|| self.seats[self.current_turn].player_id)
    }

    /// Hands the turn to the other player and returns them.
    ///
    /// # Errors
    /// [`ArenaError::NotInProgress`] outside InProgress.
    pub fn advance_turn(&mut self) -> Result<PlayerId, ArenaError> {
        if self.status != ArenaStatus::InProgress {
            return Err(ArenaError::NotInProgress(self.id));
        }
        self.current_turn = 1 - self.current_turn;
        self.turns_taken += 1;
        Ok(self.seats[self.current_turn].player_id)
    }

    /// Ends the battle. Idempotent.
    ///
    /// Returns `true` if this call moved the arena to Finished, `false`
    /// if it had already finished.
    pub fn finish(&mut self) -> bool {
        if self.status.is_finished() {
            return false;
        }
        self.transition(ArenaStatus::Finished);
        true
    }

    /// The battle as seen from `player`'s seat.
    ///
    /// A non-member sees the same thing as someone not yet in a battle.
    pub fn status_for(&self, player: PlayerId) -> BattleStatus {
        if self.seat_of(player).is_err() {
            return BattleStatus::waiting();
        }
        BattleStatus {
            game_ready: self.is_ready(),
            your_turn: self.is_my_turn(player),
            game_over: self.status.is_finished(),
        }
    }

    fn transition(&mut self, target: ArenaStatus) {
        debug_assert!(
            self.status.can_transition_to(target),
            "arena {} cannot go from {} to {}",
            self.id,
            self.status,
            target
        );
        tracing::debug!(
            arena_id = %self.id,
            from = %self.status,
            to = %target,
            "arena status changed"
        );
        self.status = target;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);
    const STRANGER: PlayerId = PlayerId(99);

    fn arena() -> Arena {
        Arena::new(ArenaId(1), Seat::new(A, "alice"), Seat::new(B, "bob"))
    }

    fn started() -> Arena {
        let mut arena = arena();
        arena.set_combatant(A, Combatant::named("Spartacus")).unwrap();
        arena.set_combatant(B, Combatant::named("Crixus")).unwrap();
        arena
    }

    /// Exactly one of the two players may act while in progress.
    fn assert_single_turn(arena: &Arena) {
        assert_ne!(
            arena.is_my_turn(A),
            arena.is_my_turn(B),
            "exactly one player should have the turn"
        );
    }

    // =====================================================================
    // set_combatant()
    // =====================================================================

    #[test]
    fn test_set_combatant_first_choice_keeps_awaiting() {
        let mut arena = arena();

        let started = arena.set_combatant(A, Combatant::named("Spartacus"));

        assert_eq!(started, Ok(false));
        assert_eq!(arena.status(), ArenaStatus::AwaitingCombatants);
        assert!(!arena.is_ready());
        assert!(!arena.is_my_turn(A));
        assert!(!arena.is_my_turn(B));
    }

    #[test]
    fn test_set_combatant_both_chosen_starts_with_player_a() {
        let mut arena = arena();

        assert_eq!(arena.set_combatant(A, Combatant::named("x")), Ok(false));
        assert_eq!(arena.set_combatant(B, Combatant::named("y")), Ok(true));

        assert_eq!(arena.status(), ArenaStatus::InProgress);
        assert_eq!(arena.current_turn(), Some(A));
        assert!(arena.is_ready());
    }

    #[test]
    fn test_set_combatant_player_b_first_still_starts_with_a() {
        let mut arena = arena();

        arena.set_combatant(B, Combatant::named("y")).unwrap();
        arena.set_combatant(A, Combatant::named("x")).unwrap();

        assert_eq!(arena.current_turn(), Some(A));
    }

    #[test]
    fn test_set_combatant_again_is_rejected_and_changes_nothing() {
        let mut arena = started();
        arena.advance_turn().unwrap();

        let result = arena.set_combatant(A, Combatant::named("z"));

        assert_eq!(result, Err(ArenaError::AlreadySet(A, ArenaId(1))));
        assert_eq!(arena.combatant(A).unwrap().name, "Spartacus");
        assert_eq!(arena.status(), ArenaStatus::InProgress);
        assert_eq!(arena.current_turn(), Some(B));
    }

    #[test]
    fn test_set_combatant_stranger_is_not_a_member() {
        let mut arena = arena();

        let result = arena.set_combatant(STRANGER, Combatant::named("z"));

        assert_eq!(
            result,
            Err(ArenaError::NotAMember(STRANGER, ArenaId(1)))
        );
        assert!(arena.combatant(A).is_none());
    }

    #[test]
    fn test_set_combatant_after_finish_is_rejected() {
        let mut arena = arena();
        arena.finish();

        let result = arena.set_combatant(A, Combatant::named("x"));

        assert_eq!(result, Err(ArenaError::Finished(ArenaId(1))));
        assert!(arena.combatant(A).is_none());
    }

    // =====================================================================
    // advance_turn() / is_my_turn()
    // =====================================================================

    #[test]
    fn test_advance_turn_alternates_players() {
        let mut arena = started();
        assert!(arena.is_my_turn(A));
        assert_single_turn(&arena);

        for expected in [B, A, B, A] {
            let before_a = arena.is_my_turn(A);
            let before_b = arena.is_my_turn(B);

            assert_eq!(arena.advance_turn(), Ok(expected));

            assert_eq!(arena.is_my_turn(A), !before_a);
            assert_eq!(arena.is_my_turn(B), !before_b);
            assert_single_turn(&arena);
        }
        assert_eq!(arena.turns_taken(), 4);
    }

    #[test]
    fn test_advance_turn_before_start_is_not_in_progress() {
        let mut arena = arena();

        assert_eq!(
            arena.advance_turn(),
            Err(ArenaError::NotInProgress(ArenaId(1)))
        );
    }

    #[test]
    fn test_advance_turn_after_finish_is_not_in_progress() {
        let mut arena = started();
        arena.finish();

        assert_eq!(
            arena.advance_turn(),
            Err(ArenaError::NotInProgress(ArenaId(1)))
        );
        assert!(!arena.is_my_turn(A));
        assert!(!arena.is_my_turn(B));
    }

    // =====================================================================
    // finish()
    // =====================================================================

    #[test]
    fn test_finish_is_idempotent() {
        let mut arena = started();

        assert!(arena.finish());
        assert!(!arena.finish());

        assert_eq!(arena.status(), ArenaStatus::Finished);
        assert_eq!(arena.current_turn(), None);
    }

    #[test]
    fn test_finish_before_start_is_allowed() {
        let mut arena = arena();

        assert!(arena.finish());
        assert!(arena.status().is_finished());
    }

    // =====================================================================
    // status_for() / opponent_of()
    // =====================================================================

    #[test]
    fn test_status_for_reports_each_seat() {
        let arena = started();

        assert_eq!(
            arena.status_for(A),
            BattleStatus {
                game_ready: true,
                your_turn: true,
                game_over: false
            }
        );
        assert_eq!(
            arena.status_for(B),
            BattleStatus {
                game_ready: true,
                your_turn: false,
                game_over: false
            }
        );
    }

    #[test]
    fn test_status_for_finished_is_game_over() {
        let mut arena = started();
        arena.finish();

        let status = arena.status_for(B);

        assert!(status.game_over);
        assert!(!status.your_turn);
    }

    #[test]
    fn test_status_for_stranger_is_waiting() {
        assert_eq!(arena().status_for(STRANGER), BattleStatus::waiting());
    }

    #[test]
    fn test_opponent_of_each_seat() {
        let arena = arena();

        assert_eq!(arena.opponent_of(A).unwrap().username, "bob");
        assert_eq!(arena.opponent_of(B).unwrap().username, "alice");
        assert!(arena.opponent_of(STRANGER).is_err());
    }
}
