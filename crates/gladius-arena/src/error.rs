//! Error types for the arena layer.

use gladius_protocol::{ArenaId, PlayerId};

/// Errors that can occur during matchmaking or arena operations.
///
/// None of these corrupt arena state: the operation that produced the
/// error had no effect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArenaError {
    /// The player is not one of the two seated in this arena.
    #[error("player {0} is not seated in arena {1}")]
    NotAMember(PlayerId, ArenaId),

    /// The player already chose a combatant; the first choice stands.
    #[error("player {0} already chose a combatant in arena {1}")]
    AlreadySet(PlayerId, ArenaId),

    /// The operation needs a battle in progress.
    #[error("arena {0} is not in progress")]
    NotInProgress(ArenaId),

    /// The battle is over; nothing can change any more.
    #[error("arena {0} has finished")]
    Finished(ArenaId),

    /// It is the other player's turn.
    #[error("it is not player {0}'s turn")]
    NotYourTurn(PlayerId),

    /// The player is already in the waiting queue.
    #[error("player {0} is already waiting for an opponent")]
    AlreadyQueued(PlayerId),

    /// The player is already seated in an arena.
    #[error("player {0} already in arena {1}")]
    AlreadyInArena(PlayerId, ArenaId),

    /// The arena's actor has shut down or its channel is closed.
    #[error("arena {0} is unavailable")]
    Unavailable(ArenaId),
}
