//! Arena configuration and lifecycle states.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ArenaConfig
// ---------------------------------------------------------------------------

/// Settings applied to every arena the matchmaker creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArenaConfig {
    /// Capacity of each arena actor's command channel. When it is full,
    /// callers wait (backpressure) instead of growing memory.
    pub channel_size: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self { channel_size: 64 }
    }
}

// ---------------------------------------------------------------------------
// ArenaStatus
// ---------------------------------------------------------------------------

/// The lifecycle state of an arena.
///
/// Transitions only move forward:
///
/// ```text
/// AwaitingCombatants → InProgress → Finished
///          └──────────────────────────↑
/// ```
///
/// - **AwaitingCombatants**: both players are seated, at least one has
///   not chosen a combatant yet.
/// - **InProgress**: both combatants chosen; players take turns.
/// - **Finished**: terminal. Reached by forfeit or by a player leaving,
///   possibly before the battle ever started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArenaStatus {
    AwaitingCombatants,
    InProgress,
    Finished,
}

impl ArenaStatus {
    fn rank(self) -> u8 {
        match self {
            Self::AwaitingCombatants => 0,
            Self::InProgress => 1,
            Self::Finished => 2,
        }
    }

    /// Returns `true` if moving to `target` goes forward.
    pub fn can_transition_to(self, target: Self) -> bool {
        target.rank() > self.rank()
    }

    /// Returns `true` once the arena has left `AwaitingCombatants`.
    pub fn is_ready(self) -> bool {
        !matches!(self, Self::AwaitingCombatants)
    }

    /// Returns `true` for the terminal state.
    pub fn is_finished(self) -> bool {
        matches!(self, Self::Finished)
    }
}

impl std::fmt::Display for ArenaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitingCombatants => write!(f, "AwaitingCombatants"),
            Self::InProgress => write!(f, "InProgress"),
            Self::Finished => write!(f, "Finished"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_status_only_moves_forward() {
        use ArenaStatus::*;
        assert!(AwaitingCombatants.can_transition_to(InProgress));
        assert!(AwaitingCombatants.can_transition_to(Finished));
        assert!(InProgress.can_transition_to(Finished));

        assert!(!InProgress.can_transition_to(AwaitingCombatants));
        assert!(!Finished.can_transition_to(InProgress));
        assert!(!Finished.can_transition_to(Finished));
    }

    #[test]
    fn test_arena_status_is_ready() {
        assert!(!ArenaStatus::AwaitingCombatants.is_ready());
        assert!(ArenaStatus::InProgress.is_ready());
        assert!(ArenaStatus::Finished.is_ready());
    }

    #[test]
    fn test_arena_status_display() {
        assert_eq!(ArenaStatus::InProgress.to_string(), "InProgress");
    }

    #[test]
    fn test_arena_config_default() {
        assert_eq!(ArenaConfig::default().channel_size, 64);
    }
}
