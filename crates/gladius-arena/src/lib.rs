//! Two-player arenas and matchmaking for Gladius.
//!
//! Each arena runs as an isolated Tokio task (actor model) that owns the
//! battle's [`Arena`] state. The two connection handlers seated in it
//! never touch that state directly; they send commands through an
//! [`ArenaHandle`] and the actor applies them one at a time. That gives
//! every arena its own critical section, and unrelated arenas never
//! contend with each other.
//!
//! # Key types
//!
//! - [`Matchmaker`] — waiting queue; pairs clients into new arenas
//! - [`ArenaHandle`] — send commands to a running arena actor
//! - [`Arena`] — the battle state machine (combatants, turn, status)
//! - [`ArenaStatus`] — `AwaitingCombatants → InProgress → Finished`
//! - [`Outbound`] — what an arena pushes to a seated client

mod actor;
mod arena;
mod config;
mod error;
mod matchmaker;

pub use actor::{ArenaHandle, ArenaInfo, Outbound, PlayerSender};
pub use arena::{Arena, Seat};
pub use config::{ArenaConfig, ArenaStatus};
pub use error::ArenaError;
pub use matchmaker::{Departure, Matchmaker, WaitingPlayer};
