//! Matchmaker: the waiting queue, and the index of which player sits in
//! which arena.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use gladius_protocol::{ArenaId, PlayerId};

use crate::actor::spawn_arena;
use crate::{ArenaConfig, ArenaError, ArenaHandle, Outbound, PlayerSender, Seat};

/// Counter for generating unique arena IDs.
static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// A logged-in client waiting for an opponent.
#[derive(Debug, Clone)]
pub struct WaitingPlayer {
    pub player_id: PlayerId,
    pub username: String,
    pub sender: PlayerSender,
}

impl WaitingPlayer {
    pub fn new(player_id: PlayerId, username: impl Into<String>, sender: PlayerSender) -> Self {
        Self {
            player_id,
            username: username.into(),
            sender,
        }
    }
}

/// What [`Matchmaker::leave`] hands back so the caller can finish the
/// departure on the arena actor without holding the matchmaker lock.
#[derive(Debug, Clone)]
pub struct Departure {
    pub handle: ArenaHandle,
    /// `true` when nobody is left seated; the arena has been forgotten
    /// and its actor should be shut down.
    pub last_out: bool,
}

/// Pairs waiting clients into arenas, first come first served.
///
/// The matchmaker is plain data and is shared behind a mutex by the
/// server, so pairing is atomic with respect to every other enqueue,
/// cancel, or leave.
pub struct Matchmaker {
    waiting: VecDeque<WaitingPlayer>,
    arenas: HashMap<ArenaId, ArenaHandle>,
    /// A player is in at most ONE arena at a time.
    player_arenas: HashMap<PlayerId, ArenaId>,
    config: ArenaConfig,
}

impl Matchmaker {
    pub fn new(config: ArenaConfig) -> Self {
        Self {
            waiting: VecDeque::new(),
            arenas: HashMap::new(),
            player_arenas: HashMap::new(),
            config,
        }
    }

    /// Adds a client to the back of the waiting queue, then pairs the
    /// two longest-waiting clients if there are at least two.
    ///
    /// Both paired clients get an [`Outbound::Matched`] carrying the new
    /// arena's handle and the opponent's username. The one who waited
    /// longer becomes player A and moves first.
    ///
    /// Returns the new arena's ID when this call created one.
    ///
    /// # Errors
    /// - [`ArenaError::AlreadyInArena`] — the client is already seated
    /// - [`ArenaError::AlreadyQueued`] — the client is already waiting
    pub fn enqueue(&mut self, player: WaitingPlayer) -> Result<Option<ArenaId>, ArenaError> {
        if let Some(arena_id) = self.player_arenas.get(&player.player_id) {
            return Err(ArenaError::AlreadyInArena(player.player_id, *arena_id));
        }
        if self.is_waiting(player.player_id) {
            return Err(ArenaError::AlreadyQueued(player.player_id));
        }

        tracing::debug!(player_id = %player.player_id, "player waiting for opponent");
        self.waiting.push_back(player);

        // Clients whose connection already went away can't be matched.
        self.waiting.retain(|w| !w.sender.is_closed());

        if self.waiting.len() < 2 {
            return Ok(None);
        }
        let (Some(a), Some(b)) = (self.waiting.pop_front(), self.waiting.pop_front()) else {
            return Ok(None);
        };
        Ok(Some(self.create_arena(a, b)))
    }

    fn create_arena(&mut self, a: WaitingPlayer, b: WaitingPlayer) -> ArenaId {
        let arena_id = ArenaId(NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed));
        let handle = spawn_arena(
            arena_id,
            [
                (Seat::new(a.player_id, a.username.clone()), a.sender.clone()),
                (Seat::new(b.player_id, b.username.clone()), b.sender.clone()),
            ],
            &self.config,
        );

        self.arenas.insert(arena_id, handle.clone());
        self.player_arenas.insert(a.player_id, arena_id);
        self.player_arenas.insert(b.player_id, arena_id);

        tracing::info!(
            %arena_id,
            player_a = %a.username,
            player_b = %b.username,
            "arena created"
        );

        let _ = a.sender.send(Outbound::Matched {
            arena: handle.clone(),
            opponent: b.username,
        });
        let _ = b.sender.send(Outbound::Matched {
            arena: handle,
            opponent: a.username,
        });
        arena_id
    }

    /// Removes a client from the waiting queue. Returns `false` if it
    /// wasn't waiting.
    pub fn cancel(&mut self, player_id: PlayerId) -> bool {
        let before = self.waiting.len();
        self.waiting.retain(|w| w.player_id != player_id);
        let removed = self.waiting.len() != before;
        if removed {
            tracing::debug!(%player_id, "player left waiting queue");
        }
        removed
    }

    /// Unseats a client from its arena.
    ///
    /// Returns `None` if the client wasn't seated anywhere. The caller
    /// must then tell the arena via [`ArenaHandle::leave`], and shut it
    /// down if [`Departure::last_out`] is set.
    pub fn leave(&mut self, player_id: PlayerId) -> Option<Departure> {
        let arena_id = self.player_arenas.remove(&player_id)?;
        let handle = self.arenas.get(&arena_id)?.clone();

        let last_out = !self.player_arenas.values().any(|id| *id == arena_id);
        if last_out {
            self.arenas.remove(&arena_id);
            tracing::info!(%arena_id, "arena released");
        }
        Some(Departure { handle, last_out })
    }

    /// Returns the arena handle for an arena ID.
    pub fn arena(&self, arena_id: ArenaId) -> Option<&ArenaHandle> {
        self.arenas.get(&arena_id)
    }

    /// Returns the arena ID a player is currently seated in, if any.
    pub fn player_arena(&self, player_id: PlayerId) -> Option<ArenaId> {
        self.player_arenas.get(&player_id).copied()
    }

    pub fn is_waiting(&self, player_id: PlayerId) -> bool {
        self.waiting.iter().any(|w| w.player_id == player_id)
    }

    pub fn waiting_len(&self) -> usize {
        self.waiting.len()
    }

    pub fn arena_count(&self) -> usize {
        self.arenas.len()
    }
}

impl Default for Matchmaker {
    fn default() -> Self {
        Self::new(ArenaConfig::default())
    }
}
