//! Per-connection client state.

use gladius_arena::{ArenaHandle, Outbound, PlayerSender};
use gladius_protocol::{Combatant, ErrorResponse, PlayerId, ServerMessage};
use gladius_transport::ConnectionId;

/// Where a connection is in its lifecycle.
///
/// ```text
/// Unauthenticated → Ready → Matched → Finished
/// ```
///
/// A disconnect can happen from any state and always runs teardown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Socket open, login not yet accepted.
    Unauthenticated,
    /// Logged in and waiting for an opponent.
    Ready,
    /// Seated in an arena.
    Matched,
    /// The arena's battle is over.
    Finished,
}

/// Everything a connection knows about its own client.
///
/// Owned by the connection task and lent to action handlers. The arena
/// handle is a lookup reference: the arena lives on in its own task and
/// the matchmaker decides when it goes away.
#[derive(Debug)]
pub struct ClientContext {
    conn_id: ConnectionId,
    player_id: PlayerId,
    username: Option<String>,
    state: ClientState,
    combatant: Option<Combatant>,
    arena: Option<ArenaHandle>,
    outbound: PlayerSender,
}

impl ClientContext {
    /// Creates the context for a freshly accepted connection. Messages
    /// queued with [`send`](Self::send) go out through `outbound`.
    pub fn new(conn_id: ConnectionId, player_id: PlayerId, outbound: PlayerSender) -> Self {
        Self {
            conn_id,
            player_id,
            username: None,
            state: ClientState::Unauthenticated,
            combatant: None,
            arena: None,
            outbound,
        }
    }

    pub fn conn_id(&self) -> ConnectionId {
        self.conn_id
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// The username, once login has been accepted.
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    /// The combatant this client chose, once the arena accepted it.
    pub fn combatant(&self) -> Option<&Combatant> {
        self.combatant.as_ref()
    }

    /// The arena this client is seated in, if any.
    pub fn arena(&self) -> Option<&ArenaHandle> {
        self.arena.as_ref()
    }

    /// A sender that feeds this client's outbound queue.
    pub fn sender(&self) -> PlayerSender {
        self.outbound.clone()
    }

    /// Queues a message for this client. Messages go out in the order
    /// they were queued, interleaved with anything the arena pushes.
    pub fn send(&self, message: impl Into<ServerMessage>) {
        let _ = self.outbound.send(Outbound::Message(message.into()));
    }

    /// Queues an error reply.
    pub fn send_error(&self, code: u16, error: impl Into<String>) {
        self.send(ErrorResponse {
            code,
            error: error.into(),
        });
    }

    pub(crate) fn logged_in(&mut self, username: String) {
        self.username = Some(username);
        self.state = ClientState::Ready;
    }

    pub(crate) fn seat(&mut self, arena: ArenaHandle) {
        self.arena = Some(arena);
        self.state = ClientState::Matched;
    }

    pub(crate) fn remember_combatant(&mut self, combatant: Combatant) {
        self.combatant = Some(combatant);
    }

    pub(crate) fn finish(&mut self) {
        if self.state == ClientState::Matched {
            self.state = ClientState::Finished;
        }
    }
}
