//! Unified error type for the Gladius server.

use gladius_arena::ArenaError;
use gladius_protocol::ProtocolError;
use gladius_session::SessionError;
use gladius_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each wrapping variant lets `?` convert
/// sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum GladiusError {
    /// A transport-level error (accept, send, recv, framing).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A login or registry error.
    #[error(transparent)]
    Session(#[from] SessionError),

    /// A matchmaking or arena error.
    #[error(transparent)]
    Arena(#[from] ArenaError),

    /// No handler is registered for the requested action. Ends the
    /// connection.
    #[error("unknown action: {0}")]
    UnknownAction(String),
}
