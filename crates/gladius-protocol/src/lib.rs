//! Wire protocol for Gladius.
//!
//! This crate defines what clients and the server say to each other:
//!
//! - **Types** ([`LoginRequest`], [`Request`], [`BattleStatus`], etc.) —
//!   the messages that travel on the wire, one JSON document per line.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how those messages
//!   are converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (framed bytes) and the
//! session/arena layers. It doesn't know about sockets or arenas — it
//! only knows how to serialize and deserialize messages.
//!
//! ```text
//! Transport (lines) → Protocol (messages) → Session / Arena
//! ```

mod codec;
mod error;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use types::{
    ActionPayload, ArenaId, BattleStatus, Combatant, ErrorResponse,
    LoginRequest, LoginResponse, MatchFound, PlayerId, Request,
    ServerMessage,
};
