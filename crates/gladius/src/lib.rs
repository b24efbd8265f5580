//! # Gladius
//!
//! A turn-based, two-player battle server.
//!
//! Clients connect over TCP and speak newline-delimited JSON. Each one
//! logs in with a username, is paired with the next waiting client into
//! an arena, picks a combatant, and then the two take turns until the
//! battle ends.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use gladius::prelude::*;
//!
//! # async fn run() -> Result<(), GladiusError> {
//! let server = GladiusServer::builder()
//!     .bind("127.0.0.1:7777")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```
//!
//! ## Extending
//!
//! Requests are `{ "action": <name>, "data": <payload> }`. New actions are
//! added by registering a [`Handler`] on an [`ActionRouter`] and passing it
//! to [`GladiusServerBuilder::router`].

mod battle;
mod client;
mod config;
mod error;
mod handler;
mod router;
mod server;

pub use client::{ClientContext, ClientState};
pub use config::ServerConfig;
pub use error::GladiusError;
pub use router::{ActionRouter, Handler};
pub use server::{GladiusServer, GladiusServerBuilder, ServerState};

pub use gladius_arena as arena;
pub use gladius_protocol as protocol;
pub use gladius_session as session;
pub use gladius_transport as transport;

/// Everything needed to configure and run a server.
pub mod prelude {
    pub use crate::{
        ActionRouter, ClientContext, GladiusError, GladiusServer, GladiusServerBuilder, Handler,
        ServerConfig, ServerState,
    };
    pub use gladius_arena::ArenaConfig;
    pub use gladius_protocol::{BattleStatus, Combatant, ErrorResponse, Request, ServerMessage};
}
