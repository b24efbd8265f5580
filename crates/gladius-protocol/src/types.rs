//! Core protocol types for the Gladius wire format.
//!
//! Every type here travels "on the wire": it is serialized to one JSON
//! line, sent over the socket, and deserialized on the other side.
//!
//! Client → server:
//! - [`LoginRequest`] — the very first line of every connection.
//! - [`Request`] — every line after login: `{ "action": ..., "data": ... }`.
//!
//! Server → client (see [`ServerMessage`]):
//! - [`LoginResponse`], [`MatchFound`], [`BattleStatus`], [`ErrorResponse`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// Server-assigned identifier for one connected client.
///
/// Derived from the connection's id, so it is unique per socket even when
/// two sockets (one after the other) log in with the same username.
///
/// `#[serde(transparent)]` makes `PlayerId(42)` serialize as plain `42`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// Identifier for one two-player battle, generated at pairing time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArenaId(pub u64);

impl fmt::Display for ArenaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "A-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

/// Client → Server: the first line on a new connection.
///
/// `username` is optional at the type level so a login line without it
/// still parses; the handler closes such connections without answering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub username: Option<String>,
}

/// Server → Client: the one and only answer to a [`LoginRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub success: bool,
    /// Human-readable failure reason; always `null` on success.
    pub message: Option<String>,
}

impl LoginResponse {
    /// A successful login.
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    /// A rejected login with the reason shown to the user.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(reason.into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Client → Server: the generic request envelope.
///
/// On the wire this is `{ "action": "choose_character", "data": {...} }`.
/// Only the action name is parsed here; the shape of `data` depends on the
/// action, so each handler re-reads the raw frame as an
/// [`ActionPayload`] of its own payload type. Unknown fields (including
/// `data`) are ignored by serde.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    #[serde(default)]
    pub action: Option<String>,
}

impl Request {
    /// Returns the action name, treating a blank one as absent.
    pub fn action_name(&self) -> Option<&str> {
        self.action
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// The `data` part of a request, typed for one particular action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPayload<T> {
    pub data: T,
}

/// A combatant (gladiator) chosen by a player before the battle starts.
///
/// The server never interprets `stats`; combat maths happens elsewhere.
/// It only requires a non-empty `name` and keeps the value unchanged once
/// submitted to an arena.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Combatant {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub stats: BTreeMap<String, i64>,
}

impl Combatant {
    /// Creates a combatant with no stats.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            stats: BTreeMap::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Server messages
// ---------------------------------------------------------------------------

/// Server → Client: you have been paired with an opponent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchFound {
    pub arena: ArenaId,
    pub opponent: String,
}

/// Server → Client: the state of the caller's battle, from their seat.
///
/// The base shape is `{ "game_ready": bool, "your_turn": bool }`.
/// `game_over` is only written once the battle has ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleStatus {
    pub game_ready: bool,
    pub your_turn: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub game_over: bool,
}

impl BattleStatus {
    /// Status of a player whose battle hasn't started.
    pub fn waiting() -> Self {
        Self::default()
    }
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Server → Client: a request was understood but could not be honoured.
///
/// `code` follows HTTP conventions: 400 bad payload, 404 not seated,
/// 409 conflicts with the arena's state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: u16,
    pub error: String,
}

/// Everything the server may write to a client after the socket opens.
///
/// `#[serde(untagged)]` writes the inner struct as-is, so clients see
/// exactly the shapes above with no wrapper object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessage {
    Login(LoginResponse),
    Matched(MatchFound),
    Status(BattleStatus),
    Error(ErrorResponse),
}

impl From<LoginResponse> for ServerMessage {
    fn from(value: LoginResponse) -> Self {
        Self::Login(value)
    }
}

impl From<MatchFound> for ServerMessage {
    fn from(value: MatchFound) -> Self {
        Self::Matched(value)
    }
}

impl From<BattleStatus> for ServerMessage {
    fn from(value: BattleStatus) -> Self {
        Self::Status(value)
    }
}

impl From<ErrorResponse> for ServerMessage {
    fn from(value: ErrorResponse) -> Self {
        Self::Error(value)
    }
}

// =========================================================================
// Tests
// =========================================================================
