//! Action dispatch: maps a request's `action` name to its handler.

use std::collections::HashMap;

use futures_util::future::BoxFuture;
use gladius_protocol::Request;

use crate::battle;
use crate::client::ClientContext;
use crate::server::ServerState;
use crate::GladiusError;

/// An action handler.
///
/// Receives the calling client, the shared server state, the parsed
/// request envelope and the raw frame it came from. Handlers write their
/// own replies through [`ClientContext::send`]. Returning an error ends
/// the connection.
pub type Handler = for<'a> fn(
    &'a mut ClientContext,
    &'a ServerState,
    &'a Request,
    &'a [u8],
) -> BoxFuture<'a, Result<(), GladiusError>>;

/// A fixed table of action handlers, filled in before the server starts
/// accepting connections.
#[derive(Clone)]
pub struct ActionRouter {
    handlers: HashMap<&'static str, Handler>,
}

impl ActionRouter {
    /// Creates a router with no actions.
    pub fn empty() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Creates a router with the battle actions registered.
    pub fn new() -> Self {
        let mut router = Self::empty();
        router.register(battle::CHOOSE_CHARACTER, battle::choose_character);
        router.register(battle::BATTLE_ACTION, battle::battle_action);
        router.register(battle::BATTLE_STATUS, battle::battle_status);
        router.register(battle::FORFEIT, battle::forfeit);
        router
    }

    /// Registers `handler` for `action`, replacing any previous one.
    pub fn register(&mut self, action: &'static str, handler: Handler) -> &mut Self {
        self.handlers.insert(action, handler);
        self
    }

    pub fn contains(&self, action: &str) -> bool {
        self.handlers.contains_key(action)
    }

    /// Registered action names, sorted.
    pub fn actions(&self) -> Vec<&'static str> {
        let mut actions: Vec<_> = self.handlers.keys().copied().collect();
        actions.sort_unstable();
        actions
    }

    /// Runs the handler registered for `action`.
    ///
    /// # Errors
    /// [`GladiusError::UnknownAction`] if nothing is registered under
    /// `action`, otherwise whatever the handler returns.
    pub async fn route(
        &self,
        action: &str,
        ctx: &mut ClientContext,
        state: &ServerState,
        request: &Request,
        raw: &[u8],
    ) -> Result<(), GladiusError> {
        let handler = self
            .handlers
            .get(action)
            .ok_or_else(|| GladiusError::UnknownAction(action.to_string()))?;
        handler(ctx, state, request, raw).await
    }
}

impl Default for ActionRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ActionRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionRouter")
            .field("actions", &self.actions())
            .finish()
    }
}
