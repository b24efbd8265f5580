//! `GladiusServer` builder and accept loop.
//!
//! This ties the layers together: transport → protocol → session → arena.

use std::sync::Arc;

use gladius_arena::{ArenaConfig, Matchmaker};
use gladius_protocol::JsonCodec;
use gladius_session::ClientRegistry;
use gladius_transport::{TcpTransport, Transport};
use tokio::sync::Mutex;

use crate::handler::handle_connection;
use crate::{ActionRouter, GladiusError, ServerConfig};

/// Process-wide state shared by every connection task.
///
/// Created once when the server is built and dropped with it. Each
/// mutex is its own critical section: the registry lock covers username
/// check-and-set, the matchmaker lock covers enqueue-and-pair. Arenas
/// are not in here at all; each one is guarded by its own actor.
pub struct ServerState {
    pub(crate) registry: Mutex<ClientRegistry>,
    pub(crate) matchmaker: Mutex<Matchmaker>,
    pub(crate) router: ActionRouter,
    pub(crate) codec: JsonCodec,
    pub(crate) config: ServerConfig,
}

impl ServerState {
    /// Creates fresh state with the default battle actions.
    pub fn new(config: ServerConfig, arena_config: ArenaConfig) -> Self {
        Self::with_router(config, arena_config, ActionRouter::new())
    }

    pub fn with_router(
        config: ServerConfig,
        arena_config: ArenaConfig,
        router: ActionRouter,
    ) -> Self {
        Self {
            registry: Mutex::new(ClientRegistry::new()),
            matchmaker: Mutex::new(Matchmaker::new(arena_config)),
            router,
            codec: JsonCodec,
            config,
        }
    }

    /// The connected-client registry.
    pub fn registry(&self) -> &Mutex<ClientRegistry> {
        &self.registry
    }

    /// The waiting queue and arena index.
    pub fn matchmaker(&self) -> &Mutex<Matchmaker> {
        &self.matchmaker
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Builder for configuring and starting a Gladius server.
///
/// # Example
///
/// ```rust,no_run
/// use gladius::prelude::*;
///
/// # async fn run() -> Result<(), GladiusError> {
/// let server = GladiusServer::builder()
///     .bind("0.0.0.0:7777")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct GladiusServerBuilder {
    config: ServerConfig,
    arena_config: ArenaConfig,
    router: ActionRouter,
}

impl GladiusServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            config: ServerConfig::default(),
            arena_config: ArenaConfig::default(),
            router: ActionRouter::new(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.config.bind_addr = addr.to_string();
        self
    }

    /// Replaces the whole server configuration.
    pub fn config(mut self, config: ServerConfig) -> Self {
        self.config = config;
        self
    }

    /// Sets the configuration used for every new arena.
    pub fn arena_config(mut self, config: ArenaConfig) -> Self {
        self.arena_config = config;
        self
    }

    /// Replaces the action table. [`ActionRouter::new`] is the default.
    pub fn router(mut self, router: ActionRouter) -> Self {
        self.router = router;
        self
    }

    /// Binds the listener and returns a server ready to [`run`](GladiusServer::run).
    pub async fn build(self) -> Result<GladiusServer, GladiusError> {
        let transport = TcpTransport::bind(&self.config.bind_addr).await?;
        let state = Arc::new(ServerState::with_router(
            self.config,
            self.arena_config,
            self.router,
        ));
        Ok(GladiusServer { transport, state })
    }
}

impl Default for GladiusServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Gladius server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct GladiusServer {
    transport: TcpTransport,
    state: Arc<ServerState>,
}

impl GladiusServer {
    /// Creates a new builder.
    pub fn builder() -> GladiusServerBuilder {
        GladiusServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns the state shared with every connection.
    pub fn state(&self) -> Arc<ServerState> {
        Arc::clone(&self.state)
    }

    /// Runs the accept loop, spawning one handler task per connection.
    /// Runs until the future is dropped.
    pub async fn run(mut self) -> Result<(), GladiusError> {
        tracing::info!(addr = ?self.local_addr().ok(), "Gladius server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
