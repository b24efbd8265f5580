//! Per-connection handler: login, matchmaking and request dispatch.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Read one login line → validate and register the username
//!   2. Send the login response → client is Ready and enters the queue
//!   3. Loop: read requests and dispatch them through the router, while
//!      writing out whatever the arena or the handlers queued
//!   4. Teardown, on every exit path

use std::sync::Arc;
use std::time::Duration;

use gladius_arena::{Outbound, WaitingPlayer};
use gladius_protocol::{
    Codec, LoginRequest, LoginResponse, MatchFound, PlayerId, Request, ServerMessage,
};
use gladius_transport::{Connection, TcpConnection, TransportError};
use tokio::sync::mpsc;

use crate::client::ClientContext;
use crate::server::ServerState;
use crate::GladiusError;

/// Drop guard that releases a client's registry entry and arena seat
/// when the handler exits.
///
/// Runs even if the handler panics. `Drop` is synchronous, so the async
/// cleanup is spawned as a fire-and-forget task.
struct ClientGuard {
    player_id: PlayerId,
    username: String,
    state: Arc<ServerState>,
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let username = std::mem::take(&mut self.username);
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            teardown(&state, player_id, &username).await;
        });
    }
}

/// Leaves the queue or the arena, then frees the username.
async fn teardown(state: &ServerState, player_id: PlayerId, username: &str) {
    let departure = {
        let mut matchmaker = state.matchmaker.lock().await;
        matchmaker.cancel(player_id);
        matchmaker.leave(player_id)
    };

    if let Some(departure) = departure {
        if let Err(e) = departure.handle.leave(player_id).await {
            tracing::debug!(%player_id, error = %e, "arena leave failed");
        }
        if departure.last_out {
            if let Err(e) = departure.handle.shutdown().await {
                tracing::debug!(%player_id, error = %e, "arena shutdown failed");
            }
        }
    }

    if state.registry.lock().await.remove(username, player_id) {
        tracing::info!(%player_id, username, "client disconnected");
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    conn: TcpConnection,
    state: Arc<ServerState>,
) -> Result<(), GladiusError> {
    let conn_id = conn.id();
    tracing::debug!(%conn_id, peer = %conn.peer_addr(), "handling new connection");

    let result = serve(&conn, &state).await;

    if let Err(e) = conn.close().await {
        tracing::debug!(%conn_id, error = %e, "close failed");
    }
    result
}

async fn serve(conn: &TcpConnection, state: &Arc<ServerState>) -> Result<(), GladiusError> {
    let player_id = PlayerId(conn.id().into_inner());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ctx = ClientContext::new(conn.id(), player_id, tx);

    // --- Step 1: Login ---
    let Some(username) = login(conn, state, player_id).await? else {
        return Ok(());
    };

    // Registered: from here on every exit path must release the name.
    let _guard = ClientGuard {
        player_id,
        username: username.clone(),
        state: Arc::clone(state),
    };

    send_message(conn, state, &LoginResponse::accepted().into()).await?;
    tracing::info!(conn_id = %ctx.conn_id(), %player_id, username = %username, "client logged in");
    ctx.logged_in(username.clone());

    // --- Step 2: Matchmaking ---
    state
        .matchmaker
        .lock()
        .await
        .enqueue(WaitingPlayer::new(player_id, username, ctx.sender()))?;

    // --- Step 3: Request loop ---
    // Queued output always goes first: a `Matched` sitting in the queue
    // means the matchmaker has already seated this client, so it must be
    // applied before the next request is routed.
    let idle_timeout = state.config.idle_timeout;
    loop {
        tokio::select! {
            biased;

            Some(outbound) = rx.recv() => {
                deliver(conn, state, &mut ctx, outbound).await?;
            }
            frame = recv_frame(conn, idle_timeout) => {
                let data = match frame {
                    Some(Ok(Some(data))) => data,
                    Some(Ok(None)) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Some(Err(e)) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                    None => {
                        tracing::info!(%player_id, "connection idle, closing");
                        break;
                    }
                };
                while let Ok(outbound) = rx.try_recv() {
                    deliver(conn, state, &mut ctx, outbound).await?;
                }
                dispatch(conn, state, &mut ctx, &data).await?;
            }
        }
    }

    // _guard drops here → teardown fires.
    Ok(())
}

/// Reads the next frame, giving up after `idle_timeout` if one is set.
/// `None` means the timeout expired.
async fn recv_frame(
    conn: &TcpConnection,
    idle_timeout: Option<Duration>,
) -> Option<Result<Option<Vec<u8>>, TransportError>> {
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, conn.recv()).await.ok(),
        None => Some(conn.recv().await),
    }
}

/// Reads the login line and registers the username.
///
/// Returns `Ok(None)` when the connection should close without being
/// registered: no usable login line arrived, or the login was rejected
/// (the rejection has already been sent).
async fn login(
    conn: &TcpConnection,
    state: &ServerState,
    player_id: PlayerId,
) -> Result<Option<String>, GladiusError> {
    let conn_id = conn.id();

    let data = match tokio::time::timeout(state.config.login_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            tracing::debug!(%conn_id, "connection closed before login");
            return Ok(None);
        }
        Ok(Err(e)) => return Err(GladiusError::Transport(e)),
        Err(_) => {
            tracing::info!(%conn_id, "login timed out");
            return Ok(None);
        }
    };

    let request: LoginRequest = match state.codec.decode_frame(&data) {
        Ok(Some(request)) => request,
        Ok(None) => {
            tracing::debug!(%conn_id, "empty login line");
            return Ok(None);
        }
        Err(e) => {
            tracing::warn!(%conn_id, error = %e, "malformed login line");
            return Ok(None);
        }
    };
    let Some(username) = request.username else {
        tracing::warn!(%conn_id, "login without a username");
        return Ok(None);
    };

    // Validation and availability, then the atomic test-and-set. A
    // concurrent login for the same name can slip in between the two.
    let mut outcome = state.registry.lock().await.check(&username);
    if outcome.is_ok() {
        outcome = state
            .registry
            .lock()
            .await
            .register(&username, player_id)
            .map(|_| ());
    }
    if let Err(e) = outcome {
        tracing::info!(%conn_id, username = %username, reason = %e, "login rejected");
        send_message(conn, state, &LoginResponse::rejected(e.client_message()).into()).await?;
        return Ok(None);
    }
    Ok(Some(username))
}

/// Parses one request and routes it.
///
/// A blank line, `null`, or a request without an action is ignored. A
/// malformed line or an unknown action ends the connection.
async fn dispatch(
    conn: &TcpConnection,
    state: &ServerState,
    ctx: &mut ClientContext,
    data: &[u8],
) -> Result<(), GladiusError> {
    let player_id = ctx.player_id();

    let request: Request = match state.codec.decode_frame(data) {
        Ok(Some(request)) => request,
        Ok(None) => return Ok(()),
        Err(e) => {
            tracing::warn!(%player_id, error = %e, "malformed request");
            return Err(e.into());
        }
    };
    let Some(action) = request.action_name() else {
        tracing::debug!(%player_id, "request without action, ignoring");
        return Ok(());
    };

    tracing::debug!(%player_id, action, state = ?ctx.state(), "dispatching request");
    if let Err(e) = state.router.route(action, ctx, state, &request, data).await {
        if let GladiusError::UnknownAction(_) = e {
            tracing::warn!(conn_id = %conn.id(), %player_id, action, "unknown action");
        }
        return Err(e);
    }
    Ok(())
}

/// Writes something the arena or a handler queued for this client.
async fn deliver(
    conn: &TcpConnection,
    state: &ServerState,
    ctx: &mut ClientContext,
    outbound: Outbound,
) -> Result<(), GladiusError> {
    let message = match outbound {
        Outbound::Matched { arena, opponent } => {
            tracing::info!(
                player_id = %ctx.player_id(),
                arena_id = %arena.arena_id(),
                opponent = %opponent,
                "client matched"
            );
            let found = MatchFound {
                arena: arena.arena_id(),
                opponent,
            };
            ctx.seat(arena);
            found.into()
        }
        Outbound::Message(message) => {
            if matches!(&message, ServerMessage::Status(status) if status.game_over) {
                ctx.finish();
            }
            message
        }
    };
    send_message(conn, state, &message).await
}

async fn send_message(
    conn: &TcpConnection,
    state: &ServerState,
    message: &ServerMessage,
) -> Result<(), GladiusError> {
    let bytes = state.codec.encode(message)?;
    conn.send(&bytes).await?;
    Ok(())
}
