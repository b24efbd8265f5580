//! Battle action handlers.
//!
//! Each handler answers the caller through its own outbound queue. When
//! an action changes what the opponent sees, the arena actor pushes the
//! opponent's new status itself.

use futures_util::future::BoxFuture;
use gladius_arena::{ArenaError, ArenaHandle};
use gladius_protocol::{ActionPayload, BattleStatus, Codec, Combatant, ErrorResponse, Request};

use crate::client::ClientContext;
use crate::server::ServerState;
use crate::GladiusError;

pub const CHOOSE_CHARACTER: &str = "choose_character";
pub const BATTLE_ACTION: &str = "battle_action";
pub const BATTLE_STATUS: &str = "battle_status";
pub const FORFEIT: &str = "forfeit";

/// Maps an arena rejection to the reply the client sees.
pub(crate) fn error_response(err: &ArenaError) -> ErrorResponse {
    let code = match err {
        ArenaError::NotAMember(..) => 404,
        _ => 409,
    };
    ErrorResponse {
        code,
        error: err.to_string(),
    }
}

/// Sends the arena's answer, or the error it was rejected with.
fn reply(ctx: &ClientContext, result: Result<BattleStatus, ArenaError>) {
    match result {
        Ok(status) => ctx.send(status),
        Err(err) => {
            tracing::debug!(player_id = %ctx.player_id(), error = %err, "arena rejected action");
            ctx.send(error_response(&err));
        }
    }
}

/// Returns the caller's arena, or replies 404 if it has none.
fn seated(ctx: &ClientContext) -> Option<ArenaHandle> {
    let arena = ctx.arena().cloned();
    if arena.is_none() {
        ctx.send_error(404, "Not in an arena");
    }
    arena
}

/// `choose_character`: submit the caller's combatant.
pub fn choose_character<'a>(
    ctx: &'a mut ClientContext,
    state: &'a ServerState,
    _request: &'a Request,
    raw: &'a [u8],
) -> BoxFuture<'a, Result<(), GladiusError>> {
    Box::pin(async move {
        let combatant = match state.codec.decode::<ActionPayload<Combatant>>(raw) {
            Ok(payload) => payload.data,
            Err(e) => {
                tracing::debug!(player_id = %ctx.player_id(), error = %e, "bad combatant payload");
                ctx.send_error(400, "Invalid combatant");
                return Ok(());
            }
        };
        if combatant.name.trim().is_empty() {
            ctx.send_error(400, "Combatant name is required");
            return Ok(());
        }
        let Some(arena) = seated(ctx) else {
            return Ok(());
        };

        let result = arena
            .choose_combatant(ctx.player_id(), combatant.clone())
            .await;
        if result.is_ok() {
            ctx.remember_combatant(combatant);
        }
        reply(ctx, result);
        Ok(())
    })
}

/// `battle_action`: take the caller's turn.
///
/// The move itself travels in `data` and isn't interpreted here; only
/// whose turn it is matters.
pub fn battle_action<'a>(
    ctx: &'a mut ClientContext,
    _state: &'a ServerState,
    _request: &'a Request,
    _raw: &'a [u8],
) -> BoxFuture<'a, Result<(), GladiusError>> {
    Box::pin(async move {
        let Some(arena) = seated(ctx) else {
            return Ok(());
        };
        let result = arena.take_turn(ctx.player_id()).await;
        reply(ctx, result);
        Ok(())
    })
}

/// `battle_status`: poll the caller's view of the battle.
pub fn battle_status<'a>(
    ctx: &'a mut ClientContext,
    _state: &'a ServerState,
    _request: &'a Request,
    _raw: &'a [u8],
) -> BoxFuture<'a, Result<(), GladiusError>> {
    Box::pin(async move {
        match ctx.arena().cloned() {
            Some(arena) => {
                let result = arena.status(ctx.player_id()).await;
                reply(ctx, result);
            }
            None => ctx.send(BattleStatus::waiting()),
        }
        Ok(())
    })
}

/// `forfeit`: end the caller's battle.
pub fn forfeit<'a>(
    ctx: &'a mut ClientContext,
    _state: &'a ServerState,
    _request: &'a Request,
    _raw: &'a [u8],
) -> BoxFuture<'a, Result<(), GladiusError>> {
    Box::pin(async move {
        let Some(arena) = seated(ctx) else {
            return Ok(());
        };
        let result = arena.forfeit(ctx.player_id()).await;
        reply(ctx, result);
        Ok(())
    })
}
