//! Arena actor: an isolated Tokio task that owns one battle.
//!
//! Each arena runs in its own task, reached only through an mpsc
//! channel. Commands are applied one at a time, which is what keeps two
//! players acting "at the same moment" from ever seeing a half-updated
//! battle.
//!
//! The actor answers the caller through the command's reply channel and
//! pushes anything the *other* player needs to know through that
//! player's [`PlayerSender`].

use gladius_protocol::{ArenaId, BattleStatus, Combatant, PlayerId, ServerMessage};
use tokio::sync::{mpsc, oneshot};

use crate::{Arena, ArenaConfig, ArenaError, ArenaStatus, Seat};

/// Something pushed to a client's connection handler from outside its
/// own request/response cycle.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// The matchmaker seated this client in a new arena.
    Matched {
        arena: ArenaHandle,
        opponent: String,
    },
    /// A message to write to the client as-is.
    Message(ServerMessage),
}

/// Channel sender for delivering outbound messages to a client.
pub type PlayerSender = mpsc::UnboundedSender<Outbound>;

type Reply<T> = oneshot::Sender<Result<T, ArenaError>>;

/// Commands sent to an arena actor through its channel.
pub(crate) enum ArenaCommand {
    ChooseCombatant {
        player: PlayerId,
        combatant: Combatant,
        reply: Reply<BattleStatus>,
    },
    Status {
        player: PlayerId,
        reply: Reply<BattleStatus>,
    },
    TakeTurn {
        player: PlayerId,
        reply: Reply<BattleStatus>,
    },
    Forfeit {
        player: PlayerId,
        reply: Reply<BattleStatus>,
    },
    Leave {
        player: PlayerId,
        reply: Reply<()>,
    },
    GetInfo {
        reply: oneshot::Sender<ArenaInfo>,
    },
    Shutdown,
}

/// A snapshot of arena metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArenaInfo {
    pub arena_id: ArenaId,
    pub status: ArenaStatus,
    /// Player A then player B.
    pub players: [PlayerId; 2],
    /// Whose turn it is, while in progress.
    pub current_turn: Option<PlayerId>,
    pub turns_taken: u32,
}

/// Handle to a running arena actor.
///
/// Cheap to clone. The matchmaker keeps one per arena and each seated
/// client's connection keeps another.
#[derive(Debug, Clone)]
pub struct ArenaHandle {
    arena_id: ArenaId,
    sender: mpsc::Sender<ArenaCommand>,
}

impl ArenaHandle {
    pub fn arena_id(&self) -> ArenaId {
        self.arena_id
    }

    /// Submits `player`'s combatant. Returns the caller's view of the
    /// battle afterwards; the opponent is told when this starts it.
    pub async fn choose_combatant(
        &self,
        player: PlayerId,
        combatant: Combatant,
    ) -> Result<BattleStatus, ArenaError> {
        self.request(|reply| ArenaCommand::ChooseCombatant {
            player,
            combatant,
            reply,
        })
        .await?
    }

    /// Reads the battle from `player`'s seat.
    pub async fn status(&self, player: PlayerId) -> Result<BattleStatus, ArenaError> {
        self.request(|reply| ArenaCommand::Status { player, reply })
            .await?
    }

    /// Takes `player`'s turn and hands it to the opponent.
    pub async fn take_turn(&self, player: PlayerId) -> Result<BattleStatus, ArenaError> {
        self.request(|reply| ArenaCommand::TakeTurn { player, reply })
            .await?
    }

    /// Ends the battle on `player`'s behalf.
    pub async fn forfeit(&self, player: PlayerId) -> Result<BattleStatus, ArenaError> {
        self.request(|reply| ArenaCommand::Forfeit { player, reply })
            .await?
    }

    /// Removes `player` from the arena, finishing the battle if it was
    /// still running.
    pub async fn leave(&self, player: PlayerId) -> Result<(), ArenaError> {
        self.request(|reply| ArenaCommand::Leave { player, reply })
            .await?
    }

    /// Requests the current arena info.
    pub async fn get_info(&self) -> Result<ArenaInfo, ArenaError> {
        self.request(|reply| ArenaCommand::GetInfo { reply }).await
    }

    /// Tells the arena to shut down.
    pub async fn shutdown(&self) -> Result<(), ArenaError> {
        self.sender
            .send(ArenaCommand::Shutdown)
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> ArenaCommand,
    ) -> Result<T, ArenaError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))?;
        reply_rx
            .await
            .map_err(|_| ArenaError::Unavailable(self.arena_id))
    }
}

/// The internal actor state. Runs inside a Tokio task.
struct ArenaActor {
    arena: Arena,
    /// Outbound channels, indexed by seat. Cleared when a player leaves.
    senders: [Option<PlayerSender>; 2],
    receiver: mpsc::Receiver<ArenaCommand>,
}

impl ArenaActor {
    async fn run(mut self) {
        let arena_id = self.arena.id();
        tracing::info!(%arena_id, "arena actor started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                ArenaCommand::ChooseCombatant {
                    player,
                    combatant,
                    reply,
                } => {
                    let _ = reply.send(self.handle_choose(player, combatant));
                }
                ArenaCommand::Status { player, reply } => {
                    let result = self
                        .arena
                        .seat_of(player)
                        .map(|_| self.arena.status_for(player));
                    let _ = reply.send(result);
                }
                ArenaCommand::TakeTurn { player, reply } => {
                    let _ = reply.send(self.handle_turn(player));
                }
                ArenaCommand::Forfeit { player, reply } => {
                    let _ = reply.send(self.handle_forfeit(player));
                }
                ArenaCommand::Leave { player, reply } => {
                    let _ = reply.send(self.handle_leave(player));
                }
                ArenaCommand::GetInfo { reply } => {
                    let _ = reply.send(self.info());
                }
                ArenaCommand::Shutdown => {
                    tracing::info!(%arena_id, "arena shutting down");
                    break;
                }
            }
        }

        tracing::info!(%arena_id, "arena actor stopped");
    }

    fn handle_choose(
        &mut self,
        player: PlayerId,
        combatant: Combatant,
    ) -> Result<BattleStatus, ArenaError> {
        let name = combatant.name.clone();
        let started = self.arena.set_combatant(player, combatant)?;
        tracing::info!(
            arena_id = %self.arena.id(),
            %player,
            combatant = %name,
            "combatant chosen"
        );

        if started {
            tracing::info!(arena_id = %self.arena.id(), "battle started");
            self.notify_opponent(player);
        }
        Ok(self.arena.status_for(player))
    }

    fn handle_turn(&mut self, player: PlayerId) -> Result<BattleStatus, ArenaError> {
        self.arena.seat_of(player)?;
        match self.arena.status() {
            ArenaStatus::InProgress => {}
            ArenaStatus::Finished => return Err(ArenaError::Finished(self.arena.id())),
            ArenaStatus::AwaitingCombatants => {
                return Err(ArenaError::NotInProgress(self.arena.id()));
            }
        }
        if !self.arena.is_my_turn(player) {
            return Err(ArenaError::NotYourTurn(player));
        }

        let next = self.arena.advance_turn()?;
        tracing::debug!(
            arena_id = %self.arena.id(),
            %player,
            %next,
            turns = self.arena.turns_taken(),
            "turn taken"
        );
        self.notify_opponent(player);
        Ok(self.arena.status_for(player))
    }

    fn handle_forfeit(&mut self, player: PlayerId) -> Result<BattleStatus, ArenaError> {
        self.arena.seat_of(player)?;
        if self.arena.finish() {
            tracing::info!(arena_id = %self.arena.id(), %player, "player forfeited");
            self.notify_opponent(player);
        }
        Ok(self.arena.status_for(player))
    }

    fn handle_leave(&mut self, player: PlayerId) -> Result<(), ArenaError> {
        let seat = self.arena.seat_of(player)?;
        self.senders[seat] = None;
        tracing::info!(arena_id = %self.arena.id(), %player, "player left arena");

        if self.arena.finish() {
            self.notify_opponent(player);
        }
        Ok(())
    }

    /// Sends the opponent of `player` their current view of the battle.
    fn notify_opponent(&self, player: PlayerId) {
        let Ok(opponent) = self.arena.opponent_of(player) else {
            return;
        };
        let opponent = opponent.player_id;
        self.send_to(opponent, self.arena.status_for(opponent).into());
    }

    /// Sends a message to a single player. Silently drops it if the
    /// player has left or their receiver is gone.
    fn send_to(&self, player: PlayerId, msg: ServerMessage) {
        let Ok(seat) = self.arena.seat_of(player) else {
            return;
        };
        if let Some(sender) = &self.senders[seat] {
            let _ = sender.send(Outbound::Message(msg));
        }
    }

    fn info(&self) -> ArenaInfo {
        let [a, b] = self.arena.seats();
        ArenaInfo {
            arena_id: self.arena.id(),
            status: self.arena.status(),
            players: [a.player_id, b.player_id],
            current_turn: self.arena.current_turn(),
            turns_taken: self.arena.turns_taken(),
        }
    }
}

/// Spawns a new arena actor for two seated players and returns a handle
/// to it. The first entry is player A and moves first.
///
/// `config.channel_size` bounds the command channel; when it is full,
/// senders wait.
pub(crate) fn spawn_arena(
    arena_id: ArenaId,
    seats: [(Seat, PlayerSender); 2],
    config: &ArenaConfig,
) -> ArenaHandle {
    let (tx, rx) = mpsc::channel(config.channel_size);
    let [(seat_a, sender_a), (seat_b, sender_b)] = seats;

    let actor = ArenaActor {
        arena: Arena::new(arena_id, seat_a, seat_b),
        senders: [Some(sender_a), Some(sender_b)],
        receiver: rx,
    };

    tokio::spawn(actor.run());

    ArenaHandle {
        arena_id,
        sender: tx,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const A: PlayerId = PlayerId(1);
    const B: PlayerId = PlayerId(2);

    struct Fixture {
        handle: ArenaHandle,
        rx_a: mpsc::UnboundedReceiver<Outbound>,
        rx_b: mpsc::UnboundedReceiver<Outbound>,
    }

    fn spawn() -> Fixture {
        let (tx_a, rx_a) = mpsc::unbounded_channel();
        let (tx_b, rx_b) = mpsc::unbounded_channel();
        let handle = spawn_arena(
            ArenaId(7),
            [
                (Seat::new(A, "alice"), tx_a),
                (Seat::new(B, "bob"), tx_b),
            ],
            &ArenaConfig::default(),
        );
        Fixture { handle, rx_a, rx_b }
    }

    fn expect_status(rx: &mut mpsc::UnboundedReceiver<Outbound>) -> BattleStatus {
        match rx.try_recv() {
            Ok(Outbound::Message(ServerMessage::Status(status))) => status,
            other => panic!("expected a status push, got {other:?}"),
        }
    }

    async fn start(fx: &mut Fixture) {
        fx.handle
            .choose_combatant(A, Combatant::named("Spartacus"))
            .await
            .unwrap();
        fx.handle
            .choose_combatant(B, Combatant::named("Crixus"))
            .await
            .unwrap();
        let _ = expect_status(&mut fx.rx_a);
    }

    #[tokio::test]
    async fn test_choose_combatant_second_choice_notifies_opponent() {
        let mut fx = spawn();

        let first = fx
            .handle
            .choose_combatant(A, Combatant::named("Spartacus"))
            .await
            .unwrap();
        assert!(!first.game_ready);
        assert!(fx.rx_b.try_recv().is_err(), "nothing pushed before start");

        let second = fx
            .handle
            .choose_combatant(B, Combatant::named("Crixus"))
            .await
            .unwrap();
        assert!(second.game_ready);
        assert!(!second.your_turn);

        let pushed = expect_status(&mut fx.rx_a);
        assert!(pushed.game_ready);
        assert!(pushed.your_turn);
    }

    #[tokio::test]
    async fn test_take_turn_out_of_turn_is_rejected() {
        let mut fx = spawn();
        start(&mut fx).await;

        let result = fx.handle.take_turn(B).await;

        assert_eq!(result, Err(ArenaError::NotYourTurn(B)));
        let info = fx.handle.get_info().await.unwrap();
        assert_eq!(info.current_turn, Some(A));
        assert_eq!(info.turns_taken, 0);
    }

    #[tokio::test]
    async fn test_take_turn_hands_over_and_notifies() {
        let mut fx = spawn();
        start(&mut fx).await;

        let status = fx.handle.take_turn(A).await.unwrap();
        assert!(!status.your_turn);
        assert!(expect_status(&mut fx.rx_b).your_turn);

        let status = fx.handle.take_turn(B).await.unwrap();
        assert!(!status.your_turn);
        assert!(expect_status(&mut fx.rx_a).your_turn);
    }

    #[tokio::test]
    async fn test_take_turn_before_start_is_not_in_progress() {
        let fx = spawn();

        let result = fx.handle.take_turn(A).await;

        assert_eq!(result, Err(ArenaError::NotInProgress(ArenaId(7))));
    }

    #[tokio::test]
    async fn test_forfeit_tells_both_game_over() {
        let mut fx = spawn();
        start(&mut fx).await;

        let status = fx.handle.forfeit(A).await.unwrap();

        assert!(status.game_over);
        assert!(expect_status(&mut fx.rx_b).game_over);
        assert_eq!(
            fx.handle.take_turn(A).await,
            Err(ArenaError::Finished(ArenaId(7)))
        );
    }

    #[tokio::test]
    async fn test_leave_notifies_remaining_player_once() {
        let mut fx = spawn();
        start(&mut fx).await;

        fx.handle.leave(A).await.unwrap();

        assert!(expect_status(&mut fx.rx_b).game_over);
        assert!(fx.rx_a.try_recv().is_err(), "leaver gets nothing");

        fx.handle.leave(B).await.unwrap();
        let info = fx.handle.get_info().await.unwrap();
        assert_eq!(info.status, ArenaStatus::Finished);
        assert!(fx.rx_b.try_recv().is_err(), "no second game_over");
    }

    #[tokio::test]
    async fn test_status_for_stranger_is_not_a_member() {
        let fx = spawn();

        let result = fx.handle.status(PlayerId(99)).await;

        assert_eq!(
            result,
            Err(ArenaError::NotAMember(PlayerId(99), ArenaId(7)))
        );
    }

    #[tokio::test]
    async fn test_shutdown_makes_handle_unavailable() {
        let fx = spawn();

        fx.handle.shutdown().await.unwrap();
        tokio::task::yield_now().await;

        let result = fx.handle.status(A).await;
        assert_eq!(result, Err(ArenaError::Unavailable(ArenaId(7))));
    }
}
