//! Room actor: an isolated Tokio task that owns one [`World`].
//!
//! The actor is the only code that touches its world. Commands arrive on
//! an mpsc channel and are raced against the tick scheduler, so player
//! actions and simulation ticks never interleave halfway.

use std::collections::HashMap;

use craftroom_protocol::{PlayerId, Recipient, RoomId, ServerMessage};
use craftroom_tick::{Tick, TickScheduler};
use craftroom_world::{
    ActionError, ArmorSlot, BlockChange, ItemKind, Loadout, Phase, Player, RoomSnapshot, ToolKind,
    World, WorldError,
};
use tokio::sync::{mpsc, oneshot};

use crate::{Action, RoomConfig, RoomError};

/// Channel sender for delivering server messages to a player's connection.
pub type PlayerSender = mpsc::UnboundedSender<ServerMessage>;

type Outbound = Vec<(Recipient, ServerMessage)>;

pub(crate) enum RoomCommand {
    Join {
        player_id: PlayerId,
        username: String,
        sender: PlayerSender,
        reply: oneshot::Sender<Result<Player, RoomError>>,
    },

    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<Departure, RoomError>>,
    },

    /// Fire-and-forget; results go out through the player senders.
    Act { player_id: PlayerId, action: Action },

    Snapshot {
        reply: oneshot::Sender<RoomSnapshot>,
    },

    GetInfo {
        reply: oneshot::Sender<RoomInfo>,
    },

    Shutdown,
}

/// Room metadata, without the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomInfo {
    pub room_id: RoomId,
    pub player_count: usize,
    pub monster_count: usize,
    pub phase: Phase,
    /// Number of the last simulation tick.
    pub tick: u64,
}

/// A player who left, as they were at the moment they left.
#[derive(Debug, Clone)]
pub struct Departure {
    pub player: Player,
    /// True when nobody is left in the room.
    pub room_empty: bool,
}

/// Handle to a running room actor.
///
/// Cheap to clone; the [`RoomManager`](crate::RoomManager) keeps one per
/// room and connection handlers cache a copy for in-room actions.
#[derive(Debug, Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl std::fmt::Debug for RoomCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Join { player_id, .. } => write!(f, "Join({player_id})"),
            Self::Leave { player_id, .. } => write!(f, "Leave({player_id})"),
            Self::Act { player_id, action } => write!(f, "Act({player_id}, {action:?})"),
            Self::Snapshot { .. } => write!(f, "Snapshot"),
            Self::GetInfo { .. } => write!(f, "GetInfo"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

impl RoomHandle {
    /// Spawns an actor around `world` and returns its handle.
    pub fn spawn(world: World, config: &RoomConfig) -> Self {
        let (tx, rx) = mpsc::channel(config.channel_size.max(1));
        let room_id = world.id().clone();
        let scheduler = TickScheduler::new(config.tick.clone());
        let idle_limit = scheduler.ticks_in(config.idle_timeout);

        let actor = RoomActor {
            room_id: room_id.clone(),
            world,
            senders: HashMap::new(),
            scheduler,
            idle_limit,
            idle_ticks: 0,
            receiver: rx,
        };
        tokio::spawn(actor.run());

        Self {
            room_id,
            sender: tx,
        }
    }

    pub fn room_id(&self) -> &RoomId {
        &self.room_id
    }

    /// True once the actor has stopped.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Adds a player. Everyone in the room, the newcomer included, gets a
    /// `player-joined` with the full room snapshot.
    pub async fn join(
        &self,
        player_id: PlayerId,
        username: impl Into<String>,
        sender: PlayerSender,
    ) -> Result<Player, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Join {
            player_id,
            username: username.into(),
            sender,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn leave(&self, player_id: PlayerId) -> Result<Departure, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Leave {
            player_id,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    pub async fn act(&self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        self.send(RoomCommand::Act { player_id, action }).await
    }

    pub async fn snapshot(&self) -> Result<RoomSnapshot, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::Snapshot { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(RoomCommand::GetInfo { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| self.unavailable())
    }

    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, cmd: RoomCommand) -> Result<(), RoomError> {
        self.sender.send(cmd).await.map_err(|_| self.unavailable())
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.room_id.clone())
    }
}

// ---------------------------------------------------------------------------
// Actor
// ---------------------------------------------------------------------------

struct RoomActor {
    room_id: RoomId,
    world: World,
    /// Per-player outbound channels, one for every player in the world.
    senders: HashMap<PlayerId, PlayerSender>,
    scheduler: TickScheduler,
    /// Empty ticks before the room closes itself. Zero never closes.
    idle_limit: u64,
    idle_ticks: u64,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(
            room_id = %self.room_id,
            rate_hz = self.scheduler.rate_hz(),
            "room actor started"
        );

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    match self.handle_command(cmd) {
                        Ok(true) => {}
                        Ok(false) => break,
                        Err(err) => {
                            self.close(&err);
                            break;
                        }
                    }
                }
                tick = self.scheduler.wait_for_tick() => {
                    let result = self.handle_tick(tick);
                    self.scheduler.record_tick_end();
                    if let Err(err) = result {
                        self.close(&err);
                        break;
                    }
                    if self.idle_expired() {
                        tracing::info!(room_id = %self.room_id, "closing idle room");
                        break;
                    }
                }
            }
        }

        tracing::info!(
            room_id = %self.room_id,
            ticks = self.scheduler.tick_count(),
            "room actor stopped"
        );
    }

    /// Returns `Ok(false)` when the actor should stop.
    fn handle_command(&mut self, cmd: RoomCommand) -> Result<bool, WorldError> {
        match cmd {
            RoomCommand::Join {
                player_id,
                username,
                sender,
                reply,
            } => {
                let result = self.handle_join(player_id, &username, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let result = self.handle_leave(player_id);
                let _ = reply.send(result);
            }
            RoomCommand::Act { player_id, action } => {
                self.handle_action(player_id, action)?;
            }
            RoomCommand::Snapshot { reply } => {
                let _ = reply.send(self.world.snapshot());
            }
            RoomCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            RoomCommand::Shutdown => {
                tracing::info!(room_id = %self.room_id, "room shutting down");
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn handle_join(
        &mut self,
        player_id: PlayerId,
        username: &str,
        sender: PlayerSender,
    ) -> Result<Player, RoomError> {
        if self.senders.contains_key(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, self.room_id.clone()));
        }

        let player = self.world.add_player(player_id, username);
        self.senders.insert(player_id, sender);
        self.idle_ticks = 0;
        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            username = %player.username,
            players = self.senders.len(),
            "player joined"
        );

        let room = self.world.snapshot();
        self.dispatch(vec![(
            Recipient::All,
            ServerMessage::PlayerJoined {
                player: player.clone(),
                room,
            },
        )]);
        Ok(player)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<Departure, RoomError> {
        let player = self
            .world
            .remove_player(player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        self.senders.remove(&player_id);

        tracing::info!(
            room_id = %self.room_id,
            %player_id,
            players = self.senders.len(),
            "player left"
        );

        self.dispatch(vec![(
            Recipient::All,
            ServerMessage::PlayerLeft {
                player_id,
                username: player.username.clone(),
            },
        )]);
        Ok(Departure {
            player,
            room_empty: self.world.is_empty(),
        })
    }

    fn handle_action(&mut self, player_id: PlayerId, action: Action) -> Result<(), WorldError> {
        if !self.senders.contains_key(&player_id) {
            tracing::warn!(
                room_id = %self.room_id,
                %player_id,
                "action from non-member, ignoring"
            );
            return Ok(());
        }

        let outbound = self.apply(player_id, action);
        self.world.check_invariants()?;
        self.dispatch(outbound);
        Ok(())
    }

    fn apply(&mut self, player_id: PlayerId, action: Action) -> Outbound {
        let me = Recipient::Player(player_id);
        match action {
            Action::RequestMap => vec![(me, self.map_data())],

            Action::Move(direction) => match self.world.move_player(player_id, direction) {
                Ok(moved) if moved.moved => vec![(
                    Recipient::All,
                    ServerMessage::PlayerMoved {
                        player_id,
                        position: moved.position,
                        direction: moved.direction,
                    },
                )],
                Ok(_) => Vec::new(),
                Err(err) => {
                    tracing::debug!(room_id = %self.room_id, %player_id, error = %err, "move rejected");
                    Vec::new()
                }
            },

            Action::Mine { target, tool } => {
                let result = tool
                    .as_deref()
                    .unwrap_or_default()
                    .parse::<ToolKind>()
                    .and_then(|tool| self.world.mine(player_id, target, tool));
                match result {
                    Ok(change) => vec![(Recipient::All, block_updated(change))],
                    Err(err) => self.reject(player_id, &err, |message| {
                        ServerMessage::MiningError { message }
                    }),
                }
            }

            Action::Place { target, block } => {
                let result = block
                    .parse::<ItemKind>()
                    .and_then(|item| self.world.place(player_id, target, item));
                match result {
                    Ok(change) => vec![(Recipient::All, block_updated(change))],
                    Err(err) => self.reject(player_id, &err, |message| {
                        ServerMessage::PlacementError { message }
                    }),
                }
            }

            Action::Trade { item } => {
                let result = item
                    .parse::<ItemKind>()
                    .and_then(|item| self.world.trade(player_id, item));
                match result {
                    Ok(traded) => vec![(
                        me,
                        ServerMessage::TradeSuccess {
                            new_inventory: traded.inventory,
                            acquired: traded.acquired,
                        },
                    )],
                    Err(err) => self.reject(player_id, &err, |message| {
                        ServerMessage::TradeError { message }
                    }),
                }
            }

            Action::Equip { item, slot } => {
                let result = slot.parse::<ArmorSlot>().and_then(|slot| {
                    let item = item.parse::<ItemKind>()?;
                    self.world.equip(player_id, slot, item)
                });
                self.loadout_changed(player_id, result)
            }

            Action::Unequip { slot } => {
                let result = slot
                    .parse::<ArmorSlot>()
                    .and_then(|slot| self.world.unequip(player_id, slot));
                self.loadout_changed(player_id, result)
            }

            Action::Attack(monster_id) => match self.world.attack(player_id, monster_id) {
                Ok(attacked) => {
                    if attacked.defeated {
                        tracing::debug!(room_id = %self.room_id, %player_id, %monster_id, "monster defeated");
                    }
                    vec![(
                        Recipient::All,
                        ServerMessage::MonstersUpdated {
                            monsters: self.world.monster_list(),
                        },
                    )]
                }
                Err(err) => self.reject(player_id, &err, action_error),
            },

            Action::SelectSlot(slot) => match self.world.select_slot(player_id, slot) {
                Ok(selected_slot) => vec![(
                    Recipient::All,
                    ServerMessage::PlayerHotbarChanged {
                        player_id,
                        selected_slot,
                    },
                )],
                Err(err) => self.reject(player_id, &err, action_error),
            },

            Action::Restart => match self.world.restart(player_id) {
                Ok(player) => {
                    let moved = ServerMessage::PlayerMoved {
                        player_id,
                        position: player.position,
                        direction: player.facing,
                    };
                    vec![
                        (me, ServerMessage::PlayerRestarted { player }),
                        (Recipient::All, moved),
                    ]
                }
                Err(err) => self.reject(player_id, &err, action_error),
            },
        }
    }

    fn loadout_changed(
        &self,
        player_id: PlayerId,
        result: Result<Loadout, ActionError>,
    ) -> Outbound {
        match result {
            Ok(updated) => vec![(
                Recipient::All,
                ServerMessage::PlayerUpdated { player_id, updated },
            )],
            Err(err) => self.reject(player_id, &err, action_error),
        }
    }

    fn reject(
        &self,
        player_id: PlayerId,
        err: &ActionError,
        wrap: fn(String) -> ServerMessage,
    ) -> Outbound {
        tracing::debug!(
            room_id = %self.room_id,
            %player_id,
            error = %err,
            "action rejected"
        );
        vec![(Recipient::Player(player_id), wrap(err.to_string()))]
    }

    fn handle_tick(&mut self, tick: Tick) -> Result<(), WorldError> {
        let report = self.world.tick(tick.number);
        self.world.check_invariants()?;

        let mut outbound = Outbound::new();
        if let Some(phase) = report.phase {
            tracing::info!(
                room_id = %self.room_id,
                tick = tick.number,
                %phase,
                monsters = self.world.monsters().count(),
                "phase changed"
            );
            outbound.push((Recipient::All, ServerMessage::PhaseChanged { phase }));
        }
        if report.monsters_changed {
            outbound.push((
                Recipient::All,
                ServerMessage::MonstersUpdated {
                    monsters: self.world.monster_list(),
                },
            ));
        }
        for attack in report.attacks {
            outbound.push((
                Recipient::All,
                ServerMessage::MonsterAttacking {
                    monster_id: attack.monster_id,
                    player_id: attack.player_id,
                },
            ));
            outbound.push((
                Recipient::All,
                ServerMessage::PlayerDamaged {
                    player_id: attack.player_id,
                    new_health: attack.health,
                },
            ));
            if attack.killed {
                outbound.push((
                    Recipient::All,
                    ServerMessage::PlayerDied {
                        player_id: attack.player_id,
                    },
                ));
            }
        }
        self.dispatch(outbound);

        if self.world.is_empty() {
            self.idle_ticks += 1;
        } else {
            self.idle_ticks = 0;
        }
        Ok(())
    }

    fn idle_expired(&self) -> bool {
        self.idle_limit > 0 && self.idle_ticks >= self.idle_limit
    }

    /// Tells every member the room is gone. The caller stops the actor.
    fn close(&self, err: &WorldError) {
        tracing::error!(room_id = %self.room_id, error = %err, "room state corrupted, closing");
        self.dispatch(vec![(
            Recipient::All,
            ServerMessage::RoomClosed {
                reason: err.to_string(),
            },
        )]);
    }

    fn map_data(&self) -> ServerMessage {
        ServerMessage::MapData {
            map: self.world.map().clone(),
            players: self.world.player_list(),
            monsters: self.world.monster_list(),
            phase: self.world.phase(),
        }
    }

    fn dispatch(&self, outbound: Outbound) {
        for (recipient, msg) in outbound {
            match recipient {
                Recipient::All => {
                    for sender in self.senders.values() {
                        let _ = sender.send(msg.clone());
                    }
                }
                Recipient::Player(player_id) => self.send_to(player_id, msg),
            }
        }
    }

    /// Drops the message if the player's connection is gone.
    fn send_to(&self, player_id: PlayerId, msg: ServerMessage) {
        if let Some(sender) = self.senders.get(&player_id) {
            let _ = sender.send(msg);
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            room_id: self.room_id.clone(),
            player_count: self.world.player_count(),
            monster_count: self.world.monsters().count(),
            phase: self.world.phase(),
            tick: self.scheduler.tick_count(),
        }
    }
}

fn block_updated(change: BlockChange) -> ServerMessage {
    ServerMessage::BlockUpdated {
        x: change.position.x,
        y: change.position.y,
        block: change.cell,
        player_id: change.player_id,
        new_inventory: change.inventory,
    }
}

fn action_error(message: String) -> ServerMessage {
    ServerMessage::ActionError { message }
}
