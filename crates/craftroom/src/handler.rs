//! Per-connection handler: decoding, gateway commands and action routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Derive the `PlayerId` from the connection and open a session
//!   2. Split the connection; a writer task drains the player's outbound
//!      channel into the sink and keeps the peer pinged
//!   3. Loop: decode frames → room lifecycle and ranking here, everything
//!      else to the cached room handle
//!   4. On exit, leave the room, save the score and close the session

use std::sync::Arc;
use std::time::Duration;

use craftroom_protocol::{ClientMessage, Codec, PlayerId, RoomId, ServerMessage};
use craftroom_room::{Action, PlayerSender, RoomError, RoomHandle};
use craftroom_session::PlayerStore;
use craftroom_transport::{Connection, Frame, FrameSink, FrameSource, TransportError};
use tokio::sync::mpsc;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::CraftroomError;
use crate::server::ServerState;

/// Keepalive pings sent per idle window.
const KEEPALIVE_PER_WINDOW: u32 = 3;

/// Drop guard that closes a player's session when the handler exits.
///
/// Runs even if the handler panics. Since `Drop` is synchronous, the async
/// cleanup is spawned.
struct SessionGuard<S: PlayerStore, C: Codec> {
    player_id: PlayerId,
    state: Arc<ServerState<S, C>>,
}

impl<S: PlayerStore, C: Codec> Drop for SessionGuard<S, C> {
    fn drop(&mut self) {
        let player_id = self.player_id;
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            depart(&state, player_id).await;
            let _ = state.sessions.lock().await.disconnect(player_id);
        });
    }
}

/// Per-connection view of the player's room.
struct Membership {
    player_id: PlayerId,
    sender: PlayerSender,
    room: Option<RoomHandle>,
}

impl Membership {
    fn reply(&self, msg: ServerMessage) {
        let _ = self.sender.send(msg);
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<Conn, S, C>(
    conn: Conn,
    state: Arc<ServerState<S, C>>,
) -> Result<(), CraftroomError>
where
    Conn: Connection,
    S: PlayerStore,
    C: Codec,
{
    let conn_id = conn.id();
    let player_id = PlayerId(conn_id.into_inner());
    tracing::debug!(%conn_id, %player_id, "handling new connection");

    state.sessions.lock().await.create(player_id)?;
    let _guard = SessionGuard {
        player_id,
        state: Arc::clone(&state),
    };

    let (sink, mut source) = conn.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_frames(sink, rx, Arc::clone(&state)));

    let mut membership = Membership {
        player_id,
        sender: tx,
        room: None,
    };

    loop {
        let received = match state.config.idle_timeout {
            Some(limit) => match recv_until_idle(&mut source, limit).await {
                Some(result) => result,
                None => {
                    tracing::info!(%player_id, "connection timed out");
                    break;
                }
            },
            None => source.recv().await,
        };
        let data = match received {
            Ok(Some(data)) => data,
            Ok(None) => {
                tracing::info!(%player_id, "connection closed cleanly");
                break;
            }
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "recv error");
                break;
            }
        };

        let msg: ClientMessage = match state.codec.decode(&data) {
            Ok(msg) => msg,
            Err(e) => {
                tracing::debug!(%player_id, error = %e, "failed to decode message");
                membership.reply(ServerMessage::InvalidMessage {
                    message: e.to_string(),
                });
                continue;
            }
        };

        match Action::try_from(msg) {
            Ok(action) => route_action(&state, &mut membership, action).await,
            Err(msg) => handle_gateway_message(&state, &mut membership, msg).await,
        }
    }

    // Leave before the writer is awaited: the room holds a clone of the
    // sender until then.
    if membership.room.take().is_some() {
        depart(&state, player_id).await;
    }
    drop(membership);
    let _ = writer.await;
    Ok(())
}

/// Next data frame, or `None` once the peer has sent nothing at all, pings
/// and pongs included, for `limit`.
async fn recv_until_idle<F: FrameSource>(
    source: &mut F,
    limit: Duration,
) -> Option<Result<Option<Vec<u8>>, TransportError>> {
    loop {
        let deadline = source.last_activity() + limit;
        match tokio::time::timeout_at(deadline, source.recv()).await {
            Ok(result) => return Some(result),
            // A control frame arrived while the timer ran.
            Err(_) if source.last_activity() + limit > Instant::now() => continue,
            Err(_) => return None,
        }
    }
}

/// Encodes outbound messages and writes them until every sender is gone.
///
/// With an idle limit, also pings the peer a few times per window so a
/// quiet but connected client answers with pongs.
async fn write_frames<K, S, C>(
    mut sink: K,
    mut rx: mpsc::UnboundedReceiver<ServerMessage>,
    state: Arc<ServerState<S, C>>,
) where
    K: FrameSink,
    S: PlayerStore,
    C: Codec,
{
    let mut keepalive = state
        .config
        .idle_timeout
        .map(|limit| limit / KEEPALIVE_PER_WINDOW)
        .filter(|period| !period.is_zero())
        .map(|period| {
            let mut interval = tokio::time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval
        });

    loop {
        let frame = tokio::select! {
            msg = rx.recv() => {
                let Some(msg) = msg else { break };
                match state.codec.encode(&msg) {
                    Ok(bytes) => Frame::encoded(bytes, state.codec.is_text()),
                    Err(e) => {
                        tracing::warn!(error = %e, "failed to encode message");
                        continue;
                    }
                }
            }
            () = next_keepalive(&mut keepalive) => Frame::Ping,
        };
        if let Err(e) = sink.send(frame).await {
            tracing::debug!(error = %e, "send failed, stopping writer");
            break;
        }
    }
    sink.close().await;
}

async fn next_keepalive(keepalive: &mut Option<Interval>) {
    match keepalive {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

async fn route_action<S, C>(
    state: &Arc<ServerState<S, C>>,
    membership: &mut Membership,
    action: Action,
) where
    S: PlayerStore,
    C: Codec,
{
    let Some(room) = &membership.room else {
        membership.reply(ServerMessage::RoomError {
            message: "join a room first".into(),
        });
        return;
    };

    if let Err(e) = room.act(membership.player_id, action).await {
        tracing::debug!(player_id = %membership.player_id, error = %e, "room unavailable");
        membership.room = None;
        depart(state, membership.player_id).await;
        membership.reply(ServerMessage::RoomError {
            message: e.to_string(),
        });
    }
}

async fn handle_gateway_message<S, C>(
    state: &Arc<ServerState<S, C>>,
    membership: &mut Membership,
    msg: ClientMessage,
) where
    S: PlayerStore,
    C: Codec,
{
    let player_id = membership.player_id;
    match msg {
        ClientMessage::CreateRoom { room_id } => {
            let result = state.rooms.lock().await.create_room(room_id);
            let reply = match result {
                Ok(handle) => match handle.snapshot().await {
                    Ok(room) => ServerMessage::RoomCreated { room },
                    Err(e) => room_error(&e),
                },
                Err(e) => room_error(&e),
            };
            membership.reply(reply);
        }

        ClientMessage::JoinRoom { room_id, username } => {
            if let Err(e) = join(state, membership, room_id, username).await {
                tracing::debug!(%player_id, error = %e, "join failed");
                membership.reply(room_error(&e));
            }
        }

        ClientMessage::LeaveRoom => {
            if membership.room.take().is_some() {
                depart(state, player_id).await;
            } else {
                membership.reply(room_error(&RoomError::NotInRoom(player_id)));
            }
        }

        ClientMessage::RequestRanking { limit } => {
            let limit = state.config.ranking_limit(limit);
            match state.store.top_players(limit).await {
                Ok(entries) => membership.reply(ServerMessage::Ranking { entries }),
                Err(e) => {
                    tracing::warn!(%player_id, error = %e, "ranking lookup failed");
                    membership.reply(ServerMessage::ActionError {
                        message: e.to_string(),
                    });
                }
            }
        }

        other => {
            tracing::debug!(%player_id, ?other, "unexpected gateway message");
        }
    }
}

async fn join<S, C>(
    state: &Arc<ServerState<S, C>>,
    membership: &mut Membership,
    room_id: RoomId,
    username: Option<String>,
) -> Result<(), RoomError>
where
    S: PlayerStore,
    C: Codec,
{
    let player_id = membership.player_id;
    let username = match username.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_owned(),
        _ => format!("Player_{}", player_id.0),
    };

    // Storage first, with no lock held.
    match state.store.load_player(&username).await {
        Ok(profile) => tracing::debug!(
            %player_id,
            username = %profile.username,
            total_score = profile.total_score,
            "profile loaded"
        ),
        Err(e) => tracing::warn!(%player_id, %username, error = %e, "profile load failed"),
    }

    let (handle, player) = state
        .rooms
        .lock()
        .await
        .join_room(player_id, room_id.clone(), &username, membership.sender.clone())
        .await?;
    membership.room = Some(handle);

    if let Err(e) = state
        .sessions
        .lock()
        .await
        .enter_room(player_id, room_id.clone(), player.username)
    {
        tracing::warn!(%player_id, error = %e, "session missing on join");
    }
    tracing::info!(%player_id, %room_id, "player entered room");
    Ok(())
}

/// Takes the player out of their room, if any, and saves their score.
async fn depart<S, C>(state: &ServerState<S, C>, player_id: PlayerId)
where
    S: PlayerStore,
    C: Codec,
{
    let result = state.rooms.lock().await.leave_room(player_id).await;
    let _ = state.sessions.lock().await.leave_room(player_id);

    let departure = match result {
        Ok(departure) => departure,
        Err(RoomError::NotInRoom(_)) => return,
        Err(e) => {
            tracing::debug!(%player_id, error = %e, "leave failed");
            return;
        }
    };

    let username = departure.player.username;
    let score = u64::from(departure.player.score);
    match state.store.save_score(&username, score).await {
        Ok(profile) => tracing::info!(
            %player_id,
            %username,
            score,
            total_score = profile.total_score,
            "score saved"
        ),
        Err(e) => tracing::warn!(%player_id, %username, error = %e, "score save failed"),
    }
}

fn room_error(err: &RoomError) -> ServerMessage {
    ServerMessage::RoomError {
        message: err.to_string(),
    }
}
