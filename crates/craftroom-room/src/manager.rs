//! Room manager: creates, tracks, and routes players to rooms.

use std::collections::HashMap;

use craftroom_protocol::{PlayerId, RoomId};
use craftroom_world::{Player, World};

use crate::{Action, Departure, PlayerSender, RoomConfig, RoomError, RoomHandle, RoomInfo};

/// Manages all live rooms and tracks which player is in which room.
///
/// A player is in at most one room at a time. The gateway keeps one
/// manager behind a lock and only holds it for these calls; gameplay
/// traffic goes straight to the cached [`RoomHandle`].
pub struct RoomManager {
    rooms: HashMap<RoomId, RoomHandle>,
    player_rooms: HashMap<PlayerId, RoomId>,
    config: RoomConfig,
}

impl RoomManager {
    pub fn new(config: RoomConfig) -> Self {
        Self {
            rooms: HashMap::new(),
            player_rooms: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    /// Creates a room with a freshly generated world.
    pub fn create_room(&mut self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        let world = self.config.build_world(room_id.clone());
        self.insert_world(world)
    }

    /// Creates a room around a prepared world.
    pub fn insert_world(&mut self, world: World) -> Result<RoomHandle, RoomError> {
        self.prune_closed();
        let room_id = world.id().clone();
        if self.rooms.contains_key(&room_id) {
            return Err(RoomError::AlreadyExists(room_id));
        }

        let handle = RoomHandle::spawn(world, &self.config);
        self.rooms.insert(room_id.clone(), handle.clone());
        tracing::info!(%room_id, rooms = self.rooms.len(), "room created");
        Ok(handle)
    }

    /// Adds a player to a room and returns the room's handle with the
    /// player as spawned.
    pub async fn join_room(
        &mut self,
        player_id: PlayerId,
        room_id: RoomId,
        username: &str,
        sender: PlayerSender,
    ) -> Result<(RoomHandle, Player), RoomError> {
        if let Some(current) = self.player_rooms.get(&player_id) {
            return Err(RoomError::AlreadyInRoom(player_id, current.clone()));
        }

        let handle = self
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        match handle.join(player_id, username, sender).await {
            Ok(player) => {
                self.player_rooms.insert(player_id, room_id);
                Ok((handle, player))
            }
            Err(RoomError::Unavailable(_)) => {
                // The actor stopped on its own; forget it.
                self.forget(&room_id);
                Err(RoomError::NotFound(room_id))
            }
            Err(err) => Err(err),
        }
    }

    /// Removes a player from their room. The room is destroyed once its
    /// last player leaves.
    pub async fn leave_room(&mut self, player_id: PlayerId) -> Result<Departure, RoomError> {
        let room_id = self
            .player_rooms
            .remove(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        let handle = self
            .rooms
            .get(&room_id)
            .cloned()
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        match handle.leave(player_id).await {
            Ok(departure) => {
                if departure.room_empty {
                    self.destroy_room(&room_id).await?;
                }
                Ok(departure)
            }
            Err(err @ RoomError::Unavailable(_)) => {
                self.forget(&room_id);
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    /// Forwards an action to the player's room (fire-and-forget).
    pub async fn route_action(&self, player_id: PlayerId, action: Action) -> Result<(), RoomError> {
        let room_id = self
            .player_rooms
            .get(&player_id)
            .ok_or(RoomError::NotInRoom(player_id))?;
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.act(player_id, action).await
    }

    pub async fn get_room_info(&self, room_id: &RoomId) -> Result<RoomInfo, RoomError> {
        let handle = self
            .rooms
            .get(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;
        handle.info().await
    }

    /// Shuts a room down and drops every player's membership in it.
    pub async fn destroy_room(&mut self, room_id: &RoomId) -> Result<(), RoomError> {
        let handle = self
            .rooms
            .remove(room_id)
            .ok_or_else(|| RoomError::NotFound(room_id.clone()))?;

        let _ = handle.shutdown().await;
        self.player_rooms.retain(|_, rid| rid != room_id);

        tracing::info!(%room_id, "room destroyed");
        Ok(())
    }

    /// Forgets rooms whose actor stopped by itself (idle or corrupted).
    pub fn prune_closed(&mut self) -> Vec<RoomId> {
        let closed: Vec<RoomId> = self
            .rooms
            .iter()
            .filter(|(_, handle)| handle.is_closed())
            .map(|(room_id, _)| room_id.clone())
            .collect();
        for room_id in &closed {
            self.forget(room_id);
            tracing::info!(%room_id, "closed room removed");
        }
        closed
    }

    fn forget(&mut self, room_id: &RoomId) {
        self.rooms.remove(room_id);
        self.player_rooms.retain(|_, rid| rid != room_id);
    }

    pub fn player_room(&self, player_id: &PlayerId) -> Option<&RoomId> {
        self.player_rooms.get(player_id)
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }
}

impl Default for RoomManager {
    fn default() -> Self {
        Self::new(RoomConfig::default())
    }
}
