//! Per-connection session data.

use std::time::Instant;

use craftroom_protocol::{PlayerId, RoomId};

/// Where a connection currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Connected but not in any room.
    Lobby,
    /// Playing in a room under `username`.
    InRoom { room_id: RoomId, username: String },
}

#[derive(Debug, Clone)]
pub struct Session {
    pub player_id: PlayerId,
    pub state: SessionState,
    pub connected_at: Instant,
}

impl Session {
    pub fn room_id(&self) -> Option<&RoomId> {
        match &self.state {
            SessionState::InRoom { room_id, .. } => Some(room_id),
            SessionState::Lobby => None,
        }
    }
}
