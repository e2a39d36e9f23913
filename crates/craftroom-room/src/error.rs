//! Error types for the room layer.

use craftroom_protocol::{PlayerId, RoomId};

/// Errors that can occur during room operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    #[error("room {0} not found")]
    NotFound(RoomId),

    #[error("room {0} already exists")]
    AlreadyExists(RoomId),

    /// The player is already in a room, possibly a different one.
    #[error("player {0} already in room {1}")]
    AlreadyInRoom(PlayerId, RoomId),

    #[error("player {0} is not in a room")]
    NotInRoom(PlayerId),

    /// The room's actor has stopped, or its channel is closed.
    #[error("room {0} is unavailable")]
    Unavailable(RoomId),
}
