//! Error types for sessions and storage.

use craftroom_protocol::PlayerId;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("session not found for player {0}")]
    NotFound(PlayerId),

    #[error("player {0} already has an active session")]
    AlreadyConnected(PlayerId),

    #[error("player store unavailable: {0}")]
    Storage(String),
}
