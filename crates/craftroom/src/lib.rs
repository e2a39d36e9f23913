//! # Craftroom
//!
//! Authoritative multiplayer block-world game server.
//!
//! Clients connect over WebSocket, create or join named rooms and send
//! actions. Each room runs as its own actor that owns the world, validates
//! every action, ticks the day/night cycle and monster AI, and broadcasts
//! the results to everyone in the room.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use craftroom::prelude::*;
//!
//! # async fn start() -> Result<(), CraftroomError> {
//! let server = CraftroomServer::builder()
//!     .bind("0.0.0.0:5001")
//!     .build(MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod config;
mod error;
mod handler;
mod server;

pub use config::{MAX_RANKING_LIMIT, ServerConfig};
pub use error::CraftroomError;
pub use server::{CraftroomServer, CraftroomServerBuilder};

pub mod prelude {
    pub use crate::{CraftroomError, CraftroomServer, CraftroomServerBuilder, ServerConfig};
    pub use craftroom_protocol::{
        ClientMessage, Codec, JsonCodec, PlayerId, RankingEntry, RoomId, ServerMessage,
    };
    pub use craftroom_room::{RoomConfig, RoomManager};
    pub use craftroom_session::{MemoryStore, PlayerProfile, PlayerStore};
    pub use craftroom_tick::{LatePolicy, TickConfig};
    pub use craftroom_world::{Phase, WorldConfig};
}
