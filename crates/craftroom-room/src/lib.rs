//! Room lifecycle management for Craftroom.
//!
//! Each room runs as an isolated Tokio task (actor model) that owns its
//! [`World`](craftroom_world::World) and a tick scheduler. Nothing else
//! touches the world; callers talk to it through a [`RoomHandle`].
//!
//! # Key types
//!
//! - [`RoomManager`] — creates/destroys rooms, tracks player membership
//! - [`RoomHandle`] — send commands to a running room actor
//! - [`Action`] — the in-room requests a player can make
//! - [`RoomConfig`] — tick rate, phase length, idle timeout, world balance

mod action;
mod config;
mod error;
mod manager;
mod room;

pub use action::Action;
pub use config::RoomConfig;
pub use error::RoomError;
pub use manager::RoomManager;
pub use room::{Departure, PlayerSender, RoomHandle, RoomInfo};
