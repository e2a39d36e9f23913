//! The simulated world of a Craftroom room.
//!
//! A [`World`] owns one room's map, players and monsters and knows every
//! game rule. It is plain synchronous state: the room actor in
//! `craftroom-room` owns it exclusively, so nothing here locks.
//!
//! # Key types
//!
//! - [`World`] — registry, action rules ([`World::mine`], [`World::place`],
//!   ...) and the simulation tick ([`World::tick`])
//! - [`MapGenerator`] — seeded terrain generation
//! - [`WorldConfig`] — balance numbers
//! - [`ActionError`] / [`WorldError`] — rejections vs. corruption

mod ai;
mod cell;
mod config;
mod entity;
mod error;
mod generator;
mod geometry;
mod ids;
mod item;
mod map;
mod phase;
mod rules;
mod world;

pub use ai::{MonsterAttack, TickReport};
pub use cell::{BORDER_DURABILITY, Cell, CellKind};
pub use config::WorldConfig;
pub use entity::{MAX_HOTBAR_SLOT, Monster, MonsterKind, PLAYER_COLORS, Player};
pub use error::{ActionError, WorldError};
pub use generator::{MapGenerator, TerrainWeights};
pub use geometry::{Direction, Position};
pub use ids::{MonsterId, PlayerId, RoomId};
pub use item::{
    ArmorSlot, EfficiencyTable, Inventory, ItemKind, Material, Recipe, ToolEfficiency, ToolKind,
    starting_inventory,
};
pub use map::GameMap;
pub use phase::{Phase, PhaseClock};
pub use rules::{Attacked, BlockChange, Loadout, Moved, Target, Traded};
pub use world::{RoomSnapshot, World};

// Re-exported so callers can build seeded worlds without naming `rand`.
pub use rand::rngs::StdRng;
