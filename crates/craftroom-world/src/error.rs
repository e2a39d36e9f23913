//! Error types for world operations.

use crate::cell::CellKind;
use crate::ids::{MonsterId, PlayerId};
use crate::item::{ArmorSlot, ItemKind, ToolKind};

/// A rejected action. The world is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ActionError {
    #[error("player {0} not found")]
    PlayerNotFound(PlayerId),

    #[error("monster {0} not found")]
    MonsterNotFound(MonsterId),

    #[error("invalid position ({x}, {y})")]
    InvalidPosition { x: i32, y: i32 },

    #[error("cell ({x}, {y}) is already grass")]
    AlreadyGrass { x: i32, y: i32 },

    #[error("{tool} cannot mine {cell}")]
    ToolIneffective { tool: ToolKind, cell: CellKind },

    #[error("not enough {material}: need {required}, have {available}")]
    InsufficientMaterial {
        material: ItemKind,
        required: u32,
        available: u32,
    },

    #[error("no {0} in inventory")]
    InsufficientItem(ItemKind),

    #[error("{0} cannot be placed")]
    NotPlaceable(ItemKind),

    #[error("{0} cannot be traded for")]
    NotTradeable(ItemKind),

    #[error("{item} does not go in the {slot} slot")]
    InvalidSlotMatch { item: ItemKind, slot: ArmorSlot },

    #[error("nothing equipped in the {0} slot")]
    EmptySlot(ArmorSlot),

    #[error("hotbar slot {0} out of range")]
    InvalidSlot(u8),

    #[error("monsters can only be attacked at night")]
    NotNight,

    #[error("player {0} is dead")]
    PlayerDead(PlayerId),

    #[error("unknown item: {0}")]
    UnknownItem(String),

    #[error("unknown tool: {0}")]
    UnknownTool(String),

    #[error("unknown armor slot: {0}")]
    UnknownSlot(String),
}

/// World state no longer satisfies its invariants. Fatal to the room.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorldError {
    #[error("world corrupted: {0}")]
    Corrupted(String),
}
