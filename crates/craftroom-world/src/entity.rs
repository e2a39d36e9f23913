//! Players and monsters.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::geometry::{Direction, Position};
use crate::ids::{MonsterId, PlayerId};
use crate::item::{ArmorSlot, Inventory, ItemKind, starting_inventory};

/// Colors handed out to joining players.
pub const PLAYER_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FECA57", "#FF9FF3", "#54A0FF", "#5F27CD",
];

/// Highest selectable hotbar slot.
pub const MAX_HOTBAR_SLOT: u8 = 4;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    pub position: Position,
    pub facing: Direction,
    pub color: String,
    pub health: u32,
    pub max_health: u32,
    pub inventory: Inventory,
    pub equipped_armor: BTreeMap<ArmorSlot, ItemKind>,
    pub selected_slot: u8,
    /// Monsters defeated this session.
    pub score: u32,
}

impl Player {
    pub fn new(
        id: PlayerId,
        username: impl Into<String>,
        color: impl Into<String>,
        position: Position,
        base_health: u32,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            position,
            facing: Direction::default(),
            color: color.into(),
            health: base_health,
            max_health: base_health,
            inventory: starting_inventory(),
            equipped_armor: BTreeMap::new(),
            selected_slot: 0,
            score: 0,
        }
    }

    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    pub fn count(&self, item: ItemKind) -> u32 {
        self.inventory.get(&item).copied().unwrap_or(0)
    }

    pub(crate) fn give(&mut self, item: ItemKind, amount: u32) {
        *self.inventory.entry(item).or_insert(0) += amount;
    }

    /// Removes `amount` of `item`; does nothing and returns `false` when
    /// the player holds fewer.
    pub(crate) fn take(&mut self, item: ItemKind, amount: u32) -> bool {
        match self.inventory.get_mut(&item) {
            Some(held) if *held >= amount => {
                *held -= amount;
                true
            }
            _ => false,
        }
    }

    /// Recomputes `max_health` from worn armor and clamps `health` to it.
    pub(crate) fn refresh_max_health(&mut self, base_health: u32) {
        let bonus: u32 = self.equipped_armor.values().map(|item| item.armor_bonus()).sum();
        self.max_health = base_health + bonus;
        self.health = self.health.min(self.max_health);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MonsterKind {
    Zombie,
}

impl MonsterKind {
    pub fn max_hp(self) -> u32 {
        match self {
            MonsterKind::Zombie => 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Monster {
    pub id: MonsterId,
    #[serde(rename = "type")]
    pub kind: MonsterKind,
    pub position: Position,
    pub hp: u32,
}

impl Monster {
    pub fn new(id: MonsterId, kind: MonsterKind, position: Position) -> Self {
        Self {
            id,
            kind,
            position,
            hp: kind.max_hp(),
        }
    }
}
