//! Items, tools, armor and the trade recipes.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cell::CellKind;
use crate::error::ActionError;

/// Everything that can sit in an inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Tree,
    Stone,
    Iron,
    Diamond,
    WoodenPickaxe,
    StonePickaxe,
    IronPickaxe,
    DiamondPickaxe,
    IronSword,
    DiamondSword,
    IronAxe,
    DiamondAxe,
    IronHelmet,
    IronChest,
    IronLeggings,
    IronBoots,
    DiamondHelmet,
    DiamondChest,
    DiamondLeggings,
    DiamondBoots,
    BarbedWire,
    WoodenFence,
}

impl ItemKind {
    pub const ALL: [ItemKind; 22] = [
        ItemKind::Tree,
        ItemKind::Stone,
        ItemKind::Iron,
        ItemKind::Diamond,
        ItemKind::WoodenPickaxe,
        ItemKind::StonePickaxe,
        ItemKind::IronPickaxe,
        ItemKind::DiamondPickaxe,
        ItemKind::IronSword,
        ItemKind::DiamondSword,
        ItemKind::IronAxe,
        ItemKind::DiamondAxe,
        ItemKind::IronHelmet,
        ItemKind::IronChest,
        ItemKind::IronLeggings,
        ItemKind::IronBoots,
        ItemKind::DiamondHelmet,
        ItemKind::DiamondChest,
        ItemKind::DiamondLeggings,
        ItemKind::DiamondBoots,
        ItemKind::BarbedWire,
        ItemKind::WoodenFence,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Tree => "tree",
            ItemKind::Stone => "stone",
            ItemKind::Iron => "iron",
            ItemKind::Diamond => "diamond",
            ItemKind::WoodenPickaxe => "wooden_pickaxe",
            ItemKind::StonePickaxe => "stone_pickaxe",
            ItemKind::IronPickaxe => "iron_pickaxe",
            ItemKind::DiamondPickaxe => "diamond_pickaxe",
            ItemKind::IronSword => "iron_sword",
            ItemKind::DiamondSword => "diamond_sword",
            ItemKind::IronAxe => "iron_axe",
            ItemKind::DiamondAxe => "diamond_axe",
            ItemKind::IronHelmet => "iron_helmet",
            ItemKind::IronChest => "iron_chest",
            ItemKind::IronLeggings => "iron_leggings",
            ItemKind::IronBoots => "iron_boots",
            ItemKind::DiamondHelmet => "diamond_helmet",
            ItemKind::DiamondChest => "diamond_chest",
            ItemKind::DiamondLeggings => "diamond_leggings",
            ItemKind::DiamondBoots => "diamond_boots",
            ItemKind::BarbedWire => "barbed_wire",
            ItemKind::WoodenFence => "wooden_fence",
        }
    }

    /// The cell this item becomes when placed, if it can be placed.
    pub fn placed_cell(self) -> Option<CellKind> {
        match self {
            ItemKind::Tree => Some(CellKind::Tree),
            ItemKind::Stone => Some(CellKind::Stone),
            ItemKind::Iron => Some(CellKind::IronOre),
            ItemKind::Diamond => Some(CellKind::Diamond),
            ItemKind::BarbedWire => Some(CellKind::BarbedWire),
            ItemKind::WoodenFence => Some(CellKind::WoodenFence),
            _ => None,
        }
    }

    /// The armor slot this piece is worn in.
    pub fn armor_slot(self) -> Option<ArmorSlot> {
        match self {
            ItemKind::IronHelmet | ItemKind::DiamondHelmet => Some(ArmorSlot::Helmet),
            ItemKind::IronChest | ItemKind::DiamondChest => Some(ArmorSlot::Chest),
            ItemKind::IronLeggings | ItemKind::DiamondLeggings => Some(ArmorSlot::Leggings),
            ItemKind::IronBoots | ItemKind::DiamondBoots => Some(ArmorSlot::Boots),
            _ => None,
        }
    }

    /// Extra maximum health granted while worn.
    pub fn armor_bonus(self) -> u32 {
        match self {
            ItemKind::IronHelmet
            | ItemKind::IronChest
            | ItemKind::IronLeggings
            | ItemKind::IronBoots => 2,
            ItemKind::DiamondHelmet
            | ItemKind::DiamondChest
            | ItemKind::DiamondLeggings
            | ItemKind::DiamondBoots => 4,
            _ => 0,
        }
    }

    /// What it costs to trade for one of this item.
    pub fn recipe(self) -> Option<Recipe> {
        let (material, amount) = match self {
            ItemKind::WoodenPickaxe => (ItemKind::Tree, 5),
            ItemKind::StonePickaxe => (ItemKind::Stone, 5),
            ItemKind::IronPickaxe => (ItemKind::Iron, 5),
            ItemKind::DiamondPickaxe => (ItemKind::Diamond, 5),
            ItemKind::IronSword | ItemKind::IronAxe => (ItemKind::Iron, 4),
            ItemKind::DiamondSword | ItemKind::DiamondAxe => (ItemKind::Diamond, 4),
            ItemKind::IronHelmet => (ItemKind::Iron, 5),
            ItemKind::IronChest => (ItemKind::Iron, 8),
            ItemKind::IronLeggings => (ItemKind::Iron, 7),
            ItemKind::IronBoots => (ItemKind::Iron, 4),
            ItemKind::DiamondHelmet => (ItemKind::Diamond, 5),
            ItemKind::DiamondChest => (ItemKind::Diamond, 8),
            ItemKind::DiamondLeggings => (ItemKind::Diamond, 7),
            ItemKind::DiamondBoots => (ItemKind::Diamond, 4),
            ItemKind::BarbedWire => (ItemKind::Iron, 5),
            ItemKind::WoodenFence => (ItemKind::Tree, 5),
            ItemKind::Tree | ItemKind::Stone | ItemKind::Iron | ItemKind::Diamond => {
                return None;
            }
        };
        Some(Recipe { material, amount })
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ItemKind::ALL
            .into_iter()
            .find(|item| item.as_str() == s)
            .ok_or_else(|| ActionError::UnknownItem(s.to_owned()))
    }
}

/// Item counts keyed by kind. Ordered so snapshots are stable.
pub type Inventory = BTreeMap<ItemKind, u32>;

/// The raw materials every fresh player starts with, all at zero.
pub fn starting_inventory() -> Inventory {
    [ItemKind::Tree, ItemKind::Stone, ItemKind::Iron, ItemKind::Diamond]
        .into_iter()
        .map(|item| (item, 0))
        .collect()
}

/// Cost of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Recipe {
    pub material: ItemKind,
    pub amount: u32,
}

// ---------------------------------------------------------------------------
// Armor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArmorSlot {
    Helmet,
    Chest,
    Leggings,
    Boots,
}

impl ArmorSlot {
    pub const ALL: [ArmorSlot; 4] = [
        ArmorSlot::Helmet,
        ArmorSlot::Chest,
        ArmorSlot::Leggings,
        ArmorSlot::Boots,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ArmorSlot::Helmet => "helmet",
            ArmorSlot::Chest => "chest",
            ArmorSlot::Leggings => "leggings",
            ArmorSlot::Boots => "boots",
        }
    }
}

impl fmt::Display for ArmorSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ArmorSlot {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ArmorSlot::ALL
            .into_iter()
            .find(|slot| slot.as_str() == s)
            .ok_or_else(|| ActionError::UnknownSlot(s.to_owned()))
    }
}

// ---------------------------------------------------------------------------
// Tools
// ---------------------------------------------------------------------------

/// What a player mines with. `Hand` needs no item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Hand,
    WoodenPickaxe,
    StonePickaxe,
    IronPickaxe,
    DiamondPickaxe,
    IronAxe,
    DiamondAxe,
    IronSword,
    DiamondSword,
}

impl ToolKind {
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Hand,
        ToolKind::WoodenPickaxe,
        ToolKind::StonePickaxe,
        ToolKind::IronPickaxe,
        ToolKind::DiamondPickaxe,
        ToolKind::IronAxe,
        ToolKind::DiamondAxe,
        ToolKind::IronSword,
        ToolKind::DiamondSword,
    ];

    pub fn as_str(self) -> &'static str {
        match self.item() {
            Some(item) => item.as_str(),
            None => "hand",
        }
    }

    /// The inventory item backing this tool.
    pub fn item(self) -> Option<ItemKind> {
        match self {
            ToolKind::Hand => None,
            ToolKind::WoodenPickaxe => Some(ItemKind::WoodenPickaxe),
            ToolKind::StonePickaxe => Some(ItemKind::StonePickaxe),
            ToolKind::IronPickaxe => Some(ItemKind::IronPickaxe),
            ToolKind::DiamondPickaxe => Some(ItemKind::DiamondPickaxe),
            ToolKind::IronAxe => Some(ItemKind::IronAxe),
            ToolKind::DiamondAxe => Some(ItemKind::DiamondAxe),
            ToolKind::IronSword => Some(ItemKind::IronSword),
            ToolKind::DiamondSword => Some(ItemKind::DiamondSword),
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolKind {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Ok(ToolKind::Hand);
        }
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.as_str() == s)
            .ok_or_else(|| ActionError::UnknownTool(s.to_owned()))
    }
}

/// Mining column a cell falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Material {
    Wood,
    Stone,
    Ore,
    Gem,
}

/// Durability removed per hit, one entry per material column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ToolEfficiency {
    pub wood: u32,
    pub stone: u32,
    pub ore: u32,
    pub gem: u32,
}

impl ToolEfficiency {
    pub const fn new(wood: u32, stone: u32, ore: u32, gem: u32) -> Self {
        Self { wood, stone, ore, gem }
    }

    pub fn against(&self, material: Material) -> u32 {
        match material {
            Material::Wood => self.wood,
            Material::Stone => self.stone,
            Material::Ore => self.ore,
            Material::Gem => self.gem,
        }
    }
}

/// Tool × material damage table. Tools missing from the table do nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EfficiencyTable(BTreeMap<ToolKind, ToolEfficiency>);

impl EfficiencyTable {
    pub fn get(&self, tool: ToolKind, material: Material) -> u32 {
        self.0
            .get(&tool)
            .map(|row| row.against(material))
            .unwrap_or(0)
    }

    pub fn set(&mut self, tool: ToolKind, row: ToolEfficiency) {
        self.0.insert(tool, row);
    }
}

impl Default for EfficiencyTable {
    fn default() -> Self {
        Self(BTreeMap::from([
            (ToolKind::Hand, ToolEfficiency::new(1, 1, 0, 0)),
            (ToolKind::WoodenPickaxe, ToolEfficiency::new(1, 2, 1, 0)),
            (ToolKind::StonePickaxe, ToolEfficiency::new(1, 4, 2, 1)),
            (ToolKind::IronPickaxe, ToolEfficiency::new(1, 6, 6, 4)),
            (ToolKind::DiamondPickaxe, ToolEfficiency::new(1, 12, 12, 8)),
            (ToolKind::IronAxe, ToolEfficiency::new(6, 1, 0, 0)),
            (ToolKind::DiamondAxe, ToolEfficiency::new(12, 1, 0, 0)),
            (ToolKind::IronSword, ToolEfficiency::new(1, 1, 1, 0)),
            (ToolKind::DiamondSword, ToolEfficiency::new(1, 1, 1, 0)),
        ]))
    }
}
