//! Map cells and their durability bookkeeping.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::item::{ItemKind, Material};

/// Durability of the indestructible map border.
pub const BORDER_DURABILITY: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CellKind {
    Grass,
    Tree,
    Stone,
    IronOre,
    Diamond,
    BarbedWire,
    WoodenFence,
}

impl CellKind {
    pub fn as_str(self) -> &'static str {
        match self {
            CellKind::Grass => "grass",
            CellKind::Tree => "tree",
            CellKind::Stone => "stone",
            CellKind::IronOre => "iron_ore",
            CellKind::Diamond => "diamond",
            CellKind::BarbedWire => "barbed_wire",
            CellKind::WoodenFence => "wooden_fence",
        }
    }

    /// Everything except grass blocks movement.
    pub fn is_solid(self) -> bool {
        self != CellKind::Grass
    }

    /// Natural ground that a placed block may rest on.
    pub fn is_natural_surface(self) -> bool {
        matches!(
            self,
            CellKind::Grass
                | CellKind::Tree
                | CellKind::Stone
                | CellKind::IronOre
                | CellKind::Diamond
        )
    }

    pub fn max_durability(self) -> u32 {
        match self {
            CellKind::Grass => 1,
            CellKind::Tree => 50,
            CellKind::Stone => 80,
            CellKind::IronOre => 120,
            CellKind::Diamond => 150,
            CellKind::BarbedWire => 60,
            CellKind::WoodenFence => 40,
        }
    }

    /// Which efficiency column applies when mining this cell.
    pub fn material(self) -> Option<Material> {
        match self {
            CellKind::Grass => None,
            CellKind::Tree | CellKind::WoodenFence => Some(Material::Wood),
            CellKind::Stone => Some(Material::Stone),
            CellKind::IronOre | CellKind::BarbedWire => Some(Material::Ore),
            CellKind::Diamond => Some(Material::Gem),
        }
    }

    /// Item and amount range dropped when the cell breaks.
    pub fn yield_range(self) -> Option<(ItemKind, RangeInclusive<u32>)> {
        match self {
            CellKind::Grass => None,
            CellKind::Tree => Some((ItemKind::Tree, 2..=4)),
            CellKind::Stone => Some((ItemKind::Stone, 2..=3)),
            CellKind::IronOre => Some((ItemKind::Iron, 1..=1)),
            CellKind::Diamond => Some((ItemKind::Diamond, 1..=1)),
            CellKind::BarbedWire => Some((ItemKind::BarbedWire, 1..=1)),
            CellKind::WoodenFence => Some((ItemKind::WoodenFence, 1..=1)),
        }
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    #[serde(rename = "type")]
    pub kind: CellKind,
    pub max_durability: u32,
    pub current_durability: u32,
    /// Percentage mined, `0.0` at full durability.
    pub mining_progress: f64,
}

impl Cell {
    /// A fresh cell of `kind` at full durability.
    pub fn new(kind: CellKind) -> Self {
        Self::with_durability(kind, kind.max_durability())
    }

    pub fn grass() -> Self {
        Self::new(CellKind::Grass)
    }

    pub fn border() -> Self {
        Self::with_durability(CellKind::Stone, BORDER_DURABILITY)
    }

    fn with_durability(kind: CellKind, durability: u32) -> Self {
        Self {
            kind,
            max_durability: durability,
            current_durability: durability,
            mining_progress: 0.0,
        }
    }

    pub fn is_solid(&self) -> bool {
        self.kind.is_solid()
    }

    /// Removes up to `damage` durability. Returns `true` once the cell is
    /// worn down to zero.
    pub fn wear(&mut self, damage: u32) -> bool {
        self.current_durability = self.current_durability.saturating_sub(damage);
        self.mining_progress = if self.max_durability == 0 {
            100.0
        } else {
            let mined = self.max_durability - self.current_durability;
            f64::from(mined) / f64::from(self.max_durability) * 100.0
        };
        self.current_durability == 0
    }

    /// Describes the first broken cell invariant, if any.
    pub fn violation(&self) -> Option<String> {
        if self.kind == CellKind::Grass
            && (self.max_durability != 1
                || self.current_durability != 1
                || self.mining_progress != 0.0)
        {
            return Some("grass must be 1/1 with no progress".into());
        }
        if self.current_durability > self.max_durability {
            return Some(format!(
                "durability {} above maximum {}",
                self.current_durability, self.max_durability
            ));
        }
        if !(0.0..=100.0).contains(&self.mining_progress) {
            return Some(format!("progress {} out of range", self.mining_progress));
        }
        if self.current_durability == self.max_durability && self.mining_progress != 0.0 {
            return Some("progress set on an untouched cell".into());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_cells_start_full() {
        let cell = Cell::new(CellKind::Diamond);
        assert_eq!(cell.max_durability, 150);
        assert_eq!(cell.current_durability, 150);
        assert_eq!(cell.mining_progress, 0.0);
        assert!(cell.violation().is_none());
    }

    #[test]
    fn test_wear_tracks_progress() {
        let mut cell = Cell::new(CellKind::Stone);
        assert!(!cell.wear(20));
        assert_eq!(cell.current_durability, 60);
        assert_eq!(cell.mining_progress, 25.0);
    }

    #[test]
    fn test_wear_floors_at_zero() {
        let mut cell = Cell::new(CellKind::WoodenFence);
        assert!(cell.wear(500));
        assert_eq!(cell.current_durability, 0);
        assert_eq!(cell.mining_progress, 100.0);
    }

    #[test]
    fn test_border_is_sturdier_stone() {
        let cell = Cell::border();
        assert_eq!(cell.kind, CellKind::Stone);
        assert_eq!(cell.max_durability, BORDER_DURABILITY);
    }

    #[test]
    fn test_cell_wire_format() {
        let json = serde_json::to_value(Cell::new(CellKind::IronOre)).unwrap();
        assert_eq!(json["type"], "iron_ore");
        assert_eq!(json["maxDurability"], 120);
        assert_eq!(json["currentDurability"], 120);
        assert_eq!(json["miningProgress"], 0.0);
    }

    #[test]
    fn test_bad_grass_is_a_violation() {
        let mut cell = Cell::grass();
        cell.current_durability = 0;
        assert!(cell.violation().is_some());
    }
}
