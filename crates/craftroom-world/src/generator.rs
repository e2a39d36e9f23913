//! Random terrain generation.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKind};
use crate::map::GameMap;

/// Relative odds of each interior terrain type. Expected to sum to 1;
/// [`MapGenerator`] normalizes whatever it is given.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TerrainWeights {
    pub grass: f64,
    pub tree: f64,
    pub stone: f64,
    pub iron_ore: f64,
    pub diamond: f64,
}

impl Default for TerrainWeights {
    fn default() -> Self {
        Self {
            grass: 0.65,
            tree: 0.10,
            stone: 0.15,
            iron_ore: 0.07,
            diamond: 0.03,
        }
    }
}

impl TerrainWeights {
    pub fn total(&self) -> f64 {
        self.grass + self.tree + self.stone + self.iron_ore + self.diamond
    }

    /// Zeroes negative or non-finite weights and rescales the rest to sum
    /// to 1. All-zero weights become all grass.
    pub fn validated(self) -> Self {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let raw = [
            clean(self.grass),
            clean(self.tree),
            clean(self.stone),
            clean(self.iron_ore),
            clean(self.diamond),
        ];
        let largest = raw.iter().copied().fold(0.0, f64::max);
        if largest == 0.0 {
            tracing::warn!(weights = ?self, "no usable terrain weight, generating grass only");
            return Self {
                grass: 1.0,
                tree: 0.0,
                stone: 0.0,
                iron_ore: 0.0,
                diamond: 0.0,
            };
        }

        // Dividing by the largest first keeps the sum finite.
        let scaled = raw.map(|w| w / largest);
        let total: f64 = scaled.iter().sum();
        let [grass, tree, stone, iron_ore, diamond] = scaled.map(|w| w / total);
        let validated = Self {
            grass,
            tree,
            stone,
            iron_ore,
            diamond,
        };
        let balanced = (self.total() - 1.0).abs() < 1e-9;
        if !balanced {
            tracing::warn!(weights = ?self, ?validated, "terrain weights normalized");
        }
        validated
    }

    /// Maps a roll in `[0, total)` onto a terrain type. Rolls past the end
    /// land on grass.
    pub fn pick(&self, roll: f64) -> CellKind {
        let table = [
            (CellKind::Grass, self.grass),
            (CellKind::Tree, self.tree),
            (CellKind::Stone, self.stone),
            (CellKind::IronOre, self.iron_ore),
            (CellKind::Diamond, self.diamond),
        ];
        let mut acc = 0.0;
        for (kind, weight) in table {
            acc += weight;
            if roll < acc {
                return kind;
            }
        }
        CellKind::Grass
    }
}

/// Builds maps of one fixed size.
#[derive(Debug, Clone)]
pub struct MapGenerator {
    width: usize,
    height: usize,
    weights: TerrainWeights,
}

impl MapGenerator {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            weights: TerrainWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: TerrainWeights) -> Self {
        self.weights = weights.validated();
        self
    }

    /// Stone border, weighted random interior, every cell at full
    /// durability.
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> GameMap {
        let total = self.weights.total();
        let mut rows = Vec::with_capacity(self.height);
        for y in 0..self.height {
            let mut row = Vec::with_capacity(self.width);
            for x in 0..self.width {
                let border = x == 0 || y == 0 || x + 1 == self.width || y + 1 == self.height;
                let cell = if border {
                    Cell::border()
                } else if total > 0.0 {
                    Cell::new(self.weights.pick(rng.random_range(0.0..total)))
                } else {
                    Cell::grass()
                };
                row.push(cell);
            }
            rows.push(row);
        }
        tracing::debug!(width = self.width, height = self.height, "map generated");
        GameMap::from_rows(self.width, self.height, rows)
    }

    /// Same seed, same map.
    pub fn generate_seeded(&self, seed: u64) -> GameMap {
        self.generate(&mut StdRng::seed_from_u64(seed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Position;

    #[test]
    fn test_default_weights_sum_to_one() {
        let total = TerrainWeights::default().total();
        assert!((total - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validated_keeps_default_weights() {
        let w = TerrainWeights::default().validated();
        let d = TerrainWeights::default();
        assert!((w.grass - d.grass).abs() < 1e-9);
        assert!((w.diamond - d.diamond).abs() < 1e-9);
        assert!((w.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_validated_drops_bad_weights_and_normalizes() {
        let w = TerrainWeights {
            grass: 3.0,
            tree: f64::INFINITY,
            stone: -2.0,
            iron_ore: f64::NAN,
            diamond: 1.0,
        }
        .validated();
        assert_eq!(w.tree, 0.0);
        assert_eq!(w.stone, 0.0);
        assert_eq!(w.iron_ore, 0.0);
        assert!((w.grass - 0.75).abs() < 1e-9);
        assert!((w.diamond - 0.25).abs() < 1e-9);
    }

    #[test]
    fn test_validated_survives_huge_weights() {
        let w = TerrainWeights {
            grass: f64::MAX,
            tree: f64::MAX,
            stone: 0.0,
            iron_ore: 0.0,
            diamond: 0.0,
        }
        .validated();
        assert!((w.grass - 0.5).abs() < 1e-9);
        assert!((w.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_all_zero_weights_mean_grass() {
        let zero = TerrainWeights {
            grass: 0.0,
            tree: 0.0,
            stone: -1.0,
            iron_ore: 0.0,
            diamond: 0.0,
        };
        assert_eq!(zero.validated().grass, 1.0);

        let map = MapGenerator::new(10, 10).with_weights(zero).generate_seeded(3);
        assert_eq!(map.grass_cells().count(), 8 * 8);
    }

    #[test]
    fn test_infinite_weight_does_not_panic() {
        let weights = TerrainWeights {
            stone: f64::INFINITY,
            ..TerrainWeights::default()
        };
        let map = MapGenerator::new(20, 20).with_weights(weights).generate_seeded(1);
        assert!(map.check().is_ok());
    }

    #[test]
    fn test_pick_walks_cumulative_table() {
        let w = TerrainWeights::default();
        assert_eq!(w.pick(0.0), CellKind::Grass);
        assert_eq!(w.pick(0.70), CellKind::Tree);
        assert_eq!(w.pick(0.80), CellKind::Stone);
        assert_eq!(w.pick(0.95), CellKind::IronOre);
        assert_eq!(w.pick(0.99), CellKind::Diamond);
        assert_eq!(w.pick(5.0), CellKind::Grass);
    }

    #[test]
    fn test_border_is_always_stone() {
        let map = MapGenerator::new(50, 50).generate_seeded(11);
        for i in 0..50 {
            for pos in [
                Position::new(i, 0),
                Position::new(i, 49),
                Position::new(0, i),
                Position::new(49, i),
            ] {
                let cell = map.cell(pos).unwrap();
                assert_eq!(cell.kind, CellKind::Stone);
                assert_eq!(cell.max_durability, 100);
            }
        }
    }

    #[test]
    fn test_same_seed_same_map() {
        let generator = MapGenerator::new(30, 20);
        assert_eq!(generator.generate_seeded(99), generator.generate_seeded(99));
        assert_ne!(generator.generate_seeded(1), generator.generate_seeded(2));
    }

    #[test]
    fn test_generated_cells_start_untouched() {
        let map = MapGenerator::new(50, 50).generate_seeded(5);
        assert_eq!(map.width(), 50);
        assert_eq!(map.height(), 50);
        for row in map.rows() {
            for cell in row {
                assert_eq!(cell.current_durability, cell.max_durability);
                assert_eq!(cell.mining_progress, 0.0);
            }
        }
        assert!(map.check().is_ok());
    }

    #[test]
    fn test_all_grass_weights() {
        let weights = TerrainWeights {
            grass: 1.0,
            tree: 0.0,
            stone: 0.0,
            iron_ore: 0.0,
            diamond: 0.0,
        };
        let map = MapGenerator::new(10, 10).with_weights(weights).generate_seeded(3);
        assert_eq!(map.grass_cells().count(), 8 * 8);
    }
}
