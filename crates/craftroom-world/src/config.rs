//! Game balance settings.

use serde::{Deserialize, Serialize};

use crate::generator::TerrainWeights;
use crate::geometry::Position;
use crate::item::EfficiencyTable;

/// Tunable numbers for one world. The defaults reproduce the stock game.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    pub width: usize,
    pub height: usize,
    /// Where players appear on join and restart.
    pub spawn_point: Position,
    /// Health without armor.
    pub base_health: u32,
    /// Chebyshev distance a player can mine or build at.
    pub reach: u32,
    pub player_damage: u32,
    pub monster_damage: u32,
    /// Manhattan distance at which a zombie notices a player.
    pub aggro_radius: u32,
    pub spawn_min: usize,
    pub spawn_max: usize,
    /// Random positions tried per monster before giving up on it.
    pub spawn_attempts: usize,
    pub terrain: TerrainWeights,
    pub efficiency: EfficiencyTable,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            width: 50,
            height: 50,
            spawn_point: Position::new(25, 25),
            base_health: 20,
            reach: 1,
            player_damage: 1,
            monster_damage: 2,
            aggro_radius: 8,
            spawn_min: 5,
            spawn_max: 9,
            spawn_attempts: 50,
            terrain: TerrainWeights::default(),
            efficiency: EfficiencyTable::default(),
        }
    }
}
