//! The per-room world: map, players, monsters and the phase clock.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::cell::Cell;
use crate::config::WorldConfig;
use crate::entity::{Monster, PLAYER_COLORS, Player};
use crate::error::WorldError;
use crate::generator::MapGenerator;
use crate::geometry::Position;
use crate::ids::{MonsterId, PlayerId, RoomId};
use crate::map::GameMap;
use crate::phase::{Phase, PhaseClock};

/// Full room state as sent to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub players: Vec<Player>,
    pub map: GameMap,
    pub monsters: Vec<Monster>,
    pub phase: Phase,
    pub phase_started_at: u64,
}

/// Everything one room owns. Only the room's actor touches it, so no
/// method here needs synchronization.
#[derive(Debug)]
pub struct World {
    pub(crate) id: RoomId,
    pub(crate) config: WorldConfig,
    pub(crate) map: GameMap,
    pub(crate) players: BTreeMap<PlayerId, Player>,
    pub(crate) monsters: BTreeMap<MonsterId, Monster>,
    pub(crate) clock: PhaseClock,
    pub(crate) next_monster_id: u64,
    pub(crate) rng: StdRng,
}

impl World {
    /// Generates a fresh map from `rng` and starts in daytime.
    pub fn new(id: RoomId, config: WorldConfig, ticks_per_phase: u64, mut rng: StdRng) -> Self {
        let mut map = MapGenerator::new(config.width, config.height)
            .with_weights(config.terrain)
            .generate(&mut rng);
        map.set_cell(config.spawn_point, Cell::grass());
        Self::with_map(id, config, map, ticks_per_phase, rng)
    }

    pub fn seeded(id: RoomId, config: WorldConfig, ticks_per_phase: u64, seed: u64) -> Self {
        Self::new(id, config, ticks_per_phase, StdRng::seed_from_u64(seed))
    }

    /// Uses a prepared map instead of generating one.
    pub fn with_map(
        id: RoomId,
        config: WorldConfig,
        map: GameMap,
        ticks_per_phase: u64,
        rng: StdRng,
    ) -> Self {
        Self {
            id,
            config,
            map,
            players: BTreeMap::new(),
            monsters: BTreeMap::new(),
            clock: PhaseClock::new(ticks_per_phase),
            next_monster_id: 1,
            rng,
        }
    }

    pub fn id(&self) -> &RoomId {
        &self.id
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn map(&self) -> &GameMap {
        &self.map
    }

    pub fn phase(&self) -> Phase {
        self.clock.phase()
    }

    pub fn phase_started_at(&self) -> u64 {
        self.clock.started_at()
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn monster(&self, id: MonsterId) -> Option<&Monster> {
        self.monsters.get(&id)
    }

    pub fn monsters(&self) -> impl Iterator<Item = &Monster> {
        self.monsters.values()
    }

    pub fn monster_list(&self) -> Vec<Monster> {
        self.monsters.values().cloned().collect()
    }

    pub fn player_list(&self) -> Vec<Player> {
        self.players.values().cloned().collect()
    }

    // -----------------------------------------------------------------------
    // Registry
    // -----------------------------------------------------------------------

    /// Adds a player at the spawn point with a random color. An empty
    /// username becomes `Player_<id>`. Adding an id twice keeps the
    /// existing player.
    pub fn add_player(&mut self, id: PlayerId, username: &str) -> Player {
        if let Some(existing) = self.players.get(&id) {
            return existing.clone();
        }
        let username = match username.trim() {
            "" => format!("Player_{}", id.0),
            name => name.to_owned(),
        };
        let color = PLAYER_COLORS[self.rng.random_range(0..PLAYER_COLORS.len())];
        let position = self.open_cell_near(self.config.spawn_point);
        let player = Player::new(id, username, color, position, self.config.base_health);
        tracing::debug!(room_id = %self.id, %id, x = position.x, y = position.y, "player spawned");
        self.players.insert(id, player.clone());
        player
    }

    pub fn remove_player(&mut self, id: PlayerId) -> Option<Player> {
        self.players.remove(&id)
    }

    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            room_id: self.id.clone(),
            players: self.player_list(),
            map: self.map.clone(),
            monsters: self.monster_list(),
            phase: self.phase(),
            phase_started_at: self.phase_started_at(),
        }
    }

    /// True when a player or monster stands on `pos`.
    pub fn is_occupied(&self, pos: Position) -> bool {
        self.players.values().any(|p| p.position == pos)
            || self.monsters.values().any(|m| m.position == pos)
    }

    /// Closest walkable cell to `origin`, searching outward ring by ring.
    /// Falls back to `origin` on a map with no open ground.
    pub(crate) fn open_cell_near(&self, origin: Position) -> Position {
        let max_radius = self.map.width().max(self.map.height()) as i32;
        for radius in 0..=max_radius {
            for dy in -radius..=radius {
                for dx in -radius..=radius {
                    if dx.abs() != radius && dy.abs() != radius {
                        continue;
                    }
                    let pos = Position::new(origin.x + dx, origin.y + dy);
                    if self.map.is_walkable(pos) {
                        return pos;
                    }
                }
            }
        }
        origin
    }

    // -----------------------------------------------------------------------
    // Invariants
    // -----------------------------------------------------------------------

    /// Checks the map and every entity against the world invariants.
    pub fn check_invariants(&self) -> Result<(), WorldError> {
        self.map.check()?;
        for player in self.players.values() {
            if !self.map.is_walkable(player.position) {
                return Err(WorldError::Corrupted(format!(
                    "player {} stands on solid or missing cell ({}, {})",
                    player.id, player.position.x, player.position.y
                )));
            }
            if player.health > player.max_health {
                return Err(WorldError::Corrupted(format!(
                    "player {} health {} above maximum {}",
                    player.id, player.health, player.max_health
                )));
            }
        }
        for monster in self.monsters.values() {
            if !self.map.is_walkable(monster.position) {
                return Err(WorldError::Corrupted(format!(
                    "monster {} stands on solid or missing cell ({}, {})",
                    monster.id, monster.position.x, monster.position.y
                )));
            }
        }
        Ok(())
    }
}
