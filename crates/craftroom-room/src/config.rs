//! Room configuration.

use std::time::Duration;

use craftroom_tick::TickConfig;
use craftroom_world::{RoomId, StdRng, World, WorldConfig};
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// Settings shared by every room a [`RoomManager`](crate::RoomManager)
/// creates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Simulation clock. One tick per second by default.
    pub tick: TickConfig,

    /// Length of one day or one night.
    pub phase_duration: Duration,

    /// A room with no players for this long shuts itself down.
    /// Zero keeps empty rooms alive until they are destroyed.
    pub idle_timeout: Duration,

    /// Capacity of the actor's command channel.
    pub channel_size: usize,

    /// Fixed map seed. `None` draws one from the OS for every room.
    pub seed: Option<u64>,

    pub world: WorldConfig,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            tick: TickConfig::default(),
            phase_duration: Duration::from_secs(60),
            idle_timeout: Duration::from_secs(300),
            channel_size: 64,
            seed: None,
            world: WorldConfig::default(),
        }
    }
}

impl RoomConfig {
    /// Ticks in one phase at the configured rate, at least one.
    /// Zero when ticking is disabled, which freezes the phase.
    pub fn ticks_per_phase(&self) -> u64 {
        match self.tick.clone().validated().period() {
            Some(period) => (self.phase_duration.as_nanos().div_ceil(period.as_nanos()) as u64).max(1),
            None => 0,
        }
    }

    /// A fresh world for `room_id`, with a generated map.
    pub fn build_world(&self, room_id: RoomId) -> World {
        let rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        World::new(room_id, self.world.clone(), self.ticks_per_phase(), rng)
    }
}
