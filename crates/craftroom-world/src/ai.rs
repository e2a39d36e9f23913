//! Phase transitions, monster spawning, chasing and attacks.

use rand::Rng;

use crate::cell::CellKind;
use crate::entity::{Monster, MonsterKind};
use crate::geometry::{Direction, Position};
use crate::ids::{MonsterId, PlayerId};
use crate::phase::Phase;
use crate::world::World;

/// What one simulation tick changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Set when the phase flipped this tick.
    pub phase: Option<Phase>,
    pub monsters_changed: bool,
    pub attacks: Vec<MonsterAttack>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonsterAttack {
    pub monster_id: MonsterId,
    pub player_id: PlayerId,
    /// Victim's health after the hit.
    pub health: u32,
    pub killed: bool,
}

impl World {
    /// Advances the simulation to `tick`.
    ///
    /// A tick that flips the phase only spawns or clears monsters; on any
    /// other night tick every monster moves once and then attacks.
    pub fn tick(&mut self, tick: u64) -> TickReport {
        let mut report = TickReport::default();
        if let Some(phase) = self.clock.advance(tick) {
            self.enter_phase(phase);
            report.phase = Some(phase);
            report.monsters_changed = true;
            return report;
        }
        if self.phase() == Phase::Night && !self.monsters.is_empty() {
            report.monsters_changed = self.step_monsters();
            report.attacks = self.monsters_attack();
        }
        report
    }

    /// Forces `phase` to begin at `tick`, with its spawn or clear.
    /// Returns how many monsters are alive afterwards.
    pub fn begin_phase(&mut self, phase: Phase, tick: u64) -> usize {
        self.clock.set(phase, tick);
        self.enter_phase(phase);
        self.monsters.len()
    }

    fn enter_phase(&mut self, phase: Phase) {
        match phase {
            Phase::Night => {
                let spawned = self.spawn_wave();
                tracing::info!(room_id = %self.id, spawned, "night falls");
            }
            Phase::Day => {
                let cleared = self.monsters.len();
                self.monsters.clear();
                tracing::info!(room_id = %self.id, cleared, "day breaks");
            }
        }
    }

    // -----------------------------------------------------------------------
    // Spawning
    // -----------------------------------------------------------------------

    fn spawn_wave(&mut self) -> usize {
        let low = self.config.spawn_min.min(self.config.spawn_max);
        let high = self.config.spawn_min.max(self.config.spawn_max);
        let wanted = self.rng.random_range(low..=high);
        let mut spawned = 0;
        for _ in 0..wanted {
            let Some(position) = self.find_spawn() else {
                tracing::debug!(room_id = %self.id, "no free cell for monster");
                continue;
            };
            let id = MonsterId(self.next_monster_id);
            self.next_monster_id += 1;
            self.monsters
                .insert(id, Monster::new(id, MonsterKind::Zombie, position));
            spawned += 1;
        }
        spawned
    }

    /// Random unoccupied grass cell, or `None` once the attempt budget runs
    /// out.
    fn find_spawn(&mut self) -> Option<Position> {
        let (width, height) = (self.map.width(), self.map.height());
        if width == 0 || height == 0 {
            return None;
        }
        for _ in 0..self.config.spawn_attempts {
            let pos = Position::new(
                self.rng.random_range(0..width) as i32,
                self.rng.random_range(0..height) as i32,
            );
            let grass = self.map.cell(pos).is_some_and(|c| c.kind == CellKind::Grass);
            if grass && !self.is_occupied(pos) {
                return Some(pos);
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Movement
    // -----------------------------------------------------------------------

    fn step_monsters(&mut self) -> bool {
        let ids: Vec<MonsterId> = self.monsters.keys().copied().collect();
        let mut moved = false;
        for id in ids {
            let Some(from) = self.monsters.get(&id).map(|m| m.position) else {
                continue;
            };
            let next = match self.nearest_prey(from) {
                Some(target) if from.manhattan(target) <= 1 => None,
                Some(target) => self.step_toward(from, target),
                None => self.wander(from),
            };
            if let (Some(to), Some(monster)) = (next, self.monsters.get_mut(&id)) {
                monster.position = to;
                moved = true;
            }
        }
        moved
    }

    /// Position of the closest living player within aggro range.
    fn nearest_prey(&self, from: Position) -> Option<Position> {
        self.players
            .values()
            .filter(|p| !p.is_dead())
            .map(|p| p.position)
            .filter(|pos| from.manhattan(*pos) <= self.config.aggro_radius)
            .min_by_key(|pos| from.manhattan(*pos))
    }

    fn step_toward(&self, from: Position, target: Position) -> Option<Position> {
        let mut candidates: Vec<Position> = Direction::ALL.iter().map(|d| from.step(*d)).collect();
        candidates.sort_by_key(|pos| pos.manhattan(target));
        candidates.into_iter().find(|pos| self.is_free(*pos))
    }

    fn wander(&mut self, from: Position) -> Option<Position> {
        let direction = Direction::ALL[self.rng.random_range(0..Direction::ALL.len())];
        let to = from.step(direction);
        self.is_free(to).then_some(to)
    }

    fn is_free(&self, pos: Position) -> bool {
        self.map.is_walkable(pos) && !self.is_occupied(pos)
    }

    // -----------------------------------------------------------------------
    // Attacks
    // -----------------------------------------------------------------------

    /// Each monster hits one adjacent living player, lowest id first.
    fn monsters_attack(&mut self) -> Vec<MonsterAttack> {
        let damage = self.config.monster_damage;
        let monsters: Vec<(MonsterId, Position)> = self
            .monsters
            .values()
            .map(|m| (m.id, m.position))
            .collect();
        let mut attacks = Vec::new();
        for (monster_id, at) in monsters {
            let victim = self
                .players
                .values_mut()
                .find(|p| !p.is_dead() && p.position.manhattan(at) <= 1);
            if let Some(player) = victim {
                player.health = player.health.saturating_sub(damage);
                attacks.push(MonsterAttack {
                    monster_id,
                    player_id: player.id,
                    health: player.health,
                    killed: player.is_dead(),
                });
            }
        }
        attacks
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::cell::Cell;
    use crate::config::WorldConfig;
    use crate::ids::RoomId;
    use crate::map::GameMap;

    fn world(ticks_per_phase: u64) -> World {
        World::with_map(
            RoomId::from("ai"),
            WorldConfig::default(),
            GameMap::open(50, 50),
            ticks_per_phase,
            StdRng::seed_from_u64(42),
        )
    }

    fn zombie(world: &mut World, id: u64, x: i32, y: i32) {
        world.monsters.insert(
            MonsterId(id),
            Monster::new(MonsterId(id), MonsterKind::Zombie, Position::new(x, y)),
        );
    }

    #[test]
    fn test_night_spawns_within_range_on_free_grass() {
        let mut w = world(5);
        w.add_player(PlayerId(1), "a");
        for tick in 1..5 {
            assert_eq!(w.tick(tick).phase, None);
        }
        let report = w.tick(5);
        assert_eq!(report.phase, Some(Phase::Night));
        let count = w.monsters.len();
        assert!((5..=9).contains(&count), "spawned {count}");
        for m in w.monsters() {
            assert_eq!(w.map().cell(m.position).unwrap().kind, CellKind::Grass);
            assert_ne!(m.position, Position::new(25, 25));
        }
        let positions: std::collections::HashSet<_> = w.monsters().map(|m| m.position).collect();
        assert_eq!(positions.len(), count);
    }

    #[test]
    fn test_day_clears_monsters() {
        let mut w = world(3);
        w.tick(3);
        assert!(!w.monsters.is_empty());
        let report = w.tick(6);
        assert_eq!(report.phase, Some(Phase::Day));
        assert!(w.monsters.is_empty());
    }

    #[test]
    fn test_spawn_gives_up_when_no_grass() {
        let mut w = world(0);
        for y in 1..49 {
            for x in 1..49 {
                w.map.set_cell(Position::new(x, y), Cell::new(CellKind::Stone));
            }
        }
        assert_eq!(w.begin_phase(Phase::Night, 0), 0);
    }

    #[test]
    fn test_zombie_chases_nearby_player() {
        let mut w = world(0);
        w.add_player(PlayerId(1), "a");
        w.clock.set(Phase::Night, 0);
        zombie(&mut w, 1, 25, 20);
        let report = w.tick(1);
        assert!(report.monsters_changed);
        assert_eq!(w.monster(MonsterId(1)).unwrap().position, Position::new(25, 21));
        assert!(report.attacks.is_empty());
    }

    #[test]
    fn test_zombie_never_enters_solid_cell() {
        let mut w = world(0);
        w.add_player(PlayerId(1), "a");
        w.clock.set(Phase::Night, 0);
        zombie(&mut w, 1, 25, 22);
        w.map.set_cell(Position::new(25, 23), Cell::new(CellKind::Stone));
        w.tick(1);
        let pos = w.monster(MonsterId(1)).unwrap().position;
        assert_ne!(pos, Position::new(25, 23));
        assert!(w.map().is_walkable(pos));
    }

    #[test]
    fn test_adjacent_zombie_attacks_and_kills() {
        let mut w = world(0);
        w.add_player(PlayerId(1), "a");
        w.clock.set(Phase::Night, 0);
        zombie(&mut w, 1, 25, 24);
        for tick in 1..=9 {
            let report = w.tick(tick);
            assert_eq!(report.attacks.len(), 1);
            assert!(!report.attacks[0].killed);
        }
        let report = w.tick(10);
        assert_eq!(
            report.attacks,
            vec![MonsterAttack {
                monster_id: MonsterId(1),
                player_id: PlayerId(1),
                health: 0,
                killed: true,
            }]
        );
        assert!(w.player(PlayerId(1)).unwrap().is_dead());
        assert!(w.tick(11).attacks.is_empty());
    }

    #[test]
    fn test_distant_zombie_wanders_deterministically() {
        let run = || {
            let mut w = world(0);
            w.clock.set(Phase::Night, 0);
            zombie(&mut w, 1, 10, 10);
            for tick in 1..=20 {
                w.tick(tick);
            }
            w.monster(MonsterId(1)).unwrap().position
        };
        assert_eq!(run(), run());
    }
}
