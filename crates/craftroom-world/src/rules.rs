//! Player actions. Each one validates fully before mutating, so an `Err`
//! always leaves the world untouched.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKind};
use crate::entity::{MAX_HOTBAR_SLOT, Player};
use crate::error::ActionError;
use crate::geometry::{Direction, Position};
use crate::ids::{MonsterId, PlayerId};
use crate::item::{ArmorSlot, Inventory, ItemKind, ToolKind, starting_inventory};
use crate::phase::Phase;
use crate::world::World;

/// Where a mine or place action is aimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    /// The neighbouring cell in a direction.
    Toward(Direction),
    /// An explicit cell, which must be within reach.
    At(Position),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Moved {
    pub player_id: PlayerId,
    pub position: Position,
    pub direction: Direction,
    /// False when the step was blocked; only the facing changed.
    pub moved: bool,
}

/// A cell changed by mining or placing.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockChange {
    pub player_id: PlayerId,
    pub position: Position,
    pub cell: Cell,
    pub inventory: Inventory,
    /// Set when mining broke the cell.
    pub broken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Traded {
    pub acquired: ItemKind,
    pub inventory: Inventory,
}

/// Inventory, armor and health after an equip change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Loadout {
    pub inventory: Inventory,
    pub equipped_armor: BTreeMap<ArmorSlot, ItemKind>,
    pub health: u32,
    pub max_health: u32,
}

impl Loadout {
    fn of(player: &Player) -> Self {
        Self {
            inventory: player.inventory.clone(),
            equipped_armor: player.equipped_armor.clone(),
            health: player.health,
            max_health: player.max_health,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attacked {
    pub monster_id: MonsterId,
    pub defeated: bool,
}

fn invalid(pos: Position) -> ActionError {
    ActionError::InvalidPosition { x: pos.x, y: pos.y }
}

impl World {
    fn living(&self, id: PlayerId) -> Result<&Player, ActionError> {
        let player = self.players.get(&id).ok_or(ActionError::PlayerNotFound(id))?;
        if player.is_dead() {
            return Err(ActionError::PlayerDead(id));
        }
        Ok(player)
    }

    fn living_mut(&mut self, id: PlayerId) -> Result<&mut Player, ActionError> {
        let player = self
            .players
            .get_mut(&id)
            .ok_or(ActionError::PlayerNotFound(id))?;
        if player.is_dead() {
            return Err(ActionError::PlayerDead(id));
        }
        Ok(player)
    }

    /// Resolves a target to an interior cell within reach of `origin`.
    fn resolve(&self, origin: Position, target: Target) -> Result<Position, ActionError> {
        let pos = match target {
            Target::Toward(direction) => origin.step(direction),
            Target::At(pos) => pos,
        };
        if origin.chebyshev(pos) > self.config.reach || !self.map.is_interior(pos) {
            return Err(invalid(pos));
        }
        Ok(pos)
    }

    /// Turns the player and steps if the cell ahead is open.
    pub fn move_player(&mut self, id: PlayerId, direction: Direction) -> Result<Moved, ActionError> {
        let ahead = self.living(id)?.position.step(direction);
        let open = self.map.is_walkable(ahead);
        let player = self.living_mut(id)?;
        player.facing = direction;
        if open {
            player.position = ahead;
        }
        Ok(Moved {
            player_id: id,
            position: player.position,
            direction,
            moved: open,
        })
    }

    /// Hits a cell once with `tool`. A cell worn to zero turns to grass and
    /// pays out its yield.
    pub fn mine(
        &mut self,
        id: PlayerId,
        target: Target,
        tool: ToolKind,
    ) -> Result<BlockChange, ActionError> {
        let player = self.living(id)?;
        let pos = self.resolve(player.position, target)?;
        if let Some(item) = tool.item() {
            if player.count(item) == 0 {
                return Err(ActionError::InsufficientItem(item));
            }
        }
        let kind = self.map.cell(pos).ok_or_else(|| invalid(pos))?.kind;
        let Some(material) = kind.material() else {
            return Err(ActionError::AlreadyGrass { x: pos.x, y: pos.y });
        };
        let damage = self.config.efficiency.get(tool, material);
        if damage == 0 {
            return Err(ActionError::ToolIneffective { tool, cell: kind });
        }

        let broken = self
            .map
            .cell_mut(pos)
            .ok_or_else(|| invalid(pos))?
            .wear(damage);
        let mut payout = None;
        if broken {
            self.map.set_cell(pos, Cell::grass());
            if let Some((item, range)) = kind.yield_range() {
                payout = Some((item, self.rng.random_range(range)));
            }
        }
        let player = self
            .players
            .get_mut(&id)
            .ok_or(ActionError::PlayerNotFound(id))?;
        if let Some((item, amount)) = payout {
            player.give(item, amount);
        }
        let inventory = player.inventory.clone();
        let cell = self.map.cell(pos).cloned().ok_or_else(|| invalid(pos))?;
        Ok(BlockChange {
            player_id: id,
            position: pos,
            cell,
            inventory,
            broken,
        })
    }

    /// Puts one `item` down as a block on open, supported grass.
    pub fn place(
        &mut self,
        id: PlayerId,
        target: Target,
        item: ItemKind,
    ) -> Result<BlockChange, ActionError> {
        let player = self.living(id)?;
        let kind = item.placed_cell().ok_or(ActionError::NotPlaceable(item))?;
        if player.count(item) == 0 {
            return Err(ActionError::InsufficientItem(item));
        }
        let pos = self.resolve(player.position, target)?;
        let on_grass = self.map.cell(pos).is_some_and(|c| c.kind == CellKind::Grass);
        let supported = self
            .map
            .cell(pos.below())
            .is_some_and(|c| c.kind.is_natural_surface());
        if !on_grass || !supported || self.is_occupied(pos) {
            return Err(invalid(pos));
        }

        let cell = Cell::new(kind);
        self.map.set_cell(pos, cell.clone());
        let player = self
            .players
            .get_mut(&id)
            .ok_or(ActionError::PlayerNotFound(id))?;
        player.take(item, 1);
        Ok(BlockChange {
            player_id: id,
            position: pos,
            cell,
            inventory: player.inventory.clone(),
            broken: false,
        })
    }

    /// Exchanges materials for one `item` per its recipe.
    pub fn trade(&mut self, id: PlayerId, item: ItemKind) -> Result<Traded, ActionError> {
        let player = self.living_mut(id)?;
        let recipe = item.recipe().ok_or(ActionError::NotTradeable(item))?;
        if !player.take(recipe.material, recipe.amount) {
            return Err(ActionError::InsufficientMaterial {
                material: recipe.material,
                required: recipe.amount,
                available: player.count(recipe.material),
            });
        }
        player.give(item, 1);
        Ok(Traded {
            acquired: item,
            inventory: player.inventory.clone(),
        })
    }

    /// Wears `item` in `slot`; a piece already there goes back to the
    /// inventory.
    pub fn equip(
        &mut self,
        id: PlayerId,
        slot: ArmorSlot,
        item: ItemKind,
    ) -> Result<Loadout, ActionError> {
        let base_health = self.config.base_health;
        let player = self.living_mut(id)?;
        if item.armor_slot() != Some(slot) {
            return Err(ActionError::InvalidSlotMatch { item, slot });
        }
        if !player.take(item, 1) {
            return Err(ActionError::InsufficientItem(item));
        }
        if let Some(previous) = player.equipped_armor.insert(slot, item) {
            player.give(previous, 1);
        }
        player.refresh_max_health(base_health);
        Ok(Loadout::of(player))
    }

    pub fn unequip(&mut self, id: PlayerId, slot: ArmorSlot) -> Result<Loadout, ActionError> {
        let base_health = self.config.base_health;
        let player = self.living_mut(id)?;
        let item = player
            .equipped_armor
            .remove(&slot)
            .ok_or(ActionError::EmptySlot(slot))?;
        player.give(item, 1);
        player.refresh_max_health(base_health);
        Ok(Loadout::of(player))
    }

    /// Night-only melee. The killing blow scores a point.
    pub fn attack(&mut self, id: PlayerId, monster_id: MonsterId) -> Result<Attacked, ActionError> {
        self.living(id)?;
        if self.phase() != Phase::Night {
            return Err(ActionError::NotNight);
        }
        let damage = self.config.player_damage;
        let monster = self
            .monsters
            .get_mut(&monster_id)
            .ok_or(ActionError::MonsterNotFound(monster_id))?;
        monster.hp = monster.hp.saturating_sub(damage);
        let defeated = monster.hp == 0;
        if defeated {
            self.monsters.remove(&monster_id);
            if let Some(player) = self.players.get_mut(&id) {
                player.score += 1;
            }
            tracing::debug!(room_id = %self.id, %id, %monster_id, "monster defeated");
        }
        Ok(Attacked { monster_id, defeated })
    }

    pub fn select_slot(&mut self, id: PlayerId, slot: u8) -> Result<u8, ActionError> {
        let player = self.living_mut(id)?;
        if slot > MAX_HOTBAR_SLOT {
            return Err(ActionError::InvalidSlot(slot));
        }
        player.selected_slot = slot;
        Ok(slot)
    }

    /// Respawns a player with fresh health and an empty kit. Score is
    /// kept. Works on dead players.
    pub fn restart(&mut self, id: PlayerId) -> Result<Player, ActionError> {
        if !self.players.contains_key(&id) {
            return Err(ActionError::PlayerNotFound(id));
        }
        let spawn = self.open_cell_near(self.config.spawn_point);
        let base_health = self.config.base_health;
        let player = self
            .players
            .get_mut(&id)
            .ok_or(ActionError::PlayerNotFound(id))?;
        player.position = spawn;
        player.facing = Direction::default();
        player.health = base_health;
        player.max_health = base_health;
        player.inventory = starting_inventory();
        player.equipped_armor.clear();
        player.selected_slot = 0;
        Ok(player.clone())
    }
}
