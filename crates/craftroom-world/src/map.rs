//! The fixed-size cell grid.

use serde::{Deserialize, Serialize};

use crate::cell::{Cell, CellKind};
use crate::error::WorldError;
use crate::geometry::Position;

/// A rectangular grid of cells, addressed `cells[y][x]`.
///
/// Dimensions never change after creation and the outer ring is always
/// solid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMap {
    width: usize,
    height: usize,
    cells: Vec<Vec<Cell>>,
}

impl GameMap {
    /// All-grass interior inside a stone border.
    pub fn open(width: usize, height: usize) -> Self {
        let cells = (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| {
                        if is_border_index(x, y, width, height) {
                            Cell::border()
                        } else {
                            Cell::grass()
                        }
                    })
                    .collect()
            })
            .collect();
        Self { width, height, cells }
    }

    pub(crate) fn from_rows(width: usize, height: usize, cells: Vec<Vec<Cell>>) -> Self {
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.cells
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        let x = usize::try_from(pos.x).ok()?;
        let y = usize::try_from(pos.y).ok()?;
        (x < self.width && y < self.height).then_some((x, y))
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    pub fn is_border(&self, pos: Position) -> bool {
        self.index(pos)
            .is_some_and(|(x, y)| is_border_index(x, y, self.width, self.height))
    }

    /// In bounds and not on the border ring.
    pub fn is_interior(&self, pos: Position) -> bool {
        self.in_bounds(pos) && !self.is_border(pos)
    }

    pub fn cell(&self, pos: Position) -> Option<&Cell> {
        self.index(pos).map(|(x, y)| &self.cells[y][x])
    }

    pub(crate) fn cell_mut(&mut self, pos: Position) -> Option<&mut Cell> {
        self.index(pos).map(|(x, y)| &mut self.cells[y][x])
    }

    /// Replaces an interior cell. The border cannot be overwritten.
    pub fn set_cell(&mut self, pos: Position, cell: Cell) -> bool {
        if !self.is_interior(pos) {
            return false;
        }
        match self.cell_mut(pos) {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// In bounds and not solid.
    pub fn is_walkable(&self, pos: Position) -> bool {
        self.cell(pos).is_some_and(|cell| !cell.is_solid())
    }

    /// Grass cells of the interior, scanned row by row.
    pub fn grass_cells(&self) -> impl Iterator<Item = Position> + '_ {
        self.cells.iter().enumerate().flat_map(move |(y, row)| {
            row.iter().enumerate().filter_map(move |(x, cell)| {
                (cell.kind == CellKind::Grass).then(|| Position::new(x as i32, y as i32))
            })
        })
    }

    /// Verifies grid shape, the solid border, and every cell.
    pub fn check(&self) -> Result<(), WorldError> {
        if self.cells.len() != self.height
            || self.cells.iter().any(|row| row.len() != self.width)
        {
            return Err(WorldError::Corrupted(format!(
                "cell grid does not match {}x{}",
                self.width, self.height
            )));
        }
        for (y, row) in self.cells.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                if is_border_index(x, y, self.width, self.height) && !cell.is_solid() {
                    return Err(WorldError::Corrupted(format!(
                        "border cell ({x}, {y}) is not solid"
                    )));
                }
                if let Some(reason) = cell.violation() {
                    return Err(WorldError::Corrupted(format!("cell ({x}, {y}): {reason}")));
                }
            }
        }
        Ok(())
    }
}

fn is_border_index(x: usize, y: usize, width: usize, height: usize) -> bool {
    x == 0 || y == 0 || x + 1 == width || y + 1 == height
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_map_has_stone_ring() {
        let map = GameMap::open(5, 4);
        assert!(map.is_border(Position::new(0, 2)));
        assert!(map.is_border(Position::new(4, 0)));
        assert!(map.is_border(Position::new(2, 3)));
        assert!(map.is_walkable(Position::new(2, 2)));
        assert!(!map.is_walkable(Position::new(0, 0)));
        assert_eq!(map.grass_cells().count(), 3 * 2);
        assert!(map.check().is_ok());
    }

    #[test]
    fn test_negative_and_far_positions_out_of_bounds() {
        let map = GameMap::open(5, 5);
        assert!(!map.in_bounds(Position::new(-1, 2)));
        assert!(!map.in_bounds(Position::new(2, 5)));
        assert!(map.cell(Position::new(5, 0)).is_none());
    }

    #[test]
    fn test_set_cell_refuses_border() {
        let mut map = GameMap::open(5, 5);
        assert!(!map.set_cell(Position::new(0, 0), Cell::grass()));
        assert!(map.set_cell(Position::new(1, 1), Cell::new(CellKind::Tree)));
        assert_eq!(map.cell(Position::new(1, 1)).unwrap().kind, CellKind::Tree);
    }

    #[test]
    fn test_check_catches_corrupted_cell() {
        let mut map = GameMap::open(5, 5);
        map.cell_mut(Position::new(2, 2)).unwrap().current_durability = 7;
        assert!(matches!(map.check(), Err(WorldError::Corrupted(_))));
    }

    #[test]
    fn test_wire_layout_is_rows_of_cells() {
        let json = serde_json::to_value(GameMap::open(3, 3)).unwrap();
        assert_eq!(json["width"], 3);
        assert_eq!(json["cells"][1][1]["type"], "grass");
        assert_eq!(json["cells"][0][1]["type"], "stone");
    }
}
