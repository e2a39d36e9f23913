//! Grid coordinates and the four movement directions.

use serde::{Deserialize, Serialize};

/// A cell coordinate. `y` grows downward, matching `cells[y][x]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The neighbouring cell one step in `direction`.
    pub fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        Self::new(self.x + dx, self.y + dy)
    }

    /// The cell directly beneath this one.
    pub fn below(self) -> Self {
        Self::new(self.x, self.y + 1)
    }

    pub fn manhattan(self, other: Position) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Chessboard distance; diagonal neighbours are 1 away.
    pub fn chebyshev(self, other: Position) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    #[default]
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_moves_one_cell() {
        let p = Position::new(25, 25);
        assert_eq!(p.step(Direction::Up), Position::new(25, 24));
        assert_eq!(p.step(Direction::Down), Position::new(25, 26));
        assert_eq!(p.step(Direction::Left), Position::new(24, 25));
        assert_eq!(p.step(Direction::Right), Position::new(26, 25));
    }

    #[test]
    fn test_distances() {
        let a = Position::new(1, 1);
        let b = Position::new(3, 2);
        assert_eq!(a.manhattan(b), 3);
        assert_eq!(a.chebyshev(b), 2);
        assert_eq!(a.chebyshev(a), 0);
    }

    #[test]
    fn test_direction_wire_names() {
        let d: Direction = serde_json::from_str("\"left\"").unwrap();
        assert_eq!(d, Direction::Left);
        assert_eq!(serde_json::to_string(&Direction::Up).unwrap(), "\"up\"");
    }
}
