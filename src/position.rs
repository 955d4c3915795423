use serde::{Deserialize, Serialize};

/// A `(row, col)` coordinate on the grid.
///
/// Signed so that coordinates computed by a host (or neighbours of an edge
/// cell) can fall outside the grid and be rejected by a bounds check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub col: i32,
}

impl Position {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        (-1..=1).flat_map(move |dr| {
            (-1..=1).filter_map(move |dc| {
                if dr == 0 && dc == 0 {
                    None
                } else {
                    Some(Position::new(self.row + dr, self.col + dc))
                }
            })
        })
    }

    /// Array index for this position, if it lies inside a `rows x columns` grid.
    pub fn to_index(self, rows: u32, columns: u32) -> Option<(usize, usize)> {
        if self.row >= 0 && self.col >= 0 && (self.row as u32) < rows && (self.col as u32) < columns
        {
            Some((self.row as usize, self.col as usize))
        } else {
            None
        }
    }
}

impl From<(usize, usize)> for Position {
    fn from((row, col): (usize, usize)) -> Self {
        Position::new(row as i32, col as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_creation() {
        let pos = Position::new(5, 10);
        assert_eq!(pos.row, 5);
        assert_eq!(pos.col, 10);
    }

    #[test]
    fn test_neighbors() {
        let pos = Position::new(1, 1);
        let neighbors: Vec<Position> = pos.neighbors().collect();

        assert_eq!(neighbors.len(), 8);
        assert!(neighbors.contains(&Position::new(0, 0))); // Top-left
        assert!(neighbors.contains(&Position::new(0, 1))); // Top
        assert!(neighbors.contains(&Position::new(0, 2))); // Top-right
        assert!(neighbors.contains(&Position::new(1, 0))); // Left
        assert!(neighbors.contains(&Position::new(1, 2))); // Right
        assert!(neighbors.contains(&Position::new(2, 0))); // Bottom-left
        assert!(neighbors.contains(&Position::new(2, 1))); // Bottom
        assert!(neighbors.contains(&Position::new(2, 2))); // Bottom-right
        assert!(!neighbors.contains(&pos));
    }

    #[test]
    fn test_to_index_bounds() {
        assert_eq!(Position::new(0, 0).to_index(3, 4), Some((0, 0)));
        assert_eq!(Position::new(2, 3).to_index(3, 4), Some((2, 3)));
        assert_eq!(Position::new(3, 0).to_index(3, 4), None);
        assert_eq!(Position::new(0, 4).to_index(3, 4), None);
        assert_eq!(Position::new(-1, 0).to_index(3, 4), None);
        assert_eq!(Position::new(0, -1).to_index(3, 4), None);
    }
}
