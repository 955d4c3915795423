use crate::grid::validate_dimensions;
use crate::Result;

/// Board size and mine count for a new game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameConfig {
    rows: u32,
    columns: u32,
    mines: u32,
}

impl GameConfig {
    pub fn new(rows: u32, columns: u32, mines: u32) -> Result<Self> {
        validate_dimensions(rows, columns, mines)?;
        Ok(Self {
            rows,
            columns,
            mines,
        })
    }

    /// 10x10 with 20 mines.
    pub const fn classic() -> Self {
        Self {
            rows: 10,
            columns: 10,
            mines: 20,
        }
    }

    pub const fn beginner() -> Self {
        Self {
            rows: 9,
            columns: 9,
            mines: 10,
        }
    }

    pub const fn intermediate() -> Self {
        Self {
            rows: 16,
            columns: 16,
            mines: 40,
        }
    }

    pub const fn expert() -> Self {
        Self {
            rows: 16,
            columns: 30,
            mines: 99,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn mines(&self) -> u32 {
        self.mines
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::classic()
    }
}
