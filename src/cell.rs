use serde::{Deserialize, Serialize};

/// Contents of one grid position.
///
/// `adjacent_mines` is only computed for non-mine cells and stays `0` on mines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    is_mine: bool,
    adjacent_mines: u8,
}

impl Cell {
    pub fn is_mine(&self) -> bool {
        self.is_mine
    }

    pub fn set_mine(&mut self, is_mine: bool) {
        self.is_mine = is_mine;
    }

    pub fn adjacent_mines(&self) -> u8 {
        self.adjacent_mines
    }

    pub fn set_adjacent_mines(&mut self, adjacent_mines: u8) {
        self.adjacent_mines = adjacent_mines;
    }
}
