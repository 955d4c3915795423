use crate::{Cell, GameError, GameState, Position, Result};
use itertools::iproduct;
use ndarray::{Array2, Zip};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::iter;
use tracing::{debug, warn};

pub const MAX_REGENERATION_ATTEMPTS: u32 = 1_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FirstClick {
    AlreadyOpen,
    Regenerated { attempts: u32 },
    // `open` is false when the grid is too dense for a zero start.
    Constructed { open: bool },
    OutOfBounds,
}

#[derive(Debug, Clone)]
pub struct Grid {
    rows: u32,
    columns: u32,
    total_mines: u32,
    cells: Array2<Cell>,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    rng: StdRng,
}

impl Grid {
    pub fn new(rows: u32, columns: u32, total_mines: u32) -> Result<Self> {
        Self::with_rng(rows, columns, total_mines, StdRng::from_entropy())
    }

    pub fn with_seed(rows: u32, columns: u32, total_mines: u32, seed: u64) -> Result<Self> {
        Self::with_rng(rows, columns, total_mines, StdRng::seed_from_u64(seed))
    }

    fn with_rng(rows: u32, columns: u32, total_mines: u32, rng: StdRng) -> Result<Self> {
        validate_dimensions(rows, columns, total_mines)?;

        let shape = (rows as usize, columns as usize);
        let mut grid = Grid {
            rows,
            columns,
            total_mines,
            cells: Array2::default(shape),
            revealed: Array2::from_elem(shape, false),
            flagged: Array2::from_elem(shape, false),
            rng,
        };
        grid.place_mines();
        grid.calculate_adjacent_mines();
        Ok(grid)
    }

    /// A cell marked both revealed and flagged keeps the reveal.
    pub fn from_layout(
        mines: Array2<bool>,
        revealed: Array2<bool>,
        mut flagged: Array2<bool>,
    ) -> Result<Self> {
        let (rows, columns) = mines.dim();
        if rows == 0 || columns == 0 {
            return Err(GameError::EmptyGrid);
        }
        if revealed.dim() != mines.dim() || flagged.dim() != mines.dim() {
            return Err(GameError::ShapeMismatch);
        }

        let (rows, columns) = (rows as u32, columns as u32);
        let total_mines = mines.iter().filter(|&&is_mine| is_mine).count() as u32;
        validate_dimensions(rows, columns, total_mines)?;

        Zip::from(&mut flagged)
            .and(&revealed)
            .for_each(|flag, &is_revealed| {
                if is_revealed {
                    *flag = false;
                }
            });

        let cells = mines.map(|&is_mine| {
            let mut cell = Cell::default();
            cell.set_mine(is_mine);
            cell
        });

        let mut grid = Grid {
            rows,
            columns,
            total_mines,
            cells,
            revealed,
            flagged,
            rng: StdRng::from_entropy(),
        };
        grid.calculate_adjacent_mines();
        Ok(grid)
    }

    pub fn restore(state: &GameState) -> Result<Self> {
        Self::from_layout(
            state.mines().clone(),
            state.revealed().clone(),
            state.flagged().clone(),
        )
    }

    pub fn snapshot(&self, elapsed_time: f32) -> GameState {
        GameState::new(
            self.cells.map(Cell::is_mine),
            self.revealed.clone(),
            self.flagged.clone(),
            elapsed_time,
        )
    }

    fn place_mines(&mut self) {
        let mut mines_placed = 0;

        while mines_placed < self.total_mines {
            let row = self.rng.gen_range(0..self.rows as usize);
            let col = self.rng.gen_range(0..self.columns as usize);
            let cell = &mut self.cells[(row, col)];

            if !cell.is_mine() {
                cell.set_mine(true);
                mines_placed += 1;
            }
        }
    }

    fn calculate_adjacent_mines(&mut self) {
        for index in self.indices() {
            if !self.cells[index].is_mine() {
                let count = self.count_adjacent_mines(Position::from(index));
                self.cells[index].set_adjacent_mines(count);
            }
        }
    }

    pub fn count_adjacent_mines(&self, pos: Position) -> u8 {
        pos.neighbors()
            .filter_map(|p| self.index(p))
            .filter(|&index| self.cells[index].is_mine())
            .count() as u8
    }

    fn reset(&mut self) {
        self.cells.fill(Cell::default());
        self.revealed.fill(false);
        self.flagged.fill(false);
    }

    /// Reveals the cell at `pos`, flooding outwards from zero cells.
    ///
    /// Returns `true` only when the revealed cell is a mine. Out-of-bounds,
    /// revealed and flagged targets are ignored.
    pub fn uncover_cell(&mut self, pos: Position) -> bool {
        let Some(index) = self.index(pos) else {
            return false;
        };
        if self.revealed[index] || self.flagged[index] {
            return false;
        }

        self.revealed[index] = true;
        let cell = self.cells[index];
        if cell.is_mine() {
            return true;
        }
        if cell.adjacent_mines() == 0 {
            self.flood_from(index);
        }
        false
    }

    fn flood_from(&mut self, origin: (usize, usize)) {
        let mut to_visit = vec![origin];
        let mut opened = 0usize;

        while let Some(current) = to_visit.pop() {
            let current = Position::from(current);
            for neighbor in current.neighbors() {
                let Some(index) = self.index(neighbor) else {
                    continue;
                };
                if self.revealed[index] || self.flagged[index] || self.cells[index].is_mine() {
                    continue;
                }

                self.revealed[index] = true;
                opened += 1;
                if self.cells[index].adjacent_mines() == 0 {
                    to_visit.push(index);
                }
            }
        }

        debug!(row = origin.0, col = origin.1, opened, "flood fill");
    }

    pub fn flag_cell(&mut self, pos: Position) {
        if let Some(index) = self.index(pos) {
            if !self.revealed[index] {
                self.flagged[index] = !self.flagged[index];
            }
        }
    }

    pub fn is_cleared(&self) -> bool {
        self.cells
            .iter()
            .zip(self.revealed.iter())
            .all(|(cell, &revealed)| cell.is_mine() || revealed)
    }

    /// Rearranges the mines so that `pos` is a mine-free cell with no mined
    /// neighbours, clearing all marks if the layout changes.
    pub fn ensure_first_click_safe(&mut self, pos: Position) -> FirstClick {
        let Some(target) = self.index(pos) else {
            return FirstClick::OutOfBounds;
        };
        if self.is_open_start(target) {
            return FirstClick::AlreadyOpen;
        }

        if self.open_start_possible(target) {
            for attempts in 1..=MAX_REGENERATION_ATTEMPTS {
                self.reset();
                self.place_mines();
                self.calculate_adjacent_mines();
                if self.is_open_start(target) {
                    debug!(row = pos.row, col = pos.col, attempts, "regenerated for safe start");
                    return FirstClick::Regenerated { attempts };
                }
            }
            debug!(
                row = pos.row,
                col = pos.col,
                "regeneration cap reached, constructing layout"
            );
        }

        let open = self.place_mines_around(target);
        FirstClick::Constructed { open }
    }

    fn is_open_start(&self, index: (usize, usize)) -> bool {
        let cell = self.cells[index];
        !cell.is_mine() && cell.adjacent_mines() == 0
    }

    fn safe_block(&self, target: (usize, usize)) -> Vec<(usize, usize)> {
        iter::once(target)
            .chain(Position::from(target).neighbors().filter_map(|p| self.index(p)))
            .collect()
    }

    fn open_start_possible(&self, target: (usize, usize)) -> bool {
        self.total_mines as usize + self.safe_block(target).len() <= self.cells.len()
    }

    fn place_mines_around(&mut self, target: (usize, usize)) -> bool {
        let block = self.safe_block(target);
        let open = self.total_mines as usize + block.len() <= self.cells.len();
        let excluded = if open { &block[..] } else { &block[..1] };
        if !open {
            warn!(
                row = target.0,
                col = target.1,
                mines = self.total_mines,
                "grid too dense for an open start, keeping only the target safe"
            );
        }

        let mut candidates: Vec<(usize, usize)> = self
            .indices()
            .filter(|index| !excluded.contains(index))
            .collect();
        candidates.shuffle(&mut self.rng);

        self.reset();
        for &index in candidates.iter().take(self.total_mines as usize) {
            self.cells[index].set_mine(true);
        }
        self.calculate_adjacent_mines();
        open
    }

    fn index(&self, pos: Position) -> Option<(usize, usize)> {
        pos.to_index(self.rows, self.columns)
    }

    fn indices(&self) -> impl Iterator<Item = (usize, usize)> {
        iproduct!(0..self.rows as usize, 0..self.columns as usize)
    }

    pub fn positions(&self) -> impl Iterator<Item = Position> {
        self.indices().map(Position::from)
    }

    pub fn contains(&self, pos: Position) -> bool {
        self.index(pos).is_some()
    }

    pub fn get_cell(&self, pos: Position) -> Result<&Cell> {
        self.index(pos)
            .map(|index| &self.cells[index])
            .ok_or(GameError::OutOfBounds(pos))
    }

    pub fn is_revealed(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|index| self.revealed[index])
    }

    pub fn is_flagged(&self, pos: Position) -> bool {
        self.index(pos).is_some_and(|index| self.flagged[index])
    }

    pub fn revealed_count(&self) -> usize {
        self.revealed.iter().filter(|&&revealed| revealed).count()
    }

    pub fn flag_count(&self) -> usize {
        self.flagged.iter().filter(|&&flagged| flagged).count()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.rows, self.columns)
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn total_mines(&self) -> u32 {
        self.total_mines
    }
}

pub(crate) fn validate_dimensions(rows: u32, columns: u32, mines: u32) -> Result<()> {
    if rows == 0 || columns == 0 {
        return Err(GameError::EmptyGrid);
    }
    if u64::from(mines) >= u64::from(rows) * u64::from(columns) {
        return Err(GameError::TooManyMines {
            rows,
            columns,
            mines,
        });
    }
    Ok(())
}
