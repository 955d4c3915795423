use crate::{GameConfig, GameError, GameState, Grid, Position, Preferences, Result};
use std::time::Instant;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// No cell touched yet; the first action will make its cell safe.
    Fresh,
    Playing,
    Won,
    Lost,
}

impl Status {
    pub fn is_over(self) -> bool {
        matches!(self, Status::Won | Status::Lost)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Reveal,
    Flag,
}

/// Result of a single accepted action.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome {
    NoChange,
    Revealed,
    Flagged { flagged: bool },
    HitMine,
    Won { time: f32, new_best: bool },
}

/// Seconds of play, resumable from a saved offset.
#[derive(Debug, Clone, Copy, Default)]
struct Stopwatch {
    offset: f32,
    started_at: Option<Instant>,
    stopped_at: Option<f32>,
}

impl Stopwatch {
    fn resumed(offset: f32) -> Self {
        Self {
            offset,
            ..Self::default()
        }
    }

    fn start(&mut self) {
        if self.started_at.is_none() && self.stopped_at.is_none() {
            self.started_at = Some(Instant::now());
        }
    }

    fn stop(&mut self) -> f32 {
        let elapsed = self.elapsed();
        self.stopped_at = Some(elapsed);
        elapsed
    }

    fn elapsed(&self) -> f32 {
        if let Some(stopped) = self.stopped_at {
            return stopped;
        }
        self.offset
            + self
                .started_at
                .map_or(0.0, |started| started.elapsed().as_secs_f32())
    }
}

/// One play session: the grid, its status, the clock and the best-time store.
pub struct Game {
    grid: Grid,
    status: Status,
    clock: Stopwatch,
    preferences: Preferences,
}

impl Game {
    pub fn new(config: GameConfig, preferences: Preferences) -> Result<Self> {
        let grid = Grid::new(config.rows(), config.columns(), config.mines())?;
        Ok(Self::start(grid, preferences))
    }

    pub fn with_seed(config: GameConfig, seed: u64, preferences: Preferences) -> Result<Self> {
        let grid = Grid::with_seed(config.rows(), config.columns(), config.mines(), seed)?;
        Ok(Self::start(grid, preferences))
    }

    fn start(grid: Grid, preferences: Preferences) -> Self {
        Self {
            grid,
            status: Status::Fresh,
            clock: Stopwatch::default(),
            preferences,
        }
    }

    /// Continues a saved game. The clock resumes from the saved time on the
    /// next action; a finished game stays finished.
    pub fn resume(state: &GameState, preferences: Preferences) -> Result<Self> {
        let grid = Grid::restore(state)?;
        let mut clock = Stopwatch::resumed(state.elapsed_time());

        let status = if mine_revealed(&grid) {
            Status::Lost
        } else if grid.is_cleared() {
            Status::Won
        } else if state.safe_start_used() || grid.revealed_count() > 0 || grid.flag_count() > 0 {
            Status::Playing
        } else {
            Status::Fresh
        };
        if status.is_over() {
            clock.stop();
        }

        debug!(?status, elapsed = state.elapsed_time(), "resumed game");
        Ok(Self {
            grid,
            status,
            clock,
            preferences,
        })
    }

    pub fn perform_action(&mut self, pos: Position, action: Action) -> Result<Outcome> {
        if self.status.is_over() {
            return Err(GameError::InvalidGameState);
        }
        if !self.grid.contains(pos) {
            return Err(GameError::OutOfBounds(pos));
        }

        if self.status == Status::Fresh {
            let first_click = self.grid.ensure_first_click_safe(pos);
            debug!(?first_click, row = pos.row, col = pos.col, "first click");
            self.status = Status::Playing;
        }
        self.clock.start();

        match action {
            Action::Reveal => Ok(self.reveal(pos)),
            Action::Flag => Ok(self.toggle_flag(pos)),
        }
    }

    fn reveal(&mut self, pos: Position) -> Outcome {
        if self.grid.is_revealed(pos) || self.grid.is_flagged(pos) {
            return Outcome::NoChange;
        }

        if self.grid.uncover_cell(pos) {
            self.status = Status::Lost;
            let time = self.clock.stop();
            info!(row = pos.row, col = pos.col, time, "hit a mine");
            return Outcome::HitMine;
        }

        if self.grid.is_cleared() {
            self.status = Status::Won;
            let time = self.clock.stop();
            let new_best = match self.preferences.record_time(time) {
                Ok(new_best) => new_best,
                Err(e) => {
                    warn!(error = %e, "could not save best time");
                    self.preferences.best_time() == Some(time)
                }
            };
            info!(time, new_best, "grid cleared");
            return Outcome::Won { time, new_best };
        }

        Outcome::Revealed
    }

    fn toggle_flag(&mut self, pos: Position) -> Outcome {
        if self.grid.is_revealed(pos) {
            return Outcome::NoChange;
        }
        self.grid.flag_cell(pos);
        Outcome::Flagged {
            flagged: self.grid.is_flagged(pos),
        }
    }

    pub fn snapshot(&self) -> GameState {
        let state = self.grid.snapshot(self.elapsed());
        if self.status == Status::Fresh {
            state
        } else {
            state.with_safe_start_used()
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    /// Seconds since the first action, frozen once the game ends.
    pub fn elapsed(&self) -> f32 {
        self.clock.elapsed()
    }

    pub fn best_time(&self) -> Option<f32> {
        self.preferences.best_time()
    }

    /// Mines minus flags placed; negative when over-flagged.
    pub fn mines_remaining(&self) -> i64 {
        i64::from(self.grid.total_mines()) - self.grid.flag_count() as i64
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.grid.dimensions()
    }
}

fn mine_revealed(grid: &Grid) -> bool {
    grid.positions().any(|pos| {
        grid.is_revealed(pos) && grid.get_cell(pos).is_ok_and(|cell| cell.is_mine())
    })
}
