pub mod cell;
pub mod config;
pub mod error;
pub mod game;
pub mod grid;
pub mod position;
pub mod preferences;
pub mod snapshot;

pub use cell::Cell;
pub use config::GameConfig;
pub use error::{GameError, Result};
pub use game::{Action, Game, Outcome, Status};
pub use grid::{FirstClick, Grid, MAX_REGENERATION_ATTEMPTS};
pub use position::Position;
pub use preferences::{Preferences, NO_BEST_TIME};
pub use snapshot::GameState;
