use crate::Position;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Position {0:?} is out of bounds")]
    OutOfBounds(Position),
    #[error("Cannot reveal or flag cell in current game state")]
    InvalidGameState,
    #[error("Too many mines ({mines}) for grid size {rows}x{columns}")]
    TooManyMines { rows: u32, columns: u32, mines: u32 },
    #[error("Grid must have at least one row and one column")]
    EmptyGrid,
    #[error("Mine, revealed and flagged matrices must share one shape")]
    ShapeMismatch,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GameError>;
