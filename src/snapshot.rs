use crate::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A saved game: the mine layout, the player's marks and the clock.
///
/// Built once by [`Grid::snapshot`](crate::Grid::snapshot) and only read
/// afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    mines: Array2<bool>,
    revealed: Array2<bool>,
    flagged: Array2<bool>,
    elapsed_time: f32,
    #[serde(default)]
    safe_start_used: bool,
}

impl GameState {
    pub fn new(
        mines: Array2<bool>,
        revealed: Array2<bool>,
        flagged: Array2<bool>,
        elapsed_time: f32,
    ) -> Self {
        Self {
            mines,
            revealed,
            flagged,
            elapsed_time,
            safe_start_used: false,
        }
    }

    /// Marks the snapshot as taken after the first action, so a resumed game
    /// keeps this layout instead of re-rolling it.
    pub fn with_safe_start_used(mut self) -> Self {
        self.safe_start_used = true;
        self
    }

    pub fn safe_start_used(&self) -> bool {
        self.safe_start_used
    }

    pub fn mines(&self) -> &Array2<bool> {
        &self.mines
    }

    pub fn revealed(&self) -> &Array2<bool> {
        &self.revealed
    }

    pub fn flagged(&self) -> &Array2<bool> {
        &self.flagged
    }

    /// Seconds played before the snapshot was taken.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        debug!(path = %path.display(), "saved game");
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameError;

    fn sample() -> GameState {
        let mut mines = Array2::from_elem((2, 3), false);
        mines[(0, 2)] = true;
        let mut revealed = Array2::from_elem((2, 3), false);
        revealed[(1, 0)] = true;
        let mut flagged = Array2::from_elem((2, 3), false);
        flagged[(0, 2)] = true;
        GameState::new(mines, revealed, flagged, 3.5)
    }

    #[test]
    fn test_json_keeps_layout_and_time() {
        let state = sample();
        let json = state.to_json().unwrap();
        assert!(json.contains("elapsed_time"));

        let loaded = GameState::from_json(&json).unwrap();
        assert_eq!(loaded, state);
        assert!(loaded.mines()[(0, 2)]);
        assert_eq!(loaded.mines().dim(), (2, 3));
        assert!(!loaded.safe_start_used());
    }

    #[test]
    fn test_safe_start_flag_survives_json() {
        let state = sample().with_safe_start_used();
        let loaded = GameState::from_json(&state.to_json().unwrap()).unwrap();
        assert!(loaded.safe_start_used());
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        assert!(matches!(
            GameState::from_json("{\"mines\": 4}"),
            Err(GameError::Serialization(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            GameState::load(dir.path().join("absent.json")),
            Err(GameError::Io(_))
        ));
    }
}
