use crate::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, info};

/// Stored in place of a best time until a game is won.
pub const NO_BEST_TIME: f32 = -1.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct PreferenceData {
    #[serde(default = "no_best_time")]
    best_time: f32,
}

fn no_best_time() -> f32 {
    NO_BEST_TIME
}

impl Default for PreferenceData {
    fn default() -> Self {
        Self {
            best_time: NO_BEST_TIME,
        }
    }
}

/// Persistent player preferences. Currently only the best completion time.
#[derive(Debug, Clone, Default)]
pub struct Preferences {
    path: Option<PathBuf>,
    data: PreferenceData,
}

impl Preferences {
    /// Preferences that are never written to disk.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Reads preferences from `path`. A missing or unreadable file yields
    /// defaults; later writes still go to `path`.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let data = match fs::read_to_string(&path) {
            Ok(json) => serde_json::from_str(&json).unwrap_or_default(),
            Err(_) => PreferenceData::default(),
        };
        debug!(path = %path.display(), best_time = data.best_time, "loaded preferences");
        Self {
            path: Some(path),
            data,
        }
    }

    /// `preferences.json` under the platform config directory.
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "sweeper").map(|dirs| dirs.config_dir().join("preferences.json"))
    }

    pub fn best_time(&self) -> Option<f32> {
        (self.data.best_time >= 0.0).then_some(self.data.best_time)
    }

    /// Stores `time` if it beats the current best (or none is recorded) and
    /// flushes to disk. Returns whether it was a new best.
    pub fn record_time(&mut self, time: f32) -> Result<bool> {
        if self.best_time().is_some_and(|best| time >= best) {
            return Ok(false);
        }

        self.data.best_time = time;
        info!(best_time = time, "new best time");
        self.flush()?;
        Ok(true)
    }

    fn flush(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(&self.data)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_no_best_time() {
        assert_eq!(Preferences::in_memory().best_time(), None);

        let dir = tempfile::tempdir().unwrap();
        let prefs = Preferences::load(dir.path().join("missing.json"));
        assert_eq!(prefs.best_time(), None);
    }

    #[test]
    fn test_only_strictly_better_times_are_kept() {
        let mut prefs = Preferences::in_memory();
        assert!(prefs.record_time(30.0).unwrap());
        assert!(!prefs.record_time(30.0).unwrap());
        assert!(!prefs.record_time(45.5).unwrap());
        assert!(prefs.record_time(12.25).unwrap());
        assert_eq!(prefs.best_time(), Some(12.25));
    }

    #[test]
    fn test_best_time_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("prefs.json");

        let mut prefs = Preferences::load(&path);
        prefs.record_time(9.5).unwrap();

        let reloaded = Preferences::load(&path);
        assert_eq!(reloaded.best_time(), Some(9.5));
    }

    #[test]
    fn test_sentinel_and_corrupt_files_mean_none() {
        let dir = tempfile::tempdir().unwrap();
        let sentinel = dir.path().join("sentinel.json");
        fs::write(&sentinel, "{\"best_time\": -1.0}").unwrap();
        assert_eq!(Preferences::load(&sentinel).best_time(), None);

        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "not json").unwrap();
        assert_eq!(Preferences::load(&corrupt).best_time(), None);
    }
}
