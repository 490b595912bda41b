//! Best score record
//!
//! The only state persisted between sessions: one integer, stored as JSON.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest score reached across sessions
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub score: u64,
}

impl BestScore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished run's score
    /// Returns true if it beat the previous best
    pub fn submit(&mut self, score: u64) -> bool {
        if score > self.score {
            log::info!("New best score: {} (was {})", score, self.score);
            self.score = score;
            true
        } else {
            false
        }
    }

    /// Load from disk; missing or unreadable files start fresh
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(json) => match serde_json::from_str::<BestScore>(&json) {
                Ok(best) => {
                    log::info!("Loaded best score {}", best.score);
                    best
                }
                Err(err) => {
                    log::warn!("Best score file {} is corrupt: {}", path.display(), err);
                    Self::new()
                }
            },
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No best score found, starting fresh");
                Self::new()
            }
            Err(err) => {
                log::warn!("Best score file {} is unreadable: {}", path.display(), err);
                Self::new()
            }
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        log::info!("Best score saved ({})", self.score);
        Ok(())
    }
}
