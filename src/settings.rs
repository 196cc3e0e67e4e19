//! Gameplay tuning
//!
//! Stored as JSON next to the level files. Every field has a default, so a
//! partial file only overrides what it names.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::persistence::PersistenceError;

/// How the player character moves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CharacterSettings {
    /// One-shot horizontal acceleration per tick while left/right is held
    pub movement_acceleration: f32,
    /// Upward velocity gained by a jump
    pub jump_impulse: f32,
}

impl Default for CharacterSettings {
    fn default() -> Self {
        Self {
            movement_acceleration: 10.0,
            jump_impulse: 5.0,
        }
    }
}

/// How enemies chase and die
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyParameters {
    /// Horizontal chase speed
    pub speed: f32,
    /// Minimum upward component of the contact normal for a stomp to kill
    pub kill_threshold: f32,
}

impl Default for EnemyParameters {
    fn default() -> Self {
        Self {
            speed: 2.0,
            kill_threshold: 0.25,
        }
    }
}

/// All tunables of a level
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub character: CharacterSettings,
    pub enemy: EnemyParameters,
}

impl GameSettings {
    /// Load from `path`, falling back to defaults when the file is missing
    /// or unreadable
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(err) => {
                log::warn!("Using default settings: {err}");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self, PersistenceError> {
        let json = fs::read_to_string(path).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&json).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), PersistenceError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| PersistenceError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| PersistenceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
