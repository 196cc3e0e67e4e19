//! Level save/load
//!
//! A level is a directory of JSON files, one per category:
//! - `world.json`: bounds and every particle with its ID
//! - `character.json`: character ID and movement settings
//! - `enemies.json`: enemy parameters and IDs
//! - `platforms.json`: deadly platform IDs
//! - `goals.json`: goal IDs
//!
//! A missing file loads as empty. Particles keep their IDs across a save
//! and load, so tags stay valid.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::game::{Color, Level, Role};
use crate::physics::{Aabb, Particle, ParticleId};
use crate::settings::{CharacterSettings, EnemyParameters};

pub const WORLD_FILE: &str = "world.json";
pub const CHARACTER_FILE: &str = "character.json";
pub const ENEMIES_FILE: &str = "enemies.json";
pub const PLATFORMS_FILE: &str = "platforms.json";
pub const GOALS_FILE: &str = "goals.json";

#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Malformed JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct WorldFile {
    bounds: Option<Aabb>,
    particles: Vec<SavedParticle>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SavedParticle {
    id: ParticleId,
    particle: Particle<Color>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct CharacterFile {
    id: Option<ParticleId>,
    settings: CharacterSettings,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct EnemiesFile {
    parameters: EnemyParameters,
    ids: Vec<ParticleId>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
struct IdsFile {
    ids: Vec<ParticleId>,
}

/// Write `level` into `dir`, creating the directory if needed
pub fn save_level(level: &Level, dir: &Path) -> Result<(), PersistenceError> {
    fs::create_dir_all(dir).map_err(|source| PersistenceError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let world = WorldFile {
        bounds: level.world.bounds,
        particles: level
            .world
            .iter()
            .map(|(id, particle)| SavedParticle {
                id,
                particle: particle.clone(),
            })
            .collect(),
    };
    write_json(&dir.join(WORLD_FILE), &world)?;
    write_json(
        &dir.join(CHARACTER_FILE),
        &CharacterFile {
            id: level.character(),
            settings: level.settings.character,
        },
    )?;
    write_json(
        &dir.join(ENEMIES_FILE),
        &EnemiesFile {
            parameters: level.settings.enemy,
            ids: level.enemies().collect(),
        },
    )?;
    write_json(
        &dir.join(PLATFORMS_FILE),
        &IdsFile {
            ids: level.deadly_platforms().collect(),
        },
    )?;
    write_json(
        &dir.join(GOALS_FILE),
        &IdsFile {
            ids: level.goals().collect(),
        },
    )?;

    log::info!("Saved level ({} particles) to {}", level.world.len(), dir.display());
    Ok(())
}

/// Read a level from `dir`
pub fn load_level(dir: &Path) -> Result<Level, PersistenceError> {
    let world: WorldFile = read_json_or_default(&dir.join(WORLD_FILE))?;
    let character: CharacterFile = read_json_or_default(&dir.join(CHARACTER_FILE))?;
    let enemies: EnemiesFile = read_json_or_default(&dir.join(ENEMIES_FILE))?;
    let platforms: IdsFile = read_json_or_default(&dir.join(PLATFORMS_FILE))?;
    let goals: IdsFile = read_json_or_default(&dir.join(GOALS_FILE))?;

    let mut level = Level::new(world.bounds);
    for saved in world.particles {
        level.world.set_particle(saved.id, saved.particle);
    }

    level.settings.character = character.settings;
    level.settings.enemy = enemies.parameters;

    // `tag` drops (and warns about) IDs with no particle behind them
    let tags = character
        .id
        .into_iter()
        .map(|id| (id, Role::Character))
        .chain(enemies.ids.into_iter().map(|id| (id, Role::Enemy)))
        .chain(platforms.ids.into_iter().map(|id| (id, Role::DeadlyPlatform)))
        .chain(goals.ids.into_iter().map(|id| (id, Role::Goal)));
    for (id, role) in tags {
        level.tag(id, role);
    }

    log::info!("Loaded level ({} particles) from {}", level.world.len(), dir.display());
    Ok(level)
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string_pretty(value).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    fs::write(path, json).map_err(|source| PersistenceError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> Result<T, PersistenceError> {
    let json = match fs::read_to_string(path) {
        Ok(json) => json,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            log::debug!("{} not found, treating as empty", path.display());
            return Ok(T::default());
        }
        Err(source) => {
            return Err(PersistenceError::Io {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    serde_json::from_str(&json).map_err(|source| PersistenceError::Json {
        path: path.to_path_buf(),
        source,
    })
}
