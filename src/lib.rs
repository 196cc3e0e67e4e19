//! Hopper - a small platformer built on a 2D particle physics engine
//!
//! Core modules:
//! - `physics`: Deterministic particle simulation (shapes, collisions, world)
//! - `game`: Level roles, character control and gameplay rules
//! - `settings`: Tunable character and enemy parameters
//! - `persistence`: Level save/load as a directory of JSON files

pub mod game;
pub mod persistence;
pub mod physics;
pub mod settings;

pub use game::{GameEvent, GamePhase, GameState, Level, TickInput, tick};
pub use settings::GameSettings;

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Gravity applied to every falling body (y points up)
    pub const GRAVITY: Vec2 = Vec2::new(0.0, -10.0);
    /// Longest frame the game will simulate in one step
    pub const MAX_FRAME_DT: f32 = 0.1;
    /// Contacts whose normal points up more than this count as ground
    pub const GROUND_NORMAL_Y: f32 = 0.5;
}
