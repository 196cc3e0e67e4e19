//! Platformer rules on top of the physics world
//!
//! A `Level` tags particles with roles; `GameState` plays a level and
//! `tick` advances it one frame at a time.

pub mod canon;
pub mod state;
pub mod tick;

pub use canon::Canon;
pub use state::{CharacterContact, Color, GameEvent, GamePhase, GameState, Level, Role};
pub use tick::{TickInput, tick};
