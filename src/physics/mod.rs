//! Particle physics core
//!
//! Everything the game needs to move bodies around lives here. This module
//! is pure and deterministic:
//! - No clamping or fixed timestep, the caller picks `dt`
//! - Stable iteration order (by particle ID)
//! - No I/O, rendering or game rules

pub mod collision;
pub mod math;
pub mod particle;
pub mod shapes;
pub mod world;

pub use collision::{Collision, aabb_aabb, aabb_circle, circle_aabb, circle_circle, collide};
pub use math::{Real, Vec2};
pub use particle::{DEFAULT_REBOUND, Particle, Shape};
pub use shapes::{Aabb, Circle};
pub use world::{
    Contact, ContactEvent, DAMPING_MULTIPLIER, ParticleId, RESOLVE_ITERATIONS, SLEEP_DELAY,
    SLEEP_DISTANCE, World,
};
