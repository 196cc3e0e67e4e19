//! Level editor tool that fires balls into the world

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Color;
use crate::consts::GRAVITY;
use crate::physics::math::{DEG2RAD, rotation};
use crate::physics::{Circle, Particle, ParticleId, Shape, World};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Canon {
    /// Center of the barrel
    pub position: Vec2,
    /// Barrel length and thickness
    pub size: Vec2,
    /// Counter-clockwise from +x
    pub angle_degrees: f32,
    pub ball_radius: f32,
    pub ball_speed: f32,
    pub color: Color,
}

impl Default for Canon {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            size: Vec2::new(1.0, 0.4),
            angle_degrees: 45.0,
            ball_radius: 0.25,
            ball_speed: 10.0,
            color: Color::ORANGE,
        }
    }
}

impl Canon {
    /// Unit vector the barrel points along
    pub fn direction(&self) -> Vec2 {
        rotation(self.angle_degrees * DEG2RAD) * Vec2::X
    }

    /// Where a ball leaves the barrel, clear of its end
    pub fn muzzle(&self) -> Vec2 {
        self.position + self.direction() * (self.size.x * 0.5 + self.ball_radius)
    }

    /// A falling ball leaving the muzzle at `ball_speed`
    pub fn shoot(&self) -> Particle<Color> {
        Particle::with_data(Shape::Circle(Circle::new(self.muzzle(), self.ball_radius)), self.color)
            .with_velocity(self.direction() * self.ball_speed)
            .with_constant_acceleration(GRAVITY)
    }

    pub fn fire(&self, world: &mut World<Color>) -> ParticleId {
        let id = world.add_particle(self.shoot());
        log::debug!("Canon fired ball {id} toward {:?}", self.direction());
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shoot_along_barrel() {
        let canon = Canon {
            position: Vec2::new(1.0, 2.0),
            angle_degrees: 90.0,
            ..Default::default()
        };
        let ball = canon.shoot();
        assert!((ball.velocity() - Vec2::new(0.0, 10.0)).length() < 1e-4);
        assert!((ball.position() - Vec2::new(1.0, 2.75)).length() < 1e-4);
        assert_eq!(ball.circle_radius(), Some(0.25));
        assert_eq!(ball.constant_acceleration(), GRAVITY);
        assert_eq!(ball.data, Color::ORANGE);
    }

    #[test]
    fn test_fired_balls_get_fresh_ids() {
        let mut world = World::new();
        let canon = Canon::default();
        let first = canon.fire(&mut world);
        let second = canon.fire(&mut world);
        assert_ne!(first, second);
        assert_eq!(world.len(), 2);
    }
}
