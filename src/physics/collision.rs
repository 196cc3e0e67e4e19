//! Narrow-phase collision detection
//!
//! Stateless tests between pairs of shapes. Every test follows the same
//! conventions so that `collide(a, b)` and `collide(b, a)` agree:
//! - `normal` is a unit vector pointing from `b` toward `a`
//! - `penetration` is the non-negative overlap depth along `normal`
//! - `point` sits halfway between the two surfaces along `normal`
//! - touching shapes (zero penetration) count as a hit
//!
//! Which pairs are worth testing (static/static, asleep/asleep) is decided
//! by the caller, never here.

use super::math::{EPSILON, Real, Vec2};
use super::particle::Shape;
use super::shapes::{Aabb, Circle};

/// Result of a collision check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    /// Whether the shapes overlap or touch
    pub hit: bool,
    /// Midpoint of the interpenetration
    pub point: Vec2,
    /// Contact normal, from the second shape toward the first
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: Real,
}

impl Collision {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }

    /// Same contact seen from the other shape
    pub fn flipped(&self) -> Self {
        Self {
            normal: -self.normal,
            ..*self
        }
    }
}

/// Dispatch on the shape kinds of both operands
pub fn collide(a: &Shape, b: &Shape) -> Collision {
    match (a, b) {
        (Shape::Circle(a), Shape::Circle(b)) => circle_circle(a, b),
        (Shape::Rectangle(a), Shape::Rectangle(b)) => aabb_aabb(a, b),
        (Shape::Circle(a), Shape::Rectangle(b)) => circle_aabb(a, b),
        (Shape::Rectangle(a), Shape::Circle(b)) => aabb_circle(a, b),
    }
}

pub fn circle_circle(a: &Circle, b: &Circle) -> Collision {
    let sum_radii = a.radius + b.radius;
    let b_to_a = a.position - b.position;
    let distance = b_to_a.length();

    if distance > sum_radii {
        return Collision::miss();
    }

    if distance <= EPSILON {
        // Concentric circles: any direction works, pick up
        return Collision {
            hit: true,
            point: a.position,
            normal: Vec2::Y,
            penetration: sum_radii,
        };
    }

    let normal = b_to_a / distance;
    let surface_a = a.position - normal * a.radius;
    let surface_b = b.position + normal * b.radius;
    Collision {
        hit: true,
        point: (surface_a + surface_b) * 0.5,
        normal,
        penetration: sum_radii - distance,
    }
}

pub fn aabb_aabb(a: &Aabb, b: &Aabb) -> Collision {
    let delta = a.center() - b.center();
    let reach = a.half_size() + b.half_size();
    let overlap = reach - delta.abs();

    if overlap.x < 0.0 || overlap.y < 0.0 {
        return Collision::miss();
    }

    // Midpoint of the shared interval on each axis
    let shared_min = a.min.max(b.min);
    let shared_max = a.max.min(b.max);
    let mut point = (shared_min + shared_max) * 0.5;

    let (normal, penetration) = if overlap.x < overlap.y {
        let dir = if delta.x >= 0.0 { 1.0 } else { -1.0 };
        let face_a = a.center().x - dir * a.half_size().x;
        let face_b = b.center().x + dir * b.half_size().x;
        point.x = (face_a + face_b) * 0.5;
        (Vec2::new(dir, 0.0), overlap.x)
    } else {
        let dir = if delta.y >= 0.0 { 1.0 } else { -1.0 };
        let face_a = a.center().y - dir * a.half_size().y;
        let face_b = b.center().y + dir * b.half_size().y;
        point.y = (face_a + face_b) * 0.5;
        (Vec2::new(0.0, dir), overlap.y)
    };

    Collision {
        hit: true,
        point,
        normal,
        penetration,
    }
}

pub fn circle_aabb(circle: &Circle, aabb: &Aabb) -> Collision {
    let center = circle.position;
    let closest = aabb.closest_point(center);
    let offset = center - closest;
    let distance = offset.length();

    if distance > EPSILON {
        // Center outside the box
        if distance > circle.radius {
            return Collision::miss();
        }
        let normal = offset / distance;
        let surface_circle = center - normal * circle.radius;
        return Collision {
            hit: true,
            point: (closest + surface_circle) * 0.5,
            normal,
            penetration: circle.radius - distance,
        };
    }

    // Center inside (or on the border of) the box: leave through the nearest face
    let to_min = center - aabb.min;
    let to_max = aabb.max - center;
    let pen_x = to_min.x.min(to_max.x);
    let pen_y = to_min.y.min(to_max.y);

    let (normal, face_distance) = if pen_x < pen_y {
        if to_min.x < to_max.x {
            (Vec2::NEG_X, to_min.x)
        } else {
            (Vec2::X, to_max.x)
        }
    } else if to_min.y < to_max.y {
        (Vec2::NEG_Y, to_min.y)
    } else {
        (Vec2::Y, to_max.y)
    };

    Collision {
        hit: true,
        point: center + normal * ((face_distance - circle.radius) * 0.5),
        normal,
        penetration: face_distance + circle.radius,
    }
}

pub fn aabb_circle(aabb: &Aabb, circle: &Circle) -> Collision {
    circle_aabb(circle, aabb).flipped()
}
