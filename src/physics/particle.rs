//! Simulated bodies
//!
//! A particle is a shape plus motion state. Particles have no identity of
//! their own: the owning [`World`](super::World) hands out IDs.
//!
//! Every mutator that changes something physically observable wakes the
//! particle. Only the world's sleep bookkeeping puts one to sleep.

use serde::{Deserialize, Serialize};

use super::math::{Real, Vec2};
use super::shapes::{Aabb, Circle};

/// The collision shape of a particle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle(Circle),
    Rectangle(Aabb),
}

impl Shape {
    /// Logical position: circle center or box center
    pub fn position(&self) -> Vec2 {
        match self {
            Shape::Circle(circle) => circle.position,
            Shape::Rectangle(aabb) => aabb.center(),
        }
    }

    /// Move the shape so its logical position is `position`
    pub fn set_position(&mut self, position: Vec2) {
        match self {
            Shape::Circle(circle) => circle.position = position,
            Shape::Rectangle(aabb) => *aabb = Aabb::from_center_size(position, aabb.size()),
        }
    }

    /// Half extents of the shape's axis-aligned bounding box
    pub fn half_extents(&self) -> Vec2 {
        match self {
            Shape::Circle(circle) => Vec2::splat(circle.radius),
            Shape::Rectangle(aabb) => aabb.half_size(),
        }
    }

    pub fn bounding_box(&self) -> Aabb {
        match self {
            Shape::Circle(circle) => circle.bounding_box(),
            Shape::Rectangle(aabb) => *aabb,
        }
    }
}

impl Default for Shape {
    /// Unit circle at the origin
    fn default() -> Self {
        Shape::Circle(Circle::new(Vec2::ZERO, 1.0))
    }
}

/// Restitution used when a particle does not set its own
pub const DEFAULT_REBOUND: Real = 0.9;

/// A simulated body carrying a caller-defined payload `D`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle<D = ()> {
    shape: Shape,
    velocity: Vec2,
    /// Persistent acceleration (gravity and the like)
    constant_acceleration: Vec2,
    /// One-shot accelerations, consumed by the next integration
    #[serde(skip)]
    summed_acceleration: Vec2,
    /// Only kinematic particles move; the others are static, infinite mass
    kinematic: bool,
    rebound: Real,
    /// Velocity multiplier applied every step (1 = no drag)
    drag: Real,
    awake: bool,
    #[serde(skip)]
    previous_position: Vec2,
    #[serde(skip)]
    still_time: Real,
    /// Payload the physics never looks at (render color, tags...)
    pub data: D,
}

impl<D: Default> Default for Particle<D> {
    fn default() -> Self {
        Self::new(Shape::default())
    }
}

impl<D: Default> Particle<D> {
    pub fn new(shape: Shape) -> Self {
        Self::with_data(shape, D::default())
    }

    pub fn circle(position: Vec2, radius: Real) -> Self {
        Self::new(Shape::Circle(Circle::new(position, radius)))
    }

    pub fn rectangle(center: Vec2, size: Vec2) -> Self {
        Self::new(Shape::Rectangle(Aabb::from_center_size(center, size)))
    }
}

impl<D> Particle<D> {
    pub fn with_data(shape: Shape, data: D) -> Self {
        Self {
            previous_position: shape.position(),
            shape,
            velocity: Vec2::ZERO,
            constant_acceleration: Vec2::ZERO,
            summed_acceleration: Vec2::ZERO,
            kinematic: true,
            rebound: DEFAULT_REBOUND,
            drag: 1.0,
            awake: true,
            still_time: 0.0,
            data,
        }
    }

    pub fn with_velocity(mut self, velocity: Vec2) -> Self {
        self.set_velocity(velocity);
        self
    }

    pub fn with_constant_acceleration(mut self, acceleration: Vec2) -> Self {
        self.set_constant_acceleration(acceleration);
        self
    }

    pub fn with_kinematic(mut self, kinematic: bool) -> Self {
        self.set_kinematic(kinematic);
        self
    }

    // === Shape ===

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn set_shape(&mut self, shape: Shape) {
        self.shape = shape;
        self.wake();
    }

    pub fn position(&self) -> Vec2 {
        self.shape.position()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.shape.set_position(position);
        self.wake();
    }

    pub fn bounding_box(&self) -> Aabb {
        self.shape.bounding_box()
    }

    pub fn circle_radius(&self) -> Option<Real> {
        match &self.shape {
            Shape::Circle(circle) => Some(circle.radius),
            Shape::Rectangle(_) => None,
        }
    }

    /// Set the radius, turning the particle into a circle at the same
    /// position if it was a rectangle
    pub fn set_circle_radius(&mut self, radius: Real) {
        if !self.try_set_circle_radius(radius) {
            self.shape = Shape::Circle(Circle::new(self.position(), radius));
            self.wake();
        }
    }

    /// Set the radius only if the particle already is a circle
    pub fn try_set_circle_radius(&mut self, radius: Real) -> bool {
        match &mut self.shape {
            Shape::Circle(circle) => {
                circle.radius = radius;
                self.wake();
                true
            }
            Shape::Rectangle(_) => false,
        }
    }

    pub fn rectangle_size(&self) -> Option<Vec2> {
        match &self.shape {
            Shape::Rectangle(aabb) => Some(aabb.size()),
            Shape::Circle(_) => None,
        }
    }

    /// Set the size, turning the particle into a rectangle centered at the
    /// same position if it was a circle
    pub fn set_rectangle_size(&mut self, size: Vec2) {
        if !self.try_set_rectangle_size(size) {
            self.shape = Shape::Rectangle(Aabb::from_center_size(self.position(), size));
            self.wake();
        }
    }

    /// Set the size only if the particle already is a rectangle
    pub fn try_set_rectangle_size(&mut self, size: Vec2) -> bool {
        match &mut self.shape {
            Shape::Rectangle(aabb) => {
                *aabb = Aabb::from_center_size(aabb.center(), size);
                self.wake();
                true
            }
            Shape::Circle(_) => false,
        }
    }

    // === Motion ===

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn set_velocity(&mut self, velocity: Vec2) {
        self.velocity = velocity;
        self.wake();
    }

    pub fn constant_acceleration(&self) -> Vec2 {
        self.constant_acceleration
    }

    pub fn add_constant_acceleration(&mut self, acceleration: Vec2) {
        self.set_constant_acceleration(self.constant_acceleration + acceleration);
    }

    pub fn sub_constant_acceleration(&mut self, acceleration: Vec2) {
        self.set_constant_acceleration(self.constant_acceleration - acceleration);
    }

    pub fn set_constant_acceleration(&mut self, acceleration: Vec2) {
        self.constant_acceleration = acceleration;
        self.wake();
    }

    /// One-shot acceleration accumulated for the next step
    pub fn acceleration(&self) -> Vec2 {
        self.summed_acceleration
    }

    pub fn add_acceleration(&mut self, acceleration: Vec2) {
        self.set_acceleration(self.summed_acceleration + acceleration);
    }

    pub fn sub_acceleration(&mut self, acceleration: Vec2) {
        self.set_acceleration(self.summed_acceleration - acceleration);
    }

    pub fn set_acceleration(&mut self, acceleration: Vec2) {
        self.summed_acceleration = acceleration;
        self.wake();
    }

    // === Material ===

    pub fn is_kinematic(&self) -> bool {
        self.kinematic
    }

    pub fn set_kinematic(&mut self, kinematic: bool) {
        self.kinematic = kinematic;
        self.wake();
    }

    /// 1 for kinematic particles, 0 (infinite mass) for static ones
    pub fn inverse_mass(&self) -> Real {
        if self.kinematic { 1.0 } else { 0.0 }
    }

    pub fn rebound(&self) -> Real {
        self.rebound
    }

    pub fn set_rebound(&mut self, rebound: Real) {
        self.rebound = rebound;
    }

    pub fn drag(&self) -> Real {
        self.drag
    }

    pub fn set_drag(&mut self, drag: Real) {
        self.drag = drag;
    }

    // === Sleep ===

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    pub fn wake(&mut self) {
        self.awake = true;
    }

    /// Kinematic and awake: integrated, tested and bounded by the world
    #[inline]
    pub fn is_active(&self) -> bool {
        self.kinematic && self.awake
    }

    /// Advance the stillness timer; returns true when the particle just fell asleep
    pub(crate) fn update_sleep(&mut self, dt: Real, distance: Real, delay: Real) -> bool {
        if !self.is_active() {
            return false;
        }
        let position = self.position();
        if position.distance(self.previous_position) > distance {
            self.previous_position = position;
            self.still_time = 0.0;
            return false;
        }
        self.still_time += dt;
        if self.still_time > delay {
            self.awake = false;
            self.still_time = 0.0;
            return true;
        }
        false
    }

    /// Explicit Euler step, consuming the one-shot accelerations
    pub(crate) fn integrate(&mut self, dt: Real) {
        let position = self.position() + self.velocity * dt;
        self.shape.set_position(position);
        self.velocity += (self.constant_acceleration + self.summed_acceleration) * dt;
        self.summed_acceleration = Vec2::ZERO;
    }

    pub(crate) fn apply_drag(&mut self) {
        self.velocity *= self.drag;
    }
}
