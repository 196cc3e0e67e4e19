//! Particle world and the per-step simulation pipeline
//!
//! `World::step` runs, in order:
//! 1. integration of every active particle
//! 2. clearing of the contact log
//! 3. narrow-phase detection over every pair with at least one active particle
//! 4. up to `RESOLVE_ITERATIONS` rounds of pair resolution, bounds resolution
//!    and re-detection, stopping early once no pair overlaps
//! 5. sleep bookkeeping
//! 6. drag
//! 7. callback dispatch from the contact log
//!
//! Particles live in a `BTreeMap` keyed by ID, so iteration is in ascending
//! ID order and the simulation is deterministic.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::collision::{Collision, collide};
use super::math::{EPSILON, Real, Vec2};
use super::particle::Particle;
use super::shapes::Aabb;

/// Hard cap on resolve iterations per step
pub const RESOLVE_ITERATIONS: usize = 10;
/// Scales the approach velocity that constant forces add each step and
/// that must not turn into bounce (resting contact jitter)
pub const DAMPING_MULTIPLIER: Real = 2.5;
/// Displacement below which a particle counts as still
pub const SLEEP_DISTANCE: Real = 0.01;
/// Seconds a particle must stay still before falling asleep
pub const SLEEP_DELAY: Real = 0.5;

/// Stable particle handle, never reused by a world
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticleId(pub u64);

impl ParticleId {
    /// "No particle"; in contact reports it stands for the world bounds
    pub const NULL: ParticleId = ParticleId(u64::MAX);

    /// Largest ID `World::set_particle` will place a particle at. Everything
    /// above is left to fresh allocation so loaded levels cannot exhaust it.
    pub const MAX_EXPLICIT: ParticleId = ParticleId(u64::MAX / 2);

    #[inline]
    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

impl fmt::Display for ParticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            write!(f, "#null")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// A contact recorded during the last step, seen from `this`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactEvent {
    pub this: ParticleId,
    /// The other particle, or `ParticleId::NULL` for the world bounds
    pub other: ParticleId,
    /// Normal points from `other` toward `this`
    pub collision: Collision,
}

/// What a collision callback gets to see
pub struct Contact<'a, D> {
    pub id: ParticleId,
    pub particle: &'a Particle<D>,
    /// `ParticleId::NULL` when the contact is with the world bounds
    pub other_id: ParticleId,
    pub other: Option<&'a Particle<D>>,
    /// Normal points from the other body toward this particle
    pub collision: Collision,
}

pub type CollisionCallback<D> = Box<dyn FnMut(&Contact<'_, D>)>;

/// Owns the particles and runs the simulation
pub struct World<D = ()> {
    particles: BTreeMap<ParticleId, Particle<D>>,
    next_id: u64,
    /// Optional container every active particle is kept inside of
    pub bounds: Option<Aabb>,
    /// Overlapping pairs from the latest detection pass, keyed (lower, higher)
    collisions: BTreeMap<(ParticleId, ParticleId), Collision>,
    callbacks: BTreeMap<ParticleId, CollisionCallback<D>>,
    /// First contact of each (this, other) pair during the current step
    contacts: BTreeMap<(ParticleId, ParticleId), Collision>,
}

impl<D> Default for World<D> {
    fn default() -> Self {
        Self {
            particles: BTreeMap::new(),
            next_id: 0,
            bounds: None,
            collisions: BTreeMap::new(),
            callbacks: BTreeMap::new(),
            contacts: BTreeMap::new(),
        }
    }
}

/// Deep-copies particles and bounds. Callbacks and the contact log stay
/// with the original.
impl<D: Clone> Clone for World<D> {
    fn clone(&self) -> Self {
        Self {
            particles: self.particles.clone(),
            next_id: self.next_id,
            bounds: self.bounds,
            ..Self::default()
        }
    }
}

impl<D: fmt::Debug> fmt::Debug for World<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("particles", &self.particles)
            .field("next_id", &self.next_id)
            .field("bounds", &self.bounds)
            .field("callbacks", &self.callbacks.len())
            .finish()
    }
}

impl<D: Default> World<D> {
    pub fn add_circle(&mut self, position: Vec2, radius: Real) -> ParticleId {
        self.add_particle(Particle::circle(position, radius))
    }

    pub fn add_rectangle(&mut self, center: Vec2, size: Vec2) -> ParticleId {
        self.add_particle(Particle::rectangle(center, size))
    }
}

impl<D> World<D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bounds(bounds: Aabb) -> Self {
        Self {
            bounds: Some(bounds),
            ..Self::default()
        }
    }

    // === Particles ===

    /// Insert a particle under a fresh ID
    pub fn add_particle(&mut self, particle: Particle<D>) -> ParticleId {
        let id = self.allocate_id();
        self.particles.insert(id, particle);
        id
    }

    fn allocate_id(&mut self) -> ParticleId {
        if let Some(next) = self.next_id.checked_add(1).filter(|next| *next < u64::MAX) {
            let id = ParticleId(self.next_id);
            self.next_id = next;
            return id;
        }
        // Counter spent: hand out the lowest free ID rather than the sentinel
        log::error!("Particle ID space exhausted, reusing the lowest free ID");
        (0..u64::MAX)
            .map(ParticleId)
            .find(|id| !self.particles.contains_key(id))
            .unwrap_or(ParticleId(0))
    }

    /// Insert or overwrite the particle at `id`, moving the ID generator past it.
    ///
    /// Used to restore saved levels with their original IDs. IDs above
    /// `ParticleId::MAX_EXPLICIT` (the sentinel included) cannot be placed;
    /// passing one allocates a fresh ID instead.
    pub fn set_particle(&mut self, id: ParticleId, particle: Particle<D>) -> ParticleId {
        if id > ParticleId::MAX_EXPLICIT {
            log::warn!("Cannot place a particle at {id}, allocating a new ID");
            return self.add_particle(particle);
        }
        self.particles.insert(id, particle);
        self.next_id = self.next_id.max(id.0.saturating_add(1));
        id
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle<D>> {
        self.particles.get(&id)
    }

    pub fn particle_mut(&mut self, id: ParticleId) -> Option<&mut Particle<D>> {
        self.particles.get_mut(&id)
    }

    pub fn contains(&self, id: ParticleId) -> bool {
        self.particles.contains_key(&id)
    }

    /// Remove and return the particle; no-op for unknown IDs
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle<D>> {
        self.particles.remove(&id)
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// All particles in ascending ID order
    pub fn iter(&self) -> impl Iterator<Item = (ParticleId, &Particle<D>)> + '_ {
        self.particles.iter().map(|(id, particle)| (*id, particle))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ParticleId, &mut Particle<D>)> + '_ {
        self.particles.iter_mut().map(|(id, particle)| (*id, particle))
    }

    pub fn ids(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.particles.keys().copied()
    }

    // === Callbacks ===

    /// Call `callback` for every contact involving `id`, after each step.
    /// Replaces any previous callback for that ID.
    pub fn set_callback<F>(&mut self, id: ParticleId, callback: F)
    where
        F: FnMut(&Contact<'_, D>) + 'static,
    {
        self.callbacks.insert(id, Box::new(callback));
    }

    pub fn remove_callback(&mut self, id: ParticleId) {
        self.callbacks.remove(&id);
    }

    pub fn remove_all_callbacks(&mut self) {
        self.callbacks.clear();
    }

    pub fn has_callback(&self, id: ParticleId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Contacts recorded during the latest step, one per (this, other) pair
    pub fn contacts(&self) -> impl Iterator<Item = ContactEvent> + '_ {
        self.contacts.iter().map(|(&(this, other), collision)| ContactEvent {
            this,
            other,
            collision: *collision,
        })
    }

    // === Simulation ===

    /// Advance the simulation by `dt` seconds. The caller clamps `dt`.
    pub fn step(&mut self, dt: Real) {
        self.integrate(dt);
        self.contacts.clear();
        self.find_collisions();

        let mut iterations = 0;
        while iterations < RESOLVE_ITERATIONS {
            iterations += 1;
            self.resolve_collisions(dt);
            self.resolve_bounds(dt);
            self.find_collisions();
            if self.collisions.is_empty() {
                break;
            }
        }
        log::trace!(
            "resolve loop: {} iterations, {} pairs left",
            iterations,
            self.collisions.len()
        );

        self.update_sleep(dt);
        self.apply_drag();
        self.dispatch_callbacks();
    }

    fn integrate(&mut self, dt: Real) {
        for particle in self.particles.values_mut() {
            if particle.is_active() {
                particle.integrate(dt);
            }
        }
    }

    fn find_collisions(&mut self) {
        self.collisions.clear();
        let entries: Vec<(ParticleId, &Particle<D>)> =
            self.particles.iter().map(|(id, p)| (*id, p)).collect();

        for (i, &(id_a, a)) in entries.iter().enumerate() {
            for &(id_b, b) in &entries[i + 1..] {
                // Static/static and asleep/asleep pairs never collide
                if !a.is_active() && !b.is_active() {
                    continue;
                }
                let collision = collide(a.shape(), b.shape());
                if collision.hit {
                    self.collisions.insert((id_a, id_b), collision);
                }
            }
        }
    }

    fn resolve_collisions(&mut self, dt: Real) {
        for (&(id_a, id_b), collision) in &self.collisions {
            if resolve_pair(&mut self.particles, id_a, id_b, collision, dt) {
                self.contacts.entry((id_a, id_b)).or_insert(*collision);
                self.contacts
                    .entry((id_b, id_a))
                    .or_insert_with(|| collision.flipped());
            }
        }
    }

    fn resolve_bounds(&mut self, dt: Real) {
        let Some(bounds) = self.bounds else {
            return;
        };
        for (&id, particle) in self.particles.iter_mut() {
            if !particle.is_active() {
                continue;
            }
            if let Some(collision) = resolve_against_bounds(particle, &bounds, dt) {
                self.contacts.entry((id, ParticleId::NULL)).or_insert(collision);
            }
        }
    }

    fn update_sleep(&mut self, dt: Real) {
        for (id, particle) in self.particles.iter_mut() {
            if particle.update_sleep(dt, SLEEP_DISTANCE, SLEEP_DELAY) {
                log::debug!("particle {} fell asleep at {:?}", id, particle.position());
            }
        }
    }

    fn apply_drag(&mut self) {
        for particle in self.particles.values_mut() {
            if particle.is_active() {
                particle.apply_drag();
            }
        }
    }

    fn dispatch_callbacks(&mut self) {
        if self.callbacks.is_empty() {
            return;
        }
        for (&(id, other_id), collision) in &self.contacts {
            let Some(callback) = self.callbacks.get_mut(&id) else {
                continue;
            };
            let Some(particle) = self.particles.get(&id) else {
                continue;
            };
            let contact = Contact {
                id,
                particle,
                other_id,
                other: self.particles.get(&other_id),
                collision: *collision,
            };
            callback(&contact);
        }
    }
}

/// Impulse and position correction for one overlapping pair.
///
/// Returns false when both bodies are static and nothing was done.
fn resolve_pair<D>(
    particles: &mut BTreeMap<ParticleId, Particle<D>>,
    id_a: ParticleId,
    id_b: ParticleId,
    collision: &Collision,
    dt: Real,
) -> bool {
    let (Some(a), Some(b)) = (particles.get(&id_a), particles.get(&id_b)) else {
        return false;
    };

    let inv_mass_a = a.inverse_mass();
    let inv_mass_b = b.inverse_mass();
    let total_inv_mass = inv_mass_a + inv_mass_b;
    if total_inv_mass <= EPSILON {
        return false;
    }

    let normal = collision.normal;
    let mut velocity_a = a.velocity();
    let mut velocity_b = b.velocity();
    let mut position_a = a.position();
    let mut position_b = b.position();

    // Negative when approaching
    let contact_velocity = normal.dot(velocity_a - velocity_b);

    // Approach speed gained from constant forces during this step, not bounced back
    let relative_acceleration =
        a.constant_acceleration() * inv_mass_a - b.constant_acceleration() * inv_mass_b;
    let damping = (relative_acceleration.dot(normal) * dt * DAMPING_MULTIPLIER).min(0.0);

    if contact_velocity <= 0.0 {
        let separating = |rebound: Real| ((-contact_velocity + damping) * rebound).max(0.0);
        let impulse_a = (separating(a.rebound()) - contact_velocity) / total_inv_mass;
        let impulse_b = (separating(b.rebound()) - contact_velocity) / total_inv_mass;
        velocity_a += normal * (impulse_a * inv_mass_a);
        velocity_b -= normal * (impulse_b * inv_mass_b);
    }

    if collision.penetration > 0.0 {
        let movement = normal * (collision.penetration / total_inv_mass);
        position_a += movement * inv_mass_a;
        position_b -= movement * inv_mass_b;
    }

    // Static bodies are left untouched (and so are not woken)
    if inv_mass_a > 0.0 {
        if let Some(a) = particles.get_mut(&id_a) {
            a.set_velocity(velocity_a);
            a.set_position(position_a);
        }
    }
    if inv_mass_b > 0.0 {
        if let Some(b) = particles.get_mut(&id_b) {
            b.set_velocity(velocity_b);
            b.set_position(position_b);
        }
    }
    true
}

/// Keep one particle inside the world bounds.
///
/// Each axis is clamped on its own; the contact normal combines both axes
/// so corner hits bounce diagonally.
fn resolve_against_bounds<D>(particle: &mut Particle<D>, bounds: &Aabb, dt: Real) -> Option<Collision> {
    let half = particle.shape().half_extents();
    let mut position = particle.position();
    let velocity = particle.velocity();
    let area = Aabb::from_center_half_size(position, half);

    let mut normal = Vec2::ZERO;
    let mut approach = Vec2::ZERO;
    let mut penetration: Real = 0.0;
    let mut touched = false;

    for axis in 0..2 {
        if area.min[axis] <= bounds.min[axis] {
            penetration = penetration.max(bounds.min[axis] - area.min[axis]);
            position[axis] = bounds.min[axis] + half[axis];
            normal[axis] += 1.0;
            if velocity[axis] < 0.0 {
                approach[axis] = -velocity[axis];
            }
            touched = true;
        } else if area.max[axis] >= bounds.max[axis] {
            penetration = penetration.max(area.max[axis] - bounds.max[axis]);
            position[axis] = bounds.max[axis] - half[axis];
            normal[axis] -= 1.0;
            if velocity[axis] > 0.0 {
                approach[axis] = -velocity[axis];
            }
            touched = true;
        }
    }

    if !touched {
        return None;
    }

    let normal = normal.normalize_or_zero();
    let damping =
        (particle.constant_acceleration().dot(normal) * dt * DAMPING_MULTIPLIER).min(0.0);
    let bounce_speed = (approach.length() + damping).max(0.0) * particle.rebound();
    let bounced = velocity + approach + approach.normalize_or_zero() * bounce_speed;

    particle.set_position(position);
    particle.set_velocity(bounced);

    Some(Collision {
        hit: true,
        point: position - normal * half,
        normal,
        penetration,
    })
}
