//! Level data and running game state

use std::collections::BTreeSet;
use std::sync::mpsc::{Receiver, Sender, channel};

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::GRAVITY;
use crate::physics::{Aabb, Particle, ParticleId, World};
use crate::settings::GameSettings;

/// RGBA8 render color, carried by every particle as its payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const GREY: Color = Color::rgb(128, 128, 128);
    pub const RED: Color = Color::rgb(220, 40, 40);
    pub const GREEN: Color = Color::rgb(40, 200, 80);
    pub const BLUE: Color = Color::rgb(50, 110, 230);
    pub const ORANGE: Color = Color::rgb(240, 140, 20);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

/// What a tagged particle means to the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    Character,
    Enemy,
    DeadlyPlatform,
    Goal,
}

/// A world plus the roles its particles play. Untagged particles are scenery.
#[derive(Debug, Clone, Default)]
pub struct Level {
    pub world: World<Color>,
    pub settings: GameSettings,
    character: Option<ParticleId>,
    enemies: BTreeSet<ParticleId>,
    deadly_platforms: BTreeSet<ParticleId>,
    goals: BTreeSet<ParticleId>,
}

impl Level {
    pub fn new(bounds: Option<Aabb>) -> Self {
        let mut level = Self::default();
        level.world.bounds = bounds;
        level
    }

    pub fn character(&self) -> Option<ParticleId> {
        self.character
    }

    pub fn enemies(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.enemies.iter().copied()
    }

    pub fn deadly_platforms(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.deadly_platforms.iter().copied()
    }

    pub fn goals(&self) -> impl Iterator<Item = ParticleId> + '_ {
        self.goals.iter().copied()
    }

    /// Give `id` a role, replacing whatever role it had. There is only one
    /// character, so tagging a new one untags the previous.
    ///
    /// Returns false (and tags nothing) when the particle does not exist.
    pub fn tag(&mut self, id: ParticleId, role: Role) -> bool {
        if !self.world.contains(id) {
            log::warn!("Cannot tag missing particle {id} as {role:?}");
            return false;
        }
        self.untag(id);
        match role {
            Role::Character => self.character = Some(id),
            Role::Enemy => {
                self.enemies.insert(id);
            }
            Role::DeadlyPlatform => {
                self.deadly_platforms.insert(id);
            }
            Role::Goal => {
                self.goals.insert(id);
            }
        }
        true
    }

    pub fn untag(&mut self, id: ParticleId) {
        if self.character == Some(id) {
            self.character = None;
        }
        self.enemies.remove(&id);
        self.deadly_platforms.remove(&id);
        self.goals.remove(&id);
    }

    pub fn role_of(&self, id: ParticleId) -> Option<Role> {
        if self.character == Some(id) {
            Some(Role::Character)
        } else if self.enemies.contains(&id) {
            Some(Role::Enemy)
        } else if self.deadly_platforms.contains(&id) {
            Some(Role::DeadlyPlatform)
        } else if self.goals.contains(&id) {
            Some(Role::Goal)
        } else {
            None
        }
    }

    /// Remove a particle along with its role and callback
    pub fn remove_particle(&mut self, id: ParticleId) -> Option<Particle<Color>> {
        self.untag(id);
        self.world.remove_callback(id);
        self.world.remove_particle(id)
    }

    /// A small level: a floor, a character on the left, an enemy, a patch
    /// of spikes and a goal on the right
    pub fn demo() -> Self {
        let mut level = Level::new(Some(Aabb::from_min_max(
            Vec2::new(-20.0, -10.0),
            Vec2::new(20.0, 10.0),
        )));
        let world = &mut level.world;

        let solid = |center: Vec2, size: Vec2, color: Color| {
            let mut particle = Particle::rectangle(center, size).with_kinematic(false);
            particle.data = color;
            particle
        };
        let body = |center: Vec2, radius: f32, color: Color| {
            let mut particle = Particle::circle(center, radius).with_constant_acceleration(GRAVITY);
            particle.set_rebound(0.0);
            particle.data = color;
            particle
        };

        world.add_particle(solid(Vec2::new(0.0, -8.5), Vec2::new(30.0, 1.0), Color::GREY));
        world.add_particle(solid(Vec2::new(-4.0, -5.0), Vec2::new(4.0, 0.5), Color::GREY));
        let spikes = world.add_particle(solid(Vec2::new(8.0, -7.9), Vec2::new(1.5, 0.2), Color::ORANGE));
        let goal = world.add_particle(solid(Vec2::new(14.0, -7.5), Vec2::new(1.0, 1.0), Color::GREEN));
        let character = world.add_particle(body(Vec2::new(-12.0, -7.5), 0.5, Color::BLUE));
        let enemy = world.add_particle(body(Vec2::new(4.0, -7.5), 0.5, Color::RED));

        level.tag(character, Role::Character);
        level.tag(enemy, Role::Enemy);
        level.tag(spikes, Role::DeadlyPlatform);
        level.tag(goal, Role::Goal);
        level
    }
}

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    Playing,
    /// Goal reached; nothing moves until restart
    Won,
}

/// Things that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    EnemyKilled(ParticleId),
    Died,
    Restarted,
    Won,
}

/// A contact reported by the character's collision callback
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CharacterContact {
    pub other: ParticleId,
    /// Points from the other body toward the character
    pub normal: Vec2,
    pub point: Vec2,
}

/// A level being played
pub struct GameState {
    pub level: Level,
    /// Snapshot restored on death and restart
    initial: Level,
    pub phase: GamePhase,
    pub can_jump: bool,
    contacts: Receiver<CharacterContact>,
    sender: Sender<CharacterContact>,
}

impl GameState {
    pub fn new(level: Level) -> Self {
        let (sender, contacts) = channel();
        let mut state = Self {
            initial: level.clone(),
            level,
            phase: GamePhase::Playing,
            can_jump: false,
            contacts,
            sender,
        };
        state.register_callbacks();
        state
    }

    /// Put the level back the way it was when play started
    pub fn restart(&mut self) {
        self.level = self.initial.clone();
        // Drop contacts from the old run
        while self.contacts.try_recv().is_ok() {}
        self.register_callbacks();
        self.can_jump = false;
        self.phase = GamePhase::Playing;
        log::info!("Level restarted");
    }

    /// Contacts the character made since the last call
    pub(crate) fn drain_contacts(&mut self) -> Vec<CharacterContact> {
        self.contacts.try_iter().collect()
    }

    fn register_callbacks(&mut self) {
        let Some(character) = self.level.character() else {
            return;
        };
        let sender = self.sender.clone();
        self.level.world.set_callback(character, move |contact| {
            let _ = sender.send(CharacterContact {
                other: contact.other_id,
                normal: contact.collision.normal,
                point: contact.collision.point,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_and_untag() {
        let mut level = Level::new(None);
        let a = level.world.add_circle(Vec2::ZERO, 1.0);
        let b = level.world.add_circle(Vec2::new(5.0, 0.0), 1.0);

        assert!(level.tag(a, Role::Character));
        assert!(level.tag(b, Role::Enemy));
        assert_eq!(level.role_of(a), Some(Role::Character));
        assert_eq!(level.role_of(b), Some(Role::Enemy));

        // One role per particle
        assert!(level.tag(b, Role::Goal));
        assert_eq!(level.enemies().count(), 0);
        assert_eq!(level.role_of(b), Some(Role::Goal));

        // One character per level
        assert!(level.tag(b, Role::Character));
        assert_eq!(level.character(), Some(b));
        assert_eq!(level.role_of(a), None);

        level.untag(b);
        assert_eq!(level.character(), None);
        assert!(!level.tag(ParticleId(99), Role::Enemy));
    }

    #[test]
    fn test_remove_particle_untags() {
        let mut level = Level::new(None);
        let id = level.world.add_circle(Vec2::ZERO, 1.0);
        level.tag(id, Role::DeadlyPlatform);
        level.world.set_callback(id, |_| {});

        assert!(level.remove_particle(id).is_some());
        assert_eq!(level.role_of(id), None);
        assert!(!level.world.has_callback(id));
        assert!(level.remove_particle(id).is_none());
    }

    #[test]
    fn test_demo_level_is_complete() {
        let level = Level::demo();
        assert!(level.character().is_some());
        assert_eq!(level.enemies().count(), 1);
        assert_eq!(level.deadly_platforms().count(), 1);
        assert_eq!(level.goals().count(), 1);
        assert!(level.world.bounds.is_some());
    }

    #[test]
    fn test_game_state_registers_character_callback() {
        let state = GameState::new(Level::demo());
        let character = state.level.character().unwrap();
        assert!(state.level.world.has_callback(character));
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_restart_restores_snapshot() {
        let mut state = GameState::new(Level::demo());
        let enemy = state.level.enemies().next().unwrap();
        state.level.remove_particle(enemy);
        state.phase = GamePhase::Won;

        state.restart();
        assert!(state.level.world.contains(enemy));
        assert_eq!(state.level.role_of(enemy), Some(Role::Enemy));
        assert_eq!(state.phase, GamePhase::Playing);
        let character = state.level.character().unwrap();
        assert!(state.level.world.has_callback(character));
    }
}
