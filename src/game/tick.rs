//! Per-frame game update
//!
//! Applies input, moves enemies, steps the world and turns the character's
//! contacts into game events.

use glam::Vec2;

use super::state::{GameEvent, GamePhase, GameState, Role};
use crate::consts::*;
use crate::physics::math::{EPSILON, sign};

/// Speed along the contact normal below which the character counts as
/// standing on the surface rather than leaving it
const GROUNDED_SEPARATION: f32 = 0.01;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    /// Restart the level from its snapshot
    pub restart: bool,
}

/// Advance the game by one frame of `dt` seconds (clamped to `MAX_FRAME_DT`)
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) -> Vec<GameEvent> {
    let mut events = Vec::new();

    if input.restart {
        state.restart();
        events.push(GameEvent::Restarted);
        return events;
    }

    if state.phase == GamePhase::Won {
        return events;
    }

    let dt = dt.min(MAX_FRAME_DT);
    if dt <= 0.0 {
        return events;
    }

    drive_character(state, input, dt);
    chase_character(state);
    state.level.world.step(dt);
    apply_contacts(state, &mut events);

    events
}

fn drive_character(state: &mut GameState, input: &TickInput, dt: f32) {
    let Some(id) = state.level.character() else {
        return;
    };
    let settings = state.level.settings.character;
    let Some(character) = state.level.world.particle_mut(id) else {
        return;
    };

    if input.left {
        character.add_acceleration(Vec2::new(-settings.movement_acceleration, 0.0));
    }
    if input.right {
        character.add_acceleration(Vec2::new(settings.movement_acceleration, 0.0));
    }
    if input.jump && state.can_jump {
        // One-shot acceleration over a single step: velocity gains exactly the impulse
        character.add_acceleration(Vec2::Y * (settings.jump_impulse / dt));
        state.can_jump = false;
    }
}

/// Point every kinematic enemy's horizontal velocity at the character
fn chase_character(state: &mut GameState) {
    let Some(target) = state
        .level
        .character()
        .and_then(|id| state.level.world.particle(id))
        .map(|character| character.position())
    else {
        return;
    };
    let speed = state.level.settings.enemy.speed;
    let enemies: Vec<_> = state.level.enemies().collect();

    for id in enemies {
        let Some(enemy) = state.level.world.particle_mut(id) else {
            continue;
        };
        if !enemy.is_kinematic() {
            continue;
        }
        let dx = target.x - enemy.position().x;
        let vx = if dx.abs() <= EPSILON { 0.0 } else { sign(dx) * speed };
        let vy = enemy.velocity().y;
        enemy.set_velocity(Vec2::new(vx, vy));
    }
}

fn apply_contacts(state: &mut GameState, events: &mut Vec<GameEvent>) {
    let contacts = state.drain_contacts();
    let Some(character_id) = state.level.character() else {
        return;
    };
    let kill_threshold = state.level.settings.enemy.kill_threshold;
    let velocity = state
        .level
        .world
        .particle(character_id)
        .map(|character| character.velocity())
        .unwrap_or_default();

    let mut died = false;
    let mut won = false;

    for contact in contacts {
        if contact.normal.y > GROUND_NORMAL_Y && velocity.dot(contact.normal) <= GROUNDED_SEPARATION {
            state.can_jump = true;
        }

        match state.level.role_of(contact.other) {
            Some(Role::Enemy) => {
                if contact.normal.dot(Vec2::Y) > kill_threshold {
                    state.level.remove_particle(contact.other);
                    log::debug!("Enemy {} stomped", contact.other);
                    events.push(GameEvent::EnemyKilled(contact.other));
                } else {
                    died = true;
                }
            }
            Some(Role::DeadlyPlatform) => died = true,
            Some(Role::Goal) => won = true,
            Some(Role::Character) | None => {}
        }
    }

    if died {
        log::info!("Character died");
        events.push(GameEvent::Died);
        state.restart();
        events.push(GameEvent::Restarted);
    } else if won {
        log::info!("Goal reached");
        state.phase = GamePhase::Won;
        events.push(GameEvent::Won);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::Level;
    use crate::physics::{Aabb, Particle, ParticleId};

    /// Character circle plus one static circle tagged with `role`
    fn duel(role: Role, character_at: Vec2, character_velocity: Vec2) -> (GameState, ParticleId, ParticleId) {
        let mut level = Level::new(None);
        let other = level
            .world
            .add_particle(Particle::circle(Vec2::ZERO, 0.5).with_kinematic(false));
        let character = level
            .world
            .add_particle(Particle::circle(character_at, 0.5).with_velocity(character_velocity));
        level.tag(character, Role::Character);
        level.tag(other, role);
        (GameState::new(level), character, other)
    }

    #[test]
    fn test_stomp_kills_enemy() {
        let (mut state, _, enemy) = duel(Role::Enemy, Vec2::new(0.0, 1.2), Vec2::new(0.0, -5.0));
        let events = tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::EnemyKilled(enemy)]);
        assert!(!state.level.world.contains(enemy));
        assert_eq!(state.level.enemies().count(), 0);
    }

    #[test]
    fn test_side_contact_with_enemy_restarts() {
        let (mut state, character, enemy) = duel(Role::Enemy, Vec2::new(1.2, 0.0), Vec2::new(-5.0, 0.0));
        let events = tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::Died, GameEvent::Restarted]);

        // Back at the snapshot
        assert!(state.level.world.contains(enemy));
        let position = state.level.world.particle(character).map(|p| p.position());
        assert_eq!(position, Some(Vec2::new(1.2, 0.0)));
        assert!(state.level.world.has_callback(character));
    }

    #[test]
    fn test_hitting_enemy_from_below_restarts() {
        let (mut state, _, enemy) = duel(Role::Enemy, Vec2::new(0.0, -1.2), Vec2::new(0.0, 5.0));
        let events = tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::Died, GameEvent::Restarted]);
        assert!(state.level.world.contains(enemy));
    }

    #[test]
    fn test_deadly_platform_restarts() {
        let (mut state, _, _) = duel(Role::DeadlyPlatform, Vec2::new(0.0, 1.2), Vec2::new(0.0, -5.0));
        let events = tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::Died, GameEvent::Restarted]);
    }

    #[test]
    fn test_goal_wins_and_freezes() {
        let (mut state, character, _) = duel(Role::Goal, Vec2::new(1.2, 0.0), Vec2::new(-5.0, 0.0));
        let events = tick(&mut state, &TickInput::default(), 0.1);
        assert_eq!(events, vec![GameEvent::Won]);
        assert_eq!(state.phase, GamePhase::Won);

        let before = state.level.world.particle(character).map(|p| p.position());
        assert!(tick(&mut state, &TickInput::default(), 0.1).is_empty());
        assert_eq!(state.level.world.particle(character).map(|p| p.position()), before);

        let restart = TickInput {
            restart: true,
            ..Default::default()
        };
        assert_eq!(tick(&mut state, &restart, 0.1), vec![GameEvent::Restarted]);
        assert_eq!(state.phase, GamePhase::Playing);
    }

    #[test]
    fn test_jump_only_when_grounded() {
        let mut level = Level::new(Some(Aabb::from_min_max(Vec2::new(-5.0, -5.0), Vec2::new(5.0, 5.0))));
        let character = level
            .world
            .add_particle(Particle::circle(Vec2::new(0.0, -4.5), 0.5).with_constant_acceleration(GRAVITY));
        level.tag(character, Role::Character);
        let mut state = GameState::new(level);
        let dt = 1.0 / 60.0;
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let vertical = |state: &GameState| state.level.world.particle(character).map(|p| p.velocity().y).unwrap_or_default();

        // Not grounded yet: the jump is ignored
        tick(&mut state, &jump, dt);
        assert!(vertical(&state).abs() < 1e-5);
        assert!(state.can_jump);

        tick(&mut state, &jump, dt);
        let launched = vertical(&state);
        assert!(launched > 4.5);
        assert!(!state.can_jump);

        // Mid-air: no second jump
        tick(&mut state, &jump, dt);
        assert!(vertical(&state) < launched);
    }

    #[test]
    fn test_horizontal_input_accelerates() {
        let mut level = Level::new(None);
        let character = level.world.add_circle(Vec2::ZERO, 0.5);
        level.tag(character, Role::Character);
        let mut state = GameState::new(level);
        let right = TickInput {
            right: true,
            ..Default::default()
        };
        tick(&mut state, &right, 0.1);
        let velocity = state.level.world.particle(character).map(|p| p.velocity()).unwrap_or_default();
        assert!((velocity.x - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_enemies_chase_character() {
        let mut level = Level::new(None);
        let character = level.world.add_circle(Vec2::new(-5.0, 0.0), 0.5);
        let enemy = level.world.add_circle(Vec2::new(5.0, 0.0), 0.5);
        level.tag(character, Role::Character);
        level.tag(enemy, Role::Enemy);
        let mut state = GameState::new(level);

        tick(&mut state, &TickInput::default(), 0.1);
        let velocity = state.level.world.particle(enemy).map(|p| p.velocity()).unwrap_or_default();
        assert_eq!(velocity, Vec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_frame_time_is_clamped() {
        let mut level = Level::new(None);
        let character = level
            .world
            .add_particle(Particle::circle(Vec2::ZERO, 0.5).with_velocity(Vec2::new(1.0, 0.0)));
        level.tag(character, Role::Character);
        let mut state = GameState::new(level);

        tick(&mut state, &TickInput::default(), 5.0);
        let x = state.level.world.particle(character).map(|p| p.position().x).unwrap_or_default();
        assert!((x - MAX_FRAME_DT).abs() < 1e-6);
    }
}
