//! Game state and core simulation types

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::track::Track;
use crate::config::PhysicsConfig;
use crate::consts::*;
use crate::level::{Level, LevelSet};

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Active gameplay
    Playing,
    /// Game is paused
    Paused,
    /// Run ended, waiting for restart input
    GameOver(GameOverCause),
    /// Ship crossed the end of the track, waiting for next-level input
    LevelComplete,
}

/// Why a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameOverCause {
    /// Dropped below the floor threshold
    Fell,
    /// Hit a raised block or a tunnel wall
    Crashed,
    /// Drifted too far sideways
    OutOfBounds,
}

/// Ship motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipState {
    /// Resting on a segment's top surface
    Grounded,
    /// Jumping or falling
    Airborne,
    /// Grounded on a tunnel floor, inside the tube
    InTunnel,
    /// Destroyed; no further movement
    GameOver,
}

impl ShipState {
    /// Resting on the track (open road or tunnel floor)
    pub fn is_on_track(&self) -> bool {
        matches!(self, ShipState::Grounded | ShipState::InTunnel)
    }
}

/// The player's ship
#[derive(Debug, Clone, PartialEq)]
pub struct Ship {
    pub pos: Vec3,
    /// Visual rotation: x = pitch, z = roll
    pub rotation: Vec3,
    /// x: lateral, y: vertical; forward motion uses `forward_speed`
    pub vel: Vec3,
    /// Distance advanced along -z each tick
    pub forward_speed: f32,
    pub state: ShipState,
    /// Inside a tunnel tube as of the last tick
    pub in_tube: bool,
}

impl Ship {
    /// A ship at rest at `start`
    pub fn new(start: Vec3, forward_speed: f32) -> Self {
        Self {
            pos: start,
            rotation: Vec3::ZERO,
            vel: Vec3::ZERO,
            forward_speed,
            state: ShipState::Grounded,
            in_tube: false,
        }
    }

    /// Footprint probe: slightly ahead of the ship's centre
    #[inline]
    pub fn probe(&self) -> (f32, f32) {
        (self.pos.x, self.pos.z - PROBE_OFFSET)
    }
}

/// A particle for the explosion effect
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec3,
    pub vel: Vec3,
    pub color: [f32; 4],
    /// 0-1, decreases over time
    pub life: f32,
    pub size: f32,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    levels: LevelSet,
    /// Current level index into the level set
    pub level_index: usize,
    pub track: Track,
    pub ship: Ship,
    pub phase: GamePhase,
    /// Ticks since the current attempt started
    pub frame: u64,
    /// Attempts started on the current level (seeds explosions)
    pub attempt: u32,
    /// Camera shake intensity (0-1, decays)
    pub shake: f32,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub physics: PhysicsConfig,
}

impl GameState {
    /// Start on the first level of a set
    pub fn new(levels: LevelSet, physics: PhysicsConfig) -> Self {
        let track = Track::build(levels.get(0));
        let ship = Ship::new(track.start_position(), physics.base_speed);
        Self {
            levels,
            level_index: 0,
            track,
            ship,
            phase: GamePhase::Playing,
            frame: 0,
            attempt: 0,
            shake: 0.0,
            particles: Vec::new(),
            physics,
        }
    }

    pub fn level(&self) -> &Level {
        self.levels.get(self.level_index)
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Rebuild the track and put the ship back on the start line
    pub fn restart(&mut self) {
        let level = self.levels.get(self.level_index);
        self.track.clear();
        self.track.rebuild(level);
        self.ship = Ship::new(self.track.start_position(), self.physics.base_speed);
        self.phase = GamePhase::Playing;
        self.frame = 0;
        self.attempt += 1;
        self.shake = 0.0;
        self.particles.clear();
        log::info!("Restarted level {} ({:?})", self.level_index + 1, level.name);
    }

    /// Move on to the next level (wrapping) and start it
    pub fn advance_level(&mut self) {
        self.level_index = self.levels.next_index(self.level_index);
        self.attempt = 0;
        self.restart();
    }

    /// Fraction of the way to the finish line, 0-1
    pub fn progress(&self) -> f32 {
        if self.phase == GamePhase::LevelComplete {
            return 1.0;
        }
        let distance = -self.track.end_z();
        if distance <= 0.0 {
            return 0.0;
        }
        (-self.ship.pos.z / distance).clamp(0.0, 1.0)
    }

    /// End the run; crashes get an explosion
    pub fn end_run(&mut self, cause: GameOverCause) {
        self.phase = GamePhase::GameOver(cause);
        self.ship.state = ShipState::GameOver;
        self.ship.vel = Vec3::ZERO;
        log::info!(
            "Game over on level {} at z={:.1}: {:?}",
            self.level_index + 1,
            self.ship.pos.z,
            cause
        );
        if cause != GameOverCause::Fell {
            self.shake = 1.0;
            self.spawn_explosion();
        }
    }

    /// Burst of particles at the ship; seeded so a replay looks the same
    pub fn spawn_explosion(&mut self) {
        let seed = ((self.level_index as u64) << 40) | ((self.attempt as u64) << 20) | self.frame;
        let mut rng = Pcg32::seed_from_u64(seed);
        let origin = self.ship.pos + Vec3::Y * SHIP_HALF_HEIGHT;

        self.particles.clear();
        for _ in 0..EXPLOSION_PARTICLES {
            let dir = Vec3::new(
                rng.random_range(-1.0..1.0),
                rng.random_range(0.0..1.0),
                rng.random_range(-1.0..1.0),
            )
            .normalize_or_zero();
            let speed = rng.random_range(0.02..0.12);
            let heat: f32 = rng.random_range(0.0..1.0);
            self.particles.push(Particle {
                pos: origin,
                vel: dir * speed,
                color: [1.0, 0.3 + 0.6 * heat, 0.1 * heat, 1.0],
                life: 1.0,
                size: rng.random_range(0.04..0.12),
            });
        }
    }

    /// Advance particles one tick
    pub fn update_particles(&mut self, gravity: f32) {
        for particle in &mut self.particles {
            particle.pos += particle.vel;
            particle.vel.y -= gravity * 0.5;
            particle.vel *= 0.97;
            particle.life -= 1.0 / 90.0;
            particle.size *= 0.995;
        }
        self.particles.retain(|p| p.life > 0.0);

        self.shake *= 0.9;
        if self.shake < 0.01 {
            self.shake = 0.0;
        }
    }
}
