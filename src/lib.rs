//! Sky Racer - an arcade track racer over ASCII-built levels
//!
//! Core modules:
//! - `sim`: Pure simulation (track, ship physics, collisions, game state)
//! - `level`: Level maps, palettes and the level manifest
//! - `input`: Keyboard edges to per-tick intent
//! - `renderer`: WebGPU rendering pipeline (reads simulation state only)
//! - `hud`: Dashboard overlay view model
//! - `config` / `settings`: Data-driven tuning and display preferences
//! - `platform`: Asset loading for browser and native builds

pub mod config;
pub mod hud;
pub mod input;
pub mod level;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use config::{Config, PhysicsConfig, RaisedBlockPolicy};
pub use level::{Level, LevelError, LevelSet};
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz display frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Track layout: every row is padded/truncated to this many cells
    pub const TRACK_COLUMNS: usize = 7;
    pub const SEGMENT_WIDTH: f32 = 1.0;
    pub const SEGMENT_DEPTH: f32 = 2.0;
    /// Slab thickness below the driving surface
    pub const FLOOR_THICKNESS: f32 = 0.25;

    /// Raised block top surfaces ('7' and '8')
    pub const RAISED_LOW_TOP: f32 = 0.5;
    pub const RAISED_HIGH_TOP: f32 = 1.0;

    /// Tunnel cross-section radius, measured from the floor at the lane centre
    pub const TUNNEL_RADIUS: f32 = 0.5;

    /// Ship body
    pub const SHIP_HALF_WIDTH: f32 = 0.22;
    pub const SHIP_HALF_HEIGHT: f32 = 0.08;
    pub const SHIP_HALF_LENGTH: f32 = 0.4;
    /// Bounding radius of the hull cross-section (tube tests)
    pub const SHIP_RADIUS: f32 = 0.2;
    /// Support probe sits this far ahead of the ship centre
    pub const PROBE_OFFSET: f32 = 0.3;
    /// Maximum visual roll when steering (radians)
    pub const ROLL_MAX: f32 = 0.35;

    /// Falling below this height ends the run
    pub const FLOOR_THRESHOLD: f32 = -5.0;
    /// Lateral displacement beyond this many track widths ends the run
    pub const OUT_OF_BOUNDS_FACTOR: f32 = 1.5;

    /// Explosion
    pub const EXPLOSION_PARTICLES: usize = 96;
}

/// Linear interpolation between `a` and `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Move `current` toward `target` by at most `max_delta`
#[inline]
pub fn approach(current: f32, target: f32, max_delta: f32) -> f32 {
    if current < target {
        (current + max_delta).min(target)
    } else {
        (current - max_delta).max(target)
    }
}
