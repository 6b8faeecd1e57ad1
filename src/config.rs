//! Data-driven tuning
//!
//! Loaded once at startup from `assets/config.json`. Every field has a default,
//! so a partial (or missing) file is fine.

use serde::{Deserialize, Serialize};

use crate::settings::Settings;

/// What happens when a grounded ship drives into the side of a raised block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaisedBlockPolicy {
    /// The ship is destroyed
    #[default]
    Crash,
    /// The ship is lifted onto the block's top surface
    StepUp,
}

/// Physics tuning, all values per simulation tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Forward speed at level start
    pub base_speed: f32,
    pub min_speed: f32,
    pub max_speed: f32,
    /// Forward speed change per tick on a boost/brake segment
    pub speed_step: f32,
    /// Lateral speed while a steering key is held
    pub steer_speed: f32,
    /// Initial upward velocity of a jump
    pub jump_velocity: f32,
    /// Vertical velocity lost each tick while airborne
    pub gravity: f32,
    /// Downward velocity given when the ship drives off an edge
    pub fall_kick: f32,
    /// Half-height of the band around a top surface that counts as contact
    pub landing_tolerance: f32,
    pub raised_blocks: RaisedBlockPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            base_speed: 0.12,
            min_speed: 0.06,
            max_speed: 0.3,
            speed_step: 0.004,
            steer_speed: 0.06,
            jump_velocity: 0.2,
            gravity: 0.01,
            fall_kick: 0.02,
            landing_tolerance: 0.3,
            raised_blocks: RaisedBlockPolicy::Crash,
        }
    }
}

/// Top-level config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub physics: PhysicsConfig,
    pub display: Settings,
}

impl Config {
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Parse a config file, falling back to defaults (with a warning) when it is malformed
    pub fn from_json_or_default(json: &str) -> Self {
        match Self::from_json(json) {
            Ok(config) => {
                log::info!("Loaded config (raised blocks: {:?})", config.physics.raised_blocks);
                config
            }
            Err(e) => {
                log::warn!("Invalid config, using defaults: {}", e);
                Self::default()
            }
        }
    }
}
