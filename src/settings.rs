//! Display preferences
//!
//! Read from the `display` section of the config file; the quality preset can
//! also be forced with a `?quality=low|medium|high` query string.

use serde::{Deserialize, Serialize};

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 32,
            QualityPreset::Medium => 64,
            QualityPreset::High => 96,
        }
    }

    /// How many rows ahead of the ship are drawn
    pub fn draw_distance_rows(&self) -> usize {
        match self {
            QualityPreset::Low => 30,
            QualityPreset::Medium => 60,
            QualityPreset::High => 120,
        }
    }

    /// Arch subdivisions for tunnel meshes
    pub fn tunnel_segments(&self) -> u32 {
        match self {
            QualityPreset::Low => 6,
            QualityPreset::Medium => 10,
            QualityPreset::High => 16,
        }
    }
}

/// Display settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Explosion particles on crash
    pub explosions: bool,
    /// Camera shake on crash
    pub camera_shake: bool,

    // === HUD ===
    /// Speed/progress dashboard overlay
    pub show_dashboard: bool,
    /// Show FPS counter
    pub show_fps: bool,

    // === Accessibility ===
    /// Reduced motion (no shake, no roll on the camera)
    pub reduced_motion: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            explosions: true,
            camera_shake: true,
            show_dashboard: true,
            show_fps: false,
            reduced_motion: false,
        }
    }
}

impl Settings {
    /// Create settings from a quality preset (applies preset defaults)
    pub fn from_preset(preset: QualityPreset) -> Self {
        let mut settings = Self::default();
        settings.apply_preset(preset);
        settings
    }

    /// Apply a quality preset (updates quality-dependent settings)
    pub fn apply_preset(&mut self, preset: QualityPreset) {
        self.quality = preset;

        // Low preset skips the explosion for performance
        if preset == QualityPreset::Low {
            self.explosions = false;
        }
    }

    /// Effective camera shake (respects reduced_motion)
    pub fn effective_camera_shake(&self) -> bool {
        self.camera_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.explosions {
            0
        } else {
            self.quality.max_particles()
        }
    }
}
