//! Chase camera
//!
//! Sits behind and above the ship, looking down the track. Lateral motion is
//! smoothed so steering doesn't whip the view around.

use glam::{Mat4, Vec3};

use crate::consts::SEGMENT_DEPTH;
use crate::lerp;
use crate::settings::Settings;
use crate::sim::Ship;

/// Camera offset from the ship
const EYE_OFFSET: Vec3 = Vec3::new(0.0, 1.3, 3.2);
/// Look-at point relative to the ship
const TARGET_OFFSET: Vec3 = Vec3::new(0.0, 0.2, -4.0);
/// Fraction of the lateral gap closed each frame
const FOLLOW_RATE: f32 = 0.15;
/// Maximum shake displacement at full intensity
const SHAKE_AMPLITUDE: f32 = 0.25;

#[derive(Debug, Clone)]
pub struct FollowCamera {
    pub eye: Vec3,
    pub target: Vec3,
    /// Vertical field of view (radians)
    pub fov_y: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
}

impl FollowCamera {
    pub fn new(width: u32, height: u32, settings: &Settings) -> Self {
        let mut camera = Self {
            eye: EYE_OFFSET,
            target: TARGET_OFFSET,
            fov_y: 60f32.to_radians(),
            aspect: 1.0,
            near: 0.1,
            far: 100.0,
        };
        camera.set_viewport(width, height);
        camera.set_draw_distance(settings);
        camera
    }

    /// Keep the aspect ratio in step with the canvas
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        if width > 0 && height > 0 {
            self.aspect = width as f32 / height as f32;
        }
    }

    /// Far plane from the quality preset
    pub fn set_draw_distance(&mut self, settings: &Settings) {
        self.far = settings.quality.draw_distance_rows() as f32 * SEGMENT_DEPTH;
    }

    /// Jump straight to the chase position (level start, restart)
    pub fn snap_to(&mut self, ship: &Ship) {
        self.eye = ship.pos + EYE_OFFSET;
        self.target = ship.pos + TARGET_OFFSET;
    }

    /// Move toward the chase position; `shake` is 0-1, `time` in seconds
    pub fn follow(&mut self, ship: &Ship, shake: f32, time: f32, settings: &Settings) {
        let eye = ship.pos + EYE_OFFSET;
        let target = ship.pos + TARGET_OFFSET;

        // Forward and vertical follow exactly; lateral is smoothed
        self.eye = Vec3::new(lerp(self.eye.x, eye.x, FOLLOW_RATE), eye.y, eye.z);
        self.target = Vec3::new(lerp(self.target.x, target.x, FOLLOW_RATE), target.y, target.z);

        if settings.effective_camera_shake() && shake > 0.0 {
            let offset = Vec3::new(
                (time * 53.0).sin(),
                (time * 47.0).cos(),
                0.0,
            ) * shake
                * SHAKE_AMPLITUDE;
            self.eye += offset;
            self.target += offset;
        }
    }

    pub fn view(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, Vec3::Y)
    }

    pub fn projection(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect, self.near, self.far)
    }

    pub fn view_proj(&self) -> Mat4 {
        self.projection() * self.view()
    }
}
