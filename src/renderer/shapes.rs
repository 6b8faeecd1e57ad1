//! Mesh generation for track, ship and particles
//!
//! Everything is emitted as plain triangle lists.

use glam::{EulerRot, Mat4, Quat, Vec3};
use std::f32::consts::PI;

use super::vertex::{Vertex, colors};
use crate::consts::*;
use crate::settings::Settings;
use crate::sim::{GameOverCause, GamePhase, GameState, Particle, SegmentKind, Ship, Track};

const FACES: [(Vec3, Vec3, Vec3); 6] = [
    // (normal, u axis, v axis); u x v == normal keeps the winding CCW
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Vertices per box
pub const BOX_VERTICES: usize = 36;

/// Append an axis-aligned box, transformed by `transform`
pub fn push_box(out: &mut Vec<Vertex>, transform: Mat4, center: Vec3, size: Vec3, color: [f32; 4]) {
    let half = size / 2.0;
    for (normal, u, v) in FACES {
        let c = center + normal * half;
        let du = u * (u.abs().dot(half));
        let dv = v * (v.abs().dot(half));
        let corners = [c - du - dv, c + du - dv, c + du + dv, c - du + dv];
        let n = transform.transform_vector3(normal).normalize_or_zero();
        for i in [0, 1, 2, 0, 2, 3] {
            out.push(Vertex::new(transform.transform_point3(corners[i]), n, color));
        }
    }
}

/// Scale RGB, keep alpha
fn shade(color: [f32; 4], factor: f32) -> [f32; 4] {
    [color[0] * factor, color[1] * factor, color[2] * factor, color[3]]
}

/// Half-cylinder shell over a tunnel segment, open at both ends
pub fn tunnel_arch(out: &mut Vec<Vertex>, center: Vec3, depth: f32, color: [f32; 4], steps: u32) {
    let steps = steps.max(3);
    let near = center.z + depth / 2.0;
    let far = center.z - depth / 2.0;
    for i in 0..steps {
        let a1 = i as f32 / steps as f32 * PI;
        let a2 = (i + 1) as f32 / steps as f32 * PI;
        let n1 = Vec3::new(a1.cos(), a1.sin(), 0.0);
        let n2 = Vec3::new(a2.cos(), a2.sin(), 0.0);
        let p1 = center + n1 * TUNNEL_RADIUS;
        let p2 = center + n2 * TUNNEL_RADIUS;

        let v = |p: Vec3, z: f32, n: Vec3| Vertex::new(Vec3::new(p.x, p.y, z), n, color);
        out.extend([
            v(p1, near, n1),
            v(p1, far, n1),
            v(p2, far, n2),
            v(p1, near, n1),
            v(p2, far, n2),
            v(p2, near, n2),
        ]);
    }
}

/// Static geometry for a track
#[derive(Debug, Clone, Default)]
pub struct TrackMesh {
    pub vertices: Vec<Vertex>,
    /// Vertices before this index are opaque; the rest are translucent tunnel shells
    pub opaque_count: usize,
}

/// Build the static track mesh: segment boxes, finish stripe, then tunnel shells
pub fn track_mesh(track: &Track, settings: &Settings) -> TrackMesh {
    let mut vertices = Vec::with_capacity(track.segments().len() * BOX_VERTICES);

    for segment in track.segments() {
        // Alternate rows slightly so speed is readable
        let color = if segment.row % 2 == 0 {
            segment.color
        } else {
            shade(segment.color, 0.85)
        };
        push_box(&mut vertices, Mat4::IDENTITY, segment.pos, segment.size, color);

        if matches!(segment.kind, SegmentKind::Boost | SegmentKind::Brake) {
            // Chevron strip so the pad reads at a distance
            let strip = Vec3::new(segment.pos.x, segment.top() + 0.005, segment.pos.z);
            push_box(
                &mut vertices,
                Mat4::IDENTITY,
                strip,
                Vec3::new(SEGMENT_WIDTH * 0.3, 0.01, SEGMENT_DEPTH * 0.8),
                shade(segment.color, 1.4),
            );
        }
    }

    if track.rows() > 0 {
        push_box(
            &mut vertices,
            Mat4::IDENTITY,
            Vec3::new(0.0, 0.005, track.end_z()),
            Vec3::new(track.width(), 0.01, 0.1),
            colors::FINISH,
        );
    }

    let opaque_count = vertices.len();
    let mut shell = colors::TUNNEL_SHELL;
    shell[3] = 0.55;
    for segment in track.segments().iter().filter(|s| s.kind == SegmentKind::Tunnel) {
        let (x, y) = segment.tube_axis();
        tunnel_arch(
            &mut vertices,
            Vec3::new(x, y, segment.pos.z),
            segment.size.z,
            shell,
            settings.quality.tunnel_segments(),
        );
    }

    TrackMesh {
        vertices,
        opaque_count,
    }
}

/// Ship model: hull, cockpit and engine, posed by the ship's rotation
pub fn ship_mesh(out: &mut Vec<Vertex>, ship: &Ship) {
    let transform = Mat4::from_rotation_translation(
        Quat::from_euler(EulerRot::XYZ, ship.rotation.x, 0.0, ship.rotation.z),
        ship.pos + Vec3::Y * SHIP_HALF_HEIGHT,
    );
    push_box(
        out,
        transform,
        Vec3::ZERO,
        Vec3::new(SHIP_HALF_WIDTH * 2.0, SHIP_HALF_HEIGHT * 2.0, SHIP_HALF_LENGTH * 2.0),
        colors::SHIP_HULL,
    );
    push_box(
        out,
        transform,
        Vec3::new(0.0, SHIP_HALF_HEIGHT, -SHIP_HALF_LENGTH * 0.2),
        Vec3::new(SHIP_HALF_WIDTH, SHIP_HALF_HEIGHT, SHIP_HALF_LENGTH * 0.8),
        colors::SHIP_COCKPIT,
    );
    push_box(
        out,
        transform,
        Vec3::new(0.0, 0.0, SHIP_HALF_LENGTH + 0.02),
        Vec3::new(SHIP_HALF_WIDTH * 1.2, SHIP_HALF_HEIGHT * 1.2, 0.04),
        colors::SHIP_ENGINE,
    );
}

/// Small fading cubes, at most `max` of them
pub fn particle_mesh(out: &mut Vec<Vertex>, particles: &[Particle], max: usize) {
    for particle in particles.iter().take(max) {
        let mut color = particle.color;
        color[3] *= particle.life.clamp(0.0, 1.0);
        push_box(out, Mat4::IDENTITY, particle.pos, Vec3::splat(particle.size), color);
    }
}

/// Per-frame geometry, ship first
pub struct SceneMesh {
    pub vertices: Vec<Vertex>,
    /// Vertices before this index are the opaque ship; the rest are fading particles
    pub opaque_count: usize,
}

/// Per-frame geometry: the ship (unless it blew up) and explosion particles
pub fn scene_mesh(state: &GameState, settings: &Settings) -> SceneMesh {
    let mut vertices = Vec::with_capacity(BOX_VERTICES * (3 + state.particles.len()));
    let destroyed = matches!(
        state.phase,
        GamePhase::GameOver(GameOverCause::Crashed | GameOverCause::OutOfBounds)
    );
    if !destroyed {
        ship_mesh(&mut vertices, &state.ship);
    }
    let opaque_count = vertices.len();
    particle_mesh(&mut vertices, &state.particles, settings.max_particles());
    SceneMesh {
        vertices,
        opaque_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::level::{Level, LevelSet, Palette};

    fn track(text: &str) -> Track {
        Track::build(&Level::parse("mesh-test", text, Palette::default()).unwrap())
    }

    #[test]
    fn test_box_faces_point_outward() {
        let mut out = Vec::new();
        push_box(&mut out, Mat4::IDENTITY, Vec3::ZERO, Vec3::ONE, [1.0; 4]);
        assert_eq!(out.len(), BOX_VERTICES);
        for tri in out.chunks(3) {
            let a = Vec3::from(tri[0].position);
            let b = Vec3::from(tri[1].position);
            let c = Vec3::from(tri[2].position);
            let n = Vec3::from(tri[0].normal);
            assert!((b - a).cross(c - a).dot(n) > 0.0);
            // Face sits on the side its normal points to
            assert!(((a + b + c) / 3.0).dot(n) > 0.0);
        }
    }

    #[test]
    fn test_track_mesh_splits_tunnels() {
        let settings = Settings::default();
        let plain = track_mesh(&track("1111111\n"), &settings);
        // 7 boxes plus the finish stripe
        assert_eq!(plain.vertices.len(), 8 * BOX_VERTICES);
        assert_eq!(plain.opaque_count, plain.vertices.len());

        let tubes = track_mesh(&track("...5...\n"), &settings);
        let steps = settings.quality.tunnel_segments() as usize;
        assert_eq!(tubes.opaque_count, 2 * BOX_VERTICES);
        assert_eq!(tubes.vertices.len(), tubes.opaque_count + steps * 6);
    }

    #[test]
    fn test_tunnel_arch_radius() {
        let mut out = Vec::new();
        tunnel_arch(&mut out, Vec3::ZERO, 2.0, [1.0; 4], 8);
        for v in &out {
            let p = Vec3::from(v.position);
            assert!((p.truncate().length() - TUNNEL_RADIUS).abs() < 1e-5);
            assert!(p.y >= -1e-5);
        }
    }

    #[test]
    fn test_scene_hides_destroyed_ship() {
        let level = Level::parse("scene", "1111111\n", Palette::default()).unwrap();
        let mut state = GameState::new(LevelSet::single(level), PhysicsConfig::default());
        let settings = Settings::default();
        let scene = scene_mesh(&state, &settings);
        assert_eq!(scene.vertices.len(), 3 * BOX_VERTICES);
        assert_eq!(scene.opaque_count, scene.vertices.len());

        state.end_run(GameOverCause::Crashed);
        let expected = state.particles.len().min(settings.max_particles()) * BOX_VERTICES;
        let scene = scene_mesh(&state, &settings);
        assert_eq!(scene.vertices.len(), expected);
        assert_eq!(scene.opaque_count, 0);
    }

    #[test]
    fn test_scene_particles_follow_ship() {
        let level = Level::parse("scene", "1111111\n", Palette::default()).unwrap();
        let mut state = GameState::new(LevelSet::single(level), PhysicsConfig::default());
        state.spawn_explosion();
        assert!(!state.particles.is_empty());

        let settings = Settings::default();
        let scene = scene_mesh(&state, &settings);
        assert_eq!(scene.opaque_count, 3 * BOX_VERTICES);
        let particles = state.particles.len().min(settings.max_particles());
        assert_eq!(
            scene.vertices.len() - scene.opaque_count,
            particles * BOX_VERTICES
        );
    }
}
