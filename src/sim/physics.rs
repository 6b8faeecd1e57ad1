//! Ship update step
//!
//! `step` is a pure function of (ship, track, intent): it returns the next
//! ship and what happened to it, and never touches rendering or game phase.

use super::collision::{TubeContact, out_of_bounds, probe_contacts, tube_contact};
use super::state::{Ship, ShipState};
use super::tick::TickInput;
use super::track::{Segment, SegmentKind, Track};
use crate::approach;
use crate::config::{PhysicsConfig, RaisedBlockPolicy};
use crate::consts::*;

/// Something notable that happened during a step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShipEvent {
    Jumped,
    Landed,
    /// Drove off an edge (or the track ran out under the ship)
    StartedFalling,
    /// Lifted onto a raised block (step-up policy)
    SteppedUp,
    EnteredTunnel,
    /// Hit a raised block or the tunnel mouth
    Crashed,
    /// Dropped below the floor threshold
    Fell,
    OutOfBounds,
    /// Crossed the far end of the track
    Finished,
}

impl ShipEvent {
    /// Events that end the run
    pub fn is_fatal(&self) -> bool {
        matches!(self, ShipEvent::Crashed | ShipEvent::Fell | ShipEvent::OutOfBounds)
    }
}

/// Result of one step
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub ship: Ship,
    pub events: Vec<ShipEvent>,
}

impl StepOutcome {
    /// First run-ending event, if any
    pub fn fatal(&self) -> Option<ShipEvent> {
        self.events.iter().copied().find(ShipEvent::is_fatal)
    }

    pub fn finished(&self) -> bool {
        self.events.contains(&ShipEvent::Finished)
    }
}

/// Advance the ship by one tick
pub fn step(ship: &Ship, track: &Track, input: &TickInput, config: &PhysicsConfig) -> StepOutcome {
    let mut ship = ship.clone();
    let mut events = Vec::new();

    if ship.state == ShipState::GameOver {
        return StepOutcome { ship, events };
    }

    // Steering: discrete intent scaled by a constant
    let steer = input.steer.axis();
    ship.vel.x = steer * config.steer_speed;
    ship.pos.x += ship.vel.x;

    // Always advancing
    ship.pos.z -= ship.forward_speed;

    // Jumping is only possible from open road
    if input.jump && ship.state == ShipState::Grounded {
        ship.state = ShipState::Airborne;
        ship.vel.y = config.jump_velocity;
        events.push(ShipEvent::Jumped);
    }

    let mut descending = false;
    if ship.state == ShipState::Airborne {
        descending = ship.vel.y <= 0.0;
        ship.pos.y += ship.vel.y;
        ship.vel.y -= config.gravity;
    }

    // Cosmetic attitude
    ship.rotation.z = approach(ship.rotation.z, -steer * ROLL_MAX, 0.05);
    ship.rotation.x = if ship.state == ShipState::Airborne {
        (ship.vel.y * 2.0).clamp(-0.3, 0.3)
    } else {
        approach(ship.rotation.x, 0.0, 0.05)
    };

    if out_of_bounds(track, ship.pos.x) {
        events.push(ShipEvent::OutOfBounds);
        return StepOutcome { ship, events };
    }

    let (_, probe_z) = ship.probe();
    if probe_z < track.end_z() && ship.pos.y >= -config.landing_tolerance {
        events.push(ShipEvent::Finished);
        return StepOutcome { ship, events };
    }

    resolve_track_contacts(&mut ship, track, config, descending, &mut events);

    if !events.contains(&ShipEvent::Crashed) && ship.pos.y < FLOOR_THRESHOLD {
        events.push(ShipEvent::Fell);
    }

    StepOutcome { ship, events }
}

/// Support, landing, falling edges, raised blocks and tunnel tubes
fn resolve_track_contacts(
    ship: &mut Ship,
    track: &Track,
    config: &PhysicsConfig,
    descending: bool,
    events: &mut Vec<ShipEvent>,
) {
    let contacts = probe_contacts(track, ship, config.landing_tolerance);

    match ship.state {
        ShipState::Grounded | ShipState::InTunnel => {
            if let Some(block) = contacts.obstacle {
                match config.raised_blocks {
                    RaisedBlockPolicy::Crash => {
                        events.push(ShipEvent::Crashed);
                        return;
                    }
                    RaisedBlockPolicy::StepUp => {
                        rest_on(ship, block, events);
                        events.push(ShipEvent::SteppedUp);
                    }
                }
            } else if let Some(segment) = contacts.support {
                rest_on(ship, segment, events);
                apply_speed_modifier(ship, segment.kind, config);
            } else {
                // Nothing underneath: start falling this very tick
                ship.state = ShipState::Airborne;
                ship.vel.y = -config.fall_kick;
                events.push(ShipEvent::StartedFalling);
            }
        }
        ShipState::Airborne => {
            if contacts.obstacle.is_some() {
                events.push(ShipEvent::Crashed);
                return;
            }
            if let (true, Some(segment)) = (descending, contacts.support) {
                rest_on(ship, segment, events);
                events.push(ShipEvent::Landed);
            }
        }
        ShipState::GameOver => return,
    }

    match contacts.tunnel {
        Some(tunnel) if ship.pos.y >= tunnel.top() - config.landing_tolerance => {
            match tube_contact(tunnel, ship.pos.x, ship.pos.y, ship.in_tube) {
                TubeContact::Inside => ship.in_tube = true,
                TubeContact::Above => ship.in_tube = false,
                TubeContact::Mouth => events.push(ShipEvent::Crashed),
                TubeContact::Ceiling { y } => {
                    ship.pos.y = y;
                    ship.vel.y = ship.vel.y.min(0.0);
                }
                TubeContact::Wall { x } => {
                    ship.pos.x = x;
                    ship.vel.x = 0.0;
                }
            }
        }
        _ => ship.in_tube = false,
    }
}

/// Snap onto a segment's top surface
fn rest_on(ship: &mut Ship, segment: &Segment, events: &mut Vec<ShipEvent>) {
    ship.pos.y = segment.top();
    ship.vel.y = 0.0;
    let next = if segment.kind == SegmentKind::Tunnel {
        ShipState::InTunnel
    } else {
        ShipState::Grounded
    };
    if next == ShipState::InTunnel && ship.state != ShipState::InTunnel {
        events.push(ShipEvent::EnteredTunnel);
    }
    ship.state = next;
}

fn apply_speed_modifier(ship: &mut Ship, kind: SegmentKind, config: &PhysicsConfig) {
    match kind {
        SegmentKind::Boost => {
            ship.forward_speed = (ship.forward_speed + config.speed_step).min(config.max_speed);
        }
        SegmentKind::Brake => {
            ship.forward_speed = (ship.forward_speed - config.speed_step).max(config.min_speed);
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::level::{Level, Palette};
    use crate::sim::tick::Steer;
    use glam::Vec3;

    fn track(text: &str) -> Track {
        Track::build(&Level::parse("physics-test", text, Palette::default()).unwrap())
    }

    fn idle() -> TickInput {
        TickInput::default()
    }

    #[test]
    fn test_grounded_ship_advances_and_stays_on_surface() {
        let track = track("1111111\n1111111\n1111111\n");
        let config = PhysicsConfig::default();
        let ship = Ship::new(track.start_position(), config.base_speed);

        let out = step(&ship, &track, &idle(), &config);
        assert!(out.events.is_empty());
        assert_eq!(out.ship.state, ShipState::Grounded);
        assert_eq!(out.ship.pos.y, 0.0);
        assert!((out.ship.pos.z + config.base_speed).abs() < 1e-6);
    }

    #[test]
    fn test_steering_scales_lateral_velocity() {
        let track = track("1111111\n1111111\n");
        let config = PhysicsConfig::default();
        let ship = Ship::new(track.start_position(), config.base_speed);
        let input = TickInput {
            steer: Steer::Left,
            ..Default::default()
        };
        let out = step(&ship, &track, &input, &config);
        assert_eq!(out.ship.vel.x, -config.steer_speed);
        assert_eq!(out.ship.pos.x, -config.steer_speed);
        assert!(out.ship.rotation.z > 0.0);
    }

    #[test]
    fn test_jump_then_land_snaps_to_surface() {
        let track = track(&"1111111\n".repeat(20));
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(track.start_position(), config.base_speed);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let out = step(&ship, &track, &jump, &config);
        assert_eq!(out.events, vec![ShipEvent::Jumped]);
        assert_eq!(out.ship.state, ShipState::Airborne);
        assert!(out.ship.pos.y > 0.0);
        ship = out.ship;

        let mut landed = false;
        for _ in 0..200 {
            let out = step(&ship, &track, &idle(), &config);
            ship = out.ship;
            if out.events.contains(&ShipEvent::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(ship.state, ShipState::Grounded);
        assert_eq!(ship.pos.y, 0.0);
        assert_eq!(ship.vel.y, 0.0);
    }

    #[test]
    fn test_landing_requires_descent() {
        // Rising through the tolerance band right after take-off must not land
        let track = track("1111111\n1111111\n");
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(Vec3::new(0.0, 0.05, 0.0), config.base_speed);
        ship.state = ShipState::Airborne;
        ship.vel.y = 0.1;
        let out = step(&ship, &track, &idle(), &config);
        assert_eq!(out.ship.state, ShipState::Airborne);

        ship.vel.y = -0.1;
        let out = step(&ship, &track, &idle(), &config);
        assert_eq!(out.ship.state, ShipState::Grounded);
        assert_eq!(out.ship.pos.y, 0.0);
    }

    #[test]
    fn test_raised_block_policy() {
        let track = track("1117111\n1111111\n");
        let mut config = PhysicsConfig::default();
        // Place the ship so the next step puts the probe on the raised row
        let start = Vec3::new(0.0, 0.0, -SEGMENT_DEPTH / 2.0 + PROBE_OFFSET - 0.01);
        let ship = Ship::new(start, config.base_speed);

        let out = step(&ship, &track, &idle(), &config);
        assert_eq!(out.fatal(), Some(ShipEvent::Crashed));

        config.raised_blocks = RaisedBlockPolicy::StepUp;
        let out = step(&ship, &track, &idle(), &config);
        assert!(out.fatal().is_none());
        assert!(out.events.contains(&ShipEvent::SteppedUp));
        assert_eq!(out.ship.pos.y, RAISED_LOW_TOP);
    }

    #[test]
    fn test_jump_clears_raised_block() {
        let track = track(&format!("{}1117111\n1111111\n1111111\n", "1111111\n".repeat(4)));
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(track.start_position(), config.base_speed);
        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        ship = step(&ship, &track, &jump, &config).ship;
        for _ in 0..60 {
            let out = step(&ship, &track, &idle(), &config);
            assert!(out.fatal().is_none(), "events: {:?}", out.events);
            ship = out.ship;
        }
        assert!(ship.state.is_on_track());
    }

    #[test]
    fn test_speed_modifiers() {
        let config = PhysicsConfig::default();
        let boost = track(&"9999999\n".repeat(3));
        let ship = Ship::new(boost.start_position(), config.base_speed);
        let out = step(&ship, &boost, &idle(), &config);
        assert!(out.ship.forward_speed > config.base_speed);

        let brake = track(&"0000000\n".repeat(3));
        let mut ship = Ship::new(brake.start_position(), config.base_speed);
        for _ in 0..30 {
            ship = step(&ship, &brake, &idle(), &config).ship;
        }
        assert_eq!(ship.forward_speed, config.min_speed);
    }

    #[test]
    fn test_tunnel_entry_and_no_jump_inside() {
        let track = track(&format!("{}1111111\n", "5555555\n".repeat(5)));
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(track.start_position(), config.base_speed);

        let mut entered = false;
        for _ in 0..20 {
            let out = step(&ship, &track, &idle(), &config);
            entered |= out.events.contains(&ShipEvent::EnteredTunnel);
            ship = out.ship;
        }
        assert!(entered);
        assert_eq!(ship.state, ShipState::InTunnel);
        assert!(ship.in_tube);

        let jump = TickInput {
            jump: true,
            ..Default::default()
        };
        let out = step(&ship, &track, &jump, &config);
        assert!(!out.events.contains(&ShipEvent::Jumped));
        assert_eq!(out.ship.state, ShipState::InTunnel);
    }

    #[test]
    fn test_tunnel_mouth_off_centre_crashes() {
        let track = track(&format!("{}1111111\n", "5555555\n".repeat(5)));
        let config = PhysicsConfig::default();
        let ship = Ship::new(Vec3::new(0.45, 0.0, 0.0), config.base_speed);
        let mut ship = ship;
        let mut crashed = false;
        for _ in 0..20 {
            let out = step(&ship, &track, &idle(), &config);
            let fatal = out.fatal();
            ship = out.ship;
            if fatal == Some(ShipEvent::Crashed) {
                crashed = true;
                break;
            }
        }
        assert!(crashed);
    }

    #[test]
    fn test_tunnel_wall_holds_ship_inside() {
        let track = track(&format!("{}1111111\n", "5555555\n".repeat(8)));
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(track.start_position(), config.base_speed);
        for _ in 0..20 {
            ship = step(&ship, &track, &idle(), &config).ship;
        }
        assert!(ship.in_tube);

        let right = TickInput {
            steer: Steer::Right,
            ..Default::default()
        };
        for _ in 0..20 {
            let out = step(&ship, &track, &right, &config);
            assert!(out.fatal().is_none());
            ship = out.ship;
        }
        assert!(ship.pos.x > 0.0 && ship.pos.x < TUNNEL_RADIUS - SHIP_RADIUS + 1e-4);
    }

    #[test]
    fn test_finish_line() {
        let track = track("1111111\n");
        let config = PhysicsConfig::default();
        let ship = Ship::new(Vec3::new(0.0, 0.0, track.end_z() + PROBE_OFFSET), 0.1);
        let out = step(&ship, &track, &idle(), &config);
        assert!(out.finished());
    }

    #[test]
    fn test_out_of_bounds_regardless_of_height() {
        let track = track("1111111\n1111111\n");
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(Vec3::new(10.49, 3.0, 0.0), config.base_speed);
        ship.state = ShipState::Airborne;
        let right = TickInput {
            steer: Steer::Right,
            ..Default::default()
        };
        let out = step(&ship, &track, &right, &config);
        assert_eq!(out.fatal(), Some(ShipEvent::OutOfBounds));
    }

    #[test]
    fn test_airborne_into_raised_block_body_crashes() {
        let track = track("8888888\n1111111\n");
        let config = PhysicsConfig::default();
        let mut ship = Ship::new(Vec3::new(0.0, 0.4, -0.75), config.base_speed);
        ship.state = ShipState::Airborne;

        let out = step(&ship, &track, &idle(), &config);
        assert_eq!(out.fatal(), Some(ShipEvent::Crashed));
        assert!(!out.events.contains(&ShipEvent::Landed));
    }
}
