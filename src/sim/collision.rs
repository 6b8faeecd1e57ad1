//! Collision queries between the ship and the track
//!
//! Everything here is read-only: it reports what the ship is touching and
//! leaves the response to the physics step.

use super::state::Ship;
use super::track::{Segment, SegmentKind, Track};
use crate::consts::*;

/// What lies under the ship's footprint probe
#[derive(Debug, Clone, Default)]
pub struct Contacts<'a> {
    /// Highest segment whose top is within tolerance of the ship's height
    pub support: Option<&'a Segment>,
    /// Tallest raised block whose body overlaps the ship's height
    pub obstacle: Option<&'a Segment>,
    /// Tunnel segment under the probe, if any
    pub tunnel: Option<&'a Segment>,
}

/// Gather contacts under the ship's (forward-offset) probe
pub fn probe_contacts<'a>(track: &'a Track, ship: &Ship, tolerance: f32) -> Contacts<'a> {
    let (x, z) = ship.probe();
    let y = ship.pos.y;
    let mut contacts = Contacts::default();

    for segment in track.segments_under(x, z) {
        let top = segment.top();

        if (top - y).abs() <= tolerance && contacts.support.is_none_or(|s| top > s.top()) {
            contacts.support = Some(segment);
        }

        let body_overlap = top > y + tolerance && segment.bottom() < y + 2.0 * SHIP_HALF_HEIGHT;
        if segment.kind == SegmentKind::Raised
            && body_overlap
            && contacts.obstacle.is_none_or(|s| top > s.top())
        {
            contacts.obstacle = Some(segment);
        }

        if segment.kind == SegmentKind::Tunnel && contacts.tunnel.is_none() {
            contacts.tunnel = Some(segment);
        }
    }

    contacts
}

/// Result of testing the ship against a tunnel's circular cross-section
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TubeContact {
    /// Fits inside the tube
    Inside,
    /// Above the arch; the tube doesn't apply
    Above,
    /// Outside the profile while entering: hit the tunnel mouth or roof
    Mouth,
    /// Inside, pressing on the ceiling; `y` is the highest allowed height
    Ceiling { y: f32 },
    /// Inside, pressing on a side wall; `x` is the allowed position
    Wall { x: f32 },
}

/// Usable radius for the ship's centre
#[inline]
fn clearance() -> f32 {
    TUNNEL_RADIUS - SHIP_RADIUS
}

/// Test a ship position against a tunnel segment's tube
///
/// `was_inside` is whether the ship was already inside this tube last tick;
/// leaving the profile from inside is a wall/ceiling contact, arriving
/// outside it is a collision with the mouth.
pub fn tube_contact(segment: &Segment, x: f32, y: f32, was_inside: bool) -> TubeContact {
    let (axis_x, axis_y) = segment.tube_axis();
    if y > axis_y + TUNNEL_RADIUS {
        return TubeContact::Above;
    }

    let dx = x - axis_x;
    let dy = (y + SHIP_HALF_HEIGHT) - axis_y;
    let limit = clearance();
    if dx.hypot(dy) <= limit {
        return TubeContact::Inside;
    }
    if !was_inside {
        return TubeContact::Mouth;
    }

    if dy >= dx.abs() {
        let room = (limit * limit - dx * dx).max(0.0).sqrt();
        TubeContact::Ceiling {
            y: axis_y + room - SHIP_HALF_HEIGHT,
        }
    } else {
        let room = (limit * limit - dy * dy).max(0.0).sqrt();
        TubeContact::Wall {
            x: axis_x + room.copysign(dx),
        }
    }
}

/// Whether the ship has drifted past the lateral limit
#[inline]
pub fn out_of_bounds(track: &Track, x: f32) -> bool {
    x.abs() > OUT_OF_BOUNDS_FACTOR * track.width()
}
