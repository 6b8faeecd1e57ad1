//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod physics;
pub mod state;
pub mod tick;
pub mod track;

pub use collision::{Contacts, TubeContact, probe_contacts, tube_contact};
pub use physics::{ShipEvent, StepOutcome, step};
pub use state::{GameOverCause, GamePhase, GameState, Particle, Ship, ShipState};
pub use tick::{Steer, TickInput, tick};
pub use track::{Segment, SegmentKind, Track};
