//! Fixed timestep simulation tick
//!
//! Advances the game one tick: phase transitions, the ship step, and effects.

use super::physics::{ShipEvent, step};
use super::state::{GameOverCause, GamePhase, GameState};

/// Discrete steering intent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Steer {
    Left,
    #[default]
    None,
    Right,
}

impl Steer {
    /// -1 for left, +1 for right
    pub fn axis(&self) -> f32 {
        match self {
            Steer::Left => -1.0,
            Steer::None => 0.0,
            Steer::Right => 1.0,
        }
    }
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held steering direction
    pub steer: Steer,
    /// Jump / restart / continue (one-shot)
    pub jump: bool,
    /// Pause toggle (one-shot)
    pub pause: bool,
}

/// Advance the game state by one tick
pub fn tick(state: &mut GameState, input: &TickInput) {
    // Handle pause toggle
    if input.pause {
        match state.phase {
            GamePhase::Playing => {
                state.phase = GamePhase::Paused;
                return;
            }
            GamePhase::Paused => state.phase = GamePhase::Playing,
            _ => {}
        }
    }

    match state.phase {
        GamePhase::Paused => return,
        GamePhase::GameOver(_) => {
            // Ship is frozen; the explosion keeps playing
            let gravity = state.physics.gravity;
            state.update_particles(gravity);
            if input.jump {
                state.restart();
            }
            return;
        }
        GamePhase::LevelComplete => {
            if input.jump {
                state.advance_level();
            }
            return;
        }
        GamePhase::Playing => {}
    }

    state.frame += 1;

    let outcome = step(&state.ship, &state.track, input, &state.physics);
    let fatal = outcome.fatal();
    let finished = outcome.finished();
    state.ship = outcome.ship;

    if let Some(event) = fatal {
        let cause = match event {
            ShipEvent::OutOfBounds => GameOverCause::OutOfBounds,
            ShipEvent::Fell => GameOverCause::Fell,
            _ => GameOverCause::Crashed,
        };
        state.end_run(cause);
    } else if finished {
        state.phase = GamePhase::LevelComplete;
        log::info!(
            "Level {} ({:?}) complete in {} ticks",
            state.level_index + 1,
            state.level().name,
            state.frame
        );
    }

    let gravity = state.physics.gravity;
    state.update_particles(gravity);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::consts::*;
    use crate::level::{Level, LevelSet, Palette};
    use crate::sim::state::ShipState;
    use crate::sim::track::Track;

    fn game(text: &str) -> GameState {
        let level = Level::parse("tick-test", text, Palette::default()).unwrap();
        GameState::new(LevelSet::single(level), PhysicsConfig::default())
    }

    fn press_jump() -> TickInput {
        TickInput {
            jump: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_tick_pause() {
        let mut state = game(&"1111111\n".repeat(10));
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Paused);

        let z = state.ship.pos.z;
        tick(&mut state, &TickInput::default());
        assert_eq!(state.ship.pos.z, z);

        tick(&mut state, &pause);
        assert_eq!(state.phase, GamePhase::Playing);
        assert!(state.ship.pos.z < z);
    }

    #[test]
    fn test_gap_row_scenario() {
        // Five rows of road, one gap row, then road again
        let text = format!("{}       \n{}", "1111111\n".repeat(5), "1111111\n".repeat(5));
        let mut state = game(&text);
        let idle = TickInput::default();

        let mut fall_frame = None;
        for _ in 0..400 {
            let was_supported = state
                .track
                .segments_under(state.ship.probe().0, state.ship.probe().1)
                .next()
                .is_some();
            tick(&mut state, &idle);

            let (x, z) = state.ship.probe();
            let supported = state.track.segments_under(x, z).next().is_some();

            if fall_frame.is_none() {
                if state.ship.state == ShipState::Airborne {
                    // Falling starts the very tick the probe loses support
                    assert!(was_supported);
                    assert!(!supported);
                    fall_frame = Some(state.frame);
                } else {
                    assert!(supported, "grounded without support at frame {}", state.frame);
                }
            }

            if let GamePhase::GameOver(cause) = state.phase {
                assert_eq!(cause, GameOverCause::Fell);
                assert!(state.ship.pos.y < FLOOR_THRESHOLD);
                break;
            }
            assert!(state.ship.pos.y >= FLOOR_THRESHOLD);
        }

        let fall_frame = fall_frame.expect("ship never started falling");
        // Gap row begins at z = -5 * depth + depth / 2; the probe leads the ship
        let gap_start = -5.0 * SEGMENT_DEPTH + SEGMENT_DEPTH / 2.0;
        let speed = PhysicsConfig::default().base_speed;
        let expected = ((-gap_start - PROBE_OFFSET) / speed).floor() as u64 + 1;
        assert_eq!(fall_frame, expected);
        assert!(matches!(state.phase, GamePhase::GameOver(GameOverCause::Fell)));
    }

    #[test]
    fn test_restart_resets_ship_and_track() {
        let text = format!("{}       \n1111111\n", "1111111\n".repeat(3));
        let mut state = game(&text);
        let original_track = Track::build(state.level());
        let start = state.ship.clone();

        let idle = TickInput::default();
        for _ in 0..500 {
            tick(&mut state, &idle);
            if matches!(state.phase, GamePhase::GameOver(_)) {
                break;
            }
        }
        assert!(matches!(state.phase, GamePhase::GameOver(_)));
        assert_eq!(state.ship.state, ShipState::GameOver);

        // Frozen while game over
        let frozen = state.ship.pos;
        tick(&mut state, &idle);
        assert_eq!(state.ship.pos, frozen);

        tick(&mut state, &press_jump());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.ship, start);
        assert_eq!(state.track, original_track);
        assert_eq!(state.frame, 0);
    }

    #[test]
    fn test_crash_spawns_deterministic_explosion() {
        let text = format!("7777777\n{}", "1111111\n".repeat(2));
        let mut first = game(&text);
        let mut second = game(&text);
        let idle = TickInput::default();

        for _ in 0..100 {
            tick(&mut first, &idle);
            tick(&mut second, &idle);
        }
        assert_eq!(first.phase, GamePhase::GameOver(GameOverCause::Crashed));
        assert!(!first.particles.is_empty());
        assert_eq!(first.particles, second.particles);
    }

    #[test]
    fn test_level_complete_advances() {
        let a = Level::parse("a", "1111111\n", Palette::default()).unwrap();
        let b = Level::parse("b", "2222222\n2222222\n", Palette::default()).unwrap();
        let mut state = GameState::new(
            LevelSet::new(vec![a, b]).unwrap(),
            PhysicsConfig::default(),
        );

        let idle = TickInput::default();
        for _ in 0..50 {
            tick(&mut state, &idle);
        }
        assert_eq!(state.phase, GamePhase::LevelComplete);

        tick(&mut state, &press_jump());
        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.level_index, 1);
        assert_eq!(state.level().name, "b");
        assert_eq!(state.track.rows(), 2);
    }

    #[test]
    fn test_determinism() {
        let text = format!("{}1171111\n{}", "1111111\n".repeat(6), "1111111\n".repeat(4));
        let mut state1 = game(&text);
        let mut state2 = game(&text);

        let inputs = [
            TickInput {
                steer: Steer::Left,
                ..Default::default()
            },
            press_jump(),
            TickInput::default(),
            TickInput {
                steer: Steer::Right,
                ..Default::default()
            },
        ];

        for i in 0..120 {
            let input = &inputs[i % inputs.len()];
            tick(&mut state1, input);
            tick(&mut state2, input);
        }

        assert_eq!(state1.frame, state2.frame);
        assert_eq!(state1.phase, state2.phase);
        assert_eq!(state1.ship, state2.ship);
    }
}
