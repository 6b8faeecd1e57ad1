//! Dashboard view model
//!
//! Plain data computed from the game state each frame. The page shell only
//! copies these strings into the DOM.

use crate::sim::{GameOverCause, GamePhase, GameState, ShipState};

/// Which overlay (if any) should be visible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    None,
    Paused,
    GameOver,
    LevelComplete,
}

impl Overlay {
    /// DOM id of the overlay element
    pub fn element_id(&self) -> Option<&'static str> {
        match self {
            Overlay::None => None,
            Overlay::Paused => Some("pause-menu"),
            Overlay::GameOver => Some("game-over"),
            Overlay::LevelComplete => Some("level-complete"),
        }
    }
}

/// Everything the HUD displays for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard {
    pub level_name: String,
    /// "3 / 5"
    pub level_number: String,
    /// Forward speed relative to the level's base speed
    pub speed_percent: u32,
    pub progress_percent: u32,
    /// Short ship status label
    pub status: &'static str,
    pub overlay: Overlay,
    /// Text for the visible overlay
    pub message: String,
}

impl Dashboard {
    pub fn from_state(state: &GameState) -> Self {
        let base = state.physics.base_speed;
        let speed_percent = if base > 0.0 {
            (state.ship.forward_speed / base * 100.0).round().max(0.0) as u32
        } else {
            0
        };

        let status = match state.ship.state {
            ShipState::Grounded => "Cruising",
            ShipState::Airborne => "Airborne",
            ShipState::InTunnel => "Tunnel",
            ShipState::GameOver => "Destroyed",
        };

        let (overlay, message) = match state.phase {
            GamePhase::Playing => (Overlay::None, String::new()),
            GamePhase::Paused => (Overlay::Paused, "Paused - press Escape to resume".to_string()),
            GamePhase::GameOver(cause) => {
                let what = match cause {
                    GameOverCause::Fell => "You fell off the track",
                    GameOverCause::Crashed => "You crashed",
                    GameOverCause::OutOfBounds => "You left the track",
                };
                (Overlay::GameOver, format!("{what} - press Space to retry"))
            }
            GamePhase::LevelComplete => (
                Overlay::LevelComplete,
                format!("{} complete - press Space to continue", state.level().name),
            ),
        };

        Self {
            level_name: state.level().name.clone(),
            level_number: format!("{} / {}", state.level_index + 1, state.level_count()),
            speed_percent,
            progress_percent: (state.progress() * 100.0).round() as u32,
            status,
            overlay,
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PhysicsConfig;
    use crate::level::{Level, LevelSet, Palette};
    use crate::sim::{TickInput, tick};

    fn game() -> GameState {
        let a = Level::parse("Warmup", &"1111111\n".repeat(4), Palette::default()).unwrap();
        let b = Level::parse("Second", "1111111\n", Palette::default()).unwrap();
        GameState::new(LevelSet::new(vec![a, b]).unwrap(), PhysicsConfig::default())
    }

    #[test]
    fn test_initial_dashboard() {
        let dash = Dashboard::from_state(&game());
        assert_eq!(dash.level_name, "Warmup");
        assert_eq!(dash.level_number, "1 / 2");
        assert_eq!(dash.speed_percent, 100);
        assert_eq!(dash.progress_percent, 0);
        assert_eq!(dash.status, "Cruising");
        assert_eq!(dash.overlay, Overlay::None);
        assert!(dash.message.is_empty());
    }

    #[test]
    fn test_overlays_follow_phase() {
        let mut state = game();
        state.phase = GamePhase::Paused;
        assert_eq!(Dashboard::from_state(&state).overlay, Overlay::Paused);

        state.end_run(GameOverCause::Fell);
        let dash = Dashboard::from_state(&state);
        assert_eq!(dash.overlay, Overlay::GameOver);
        assert!(dash.message.contains("fell"));
        assert_eq!(dash.status, "Destroyed");
        assert_eq!(Overlay::GameOver.element_id(), Some("game-over"));
    }

    #[test]
    fn test_progress_reaches_completion() {
        let mut state = game();
        for _ in 0..200 {
            tick(&mut state, &TickInput::default());
        }
        let dash = Dashboard::from_state(&state);
        assert_eq!(dash.overlay, Overlay::LevelComplete);
        assert_eq!(dash.progress_percent, 100);
        assert!(dash.message.starts_with("Warmup complete"));
    }
}
