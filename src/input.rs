//! Keyboard input adapter
//!
//! Key-down/key-up edges go in, a `TickInput` comes out. This is the only
//! thing the DOM handlers write to.

use crate::sim::{Steer, TickInput};

/// Keys the game reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    /// Jump, restart, continue
    Action,
    Pause,
}

impl Key {
    /// Map a `KeyboardEvent.key` value
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowLeft" | "a" | "A" => Some(Key::Left),
            "ArrowRight" | "d" | "D" => Some(Key::Right),
            " " | "Spacebar" => Some(Key::Action),
            "Escape" | "p" | "P" => Some(Key::Pause),
            _ => None,
        }
    }
}

/// Accumulated key state between ticks
#[derive(Debug, Clone, Default)]
pub struct InputState {
    left: bool,
    right: bool,
    /// Most recently pressed direction wins while both are held
    last: Steer,
    action: bool,
    pause: bool,
}

impl InputState {
    /// Handle a key-down event; returns whether the key is one of ours
    pub fn key_down(&mut self, key: &str, repeat: bool) -> bool {
        let Some(key) = Key::from_key(key) else {
            return false;
        };
        match key {
            Key::Left => {
                self.left = true;
                self.last = Steer::Left;
            }
            Key::Right => {
                self.right = true;
                self.last = Steer::Right;
            }
            Key::Action if !repeat => self.action = true,
            Key::Pause if !repeat => self.pause = true,
            _ => {}
        }
        true
    }

    /// Handle a key-up event; returns whether the key is one of ours
    pub fn key_up(&mut self, key: &str) -> bool {
        match Key::from_key(key) {
            Some(Key::Left) => {
                self.left = false;
                if self.right {
                    self.last = Steer::Right;
                }
                true
            }
            Some(Key::Right) => {
                self.right = false;
                if self.left {
                    self.last = Steer::Left;
                }
                true
            }
            Some(_) => true,
            None => false,
        }
    }

    /// Current steering state
    pub fn steer(&self) -> Steer {
        match (self.left, self.right) {
            (true, false) => Steer::Left,
            (false, true) => Steer::Right,
            (true, true) => self.last,
            (false, false) => Steer::None,
        }
    }

    /// Intent for the next tick
    pub fn tick_input(&self) -> TickInput {
        TickInput {
            steer: self.steer(),
            jump: self.action,
            pause: self.pause,
        }
    }

    /// Request a pause (focus loss, hidden tab)
    pub fn request_pause(&mut self) {
        self.pause = true;
    }

    /// Clear one-shot inputs after a tick consumed them
    pub fn clear_one_shots(&mut self) {
        self.action = false;
        self.pause = false;
    }

    /// Forget held keys (key-ups are lost when the window loses focus)
    pub fn release_all(&mut self) {
        self.left = false;
        self.right = false;
        self.last = Steer::None;
    }
}
