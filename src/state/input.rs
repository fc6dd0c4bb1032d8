use std::collections::HashSet;

use crate::model::ButtonKind;

/// Keys that should not reach the page (scrolling, etc).
const GAME_KEYS: [&str; 6] = ["ArrowLeft", "ArrowRight", "ArrowUp", "ArrowDown", " ", "Space"];

/// Keyboard plus virtual-button state polled by the game each frame.
#[derive(Default, Debug, Clone)]
pub struct InputState {
    keys_down: HashSet<String>,
    /// Keys that went down since the last `clear_pressed`.
    keys_pressed: HashSet<String>,
    touch_buttons: [bool; 5],
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_game_key(key: &str) -> bool {
        GAME_KEYS.contains(&key)
    }

    pub fn key_down(&mut self, key: &str) {
        // auto-repeat keydowns must not count as a fresh press
        if !self.keys_down.contains(key) {
            self.keys_pressed.insert(key.to_string());
        }
        self.keys_down.insert(key.to_string());
    }

    pub fn key_up(&mut self, key: &str) {
        self.keys_down.remove(key);
        self.keys_pressed.remove(key);
    }

    /// Window lost focus. Only keyboard state is dropped; virtual buttons
    /// stay tied to their touch bindings and are released per identifier.
    pub fn blur(&mut self) {
        self.keys_down.clear();
        self.keys_pressed.clear();
    }

    /// Frame boundary.
    pub fn clear_pressed(&mut self) {
        self.keys_pressed.clear();
    }

    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.keys_pressed.contains(key)
    }

    pub fn set_touch_button(&mut self, kind: ButtonKind, pressed: bool) {
        self.touch_buttons[kind.index()] = pressed;
    }

    /// Virtual button state only.
    pub fn is_pressed(&self, kind: ButtonKind) -> bool {
        self.touch_buttons[kind.index()]
    }

    pub fn is_left_down(&self) -> bool {
        self.is_key_down("ArrowLeft") || self.is_pressed(ButtonKind::Left)
    }

    pub fn is_right_down(&self) -> bool {
        self.is_key_down("ArrowRight") || self.is_pressed(ButtonKind::Right)
    }

    pub fn is_up_down(&self) -> bool {
        self.is_key_down("ArrowUp") || self.is_pressed(ButtonKind::Up)
    }

    pub fn is_down_down(&self) -> bool {
        self.is_key_down("ArrowDown") || self.is_pressed(ButtonKind::Down)
    }

    /// Space is edge-triggered, the touch jump button is level-triggered.
    pub fn is_jump_pressed(&self) -> bool {
        self.is_key_pressed(" ") || self.is_key_pressed("Space") || self.is_pressed(ButtonKind::Jump)
    }
}
