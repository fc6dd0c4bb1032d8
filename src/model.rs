//! Core data models for the Barrel Blaster touch controls.
//! Button identities, hit regions and the constants object the control layer
//! is built from.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonKind {
    Left,
    Right,
    Up,
    Down,
    Jump,
}

impl ButtonKind {
    /// Definition order; layouts are always produced in this order.
    pub const ALL: [ButtonKind; 5] = [
        ButtonKind::Left,
        ButtonKind::Right,
        ButtonKind::Up,
        ButtonKind::Down,
        ButtonKind::Jump,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ButtonKind::Left => "left",
            ButtonKind::Right => "right",
            ButtonKind::Up => "up",
            ButtonKind::Down => "down",
            ButtonKind::Jump => "jump",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ButtonKind::Left => "\u{25C0}",
            ButtonKind::Right => "\u{25B6}",
            ButtonKind::Up => "\u{25B2}",
            ButtonKind::Down => "\u{25BC}",
            ButtonKind::Jump => "JUMP",
        }
    }

    pub fn is_dpad(self) -> bool {
        !matches!(self, ButtonKind::Jump)
    }

    pub fn index(self) -> usize {
        self as usize
    }
}

/// Axis-aligned box in surface pixels. Edges are inclusive.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn contains(&self, px: f64, py: f64) -> bool {
        // X first: most touches miss horizontally
        if px < self.x || px > self.x + self.width {
            return false;
        }
        py >= self.y && py <= self.y + self.height
    }

    pub fn center(&self) -> (f64, f64) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Overlap with a non-zero area; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }

    pub fn inflate(&self, by: f64) -> Rect {
        Rect {
            x: self.x - by,
            y: self.y - by,
            width: self.width + by * 2.0,
            height: self.height + by * 2.0,
        }
    }
}

/// One virtual control as placed by a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub struct LogicalButton {
    pub kind: ButtonKind,
    pub rect: Rect,
    pub bg_color: String,
    pub border_color: String,
    pub label: &'static str,
}

/// Scale, opacity and glow blur a button animates between.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Visual {
    pub scale: f64,
    pub opacity: f64,
    pub glow_blur: f64,
}

/// Game constants consumed by the control layer.
///
/// Every field has a default so a partial JSON object can be overlaid with
/// [`ControlsConfig::from_json`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub mobile_breakpoint: f64,

    pub button_size: f64,
    pub jump_button_size: f64,
    pub dpad_margin: f64,
    pub jump_margin: f64,

    pub small_screen_width: f64,
    pub small_screen_scale: f64,
    pub small_screen_margin_scale: f64,

    pub touch_move_throttle_ms: f64,
    pub transition_duration_ms: f64,

    pub button_scale_normal: f64,
    pub button_scale_pressed: f64,
    pub button_opacity: f64,
    pub button_opacity_pressed: f64,
    pub glow_blur: f64,
    pub glow_blur_pressed: f64,

    pub haptic_enabled: bool,
    pub haptic_duration_ms: u32,

    pub glow_enabled: bool,
    pub scanline_enabled: bool,
    pub scanline_spacing: f64,
    pub scanline_opacity: f64,

    pub passive_listeners: bool,
    pub performance_logging: bool,
    pub max_event_time_ms: f64,
    pub dirty_flag_optimization: bool,

    pub color_dpad_bg: String,
    pub color_dpad_bg_pressed: String,
    pub color_dpad_border: String,
    pub color_jump_bg: String,
    pub color_jump_bg_pressed: String,
    pub color_jump_border: String,
    pub color_text: String,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1280.0,
            canvas_height: 720.0,
            mobile_breakpoint: 768.0,
            button_size: 60.0,
            jump_button_size: 110.0,
            dpad_margin: 30.0,
            jump_margin: 40.0,
            small_screen_width: 400.0,
            small_screen_scale: 0.8,
            small_screen_margin_scale: 0.8,
            touch_move_throttle_ms: 16.0,
            transition_duration_ms: 100.0,
            button_scale_normal: 1.0,
            button_scale_pressed: 0.9,
            button_opacity: 0.6,
            button_opacity_pressed: 0.9,
            glow_blur: 8.0,
            glow_blur_pressed: 20.0,
            haptic_enabled: true,
            haptic_duration_ms: 10,
            glow_enabled: true,
            scanline_enabled: true,
            scanline_spacing: 4.0,
            scanline_opacity: 0.15,
            passive_listeners: false,
            performance_logging: false,
            max_event_time_ms: 2.0,
            dirty_flag_optimization: true,
            color_dpad_bg: "#1a1a2e".into(),
            color_dpad_bg_pressed: "#3a1a1a".into(),
            color_dpad_border: "#ff3333".into(),
            color_jump_bg: "#2e2a1a".into(),
            color_jump_bg_pressed: "#4a3a10".into(),
            color_jump_border: "#ffcc00".into(),
            color_text: "#ffffff".into(),
        }
    }
}

impl ControlsConfig {
    /// Overlay a (possibly partial) JSON object on the defaults.
    pub fn from_json(raw: &str) -> Result<Self, crate::error::ControlsError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn idle_visual(&self) -> Visual {
        Visual {
            scale: self.button_scale_normal,
            opacity: self.button_opacity,
            glow_blur: self.glow_blur,
        }
    }

    pub fn pressed_visual(&self) -> Visual {
        Visual {
            scale: self.button_scale_pressed,
            opacity: self.button_opacity_pressed,
            glow_blur: self.glow_blur_pressed,
        }
    }

    pub fn bg_color(&self, kind: ButtonKind, pressed: bool) -> &str {
        match (kind.is_dpad(), pressed) {
            (true, false) => &self.color_dpad_bg,
            (true, true) => &self.color_dpad_bg_pressed,
            (false, false) => &self.color_jump_bg,
            (false, true) => &self.color_jump_bg_pressed,
        }
    }

    pub fn border_color(&self, kind: ButtonKind) -> &str {
        if kind.is_dpad() {
            &self.color_dpad_border
        } else {
            &self.color_jump_border
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_edges_are_inclusive() {
        let r = Rect::new(10.0, 20.0, 30.0, 40.0);
        assert!(r.contains(10.0, 20.0));
        assert!(r.contains(40.0, 60.0));
        assert!(!r.contains(40.1, 30.0));
        assert!(!r.contains(20.0, 19.9));
    }

    #[test]
    fn rects_sharing_an_edge_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 10.0, 10.0)));
        assert!(a.inflate(1.0).intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ControlsConfig::from_json(r#"{"button_size": 80.0, "haptic_enabled": false}"#)
            .unwrap();
        assert_eq!(cfg.button_size, 80.0);
        assert!(!cfg.haptic_enabled);
        assert_eq!(cfg.jump_button_size, ControlsConfig::default().jump_button_size);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(ControlsConfig::from_json("{ nope").is_err());
    }

    #[test]
    fn kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ButtonKind::Jump).unwrap(), "\"jump\"");
        for kind in ButtonKind::ALL {
            assert_eq!(ButtonKind::ALL[kind.index()], kind);
        }
    }
}
