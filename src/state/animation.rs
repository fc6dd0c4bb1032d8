use std::collections::HashMap;

use crate::model::{ButtonKind, ControlsConfig, Visual};

const SCALE_EPSILON: f64 = 0.001;
const OPACITY_EPSILON: f64 = 0.001;
const GLOW_EPSILON: f64 = 0.1;

#[derive(Clone, Debug, PartialEq)]
pub struct ButtonAnimationState {
    pub is_pressed: bool,
    pub current: Visual,
    pub target: Visual,
    pub last_press_ms: f64,
    /// Seconds since the last press/release.
    pub since_transition: f64,
    /// Cleared only when the button is drawn.
    pub needs_redraw: bool,
    pressed_changed: bool,
}

impl ButtonAnimationState {
    fn new(idle: Visual) -> Self {
        Self {
            is_pressed: false,
            current: idle,
            target: idle,
            last_press_ms: 0.0,
            since_transition: 0.0,
            needs_redraw: true,
            pressed_changed: false,
        }
    }
}

pub fn ease_out(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

fn lerp(start: f64, end: f64, t: f64) -> f64 {
    start + (end - start) * t
}

fn approach(current: f64, target: f64, eased: f64, epsilon: f64) -> f64 {
    let next = lerp(current, target, eased);
    if (next - target).abs() < epsilon { target } else { next }
}

/// Idle/pressed transitions for every button, keyed by kind.
#[derive(Clone, Debug)]
pub struct ButtonAnimator {
    states: HashMap<ButtonKind, ButtonAnimationState>,
    idle: Visual,
    pressed: Visual,
    duration_secs: f64,
}

impl ButtonAnimator {
    /// `idle_opacity` comes from the user's opacity setting.
    pub fn new(cfg: &ControlsConfig, idle_opacity: f64) -> Self {
        let idle = Visual {
            opacity: idle_opacity,
            ..cfg.idle_visual()
        };
        let states = ButtonKind::ALL
            .iter()
            .map(|&kind| (kind, ButtonAnimationState::new(idle)))
            .collect();
        Self {
            states,
            idle,
            pressed: cfg.pressed_visual(),
            duration_secs: cfg.transition_duration_ms / 1000.0,
        }
    }

    pub fn state(&self, kind: ButtonKind) -> Option<&ButtonAnimationState> {
        self.states.get(&kind)
    }

    pub fn state_mut(&mut self, kind: ButtonKind) -> Option<&mut ButtonAnimationState> {
        self.states.get_mut(&kind)
    }

    /// Returns false if the button was already pressed.
    pub fn press(&mut self, kind: ButtonKind, now_ms: f64) -> bool {
        let pressed = self.pressed;
        let Some(state) = self.states.get_mut(&kind) else { return false };
        if state.is_pressed {
            return false;
        }
        state.is_pressed = true;
        state.target = pressed;
        state.last_press_ms = now_ms;
        state.since_transition = 0.0;
        state.pressed_changed = true;
        state.needs_redraw = true;
        true
    }

    /// Returns false if the button was not pressed.
    pub fn release(&mut self, kind: ButtonKind) -> bool {
        let idle = self.idle;
        let Some(state) = self.states.get_mut(&kind) else { return false };
        if !state.is_pressed {
            return false;
        }
        state.is_pressed = false;
        state.target = idle;
        state.since_transition = 0.0;
        state.pressed_changed = true;
        state.needs_redraw = true;
        true
    }

    /// Advance every button by `dt` seconds. Returns whether any button
    /// needs a redraw afterwards.
    pub fn update(&mut self, dt: f64) -> bool {
        let progress = if self.duration_secs > 0.0 {
            (dt / self.duration_secs).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = ease_out(progress);
        let mut any_dirty = false;
        for state in self.states.values_mut() {
            let target = state.target;
            let prev = state.current;
            state.since_transition += dt.max(0.0);
            if state.since_transition + 1e-9 >= self.duration_secs {
                state.current = target;
            } else {
                state.current = Visual {
                    scale: approach(prev.scale, target.scale, eased, SCALE_EPSILON),
                    opacity: approach(prev.opacity, target.opacity, eased, OPACITY_EPSILON),
                    glow_blur: approach(prev.glow_blur, target.glow_blur, eased, GLOW_EPSILON),
                };
            }
            let changed = (prev.scale - state.current.scale).abs() > SCALE_EPSILON
                || (prev.opacity - state.current.opacity).abs() > OPACITY_EPSILON
                || (prev.glow_blur - state.current.glow_blur).abs() > GLOW_EPSILON;
            if changed || state.pressed_changed {
                state.needs_redraw = true;
            }
            state.pressed_changed = false;
            any_dirty |= state.needs_redraw;
        }
        any_dirty
    }

    pub fn mark_all_dirty(&mut self) {
        for state in self.states.values_mut() {
            state.needs_redraw = true;
        }
    }
}
