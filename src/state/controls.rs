use crate::model::ControlsConfig;
use crate::render::Surface;
use crate::state::animation::ButtonAnimator;
use crate::state::frame::FrameController;
use crate::state::input::InputState;
use crate::state::layout::{ButtonLayout, LayoutConfig};
use crate::state::touch::{SurfaceRect, TouchPoint, TouchRouter, TouchTargets};

/// Best-effort vibration.
pub trait Haptics {
    fn vibrate(&self, duration_ms: u32);
}

/// Read-only view of the user's settings.
pub trait SettingsSource {
    fn button_size_multiplier(&self) -> f64;
    fn get(&self, key: &str) -> Option<serde_json::Value>;
}

/// Virtual D-pad and jump button: layout, touch routing, animation, drawing.
pub struct MobileControls {
    cfg: ControlsConfig,
    layout: ButtonLayout,
    router: TouchRouter,
    animator: ButtonAnimator,
    frame: FrameController,
    haptics: Box<dyn Haptics>,
    haptic_enabled: bool,
    viewport_width: f64,
}

struct UserPrefs {
    size_multiplier: f64,
    opacity: f64,
    haptic_enabled: bool,
}

fn read_prefs(cfg: &ControlsConfig, settings: &dyn SettingsSource) -> UserPrefs {
    UserPrefs {
        size_multiplier: settings.button_size_multiplier(),
        opacity: settings
            .get("buttonOpacity")
            .and_then(|v| v.as_f64())
            .unwrap_or(cfg.button_opacity),
        haptic_enabled: settings
            .get("hapticEnabled")
            .and_then(|v| v.as_bool())
            .unwrap_or(true),
    }
}

impl MobileControls {
    pub fn new(
        cfg: ControlsConfig,
        settings: &dyn SettingsSource,
        viewport_width: f64,
        haptics: Box<dyn Haptics>,
    ) -> Self {
        let prefs = read_prefs(&cfg, settings);
        let lc = LayoutConfig::new(&cfg, prefs.size_multiplier, prefs.opacity, viewport_width);
        let layout = ButtonLayout::new(&cfg, lc, viewport_width);
        let animator = ButtonAnimator::new(&cfg, prefs.opacity);
        Self {
            router: TouchRouter::new(cfg.touch_move_throttle_ms),
            frame: FrameController::new(cfg.dirty_flag_optimization),
            layout,
            animator,
            haptics,
            haptic_enabled: prefs.haptic_enabled,
            viewport_width,
            cfg,
        }
    }

    pub fn config(&self) -> &ControlsConfig {
        &self.cfg
    }

    pub fn layout(&self) -> &ButtonLayout {
        &self.layout
    }

    pub fn animator(&self) -> &ButtonAnimator {
        &self.animator
    }

    fn trigger_haptic(&self) {
        if self.cfg.haptic_enabled && self.haptic_enabled {
            self.haptics.vibrate(self.cfg.haptic_duration_ms);
        }
    }

    pub fn touch_start(&mut self, input: &mut InputState, points: &[TouchPoint], rect: &SurfaceRect, now_ms: f64) {
        let mut t = TouchTargets {
            layout: &self.layout,
            animator: &mut self.animator,
            input,
        };
        let hits = self.router.touch_start(points, rect, now_ms, &mut t);
        for kind in &hits {
            log::debug!("touch start -> {}", kind.as_str());
            self.trigger_haptic();
        }
    }

    pub fn touch_move(&mut self, input: &mut InputState, points: &[TouchPoint], rect: &SurfaceRect, now_ms: f64) -> bool {
        let mut t = TouchTargets {
            layout: &self.layout,
            animator: &mut self.animator,
            input,
        };
        self.router.touch_move(points, rect, now_ms, &mut t)
    }

    pub fn touch_end(&mut self, input: &mut InputState, points: &[TouchPoint]) {
        let mut t = TouchTargets {
            layout: &self.layout,
            animator: &mut self.animator,
            input,
        };
        self.router.touch_end(points, &mut t);
    }

    pub fn touch_cancel(&mut self, input: &mut InputState, points: &[TouchPoint]) {
        let mut t = TouchTargets {
            layout: &self.layout,
            animator: &mut self.animator,
            input,
        };
        self.router.touch_cancel(points, &mut t);
    }

    /// New animator for the current layout; kinds still held keep their pressed look.
    fn rebuild_animator(&mut self, now_ms: f64) {
        self.animator = ButtonAnimator::new(&self.cfg, self.layout.config().opacity);
        for kind in self.router.bound_kinds() {
            self.animator.press(kind, now_ms);
        }
    }

    /// Returns whether the layout was rebuilt.
    pub fn on_resize(&mut self, viewport_width: f64, now_ms: f64) -> bool {
        self.viewport_width = viewport_width;
        if !self.layout.on_resize(&self.cfg, viewport_width) {
            return false;
        }
        log::info!(
            "controls layout rebuilt for viewport width {} (scale {})",
            viewport_width,
            self.layout.config().responsive_scale
        );
        self.rebuild_animator(now_ms);
        true
    }

    /// Re-read settings and rebuild the layout.
    pub fn apply_settings(&mut self, settings: &dyn SettingsSource, now_ms: f64) {
        let prefs = read_prefs(&self.cfg, settings);
        self.haptic_enabled = prefs.haptic_enabled;
        let lc = LayoutConfig::new(&self.cfg, prefs.size_multiplier, prefs.opacity, self.viewport_width);
        self.layout.rebuild(&self.cfg, lc);
        self.rebuild_animator(now_ms);
    }

    /// Advance animations by `dt` seconds. Returns whether a redraw is due.
    pub fn update(&mut self, dt: f64) -> bool {
        self.frame.update(&mut self.animator, dt)
    }

    pub fn render(&mut self, surface: &mut dyn Surface) -> usize {
        self.frame.render(surface, &self.layout, &mut self.animator, &self.cfg)
    }

    /// The surface was cleared externally; draw everything next frame.
    pub fn invalidate(&mut self) {
        self.animator.mark_all_dirty();
    }

    pub fn release_all(&mut self, input: &mut InputState) {
        let mut t = TouchTargets {
            layout: &self.layout,
            animator: &mut self.animator,
            input,
        };
        self.router.release_all(&mut t);
    }

    /// Handler timing, only reported when performance logging is on.
    pub fn log_slow_handler(&self, handler: &str, elapsed_ms: f64) -> bool {
        if !self.cfg.performance_logging || elapsed_ms <= self.cfg.max_event_time_ms {
            return false;
        }
        log::warn!(
            "[MobileControls] {} took {:.2}ms (target: <{}ms)",
            handler,
            elapsed_ms,
            self.cfg.max_event_time_ms
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ButtonKind;
    use crate::render::testing::RecordingSurface;
    use std::cell::Cell;
    use std::rc::Rc;

    struct FixedSettings {
        mult: f64,
        opacity: f64,
        haptic: bool,
    }

    impl SettingsSource for FixedSettings {
        fn button_size_multiplier(&self) -> f64 {
            self.mult
        }
        fn get(&self, key: &str) -> Option<serde_json::Value> {
            match key {
                "buttonOpacity" => Some(self.opacity.into()),
                "hapticEnabled" => Some(self.haptic.into()),
                _ => None,
            }
        }
    }

    struct NoHaptics;

    impl Haptics for NoHaptics {
        fn vibrate(&self, _duration_ms: u32) {}
    }

    struct CountingHaptics(Rc<Cell<u32>>);

    impl Haptics for CountingHaptics {
        fn vibrate(&self, _duration_ms: u32) {
            self.0.set(self.0.get() + 1);
        }
    }

    fn settings() -> FixedSettings {
        FixedSettings { mult: 1.0, opacity: 0.6, haptic: true }
    }

    fn controls(width: f64) -> (MobileControls, Rc<Cell<u32>>) {
        let pulses = Rc::new(Cell::new(0));
        let c = MobileControls::new(
            ControlsConfig::default(),
            &settings(),
            width,
            Box::new(CountingHaptics(pulses.clone())),
        );
        (c, pulses)
    }

    fn at(c: &MobileControls, id: i32, kind: ButtonKind) -> TouchPoint {
        let (x, y) = c.layout().button(kind).unwrap().rect.center();
        TouchPoint { identifier: id, client_x: x, client_y: y }
    }

    fn rect(c: &MobileControls) -> SurfaceRect {
        SurfaceRect::unscaled(c.config().canvas_width, c.config().canvas_height)
    }

    #[test]
    fn hit_pulses_haptics() {
        let (mut c, pulses) = controls(1024.0);
        let mut input = InputState::new();
        let r = rect(&c);
        let p = at(&c, 1, ButtonKind::Jump);
        c.touch_start(&mut input, &[p], &r, 0.0);
        assert_eq!(pulses.get(), 1);
        let miss = TouchPoint { identifier: 2, client_x: 600.0, client_y: 10.0 };
        c.touch_start(&mut input, &[miss], &r, 1.0);
        assert_eq!(pulses.get(), 1);
        assert!(c.router.is_bound(ButtonKind::Jump));
    }

    #[test]
    fn haptics_respect_user_setting() {
        let pulses = Rc::new(Cell::new(0));
        let mut c = MobileControls::new(
            ControlsConfig::default(),
            &FixedSettings { haptic: false, ..settings() },
            1024.0,
            Box::new(CountingHaptics(pulses.clone())),
        );
        let mut input = InputState::new();
        let r = rect(&c);
        let p = at(&c, 1, ButtonKind::Left);
        c.touch_start(&mut input, &[p], &r, 0.0);
        assert_eq!(pulses.get(), 0);
        assert!(input.is_left_down());
    }

    #[test]
    fn resize_keeps_bindings_and_pressed_look() {
        let (mut c, _) = controls(1024.0);
        let mut input = InputState::new();
        let r = rect(&c);
        let p = at(&c, 4, ButtonKind::Right);
        c.touch_start(&mut input, &[p], &r, 0.0);
        assert!(c.on_resize(360.0, 10.0));
        assert!(input.is_pressed(ButtonKind::Right));
        assert!(c.animator().state(ButtonKind::Right).unwrap().is_pressed);
        assert!(!c.animator().state(ButtonKind::Left).unwrap().is_pressed);
        c.touch_end(&mut input, &[p]);
        assert!(!input.is_pressed(ButtonKind::Right));
        assert!(!c.on_resize(300.0, 20.0));
    }

    #[test]
    fn apply_settings_rescales_and_sets_opacity() {
        let (mut c, _) = controls(1024.0);
        let before = c.layout().button(ButtonKind::Jump).unwrap().rect.width;
        c.apply_settings(&FixedSettings { mult: 1.2, opacity: 0.4, haptic: true }, 0.0);
        let after = c.layout().button(ButtonKind::Jump).unwrap().rect.width;
        assert!((after - before * 1.2).abs() < 1e-9);
        assert_eq!(c.animator().state(ButtonKind::Up).unwrap().current.opacity, 0.4);
    }

    #[test]
    fn steady_state_skips_rendering() {
        let (mut c, _) = controls(1024.0);
        let mut s = RecordingSurface::default();
        c.update(0.016);
        assert_eq!(c.render(&mut s), 5);
        assert!(!c.update(0.016));
        assert_eq!(c.render(&mut s), 0);
        c.invalidate();
        assert!(c.update(0.016));
        assert_eq!(c.render(&mut s), 5);
    }

    #[test]
    fn rendering_never_touches_input() {
        let (mut c, _) = controls(1024.0);
        let mut input = InputState::new();
        let r = rect(&c);
        let p = at(&c, 1, ButtonKind::Down);
        c.touch_start(&mut input, &[p], &r, 0.0);
        for _ in 0..10 {
            c.update(0.016);
            c.render(&mut RecordingSurface::default());
        }
        assert!(input.is_down_down());
    }

    #[test]
    fn release_all_lifts_every_button() {
        let (mut c, _) = controls(1024.0);
        let mut input = InputState::new();
        let r = rect(&c);
        let pts = [at(&c, 1, ButtonKind::Left), at(&c, 2, ButtonKind::Jump)];
        c.touch_start(&mut input, &pts, &r, 0.0);
        c.release_all(&mut input);
        for kind in ButtonKind::ALL {
            assert!(!input.is_pressed(kind));
            assert!(!c.router.is_bound(kind));
        }
    }

    #[test]
    fn slow_handlers_logged_only_when_enabled() {
        let (c, _) = controls(1024.0);
        assert!(!c.log_slow_handler("touchstart", 50.0));
        let cfg = ControlsConfig { performance_logging: true, ..ControlsConfig::default() };
        let c = MobileControls::new(cfg, &settings(), 1024.0, Box::new(NoHaptics));
        assert!(c.log_slow_handler("touchstart", 50.0));
        assert!(!c.log_slow_handler("touchstart", 0.5));
    }
}
