use crate::model::{ButtonKind, ControlsConfig, LogicalButton, Rect};

/// Inputs of one layout pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// From the `buttonSize` setting.
    pub size_multiplier: f64,
    /// Idle opacity from the `buttonOpacity` setting.
    pub opacity: f64,
    pub responsive_scale: f64,
    pub responsive_margin_scale: f64,
}

impl LayoutConfig {
    pub fn new(cfg: &ControlsConfig, size_multiplier: f64, opacity: f64, viewport_width: f64) -> Self {
        let small = is_small_screen(cfg, viewport_width);
        Self {
            size_multiplier,
            opacity,
            responsive_scale: if small { cfg.small_screen_scale } else { 1.0 },
            responsive_margin_scale: if small { cfg.small_screen_margin_scale } else { 1.0 },
        }
    }
}

pub fn is_small_screen(cfg: &ControlsConfig, viewport_width: f64) -> bool {
    viewport_width < cfg.small_screen_width
}

/// D-pad cross in the bottom-left, jump square in the bottom-right.
/// The cross is anchored at its bottom edge: the down cell ends `dpad_margin`
/// above the surface bottom. Always returns the buttons in `ButtonKind::ALL` order.
pub fn compute_buttons(cfg: &ControlsConfig, layout: &LayoutConfig) -> Vec<LogicalButton> {
    let scale = layout.size_multiplier * layout.responsive_scale;
    let size = cfg.button_size * scale;
    let jump_size = cfg.jump_button_size * scale;
    let dpad_margin = cfg.dpad_margin * layout.responsive_margin_scale;
    let jump_margin = cfg.jump_margin * layout.responsive_margin_scale;

    // (cx, cy) is the top-left of the cross's middle cell
    let cx = dpad_margin + size;
    let cy = cfg.canvas_height - dpad_margin - 2.0 * size;

    ButtonKind::ALL
        .iter()
        .map(|&kind| {
            let rect = match kind {
                ButtonKind::Left => Rect::new(cx - size, cy, size, size),
                ButtonKind::Right => Rect::new(cx + size, cy, size, size),
                ButtonKind::Up => Rect::new(cx, cy - size, size, size),
                ButtonKind::Down => Rect::new(cx, cy + size, size, size),
                ButtonKind::Jump => Rect::new(
                    cfg.canvas_width - jump_margin - jump_size,
                    cfg.canvas_height - jump_margin - jump_size,
                    jump_size,
                    jump_size,
                ),
            };
            LogicalButton {
                kind,
                rect,
                bg_color: cfg.bg_color(kind, false).to_string(),
                border_color: cfg.border_color(kind).to_string(),
                label: kind.label(),
            }
        })
        .collect()
}

/// Current set of button hit regions.
#[derive(Clone, Debug)]
pub struct ButtonLayout {
    config: LayoutConfig,
    buttons: Vec<LogicalButton>,
    was_small_screen: bool,
}

impl ButtonLayout {
    pub fn new(cfg: &ControlsConfig, config: LayoutConfig, viewport_width: f64) -> Self {
        Self {
            buttons: compute_buttons(cfg, &config),
            config,
            was_small_screen: is_small_screen(cfg, viewport_width),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn buttons(&self) -> &[LogicalButton] {
        &self.buttons
    }

    pub fn button(&self, kind: ButtonKind) -> Option<&LogicalButton> {
        self.buttons.iter().find(|b| b.kind == kind)
    }

    /// Recompute every button from scratch.
    pub fn rebuild(&mut self, cfg: &ControlsConfig, config: LayoutConfig) {
        self.config = config;
        self.buttons = compute_buttons(cfg, &self.config);
    }

    /// Rebuilds only when the viewport crossed the small-screen threshold.
    /// Returns whether a rebuild happened.
    pub fn on_resize(&mut self, cfg: &ControlsConfig, viewport_width: f64) -> bool {
        let small = is_small_screen(cfg, viewport_width);
        if small == self.was_small_screen {
            return false;
        }
        self.was_small_screen = small;
        let config = LayoutConfig::new(cfg, self.config.size_multiplier, self.config.opacity, viewport_width);
        self.rebuild(cfg, config);
        true
    }

    /// Jump is checked first, then the D-pad in reverse definition order.
    pub fn hit_test(&self, x: f64, y: f64) -> Option<ButtonKind> {
        self.buttons.iter().rev().find(|b| b.rect.contains(x, y)).map(|b| b.kind)
    }
}
