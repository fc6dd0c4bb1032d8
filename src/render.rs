//! Drawing surface used by the control overlay, and the retro button painter.

use web_sys::CanvasRenderingContext2d;

use crate::model::{ControlsConfig, LogicalButton, Rect};
use crate::state::animation::ButtonAnimationState;
use crate::state::input::InputState;

/// The subset of a 2D context the controls draw with.
pub trait Surface {
    fn save(&mut self);
    fn restore(&mut self);
    fn translate(&mut self, x: f64, y: f64);
    fn scale(&mut self, x: f64, y: f64);
    fn set_global_alpha(&mut self, alpha: f64);
    fn set_fill_style(&mut self, color: &str);
    fn set_stroke_style(&mut self, color: &str);
    fn set_line_width(&mut self, width: f64);
    fn set_shadow(&mut self, color: &str, blur: f64);
    fn set_font(&mut self, font: &str);
    fn fill_rect(&mut self, r: Rect);
    fn stroke_rect(&mut self, r: Rect);
    fn clear_rect(&mut self, r: Rect);
    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64);
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64);
}

pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }
}

impl Surface for CanvasSurface {
    fn save(&mut self) {
        self.ctx.save();
    }
    fn restore(&mut self) {
        self.ctx.restore();
    }
    fn translate(&mut self, x: f64, y: f64) {
        let _ = self.ctx.translate(x, y);
    }
    fn scale(&mut self, x: f64, y: f64) {
        let _ = self.ctx.scale(x, y);
    }
    fn set_global_alpha(&mut self, alpha: f64) {
        self.ctx.set_global_alpha(alpha);
    }
    fn set_fill_style(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }
    fn set_stroke_style(&mut self, color: &str) {
        self.ctx.set_stroke_style_str(color);
    }
    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }
    fn set_shadow(&mut self, color: &str, blur: f64) {
        self.ctx.set_shadow_color(color);
        self.ctx.set_shadow_blur(blur);
        self.ctx.set_shadow_offset_x(0.0);
        self.ctx.set_shadow_offset_y(0.0);
    }
    fn set_font(&mut self, font: &str) {
        self.ctx.set_font(font);
    }
    fn fill_rect(&mut self, r: Rect) {
        self.ctx.fill_rect(r.x, r.y, r.width, r.height);
    }
    fn stroke_rect(&mut self, r: Rect) {
        self.ctx.stroke_rect(r.x, r.y, r.width, r.height);
    }
    fn clear_rect(&mut self, r: Rect) {
        self.ctx.clear_rect(r.x, r.y, r.width, r.height);
    }
    fn fill_text_centered(&mut self, text: &str, x: f64, y: f64) {
        self.ctx.set_text_align("center");
        self.ctx.set_text_baseline("middle");
        let _ = self.ctx.fill_text(text, x, y);
    }
    fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) {
        self.ctx.begin_path();
        self.ctx.move_to(x1, y1);
        self.ctx.line_to(x2, y2);
        self.ctx.stroke();
    }
}

/// Area a button may paint into, glow included.
pub fn paint_bounds(button: &LogicalButton, cfg: &ControlsConfig) -> Rect {
    let glow = cfg.glow_blur.max(cfg.glow_blur_pressed);
    button.rect.inflate(glow + 3.0)
}

pub fn clear_button(surface: &mut dyn Surface, button: &LogicalButton, cfg: &ControlsConfig) {
    surface.clear_rect(paint_bounds(button, cfg));
}

/// Draw the button with its animated scale, opacity and glow. The caller
/// clears its paint bounds first.
pub fn draw_button(
    surface: &mut dyn Surface,
    button: &LogicalButton,
    state: &ButtonAnimationState,
    cfg: &ControlsConfig,
) {
    let r = button.rect;
    let v = state.current;
    surface.save();

    let (cx, cy) = r.center();
    surface.translate(cx, cy);
    surface.scale(v.scale, v.scale);
    surface.translate(-cx, -cy);
    surface.set_global_alpha(v.opacity);

    if cfg.glow_enabled {
        surface.set_shadow(&button.border_color, v.glow_blur);
        surface.set_fill_style(&button.border_color);
        surface.set_global_alpha(0.3);
        surface.fill_rect(r);
        surface.set_shadow(&button.border_color, 0.0);
        surface.set_global_alpha(v.opacity);
    }

    let bg = if state.is_pressed {
        cfg.bg_color(button.kind, true)
    } else {
        button.bg_color.as_str()
    };
    surface.set_fill_style(bg);
    surface.fill_rect(r);

    surface.set_stroke_style(&button.border_color);
    surface.set_line_width(3.0);
    surface.stroke_rect(r);

    // inner border for depth
    surface.set_line_width(1.0);
    surface.set_global_alpha(v.opacity * 0.5);
    surface.stroke_rect(Rect::new(r.x + 4.0, r.y + 4.0, r.width - 8.0, r.height - 8.0));
    surface.set_global_alpha(v.opacity);

    let font_px = if button.kind.is_dpad() { 36 } else { 28 };
    surface.set_fill_style(&cfg.color_text);
    surface.set_font(&format!("bold {}px monospace", font_px));
    surface.fill_text_centered(button.label, cx, cy);

    if cfg.scanline_enabled && cfg.scanline_spacing > 0.0 {
        surface.set_global_alpha(cfg.scanline_opacity);
        surface.set_stroke_style("#000000");
        surface.set_line_width(1.0);
        let mut y = r.y;
        while y < r.y + r.height {
            surface.line(r.x, y, r.x + r.width, y);
            y += cfg.scanline_spacing;
        }
    }

    surface.restore();
}

/// Game-side readout of what the player is holding. Redrawn every frame.
pub fn draw_input_hud(surface: &mut dyn Surface, input: &InputState, cfg: &ControlsConfig) {
    let full = Rect::new(0.0, 0.0, cfg.canvas_width, cfg.canvas_height);
    surface.clear_rect(full);
    surface.set_fill_style("#000000");
    surface.fill_rect(full);
    surface.set_font("bold 20px monospace");
    let held = [
        ("LEFT", input.is_left_down()),
        ("RIGHT", input.is_right_down()),
        ("UP", input.is_up_down()),
        ("DOWN", input.is_down_down()),
        ("JUMP", input.is_jump_pressed()),
    ];
    let step = cfg.canvas_width / (held.len() as f64 + 1.0);
    for (i, (name, on)) in held.iter().enumerate() {
        surface.set_fill_style(if *on { "#ffcc00" } else { "#444444" });
        surface.fill_text_centered(name, step * (i as f64 + 1.0), 40.0);
    }
}
