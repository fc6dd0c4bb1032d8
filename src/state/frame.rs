use crate::model::{ButtonKind, ControlsConfig, Rect};
use crate::render::{Surface, clear_button, draw_button, paint_bounds};
use crate::state::animation::ButtonAnimator;
use crate::state::layout::ButtonLayout;

/// Per-frame update/render driver with the dirty-flag shortcut.
#[derive(Debug, Clone)]
pub struct FrameController {
    dirty_flag_enabled: bool,
    any_dirty: bool,
}

impl FrameController {
    pub fn new(dirty_flag_enabled: bool) -> Self {
        Self {
            dirty_flag_enabled,
            any_dirty: true,
        }
    }

    pub fn update(&mut self, animator: &mut ButtonAnimator, dt: f64) -> bool {
        self.any_dirty = animator.update(dt);
        self.any_dirty
    }

    /// Buttons to draw this frame, in layout order. Clearing a button wipes its
    /// padded bounds, so any button painted inside that area is redrawn too.
    pub fn redraw_set(
        &self,
        layout: &ButtonLayout,
        animator: &ButtonAnimator,
        cfg: &ControlsConfig,
    ) -> Vec<ButtonKind> {
        let buttons = layout.buttons();
        if !self.dirty_flag_enabled {
            return buttons.iter().map(|b| b.kind).collect();
        }
        if !self.any_dirty {
            return Vec::new();
        }
        let bounds: Vec<Rect> = buttons.iter().map(|b| paint_bounds(b, cfg)).collect();
        let mut redraw: Vec<bool> = buttons
            .iter()
            .map(|b| animator.state(b.kind).is_some_and(|s| s.needs_redraw))
            .collect();
        loop {
            let mut grew = false;
            for i in 0..buttons.len() {
                if redraw[i] {
                    continue;
                }
                if (0..buttons.len()).any(|j| redraw[j] && bounds[j].intersects(&bounds[i])) {
                    redraw[i] = true;
                    grew = true;
                }
            }
            if !grew {
                break;
            }
        }
        buttons
            .iter()
            .zip(redraw)
            .filter(|(_, r)| *r)
            .map(|(b, _)| b.kind)
            .collect()
    }

    /// Returns how many buttons were drawn.
    pub fn render(
        &mut self,
        surface: &mut dyn Surface,
        layout: &ButtonLayout,
        animator: &mut ButtonAnimator,
        cfg: &ControlsConfig,
    ) -> usize {
        let kinds = self.redraw_set(layout, animator, cfg);
        let targets: Vec<_> = layout.buttons().iter().filter(|b| kinds.contains(&b.kind)).collect();
        // clear everything first so a later clear cannot cut into an earlier draw
        for button in &targets {
            clear_button(surface, button, cfg);
        }
        let mut drawn = 0;
        for button in &targets {
            let Some(state) = animator.state_mut(button.kind) else { continue };
            draw_button(surface, button, state, cfg);
            state.needs_redraw = false;
            drawn += 1;
        }
        self.any_dirty = false;
        drawn
    }
}
