use std::collections::HashMap;

use crate::model::ButtonKind;
use crate::state::animation::ButtonAnimator;
use crate::state::input::InputState;
use crate::state::layout::ButtonLayout;

/// One changed contact point, in client (CSS pixel) coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TouchPoint {
    pub identifier: i32,
    pub client_x: f64,
    pub client_y: f64,
}

/// Where the render surface sits on the page and how big its backing store is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceRect {
    pub left: f64,
    pub top: f64,
    pub client_width: f64,
    pub client_height: f64,
    pub width: f64,
    pub height: f64,
}

impl SurfaceRect {
    /// Surface with no CSS scaling.
    #[cfg(test)]
    pub fn unscaled(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            client_width: width,
            client_height: height,
            width,
            height,
        }
    }

    pub fn to_surface(&self, client_x: f64, client_y: f64) -> (f64, f64) {
        let sx = if self.client_width > 0.0 { self.width / self.client_width } else { 1.0 };
        let sy = if self.client_height > 0.0 { self.height / self.client_height } else { 1.0 };
        ((client_x - self.left) * sx, (client_y - self.top) * sy)
    }
}

/// Everything a touch handler pass writes to besides the binding table.
pub struct TouchTargets<'a> {
    pub layout: &'a ButtonLayout,
    pub animator: &'a mut ButtonAnimator,
    pub input: &'a mut InputState,
}

/// Touch identifier -> logical button bindings.
///
/// A virtual button reads as pressed in [`InputState`] exactly while at
/// least one binding points at it.
#[derive(Debug, Clone)]
pub struct TouchRouter {
    bindings: HashMap<i32, ButtonKind>,
    throttle_ms: f64,
    last_move_ms: Option<f64>,
}

impl TouchRouter {
    pub fn new(throttle_ms: f64) -> Self {
        Self {
            bindings: HashMap::new(),
            throttle_ms,
            last_move_ms: None,
        }
    }

    pub fn binding(&self, identifier: i32) -> Option<ButtonKind> {
        self.bindings.get(&identifier).copied()
    }

    pub fn is_bound(&self, kind: ButtonKind) -> bool {
        self.bindings.values().any(|&k| k == kind)
    }

    pub fn bound_kinds(&self) -> Vec<ButtonKind> {
        let mut kinds: Vec<_> = self.bindings.values().copied().collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    fn bind(&mut self, identifier: i32, kind: ButtonKind, t: &mut TouchTargets, now_ms: f64) {
        self.bindings.insert(identifier, kind);
        t.input.set_touch_button(kind, true);
        t.animator.press(kind, now_ms);
    }

    fn unbind(&mut self, identifier: i32, t: &mut TouchTargets) -> Option<ButtonKind> {
        let kind = self.bindings.remove(&identifier)?;
        if !self.is_bound(kind) {
            t.input.set_touch_button(kind, false);
            t.animator.release(kind);
        }
        Some(kind)
    }

    /// Returns the buttons newly hit, in point order.
    pub fn touch_start(
        &mut self,
        points: &[TouchPoint],
        rect: &SurfaceRect,
        now_ms: f64,
        t: &mut TouchTargets,
    ) -> Vec<ButtonKind> {
        let mut hits = Vec::new();
        for p in points {
            let (x, y) = rect.to_surface(p.client_x, p.client_y);
            let Some(kind) = t.layout.hit_test(x, y) else { continue };
            // identifiers are unique per contact, but never leave a stale binding behind
            self.unbind(p.identifier, t);
            self.bind(p.identifier, kind, t, now_ms);
            hits.push(kind);
        }
        hits
    }

    /// Returns false when the event was dropped by the throttle.
    pub fn touch_move(
        &mut self,
        points: &[TouchPoint],
        rect: &SurfaceRect,
        now_ms: f64,
        t: &mut TouchTargets,
    ) -> bool {
        if let Some(last) = self.last_move_ms {
            if now_ms - last < self.throttle_ms {
                return false;
            }
        }
        self.last_move_ms = Some(now_ms);
        for p in points {
            let (x, y) = rect.to_surface(p.client_x, p.client_y);
            let current = self.binding(p.identifier);
            let next = t.layout.hit_test(x, y);
            if next == current {
                continue;
            }
            if current.is_some() {
                self.unbind(p.identifier, t);
            }
            if let Some(kind) = next {
                self.bind(p.identifier, kind, t, now_ms);
            }
        }
        true
    }

    pub fn touch_end(&mut self, points: &[TouchPoint], t: &mut TouchTargets) {
        for p in points {
            self.unbind(p.identifier, t);
        }
    }

    pub fn touch_cancel(&mut self, points: &[TouchPoint], t: &mut TouchTargets) {
        self.touch_end(points, t);
    }

    /// Drop every binding and release the buttons they held.
    pub fn release_all(&mut self, t: &mut TouchTargets) {
        for kind in self.bound_kinds() {
            t.input.set_touch_button(kind, false);
            t.animator.release(kind);
        }
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ControlsConfig;
    use crate::state::layout::LayoutConfig;
    use proptest::prelude::*;

    struct Harness {
        layout: ButtonLayout,
        animator: ButtonAnimator,
        input: InputState,
        router: TouchRouter,
        rect: SurfaceRect,
    }

    impl Harness {
        fn new() -> Self {
            let cfg = ControlsConfig::default();
            let lc = LayoutConfig::new(&cfg, 1.0, cfg.button_opacity, 1024.0);
            Self {
                layout: ButtonLayout::new(&cfg, lc, 1024.0),
                animator: ButtonAnimator::new(&cfg, cfg.button_opacity),
                input: InputState::new(),
                router: TouchRouter::new(cfg.touch_move_throttle_ms),
                rect: SurfaceRect::unscaled(cfg.canvas_width, cfg.canvas_height),
            }
        }

        fn center(&self, kind: ButtonKind) -> (f64, f64) {
            self.layout.button(kind).unwrap().rect.center()
        }

        fn point(&self, id: i32, kind: ButtonKind) -> TouchPoint {
            let (x, y) = self.center(kind);
            TouchPoint { identifier: id, client_x: x, client_y: y }
        }

        fn start(&mut self, pts: &[TouchPoint], now: f64) -> Vec<ButtonKind> {
            let mut t = TouchTargets {
                layout: &self.layout,
                animator: &mut self.animator,
                input: &mut self.input,
            };
            self.router.touch_start(pts, &self.rect, now, &mut t)
        }

        fn moved(&mut self, pts: &[TouchPoint], now: f64) -> bool {
            let mut t = TouchTargets {
                layout: &self.layout,
                animator: &mut self.animator,
                input: &mut self.input,
            };
            self.router.touch_move(pts, &self.rect, now, &mut t)
        }

        fn end(&mut self, pts: &[TouchPoint]) {
            let mut t = TouchTargets {
                layout: &self.layout,
                animator: &mut self.animator,
                input: &mut self.input,
            };
            self.router.touch_end(pts, &mut t)
        }

        fn cancel(&mut self, pts: &[TouchPoint]) {
            let mut t = TouchTargets {
                layout: &self.layout,
                animator: &mut self.animator,
                input: &mut self.input,
            };
            self.router.touch_cancel(pts, &mut t)
        }

        fn assert_consistent(&self) {
            for kind in ButtonKind::ALL {
                assert_eq!(self.input.is_pressed(kind), self.router.is_bound(kind), "{:?}", kind);
                assert_eq!(
                    self.animator.state(kind).unwrap().is_pressed,
                    self.router.is_bound(kind),
                    "{:?}",
                    kind
                );
            }
        }
    }

    #[test]
    fn css_scaling_is_undone() {
        let rect = SurfaceRect {
            left: 10.0,
            top: 20.0,
            client_width: 640.0,
            client_height: 360.0,
            width: 1280.0,
            height: 720.0,
        };
        assert_eq!(rect.to_surface(10.0, 20.0), (0.0, 0.0));
        assert_eq!(rect.to_surface(330.0, 200.0), (640.0, 360.0));
    }

    #[test]
    fn tap_jump_then_release() {
        let mut h = Harness::new();
        let p = h.point(7, ButtonKind::Jump);
        assert_eq!(h.start(&[p], 0.0), vec![ButtonKind::Jump]);
        assert!(h.input.is_jump_pressed());
        h.end(&[p]);
        assert!(!h.input.is_jump_pressed());
        assert_eq!(h.router.bindings.len(), 0);
        h.assert_consistent();
    }

    #[test]
    fn miss_creates_no_binding() {
        let mut h = Harness::new();
        let p = TouchPoint { identifier: 1, client_x: 640.0, client_y: 100.0 };
        assert!(h.start(&[p], 0.0).is_empty());
        assert_eq!(h.router.bindings.len(), 0);
    }

    #[test]
    fn two_fingers_are_independent() {
        let mut h = Harness::new();
        let left = h.point(1, ButtonKind::Left);
        let jump = h.point(2, ButtonKind::Jump);
        h.start(&[left, jump], 0.0);
        assert!(h.input.is_left_down());
        assert!(h.input.is_jump_pressed());
        h.end(&[left]);
        assert!(!h.input.is_left_down());
        assert!(h.input.is_jump_pressed());
        h.assert_consistent();
    }

    #[test]
    fn shared_button_stays_pressed_until_last_finger_lifts() {
        let mut h = Harness::new();
        let a = h.point(1, ButtonKind::Right);
        let b = h.point(2, ButtonKind::Right);
        h.start(&[a], 0.0);
        h.start(&[b], 1.0);
        h.end(&[a]);
        assert!(h.input.is_pressed(ButtonKind::Right));
        h.end(&[b]);
        assert!(!h.input.is_pressed(ButtonKind::Right));
        h.assert_consistent();
    }

    #[test]
    fn releasing_unknown_touch_is_noop() {
        let mut h = Harness::new();
        let held = h.point(1, ButtonKind::Down);
        h.start(&[held], 0.0);
        let before = h.input.clone();
        h.end(&[TouchPoint { identifier: 99, client_x: 0.0, client_y: 0.0 }]);
        h.cancel(&[TouchPoint { identifier: 98, client_x: 0.0, client_y: 0.0 }]);
        for kind in ButtonKind::ALL {
            assert_eq!(before.is_pressed(kind), h.input.is_pressed(kind));
        }
        assert_eq!(h.router.bindings.len(), 1);
    }

    #[test]
    fn cancel_matches_end() {
        let mut a = Harness::new();
        let mut b = Harness::new();
        let pts = [a.point(1, ButtonKind::Up), a.point(2, ButtonKind::Jump)];
        a.start(&pts, 0.0);
        b.start(&pts, 0.0);
        a.end(&pts[..1]);
        b.cancel(&pts[..1]);
        for kind in ButtonKind::ALL {
            assert_eq!(a.input.is_pressed(kind), b.input.is_pressed(kind));
        }
        assert_eq!(a.router.bound_kinds(), b.router.bound_kinds());
    }

    #[test]
    fn slide_from_left_to_up_swaps_in_one_pass() {
        let mut h = Harness::new();
        h.start(&[h.point(1, ButtonKind::Left)], 0.0);
        assert!(h.moved(&[h.point(1, ButtonKind::Up)], 100.0));
        assert!(!h.input.is_pressed(ButtonKind::Left));
        assert!(h.input.is_pressed(ButtonKind::Up));
        assert_eq!(h.router.binding(1), Some(ButtonKind::Up));
        h.assert_consistent();
    }

    #[test]
    fn staying_on_button_is_noop() {
        let mut h = Harness::new();
        let p = h.point(1, ButtonKind::Left);
        h.start(&[p], 0.0);
        let pressed_at = h.animator.state(ButtonKind::Left).unwrap().last_press_ms;
        let nudged = TouchPoint { client_x: p.client_x + 2.0, ..p };
        assert!(h.moved(&[nudged], 50.0));
        assert_eq!(h.animator.state(ButtonKind::Left).unwrap().last_press_ms, pressed_at);
        assert!(h.input.is_pressed(ButtonKind::Left));
    }

    #[test]
    fn sliding_off_releases_and_back_on_rebinds() {
        let mut h = Harness::new();
        h.start(&[h.point(1, ButtonKind::Jump)], 0.0);
        let off = TouchPoint { identifier: 1, client_x: 640.0, client_y: 100.0 };
        h.moved(&[off], 20.0);
        assert!(!h.input.is_jump_pressed());
        assert_eq!(h.router.binding(1), None);
        h.moved(&[h.point(1, ButtonKind::Jump)], 40.0);
        assert!(h.input.is_jump_pressed());
        h.assert_consistent();
    }

    #[test]
    fn touch_started_off_button_binds_on_entry() {
        let mut h = Harness::new();
        let off = TouchPoint { identifier: 3, client_x: 640.0, client_y: 100.0 };
        h.start(&[off], 0.0);
        h.moved(&[h.point(3, ButtonKind::Right)], 20.0);
        assert!(h.input.is_pressed(ButtonKind::Right));
    }

    #[test]
    fn fast_moves_are_throttled() {
        let mut h = Harness::new();
        h.start(&[h.point(1, ButtonKind::Left)], 0.0);
        assert!(h.moved(&[h.point(1, ButtonKind::Up)], 100.0));
        assert!(!h.moved(&[h.point(1, ButtonKind::Right)], 105.0));
        assert!(!h.moved(&[h.point(1, ButtonKind::Down)], 115.0));
        assert!(h.input.is_pressed(ButtonKind::Up));
        assert!(!h.input.is_pressed(ButtonKind::Right));
        assert!(!h.input.is_pressed(ButtonKind::Down));
        assert!(h.moved(&[h.point(1, ButtonKind::Down)], 116.0));
        assert!(h.input.is_pressed(ButtonKind::Down));
        assert!(!h.input.is_pressed(ButtonKind::Up));
    }

    #[test]
    fn end_is_never_throttled() {
        let mut h = Harness::new();
        let p = h.point(1, ButtonKind::Left);
        h.start(&[p], 0.0);
        h.moved(&[p], 1.0);
        h.end(&[p]);
        assert!(!h.input.is_left_down());
    }

    #[test]
    fn release_all_clears_everything() {
        let mut h = Harness::new();
        h.start(&[h.point(1, ButtonKind::Left), h.point(2, ButtonKind::Jump)], 0.0);
        let mut t = TouchTargets {
            layout: &h.layout,
            animator: &mut h.animator,
            input: &mut h.input,
        };
        h.router.release_all(&mut t);
        assert_eq!(h.router.bindings.len(), 0);
        h.assert_consistent();
    }

    #[derive(Clone, Debug)]
    enum Op {
        Start(i32, usize),
        Move(i32, usize),
        MoveOff(i32),
        End(i32),
        Cancel(i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        let id = 0..4i32;
        prop_oneof![
            (id.clone(), 0..5usize).prop_map(|(i, b)| Op::Start(i, b)),
            (id.clone(), 0..5usize).prop_map(|(i, b)| Op::Move(i, b)),
            id.clone().prop_map(Op::MoveOff),
            id.clone().prop_map(Op::End),
            id.prop_map(Op::Cancel),
        ]
    }

    proptest! {
        #[test]
        fn pressed_iff_bound(ops in proptest::collection::vec(op(), 0..60)) {
            let mut h = Harness::new();
            let mut now = 0.0;
            for op in ops {
                now += 10.0;
                match op {
                    Op::Start(id, b) => { h.start(&[h.point(id, ButtonKind::ALL[b])], now); }
                    Op::Move(id, b) => { h.moved(&[h.point(id, ButtonKind::ALL[b])], now); }
                    Op::MoveOff(id) => {
                        let p = TouchPoint { identifier: id, client_x: 640.0, client_y: 50.0 };
                        h.moved(&[p], now);
                    }
                    Op::End(id) => h.end(&[TouchPoint { identifier: id, client_x: 0.0, client_y: 0.0 }]),
                    Op::Cancel(id) => h.cancel(&[TouchPoint { identifier: id, client_x: 0.0, client_y: 0.0 }]),
                }
                for kind in ButtonKind::ALL {
                    prop_assert_eq!(h.input.is_pressed(kind), h.router.is_bound(kind));
                }
            }
        }
    }
}
