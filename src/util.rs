// Browser helpers shared by the components. Nothing here runs natively.

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, TouchList};

use crate::error::ControlsError;
use crate::model::ControlsConfig;
use crate::state::{Haptics, SurfaceRect, TouchPoint};

pub fn performance_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

pub fn viewport_width() -> f64 {
    web_sys::window()
        .and_then(|w| w.inner_width().ok())
        .and_then(|v| v.as_f64())
        .unwrap_or(800.0)
}

/// Touch support, touch points, or a narrow viewport.
pub fn is_mobile_device(breakpoint: f64) -> bool {
    let Some(win) = web_sys::window() else { return false };
    let has_touch = js_sys::Reflect::has(&win, &JsValue::from_str("ontouchstart")).unwrap_or(false);
    let has_points = win.navigator().max_touch_points() > 0;
    let narrow = win
        .match_media(&format!("(max-width: {}px)", breakpoint))
        .ok()
        .flatten()
        .map(|m| m.matches())
        .unwrap_or(false);
    has_touch || has_points || narrow
}

/// Constants from an optional `<script id="controls-config" type="application/json">`
/// block, overlaid on the defaults.
pub fn page_config() -> ControlsConfig {
    let raw = web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.get_element_by_id("controls-config"))
        .and_then(|el| el.text_content());
    let Some(raw) = raw else {
        return ControlsConfig::default();
    };
    ControlsConfig::from_json(&raw).unwrap_or_else(|e| {
        log::warn!("ignoring controls-config block: {}", e);
        ControlsConfig::default()
    })
}

pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, ControlsError> {
    canvas
        .get_context("2d")?
        .ok_or_else(|| ControlsError::Dom("2d context unavailable".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| ControlsError::Dom("context is not 2d".into()))
}

pub fn surface_rect(canvas: &HtmlCanvasElement) -> SurfaceRect {
    let rect = canvas.get_bounding_client_rect();
    SurfaceRect {
        left: rect.left(),
        top: rect.top(),
        client_width: rect.width(),
        client_height: rect.height(),
        width: canvas.width() as f64,
        height: canvas.height() as f64,
    }
}

pub fn touch_points(list: &TouchList) -> Vec<TouchPoint> {
    (0..list.length())
        .filter_map(|i| list.item(i))
        .map(|t| TouchPoint {
            identifier: t.identifier(),
            client_x: t.client_x() as f64,
            client_y: t.client_y() as f64,
        })
        .collect()
}

/// `navigator.vibrate`; unsupported browsers just return false.
pub struct NavigatorHaptics;

impl Haptics for NavigatorHaptics {
    fn vibrate(&self, duration_ms: u32) {
        if let Some(win) = web_sys::window() {
            let _ = win.navigator().vibrate_with_duration(duration_ms);
        }
    }
}
