//! Persisted user settings for the touch controls.
//!
//! Stored as one JSON object under [`STORAGE_KEY`]. Every stored field is
//! validated on load; anything invalid falls back to its default.

use std::cell::RefCell;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ControlsError;
use crate::state::controls::SettingsSource;

pub const STORAGE_KEY: &str = "barrelBlasterSettings";

const MIN_OPACITY: f64 = 0.3;
const MAX_OPACITY: f64 = 1.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlScheme {
    Dpad,
    Joystick,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonSize {
    Small,
    Medium,
    Large,
}

impl ButtonSize {
    pub fn multiplier(self) -> f64 {
        match self {
            ButtonSize::Small => 0.8,
            ButtonSize::Medium => 1.0,
            ButtonSize::Large => 1.2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ButtonPositions {
    pub dpad: Point,
    pub jump: Point,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub control_scheme: ControlScheme,
    pub button_size: ButtonSize,
    pub button_opacity: f64,
    pub haptic_enabled: bool,
    pub button_positions: ButtonPositions,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            control_scheme: ControlScheme::Dpad,
            button_size: ButtonSize::Medium,
            button_opacity: 0.6,
            haptic_enabled: true,
            button_positions: ButtonPositions {
                dpad: Point { x: 30.0, y: 610.0 },
                jump: Point { x: 1130.0, y: 580.0 },
            },
        }
    }
}

/// Where the serialized settings live.
pub trait SettingsStore {
    fn load(&self) -> Result<Option<String>, ControlsError>;
    fn save(&self, raw: &str) -> Result<(), ControlsError>;
    fn clear(&self) -> Result<(), ControlsError>;
}

/// Browser `localStorage`.
pub struct LocalStorageStore;

impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, ControlsError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or(ControlsError::StorageUnavailable)
    }
}

impl SettingsStore for LocalStorageStore {
    fn load(&self) -> Result<Option<String>, ControlsError> {
        Self::storage()?
            .get_item(STORAGE_KEY)
            .map_err(|e| ControlsError::Storage(format!("{:?}", e)))
    }

    fn save(&self, raw: &str) -> Result<(), ControlsError> {
        Self::storage()?
            .set_item(STORAGE_KEY, raw)
            .map_err(|e| ControlsError::Storage(format!("{:?}", e)))
    }

    fn clear(&self) -> Result<(), ControlsError> {
        Self::storage()?
            .remove_item(STORAGE_KEY)
            .map_err(|e| ControlsError::Storage(format!("{:?}", e)))
    }
}

/// In-process store, used when `localStorage` is missing.
#[derive(Default)]
pub struct MemoryStore {
    value: RefCell<Option<String>>,
}

impl MemoryStore {
    pub fn with(raw: &str) -> Self {
        Self {
            value: RefCell::new(Some(raw.to_string())),
        }
    }
}

impl SettingsStore for MemoryStore {
    fn load(&self) -> Result<Option<String>, ControlsError> {
        Ok(self.value.borrow().clone())
    }

    fn save(&self, raw: &str) -> Result<(), ControlsError> {
        *self.value.borrow_mut() = Some(raw.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), ControlsError> {
        *self.value.borrow_mut() = None;
        Ok(())
    }
}

/// Validate one field. `None` means the value is rejected.
fn validate(key: &str, value: &Value) -> Option<Value> {
    match key {
        "controlScheme" => serde_json::from_value::<ControlScheme>(value.clone()).ok().map(|_| value.clone()),
        "buttonSize" => serde_json::from_value::<ButtonSize>(value.clone()).ok().map(|_| value.clone()),
        "buttonOpacity" => {
            let opacity = match value {
                Value::Number(n) => n.as_f64(),
                Value::String(s) => parse_leading_f64(s),
                _ => None,
            }?;
            if opacity.is_nan() {
                return None;
            }
            Some(Value::from(opacity.clamp(MIN_OPACITY, MAX_OPACITY)))
        }
        "hapticEnabled" => Some(Value::Bool(truthy(value))),
        "buttonPositions" => serde_json::from_value::<ButtonPositions>(value.clone()).ok().map(|_| value.clone()),
        _ => None,
    }
}

/// Longest numeric prefix after leading whitespace, so `"0.75px"` reads as 0.75.
fn parse_leading_f64(s: &str) -> Option<f64> {
    let s = s.trim_start();
    s.char_indices()
        .map(|(i, c)| i + c.len_utf8())
        .rev()
        .find_map(|end| s[..end].parse::<f64>().ok())
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Overlay the valid fields of `stored` on the defaults.
fn merge_with_defaults(stored: &Value) -> Settings {
    let mut merged = match serde_json::to_value(Settings::default()) {
        Ok(Value::Object(map)) => map,
        _ => return Settings::default(),
    };
    if let Value::Object(fields) = stored {
        for (key, value) in fields {
            if !merged.contains_key(key) {
                continue;
            }
            if let Some(valid) = validate(key, value) {
                merged.insert(key.clone(), valid);
            }
        }
    }
    serde_json::from_value(Value::Object(merged)).unwrap_or_default()
}

pub struct SettingsManager {
    settings: Settings,
    store: Box<dyn SettingsStore>,
}

impl SettingsManager {
    /// Loads immediately; storage or parse failures leave the defaults in place.
    pub fn new(store: Box<dyn SettingsStore>) -> Self {
        let mut manager = Self {
            settings: Settings::default(),
            store,
        };
        if let Err(e) = manager.load() {
            log::warn!("SettingsManager: unable to load settings, using defaults: {}", e);
            manager.settings = Settings::default();
        }
        manager
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn load(&mut self) -> Result<(), ControlsError> {
        if let Some(raw) = self.store.load()? {
            let parsed: Value = serde_json::from_str(&raw)?;
            self.settings = merge_with_defaults(&parsed);
        }
        Ok(())
    }

    pub fn save(&self) -> Result<(), ControlsError> {
        let raw = serde_json::to_string(&self.settings)?;
        self.store.save(&raw)
    }

    /// Invalid values are ignored and the setting keeps its current value.
    /// Returns whether the value was accepted.
    pub fn set(&mut self, key: &str, value: Value) -> bool {
        let Some(valid) = validate(key, &value) else {
            log::debug!("SettingsManager: rejected {} = {}", key, value);
            return false;
        };
        let mut map = match serde_json::to_value(&self.settings) {
            Ok(Value::Object(map)) => map,
            _ => return false,
        };
        map.insert(key.to_string(), valid);
        match serde_json::from_value(Value::Object(map)) {
            Ok(updated) => {
                self.settings = updated;
                true
            }
            Err(_) => false,
        }
    }

    pub fn reset_to_defaults(&mut self) {
        self.settings = Settings::default();
        if let Err(e) = self.store.clear() {
            log::warn!("SettingsManager: unable to clear stored settings: {}", e);
        }
    }
}

impl SettingsSource for SettingsManager {
    fn button_size_multiplier(&self) -> f64 {
        self.settings.button_size.multiplier()
    }

    fn get(&self, key: &str) -> Option<Value> {
        match serde_json::to_value(&self.settings).ok()? {
            Value::Object(mut map) => map.remove(key),
            _ => None,
        }
    }
}
