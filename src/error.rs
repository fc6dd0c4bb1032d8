use thiserror::Error;

#[derive(Debug, Error)]
pub enum ControlsError {
    #[error("localStorage is not available")]
    StorageUnavailable,
    #[error("storage access failed: {0}")]
    Storage(String),
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("DOM error: {0}")]
    Dom(String),
}

impl From<wasm_bindgen::JsValue> for ControlsError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        ControlsError::Dom(format!("{:?}", value))
    }
}
