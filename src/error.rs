//! Engine error type.

use crate::doc::ElementId;

/// Errors surfaced by the canvas engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The canvas has no usable 2D rendering context.
    #[error("2d rendering context unavailable")]
    ContextUnavailable,
    /// A browser API call failed.
    #[error("browser call failed: {0}")]
    Js(String),
    #[error("element not found: {0}")]
    ElementNotFound(ElementId),
    /// The key names neither a setting nor an element field.
    #[error("unknown property: {0}")]
    UnknownProperty(String),
    /// The value does not fit the property it was written to.
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
    /// Canvas serialization produced no data.
    #[error("export failed: {0}")]
    ExportFailed(String),
    #[error("invalid config: {0}")]
    Config(#[from] serde_json::Error),
}

impl EngineError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue { key: key.to_owned(), reason: reason.into() }
    }
}

impl From<wasm_bindgen::JsValue> for EngineError {
    fn from(value: wasm_bindgen::JsValue) -> Self {
        Self::Js(format!("{value:?}"))
    }
}

pub type Result<T, E = EngineError> = std::result::Result<T, E>;
