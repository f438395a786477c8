//! Engine configuration supplied by the host page.
//!
//! Every field has a default, so the host only sends what it wants to change:
//!
//! ```
//! # fn main() -> Result<(), memecanvas::error::EngineError> {
//! let cfg = memecanvas::config::EngineConfig::from_json(r#"{ "debug": true }"#)?;
//! assert!(cfg.debug);
//! assert_eq!(cfg.handle_size, 10.0);
//! # Ok(())
//! # }
//! ```

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CANVAS_HEIGHT, DEFAULT_CANVAS_WIDTH, HANDLE_SIZE_PX, TEXT_PADDING_PX, TOUCH_HIT_SCALE,
};
use crate::error::Result;

/// Tunables for geometry, rendering and the on-screen display policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Canvas width before a background image is loaded.
    pub canvas_width: f64,
    /// Canvas height before a background image is loaded.
    pub canvas_height: f64,
    /// Visual handle size in canvas pixels.
    pub handle_size: f64,
    /// Hit tolerance multiplier for touch input.
    pub touch_hit_scale: f64,
    /// Padding around text content.
    pub text_padding: f64,
    /// Draw the frames-per-second readout.
    pub debug: bool,
    /// Text stamped on exported images when a watermark is requested.
    pub watermark_text: String,
    pub display: DisplayConfig,
}

/// Limits used to fit the canvas on screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Horizontal space reserved on each side of the canvas, in CSS pixels.
    pub margin_x: f64,
    /// Vertical space reserved above and below the canvas, in CSS pixels.
    pub margin_y: f64,
    /// Smallest displayed width, unless the image itself is narrower.
    pub min_width: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_WIDTH,
            canvas_height: DEFAULT_CANVAS_HEIGHT,
            handle_size: HANDLE_SIZE_PX,
            touch_hit_scale: TOUCH_HIT_SCALE,
            text_padding: TEXT_PADDING_PX,
            debug: false,
            watermark_text: "memegen".to_owned(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { margin_x: 16.0, margin_y: 120.0, min_width: 280.0 }
    }
}

impl EngineConfig {
    /// Parse a config from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::EngineError::Config`] if the JSON is malformed
    /// or a field has the wrong type.
    pub fn from_json(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)?;
        log::debug!("engine config loaded: {cfg:?}");
        Ok(cfg)
    }
}
