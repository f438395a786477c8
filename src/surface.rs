//! Drawing-surface abstraction.
//!
//! Geometry, layout and the interaction state machine never talk to the
//! browser directly. They see text measurement through [`TextMeasure`] and the
//! renderer draws through [`Surface`]. The browser implementation lives in
//! [`crate::web`]; tests use an in-memory fake.

use crate::error::Result;
use crate::settings::ImageRef;

/// Horizontal text anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextAlign {
    Left,
    #[default]
    Center,
    Right,
}

impl TextAlign {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "left" => Self::Left,
            "right" => Self::Right,
            _ => Self::Center,
        }
    }

    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Left => "left",
            Self::Center => "center",
            Self::Right => "right",
        }
    }
}

/// Measures rendered text width for a CSS font string such as `"32px Impact"`.
pub trait TextMeasure {
    fn text_width(&self, font: &str, text: &str) -> f64;
}

/// Shadow parameters applied to subsequent fills.
#[derive(Debug, Clone, PartialEq)]
pub struct Shadow {
    pub color: String,
    pub blur: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// The subset of a 2D canvas context the renderer needs.
///
/// Fallible operations mirror the calls that can throw in the browser.
pub trait Surface: TextMeasure {
    fn save(&mut self);
    fn restore(&mut self);
    /// # Errors
    /// Propagates a failed browser call.
    fn translate(&mut self, x: f64, y: f64) -> Result<()>;
    /// Rotate subsequent drawing by `degrees` around the current origin.
    ///
    /// # Errors
    /// Propagates a failed browser call.
    fn rotate(&mut self, degrees: f64) -> Result<()>;

    fn set_fill(&mut self, color: &str);
    fn set_stroke(&mut self, color: &str, width: f64);
    /// # Errors
    /// Propagates a failed browser call.
    fn set_line_dash(&mut self, segments: &[f64]) -> Result<()>;
    fn set_shadow(&mut self, shadow: Option<&Shadow>);

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64);
    fn line(&mut self, from: (f64, f64), to: (f64, f64));
    /// # Errors
    /// Propagates a failed browser call.
    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> Result<()>;

    /// Draw `image` stretched over the rectangle. Missing images are skipped.
    ///
    /// # Errors
    /// Propagates a failed browser call.
    fn draw_image(&mut self, image: &ImageRef, x: f64, y: f64, w: f64, h: f64) -> Result<()>;

    /// Set the font and horizontal anchor used by the text calls. Text is
    /// positioned by the top of its line box.
    fn set_text_style(&mut self, font: &str, align: TextAlign);
    /// # Errors
    /// Propagates a failed browser call.
    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()>;
    /// # Errors
    /// Propagates a failed browser call.
    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<()>;
}
