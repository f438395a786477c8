//! Geometry primitives and the mapping between on-screen and canvas pixels.
//!
//! The canvas backing store always matches the background image's natural
//! size, while the element is displayed smaller to fit the page. Pointer
//! coordinates arrive in displayed CSS pixels and must be scaled up before any
//! hit-testing.

#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;

/// A point in canvas (or CSS) pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    /// Rotate this point by `degrees` (clockwise on a y-down canvas) around `center`.
    #[must_use]
    pub fn rotate_about(self, center: Point, degrees: f64) -> Point {
        if degrees == 0.0 {
            return self;
        }
        let (sin, cos) = degrees.to_radians().sin_cos();
        let dx = self.x - center.x;
        let dy = self.y - center.y;
        Point {
            x: center.x + dx * cos - dy * sin,
            y: center.y + dx * sin + dy * cos,
        }
    }

    /// Angle of this point as seen from `center`, in degrees.
    #[must_use]
    pub fn angle_from(self, center: Point) -> f64 {
        (self.y - center.y).atan2(self.x - center.x).to_degrees()
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle with a top-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanned by two corners in any order.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (a.x - b.x).abs(),
            height: (a.y - b.y).abs(),
        }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Overlap test; touching edges count as intersecting.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x <= other.right() && other.x <= self.right() && self.y <= other.bottom() && other.y <= self.bottom()
    }

    /// Grow the rectangle by `pad` on every side.
    #[must_use]
    pub fn inflate(&self, pad: f64) -> Rect {
        Rect::new(self.x - pad, self.y - pad, self.width + pad * 2.0, self.height + pad * 2.0)
    }
}

/// Normalize an angle in degrees into `[0, 360)`.
#[must_use]
pub fn normalize_degrees(deg: f64) -> f64 {
    let r = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if r >= 360.0 { 0.0 } else { r }
}

/// Mapping between the displayed canvas (CSS pixels) and its backing store.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Backing store size; equals the background image's natural size.
    pub canvas: Size,
    /// Size the canvas element is displayed at.
    pub display: Size,
    /// Browser viewport size the display is fitted into.
    pub window: Size,
}

impl Viewport {
    #[must_use]
    pub fn new(canvas: Size) -> Self {
        Self { canvas, display: canvas, window: Size::default() }
    }

    /// Horizontal and vertical factors from CSS pixels to canvas pixels.
    #[must_use]
    pub fn css_scale(&self) -> (f64, f64) {
        let sx = if self.display.width > 0.0 { self.canvas.width / self.display.width } else { 1.0 };
        let sy = if self.display.height > 0.0 { self.canvas.height / self.display.height } else { 1.0 };
        (sx, sy)
    }

    /// Convert a point relative to the canvas element's top-left (CSS pixels)
    /// into canvas pixels.
    #[must_use]
    pub fn css_to_canvas(&self, css: Point) -> Point {
        let (sx, sy) = self.css_scale();
        Point::new(css.x * sx, css.y * sy)
    }

    /// Like [`Viewport::css_to_canvas`], but scales by the size the element is
    /// actually shown at. Host CSS may shrink, border or zoom the canvas, so
    /// the measured box wins; a zero-sized box falls back to `display`.
    #[must_use]
    pub fn css_to_canvas_shown(&self, css: Point, shown: Size) -> Point {
        if shown.width <= 0.0 || shown.height <= 0.0 {
            return self.css_to_canvas(css);
        }
        Point::new(css.x * self.canvas.width / shown.width, css.y * self.canvas.height / shown.height)
    }

    /// Recompute the display size for the current canvas and window.
    pub fn refit(&mut self, policy: &DisplayConfig) {
        self.display = fit_display(self.canvas, self.window, policy);
    }
}

/// On-screen size for a canvas of natural size `natural` inside `window`.
///
/// Shrinks to fit the window minus margins, keeps the aspect ratio, never
/// upscales past the natural size, and never goes narrower than
/// `policy.min_width` unless the image itself is narrower. A zero window means
/// "unknown" and yields the natural size.
#[must_use]
pub fn fit_display(natural: Size, window: Size, policy: &DisplayConfig) -> Size {
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return natural;
    }
    if window.width <= 0.0 || window.height <= 0.0 {
        return natural;
    }
    let max_w = (window.width - policy.margin_x * 2.0).max(1.0);
    let max_h = (window.height - policy.margin_y * 2.0).max(1.0);

    let mut scale = (max_w / natural.width).min(max_h / natural.height).min(1.0);
    if natural.width * scale < policy.min_width {
        scale = (policy.min_width / natural.width).min(1.0);
    }
    Size::new(natural.width * scale, natural.height * scale)
}
