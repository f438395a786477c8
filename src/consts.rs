//! Shared numeric constants for the canvas engine.

// ── Handles ─────────────────────────────────────────────────────

/// Default visual edge length of a resize handle square, in canvas pixels.
pub const HANDLE_SIZE_PX: f64 = 10.0;

/// Hit radius as a multiple of the handle size. Larger than the drawn handle
/// so small targets stay usable.
pub const HANDLE_HIT_SCALE: f64 = 1.5;

/// Extra multiplier applied to every hit tolerance for touch input.
pub const TOUCH_HIT_SCALE: f64 = 2.0;

/// Corner handles sit outside the bounding box by this multiple of the handle size.
pub const CORNER_MARGIN_SCALE: f64 = 0.5;

/// The rotate handle sits above the top edge by this multiple of the handle size.
pub const ROTATE_OFFSET_SCALE: f64 = 3.0;

/// Padding added around the bounding box for body hits on touch input.
pub const TOUCH_BODY_PADDING_PX: f64 = 10.0;

// ── Text ────────────────────────────────────────────────────────

/// Padding between the element edge and its text, on every side.
pub const TEXT_PADDING_PX: f64 = 10.0;

/// Line height as a multiple of the font size.
pub const LINE_HEIGHT_SCALE: f64 = 1.2;

// ── Canvas ──────────────────────────────────────────────────────

/// Blank canvas size used before any background image is loaded.
pub const DEFAULT_CANVAS_WIDTH: f64 = 800.0;
pub const DEFAULT_CANVAS_HEIGHT: f64 = 600.0;

/// Mouse events arriving this soon after a touch are treated as synthetic.
pub const SYNTHETIC_MOUSE_WINDOW_MS: f64 = 500.0;

/// Selection dash segment length.
pub const SELECTION_DASH_PX: f64 = 4.0;

/// Selection chrome color.
pub const SELECTION_COLOR: &str = "#1E90FF";

/// Marquee fill.
pub const MARQUEE_FILL: &str = "rgba(30, 144, 255, 0.12)";

// ── Overlays ────────────────────────────────────────────────────

/// Watermark font size and inset from the bottom-right corner.
pub const WATERMARK_FONT_PX: f64 = 16.0;
pub const WATERMARK_MARGIN_PX: f64 = 8.0;

/// Debug frame-rate readout font size and inset from the top-left corner.
pub const FPS_FONT_PX: f64 = 12.0;
pub const FPS_MARGIN_PX: f64 = 6.0;

/// Frame-rate smoothing: weight of the newest sample.
pub const FPS_SMOOTHING: f64 = 0.1;
