//! Elements: the manipulable objects layered over the background image.
//!
//! An [`Element`] owns the geometry every variant shares (position, size,
//! rotation, lock) and the interaction math on top of it: dragging, resizing
//! around an anchor corner, rotating around the center, and hit-testing
//! handles in the element's rotated frame. Variant-specific behavior (layout,
//! minimum size, drawing) is dispatched through the closed [`ElementKind`]
//! enum, so the controller and renderer never need to know which variant
//! they hold.
//!
//! Stored width/height may drop below the content's minimum (e.g. after a
//! font shrink followed by a grow); the [`Element::width`] and
//! [`Element::height`] getters always report at least the minimum.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CORNER_MARGIN_SCALE, HANDLE_HIT_SCALE, ROTATE_OFFSET_SCALE, TOUCH_BODY_PADDING_PX};
use crate::doc::ElementId;
use crate::error::{EngineError, Result};
use crate::input::PointerSource;
use crate::settings::{SettingValue, Settings};
use crate::surface::{Surface, TextMeasure};
use crate::text::{self, TextElement};
use crate::viewport::{Point, Rect, Size, normalize_degrees};

/// Interaction points on a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
    Rotate,
}

impl Handle {
    pub const CORNERS: [Handle; 4] = [Self::TopLeft, Self::TopRight, Self::BottomLeft, Self::BottomRight];

    /// Direction the corner moves away from the center along each axis.
    /// `(0, 0)` for the rotate handle.
    #[must_use]
    pub fn signs(self) -> (f64, f64) {
        match self {
            Self::TopLeft => (-1.0, -1.0),
            Self::TopRight => (1.0, -1.0),
            Self::BottomLeft => (-1.0, 1.0),
            Self::BottomRight => (1.0, 1.0),
            Self::Rotate => (0.0, 0.0),
        }
    }

    /// The diagonally opposite corner.
    #[must_use]
    pub fn opposite(self) -> Handle {
        match self {
            Self::TopLeft => Self::BottomRight,
            Self::TopRight => Self::BottomLeft,
            Self::BottomLeft => Self::TopRight,
            Self::BottomRight => Self::TopLeft,
            Self::Rotate => Self::Rotate,
        }
    }
}

/// Handle sizing shared by hit-testing and the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HandleMetrics {
    /// Drawn edge length of a handle.
    pub size: f64,
    /// Hit tolerance multiplier for touch input.
    pub touch_scale: f64,
}

impl HandleMetrics {
    #[must_use]
    pub fn hit_radius(&self, source: PointerSource) -> f64 {
        let r = self.size * HANDLE_HIT_SCALE;
        match source {
            PointerSource::Mouse => r,
            PointerSource::Touch => r * self.touch_scale,
        }
    }
}

/// Element variant tags, used by the factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Text,
}

/// Variant-specific state.
#[derive(Debug, Clone, PartialEq)]
pub enum ElementKind {
    Text(TextElement),
}

impl ElementKind {
    fn settings(&self) -> &Settings {
        match self {
            Self::Text(t) => &t.settings,
        }
    }

    fn settings_mut(&mut self) -> &mut Settings {
        match self {
            Self::Text(t) => &mut t.settings,
        }
    }

    fn min_size(&self) -> Size {
        match self {
            Self::Text(t) => t.min_size(),
        }
    }

    fn mark_user_sized(&mut self) {
        match self {
            Self::Text(t) => t.set_user_sized(true),
        }
    }
}

/// Optional initial state for a new element, e.g. from a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ElementInit {
    pub x: Option<f64>,
    pub y: Option<f64>,
    /// Pre-sizing makes the element user-sized.
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub locked: bool,
    /// Setting values keyed by setting name.
    pub settings: serde_json::Map<String, serde_json::Value>,
}

/// Gesture context captured at pointer-down.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    point: Point,
    /// Pointer position relative to the element's top-left.
    offset: Point,
    handle: Option<Handle>,
    width: f64,
    height: f64,
    rotation: f64,
    /// Canvas position of the corner that must not move during a resize.
    anchor: Point,
    center: Point,
    /// Pointer angle around the center at press time, in degrees.
    angle: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub x: f64,
    pub y: f64,
    width: f64,
    height: f64,
    rotation: f64,
    /// Locked elements ignore drag, resize and rotate.
    pub locked: bool,
    kind: ElementKind,
    press: Option<Press>,
    /// Set until the first frame centers the element on the canvas.
    pub(crate) needs_placement: bool,
}

impl Element {
    /// Build an element of the given type and lay it out against `measure`.
    #[must_use]
    pub fn new(element_type: ElementType, text_padding: f64, measure: &dyn TextMeasure) -> Self {
        let kind = match element_type {
            ElementType::Text => ElementKind::Text(TextElement::new(text_padding)),
        };
        let mut el = Self {
            id: uuid::Uuid::new_v4(),
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            rotation: 0.0,
            locked: false,
            kind,
            press: None,
            needs_placement: true,
        };
        el.on_changed(true, text::keys::TEXT, measure);
        el
    }

    /// Apply template/host initial state.
    ///
    /// # Errors
    ///
    /// Fails on unknown setting keys or values of the wrong shape.
    pub fn apply_init(&mut self, init: &ElementInit, measure: &dyn TextMeasure) -> Result<()> {
        for (key, value) in &init.settings {
            self.kind.settings_mut().set_json(key, value)?;
            self.on_changed(true, key, measure);
        }
        if init.width.is_some() || init.height.is_some() {
            self.kind.mark_user_sized();
        }
        if let Some(w) = init.width {
            self.width = w;
            self.on_changed(false, "width", measure);
        }
        if let Some(h) = init.height {
            self.height = h;
        }
        if let (Some(x), Some(y)) = (init.x, init.y) {
            self.x = x;
            self.y = y;
            self.needs_placement = false;
        }
        if let Some(r) = init.rotation {
            self.set_rotation(r);
        }
        self.locked = init.locked;
        Ok(())
    }

    // --- Geometry ---

    #[must_use]
    pub fn kind(&self) -> &ElementKind {
        &self.kind
    }

    #[must_use]
    pub fn element_type(&self) -> ElementType {
        match self.kind {
            ElementKind::Text(_) => ElementType::Text,
        }
    }

    #[must_use]
    pub fn min_size(&self) -> Size {
        self.kind.min_size()
    }

    /// Width, never below the content minimum.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width.max(self.min_size().width)
    }

    /// Height, never below the content minimum.
    #[must_use]
    pub fn height(&self) -> f64 {
        self.height.max(self.min_size().height)
    }

    /// Rotation in degrees, within `[0, 360)`.
    #[must_use]
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_degrees(degrees);
    }

    /// Unrotated bounding box.
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width(), self.height())
    }

    #[must_use]
    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    /// Name of the host control that edits this element's main content.
    #[must_use]
    pub fn focus_control(&self) -> &'static str {
        match self.kind {
            ElementKind::Text(_) => text::keys::TEXT,
        }
    }

    // --- Settings and fields ---

    #[must_use]
    pub fn settings(&self) -> &Settings {
        self.kind.settings()
    }

    /// Typed settings write followed by the change hook.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` / `InvalidValue` from [`Settings::set`].
    pub fn set_setting(&mut self, key: &str, value: SettingValue, measure: &dyn TextMeasure) -> Result<()> {
        self.kind.settings_mut().set(key, value)?;
        self.on_changed(true, key, measure);
        Ok(())
    }

    /// JSON settings write followed by the change hook.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` / `InvalidValue` from [`Settings::set_json`].
    pub fn set_setting_json(&mut self, key: &str, value: &serde_json::Value, measure: &dyn TextMeasure) -> Result<()> {
        self.kind.settings_mut().set_json(key, value)?;
        self.on_changed(true, key, measure);
        Ok(())
    }

    /// Write a directly exposed field. Returns `Ok(false)` if `key` is not a field.
    ///
    /// Writing `width` or `height` makes the element user-sized.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the JSON value has the wrong type.
    pub fn set_field(&mut self, key: &str, value: &serde_json::Value) -> Result<bool> {
        if key == "locked" {
            self.locked = value.as_bool().ok_or_else(|| EngineError::invalid(key, "expected bool"))?;
            return Ok(true);
        }
        if !matches!(key, "x" | "y" | "width" | "height" | "rotation") {
            return Ok(false);
        }
        let n = value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| EngineError::invalid(key, "expected finite number"))?;
        match key {
            "x" => self.x = n,
            "y" => self.y = n,
            "width" => {
                self.kind.mark_user_sized();
                self.width = n;
            }
            "height" => {
                self.kind.mark_user_sized();
                self.height = n;
            }
            _ => self.set_rotation(n),
        }
        if matches!(key, "x" | "y") {
            self.needs_placement = false;
        }
        Ok(true)
    }

    /// Change hook: runs after every settings or geometry mutation so derived
    /// layout stays consistent.
    pub fn on_changed(&mut self, is_setting_change: bool, key: &str, measure: &dyn TextMeasure) {
        match &mut self.kind {
            ElementKind::Text(t) => {
                let mut size = Size::new(self.width, self.height);
                t.relayout(measure, is_setting_change, key, &mut size);
                self.width = size.width;
                self.height = size.height;
            }
        }
    }

    // --- Handles and hit-testing ---

    /// Position of `handle` in the unrotated frame.
    ///
    /// Corners sit just outside the box; the rotate handle floats above the
    /// top-center.
    #[must_use]
    pub fn handle_position(&self, handle: Handle, metrics: &HandleMetrics) -> Point {
        let b = self.bounds();
        let m = metrics.size * CORNER_MARGIN_SCALE;
        match handle {
            Handle::TopLeft => Point::new(b.x - m, b.y - m),
            Handle::TopRight => Point::new(b.right() + m, b.y - m),
            Handle::BottomLeft => Point::new(b.x - m, b.bottom() + m),
            Handle::BottomRight => Point::new(b.right() + m, b.bottom() + m),
            Handle::Rotate => Point::new(b.x + b.width / 2.0, b.y - metrics.size * ROTATE_OFFSET_SCALE),
        }
    }

    /// Position of `handle` on the canvas, with rotation applied.
    #[must_use]
    pub fn handle_canvas_position(&self, handle: Handle, metrics: &HandleMetrics) -> Point {
        self.handle_position(handle, metrics)
            .rotate_about(self.center(), self.rotation)
    }

    /// Canvas position of a box corner (no handle margin), rotation applied.
    fn corner(&self, handle: Handle) -> Point {
        let c = self.center();
        let (sx, sy) = handle.signs();
        Point::new(c.x + sx * self.width() / 2.0, c.y + sy * self.height() / 2.0).rotate_about(c, self.rotation)
    }

    /// Handle under `p`, if any. The rotate handle wins over corners.
    #[must_use]
    pub fn handle_at(&self, p: Point, source: PointerSource, metrics: &HandleMetrics) -> Option<Handle> {
        let local = p.rotate_about(self.center(), -self.rotation);
        let radius = metrics.hit_radius(source);
        std::iter::once(Handle::Rotate)
            .chain(Handle::CORNERS)
            .find(|h| self.handle_position(*h, metrics).distance(local) <= radius)
    }

    /// Body hit test against the unrotated bounding box. Touch input gets a
    /// little padding. Rotation is not taken into account.
    #[must_use]
    pub fn intersects(&self, p: Point, source: PointerSource) -> bool {
        let pad = match source {
            PointerSource::Mouse => 0.0,
            PointerSource::Touch => TOUCH_BODY_PADDING_PX,
        };
        self.bounds().inflate(pad).contains(p)
    }

    #[must_use]
    pub fn intersects_rect(&self, rect: &Rect) -> bool {
        self.bounds().intersects(rect)
    }

    // --- Interaction ---

    fn capture(&self, p: Point, handle: Option<Handle>) -> Press {
        let center = self.center();
        let anchor = handle.map_or(center, |h| self.corner(h.opposite()));
        Press {
            point: p,
            offset: Point::new(p.x - self.x, p.y - self.y),
            handle,
            width: self.width(),
            height: self.height(),
            rotation: self.rotation,
            anchor,
            center,
            angle: p.angle_from(center),
        }
    }

    /// Record the pointer offset for a following [`Element::drag`].
    pub fn prepare_drag(&mut self, p: Point) {
        self.press = Some(self.capture(p, None));
    }

    /// Move so the press offset is preserved, keeping the box inside `bounds`.
    /// Returns whether the position changed.
    pub fn drag(&mut self, p: Point, bounds: Size) -> bool {
        if self.locked {
            return false;
        }
        let Some(press) = self.press else {
            return false;
        };
        let max_x = (bounds.width - self.width()).max(0.0);
        let max_y = (bounds.height - self.height()).max(0.0);
        let x = (p.x - press.offset.x).clamp(0.0, max_x);
        let y = (p.y - press.offset.y).clamp(0.0, max_y);
        let moved = x != self.x || y != self.y;
        self.x = x;
        self.y = y;
        self.needs_placement = false;
        moved
    }

    /// Record handle, size, rotation and anchor for a following
    /// [`Element::handle_interaction`]. No-op when locked.
    pub fn prepare_handle(&mut self, handle: Handle, p: Point) {
        if self.locked {
            return;
        }
        self.press = Some(self.capture(p, Some(handle)));
    }

    /// Resize or rotate depending on the handle captured at press time.
    /// Returns whether geometry changed.
    pub fn handle_interaction(&mut self, p: Point, measure: &dyn TextMeasure) -> bool {
        if self.locked {
            return false;
        }
        let Some(press) = self.press else {
            return false;
        };
        match press.handle {
            None => false,
            Some(Handle::Rotate) => {
                let before = self.rotation;
                self.set_rotation(press.rotation + (p.angle_from(press.center) - press.angle));
                self.rotation != before
            }
            Some(handle) => self.resize(handle, &press, p, measure),
        }
    }

    fn resize(&mut self, handle: Handle, press: &Press, p: Point, measure: &dyn TextMeasure) -> bool {
        let before = self.bounds();
        let (sx, sy) = handle.signs();
        let delta = Point::new(p.x - press.point.x, p.y - press.point.y).rotate_about(Point::default(), -press.rotation);

        self.kind.mark_user_sized();

        let proposed_w = press.width + sx * delta.x;
        if proposed_w >= self.min_size().width {
            self.width = proposed_w;
        }
        self.on_changed(false, "width", measure);

        let proposed_h = press.height + sy * delta.y;
        if proposed_h >= self.min_size().height {
            self.height = proposed_h;
        }
        self.on_changed(false, "height", measure);

        // Put the anchor corner back where it was at press time.
        let w = self.width();
        let h = self.height();
        let offset = Point::new(-sx * w / 2.0, -sy * h / 2.0).rotate_about(Point::default(), press.rotation);
        let cx = press.anchor.x - offset.x;
        let cy = press.anchor.y - offset.y;
        self.x = cx - w / 2.0;
        self.y = cy - h / 2.0;

        self.bounds() != before
    }

    /// Forget the gesture captured at press time.
    pub fn end_interaction(&mut self) {
        self.press = None;
    }

    // --- Drawing ---

    /// Draw the variant in a local frame centered on the element; the caller
    /// applies translation and rotation.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn draw(&self, surface: &mut dyn Surface) -> Result<()> {
        match &self.kind {
            ElementKind::Text(t) => t.draw(surface, self.width(), self.height()),
        }
    }
}
