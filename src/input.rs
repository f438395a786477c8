//! Input model: pointer sources, modifier keys, the gesture state machine and
//! the hover cursor.
//!
//! `InputAdapter` is the browser-independent half of input normalization: it
//! tracks held modifier keys and filters the synthetic mouse events browsers
//! fire after a touch. Converting CSS pixels to canvas pixels lives on
//! [`crate::viewport::Viewport`].

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::consts::SYNTHETIC_MOUSE_WINDOW_MS;
use crate::doc::ElementId;
use crate::element::Handle;
use crate::viewport::Point;

/// Where a pointer event came from. Touch gets larger hit tolerances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
}

/// Modifier intent derived from held keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    /// Shift, Ctrl or Meta: clicks toggle selection membership.
    pub multi_select: bool,
    /// Alt: handles are neither drawn nor hit-tested.
    pub hide_handles: bool,
}

/// Raw modifier keys as reported by the browser.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct HeldKeys {
    shift: bool,
    ctrl: bool,
    alt: bool,
    meta: bool,
}

impl HeldKeys {
    fn slot(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "Shift" => Some(&mut self.shift),
            "Control" => Some(&mut self.ctrl),
            "Alt" => Some(&mut self.alt),
            "Meta" => Some(&mut self.meta),
            _ => None,
        }
    }

    fn modifiers(self) -> Modifiers {
        Modifiers { multi_select: self.shift || self.ctrl || self.meta, hide_handles: self.alt }
    }
}

/// Tracks modifier keys and suppresses touch-emulated mouse events.
#[derive(Debug, Clone, Default)]
pub struct InputAdapter {
    keys: HeldKeys,
    last_touch_ms: Option<f64>,
}

impl InputAdapter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.keys.modifiers()
    }

    /// Record a key press. Returns whether the derived modifiers changed.
    pub fn key_down(&mut self, key: &str) -> bool {
        self.set_key(key, true)
    }

    /// Record a key release. Returns whether the derived modifiers changed.
    pub fn key_up(&mut self, key: &str) -> bool {
        self.set_key(key, false)
    }

    fn set_key(&mut self, key: &str, held: bool) -> bool {
        let before = self.modifiers();
        if let Some(slot) = self.keys.slot(key) {
            *slot = held;
        }
        self.modifiers() != before
    }

    /// Overwrite modifier state from the flags carried on a pointer event.
    pub fn sync(&mut self, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        self.keys = HeldKeys { shift, ctrl, alt, meta };
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.keys = HeldKeys::default();
    }

    /// Note a touch event at `now_ms`.
    pub fn note_touch(&mut self, now_ms: f64) {
        self.last_touch_ms = Some(now_ms);
    }

    /// Whether a mouse event at `now_ms` is genuine rather than emulated
    /// from a recent touch.
    #[must_use]
    pub fn accept_mouse(&self, now_ms: f64) -> bool {
        match self.last_touch_ms {
            Some(t) => now_ms - t > SYNTHETIC_MOUSE_WINDOW_MS,
            None => true,
        }
    }
}

/// The gesture in progress between pointer-down and pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum InputState {
    #[default]
    Idle,
    /// Every selected element follows the pointer.
    Dragging {
        /// Whether any element actually moved.
        moved: bool,
    },
    /// One element is resized or rotated through a handle.
    Resizing { id: ElementId, handle: Handle, moved: bool },
    /// Marquee selection from `origin` to `current`.
    Selecting { origin: Point, current: Point },
}

/// Mouse cursor shown over the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Move,
    /// Top-left / bottom-right diagonal.
    ResizeNwse,
    /// Top-right / bottom-left diagonal.
    ResizeNesw,
    Grab,
}

impl Cursor {
    /// Cursor for hovering or dragging `handle`.
    #[must_use]
    pub fn for_handle(handle: Handle) -> Self {
        match handle {
            Handle::TopLeft | Handle::BottomRight => Self::ResizeNwse,
            Handle::TopRight | Handle::BottomLeft => Self::ResizeNesw,
            Handle::Rotate => Self::Grab,
        }
    }

    #[must_use]
    pub fn as_css(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Move => "move",
            Self::ResizeNwse => "nwse-resize",
            Self::ResizeNesw => "nesw-resize",
            Self::Grab => "grab",
        }
    }
}
