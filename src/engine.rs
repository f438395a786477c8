//! Controller: owns the element collection, the selection and the
//! interaction state machine.
//!
//! `EngineCore` holds every piece of logic that does not depend on the
//! browser, so the whole controller runs under `cargo test` with a fake
//! surface. Pointer coordinates arrive already converted to canvas pixels.
//! Mutations never draw directly; they set a frame-request flag the shell
//! coalesces into one animation frame, and they queue [`Event`]s the shell
//! dispatches after the call returns.

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

use crate::config::EngineConfig;
use crate::consts::FPS_SMOOTHING;
use crate::doc::{ElementId, ElementStore, Selection};
use crate::element::{Element, ElementInit, ElementType, Handle, HandleMetrics};
use crate::error::{EngineError, Result};
use crate::events::{
    ElementListChanged, ElementsUpdated, Event, FocusRequested, ImageChanged, SelectionChanged,
};
use crate::input::{Cursor, InputAdapter, InputState, Modifiers, PointerSource};
use crate::render::{self, Scene};
use crate::settings::{ImageRef, SettingValue};
use crate::surface::{Surface, TextMeasure};
use crate::viewport::{Point, Rect, Size, Viewport};

/// Smoothed frame rate over rendered frames.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    last_ms: Option<f64>,
    fps: f64,
}

impl FrameStats {
    /// Record a frame drawn at `now_ms`.
    pub fn tick(&mut self, now_ms: f64) {
        if let Some(last) = self.last_ms {
            let dt = now_ms - last;
            if dt > 0.0 {
                let instant = 1000.0 / dt;
                self.fps = if self.fps > 0.0 { self.fps + (instant - self.fps) * FPS_SMOOTHING } else { instant };
            }
        }
        self.last_ms = Some(now_ms);
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.fps
    }
}

/// Core engine state: all logic that doesn't depend on the canvas element.
pub struct EngineCore {
    config: EngineConfig,
    measure: Box<dyn TextMeasure>,
    store: ElementStore,
    selection: Selection,
    input: InputAdapter,
    state: InputState,
    viewport: Viewport,
    background: Option<ImageRef>,
    outbox: Vec<Event>,
    frame_requested: bool,
    exporting: bool,
    stats: FrameStats,
    cursor: Cursor,
}

impl std::fmt::Debug for EngineCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineCore")
            .field("elements", &self.store.len())
            .field("selection", &self.selection)
            .field("state", &self.state)
            .field("viewport", &self.viewport)
            .field("exporting", &self.exporting)
            .finish_non_exhaustive()
    }
}

impl EngineCore {
    /// Create an engine with a blank canvas of the configured default size.
    #[must_use]
    pub fn new(config: EngineConfig, measure: Box<dyn TextMeasure>) -> Self {
        let viewport = Viewport::new(Size::new(config.canvas_width, config.canvas_height));
        Self {
            config,
            measure,
            store: ElementStore::new(),
            selection: Selection::new(),
            input: InputAdapter::new(),
            state: InputState::Idle,
            viewport,
            background: None,
            outbox: Vec::new(),
            frame_requested: true,
            exporting: false,
            stats: FrameStats::default(),
            cursor: Cursor::Default,
        }
    }

    fn metrics(&self) -> HandleMetrics {
        HandleMetrics { size: self.config.handle_size, touch_scale: self.config.touch_hit_scale }
    }

    fn request_frame(&mut self) {
        self.frame_requested = true;
    }

    fn emit_selection(&mut self) {
        self.outbox.push(Event::SelectionChanged(SelectionChanged { selected: self.selection.ids().to_vec() }));
    }

    fn emit_list(&mut self) {
        self.outbox.push(Event::ElementListChanged(ElementListChanged { elements: self.store.ids() }));
    }

    /// Mouse events shortly after a touch are browser emulation and dropped.
    fn accept(&mut self, source: PointerSource, now_ms: f64) -> bool {
        match source {
            PointerSource::Touch => {
                self.input.note_touch(now_ms);
                true
            }
            PointerSource::Mouse => self.input.accept_mouse(now_ms),
        }
    }

    // --- Hit-testing ---

    /// Topmost element whose body contains `p`.
    fn element_at(&self, p: Point, source: PointerSource) -> Option<ElementId> {
        self.store.iter().rev().find(|e| e.intersects(p, source)).map(|e| e.id)
    }

    /// Topmost selected element with a handle under `p`.
    fn selected_handle_at(&self, p: Point, source: PointerSource) -> Option<(ElementId, Handle)> {
        let metrics = self.metrics();
        self.store
            .iter()
            .rev()
            .filter(|e| self.selection.contains(&e.id))
            .find_map(|e| e.handle_at(p, source, &metrics).map(|h| (e.id, h)))
    }

    fn hover_cursor(&self, p: Point, source: PointerSource) -> Cursor {
        if !self.input.modifiers().hide_handles {
            if let Some((_, handle)) = self.selected_handle_at(p, source) {
                return Cursor::for_handle(handle);
            }
        }
        if self.element_at(p, source).is_some() { Cursor::Move } else { Cursor::Default }
    }

    // --- Pointer input ---

    /// Pointer pressed at canvas point `p`.
    pub fn on_pointer_down(&mut self, p: Point, source: PointerSource, now_ms: f64) {
        if self.exporting || !self.accept(source, now_ms) {
            return;
        }
        let mods = self.input.modifiers();

        if !mods.hide_handles {
            if let Some((id, handle)) = self.selected_handle_at(p, source) {
                if let Some(el) = self.store.get_mut(&id) {
                    el.prepare_handle(handle, p);
                }
                self.state = InputState::Resizing { id, handle, moved: false };
                self.cursor = Cursor::for_handle(handle);
                self.request_frame();
                return;
            }
        }

        if let Some(id) = self.element_at(p, source) {
            if mods.multi_select {
                self.selection.toggle(id);
                self.emit_selection();
                self.state = InputState::Idle;
            } else {
                if !self.selection.contains(&id) {
                    self.selection.set([id]);
                    self.emit_selection();
                }
                for sid in self.selection.ids().to_vec() {
                    if let Some(el) = self.store.get_mut(&sid) {
                        el.prepare_drag(p);
                    }
                }
                self.state = InputState::Dragging { moved: false };
                self.cursor = Cursor::Move;
            }
        } else {
            if !mods.multi_select && self.selection.clear() {
                self.emit_selection();
            }
            self.state = InputState::Selecting { origin: p, current: p };
        }
        self.request_frame();
    }

    /// Pointer moved to canvas point `p`.
    pub fn on_pointer_move(&mut self, p: Point, source: PointerSource, now_ms: f64) {
        if self.exporting || !self.accept(source, now_ms) {
            return;
        }
        match self.state {
            InputState::Idle => {
                self.cursor = self.hover_cursor(p, source);
            }
            InputState::Dragging { moved } => {
                let bounds = self.viewport.canvas;
                let mut any = false;
                for id in self.selection.ids().to_vec() {
                    if let Some(el) = self.store.get_mut(&id) {
                        any |= el.drag(p, bounds);
                    }
                }
                self.state = InputState::Dragging { moved: moved || any };
                if any {
                    self.request_frame();
                }
            }
            InputState::Resizing { id, handle, moved } => {
                let changed = match self.store.get_mut(&id) {
                    Some(el) => el.handle_interaction(p, &*self.measure),
                    None => false,
                };
                self.state = InputState::Resizing { id, handle, moved: moved || changed };
                if changed {
                    self.request_frame();
                }
            }
            InputState::Selecting { origin, .. } => {
                self.state = InputState::Selecting { origin, current: p };
                self.request_frame();
            }
        }
    }

    /// Pointer released at canvas point `p`.
    pub fn on_pointer_up(&mut self, p: Point, source: PointerSource, now_ms: f64) {
        if self.exporting || !self.accept(source, now_ms) {
            return;
        }
        match std::mem::take(&mut self.state) {
            InputState::Idle => {}
            InputState::Dragging { moved } | InputState::Resizing { moved, .. } => {
                for el in self.store.iter_mut() {
                    el.end_interaction();
                }
                if moved {
                    self.outbox.push(Event::ElementsUpdated(ElementsUpdated));
                }
            }
            InputState::Selecting { origin, .. } => {
                let rect = Rect::from_corners(origin, p);
                let hits: Vec<ElementId> =
                    self.store.iter().filter(|e| e.intersects_rect(&rect)).map(|e| e.id).collect();
                self.selection.set(hits);
                self.emit_selection();
            }
        }
        self.cursor = self.hover_cursor(p, source);
        self.request_frame();
    }

    /// Double-click selects the element under `p` and asks the host to focus
    /// its main editing control.
    pub fn on_double_click(&mut self, p: Point, source: PointerSource, now_ms: f64) {
        if self.exporting || !self.accept(source, now_ms) {
            return;
        }
        let Some(id) = self.element_at(p, source) else {
            return;
        };
        if !self.selection.contains(&id) {
            self.selection.set([id]);
            self.emit_selection();
        }
        if let Some(el) = self.store.get(&id) {
            let control = el.focus_control().to_owned();
            self.outbox.push(Event::FocusRequested(FocusRequested { control }));
        }
        self.request_frame();
    }

    // --- Keyboard ---

    /// Key pressed. Returns whether the engine consumed the key.
    pub fn on_key_down(&mut self, key: &str) -> bool {
        if self.input.key_down(key) {
            self.request_frame();
        }
        if self.exporting {
            return false;
        }
        match key {
            "Delete" | "Backspace" if !self.selection.is_empty() => {
                let ids = self.selection.ids().to_vec();
                self.remove_elements(&ids);
                true
            }
            "Escape" if !self.selection.is_empty() => {
                self.selection.clear();
                self.emit_selection();
                self.request_frame();
                true
            }
            _ => false,
        }
    }

    pub fn on_key_up(&mut self, key: &str) {
        if self.input.key_up(key) {
            self.request_frame();
        }
    }

    /// Replace modifier state with the flags carried on a pointer event.
    pub fn sync_modifiers(&mut self, shift: bool, ctrl: bool, alt: bool, meta: bool) {
        let before = self.input.modifiers();
        self.input.sync(shift, ctrl, alt, meta);
        if self.input.modifiers() != before {
            self.request_frame();
        }
    }

    /// The window lost focus; key-up events will not arrive.
    pub fn on_blur(&mut self) {
        self.input.release_all();
        self.request_frame();
    }

    // --- Element lifecycle ---

    /// Create an element, select it and queue list and selection events.
    /// Without an initial position it is centered on the next frame.
    ///
    /// # Errors
    ///
    /// Fails if `init` names unknown settings or carries ill-typed values.
    pub fn create_element(&mut self, kind: ElementType, init: Option<&ElementInit>) -> Result<ElementId> {
        let mut el = Element::new(kind, self.config.text_padding, &*self.measure);
        if let Some(init) = init {
            el.apply_init(init, &*self.measure)?;
        }
        let id = el.id;
        self.store.insert(el);
        log::debug!("element created: {id} ({kind:?})");
        self.emit_list();
        self.selection.set([id]);
        self.emit_selection();
        self.request_frame();
        Ok(id)
    }

    /// Remove the given elements. Returns how many were removed.
    pub fn remove_elements(&mut self, ids: &[ElementId]) -> usize {
        if self.selection.clear() {
            self.emit_selection();
        }
        self.state = InputState::Idle;
        let removed = ids.iter().filter(|id| self.store.remove(id).is_some()).count();
        if removed > 0 {
            log::debug!("removed {removed} element(s)");
            self.emit_list();
        }
        self.request_frame();
        removed
    }

    pub fn remove_element(&mut self, id: &ElementId) -> bool {
        self.remove_elements(&[*id]) > 0
    }

    /// Remove every element.
    pub fn clear_elements(&mut self) {
        if self.selection.clear() {
            self.emit_selection();
        }
        self.state = InputState::Idle;
        if !self.store.is_empty() {
            log::debug!("cleared {} element(s)", self.store.len());
            self.store.clear();
            self.emit_list();
        }
        self.request_frame();
    }

    /// Write `value` to the setting named `key`, or else to the element
    /// field of that name (`x`, `y`, `width`, `height`, `rotation`, `locked`).
    ///
    /// # Errors
    ///
    /// `ElementNotFound`, `UnknownProperty` when `key` is neither a setting
    /// nor a field, `InvalidValue` when the value has the wrong shape.
    pub fn update_element(&mut self, id: &ElementId, key: &str, value: &serde_json::Value) -> Result<()> {
        let el = self.store.get_mut(id).ok_or(EngineError::ElementNotFound(*id))?;
        if el.settings().contains(key) {
            el.set_setting_json(key, value, &*self.measure)?;
        } else if el.set_field(key, value)? {
            el.on_changed(false, key, &*self.measure);
        } else {
            log::warn!("update_element: unknown property {key:?}");
            return Err(EngineError::UnknownProperty(key.to_owned()));
        }
        self.request_frame();
        Ok(())
    }

    /// Typed settings write.
    ///
    /// # Errors
    ///
    /// `ElementNotFound`, `UnknownProperty` or `InvalidValue`.
    pub fn set_setting(&mut self, id: &ElementId, key: &str, value: SettingValue) -> Result<()> {
        let el = self.store.get_mut(id).ok_or(EngineError::ElementNotFound(*id))?;
        el.set_setting(key, value, &*self.measure)?;
        self.request_frame();
        Ok(())
    }

    // --- Image lifecycle ---

    /// Replace the background. Clears every element and resizes the canvas to
    /// the image's natural size.
    pub fn set_image(&mut self, image: ImageRef) {
        self.clear_elements();
        log::info!("background image {} ({}x{})", image.src, image.width, image.height);
        self.viewport.canvas = Size::new(image.width, image.height);
        self.viewport.refit(&self.config.display);
        self.background = Some(image.clone());
        self.outbox.push(Event::ImageChanged(ImageChanged { image: Some(image) }));
        self.request_frame();
    }

    /// Return to a blank canvas of the configured default size.
    pub fn clear_image(&mut self) {
        self.clear_elements();
        self.viewport.canvas = Size::new(self.config.canvas_width, self.config.canvas_height);
        self.viewport.refit(&self.config.display);
        self.background = None;
        self.outbox.push(Event::ImageChanged(ImageChanged { image: None }));
        self.request_frame();
    }

    /// Change the space reserved around the displayed canvas.
    pub fn set_margins(&mut self, horizontal: f64, vertical: f64) {
        self.config.display.margin_x = horizontal;
        self.config.display.margin_y = vertical;
        self.viewport.refit(&self.config.display);
        self.request_frame();
    }

    /// The browser window changed size.
    pub fn resize_viewport(&mut self, width: f64, height: f64) {
        self.viewport.window = Size::new(width, height);
        self.viewport.refit(&self.config.display);
        self.request_frame();
    }

    // --- Frames and export ---

    /// Center elements still waiting for their first placement.
    fn place_new_elements(&mut self) {
        let canvas = self.viewport.canvas;
        for el in self.store.iter_mut().filter(|e| e.needs_placement) {
            el.x = (canvas.width - el.width()) / 2.0;
            el.y = (canvas.height - el.height()) / 2.0;
            el.needs_placement = false;
        }
    }

    /// Settle deferred placement and draw one frame.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn frame(&mut self, surface: &mut dyn Surface, now_ms: f64) -> Result<()> {
        self.frame_requested = false;
        self.place_new_elements();
        self.stats.tick(now_ms);
        let marquee = match self.state {
            InputState::Selecting { origin, current } => Some(Rect::from_corners(origin, current)),
            _ => None,
        };
        let scene = Scene {
            store: &self.store,
            selection: &self.selection,
            canvas: self.viewport.canvas,
            background: self.background.as_ref(),
            marquee,
            handles: self.metrics(),
            show_handles: !self.input.modifiers().hide_handles,
            exporting: self.exporting,
            fps: self.config.debug.then_some(self.stats.fps()),
        };
        render::draw(surface, &scene)
    }

    /// Set the exporting flag and draw a clean frame, plus the watermark if
    /// requested. The flag stays set until [`EngineCore::end_export`].
    ///
    /// # Errors
    ///
    /// Propagates surface failures; the flag is cleared again on failure.
    pub fn begin_export(&mut self, surface: &mut dyn Surface, now_ms: f64, watermark: bool) -> Result<()> {
        self.exporting = true;
        self.state = InputState::Idle;
        let drawn = self.frame(surface, now_ms).and_then(|()| {
            if watermark {
                render::draw_watermark(surface, self.viewport.canvas, &self.config.watermark_text)
            } else {
                Ok(())
            }
        });
        if drawn.is_err() {
            self.end_export();
        }
        drawn
    }

    /// Clear the exporting flag and request a normal frame.
    pub fn end_export(&mut self) {
        self.exporting = false;
        self.request_frame();
    }

    /// Drain queued events in emission order.
    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.outbox)
    }

    // --- Queries ---

    #[must_use]
    pub fn frame_requested(&self) -> bool {
        self.frame_requested
    }

    pub fn elements(&self) -> impl DoubleEndedIterator<Item = &Element> {
        self.store.iter()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.store.get(id)
    }

    #[must_use]
    pub fn element_count(&self) -> usize {
        self.store.len()
    }

    #[must_use]
    pub fn selection(&self) -> &[ElementId] {
        self.selection.ids()
    }

    #[must_use]
    pub fn canvas_size(&self) -> Size {
        self.viewport.canvas
    }

    #[must_use]
    pub fn display_size(&self) -> Size {
        self.viewport.display
    }

    #[must_use]
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    #[must_use]
    pub fn background(&self) -> Option<&ImageRef> {
        self.background.as_ref()
    }

    #[must_use]
    pub fn fps(&self) -> f64 {
        self.stats.fps()
    }

    #[must_use]
    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    #[must_use]
    pub fn state(&self) -> InputState {
        self.state
    }

    #[must_use]
    pub fn modifiers(&self) -> Modifiers {
        self.input.modifiers()
    }

    #[must_use]
    pub fn is_exporting(&self) -> bool {
        self.exporting
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
