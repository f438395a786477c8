//! Browser shell around [`EngineCore`].
//!
//! Owns the `<canvas>` element, its 2D context and the DOM listeners. Raw DOM
//! events are converted to canvas-pixel points and forwarded to the core.
//! After every call the shell applies the cursor, dispatches queued events and
//! schedules at most one animation frame.

#[cfg(test)]
#[path = "web_test.rs"]
mod web_test;

use std::cell::{Cell, Ref, RefCell};
use std::collections::HashMap;
use std::f64::consts::TAU;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    Blob, CanvasRenderingContext2d, EventTarget, HtmlAnchorElement, HtmlCanvasElement, HtmlElement,
    HtmlImageElement, KeyboardEvent, MouseEvent, TouchEvent, Url,
};

use crate::config::EngineConfig;
use crate::doc::ElementId;
use crate::element::{ElementInit, ElementType};
use crate::engine::EngineCore;
use crate::error::{EngineError, Result};
use crate::events::{
    ElementListChanged, ElementsUpdated, EventBus, FocusRequested, ImageChanged, SelectionChanged,
    SubscriptionId,
};
use crate::input::PointerSource;
use crate::settings::{ImageRef, SettingValue};
use crate::surface::{Shadow, Surface, TextAlign, TextMeasure};
use crate::viewport::{Point, Size};

type ImageCache = Rc<RefCell<HashMap<String, HtmlImageElement>>>;
type DoneCallback = Rc<RefCell<Option<Box<dyn FnOnce(Result<()>)>>>>;

/// Install the panic hook and route `log` output to the browser console.
pub fn init_logging() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Debug).is_err() {
        log::debug!("logger already installed");
    }
}

fn now_ms() -> f64 {
    web_sys::window().and_then(|w| w.performance()).map_or_else(js_sys::Date::now, |p| p.now())
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn px(v: f64) -> u32 {
    v.max(0.0).round() as u32
}

// =============================================================
// Surfaces
// =============================================================

/// Text measurement through a 2D context.
#[derive(Debug, Clone)]
pub struct WebMeasure {
    ctx: CanvasRenderingContext2d,
}

impl TextMeasure for WebMeasure {
    fn text_width(&self, font: &str, text: &str) -> f64 {
        measure(&self.ctx, font, text)
    }
}

fn measure(ctx: &CanvasRenderingContext2d, font: &str, text: &str) -> f64 {
    ctx.set_font(font);
    match ctx.measure_text(text) {
        Ok(m) => m.width(),
        Err(err) => {
            log::warn!("measure_text failed: {err:?}");
            0.0
        }
    }
}

/// [`Surface`] backed by a `CanvasRenderingContext2d`.
#[derive(Debug)]
pub struct WebSurface {
    ctx: CanvasRenderingContext2d,
    images: ImageCache,
}

impl TextMeasure for WebSurface {
    fn text_width(&self, font: &str, text: &str) -> f64 {
        measure(&self.ctx, font, text)
    }
}

impl Surface for WebSurface {
    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.ctx.translate(x, y)?;
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<()> {
        self.ctx.rotate(degrees.to_radians())?;
        Ok(())
    }

    fn set_fill(&mut self, color: &str) {
        self.ctx.set_fill_style_str(color);
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.ctx.set_stroke_style_str(color);
        self.ctx.set_line_width(width);
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<()> {
        let dash = js_sys::Array::new();
        for s in segments {
            dash.push(&JsValue::from_f64(*s));
        }
        self.ctx.set_line_dash(&dash)?;
        Ok(())
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        match shadow {
            Some(s) => {
                self.ctx.set_shadow_color(&s.color);
                self.ctx.set_shadow_blur(s.blur);
                self.ctx.set_shadow_offset_x(s.offset_x);
                self.ctx.set_shadow_offset_y(s.offset_y);
            }
            None => {
                self.ctx.set_shadow_color("transparent");
                self.ctx.set_shadow_blur(0.0);
                self.ctx.set_shadow_offset_x(0.0);
                self.ctx.set_shadow_offset_y(0.0);
            }
        }
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.fill_rect(x, y, w, h);
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ctx.stroke_rect(x, y, w, h);
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.ctx.begin_path();
        self.ctx.move_to(from.0, from.1);
        self.ctx.line_to(to.0, to.1);
        self.ctx.stroke();
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> Result<()> {
        self.ctx.begin_path();
        self.ctx.arc(cx, cy, r, 0.0, TAU)?;
        self.ctx.fill();
        self.ctx.stroke();
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageRef, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        let images = self.images.borrow();
        let Some(el) = images.get(&image.src) else {
            return Ok(());
        };
        if !el.complete() {
            return Ok(());
        }
        self.ctx.draw_image_with_html_image_element_and_dw_and_dh(el, x, y, w, h)?;
        Ok(())
    }

    fn set_text_style(&mut self, font: &str, align: TextAlign) {
        self.ctx.set_font(font);
        self.ctx.set_text_align(align.as_css());
        self.ctx.set_text_baseline("top");
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ctx.fill_text(text, x, y)?;
        Ok(())
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ctx.stroke_text(text, x, y)?;
        Ok(())
    }
}

// =============================================================
// Export format
// =============================================================

/// Output encoding for [`EngineHandle::export`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    #[must_use]
    pub fn mime(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
        }
    }

    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
        }
    }
}

// =============================================================
// Shell
// =============================================================

struct Listener {
    target: EventTarget,
    kind: &'static str,
    closure: Closure<dyn FnMut(web_sys::Event)>,
}

#[derive(Clone, Copy)]
enum Gesture {
    Down,
    Move,
    Up,
    DoubleClick,
}

struct Shell {
    canvas: HtmlCanvasElement,
    surface: RefCell<WebSurface>,
    core: RefCell<EngineCore>,
    bus: RefCell<EventBus>,
    images: ImageCache,
    raf_pending: Cell<bool>,
    listeners: RefCell<Vec<Listener>>,
}

impl Shell {
    fn css_point(&self, client_x: f64, client_y: f64) -> Point {
        let rect = self.canvas.get_bounding_client_rect();
        let css = Point::new(client_x - rect.left(), client_y - rect.top());
        let shown = Size::new(rect.width(), rect.height());
        self.core.borrow().viewport().css_to_canvas_shown(css, shown)
    }

    fn pointer(self: &Rc<Self>, gesture: Gesture, client_x: f64, client_y: f64, source: PointerSource) {
        let p = self.css_point(client_x, client_y);
        let now = now_ms();
        {
            let mut core = self.core.borrow_mut();
            match gesture {
                Gesture::Down => core.on_pointer_down(p, source, now),
                Gesture::Move => core.on_pointer_move(p, source, now),
                Gesture::Up => core.on_pointer_up(p, source, now),
                Gesture::DoubleClick => core.on_double_click(p, source, now),
            }
        }
        self.after_input();
    }

    fn install_image(self: &Rc<Self>, image: &HtmlImageElement) {
        let image_ref = ImageRef {
            src: image.src(),
            width: f64::from(image.natural_width()),
            height: f64::from(image.natural_height()),
        };
        {
            let mut images = self.images.borrow_mut();
            images.clear();
            images.insert(image_ref.src.clone(), image.clone());
        }
        self.core.borrow_mut().set_image(image_ref);
        self.after_input();
    }

    fn sync_window_size(&self) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let width = window.inner_width().map_or(0.0, |v| v.as_f64().unwrap_or(0.0));
        let height = window.inner_height().map_or(0.0, |v| v.as_f64().unwrap_or(0.0));
        self.core.borrow_mut().resize_viewport(width, height);
    }

    /// Match the element's backing store and CSS size to the core's viewport.
    fn sync_canvas_size(&self) {
        let (canvas, display) = {
            let core = self.core.borrow();
            (core.canvas_size(), core.display_size())
        };
        let (w, h) = (px(canvas.width), px(canvas.height));
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
        let style = self.canvas.style();
        for (prop, value) in [("width", display.width), ("height", display.height)] {
            if let Err(err) = style.set_property(prop, &format!("{value}px")) {
                log::warn!("set canvas {prop}: {err:?}");
            }
        }
    }

    /// Flush everything a core call left behind.
    fn after_input(self: &Rc<Self>) {
        let (cursor, events, wants_frame) = {
            let mut core = self.core.borrow_mut();
            (core.cursor(), core.take_events(), core.frame_requested())
        };

        if let Err(err) = self.canvas.style().set_property("cursor", cursor.as_css()) {
            log::warn!("set cursor: {err:?}");
        }
        self.sync_canvas_size();

        if !events.is_empty() {
            // Subscribers may subscribe or call back into the engine.
            let bus = self.bus.borrow().clone();
            for event in &events {
                bus.dispatch(event);
            }
        }

        if wants_frame {
            self.request_render();
        }
    }

    fn request_render(self: &Rc<Self>) {
        if self.raf_pending.get() {
            return;
        }
        self.raf_pending.set(true);

        let Some(window) = web_sys::window() else {
            self.raf_pending.set(false);
            self.render(now_ms());
            return;
        };

        let weak: Weak<Self> = Rc::downgrade(self);
        let holder: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
        let holder_for_cb = Rc::clone(&holder);
        let cb = Closure::wrap(Box::new(move |ts: f64| {
            if let Some(shell) = weak.upgrade() {
                shell.raf_pending.set(false);
                shell.render(ts);
            }
            holder_for_cb.borrow_mut().take();
        }) as Box<dyn FnMut(f64)>);

        match window.request_animation_frame(cb.as_ref().unchecked_ref()) {
            Ok(_) => *holder.borrow_mut() = Some(cb),
            Err(err) => {
                log::warn!("request_animation_frame failed: {err:?}");
                self.raf_pending.set(false);
                self.render(now_ms());
            }
        }
    }

    fn render(&self, ts: f64) {
        let mut core = self.core.borrow_mut();
        let mut surface = self.surface.borrow_mut();
        if let Err(err) = core.frame(&mut *surface, ts) {
            log::error!("frame failed: {err}");
        }
    }

    fn listen<E: JsCast + 'static>(
        self: &Rc<Self>,
        target: &EventTarget,
        kind: &'static str,
        handler: fn(&Rc<Shell>, &E),
    ) -> Result<()> {
        let weak = Rc::downgrade(self);
        let closure = Closure::wrap(Box::new(move |ev: web_sys::Event| {
            let Some(shell) = weak.upgrade() else {
                return;
            };
            match ev.dyn_into::<E>() {
                Ok(ev) => handler(&shell, &ev),
                Err(_) => log::warn!("unexpected event type for {kind}"),
            }
        }) as Box<dyn FnMut(web_sys::Event)>);
        target.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        self.listeners.borrow_mut().push(Listener { target: target.clone(), kind, closure });
        Ok(())
    }

    fn detach(&self) {
        for l in self.listeners.borrow_mut().drain(..) {
            if let Err(err) = l.target.remove_event_listener_with_callback(l.kind, l.closure.as_ref().unchecked_ref()) {
                log::warn!("remove {} listener: {err:?}", l.kind);
            }
        }
    }
}

impl Drop for Shell {
    fn drop(&mut self) {
        self.detach();
    }
}

// =============================================================
// DOM handlers
// =============================================================

fn mouse(shell: &Rc<Shell>, ev: &MouseEvent, gesture: Gesture) {
    shell.core.borrow_mut().sync_modifiers(ev.shift_key(), ev.ctrl_key(), ev.alt_key(), ev.meta_key());
    shell.pointer(gesture, f64::from(ev.client_x()), f64::from(ev.client_y()), PointerSource::Mouse);
}

fn on_mouse_down(shell: &Rc<Shell>, ev: &MouseEvent) {
    mouse(shell, ev, Gesture::Down);
}

fn on_mouse_move(shell: &Rc<Shell>, ev: &MouseEvent) {
    mouse(shell, ev, Gesture::Move);
}

fn on_mouse_up(shell: &Rc<Shell>, ev: &MouseEvent) {
    mouse(shell, ev, Gesture::Up);
}

fn on_double_click(shell: &Rc<Shell>, ev: &MouseEvent) {
    mouse(shell, ev, Gesture::DoubleClick);
}

fn touch(shell: &Rc<Shell>, ev: &TouchEvent, gesture: Gesture) {
    ev.prevent_default();
    // Lifted fingers are no longer in `touches`.
    let list = if matches!(gesture, Gesture::Up) { ev.changed_touches() } else { ev.touches() };
    let Some(t) = list.get(0) else {
        return;
    };
    shell.pointer(gesture, f64::from(t.client_x()), f64::from(t.client_y()), PointerSource::Touch);
}

fn on_touch_start(shell: &Rc<Shell>, ev: &TouchEvent) {
    touch(shell, ev, Gesture::Down);
}

fn on_touch_move(shell: &Rc<Shell>, ev: &TouchEvent) {
    touch(shell, ev, Gesture::Move);
}

fn on_touch_end(shell: &Rc<Shell>, ev: &TouchEvent) {
    touch(shell, ev, Gesture::Up);
}

fn is_modifier(key: &str) -> bool {
    matches!(key, "Shift" | "Control" | "Alt" | "Meta")
}

/// True when the key event is aimed at a form control.
fn is_editing(ev: &KeyboardEvent) -> bool {
    let Some(target) = ev.target() else {
        return false;
    };
    let Some(el) = target.dyn_ref::<HtmlElement>() else {
        return false;
    };
    matches!(el.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT") || el.is_content_editable()
}

fn on_key_down(shell: &Rc<Shell>, ev: &KeyboardEvent) {
    let key = ev.key();
    if is_editing(ev) && !is_modifier(&key) {
        return;
    }
    let consumed = shell.core.borrow_mut().on_key_down(&key);
    if consumed {
        ev.prevent_default();
    }
    shell.after_input();
}

fn on_key_up(shell: &Rc<Shell>, ev: &KeyboardEvent) {
    shell.core.borrow_mut().on_key_up(&ev.key());
    shell.after_input();
}

fn on_blur(shell: &Rc<Shell>, _ev: &web_sys::Event) {
    shell.core.borrow_mut().on_blur();
    shell.after_input();
}

fn on_resize(shell: &Rc<Shell>, _ev: &web_sys::Event) {
    shell.sync_window_size();
    shell.after_input();
}

// =============================================================
// Public handle
// =============================================================

/// Bind the engine to `canvas` and start listening for input.
///
/// # Errors
///
/// Returns [`EngineError::ContextUnavailable`] when the canvas has no 2D
/// context, or `Err` if a listener cannot be attached.
pub fn mount(canvas: HtmlCanvasElement, config: EngineConfig) -> Result<EngineHandle> {
    let ctx = canvas
        .get_context("2d")?
        .ok_or(EngineError::ContextUnavailable)?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| EngineError::ContextUnavailable)?;

    let images: ImageCache = Rc::new(RefCell::new(HashMap::new()));
    let core = EngineCore::new(config, Box::new(WebMeasure { ctx: ctx.clone() }));
    let shell = Rc::new(Shell {
        canvas,
        surface: RefCell::new(WebSurface { ctx, images: Rc::clone(&images) }),
        core: RefCell::new(core),
        bus: RefCell::new(EventBus::new()),
        images,
        raf_pending: Cell::new(false),
        listeners: RefCell::new(Vec::new()),
    });

    if let Err(err) = shell.canvas.style().set_property("touch-action", "none") {
        log::warn!("set touch-action: {err:?}");
    }

    let canvas_target: EventTarget = shell.canvas.clone().into();
    shell.listen(&canvas_target, "mousedown", on_mouse_down)?;
    shell.listen(&canvas_target, "dblclick", on_double_click)?;
    shell.listen(&canvas_target, "touchstart", on_touch_start)?;
    shell.listen(&canvas_target, "touchmove", on_touch_move)?;
    shell.listen(&canvas_target, "touchend", on_touch_end)?;
    shell.listen(&canvas_target, "touchcancel", on_touch_end)?;

    if let Some(window) = web_sys::window() {
        let window_target: EventTarget = window.into();
        // Drags keep tracking after the pointer leaves the canvas.
        shell.listen(&window_target, "mousemove", on_mouse_move)?;
        shell.listen(&window_target, "mouseup", on_mouse_up)?;
        shell.listen(&window_target, "keydown", on_key_down)?;
        shell.listen(&window_target, "keyup", on_key_up)?;
        shell.listen(&window_target, "blur", on_blur)?;
        shell.listen(&window_target, "resize", on_resize)?;
    }

    shell.sync_window_size();
    shell.after_input();
    log::info!("engine mounted");
    Ok(EngineHandle { inner: shell })
}

/// A mounted editor. Dropping it (or calling [`EngineHandle::teardown`]) removes
/// every DOM listener.
pub struct EngineHandle {
    inner: Rc<Shell>,
}

impl std::fmt::Debug for EngineHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineHandle").field("core", &*self.inner.core.borrow()).finish_non_exhaustive()
    }
}

impl EngineHandle {
    /// Remove every DOM listener. The engine stays usable programmatically.
    pub fn teardown(&self) {
        self.inner.detach();
        log::info!("engine torn down");
    }

    /// Read-only access to the controller for queries.
    #[must_use]
    pub fn core(&self) -> Ref<'_, EngineCore> {
        self.inner.core.borrow()
    }

    // --- subscriptions ---

    pub fn on_elements_updated(&self, f: impl Fn(&ElementsUpdated) + 'static) -> SubscriptionId {
        self.inner.bus.borrow_mut().on_elements_updated(f)
    }

    pub fn on_selection_changed(&self, f: impl Fn(&SelectionChanged) + 'static) -> SubscriptionId {
        self.inner.bus.borrow_mut().on_selection_changed(f)
    }

    pub fn on_element_list_changed(&self, f: impl Fn(&ElementListChanged) + 'static) -> SubscriptionId {
        self.inner.bus.borrow_mut().on_element_list_changed(f)
    }

    pub fn on_image_changed(&self, f: impl Fn(&ImageChanged) + 'static) -> SubscriptionId {
        self.inner.bus.borrow_mut().on_image_changed(f)
    }

    pub fn on_focus_requested(&self, f: impl Fn(&FocusRequested) + 'static) -> SubscriptionId {
        self.inner.bus.borrow_mut().on_focus_requested(f)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.bus.borrow_mut().unsubscribe(id)
    }

    // --- elements ---

    /// # Errors
    ///
    /// Returns `Err` if `init` carries an invalid setting.
    pub fn create_element(&self, kind: ElementType, init: Option<&ElementInit>) -> Result<ElementId> {
        let created = self.inner.core.borrow_mut().create_element(kind, init);
        self.inner.after_input();
        created
    }

    pub fn remove_element(&self, id: &ElementId) -> bool {
        let removed = self.inner.core.borrow_mut().remove_element(id);
        self.inner.after_input();
        removed
    }

    pub fn remove_elements(&self, ids: &[ElementId]) -> usize {
        let removed = self.inner.core.borrow_mut().remove_elements(ids);
        self.inner.after_input();
        removed
    }

    pub fn clear_elements(&self) {
        self.inner.core.borrow_mut().clear_elements();
        self.inner.after_input();
    }

    /// # Errors
    ///
    /// See [`EngineCore::update_element`].
    pub fn update_element(&self, id: &ElementId, key: &str, value: &serde_json::Value) -> Result<()> {
        let updated = self.inner.core.borrow_mut().update_element(id, key, value);
        self.inner.after_input();
        updated
    }

    /// # Errors
    ///
    /// See [`EngineCore::set_setting`].
    pub fn set_setting(&self, id: &ElementId, key: &str, value: SettingValue) -> Result<()> {
        let updated = self.inner.core.borrow_mut().set_setting(id, key, value);
        self.inner.after_input();
        updated
    }

    // --- image and viewport ---

    /// Use an already-loaded image as the background.
    pub fn set_image(&self, image: &HtmlImageElement) {
        self.inner.install_image(image);
    }

    /// Load `src` and install it as the background once it decodes.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the image element cannot be created. Load failures
    /// are reported through `on_done`.
    pub fn load_image(&self, src: &str, on_done: impl FnOnce(Result<()>) + 'static) -> Result<()> {
        let img = HtmlImageElement::new()?;
        img.set_cross_origin(Some("anonymous"));

        let on_done: Box<dyn FnOnce(Result<()>)> = Box::new(on_done);
        let done: DoneCallback = Rc::new(RefCell::new(Some(on_done)));
        let weak = Rc::downgrade(&self.inner);
        let loaded = img.clone();
        let done_ok = Rc::clone(&done);
        let onload = Closure::once_into_js(move || {
            if let Some(shell) = weak.upgrade() {
                shell.install_image(&loaded);
            }
            finish(&done_ok, Ok(()));
        });
        let failed_src = src.to_owned();
        let onerror = Closure::once_into_js(move || {
            log::warn!("image failed to load: {failed_src}");
            finish(&done, Err(EngineError::Js(format!("image failed to load: {failed_src}"))));
        });
        img.set_onload(Some(onload.unchecked_ref()));
        img.set_onerror(Some(onerror.unchecked_ref()));
        img.set_src(src);
        Ok(())
    }

    pub fn clear_image(&self) {
        self.inner.images.borrow_mut().clear();
        self.inner.core.borrow_mut().clear_image();
        self.inner.after_input();
    }

    pub fn set_margins(&self, horizontal: f64, vertical: f64) {
        self.inner.core.borrow_mut().set_margins(horizontal, vertical);
        self.inner.after_input();
    }

    // --- export ---

    /// Render a clean frame, serialize it and download it as
    /// `<stem>.<extension>`. `on_done` runs once the download was triggered or
    /// the export failed.
    pub fn export(&self, stem: &str, format: ImageFormat, watermark: bool, on_done: impl FnOnce(Result<()>) + 'static) {
        let on_done: Box<dyn FnOnce(Result<()>)> = Box::new(on_done);
        let done: DoneCallback = Rc::new(RefCell::new(Some(on_done)));
        let drawn = {
            let mut core = self.inner.core.borrow_mut();
            let mut surface = self.inner.surface.borrow_mut();
            core.begin_export(&mut *surface, now_ms(), watermark)
        };
        if let Err(err) = drawn {
            log::error!("export render failed: {err}");
            finish(&done, Err(err));
            return;
        }

        let filename = format!("{stem}.{}", format.extension());
        let weak = Rc::downgrade(&self.inner);
        let done_cb = Rc::clone(&done);
        let callback = Closure::once_into_js(move |blob: JsValue| {
            let result = match blob.dyn_into::<Blob>() {
                Ok(blob) => download(&blob, &filename),
                Err(_) => Err(EngineError::ExportFailed("canvas produced no data".into())),
            };
            if let Some(inner) = weak.upgrade() {
                inner.core.borrow_mut().end_export();
                inner.after_input();
            }
            match &result {
                Ok(()) => log::info!("exported {filename}"),
                Err(err) => log::error!("export failed: {err}"),
            }
            finish(&done_cb, result);
        });

        if let Err(err) = self.inner.canvas.to_blob_with_type(callback.unchecked_ref(), format.mime()) {
            self.inner.core.borrow_mut().end_export();
            self.inner.after_input();
            finish(&done, Err(EngineError::ExportFailed(format!("{err:?}"))));
        }
    }
}

fn finish(done: &DoneCallback, result: Result<()>) {
    let cb = done.borrow_mut().take();
    if let Some(cb) = cb {
        cb(result);
    }
}

fn download(blob: &Blob, filename: &str) -> Result<()> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| EngineError::ExportFailed("no document".into()))?;
    let url = Url::create_object_url_with_blob(blob)?;
    let anchor = document
        .create_element("a")?
        .dyn_into::<HtmlAnchorElement>()
        .map_err(|_| EngineError::ExportFailed("anchor element unavailable".into()))?;
    anchor.set_href(&url);
    anchor.set_download(filename);
    anchor.click();
    Url::revoke_object_url(&url)?;
    Ok(())
}
