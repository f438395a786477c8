//! Rendering: draws one frame of the editor to a [`Surface`].
//!
//! It receives read-only views of the element store, the selection and the
//! overlay state and produces pixels. It never mutates application state.
//!
//! Layers, bottom to top: white fill and background image, elements in
//! insertion order, then (unless exporting) selection chrome, the marquee and
//! the debug frame-rate readout.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use crate::consts::{
    CORNER_MARGIN_SCALE, FPS_FONT_PX, FPS_MARGIN_PX, MARQUEE_FILL, ROTATE_OFFSET_SCALE, SELECTION_COLOR,
    SELECTION_DASH_PX, WATERMARK_FONT_PX, WATERMARK_MARGIN_PX,
};
use crate::doc::{ElementStore, Selection};
use crate::element::{Element, HandleMetrics};
use crate::error::Result;
use crate::settings::ImageRef;
use crate::surface::{Surface, TextAlign};
use crate::viewport::{Rect, Size};

/// Everything a frame needs to know.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub store: &'a ElementStore,
    pub selection: &'a Selection,
    pub canvas: Size,
    pub background: Option<&'a ImageRef>,
    /// Normalized marquee while a selection drag is in progress.
    pub marquee: Option<Rect>,
    pub handles: HandleMetrics,
    /// False while the hide-handles modifier is held.
    pub show_handles: bool,
    /// Export frames carry no selection chrome and no debug overlay.
    pub exporting: bool,
    /// Frame rate to print; `None` outside debug mode.
    pub fps: Option<f64>,
}

/// Draw the full frame.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw(surface: &mut dyn Surface, scene: &Scene<'_>) -> Result<()> {
    // Layer 1: background.
    surface.set_fill("#ffffff");
    surface.fill_rect(0.0, 0.0, scene.canvas.width, scene.canvas.height);
    if let Some(image) = scene.background {
        surface.draw_image(image, 0.0, 0.0, scene.canvas.width, scene.canvas.height)?;
    }

    // Layer 2: elements, bottom first.
    for el in scene.store.iter() {
        surface.save();
        translate_and_rotate(surface, el)?;
        let drawn = el.draw(surface);
        surface.restore();
        drawn?;
    }

    if scene.exporting {
        return Ok(());
    }

    // Layer 3: selection UI.
    for id in scene.selection.ids() {
        if let Some(el) = scene.store.get(id) {
            draw_selection(surface, el, &scene.handles, scene.show_handles)?;
        }
    }

    if let Some(m) = scene.marquee {
        draw_marquee(surface, m)?;
    }

    if let Some(fps) = scene.fps {
        draw_fps(surface, fps)?;
    }

    Ok(())
}

/// Draw `text` in the bottom-right corner. Called right before export
/// serialization.
///
/// # Errors
///
/// Returns `Err` if any surface call fails.
pub fn draw_watermark(surface: &mut dyn Surface, canvas: Size, text: &str) -> Result<()> {
    if text.is_empty() {
        return Ok(());
    }
    let x = canvas.width - WATERMARK_MARGIN_PX;
    let y = canvas.height - WATERMARK_MARGIN_PX - WATERMARK_FONT_PX;
    surface.save();
    surface.set_text_style(&format!("{WATERMARK_FONT_PX}px Arial"), TextAlign::Right);
    surface.set_stroke("rgba(0, 0, 0, 0.6)", 2.0);
    surface.stroke_text(text, x, y)?;
    surface.set_fill("rgba(255, 255, 255, 0.8)");
    surface.fill_text(text, x, y)?;
    surface.restore();
    Ok(())
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(
    surface: &mut dyn Surface,
    el: &Element,
    metrics: &HandleMetrics,
    show_handles: bool,
) -> Result<()> {
    surface.save();
    translate_and_rotate(surface, el)?;

    let w = el.width();
    let h = el.height();
    let hw = w / 2.0;
    let hh = h / 2.0;

    // Dashed bounding box (rotated with the element).
    surface.set_stroke(SELECTION_COLOR, 1.0);
    surface.set_line_dash(&[SELECTION_DASH_PX, SELECTION_DASH_PX])?;
    surface.stroke_rect(-hw, -hh, w, h);
    surface.set_line_dash(&[])?;

    if show_handles {
        let size = metrics.size;
        let m = size * CORNER_MARGIN_SCALE;
        surface.set_fill("#ffffff");
        for (sx, sy) in [(-1.0, -1.0), (1.0, -1.0), (-1.0, 1.0), (1.0, 1.0)] {
            let cx = sx * (hw + m);
            let cy = sy * (hh + m);
            surface.fill_rect(cx - size / 2.0, cy - size / 2.0, size, size);
            surface.stroke_rect(cx - size / 2.0, cy - size / 2.0, size, size);
        }

        // Rotate handle joined to the top edge.
        let ry = -hh - size * ROTATE_OFFSET_SCALE;
        surface.line((0.0, -hh), (0.0, ry));
        surface.circle(0.0, ry, size / 2.0)?;
    }

    surface.restore();
    Ok(())
}

fn draw_marquee(surface: &mut dyn Surface, m: Rect) -> Result<()> {
    surface.save();
    surface.set_line_dash(&[SELECTION_DASH_PX, SELECTION_DASH_PX])?;
    surface.set_stroke(SELECTION_COLOR, 1.0);
    surface.set_fill(MARQUEE_FILL);
    surface.fill_rect(m.x, m.y, m.width, m.height);
    surface.stroke_rect(m.x, m.y, m.width, m.height);
    surface.set_line_dash(&[])?;
    surface.restore();
    Ok(())
}

fn draw_fps(surface: &mut dyn Surface, fps: f64) -> Result<()> {
    surface.save();
    surface.set_text_style(&format!("{FPS_FONT_PX}px monospace"), TextAlign::Left);
    surface.set_fill("#00ff00");
    surface.fill_text(&format!("{fps:.0} fps"), FPS_MARGIN_PX, FPS_MARGIN_PX)?;
    surface.restore();
    Ok(())
}

// =============================================================
// Helpers
// =============================================================

/// Translate to the element's center and rotate by its rotation angle.
fn translate_and_rotate(surface: &mut dyn Surface, el: &Element) -> Result<()> {
    let c = el.center();
    surface.translate(c.x, c.y)?;
    surface.rotate(el.rotation())?;
    Ok(())
}
