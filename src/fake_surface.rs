//! In-memory surface for tests: fixed-advance text measurement and a log of
//! every drawing call.

use crate::error::Result;
use crate::settings::ImageRef;
use crate::surface::{Shadow, Surface, TextAlign, TextMeasure};

/// Every glyph advances by this fraction of the font size.
pub const GLYPH_ADVANCE: f64 = 0.5;

/// Extract the pixel size from a CSS font string like `"32px Impact"`.
pub fn font_px(font: &str) -> f64 {
    let number = font.split("px").next().unwrap_or_default();
    number.trim().parse::<f64>().unwrap_or(10.0)
}

/// Width of `text` under [`FixedMeasure`].
pub fn width_of(font_size: f64, text: &str) -> f64 {
    text.chars().count() as f64 * font_size * GLYPH_ADVANCE
}

/// Monospace measurement: every character is `font_size * GLYPH_ADVANCE` wide.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixedMeasure;

impl TextMeasure for FixedMeasure {
    fn text_width(&self, font: &str, text: &str) -> f64 {
        width_of(font_px(font), text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    Save,
    Restore,
    Translate(f64, f64),
    Rotate(f64),
    Fill(String),
    Stroke(String, f64),
    Dash(Vec<f64>),
    Shadow(Option<Shadow>),
    FillRect(f64, f64, f64, f64),
    StrokeRect(f64, f64, f64, f64),
    Line((f64, f64), (f64, f64)),
    Circle(f64, f64, f64),
    Image(String, f64, f64, f64, f64),
    TextStyle(String, TextAlign),
    FillText(String, f64, f64),
    StrokeText(String, f64, f64),
}

#[derive(Debug, Default)]
pub struct FakeSurface {
    pub ops: Vec<Op>,
}

impl FakeSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn position(&self, pred: impl Fn(&Op) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }

    pub fn texts(&self) -> Vec<String> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                Op::FillText(t, _, _) => Some(t.clone()),
                _ => None,
            })
            .collect()
    }
}

impl TextMeasure for FakeSurface {
    fn text_width(&self, font: &str, text: &str) -> f64 {
        FixedMeasure.text_width(font, text)
    }
}

impl Surface for FakeSurface {
    fn save(&mut self) {
        self.ops.push(Op::Save);
    }

    fn restore(&mut self) {
        self.ops.push(Op::Restore);
    }

    fn translate(&mut self, x: f64, y: f64) -> Result<()> {
        self.ops.push(Op::Translate(x, y));
        Ok(())
    }

    fn rotate(&mut self, degrees: f64) -> Result<()> {
        self.ops.push(Op::Rotate(degrees));
        Ok(())
    }

    fn set_fill(&mut self, color: &str) {
        self.ops.push(Op::Fill(color.to_owned()));
    }

    fn set_stroke(&mut self, color: &str, width: f64) {
        self.ops.push(Op::Stroke(color.to_owned(), width));
    }

    fn set_line_dash(&mut self, segments: &[f64]) -> Result<()> {
        self.ops.push(Op::Dash(segments.to_vec()));
        Ok(())
    }

    fn set_shadow(&mut self, shadow: Option<&Shadow>) {
        self.ops.push(Op::Shadow(shadow.cloned()));
    }

    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::FillRect(x, y, w, h));
    }

    fn stroke_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        self.ops.push(Op::StrokeRect(x, y, w, h));
    }

    fn line(&mut self, from: (f64, f64), to: (f64, f64)) {
        self.ops.push(Op::Line(from, to));
    }

    fn circle(&mut self, cx: f64, cy: f64, r: f64) -> Result<()> {
        self.ops.push(Op::Circle(cx, cy, r));
        Ok(())
    }

    fn draw_image(&mut self, image: &ImageRef, x: f64, y: f64, w: f64, h: f64) -> Result<()> {
        self.ops.push(Op::Image(image.src.clone(), x, y, w, h));
        Ok(())
    }

    fn set_text_style(&mut self, font: &str, align: TextAlign) {
        self.ops.push(Op::TextStyle(font.to_owned(), align));
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ops.push(Op::FillText(text.to_owned(), x, y));
        Ok(())
    }

    fn stroke_text(&mut self, text: &str, x: f64, y: f64) -> Result<()> {
        self.ops.push(Op::StrokeText(text.to_owned(), x, y));
        Ok(())
    }
}
