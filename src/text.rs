//! Text element: settings schema, sizing policy, word wrap and line rendering.
//!
//! A text element starts out auto-sized: its box hugs the measured text plus
//! padding and follows every text or font change. The first time the user
//! drags a resize handle (or a caller pre-sizes it, e.g. from a template) it
//! becomes user-sized. From then on its width is fixed and text changes only
//! reflow the wrap and refit the height.

#[cfg(test)]
#[path = "text_test.rs"]
mod text_test;

use crate::consts::LINE_HEIGHT_SCALE;
use crate::error::Result;
use crate::settings::{SettingValue, Settings};
use crate::surface::{Shadow, Surface, TextAlign, TextMeasure};
use crate::viewport::Size;

/// Setting keys for text elements.
pub mod keys {
    pub const TEXT: &str = "text";
    pub const FONT_FAMILY: &str = "font_family";
    pub const FONT_SIZE: &str = "font_size";
    pub const FILL_COLOR: &str = "fill_color";
    pub const STROKE_COLOR: &str = "stroke_color";
    pub const STROKE_WIDTH: &str = "stroke_width";
    pub const SHADOW_COLOR: &str = "shadow_color";
    pub const SHADOW_BLUR: &str = "shadow_blur";
    pub const SHADOW_OFFSET_X: &str = "shadow_offset_x";
    pub const SHADOW_OFFSET_Y: &str = "shadow_offset_y";
    pub const SHADOW_ENABLED: &str = "shadow_enabled";
    pub const ALIGN: &str = "align";
    pub const VERTICAL_ALIGN: &str = "vertical_align";
}

pub const FONT_FAMILIES: &[&str] = &["Impact", "Arial", "Helvetica", "Comic Sans MS", "Times New Roman", "Courier New"];
pub const ALIGNMENTS: &[&str] = &["left", "center", "right"];
pub const VERTICAL_ALIGNMENTS: &[&str] = &["top", "center", "bottom"];

/// Measured widths within this tolerance of the limit still fit.
const FIT_EPSILON: f64 = 1e-6;

/// Keys whose change re-measures the text block.
fn affects_layout(key: &str) -> bool {
    matches!(key, keys::TEXT | keys::FONT_FAMILY | keys::FONT_SIZE)
}

/// Vertical placement of the line block inside the content box.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Top,
    Center,
    Bottom,
}

impl VerticalAlign {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "top" => Self::Top,
            "bottom" => Self::Bottom,
            _ => Self::Center,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub(crate) settings: Settings,
    lines: Vec<String>,
    user_sized: bool,
    padding: f64,
    min_size: Size,
}

impl TextElement {
    #[must_use]
    pub fn new(padding: f64) -> Self {
        let settings = Settings::new()
            .with(keys::TEXT, SettingValue::extended("Text", true))
            .with(keys::FONT_FAMILY, SettingValue::choice(FONT_FAMILIES, "Impact"))
            .with(keys::FONT_SIZE, SettingValue::Number(40.0))
            .with(keys::FILL_COLOR, SettingValue::Text("#ffffff".into()))
            .with(keys::STROKE_COLOR, SettingValue::Text("#000000".into()))
            .with(keys::STROKE_WIDTH, SettingValue::Number(2.0))
            .with(keys::SHADOW_COLOR, SettingValue::Text("#000000".into()))
            .with(keys::SHADOW_BLUR, SettingValue::Number(4.0))
            .with(keys::SHADOW_OFFSET_X, SettingValue::Number(2.0))
            .with(keys::SHADOW_OFFSET_Y, SettingValue::Number(2.0))
            .with(keys::SHADOW_ENABLED, SettingValue::Bool(false))
            .with(keys::ALIGN, SettingValue::choice(ALIGNMENTS, "center"))
            .with(keys::VERTICAL_ALIGN, SettingValue::choice(VERTICAL_ALIGNMENTS, "center"));
        Self { settings, lines: Vec::new(), user_sized: false, padding, min_size: Size::default() }
    }

    #[must_use]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    #[must_use]
    pub fn text(&self) -> &str {
        self.settings.str(keys::TEXT)
    }

    #[must_use]
    pub fn font_size(&self) -> f64 {
        self.settings.f64(keys::FONT_SIZE).max(1.0)
    }

    /// CSS font string in effect, e.g. `"40px Impact"`.
    #[must_use]
    pub fn font(&self) -> String {
        format!("{}px {}", self.font_size(), self.settings.str(keys::FONT_FAMILY))
    }

    #[must_use]
    pub fn line_height(&self) -> f64 {
        self.font_size() * LINE_HEIGHT_SCALE
    }

    /// Wrapped lines from the most recent layout.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    #[must_use]
    pub fn padding(&self) -> f64 {
        self.padding
    }

    #[must_use]
    pub fn is_user_sized(&self) -> bool {
        self.user_sized
    }

    pub fn set_user_sized(&mut self, user_sized: bool) {
        self.user_sized = user_sized;
    }

    /// Measured text bounding box: widest single word by wrapped line count,
    /// plus padding.
    #[must_use]
    pub fn min_size(&self) -> Size {
        self.min_size
    }

    /// Recompute wrap, minimum size and (depending on the sizing state) the
    /// element's stored width/height.
    ///
    /// `key` is the setting or field that changed.
    pub fn relayout(&mut self, measure: &dyn TextMeasure, is_setting_change: bool, key: &str, size: &mut Size) {
        let font = self.font();
        let pad2 = self.padding * 2.0;
        let text = self.text().to_owned();

        let widest_word = text
            .split_whitespace()
            .map(|w| measure.text_width(&font, w))
            .fold(0.0, f64::max);

        if !self.user_sized {
            let widest_line = text
                .split('\n')
                .map(|line| measure.text_width(&font, &line.split_whitespace().collect::<Vec<_>>().join(" ")))
                .fold(0.0, f64::max);
            size.width = widest_line + pad2;
        }

        let min_width = widest_word + pad2;
        let avail = size.width.max(min_width) - pad2;
        self.lines = wrap_text(measure, &font, &text, avail);

        let content_height = self.lines.len() as f64 * self.line_height() + pad2;
        self.min_size = Size::new(min_width, content_height);

        if !self.user_sized || (is_setting_change && affects_layout(key)) {
            size.height = content_height;
        }
    }

    /// Draw the lines into a local frame whose origin is the element center.
    ///
    /// # Errors
    ///
    /// Propagates surface failures.
    pub fn draw(&self, surface: &mut dyn Surface, width: f64, height: f64) -> Result<()> {
        let s = &self.settings;
        let pad = self.padding;
        let lh = self.line_height();
        let align = TextAlign::parse(s.str(keys::ALIGN));

        let x = match align {
            TextAlign::Left => -width / 2.0 + pad,
            TextAlign::Center => 0.0,
            TextAlign::Right => width / 2.0 - pad,
        };
        let block = self.lines.len() as f64 * lh;
        let top = -height / 2.0 + pad;
        let y0 = match VerticalAlign::parse(s.str(keys::VERTICAL_ALIGN)) {
            VerticalAlign::Top => top,
            VerticalAlign::Center => top + (height - pad * 2.0 - block) / 2.0,
            VerticalAlign::Bottom => height / 2.0 - pad - block,
        };

        surface.set_text_style(&self.font(), align);

        let shadow_on = s.bool(keys::SHADOW_ENABLED);
        let stroke_width = s.f64(keys::STROKE_WIDTH);
        if shadow_on {
            surface.set_shadow(Some(&Shadow {
                color: s.str(keys::SHADOW_COLOR).to_owned(),
                blur: s.f64(keys::SHADOW_BLUR),
                offset_x: s.f64(keys::SHADOW_OFFSET_X),
                offset_y: s.f64(keys::SHADOW_OFFSET_Y),
            }));
        } else if stroke_width > 0.0 {
            surface.set_stroke(s.str(keys::STROKE_COLOR), stroke_width);
            let mut y = y0;
            for line in &self.lines {
                surface.stroke_text(line, x, y)?;
                y += lh;
            }
        }

        surface.set_fill(s.str(keys::FILL_COLOR));
        let mut y = y0;
        for line in &self.lines {
            surface.fill_text(line, x, y)?;
            y += lh;
        }

        if shadow_on {
            surface.set_shadow(None);
        }
        Ok(())
    }
}

/// Greedy word wrap.
///
/// Explicit newlines always break. Words are packed while the measured line
/// stays within `max_width`; a single word wider than `max_width` gets a line
/// of its own and is never split. Blank input lines are kept as empty lines.
#[must_use]
pub fn wrap_text(measure: &dyn TextMeasure, font: &str, text: &str, max_width: f64) -> Vec<String> {
    let mut out = Vec::new();
    for raw_line in text.split('\n') {
        let mut current = String::new();
        for word in raw_line.split_whitespace() {
            if current.is_empty() {
                current.push_str(word);
                continue;
            }
            let candidate = format!("{current} {word}");
            if measure.text_width(font, &candidate) <= max_width + FIT_EPSILON {
                current = candidate;
            } else {
                out.push(std::mem::take(&mut current));
                current.push_str(word);
            }
        }
        out.push(current);
    }
    out
}
