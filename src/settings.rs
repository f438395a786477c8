//! Typed, closed property bags attached to elements.
//!
//! Each element variant declares its settings up front; the set of keys never
//! grows afterwards. Values keep their declared shape: writing a number into a
//! boolean entry, or a choice outside its valid set, is rejected.
//!
//! Host UI code usually speaks JSON, so [`Settings::set_json`] coerces a
//! `serde_json::Value` into the existing entry's shape.

#[cfg(test)]
#[path = "settings_test.rs"]
mod settings_test;

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Reference to a loaded image by source URL plus its natural size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    pub width: f64,
    pub height: f64,
}

/// A single setting value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum SettingValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// String with a hint for the host UI to offer a multi-line editor.
    ExtendedText { value: String, multiline: bool },
    /// One selection out of a fixed set of options.
    Choice { options: Vec<String>, selected: String },
    Image(Option<ImageRef>),
}

impl SettingValue {
    /// Build a choice, falling back to the first option if `selected` is not valid.
    #[must_use]
    pub fn choice(options: &[&str], selected: &str) -> Self {
        let options: Vec<String> = options.iter().map(|o| (*o).to_owned()).collect();
        let selected = if options.iter().any(|o| o == selected) {
            selected.to_owned()
        } else {
            options.first().cloned().unwrap_or_default()
        };
        Self::Choice { options, selected }
    }

    #[must_use]
    pub fn extended(value: &str, multiline: bool) -> Self {
        Self::ExtendedText { value: value.to_owned(), multiline }
    }

    /// String content of text-like values (text, extended text, choice).
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::ExtendedText { value, .. } => Some(value),
            Self::Choice { selected, .. } => Some(selected),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Self::Text(_) => "text",
            Self::Number(_) => "number",
            Self::Bool(_) => "bool",
            Self::ExtendedText { .. } => "extended text",
            Self::Choice { .. } => "choice",
            Self::Image(_) => "image",
        }
    }

    /// Replace this value with `incoming`, keeping the declared shape.
    ///
    /// Plain and extended strings accept each other's content; a choice keeps
    /// its option list and only accepts one of its options.
    fn assign(&mut self, key: &str, incoming: SettingValue) -> Result<()> {
        match (self, incoming) {
            (Self::Text(cur), Self::Text(s) | Self::ExtendedText { value: s, .. }) => *cur = s,
            (Self::ExtendedText { value, .. }, Self::Text(s) | Self::ExtendedText { value: s, .. }) => *value = s,
            (Self::Number(cur), Self::Number(n)) => {
                if !n.is_finite() {
                    return Err(EngineError::invalid(key, "number must be finite"));
                }
                *cur = n;
            }
            (Self::Bool(cur), Self::Bool(b)) => *cur = b,
            (Self::Choice { options, selected }, Self::Text(s) | Self::Choice { selected: s, .. }) => {
                if !options.iter().any(|o| *o == s) {
                    return Err(EngineError::invalid(key, format!("{s:?} is not one of {options:?}")));
                }
                *selected = s;
            }
            (Self::Image(cur), Self::Image(img)) => *cur = img,
            (cur, other) => {
                return Err(EngineError::invalid(
                    key,
                    format!("expected {}, got {}", cur.kind_name(), other.kind_name()),
                ));
            }
        }
        Ok(())
    }

    /// Interpret a JSON value in the shape of `self`.
    fn coerce_json(&self, key: &str, json: &serde_json::Value) -> Result<SettingValue> {
        let bad = || EngineError::invalid(key, format!("expected {}, got {json}", self.kind_name()));
        let value = match self {
            Self::Text(_) | Self::ExtendedText { .. } | Self::Choice { .. } => {
                SettingValue::Text(json.as_str().ok_or_else(bad)?.to_owned())
            }
            Self::Number(_) => SettingValue::Number(json.as_f64().ok_or_else(bad)?),
            Self::Bool(_) => SettingValue::Bool(json.as_bool().ok_or_else(bad)?),
            Self::Image(_) => {
                if json.is_null() {
                    SettingValue::Image(None)
                } else {
                    let img: ImageRef = serde_json::from_value(json.clone()).map_err(|_| bad())?;
                    SettingValue::Image(Some(img))
                }
            }
        };
        Ok(value)
    }
}

/// Ordered, closed map of settings keyed by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    entries: Vec<(String, SettingValue)>,
}

impl Settings {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare an entry. Used while building a variant's schema.
    #[must_use]
    pub fn with(mut self, key: &str, value: SettingValue) -> Self {
        if let Some(slot) = self.get_mut(key) {
            *slot = value;
        } else {
            self.entries.push((key.to_owned(), value));
        }
        self
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k == key)
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SettingValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn get_mut(&mut self, key: &str) -> Option<&mut SettingValue> {
        self.entries.iter_mut().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Write a typed value into an existing entry.
    ///
    /// # Errors
    ///
    /// `UnknownProperty` if the key was never declared, `InvalidValue` if the
    /// value does not fit the entry's shape.
    pub fn set(&mut self, key: &str, value: SettingValue) -> Result<()> {
        let slot = self
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownProperty(key.to_owned()))?;
        slot.assign(key, value)
    }

    /// Write a JSON value into an existing entry, coercing it to the entry's shape.
    ///
    /// # Errors
    ///
    /// Same as [`Settings::set`].
    pub fn set_json(&mut self, key: &str, json: &serde_json::Value) -> Result<()> {
        let slot = self
            .get_mut(key)
            .ok_or_else(|| EngineError::UnknownProperty(key.to_owned()))?;
        let value = slot.coerce_json(key, json)?;
        slot.assign(key, value)
    }

    #[must_use]
    pub fn str(&self, key: &str) -> &str {
        self.get(key).and_then(SettingValue::as_str).unwrap_or("")
    }

    #[must_use]
    pub fn f64(&self, key: &str) -> f64 {
        self.get(key).and_then(SettingValue::as_f64).unwrap_or(0.0)
    }

    #[must_use]
    pub fn bool(&self, key: &str) -> bool {
        self.get(key).and_then(SettingValue::as_bool).unwrap_or(false)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
