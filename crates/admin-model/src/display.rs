//! HTML-safe display helpers shared by field formatting and widgets.

use std::fmt::Write;

use chrono::DateTime;
use chrono::format::{Item, StrftimeItems};
use serde_json::Value;

/// Default pattern used when rendering timestamps.
pub const DEFAULT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Text longer than this is rendered truncated in list cells.
pub const TRUNCATE_AT: usize = 40;

/// Options that affect how values are turned into display text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayOptions {
    /// `chrono` format pattern for datetime fields.
    pub datetime_format: String,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            datetime_format: DEFAULT_DATETIME_FORMAT.to_string(),
        }
    }
}

/// Escape text for safe inclusion in HTML content or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

/// The three fixed states a boolean cell can display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolIcon {
    Yes,
    No,
    Unknown,
}

impl BoolIcon {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Bool(true) => Self::Yes,
            Value::Bool(false) => Self::No,
            _ => Self::Unknown,
        }
    }

    /// State name, also used as the `data-state` attribute.
    pub const fn state(self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
            Self::Unknown => "unknown",
        }
    }

    /// Glyph shown inside the icon.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Yes => "\u{2713}",
            Self::No => "\u{2717}",
            Self::Unknown => "?",
        }
    }

    /// Complete icon markup.
    pub fn markup(self) -> String {
        format!(
            "<span class=\"bool-icon\" data-state=\"{}\">{}</span>",
            self.state(),
            self.glyph()
        )
    }
}

/// Read the timestamp text out of a datetime value.
///
/// Accepts a plain string or the nullable `{"Time": ..., "Valid": bool}`
/// object some backends emit. Empty strings, `null` and invalid nullable
/// values yield `None`.
pub fn datetime_text(value: &Value) -> Option<&str> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Object(map) => {
            let valid = map.get("Valid").and_then(Value::as_bool).unwrap_or(true);
            if !valid {
                return None;
            }
            map.get("Time")
                .and_then(Value::as_str)
                .filter(|text| !text.is_empty())
        }
        _ => None,
    }
}

/// Format a datetime value with `pattern`; empty for falsy input.
///
/// Unparseable timestamps are shown as received.
pub fn format_datetime(value: &Value, pattern: &str) -> String {
    let Some(text) = datetime_text(value) else {
        return String::new();
    };
    let Ok(timestamp) = DateTime::parse_from_rfc3339(text) else {
        return text.to_string();
    };
    let mut out = String::new();
    if write!(out, "{}", timestamp.format(pattern)).is_err() {
        tracing::debug!(pattern, "unusable datetime format");
        return text.to_string();
    }
    out
}

/// Whether `pattern` only uses specifiers `chrono` understands.
pub fn is_valid_datetime_format(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

/// Plain string conversion used for values without a richer rendering.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
