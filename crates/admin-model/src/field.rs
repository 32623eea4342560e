//! Field metadata normalization.
//!
//! Raw field descriptors arrive from the backend as loosely typed JSON. A
//! [`Field`] is the normalized form: canonical type, parsed display size,
//! default values, value coercion (`unmarshal`), display formatting and the
//! name of the widget that should edit it.

use std::borrow::Cow;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::display::{
    BoolIcon, DisplayOptions, escape_html, format_datetime, value_text,
};
use crate::error::{ModelError, Result};

/// Declared display size inside a field tag, e.g. `size:64`.
static SIZE_TAG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"size:(\d+)").expect("Invalid size tag regex"));

/// Canonical field type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int,
    Float,
    Datetime,
    String,
    /// Any non-primitive type (structs, maps, arrays). Keeps the raw name.
    Struct(String),
}

impl FieldType {
    /// Normalize a backend type name (case-insensitive).
    ///
    /// Names containing `int` (signed or not) or `float` collapse to
    /// [`FieldType::Int`] and [`FieldType::Float`].
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let lower = trimmed.to_ascii_lowercase();
        match lower.as_str() {
            "bool" | "boolean" | "nullbool" => Self::Bool,
            "datetime" | "time" | "nulltime" | "deletedat" => Self::Datetime,
            "string" | "nullstring" => Self::String,
            name if name.contains("int") => Self::Int,
            name if name.contains("float") => Self::Float,
            _ => Self::Struct(trimmed.to_string()),
        }
    }

    /// Canonical name, also the built-in widget name for the type.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Datetime => "datetime",
            Self::String => "string",
            Self::Struct(_) => "struct",
        }
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Int | Self::Float)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a fixed choice list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub label: String,
    pub value: Value,
}

impl Choice {
    pub fn new(label: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }

    /// Label to show, falling back to the value text.
    pub fn display_label(&self) -> String {
        if self.label.is_empty() {
            value_text(&self.value)
        } else {
            self.label.clone()
        }
    }
}

/// Extra presentation attributes attached to a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub single_choice: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_widget: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<String>,
}

/// Lookup endpoint of a foreign-key field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Foreign {
    /// Endpoint returning `{items: [{value, label}]}`.
    pub path: String,
    /// Key field submitted in place of this field.
    pub field: String,
}

/// Field descriptor as published in `admin.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type", default)]
    pub type_name: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub placeholder: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub can_null: bool,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default)]
    pub is_auto_id: bool,
    #[serde(default)]
    pub not_column: bool,
    #[serde(default)]
    pub foreign: Option<Foreign>,
    #[serde(default)]
    pub attribute: Option<Attribute>,
}

/// A normalized field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: String,
    pub label: String,
    /// Upper-cased label with underscores as spaces, used for column headers.
    pub header_name: String,
    pub field_type: FieldType,
    pub placeholder: Option<String>,
    pub required: bool,
    pub primary: bool,
    pub can_null: bool,
    pub is_array: bool,
    pub is_auto_id: bool,
    pub foreign: Option<Foreign>,
    pub attribute: Option<Attribute>,
    pub tag: String,
    /// Declared display size parsed from the tag.
    pub size: Option<u32>,
}

impl Field {
    pub fn from_spec(spec: FieldSpec) -> Self {
        let field_type = FieldType::parse(&spec.type_name);
        let size = parse_size_tag(&spec.tag);
        let label = if spec.label.is_empty() {
            spec.name.clone()
        } else {
            spec.label
        };
        Self {
            header_name: label.to_uppercase().replace('_', " "),
            name: spec.name,
            label,
            field_type,
            placeholder: Some(spec.placeholder).filter(|text| !text.is_empty()),
            required: spec.required,
            primary: spec.primary,
            can_null: spec.can_null,
            is_array: spec.is_array,
            is_auto_id: spec.is_auto_id,
            foreign: spec.foreign,
            attribute: spec.attribute,
            tag: spec.tag,
            size,
        }
    }

    pub fn is_foreign(&self) -> bool {
        self.foreign.is_some()
    }

    pub fn choices(&self) -> Option<&[Choice]> {
        self.attribute
            .as_ref()
            .and_then(|attribute| attribute.choices.as_deref())
    }

    pub fn help(&self) -> Option<&str> {
        self.attribute
            .as_ref()
            .and_then(|attribute| attribute.help.as_deref())
    }

    /// Value used to pre-populate a create form.
    pub fn default_value(&self) -> Value {
        if let Some(default) = self
            .attribute
            .as_ref()
            .and_then(|attribute| attribute.default.as_ref())
        {
            return default.clone();
        }
        match self.field_type {
            FieldType::Bool => Value::Bool(false),
            FieldType::Int => Value::from(0),
            FieldType::Float => Value::from(0.0),
            FieldType::Datetime | FieldType::String => Value::String(String::new()),
            FieldType::Struct(_) => Value::Null,
        }
    }

    /// Convert a control value into the typed value sent to the backend.
    ///
    /// Returns `Ok(None)` when the value is rejected: the caller must not
    /// submit the field at all. Only the string `"true"` is coerced for
    /// booleans; every other value, including `"false"`, passes through
    /// unchanged.
    pub fn unmarshal(&self, value: &Value) -> Result<Option<Value>> {
        if value.is_null() || self.is_foreign() {
            return Ok(Some(value.clone()));
        }
        let converted = match &self.field_type {
            FieldType::Bool => match value {
                Value::String(text) if text == "true" => Some(Value::Bool(true)),
                other => Some(other.clone()),
            },
            FieldType::Int => parse_int(value).map(Value::from),
            FieldType::Float => parse_float(value)
                .and_then(Number::from_f64)
                .map(Value::Number),
            FieldType::Datetime | FieldType::String => Some(value.clone()),
            FieldType::Struct(_) => match value {
                Value::String(text) => {
                    Some(
                        serde_json::from_str(text).map_err(|err| ModelError::InvalidJson {
                            field: self.name.clone(),
                            message: err.to_string(),
                        })?,
                    )
                }
                other => Some(other.clone()),
            },
        };
        if converted.is_none() {
            tracing::debug!(field = %self.name, field_type = %self.field_type, "value rejected");
        }
        Ok(converted)
    }

    /// HTML-safe display text using default display options.
    pub fn format(&self, value: &Value) -> String {
        self.format_with(value, &DisplayOptions::default())
    }

    /// HTML-safe display text for a read-only cell.
    pub fn format_with(&self, value: &Value, options: &DisplayOptions) -> String {
        if self.choices().is_some() && !value.is_null() {
            let text = self
                .choice_label(value)
                .unwrap_or_else(|| value_text(value));
            return escape_html(&text);
        }
        if self.is_foreign() {
            return escape_html(&foreign_label(value));
        }
        match &self.field_type {
            FieldType::Bool => BoolIcon::from_value(value).markup(),
            FieldType::Datetime => escape_html(&format_datetime(value, &options.datetime_format)),
            FieldType::String => escape_html(&value_text(value)),
            _ => escape_html(&value_text(value)),
        }
    }

    /// Label of the choice matching `value`.
    pub fn choice_label(&self, value: &Value) -> Option<String> {
        self.choices()?
            .iter()
            .find(|choice| same_value(&choice.value, value))
            .map(Choice::display_label)
    }

    /// Name of the widget that should render and edit this field.
    ///
    /// Precedence: foreign key, explicit `attribute.widget`, choice list,
    /// primitive type. A string field without a declared size is edited in a
    /// textarea.
    pub fn widget_name(&self) -> Cow<'_, str> {
        let mut name: Cow<'_, str> = if self.is_foreign() {
            Cow::Borrowed("foreign")
        } else {
            Cow::Borrowed(self.field_type.as_str())
        };
        if let Some(attribute) = &self.attribute {
            if let Some(widget) = attribute.widget.as_deref().filter(|w| !w.is_empty()) {
                name = Cow::Borrowed(widget);
            } else if attribute.choices.is_some() {
                name = Cow::Borrowed("select");
            }
        }
        if name == "string" && self.size.is_none() {
            name = Cow::Borrowed("textarea");
        }
        name
    }
}

/// Extract the declared size from a tag such as `json:"name" size:64`.
pub fn parse_size_tag(tag: &str) -> Option<u32> {
    SIZE_TAG_REGEX
        .captures(tag)
        .and_then(|captures| captures.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Loose equality used to match control values against typed values:
/// `"1"` matches `1`.
pub fn same_value(left: &Value, right: &Value) -> bool {
    if left == right {
        return true;
    }
    match (left, right) {
        (Value::Object(_) | Value::Array(_), _) | (_, Value::Object(_) | Value::Array(_)) => false,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => value_text(left) == value_text(right),
    }
}

/// Display label of a foreign `{value, label}` object.
pub fn foreign_label(value: &Value) -> String {
    match value {
        Value::Object(map) => {
            let label = map.get("label").map(value_text).unwrap_or_default();
            if label.is_empty() {
                map.get("value").map(value_text).unwrap_or_default()
            } else {
                label
            }
        }
        other => value_text(other),
    }
}

/// Integer conversion with `parseInt` semantics: numbers truncate toward
/// zero and strings contribute their leading `[+-]?digits` prefix.
fn parse_int(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64().or_else(|| {
            number
                .as_f64()
                .filter(|float| float.is_finite())
                .map(|float| float.trunc() as i64)
        }),
        Value::String(text) => leading_int(text),
        _ => None,
    }
}

/// Float conversion with `parseFloat` semantics on strings.
fn parse_float(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => leading_float(text),
        _ => None,
    }
}

/// Length of the optional sign at the start of `text`.
fn sign_len(text: &str) -> usize {
    usize::from(text.starts_with(['+', '-']))
}

fn digits_len(text: &str) -> usize {
    text.bytes().take_while(u8::is_ascii_digit).count()
}

/// Parse the longest `[+-]?digits` prefix after leading whitespace.
fn leading_int(text: &str) -> Option<i64> {
    let text = text.trim_start();
    let sign = sign_len(text);
    let digits = digits_len(&text[sign..]);
    if digits == 0 {
        return None;
    }
    text[..sign + digits].parse().ok()
}

/// Parse the longest decimal prefix (sign, digits, fraction, exponent)
/// after leading whitespace.
fn leading_float(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let mut end = sign_len(text);
    let whole = digits_len(&text[end..]);
    end += whole;
    let mut fraction = 0;
    if text[end..].starts_with('.') {
        fraction = digits_len(&text[end + 1..]);
        if whole > 0 || fraction > 0 {
            end += 1 + fraction;
        }
    }
    if whole == 0 && fraction == 0 {
        return None;
    }
    let rest = &text[end..];
    if rest.starts_with(['e', 'E']) {
        let exponent_sign = sign_len(&rest[1..]);
        let exponent = digits_len(&rest[1 + exponent_sign..]);
        if exponent > 0 {
            end += 1 + exponent_sign + exponent;
        }
    }
    text[..end].parse().ok()
}
