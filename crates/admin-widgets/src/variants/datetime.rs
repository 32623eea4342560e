use admin_model::display::{datetime_text, format_datetime};
use admin_model::{DisplayOptions, Field};
use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{
    ControlEvent, ControlState, ERROR_CLASS, FieldEdit, INPUT_CLASS, Widget, render_text,
};

/// Length of the `YYYY-MM-DDTHH:MM` text a `datetime-local` input shows.
const LOCAL_INPUT_LEN: usize = 16;

/// Formatted timestamp for display, `datetime-local` input for edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeWidget;

/// Parse datetime input into an RFC 3339 UTC string with milliseconds.
///
/// Input of exactly 16 characters is completed with `:00Z`. Timestamps
/// without an offset are read as UTC.
pub fn parse_datetime_input(input: &str) -> Option<String> {
    let mut text = input.trim().to_string();
    if text.chars().count() == LOCAL_INPUT_LEN {
        text.push_str(":00Z");
    }
    let timestamp = match DateTime::parse_from_rfc3339(&text) {
        Ok(timestamp) => timestamp.with_timezone(&Utc),
        Err(_) => ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
            .iter()
            .find_map(|pattern| NaiveDateTime::parse_from_str(&text, pattern).ok())?
            .and_utc(),
    };
    Some(timestamp.to_rfc3339_opts(SecondsFormat::Millis, true))
}

impl Widget for DateTimeWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::DateTime
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, options: &DisplayOptions) {
        render_text(target, &format_datetime(value, &options.datetime_format));
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let mut input = Element::new("input")
            .attr("type", "datetime-local")
            .attr("name", field.name.as_str())
            .class(INPUT_CLASS);
        if let Some(text) = datetime_text(&edit.value) {
            let local: String = text.chars().take(LOCAL_INPUT_LEN).collect();
            input.set_attr("value", local);
        }
        if edit.has_error() {
            input.add_class(ERROR_CLASS);
        }
        target.push(input);
    }

    fn edit_value(&self, _field: &Field, value: &Value) -> Value {
        datetime_text(value).map_or(Value::Null, |text| Value::String(text.to_string()))
    }

    fn handle(
        &self,
        field: &Field,
        edit: &FieldEdit,
        _original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        let ControlEvent::Changed(input) = event else {
            return edit.clone();
        };
        if input.trim().is_empty() {
            return FieldEdit::new(Value::Null);
        }
        match parse_datetime_input(&input) {
            Some(timestamp) => FieldEdit::new(Value::String(timestamp)),
            None => {
                tracing::debug!(field = %field.name, input = %input, "invalid datetime input");
                FieldEdit {
                    value: edit.value.clone(),
                    control: ControlState {
                        error: Some(format!("invalid datetime: {input}")),
                        ..edit.control.clone()
                    },
                }
            }
        }
    }
}
