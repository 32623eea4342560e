use admin_model::display::value_text;
use admin_model::{DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{
    ControlEvent, ControlState, ERROR_CLASS, FieldEdit, INPUT_CLASS, Widget, render_text,
};

/// JSON text for structured values; also the fallback for unknown widgets.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructWidget;

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.is_empty(),
        _ => false,
    }
}

impl Widget for StructWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Struct
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        render_text(target, &value_text(value));
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let mut textarea = Element::new("textarea")
            .attr("name", field.name.as_str())
            .attr("rows", "5")
            .class(INPUT_CLASS)
            .class("w-full");
        if !is_blank(&edit.value) {
            let pretty = serde_json::to_string_pretty(&edit.value)
                .unwrap_or_else(|_| value_text(&edit.value));
            textarea.push_text(pretty);
        }
        if let Some(placeholder) = &field.placeholder {
            textarea.set_attr("placeholder", placeholder.as_str());
        }
        if edit.has_error() {
            textarea.add_class(ERROR_CLASS);
        }
        target.push(textarea);
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
        let source = if input.trim().is_empty() { "{}" } else { input.as_str() };
        match serde_json::from_str::<Value>(source) {
            Ok(value) => FieldEdit::new(value),
            Err(err) => {
                tracing::debug!(field = %field.name, error = %err, "invalid JSON input");
                FieldEdit {
                    value: edit.value.clone(),
                    control: ControlState {
                        error: Some(err.to_string()),
                        ..edit.control.clone()
                    },
                }
            }
        }
    }
}
