use admin_model::display::value_text;
use admin_model::field::{foreign_label, same_value};
use admin_model::{Choice, DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{ControlEvent, ControlState, FieldEdit, INPUT_CLASS, Widget, render_text};

/// Select over the options published by a foreign-key lookup endpoint.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForeignKeyWidget;

fn is_unset(value: &Value) -> bool {
    match value {
        Value::Null | Value::Bool(false) => true,
        Value::String(text) => text.is_empty(),
        Value::Number(number) => number.as_i64() == Some(0),
        _ => false,
    }
}

/// `<option>` list with a disabled placeholder first.
pub(crate) fn select_element(
    field: &Field,
    placeholder: &str,
    choices: &[Choice],
    selected: &Value,
) -> Element {
    let mut select = Element::new("select")
        .attr("name", field.name.as_str())
        .class(INPUT_CLASS);
    select.push(
        Element::new("option")
            .attr("value", "")
            .attr("disabled", "disabled")
            .text(field.placeholder.as_deref().unwrap_or(placeholder)),
    );
    for choice in choices {
        let mut option = Element::new("option")
            .attr("value", value_text(&choice.value))
            .text(choice.display_label());
        if !selected.is_null() && same_value(&choice.value, selected) {
            option.set_attr("selected", "selected");
        }
        select.push(option);
    }
    select
}

/// Resolve a selected option text back to the typed choice value.
pub(crate) fn choose(choices: &[Choice], text: String) -> Value {
    choices
        .iter()
        .find(|choice| value_text(&choice.value) == text)
        .map_or(Value::String(text), |choice| choice.value.clone())
}

impl Widget for ForeignKeyWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::ForeignKey
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        render_text(target, &foreign_label(value));
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let options = edit.control.options.as_deref().unwrap_or_default();
        let mut select = select_element(field, "Select a value", options, &edit.value);
        if edit.control.options.is_none() {
            select.set_attr("aria-busy", "true");
        }
        target.push(select);
    }

    fn edit_value(&self, _field: &Field, value: &Value) -> Value {
        match value {
            Value::Object(map) => map.get("value").cloned().unwrap_or(Value::Null),
            other => other.clone(),
        }
    }

    fn handle(
        &self,
        field: &Field,
        edit: &FieldEdit,
        _original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        match event {
            ControlEvent::OptionsLoaded(items) => {
                let value = match items.first() {
                    Some(first) if is_unset(&edit.value) => {
                        tracing::debug!(field = %field.name, "selecting first foreign option");
                        first.value.clone()
                    }
                    _ => edit.value.clone(),
                };
                FieldEdit {
                    value,
                    control: ControlState {
                        options: Some(items),
                        ..edit.control.clone()
                    },
                }
            }
            ControlEvent::Changed(text) => {
                let options = edit.control.options.as_deref().unwrap_or_default();
                FieldEdit {
                    value: choose(options, text),
                    control: edit.control.clone(),
                }
            }
            _ => edit.clone(),
        }
    }
}
