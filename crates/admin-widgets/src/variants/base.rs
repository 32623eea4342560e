use admin_model::display::value_text;
use admin_model::{DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{
    ControlEvent, ERROR_CLASS, FieldEdit, INPUT_CLASS, Widget, render_text, text_changed,
};

/// Single line text input for strings and numbers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BaseWidget;

/// Width hint for a declared display size.
pub fn width_class(size: Option<u32>) -> Option<&'static str> {
    match size? {
        128.. => Some("w-full"),
        65..=127 => Some("w-96"),
        1..=63 => Some("w-72"),
        _ => None,
    }
}

impl Widget for BaseWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Base
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        render_text(target, &value_text(value));
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let mut input = Element::new("input")
            .attr("type", "text")
            .attr("name", field.name.as_str())
            .attr("value", value_text(&edit.value))
            .attr("autocomplete", "off")
            .class(INPUT_CLASS);
        if let Some(placeholder) = &field.placeholder {
            input.set_attr("placeholder", placeholder.as_str());
        }
        if let Some(width) = width_class(field.size) {
            input.add_class(width);
        }
        if edit.has_error() {
            input.add_class(ERROR_CLASS);
        }
        target.push(input);
    }

    fn handle(
        &self,
        _field: &Field,
        edit: &FieldEdit,
        _original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        text_changed(edit, event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_hints() {
        assert_eq!(width_class(Some(255)), Some("w-full"));
        assert_eq!(width_class(Some(128)), Some("w-full"));
        assert_eq!(width_class(Some(100)), Some("w-96"));
        assert_eq!(width_class(Some(32)), Some("w-72"));
        assert_eq!(width_class(Some(64)), None);
        assert_eq!(width_class(Some(0)), None);
        assert_eq!(width_class(None), None);
    }
}
