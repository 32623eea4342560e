use admin_model::display::value_text;
use admin_model::{DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{ControlEvent, FieldEdit, INPUT_CLASS, Widget, render_text, text_changed};

/// Three-row textarea for strings without a declared size.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextareaWidget;

impl Widget for TextareaWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Textarea
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        render_text(target, &value_text(value));
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let mut textarea = Element::new("textarea")
            .attr("name", field.name.as_str())
            .attr("rows", "3")
            .class(INPUT_CLASS)
            .class("w-full")
            .text(value_text(&edit.value));
        if let Some(placeholder) = &field.placeholder {
            textarea.set_attr("placeholder", placeholder.as_str());
        }
        target.push(textarea);
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
