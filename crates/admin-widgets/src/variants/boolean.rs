use admin_model::{BoolIcon, DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{ControlEvent, ControlState, FieldEdit, Widget, push_label};

/// Yes/no/unknown icon for display, a checkbox inside the label for edit.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanWidget;

impl Widget for BooleanWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Boolean
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        target.clear();
        let icon = BoolIcon::from_value(value);
        target.push(
            Element::new("span")
                .class("bool-icon")
                .attr("data-state", icon.state())
                .text(icon.glyph()),
        );
    }

    fn render_label(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        target.add_class("mt-2 flex items-center");
        let mut checkbox = Element::new("input")
            .attr("type", "checkbox")
            .attr("name", field.name.as_str())
            .class("mr-2 h-4 w-4 rounded");
        if edit.value == Value::Bool(true) {
            checkbox.set_attr("checked", "checked");
        }
        target.push(checkbox);
        push_label(target, field);
    }

    fn render_edit(&self, target: &mut Element, _field: &Field, _edit: &FieldEdit) {
        // The checkbox lives in the label.
        target.clear();
    }

    fn handle(
        &self,
        _field: &Field,
        edit: &FieldEdit,
        _original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        match event {
            ControlEvent::Checked(checked) => FieldEdit {
                value: Value::Bool(checked),
                control: ControlState::default(),
            },
            ControlEvent::Changed(text) => FieldEdit {
                value: Value::String(text),
                control: ControlState::default(),
            },
            _ => edit.clone(),
        }
    }
}
