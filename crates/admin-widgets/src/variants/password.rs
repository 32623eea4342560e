use admin_model::{DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::widget::{ControlEvent, ControlState, FieldEdit, INPUT_CLASS, Widget, render_text};

/// Text shown in place of a stored password.
pub const PASSWORD_MASK: &str = "********";

/// Masked display; write-only input behind a reveal toggle.
#[derive(Debug, Clone, Copy, Default)]
pub struct PasswordWidget;

impl Widget for PasswordWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Password
    }

    fn render(&self, target: &mut Element, _field: &Field, value: &Value, _options: &DisplayOptions) {
        let set = match value {
            Value::Null => false,
            Value::String(text) => !text.is_empty(),
            _ => true,
        };
        render_text(target, if set { PASSWORD_MASK } else { "" });
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let revealed = edit.control.revealed;
        let toggle = Element::new("button")
            .attr("type", "button")
            .class("px-2.5 py-2 text-xs font-medium rounded")
            .text(if revealed {
                "Hide Password Form"
            } else {
                "Show Password Form"
            });
        let mut input = Element::new("input")
            .attr("type", "text")
            .attr("name", field.name.as_str())
            .attr("autocomplete", "off")
            .attr(
                "placeholder",
                field
                    .placeholder
                    .as_deref()
                    .unwrap_or("Type password to change"),
            )
            .class(INPUT_CLASS)
            .class("w-64");
        if !revealed {
            input.add_class("hidden");
        }
        target.push(
            Element::new("div")
                .class("flex space-x-2")
                .child(toggle)
                .child(input),
        );
    }

    fn handle(
        &self,
        _field: &Field,
        edit: &FieldEdit,
        original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        match event {
            ControlEvent::ToggleReveal if edit.control.revealed => FieldEdit {
                value: original.clone(),
                control: ControlState::default(),
            },
            ControlEvent::ToggleReveal => FieldEdit {
                value: edit.value.clone(),
                control: ControlState {
                    revealed: true,
                    ..edit.control.clone()
                },
            },
            ControlEvent::Changed(text) if edit.control.revealed => FieldEdit {
                value: Value::String(text),
                control: edit.control.clone(),
            },
            _ => edit.clone(),
        }
    }
}
