use admin_model::display::value_text;
use admin_model::{DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;
use crate::variants::foreign::{choose, select_element};
use crate::widget::{ControlEvent, ControlState, FieldEdit, Widget, render_text};

/// Select over the field's fixed choices.
#[derive(Debug, Clone, Copy, Default)]
pub struct SelectWidget;

impl Widget for SelectWidget {
    fn kind(&self) -> WidgetKind {
        WidgetKind::Select
    }

    fn render(&self, target: &mut Element, field: &Field, value: &Value, _options: &DisplayOptions) {
        let text = field
            .choice_label(value)
            .unwrap_or_else(|| value_text(value));
        render_text(target, &text);
    }

    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit) {
        target.clear();
        let choices = field.choices().unwrap_or_default();
        target.push(select_element(field, "Select an option", choices, &edit.value));
    }

    fn handle(
        &self,
        field: &Field,
        edit: &FieldEdit,
        _original: &Value,
        event: ControlEvent,
    ) -> FieldEdit {
        match event {
            ControlEvent::Changed(text) => FieldEdit {
                value: choose(field.choices().unwrap_or_default(), text),
                control: ControlState::default(),
            },
            _ => edit.clone(),
        }
    }
}
