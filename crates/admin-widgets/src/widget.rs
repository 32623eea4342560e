//! The widget capability and the per-field edit snapshot it produces.

use admin_model::display::TRUNCATE_AT;
use admin_model::{Choice, DisplayOptions, Field};
use serde_json::Value;

use crate::markup::Element;
use crate::registry::WidgetKind;

/// Transient state of an edit control that is not part of the value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ControlState {
    /// Validation message shown as an error ring on the control.
    pub error: Option<String>,
    /// Password inputs: whether the input is revealed.
    pub revealed: bool,
    /// Foreign-key inputs: options loaded from the lookup endpoint.
    pub options: Option<Vec<Choice>>,
}

/// Immutable snapshot of one field inside an edit form.
///
/// Widgets never mutate a snapshot; [`Widget::handle`] returns the next one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldEdit {
    pub value: Value,
    pub control: ControlState,
}

impl FieldEdit {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            control: ControlState::default(),
        }
    }

    pub fn has_error(&self) -> bool {
        self.control.error.is_some()
    }
}

/// A user interaction with an edit control.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlEvent {
    /// Text of an input, textarea or select changed.
    Changed(String),
    /// A checkbox was toggled.
    Checked(bool),
    /// The password reveal button was pressed.
    ToggleReveal,
    /// Foreign-key options arrived from the lookup endpoint.
    OptionsLoaded(Vec<Choice>),
}

/// Rendering and editing behavior shared by every widget variant.
pub trait Widget: Send + Sync {
    fn kind(&self) -> WidgetKind;

    /// Read-only representation of `value`. Replaces any prior content of
    /// `target`.
    fn render(&self, target: &mut Element, field: &Field, value: &Value, options: &DisplayOptions);

    /// Label of the edit control: required marker, label and help text.
    fn render_label(&self, target: &mut Element, field: &Field, _edit: &FieldEdit) {
        target.clear();
        push_label(target, field);
    }

    /// Interactive control bound to `edit`. Never changes the value.
    fn render_edit(&self, target: &mut Element, field: &Field, edit: &FieldEdit);

    /// Value placed in the edit form for a stored `value`.
    fn edit_value(&self, _field: &Field, value: &Value) -> Value {
        value.clone()
    }

    /// Produce the next snapshot for a user event.
    ///
    /// `original` is the value the form was opened with.
    fn handle(&self, field: &Field, edit: &FieldEdit, original: &Value, event: ControlEvent)
    -> FieldEdit;
}

/// Write `text` into `target`, marking long text as truncated.
pub(crate) fn render_text(target: &mut Element, text: &str) {
    target.clear();
    if text.is_empty() {
        return;
    }
    if text.chars().count() > TRUNCATE_AT {
        target.add_class("w-72 truncate");
        target.set_attr("title", text);
    }
    target.push_text(text);
}

pub(crate) fn push_label(target: &mut Element, field: &Field) {
    if field.required {
        target.push(Element::new("span").class("text-red-600").text("*"));
    }
    target.push(Element::new("span").class("text-gray-700").text(field.label.as_str()));
    if let Some(help) = field.help() {
        target.push(Element::new("span").class("text-gray-400 text-xs").text(help));
    }
}

/// Text input change: the value becomes the typed text.
pub(crate) fn text_changed(edit: &FieldEdit, event: ControlEvent) -> FieldEdit {
    match event {
        ControlEvent::Changed(text) => FieldEdit {
            value: Value::String(text),
            control: ControlState {
                error: None,
                ..edit.control.clone()
            },
        },
        _ => edit.clone(),
    }
}

pub(crate) const INPUT_CLASS: &str = "block rounded-md border-0 py-1.5 ring-1 ring-inset ring-gray-300";
pub(crate) const ERROR_CLASS: &str = "ring-red-600 ring-2";
