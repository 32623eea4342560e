//! Create and edit forms.
//!
//! A session keeps, for every editable field, the value the form was opened
//! with and the latest [`FieldEdit`] snapshot produced by the field's widget.
//! Dirtiness is never stored: it is the difference between the two.

use admin_model::field::same_value;
use admin_model::{Field, ObjectDescriptor, PrimaryKey};
use admin_widgets::{ControlEvent, FieldEdit, WidgetKind, WidgetRegistry};
use serde_json::{Map, Value};

use crate::error::{ConsoleError, Result};
use crate::query::Row;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Create,
    Edit,
}

/// One editable field of an open form.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    pub field: Field,
    pub widget: WidgetKind,
    /// Value the form was opened (or last saved) with.
    pub original: Value,
    pub edit: FieldEdit,
}

impl FieldSnapshot {
    fn open(field: &Field, registry: &WidgetRegistry, stored: &Value) -> Self {
        let widget = registry.resolve(field);
        let original = widget.widget().edit_value(field, stored);
        Self {
            field: field.clone(),
            widget,
            edit: FieldEdit::new(original.clone()),
            original,
        }
    }

    pub fn is_dirty(&self) -> bool {
        !same_value(&self.edit.value, &self.original)
    }
}

/// Values ready to submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    pub values: Map<String, Value>,
    /// Fields whose value could not be coerced to the field type.
    pub withheld: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    mode: EditMode,
    title: String,
    fields: Vec<FieldSnapshot>,
    primary: Option<PrimaryKey>,
}

impl EditSession {
    /// Blank form: every editable field starts at its default value.
    pub fn create(object: &ObjectDescriptor, registry: &WidgetRegistry) -> Self {
        let fields = object
            .editables()
            .map(|field| FieldSnapshot::open(field, registry, &field.default_value()))
            .collect();
        Self {
            mode: EditMode::Create,
            title: object.edit_title(true),
            fields,
            primary: None,
        }
    }

    /// Form bound to an existing row.
    pub fn edit(object: &ObjectDescriptor, registry: &WidgetRegistry, row: &Row) -> Self {
        let fields = object
            .editables()
            .map(|field| {
                let stored = row.data.get(&field.name).unwrap_or(&Value::Null);
                FieldSnapshot::open(field, registry, stored)
            })
            .collect();
        Self {
            mode: EditMode::Edit,
            title: object.edit_title(false),
            fields,
            primary: Some(row.key.clone()),
        }
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn primary(&self) -> Option<&PrimaryKey> {
        self.primary.as_ref()
    }

    pub fn fields(&self) -> &[FieldSnapshot] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|snapshot| snapshot.field.name == name)
    }

    /// Current value of `name`.
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.field(name).map(|snapshot| &snapshot.edit.value)
    }

    /// Overwrite both the original and current value of a field, e.g. to
    /// preset a value from a hook. The field stays clean.
    pub fn preset(&mut self, name: &str, value: Value) -> Result<()> {
        let snapshot = self.snapshot_mut(name)?;
        snapshot.original = value.clone();
        snapshot.edit = FieldEdit::new(value);
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(FieldSnapshot::is_dirty)
    }

    pub fn dirty_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|snapshot| snapshot.is_dirty())
            .map(|snapshot| snapshot.field.name.as_str())
            .collect()
    }

    pub fn has_errors(&self) -> bool {
        self.fields.iter().any(|snapshot| snapshot.edit.has_error())
    }

    /// Names of foreign-key fields whose options have not been loaded.
    pub fn pending_foreign(&self) -> Vec<&Field> {
        self.fields
            .iter()
            .filter(|snapshot| {
                snapshot.widget == WidgetKind::ForeignKey && snapshot.edit.control.options.is_none()
            })
            .map(|snapshot| &snapshot.field)
            .collect()
    }

    /// Route a control event to the field's widget and store the snapshot it
    /// returns. Returns whether the field is dirty afterwards.
    pub fn apply(&mut self, name: &str, event: ControlEvent) -> Result<bool> {
        let snapshot = self.snapshot_mut(name)?;
        let widget = snapshot.widget.widget();
        snapshot.edit = widget.handle(&snapshot.field, &snapshot.edit, &snapshot.original, event);
        Ok(snapshot.is_dirty())
    }

    /// Coerce the form values for submission.
    ///
    /// Create forms submit every field; edit forms only the dirty ones.
    pub fn payload(&self) -> Result<Payload> {
        let mut payload = Payload::default();
        let only_dirty = self.mode == EditMode::Edit;
        for snapshot in &self.fields {
            if only_dirty && !snapshot.is_dirty() {
                continue;
            }
            match snapshot.field.unmarshal(&snapshot.edit.value)? {
                Some(value) => {
                    payload.values.insert(snapshot.field.name.clone(), value);
                }
                None => payload.withheld.push(snapshot.field.name.clone()),
            }
        }
        Ok(payload)
    }

    /// Rebase the form after a successful save: current values become the
    /// originals and a created record switches the form to edit mode.
    pub fn mark_saved(&mut self, object: &ObjectDescriptor, key: PrimaryKey) {
        for snapshot in &mut self.fields {
            snapshot.original = snapshot.edit.value.clone();
            snapshot.edit.control.error = None;
        }
        if self.mode == EditMode::Create {
            self.mode = EditMode::Edit;
            self.title = object.edit_title(false);
        }
        self.primary = Some(key);
    }

    fn snapshot_mut(&mut self, name: &str) -> Result<&mut FieldSnapshot> {
        self.fields
            .iter_mut()
            .find(|snapshot| snapshot.field.name == name)
            .ok_or_else(|| ConsoleError::UnknownField(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use admin_model::{Choice, ObjectSpec};
    use serde_json::json;

    fn object() -> ObjectDescriptor {
        let spec: ObjectSpec = serde_json::from_value(json!({
            "name": "User",
            "path": "/admin/user/",
            "fields": [
                {"name": "id", "type": "uint", "primary": true},
                {"name": "age", "type": "int"},
                {"name": "enabled", "type": "bool"},
                {"name": "profile", "type": "Profile"},
                {"name": "group", "type": "uint", "foreign": {"path": "/admin/group/", "field": "group_id"}}
            ],
            "editables": ["age", "enabled", "profile", "group"],
            "primaryKeys": ["id"]
        }))
        .unwrap();
        ObjectDescriptor::from_spec(spec)
    }

    fn row(object: &ObjectDescriptor) -> Row {
        let data = json!({
            "id": 3,
            "age": 30,
            "enabled": true,
            "profile": {"bio": "hi"},
            "group": {"value": 2, "label": "Staff"}
        });
        Row::build(object, data.as_object().cloned().unwrap())
    }

    #[test]
    fn create_starts_from_defaults() {
        let object = object();
        let session = EditSession::create(&object, &WidgetRegistry::new());
        assert_eq!(session.mode(), EditMode::Create);
        assert_eq!(session.title(), "Add User");
        assert_eq!(session.value("age"), Some(&json!(0)));
        assert_eq!(session.value("enabled"), Some(&json!(false)));
        assert!(session.primary().is_none());
        assert!(!session.is_dirty());
        let payload = session.payload().unwrap();
        assert_eq!(payload.values.len(), 4);
    }

    #[test]
    fn edit_sends_only_changes() {
        let object = object();
        let mut session = EditSession::edit(&object, &WidgetRegistry::new(), &row(&object));
        assert_eq!(session.primary(), Some(&PrimaryKey::new().with("id", 3)));
        assert_eq!(session.value("group"), Some(&json!(2)));

        assert!(!session.apply("age", ControlEvent::Changed("30".into())).unwrap());
        assert!(session.apply("age", ControlEvent::Changed("42".into())).unwrap());
        assert_eq!(session.dirty_fields(), vec!["age"]);
        let payload = session.payload().unwrap();
        assert_eq!(payload.values, json!({"age": 42}).as_object().cloned().unwrap());
    }

    #[test]
    fn bad_integer_is_withheld() {
        let object = object();
        let mut session = EditSession::edit(&object, &WidgetRegistry::new(), &row(&object));
        session.apply("age", ControlEvent::Changed("abc".into())).unwrap();
        let payload = session.payload().unwrap();
        assert!(payload.values.is_empty());
        assert_eq!(payload.withheld, vec!["age".to_string()]);
    }

    #[test]
    fn malformed_struct_is_not_dirty() {
        let object = object();
        let mut session = EditSession::edit(&object, &WidgetRegistry::new(), &row(&object));
        let dirty = session.apply("profile", ControlEvent::Changed("{bad".into())).unwrap();
        assert!(!dirty);
        assert!(session.has_errors());
        assert_eq!(session.value("profile"), Some(&json!({"bio": "hi"})));
    }

    #[test]
    fn foreign_options_select_first_when_unset() {
        let object = object();
        let mut session = EditSession::create(&object, &WidgetRegistry::new());
        assert_eq!(session.pending_foreign().len(), 1);
        let options = vec![Choice::new("Staff", 2), Choice::new("Admin", 5)];
        let dirty = session.apply("group", ControlEvent::OptionsLoaded(options)).unwrap();
        assert!(dirty);
        assert_eq!(session.value("group"), Some(&json!(2)));
        assert!(session.pending_foreign().is_empty());
    }

    #[test]
    fn saved_create_becomes_edit() {
        let object = object();
        let mut session = EditSession::create(&object, &WidgetRegistry::new());
        session.apply("age", ControlEvent::Changed("7".into())).unwrap();
        assert!(session.is_dirty());
        session.mark_saved(&object, PrimaryKey::new().with("id", 9));
        assert_eq!(session.mode(), EditMode::Edit);
        assert_eq!(session.title(), "Edit User");
        assert!(!session.is_dirty());
        assert!(session.payload().unwrap().values.is_empty());
    }

    #[test]
    fn unknown_field_is_an_error() {
        let object = object();
        let mut session = EditSession::create(&object, &WidgetRegistry::new());
        let err = session.apply("nope", ControlEvent::Checked(true)).unwrap_err();
        assert!(matches!(err, ConsoleError::UnknownField(name) if name == "nope"));
    }
}
