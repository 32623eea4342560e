//! Object descriptors: one per manageable entity type.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::action::{Action, ActionSpec};
use crate::field::{Field, FieldSpec};
use crate::keys::PrimaryKey;
use crate::query::Order;
use crate::serde_util::null_as_default;

/// Object descriptor as published in `admin.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectSpec {
    #[serde(default)]
    pub group: String,
    pub name: String,
    #[serde(default)]
    pub desc: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub plural_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldSpec>,
    /// Listed columns. Absent or null lists every field.
    #[serde(default)]
    pub shows: Option<Vec<String>>,
    /// Form fields. Absent or null lists every field.
    #[serde(default)]
    pub editables: Option<Vec<String>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub searchables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub filterables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orderables: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requireds: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub orders: Vec<Order>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub primary_keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub unique_keys: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub permissions: Permissions,
    #[serde(default, deserialize_with = "null_as_default")]
    pub actions: Vec<ActionSpec>,
    #[serde(default)]
    pub invisible: bool,
}

/// Permission flags granted to the current user. Consumed, never enforced.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Permissions(BTreeMap<String, bool>);

impl Permissions {
    pub fn allows(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn can_create(&self) -> bool {
        self.allows("can_create")
    }

    pub fn can_update(&self) -> bool {
        self.allows("can_update")
    }

    pub fn can_delete(&self) -> bool {
        self.allows("can_delete")
    }

    pub fn can_action(&self) -> bool {
        self.allows("can_action")
    }

    #[must_use]
    pub fn with(mut self, name: impl Into<String>, granted: bool) -> Self {
        self.0.insert(name.into(), granted);
        self
    }
}

/// A manageable entity type with its normalized fields.
///
/// Derived subsets are stored as indices into `fields` so every subset
/// refers to the same field definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDescriptor {
    pub name: String,
    pub desc: String,
    pub group: String,
    pub path: String,
    pub plural_name: String,
    pub invisible: bool,
    pub permissions: Permissions,
    /// Orders applied by the backend when the query sends none.
    pub default_orders: Vec<Order>,
    fields: Vec<Field>,
    shows: Vec<usize>,
    editables: Vec<usize>,
    searchables: Vec<usize>,
    filterables: Vec<usize>,
    orderables: Vec<usize>,
    key_names: Vec<String>,
    actions: Vec<Action>,
}

impl ObjectDescriptor {
    pub fn from_spec(spec: ObjectSpec) -> Self {
        let fields: Vec<Field> = spec
            .fields
            .into_iter()
            .map(|field_spec| {
                let required = spec.requireds.contains(&field_spec.name);
                let mut field = Field::from_spec(field_spec);
                field.required |= required;
                field
            })
            .collect();

        let resolve = |subset: &str, names: &[String]| -> Vec<usize> {
            names
                .iter()
                .filter_map(|name| {
                    let index = fields.iter().position(|field| &field.name == name);
                    if index.is_none() {
                        tracing::debug!(object = %spec.name, subset, field = %name, "dropping unknown field");
                    }
                    index
                })
                .collect()
        };
        let all = || (0..fields.len()).collect::<Vec<_>>();
        let shows = spec
            .shows
            .as_deref()
            .map_or_else(all, |names| resolve("shows", names));
        let editables = spec
            .editables
            .as_deref()
            .map_or_else(all, |names| resolve("editables", names));
        let searchables = resolve("searchables", &spec.searchables);
        let filterables = resolve("filterables", &spec.filterables);
        let orderables = resolve("orderables", &spec.orderables);

        let key_names = if spec.primary_keys.is_empty() {
            spec.unique_keys
        } else {
            spec.primary_keys
        };

        let mut actions: Vec<Action> = spec
            .actions
            .into_iter()
            .filter(|action| !action.without_object)
            .map(|action| Action::resolve(action, &spec.path))
            .collect();
        if spec.permissions.can_delete() {
            actions.push(Action::delete(&spec.path));
        }

        Self {
            name: spec.name,
            desc: spec.desc,
            group: spec.group,
            path: spec.path,
            plural_name: spec.plural_name,
            invisible: spec.invisible,
            permissions: spec.permissions,
            default_orders: spec.orders,
            fields,
            shows,
            editables,
            searchables,
            filterables,
            orderables,
            key_names,
            actions,
        }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn shows(&self) -> impl Iterator<Item = &Field> + '_ {
        self.subset(&self.shows)
    }

    pub fn editables(&self) -> impl Iterator<Item = &Field> + '_ {
        self.subset(&self.editables)
    }

    pub fn searchables(&self) -> impl Iterator<Item = &Field> + '_ {
        self.subset(&self.searchables)
    }

    pub fn filterables(&self) -> impl Iterator<Item = &Field> + '_ {
        self.subset(&self.filterables)
    }

    pub fn orderables(&self) -> impl Iterator<Item = &Field> + '_ {
        self.subset(&self.orderables)
    }

    pub fn is_orderable(&self, name: &str) -> bool {
        self.orderables().any(|field| field.name == name)
    }

    pub fn is_filterable(&self, name: &str) -> bool {
        self.filterables().any(|field| field.name == name)
    }

    /// Whether a keyword search box applies to this object.
    pub fn show_search(&self) -> bool {
        !self.searchables.is_empty()
    }

    pub fn show_filter(&self) -> bool {
        !self.filterables.is_empty()
    }

    /// `primaryKeys`, or `uniqueKeys` when no primary key is declared.
    pub fn key_names(&self) -> &[String] {
        &self.key_names
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    pub fn action(&self, name: &str) -> Option<&Action> {
        self.actions
            .iter()
            .find(|action| action.name.eq_ignore_ascii_case(name))
    }

    pub fn delete_action(&self) -> Option<&Action> {
        self.actions.iter().find(|action| action.is_delete())
    }

    /// Extract the key identifying `row`.
    ///
    /// Foreign-key fields are submitted under their foreign key field name
    /// with the nested `value`. Keys absent from the row are skipped.
    pub fn primary_value(&self, row: &Map<String, Value>) -> PrimaryKey {
        let mut key = PrimaryKey::new();
        for name in &self.key_names {
            let Some(value) = row.get(name) else {
                continue;
            };
            match self.field(name).and_then(|field| field.foreign.as_ref()) {
                Some(foreign) => {
                    let nested = value.get("value").cloned().unwrap_or(Value::Null);
                    key.insert(foreign.field.clone(), nested);
                }
                None => key.insert(name.clone(), value.clone()),
            }
        }
        key
    }

    /// Title of the create or edit form.
    pub fn edit_title(&self, create: bool) -> String {
        if create {
            format!("Add {}", self.name)
        } else {
            format!("Edit {}", self.name)
        }
    }

    fn subset<'a>(&'a self, indices: &'a [usize]) -> impl Iterator<Item = &'a Field> + 'a {
        indices.iter().map(move |&index| &self.fields[index])
    }
}
