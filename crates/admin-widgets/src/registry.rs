//! Widget name allowlist and resolution.

use std::collections::BTreeMap;
use std::fmt;

use admin_model::Field;

use crate::variants::{
    BaseWidget, BooleanWidget, DateTimeWidget, ForeignKeyWidget, PasswordWidget, SelectWidget,
    StructWidget, TextareaWidget,
};
use crate::widget::Widget;

/// The closed set of widget variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum WidgetKind {
    Base,
    Boolean,
    Textarea,
    DateTime,
    Struct,
    ForeignKey,
    Select,
    Password,
}

impl WidgetKind {
    pub const ALL: [WidgetKind; 8] = [
        WidgetKind::Base,
        WidgetKind::Boolean,
        WidgetKind::Textarea,
        WidgetKind::DateTime,
        WidgetKind::Struct,
        WidgetKind::ForeignKey,
        WidgetKind::Select,
        WidgetKind::Password,
    ];

    pub fn widget(self) -> &'static dyn Widget {
        match self {
            Self::Base => &BaseWidget,
            Self::Boolean => &BooleanWidget,
            Self::Textarea => &TextareaWidget,
            Self::DateTime => &DateTimeWidget,
            Self::Struct => &StructWidget,
            Self::ForeignKey => &ForeignKeyWidget,
            Self::Select => &SelectWidget,
            Self::Password => &PasswordWidget,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Base => "base",
            Self::Boolean => "boolean",
            Self::Textarea => "textarea",
            Self::DateTime => "datetime",
            Self::Struct => "struct",
            Self::ForeignKey => "foreign",
            Self::Select => "select",
            Self::Password => "password",
        }
    }
}

impl fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Maps widget names to variants.
///
/// Only names present here can be selected by `attribute.widget`; anything
/// else falls back to [`WidgetKind::Struct`].
#[derive(Debug, Clone)]
pub struct WidgetRegistry {
    names: BTreeMap<String, WidgetKind>,
}

impl Default for WidgetRegistry {
    fn default() -> Self {
        let names = [
            ("string", WidgetKind::Base),
            ("int", WidgetKind::Base),
            ("float", WidgetKind::Base),
            ("bool", WidgetKind::Boolean),
            ("textarea", WidgetKind::Textarea),
            ("datetime", WidgetKind::DateTime),
            ("foreign", WidgetKind::ForeignKey),
            ("struct", WidgetKind::Struct),
            ("password", WidgetKind::Password),
            ("select", WidgetKind::Select),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();
        Self { names }
    }
}

impl WidgetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `name` as another name for an existing variant.
    ///
    /// Returns the variant previously registered under `name`, if any.
    pub fn register_alias(&mut self, name: impl Into<String>, kind: WidgetKind) -> Option<WidgetKind> {
        let name = name.into();
        tracing::debug!(widget = %name, kind = %kind, "registering widget alias");
        self.names.insert(name, kind)
    }

    pub fn lookup(&self, name: &str) -> Option<WidgetKind> {
        self.names.get(name).copied()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// Variant that renders and edits `field`.
    pub fn resolve(&self, field: &Field) -> WidgetKind {
        let name = field.widget_name();
        self.lookup(&name).unwrap_or_else(|| {
            tracing::warn!(field = %field.name, widget = %name, "widget not found, using struct widget");
            WidgetKind::Struct
        })
    }

    pub fn widget_for(&self, field: &Field) -> &'static dyn Widget {
        self.resolve(field).widget()
    }
}
