//! Object actions: custom operations and the synthetic delete.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Name of the delete action appended when deletion is permitted.
pub const DELETE_ACTION: &str = "Delete";

/// HTTP method of an action call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    #[default]
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            _ => Err(format!("Unsupported method: {s}")),
        }
    }
}

/// Action descriptor as published in `admin.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionSpec {
    #[serde(default)]
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub without_object: bool,
    #[serde(default)]
    pub batch: bool,
}

/// An action ready to be invoked on selected rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub label: String,
    pub method: Method,
    /// Endpoint, already resolved against the object path.
    pub path: String,
    pub class: Option<String>,
    pub icon: Option<String>,
    /// Send every key in one request instead of one request per key.
    pub batch: bool,
}

impl Action {
    /// Resolve a published action against its object's path.
    pub fn resolve(spec: ActionSpec, object_path: &str) -> Self {
        let path = if spec.path.is_empty() {
            object_path.to_string()
        } else {
            format!("{object_path}{}", spec.path)
        };
        let method = match spec.method.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|err| {
                tracing::warn!(action = %spec.name, "{err}, using POST");
                Method::Post
            }),
            None => Method::Post,
        };
        let label = if spec.label.is_empty() {
            spec.name.clone()
        } else {
            spec.label
        };
        Self {
            name: spec.name,
            label,
            method,
            path,
            class: Some(spec.class).filter(|class| !class.is_empty()),
            icon: Some(spec.icon).filter(|icon| !icon.is_empty()),
            batch: spec.batch,
        }
    }

    /// The synthetic delete action for an object.
    pub fn delete(object_path: &str) -> Self {
        Self {
            name: DELETE_ACTION.to_string(),
            label: DELETE_ACTION.to_string(),
            method: Method::Delete,
            path: object_path.to_string(),
            class: Some("danger".to_string()),
            icon: None,
            batch: false,
        }
    }

    pub fn is_delete(&self) -> bool {
        self.method == Method::Delete && self.name == DELETE_ACTION
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_path_and_defaults() {
        let spec = ActionSpec {
            path: "toggle_enabled".to_string(),
            name: "Toggle enabled".to_string(),
            ..ActionSpec::default()
        };
        let action = Action::resolve(spec, "/admin/user/");
        assert_eq!(action.path, "/admin/user/toggle_enabled");
        assert_eq!(action.label, "Toggle enabled");
        assert_eq!(action.method, Method::Post);
        assert!(!action.batch);
    }

    #[test]
    fn empty_path_targets_object() {
        let spec = ActionSpec {
            name: "Export".to_string(),
            method: Some("get".to_string()),
            batch: true,
            ..ActionSpec::default()
        };
        let action = Action::resolve(spec, "/admin/user/");
        assert_eq!(action.path, "/admin/user/");
        assert_eq!(action.method, Method::Get);
        assert!(action.batch);
    }

    #[test]
    fn delete_action() {
        let action = Action::delete("/admin/group/");
        assert!(action.is_delete());
        assert_eq!(action.method, Method::Delete);
    }
}
