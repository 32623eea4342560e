//! Console metadata (`admin.json`) and the registry of object descriptors.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::object::{ObjectDescriptor, ObjectSpec};
use crate::serde_util::null_as_default;

/// Site-level settings published with the metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteInfo {
    #[serde(default)]
    pub sitename: String,
    #[serde(default)]
    pub slogan: String,
    #[serde(default)]
    pub favicon_url: String,
    #[serde(default)]
    pub dashboard: String,
    #[serde(default)]
    pub api_host: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteInfo {
    /// Title shown for the console: `sitename | slogan`.
    pub fn title(&self) -> String {
        match (self.sitename.is_empty(), self.slogan.is_empty()) {
            (false, false) => format!("{} | {}", self.sitename, self.slogan),
            (false, true) => self.sitename.clone(),
            (true, false) => self.slogan.clone(),
            (true, true) => String::new(),
        }
    }
}

/// The signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub is_staff: bool,
}

impl UserInfo {
    /// First name, falling back to the email address.
    pub fn name(&self) -> &str {
        if self.first_name.is_empty() {
            &self.email
        } else {
            &self.first_name
        }
    }
}

/// Response of `POST ./admin.json`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminMeta {
    #[serde(default)]
    pub site: SiteInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user: UserInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub objects: Vec<ObjectSpec>,
}

impl AdminMeta {
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }
}

/// All object descriptors of a console, in published order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectRegistry {
    objects: Vec<ObjectDescriptor>,
}

impl ObjectRegistry {
    pub fn from_specs<I>(specs: I) -> Self
    where
        I: IntoIterator<Item = ObjectSpec>,
    {
        let objects: Vec<ObjectDescriptor> =
            specs.into_iter().map(ObjectDescriptor::from_spec).collect();
        tracing::debug!(count = objects.len(), "object registry built");
        Self { objects }
    }

    pub fn iter(&self) -> impl Iterator<Item = &ObjectDescriptor> {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Look an object up by name (case-insensitive) or by its path.
    pub fn get(&self, name_or_path: &str) -> Option<&ObjectDescriptor> {
        self.objects.iter().find(|object| {
            object.name.eq_ignore_ascii_case(name_or_path) || object.path == name_or_path
        })
    }

    /// Visible objects grouped by their `group`, groups in first-seen order.
    pub fn groups(&self) -> Vec<(&str, Vec<&ObjectDescriptor>)> {
        let mut groups: Vec<(&str, Vec<&ObjectDescriptor>)> = Vec::new();
        for object in self.objects.iter().filter(|object| !object.invisible) {
            match groups
                .iter_mut()
                .find(|(name, _)| *name == object.group.as_str())
            {
                Some((_, items)) => items.push(object),
                None => groups.push((object.group.as_str(), vec![object])),
            }
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const META: &str = r#"{
        "site": {"sitename": "Carrot", "slogan": "Admin", "copyright": "2024"},
        "user": {"email": "root@example.com", "isStaff": true},
        "objects": [
            {"group": "Settings", "name": "User", "path": "/admin/user/", "fields": []},
            {"group": "Content", "name": "Page", "path": "/admin/page/", "fields": null},
            {"group": "Settings", "name": "Config", "path": "/admin/config/", "invisible": true},
            {"group": "Settings", "name": "Group", "path": "/admin/group/"}
        ]
    }"#;

    #[test]
    fn parses_metadata() {
        let meta = AdminMeta::from_json(META).unwrap();
        assert_eq!(meta.site.title(), "Carrot | Admin");
        assert_eq!(meta.site.extra.get("copyright").unwrap(), "2024");
        assert_eq!(meta.user.name(), "root@example.com");
        assert_eq!(meta.objects.len(), 4);
    }

    #[test]
    fn registry_lookup_and_groups() {
        let meta = AdminMeta::from_json(META).unwrap();
        let registry = ObjectRegistry::from_specs(meta.objects);
        assert_eq!(registry.get("user").unwrap().name, "User");
        assert_eq!(registry.get("/admin/page/").unwrap().name, "Page");
        assert!(registry.get("nope").is_none());

        let groups = registry.groups();
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, "Settings");
        let names: Vec<&str> = groups[0].1.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["User", "Group"]);
    }
}
