pub mod action;
pub mod display;
pub mod error;
pub mod field;
pub mod keys;
pub mod metadata;
pub mod object;
pub mod query;
mod serde_util;

pub use action::{Action, ActionSpec, DELETE_ACTION, Method};
pub use display::{BoolIcon, DisplayOptions, escape_html};
pub use error::{ModelError, Result};
pub use field::{Attribute, Choice, Field, FieldSpec, FieldType, Foreign};
pub use keys::PrimaryKey;
pub use metadata::{AdminMeta, ObjectRegistry, SiteInfo, UserInfo};
pub use object::{ObjectDescriptor, ObjectSpec, Permissions};
pub use query::{
    DEFAULT_LIMIT, Filter, FilterGroup, FilterInput, FilterOp, ForeignOptions, Order, OrderOp,
    QueryForm, QueryResponse,
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn descriptor_from_metadata() {
        let meta: AdminMeta = serde_json::from_value(json!({
            "objects": [{
                "name": "User",
                "path": "/admin/user/",
                "fields": [{"name": "email", "type": "string", "tag": "size:128"}],
                "shows": ["email"],
                "primaryKeys": ["email"]
            }]
        }))
        .expect("deserialize metadata");
        let registry = ObjectRegistry::from_specs(meta.objects);
        let user = registry.get("User").expect("user object");
        assert_eq!(user.shows().count(), 1);
        assert_eq!(user.field("email").map(|f| f.size), Some(Some(128)));
    }
}
