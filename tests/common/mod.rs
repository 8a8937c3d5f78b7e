//! Shared builders for integration tests.

use scim_core::resource::Resource;
use scim_core::schema::SchemaRegistry;
use serde_json::json;

pub const USER_SCHEMA: &str = "urn:ietf:params:scim:schemas:core:2.0:User";
pub const ENTERPRISE_SCHEMA: &str = "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User";

pub fn registry() -> SchemaRegistry {
    SchemaRegistry::new().expect("embedded schemas load")
}

pub fn user_resource(registry: &SchemaRegistry) -> Resource {
    Resource::new(registry.resource_type("User").unwrap().clone())
}

/// A user with the identifying attributes every response carries.
pub fn minimal_user(registry: &SchemaRegistry) -> Resource {
    let mut user = user_resource(registry);
    user.add_path("schemas", &json!([USER_SCHEMA])).unwrap();
    user.replace_path("id", &json!("a1")).unwrap();
    user.replace_path("userName", &json!("bob")).unwrap();
    user
}
