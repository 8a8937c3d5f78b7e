//! Schema registry for loading, managing, and accessing SCIM schemas.
//!
//! The registry is the process-wide hub of schemas and resource types. It is
//! populated during configuration load and read-only afterward; callers
//! typically wrap it in an `Arc` and share it freely, so no synchronization
//! is needed on the read path.

use super::embedded;
use super::resource_type::ResourceType;
use super::types::Schema;
use crate::error::{ScimError, ScimResult};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Arc;

/// Registry of SCIM schemas and resource types.
///
/// # Examples
///
/// ```rust
/// use scim_core::schema::SchemaRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new()?;
/// let user = registry.resource_type("User").unwrap();
/// assert_eq!(user.endpoint, "/Users");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Arc<Schema>>,
    resource_types: HashMap<String, Arc<ResourceType>>,
}

impl SchemaRegistry {
    /// Create a registry with the embedded core schemas.
    ///
    /// Registers the core User and Group schemas, the Enterprise User
    /// extension, and the User and Group resource types.
    pub fn new() -> ScimResult<Self> {
        Self::with_embedded_schemas()
    }

    /// Create a registry with the embedded core schemas.
    pub fn with_embedded_schemas() -> ScimResult<Self> {
        let mut registry = Self::default();
        let user = registry.add_schema(Self::load_schema_from_str(embedded::core_user_schema())?);
        let group = registry.add_schema(Self::load_schema_from_str(embedded::core_group_schema())?);
        let enterprise =
            registry.add_schema(Self::load_schema_from_str(embedded::enterprise_user_schema())?);

        registry.add_resource_type(ResourceType::new(
            "User",
            "User Account",
            "/Users",
            &user,
            &[(enterprise, false)],
        ));
        registry.add_resource_type(ResourceType::new("Group", "Group", "/Groups", &group, &[]));
        Ok(registry)
    }

    /// Create a registry by loading schemas from a directory.
    ///
    /// Expects `User.json` and `Group.json`; `EnterpriseUser.json` is picked
    /// up as a User extension when present.
    pub fn from_schema_dir<P: AsRef<Path>>(schema_dir: P) -> ScimResult<Self> {
        let dir = schema_dir.as_ref();
        let mut registry = Self::default();
        let user = registry.add_schema(Self::load_schema_from_file(&dir.join("User.json"))?);
        let group = registry.add_schema(Self::load_schema_from_file(&dir.join("Group.json"))?);

        let enterprise_path = dir.join("EnterpriseUser.json");
        let extensions = if enterprise_path.exists() {
            let enterprise = registry.add_schema(Self::load_schema_from_file(&enterprise_path)?);
            vec![(enterprise, false)]
        } else {
            Vec::new()
        };

        registry.add_resource_type(ResourceType::new(
            "User",
            "User Account",
            "/Users",
            &user,
            &extensions,
        ));
        registry.add_resource_type(ResourceType::new("Group", "Group", "/Groups", &group, &[]));
        Ok(registry)
    }

    fn load_schema_from_file(path: &Path) -> ScimResult<Schema> {
        let content = fs::read_to_string(path).map_err(|e| {
            ScimError::internal(format!("cannot read schema file {}: {e}", path.display()))
        })?;
        Self::load_schema_from_str(&content)
    }

    /// Parse a schema from its JSON representation, assigning qualified
    /// attribute IDs.
    pub fn load_schema_from_str(content: &str) -> ScimResult<Schema> {
        let mut schema: Schema = serde_json::from_str(content)
            .map_err(|e| ScimError::invalid_syntax(format!("malformed schema JSON: {e}")))?;
        schema.finalize();
        Ok(schema)
    }

    /// Register a schema, returning its shared handle.
    pub fn add_schema(&mut self, schema: Schema) -> Arc<Schema> {
        log::debug!("registered schema '{}'", schema.id);
        let schema = Arc::new(schema);
        self.schemas.insert(schema.id.clone(), schema.clone());
        schema
    }

    /// Register a resource type, returning its shared handle.
    pub fn add_resource_type(&mut self, resource_type: ResourceType) -> Arc<ResourceType> {
        log::debug!("registered resource type '{}'", resource_type.name);
        let resource_type = Arc::new(resource_type);
        self.resource_types
            .insert(resource_type.name.clone(), resource_type.clone());
        resource_type
    }

    /// Get a schema by its URN.
    pub fn schema(&self, id: &str) -> Option<&Arc<Schema>> {
        self.schemas.get(id)
    }

    /// All registered schemas.
    pub fn schemas(&self) -> impl Iterator<Item = &Arc<Schema>> {
        self.schemas.values()
    }

    /// Get a resource type by name.
    pub fn resource_type(&self, name: &str) -> Option<&Arc<ResourceType>> {
        self.resource_types.get(name)
    }

    /// All registered resource types.
    pub fn resource_types(&self) -> impl Iterator<Item = &Arc<ResourceType>> {
        self.resource_types.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_embedded_schemas_register() {
        let registry = SchemaRegistry::new().unwrap();
        assert!(registry
            .schema("urn:ietf:params:scim:schemas:core:2.0:User")
            .is_some());
        assert!(registry
            .schema("urn:ietf:params:scim:schemas:core:2.0:Group")
            .is_some());
        assert!(registry
            .schema("urn:ietf:params:scim:schemas:extension:enterprise:2.0:User")
            .is_some());
        assert!(registry.resource_type("User").is_some());
        assert!(registry.resource_type("Group").is_some());
        assert!(registry.resource_type("Device").is_none());
    }

    #[test]
    fn test_attribute_ids_are_qualified() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry
            .schema("urn:ietf:params:scim:schemas:core:2.0:User")
            .unwrap();
        let user_name = user
            .attributes
            .iter()
            .find(|a| a.name == "userName")
            .unwrap();
        assert_eq!(
            user_name.id,
            "urn:ietf:params:scim:schemas:core:2.0:User:userName"
        );
    }
}
