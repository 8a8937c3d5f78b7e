//! The resource: a resource type bound to a property tree.

use crate::error::{ScimError, ScimResult};
use crate::path::compile_path;
use crate::property::{Navigator, PropertyIndex, PropertyRef, PropertyTree};
use crate::schema::ResourceType;
use serde_json::Value;
use std::sync::Arc;

/// A SCIM resource: a [`ResourceType`] bound to a root complex property.
///
/// Resources are mutable value graphs intended for single-writer,
/// single-reader-at-a-time use; higher-level services serialize access with
/// an external lock keyed by resource ID. The core provides no internal
/// locking.
///
/// # Examples
///
/// ```rust
/// use scim_core::resource::Resource;
/// use scim_core::schema::SchemaRegistry;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new()?;
/// let mut user = Resource::new(registry.resource_type("User").unwrap().clone());
/// user.replace_path("userName", &json!("bob"))?;
/// assert_eq!(user.value_at("userName")?, json!("bob"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Resource {
    resource_type: Arc<ResourceType>,
    tree: PropertyTree,
}

impl Resource {
    /// Create an unassigned resource of the given type.
    pub fn new(resource_type: Arc<ResourceType>) -> Self {
        let tree = PropertyTree::new(resource_type.root_attribute().clone());
        Self {
            resource_type,
            tree,
        }
    }

    /// The resource type this resource is bound to.
    pub fn resource_type(&self) -> &Arc<ResourceType> {
        &self.resource_type
    }

    /// The root complex property.
    pub fn root(&self) -> PropertyRef<'_> {
        PropertyRef::new(&self.tree, self.tree.root())
    }

    /// A fresh navigator focused on the root.
    pub fn navigator(&self) -> Navigator<'_> {
        Navigator::new(&self.tree, self.tree.root())
    }

    /// The underlying property tree.
    pub fn properties(&self) -> &PropertyTree {
        &self.tree
    }

    /// Mutable access to the underlying property tree. Indices obtained
    /// from a navigator or [`PropertyRef::index`] address its nodes.
    ///
    /// [`PropertyRef::index`]: crate::property::PropertyRef::index
    pub fn properties_mut(&mut self) -> &mut PropertyTree {
        &mut self.tree
    }

    /// Structural hash of the whole resource.
    pub fn hash(&self) -> u64 {
        self.tree.hash_of(self.tree.root())
    }

    /// The resource's `id` value, when assigned.
    pub fn id(&self) -> Option<String> {
        self.value_at("id")
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
    }

    /// Read the value at a dotted attribute path.
    pub fn value_at(&self, path: &str) -> ScimResult<Value> {
        Ok(self.tree.raw(self.locate(path)?))
    }

    /// Add a value at a dotted attribute path.
    pub fn add_path(&mut self, path: &str, value: &Value) -> ScimResult<()> {
        let index = self.locate(path)?;
        self.tree.add(index, value)
    }

    /// Replace the value at a dotted attribute path.
    pub fn replace_path(&mut self, path: &str, value: &Value) -> ScimResult<()> {
        let index = self.locate(path)?;
        self.tree.replace(index, value)
    }

    /// Delete the value at a dotted attribute path.
    pub fn delete_path(&mut self, path: &str) -> ScimResult<()> {
        let index = self.locate(path)?;
        self.tree.delete(index)
    }

    /// Resolve a dotted path to a property index.
    ///
    /// Paths address schema-defined properties only; descending through a
    /// multi-valued attribute requires a navigator with an index or
    /// criteria, so such paths fail with `noTarget`.
    fn locate(&self, path: &str) -> ScimResult<PropertyIndex> {
        let compiled = compile_path(path, &self.resource_type)?;
        let mut current = self.tree.root();
        for attr in compiled.attributes() {
            let next = self
                .tree
                .children(current)
                .iter()
                .copied()
                .find(|child| self.tree.attribute(*child).id == attr.id);
            current = next.ok_or_else(|| {
                ScimError::no_target(format!(
                    "path '{path}' does not address a direct property (multi-valued \
                     attributes require a navigator)"
                ))
            })?;
        }
        Ok(current)
    }
}
