//! Resource type definitions binding schemas to endpoints.

use super::types::{Attribute, AttributeType, Schema};
use crate::path::compile::CompiledPath;
use std::collections::HashMap;
use std::sync::Arc;

/// Reference to an extension schema within a resource type.
#[derive(Debug, Clone)]
pub struct SchemaExtension {
    /// URN of the extension schema
    pub schema: String,
    /// Whether the extension must be present on every resource
    pub required: bool,
}

/// Metadata binding a base schema and optional extension schemas to an
/// endpoint, e.g. User at `/Users`.
///
/// Construction derives the compound root attribute every [`Resource`] of
/// this type is built from: the base schema's attributes in declaration
/// order followed by one complex container per extension schema, named by
/// the extension's URN. It also pre-compiles the path of every attribute ID
/// so serialization-time ancestry lookups are plain map reads.
///
/// [`Resource`]: crate::resource::Resource
#[derive(Debug)]
pub struct ResourceType {
    /// Resource type name, e.g. `User`
    pub name: String,
    /// Human-readable description
    pub description: String,
    /// HTTP endpoint, e.g. `/Users`
    pub endpoint: String,
    /// URN of the base schema
    pub schema: String,
    /// Extension schema references
    pub schema_extensions: Vec<SchemaExtension>,
    root: Arc<Attribute>,
    extensions: Vec<Arc<Attribute>>,
    path_index: HashMap<String, Arc<CompiledPath>>,
}

impl ResourceType {
    /// Build a resource type from its base schema and extensions.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        endpoint: impl Into<String>,
        base: &Arc<Schema>,
        extensions: &[(Arc<Schema>, bool)],
    ) -> Self {
        let name = name.into();

        let mut sub_attributes: Vec<Arc<Attribute>> = base.attributes.clone();
        let mut extension_containers = Vec::with_capacity(extensions.len());
        for (schema, required) in extensions {
            let container = Arc::new(Attribute {
                id: schema.id.clone(),
                name: schema.id.clone(),
                data_type: AttributeType::Complex,
                multi_valued: false,
                required: *required,
                case_exact: false,
                mutability: Default::default(),
                returned: Default::default(),
                uniqueness: Default::default(),
                canonical_values: Vec::new(),
                reference_types: Vec::new(),
                sub_attributes: schema.attributes.clone(),
                annotations: Vec::new(),
            });
            extension_containers.push(container.clone());
            sub_attributes.push(container);
        }

        let root = Arc::new(Attribute {
            id: base.id.clone(),
            name: name.clone(),
            data_type: AttributeType::Complex,
            multi_valued: false,
            required: false,
            case_exact: false,
            mutability: Default::default(),
            returned: Default::default(),
            uniqueness: Default::default(),
            canonical_values: Vec::new(),
            reference_types: Vec::new(),
            sub_attributes,
            annotations: Vec::new(),
        });

        let mut path_index = HashMap::new();
        for attr in &root.sub_attributes {
            Self::index_paths(attr, &mut Vec::new(), &mut path_index);
        }
        log::debug!(
            "resource type '{}' compiled {} attribute paths",
            name,
            path_index.len()
        );

        Self {
            name,
            description: description.into(),
            endpoint: endpoint.into(),
            schema: base.id.clone(),
            schema_extensions: extensions
                .iter()
                .map(|(schema, required)| SchemaExtension {
                    schema: schema.id.clone(),
                    required: *required,
                })
                .collect(),
            root,
            extensions: extension_containers,
            path_index,
        }
    }

    fn index_paths(
        attr: &Arc<Attribute>,
        chain: &mut Vec<Arc<Attribute>>,
        index: &mut HashMap<String, Arc<CompiledPath>>,
    ) {
        chain.push(attr.clone());
        index.insert(
            attr.id.clone(),
            Arc::new(CompiledPath::new(chain.clone())),
        );
        for sub in &attr.sub_attributes {
            Self::index_paths(sub, chain, index);
        }
        chain.pop();
    }

    /// The compound complex attribute resources of this type are built from.
    pub fn root_attribute(&self) -> &Arc<Attribute> {
        &self.root
    }

    /// The pre-compiled path for an attribute ID.
    ///
    /// # Panics
    ///
    /// Panics when the ID does not belong to this resource type; attribute
    /// IDs are stable and finite, so a miss is a programmer error.
    pub fn must_path(&self, attribute_id: &str) -> &Arc<CompiledPath> {
        self.path_index
            .get(attribute_id)
            .unwrap_or_else(|| panic!("no compiled path for attribute '{attribute_id}'"))
    }

    /// Split a leading schema URN off a path, returning the extension
    /// container the remainder resolves in (`None` for the base schema).
    pub(crate) fn split_schema_urn<'a>(
        &self,
        path: &'a str,
    ) -> Option<(Option<&Arc<Attribute>>, &'a str)> {
        for container in &self.extensions {
            if let Some(rest) = split_urn(path, &container.id) {
                return Some((Some(container), rest));
            }
        }
        split_urn(path, &self.schema).map(|rest| (None, rest))
    }
}

fn split_urn<'a>(path: &'a str, urn: &str) -> Option<&'a str> {
    if path.len() < urn.len()
        || !path.as_bytes()[..urn.len()].eq_ignore_ascii_case(urn.as_bytes())
    {
        return None;
    }
    let rest = &path[urn.len()..];
    if rest.is_empty() {
        Some(rest)
    } else {
        rest.strip_prefix(':')
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_root_attribute_layout() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let root = user.root_attribute();
        assert_eq!(root.sub_attributes[0].name, "schemas");
        assert_eq!(root.sub_attributes[1].name, "id");
        let last = root.sub_attributes.last().unwrap();
        assert_eq!(
            last.name,
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        );
    }

    #[test]
    fn test_path_index_covers_sub_attributes() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let path = user.must_path("urn:ietf:params:scim:schemas:core:2.0:User:emails.value");
        assert_eq!(path.len(), 2);
        assert_eq!(
            path.attributes()[0].id,
            "urn:ietf:params:scim:schemas:core:2.0:User:emails"
        );
    }

    #[test]
    #[should_panic(expected = "no compiled path")]
    fn test_must_path_panics_on_unknown_id() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();
        user.must_path("urn:example:unknown");
    }
}
