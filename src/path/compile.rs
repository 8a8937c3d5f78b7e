//! Path compilation against a resource type.

use crate::error::{ScimError, ScimResult};
use crate::schema::{Attribute, ResourceType};
use std::sync::Arc;

/// A compiled attribute path: the attributes from the resource root to a
/// target, identified by their fully-qualified IDs.
#[derive(Debug, Clone)]
pub struct CompiledPath {
    attrs: Vec<Arc<Attribute>>,
}

impl CompiledPath {
    pub(crate) fn new(attrs: Vec<Arc<Attribute>>) -> Self {
        Self { attrs }
    }

    /// The attributes along the path, root first.
    pub fn attributes(&self) -> &[Arc<Attribute>] {
        &self.attrs
    }

    /// The attribute the path points at.
    pub fn target(&self) -> &Arc<Attribute> {
        self.attrs.last().expect("compiled path is never empty")
    }

    /// Attribute IDs along the path, root first.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.attrs.iter().map(|a| a.id.as_str())
    }

    /// Number of path segments.
    pub fn len(&self) -> usize {
        self.attrs.len()
    }

    /// Whether the path has no segments. Compilation never produces this.
    pub fn is_empty(&self) -> bool {
        self.attrs.is_empty()
    }
}

/// Compile a SCIM attribute path against a resource type.
///
/// Grammar: `path := [schemaURN ':'] name ('.' name)*`. Names resolve
/// case-insensitively. A leading schema URN selects the extension schema the
/// first name is looked up in; a path consisting of just an extension URN
/// resolves to the extension container itself.
///
/// # Errors
///
/// `invalidPath` when the path is malformed or any segment does not resolve
/// under the resource type.
pub fn compile_path(path: &str, resource_type: &ResourceType) -> ScimResult<CompiledPath> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return Err(ScimError::invalid_path(path, "path is empty"));
    }

    let mut chain: Vec<Arc<Attribute>> = Vec::new();
    let (scope, remainder) = match resource_type.split_schema_urn(trimmed) {
        Some((Some(extension), rest)) => {
            if rest.is_empty() {
                return Ok(CompiledPath::new(vec![extension.clone()]));
            }
            chain.push(extension.clone());
            (extension.sub_attributes.as_slice(), rest)
        }
        Some((None, rest)) => {
            if rest.is_empty() {
                return Err(ScimError::invalid_path(
                    path,
                    "base schema URN does not name an attribute",
                ));
            }
            (resource_type.root_attribute().sub_attributes.as_slice(), rest)
        }
        None => (
            resource_type.root_attribute().sub_attributes.as_slice(),
            trimmed,
        ),
    };

    let mut scope = scope;
    for segment in remainder.split('.') {
        if segment.is_empty() {
            return Err(ScimError::invalid_path(path, "empty path segment"));
        }
        let attr = scope
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(segment))
            .ok_or_else(|| {
                ScimError::invalid_path(path, format!("'{segment}' does not resolve"))
            })?;
        scope = attr.sub_attributes.as_slice();
        chain.push(attr.clone());
    }

    Ok(CompiledPath::new(chain))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;

    #[test]
    fn test_simple_path() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let path = compile_path("userName", user).unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(
            path.target().id,
            "urn:ietf:params:scim:schemas:core:2.0:User:userName"
        );
    }

    #[test]
    fn test_dotted_path_case_insensitive() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let path = compile_path("NAME.familyname", user).unwrap();
        let ids: Vec<_> = path.ids().collect();
        assert_eq!(
            ids,
            vec![
                "urn:ietf:params:scim:schemas:core:2.0:User:name",
                "urn:ietf:params:scim:schemas:core:2.0:User:name.familyName",
            ]
        );
    }

    #[test]
    fn test_extension_qualified_path() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let path = compile_path(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User:manager.displayName",
            user,
        )
        .unwrap();
        assert_eq!(path.len(), 3);
        assert_eq!(
            path.attributes()[0].id,
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User"
        );
    }

    #[test]
    fn test_extension_urn_alone() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let path = compile_path(
            "urn:ietf:params:scim:schemas:extension:enterprise:2.0:User",
            user,
        )
        .unwrap();
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn test_unresolved_path() {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap();

        let err = compile_path("name.unknown", user).unwrap_err();
        assert_eq!(err.scim_type(), "invalidPath");

        let err = compile_path("", user).unwrap_err();
        assert_eq!(err.scim_type(), "invalidPath");
    }
}
