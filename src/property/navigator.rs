//! Read-only cursor over a property tree.

use super::tree::{PropertyIndex, PropertyTree, PropertyValue};
use super::PropertyRef;
use crate::error::{ScimError, ScimResult};

/// A cursor that focuses sub-properties by name, index, or criteria.
///
/// The navigator never mutates. It is reusable across sequential reads of
/// the same resource; the tree must not be mutated while a navigator is
/// live.
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
///
/// let mut nav = user.navigator();
/// let user_name = nav.focus_name("userName")?;
/// assert_eq!(user_name.raw(), json!("bob"));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Navigator<'a> {
    tree: &'a PropertyTree,
    stack: Vec<PropertyIndex>,
}

impl<'a> Navigator<'a> {
    pub(crate) fn new(tree: &'a PropertyTree, root: PropertyIndex) -> Self {
        Self {
            tree,
            stack: vec![root],
        }
    }

    /// The currently focused property.
    pub fn current(&self) -> PropertyRef<'a> {
        PropertyRef::new(self.tree, *self.stack.last().expect("navigator stack is never empty"))
    }

    /// Focus the named child of the current complex property.
    ///
    /// Matching is exact, with a case-insensitive fallback for children
    /// whose attribute is not case-exact. Fails with `noTarget` otherwise.
    pub fn focus_name(&mut self, name: &str) -> ScimResult<PropertyRef<'a>> {
        let current = *self.stack.last().expect("navigator stack is never empty");
        if !matches!(self.tree.node(current).value, PropertyValue::Complex(_)) {
            return Err(ScimError::no_target(format!(
                "attribute '{}' has no named sub-properties",
                self.tree.attribute(current).id
            )));
        }
        let child = self.tree.find_child(current, name).ok_or_else(|| {
            ScimError::no_target(format!(
                "attribute '{}' has no sub-attribute '{name}'",
                self.tree.attribute(current).id
            ))
        })?;
        self.stack.push(child);
        Ok(self.current())
    }

    /// Focus the element at the given index of the current multi-valued
    /// property.
    pub fn focus_index(&mut self, index: usize) -> ScimResult<PropertyRef<'a>> {
        let current = *self.stack.last().expect("navigator stack is never empty");
        if !matches!(self.tree.node(current).value, PropertyValue::Multi(_)) {
            return Err(ScimError::no_target(format!(
                "attribute '{}' has no indexed elements",
                self.tree.attribute(current).id
            )));
        }
        let element = self.tree.child_at(current, index).ok_or_else(|| {
            ScimError::no_target(format!(
                "attribute '{}' has no element at index {index}",
                self.tree.attribute(current).id
            ))
        })?;
        self.stack.push(element);
        Ok(self.current())
    }

    /// Focus the first element of the current multi-valued property that
    /// satisfies the predicate.
    pub fn focus_criteria<F>(&mut self, predicate: F) -> ScimResult<PropertyRef<'a>>
    where
        F: Fn(PropertyRef<'_>) -> bool,
    {
        let current = *self.stack.last().expect("navigator stack is never empty");
        if !matches!(self.tree.node(current).value, PropertyValue::Multi(_)) {
            return Err(ScimError::no_target(format!(
                "attribute '{}' has no elements to match",
                self.tree.attribute(current).id
            )));
        }
        let element = self
            .tree
            .children(current)
            .iter()
            .copied()
            .find(|e| predicate(PropertyRef::new(self.tree, *e)))
            .ok_or_else(|| {
                ScimError::no_target(format!(
                    "no element of '{}' satisfies the criteria",
                    self.tree.attribute(current).id
                ))
            })?;
        self.stack.push(element);
        Ok(self.current())
    }

    /// Move focus back to the parent. No-op at the root.
    pub fn retract(&mut self) -> PropertyRef<'a> {
        if self.stack.len() > 1 {
            self.stack.pop();
        }
        self.current()
    }

    /// Depth of the focus stack; 1 at the root.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }
}

#[cfg(test)]
mod tests {
    use crate::resource::Resource;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    fn user_resource() -> Resource {
        let registry = SchemaRegistry::new().unwrap();
        Resource::new(registry.resource_type("User").unwrap().clone())
    }

    #[test]
    fn test_focus_by_name_index_and_criteria() {
        let mut resource = user_resource();
        resource
            .add_path(
                "emails",
                &json!([
                    {"value": "work@example.com", "type": "work"},
                    {"value": "home@example.com", "type": "home"}
                ]),
            )
            .unwrap();

        let mut nav = resource.navigator();
        nav.focus_name("emails").unwrap();

        let second = nav.focus_index(1).unwrap();
        assert_eq!(second.raw()["value"], json!("home@example.com"));
        nav.retract();

        let work = nav
            .focus_criteria(|e| {
                e.child_named("type")
                    .map(|t| t.equals_to(&json!("work")).unwrap_or(false))
                    .unwrap_or(false)
            })
            .unwrap();
        assert_eq!(work.raw()["value"], json!("work@example.com"));
    }

    #[test]
    fn test_focus_unknown_name_fails_with_no_target() {
        let resource = user_resource();
        let mut nav = resource.navigator();
        let err = nav.focus_name("nonexistent").unwrap_err();
        assert_eq!(err.scim_type(), "noTarget");
    }

    #[test]
    fn test_retract_stops_at_root() {
        let resource = user_resource();
        let mut nav = resource.navigator();
        nav.focus_name("name").unwrap();
        assert_eq!(nav.depth(), 2);
        nav.retract();
        nav.retract();
        assert_eq!(nav.depth(), 1);
    }
}
