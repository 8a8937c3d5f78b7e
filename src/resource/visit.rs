//! Depth-first traversal of a resource's property tree.

use super::resource::Resource;
use crate::error::ScimResult;
use crate::property::{PropertyIndex, PropertyRef, PropertyTree};

/// Callbacks for depth-first property traversal.
///
/// For each property the traversal first asks [`should_visit`]; a `false`
/// skips the subtree entirely. [`visit`] runs next (for containers before
/// descending) and [`begin_children`] / [`end_children`] bracket the
/// descent. Children of complex properties are visited in sub-attribute
/// declaration order; elements of multi-valued properties in stored order.
/// Errors abort the traversal and propagate to the caller.
///
/// [`should_visit`]: Visitor::should_visit
/// [`visit`]: Visitor::visit
/// [`begin_children`]: Visitor::begin_children
/// [`end_children`]: Visitor::end_children
pub trait Visitor {
    /// Pre-order gate deciding whether the property (and its subtree) is
    /// traversed at all.
    fn should_visit(&mut self, property: PropertyRef<'_>) -> bool;

    /// Process the property.
    fn visit(&mut self, property: PropertyRef<'_>) -> ScimResult<()>;

    /// Called before descending into a container's children.
    fn begin_children(&mut self, container: PropertyRef<'_>);

    /// Called after a container's children have been traversed.
    fn end_children(&mut self, container: PropertyRef<'_>);
}

impl Resource {
    /// Traverse the resource depth-first with the given visitor.
    ///
    /// The root complex property itself is not visited; its children are
    /// bracketed by `begin_children` / `end_children` on the root.
    pub fn visit(&self, visitor: &mut dyn Visitor) -> ScimResult<()> {
        let tree = self.properties();
        let root = tree.root();
        visitor.begin_children(PropertyRef::new(tree, root));
        for child in tree.children(root).to_vec() {
            visit_property(tree, child, visitor)?;
        }
        visitor.end_children(PropertyRef::new(tree, root));
        Ok(())
    }
}

fn visit_property(
    tree: &PropertyTree,
    index: PropertyIndex,
    visitor: &mut dyn Visitor,
) -> ScimResult<()> {
    let property = PropertyRef::new(tree, index);
    if !visitor.should_visit(property) {
        return Ok(());
    }
    visitor.visit(property)?;
    if property.is_container() {
        visitor.begin_children(property);
        for child in tree.children(index) {
            visit_property(tree, *child, visitor)?;
        }
        visitor.end_children(property);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    #[derive(Default)]
    struct NameCollector {
        names: Vec<String>,
    }

    impl Visitor for NameCollector {
        fn should_visit(&mut self, property: PropertyRef<'_>) -> bool {
            !property.is_unassigned()
        }

        fn visit(&mut self, property: PropertyRef<'_>) -> ScimResult<()> {
            self.names.push(property.attribute().name.clone());
            Ok(())
        }

        fn begin_children(&mut self, _container: PropertyRef<'_>) {}
        fn end_children(&mut self, _container: PropertyRef<'_>) {}
    }

    #[test]
    fn test_traversal_order_follows_declaration() {
        let registry = SchemaRegistry::new().unwrap();
        let mut user = Resource::new(registry.resource_type("User").unwrap().clone());
        user.replace_path("userName", &json!("bob")).unwrap();
        user.replace_path("name.familyName", &json!("Smith"))
            .unwrap();

        let mut collector = NameCollector::default();
        user.visit(&mut collector).unwrap();
        assert_eq!(collector.names, vec!["userName", "name", "familyName"]);
    }
}
