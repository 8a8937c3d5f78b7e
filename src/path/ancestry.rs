//! Prefix tree over compiled attribute paths.

use super::compile::CompiledPath;
use std::collections::HashMap;

/// A set of compiled paths organized as a prefix tree keyed by attribute ID.
///
/// Comparison is on fully-qualified attribute IDs, not names, so
/// identically-named attributes across different schemas do not collide.
///
/// # Examples
///
/// ```rust
/// use scim_core::path::{compile_path, PathAncestry};
/// use scim_core::schema::SchemaRegistry;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new()?;
/// let user = registry.resource_type("User").unwrap();
///
/// let mut family = PathAncestry::new();
/// family.add(&compile_path("name.familyName", user)?);
///
/// assert!(family.is_member(&compile_path("name.familyName", user)?));
/// assert!(family.is_ancestor(&compile_path("name", user)?));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct PathAncestry {
    root: Node,
}

#[derive(Debug, Default)]
struct Node {
    terminal: bool,
    children: HashMap<String, Node>,
}

impl Node {
    fn has_terminal(&self) -> bool {
        self.terminal || self.children.values().any(Node::has_terminal)
    }
}

impl PathAncestry {
    /// Create an empty ancestry set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a compiled path, creating every prefix node along the way.
    pub fn add(&mut self, path: &CompiledPath) {
        let mut node = &mut self.root;
        for id in path.ids() {
            node = node.children.entry(id.to_string()).or_default();
        }
        node.terminal = true;
    }

    fn walk(&self, path: &CompiledPath) -> Option<&Node> {
        let mut node = &self.root;
        for id in path.ids() {
            node = node.children.get(id)?;
        }
        Some(node)
    }

    /// Whether the path exactly equals an included path.
    pub fn is_member(&self, path: &CompiledPath) -> bool {
        self.walk(path).map(|node| node.terminal).unwrap_or(false)
    }

    /// Whether some included path is a strict descendant of the path.
    pub fn is_ancestor(&self, path: &CompiledPath) -> bool {
        self.walk(path)
            .map(|node| node.children.values().any(Node::has_terminal))
            .unwrap_or(false)
    }

    /// Whether some included path is a strict ancestor of the path.
    pub fn is_offspring(&self, path: &CompiledPath) -> bool {
        let len = path.len();
        let mut node = &self.root;
        for (depth, id) in path.ids().enumerate() {
            match node.children.get(id) {
                Some(child) => {
                    if child.terminal && depth + 1 < len {
                        return true;
                    }
                    node = child;
                }
                None => return false,
            }
        }
        false
    }
}
