//! The schema-typed property tree.
//!
//! A property is a typed value node whose shape derives at runtime from its
//! [`Attribute`]: scalar leaves (string, integer, decimal, boolean,
//! reference, dateTime, binary) and containers (complex, multi-valued).
//! Mutations preserve type invariants, mark the property touched, and
//! publish events to subscribers installed from attribute annotations.
//!
//! Nodes live in an arena owned by [`PropertyTree`]; [`PropertyRef`] is the
//! cheap read handle handed to visitors, navigators, and filters.
//!
//! [`Attribute`]: crate::schema::Attribute

pub mod event;
pub mod navigator;
mod ops;
mod query;
mod tree;

pub use event::{Event, EventKind};
pub use navigator::Navigator;
pub use tree::{PropertyIndex, PropertyTree};

use crate::error::ScimResult;
use crate::schema::Attribute;
use serde_json::Value;
use std::sync::Arc;

impl PropertyTree {
    /// A read handle on the property at the given index.
    pub fn property(&self, index: PropertyIndex) -> PropertyRef<'_> {
        PropertyRef::new(self, index)
    }
}

/// A borrowed read handle on one property of a tree.
#[derive(Clone, Copy)]
pub struct PropertyRef<'a> {
    tree: &'a PropertyTree,
    index: PropertyIndex,
}

impl<'a> PropertyRef<'a> {
    pub(crate) fn new(tree: &'a PropertyTree, index: PropertyIndex) -> Self {
        Self { tree, index }
    }

    /// Arena index of this property.
    pub fn index(&self) -> PropertyIndex {
        self.index
    }

    /// The attribute describing this property.
    pub fn attribute(&self) -> &'a Arc<Attribute> {
        self.tree.attribute(self.index)
    }

    /// The parent container; `None` only for the root.
    pub fn parent(&self) -> Option<PropertyRef<'a>> {
        self.tree
            .parent(self.index)
            .map(|parent| PropertyRef::new(self.tree, parent))
    }

    /// The property's value as JSON data; `Null` when unassigned.
    pub fn raw(&self) -> Value {
        self.tree.raw(self.index)
    }

    /// Whether the property holds no value.
    pub fn is_unassigned(&self) -> bool {
        self.tree.is_unassigned(self.index)
    }

    /// Whether the property holds a value.
    pub fn present(&self) -> bool {
        self.tree.present(self.index)
    }

    /// Whether the property has been mutated since construction.
    pub fn touched(&self) -> bool {
        self.tree.touched(self.index)
    }

    /// Whether the property is a container (complex or multi-valued).
    pub fn is_container(&self) -> bool {
        self.tree.is_container(self.index)
    }

    /// Structural hash of the property's value; zero when unassigned.
    pub fn hash(&self) -> u64 {
        self.tree.hash_of(self.index)
    }

    /// Whether this property carries the same attribute and value as
    /// another property of the same tree.
    pub fn matches(&self, other: PropertyRef<'_>) -> bool {
        self.tree.matches(self.index, other.index)
    }

    /// Number of children of a container; zero for leaves.
    pub fn count_children(&self) -> usize {
        self.tree.count_children(self.index)
    }

    /// Child at a position, if present.
    pub fn child_at(&self, position: usize) -> Option<PropertyRef<'a>> {
        self.tree
            .child_at(self.index, position)
            .map(|child| PropertyRef::new(self.tree, child))
    }

    /// Named child of a complex property, if present.
    pub fn child_named(&self, name: &str) -> Option<PropertyRef<'a>> {
        self.tree
            .find_child(self.index, name)
            .map(|child| PropertyRef::new(self.tree, child))
    }

    /// Children in declaration or storage order.
    pub fn children(&self) -> impl Iterator<Item = PropertyRef<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.index)
            .iter()
            .map(move |child| PropertyRef::new(tree, *child))
    }

    /// Whether the property's value equals the operand.
    pub fn equals_to(&self, value: &Value) -> ScimResult<bool> {
        self.tree.equals_to(self.index, value)
    }

    /// Whether the property's string value starts with the operand.
    pub fn starts_with(&self, value: &str) -> ScimResult<bool> {
        self.tree.starts_with(self.index, value)
    }

    /// Whether the property's string value ends with the operand.
    pub fn ends_with(&self, value: &str) -> ScimResult<bool> {
        self.tree.ends_with(self.index, value)
    }

    /// Whether the property's string value contains the operand.
    pub fn contains(&self, value: &str) -> ScimResult<bool> {
        self.tree.contains(self.index, value)
    }

    /// Whether the property's value is greater than the operand.
    pub fn greater_than(&self, value: &Value) -> ScimResult<bool> {
        self.tree.greater_than(self.index, value)
    }

    /// Whether the property's value is less than the operand.
    pub fn less_than(&self, value: &Value) -> ScimResult<bool> {
        self.tree.less_than(self.index, value)
    }
}

impl std::fmt::Debug for PropertyRef<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PropertyRef")
            .field("attribute", &self.attribute().id)
            .field("index", &self.index)
            .finish()
    }
}
