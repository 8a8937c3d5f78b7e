//! Arena storage for property trees.
//!
//! Properties form a parented tree whose shape derives at runtime from the
//! schema. Nodes live in a flat arena indexed by [`PropertyIndex`]; parents
//! are stored as indices so the ownership graph stays acyclic. Nodes are
//! never freed individually; detached elements linger in the arena until
//! the owning tree is dropped.

use super::event::Subscriber;
use crate::schema::{Attribute, AttributeType};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Index of a property node within its tree.
pub type PropertyIndex = usize;

/// A schema-shaped tree of typed property nodes.
///
/// The root is always a complex property with no parent. Complex properties
/// allocate one child per sub-attribute up front, so navigation by name
/// never fails for schema-defined attributes; multi-valued properties start
/// with zero elements.
#[derive(Debug, Clone)]
pub struct PropertyTree {
    pub(crate) nodes: Vec<PropertyNode>,
    pub(crate) notify_depth: u32,
}

#[derive(Debug, Clone)]
pub(crate) struct PropertyNode {
    pub(crate) attr: Arc<Attribute>,
    pub(crate) parent: Option<PropertyIndex>,
    pub(crate) value: PropertyValue,
    pub(crate) touched: bool,
    pub(crate) subscribers: Vec<Subscriber>,
}

/// Tagged storage for a property's value.
///
/// Case-insensitive strings keep the original form for output and a folded
/// form for hashing and comparison; the stored original is never mutated.
#[derive(Debug, Clone)]
pub(crate) enum PropertyValue {
    String {
        raw: Option<String>,
        folded: Option<String>,
    },
    Integer(Option<i64>),
    Decimal(Option<f64>),
    Boolean(Option<bool>),
    DateTime(Option<String>),
    Binary(Option<String>),
    Reference(Option<String>),
    Complex(Vec<PropertyIndex>),
    Multi(Vec<PropertyIndex>),
}

impl PropertyValue {
    fn unassigned_for(attr: &Attribute) -> Self {
        if attr.multi_valued {
            return Self::Multi(Vec::new());
        }
        match attr.data_type {
            AttributeType::String => Self::String {
                raw: None,
                folded: None,
            },
            AttributeType::Integer => Self::Integer(None),
            AttributeType::Decimal => Self::Decimal(None),
            AttributeType::Boolean => Self::Boolean(None),
            AttributeType::DateTime => Self::DateTime(None),
            AttributeType::Binary => Self::Binary(None),
            AttributeType::Reference => Self::Reference(None),
            AttributeType::Complex => Self::Complex(Vec::new()),
        }
    }
}

impl PropertyTree {
    /// Build an unassigned tree from a root complex attribute.
    pub fn new(root_attr: Arc<Attribute>) -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            notify_depth: 0,
        };
        tree.alloc(root_attr, None);
        tree
    }

    /// Index of the root complex property.
    pub fn root(&self) -> PropertyIndex {
        0
    }

    /// Allocate a node (and, for complex attributes, its child slots).
    pub(crate) fn alloc(
        &mut self,
        attr: Arc<Attribute>,
        parent: Option<PropertyIndex>,
    ) -> PropertyIndex {
        let index = self.nodes.len();
        self.nodes.push(PropertyNode {
            value: PropertyValue::unassigned_for(&attr),
            subscribers: Subscriber::for_attribute(&attr),
            attr: attr.clone(),
            parent,
            touched: false,
        });
        if !attr.multi_valued && attr.data_type == AttributeType::Complex {
            let children: Vec<PropertyIndex> = attr
                .sub_attributes
                .iter()
                .map(|sub| self.alloc(sub.clone(), Some(index)))
                .collect();
            if let PropertyValue::Complex(slots) = &mut self.nodes[index].value {
                *slots = children;
            }
        }
        index
    }

    pub(crate) fn node(&self, index: PropertyIndex) -> &PropertyNode {
        &self.nodes[index]
    }

    pub(crate) fn node_mut(&mut self, index: PropertyIndex) -> &mut PropertyNode {
        &mut self.nodes[index]
    }

    /// The attribute describing a property.
    pub fn attribute(&self, index: PropertyIndex) -> &Arc<Attribute> {
        &self.nodes[index].attr
    }

    /// Parent container of a property; `None` only for the root.
    pub fn parent(&self, index: PropertyIndex) -> Option<PropertyIndex> {
        self.nodes[index].parent
    }

    /// Whether the property has been mutated since construction.
    pub fn touched(&self, index: PropertyIndex) -> bool {
        self.nodes[index].touched
    }

    /// Whether the property is a container (complex or multi-valued).
    pub fn is_container(&self, index: PropertyIndex) -> bool {
        matches!(
            self.nodes[index].value,
            PropertyValue::Complex(_) | PropertyValue::Multi(_)
        )
    }

    /// Children of a container, in declaration or storage order. Leaves
    /// have none.
    pub fn children(&self, index: PropertyIndex) -> &[PropertyIndex] {
        match &self.nodes[index].value {
            PropertyValue::Complex(children) => children,
            PropertyValue::Multi(elements) => elements,
            _ => &[],
        }
    }

    /// Number of children of a container.
    pub fn count_children(&self, index: PropertyIndex) -> usize {
        self.children(index).len()
    }

    /// Child at a position, if present.
    pub fn child_at(&self, index: PropertyIndex, position: usize) -> Option<PropertyIndex> {
        self.children(index).get(position).copied()
    }

    /// Find a complex property's child by attribute name.
    ///
    /// Exact match wins; a case-insensitive match is accepted when the
    /// child's attribute is not case-exact.
    pub(crate) fn find_child(&self, index: PropertyIndex, name: &str) -> Option<PropertyIndex> {
        let children = match &self.nodes[index].value {
            PropertyValue::Complex(children) => children,
            _ => return None,
        };
        children
            .iter()
            .copied()
            .find(|c| self.nodes[*c].attr.name == name)
            .or_else(|| {
                children.iter().copied().find(|c| {
                    let attr = &self.nodes[*c].attr;
                    !attr.case_exact && attr.name.eq_ignore_ascii_case(name)
                })
            })
    }

    /// Export the property's value as JSON data.
    ///
    /// Unassigned properties export as `Null`; complex properties export an
    /// object holding their assigned children only.
    pub fn raw(&self, index: PropertyIndex) -> Value {
        match &self.nodes[index].value {
            PropertyValue::String { raw, .. }
            | PropertyValue::DateTime(raw)
            | PropertyValue::Binary(raw)
            | PropertyValue::Reference(raw) => {
                raw.clone().map(Value::String).unwrap_or(Value::Null)
            }
            PropertyValue::Integer(v) => v.map(Value::from).unwrap_or(Value::Null),
            PropertyValue::Decimal(v) => v
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PropertyValue::Boolean(v) => v.map(Value::Bool).unwrap_or(Value::Null),
            PropertyValue::Complex(children) => {
                if self.is_unassigned(index) {
                    return Value::Null;
                }
                let mut map = Map::new();
                for child in children {
                    if !self.is_unassigned(*child) {
                        map.insert(self.nodes[*child].attr.name.clone(), self.raw(*child));
                    }
                }
                Value::Object(map)
            }
            PropertyValue::Multi(elements) => {
                if elements.is_empty() {
                    return Value::Null;
                }
                Value::Array(elements.iter().map(|e| self.raw(*e)).collect())
            }
        }
    }
}
