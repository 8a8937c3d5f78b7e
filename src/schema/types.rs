//! Core schema type definitions for SCIM resources.
//!
//! This module contains the fundamental data structures that define SCIM
//! schemas and attribute metadata as specified in RFC 7643. Attributes are
//! immutable once loaded; the property tree holds them behind [`Arc`] so a
//! single definition is shared by every property it describes.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Annotation tags that drive runtime behaviors of properties.
///
/// Annotations are free-form strings carried on an attribute definition.
/// The property tree recognizes the constants below and installs the
/// corresponding subscribers during construction.
pub mod annotations {
    /// Multi-valued properties drop unassigned elements after mutation.
    pub const AUTO_COMPACT: &str = "@AutoCompact";
    /// At most one element of the multi-valued property has `primary=true`.
    pub const EXCLUSIVE_PRIMARY: &str = "@ExclusivePrimary";
    /// Complex array elements re-publish their assigned state when children
    /// change.
    pub const STATE_SUMMARY: &str = "@StateSummary";
}

/// A SCIM schema definition.
///
/// Represents a complete schema with its metadata and attribute definitions.
/// Attribute IDs are derived from the schema URN when the schema is loaded
/// through the registry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Schema {
    /// Unique schema identifier (URN)
    pub id: String,
    /// Human-readable schema name
    pub name: String,
    /// Schema description
    #[serde(default)]
    pub description: String,
    /// Ordered attribute definitions
    pub attributes: Vec<Arc<Attribute>>,
}

impl Schema {
    /// Assign globally unique dotted IDs to every attribute in the schema.
    ///
    /// Top-level attributes receive `<schema-id>:<name>`; sub-attributes
    /// receive `<parent-id>.<name>`. Called once by the registry after
    /// deserialization.
    pub(crate) fn finalize(&mut self) {
        self.attributes = self
            .attributes
            .iter()
            .map(|attr| Arc::new(attr.with_id(format!("{}:{}", self.id, attr.name))))
            .collect();
    }
}

/// Definition of a single SCIM attribute.
///
/// Carries the full metadata set of RFC 7643 §2.2 plus the runtime
/// annotations this crate uses to install property subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attribute {
    /// Globally unique dotted ID including the schema URN, e.g.
    /// `urn:ietf:params:scim:schemas:core:2.0:User:emails.value`.
    /// Derived at load time; absent from schema JSON.
    #[serde(default)]
    pub id: String,
    /// Simple name used in JSON output
    pub name: String,
    /// Data type of the attribute
    #[serde(rename = "type")]
    pub data_type: AttributeType,
    /// Whether this attribute can have multiple values
    #[serde(default)]
    pub multi_valued: bool,
    /// Whether this attribute is required
    #[serde(default)]
    pub required: bool,
    /// Whether string comparison is case-sensitive
    #[serde(default)]
    pub case_exact: bool,
    /// Mutability characteristics
    #[serde(default)]
    pub mutability: Mutability,
    /// How the attribute is returned in responses
    #[serde(default)]
    pub returned: Returned,
    /// Uniqueness constraints
    #[serde(default)]
    pub uniqueness: Uniqueness,
    /// Allowed values for string attributes
    #[serde(default)]
    pub canonical_values: Vec<String>,
    /// Allowed SCIM resource types for reference attributes
    #[serde(default)]
    pub reference_types: Vec<String>,
    /// Sub-attributes for complex types, in declaration order
    #[serde(default)]
    pub sub_attributes: Vec<Arc<Attribute>>,
    /// Tags driving runtime behaviors
    #[serde(default)]
    pub annotations: Vec<String>,
}

impl Attribute {
    /// Rebuild this attribute with the given ID, assigning derived IDs to
    /// all sub-attributes.
    pub(crate) fn with_id(&self, id: String) -> Attribute {
        let mut attr = self.clone();
        attr.sub_attributes = self
            .sub_attributes
            .iter()
            .map(|sub| Arc::new(sub.with_id(format!("{}.{}", id, sub.name))))
            .collect();
        attr.id = id;
        attr
    }

    /// Derive the per-element attribute for a multi-valued attribute.
    ///
    /// The element attribute keeps the parent's ID (elements share a path)
    /// and type but is single-valued, with the given extra annotations
    /// appended.
    ///
    /// # Panics
    ///
    /// Panics if this attribute is not multi-valued; that is a programmer
    /// error, not a client error.
    pub fn new_element_attribute(&self, extra_annotations: &[&str]) -> Arc<Attribute> {
        assert!(
            self.multi_valued,
            "element attribute derived from single-valued attribute '{}'",
            self.id
        );
        let mut annotations = self.annotations.clone();
        annotations.extend(extra_annotations.iter().map(|a| a.to_string()));
        Arc::new(Attribute {
            multi_valued: false,
            annotations,
            ..self.clone()
        })
    }

    /// Whether two attribute definitions describe the same schema node.
    ///
    /// Element attributes compare unequal to their multi-valued parent even
    /// though they share an ID.
    pub fn equals(&self, other: &Attribute) -> bool {
        self.id == other.id
            && self.multi_valued == other.multi_valued
            && self.data_type == other.data_type
    }

    /// Look up a sub-attribute by name.
    ///
    /// Matching is exact first; when the sub-attribute is not case-exact a
    /// case-insensitive match is accepted.
    pub fn sub_attribute(&self, name: &str) -> Option<&Arc<Attribute>> {
        self.sub_attributes
            .iter()
            .find(|sub| sub.name == name)
            .or_else(|| {
                self.sub_attributes
                    .iter()
                    .find(|sub| !sub.case_exact && sub.name.eq_ignore_ascii_case(name))
            })
    }

    /// Whether the attribute carries the given annotation.
    pub fn has_annotation(&self, annotation: &str) -> bool {
        self.annotations.iter().any(|a| a == annotation)
    }

    /// Whether properties of this attribute are containers (complex or
    /// multi-valued).
    pub fn is_container(&self) -> bool {
        self.multi_valued || self.data_type == AttributeType::Complex
    }
}

/// SCIM attribute data types as defined in RFC 7643.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttributeType {
    /// String value
    String,
    /// Boolean value
    Boolean,
    /// Decimal number
    Decimal,
    /// Integer number
    Integer,
    /// DateTime in RFC 3339 format
    DateTime,
    /// Binary data (base64 encoded)
    Binary,
    /// URI reference
    Reference,
    /// Complex attribute with sub-attributes
    Complex,
}

impl AttributeType {
    /// The lowercase keyword used in schema JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::DateTime => "dateTime",
            Self::Binary => "binary",
            Self::Reference => "reference",
            Self::Complex => "complex",
        }
    }
}

impl Default for AttributeType {
    fn default() -> Self {
        Self::String
    }
}

/// Attribute mutability characteristics.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Mutability {
    /// Read-only attribute (managed by the server)
    ReadOnly,
    /// Read-write attribute (can be modified by clients)
    ReadWrite,
    /// Immutable attribute (set once, never modified)
    Immutable,
    /// Write-only attribute (passwords, etc.)
    WriteOnly,
}

impl Default for Mutability {
    fn default() -> Self {
        Self::ReadWrite
    }
}

/// Returned disposition controlling response visibility.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Returned {
    /// Always present in responses
    Always,
    /// Present unless a projection excludes it
    Default,
    /// Present only when explicitly requested
    Request,
    /// Never present in responses
    Never,
}

impl Default for Returned {
    fn default() -> Self {
        Self::Default
    }
}

/// Attribute uniqueness constraints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum Uniqueness {
    /// No uniqueness constraint
    None,
    /// Unique within the server
    Server,
    /// Globally unique
    Global,
}

impl Default for Uniqueness {
    fn default() -> Self {
        Self::None
    }
}
