//! Schema definitions and the schema registry.
//!
//! This module implements the SCIM schema model of RFC 7643: attribute
//! metadata, schema documents, and resource types. Schemas are loaded once,
//! embedded or from a directory, and shared read-only behind [`Arc`]
//! handles afterward.
//!
//! # Key Types
//!
//! - [`Schema`] - SCIM schema definition with ordered attributes
//! - [`Attribute`] - a single schema node and its characteristics
//! - [`ResourceType`] - binds a base schema and extensions to an endpoint
//! - [`SchemaRegistry`] - process-wide registry of schemas and resource types
//!
//! [`Arc`]: std::sync::Arc

pub mod embedded;
pub mod registry;
pub mod resource_type;
pub mod types;

pub use registry::SchemaRegistry;
pub use resource_type::{ResourceType, SchemaExtension};
pub use types::{annotations, Attribute, AttributeType, Mutability, Returned, Schema, Uniqueness};
