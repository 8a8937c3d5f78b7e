//! Schema-driven SCIM 2.0 property core.
//!
//! This crate implements the heart of a SCIM resource server: a recursive,
//! schema-typed, observable property tree whose shape derives at runtime
//! from a SCIM schema and resource type, and a projection-aware JSON
//! serializer that walks it honoring `attributes` / `excludedAttributes`,
//! mutability, and `returned` dispositions.
//!
//! # Core Components
//!
//! - [`SchemaRegistry`] - schemas and resource types, loaded once
//! - [`Resource`] - a resource type bound to a property tree
//! - [`Navigator`] - read cursor focusing properties by name/index/criteria
//! - [`Visitor`] - depth-first traversal protocol
//! - [`json::serialize`] / [`json::deserialize`] - canonical SCIM JSON
//!
//! # Quick Start
//!
//! ```rust
//! use scim_core::json::{serialize, SerializationOptions};
//! use scim_core::resource::Resource;
//! use scim_core::schema::SchemaRegistry;
//! use serde_json::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = SchemaRegistry::new()?;
//! let mut user = Resource::new(registry.resource_type("User").unwrap().clone());
//! user.replace_path("userName", &json!("bob"))?;
//!
//! let options = SerializationOptions::new().include(["userName"]);
//! let _bytes = serialize(&user, &options)?;
//! # Ok(())
//! # }
//! ```
//!
//! Transport, persistence, locking, and authentication are external
//! collaborators; this crate is purely CPU-bound and provides no internal
//! locking. Resources are single-writer value graphs.

pub mod error;
pub mod filter;
pub mod json;
pub mod path;
pub mod property;
pub mod resource;
pub mod schema;

// Re-export commonly used types for convenience
pub use error::{ScimError, ScimResult};
pub use json::{deserialize, serialize, DeserializationOptions, SerializationOptions};
pub use path::{compile_path, CompiledPath, PathAncestry};
pub use property::{Navigator, PropertyRef};
pub use resource::{Resource, Visitor};
pub use schema::{
    Attribute, AttributeType, Mutability, ResourceType, Returned, Schema, SchemaRegistry,
    Uniqueness,
};
