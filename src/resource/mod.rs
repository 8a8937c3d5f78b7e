//! SCIM resources and the visitor protocol.
//!
//! A [`Resource`] binds a resource type to a root complex property and is
//! the unit the serializer, deserializer, and filters operate on. The
//! [`Visitor`] trait is the traversal seam: the JSON serializer is one
//! visitor, the property-filter runner is another.

pub mod resource;
pub mod visit;

pub use resource::Resource;
pub use visit::Visitor;
