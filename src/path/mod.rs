//! Attribute path compilation and ancestry queries.
//!
//! Projection (`attributes` / `excludedAttributes`) works on compiled paths:
//! sequences of attribute IDs resolved against a resource type. The
//! [`PathAncestry`] prefix tree answers whether an arbitrary compiled path is
//! a member of, an ancestor of, or an offspring of the requested set, which
//! is all the serializer needs to decide visibility.

pub mod ancestry;
pub mod compile;

pub use ancestry::PathAncestry;
pub use compile::{compile_path, CompiledPath};
