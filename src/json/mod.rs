//! Canonical SCIM JSON serialization and deserialization.
//!
//! [`serialize`] walks a resource with the visitor protocol, applying the
//! projection (`attributes` / `excludedAttributes`) and `returned`
//! dispositions; [`deserialize`] populates a pre-constructed resource
//! through Add/Replace so property invariants hold on the way in.

pub mod deserialize;
pub mod serialize;

pub use deserialize::{deserialize, DeserializationOptions};
pub use serialize::{serialize, SerializationOptions};
