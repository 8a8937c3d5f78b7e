//! Populating a resource from raw JSON.

use crate::error::{ScimError, ScimResult};
use crate::property::{PropertyIndex, PropertyTree};
use crate::resource::Resource;
use crate::schema::{AttributeType, Mutability};
use serde_json::{Map, Value};

/// Options controlling deserialization.
#[derive(Debug, Clone, Default)]
pub struct DeserializationOptions {
    /// Reject attempts to set `readOnly` attributes with
    /// `mutabilityViolation`. Off by default so server-written values
    /// round-trip; turn on for client-supplied payloads.
    pub enforce_mutability: bool,
}

impl DeserializationOptions {
    /// Default options: mutability not enforced.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enforce `readOnly` mutability on every populated attribute.
    pub fn enforce_mutability(mut self) -> Self {
        self.enforce_mutability = true;
        self
    }
}

/// Populate a pre-constructed resource from JSON bytes.
///
/// Properties are built through Add/Replace, so subscribers fire and
/// invariants (primary exclusivity, deduplication) hold afterwards. JSON
/// `null` deletes the addressed property.
///
/// # Errors
///
/// `invalidSyntax` on malformed JSON or a non-object payload, `noTarget` on
/// unknown attributes, `invalidValue` on type mismatches, and
/// `mutabilityViolation` for `readOnly` attributes when enforcement is on.
pub fn deserialize(
    resource: &mut Resource,
    data: &[u8],
    options: &DeserializationOptions,
) -> ScimResult<()> {
    let value: Value = serde_json::from_slice(data)
        .map_err(|e| ScimError::invalid_syntax(format!("malformed JSON: {e}")))?;
    let Value::Object(map) = value else {
        return Err(ScimError::invalid_syntax("payload must be a JSON object"));
    };
    let root = resource.properties().root();
    populate_complex(resource.properties_mut(), root, &map, options)
}

fn populate_complex(
    tree: &mut PropertyTree,
    index: PropertyIndex,
    map: &Map<String, Value>,
    options: &DeserializationOptions,
) -> ScimResult<()> {
    for (name, value) in map {
        let child = tree.find_child(index, name).ok_or_else(|| {
            ScimError::no_target(format!(
                "attribute '{}' has no sub-attribute '{name}'",
                tree.attribute(index).id
            ))
        })?;
        let attr = tree.attribute(child).clone();
        if options.enforce_mutability && attr.mutability == Mutability::ReadOnly {
            return Err(ScimError::mutability_violation(attr.id.clone()));
        }
        if value.is_null() {
            tree.delete(child)?;
            continue;
        }
        if !attr.multi_valued && attr.data_type == AttributeType::Complex {
            let Value::Object(sub_map) = value else {
                return Err(ScimError::invalid_value(format!(
                    "{value} is incompatible with attribute '{}'",
                    attr.id
                )));
            };
            populate_complex(tree, child, sub_map, options)?;
        } else {
            tree.replace(child, value)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    fn user_resource() -> Resource {
        let registry = SchemaRegistry::new().unwrap();
        Resource::new(registry.resource_type("User").unwrap().clone())
    }

    #[test]
    fn test_populates_nested_and_multi_valued() {
        let mut user = user_resource();
        let payload = json!({
            "schemas": ["urn:ietf:params:scim:schemas:core:2.0:User"],
            "userName": "bob",
            "name": {"familyName": "Smith", "givenName": "Bob"},
            "emails": [
                {"value": "bob@example.com", "type": "work", "primary": true}
            ]
        });
        deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new(),
        )
        .unwrap();

        assert_eq!(user.value_at("userName").unwrap(), json!("bob"));
        assert_eq!(user.value_at("name.familyName").unwrap(), json!("Smith"));
        let mut nav = user.navigator();
        assert_eq!(nav.focus_name("emails").unwrap().count_children(), 1);
    }

    #[test]
    fn test_malformed_json_is_invalid_syntax() {
        let mut user = user_resource();
        let err = deserialize(&mut user, b"{not json", &DeserializationOptions::new()).unwrap_err();
        assert_eq!(err.scim_type(), "invalidSyntax");

        let err = deserialize(&mut user, b"[1,2]", &DeserializationOptions::new()).unwrap_err();
        assert_eq!(err.scim_type(), "invalidSyntax");
    }

    #[test]
    fn test_unknown_attribute_is_no_target() {
        let mut user = user_resource();
        let payload = json!({"favouriteColor": "green"});
        let err = deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.scim_type(), "noTarget");
    }

    #[test]
    fn test_type_mismatch_is_invalid_value() {
        let mut user = user_resource();
        let payload = json!({"active": "yes"});
        let err = deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new(),
        )
        .unwrap_err();
        assert_eq!(err.scim_type(), "invalidValue");
    }

    #[test]
    fn test_read_only_rejected_only_when_enforced() {
        let payload = json!({"id": "a1"});

        let mut user = user_resource();
        deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new(),
        )
        .unwrap();
        assert_eq!(user.id().as_deref(), Some("a1"));

        let mut user = user_resource();
        let err = deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new().enforce_mutability(),
        )
        .unwrap_err();
        assert_eq!(err.scim_type(), "mutability");
    }

    #[test]
    fn test_null_deletes() {
        let mut user = user_resource();
        user.replace_path("displayName", &json!("Bob")).unwrap();

        let payload = json!({"displayName": null});
        deserialize(
            &mut user,
            payload.to_string().as_bytes(),
            &DeserializationOptions::new(),
        )
        .unwrap();
        assert_eq!(user.value_at("displayName").unwrap(), json!(null));
    }
}
