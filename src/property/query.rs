//! Structural hashing, matching, and relational predicates.

use super::tree::{PropertyIndex, PropertyTree, PropertyValue};
use crate::error::{ScimError, ScimResult};
use chrono::{DateTime, FixedOffset};
use fnv::FnvHasher;
use serde_json::Value;
use std::cmp::Ordering;
use std::hash::Hasher;

fn parse_stored_datetime(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).expect("stored dateTime is valid RFC 3339")
}

impl PropertyTree {
    /// Whether the property holds no value.
    ///
    /// Complex properties are unassigned when every child is unassigned;
    /// multi-valued properties when they have zero elements.
    pub fn is_unassigned(&self, index: PropertyIndex) -> bool {
        match &self.node(index).value {
            PropertyValue::String { raw, .. } => raw.is_none(),
            PropertyValue::Integer(v) => v.is_none(),
            PropertyValue::Decimal(v) => v.is_none(),
            PropertyValue::Boolean(v) => v.is_none(),
            PropertyValue::DateTime(v)
            | PropertyValue::Binary(v)
            | PropertyValue::Reference(v) => v.is_none(),
            PropertyValue::Complex(children) => {
                children.iter().all(|child| self.is_unassigned(*child))
            }
            PropertyValue::Multi(elements) => elements.is_empty(),
        }
    }

    /// Whether the property holds a value.
    pub fn present(&self, index: PropertyIndex) -> bool {
        !self.is_unassigned(index)
    }

    /// Structural FNV-1a hash of the property's value; zero when
    /// unassigned.
    ///
    /// Complex hashes mix `(sub-attribute index, child hash)` pairs in
    /// declaration order. Multi-valued hashes sort element hashes first, so
    /// two properties holding the same elements in different orders hash
    /// identically; SCIM arrays are unordered sets for identity.
    pub fn hash_of(&self, index: PropertyIndex) -> u64 {
        if self.is_unassigned(index) {
            return 0;
        }
        match &self.node(index).value {
            PropertyValue::String {
                folded: Some(folded),
                ..
            } => {
                let mut hasher = FnvHasher::default();
                hasher.write(folded.as_bytes());
                hasher.finish()
            }
            PropertyValue::Integer(Some(v)) => {
                let mut hasher = FnvHasher::default();
                hasher.write(&v.to_le_bytes());
                hasher.finish()
            }
            PropertyValue::Decimal(Some(v)) => {
                let mut hasher = FnvHasher::default();
                hasher.write(&v.to_bits().to_le_bytes());
                hasher.finish()
            }
            PropertyValue::Boolean(Some(v)) => *v as u64,
            PropertyValue::DateTime(Some(s)) => {
                let parsed = parse_stored_datetime(s);
                let mut hasher = FnvHasher::default();
                hasher.write(&parsed.timestamp().to_le_bytes());
                hasher.write(&parsed.timestamp_subsec_nanos().to_le_bytes());
                hasher.finish()
            }
            PropertyValue::Binary(Some(s)) | PropertyValue::Reference(Some(s)) => {
                let mut hasher = FnvHasher::default();
                hasher.write(s.as_bytes());
                hasher.finish()
            }
            PropertyValue::Complex(children) => {
                let mut hasher = FnvHasher::default();
                for (position, child) in children.iter().enumerate() {
                    if self.is_unassigned(*child) {
                        continue;
                    }
                    hasher.write(&(position as u64).to_le_bytes());
                    hasher.write(&self.hash_of(*child).to_le_bytes());
                }
                hasher.finish()
            }
            PropertyValue::Multi(elements) => {
                let mut hashes: Vec<u64> = elements
                    .iter()
                    .filter(|e| !self.is_unassigned(**e))
                    .map(|e| self.hash_of(*e))
                    .collect();
                hashes.sort_unstable();
                let mut hasher = FnvHasher::default();
                for hash in hashes {
                    hasher.write(&hash.to_le_bytes());
                }
                hasher.finish()
            }
            _ => unreachable!("unassigned leaves handled above"),
        }
    }

    /// Whether two properties carry the same attribute and the same value.
    pub fn matches(&self, a: PropertyIndex, b: PropertyIndex) -> bool {
        if !self.node(a).attr.equals(&self.node(b).attr) {
            return false;
        }
        match (self.is_unassigned(a), self.is_unassigned(b)) {
            (true, true) => true,
            (false, false) => self.hash_of(a) == self.hash_of(b),
            _ => false,
        }
    }

    /// Whether the property's value equals the operand.
    ///
    /// On a multi-valued property this behaves as a contains check: SCIM
    /// uses `eq` to match an element within an array.
    pub fn equals_to(&self, index: PropertyIndex, value: &Value) -> ScimResult<bool> {
        let attr = self.attribute(index).clone();
        match &self.node(index).value {
            PropertyValue::Multi(elements) => {
                for element in elements {
                    if self.equals_to(*element, value)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            PropertyValue::Complex(_) => {
                Err(ScimError::incompatible_operation("eq", attr.id.clone()))
            }
            PropertyValue::String {
                folded: Some(folded),
                ..
            } => Ok(match value.as_str() {
                Some(operand) if attr.case_exact => folded == operand,
                Some(operand) => *folded == operand.to_lowercase(),
                None => false,
            }),
            PropertyValue::Integer(v) => Ok(v.is_some() && value.as_i64() == *v),
            PropertyValue::Decimal(v) => Ok(v.is_some() && value.as_f64() == *v),
            PropertyValue::Boolean(v) => Ok(v.is_some() && value.as_bool() == *v),
            PropertyValue::DateTime(Some(s)) => Ok(value
                .as_str()
                .and_then(|operand| DateTime::parse_from_rfc3339(operand).ok())
                .map(|operand| parse_stored_datetime(s) == operand)
                .unwrap_or(false)),
            PropertyValue::Binary(s) | PropertyValue::Reference(s) => {
                Ok(s.is_some() && value.as_str() == s.as_deref())
            }
            _ => Ok(false),
        }
    }

    /// Whether the property's string value starts with the operand.
    pub fn starts_with(&self, index: PropertyIndex, value: &str) -> ScimResult<bool> {
        self.string_predicate(index, value, "sw", |s, operand| s.starts_with(operand))
    }

    /// Whether the property's string value ends with the operand.
    pub fn ends_with(&self, index: PropertyIndex, value: &str) -> ScimResult<bool> {
        self.string_predicate(index, value, "ew", |s, operand| s.ends_with(operand))
    }

    /// Whether the property's string value contains the operand.
    pub fn contains(&self, index: PropertyIndex, value: &str) -> ScimResult<bool> {
        self.string_predicate(index, value, "co", |s, operand| s.contains(operand))
    }

    /// Whether the property's value is greater than the operand.
    pub fn greater_than(&self, index: PropertyIndex, value: &Value) -> ScimResult<bool> {
        Ok(self
            .compare(index, value, "gt")?
            .map(|ordering| ordering == Ordering::Greater)
            .unwrap_or(false))
    }

    /// Whether the property's value is less than the operand.
    pub fn less_than(&self, index: PropertyIndex, value: &Value) -> ScimResult<bool> {
        Ok(self
            .compare(index, value, "lt")?
            .map(|ordering| ordering == Ordering::Less)
            .unwrap_or(false))
    }

    fn string_predicate(
        &self,
        index: PropertyIndex,
        operand: &str,
        op: &str,
        test: impl Fn(&str, &str) -> bool,
    ) -> ScimResult<bool> {
        let attr = self.attribute(index);
        match &self.node(index).value {
            PropertyValue::String {
                folded: Some(folded),
                ..
            } => {
                if attr.case_exact {
                    Ok(test(folded, operand))
                } else {
                    Ok(test(folded, &operand.to_lowercase()))
                }
            }
            PropertyValue::String { .. } => Ok(false),
            PropertyValue::Reference(Some(s)) => Ok(test(s, operand)),
            PropertyValue::Reference(None) => Ok(false),
            _ => Err(ScimError::incompatible_operation(op, attr.id.clone())),
        }
    }

    /// Ordering of the property's value relative to the operand; `None`
    /// when unassigned or the operand is not comparable.
    fn compare(
        &self,
        index: PropertyIndex,
        value: &Value,
        op: &str,
    ) -> ScimResult<Option<Ordering>> {
        let attr = self.attribute(index).clone();
        match &self.node(index).value {
            PropertyValue::Integer(stored) => {
                let Some(stored) = stored else {
                    return Ok(None);
                };
                let operand = value
                    .as_i64()
                    .ok_or_else(|| self.err_not_comparable(value, &attr.id))?;
                Ok(Some(stored.cmp(&operand)))
            }
            PropertyValue::Decimal(stored) => {
                let Some(stored) = stored else {
                    return Ok(None);
                };
                let operand = value
                    .as_f64()
                    .ok_or_else(|| self.err_not_comparable(value, &attr.id))?;
                Ok(stored.partial_cmp(&operand))
            }
            PropertyValue::DateTime(stored) => {
                let Some(stored) = stored else {
                    return Ok(None);
                };
                let operand = value
                    .as_str()
                    .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
                    .ok_or_else(|| self.err_not_comparable(value, &attr.id))?;
                Ok(Some(parse_stored_datetime(stored).cmp(&operand)))
            }
            PropertyValue::String { folded, .. } => {
                let Some(folded) = folded else {
                    return Ok(None);
                };
                let operand = value
                    .as_str()
                    .ok_or_else(|| self.err_not_comparable(value, &attr.id))?;
                if attr.case_exact {
                    Ok(Some(folded.as_str().cmp(operand)))
                } else {
                    Ok(Some(folded.cmp(&operand.to_lowercase())))
                }
            }
            _ => Err(ScimError::incompatible_operation(op, attr.id.clone())),
        }
    }

    fn err_not_comparable(&self, value: &Value, attribute_id: &str) -> ScimError {
        ScimError::invalid_value(format!(
            "{value} is not comparable with attribute '{attribute_id}'"
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::resource::Resource;
    use crate::schema::SchemaRegistry;
    use serde_json::json;

    fn user_resource() -> Resource {
        let registry = SchemaRegistry::new().unwrap();
        let user = registry.resource_type("User").unwrap().clone();
        Resource::new(user)
    }

    #[test]
    fn test_multi_hash_is_order_insensitive() {
        let mut forward = user_resource();
        forward
            .add_path(
                "emails",
                &json!([
                    {"value": "a@example.com", "type": "work"},
                    {"value": "b@example.com", "type": "home"}
                ]),
            )
            .unwrap();

        let mut backward = user_resource();
        backward
            .add_path(
                "emails",
                &json!([
                    {"value": "b@example.com", "type": "home"},
                    {"value": "a@example.com", "type": "work"}
                ]),
            )
            .unwrap();

        let f = forward.navigator().focus_name("emails").unwrap().hash();
        let b = backward.navigator().focus_name("emails").unwrap().hash();
        assert_eq!(f, b);
    }

    #[test]
    fn test_complex_unassigned_iff_all_children_unassigned() {
        let mut resource = user_resource();
        assert!(resource
            .navigator()
            .focus_name("name")
            .unwrap()
            .is_unassigned());

        resource
            .add_path("name", &json!({"familyName": "Smith"}))
            .unwrap();
        assert!(!resource
            .navigator()
            .focus_name("name")
            .unwrap()
            .is_unassigned());

        resource.delete_path("name.familyName").unwrap();
        assert!(resource
            .navigator()
            .focus_name("name")
            .unwrap()
            .is_unassigned());
    }

    #[test]
    fn test_case_insensitive_string_equality() {
        let mut resource = user_resource();
        resource.replace_path("userName", &json!("Bob")).unwrap();

        let mut nav = resource.navigator();
        let user_name = nav.focus_name("userName").unwrap();
        assert!(user_name.equals_to(&json!("BOB")).unwrap());
        assert!(user_name.contains("ob").unwrap());
        assert!(user_name.starts_with("bo").unwrap());
    }

    #[test]
    fn test_incompatible_operation_on_boolean() {
        let mut resource = user_resource();
        resource.replace_path("active", &json!(true)).unwrap();

        let mut nav = resource.navigator();
        let active = nav.focus_name("active").unwrap();
        let err = active.contains("tr").unwrap_err();
        assert_eq!(err.scim_type(), "incompatibleOperation");
    }

    #[test]
    fn test_boolean_hash_is_zero_or_one() {
        let mut resource = user_resource();
        resource.replace_path("active", &json!(true)).unwrap();
        let mut nav = resource.navigator();
        assert_eq!(nav.focus_name("active").unwrap().hash(), 1);

        resource.replace_path("active", &json!(false)).unwrap();
        let mut nav = resource.navigator();
        assert_eq!(nav.focus_name("active").unwrap().hash(), 0);
    }
}
