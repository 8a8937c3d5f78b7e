//! Mutation operations on property trees.

use super::event::EventKind;
use super::tree::{PropertyIndex, PropertyTree, PropertyValue};
use crate::error::{ScimError, ScimResult};
use crate::schema::{annotations, AttributeType};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::DateTime;
use serde_json::Value;

impl PropertyTree {
    /// Add a value to the property.
    ///
    /// For leaves this is equivalent to [`replace`]; complex properties
    /// delegate each recognized key to the matching child; multi-valued
    /// properties append candidate elements that no existing element
    /// matches.
    ///
    /// [`replace`]: PropertyTree::replace
    pub fn add(&mut self, index: PropertyIndex, value: &Value) -> ScimResult<()> {
        if matches!(self.node(index).value, PropertyValue::Multi(_)) {
            return self.add_multi(index, value);
        }
        if matches!(self.node(index).value, PropertyValue::Complex(_)) {
            return self.add_complex(index, value);
        }
        self.replace(index, value)
    }

    /// Replace the property's value.
    ///
    /// A JSON `null` deletes. Type mismatches fail with `invalidValue`;
    /// dateTime values must be RFC 3339 and binary values must be base64.
    pub fn replace(&mut self, index: PropertyIndex, value: &Value) -> ScimResult<()> {
        if value.is_null() {
            return self.delete(index);
        }
        if matches!(self.node(index).value, PropertyValue::Multi(_)) {
            self.delete(index)?;
            return self.add_multi(index, value);
        }
        if matches!(self.node(index).value, PropertyValue::Complex(_)) {
            if !value.is_object() {
                return Err(self.err_incompatible_value(index, value));
            }
            self.delete(index)?;
            return self.add_complex(index, value);
        }
        self.store_leaf(index, value)?;
        self.node_mut(index).touched = true;
        self.publish(index, EventKind::Assigned);
        Ok(())
    }

    /// Delete the property's value, leaving it unassigned.
    pub fn delete(&mut self, index: PropertyIndex) -> ScimResult<()> {
        if matches!(self.node(index).value, PropertyValue::Complex(_)) {
            for child in self.children(index).to_vec() {
                self.delete(child)?;
            }
            self.node_mut(index).touched = true;
            return Ok(());
        }
        match &mut self.node_mut(index).value {
            PropertyValue::Multi(elements) => elements.clear(),
            PropertyValue::String { raw, folded } => {
                *raw = None;
                *folded = None;
            }
            PropertyValue::Integer(v) => *v = None,
            PropertyValue::Decimal(v) => *v = None,
            PropertyValue::Boolean(v) => *v = None,
            PropertyValue::DateTime(v) | PropertyValue::Binary(v) | PropertyValue::Reference(v) => {
                *v = None
            }
            PropertyValue::Complex(_) => unreachable!("handled above"),
        }
        self.node_mut(index).touched = true;
        self.publish(index, EventKind::Unassigned);
        Ok(())
    }

    /// Append a fresh unassigned element to a multi-valued property and
    /// return its index. Used by parsers that fill elements in place.
    pub fn new_child(&mut self, index: PropertyIndex) -> ScimResult<PropertyIndex> {
        if !matches!(self.node(index).value, PropertyValue::Multi(_)) {
            return Err(ScimError::internal(format!(
                "new_child on non-multi-valued attribute '{}'",
                self.attribute(index).id
            )));
        }
        let element = self.make_element(index, None)?;
        if let PropertyValue::Multi(elements) = &mut self.node_mut(index).value {
            elements.push(element);
        }
        Ok(element)
    }

    /// Remove unassigned elements from a multi-valued property, preserving
    /// the order of the survivors. No-op on other properties.
    pub fn compact(&mut self, index: PropertyIndex) {
        if !matches!(self.node(index).value, PropertyValue::Multi(_)) {
            return;
        }
        let survivors: Vec<PropertyIndex> = self
            .children(index)
            .to_vec()
            .into_iter()
            .filter(|e| !self.is_unassigned(*e))
            .collect();
        if let PropertyValue::Multi(elements) = &mut self.node_mut(index).value {
            *elements = survivors;
        }
    }

    fn add_complex(&mut self, index: PropertyIndex, value: &Value) -> ScimResult<()> {
        let Value::Object(map) = value else {
            return Err(self.err_incompatible_value(index, value));
        };
        for (name, sub_value) in map {
            let child = self.find_child(index, name).ok_or_else(|| {
                ScimError::no_target(format!(
                    "attribute '{}' has no sub-attribute '{name}'",
                    self.attribute(index).id
                ))
            })?;
            self.add(child, sub_value)?;
        }
        Ok(())
    }

    fn add_multi(&mut self, index: PropertyIndex, value: &Value) -> ScimResult<()> {
        if value.is_null() {
            return Ok(());
        }
        let mut candidates = Vec::new();
        match value {
            Value::Array(items) => {
                for item in items {
                    if item.is_null() {
                        continue;
                    }
                    candidates.push(self.make_element(index, Some(item))?);
                }
            }
            single => candidates.push(self.make_element(index, Some(single))?),
        }

        // Dedup by structural match: a candidate equal to an existing
        // element is dropped, not appended.
        for candidate in candidates {
            let duplicate = self
                .children(index)
                .to_vec()
                .into_iter()
                .any(|existing| self.matches(existing, candidate));
            if !duplicate {
                if let PropertyValue::Multi(elements) = &mut self.node_mut(index).value {
                    elements.push(candidate);
                }
                self.node_mut(index).touched = true;
            }
        }
        Ok(())
    }

    /// Build an element property for a multi-valued property, initialized
    /// with the given value. The element is not appended here.
    fn make_element(
        &mut self,
        multi: PropertyIndex,
        value: Option<&Value>,
    ) -> ScimResult<PropertyIndex> {
        let attr = self.attribute(multi).clone();
        let element_attr = if attr.data_type == AttributeType::Complex {
            attr.new_element_attribute(&[annotations::STATE_SUMMARY])
        } else {
            attr.new_element_attribute(&[])
        };
        let element = self.alloc(element_attr, Some(multi));
        if let Some(v) = value {
            self.replace(element, v)?;
        }
        Ok(element)
    }

    fn store_leaf(&mut self, index: PropertyIndex, value: &Value) -> ScimResult<()> {
        let attr = self.attribute(index).clone();
        let stored = match &self.node(index).value {
            PropertyValue::String { .. } => {
                let s = value
                    .as_str()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?;
                PropertyValue::String {
                    folded: Some(if attr.case_exact {
                        s.to_string()
                    } else {
                        s.to_lowercase()
                    }),
                    raw: Some(s.to_string()),
                }
            }
            PropertyValue::Integer(_) => PropertyValue::Integer(Some(
                value
                    .as_i64()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?,
            )),
            PropertyValue::Decimal(_) => PropertyValue::Decimal(Some(
                value
                    .as_f64()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?,
            )),
            PropertyValue::Boolean(_) => PropertyValue::Boolean(Some(
                value
                    .as_bool()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?,
            )),
            PropertyValue::DateTime(_) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?;
                if DateTime::parse_from_rfc3339(s).is_err() {
                    return Err(ScimError::invalid_value(format!(
                        "'{s}' is not a valid RFC 3339 timestamp for attribute '{}'",
                        attr.id
                    )));
                }
                PropertyValue::DateTime(Some(s.to_string()))
            }
            PropertyValue::Binary(_) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?;
                if BASE64.decode(s).is_err() {
                    return Err(ScimError::invalid_value(format!(
                        "value is not valid base64 for attribute '{}'",
                        attr.id
                    )));
                }
                PropertyValue::Binary(Some(s.to_string()))
            }
            PropertyValue::Reference(_) => {
                let s = value
                    .as_str()
                    .ok_or_else(|| self.err_incompatible_value(index, value))?;
                PropertyValue::Reference(Some(s.to_string()))
            }
            PropertyValue::Complex(_) | PropertyValue::Multi(_) => {
                unreachable!("store_leaf on container property")
            }
        };
        self.node_mut(index).value = stored;
        Ok(())
    }

    fn err_incompatible_value(&self, index: PropertyIndex, value: &Value) -> ScimError {
        ScimError::invalid_value(format!(
            "{value} is incompatible with attribute '{}'",
            self.attribute(index).id
        ))
    }
}
