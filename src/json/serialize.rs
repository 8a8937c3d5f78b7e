//! Projection-aware JSON serialization of resources.

use crate::error::{ScimError, ScimResult};
use crate::path::{compile_path, PathAncestry};
use crate::property::PropertyRef;
use crate::resource::{Resource, Visitor};
use crate::schema::{AttributeType, Mutability, ResourceType, Returned};
use std::io::Write as _;

const HEX: &[u8; 16] = b"0123456789abcdef";

/// Options controlling serialization output.
///
/// At most one of the included / excluded path sets may be non-empty. With
/// neither set, visibility follows the attributes' `returned` dispositions
/// alone.
#[derive(Debug, Clone)]
pub struct SerializationOptions {
    included: Vec<String>,
    excluded: Vec<String>,
    html_safe: bool,
}

impl Default for SerializationOptions {
    fn default() -> Self {
        Self {
            included: Vec::new(),
            excluded: Vec::new(),
            html_safe: true,
        }
    }
}

impl SerializationOptions {
    /// Default options: no projection, HTML-safe escaping on.
    pub fn new() -> Self {
        Self::default()
    }

    /// Project onto the given SCIM paths (the `attributes` parameter).
    pub fn include<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.included = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Hide the given SCIM paths (the `excludedAttributes` parameter).
    pub fn exclude<S: Into<String>>(mut self, paths: impl IntoIterator<Item = S>) -> Self {
        self.excluded = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Toggle escaping of `<`, `>` and `&`. On by default; turn off only
    /// when the output never reaches a browser.
    pub fn html_safe(mut self, on: bool) -> Self {
        self.html_safe = on;
        self
    }
}

/// Serialize a resource to canonical SCIM JSON.
///
/// # Errors
///
/// `invalidRequest` when both included and excluded paths are supplied;
/// `invalidPath` when a projection path does not compile; `internal` when a
/// decimal value is NaN or infinite.
///
/// # Examples
///
/// ```rust
/// use scim_core::json::{serialize, SerializationOptions};
/// use scim_core::resource::Resource;
/// use scim_core::schema::SchemaRegistry;
/// use serde_json::json;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let registry = SchemaRegistry::new()?;
/// let mut user = Resource::new(registry.resource_type("User").unwrap().clone());
/// user.add_path("schemas", &json!(["urn:ietf:params:scim:schemas:core:2.0:User"]))?;
/// user.replace_path("id", &json!("a1"))?;
/// user.replace_path("userName", &json!("bob"))?;
///
/// let bytes = serialize(&user, &SerializationOptions::new())?;
/// assert_eq!(
///     String::from_utf8(bytes)?,
///     r#"{"schemas":["urn:ietf:params:scim:schemas:core:2.0:User"],"id":"a1","userName":"bob"}"#
/// );
/// # Ok(())
/// # }
/// ```
pub fn serialize(resource: &Resource, options: &SerializationOptions) -> ScimResult<Vec<u8>> {
    if !options.included.is_empty() && !options.excluded.is_empty() {
        return Err(ScimError::invalid_request(
            "only one of 'attributes' and 'excludedAttributes' may be used",
        ));
    }

    let resource_type = resource.resource_type();
    let mut include_family = None;
    let mut exclude_family = None;
    if !options.included.is_empty() {
        let mut family = PathAncestry::new();
        for path in &options.included {
            family.add(&compile_path(path, resource_type)?);
        }
        include_family = Some(family);
        log::debug!("serializing with {} included paths", options.included.len());
    } else if !options.excluded.is_empty() {
        let mut family = PathAncestry::new();
        for path in &options.excluded {
            family.add(&compile_path(path, resource_type)?);
        }
        exclude_family = Some(family);
        log::debug!("serializing with {} excluded paths", options.excluded.len());
    }

    let mut serializer = JsonSerializer {
        buf: Vec::new(),
        include_family,
        exclude_family,
        stack: Vec::new(),
        resource_type: resource_type.as_ref(),
        html_safe: options.html_safe,
    };
    resource.visit(&mut serializer)?;
    Ok(serializer.buf)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FrameKind {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    index: usize,
}

struct JsonSerializer<'a> {
    buf: Vec<u8>,
    include_family: Option<PathAncestry>,
    exclude_family: Option<PathAncestry>,
    stack: Vec<Frame>,
    resource_type: &'a ResourceType,
    html_safe: bool,
}

impl JsonSerializer<'_> {
    fn current(&mut self) -> &mut Frame {
        self.stack.last_mut().expect("serializer stack is empty")
    }

    fn push(&mut self, kind: FrameKind) {
        self.stack.push(Frame { kind, index: 0 });
    }

    fn pop(&mut self) {
        self.stack.pop().expect("cannot pop on empty stack");
    }

    fn append_property_name(&mut self, name: &str) {
        self.buf.push(b'"');
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.push(b'"');
        self.buf.push(b':');
    }

    fn append_string(&mut self, value: &str) {
        // Values are Rust strings, so invalid UTF-8 cannot reach this
        // encoder; only escaping remains.
        self.buf.push(b'"');
        for c in value.chars() {
            match c {
                '"' => self.buf.extend_from_slice(b"\\\""),
                '\\' => self.buf.extend_from_slice(b"\\\\"),
                '\n' => self.buf.extend_from_slice(b"\\n"),
                '\r' => self.buf.extend_from_slice(b"\\r"),
                '\t' => self.buf.extend_from_slice(b"\\t"),
                c if (c as u32) < 0x20 => self.append_short_escape(c as u32),
                // Escaping <, > and & closes injection holes when
                // user-controlled strings are served to browsers.
                '<' | '>' | '&' if self.html_safe => self.append_short_escape(c as u32),
                // U+2028 and U+2029 are valid in JSON strings but not in
                // JavaScript source, which breaks JSONP consumers; escaping
                // them is always valid JSON.
                '\u{2028}' => self.buf.extend_from_slice(b"\\u2028"),
                '\u{2029}' => self.buf.extend_from_slice(b"\\u2029"),
                c => {
                    let mut utf8 = [0u8; 4];
                    self.buf
                        .extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
        self.buf.push(b'"');
    }

    fn append_short_escape(&mut self, code: u32) {
        self.buf.extend_from_slice(b"\\u00");
        self.buf.push(HEX[(code >> 4) as usize & 0xF]);
        self.buf.push(HEX[(code & 0xF) as usize]);
    }

    fn append_decimal(&mut self, value: f64) -> ScimResult<()> {
        if value.is_nan() || value.is_infinite() {
            return Err(ScimError::internal(format!(
                "{value} is not a valid decimal"
            )));
        }

        // ECMAScript number-to-string: fixed notation in the middle range,
        // exponential outside it, exponent unpadded and signed.
        let abs = value.abs();
        if abs != 0.0 && (abs < 1e-6 || abs >= 1e21) {
            let formatted = format!("{value:e}");
            match formatted.find('e') {
                Some(pos) if !formatted[pos + 1..].starts_with('-') => {
                    self.buf.extend_from_slice(formatted[..=pos].as_bytes());
                    self.buf.push(b'+');
                    self.buf.extend_from_slice(formatted[pos + 1..].as_bytes());
                }
                _ => self.buf.extend_from_slice(formatted.as_bytes()),
            }
        } else {
            let _ = write!(self.buf, "{value}");
        }
        Ok(())
    }

    fn append_boolean(&mut self, value: bool) {
        self.buf
            .extend_from_slice(if value { b"true" as &[u8] } else { b"false" });
    }
}

impl Visitor for JsonSerializer<'_> {
    fn should_visit(&mut self, property: PropertyRef<'_>) -> bool {
        let attr = property.attribute();

        // Write-only properties are never returned. Usually coupled with
        // returned=never, but checked independently to make sure.
        if attr.mutability == Mutability::WriteOnly {
            return false;
        }

        match attr.returned {
            Returned::Always => true,
            Returned::Never => false,
            Returned::Default => {
                if self.include_family.is_none() && self.exclude_family.is_none() {
                    return !property.is_unassigned();
                }
                let path = self.resource_type.must_path(&attr.id);
                if let Some(family) = &self.include_family {
                    family.is_member(path) || family.is_ancestor(path) || family.is_offspring(path)
                } else if let Some(family) = &self.exclude_family {
                    // The exclusion covers the path and everything below
                    // it; ancestor containers stay visible.
                    !(family.is_member(path) || family.is_offspring(path))
                } else {
                    unreachable!("either include or exclude family is set")
                }
            }
            Returned::Request => match &self.include_family {
                Some(family) => {
                    let path = self.resource_type.must_path(&attr.id);
                    family.is_member(path) || family.is_ancestor(path) || family.is_offspring(path)
                }
                None => false,
            },
        }
    }

    fn visit(&mut self, property: PropertyRef<'_>) -> ScimResult<()> {
        if self.current().index > 0 {
            self.buf.push(b',');
        }
        if self.current().kind == FrameKind::Object {
            self.append_property_name(&property.attribute().name);
        }

        // Containers emit their open token in begin_children.
        if property.is_container() {
            return Ok(());
        }

        if property.is_unassigned() {
            self.buf.extend_from_slice(b"null");
        } else {
            match property.attribute().data_type {
                AttributeType::String
                | AttributeType::Reference
                | AttributeType::DateTime
                | AttributeType::Binary => {
                    let raw = property.raw();
                    let value = raw.as_str().expect("assigned string-typed property");
                    self.append_string(value);
                }
                AttributeType::Integer => {
                    let value = property.raw().as_i64().expect("assigned integer property");
                    let _ = write!(self.buf, "{value}");
                }
                AttributeType::Decimal => {
                    let value = property.raw().as_f64().expect("assigned decimal property");
                    self.append_decimal(value)?;
                }
                AttributeType::Boolean => {
                    let value = property.raw().as_bool().expect("assigned boolean property");
                    self.append_boolean(value);
                }
                AttributeType::Complex => unreachable!("containers handled above"),
            }
        }

        self.current().index += 1;
        Ok(())
    }

    fn begin_children(&mut self, container: PropertyRef<'_>) {
        let attr = container.attribute();
        if attr.multi_valued {
            self.buf.push(b'[');
            self.push(FrameKind::Array);
        } else if attr.data_type == AttributeType::Complex {
            self.buf.push(b'{');
            self.push(FrameKind::Object);
        } else {
            unreachable!("unknown container");
        }
    }

    fn end_children(&mut self, container: PropertyRef<'_>) {
        let attr = container.attribute();
        if attr.multi_valued {
            self.buf.push(b']');
        } else if attr.data_type == AttributeType::Complex {
            self.buf.push(b'}');
        } else {
            unreachable!("unknown container");
        }
        self.pop();
        if let Some(frame) = self.stack.last_mut() {
            frame.index += 1;
        }
    }
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

    fn serialize_str(resource: &Resource, options: &SerializationOptions) -> String {
        String::from_utf8(serialize(resource, options).unwrap()).unwrap()
    }

    fn bare_serializer(resource_type: &ResourceType) -> JsonSerializer<'_> {
        JsonSerializer {
            buf: Vec::new(),
            include_family: None,
            exclude_family: None,
            stack: Vec::new(),
            resource_type,
            html_safe: true,
        }
    }

    #[test]
    fn test_control_and_line_separator_escapes() {
        let mut user = user_resource();
        user.replace_path("displayName", &json!("a\u{2028}b\nc\u{0001}d"))
            .unwrap();
        let out = serialize_str(&user, &SerializationOptions::new());
        assert_eq!(out, "{\"displayName\":\"a\\u2028b\\nc\\u0001d\"}");
    }

    #[test]
    fn test_html_safe_escaping_is_default() {
        let mut user = user_resource();
        user.replace_path("displayName", &json!("a<b>&c")).unwrap();

        let out = serialize_str(&user, &SerializationOptions::new());
        assert_eq!(out, "{\"displayName\":\"a\\u003cb\\u003e\\u0026c\"}");

        let out = serialize_str(&user, &SerializationOptions::new().html_safe(false));
        assert_eq!(out, "{\"displayName\":\"a<b>&c\"}");
    }

    #[test]
    fn test_decimal_exponent_is_not_padded() {
        let registry = SchemaRegistry::new().unwrap();
        let resource_type = registry.resource_type("User").unwrap().clone();
        let mut serializer = bare_serializer(&resource_type);

        serializer.append_decimal(1.5e-9).unwrap();
        assert_eq!(serializer.buf, b"1.5e-9");

        serializer.buf.clear();
        serializer.append_decimal(1e21).unwrap();
        assert_eq!(serializer.buf, b"1e+21");

        serializer.buf.clear();
        serializer.append_decimal(3.25).unwrap();
        assert_eq!(serializer.buf, b"3.25");

        serializer.buf.clear();
        serializer.append_decimal(0.0).unwrap();
        assert_eq!(serializer.buf, b"0");
    }

    #[test]
    fn test_decimal_nan_and_infinity_are_internal_errors() {
        let registry = SchemaRegistry::new().unwrap();
        let resource_type = registry.resource_type("User").unwrap().clone();
        let mut serializer = bare_serializer(&resource_type);

        assert_eq!(
            serializer.append_decimal(f64::NAN).unwrap_err().scim_type(),
            "internal"
        );
        assert_eq!(
            serializer
                .append_decimal(f64::INFINITY)
                .unwrap_err()
                .scim_type(),
            "internal"
        );
    }

    #[test]
    fn test_both_projections_rejected() {
        let user = user_resource();
        let options = SerializationOptions::new()
            .include(["userName"])
            .exclude(["name"]);
        let err = serialize(&user, &options).unwrap_err();
        assert_eq!(err.scim_type(), "invalidRequest");
    }
}
