//! End-to-end serialization scenarios over the embedded schemas.

mod common;

use common::{minimal_user, registry, user_resource, ENTERPRISE_SCHEMA, USER_SCHEMA};
use scim_core::json::{
    deserialize, serialize, DeserializationOptions, SerializationOptions,
};
use scim_core::resource::Resource;
use scim_core::schema::{ResourceType, SchemaRegistry};
use serde_json::{json, Value};

fn serialize_str(resource: &Resource, options: &SerializationOptions) -> String {
    String::from_utf8(serialize(resource, options).unwrap()).unwrap()
}

fn serialize_value(resource: &Resource, options: &SerializationOptions) -> Value {
    serde_json::from_str(&serialize_str(resource, options)).unwrap()
}

#[test]
fn default_projection_omits_never_and_write_only() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("password", &json!("p")).unwrap();

    let out = serialize_str(&user, &SerializationOptions::new());
    assert_eq!(
        out,
        r#"{"schemas":["urn:ietf:params:scim:schemas:core:2.0:User"],"id":"a1","userName":"bob"}"#
    );
}

#[test]
fn include_projection_keeps_always_returned_attributes() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("displayName", &json!("Bob S.")).unwrap();

    let out = serialize_str(&user, &SerializationOptions::new().include(["userName"]));
    assert_eq!(
        out,
        r#"{"schemas":["urn:ietf:params:scim:schemas:core:2.0:User"],"id":"a1","userName":"bob"}"#
    );
}

#[test]
fn include_projection_carries_whole_subtree() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("name.familyName", &json!("Smith")).unwrap();
    user.replace_path("name.givenName", &json!("Bob")).unwrap();

    let out = serialize_value(&user, &SerializationOptions::new().include(["name"]));
    assert_eq!(out["name"]["familyName"], json!("Smith"));
    assert_eq!(out["name"]["givenName"], json!("Bob"));
    assert!(out.get("userName").is_none());
    assert_eq!(out["id"], json!("a1"));
}

#[test]
fn exclude_projection_hides_the_named_subtree() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("name.familyName", &json!("Smith")).unwrap();
    user.replace_path("name.givenName", &json!("Bob")).unwrap();

    let out = serialize_value(&user, &SerializationOptions::new().exclude(["name"]));
    assert!(out.get("name").is_none());
    assert_eq!(out["userName"], json!("bob"));
}

#[test]
fn excluded_leaf_leaves_ancestor_container_visible() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("name.familyName", &json!("Smith")).unwrap();

    // The ancestor container stays visible even when the excluded leaf was
    // its only assigned child; it then serializes its remaining children.
    let out = serialize_value(
        &user,
        &SerializationOptions::new().exclude(["name.familyName"]),
    );
    let name = out.get("name").expect("ancestor container is visible");
    assert!(name.get("familyName").is_none());
    assert_eq!(name["givenName"], json!(null));
}

#[test]
fn write_only_attributes_never_serialize() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path("password", &json!("hunter2")).unwrap();

    for options in [
        SerializationOptions::new(),
        SerializationOptions::new().include(["password"]),
        SerializationOptions::new().exclude(["userName"]),
    ] {
        let out = serialize_str(&user, &options);
        assert!(!out.contains("password"));
        assert!(!out.contains("hunter2"));
    }
}

#[test]
fn extension_attributes_nest_under_their_urn() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.replace_path(
        &format!("{ENTERPRISE_SCHEMA}:department"),
        &json!("Engineering"),
    )
    .unwrap();

    let out = serialize_value(&user, &SerializationOptions::new());
    assert_eq!(out[ENTERPRISE_SCHEMA]["department"], json!("Engineering"));

    let out = serialize_value(
        &user,
        &SerializationOptions::new().include([format!("{ENTERPRISE_SCHEMA}:department")]),
    );
    assert_eq!(out[ENTERPRISE_SCHEMA]["department"], json!("Engineering"));
    assert!(out.get("userName").is_none());
}

#[test]
fn line_separator_is_escaped_for_jsonp() {
    let registry = registry();
    let mut user = user_resource(&registry);
    user.replace_path("displayName", &json!("a\u{2028}b")).unwrap();

    let out = serialize_str(&user, &SerializationOptions::new());
    assert!(out.contains("a\\u2028b"));
}

#[test]
fn multi_valued_elements_serialize_in_stored_order() {
    let registry = registry();
    let mut user = minimal_user(&registry);
    user.add_path(
        "emails",
        &json!([
            {"value": "work@example.com", "type": "work"},
            {"value": "home@example.com", "type": "home"}
        ]),
    )
    .unwrap();

    let out = serialize_value(&user, &SerializationOptions::new());
    assert_eq!(out["emails"][0]["value"], json!("work@example.com"));
    assert_eq!(out["emails"][1]["value"], json!("home@example.com"));
}

#[test]
fn round_trip_preserves_returned_fields() {
    let registry = registry();
    let mut original = minimal_user(&registry);
    original.replace_path("externalId", &json!("ext-7")).unwrap();
    original.replace_path("active", &json!(true)).unwrap();
    original
        .replace_path("name", &json!({"familyName": "Smith", "givenName": "Bob"}))
        .unwrap();
    original
        .add_path(
            "emails",
            &json!([
                {"value": "bob@example.com", "type": "work", "primary": true},
                {"value": "bob@home.example", "type": "home"}
            ]),
        )
        .unwrap();

    let bytes = serialize(&original, &SerializationOptions::new()).unwrap();

    let mut restored = user_resource(&registry);
    deserialize(&mut restored, &bytes, &DeserializationOptions::new()).unwrap();

    assert_eq!(original.hash(), restored.hash());
    assert_eq!(
        original.value_at("emails").unwrap(),
        restored.value_at("emails").unwrap()
    );
    assert_eq!(restored.value_at("userName").unwrap(), json!("bob"));
    assert_eq!(restored.value_at("schemas").unwrap(), json!([USER_SCHEMA]));
}

#[test]
fn decimal_attributes_use_ecmascript_notation() {
    let mut registry = SchemaRegistry::new().unwrap();
    let sensor_schema = SchemaRegistry::load_schema_from_str(
        r#"{
          "id": "urn:example:schemas:2.0:Sensor",
          "name": "Sensor",
          "description": "Sensor reading",
          "attributes": [
            {"name": "reading", "type": "decimal"},
            {"name": "sampleCount", "type": "integer"},
            {"name": "captured", "type": "dateTime"},
            {"name": "payload", "type": "binary"}
          ]
        }"#,
    )
    .unwrap();
    let sensor_schema = registry.add_schema(sensor_schema);
    let sensor_type = registry.add_resource_type(ResourceType::new(
        "Sensor",
        "Sensor reading",
        "/Sensors",
        &sensor_schema,
        &[],
    ));

    let mut sensor = Resource::new(sensor_type);
    sensor.replace_path("reading", &json!(1.5e-9)).unwrap();
    let out = serialize_str(&sensor, &SerializationOptions::new());
    assert_eq!(out, r#"{"reading":1.5e-9}"#);

    sensor.replace_path("reading", &json!(3.141592653589793)).unwrap();
    sensor.replace_path("sampleCount", &json!(42)).unwrap();
    sensor
        .replace_path("captured", &json!("2024-05-01T12:30:00Z"))
        .unwrap();
    let out = serialize_value(&sensor, &SerializationOptions::new());
    assert_eq!(out["reading"], json!(3.141592653589793));
    assert_eq!(out["sampleCount"], json!(42));
    assert_eq!(out["captured"], json!("2024-05-01T12:30:00Z"));
}

#[test]
fn invalid_projection_path_fails() {
    let registry = registry();
    let user = minimal_user(&registry);
    let err = serialize(
        &user,
        &SerializationOptions::new().include(["no.such.attr"]),
    )
    .unwrap_err();
    assert_eq!(err.scim_type(), "invalidPath");
}
