//! Property and resource filters.
//!
//! Filters are the small rule units services run over resources before
//! persisting them. Property filters visit every property and check or
//! adjust the ones they support; resource filters run once per resource.

use crate::error::{ScimError, ScimResult};
use crate::property::PropertyRef;
use crate::resource::{Resource, Visitor};
use crate::schema::Attribute;
use serde_json::Value;
use uuid::Uuid;

/// A per-property rule applied during a traversal of the resource.
pub trait PropertyFilter {
    /// Whether the filter applies to properties of this attribute.
    fn supports(&self, attribute: &Attribute) -> bool;

    /// Relative execution order; lower runs first.
    fn order(&self) -> usize;

    /// Check or react to one supported property.
    fn filter(&self, resource: &Resource, property: PropertyRef<'_>) -> ScimResult<()>;
}

/// Run property filters over every property of the resource, in order.
pub fn run_property_filters(
    resource: &Resource,
    filters: &mut [&dyn PropertyFilter],
) -> ScimResult<()> {
    filters.sort_by_key(|filter| filter.order());
    let mut runner = FilterRunner { resource, filters };
    resource.visit(&mut runner)
}

struct FilterRunner<'a> {
    resource: &'a Resource,
    filters: &'a [&'a dyn PropertyFilter],
}

impl Visitor for FilterRunner<'_> {
    fn should_visit(&mut self, _property: PropertyRef<'_>) -> bool {
        true
    }

    fn visit(&mut self, property: PropertyRef<'_>) -> ScimResult<()> {
        for filter in self.filters {
            if filter.supports(property.attribute()) {
                filter.filter(self.resource, property)?;
            }
        }
        Ok(())
    }

    fn begin_children(&mut self, _container: PropertyRef<'_>) {}

    fn end_children(&mut self, _container: PropertyRef<'_>) {}
}

/// Checks that required attributes are not unassigned.
pub struct RequiredFilter {
    order: usize,
}

impl RequiredFilter {
    pub fn new(order: usize) -> Self {
        Self { order }
    }
}

impl PropertyFilter for RequiredFilter {
    fn supports(&self, attribute: &Attribute) -> bool {
        attribute.required
    }

    fn order(&self) -> usize {
        self.order
    }

    fn filter(&self, _resource: &Resource, property: PropertyRef<'_>) -> ScimResult<()> {
        if !property.is_unassigned() {
            return Ok(());
        }
        Err(ScimError::invalid_value(format!(
            "'{}' is required, but is unassigned",
            property.attribute().name
        )))
    }
}

/// A per-resource rule applied before persistence.
pub trait ResourceFilter {
    /// Relative execution order; lower runs first.
    fn order(&self) -> usize;

    /// Adjust the resource.
    fn filter(&self, resource: &mut Resource) -> ScimResult<()>;
}

/// Run resource filters in order.
pub fn run_resource_filters(
    resource: &mut Resource,
    filters: &mut [&dyn ResourceFilter],
) -> ScimResult<()> {
    filters.sort_by_key(|filter| filter.order());
    for filter in filters.iter() {
        filter.filter(resource)?;
    }
    Ok(())
}

/// Stamps a fresh UUID on the `id` attribute.
pub struct IdFilter {
    order: usize,
}

impl IdFilter {
    pub fn new(order: usize) -> Self {
        Self { order }
    }
}

impl ResourceFilter for IdFilter {
    fn order(&self) -> usize {
        self.order
    }

    fn filter(&self, resource: &mut Resource) -> ScimResult<()> {
        resource.replace_path("id", &Value::String(Uuid::new_v4().to_string()))
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

    #[test]
    fn test_required_filter_flags_unassigned_user_name() {
        let resource = user_resource();
        let required = RequiredFilter::new(0);
        let mut filters: [&dyn PropertyFilter; 1] = [&required];
        let err = run_property_filters(&resource, &mut filters).unwrap_err();
        assert_eq!(err.scim_type(), "invalidValue");
        assert!(err.to_string().contains("schemas") || err.to_string().contains("userName"));
    }

    #[test]
    fn test_required_filter_passes_assigned_resource() {
        let mut resource = user_resource();
        resource
            .add_path(
                "schemas",
                &json!(["urn:ietf:params:scim:schemas:core:2.0:User"]),
            )
            .unwrap();
        resource.replace_path("userName", &json!("bob")).unwrap();

        let required = RequiredFilter::new(0);
        let mut filters: [&dyn PropertyFilter; 1] = [&required];
        run_property_filters(&resource, &mut filters).unwrap();
    }

    #[test]
    fn test_id_filter_generates_uuid() {
        let mut resource = user_resource();
        let id_filter = IdFilter::new(0);
        let mut filters: [&dyn ResourceFilter; 1] = [&id_filter];
        run_resource_filters(&mut resource, &mut filters).unwrap();

        let id = resource.id().unwrap();
        assert_eq!(id.len(), 36);
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
