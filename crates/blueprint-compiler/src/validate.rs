//! Cross-entity checks over a fully built Blueprint.

use std::collections::{BTreeSet, HashSet};

use crate::blueprint::Blueprint;
use crate::error::CompileError;
use crate::property::{Field, FieldExtra, FieldKind, ListItem, PropertyGroup, VariantGroup};
use crate::resources::Resource;

/// Check the invariants construction does not enforce inline.
///
/// `action_attempt_types` is the set harvested from the action-attempt union.
pub fn validate_blueprint(
    blueprint: &Blueprint,
    action_attempt_types: &BTreeSet<String>,
) -> Result<(), CompileError> {
    let mut route_paths = HashSet::new();
    for route in &blueprint.routes {
        if !route_paths.insert(route.path.as_str()) {
            return Err(CompileError::DuplicateRoutePath(route.path.clone()));
        }
    }

    let resources = blueprint
        .resources
        .iter()
        .chain(blueprint.events.iter().map(|event| &event.resource))
        .chain(blueprint.action_attempts.iter().map(|attempt| &attempt.resource));
    for resource in resources {
        if !route_paths.contains(resource.route_path.as_str()) {
            return Err(CompileError::UnknownRoutePath(format!(
                "'{}' declared by resource '{}'",
                resource.route_path, resource.resource_type
            )));
        }
        check_resource(resource)?;
    }

    if let Some(pagination) = &blueprint.pagination {
        check_fields(
            &pagination.properties,
            &pagination.property_groups,
            "pagination",
        )?;
    }

    for endpoint in blueprint.routes.iter().flat_map(|route| &route.endpoints) {
        check_fields(&endpoint.request.parameters, &[], &endpoint.path)?;

        let action_attempt_type = endpoint
            .response
            .resource()
            .and_then(|response| response.action_attempt_type.as_ref());
        if let Some(action_type) = action_attempt_type {
            if !action_attempt_types.contains(action_type) {
                return Err(CompileError::InvalidActionAttemptType(format!(
                    "'{}' at {}",
                    action_type, endpoint.path
                )));
            }
        }
    }

    Ok(())
}

fn check_resource(resource: &Resource) -> Result<(), CompileError> {
    let location = format!("resource '{}'", resource.resource_type);
    check_fields(&resource.properties, &resource.property_groups, &location)
}

/// Check a field list against the nearest group scope that declares groups.
fn check_fields<X: FieldExtra>(
    fields: &[Field<X>],
    scope: &[PropertyGroup],
    location: &str,
) -> Result<(), CompileError> {
    for field in fields {
        let field_location = format!("{}.{}", location, field.name);
        if let Some(key) = field.extra.group_key() {
            if !scope.iter().any(|group| group.property_group_key == key) {
                return Err(CompileError::UndeclaredGroupKey(format!(
                    "property group '{}' at {}",
                    key, field_location
                )));
            }
        }

        match &field.kind {
            FieldKind::Object {
                properties,
                property_groups,
            } => check_fields(
                properties,
                nearest(property_groups, scope),
                &field_location,
            )?,
            FieldKind::List { item } => check_list_item(item, scope, &field_location)?,
            _ => {}
        }
    }
    Ok(())
}

fn check_list_item<X: FieldExtra>(
    item: &ListItem<X>,
    scope: &[PropertyGroup],
    location: &str,
) -> Result<(), CompileError> {
    match item {
        ListItem::Object {
            item_properties,
            item_property_groups,
        } => check_fields(
            item_properties,
            nearest(item_property_groups, scope),
            location,
        ),
        ListItem::DiscriminatedObject {
            discriminator,
            variants,
            variant_groups,
        } => {
            if discriminator.is_empty() {
                return Err(CompileError::MissingDiscriminator(location.to_string()));
            }
            for (index, variant) in variants.iter().enumerate() {
                let variant_location = format!("{}[{}]", location, index);
                if let Some(key) = variant.variant_group_key.as_deref() {
                    if !declares_variant_group(variant_groups, key) {
                        return Err(CompileError::UndeclaredGroupKey(format!(
                            "variant group '{}' at {}",
                            key, variant_location
                        )));
                    }
                }
                check_fields(
                    &variant.properties,
                    nearest(&variant.property_groups, scope),
                    &variant_location,
                )?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn declares_variant_group(groups: &[VariantGroup], key: &str) -> bool {
    groups.iter().any(|group| group.variant_group_key == key)
}

fn nearest<'a>(own: &'a [PropertyGroup], enclosing: &'a [PropertyGroup]) -> &'a [PropertyGroup] {
    if own.is_empty() {
        enclosing
    } else {
        own
    }
}
