//! Resource, event, and action-attempt classification over component schemas.

use std::collections::BTreeSet;

use blueprint_spec_parser::{SchemaNode, SchemaType};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::blueprint::CompileOptions;
use crate::classify::{property_groups, Classifier};
use crate::docs::{normalize_description, DocMeta};
use crate::error::{CompileError, CompileWarning, WARN_SCHEMA_SKIPPED};
use crate::flatten::{flatten, merged_groups};
use crate::property::{Property, PropertyGroup};
use crate::samples::ResourceSample;

/// Literal property every action-attempt branch is keyed by.
const ACTION_TYPE_PROPERTY: &str = "action_type";

/// Values the merged `status` property of an action attempt is restricted to.
const ACTION_ATTEMPT_STATUSES: [&str; 3] = ["success", "pending", "error"];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub resource_type: String,
    pub route_path: String,
    #[serde(flatten)]
    pub doc: DocMeta,
    pub properties: Vec<Property>,
    pub property_groups: Vec<PropertyGroup>,
    pub resource_samples: Vec<ResourceSample>,
}

/// One branch of an event union.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    #[serde(flatten)]
    pub resource: Resource,
    pub event_type: String,
}

/// The merged shape of every action attempt sharing one action type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionAttempt {
    #[serde(flatten)]
    pub resource: Resource,
    pub action_attempt_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub response_key: String,
    pub description: String,
    pub properties: Vec<Property>,
    pub property_groups: Vec<PropertyGroup>,
}

/// Everything derived from the component schemas.
#[derive(Debug, Default)]
pub struct ResourceSet {
    pub resources: Vec<Resource>,
    pub events: Vec<EventResource>,
    pub action_attempts: Vec<ActionAttempt>,
    pub pagination: Option<Pagination>,
}

/// Action types declared by the action-attempt union, via each branch's `action_type` literal.
pub fn harvest_action_attempt_types(
    schemas: &IndexMap<String, SchemaNode>,
    options: &CompileOptions,
) -> BTreeSet<String> {
    schemas
        .get(&options.action_attempt_schema)
        .and_then(|union| union.one_of.as_ref())
        .into_iter()
        .flatten()
        .filter_map(|branch| action_type(&flatten(branch)))
        .collect()
}

fn action_type(branch: &SchemaNode) -> Option<String> {
    branch
        .properties
        .as_ref()?
        .get(ACTION_TYPE_PROPERTY)?
        .string_enum()?
        .first()
        .map(|literal| literal.to_string())
}

/// Walk the component schemas in declaration order.
pub fn classify_resources(
    schemas: &IndexMap<String, SchemaNode>,
    options: &CompileOptions,
    warnings: &mut Vec<CompileWarning>,
) -> Result<ResourceSet, CompileError> {
    let mut set = ResourceSet::default();

    for (name, node) in schemas {
        if *name == options.pagination_schema {
            set.pagination = Some(pagination(name, node, options, warnings)?);
            continue;
        }
        if *name == options.action_attempt_schema && node.one_of.is_some() {
            let (common, attempts) = action_attempts(name, node, warnings)?;
            set.resources.extend(common);
            set.action_attempts.extend(attempts);
            continue;
        }
        let Some(route_path) = node.route_path.as_deref() else {
            tracing::debug!(schema = %name, "schema has no route path, ignoring");
            continue;
        };
        if node.one_of.is_some() && node.discriminator_property().is_some() {
            let (common, events) = event_union(name, node, route_path, warnings)?;
            set.resources.push(common);
            set.events.extend(events);
            continue;
        }

        let flat = flatten(node);
        if !flat.is_type("object") || flat.properties.as_ref().map_or(true, IndexMap::is_empty) {
            blueprint_telemetry::log_schema_skipped!(
                schema = %name,
                "schema with a route path is not an object with properties"
            );
            warnings.push(CompileWarning {
                code: WARN_SCHEMA_SKIPPED.to_string(),
                message: format!("schema '{}' is not an object with properties", name),
                location: Some(name.clone()),
            });
            continue;
        }
        set.resources
            .push(resource(name, &flat, route_path.to_string(), warnings)?);
    }

    Ok(set)
}

fn resource(
    resource_type: &str,
    flat: &SchemaNode,
    route_path: String,
    warnings: &mut Vec<CompileWarning>,
) -> Result<Resource, CompileError> {
    let location = format!("resource '{}'", resource_type);
    Ok(Resource {
        resource_type: resource_type.to_string(),
        route_path,
        doc: DocMeta::from_schema(flat),
        properties: Classifier::new(warnings).classify_properties(flat, &location)?,
        property_groups: property_groups(flat.property_groups.as_ref()),
        resource_samples: Vec::new(),
    })
}

fn pagination(
    name: &str,
    node: &SchemaNode,
    options: &CompileOptions,
    warnings: &mut Vec<CompileWarning>,
) -> Result<Pagination, CompileError> {
    let flat = flatten(node);
    Ok(Pagination {
        response_key: options.pagination_response_key.clone(),
        description: flat
            .description
            .as_deref()
            .map(normalize_description)
            .unwrap_or_default(),
        properties: Classifier::new(warnings)
            .classify_properties(&flat, &format!("pagination '{}'", name))?,
        property_groups: property_groups(flat.property_groups.as_ref()),
    })
}

/// An object holding the properties every branch declares, taken from the first branch.
fn common_properties(union: &SchemaNode, branches: &[SchemaNode]) -> SchemaNode {
    let mut properties: IndexMap<String, SchemaNode> = branches
        .first()
        .and_then(|branch| branch.properties.clone())
        .unwrap_or_default();
    properties.retain(|name, _| {
        branches
            .iter()
            .all(|branch| branch.properties.as_ref().is_some_and(|p| p.contains_key(name)))
    });

    let mut required: Vec<String> = branches
        .first()
        .map(|branch| branch.required_names().to_vec())
        .unwrap_or_default();
    required.retain(|name| {
        properties.contains_key(name)
            && branches
                .iter()
                .all(|branch| branch.required_names().contains(name))
    });

    SchemaNode {
        schema_type: Some(SchemaType::Single("object".to_string())),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        one_of: None,
        discriminator: None,
        ..union.clone()
    }
}

fn event_union(
    name: &str,
    union: &SchemaNode,
    route_path: &str,
    warnings: &mut Vec<CompileWarning>,
) -> Result<(Resource, Vec<EventResource>), CompileError> {
    let discriminator = union.discriminator_property().unwrap_or_default();
    if discriminator.is_empty() {
        return Err(CompileError::MissingDiscriminator(format!(
            "event union '{}'",
            name
        )));
    }

    let branches: Vec<SchemaNode> = union
        .one_of
        .iter()
        .flatten()
        .map(flatten)
        .filter(|branch| branch.is_type("object"))
        .collect();

    let common = resource(
        name,
        &common_properties(union, &branches),
        route_path.to_string(),
        warnings,
    )?;

    let mut events = Vec::with_capacity(branches.len());
    for (index, branch) in branches.iter().enumerate() {
        let event_type = branch
            .properties
            .as_ref()
            .and_then(|properties| properties.get(discriminator))
            .and_then(SchemaNode::string_enum)
            .and_then(|literals| literals.first().map(|l| l.to_string()))
            .ok_or_else(|| {
                CompileError::MissingDiscriminator(format!(
                    "branch {} of event union '{}' has no '{}' literal",
                    index, name, discriminator
                ))
            })?;
        let branch_route = branch.route_path.as_deref().unwrap_or(route_path);
        let scoped = SchemaNode {
            property_groups: merged_groups(
                union.property_groups.as_ref(),
                std::iter::once(branch.property_groups.as_ref()),
            ),
            ..branch.clone()
        };
        events.push(EventResource {
            resource: resource(name, &scoped, branch_route.to_string(), warnings)?,
            event_type,
        });
    }

    Ok((common, events))
}

fn action_attempts(
    name: &str,
    union: &SchemaNode,
    warnings: &mut Vec<CompileWarning>,
) -> Result<(Option<Resource>, Vec<ActionAttempt>), CompileError> {
    let branches: Vec<SchemaNode> = union.one_of.iter().flatten().map(flatten).collect();

    let mut by_type: IndexMap<String, Vec<&SchemaNode>> = IndexMap::new();
    for (index, branch) in branches.iter().enumerate() {
        match action_type(branch) {
            Some(action_type) => by_type.entry(action_type).or_default().push(branch),
            None => {
                blueprint_telemetry::log_schema_skipped!(
                    schema = %name,
                    branch = index,
                    "action attempt branch has no action_type literal"
                );
                warnings.push(CompileWarning {
                    code: WARN_SCHEMA_SKIPPED.to_string(),
                    message: format!("branch {} has no '{}' literal", index, ACTION_TYPE_PROPERTY),
                    location: Some(name.to_string()),
                });
            }
        }
    }

    let mut attempts = Vec::with_capacity(by_type.len());
    for (action_type, group) in by_type {
        let route_path = group
            .iter()
            .find_map(|branch| branch.route_path.clone())
            .or_else(|| union.route_path.clone())
            .ok_or_else(|| {
                CompileError::UnknownRoutePath(format!(
                    "action attempt '{}' declares no x-route-path",
                    action_type
                ))
            })?;
        let merged = merge_action_attempt(union, &group);
        attempts.push(ActionAttempt {
            resource: resource(name, &merged, route_path, warnings)?,
            action_attempt_type: action_type,
        });
    }

    let common = match union.route_path.clone() {
        Some(route_path) => Some(resource(
            name,
            &common_properties(union, &branches),
            route_path,
            warnings,
        )?),
        None => None,
    };

    Ok((common, attempts))
}

/// Merge branches sharing one action type into a single object schema.
///
/// On a property conflict the first non-nullable definition wins, otherwise the
/// first seen. `status` is always replaced by the fixed status enum.
fn merge_action_attempt(union: &SchemaNode, group: &[&SchemaNode]) -> SchemaNode {
    let mut properties: IndexMap<String, SchemaNode> = IndexMap::new();
    for branch in group {
        for (name, property) in branch.properties.iter().flatten() {
            match properties.get_mut(name) {
                Some(existing) if existing.is_nullable() && !property.is_nullable() => {
                    *existing = property.clone();
                }
                Some(_) => {}
                None => {
                    properties.insert(name.clone(), property.clone());
                }
            }
        }
    }

    let status_description = properties
        .get("status")
        .and_then(|status| status.description.clone());
    properties.insert(
        "status".to_string(),
        SchemaNode {
            schema_type: Some(SchemaType::Single("string".to_string())),
            enum_values: Some(
                ACTION_ATTEMPT_STATUSES
                    .iter()
                    .map(|status| Value::String(status.to_string()))
                    .collect(),
            ),
            description: status_description,
            ..SchemaNode::default()
        },
    );

    let mut required: Vec<String> = group
        .first()
        .map(|branch| branch.required_names().to_vec())
        .unwrap_or_default();
    for branch in group.iter().skip(1) {
        required.retain(|name| branch.required_names().contains(name));
    }

    let first = group.first().copied();
    SchemaNode {
        schema_type: Some(SchemaType::Single("object".to_string())),
        description: first
            .and_then(|branch| branch.description.clone())
            .or_else(|| union.description.clone()),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        property_groups: merged_groups(
            union.property_groups.as_ref(),
            group.iter().map(|branch| branch.property_groups.as_ref()),
        ),
        ..SchemaNode::default()
    }
}
