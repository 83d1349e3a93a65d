//! Schema flattening.
//!
//! Collapses `allOf` / `oneOf` composition into a plain object or string-enum
//! schema. Flattening never mutates its input and is idempotent.

use indexmap::IndexMap;
use serde_json::Value;

use blueprint_spec_parser::{GroupDefinition, SchemaNode, SchemaType};

/// Flatten a schema node into its canonical shape.
///
/// - `allOf`: object; properties are the union of all branches (later wins),
///   required is the union of all branches.
/// - `oneOf` of string enums: string; enum is the deduplicated union.
/// - `oneOf` otherwise: object; properties are the union (later wins),
///   required is the intersection of all branches.
/// - Object with properties: each property flattened independently.
/// - Anything else (arrays included) is returned unchanged.
pub fn flatten(node: &SchemaNode) -> SchemaNode {
    if let Some(branches) = &node.all_of {
        return merge_all_of(node, branches);
    }
    if let Some(branches) = &node.one_of {
        return merge_one_of(node, branches);
    }
    if node.is_type("object") {
        if let Some(properties) = &node.properties {
            let mut flattened = node.clone();
            flattened.properties = Some(
                properties
                    .iter()
                    .map(|(name, property)| (name.clone(), flatten(property)))
                    .collect(),
            );
            return flattened;
        }
    }
    node.clone()
}

fn merge_all_of(composite: &SchemaNode, branches: &[SchemaNode]) -> SchemaNode {
    let flattened: Vec<SchemaNode> = branches.iter().map(flatten).collect();

    let mut properties = own_properties(composite);
    let mut required: Vec<String> = composite.required_names().to_vec();
    for branch in &flattened {
        if let Some(branch_properties) = &branch.properties {
            for (name, property) in branch_properties {
                properties.insert(name.clone(), property.clone());
            }
        }
        for name in branch.required_names() {
            if !required.contains(name) {
                required.push(name.clone());
            }
        }
    }

    object_node(composite, &flattened, properties, required)
}

fn merge_one_of(composite: &SchemaNode, branches: &[SchemaNode]) -> SchemaNode {
    let flattened: Vec<SchemaNode> = branches.iter().map(flatten).collect();

    let all_string_enums = !flattened.is_empty()
        && flattened
            .iter()
            .all(|branch| branch.is_type("string") && branch.enum_values.is_some());
    if all_string_enums {
        return string_enum_node(composite, &flattened);
    }

    let mut properties = own_properties(composite);
    for branch in &flattened {
        if let Some(branch_properties) = &branch.properties {
            for (name, property) in branch_properties {
                properties.insert(name.clone(), property.clone());
            }
        }
    }

    // Fields required in every variant.
    let mut required: Vec<String> = flattened
        .first()
        .map(|branch| branch.required_names().to_vec())
        .unwrap_or_default();
    for branch in flattened.iter().skip(1) {
        let names = branch.required_names();
        required.retain(|name| names.contains(name));
    }

    object_node(composite, &flattened, properties, required)
}

fn own_properties(composite: &SchemaNode) -> IndexMap<String, SchemaNode> {
    composite
        .properties
        .iter()
        .flatten()
        .map(|(name, property)| (name.clone(), flatten(property)))
        .collect()
}

fn object_node(
    composite: &SchemaNode,
    branches: &[SchemaNode],
    properties: IndexMap<String, SchemaNode>,
    required: Vec<String>,
) -> SchemaNode {
    SchemaNode {
        schema_type: Some(SchemaType::Single("object".to_string())),
        properties: Some(properties),
        required: (!required.is_empty()).then_some(required),
        all_of: None,
        one_of: None,
        discriminator: None,
        property_groups: merged_groups(
            composite.property_groups.as_ref(),
            branches.iter().map(|b| b.property_groups.as_ref()),
        ),
        ..composite.clone()
    }
}

fn string_enum_node(composite: &SchemaNode, branches: &[SchemaNode]) -> SchemaNode {
    let mut values: Vec<Value> = Vec::new();
    for value in branches.iter().flat_map(|b| b.enum_values.iter().flatten()) {
        if !values.contains(value) {
            values.push(value.clone());
        }
    }

    let mut enum_docs = composite.enum_docs.clone();
    for docs in branches.iter().filter_map(|b| b.enum_docs.as_ref()) {
        let merged = enum_docs.get_or_insert_with(IndexMap::new);
        for (literal, doc) in docs {
            merged.entry(literal.clone()).or_insert_with(|| doc.clone());
        }
    }

    SchemaNode {
        schema_type: Some(SchemaType::Single("string".to_string())),
        enum_values: Some(values),
        enum_docs,
        all_of: None,
        one_of: None,
        discriminator: None,
        ..composite.clone()
    }
}

/// Group declarations of the composite, then any new keys declared by branches.
pub(crate) fn merged_groups<'a>(
    own: Option<&IndexMap<String, GroupDefinition>>,
    branches: impl Iterator<Item = Option<&'a IndexMap<String, GroupDefinition>>>,
) -> Option<IndexMap<String, GroupDefinition>> {
    let mut merged = own.cloned();
    for groups in branches.flatten() {
        let target = merged.get_or_insert_with(IndexMap::new);
        for (key, group) in groups {
            target.entry(key.clone()).or_insert_with(|| group.clone());
        }
    }
    merged
}
