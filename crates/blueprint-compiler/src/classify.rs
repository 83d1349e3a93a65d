//! Type classification: flattened schema nodes to typed property/parameter trees.

use blueprint_spec_parser::{GroupDefinition, SchemaNode};
use indexmap::IndexMap;
use serde_json::Value;

use crate::docs::{normalize_description, DocMeta};
use crate::error::{CompileError, CompileWarning, WARN_TYPELESS_PROPERTY};
use crate::flatten::flatten;
use crate::property::{
    EnumValue, Field, FieldExtra, FieldKind, ListItem, PropertyGroup, Variant, VariantGroup,
};

/// Classifies schema nodes, collecting warnings for tolerated problems.
pub struct Classifier<'w> {
    warnings: &'w mut Vec<CompileWarning>,
}

impl<'w> Classifier<'w> {
    pub fn new(warnings: &'w mut Vec<CompileWarning>) -> Self {
        Self { warnings }
    }

    /// Classify a single flattened node.
    ///
    /// `location` names the node in error messages (e.g. `resource 'device'.name`).
    pub fn classify<X: FieldExtra>(
        &mut self,
        name: &str,
        node: &SchemaNode,
        is_required: bool,
        location: &str,
    ) -> Result<Field<X>, CompileError> {
        let type_name = node
            .type_name()
            .ok_or_else(|| CompileError::MissingType(location.to_string()))?;

        let kind = match type_name {
            "string" => match (&node.enum_values, node.format.as_deref()) {
                (Some(values), _) => FieldKind::Enum {
                    values: enum_values(node, values, location)?,
                },
                (None, Some("date-time")) => FieldKind::Datetime,
                (None, Some("uuid")) => FieldKind::Id,
                (None, _) => FieldKind::String,
            },
            "boolean" => FieldKind::Boolean,
            "number" | "integer" => FieldKind::Number,
            "object" => match &node.properties {
                Some(properties) if !properties.is_empty() => FieldKind::Object {
                    properties: self.classify_properties(node, location)?,
                    property_groups: property_groups(node.property_groups.as_ref()),
                },
                _ => FieldKind::Record,
            },
            "array" => FieldKind::List {
                item: self.classify_list_item(name, node, location)?,
            },
            other => {
                return Err(CompileError::UnsupportedType(format!(
                    "'{}' at {}",
                    other, location
                )))
            }
        };

        Ok(Field {
            name: name.to_string(),
            kind,
            doc: DocMeta::from_schema(node),
            extra: X::for_field(node, is_required),
        })
    }

    /// Classify every property of an object node, in declaration order.
    ///
    /// Each property is flattened first. Properties without a type are dropped
    /// with a warning.
    pub fn classify_properties<X: FieldExtra>(
        &mut self,
        node: &SchemaNode,
        location: &str,
    ) -> Result<Vec<Field<X>>, CompileError> {
        let mut fields = Vec::new();
        let required = node.required_names();
        for (name, property) in node.properties.iter().flatten() {
            let property_location = format!("{}.{}", location, name);
            let property = flatten(property);
            if property.type_name().is_none() {
                blueprint_telemetry::log_schema_skipped!(
                    location = %property_location,
                    "property has no type, skipping"
                );
                self.warnings.push(CompileWarning {
                    code: WARN_TYPELESS_PROPERTY.to_string(),
                    message: format!("property '{}' has no type and was dropped", name),
                    location: Some(property_location),
                });
                continue;
            }
            fields.push(self.classify(name, &property, required.contains(name), &property_location)?);
        }
        Ok(fields)
    }

    fn classify_list_item<X: FieldExtra>(
        &mut self,
        name: &str,
        node: &SchemaNode,
        location: &str,
    ) -> Result<ListItem<X>, CompileError> {
        let Some(items) = node.items.as_deref() else {
            return Ok(ListItem::Record);
        };

        if let (Some(branches), Some(discriminator)) = (&items.one_of, &items.discriminator) {
            let flattened: Vec<SchemaNode> = branches.iter().map(flatten).collect();
            if !flattened.iter().all(|branch| branch.is_type("object")) {
                return Ok(ListItem::Record);
            }
            let discriminator = match discriminator.property_name.as_deref() {
                Some(property) if !property.is_empty() => property.to_string(),
                _ => return Err(CompileError::MissingDiscriminator(location.to_string())),
            };

            let mut variants = Vec::with_capacity(flattened.len());
            for (index, branch) in flattened.iter().enumerate() {
                let branch_location = format!("{}[{}]", location, index);
                variants.push(Variant {
                    description: branch
                        .description
                        .as_deref()
                        .map(normalize_description)
                        .unwrap_or_default(),
                    variant_group_key: branch.variant_group_key.clone(),
                    properties: self.classify_properties(branch, &branch_location)?,
                    property_groups: property_groups(branch.property_groups.as_ref()),
                });
            }

            return Ok(ListItem::DiscriminatedObject {
                discriminator,
                variants,
                variant_groups: variant_groups(
                    items.variant_groups.as_ref().or(node.variant_groups.as_ref()),
                ),
            });
        }

        let items = flatten(items);
        if items.type_name().is_none() {
            return Ok(ListItem::Record);
        }
        let probe: Field<X> = self.classify(name, &items, false, &format!("{}[]", location))?;
        Ok(match probe.kind {
            FieldKind::String => ListItem::String,
            FieldKind::Number => ListItem::Number,
            FieldKind::Boolean => ListItem::Boolean,
            FieldKind::Datetime => ListItem::Datetime,
            FieldKind::Id => ListItem::Id,
            FieldKind::Enum { values } => ListItem::Enum {
                item_enum_values: values,
            },
            FieldKind::Object {
                properties,
                property_groups,
            } => ListItem::Object {
                item_properties: properties,
                item_property_groups: property_groups,
            },
            FieldKind::Record | FieldKind::List { .. } => ListItem::Record,
        })
    }
}

/// Build enum values, reading per-literal docs from `x-enums` when declared.
fn enum_values(
    node: &SchemaNode,
    values: &[Value],
    location: &str,
) -> Result<Vec<EnumValue>, CompileError> {
    values
        .iter()
        .map(|value| {
            let name = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let doc = match &node.enum_docs {
                None => DocMeta::default(),
                Some(docs) => docs.get(&name).map(DocMeta::from_enum_doc).ok_or_else(|| {
                    CompileError::MissingEnumDefinition(format!("'{}' at {}", name, location))
                })?,
            };
            Ok(EnumValue { name, doc })
        })
        .collect()
}

pub(crate) fn property_groups(
    groups: Option<&IndexMap<String, GroupDefinition>>,
) -> Vec<PropertyGroup> {
    groups
        .into_iter()
        .flatten()
        .map(|(key, group)| PropertyGroup {
            property_group_key: key.clone(),
            name: group.name.clone(),
        })
        .collect()
}

fn variant_groups(groups: Option<&IndexMap<String, GroupDefinition>>) -> Vec<VariantGroup> {
    groups
        .into_iter()
        .flatten()
        .map(|(key, group)| VariantGroup {
            variant_group_key: key.clone(),
            name: group.name.clone(),
        })
        .collect()
}
