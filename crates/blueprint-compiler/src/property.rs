//! Typed property and parameter trees.
//!
//! Both trees share one closed sum type ([`FieldKind`]) tagged by `format`;
//! they differ only in the per-field data carried alongside it.

use serde::Serialize;
use serde_json::Value;

use blueprint_spec_parser::SchemaNode;

use crate::docs::DocMeta;

/// A named, classified schema node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Field<X> {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind<X>,
    #[serde(flatten)]
    pub doc: DocMeta,
    #[serde(flatten)]
    pub extra: X,
}

/// A resource property.
pub type Property = Field<PropertyExtra>;

/// A request parameter.
pub type Parameter = Field<ParameterExtra>;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "format", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum FieldKind<X> {
    String,
    Number,
    Boolean,
    Datetime,
    Id,
    Enum {
        values: Vec<EnumValue>,
    },
    /// Opaque JSON object.
    Record,
    Object {
        properties: Vec<Field<X>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        property_groups: Vec<PropertyGroup>,
    },
    List {
        #[serde(flatten)]
        item: ListItem<X>,
    },
}

/// The element shape of a `list` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(
    tag = "itemFormat",
    rename_all = "snake_case",
    rename_all_fields = "camelCase"
)]
pub enum ListItem<X> {
    String,
    Number,
    Boolean,
    Datetime,
    Id,
    Enum {
        item_enum_values: Vec<EnumValue>,
    },
    Record,
    Object {
        item_properties: Vec<Field<X>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        item_property_groups: Vec<PropertyGroup>,
    },
    DiscriminatedObject {
        discriminator: String,
        variants: Vec<Variant<X>>,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        variant_groups: Vec<VariantGroup>,
    },
}

/// One arm of a discriminated list.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant<X> {
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_group_key: Option<String>,
    pub properties: Vec<Field<X>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub property_groups: Vec<PropertyGroup>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(flatten)]
    pub doc: DocMeta,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyGroup {
    pub property_group_key: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantGroup {
    pub variant_group_key: String,
    pub name: String,
}

/// Data a classified field carries beyond its shape and docs.
pub trait FieldExtra: Clone {
    fn for_field(node: &SchemaNode, is_required: bool) -> Self;

    /// The property group this field is assigned to, if any.
    fn group_key(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyExtra {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub property_group_key: Option<String>,
}

impl FieldExtra for PropertyExtra {
    fn for_field(node: &SchemaNode, _is_required: bool) -> Self {
        Self {
            property_group_key: node.property_group_key.clone(),
        }
    }

    fn group_key(&self) -> Option<&str> {
        self.property_group_key.as_deref()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterExtra {
    pub is_required: bool,
    pub has_default: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

impl FieldExtra for ParameterExtra {
    fn for_field(node: &SchemaNode, is_required: bool) -> Self {
        Self {
            is_required,
            has_default: node.default_value.is_some(),
            default: node.default_value.clone(),
        }
    }
}

impl<X> Field<X> {
    /// The `format` tag of this field.
    pub fn format(&self) -> &'static str {
        match &self.kind {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::Boolean => "boolean",
            FieldKind::Datetime => "datetime",
            FieldKind::Id => "id",
            FieldKind::Enum { .. } => "enum",
            FieldKind::Record => "record",
            FieldKind::Object { .. } => "object",
            FieldKind::List { .. } => "list",
        }
    }

    /// Whether the field holds structured data (list, object, or record).
    pub fn is_structured(&self) -> bool {
        matches!(
            self.kind,
            FieldKind::List { .. } | FieldKind::Object { .. } | FieldKind::Record
        )
    }
}

impl<X> ListItem<X> {
    /// The `itemFormat` tag of this list item.
    pub fn item_format(&self) -> &'static str {
        match self {
            ListItem::String => "string",
            ListItem::Number => "number",
            ListItem::Boolean => "boolean",
            ListItem::Datetime => "datetime",
            ListItem::Id => "id",
            ListItem::Enum { .. } => "enum",
            ListItem::Record => "record",
            ListItem::Object { .. } => "object",
            ListItem::DiscriminatedObject { .. } => "discriminated_object",
        }
    }
}
