use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A types module bundle: the OpenAPI document plus sample definitions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypesModule {
    /// Source file name, when loaded from disk.
    #[serde(skip)]
    pub filename: Option<String>,
    /// The raw OpenAPI document.
    pub openapi: RawDocument,
    #[serde(default)]
    pub code_sample_definitions: Vec<CodeSampleDefinition>,
    #[serde(default)]
    pub resource_sample_definitions: Vec<ResourceSampleDefinition>,
    /// Schema descriptors exported by the types module (kept opaque).
    #[serde(default)]
    pub schemas: IndexMap<String, Value>,
}

/// The subset of an OpenAPI 3.x document the compiler reads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// The `openapi` version string (e.g. "3.0.0").
    pub openapi: String,
    pub info: Info,
    /// Path entries in declaration order.
    #[serde(default)]
    pub paths: IndexMap<String, PathItem>,
    #[serde(default)]
    pub components: Components,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Components {
    #[serde(default)]
    pub schemas: IndexMap<String, SchemaNode>,
}

/// HTTP methods recognized in a path item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    Trace,
}

impl HttpMethod {
    /// Parse a lowercase path item key (`get`, `post`, ...).
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "patch" => Some(Self::Patch),
            "delete" => Some(Self::Delete),
            "head" => Some(Self::Head),
            "options" => Some(Self::Options),
            "trace" => Some(Self::Trace),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
            Self::Trace => "TRACE",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A path item: the operations declared under one raw path, in declaration order.
///
/// Non-method keys (`parameters`, `summary`, `x-*`) are ignored.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct PathItem {
    pub operations: IndexMap<HttpMethod, Operation>,
}

impl<'de> Deserialize<'de> for PathItem {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut operations = IndexMap::new();
        for (key, value) in raw {
            if let Some(method) = HttpMethod::from_key(&key) {
                let operation = Operation::deserialize(value).map_err(|e| {
                    serde::de::Error::custom(format!("operation {}: {}", method, e))
                })?;
                operations.insert(method, operation);
            }
        }
        Ok(Self { operations })
    }
}

impl PathItem {
    /// Declared methods, in declaration order.
    pub fn methods(&self) -> Vec<HttpMethod> {
        self.operations.keys().copied().collect()
    }

    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        self.operations.get(&method)
    }
}

/// A documentation annotation that is either a boolean flag or a message.
///
/// `x-undocumented: "Internal only."` and `x-undocumented: true` both mark
/// the annotated element; only the former carries a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Annotation {
    Flag(bool),
    Message(String),
}

impl Annotation {
    pub fn is_set(&self) -> bool {
        match self {
            Annotation::Flag(flag) => *flag,
            Annotation::Message(_) => true,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Annotation::Flag(_) => "",
            Annotation::Message(message) => message,
        }
    }
}

/// An OpenAPI operation with the vendor extensions the compiler reads.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(rename = "x-deprecated", default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<Annotation>,
    #[serde(rename = "x-undocumented", default, skip_serializing_if = "Option::is_none")]
    pub undocumented: Option<Annotation>,
    #[serde(rename = "x-draft", default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<Annotation>,
    #[serde(rename = "x-title", default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// `x-response-key`: `None` when absent, `Some(None)` when declared `null`.
    #[serde(
        rename = "x-response-key",
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub response_key: Option<Option<String>>,
    #[serde(
        rename = "x-action-attempt-type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub action_attempt_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterObject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    #[serde(default)]
    pub responses: IndexMap<String, ResponseObject>,
    /// Security requirements: scheme name -> scopes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<IndexMap<String, Vec<String>>>,
}

/// Distinguishes an explicit `null` from an absent field.
fn deserialize_present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// A query/path/header parameter declared on an operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterObject {
    pub name: String,
    #[serde(rename = "in")]
    pub location: String,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl RequestBody {
    /// The `application/json` schema, if declared.
    pub fn json_schema(&self) -> Option<&SchemaNode> {
        self.content
            .get("application/json")
            .and_then(|media| media.schema.as_ref())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MediaType {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<SchemaNode>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub content: IndexMap<String, MediaType>,
}

impl ResponseObject {
    /// The `application/json` schema, if declared.
    pub fn json_schema(&self) -> Option<&SchemaNode> {
        self.content
            .get("application/json")
            .and_then(|media| media.schema.as_ref())
    }
}

/// A schema `type`: a single name or an OpenAPI 3.1 type list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SchemaType {
    Single(String),
    Union(Vec<String>),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Discriminator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_name: Option<String>,
}

/// Documentation for a single enum literal (`x-enums` entry).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValueDoc {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub undocumented: Option<Annotation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<Annotation>,
}

/// A property or variant group declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
}

/// A JSON Schema node as it appears in the document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaNode {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<SchemaType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<IndexMap<String, SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_of: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_of: Option<Vec<SchemaNode>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
    #[serde(rename = "enum", default, skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discriminator: Option<Discriminator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(rename = "default", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<Value>,
    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(rename = "x-deprecated", default, skip_serializing_if = "Option::is_none")]
    pub deprecation: Option<Annotation>,
    #[serde(rename = "x-undocumented", default, skip_serializing_if = "Option::is_none")]
    pub undocumented: Option<Annotation>,
    #[serde(rename = "x-draft", default, skip_serializing_if = "Option::is_none")]
    pub draft: Option<Annotation>,
    #[serde(rename = "x-enums", default, skip_serializing_if = "Option::is_none")]
    pub enum_docs: Option<IndexMap<String, EnumValueDoc>>,
    #[serde(
        rename = "x-property-groups",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub property_groups: Option<IndexMap<String, GroupDefinition>>,
    #[serde(
        rename = "x-property-group-key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub property_group_key: Option<String>,
    #[serde(
        rename = "x-variant-groups",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub variant_groups: Option<IndexMap<String, GroupDefinition>>,
    #[serde(
        rename = "x-variant-group-key",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub variant_group_key: Option<String>,
    #[serde(rename = "x-route-path", default, skip_serializing_if = "Option::is_none")]
    pub route_path: Option<String>,
    /// Keys the compiler does not interpret.
    #[serde(flatten)]
    pub extensions: IndexMap<String, Value>,
}

impl SchemaNode {
    /// The primary type name. For a type list, the first non-`null` entry.
    pub fn type_name(&self) -> Option<&str> {
        match self.schema_type.as_ref()? {
            SchemaType::Single(name) => Some(name.as_str()),
            SchemaType::Union(names) => names
                .iter()
                .map(String::as_str)
                .find(|name| *name != "null"),
        }
    }

    pub fn is_type(&self, name: &str) -> bool {
        self.type_name() == Some(name)
    }

    /// Whether the node admits `null` (`nullable: true` or a `null` type entry).
    pub fn is_nullable(&self) -> bool {
        if self.nullable == Some(true) {
            return true;
        }
        matches!(
            &self.schema_type,
            Some(SchemaType::Union(names)) if names.iter().any(|name| name == "null")
        )
    }

    pub fn required_names(&self) -> &[String] {
        self.required.as_deref().unwrap_or(&[])
    }

    /// The discriminator property name, if a discriminator is declared.
    pub fn discriminator_property(&self) -> Option<&str> {
        self.discriminator
            .as_ref()
            .and_then(|d| d.property_name.as_deref())
    }

    /// String enum literals, skipping non-string members.
    pub fn string_enum(&self) -> Option<Vec<&str>> {
        self.enum_values
            .as_ref()
            .map(|values| values.iter().filter_map(Value::as_str).collect())
    }

    /// Last segment of the `$ref` pointer (`#/components/schemas/device` -> `device`).
    pub fn ref_name(&self) -> Option<&str> {
        self.reference
            .as_deref()
            .and_then(|pointer| pointer.rsplit('/').next())
            .filter(|name| !name.is_empty())
    }
}

/// A code sample attached to an endpoint by request path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSampleDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub request: SampleRequest,
    #[serde(default)]
    pub response: SampleResponse,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRequest {
    pub path: String,
    #[serde(default)]
    pub parameters: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleResponse {
    #[serde(default)]
    pub body: Value,
}

/// A resource data sample attached to a resource by type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSampleDefinition {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(alias = "resource_type")]
    pub resource_type: String,
    #[serde(default)]
    pub properties: Value,
}
