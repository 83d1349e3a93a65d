use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced during compilation. Every error halts the compile.
#[derive(Debug, Error)]
pub enum CompileError {
    /// Types module loading failed.
    #[error(transparent)]
    Parse(#[from] blueprint_spec_parser::ParseError),

    /// E1101: A route or namespace name could not be derived from a path.
    #[error("E1101: unresolved name: {0}")]
    UnresolvedName(String),

    /// E1102: Two routes share a path.
    #[error("E1102: duplicate route path: {0}")]
    DuplicateRoutePath(String),

    /// E1110: Path has no POST operation.
    #[error("E1110: path has no POST operation: {0}")]
    MissingPostOperation(String),

    /// E1111: Operation does not declare x-response-key.
    #[error("E1111: operation has no x-response-key: {0}")]
    MissingResponseKey(String),

    /// E1112: Declared response key cannot be resolved against the 200 response.
    #[error("E1112: invalid response key: {0}")]
    InvalidResponseKey(String),

    /// E1120: Resource declares a route path no route has.
    #[error("E1120: resource references unknown route path: {0}")]
    UnknownRoutePath(String),

    /// E1130: Property or variant group key not declared by the enclosing scope.
    #[error("E1130: undeclared group key: {0}")]
    UndeclaredGroupKey(String),

    /// E1131: Discriminated list without a discriminator property name.
    #[error("E1131: discriminated list has no discriminator property name: {0}")]
    MissingDiscriminator(String),

    /// E1132: Enum literal missing from a declared x-enums table.
    #[error("E1132: enum value has no x-enums definition: {0}")]
    MissingEnumDefinition(String),

    /// E1133: Schema classified directly has no type.
    #[error("E1133: schema has no type: {0}")]
    MissingType(String),

    /// E1134: Schema type is not one of string, number, integer, boolean, array, object.
    #[error("E1134: unsupported schema type: {0}")]
    UnsupportedType(String),

    /// E1140: Action attempt response without x-action-attempt-type.
    #[error("E1140: response is missing x-action-attempt-type: {0}")]
    MissingActionAttemptType(String),

    /// E1141: x-action-attempt-type not declared by the action attempt schema.
    #[error("E1141: unknown action attempt type: {0}")]
    InvalidActionAttemptType(String),

    /// E1150: A sample renderer or the code formatter failed.
    #[error("E1150: sample rendering failed: {0}")]
    SampleRender(String),

    /// E1160: Project configuration could not be loaded.
    #[error("E1160: config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CompileError {
    /// The stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            CompileError::Parse(e) => e.code(),
            CompileError::UnresolvedName(_) => "E1101",
            CompileError::DuplicateRoutePath(_) => "E1102",
            CompileError::MissingPostOperation(_) => "E1110",
            CompileError::MissingResponseKey(_) => "E1111",
            CompileError::InvalidResponseKey(_) => "E1112",
            CompileError::UnknownRoutePath(_) => "E1120",
            CompileError::UndeclaredGroupKey(_) => "E1130",
            CompileError::MissingDiscriminator(_) => "E1131",
            CompileError::MissingEnumDefinition(_) => "E1132",
            CompileError::MissingType(_) => "E1133",
            CompileError::UnsupportedType(_) => "E1134",
            CompileError::MissingActionAttemptType(_) => "E1140",
            CompileError::InvalidActionAttemptType(_) => "E1141",
            CompileError::SampleRender(_) => "E1150",
            CompileError::Config(_) => "E1160",
            CompileError::Io(_) => "E1000",
            CompileError::Json(_) => "E1000",
        }
    }
}

/// A non-fatal issue found during compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileWarning {
    /// Warning code (E12xx).
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// E1201: Property schema without a type was dropped.
pub const WARN_TYPELESS_PROPERTY: &str = "E1201";
/// E1202: Path declares no methods or more than two.
pub const WARN_METHOD_COUNT: &str = "E1202";
/// E1203: Security scheme not recognized as an auth method.
pub const WARN_UNKNOWN_AUTH_SCHEME: &str = "E1203";
/// E1204: Component schema could not be classified and was skipped.
pub const WARN_SCHEMA_SKIPPED: &str = "E1204";
