use thiserror::Error;

/// Errors produced while loading a types module (E1001–E1004).
#[derive(Debug, Error)]
pub enum ParseError {
    /// E1001: Bundle has no `openapi` document.
    #[error("E1001: not a valid types module (missing 'openapi' document)")]
    UnknownFormat,

    /// E1002: YAML/JSON parse error.
    #[error("E1002: parse error: {0}")]
    ParseError(String),

    /// E1004: Document does not match the supported structure.
    #[error("E1004: schema validation error: {0}")]
    SchemaError(String),

    /// I/O error reading the bundle file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ParseError {
    /// The stable diagnostic code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ParseError::UnknownFormat => "E1001",
            ParseError::ParseError(_) => "E1002",
            ParseError::SchemaError(_) => "E1004",
            ParseError::Io(_) => "E1000",
        }
    }
}
