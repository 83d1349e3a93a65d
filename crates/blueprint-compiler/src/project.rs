//! Project configuration (`blueprint.yaml`).
//!
//! Every key is optional; anything left out keeps the compiler default.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::blueprint::CompileOptions;
use crate::error::CompileError;
use crate::samples::{RenderContext, SyntaxName};

/// Base URL used by the `curl` renderer when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.example.com";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub schemas: SchemaNames,
    /// Paths under these prefixes may return action attempts without a declared type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_attempt_exempt_prefixes: Option<Vec<String>>,
    #[serde(default)]
    pub samples: SampleConfig,
}

/// Component schema names with special meaning.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaNames {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action_attempt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pagination_response_key: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SampleConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Built-in syntaxes to render. Empty renders all of them.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub syntaxes: Vec<SyntaxName>,
}

impl ProjectConfig {
    /// Load a project file from disk.
    pub fn load(path: &Path) -> Result<Self, CompileError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CompileError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        Self::parse(&content, path)
    }

    /// Parse project YAML. `path` is only used in error messages.
    pub fn parse(content: &str, path: &Path) -> Result<Self, CompileError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|e| {
            CompileError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Compiler options with configured overrides applied.
    pub fn compile_options(&self) -> CompileOptions {
        let defaults = CompileOptions::default();
        CompileOptions {
            pagination_schema: self
                .schemas
                .pagination
                .clone()
                .unwrap_or(defaults.pagination_schema),
            action_attempt_schema: self
                .schemas
                .action_attempt
                .clone()
                .unwrap_or(defaults.action_attempt_schema),
            pagination_response_key: self
                .schemas
                .pagination_response_key
                .clone()
                .unwrap_or(defaults.pagination_response_key),
            action_attempt_exempt_prefixes: self
                .action_attempt_exempt_prefixes
                .clone()
                .unwrap_or(defaults.action_attempt_exempt_prefixes),
        }
    }

    /// Built-in renderers, restricted to the configured syntaxes.
    pub fn render_context(&self) -> RenderContext {
        let base_url = self.samples.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let context = RenderContext::with_builtin(base_url);
        if self.samples.syntaxes.is_empty() {
            context
        } else {
            context.only(&self.samples.syntaxes)
        }
    }
}
