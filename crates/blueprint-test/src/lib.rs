//! Shared fixtures for Blueprint compiler integration tests.
//!
//! Fixture bundles live in `tests/fixtures/` at the workspace root.

use std::path::PathBuf;

use blueprint_compiler::{
    create_blueprint, parse_types_module_file, CompileError, CompileOptions, CompileResult,
    RenderContext,
};

#[cfg(test)]
pub mod cli;

/// Absolute path to the shared fixtures directory.
pub fn fixtures_dir() -> PathBuf {
    // CARGO_MANIFEST_DIR = .../crates/blueprint-test
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../..")
        .join("tests/fixtures")
}

/// Absolute path to a named fixture.
pub fn fixture(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

/// Compile a fixture with default options and the built-in renderers.
pub async fn compile_fixture(name: &str) -> Result<CompileResult, CompileError> {
    let module = parse_types_module_file(&fixture(name))?;
    let context = RenderContext::with_builtin("https://api.example.com");
    create_blueprint(&module, &CompileOptions::default(), &context).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use blueprint_compiler::{Response, SyntaxName};

    #[tokio::test]
    async fn full_fixture_compiles() {
        let result = compile_fixture("full.yaml").await.unwrap();
        let bp = &result.blueprint;

        let paths: Vec<&str> = bp.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/devices", "/events", "/locks", "/action_attempts"]);
        assert_eq!(bp.events.len(), 2);
        assert_eq!(bp.action_attempts.len(), 1);
        assert!(bp.pagination.is_some());

        let delete = bp
            .endpoints()
            .find(|e| e.path == "/devices/delete")
            .unwrap();
        assert!(matches!(delete.response, Response::Void { .. }));

        let get = bp.endpoints().find(|e| e.path == "/devices/get").unwrap();
        assert_eq!(get.code_samples.len(), 1);
        assert!(get.code_samples[0].code.contains_key(&SyntaxName::Curl));

        let device = bp
            .resources
            .iter()
            .find(|r| r.resource_type == "device")
            .unwrap();
        assert_eq!(device.resource_samples.len(), 1);
    }

    #[tokio::test]
    async fn typeless_property_is_reported() {
        let result = compile_fixture("full.yaml").await.unwrap();
        assert!(result.warnings.iter().any(|w| w.code == "E1201"));
    }

    #[tokio::test]
    async fn missing_post_fails() {
        let err = compile_fixture("invalid-missing-post.yaml").await.unwrap_err();
        assert_eq!(err.code(), "E1110");
    }
}
