//! Compiles an OpenAPI types module into a Blueprint.
//!
//! Flattens schema composition, classifies schemas into typed property and
//! parameter trees, derives routes, namespaces, endpoints, resources, events
//! and action attempts, then checks cross-entity invariants. Code and resource
//! samples are rendered through pluggable per-syntax renderers.

pub mod blueprint;
pub mod classify;
pub mod docs;
pub mod endpoint;
pub mod error;
pub mod flatten;
pub mod project;
pub mod property;
pub mod resources;
pub mod routes;
pub mod samples;
pub mod validate;

pub use blueprint::{
    compile_blueprint, compile_file, create_blueprint, Blueprint, CompileOptions, CompileResult,
    COMPILER_VERSION,
};
pub use classify::Classifier;
pub use docs::DocMeta;
pub use endpoint::{
    AuthMethod, Endpoint, Request, ResourceResponse, Response, WorkspaceScope,
};
pub use error::{CompileError, CompileWarning};
pub use flatten::flatten;
pub use project::ProjectConfig;
pub use property::{
    EnumValue, Field, FieldKind, ListItem, Parameter, Property, PropertyGroup, Variant,
    VariantGroup,
};
pub use resources::{ActionAttempt, EventResource, Pagination, Resource};
pub use routes::{Namespace, Route};
pub use samples::{
    CodeFormatter, CodeSample, IdentityFormatter, RenderContext, ResourceSample, SampleError,
    SampleRenderer, SyntaxName,
};
pub use validate::validate_blueprint;
// Re-export the loader so callers need only this crate.
pub use blueprint_spec_parser::{parse_types_module, parse_types_module_file, TypesModule};
