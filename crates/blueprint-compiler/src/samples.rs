//! Code and resource sample rendering.
//!
//! The compiler hands each finished endpoint and resource to a set of
//! per-syntax renderers. Samples are joined with `try_join_all`; renderers
//! are synchronous, so the futures complete in turn on the calling task. The
//! first failure fails the whole compile.

use blueprint_spec_parser::{
    CodeSampleDefinition, ResourceSampleDefinition, SampleRequest, SampleResponse,
};
use futures_util::future::try_join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::blueprint::Blueprint;
use crate::endpoint::Endpoint;
use crate::error::CompileError;
use crate::resources::Resource;

/// Target syntaxes a sample can be rendered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyntaxName {
    Javascript,
    Python,
    Php,
    Ruby,
    Go,
    Java,
    Csharp,
    Curl,
    Json,
}

impl SyntaxName {
    /// Display title for a rendered block.
    pub fn title(&self) -> &'static str {
        match self {
            SyntaxName::Javascript => "JavaScript",
            SyntaxName::Python => "Python",
            SyntaxName::Php => "PHP",
            SyntaxName::Ruby => "Ruby",
            SyntaxName::Go => "Go",
            SyntaxName::Java => "Java",
            SyntaxName::Csharp => "C#",
            SyntaxName::Curl => "cURL",
            SyntaxName::Json => "JSON",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleCode {
    pub title: String,
    pub request: String,
    pub response: String,
    pub request_syntax: SyntaxName,
    pub response_syntax: SyntaxName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSample {
    pub title: String,
    pub description: String,
    pub request: SampleRequest,
    pub response: SampleResponse,
    pub code: IndexMap<SyntaxName, SampleCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceData {
    pub title: String,
    pub resource_data: String,
    pub resource_data_syntax: SyntaxName,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceSample {
    pub title: String,
    pub description: String,
    pub resource_type: String,
    pub properties: Value,
    pub resource_data: IndexMap<SyntaxName, ResourceData>,
}

#[derive(Debug, Error)]
pub enum SampleError {
    #[error("{syntax:?} renderer failed for '{sample}': {message}")]
    Render {
        syntax: SyntaxName,
        sample: String,
        message: String,
    },

    #[error("formatting {syntax:?} failed: {message}")]
    Format { syntax: SyntaxName, message: String },
}

impl From<SampleError> for CompileError {
    fn from(err: SampleError) -> Self {
        CompileError::SampleRender(err.to_string())
    }
}

/// Post-processes every rendered fragment.
pub trait CodeFormatter: Send + Sync {
    fn format_code(&self, content: &str, syntax: SyntaxName) -> Result<String, SampleError>;
}

/// Returns content unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityFormatter;

impl CodeFormatter for IdentityFormatter {
    fn format_code(&self, content: &str, _syntax: SyntaxName) -> Result<String, SampleError> {
        Ok(content.to_string())
    }
}

/// Renders samples in one target syntax.
///
/// A method returning `Ok(None)` means the renderer does not produce that kind
/// of fragment.
pub trait SampleRenderer: Send + Sync {
    fn syntax(&self) -> SyntaxName;

    /// Syntax of the response fragment paired with this renderer's requests.
    fn response_syntax(&self) -> SyntaxName {
        SyntaxName::Json
    }

    fn render_request(
        &self,
        _sample: &CodeSampleDefinition,
        _endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        Ok(None)
    }

    fn render_response(
        &self,
        _sample: &CodeSampleDefinition,
        _endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        Ok(None)
    }

    fn render_resource(
        &self,
        _sample: &ResourceSampleDefinition,
        _resource: &Resource,
    ) -> Result<Option<String>, SampleError> {
        Ok(None)
    }
}

/// `curl` request against the endpoint's preferred method.
#[derive(Debug, Clone)]
pub struct CurlRenderer {
    base_url: String,
}

impl CurlRenderer {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

impl SampleRenderer for CurlRenderer {
    fn syntax(&self) -> SyntaxName {
        SyntaxName::Curl
    }

    fn render_request(
        &self,
        sample: &CodeSampleDefinition,
        endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        let mut lines = vec![format!(
            "curl --include --request {} \"{}{}\" \\",
            endpoint.request.preferred_method, self.base_url, endpoint.path
        )];
        lines.push("  --header \"Authorization: Bearer $API_KEY\"".to_string());
        match &sample.request.parameters {
            Value::Object(parameters) if !parameters.is_empty() => {
                let body = pretty(&sample.request.parameters, SyntaxName::Curl, &sample.title)?;
                if let Some(last) = lines.last_mut() {
                    last.push_str(" \\");
                }
                lines.push("  --json @- <<EOF".to_string());
                lines.push(body);
                lines.push("EOF".to_string());
            }
            _ => {}
        }
        Ok(Some(lines.join("\n")))
    }

    fn render_response(
        &self,
        sample: &CodeSampleDefinition,
        _endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        response_body(sample, SyntaxName::Curl).map(Some)
    }
}

/// Raw JSON for request parameters, response bodies, and resource data.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonRenderer;

impl SampleRenderer for JsonRenderer {
    fn syntax(&self) -> SyntaxName {
        SyntaxName::Json
    }

    fn render_request(
        &self,
        sample: &CodeSampleDefinition,
        _endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        pretty(&sample.request.parameters, SyntaxName::Json, &sample.title).map(Some)
    }

    fn render_response(
        &self,
        sample: &CodeSampleDefinition,
        _endpoint: &Endpoint,
    ) -> Result<Option<String>, SampleError> {
        response_body(sample, SyntaxName::Json).map(Some)
    }

    fn render_resource(
        &self,
        sample: &ResourceSampleDefinition,
        _resource: &Resource,
    ) -> Result<Option<String>, SampleError> {
        pretty(&sample.properties, SyntaxName::Json, &sample.title).map(Some)
    }
}

fn response_body(sample: &CodeSampleDefinition, syntax: SyntaxName) -> Result<String, SampleError> {
    match &sample.response.body {
        Value::Null => Ok(String::new()),
        body => pretty(body, syntax, &sample.title),
    }
}

fn pretty(value: &Value, syntax: SyntaxName, sample: &str) -> Result<String, SampleError> {
    serde_json::to_string_pretty(value).map_err(|e| SampleError::Render {
        syntax,
        sample: sample.to_string(),
        message: e.to_string(),
    })
}

/// The formatter and renderers used for a compile.
pub struct RenderContext {
    formatter: Box<dyn CodeFormatter>,
    renderers: Vec<Box<dyn SampleRenderer>>,
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderContext {
    /// Identity formatter, no renderers.
    pub fn new() -> Self {
        Self {
            formatter: Box::new(IdentityFormatter),
            renderers: Vec::new(),
        }
    }

    /// The built-in `curl` and `json` renderers.
    pub fn with_builtin(base_url: &str) -> Self {
        Self::new()
            .with_renderer(CurlRenderer::new(base_url))
            .with_renderer(JsonRenderer)
    }

    pub fn with_formatter(mut self, formatter: impl CodeFormatter + 'static) -> Self {
        self.formatter = Box::new(formatter);
        self
    }

    /// Register a renderer, replacing any already registered for its syntax.
    pub fn with_renderer(mut self, renderer: impl SampleRenderer + 'static) -> Self {
        let syntax = renderer.syntax();
        self.renderers.retain(|existing| existing.syntax() != syntax);
        self.renderers.push(Box::new(renderer));
        self
    }

    /// Keep only renderers for the given syntaxes.
    pub fn only(mut self, syntaxes: &[SyntaxName]) -> Self {
        self.renderers
            .retain(|renderer| syntaxes.contains(&renderer.syntax()));
        self
    }

    pub fn syntaxes(&self) -> Vec<SyntaxName> {
        self.renderers.iter().map(|r| r.syntax()).collect()
    }

    fn format(&self, content: String, syntax: SyntaxName) -> Result<String, SampleError> {
        if content.is_empty() {
            return Ok(content);
        }
        self.formatter.format_code(&content, syntax)
    }

    async fn render_code_sample(
        &self,
        sample: &CodeSampleDefinition,
        endpoint: &Endpoint,
    ) -> Result<CodeSample, SampleError> {
        let mut code = IndexMap::new();
        for renderer in &self.renderers {
            let Some(request) = renderer.render_request(sample, endpoint)? else {
                continue;
            };
            let response = renderer
                .render_response(sample, endpoint)?
                .unwrap_or_default();
            code.insert(
                renderer.syntax(),
                SampleCode {
                    title: renderer.syntax().title().to_string(),
                    request: self.format(request, renderer.syntax())?,
                    response: self.format(response, renderer.response_syntax())?,
                    request_syntax: renderer.syntax(),
                    response_syntax: renderer.response_syntax(),
                },
            );
        }
        Ok(CodeSample {
            title: sample.title.clone(),
            description: sample.description.clone(),
            request: sample.request.clone(),
            response: sample.response.clone(),
            code,
        })
    }

    async fn render_resource_sample(
        &self,
        sample: &ResourceSampleDefinition,
        resource: &Resource,
    ) -> Result<ResourceSample, SampleError> {
        let mut resource_data = IndexMap::new();
        for renderer in &self.renderers {
            let Some(data) = renderer.render_resource(sample, resource)? else {
                continue;
            };
            resource_data.insert(
                renderer.syntax(),
                ResourceData {
                    title: renderer.syntax().title().to_string(),
                    resource_data: self.format(data, renderer.syntax())?,
                    resource_data_syntax: renderer.syntax(),
                },
            );
        }
        Ok(ResourceSample {
            title: sample.title.clone(),
            description: sample.description.clone(),
            resource_type: sample.resource_type.clone(),
            properties: sample.properties.clone(),
            resource_data,
        })
    }
}

/// Plain resources, then event branches, then action attempts.
fn all_resources(blueprint: &Blueprint) -> impl Iterator<Item = &Resource> {
    blueprint
        .resources
        .iter()
        .chain(blueprint.events.iter().map(|event| &event.resource))
        .chain(
            blueprint
                .action_attempts
                .iter()
                .map(|attempt| &attempt.resource),
        )
}

/// Render every endpoint's code samples and every resource's samples.
///
/// Code samples attach to the endpoint whose path equals `request.path`;
/// resource samples attach to every resource, event branch and action attempt
/// with the same `resource_type`.
pub async fn render_samples(
    blueprint: &mut Blueprint,
    code_samples: &[CodeSampleDefinition],
    resource_samples: &[ResourceSampleDefinition],
    context: &RenderContext,
) -> Result<(), CompileError> {
    let endpoint_samples = {
        let endpoints = blueprint.routes.iter().flat_map(|route| &route.endpoints);
        try_join_all(endpoints.map(|endpoint| {
            try_join_all(
                code_samples
                    .iter()
                    .filter(move |sample| sample.request.path == endpoint.path)
                    .map(move |sample| context.render_code_sample(sample, endpoint)),
            )
        }))
        .await?
    };

    let resource_samples = try_join_all(all_resources(blueprint).map(|resource| {
        try_join_all(
            resource_samples
                .iter()
                .filter(move |sample| sample.resource_type == resource.resource_type)
                .map(move |sample| context.render_resource_sample(sample, resource)),
        )
    }))
    .await?;

    let endpoints = blueprint
        .routes
        .iter_mut()
        .flat_map(|route| route.endpoints.iter_mut());
    let mut rendered = 0;
    for (endpoint, samples) in endpoints.zip(endpoint_samples) {
        rendered += samples.len();
        endpoint.code_samples = samples;
    }
    let resources = blueprint
        .resources
        .iter_mut()
        .chain(blueprint.events.iter_mut().map(|event| &mut event.resource))
        .chain(
            blueprint
                .action_attempts
                .iter_mut()
                .map(|attempt| &mut attempt.resource),
        );
    for (resource, samples) in resources.zip(resource_samples) {
        rendered += samples.len();
        resource.resource_samples = samples;
    }

    blueprint_telemetry::log_samples_rendered!(
        samples = rendered,
        syntaxes = ?context.syntaxes(),
        "samples rendered"
    );
    Ok(())
}
