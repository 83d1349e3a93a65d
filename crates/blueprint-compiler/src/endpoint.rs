//! Endpoint builder: request shape, response resolution, and auth scoping for one raw path.

use blueprint_spec_parser::{HttpMethod, Operation, PathItem, SchemaNode};
use serde::Serialize;

use crate::blueprint::CompileOptions;
use crate::classify::Classifier;
use crate::docs::{normalize_description, DocMeta};
use crate::error::{
    CompileError, CompileWarning, WARN_METHOD_COUNT, WARN_TYPELESS_PROPERTY,
    WARN_UNKNOWN_AUTH_SCHEME,
};
use crate::flatten::flatten;
use crate::property::Parameter;
use crate::samples::CodeSample;

/// Verbs considered when picking the semantic method, most specific first.
const SEMANTIC_PRIORITY: [HttpMethod; 5] = [
    HttpMethod::Put,
    HttpMethod::Patch,
    HttpMethod::Get,
    HttpMethod::Delete,
    HttpMethod::Post,
];

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub title: String,
    pub path: String,
    pub name: String,
    #[serde(flatten)]
    pub doc: DocMeta,
    pub request: Request,
    pub response: Response,
    pub auth_methods: Vec<AuthMethod>,
    pub workspace_scope: WorkspaceScope,
    pub code_samples: Vec<CodeSample>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Request {
    pub methods: Vec<HttpMethod>,
    pub semantic_method: HttpMethod,
    pub preferred_method: HttpMethod,
    pub parameters: Vec<Parameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "responseType", rename_all = "snake_case")]
pub enum Response {
    #[serde(rename_all = "camelCase")]
    Void { description: String },
    Resource(ResourceResponse),
    ResourceList(ResourceResponse),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub response_key: String,
    pub resource_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_attempt_type: Option<String>,
    pub is_paginated: bool,
    pub description: String,
}

impl Response {
    /// The resource response payload, unless the response is void.
    pub fn resource(&self) -> Option<&ResourceResponse> {
        match self {
            Response::Void { .. } => None,
            Response::Resource(r) | Response::ResourceList(r) => Some(r),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthMethod {
    ApiKey,
    ClientSessionToken,
    PublishableKey,
    PersonalAccessToken,
    ConsoleSessionToken,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkspaceScope {
    None,
    Optional,
    Required,
}

/// Map a security scheme name to its auth method and whether it is bound to a workspace.
fn auth_scheme(name: &str) -> Option<(AuthMethod, bool)> {
    Some(match name {
        "api_key" => (AuthMethod::ApiKey, true),
        "client_session" => (AuthMethod::ClientSessionToken, true),
        "publishable_key" => (AuthMethod::PublishableKey, true),
        "pat_with_workspace" => (AuthMethod::PersonalAccessToken, true),
        "pat_without_workspace" => (AuthMethod::PersonalAccessToken, false),
        "console_session_with_workspace" => (AuthMethod::ConsoleSessionToken, true),
        "console_session_without_workspace" => (AuthMethod::ConsoleSessionToken, false),
        _ => return None,
    })
}

/// Build the endpoint for one raw path entry.
pub fn build_endpoint(
    path: &str,
    item: &PathItem,
    options: &CompileOptions,
    warnings: &mut Vec<CompileWarning>,
) -> Result<Endpoint, CompileError> {
    let methods = item.methods();
    if methods.is_empty() || methods.len() > 2 {
        blueprint_telemetry::log_advisory!(
            location = %path,
            method_count = methods.len(),
            "path declares an unusual number of methods"
        );
        warnings.push(CompileWarning {
            code: WARN_METHOD_COUNT.to_string(),
            message: format!("path declares {} methods", methods.len()),
            location: Some(path.to_string()),
        });
    }

    let primary = item
        .operation(HttpMethod::Post)
        .ok_or_else(|| CompileError::MissingPostOperation(path.to_string()))?;

    let name = path
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .ok_or_else(|| CompileError::UnresolvedName(format!("endpoint name for '{}'", path)))?
        .to_string();

    let semantic_method = semantic_method(&methods);

    let parameters = build_parameters(path, primary, warnings)?;
    let preferred_method = preferred_method(&methods, semantic_method, &parameters);

    let response = resolve_response(path, primary, options)?;
    let (auth_methods, workspace_scope) = resolve_auth(path, primary, warnings);

    Ok(Endpoint {
        title: primary
            .title
            .clone()
            .or_else(|| primary.summary.clone())
            .unwrap_or_default(),
        path: path.to_string(),
        name,
        doc: DocMeta::from_operation(primary),
        request: Request {
            methods,
            semantic_method,
            preferred_method,
            parameters,
        },
        response,
        auth_methods,
        workspace_scope,
        code_samples: Vec::new(),
    })
}

/// The single declared method, or the most specific one by fixed priority.
pub fn semantic_method(methods: &[HttpMethod]) -> HttpMethod {
    if let [only] = methods {
        return *only;
    }
    SEMANTIC_PRIORITY
        .into_iter()
        .find(|method| methods.contains(method))
        .unwrap_or(HttpMethod::Post)
}

/// POST is preferred over GET/DELETE when the request carries structured data.
///
/// `parameters` are the endpoint's compiled parameters, taken from the POST
/// operation together with its body properties.
fn preferred_method(
    methods: &[HttpMethod],
    semantic_method: HttpMethod,
    parameters: &[Parameter],
) -> HttpMethod {
    let bodyless = matches!(semantic_method, HttpMethod::Get | HttpMethod::Delete);
    let structured = parameters.iter().any(Parameter::is_structured);

    if methods.contains(&HttpMethod::Post) && bodyless && structured {
        HttpMethod::Post
    } else {
        semantic_method
    }
}

/// Declared operation parameters followed by the JSON request body's properties.
fn build_parameters(
    path: &str,
    operation: &Operation,
    warnings: &mut Vec<CompileWarning>,
) -> Result<Vec<Parameter>, CompileError> {
    let mut parameters = Vec::new();

    for parameter in &operation.parameters {
        let location = format!("{} {}", path, parameter.name);
        let mut schema = parameter.schema.as_ref().map(flatten).unwrap_or_default();
        if schema.type_name().is_none() {
            blueprint_telemetry::log_schema_skipped!(
                location = %location,
                "parameter has no type, skipping"
            );
            warnings.push(CompileWarning {
                code: WARN_TYPELESS_PROPERTY.to_string(),
                message: format!("parameter '{}' has no type and was dropped", parameter.name),
                location: Some(location),
            });
            continue;
        }
        if schema.description.is_none() {
            schema.description = parameter.description.clone();
        }
        parameters.push(Classifier::new(warnings).classify(
            &parameter.name,
            &schema,
            parameter.required,
            &location,
        )?);
    }

    if let Some(body) = operation
        .request_body
        .as_ref()
        .and_then(|body| body.json_schema())
    {
        let body = flatten(body);
        parameters.extend(Classifier::new(warnings).classify_properties(&body, path)?);
    }

    Ok(parameters)
}

/// Resolve the response shape from `x-response-key` and the 200 response.
fn resolve_response(
    path: &str,
    operation: &Operation,
    options: &CompileOptions,
) -> Result<Response, CompileError> {
    let ok = operation.responses.get("200");
    let description = ok
        .and_then(|response| response.description.as_deref())
        .map(normalize_description)
        .unwrap_or_default();

    let response_key = match &operation.response_key {
        None => return Err(CompileError::MissingResponseKey(path.to_string())),
        Some(None) => return Ok(Response::Void { description }),
        Some(Some(key)) => key,
    };

    let schema = ok
        .and_then(|response| response.json_schema())
        .map(flatten)
        .ok_or_else(|| {
            CompileError::InvalidResponseKey(format!(
                "'{}' at {}: no 200 JSON response",
                response_key, path
            ))
        })?;
    let properties = schema.properties.as_ref();
    let key_schema = properties
        .and_then(|properties| properties.get(response_key))
        .ok_or_else(|| {
            CompileError::InvalidResponseKey(format!(
                "'{}' at {}: not a property of the 200 response",
                response_key, path
            ))
        })?;

    let is_list = key_schema.is_type("array");
    let resource_type = if is_list {
        key_schema.items.as_deref().and_then(SchemaNode::ref_name)
    } else {
        key_schema.ref_name()
    }
    .ok_or_else(|| {
        CompileError::InvalidResponseKey(format!(
            "'{}' at {}: not a $ref to a resource",
            response_key, path
        ))
    })?
    .to_string();

    let is_paginated = properties.is_some_and(|properties| {
        properties.iter().any(|(name, property)| {
            name != response_key && property.ref_name() == Some(options.pagination_schema.as_str())
        })
    });

    let action_attempt_type = if resource_type == options.action_attempt_schema {
        let exempt = options
            .action_attempt_exempt_prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix.as_str()));
        match (&operation.action_attempt_type, exempt) {
            (Some(action_type), _) => Some(action_type.clone()),
            (None, true) => None,
            (None, false) => return Err(CompileError::MissingActionAttemptType(path.to_string())),
        }
    } else {
        None
    };

    let resource = ResourceResponse {
        response_key: response_key.clone(),
        resource_type,
        action_attempt_type,
        is_paginated,
        description,
    };
    Ok(if is_list {
        Response::ResourceList(resource)
    } else {
        Response::Resource(resource)
    })
}

fn resolve_auth(
    path: &str,
    operation: &Operation,
    warnings: &mut Vec<CompileWarning>,
) -> (Vec<AuthMethod>, WorkspaceScope) {
    let mut methods = Vec::new();
    let mut bound = Vec::new();
    for scheme in operation.security.iter().flat_map(|requirement| requirement.keys()) {
        match auth_scheme(scheme) {
            Some((method, workspace_bound)) => {
                if !methods.contains(&method) {
                    methods.push(method);
                }
                bound.push(workspace_bound);
            }
            None => {
                tracing::warn!(path = %path, scheme = %scheme, "unknown security scheme, skipping");
                warnings.push(CompileWarning {
                    code: WARN_UNKNOWN_AUTH_SCHEME.to_string(),
                    message: format!("unknown security scheme '{}'", scheme),
                    location: Some(path.to_string()),
                });
            }
        }
    }

    let scope = if bound.is_empty() || bound.iter().all(|b| !b) {
        WorkspaceScope::None
    } else if bound.iter().all(|b| *b) {
        WorkspaceScope::Required
    } else {
        WorkspaceScope::Optional
    };
    (methods, scope)
}
