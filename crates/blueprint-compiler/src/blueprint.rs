use std::path::Path;

use serde::Serialize;

use blueprint_spec_parser::{parse_types_module_file, TypesModule};

use crate::endpoint::{build_endpoint, Endpoint};
use crate::error::{CompileError, CompileWarning};
use crate::resources::{
    classify_resources, harvest_action_attempt_types, ActionAttempt, EventResource, Pagination,
    Resource,
};
use crate::routes::{build_namespaces, build_routes, Namespace, Route};
use crate::samples::{render_samples, RenderContext};
use crate::validate::validate_blueprint;

/// Compiler version (from Cargo.toml).
pub const COMPILER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Component schema compiled into the pagination singleton.
    pub pagination_schema: String,
    /// Component schema holding the action-attempt union.
    pub action_attempt_schema: String,
    /// Paths under these prefixes may return action attempts without `x-action-attempt-type`.
    pub action_attempt_exempt_prefixes: Vec<String>,
    /// Response key reported on the pagination singleton.
    pub pagination_response_key: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            pagination_schema: "pagination".to_string(),
            action_attempt_schema: "action_attempt".to_string(),
            action_attempt_exempt_prefixes: vec!["/action_attempts".to_string()],
            pagination_response_key: "pagination".to_string(),
        }
    }
}

/// The compiled API description.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blueprint {
    pub title: String,
    pub routes: Vec<Route>,
    pub namespaces: Vec<Namespace>,
    pub resources: Vec<Resource>,
    pub pagination: Option<Pagination>,
    pub events: Vec<EventResource>,
    pub action_attempts: Vec<ActionAttempt>,
}

impl Blueprint {
    pub fn to_json(&self, pretty: bool) -> Result<String, CompileError> {
        Ok(if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        })
    }

    pub fn endpoints(&self) -> impl Iterator<Item = &Endpoint> {
        self.routes.iter().flat_map(|route| &route.endpoints)
    }
}

/// Result of compilation including the blueprint and any warnings.
#[derive(Debug, Clone)]
pub struct CompileResult {
    pub blueprint: Blueprint,
    /// Non-fatal issues, sorted by location.
    pub warnings: Vec<CompileWarning>,
}

/// Compile a types module into a Blueprint without rendering samples.
pub fn compile_blueprint(
    module: &TypesModule,
    options: &CompileOptions,
) -> Result<CompileResult, CompileError> {
    let document = &module.openapi;
    blueprint_telemetry::log_compile_started!(
        title = %document.info.title,
        paths = document.paths.len(),
        schemas = document.components.schemas.len(),
        "compiling blueprint"
    );

    let mut warnings: Vec<CompileWarning> = Vec::new();

    let all_paths: Vec<&str> = document.paths.keys().map(String::as_str).collect();
    let endpoints = document
        .paths
        .iter()
        .map(|(path, item)| build_endpoint(path, item, options, &mut warnings))
        .collect::<Result<Vec<_>, _>>()?;
    let routes = build_routes(endpoints, &all_paths)?;
    let namespaces = build_namespaces(&routes);

    let schemas = &document.components.schemas;
    let action_attempt_types = harvest_action_attempt_types(schemas, options);
    let resource_set = classify_resources(schemas, options, &mut warnings)?;

    let blueprint = Blueprint {
        title: document.info.title.clone(),
        routes,
        namespaces,
        resources: resource_set.resources,
        pagination: resource_set.pagination,
        events: resource_set.events,
        action_attempts: resource_set.action_attempts,
    };
    validate_blueprint(&blueprint, &action_attempt_types)?;

    warnings.sort_by(|a, b| {
        (&a.location, &a.code, &a.message).cmp(&(&b.location, &b.code, &b.message))
    });

    blueprint_telemetry::log_compile_finished!(
        routes = blueprint.routes.len(),
        resources = blueprint.resources.len(),
        events = blueprint.events.len(),
        action_attempts = blueprint.action_attempts.len(),
        warnings = warnings.len(),
        "blueprint compiled"
    );

    Ok(CompileResult {
        blueprint,
        warnings,
    })
}

/// Compile a types module and render its code and resource samples.
pub async fn create_blueprint(
    module: &TypesModule,
    options: &CompileOptions,
    context: &RenderContext,
) -> Result<CompileResult, CompileError> {
    let mut result = compile_blueprint(module, options)?;
    render_samples(
        &mut result.blueprint,
        &module.code_sample_definitions,
        &module.resource_sample_definitions,
        context,
    )
    .await?;
    Ok(result)
}

/// Compile a types module file and write the Blueprint JSON to `output`.
pub async fn compile_file(
    input: &Path,
    output: &Path,
    options: &CompileOptions,
    context: &RenderContext,
    pretty: bool,
) -> Result<CompileResult, CompileError> {
    let module = parse_types_module_file(input)?;
    let result = create_blueprint(&module, options, context).await?;
    std::fs::write(output, result.blueprint.to_json(pretty)?)?;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::endpoint::Response;
    use crate::error::WARN_TYPELESS_PROPERTY;
    use crate::property::FieldKind;
    use blueprint_spec_parser::{parse_types_module, HttpMethod};
    use tempfile::TempDir;

    const BUNDLE: &str = r#"
openapi:
  openapi: 3.0.0
  info: { title: Device API, version: 1.0.0 }
  paths:
    /devices/get:
      post:
        x-response-key: device
        x-deprecated: Use /devices/list.
        security: [ { api_key: [] } ]
        parameters:
          - { name: device_id, in: query, required: true, schema: { type: string, format: uuid } }
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    device: { $ref: '#/components/schemas/device' }
    /devices/list:
      get:
        x-response-key: devices
      post:
        x-response-key: devices
        requestBody:
          content:
            application/json:
              schema:
                type: object
                properties:
                  device_ids: { type: array, items: { type: string, format: uuid } }
                  limit: { type: integer, default: 500 }
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    devices: { type: array, items: { $ref: '#/components/schemas/device' } }
                    pagination: { $ref: '#/components/schemas/pagination' }
    /locks/unlock_door:
      post:
        x-response-key: action_attempt
        x-action-attempt-type: UNLOCK_DOOR
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    action_attempt: { $ref: '#/components/schemas/action_attempt' }
    /action_attempts/get:
      post:
        x-response-key: action_attempt
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    action_attempt: { $ref: '#/components/schemas/action_attempt' }
  components:
    schemas:
      device:
        type: object
        x-route-path: /devices
        properties:
          device_id: { type: string, format: uuid }
          untyped: { description: dropped }
      pagination:
        type: object
        properties:
          has_next_page: { type: boolean }
      action_attempt:
        x-route-path: /action_attempts
        oneOf:
          - type: object
            properties:
              action_attempt_id: { type: string, format: uuid }
              action_type: { type: string, enum: [UNLOCK_DOOR] }
              status: { type: string, enum: [pending] }
codeSampleDefinitions:
  - title: Get a device
    request: { path: /devices/get, parameters: { device_id: abc } }
    response: { body: { device: { device_id: abc } } }
resourceSampleDefinitions:
  - title: A device
    resource_type: device
    properties: { device_id: abc }
"#;

    fn compile(bundle: &str) -> Result<CompileResult, CompileError> {
        let module = parse_types_module(bundle).unwrap();
        compile_blueprint(&module, &CompileOptions::default())
    }

    #[test]
    fn compile_full_bundle() {
        let result = compile(BUNDLE).unwrap();
        let bp = &result.blueprint;
        assert_eq!(bp.title, "Device API");

        let paths: Vec<&str> = bp.routes.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(paths, vec!["/devices", "/locks", "/action_attempts"]);
        assert_eq!(bp.routes[0].endpoints.len(), 2);
        assert!(!bp.routes[0].is_deprecated);

        let list = &bp.routes[0].endpoints[1];
        assert_eq!(list.request.semantic_method, HttpMethod::Get);
        assert_eq!(list.request.preferred_method, HttpMethod::Post);
        assert!(list.request.parameters[1].extra.has_default);
        let Response::ResourceList(response) = &list.response else {
            panic!("expected list");
        };
        assert!(response.is_paginated);

        assert_eq!(bp.resources[0].resource_type, "device");
        assert_eq!(bp.resources[0].properties.len(), 1);
        assert!(bp.pagination.is_some());
        assert_eq!(bp.action_attempts[0].action_attempt_type, "UNLOCK_DOOR");
        assert!(matches!(
            bp.action_attempts[0].resource.properties[2].kind,
            FieldKind::Enum { .. }
        ));

        assert_eq!(result.warnings.len(), 1);
        assert_eq!(result.warnings[0].code, WARN_TYPELESS_PROPERTY);
    }

    #[test]
    fn route_deprecated_only_when_every_endpoint_is() {
        let bundle = BUNDLE.replace(
            "      get:\n        x-response-key: devices\n      post:\n        x-response-key: devices\n",
            "      get:\n        x-response-key: devices\n      post:\n        x-deprecated: true\n        x-response-key: devices\n",
        );
        let result = compile(&bundle).unwrap();
        assert!(result.blueprint.routes[0].is_deprecated);
        assert!(!result.blueprint.routes[1].is_deprecated);
    }

    #[test]
    fn unknown_resource_route_path_is_fatal() {
        let bundle = BUNDLE.replace("x-route-path: /devices", "x-route-path: /thermostats");
        let err = compile(&bundle).unwrap_err();
        assert_eq!(err.code(), "E1120");
        assert!(err.to_string().contains("/thermostats"));
    }

    #[test]
    fn missing_post_is_fatal() {
        let bundle = BUNDLE.replace(
            "    /locks/unlock_door:\n      post:",
            "    /locks/unlock_door:\n      put:",
        );
        let err = compile(&bundle).unwrap_err();
        assert_eq!(err.code(), "E1110");
    }

    #[test]
    fn undeclared_action_attempt_type_is_fatal() {
        let bundle = BUNDLE.replace(
            "x-action-attempt-type: UNLOCK_DOOR",
            "x-action-attempt-type: LOCK_DOOR",
        );
        let err = compile(&bundle).unwrap_err();
        assert_eq!(err.code(), "E1141");
        assert!(err.to_string().contains("LOCK_DOOR"));
    }

    const GROUPED: &str = r#"
openapi:
  openapi: 3.0.0
  info: { title: Grouped API, version: 1.0.0 }
  paths:
    /events/list:
      post:
        x-response-key: null
        responses: { "200": { description: OK } }
    /action_attempts/get:
      post:
        x-response-key: null
        responses: { "200": { description: OK } }
  components:
    schemas:
      pagination:
        type: object
        x-property-groups:
          cursor: { name: Cursor }
        properties:
          next_page_cursor: { type: string, x-property-group-key: cursor }
      event:
        x-route-path: /events
        discriminator: { propertyName: event_type }
        x-property-groups:
          ids: { name: IDs }
        oneOf:
          - type: object
            properties:
              event_id: { type: string, format: uuid, x-property-group-key: ids }
              event_type: { type: string, enum: [device.connected] }
      action_attempt:
        x-route-path: /action_attempts
        x-property-groups:
          ids: { name: IDs }
        oneOf:
          - type: object
            properties:
              action_attempt_id: { type: string, x-property-group-key: ids }
              action_type: { type: string, enum: [UNLOCK_DOOR] }
"#;

    #[test]
    fn group_keys_declared_by_unions_and_pagination_compile() {
        let result = compile(GROUPED).unwrap();
        let bp = &result.blueprint;
        assert_eq!(bp.events[0].resource.property_groups[0].property_group_key, "ids");
        assert_eq!(
            bp.action_attempts[0].resource.property_groups[0].property_group_key,
            "ids"
        );
        let pagination = bp.pagination.as_ref().unwrap();
        assert_eq!(pagination.property_groups[0].property_group_key, "cursor");
    }

    #[test]
    fn undeclared_branch_group_key_is_still_fatal() {
        let bundle = GROUPED.replace(
            "event_id: { type: string, format: uuid, x-property-group-key: ids }",
            "event_id: { type: string, format: uuid, x-property-group-key: hardware }",
        );
        let err = compile(&bundle).unwrap_err();
        assert_eq!(err.code(), "E1130");
        assert!(err.to_string().contains("hardware"));
    }

    #[test]
    fn blueprint_json_shape() {
        let result = compile(BUNDLE).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&result.blueprint.to_json(false).unwrap()).unwrap();
        assert_eq!(value["routes"][0]["namespacePath"], serde_json::Value::Null);
        assert_eq!(value["routes"][0]["endpoints"][0]["isDeprecated"], true);
        assert_eq!(
            value["routes"][0]["endpoints"][0]["deprecationMessage"],
            "Use /devices/list."
        );
        assert_eq!(value["resources"][0]["properties"][0]["format"], "id");
        assert_eq!(value["pagination"]["responseKey"], "pagination");
        assert_eq!(value["actionAttempts"][0]["actionAttemptType"], "UNLOCK_DOOR");
    }

    #[tokio::test]
    async fn create_blueprint_renders_samples() {
        let module = parse_types_module(BUNDLE).unwrap();
        let result = create_blueprint(
            &module,
            &CompileOptions::default(),
            &RenderContext::with_builtin("https://api.example.com"),
        )
        .await
        .unwrap();
        let bp = &result.blueprint;
        assert_eq!(bp.routes[0].endpoints[0].code_samples.len(), 1);
        assert_eq!(bp.resources[0].resource_samples.len(), 1);
    }

    #[tokio::test]
    async fn compile_file_writes_json() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("types.yaml");
        let output = dir.path().join("blueprint.json");
        std::fs::write(&input, BUNDLE).unwrap();

        compile_file(
            &input,
            &output,
            &CompileOptions::default(),
            &RenderContext::new(),
            true,
        )
        .await
        .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(written["title"], "Device API");
    }
}
