use serde_json::Value;

use crate::error::ParseError;
use crate::model::TypesModule;

/// Parse a types module bundle from a YAML/JSON string.
pub fn parse_types_module(input: &str) -> Result<TypesModule, ParseError> {
    // Parse YAML (also handles JSON since JSON is valid YAML). Going through
    // serde_yaml::Value keeps integer map keys such as `200:` usable.
    let yaml: serde_yaml::Value =
        serde_yaml::from_str(input).map_err(|e| ParseError::ParseError(e.to_string()))?;
    let root: Value =
        serde_json::to_value(yaml).map_err(|e| ParseError::ParseError(e.to_string()))?;

    let root_obj = root
        .as_object()
        .ok_or_else(|| ParseError::ParseError("types module root must be an object".into()))?;

    let document = root_obj
        .get("openapi")
        .and_then(|v| v.as_object())
        .ok_or(ParseError::UnknownFormat)?;

    detect_version(document)?;

    if !document
        .get("info")
        .and_then(|v| v.get("title"))
        .is_some_and(Value::is_string)
    {
        return Err(ParseError::SchemaError("missing 'openapi.info.title'".into()));
    }

    serde_json::from_value(root).map_err(|e| ParseError::SchemaError(e.to_string()))
}

/// Parse a types module bundle from a file path.
pub fn parse_types_module_file(path: &std::path::Path) -> Result<TypesModule, ParseError> {
    let content = std::fs::read_to_string(path)?;
    let mut module = parse_types_module(&content)?;
    module.filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string());
    Ok(module)
}

/// Check the embedded document declares OpenAPI 3.x.
fn detect_version(document: &serde_json::Map<String, Value>) -> Result<(), ParseError> {
    let version = document
        .get("openapi")
        .and_then(|v| v.as_str())
        .ok_or(ParseError::UnknownFormat)?;
    if !version.starts_with("3.") {
        return Err(ParseError::SchemaError(format!(
            "unsupported OpenAPI version: {} (only 3.x supported)",
            version
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, HttpMethod};

    #[test]
    fn parse_minimal_bundle() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  paths:
    /devices/list:
      post:
        operationId: devicesListPost
        x-response-key: devices
        responses:
          "200":
            description: OK
"#;
        let module = parse_types_module(yaml).unwrap();
        assert_eq!(module.openapi.info.title, "Test API");
        assert!(module.code_sample_definitions.is_empty());
        assert!(module.resource_sample_definitions.is_empty());

        let item = &module.openapi.paths["/devices/list"];
        let op = item.operation(HttpMethod::Post).unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("devicesListPost"));
        assert_eq!(op.response_key, Some(Some("devices".to_string())));
    }

    #[test]
    fn response_key_distinguishes_null_from_absent() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  paths:
    /a/void:
      post:
        x-response-key: null
    /a/missing:
      post:
        summary: no key
"#;
        let module = parse_types_module(yaml).unwrap();
        let void_op = module.openapi.paths["/a/void"]
            .operation(HttpMethod::Post)
            .unwrap();
        let missing_op = module.openapi.paths["/a/missing"]
            .operation(HttpMethod::Post)
            .unwrap();
        assert_eq!(void_op.response_key, Some(None));
        assert_eq!(missing_op.response_key, None);
    }

    #[test]
    fn integer_response_codes_are_accepted() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  paths:
    /a/get:
      post:
        responses:
          200:
            description: OK
"#;
        let module = parse_types_module(yaml).unwrap();
        let op = module.openapi.paths["/a/get"]
            .operation(HttpMethod::Post)
            .unwrap();
        assert!(op.responses.contains_key("200"));
    }

    #[test]
    fn methods_keep_declaration_order() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  paths:
    /devices/get:
      post: {}
      get: {}
      parameters: []
"#;
        let module = parse_types_module(yaml).unwrap();
        let item = &module.openapi.paths["/devices/get"];
        assert_eq!(item.methods(), vec![HttpMethod::Post, HttpMethod::Get]);
    }

    #[test]
    fn paths_keep_declaration_order() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  paths:
    /zebras/list:
      post: {}
    /apples/list:
      post: {}
"#;
        let module = parse_types_module(yaml).unwrap();
        let paths: Vec<&str> = module.openapi.paths.keys().map(String::as_str).collect();
        assert_eq!(paths, vec!["/zebras/list", "/apples/list"]);
    }

    #[test]
    fn parse_schema_extensions() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
  components:
    schemas:
      device:
        type: object
        x-route-path: /devices
        x-undocumented: Internal only.
        x-property-groups:
          hardware:
            name: Hardware
        properties:
          device_id:
            type: string
            format: uuid
          nickname:
            type: [string, "null"]
            x-deprecated: true
"#;
        let module = parse_types_module(yaml).unwrap();
        let device = &module.openapi.components.schemas["device"];
        assert_eq!(device.route_path.as_deref(), Some("/devices"));
        assert_eq!(
            device.undocumented,
            Some(Annotation::Message("Internal only.".to_string()))
        );
        assert_eq!(device.property_groups.as_ref().unwrap()["hardware"].name, "Hardware");

        let nickname = &device.properties.as_ref().unwrap()["nickname"];
        assert_eq!(nickname.type_name(), Some("string"));
        assert!(nickname.is_nullable());
        assert_eq!(nickname.deprecation, Some(Annotation::Flag(true)));
    }

    #[test]
    fn parse_sample_definitions() {
        let yaml = r#"
openapi:
  openapi: "3.0.0"
  info:
    title: Test API
codeSampleDefinitions:
  - title: List devices
    request:
      path: /devices/list
      parameters:
        limit: 10
    response:
      body:
        devices: []
resourceSampleDefinitions:
  - title: A device
    resource_type: device
    properties:
      device_id: abc
"#;
        let module = parse_types_module(yaml).unwrap();
        assert_eq!(module.code_sample_definitions.len(), 1);
        assert_eq!(module.code_sample_definitions[0].request.path, "/devices/list");
        assert_eq!(module.resource_sample_definitions[0].resource_type, "device");
    }

    #[test]
    fn reject_missing_openapi_document() {
        let yaml = r#"
schemas: {}
"#;
        let result = parse_types_module(yaml);
        assert!(matches!(result, Err(ParseError::UnknownFormat)));
    }

    #[test]
    fn reject_swagger_2() {
        let yaml = r#"
openapi:
  openapi: "2.0"
  info:
    title: Old API
"#;
        let result = parse_types_module(yaml);
        assert!(matches!(result, Err(ParseError::SchemaError(_))));
    }

    #[test]
    fn reject_invalid_yaml() {
        let result = parse_types_module("openapi: [unclosed");
        assert!(matches!(result, Err(ParseError::ParseError(_))));
    }
}
