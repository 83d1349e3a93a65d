//! Blueprint compilation benchmarks.
//!
//! Measures the cost of compiling generated types modules with varying numbers
//! of resources. Each resource contributes a get/list route pair, a resource
//! schema with composed and discriminated properties, and an event branch.
//!
//! Run with: cargo bench -p blueprint-compiler --bench compilation

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use blueprint_compiler::{compile_blueprint, parse_types_module, CompileOptions};

/// Generate a types module with N routed resources.
fn generate_module(resource_count: usize) -> String {
    let mut paths = String::new();
    let mut schemas = String::new();
    let mut event_branches = String::new();

    for i in 0..resource_count {
        let resource = format!("resource{}", i);
        paths.push_str(&format!(
            r#"    /{resource}/get:
      post:
        x-response-key: {resource}
        security: [ {{ api_key: [] }} ]
        parameters:
          - {{ name: {resource}_id, in: query, required: true, schema: {{ type: string, format: uuid }} }}
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    {resource}: {{ $ref: '#/components/schemas/{resource}' }}
    /{resource}/list:
      get:
        x-response-key: {resource}s
      post:
        x-response-key: {resource}s
        requestBody:
          content:
            application/json:
              schema:
                type: object
                properties:
                  ids: {{ type: array, items: {{ type: string, format: uuid }} }}
                  limit: {{ type: integer, default: 100 }}
        responses:
          "200":
            content:
              application/json:
                schema:
                  type: object
                  properties:
                    {resource}s: {{ type: array, items: {{ $ref: '#/components/schemas/{resource}' }} }}
                    pagination: {{ $ref: '#/components/schemas/pagination' }}
"#,
            resource = resource,
        ));
        schemas.push_str(&format!(
            r#"      {resource}:
        x-route-path: /{resource}
        x-property-groups:
          core: {{ name: Core }}
        allOf:
          - type: object
            required: [{resource}_id]
            properties:
              {resource}_id: {{ type: string, format: uuid, x-property-group-key: core }}
              created_at: {{ type: string, format: date-time }}
          - type: object
            properties:
              status:
                oneOf:
                  - {{ type: string, enum: [active, idle] }}
                  - {{ type: string, enum: [error] }}
              warnings:
                type: array
                items:
                  discriminator: {{ propertyName: warning_code }}
                  oneOf:
                    - type: object
                      properties:
                        warning_code: {{ type: string, enum: [low_battery] }}
                        level: {{ type: number }}
                    - type: object
                      properties:
                        warning_code: {{ type: string, enum: [offline] }}
                        since: {{ type: string, format: date-time }}
"#,
            resource = resource,
        ));
        event_branches.push_str(&format!(
            r#"          - type: object
            properties:
              event_id: {{ type: string, format: uuid }}
              event_type: {{ type: string, enum: [{resource}.updated] }}
              {resource}_id: {{ type: string, format: uuid }}
"#,
            resource = resource,
        ));
    }

    format!(
        r#"openapi:
  openapi: "3.0.0"
  info:
    title: Benchmark API
    version: "1.0.0"
  paths:
{paths}    /events/list:
      post:
        x-response-key: null
  components:
    schemas:
{schemas}      pagination:
        type: object
        properties:
          has_next_page: {{ type: boolean }}
      event:
        x-route-path: /events
        discriminator: {{ propertyName: event_type }}
        oneOf:
{event_branches}"#
    )
}

fn bench_blueprint_compilation(c: &mut Criterion) {
    let mut group = c.benchmark_group("blueprint_compilation");
    let options = CompileOptions::default();

    for resource_count in [10, 50, 100] {
        let module_yaml = generate_module(resource_count);

        group.bench_with_input(
            BenchmarkId::new("parse_and_compile", format!("{}_resources", resource_count)),
            &module_yaml,
            |b, module_yaml| {
                b.iter(|| {
                    let module = parse_types_module(black_box(module_yaml)).unwrap();
                    black_box(compile_blueprint(&module, &options).unwrap());
                });
            },
        );

        let module = parse_types_module(&module_yaml).unwrap();
        group.bench_with_input(
            BenchmarkId::new("compile", format!("{}_resources", resource_count)),
            &module,
            |b, module| {
                b.iter(|| black_box(compile_blueprint(black_box(module), &options).unwrap()));
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_blueprint_compilation);
criterion_main!(benches);
