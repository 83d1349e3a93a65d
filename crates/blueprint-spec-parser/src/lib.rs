//! Types module loader.
//!
//! Reads a YAML/JSON bundle holding an OpenAPI 3.x document and the code and
//! resource sample definitions, and deserializes it into typed raw-document
//! structs. Vendor extensions (`x-*`) are extracted into dedicated fields.

pub mod error;
pub mod model;
pub mod parser;

pub use error::ParseError;
pub use model::{
    Annotation, CodeSampleDefinition, Components, Discriminator, EnumValueDoc, GroupDefinition,
    HttpMethod, Info, MediaType, Operation, ParameterObject, PathItem, RawDocument, RequestBody,
    ResourceSampleDefinition, ResponseObject, SampleRequest, SampleResponse, SchemaNode,
    SchemaType, TypesModule,
};
pub use parser::{parse_types_module, parse_types_module_file};
