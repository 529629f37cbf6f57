//! # Embedded Structural Schemas
//!
//! The structural half of each ruleset is a JSON Schema (Draft 2020-12)
//! compiled into the binary with `include_str!`.
//!
//! ## Schema Resolution
//!
//! All schemas use `$id` URIs of the form:
//!   `https://schemas.specgate.dev/<filename>`
//!
//! Cross-schema `$ref`s (e.g., the shared `info` object in
//! `common.schema.json`) use the same pattern. A local retriever resolves
//! them from the in-memory registry; the validator never makes a network
//! request, and a reference to an unknown schema fails the build.

use std::collections::HashMap;

use jsonschema::{Retrieve, Uri, ValidationOptions, Validator};
use serde_json::Value;

use specgate_core::RulesetError;

/// URI prefix shared by every embedded schema.
pub const SCHEMA_URI_PREFIX: &str = "https://schemas.specgate.dev/";

pub const COMMON_SCHEMA: &str = "common.schema.json";
pub const OPENAPI_3_SCHEMA: &str = "openapi-3.schema.json";
pub const SWAGGER_2_SCHEMA: &str = "swagger-2.schema.json";
pub const ASYNCAPI_2_SCHEMA: &str = "asyncapi-2.schema.json";

const EMBEDDED_SCHEMAS: &[(&str, &str)] = &[
    (COMMON_SCHEMA, include_str!("../schemas/common.schema.json")),
    (OPENAPI_3_SCHEMA, include_str!("../schemas/openapi-3.schema.json")),
    (SWAGGER_2_SCHEMA, include_str!("../schemas/swagger-2.schema.json")),
    (ASYNCAPI_2_SCHEMA, include_str!("../schemas/asyncapi-2.schema.json")),
];

/// Resolves `$ref` URIs against the schemas held in memory.
struct LocalSchemaRetriever {
    /// Map from URI string to schema value.
    schemas_by_uri: HashMap<String, Value>,
}

impl Retrieve for LocalSchemaRetriever {
    fn retrieve(
        &self,
        uri: &Uri<&str>,
    ) -> Result<Value, Box<dyn std::error::Error + Send + Sync>> {
        let uri_str = uri.as_str();

        if let Some(value) = self.schemas_by_uri.get(uri_str) {
            return Ok(value.clone());
        }

        // Fall back to the bare filename so `$ref: common.schema.json`
        // resolves as well as the absolute form.
        let filename = uri_str.rsplit('/').next().unwrap_or(uri_str);
        if let Some(value) = self.schemas_by_uri.get(filename) {
            return Ok(value.clone());
        }

        Err(format!("schema '{uri_str}' is not embedded").into())
    }
}

/// The set of parsed embedded schemas, indexed by filename.
#[derive(Debug, Clone)]
pub struct SchemaRegistry {
    schemas: HashMap<String, Value>,
}

impl SchemaRegistry {
    /// Parse every embedded schema.
    ///
    /// # Errors
    ///
    /// Returns `RulesetError::SchemaLoad` if an embedded schema is not
    /// valid JSON.
    pub fn embedded() -> Result<Self, RulesetError> {
        let mut schemas = HashMap::with_capacity(EMBEDDED_SCHEMAS.len());
        for (name, text) in EMBEDDED_SCHEMAS {
            let value: Value = serde_json::from_str(text).map_err(|e| RulesetError::SchemaLoad {
                schema_name: (*name).to_string(),
                reason: format!("invalid JSON: {e}"),
            })?;
            schemas.insert((*name).to_string(), value);
        }
        Ok(Self { schemas })
    }

    pub fn schema_count(&self) -> usize {
        self.schemas.len()
    }

    /// Names of all loaded schemas, sorted alphabetically.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }

    pub fn get_schema(&self, name: &str) -> Option<&Value> {
        self.schemas.get(name)
    }

    /// Build `ValidationOptions` with a retriever over all loaded schemas.
    ///
    /// Each schema is registered under its canonical URI, its own `$id`,
    /// and its bare filename.
    fn build_options(&self) -> ValidationOptions {
        let mut opts = jsonschema::options();
        opts.with_draft(jsonschema::Draft::Draft202012);

        let mut schemas_by_uri: HashMap<String, Value> = HashMap::new();
        for (filename, value) in &self.schemas {
            schemas_by_uri.insert(format!("{SCHEMA_URI_PREFIX}{filename}"), value.clone());
            if let Some(id_str) = value.get("$id").and_then(|v| v.as_str()) {
                schemas_by_uri.insert(id_str.to_string(), value.clone());
            }
            schemas_by_uri.insert(filename.clone(), value.clone());
        }

        opts.with_retriever(LocalSchemaRetriever { schemas_by_uri });
        opts
    }

    /// Compile a validator for the named schema.
    ///
    /// # Errors
    ///
    /// Returns `RulesetError::SchemaLoad` if the schema is unknown and
    /// `RulesetError::ValidatorBuild` if it does not compile.
    pub fn build_validator(&self, schema_name: &str) -> Result<Validator, RulesetError> {
        let schema_value = self
            .schemas
            .get(schema_name)
            .ok_or_else(|| RulesetError::SchemaLoad {
                schema_name: schema_name.to_string(),
                reason: "schema is not embedded".to_string(),
            })?;

        let opts = self.build_options();
        opts.build(schema_value).map_err(|e| RulesetError::ValidatorBuild {
            schema_name: schema_name.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Split a JSON Pointer (`/paths/~1users/get`) into unescaped segments.
pub fn pointer_segments(pointer: &str) -> Vec<String> {
    if pointer.is_empty() {
        return Vec::new();
    }
    pointer
        .trim_start_matches('/')
        .split('/')
        .map(|s| s.replace("~1", "/").replace("~0", "~"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn all_embedded_schemas_load() {
        let registry = SchemaRegistry::embedded().unwrap();
        assert_eq!(registry.schema_count(), 4);
        assert_eq!(
            registry.schema_names(),
            vec![ASYNCAPI_2_SCHEMA, COMMON_SCHEMA, OPENAPI_3_SCHEMA, SWAGGER_2_SCHEMA]
        );
    }

    #[test]
    fn embedded_ids_use_canonical_prefix() {
        let registry = SchemaRegistry::embedded().unwrap();
        for name in registry.schema_names() {
            let id = registry.get_schema(name).unwrap()["$id"].as_str().unwrap();
            assert_eq!(id, format!("{SCHEMA_URI_PREFIX}{name}"));
        }
    }

    #[test]
    fn all_schemas_compile_with_cross_refs() {
        let registry = SchemaRegistry::embedded().unwrap();
        let mut failures = Vec::new();
        for name in registry.schema_names() {
            if let Err(e) = registry.build_validator(name) {
                failures.push(format!("{name}: {e}"));
            }
        }
        assert!(failures.is_empty(), "failed to compile: {}", failures.join("\n"));
    }

    #[test]
    fn unknown_schema_is_a_load_error() {
        let registry = SchemaRegistry::embedded().unwrap();
        let err = registry.build_validator("graphql.schema.json").unwrap_err();
        assert!(matches!(err, RulesetError::SchemaLoad { .. }));
    }

    #[test]
    fn shared_info_definition_is_enforced() {
        let registry = SchemaRegistry::embedded().unwrap();
        let validator = registry.build_validator(OPENAPI_3_SCHEMA).unwrap();
        let doc = json!({"openapi": "3.0.0", "info": {"title": "t"}, "paths": {}});
        let errors: Vec<String> = validator.iter_errors(&doc).map(|e| e.to_string()).collect();
        assert_eq!(errors.len(), 1, "{errors:?}");
        assert!(errors[0].contains("version"));
    }

    #[test]
    fn pointer_segments_unescape() {
        assert!(pointer_segments("").is_empty());
        assert_eq!(
            pointer_segments("/paths/~1users~1{id}/get"),
            vec!["paths", "/users/{id}", "get"]
        );
        assert_eq!(pointer_segments("/a~0b"), vec!["a~b"]);
    }
}
