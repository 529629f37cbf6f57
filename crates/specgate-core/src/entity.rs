//! # Catalog Entity Model
//!
//! The record a catalog pipeline hands to the gate before committing it.
//! Field names follow the catalog descriptor format (`apiVersion`, `kind`,
//! `metadata`, `spec`), so a `catalog-info.yaml` document deserializes
//! directly into an [`Entity`].
//!
//! The gate only reads `kind`, `metadata.name`, `spec.type` and
//! `spec.definition`. Everything else is carried opaquely and must come
//! back out byte-for-byte equivalent.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// The entity kind that carries API definitions.
pub const API_KIND: &str = "API";

/// Name reported for entities whose `metadata.name` is empty.
pub const UNKNOWN_ENTITY_NAME: &str = "unknown";

/// A catalog entity as supplied by the processing pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    /// Descriptor schema version (e.g., `backstage.io/v1alpha1`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    /// Discriminator (e.g., `API`, `Component`).
    pub kind: String,
    /// Identifying metadata.
    #[serde(default)]
    pub metadata: EntityMetadata,
    /// Kind-specific payload. Absent for some kinds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spec: Option<Map<String, Value>>,
    /// Any other top-level descriptor fields (`relations`, `status`, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// Entity metadata block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityMetadata {
    /// Entity name. Uniqueness is enforced by the catalog, not here.
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub annotations: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Entity {
    /// Build a minimal entity with the given kind and name and no spec.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            api_version: "backstage.io/v1alpha1".to_string(),
            kind: kind.into(),
            metadata: EntityMetadata {
                name: name.into(),
                ..EntityMetadata::default()
            },
            spec: None,
            extra: BTreeMap::new(),
        }
    }

    /// Builder-style setter for a string-valued `spec` field.
    pub fn with_spec_field(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.spec
            .get_or_insert_with(Map::new)
            .insert(key.to_string(), value.into());
        self
    }

    /// Whether this entity's kind equals `kind`.
    pub fn is_kind(&self, kind: &str) -> bool {
        self.kind == kind
    }

    /// Read a `spec` field as a non-empty string.
    ///
    /// Empty strings and non-string values are treated as absent.
    pub fn spec_str(&self, key: &str) -> Option<&str> {
        self.spec
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// The dialect selector, `spec.type`.
    pub fn spec_type(&self) -> Option<&str> {
        self.spec_str("type")
    }

    /// The raw definition text, `spec.definition`.
    pub fn spec_definition(&self) -> Option<&str> {
        self.spec_str("definition")
    }

    /// Name used in log lines and errors: `metadata.name`, or `"unknown"`.
    pub fn display_name(&self) -> &str {
        if self.metadata.name.is_empty() {
            UNKNOWN_ENTITY_NAME
        } else {
            &self.metadata.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserialize_catalog_descriptor() {
        let yaml = r#"
apiVersion: backstage.io/v1alpha1
kind: API
metadata:
  name: petstore
  description: The petstore API
  tags: [pets]
  annotations:
    github.com/project-slug: acme/petstore
spec:
  type: openapi
  lifecycle: production
  owner: team-a
  definition: |
    openapi: "3.0.0"
"#;
        let entity: Entity = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(entity.kind, "API");
        assert_eq!(entity.metadata.name, "petstore");
        assert_eq!(entity.metadata.tags, vec!["pets".to_string()]);
        assert_eq!(entity.spec_type(), Some("openapi"));
        assert!(entity.spec_definition().unwrap().contains("openapi"));
        assert_eq!(entity.spec_str("owner"), Some("team-a"));
    }

    #[test]
    fn unknown_fields_are_retained() {
        let value = json!({
            "apiVersion": "backstage.io/v1alpha1",
            "kind": "Component",
            "metadata": {"name": "svc", "uid": "1234", "etag": "abc"},
            "spec": {"type": "service"},
            "relations": [{"type": "ownedBy", "targetRef": "group:default/a"}]
        });
        let entity: Entity = serde_json::from_value(value.clone()).unwrap();
        assert!(entity.extra.contains_key("relations"));
        assert!(entity.metadata.extra.contains_key("uid"));
        assert_eq!(serde_json::to_value(&entity).unwrap(), value);
    }

    #[test]
    fn missing_api_version_is_not_invented_on_output() {
        let value = json!({
            "kind": "API",
            "metadata": {"name": "orders"},
            "spec": {"type": "openapi", "definition": "{}"}
        });
        let entity: Entity = serde_json::from_value(value.clone()).unwrap();
        assert!(entity.api_version.is_empty());
        assert_eq!(serde_json::to_value(&entity).unwrap(), value);
    }

    #[test]
    fn empty_and_non_string_spec_fields_are_absent() {
        let entity = Entity::new("API", "x")
            .with_spec_field("type", "")
            .with_spec_field("definition", json!({"$text": "./api.yaml"}));
        assert_eq!(entity.spec_type(), None);
        assert_eq!(entity.spec_definition(), None);
    }

    #[test]
    fn missing_spec_reads_as_absent() {
        let entity = Entity::new("API", "x");
        assert!(entity.spec.is_none());
        assert_eq!(entity.spec_type(), None);
    }

    #[test]
    fn display_name_falls_back_to_unknown() {
        assert_eq!(Entity::new("API", "").display_name(), "unknown");
        assert_eq!(Entity::new("API", "orders").display_name(), "orders");
    }

    #[test]
    fn kind_comparison_is_exact() {
        let entity = Entity::new("api", "x");
        assert!(!entity.is_kind(API_KIND));
        assert!(Entity::new("API", "x").is_kind(API_KIND));
    }
}
