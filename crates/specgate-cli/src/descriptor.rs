//! # Catalog Descriptor Loading
//!
//! A descriptor file holds one or more YAML documents, each a catalog
//! entity. An API entity may keep its definition in a sibling file:
//!
//! ```yaml
//! spec:
//!   type: openapi
//!   definition:
//!     $text: ./openapi.yaml
//! ```
//!
//! Local `$text` references are substituted with the referenced file's
//! contents, resolved against the descriptor's directory. Remote targets
//! are left in place and the entity passes through the gate unvalidated.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;

use specgate_core::Entity;
use specgate_schema::yaml_to_json_value;

/// Placeholder key for file-backed definitions.
const TEXT_REF_KEY: &str = "$text";

/// An entity read from a descriptor file.
#[derive(Debug, Clone)]
pub struct LoadedEntity {
    pub source: PathBuf,
    /// Zero-based position among the file's non-empty documents.
    pub index: usize,
    pub entity: Entity,
}

impl LoadedEntity {
    /// `path#index`, used in reports.
    pub fn location(&self) -> String {
        format!("{}#{}", self.source.display(), self.index)
    }
}

/// Read every entity from a multi-document YAML descriptor file.
pub fn load_descriptors(path: &Path) -> Result<Vec<LoadedEntity>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read descriptor: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    let mut entities = Vec::new();
    for (position, document) in serde_yaml::Deserializer::from_str(&text).enumerate() {
        let yaml = serde_yaml::Value::deserialize(document).with_context(|| {
            format!("invalid YAML in document {position} of {}", path.display())
        })?;
        if yaml.is_null() {
            continue;
        }
        let json = yaml_to_json_value(&yaml).map_err(|e| {
            anyhow::anyhow!("unsupported YAML in document {position} of {}: {e}", path.display())
        })?;
        let mut entity: Entity = serde_json::from_value(json).with_context(|| {
            format!("document {position} of {} is not a catalog entity", path.display())
        })?;
        resolve_text_ref(&mut entity, base_dir)?;
        entities.push(LoadedEntity {
            source: path.to_path_buf(),
            index: entities.len(),
            entity,
        });
    }
    Ok(entities)
}

/// Replace `spec.definition: { $text: <path> }` with the file's contents.
fn resolve_text_ref(entity: &mut Entity, base_dir: &Path) -> Result<()> {
    let Some(definition) = entity.spec.as_mut().and_then(|spec| spec.get_mut("definition")) else {
        return Ok(());
    };
    let Some(target) = definition.get(TEXT_REF_KEY).and_then(Value::as_str) else {
        return Ok(());
    };
    if target.contains("://") {
        tracing::warn!(
            entity = %entity.metadata.name,
            target,
            "remote $text definitions are not fetched"
        );
        return Ok(());
    }

    let resolved = base_dir.join(target);
    let contents = std::fs::read_to_string(&resolved)
        .with_context(|| format!("failed to read definition: {}", resolved.display()))?;
    tracing::debug!(path = %resolved.display(), "substituted $text definition");
    *definition = Value::String(contents);
    Ok(())
}
