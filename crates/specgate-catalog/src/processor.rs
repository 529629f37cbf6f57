//! # Catalog Processor Surface
//!
//! The catalog ingestion pipeline calls each registered processor's
//! pre-processing hook before an entity is committed. Processors receive
//! the entity, the location it was read from, an emitter for side
//! entities, the origin location, and a per-processor cache.
//!
//! [`SpecValidationProcessor`] is the gate's processor: it ignores the
//! emitter and the cache and delegates to [`SpecValidator`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use specgate_core::{Entity, GateError, LogSink};
use specgate_schema::{RulesetBundle, RulesetProvider};

use crate::validator::SpecValidator;

/// Where an entity was read from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LocationSpec {
    /// Location type, e.g. `file` or `url`.
    #[serde(rename = "type")]
    pub location_type: String,
    pub target: String,
}

impl LocationSpec {
    pub fn new(location_type: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            location_type: location_type.into(),
            target: target.into(),
        }
    }

    /// A `file` location.
    pub fn file(target: impl Into<String>) -> Self {
        Self::new("file", target)
    }
}

impl std::fmt::Display for LocationSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.location_type, self.target)
    }
}

/// Receives entities discovered while processing another entity.
pub trait EntityEmitter: Send + Sync {
    fn emit(&self, entity: Entity, location: &LocationSpec);
}

/// Emitter that drops everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardEmitter;

impl EntityEmitter for DiscardEmitter {
    fn emit(&self, _entity: Entity, _location: &LocationSpec) {}
}

/// Per-processor key/value state kept between processing runs.
pub trait ProcessorCache: Send + Sync {
    fn get(&self, key: &str) -> Option<Value>;
    fn set(&self, key: &str, value: Value);
}

/// In-memory [`ProcessorCache`].
#[derive(Debug, Default)]
pub struct MemoryProcessorCache {
    entries: Mutex<HashMap<String, Value>>,
}

impl MemoryProcessorCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl ProcessorCache for MemoryProcessorCache {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries.lock().get(key).cloned()
    }

    fn set(&self, key: &str, value: Value) {
        self.entries.lock().insert(key.to_string(), value);
    }
}

/// Error returned by a processor's pre-processing hook.
#[derive(Error, Debug)]
pub enum ProcessorError {
    /// The entity was rejected as invalid input.
    #[error(transparent)]
    Input(#[from] GateError),

    /// The processor itself failed.
    #[error("processor '{processor}' failed: {message}")]
    Failed { processor: String, message: String },
}

impl ProcessorError {
    /// Whether the entity, rather than the processor, is at fault.
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::Input(_))
    }
}

/// A catalog pre-processing stage.
#[async_trait]
pub trait CatalogProcessor: Send + Sync {
    /// Stable name used in pipeline diagnostics.
    fn processor_name(&self) -> &str;

    /// Inspect `entity` before it is committed, returning it (possibly
    /// replaced) or rejecting it.
    async fn pre_process_entity(
        &self,
        entity: Entity,
        location: &LocationSpec,
        emit: &dyn EntityEmitter,
        origin_location: &LocationSpec,
        cache: &dyn ProcessorCache,
    ) -> Result<Entity, ProcessorError>;
}

/// The gate's processor: runs [`SpecValidator::validate`] on every entity.
pub struct SpecValidationProcessor<P: ?Sized = RulesetBundle> {
    validator: SpecValidator<P>,
    log: Arc<dyn LogSink>,
}

impl<P: RulesetProvider + ?Sized> SpecValidationProcessor<P> {
    pub const NAME: &'static str = "SpecValidationProcessor";

    pub fn new(validator: SpecValidator<P>, log: Arc<dyn LogSink>) -> Self {
        Self { validator, log }
    }

    pub fn validator(&self) -> &SpecValidator<P> {
        &self.validator
    }
}

#[async_trait]
impl<P: RulesetProvider + ?Sized> CatalogProcessor for SpecValidationProcessor<P> {
    fn processor_name(&self) -> &str {
        Self::NAME
    }

    async fn pre_process_entity(
        &self,
        entity: Entity,
        _location: &LocationSpec,
        _emit: &dyn EntityEmitter,
        _origin_location: &LocationSpec,
        _cache: &dyn ProcessorCache,
    ) -> Result<Entity, ProcessorError> {
        Ok(self.validator.validate(entity, self.log.as_ref()).await?)
    }
}
