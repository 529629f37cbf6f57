//! # Processor Registry
//!
//! The catalog's processing extension point. Modules register processors
//! at startup; the pipeline runs them in registration order for every
//! entity and stops at the first rejection.

use std::sync::Arc;

use specgate_core::{Entity, LogSink, RulesetError};

use crate::config::GateConfig;
use crate::processor::{
    CatalogProcessor, EntityEmitter, LocationSpec, ProcessorCache, ProcessorError,
    SpecValidationProcessor,
};

/// Ordered set of catalog processors.
#[derive(Default)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn CatalogProcessor>>,
}

impl std::fmt::Debug for ProcessorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.processors.iter().map(|p| p.processor_name()))
            .finish()
    }
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processor(&mut self, processor: Arc<dyn CatalogProcessor>) {
        self.processors.push(processor);
    }

    pub fn processors(&self) -> &[Arc<dyn CatalogProcessor>] {
        &self.processors
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }

    /// Run every processor's pre-processing hook in registration order.
    ///
    /// Each processor receives the entity returned by the previous one.
    /// The first error aborts the run.
    pub async fn pre_process(
        &self,
        mut entity: Entity,
        location: &LocationSpec,
        emit: &dyn EntityEmitter,
        origin_location: &LocationSpec,
        cache: &dyn ProcessorCache,
    ) -> Result<Entity, ProcessorError> {
        for processor in &self.processors {
            tracing::debug!(
                processor = processor.processor_name(),
                entity = entity.display_name(),
                "pre-processing entity"
            );
            entity = processor
                .pre_process_entity(entity, location, emit, origin_location, cache)
                .await?;
        }
        Ok(entity)
    }
}

/// Register the API spec validation processor with the catalog.
///
/// # Errors
///
/// Returns a `RulesetError` if the rulesets cannot be built, including an
/// override naming an unknown rule. Nothing is registered in that case.
pub fn register_validator_module(
    registry: &mut ProcessorRegistry,
    log: Arc<dyn LogSink>,
    config: &GateConfig,
) -> Result<(), RulesetError> {
    log.info("Initializing catalog validator module");

    let validator = config.build_validator()?;
    registry.add_processor(Arc::new(SpecValidationProcessor::new(validator, log.clone())));

    log.info("API spec validation processor registered successfully");
    Ok(())
}
