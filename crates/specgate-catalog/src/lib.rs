//! # specgate-catalog: Pre-Ingestion Gate
//!
//! Validates API entities before the catalog commits them. An entity of
//! the gate kind that carries a definition is decoded and linted against
//! the ruleset of its dialect; blocking findings reject the entity.
//!
//! ## Components
//!
//! - [`SpecValidator`]: the validate contract.
//! - [`SpecValidationProcessor`]: adapts the validator to the
//!   [`CatalogProcessor`] pre-processing hook.
//! - [`ProcessorRegistry`] and [`register_validator_module`]: the
//!   processing extension point and the module that plugs the gate in.
//! - [`GateConfig`]: YAML configuration (gate kind, unknown-dialect
//!   policy, rule severity overrides).
//!
//! ## Crate Policy
//!
//! - Entities are never mutated. A passing entity is returned as given.
//! - Every API entity that reaches the ruleset produces exactly one log
//!   record through the caller's [`LogSink`](specgate_core::LogSink).
//! - No global state: the ruleset bundle is shared through `Arc` and the
//!   log sink is passed explicitly.

pub mod config;
pub mod processor;
pub mod registry;
pub mod validator;

pub use config::{ConfigError, GateConfig};
pub use processor::{
    CatalogProcessor, DiscardEmitter, EntityEmitter, LocationSpec, MemoryProcessorCache,
    ProcessorCache, ProcessorError, SpecValidationProcessor,
};
pub use registry::{register_validator_module, ProcessorRegistry};
pub use validator::{SpecValidator, UnknownDialectPolicy};
