//! # specgate-core: Foundational Types for specgate
//!
//! This crate defines the types shared by every other crate in the
//! workspace: the catalog entity record that flows through the gate, the
//! API definition dialects the gate understands, the findings produced by
//! a ruleset, and the logging capability passed explicitly into each call.
//!
//! ## Key Design Principles
//!
//! 1. **Entities are never mutated.** The gate receives an owned `Entity`
//!    and hands the same value back on success. Unknown descriptor fields
//!    are retained via `#[serde(flatten)]` so a round trip is lossless.
//!
//! 2. **Single `Dialect` enum.** Dialect selection is an exhaustive
//!    `match`, never a string comparison scattered across call sites.
//!    Adding a dialect forces every ruleset consumer to handle it.
//!
//! 3. **No global logger.** Every operation that logs takes a
//!    `&dyn LogSink`. Production code forwards to `tracing`; tests capture
//!    records in memory.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `specgate-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod dialect;
pub mod entity;
pub mod error;
pub mod finding;
pub mod log;

// Re-export primary types for ergonomic imports.
pub use dialect::Dialect;
pub use entity::{Entity, EntityMetadata, API_KIND};
pub use error::{GateError, ParseError, RulesetError, SpecValidationError};
pub use finding::{Finding, Severity, ValidationResult};
pub use log::{
    LogLevel, LogRecord, LogSink, MemoryLogSink, OwnedLogRecord, TracingLogSink, LOG_TARGET,
};
