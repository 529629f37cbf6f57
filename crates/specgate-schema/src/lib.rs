//! # specgate-schema: Definition Decoding & Dialect Rulesets
//!
//! Turns raw API definition text into a JSON value and evaluates it
//! against the ruleset of its dialect.
//!
//! ## Decoding (`parse`)
//!
//! [`parse_definition`] tries JSON first and falls back to YAML. YAML
//! values are converted to their JSON equivalents (tags dropped,
//! non-string keys stringified) so every rule sees one document model.
//!
//! ## Structural Schemas (`schemas`)
//!
//! The [`schemas`] module embeds Draft 2020-12 JSON Schemas for
//! OpenAPI 3.x, Swagger 2.0, and AsyncAPI 2.x. Cross-schema `$ref`s are
//! resolved from memory; nothing is fetched over the network.
//!
//! ## Rulesets (`rules`, `ruleset`)
//!
//! - [`Rule`]: a single lint check producing located hits.
//! - [`Ruleset`]: the ordered rules of one dialect with effective
//!   severities.
//! - [`RulesetBundle`]: one ruleset per dialect, built once and shared
//!   read-only.
//! - [`RulesetProvider`]: the async evaluation seam used by the gate.
//!
//! ## Crate Policy
//!
//! - Depends only on `specgate-core` internally.
//! - Schema `$id` URIs must never be changed without updating every
//!   cross-schema `$ref`.
//! - Rules hold no mutable state.

pub mod parse;
pub mod rules;
pub mod ruleset;
pub mod schemas;

pub use parse::{parse_definition, yaml_to_json_value};
pub use rules::openapi::{detect_format, OasFormat};
pub use rules::{Rule, RuleHit};
pub use ruleset::{
    RuleDescriptor, RuleOverrides, RuleSetting, Ruleset, RulesetBundle, RulesetProvider,
};
pub use schemas::SchemaRegistry;
