//! # The Validate Contract
//!
//! [`SpecValidator::validate`] takes an entity and hands it back unchanged
//! or rejects it. It never mutates the entity, never retries, and emits at
//! most one log record per API entity it processes.
//!
//! Steps, in order:
//!
//! 1. Entities whose kind is not the gate kind pass through silently.
//! 2. Entities without a non-empty `spec.type` and `spec.definition` pass
//!    through silently.
//! 3. `spec.type` selects the dialect. An unrecognized value passes
//!    through (or is rejected, per [`UnknownDialectPolicy`]) before any
//!    decoding happens.
//! 4. The definition is decoded, JSON first and then YAML.
//! 5. The dialect's ruleset evaluates the document.
//! 6. Only error-severity findings block.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use specgate_core::{
    Dialect, Entity, GateError, LogSink, SpecValidationError, API_KIND,
};
use specgate_schema::{parse_definition, RulesetBundle, RulesetProvider};

/// What to do with an entity whose `spec.type` names no supported dialect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnknownDialectPolicy {
    /// Return the entity unchanged without logging.
    #[default]
    PassThrough,
    /// Log one error line and fail with `GateError::UnsupportedDialect`.
    Reject,
}

/// Validates API entities against the ruleset of their dialect.
///
/// The provider is shared read-only; one validator may serve any number
/// of concurrent calls.
pub struct SpecValidator<P: ?Sized = RulesetBundle> {
    provider: Arc<P>,
    gate_kind: String,
    unknown_dialect: UnknownDialectPolicy,
}

impl<P: ?Sized> Clone for SpecValidator<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            gate_kind: self.gate_kind.clone(),
            unknown_dialect: self.unknown_dialect,
        }
    }
}

impl<P: ?Sized> std::fmt::Debug for SpecValidator<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpecValidator")
            .field("gate_kind", &self.gate_kind)
            .field("unknown_dialect", &self.unknown_dialect)
            .finish_non_exhaustive()
    }
}

impl<P: RulesetProvider + ?Sized> SpecValidator<P> {
    /// A validator gating `API` entities, passing unknown dialects through.
    pub fn new(provider: Arc<P>) -> Self {
        Self {
            provider,
            gate_kind: API_KIND.to_string(),
            unknown_dialect: UnknownDialectPolicy::default(),
        }
    }

    pub fn with_gate_kind(mut self, kind: impl Into<String>) -> Self {
        self.gate_kind = kind.into();
        self
    }

    pub fn with_unknown_dialect(mut self, policy: UnknownDialectPolicy) -> Self {
        self.unknown_dialect = policy;
        self
    }

    pub fn gate_kind(&self) -> &str {
        &self.gate_kind
    }

    pub fn provider(&self) -> &Arc<P> {
        &self.provider
    }

    /// Validate `entity`, returning it unchanged when it passes.
    ///
    /// # Errors
    ///
    /// - [`GateError::Parse`] if the definition is neither JSON nor YAML.
    /// - [`GateError::SpecValidation`] if any error-severity finding is
    ///   reported.
    /// - [`GateError::UnsupportedDialect`] for an unknown `spec.type`
    ///   under [`UnknownDialectPolicy::Reject`].
    /// - [`GateError::Ruleset`] if the provider fails.
    pub async fn validate(&self, entity: Entity, log: &dyn LogSink) -> Result<Entity, GateError> {
        if !entity.is_kind(&self.gate_kind) {
            return Ok(entity);
        }
        let (Some(spec_type), Some(definition)) = (entity.spec_type(), entity.spec_definition())
        else {
            return Ok(entity);
        };
        let name = entity.display_name().to_string();

        let Some(dialect) = Dialect::from_type(spec_type) else {
            return match self.unknown_dialect {
                UnknownDialectPolicy::PassThrough => Ok(entity),
                UnknownDialectPolicy::Reject => {
                    let err = GateError::UnsupportedDialect {
                        spec_type: spec_type.to_string(),
                        entity_name: name,
                    };
                    log.error_with(&err.to_string(), &[("type", spec_type)]);
                    Err(err)
                }
            };
        };
        let fields = [("dialect", dialect.as_type()), ("entity", name.as_str())];

        let doc = match parse_definition(definition) {
            Ok(doc) => doc,
            Err(source) => {
                let err = GateError::Parse {
                    dialect,
                    entity_name: name.clone(),
                    source,
                };
                log.error_with(&err.to_string(), &fields);
                return Err(err);
            }
        };

        let result = match self.provider.evaluate(dialect, &doc).await {
            Ok(result) => result,
            Err(source) => {
                let err = GateError::Ruleset(source);
                log.error_with(
                    &format!("Validation failed for {dialect} spec in API '{name}': {err}"),
                    &fields,
                );
                return Err(err);
            }
        };

        let violations = result.into_errors();
        if violations.is_empty() {
            log.info_with(
                &format!("Successfully validated {dialect} spec for API: {name}"),
                &fields,
            );
            return Ok(entity);
        }

        let err = SpecValidationError {
            dialect,
            entity_name: name.clone(),
            violations,
        };
        log.error_with(&err.to_string(), &fields);
        Err(err.into())
    }
}
