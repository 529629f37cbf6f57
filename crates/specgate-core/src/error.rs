//! # Error Types: Structured Error Hierarchy
//!
//! Defines the error types used throughout specgate. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Parse failures carry the detail of both decode attempts (JSON and
//!   YAML) so an operator debugging a malformed JSON document is not
//!   handed only the YAML parser's complaint.
//! - Rule violations carry the dialect, the entity name, and the
//!   flattened `(path, message)` list.
//! - Nothing here is retried. Every variant is terminal for the call that
//!   produced it; the catalog pipeline decides entity disposition.

use thiserror::Error;

use crate::dialect::Dialect;
use crate::finding::Finding;

/// The definition text is neither valid JSON nor valid YAML.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Failed to parse API definition as JSON or YAML: {yaml} (JSON attempt: {json})")]
pub struct ParseError {
    /// Detail from the JSON decoder.
    pub json: String,
    /// Detail from the YAML decoder.
    pub yaml: String,
}

/// The decoded document violates one or more blocking rules.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Validation failed for {dialect} spec in API '{entity_name}': {} validation errors in {entity_name}: {}",
    .dialect.family_name(),
    summarize(.violations)
)]
pub struct SpecValidationError {
    pub dialect: Dialect,
    pub entity_name: String,
    /// Blocking findings, in evaluation order.
    pub violations: Vec<Finding>,
}

impl SpecValidationError {
    /// The `path: message; path: message` summary of all violations.
    pub fn summary(&self) -> String {
        summarize(&self.violations)
    }
}

fn summarize(violations: &[Finding]) -> String {
    violations
        .iter()
        .map(Finding::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Error building or running a ruleset.
#[derive(Error, Debug)]
pub enum RulesetError {
    /// An embedded schema could not be parsed.
    #[error("schema load error for '{schema_name}': {reason}")]
    SchemaLoad {
        schema_name: String,
        reason: String,
    },

    /// The compiled validator could not be built (e.g., invalid schema).
    #[error("validator build error for schema '{schema_name}': {reason}")]
    ValidatorBuild {
        schema_name: String,
        reason: String,
    },

    /// A severity override names a rule that does not exist.
    #[error("unknown rule '{code}' in severity overrides")]
    UnknownRule { code: String },

    /// Evaluation could not complete.
    #[error("ruleset evaluation failed for {dialect}: {reason}")]
    Evaluation { dialect: Dialect, reason: String },
}

/// Top-level error of the pre-ingestion gate.
#[derive(Error, Debug)]
pub enum GateError {
    /// The definition could not be decoded.
    #[error("Validation failed for {dialect} spec in API '{entity_name}': {source}")]
    Parse {
        dialect: Dialect,
        entity_name: String,
        #[source]
        source: ParseError,
    },

    /// The definition violates blocking rules of its dialect.
    #[error(transparent)]
    SpecValidation(#[from] SpecValidationError),

    /// `spec.type` names a dialect the gate does not support and the gate
    /// is configured to reject such entities.
    #[error("Unsupported API definition type '{spec_type}' in API '{entity_name}'")]
    UnsupportedDialect {
        spec_type: String,
        entity_name: String,
    },

    /// The ruleset itself failed.
    #[error("ruleset error: {0}")]
    Ruleset(#[from] RulesetError),
}

impl GateError {
    /// Name of the entity this error concerns, where known.
    pub fn entity_name(&self) -> Option<&str> {
        match self {
            Self::Parse { entity_name, .. } => Some(entity_name),
            Self::SpecValidation(e) => Some(&e.entity_name),
            Self::UnsupportedDialect { entity_name, .. } => Some(entity_name),
            Self::Ruleset(_) => None,
        }
    }

    /// Whether this is a decode failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }

    /// Whether this is a rule violation.
    pub fn is_spec_validation(&self) -> bool {
        matches!(self, Self::SpecValidation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finding::Severity;

    fn violation(path: &[&str], message: &str) -> Finding {
        Finding {
            code: "oas3-schema".to_string(),
            severity: Severity::Error,
            path: path.iter().map(|s| s.to_string()).collect(),
            message: message.to_string(),
        }
    }

    #[test]
    fn parse_error_mentions_both_formats() {
        let err = ParseError {
            json: "expected value at line 1 column 1".to_string(),
            yaml: "did not find expected node content".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse API definition as JSON or YAML"));
        assert!(msg.contains("did not find expected node content"));
        assert!(msg.contains("JSON attempt: expected value"));
    }

    #[test]
    fn spec_validation_message_names_dialect_and_entity() {
        let err = SpecValidationError {
            dialect: Dialect::OpenApi,
            entity_name: "test-api".to_string(),
            violations: vec![
                violation(&[], "\"info\" is a required property"),
                violation(&["paths", "/a"], "bad"),
            ],
        };
        assert_eq!(
            err.to_string(),
            "Validation failed for OPENAPI spec in API 'test-api': OpenAPI validation errors \
             in test-api: (root): \"info\" is a required property; paths./a: bad"
        );
    }

    #[test]
    fn gate_parse_error_wraps_parse_detail() {
        let err = GateError::Parse {
            dialect: Dialect::AsyncApi,
            entity_name: "events".to_string(),
            source: ParseError { json: "j".to_string(), yaml: "y".to_string() },
        };
        let msg = err.to_string();
        assert!(msg.contains("Validation failed for ASYNCAPI spec in API 'events'"));
        assert!(msg.contains("Failed to parse API definition as JSON or YAML"));
        assert!(err.is_parse());
        assert_eq!(err.entity_name(), Some("events"));
    }

    #[test]
    fn spec_validation_is_transparent_in_gate_error() {
        let inner = SpecValidationError {
            dialect: Dialect::AsyncApi,
            entity_name: "events".to_string(),
            violations: vec![violation(&["channels"], "missing")],
        };
        let expected = inner.to_string();
        let err = GateError::from(inner);
        assert_eq!(err.to_string(), expected);
        assert!(err.is_spec_validation());
    }
}
