//! # Rulesets
//!
//! A [`Ruleset`] is the ordered rule list for one dialect plus the
//! effective severity of each rule. A [`RulesetBundle`] holds one ruleset
//! per supported dialect and is built once at startup; after that it is
//! only ever read, so it can sit behind an `Arc` and serve any number of
//! concurrent validations.
//!
//! ## Severity Overrides
//!
//! Operators can retune individual rules by code:
//!
//! ```yaml
//! rules:
//!   info-contact: off
//!   operation-tags: error
//! ```
//!
//! An override naming a code that exists in neither ruleset is rejected
//! at build time, so a typo cannot silently disable nothing.

use std::collections::BTreeMap;
use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use specgate_core::{Dialect, Finding, RulesetError, Severity, ValidationResult};

use crate::rules::{self, Rule};
use crate::schemas::SchemaRegistry;

/// Per-rule severity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSetting {
    Off,
    Error,
    Warn,
    Info,
    Hint,
}

impl RuleSetting {
    /// The severity this setting maps to, or `None` for `off`.
    pub fn severity(self) -> Option<Severity> {
        match self {
            Self::Off => None,
            Self::Error => Some(Severity::Error),
            Self::Warn => Some(Severity::Warn),
            Self::Info => Some(Severity::Info),
            Self::Hint => Some(Severity::Hint),
        }
    }
}

/// Severity overrides keyed by rule code.
pub type RuleOverrides = BTreeMap<String, RuleSetting>;

/// A rule with its effective severity. `None` means disabled.
struct ConfiguredRule {
    rule: Box<dyn Rule>,
    severity: Option<Severity>,
}

/// Listing entry for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleDescriptor {
    pub code: &'static str,
    /// Effective severity; `None` when the rule is turned off.
    pub severity: Option<Severity>,
    pub description: &'static str,
}

/// The ordered, immutable rule list for one dialect.
pub struct Ruleset {
    dialect: Dialect,
    rules: Vec<ConfiguredRule>,
}

impl fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ruleset")
            .field("dialect", &self.dialect)
            .field("rules", &self.rules.iter().map(|r| r.rule.code()).collect::<Vec<_>>())
            .finish()
    }
}

impl Ruleset {
    /// The OpenAPI 2.0 / 3.x ruleset with default severities.
    pub fn openapi(registry: &SchemaRegistry) -> Result<Self, RulesetError> {
        Ok(Self::with_defaults(Dialect::OpenApi, rules::openapi::rules(registry)?))
    }

    /// The AsyncAPI 2.x ruleset with default severities.
    pub fn asyncapi(registry: &SchemaRegistry) -> Result<Self, RulesetError> {
        Ok(Self::with_defaults(Dialect::AsyncApi, rules::asyncapi::rules(registry)?))
    }

    fn with_defaults(dialect: Dialect, rules: Vec<Box<dyn Rule>>) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| {
                let severity = Some(rule.default_severity());
                ConfiguredRule { rule, severity }
            })
            .collect();
        Self { dialect, rules }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Whether a rule with this code is part of the ruleset.
    pub fn contains(&self, code: &str) -> bool {
        self.rules.iter().any(|r| r.rule.code() == code)
    }

    /// Apply the overrides whose codes belong to this ruleset.
    fn apply_overrides(&mut self, overrides: &RuleOverrides) {
        for configured in &mut self.rules {
            if let Some(setting) = overrides.get(configured.rule.code()) {
                configured.severity = setting.severity();
            }
        }
    }

    /// Rules in evaluation order with their effective severities.
    pub fn describe(&self) -> Vec<RuleDescriptor> {
        self.rules
            .iter()
            .map(|r| RuleDescriptor {
                code: r.rule.code(),
                severity: r.severity,
                description: r.rule.description(),
            })
            .collect()
    }

    /// Run every enabled rule against `doc`.
    ///
    /// Findings come out grouped by rule in declaration order, and in
    /// document order within a rule.
    pub fn evaluate(&self, doc: &Value) -> ValidationResult {
        let mut findings = Vec::new();
        let mut hits = Vec::new();
        for configured in &self.rules {
            let Some(severity) = configured.severity else {
                continue;
            };
            configured.rule.check(doc, &mut hits);
            let code = configured.rule.code();
            findings.extend(hits.drain(..).map(|hit| Finding {
                code: code.to_string(),
                severity,
                path: hit.path,
                message: hit.message,
            }));
        }
        ValidationResult::new(findings)
    }
}

/// One immutable ruleset per supported dialect.
#[derive(Debug)]
pub struct RulesetBundle {
    openapi: Ruleset,
    asyncapi: Ruleset,
}

impl RulesetBundle {
    /// Build both rulesets with default severities.
    ///
    /// # Errors
    ///
    /// Returns a `RulesetError` if an embedded schema fails to load or
    /// compile.
    pub fn new() -> Result<Self, RulesetError> {
        let registry = SchemaRegistry::embedded()?;
        Ok(Self {
            openapi: Ruleset::openapi(&registry)?,
            asyncapi: Ruleset::asyncapi(&registry)?,
        })
    }

    /// Build both rulesets and apply severity overrides.
    ///
    /// A code shared by both dialects (such as `invalid-ref`) is retuned
    /// in both.
    ///
    /// # Errors
    ///
    /// Returns `RulesetError::UnknownRule` for a code that belongs to
    /// neither ruleset.
    pub fn with_overrides(overrides: &RuleOverrides) -> Result<Self, RulesetError> {
        let mut bundle = Self::new()?;
        if let Some(code) = overrides
            .keys()
            .find(|code| !bundle.openapi.contains(code) && !bundle.asyncapi.contains(code))
        {
            return Err(RulesetError::UnknownRule { code: code.clone() });
        }
        bundle.openapi.apply_overrides(overrides);
        bundle.asyncapi.apply_overrides(overrides);
        Ok(bundle)
    }

    pub fn for_dialect(&self, dialect: Dialect) -> &Ruleset {
        match dialect {
            Dialect::OpenApi => &self.openapi,
            Dialect::AsyncApi => &self.asyncapi,
        }
    }
}

/// Evaluates decoded documents for a dialect.
///
/// This is the only suspension point of the validation contract. The
/// bundled implementation completes immediately; a provider that
/// delegates to a remote linter would await here.
#[async_trait]
pub trait RulesetProvider: Send + Sync {
    async fn evaluate(&self, dialect: Dialect, doc: &Value) -> Result<ValidationResult, RulesetError>;
}

#[async_trait]
impl RulesetProvider for RulesetBundle {
    async fn evaluate(&self, dialect: Dialect, doc: &Value) -> Result<ValidationResult, RulesetError> {
        let result = self.for_dialect(dialect).evaluate(doc);
        tracing::debug!(
            %dialect,
            findings = result.findings().len(),
            errors = result.count(Severity::Error),
            "ruleset evaluated"
        );
        Ok(result)
    }
}
