//! Gate configuration, loaded from YAML.
//!
//! ```yaml
//! gate_kind: API
//! unknown_dialect: reject
//! rules:
//!   info-contact: off
//!   operation-tags: error
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use specgate_core::{RulesetError, API_KIND};
use specgate_schema::{RuleOverrides, RulesetBundle};

use crate::validator::{SpecValidator, UnknownDialectPolicy};

/// Error loading a [`GateConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid gate config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid gate config: {0}")]
    Invalid(String),
}

/// Gate settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateConfig {
    /// Entity kind the gate validates.
    pub gate_kind: String,
    pub unknown_dialect: UnknownDialectPolicy,
    /// Per-rule severity overrides.
    pub rules: RuleOverrides,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            gate_kind: API_KIND.to_string(),
            unknown_dialect: UnknownDialectPolicy::default(),
            rules: RuleOverrides::new(),
        }
    }
}

impl GateConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text)
    }

    /// Parse a config document. An empty document yields the defaults.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(text)?;
        if config.gate_kind.trim().is_empty() {
            return Err(ConfigError::Invalid("gate_kind must not be empty".to_string()));
        }
        Ok(config)
    }

    /// Build the ruleset bundle with this config's overrides applied.
    pub fn build_bundle(&self) -> Result<RulesetBundle, RulesetError> {
        RulesetBundle::with_overrides(&self.rules)
    }

    /// Build a validator over a fresh bundle.
    pub fn build_validator(&self) -> Result<SpecValidator, RulesetError> {
        Ok(self.validator_for(Arc::new(self.build_bundle()?)))
    }

    /// Build a validator over an existing bundle.
    pub fn validator_for(&self, bundle: Arc<RulesetBundle>) -> SpecValidator {
        SpecValidator::new(bundle)
            .with_gate_kind(self.gate_kind.clone())
            .with_unknown_dialect(self.unknown_dialect)
    }
}
