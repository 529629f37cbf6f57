//! # Validation Findings
//!
//! The output of evaluating a document against a ruleset: an ordered list
//! of findings, each with a severity, a location path within the parsed
//! document, and a message. Only [`Severity::Error`] findings block
//! ingestion; the rest are advisory.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Finding severity, ordered from most to least severe.
///
/// Mirrors the linter convention where `0` is an error and `3` a hint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum Severity {
    Error = 0,
    Warn = 1,
    Info = 2,
    Hint = 3,
}

impl Severity {
    /// Whether findings of this severity reject the entity.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Error)
    }

    /// Numeric level (0 = error ... 3 = hint).
    pub fn level(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Hint => "hint",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "error" => Ok(Self::Error),
            "warn" => Ok(Self::Warn),
            "info" => Ok(Self::Info),
            "hint" => Ok(Self::Hint),
            other => Err(format!("unknown severity: {other}")),
        }
    }
}

/// A single rule violation located within the parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// Code of the rule that produced this finding (e.g., `oas3-schema`).
    pub code: String,
    pub severity: Severity,
    /// Location path segments from the document root.
    pub path: Vec<String>,
    /// Human-readable description.
    pub message: String,
}

impl Finding {
    /// Path segments joined with `.`; the empty path renders as `(root)`.
    pub fn path_display(&self) -> String {
        if self.path.is_empty() {
            "(root)".to_string()
        } else {
            self.path.join(".")
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path_display(), self.message)
    }
}

/// Ordered findings from one ruleset evaluation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    findings: Vec<Finding>,
}

impl ValidationResult {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    /// All findings, in evaluation order.
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Blocking findings only, in evaluation order.
    pub fn errors(&self) -> impl Iterator<Item = &Finding> {
        self.findings.iter().filter(|f| f.severity.is_blocking())
    }

    pub fn has_errors(&self) -> bool {
        self.errors().next().is_some()
    }

    /// Number of findings at the given severity.
    pub fn count(&self, severity: Severity) -> usize {
        self.findings.iter().filter(|f| f.severity == severity).count()
    }

    /// Blocking findings rendered as `path: message`, joined by `; `.
    pub fn summary(&self) -> String {
        self.errors()
            .map(Finding::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }

    /// Consumes self and returns the blocking findings.
    pub fn into_errors(self) -> Vec<Finding> {
        self.findings
            .into_iter()
            .filter(|f| f.severity.is_blocking())
            .collect()
    }

    pub fn into_inner(self) -> Vec<Finding> {
        self.findings
    }
}
