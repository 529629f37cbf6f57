//! # API Definition Dialects
//!
//! The specification languages the gate can validate. Selection is driven
//! solely by `spec.type`; a value outside this enum is an explicit
//! "unrecognized" branch handled by the caller, never an implicit
//! fallthrough.

use serde::{Deserialize, Serialize};

/// A supported API definition dialect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// OpenAPI 3.x, and Swagger 2.0.
    OpenApi,
    /// AsyncAPI 2.x.
    AsyncApi,
}

impl Dialect {
    /// All supported dialects, in declaration order.
    pub const ALL: [Dialect; 2] = [Dialect::OpenApi, Dialect::AsyncApi];

    /// Map a `spec.type` value to a dialect. Matching is exact and
    /// case-sensitive.
    pub fn from_type(spec_type: &str) -> Option<Self> {
        match spec_type {
            "openapi" => Some(Self::OpenApi),
            "asyncapi" => Some(Self::AsyncApi),
            _ => None,
        }
    }

    /// The `spec.type` value selecting this dialect.
    pub fn as_type(&self) -> &'static str {
        match self {
            Self::OpenApi => "openapi",
            Self::AsyncApi => "asyncapi",
        }
    }

    /// Product spelling used in violation summaries.
    pub fn family_name(&self) -> &'static str {
        match self {
            Self::OpenApi => "OpenAPI",
            Self::AsyncApi => "AsyncAPI",
        }
    }
}

/// Upper-cased label used in log lines (`OPENAPI`, `ASYNCAPI`).
impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::OpenApi => "OPENAPI",
            Self::AsyncApi => "ASYNCAPI",
        };
        f.write_str(s)
    }
}

impl std::str::FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_type(s).ok_or_else(|| format!("unsupported dialect: {s}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_type_recognizes_supported_dialects() {
        assert_eq!(Dialect::from_type("openapi"), Some(Dialect::OpenApi));
        assert_eq!(Dialect::from_type("asyncapi"), Some(Dialect::AsyncApi));
    }

    #[test]
    fn from_type_is_case_sensitive() {
        assert_eq!(Dialect::from_type("OpenAPI"), None);
        assert_eq!(Dialect::from_type("graphql"), None);
        assert_eq!(Dialect::from_type(""), None);
    }

    #[test]
    fn display_is_upper_case() {
        assert_eq!(Dialect::OpenApi.to_string(), "OPENAPI");
        assert_eq!(Dialect::AsyncApi.to_string(), "ASYNCAPI");
    }

    #[test]
    fn as_type_inverts_from_type() {
        for d in Dialect::ALL {
            assert_eq!(Dialect::from_type(d.as_type()), Some(d));
        }
    }

    #[test]
    fn serde_uses_spec_type_spelling() {
        assert_eq!(serde_json::to_string(&Dialect::AsyncApi).unwrap(), "\"asyncapi\"");
    }
}
