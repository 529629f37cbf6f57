//! Rules shared by both dialects: structural schema conformance, info
//! completeness, and `$ref` integrity.

use jsonschema::Validator;
use serde_json::Value;

use specgate_core::Severity;

use super::{collect_refs, has_text, lookup_local_ref, Rule, RuleHit};
use crate::schemas::pointer_segments;

/// Validates the document against a compiled structural schema.
///
/// Each schema violation becomes one hit located at the violating
/// instance path.
pub struct SchemaRule {
    code: &'static str,
    description: &'static str,
    validator: Validator,
    /// Gate deciding whether this schema applies to the document's format.
    applies: fn(&Value) -> bool,
}

impl SchemaRule {
    pub fn new(
        code: &'static str,
        description: &'static str,
        validator: Validator,
        applies: fn(&Value) -> bool,
    ) -> Self {
        Self { code, description, validator, applies }
    }
}

impl Rule for SchemaRule {
    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        if !(self.applies)(doc) {
            return;
        }
        for error in self.validator.iter_errors(doc) {
            hits.push(RuleHit {
                path: pointer_segments(&error.instance_path.to_string()),
                message: error.to_string(),
            });
        }
    }
}

/// Requires a non-empty `info.<field>` string, or an `info.<field>`
/// object when `field` is `contact`.
pub struct InfoFieldRule {
    code: &'static str,
    description: &'static str,
    field: &'static str,
}

impl InfoFieldRule {
    pub fn requiring_contact(code: &'static str) -> Self {
        Self {
            code,
            description: "Info object should contain `contact` object.",
            field: "contact",
        }
    }

    pub fn requiring_description(code: &'static str) -> Self {
        Self {
            code,
            description: "Info `description` should be present and non-empty string.",
            field: "description",
        }
    }
}

impl Rule for InfoFieldRule {
    fn code(&self) -> &'static str {
        self.code
    }

    fn description(&self) -> &'static str {
        self.description
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        // A missing info object is the schema rule's finding, not ours.
        let Some(info) = doc.get("info").filter(|v| v.is_object()) else {
            return;
        };
        let present = match self.field {
            "contact" => info.get("contact").is_some_and(Value::is_object),
            field => has_text(info, field),
        };
        if !present {
            hits.push(RuleHit::new(["info"], self.description));
        }
    }
}

/// Every local `$ref` must point at an existing node.
pub struct InvalidRefRule;

impl Rule for InvalidRefRule {
    fn code(&self) -> &'static str {
        "invalid-ref"
    }

    fn description(&self) -> &'static str {
        "Local `$ref` must resolve within the document."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (mut path, reference) in collect_refs(doc) {
            if !reference.starts_with('#') {
                continue;
            }
            if lookup_local_ref(doc, &reference).is_none() {
                path.push("$ref".to_string());
                hits.push(RuleHit {
                    path,
                    message: format!("'{reference}' does not exist"),
                });
            }
        }
    }
}

/// External references are not fetched by the gate; surface them so the
/// operator knows part of the document was not checked.
pub struct ExternalRefRule;

impl Rule for ExternalRefRule {
    fn code(&self) -> &'static str {
        "unresolved-external-ref"
    }

    fn description(&self) -> &'static str {
        "External `$ref` targets are not fetched or validated."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (mut path, reference) in collect_refs(doc) {
            if reference.starts_with('#') {
                continue;
            }
            path.push("$ref".to_string());
            hits.push(RuleHit {
                path,
                message: format!("External reference '{reference}' was not resolved"),
            });
        }
    }
}
