//! # OpenAPI Rules
//!
//! Covers OpenAPI 3.0/3.1 and Swagger 2.0. The structural schema that
//! applies is chosen by the document's declared version; the remaining
//! rules walk `paths` and work for both formats.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use specgate_core::{RulesetError, Severity};

use super::common::{ExternalRefRule, InfoFieldRule, InvalidRefRule, SchemaRule};
use super::{has_text, object_at, resolve_local, template_params, Rule, RuleHit, HTTP_METHODS};
use crate::schemas::{SchemaRegistry, OPENAPI_3_SCHEMA, SWAGGER_2_SCHEMA};

/// Declared OpenAPI format of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OasFormat {
    /// `swagger: "2.0"`
    Oas2,
    /// `openapi: 3.0.x` or `3.1.x`
    Oas3,
}

/// Detect the declared format, if any.
///
/// Only versions the bundled structural schemas describe are recognised,
/// so an unrecognised version is reported by `oas-document` alone.
pub fn detect_format(doc: &Value) -> Option<OasFormat> {
    if doc
        .get("openapi")
        .and_then(Value::as_str)
        .is_some_and(is_supported_oas3_version)
    {
        return Some(OasFormat::Oas3);
    }
    if doc.get("swagger").and_then(Value::as_str) == Some("2.0") {
        return Some(OasFormat::Oas2);
    }
    None
}

/// `3.0.N` or `3.1.N`, optionally followed by a `-suffix`.
fn is_supported_oas3_version(version: &str) -> bool {
    let Some(rest) = version
        .strip_prefix("3.0.")
        .or_else(|| version.strip_prefix("3.1."))
    else {
        return false;
    };
    let (patch, suffix) = match rest.split_once('-') {
        Some((patch, suffix)) => (patch, Some(suffix)),
        None => (rest, None),
    };
    !patch.is_empty()
        && patch.bytes().all(|b| b.is_ascii_digit())
        && suffix.map_or(true, |s| !s.is_empty())
}

fn is_oas3(doc: &Value) -> bool {
    detect_format(doc) == Some(OasFormat::Oas3)
}

fn is_oas2(doc: &Value) -> bool {
    detect_format(doc) == Some(OasFormat::Oas2)
}

/// Build the OpenAPI rule list in evaluation order.
pub(crate) fn rules(registry: &SchemaRegistry) -> Result<Vec<Box<dyn Rule>>, RulesetError> {
    Ok(vec![
        Box::new(OasDocumentRule),
        Box::new(SchemaRule::new(
            "oas3-schema",
            "OpenAPI 3.x document must conform to the structural schema.",
            registry.build_validator(OPENAPI_3_SCHEMA)?,
            is_oas3,
        )),
        Box::new(SchemaRule::new(
            "oas2-schema",
            "Swagger 2.0 document must conform to the structural schema.",
            registry.build_validator(SWAGGER_2_SCHEMA)?,
            is_oas2,
        )),
        Box::new(OperationIdUniqueRule),
        Box::new(PathParamsRule),
        Box::new(InvalidRefRule),
        Box::new(ExternalRefRule),
        Box::new(InfoFieldRule::requiring_contact("info-contact")),
        Box::new(InfoFieldRule::requiring_description("info-description")),
        Box::new(OperationIdPresentRule),
        Box::new(OperationSuccessResponseRule),
        Box::new(PathKeysNoTrailingSlashRule),
        Box::new(OperationTagsRule),
    ])
}

// ─── Operation walking ───────────────────────────────────────────────

/// One operation under `paths`.
struct Operation<'a> {
    path_key: &'a str,
    method: &'static str,
    op: &'a Value,
}

impl Operation<'_> {
    fn location(&self) -> Vec<String> {
        vec!["paths".to_string(), self.path_key.to_string(), self.method.to_string()]
    }
}

/// Path items under `paths`, skipping `x-` extensions and following
/// local `$ref`s.
fn path_items(doc: &Value) -> Vec<(&str, &Value)> {
    let Some(paths) = object_at(doc, "paths") else {
        return Vec::new();
    };
    paths
        .iter()
        .filter(|(key, _)| !key.starts_with("x-"))
        .filter_map(|(key, item)| Some((key.as_str(), resolve_local(doc, item)?)))
        .filter(|(_, item)| item.is_object())
        .collect()
}

fn operations(doc: &Value) -> Vec<Operation<'_>> {
    let mut ops = Vec::new();
    for (path_key, path_item) in path_items(doc) {
        for method in HTTP_METHODS {
            if let Some(op) = path_item.get(method).filter(|v| v.is_object()) {
                ops.push(Operation { path_key, method, op });
            }
        }
    }
    ops
}

// ─── Rules ───────────────────────────────────────────────────────────

/// The root must declare a supported OpenAPI version.
struct OasDocumentRule;

impl Rule for OasDocumentRule {
    fn code(&self) -> &'static str {
        "oas-document"
    }

    fn description(&self) -> &'static str {
        "Document must be an object declaring `openapi: 3.0.x`, `openapi: 3.1.x` or `swagger: \"2.0\"`."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        if !doc.is_object() {
            hits.push(RuleHit::new(
                Vec::<String>::new(),
                "OpenAPI document must be an object",
            ));
            return;
        }
        if detect_format(doc).is_some() {
            return;
        }
        if let Some(version) = doc.get("openapi") {
            hits.push(RuleHit::new(
                ["openapi"],
                format!("Unsupported OpenAPI version {version}; expected 3.0.x or 3.1.x"),
            ));
        } else if let Some(version) = doc.get("swagger") {
            hits.push(RuleHit::new(
                ["swagger"],
                format!("Unsupported Swagger version {version}; expected \"2.0\""),
            ));
        } else {
            hits.push(RuleHit::new(
                Vec::<String>::new(),
                "Document must declare `openapi: 3.0.x`, `openapi: 3.1.x` or `swagger: \"2.0\"`",
            ));
        }
    }
}

struct OperationIdUniqueRule;

impl Rule for OperationIdUniqueRule {
    fn code(&self) -> &'static str {
        "operation-operationId-unique"
    }

    fn description(&self) -> &'static str {
        "Every operation must have unique `operationId`."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        let mut seen: HashMap<&str, String> = HashMap::new();
        for op in operations(doc) {
            let Some(id) = op.op.get("operationId").and_then(Value::as_str) else {
                continue;
            };
            let here = format!("{} {}", op.method.to_uppercase(), op.path_key);
            match seen.get(id) {
                Some(first) => {
                    let mut path = op.location();
                    path.push("operationId".to_string());
                    hits.push(RuleHit {
                        path,
                        message: format!(
                            "operationId '{id}' must be unique; already used by {first}"
                        ),
                    });
                }
                None => {
                    seen.insert(id, here);
                }
            }
        }
    }
}

/// A path-located parameter declaration.
struct PathParam {
    name: String,
    required: bool,
    path: Vec<String>,
}

/// The `in: path` parameters of a `parameters` array.
fn declared_path_params(doc: &Value, holder: &Value, base: &[String]) -> Vec<PathParam> {
    let Some(params) = holder.get("parameters").and_then(Value::as_array) else {
        return Vec::new();
    };
    params
        .iter()
        .enumerate()
        .filter_map(|(i, raw)| {
            let param = resolve_local(doc, raw)?;
            if param.get("in").and_then(Value::as_str) != Some("path") {
                return None;
            }
            let name = param.get("name").and_then(Value::as_str)?;
            let mut path = base.to_vec();
            path.push("parameters".to_string());
            path.push(i.to_string());
            Some(PathParam {
                name: name.to_string(),
                required: param.get("required").and_then(Value::as_bool) == Some(true),
                path,
            })
        })
        .collect()
}

struct PathParamsRule;

impl PathParamsRule {
    fn check_declared(
        key: &str,
        template: &BTreeSet<&str>,
        declared: &[PathParam],
        hits: &mut Vec<RuleHit>,
    ) {
        for param in declared {
            if !param.required {
                hits.push(RuleHit {
                    path: param.path.clone(),
                    message: format!(
                        "Path parameter \"{}\" must have \"required\" property that is set to \"true\"",
                        param.name
                    ),
                });
            }
            if !template.contains(param.name.as_str()) {
                hits.push(RuleHit {
                    path: param.path.clone(),
                    message: format!("Parameter \"{}\" must be used in path \"{key}\"", param.name),
                });
            }
        }
    }
}

impl Rule for PathParamsRule {
    fn code(&self) -> &'static str {
        "path-params"
    }

    fn description(&self) -> &'static str {
        "Path parameters must be defined and valid."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (key, item) in path_items(doc) {
            let names = template_params(key);
            let mut template = BTreeSet::new();
            for name in &names {
                if !template.insert(*name) {
                    hits.push(RuleHit::new(
                        ["paths", key],
                        format!("Path \"{key}\" must not use parameter \"{{{name}}}\" multiple times"),
                    ));
                }
            }

            let item_base = vec!["paths".to_string(), key.to_string()];
            let path_level = declared_path_params(doc, item, &item_base);
            Self::check_declared(key, &template, &path_level, hits);

            for method in HTTP_METHODS {
                let Some(op) = item.get(method).filter(|v| v.is_object()) else {
                    continue;
                };
                let mut op_base = item_base.clone();
                op_base.push(method.to_string());
                let op_level = declared_path_params(doc, op, &op_base);
                Self::check_declared(key, &template, &op_level, hits);

                for name in &template {
                    let defined = path_level
                        .iter()
                        .chain(op_level.iter())
                        .any(|p| p.name == *name);
                    if !defined {
                        hits.push(RuleHit {
                            path: op_base.clone(),
                            message: format!(
                                "Operation must define parameter \"{{{name}}}\" as expected by path \"{key}\""
                            ),
                        });
                    }
                }
            }
        }
    }
}

struct OperationIdPresentRule;

impl Rule for OperationIdPresentRule {
    fn code(&self) -> &'static str {
        "operation-operationId"
    }

    fn description(&self) -> &'static str {
        "Operation must have `operationId`."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for op in operations(doc) {
            if !has_text(op.op, "operationId") {
                hits.push(RuleHit {
                    path: op.location(),
                    message: "Operation must have \"operationId\"".to_string(),
                });
            }
        }
    }
}

struct OperationSuccessResponseRule;

impl Rule for OperationSuccessResponseRule {
    fn code(&self) -> &'static str {
        "operation-success-response"
    }

    fn description(&self) -> &'static str {
        "Operation must have at least one `2xx` or `3xx` response."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for op in operations(doc) {
            let ok = object_at(op.op, "responses").is_some_and(|responses| {
                responses
                    .keys()
                    .any(|code| code.starts_with('2') || code.starts_with('3'))
            });
            if !ok {
                let mut path = op.location();
                if op.op.get("responses").is_some() {
                    path.push("responses".to_string());
                }
                hits.push(RuleHit {
                    path,
                    message: "Operation must have at least one \"2xx\" or \"3xx\" response"
                        .to_string(),
                });
            }
        }
    }
}

struct PathKeysNoTrailingSlashRule;

impl Rule for PathKeysNoTrailingSlashRule {
    fn code(&self) -> &'static str {
        "path-keys-no-trailing-slash"
    }

    fn description(&self) -> &'static str {
        "Path must not end with slash."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (key, _) in path_items(doc) {
            if key.len() > 1 && key.ends_with('/') {
                hits.push(RuleHit::new(["paths", key], "Path must not end with slash"));
            }
        }
    }
}

struct OperationTagsRule;

impl Rule for OperationTagsRule {
    fn code(&self) -> &'static str {
        "operation-tags"
    }

    fn description(&self) -> &'static str {
        "Operation must have non-empty `tags` array."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for op in operations(doc) {
            let tagged = op
                .op
                .get("tags")
                .and_then(Value::as_array)
                .is_some_and(|tags| !tags.is_empty());
            if !tagged {
                hits.push(RuleHit {
                    path: op.location(),
                    message: "Operation must have non-empty \"tags\" array".to_string(),
                });
            }
        }
    }
}
