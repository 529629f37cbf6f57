//! # AsyncAPI Rules
//!
//! Covers AsyncAPI 2.x documents. Operations live under
//! `channels.<name>.publish` and `channels.<name>.subscribe`.

use std::collections::{BTreeSet, HashMap};

use serde_json::Value;

use specgate_core::{RulesetError, Severity};

use super::common::{ExternalRefRule, InfoFieldRule, InvalidRefRule, SchemaRule};
use super::{has_text, object_at, resolve_local, template_params, Rule, RuleHit};
use crate::schemas::{SchemaRegistry, ASYNCAPI_2_SCHEMA};

const OPERATION_KINDS: [&str; 2] = ["publish", "subscribe"];

/// Whether the document declares AsyncAPI 2.x.
pub fn is_asyncapi2(doc: &Value) -> bool {
    doc.get("asyncapi")
        .and_then(Value::as_str)
        .is_some_and(|v| v.starts_with("2."))
}

/// Build the AsyncAPI rule list in evaluation order.
pub(crate) fn rules(registry: &SchemaRegistry) -> Result<Vec<Box<dyn Rule>>, RulesetError> {
    Ok(vec![
        Box::new(AsyncApiDocumentRule),
        Box::new(SchemaRule::new(
            "asyncapi-schema",
            "AsyncAPI 2.x document must conform to the structural schema.",
            registry.build_validator(ASYNCAPI_2_SCHEMA)?,
            is_asyncapi2,
        )),
        Box::new(OperationIdUniquenessRule),
        Box::new(ChannelParametersRule),
        Box::new(ChannelNoQueryNorFragmentRule),
        Box::new(InvalidRefRule),
        Box::new(ExternalRefRule),
        Box::new(InfoFieldRule::requiring_contact("asyncapi-info-contact")),
        Box::new(InfoFieldRule::requiring_description("asyncapi-info-description")),
        Box::new(ChannelNoTrailingSlashRule),
        Box::new(OperationIdPresentRule),
    ])
}

/// Channels in document order, following local `$ref`s.
fn channels(doc: &Value) -> Vec<(&str, &Value)> {
    let Some(channels) = object_at(doc, "channels") else {
        return Vec::new();
    };
    channels
        .iter()
        .filter_map(|(name, item)| Some((name.as_str(), resolve_local(doc, item)?)))
        .filter(|(_, item)| item.is_object())
        .collect()
}

/// `(channel, kind, operation)` for each publish/subscribe operation.
fn operations(doc: &Value) -> Vec<(&str, &'static str, &Value)> {
    let mut ops = Vec::new();
    for (name, item) in channels(doc) {
        for kind in OPERATION_KINDS {
            if let Some(op) = item.get(kind).filter(|v| v.is_object()) {
                ops.push((name, kind, op));
            }
        }
    }
    ops
}

struct AsyncApiDocumentRule;

impl Rule for AsyncApiDocumentRule {
    fn code(&self) -> &'static str {
        "asyncapi-document"
    }

    fn description(&self) -> &'static str {
        "Document must be an object declaring `asyncapi: 2.x`."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        if !doc.is_object() {
            hits.push(RuleHit::new(
                Vec::<String>::new(),
                "AsyncAPI document must be an object",
            ));
            return;
        }
        if is_asyncapi2(doc) {
            return;
        }
        match doc.get("asyncapi") {
            Some(version) => hits.push(RuleHit::new(
                ["asyncapi"],
                format!("Unsupported AsyncAPI version {version}; expected 2.x"),
            )),
            None => hits.push(RuleHit::new(
                Vec::<String>::new(),
                "Document must declare `asyncapi: 2.x`",
            )),
        }
    }
}

struct OperationIdUniquenessRule;

impl Rule for OperationIdUniquenessRule {
    fn code(&self) -> &'static str {
        "asyncapi-operation-operationId-uniqueness"
    }

    fn description(&self) -> &'static str {
        "`operationId` must be unique across all the operations."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        let mut seen: HashMap<&str, String> = HashMap::new();
        for (channel, kind, op) in operations(doc) {
            let Some(id) = op.get("operationId").and_then(Value::as_str) else {
                continue;
            };
            match seen.get(id) {
                Some(first) => hits.push(RuleHit::new(
                    ["channels", channel, kind, "operationId"],
                    format!("\"operationId\" '{id}' must be unique; already used by {first}"),
                )),
                None => {
                    seen.insert(id, format!("{kind} {channel}"));
                }
            }
        }
    }
}

struct ChannelParametersRule;

impl Rule for ChannelParametersRule {
    fn code(&self) -> &'static str {
        "asyncapi-channel-parameters"
    }

    fn description(&self) -> &'static str {
        "All channel parameters should be defined in the `parameters` object of the channel."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (name, item) in channels(doc) {
            let template: BTreeSet<&str> = template_params(name).into_iter().collect();
            let declared: BTreeSet<&str> = object_at(item, "parameters")
                .map(|params| params.keys().map(String::as_str).collect())
                .unwrap_or_default();

            let missing: Vec<&str> = template.difference(&declared).copied().collect();
            if !missing.is_empty() {
                hits.push(RuleHit::new(
                    ["channels", name],
                    format!(
                        "Not all channel's parameters are described with \"parameters\" object. Missed: {}",
                        missing.join(", ")
                    ),
                ));
            }
            for extra in declared.difference(&template) {
                hits.push(RuleHit::new(
                    ["channels", name, "parameters", extra],
                    format!("Channel's \"parameters\" object has redundant defined \"{extra}\" parameter"),
                ));
            }
        }
    }
}

struct ChannelNoQueryNorFragmentRule;

impl Rule for ChannelNoQueryNorFragmentRule {
    fn code(&self) -> &'static str {
        "asyncapi-channel-no-query-nor-fragment"
    }

    fn description(&self) -> &'static str {
        "Channel address should not include query (\"?\") or fragment (\"#\") delimiter."
    }

    fn default_severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (name, _) in channels(doc) {
            if name.contains('?') || name.contains('#') {
                hits.push(RuleHit::new(
                    ["channels", name],
                    "Channel address must not include query (\"?\") or fragment (\"#\") delimiter",
                ));
            }
        }
    }
}

struct ChannelNoTrailingSlashRule;

impl Rule for ChannelNoTrailingSlashRule {
    fn code(&self) -> &'static str {
        "asyncapi-channel-no-trailing-slash"
    }

    fn description(&self) -> &'static str {
        "Channel address should not end with slash."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (name, _) in channels(doc) {
            if name.len() > 1 && name.ends_with('/') {
                hits.push(RuleHit::new(["channels", name], "Channel address must not end with slash"));
            }
        }
    }
}

struct OperationIdPresentRule;

impl Rule for OperationIdPresentRule {
    fn code(&self) -> &'static str {
        "asyncapi-operation-operationId"
    }

    fn description(&self) -> &'static str {
        "Operation should have an `operationId`."
    }

    fn default_severity(&self) -> Severity {
        Severity::Warn
    }

    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>) {
        for (channel, kind, op) in operations(doc) {
            if !has_text(op, "operationId") {
                hits.push(RuleHit::new(
                    ["channels", channel, kind],
                    "Operation must have \"operationId\"",
                ));
            }
        }
    }
}
