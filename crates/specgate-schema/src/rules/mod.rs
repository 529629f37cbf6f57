//! # Lint Rules
//!
//! A rule inspects a decoded document and reports hits: a location path
//! plus a message. Rules know nothing about severity overrides; the
//! owning [`Ruleset`](crate::ruleset::Ruleset) stamps the effective
//! severity and the rule code onto each hit.
//!
//! Rules are `Send + Sync` and hold no mutable state, so one ruleset is
//! shared by every concurrent validation.

pub mod asyncapi;
pub mod common;
pub mod openapi;

use serde_json::{Map, Value};

use specgate_core::Severity;

/// A single rule violation before severity is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
    pub path: Vec<String>,
    pub message: String,
}

impl RuleHit {
    pub fn new<I, S>(path: I, message: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            path: path.into_iter().map(Into::into).collect(),
            message: message.into(),
        }
    }
}

/// A lint rule.
pub trait Rule: Send + Sync {
    /// Stable rule code used in findings and severity overrides.
    fn code(&self) -> &'static str;

    /// One-line description for rule listings.
    fn description(&self) -> &'static str;

    /// Severity applied unless overridden.
    fn default_severity(&self) -> Severity;

    /// Inspect `doc` and append any hits.
    fn check(&self, doc: &Value, hits: &mut Vec<RuleHit>);
}

// ─── Document helpers ────────────────────────────────────────────────

/// HTTP methods that carry operations in an OpenAPI path item.
pub(crate) const HTTP_METHODS: [&str; 8] =
    ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Follow local `$ref`s (`#/...`) until a non-reference value is reached.
///
/// Returns `None` for an unresolvable or external reference, or a cycle
/// longer than the hop limit.
pub(crate) fn resolve_local<'a>(doc: &'a Value, value: &'a Value) -> Option<&'a Value> {
    const MAX_HOPS: usize = 16;
    let mut current = value;
    for _ in 0..MAX_HOPS {
        match current.get("$ref").and_then(Value::as_str) {
            Some(reference) => current = lookup_local_ref(doc, reference)?,
            None => return Some(current),
        }
    }
    None
}

/// Resolve a single local reference such as `#/components/schemas/User`.
pub(crate) fn lookup_local_ref<'a>(doc: &'a Value, reference: &str) -> Option<&'a Value> {
    let fragment = reference.strip_prefix('#')?;
    if fragment.is_empty() {
        return Some(doc);
    }
    doc.pointer(&percent_decode(fragment))
}

/// Decode `%XX` escapes in a URI fragment. Invalid escapes are kept as-is.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Every string-valued `$ref` in the document, with the path of the
/// object that holds it.
pub(crate) fn collect_refs(doc: &Value) -> Vec<(Vec<String>, String)> {
    fn walk(value: &Value, path: &mut Vec<String>, out: &mut Vec<(Vec<String>, String)>) {
        match value {
            Value::Object(map) => {
                if let Some(Value::String(r)) = map.get("$ref") {
                    out.push((path.clone(), r.clone()));
                }
                for (k, v) in map {
                    path.push(k.clone());
                    walk(v, path, out);
                    path.pop();
                }
            }
            Value::Array(items) => {
                for (i, v) in items.iter().enumerate() {
                    path.push(i.to_string());
                    walk(v, path, out);
                    path.pop();
                }
            }
            _ => {}
        }
    }

    let mut out = Vec::new();
    walk(doc, &mut Vec::new(), &mut out);
    out
}

/// Names inside `{...}` in a path or channel template, in order.
pub(crate) fn template_params(template: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                names.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    names
}

/// The object at `key` in `value`, if present and an object.
pub(crate) fn object_at<'a>(value: &'a Value, key: &str) -> Option<&'a Map<String, Value>> {
    value.get(key).and_then(Value::as_object)
}

/// Whether `value[key]` is a non-empty string.
pub(crate) fn has_text(value: &Value, key: &str) -> bool {
    value
        .get(key)
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty())
}
