//! # Definition Decoding
//!
//! Decodes the raw `spec.definition` text into a `serde_json::Value`.
//! JSON is attempted first; on failure the text is decoded as YAML and
//! converted into the equivalent JSON value tree. When both attempts fail
//! the error carries the detail of each.

use serde_json::Value;

use specgate_core::ParseError;

/// Decode a definition string as JSON, falling back to YAML.
///
/// # Errors
///
/// Returns [`ParseError`] when the text is neither valid JSON nor valid
/// YAML, or when the YAML cannot be represented as JSON (e.g., NaN).
pub fn parse_definition(definition: &str) -> Result<Value, ParseError> {
    let json_err = match serde_json::from_str::<Value>(definition) {
        Ok(value) => return Ok(value),
        Err(e) => e,
    };

    let yaml_value: serde_yaml::Value = serde_yaml::from_str(definition).map_err(|e| ParseError {
        json: json_err.to_string(),
        yaml: e.to_string(),
    })?;

    yaml_to_json_value(&yaml_value).map_err(|e| ParseError {
        json: json_err.to_string(),
        yaml: format!("YAML-to-JSON conversion failed: {e}"),
    })
}

/// Convert a `serde_yaml::Value` to a `serde_json::Value`.
///
/// YAML has a richer type system than JSON (tags, non-string keys,
/// non-finite floats). Tags are dropped, keys are stringified (so `200:`
/// under `responses` becomes `"200"`), and values with no JSON
/// equivalent are rejected.
pub fn yaml_to_json_value(yaml: &serde_yaml::Value) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::Number(serde_json::Number::from(i)))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::Number(serde_json::Number::from(u)))
            } else if let Some(f) = n.as_f64() {
                serde_json::Number::from_f64(f)
                    .map(Value::Number)
                    .ok_or_else(|| format!("cannot represent float {f} in JSON"))
            } else {
                Err(format!("unsupported YAML number: {n:?}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => {
            let items: Result<Vec<Value>, String> = seq.iter().map(yaml_to_json_value).collect();
            Ok(Value::Array(items?))
        }
        serde_yaml::Value::Mapping(map) => {
            let mut json_map = serde_json::Map::new();
            for (k, v) in map {
                json_map.insert(yaml_key_to_string(k)?, yaml_to_json_value(v)?);
            }
            Ok(Value::Object(json_map))
        }
        serde_yaml::Value::Tagged(tagged) => yaml_to_json_value(&tagged.value),
    }
}

/// Render a YAML mapping key as a JSON object key.
///
/// `~` becomes `"null"`. Sequence and mapping keys become their trimmed
/// YAML text.
fn yaml_key_to_string(key: &serde_yaml::Value) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok("null".to_string()),
        serde_yaml::Value::Tagged(tagged) => yaml_key_to_string(&tagged.value),
        complex => serde_yaml::to_string(complex)
            .map(|text| text.trim().to_string())
            .map_err(|e| format!("cannot render YAML map key: {e}")),
    }
}
