//! Decoding of front-matter blocks into ordered key-value pairs

use indexmap::IndexMap;
use serde_json::Value;

use super::frontmatter::{Delimiter, ParseError};

/// Raw front-matter fields in document order
pub type Fields = IndexMap<String, Value>;

/// Decode a metadata block written in the format implied by its delimiter
///
/// Empty and whitespace-only blocks yield no fields.
pub fn decode(delimiter: Delimiter, block: &str) -> Result<Fields, ParseError> {
    if block.trim().is_empty() {
        return Ok(Fields::new());
    }

    match delimiter {
        Delimiter::Toml => decode_toml(block),
        Delimiter::Yaml => decode_yaml(block),
    }
}

fn invalid(delimiter: Delimiter, message: impl ToString) -> ParseError {
    ParseError::InvalidBlock {
        format: delimiter.format_name(),
        message: message.to_string(),
    }
}

fn decode_toml(block: &str) -> Result<Fields, ParseError> {
    let table: toml::Table = block
        .parse()
        .map_err(|e: toml::de::Error| invalid(Delimiter::Toml, e.message()))?;

    Ok(table
        .into_iter()
        .map(|(key, value)| (key, toml_to_json(value)))
        .collect())
}

/// TOML datetimes become their RFC 3339 text so both header styles carry
/// dates the same way
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::from(i),
        toml::Value::Float(f) => Value::from(f),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

fn decode_yaml(block: &str) -> Result<Fields, ParseError> {
    let value: serde_yaml::Value =
        serde_yaml::from_str(block).map_err(|e| invalid(Delimiter::Yaml, e))?;

    match value {
        // A block holding only comments
        serde_yaml::Value::Null => Ok(Fields::new()),
        serde_yaml::Value::Mapping(mapping) => mapping
            .into_iter()
            .map(|(key, value)| -> Result<(String, Value), ParseError> {
                let key = yaml_key(key)
                    .ok_or_else(|| invalid(Delimiter::Yaml, "keys must be plain scalars"))?;
                Ok((key, yaml_to_json(value)))
            })
            .collect(),
        other => Err(invalid(
            Delimiter::Yaml,
            format!("expected key-value pairs, found {}", yaml_kind(&other)),
        )),
    }
}

fn yaml_key(key: serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn yaml_to_json(value: serde_yaml::Value) -> Value {
    match value {
        serde_yaml::Value::Null => Value::Null,
        serde_yaml::Value::Bool(b) => Value::Bool(b),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::from(i)
            } else if let Some(u) = n.as_u64() {
                Value::from(u)
            } else {
                n.as_f64().map(Value::from).unwrap_or(Value::Null)
            }
        }
        serde_yaml::Value::String(s) => Value::String(s),
        serde_yaml::Value::Sequence(items) => {
            Value::Array(items.into_iter().map(yaml_to_json).collect())
        }
        serde_yaml::Value::Mapping(mapping) => Value::Object(
            mapping
                .into_iter()
                .map(|(k, v)| {
                    let key = yaml_key(k.clone())
                        .unwrap_or_else(|| serde_yaml::to_string(&k).unwrap_or_default());
                    (key.trim_end().to_string(), yaml_to_json(v))
                })
                .collect(),
        ),
        serde_yaml::Value::Tagged(tagged) => yaml_to_json(tagged.value),
    }
}

fn yaml_kind(value: &serde_yaml::Value) -> &'static str {
    match value {
        serde_yaml::Value::Null => "null",
        serde_yaml::Value::Bool(_) => "a boolean",
        serde_yaml::Value::Number(_) => "a number",
        serde_yaml::Value::String(_) => "a string",
        serde_yaml::Value::Sequence(_) => "a list",
        serde_yaml::Value::Mapping(_) => "a mapping",
        serde_yaml::Value::Tagged(_) => "a tagged value",
    }
}
