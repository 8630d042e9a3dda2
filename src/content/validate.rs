//! Front-matter validation against a [`Schema`]

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use super::fields::Fields;
use super::schema::{self, FieldKind, Schema};
use crate::helpers::parse_timestamp;

/// How much a violation matters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
        })
    }
}

/// A problem found in a document's front-matter
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Violation {
    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` should be {expected}, found `{raw}`")]
    InvalidFieldType {
        field: String,
        expected: FieldKind,
        raw: String,
    },

    #[error("unknown field `{field}`")]
    UnknownField { field: String },
}

impl Violation {
    pub fn severity(&self) -> Severity {
        match self {
            Violation::MissingField { .. } | Violation::InvalidFieldType { .. } => Severity::Error,
            Violation::UnknownField { .. } => Severity::Warning,
        }
    }

    /// Errors keep a document out of publish-ready output
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Error
    }

    /// The field this violation is about
    pub fn field(&self) -> &str {
        match self {
            Violation::MissingField { field }
            | Violation::InvalidFieldType { field, .. }
            | Violation::UnknownField { field } => field,
        }
    }
}

/// Typed front-matter
///
/// Required fields are `None` when missing or invalid; everything that did
/// validate is populated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub date: Option<DateTime<FixedOffset>>,
    pub draft: bool,
    pub tags: Vec<String>,
    pub comments: bool,
    pub featured: bool,

    /// Site-specific schema fields, normalized
    pub extra: IndexMap<String, Value>,

    /// Fields the schema does not know, kept as written
    pub passthrough: IndexMap<String, Value>,
}

impl Default for Metadata {
    fn default() -> Self {
        Self {
            title: None,
            date: None,
            draft: false,
            tags: Vec::new(),
            comments: false,
            featured: false,
            extra: IndexMap::new(),
            passthrough: IndexMap::new(),
        }
    }
}

impl Metadata {
    fn assign(&mut self, name: &str, value: Coerced) {
        match (name, value) {
            (schema::TITLE, Coerced::Text(s)) => self.title = Some(s),
            (schema::DATE, Coerced::Timestamp(dt)) => self.date = Some(dt),
            (schema::DRAFT, Coerced::Boolean(b)) => self.draft = b,
            (schema::TAGS, Coerced::TextList(tags)) => self.tags = tags,
            (schema::COMMENTS, Coerced::Boolean(b)) => self.comments = b,
            (schema::FEATURED, Coerced::Boolean(b)) => self.featured = b,
            (name, other) => {
                self.extra.insert(name.to_string(), other.into_value());
            }
        }
    }
}

/// Result of validating one document's fields
#[derive(Debug, Clone, PartialEq)]
pub struct Validation {
    pub metadata: Metadata,
    pub violations: Vec<Violation>,
}

impl Validation {
    /// No error-level violations
    pub fn is_valid(&self) -> bool {
        !self.violations.iter().any(Violation::is_fatal)
    }

    pub fn errors(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| v.is_fatal())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(|v| !v.is_fatal())
    }
}

/// Validate decoded fields against a schema
///
/// Every field is checked; violations are collected rather than stopping at
/// the first one. Present fields are reported in document order, followed
/// by missing required fields in schema order. A null value counts as
/// absent.
pub fn validate(fields: &Fields, schema: &Schema) -> Validation {
    let mut metadata = Metadata::default();
    let mut violations = Vec::new();

    for (name, value) in fields {
        if value.is_null() {
            continue;
        }

        let Some(spec) = schema.get(name) else {
            violations.push(Violation::UnknownField {
                field: name.clone(),
            });
            metadata.passthrough.insert(name.clone(), value.clone());
            continue;
        };

        match coerce(value, spec.kind, schema.default_offset()) {
            Some(coerced) => metadata.assign(name, coerced),
            None => violations.push(Violation::InvalidFieldType {
                field: name.clone(),
                expected: spec.kind,
                raw: render_raw(value),
            }),
        }
    }

    for spec in schema.required() {
        let present = fields.get(&spec.name).is_some_and(|v| !v.is_null());
        if !present {
            violations.push(Violation::MissingField {
                field: spec.name.clone(),
            });
        }
    }

    Validation {
        metadata,
        violations,
    }
}

/// A field value converted to its declared kind
enum Coerced {
    Text(String),
    Timestamp(DateTime<FixedOffset>),
    Boolean(bool),
    TextList(Vec<String>),
}

impl Coerced {
    fn into_value(self) -> Value {
        match self {
            Coerced::Text(s) => Value::String(s),
            Coerced::Timestamp(dt) => Value::String(dt.to_rfc3339()),
            Coerced::Boolean(b) => Value::Bool(b),
            Coerced::TextList(items) => Value::Array(items.into_iter().map(Value::String).collect()),
        }
    }
}

fn coerce(value: &Value, kind: FieldKind, default_offset: FixedOffset) -> Option<Coerced> {
    match kind {
        FieldKind::Text => match value {
            Value::String(s) => Some(Coerced::Text(s.clone())),
            Value::Number(n) => Some(Coerced::Text(n.to_string())),
            Value::Bool(b) => Some(Coerced::Text(b.to_string())),
            _ => None,
        },
        FieldKind::Timestamp => value
            .as_str()
            .and_then(|s| parse_timestamp(s, default_offset))
            .map(Coerced::Timestamp),
        FieldKind::Boolean => match value {
            Value::Bool(b) => Some(Coerced::Boolean(*b)),
            Value::String(s) if s.eq_ignore_ascii_case("true") => Some(Coerced::Boolean(true)),
            Value::String(s) if s.eq_ignore_ascii_case("false") => Some(Coerced::Boolean(false)),
            _ => None,
        },
        // A lone string is a one-element list
        FieldKind::TextList => match value {
            Value::String(s) => Some(Coerced::TextList(vec![s.clone()])),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .map(Coerced::TextList),
            _ => None,
        },
    }
}

/// Offending value as the author would recognize it
fn render_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
