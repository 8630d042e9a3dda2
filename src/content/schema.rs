//! Field schema for front-matter validation

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub const TITLE: &str = "title";
pub const DATE: &str = "date";
pub const DRAFT: &str = "draft";
pub const TAGS: &str = "tags";
pub const COMMENTS: &str = "comments";
pub const FEATURED: &str = "featured";

/// Declared type of a front-matter field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Timestamp,
    Boolean,
    TextList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldKind::Text => "text",
            FieldKind::Timestamp => "a timestamp",
            FieldKind::Boolean => "a boolean",
            FieldKind::TextList => "a list of text",
        })
    }
}

/// One field the schema knows about
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub required: bool,
}

impl FieldSpec {
    pub fn new(name: &str, kind: FieldKind, required: bool) -> Self {
        Self {
            name: name.to_string(),
            kind,
            required,
        }
    }
}

/// The set of recognized fields plus how to read naive timestamps
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    fields: Vec<FieldSpec>,
    default_offset: FixedOffset,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldSpec::new(TITLE, FieldKind::Text, true),
                FieldSpec::new(DATE, FieldKind::Timestamp, true),
                FieldSpec::new(DRAFT, FieldKind::Boolean, false),
                FieldSpec::new(TAGS, FieldKind::TextList, false),
                FieldSpec::new(COMMENTS, FieldKind::Boolean, false),
                FieldSpec::new(FEATURED, FieldKind::Boolean, false),
            ],
            default_offset: Utc.fix(),
        }
    }
}

impl Schema {
    /// Add site-specific fields
    ///
    /// A spec naming an existing field can only make it required; the
    /// built-in kinds and required fields are fixed.
    pub fn with_fields(mut self, extra: impl IntoIterator<Item = FieldSpec>) -> Self {
        for spec in extra {
            match self.fields.iter_mut().find(|f| f.name == spec.name) {
                Some(existing) => {
                    if existing.kind != spec.kind {
                        tracing::warn!(
                            "Ignoring kind `{}` for field `{}`, keeping `{}`",
                            spec.kind,
                            spec.name,
                            existing.kind
                        );
                    }
                    if existing.required && !spec.required {
                        tracing::warn!("Field `{}` is always required", spec.name);
                    }
                    existing.required |= spec.required;
                }
                None => self.fields.push(spec),
            }
        }
        self
    }

    /// Offset applied to timestamps written without one
    pub fn with_default_offset(mut self, offset: FixedOffset) -> Self {
        self.default_offset = offset;
        self
    }

    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn required(&self) -> impl Iterator<Item = &FieldSpec> {
        self.fields.iter().filter(|f| f.required)
    }

    pub fn default_offset(&self) -> FixedOffset {
        self.default_offset
    }
}
