//! Site configuration (_config.yml)

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::content::{FieldSpec, Schema};
use crate::helpers::parse_offset;

/// How to pick between documents that map to the same identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Latest modification time wins, ties go to the greatest path
    Newest,
    /// Every colliding document is excluded
    Reject,
}

impl Default for DuplicatePolicy {
    fn default() -> Self {
        DuplicatePolicy::Newest
    }
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub content_dir: String,
    pub extensions: Vec<String>,
    /// Glob patterns, relative to `content_dir`, that are never loaded
    #[serde(default)]
    pub skip: Vec<String>,

    // Loading
    pub duplicates: DuplicatePolicy,
    /// Offset for timestamps written without one, e.g. `-05:00`
    pub default_offset: Option<String>,
    /// Extra front-matter fields this site uses
    #[serde(default)]
    pub fields: Vec<FieldSpec>,

    // Checking
    pub strict: bool,

    // Export
    pub export_drafts: bool,

    // Writing
    pub new_post_dir: String,
    pub new_post_name: String,

    // Date / Time format
    pub date_format: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: "content".to_string(),
            extensions: vec!["md".to_string(), "markdown".to_string()],
            skip: Vec::new(),

            duplicates: DuplicatePolicy::default(),
            default_offset: None,
            fields: Vec::new(),

            strict: false,

            export_drafts: false,

            new_post_dir: "posts".to_string(),
            new_post_name: ":title.md".to_string(),

            date_format: "YYYY-MM-DD".to_string(),

            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse {:?}", path))?;
        if !config.extra.is_empty() {
            let mut keys: Vec<_> = config.extra.keys().collect();
            keys.sort();
            tracing::debug!("Ignoring unrecognized config keys: {:?}", keys);
        }
        Ok(config)
    }

    /// Build the validation schema for this site
    pub fn schema(&self) -> Result<Schema> {
        let mut schema = Schema::default().with_fields(self.fields.iter().cloned());

        if let Some(offset) = &self.default_offset {
            let offset =
                parse_offset(offset).ok_or_else(|| anyhow!("Invalid default_offset: {}", offset))?;
            schema = schema.with_default_offset(offset);
        }

        Ok(schema)
    }

    /// Whether a file extension marks a content file
    pub fn is_content_extension(&self, ext: &str) -> bool {
        self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
    }
}
