//! matterlint: front-matter loader and metadata validator for static sites
//!
//! This crate splits Markdown content files into a `+++` (TOML) or `---`
//! (YAML) front-matter block and a body, validates the block against a
//! field schema, and reports every problem it finds per document.

pub mod commands;
pub mod config;
pub mod content;
pub mod helpers;
pub mod report;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// A site rooted at a directory
#[derive(Debug, Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: PathBuf,
    /// Content directory
    pub content_dir: PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let config_path = base_dir.as_ref().join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let content_dir = base_dir.join(&config.content_dir);

        Self {
            config,
            base_dir,
            content_dir,
        }
    }

    /// Load every document under the content directory
    pub fn load(&self) -> Result<content::loader::Corpus> {
        content::loader::ContentLoader::new(self)?.load()
    }

    /// Load and classify every document
    pub fn check(&self) -> Result<report::Report> {
        Ok(report::Report::from_corpus(&self.load()?))
    }
}
