//! Export publish-ready documents as JSON for a renderer

use anyhow::{Context, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::content::loader::Corpus;
use crate::content::Metadata;
use crate::Site;

/// The `(metadata, body)` pair handed to a renderer
#[derive(Debug, Serialize)]
pub struct ExportedDocument<'a> {
    pub source: &'a str,
    pub identity: &'a str,
    pub metadata: &'a Metadata,
    pub body: &'a str,
}

/// Publishable documents, drafts only when asked for
pub fn collect(corpus: &Corpus, include_drafts: bool) -> Vec<ExportedDocument<'_>> {
    corpus
        .publishable()
        .filter(|e| include_drafts || !e.document.metadata().draft)
        .map(|e| ExportedDocument {
            source: &e.source,
            identity: &e.identity,
            metadata: e.document.metadata(),
            body: e.document.body(),
        })
        .collect()
}

/// Write the export to `output`, or stdout when none is given
pub fn run(site: &Site, output: Option<&Path>, include_drafts: bool) -> Result<()> {
    let corpus = site.load()?;
    let include_drafts = include_drafts || site.config.export_drafts;
    let documents = collect(&corpus, include_drafts);

    let skipped = corpus.len() - documents.len();
    if skipped > 0 {
        tracing::info!("Leaving out {} documents that are not publish-ready", skipped);
    }

    let json = serde_json::to_string_pretty(&documents)?;
    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, json).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Exported {} documents to {:?}", documents.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
