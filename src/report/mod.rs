//! Corpus report - per-document status and a summary

use serde::Serialize;
use std::fmt;

use crate::content::loader::{Corpus, Entry, Resolution};

/// Publish readiness of one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// No violations
    Ready,
    /// Only warnings
    Warnings,
    /// At least one error, or a rejected duplicate
    Excluded,
    /// Could not be read or parsed
    Failed,
    /// Lost to a newer revision of the same page
    Superseded,
}

impl Status {
    pub const ALL: [Status; 5] = [
        Status::Ready,
        Status::Warnings,
        Status::Excluded,
        Status::Failed,
        Status::Superseded,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Status::Ready => "ready",
            Status::Warnings => "warnings",
            Status::Excluded => "excluded",
            Status::Failed => "failed",
            Status::Superseded => "superseded",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportItem {
    pub source: String,
    pub status: Status,
    pub messages: Vec<String>,
}

/// Outcome of checking a corpus
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub items: Vec<ReportItem>,
}

impl Report {
    /// Classify every file in the corpus, sorted by source path
    pub fn from_corpus(corpus: &Corpus) -> Self {
        let mut items: Vec<ReportItem> = corpus.entries.iter().map(entry_item).collect();

        for duplicate in &corpus.duplicates {
            let (status, message) = match &duplicate.resolution {
                Resolution::Superseded { by } => {
                    (Status::Superseded, format!("superseded by `{}`", by))
                }
                Resolution::Rejected { rivals } => (
                    Status::Excluded,
                    format!(
                        "identity `{}` is shared with {}",
                        duplicate.entry.identity,
                        rivals
                            .iter()
                            .map(|r| format!("`{}`", r))
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                ),
            };
            let mut item = entry_item(&duplicate.entry);
            item.status = status;
            item.messages.insert(0, message);
            items.push(item);
        }

        for failure in &corpus.failures {
            items.push(ReportItem {
                source: failure.source.clone(),
                status: Status::Failed,
                messages: vec![failure.error.to_string()],
            });
        }

        items.sort_by(|a, b| a.source.cmp(&b.source));
        Self { items }
    }

    pub fn count(&self, status: Status) -> usize {
        self.items.iter().filter(|i| i.status == status).count()
    }

    /// Whether the check should fail
    ///
    /// Failed and excluded documents always count; warnings only in strict
    /// mode.
    pub fn has_errors(&self, strict: bool) -> bool {
        self.items.iter().any(|i| match i.status {
            Status::Failed | Status::Excluded => true,
            Status::Warnings => strict,
            Status::Ready | Status::Superseded => false,
        })
    }

    /// One-line summary such as `3 ready, 1 failed`
    pub fn summary(&self) -> String {
        let parts: Vec<String> = Status::ALL
            .into_iter()
            .filter_map(|s| match self.count(s) {
                0 => None,
                n => Some(format!("{} {}", n, s)),
            })
            .collect();

        if parts.is_empty() {
            "no documents".to_string()
        } else {
            parts.join(", ")
        }
    }
}

fn entry_item(entry: &Entry) -> ReportItem {
    let violations = entry.document.violations();
    let status = if violations.is_empty() {
        Status::Ready
    } else if entry.document.is_publishable() {
        Status::Warnings
    } else {
        Status::Excluded
    };

    ReportItem {
        source: entry.source.clone(),
        status,
        messages: violations
            .iter()
            .map(|v| format!("{}: {}", v.severity(), v))
            .collect(),
    }
}
