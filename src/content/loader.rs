//! Content loader - loads every document under the content directory

use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use thiserror::Error;
use walkdir::WalkDir;

use super::{Document, ParseError, Schema};
use crate::config::DuplicatePolicy;
use crate::Site;

/// Why a single file could not be loaded
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read file: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// A loaded document and where it came from
#[derive(Debug, Clone)]
pub struct Entry {
    /// Source path relative to the content directory
    pub source: String,
    /// Full source file path
    pub full_source: PathBuf,
    /// Path-derived key shared by revisions of the same page
    pub identity: String,
    pub modified: Option<SystemTime>,
    pub document: Document,
}

/// A file that could not be loaded
#[derive(Debug)]
pub struct Failure {
    pub source: String,
    pub error: LoadError,
}

/// How a duplicate lost out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Another revision with the same identity won
    Superseded { by: String },
    /// All revisions were excluded
    Rejected { rivals: Vec<String> },
}

/// An entry that shares its identity with another one
#[derive(Debug, Clone)]
pub struct Duplicate {
    pub entry: Entry,
    pub resolution: Resolution,
}

/// Everything found under the content directory
#[derive(Debug, Default)]
pub struct Corpus {
    /// Entries with a unique identity, newest first
    pub entries: Vec<Entry>,
    pub duplicates: Vec<Duplicate>,
    pub failures: Vec<Failure>,
}

impl Corpus {
    /// Entries with no error-level violations
    pub fn publishable(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.document.is_publishable())
    }

    pub fn drafts(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|e| e.document.metadata().draft)
    }

    /// Number of files seen, including ones that failed
    pub fn len(&self) -> usize {
        self.entries.len() + self.duplicates.len() + self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Loads content from the content directory
pub struct ContentLoader<'a> {
    site: &'a Site,
    schema: Schema,
    skip: Vec<glob::Pattern>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader
    pub fn new(site: &'a Site) -> Result<Self> {
        let schema = site.config.schema()?;
        let skip = site
            .config
            .skip
            .iter()
            .map(|p| glob::Pattern::new(p).with_context(|| format!("Invalid skip pattern: {}", p)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { site, schema, skip })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Load all documents
    ///
    /// A file that fails to load is recorded and logged; it never stops the
    /// rest of the corpus from loading.
    pub fn load(&self) -> Result<Corpus> {
        let content_dir = &self.site.content_dir;
        if !content_dir.exists() {
            tracing::warn!("Content directory {:?} does not exist", content_dir);
            return Ok(Corpus::default());
        }

        let mut loaded = Vec::new();
        let mut failures = Vec::new();

        for entry in WalkDir::new(content_dir)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
        {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let source = e
                        .path()
                        .map(|p| self.relative_source(p))
                        .unwrap_or_else(|| content_dir.to_string_lossy().to_string());
                    let error = LoadError::Io(e.into());
                    tracing::warn!("Failed to read {}: {}", source, error);
                    failures.push(Failure { source, error });
                    continue;
                }
            };

            let path = entry.path();
            if !path.is_file() || !self.is_content_file(path) {
                continue;
            }

            let source = self.relative_source(path);
            if self.skip.iter().any(|p| p.matches(&source)) {
                tracing::debug!("Skipping {}", source);
                continue;
            }

            match self.load_entry(path, source.clone()) {
                Ok(entry) => loaded.push(entry),
                Err(error) => {
                    tracing::warn!("Failed to load {}: {}", source, error);
                    failures.push(Failure { source, error });
                }
            }
        }

        let (mut entries, duplicates) = resolve_duplicates(loaded, self.site.config.duplicates);

        // Newest first, undated last
        entries.sort_by(|a, b| {
            let da = a.document.metadata().date;
            let db = b.document.metadata().date;
            db.cmp(&da).then_with(|| a.source.cmp(&b.source))
        });

        tracing::debug!(
            "Loaded {} documents ({} duplicates, {} failures)",
            entries.len(),
            duplicates.len(),
            failures.len()
        );

        Ok(Corpus {
            entries,
            duplicates,
            failures,
        })
    }

    /// Load a single document from a file
    pub fn load_file(&self, path: &Path) -> Result<Entry, LoadError> {
        self.load_entry(path, self.relative_source(path))
    }

    fn load_entry(&self, path: &Path, source: String) -> Result<Entry, LoadError> {
        let raw = fs::read_to_string(path)?;
        let modified = fs::metadata(path)?.modified().ok();
        let document = Document::parse(raw, &self.schema)?;

        for violation in document.violations() {
            tracing::debug!("{}: {}", source, violation);
        }

        Ok(Entry {
            identity: identity(&source),
            source,
            full_source: path.to_path_buf(),
            modified,
            document,
        })
    }

    fn is_content_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| self.site.config.is_content_extension(e))
            .unwrap_or(false)
    }

    /// Source path relative to the content dir, with `/` separators
    fn relative_source(&self, path: &Path) -> String {
        path.strip_prefix(&self.site.content_dir)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}

/// Identity of a source path
///
/// The extension is dropped and `index` / `_index` files stand for their
/// directory, so `about.md` and `about/index.md` are the same page.
pub fn identity(source: &str) -> String {
    let without_ext = match source.rsplit_once('.') {
        Some((stem, ext)) if !ext.contains('/') => stem,
        _ => source,
    };

    let path = match without_ext.rsplit_once('/') {
        Some((parent, "index" | "_index")) => parent,
        None if without_ext == "index" || without_ext == "_index" => "",
        _ => without_ext,
    };

    format!("/{}", path.trim_matches('/'))
}

/// Keep one entry per identity according to the policy
fn resolve_duplicates(loaded: Vec<Entry>, policy: DuplicatePolicy) -> (Vec<Entry>, Vec<Duplicate>) {
    let mut groups: IndexMap<String, Vec<Entry>> = IndexMap::new();
    for entry in loaded {
        groups.entry(entry.identity.clone()).or_default().push(entry);
    }

    let mut entries = Vec::new();
    let mut duplicates = Vec::new();

    for (identity, mut group) in groups {
        if group.len() == 1 {
            entries.extend(group);
            continue;
        }

        let sources: Vec<String> = group.iter().map(|e| e.source.clone()).collect();
        tracing::warn!("Duplicate identity {}: {}", identity, sources.join(", "));

        match policy {
            DuplicatePolicy::Newest => {
                group.sort_by(|a, b| {
                    a.modified
                        .cmp(&b.modified)
                        .then_with(|| a.source.cmp(&b.source))
                });
                let Some(winner) = group.pop() else {
                    continue;
                };
                for entry in group {
                    duplicates.push(Duplicate {
                        entry,
                        resolution: Resolution::Superseded {
                            by: winner.source.clone(),
                        },
                    });
                }
                entries.push(winner);
            }
            DuplicatePolicy::Reject => {
                for entry in group {
                    let rivals = sources
                        .iter()
                        .filter(|s| **s != entry.source)
                        .cloned()
                        .collect();
                    duplicates.push(Duplicate {
                        entry,
                        resolution: Resolution::Rejected { rivals },
                    });
                }
            }
        }
    }

    (entries, duplicates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use std::time::Duration;

    const POST: &str = "+++\ntitle = \"Move semantics\"\ndate = 2024-08-16T10:28:54-05:00\ntags = [\"cpp\"]\n+++\n\nBody.\n";

    fn site_with(files: &[(&str, &str)], config: SiteConfig) -> (tempfile::TempDir, Site) {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join(&config.content_dir);
        for (name, text) in files {
            let path = content.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, text).unwrap();
        }
        let site = Site::with_config(dir.path(), config);
        (dir, site)
    }

    #[test]
    fn test_identity() {
        assert_eq!(identity("about.md"), "/about");
        assert_eq!(identity("about/index.md"), "/about");
        assert_eq!(identity("about/_index.md"), "/about");
        assert_eq!(identity("posts/2024/move.markdown"), "/posts/2024/move");
        assert_eq!(identity("index.md"), "/");
        assert_eq!(identity("_index.md"), "/");
        assert_eq!(identity("v1.2/notes"), "/v1.2/notes");
    }

    #[test]
    fn test_load_corpus() {
        let (_dir, site) = site_with(
            &[
                ("posts/move.md", POST),
                ("posts/broken.md", "---\ntitle: never closed\n"),
                ("posts/untitled.md", "+++\ndate = 2024-01-01\n+++\n"),
                ("notes.txt", "not content"),
            ],
            SiteConfig::default(),
        );

        let loader = ContentLoader::new(&site).unwrap();
        let corpus = loader.load().unwrap();

        assert_eq!(corpus.entries.len(), 2);
        assert_eq!(corpus.failures.len(), 1);
        assert_eq!(corpus.failures[0].source, "posts/broken.md");
        assert!(matches!(
            corpus.failures[0].error,
            LoadError::Parse(ParseError::MalformedHeader { .. })
        ));

        // Newest first
        assert_eq!(corpus.entries[0].source, "posts/move.md");
        let publishable: Vec<_> = corpus.publishable().map(|e| e.source.as_str()).collect();
        assert_eq!(publishable, vec!["posts/move.md"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_a_failure() {
        let (dir, site) = site_with(&[("ok.md", POST)], SiteConfig::default());
        let content = dir.path().join("content");
        std::os::unix::fs::symlink(content.join("missing.md"), content.join("about.md")).unwrap();

        let corpus = ContentLoader::new(&site).unwrap().load().unwrap();
        assert_eq!(corpus.entries.len(), 1);
        assert_eq!(corpus.failures.len(), 1);
        assert_eq!(corpus.failures[0].source, "about.md");
        assert!(matches!(corpus.failures[0].error, LoadError::Io(_)));
        assert_eq!(corpus.len(), 2);
    }

    #[test]
    fn test_missing_content_dir() {
        let dir = tempfile::tempdir().unwrap();
        let site = Site::with_config(dir.path(), SiteConfig::default());
        let corpus = ContentLoader::new(&site).unwrap().load().unwrap();
        assert!(corpus.is_empty());
    }

    #[test]
    fn test_skip_patterns() {
        let config = SiteConfig {
            skip: vec!["archive/**".to_string()],
            ..Default::default()
        };
        let (_dir, site) = site_with(&[("archive/old.md", POST), ("post.md", POST)], config);
        let corpus = ContentLoader::new(&site).unwrap().load().unwrap();
        let sources: Vec<_> = corpus.entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(sources, vec!["post.md"]);
    }

    #[test]
    fn test_invalid_skip_pattern() {
        let config = SiteConfig {
            skip: vec!["[".to_string()],
            ..Default::default()
        };
        let (_dir, site) = site_with(&[], config);
        assert!(ContentLoader::new(&site).is_err());
    }

    #[test]
    fn test_drafts() {
        let draft = "---\ntitle: WIP\ndate: 2024-02-01\ndraft: true\n---\n";
        let (_dir, site) = site_with(&[("a.md", POST), ("b.md", draft)], SiteConfig::default());
        let corpus = ContentLoader::new(&site).unwrap().load().unwrap();
        let drafts: Vec<_> = corpus.drafts().map(|e| e.source.as_str()).collect();
        assert_eq!(drafts, vec!["b.md"]);
    }

    fn entry(source: &str, secs: u64) -> Entry {
        Entry {
            source: source.to_string(),
            full_source: PathBuf::from(source),
            identity: identity(source),
            modified: Some(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)),
            document: Document::parse(POST, &Schema::default()).unwrap(),
        }
    }

    #[test]
    fn test_duplicates_newest_wins() {
        let (entries, duplicates) = resolve_duplicates(
            vec![
                entry("about.md", 200),
                entry("about/index.md", 100),
                entry("posts/x.md", 50),
            ],
            DuplicatePolicy::Newest,
        );
        let kept: Vec<_> = entries.iter().map(|e| e.source.as_str()).collect();
        assert_eq!(kept, vec!["about.md", "posts/x.md"]);
        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].entry.source, "about/index.md");
        assert_eq!(
            duplicates[0].resolution,
            Resolution::Superseded {
                by: "about.md".to_string()
            }
        );
    }

    #[test]
    fn test_duplicates_tie_breaks_on_path() {
        let (entries, _) = resolve_duplicates(
            vec![entry("about/index.md", 100), entry("about.md", 100)],
            DuplicatePolicy::Newest,
        );
        assert_eq!(entries[0].source, "about/index.md");
    }

    #[test]
    fn test_duplicates_rejected() {
        let (entries, duplicates) = resolve_duplicates(
            vec![entry("about.md", 200), entry("about/_index.md", 100)],
            DuplicatePolicy::Reject,
        );
        assert!(entries.is_empty());
        assert_eq!(duplicates.len(), 2);
        assert_eq!(
            duplicates[0].resolution,
            Resolution::Rejected {
                rivals: vec!["about/_index.md".to_string()]
            }
        );
    }
}
