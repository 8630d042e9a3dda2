//! Document model

use super::fields::{self, Fields};
use super::frontmatter::{self, Delimiter, ParseError, Split};
use super::schema::Schema;
use super::validate::{self, Metadata, Violation};

/// One loaded content file
///
/// Built once from raw text and never mutated; edits produce a new
/// document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    raw: String,
    split: Split,
    fields: Fields,
    metadata: Metadata,
    violations: Vec<Violation>,
}

impl Document {
    /// Split, decode and validate raw text
    ///
    /// Only a broken header fails; schema problems are recorded in
    /// [`Document::violations`].
    pub fn parse(raw: impl Into<String>, schema: &Schema) -> Result<Self, ParseError> {
        let raw = raw.into();
        let split = frontmatter::split(&raw)?;

        let fields = match split.delimiter {
            Some(delimiter) => fields::decode(delimiter, &raw[split.block.clone()])?,
            None => Fields::new(),
        };

        let validation = validate::validate(&fields, schema);

        Ok(Self {
            raw,
            split,
            fields,
            metadata: validation.metadata,
            violations: validation.violations,
        })
    }

    /// The full original text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn delimiter(&self) -> Option<Delimiter> {
        self.split.delimiter
    }

    /// Text between the marker lines, empty for headerless documents
    pub fn metadata_block(&self) -> &str {
        &self.raw[self.split.block.clone()]
    }

    /// Everything up to and including the closing marker line
    pub fn header(&self) -> &str {
        &self.raw[..self.split.body.start]
    }

    pub fn body(&self) -> &str {
        &self.raw[self.split.body.clone()]
    }

    /// Decoded key-value pairs in document order
    pub fn fields(&self) -> &Fields {
        &self.fields
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Whether the document may go into publish-ready output
    pub fn is_publishable(&self) -> bool {
        !self.violations.iter().any(Violation::is_fatal)
    }

    /// A copy of this document with the same header and a new body
    pub fn with_body(&self, body: &str) -> Self {
        let mut raw = String::with_capacity(self.split.body.start + body.len());
        raw.push_str(self.header());
        raw.push_str(body);

        let mut split = self.split.clone();
        split.body = split.body.start..raw.len();

        Self {
            raw,
            split,
            fields: self.fields.clone(),
            metadata: self.metadata.clone(),
            violations: self.violations.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABOUT: &str = r#"+++
title = "About Me"
date = 2024-08-16T10:28:54-05:00
draft = false
+++

I write about C++ and Unreal Engine.
"#;

    #[test]
    fn test_parse_document() {
        let doc = Document::parse(ABOUT, &Schema::default()).unwrap();
        assert_eq!(doc.delimiter(), Some(Delimiter::Toml));
        assert_eq!(doc.metadata().title.as_deref(), Some("About Me"));
        assert_eq!(doc.body(), "\nI write about C++ and Unreal Engine.\n");
        assert!(doc.is_publishable());
        assert_eq!(format!("{}{}", doc.header(), doc.body()), ABOUT);
    }

    #[test]
    fn test_raw_reconstruction() {
        let doc = Document::parse(ABOUT, &Schema::default()).unwrap();
        let marker = doc.delimiter().unwrap().marker();
        let rebuilt = format!("{marker}\n{}{marker}\n{}", doc.metadata_block(), doc.body());
        assert_eq!(rebuilt, doc.raw());
    }

    #[test]
    fn test_headerless_document() {
        let text = "Just prose, no header.\n";
        let doc = Document::parse(text, &Schema::default()).unwrap();
        assert_eq!(doc.delimiter(), None);
        assert!(doc.fields().is_empty());
        assert_eq!(doc.metadata_block(), "");
        assert_eq!(doc.body(), text);
        assert_eq!(doc.violations().len(), 2);
        assert!(!doc.is_publishable());
    }

    #[test]
    fn test_unterminated_header_fails() {
        let err = Document::parse("---\ntitle: x\n", &Schema::default()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedHeader { offset: 0, .. }));
    }

    #[test]
    fn test_invalid_block_fails() {
        let err = Document::parse("+++\ntitle = \n+++\n", &Schema::default()).unwrap_err();
        assert!(matches!(err, ParseError::InvalidBlock { .. }));
    }

    #[test]
    fn test_with_body_leaves_original_untouched() {
        let doc = Document::parse(ABOUT, &Schema::default()).unwrap();
        let edited = doc.with_body("New body.\n");
        assert_eq!(edited.body(), "New body.\n");
        assert_eq!(edited.metadata(), doc.metadata());
        assert_eq!(edited.header(), doc.header());
        assert_eq!(doc.raw(), ABOUT);
    }

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_document_is_send_and_sync() {
        assert_send_sync::<Document>();
        assert_send_sync::<Metadata>();
    }

    #[test]
    fn test_empty_header_yields_default_metadata() {
        let doc = Document::parse("+++\n+++\nBody\n", &Schema::default()).unwrap();
        assert_eq!(doc.metadata(), &Metadata::default());
        assert_eq!(doc.body(), "Body\n");
    }
}
