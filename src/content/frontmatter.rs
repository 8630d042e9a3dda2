//! Front-matter splitting
//!
//! A document may open with a metadata block fenced by `+++` (TOML) or
//! `---` (YAML) lines. Splitting only locates the block; decoding happens
//! in [`super::fields`].

use serde::{Deserialize, Serialize};
use std::ops::Range;
use thiserror::Error;

/// Errors that make a single document unloadable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unterminated `{marker}` front-matter opened at byte {offset}")]
    MalformedHeader { marker: &'static str, offset: usize },

    #[error("invalid {format} front-matter: {message}")]
    InvalidBlock {
        format: &'static str,
        message: String,
    },
}

/// Marker line that opens and closes a front-matter block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Delimiter {
    /// `+++` fences, TOML content
    Toml,
    /// `---` fences, YAML content
    Yaml,
}

impl Delimiter {
    pub const ALL: [Delimiter; 2] = [Delimiter::Toml, Delimiter::Yaml];

    /// The marker text as it appears on its own line
    pub fn marker(self) -> &'static str {
        match self {
            Delimiter::Toml => "+++",
            Delimiter::Yaml => "---",
        }
    }

    /// Name of the block format, used in error messages
    pub fn format_name(self) -> &'static str {
        match self {
            Delimiter::Toml => "TOML",
            Delimiter::Yaml => "YAML",
        }
    }

    /// Recognize a marker line. Trailing whitespace (including `\r`) is ignored.
    fn from_line(line: &str) -> Option<Self> {
        let line = line.trim_end();
        Self::ALL.into_iter().find(|d| d.marker() == line)
    }
}

/// Location of the header pieces inside the source text
///
/// All ranges are byte ranges into the text passed to [`split`], so
/// `text[..opening.start] + text[opening] + text[block] + text[closing] + text[body]`
/// is the original text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub delimiter: Option<Delimiter>,
    /// Opening marker line including its line terminator
    pub opening: Range<usize>,
    /// Text strictly between the two marker lines
    pub block: Range<usize>,
    /// Closing marker line including its line terminator (if any)
    pub closing: Range<usize>,
    pub body: Range<usize>,
}

impl Split {
    fn headerless(text: &str) -> Self {
        Self {
            delimiter: None,
            opening: 0..0,
            block: 0..0,
            closing: 0..0,
            body: 0..text.len(),
        }
    }

    /// Whether a front-matter block was found
    pub fn has_header(&self) -> bool {
        self.delimiter.is_some()
    }
}

/// Split raw text into header and body
///
/// The opening marker has to be the first non-whitespace content of the
/// text (a leading byte order mark is skipped too) and sit alone on its
/// line; otherwise the whole text is body. The closing marker must match
/// the opening one.
pub fn split(text: &str) -> Result<Split, ParseError> {
    let rest = text.trim_start_matches(|c: char| c == '\u{feff}' || c.is_whitespace());
    let start = text.len() - rest.len();
    let (first_line, block_start) = line_at(text, start);

    let Some(delimiter) = Delimiter::from_line(first_line) else {
        return Ok(Split::headerless(text));
    };

    let mut pos = block_start;
    while pos < text.len() {
        let (line, next) = line_at(text, pos);
        if Delimiter::from_line(line) == Some(delimiter) {
            return Ok(Split {
                delimiter: Some(delimiter),
                opening: start..block_start,
                block: block_start..pos,
                closing: pos..next,
                body: next..text.len(),
            });
        }
        pos = next;
    }

    Err(ParseError::MalformedHeader {
        marker: delimiter.marker(),
        offset: start,
    })
}

/// The line starting at `start` without its `\n`, and the offset just past it
fn line_at(text: &str, start: usize) -> (&str, usize) {
    match text[start..].find('\n') {
        Some(i) => (&text[start..start + i], start + i + 1),
        None => (&text[start..], text.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rebuild(text: &str, s: &Split) -> String {
        format!(
            "{}{}{}{}{}",
            &text[..s.opening.start],
            &text[s.opening.clone()],
            &text[s.block.clone()],
            &text[s.closing.clone()],
            &text[s.body.clone()]
        )
    }

    #[test]
    fn test_split_toml_header() {
        let text = "+++\ntitle = \"About Me\"\ndate = 2024-08-16T10:28:54-05:00\n+++\n\nHello.\n";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, Some(Delimiter::Toml));
        assert_eq!(
            &text[s.block.clone()],
            "title = \"About Me\"\ndate = 2024-08-16T10:28:54-05:00\n"
        );
        assert_eq!(&text[s.body.clone()], "\nHello.\n");
        assert_eq!(rebuild(text, &s), text);
    }

    #[test]
    fn test_split_yaml_header() {
        let text = "---\ntitle: Hello\n---\nBody";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, Some(Delimiter::Yaml));
        assert_eq!(&text[s.block.clone()], "title: Hello\n");
        assert_eq!(&text[s.body.clone()], "Body");
    }

    #[test]
    fn test_block_and_body_cover_everything_after_opening() {
        let text = "+++\na = 1\nb = 2\n+++\nline one\nline two\n";
        let s = split(text).unwrap();
        let after_opening = &text[s.opening.end..];
        let joined = format!(
            "{}{}{}",
            &text[s.block.clone()],
            &text[s.closing.clone()],
            &text[s.body.clone()]
        );
        assert_eq!(joined, after_opening);
        assert_eq!(s.block.end, s.closing.start);
        assert_eq!(s.closing.end, s.body.start);
    }

    #[test]
    fn test_headerless_document() {
        let text = "# Just a heading\n\nSome prose.\n";
        let s = split(text).unwrap();
        assert!(!s.has_header());
        assert!(s.block.is_empty());
        assert_eq!(&text[s.body.clone()], text);
    }

    #[test]
    fn test_marker_not_at_start_is_body() {
        let text = "Intro paragraph\n+++\ntitle = \"x\"\n+++\n";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, None);
        assert_eq!(&text[s.body.clone()], text);
    }

    #[test]
    fn test_marker_must_be_alone_on_line() {
        let text = "--- title: x ---\nBody\n";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, None);

        let text = "----\ntitle: x\n----\n";
        assert_eq!(split(text).unwrap().delimiter, None);
    }

    #[test]
    fn test_leading_whitespace_allowed() {
        let text = "\n\n  +++\ntitle = \"x\"\n+++\nBody";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, Some(Delimiter::Toml));
        assert_eq!(s.opening.start, 4);
        assert_eq!(&text[s.body.clone()], "Body");
        assert_eq!(rebuild(text, &s), text);
    }

    #[test]
    fn test_byte_order_mark_before_marker() {
        let text = "\u{feff}+++\ntitle = \"x\"\n+++\nBody";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, Some(Delimiter::Toml));
        assert_eq!(s.opening.start, 3);
        assert_eq!(&text[s.block.clone()], "title = \"x\"\n");
        assert_eq!(&text[s.body.clone()], "Body");
        assert_eq!(rebuild(text, &s), text);
    }

    #[test]
    fn test_unterminated_header_reports_offset() {
        let text = "\n+++\ntitle = \"x\"\n\nno closing marker\n";
        let err = split(text).unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedHeader {
                marker: "+++",
                offset: 1
            }
        );
    }

    #[test]
    fn test_mismatched_closing_marker_is_unterminated() {
        let text = "+++\ntitle = \"x\"\n---\nBody\n";
        assert!(matches!(
            split(text),
            Err(ParseError::MalformedHeader { marker: "+++", offset: 0 })
        ));
    }

    #[test]
    fn test_empty_block() {
        let text = "---\n---\nBody\n";
        let s = split(text).unwrap();
        assert_eq!(s.delimiter, Some(Delimiter::Yaml));
        assert!(s.block.is_empty());
        assert_eq!(&text[s.body.clone()], "Body\n");
    }

    #[test]
    fn test_crlf_line_endings() {
        let text = "+++\r\ntitle = \"x\"\r\n+++\r\nBody\r\n";
        let s = split(text).unwrap();
        assert_eq!(&text[s.block.clone()], "title = \"x\"\r\n");
        assert_eq!(&text[s.body.clone()], "Body\r\n");
    }

    #[test]
    fn test_closing_marker_at_end_of_input() {
        let text = "+++\ntitle = \"x\"\n+++";
        let s = split(text).unwrap();
        assert_eq!(&text[s.closing.clone()], "+++");
        assert!(s.body.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let s = split("").unwrap();
        assert_eq!(s.delimiter, None);
        assert_eq!(s.body, 0..0);
    }
}
