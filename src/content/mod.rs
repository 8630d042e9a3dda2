//! Content module - front-matter parsing, validation and loading

mod document;
pub mod fields;
pub mod frontmatter;
pub mod loader;
pub mod schema;
pub mod validate;

pub use document::Document;
pub use fields::Fields;
pub use frontmatter::{Delimiter, ParseError};
pub use schema::{FieldKind, FieldSpec, Schema};
pub use validate::{Metadata, Severity, Validation, Violation};
