//! zDom - in-memory XML document model
//!
//! Parse XML into an arena-backed tree, edit it through [`Document`], and
//! render it back to indented, escaped markup.
//!
//! # Quick Start
//!
//! ```
//! use zdom::from_str;
//! # fn main() -> Result<(), zdom::Error> {
//! let mut doc = from_str(r#"<config><item key="a">1</item></config>"#)?;
//! let Some(root) = doc.root() else {
//!     return Ok(());
//! };
//!
//! let item = doc.add_element(root, "item")?;
//! doc.set_attribute(item, "key", "b")?;
//! doc.set_data(item, "2")?;
//!
//! assert_eq!(doc.children(root, Some("item")).len(), 2);
//! assert!(doc.to_xml(root)?.contains(r#"<item key="b">2</item>"#));
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

use std::path::Path;

use tracing::{debug, error, instrument};

pub mod error;
pub use error::{Error, ErrorKind, Pos, Result, Span};

pub mod dom;
pub use dom::{
    clean_name, is_valid_name, ContentMode, Document, FileTarget, NodeId, NodeKind, Subtree,
    Target, DECLARATION, MAX_SERIALIZE_DEPTH,
};

pub mod lexer;
pub use lexer::XmlLexer;

pub mod parser;
pub use parser::{Config, Event, Parser, TreeBuilder};

/// Parse XML from string
pub fn from_str(s: &str) -> Result<Document> {
    let mut parser = Parser::new(s.as_bytes());
    parser.parse()
}

/// Parse XML from bytes
pub fn from_bytes(bytes: &[u8]) -> Result<Document> {
    let mut parser = Parser::new(bytes);
    parser.parse()
}

/// Parse with custom configuration
pub fn from_str_with_config(s: &str, config: Config) -> Result<Document> {
    let mut parser = Parser::with_config(s.as_bytes(), config);
    parser.parse()
}

/// Read and parse an XML file
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn parse_file(path: impl AsRef<Path>) -> Result<Document> {
    debug!("reading file");
    let content = std::fs::read(path.as_ref()).map_err(|err| {
        error!("failed to read file: {err}");
        Error::io(&err)
    })?;
    from_bytes(&content)
}
