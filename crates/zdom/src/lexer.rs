//! Lexer module for tokenization

pub mod cursor;
pub mod xml;

pub use cursor::Cursor;
pub use xml::XmlLexer;
