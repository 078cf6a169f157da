//! Tree builder: turns lexical events into a document tree

use tracing::trace;

use crate::dom::{Document, NodeId};
use crate::error::{Error, ErrorKind, Result, Span};
use crate::parser::Event;

/// Builds a tree from open/text/close events with a single cursor.
///
/// The builder keeps no stack: the cursor climbs back up through the
/// parent links of the tree it is building. Whitespace-only text is
/// dropped, and consecutive text events for one element concatenate.
#[derive(Debug, Default)]
pub struct TreeBuilder {
    document: Document,
    root: Option<NodeId>,
    current: Option<NodeId>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Element the next event applies to
    pub fn current(&self) -> Option<NodeId> {
        self.current
    }

    /// Nodes built so far
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Feed one event
    pub fn handle(&mut self, event: Event) -> Result<()> {
        trace!(?event, "tree builder event");
        match event {
            Event::Open { name, attributes } => {
                let element = match (self.current, self.root) {
                    (Some(cursor), _) => self.document.add_element(cursor, &name)?,
                    (None, None) => {
                        let root = self.document.create_element(&name)?;
                        self.root = Some(root);
                        root
                    }
                    (None, Some(_)) => {
                        return Err(malformed(format!(
                            "<{name}> opened after the document element closed"
                        )));
                    }
                };
                self.document.set_attributes(element, attributes)?;
                self.current = Some(element);
            }
            Event::Text(text) => {
                if text.trim().is_empty() {
                    return Ok(());
                }
                let Some(cursor) = self.current else {
                    return Err(malformed("character data outside the document element"));
                };
                self.append_text(cursor, &text)?;
            }
            Event::Close { name } => {
                let Some(cursor) = self.current else {
                    return Err(malformed(format!("</{name}> closes nothing")));
                };
                self.current = if Some(cursor) == self.root {
                    None
                } else {
                    Some(self.document.parent(cursor)?)
                };
            }
        }
        Ok(())
    }

    /// Text joins the cursor's own text, or the trailing data child once the
    /// cursor already holds children.
    fn append_text(&mut self, cursor: NodeId, text: &str) -> Result<()> {
        if self.document.child_count(cursor) == 0 {
            let joined = format!("{}{text}", self.document.data_or(cursor, ""));
            return self.document.set_data(cursor, joined);
        }

        match self.document.last(cursor, None) {
            Some(last) if self.document.is_data(last) => {
                let joined = format!("{}{text}", self.document.data_or(last, ""));
                self.document.set_data(last, joined)
            }
            _ => self.document.add_data(cursor, text).map(drop),
        }
    }

    /// Hand back the finished document with its root set.
    ///
    /// # Errors
    ///
    /// A parse error when no element was opened or the document element
    /// is still open.
    pub fn finish(mut self) -> Result<Document> {
        let Some(root) = self.root else {
            return Err(malformed("no element found"));
        };
        if self.current.is_some() {
            return Err(malformed("document element was never closed"));
        }
        self.document.set_root(root)?;
        Ok(self.document)
    }
}

fn malformed(message: impl Into<String>) -> Error {
    Error::with_message(ErrorKind::Parse, Span::empty(), message)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(events: Vec<Event>) -> Result<Document> {
        let mut builder = TreeBuilder::new();
        for event in events {
            builder.handle(event)?;
        }
        builder.finish()
    }

    #[test]
    fn test_builds_nested_tree() -> Result<()> {
        let doc = build(vec![
            Event::Open {
                name: "root".to_string(),
                attributes: vec![("b".to_string(), "2".to_string()), ("a".to_string(), "1".to_string())],
            },
            Event::open("child"),
            Event::text("hello"),
            Event::close("child"),
            Event::open("empty"),
            Event::close("empty"),
            Event::close("root"),
        ])?;

        let root = doc.root().ok_or_else(|| Error::not_found("root"))?;
        assert_eq!(doc.name(root), Some("root"));
        let attrs: Vec<_> = doc.attributes(root).collect();
        assert_eq!(attrs, vec![("b", "2"), ("a", "1")]);

        let child = doc.child(root, 0)?;
        assert_eq!(doc.data(child), Some("hello"));
        assert_eq!(doc.position(doc.child(root, 1)?)?, 1);
        Ok(())
    }

    #[test]
    fn test_text_chunks_concatenate_and_whitespace_is_dropped() -> Result<()> {
        let doc = build(vec![
            Event::open("a"),
            Event::text("  \n"),
            Event::text("one"),
            Event::text(" & two"),
            Event::text("\t"),
            Event::close("a"),
        ])?;
        let root = doc.root().ok_or_else(|| Error::not_found("root"))?;
        assert_eq!(doc.data(root), Some("one & two"));
        Ok(())
    }

    #[test]
    fn test_mixed_content_keeps_order() -> Result<()> {
        let doc = build(vec![
            Event::open("p"),
            Event::text("before"),
            Event::open("b"),
            Event::close("b"),
            Event::text("after"),
            Event::text(" more"),
            Event::close("p"),
        ])?;
        let root = doc.root().ok_or_else(|| Error::not_found("root"))?;
        let children = doc.children(root, None);
        assert_eq!(children.len(), 3);
        assert_eq!(doc.data(children[0]), Some("before"));
        assert_eq!(doc.name(children[1]), Some("b"));
        assert_eq!(doc.data(children[2]), Some("after more"));
        Ok(())
    }

    #[test]
    fn test_unbalanced_streams_fail() {
        assert!(build(vec![]).is_err());
        assert!(build(vec![Event::open("a")]).is_err());
        assert!(build(vec![Event::close("a")]).is_err());
        assert!(build(vec![Event::text("x")]).is_err());
        assert!(build(vec![Event::open("a"), Event::close("a"), Event::open("b")]).is_err());
    }
}
