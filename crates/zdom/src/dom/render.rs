//! Serializer: renders a subtree to indented XML text

use std::fmt;

use crate::dom::document::Document;
use crate::dom::node::{NodeId, NodeKind};
use crate::error::Result;

/// Declaration line written before every level-0 element rendering
pub const DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

const INDENT: &str = "    ";

impl Document {
    /// Render a standalone document: declaration line, then the subtree
    pub fn to_xml(&self, id: NodeId) -> Result<String> {
        self.to_xml_at(id, 0)
    }

    /// Render a subtree as if nested `level` deep.
    ///
    /// Level 0 prefixes the declaration and uses no indentation; deeper
    /// levels indent by four spaces per level and omit the declaration, so
    /// the result can be embedded in a larger rendering.
    pub fn to_xml_at(&self, id: NodeId, level: usize) -> Result<String> {
        let mut out = String::new();
        if level == 0 && self.is_element(id) {
            out.push_str(DECLARATION);
            out.push('\n');
        }
        self.write_node(id, level, &mut out)?;
        Ok(out)
    }

    /// Borrowed view of a subtree that renders through `Display`
    pub fn subtree(&self, id: NodeId) -> Subtree<'_> {
        Subtree { document: self, id }
    }

    fn write_node(&self, id: NodeId, level: usize, out: &mut String) -> Result<()> {
        let mut pending = vec![Step::Enter(id, level)];
        while let Some(step) = pending.pop() {
            match step {
                Step::Enter(id, level) => self.write_open(id, level, out, &mut pending)?,
                Step::Newline => out.push('\n'),
                Step::Close(id, level) => {
                    let name = self.name(id).unwrap_or_default();
                    out.push_str(&INDENT.repeat(level));
                    close_tag(name, out);
                }
            }
        }
        Ok(())
    }

    /// Write everything up to the first child; the children and the
    /// closing tag are queued on `pending`.
    fn write_open(
        &self,
        id: NodeId,
        level: usize,
        out: &mut String,
        pending: &mut Vec<Step>,
    ) -> Result<()> {
        out.push_str(&INDENT.repeat(level));
        let element = match &self.node(id)?.kind {
            NodeKind::Data(text) => {
                out.push_str(&escape_text(text));
                return Ok(());
            }
            NodeKind::Element(element) => element,
        };

        out.push('<');
        out.push_str(&element.name);
        for (name, value) in &element.attributes {
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&escape_attribute(value));
            out.push('"');
        }

        let text = element.text.as_deref().filter(|text| !text.trim().is_empty());
        if !element.children.is_empty() {
            out.push_str(">\n");
            pending.push(Step::Close(id, level));
            for child in element.children.iter().rev() {
                pending.push(Step::Newline);
                pending.push(Step::Enter(*child, level + 1));
            }
        } else if let Some(text) = text {
            out.push('>');
            out.push_str(&escape_text(text));
            close_tag(&element.name, out);
        } else {
            // blank text reads back as no text at all
            out.push_str(" />");
        }
        Ok(())
    }
}

/// Pending rendering work, popped in document order
enum Step {
    Enter(NodeId, usize),
    Newline,
    Close(NodeId, usize),
}

fn close_tag(name: &str, out: &mut String) {
    out.push_str("</");
    out.push_str(name);
    out.push('>');
}

pub(crate) fn escape_text(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

pub(crate) fn escape_attribute(input: &str) -> String {
    escape_text(input).replace('"', "&quot;")
}

/// Deepest nesting the `serde` view accepts; deeper subtrees fail to
/// serialize instead of exhausting the stack.
pub const MAX_SERIALIZE_DEPTH: usize = 128;

/// A subtree borrowed from its [`Document`].
///
/// `Display` renders it at level 0. With the `serde` feature it also
/// serializes as nested maps: `{ name, attributes, children }` for elements
/// (`text` instead of `children` when the element holds text) and a plain
/// string for data entities. Subtrees nested deeper than
/// [`MAX_SERIALIZE_DEPTH`] fail with a serializer error.
#[derive(Clone, Copy, Debug)]
pub struct Subtree<'a> {
    document: &'a Document,
    id: NodeId,
}

impl Subtree<'_> {
    pub fn id(&self) -> NodeId {
        self.id
    }
}

impl fmt::Display for Subtree<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered = self.document.to_xml(self.id).map_err(|_| fmt::Error)?;
        f.write_str(&rendered)
    }
}

impl fmt::Display for Document {
    /// Renders the document root, or nothing when no root is set
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => fmt::Display::fmt(&self.subtree(root), f),
            None => Ok(()),
        }
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use indexmap::IndexMap;
    use serde::ser::{Error as _, SerializeMap};
    use serde::{Serialize, Serializer};

    use super::{Subtree, MAX_SERIALIZE_DEPTH};
    use crate::dom::document::Document;
    use crate::dom::node::{NodeId, NodeKind};

    struct Attributes<'a>(&'a IndexMap<String, String>);

    impl Serialize for Attributes<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_map(self.0.iter())
        }
    }

    /// Entity at a known nesting depth below the serialized subtree
    struct Nested<'a> {
        document: &'a Document,
        id: NodeId,
        depth: usize,
    }

    struct Children<'a> {
        document: &'a Document,
        ids: &'a [NodeId],
        depth: usize,
    }

    impl Serialize for Children<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            serializer.collect_seq(self.ids.iter().map(|id| Nested {
                document: self.document,
                id: *id,
                depth: self.depth,
            }))
        }
    }

    impl Serialize for Nested<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            if self.depth > MAX_SERIALIZE_DEPTH {
                return Err(S::Error::custom(format!(
                    "subtree nests deeper than {MAX_SERIALIZE_DEPTH} levels"
                )));
            }
            let node = self
                .document
                .get(self.id)
                .ok_or_else(|| S::Error::custom(format!("no live node {:?}", self.id)))?;

            match &node.kind {
                NodeKind::Data(text) => serializer.serialize_str(text),
                NodeKind::Element(element) => {
                    let mut map = serializer.serialize_map(Some(3))?;
                    map.serialize_entry("name", &element.name)?;
                    map.serialize_entry("attributes", &Attributes(&element.attributes))?;
                    match &element.text {
                        Some(text) => map.serialize_entry("text", text)?,
                        None => map.serialize_entry(
                            "children",
                            &Children {
                                document: self.document,
                                ids: &element.children,
                                depth: self.depth + 1,
                            },
                        )?,
                    }
                    map.end()
                }
            }
        }
    }

    impl Serialize for Subtree<'_> {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            Nested {
                document: self.document,
                id: self.id,
                depth: 0,
            }
            .serialize(serializer)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape_text("a & <b> \"q\""), "a &amp; &lt;b&gt; \"q\"");
        assert_eq!(escape_attribute("say \"hi\" & go"), "say &quot;hi&quot; &amp; go");
    }

    #[test]
    fn test_render_nested() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("a")?;
        let b = doc.add_element(root, "b")?;
        doc.set_data(b, "x")?;
        doc.add_element(root, "c")?;

        let xml = doc.to_xml(root)?;
        assert!(xml.starts_with(DECLARATION));
        assert!(xml.contains("<a>\n    <b>x</b>\n    <c />\n</a>"));
        Ok(())
    }

    #[test]
    fn test_render_nested_level_has_no_declaration() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("a")?;
        let inner = doc.add_element(root, "inner")?;
        doc.add_element(inner, "leaf")?;

        assert_eq!(
            doc.to_xml_at(inner, 1)?,
            "    <inner>\n        <leaf />\n    </inner>"
        );
        Ok(())
    }

    #[test]
    fn test_render_attributes_and_data_children() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("p")?;
        doc.set_attribute(root, "title", "a \"b\" & c")?;
        doc.set_data(root, "1 < 2")?;
        doc.add_element(root, "br")?;

        assert_eq!(
            doc.to_xml_at(root, 1)?,
            "    <p title=\"a &quot;b&quot; &amp; c\">\n        1 &lt; 2\n        <br />\n    </p>"
        );
        Ok(())
    }

    #[test]
    fn test_render_self_closing_with_attributes() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("img")?;
        doc.set_attribute(root, "src", "a.png")?;
        doc.set_attribute(root, "alt", "")?;
        assert_eq!(doc.to_xml_at(root, 2)?, "        <img src=\"a.png\" alt=\"\" />");
        Ok(())
    }

    #[test]
    fn test_display() -> Result<()> {
        let mut doc = Document::new();
        assert_eq!(doc.to_string(), "");

        let root = doc.create_element("root")?;
        doc.set_root(root)?;
        assert_eq!(doc.to_string(), format!("{DECLARATION}\n<root />"));
        assert_eq!(doc.subtree(root).to_string(), doc.to_xml(root)?);
        Ok(())
    }

    #[test]
    fn test_blank_text_renders_as_empty_element() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let empty = doc.add_element(root, "a")?;
        doc.set_data(empty, "")?;
        let blank = doc.add_element(root, "b")?;
        doc.set_data(blank, " \n\t")?;

        assert!(doc.has_data(empty));
        assert_eq!(
            doc.to_xml_at(root, 0)?,
            format!("{DECLARATION}\n<root>\n    <a />\n    <b />\n</root>")
        );
        Ok(())
    }
}
