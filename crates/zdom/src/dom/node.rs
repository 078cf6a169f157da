//! Arena node storage

use indexmap::IndexMap;

/// Handle to an entity stored in a [`Document`](super::Document) arena.
///
/// Handles are cheap to copy. A handle whose node was discarded stays
/// stale forever: slots are never reused, so it cannot alias a newer node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn from_index(index: usize) -> Self {
        Self(index)
    }

    pub(crate) const fn index(self) -> usize {
        self.0
    }
}

/// Element payload: tag name, attributes, and either text or children
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ElementData {
    pub(crate) name: String,
    pub(crate) attributes: IndexMap<String, String>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) text: Option<String>,
}

impl ElementData {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            ..Self::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn attributes(&self) -> &IndexMap<String, String> {
        &self.attributes
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// Content mode of the element
    pub fn mode(&self) -> ContentMode {
        if !self.children.is_empty() {
            ContentMode::Structured
        } else if self.text.is_some() {
            ContentMode::Text
        } else {
            ContentMode::Empty
        }
    }
}

/// Whether an element currently holds text, children or neither
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentMode {
    Empty,
    Text,
    Structured,
}

/// The two entity variants
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// Leaf holding only text
    Data(String),
    Element(ElementData),
}

/// One arena slot
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeData {
    pub(crate) kind: NodeKind,
    pub(crate) parent: Option<NodeId>,
    pub(crate) position: Option<usize>,
}

impl NodeData {
    pub(crate) const fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            position: None,
        }
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    pub fn as_element(&self) -> Option<&ElementData> {
        match &self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Data(_) => None,
        }
    }

    pub(crate) fn as_element_mut(&mut self) -> Option<&mut ElementData> {
        match &mut self.kind {
            NodeKind::Element(element) => Some(element),
            NodeKind::Data(_) => None,
        }
    }

    /// Text payload: the Data text, or an element's text when it has one
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Data(text) => Some(text),
            NodeKind::Element(element) => element.text(),
        }
    }

    /// True when this is an element whose name equals `name`
    pub(crate) fn is_named(&self, name: &str) -> bool {
        self.as_element().is_some_and(|element| element.name == name)
    }

    /// Name filter match; Data entities never match a filter
    pub(crate) fn matches(&self, filter: Option<&str>) -> bool {
        match filter {
            Some(name) => self.is_named(name),
            None => true,
        }
    }
}
