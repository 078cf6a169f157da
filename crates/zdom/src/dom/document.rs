//! Arena ownership and the operations shared by every entity

use crate::dom::name::clean_name;
use crate::dom::node::{ElementData, NodeData, NodeId, NodeKind};
use crate::error::{Error, Result};

/// Arena holding every entity of one or more XML trees.
///
/// Entities are created detached and become attached by being added as a
/// child of an element. Every element exclusively owns its children; the
/// `parent` link of a node is a back-reference used for navigation only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    nodes: Vec<Option<NodeData>>,
    root: Option<NodeId>,
    live: usize,
}

impl Document {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live entities
    pub fn len(&self) -> usize {
        self.live
    }

    /// True when the arena holds no live entity
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// The document element, if one was set
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Mark a detached element as the document element
    pub fn set_root(&mut self, id: NodeId) -> Result<()> {
        let node = self.node(id)?;
        if node.as_element().is_none() {
            return Err(Error::invalid_argument("document root must be an element"));
        }
        if node.parent.is_some() {
            return Err(Error::precondition("document root must be detached"));
        }
        self.root = Some(id);
        Ok(())
    }

    /// Unmark the document element and return it
    pub fn take_root(&mut self) -> Option<NodeId> {
        self.root.take()
    }

    /// Look up a node; `None` for stale handles
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).and_then(Option::as_ref)
    }

    pub(crate) fn node(&self, id: NodeId) -> Result<&NodeData> {
        self.get(id)
            .ok_or_else(|| Error::not_found(format!("no live node {id:?}")))
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData> {
        self.nodes
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .ok_or_else(|| Error::not_found(format!("no live node {id:?}")))
    }

    pub(crate) fn element(&self, id: NodeId) -> Result<&ElementData> {
        self.node(id)?
            .as_element()
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} is a data entity")))
    }

    pub(crate) fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementData> {
        self.node_mut(id)?
            .as_element_mut()
            .ok_or_else(|| Error::invalid_argument(format!("{id:?} is a data entity")))
    }

    fn insert(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(Some(NodeData::new(kind)));
        self.live += 1;
        id
    }

    /// Create a detached element; the name goes through [`clean_name`]
    pub fn create_element(&mut self, name: &str) -> Result<NodeId> {
        let name = clean_name(name);
        if name.is_empty() {
            return Err(Error::invalid_argument("element name is empty after cleaning"));
        }
        Ok(self.insert(NodeKind::Element(ElementData::new(name))))
    }

    /// Create a detached data entity
    pub fn create_data(&mut self, text: impl Into<String>) -> NodeId {
        self.insert(NodeKind::Data(text.into()))
    }

    pub fn is_data(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(NodeData::kind), Some(NodeKind::Data(_)))
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(NodeData::kind), Some(NodeKind::Element(_)))
    }

    /// True when the entity carries text
    pub fn has_data(&self, id: NodeId) -> bool {
        self.data(id).is_some()
    }

    pub fn data(&self, id: NodeId) -> Option<&str> {
        self.get(id).and_then(NodeData::text)
    }

    pub fn data_or<'a>(&'a self, id: NodeId, default: &'a str) -> &'a str {
        self.data(id).unwrap_or(default)
    }

    /// Replace the text of an entity.
    ///
    /// # Errors
    ///
    /// `PreconditionFailed` when `id` is an element that has children.
    pub fn set_data(&mut self, id: NodeId, text: impl Into<String>) -> Result<()> {
        match &mut self.node_mut(id)?.kind {
            NodeKind::Data(current) => {
                *current = text.into();
                Ok(())
            }
            NodeKind::Element(element) if !element.children.is_empty() => Err(
                Error::precondition(format!("<{}> already has children", element.name)),
            ),
            NodeKind::Element(element) => {
                element.text = Some(text.into());
                Ok(())
            }
        }
    }

    pub fn has_parent(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|node| node.parent.is_some())
    }

    /// Parent element of an attached entity
    pub fn parent(&self, id: NodeId) -> Result<NodeId> {
        self.node(id)?
            .parent
            .ok_or_else(|| Error::not_found(format!("{id:?} has no parent")))
    }

    /// Move `id` under `parent`; same as `add_child(parent, id)`
    pub fn set_parent(&mut self, id: NodeId, parent: NodeId) -> Result<NodeId> {
        self.add_child(parent, id)
    }

    /// Index of an attached entity among its siblings
    pub fn position(&self, id: NodeId) -> Result<usize> {
        self.node(id)?
            .position
            .ok_or_else(|| Error::precondition(format!("{id:?} is detached")))
    }

    /// `None` detaches the entity's own links; `Some` needs a parent.
    ///
    /// Only the child-management operations call this, they keep the
    /// parent's children sequence in step.
    pub(crate) fn set_position(&mut self, id: NodeId, position: Option<usize>) -> Result<()> {
        let node = self.node_mut(id)?;
        match position {
            None => {
                node.parent = None;
                node.position = None;
            }
            Some(_) if node.parent.is_none() => {
                return Err(Error::precondition(format!(
                    "{id:?} needs a parent before it gets a position"
                )));
            }
            Some(pos) => node.position = Some(pos),
        }
        Ok(())
    }

    /// Closest earlier sibling, optionally restricted to elements named `filter`
    pub fn previous(&self, id: NodeId, filter: Option<&str>) -> Option<NodeId> {
        let (siblings, pos) = self.siblings(id)?;
        siblings
            .get(..pos)?
            .iter()
            .rev()
            .copied()
            .find(|sibling| self.get(*sibling).is_some_and(|node| node.matches(filter)))
    }

    /// Closest later sibling, optionally restricted to elements named `filter`
    pub fn next(&self, id: NodeId, filter: Option<&str>) -> Option<NodeId> {
        let (siblings, pos) = self.siblings(id)?;
        siblings
            .get(pos + 1..)?
            .iter()
            .copied()
            .find(|sibling| self.get(*sibling).is_some_and(|node| node.matches(filter)))
    }

    fn siblings(&self, id: NodeId) -> Option<(&[NodeId], usize)> {
        let node = self.get(id)?;
        let parent = self.get(node.parent?)?.as_element()?;
        Some((parent.children.as_slice(), node.position?))
    }

    /// True when `ancestor` is `id` itself or one of its ancestors
    pub(crate) fn is_self_or_ancestor(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.get(node).and_then(NodeData::parent);
        }
        false
    }

    /// Deep-copy a subtree. The copy starts detached.
    pub fn clone_subtree(&mut self, id: NodeId) -> Result<NodeId> {
        let (copy, children) = self.copy_shell(id)?;
        let mut pending = vec![(copy, children)];
        while let Some((parent, children)) = pending.pop() {
            for (position, child) in children.into_iter().enumerate() {
                let (child_copy, grandchildren) = self.copy_shell(child)?;
                let node = self.node_mut(child_copy)?;
                node.parent = Some(parent);
                node.position = Some(position);
                self.element_mut(parent)?.children.push(child_copy);
                if !grandchildren.is_empty() {
                    pending.push((child_copy, grandchildren));
                }
            }
        }
        Ok(copy)
    }

    /// Copy one entity without its children; also hands back the
    /// children still to be copied.
    fn copy_shell(&mut self, id: NodeId) -> Result<(NodeId, Vec<NodeId>)> {
        let (kind, children) = match &self.node(id)?.kind {
            NodeKind::Data(text) => (NodeKind::Data(text.clone()), Vec::new()),
            NodeKind::Element(element) => (
                NodeKind::Element(ElementData {
                    name: element.name.clone(),
                    attributes: element.attributes.clone(),
                    children: Vec::new(),
                    text: element.text.clone(),
                }),
                element.children.clone(),
            ),
        };
        Ok((self.insert(kind), children))
    }

    /// Release a detached subtree from the arena.
    ///
    /// Handles into the subtree become stale.
    pub fn discard(&mut self, id: NodeId) -> Result<()> {
        if self.node(id)?.parent.is_some() {
            return Err(Error::precondition(format!(
                "{id:?} is attached; remove it from its parent first"
            )));
        }
        if self.root == Some(id) {
            self.root = None;
        }

        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            let Some(node) = self.nodes.get_mut(next.index()).and_then(Option::take) else {
                continue;
            };
            self.live -= 1;
            if let NodeKind::Element(element) = node.kind {
                pending.extend(element.children);
            }
        }
        Ok(())
    }

    /// Concatenated text of the entity and all its descendants
    pub fn text_content(&self, id: NodeId) -> Result<String> {
        let mut out = String::new();
        self.collect_text(id, &mut out)?;
        Ok(out)
    }

    fn collect_text(&self, id: NodeId, out: &mut String) -> Result<()> {
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            match &self.node(next)?.kind {
                NodeKind::Data(text) => out.push_str(text),
                NodeKind::Element(element) => {
                    if let Some(text) = &element.text {
                        out.push_str(text);
                    }
                    pending.extend(element.children.iter().rev());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_create_cleans_name() -> Result<()> {
        let mut doc = Document::new();
        let id = doc.create_element(" 1my-tag ")?;
        assert_eq!(doc.name(id), Some("my-tag"));
        assert!(doc.is_element(id));
        assert!(!doc.has_parent(id));
        assert_eq!(doc.len(), 1);
        Ok(())
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let mut doc = Document::new();
        let err = doc.create_element("123").err();
        assert_eq!(err.map(|e| e.kind().clone()), Some(ErrorKind::InvalidArgument));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_data_accessors() -> Result<()> {
        let mut doc = Document::new();
        let data = doc.create_data("hi");
        assert!(doc.is_data(data));
        assert!(doc.has_data(data));
        assert_eq!(doc.data_or(data, "x"), "hi");

        let el = doc.create_element("a")?;
        assert!(!doc.has_data(el));
        assert_eq!(doc.data_or(el, "fallback"), "fallback");
        doc.set_data(el, "text")?;
        assert_eq!(doc.data(el), Some("text"));

        doc.set_data(data, "bye")?;
        assert_eq!(doc.data(data), Some("bye"));
        Ok(())
    }

    #[test]
    fn test_detached_lookups_fail() -> Result<()> {
        let mut doc = Document::new();
        let el = doc.create_element("a")?;
        assert_eq!(
            doc.parent(el).map_err(|e| e.kind().clone()),
            Err(ErrorKind::NotFound)
        );
        assert_eq!(
            doc.position(el).map_err(|e| e.kind().clone()),
            Err(ErrorKind::PreconditionFailed)
        );
        assert_eq!(doc.previous(el, None), None);
        assert_eq!(doc.next(el, None), None);
        Ok(())
    }

    #[test]
    fn test_set_position_requires_parent() -> Result<()> {
        let mut doc = Document::new();
        let el = doc.create_element("a")?;
        assert!(doc.set_position(el, Some(0)).is_err());
        assert!(doc.set_position(el, None).is_ok());
        Ok(())
    }

    #[test]
    fn test_sibling_scan_with_filter() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let a = doc.add_element(root, "item")?;
        let text = doc.add_data(root, "between")?;
        let b = doc.add_element(root, "other")?;
        let c = doc.add_element(root, "item")?;

        assert_eq!(doc.next(a, None), Some(text));
        assert_eq!(doc.next(a, Some("item")), Some(c));
        assert_eq!(doc.previous(c, Some("item")), Some(a));
        assert_eq!(doc.previous(c, None), Some(b));
        assert_eq!(doc.previous(b, Some("other")), None);
        assert_eq!(doc.next(c, None), None);
        assert_eq!(doc.previous(a, None), None);
        Ok(())
    }

    #[test]
    fn test_clone_subtree_is_deep_and_detached() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let item = doc.add_element(root, "item")?;
        doc.set_attribute(item, "id", "1")?;
        doc.add_element(item, "leaf")?;

        let copy = doc.clone_subtree(item)?;
        assert!(!doc.has_parent(copy));
        assert_eq!(doc.attribute(copy, "id"), Some("1"));

        let leaf_copy = doc.child(copy, 0)?;
        assert_eq!(doc.parent(leaf_copy)?, copy);
        assert_eq!(doc.position(leaf_copy)?, 0);

        doc.set_attribute(copy, "id", "2")?;
        assert_eq!(doc.attribute(item, "id"), Some("1"));
        Ok(())
    }

    #[test]
    fn test_discard_releases_subtree() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let item = doc.add_element(root, "item")?;
        let leaf = doc.add_element(item, "leaf")?;
        assert_eq!(doc.len(), 3);

        assert!(doc.discard(item).is_err());
        doc.remove_child(root, item)?;
        doc.discard(item)?;

        assert_eq!(doc.len(), 1);
        assert!(doc.get(leaf).is_none());
        assert_eq!(
            doc.parent(leaf).map_err(|e| e.kind().clone()),
            Err(ErrorKind::NotFound)
        );
        Ok(())
    }

    #[test]
    fn test_root_marker() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("root")?;
        let child = doc.add_element(root, "child")?;
        assert!(doc.set_root(child).is_err());
        doc.set_root(root)?;
        assert_eq!(doc.root(), Some(root));
        assert_eq!(doc.take_root(), Some(root));
        assert_eq!(doc.root(), None);
        Ok(())
    }

    #[test]
    fn test_text_content() -> Result<()> {
        let mut doc = Document::new();
        let root = doc.create_element("p")?;
        doc.add_data(root, "Hello, ")?;
        let b = doc.add_element(root, "b")?;
        doc.set_data(b, "world")?;
        assert_eq!(doc.text_content(root)?, "Hello, world");
        Ok(())
    }
}
