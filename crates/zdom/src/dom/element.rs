//! Element operations: naming, attributes and child management

use tracing::trace;

use crate::dom::document::Document;
use crate::dom::name::clean_name;
use crate::dom::node::{NodeData, NodeId};
use crate::error::{Error, Result};

impl Document {
    /// Tag name of an element; `None` for data entities
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id)
            .and_then(NodeData::as_element)
            .map(|element| element.name.as_str())
    }

    /// Rename an element. The name is cleaned first.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when the cleaned name is empty or `id` is a data entity.
    pub fn set_name(&mut self, id: NodeId, name: &str) -> Result<()> {
        let name = cleaned(name, "element")?;
        self.element_mut(id)?.name = name;
        Ok(())
    }

    pub fn has_attribute(&self, id: NodeId, name: &str) -> bool {
        self.attribute(id, name).is_some()
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        let element = self.get(id)?.as_element()?;
        element
            .attributes
            .get(name)
            .or_else(|| element.attributes.get(&clean_name(name)))
            .map(String::as_str)
    }

    pub fn attribute_or<'a>(&'a self, id: NodeId, name: &str, default: &'a str) -> &'a str {
        self.attribute(id, name).unwrap_or(default)
    }

    /// Attributes in the order they were first set
    pub fn attributes(&self, id: NodeId) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.get(id)
            .and_then(NodeData::as_element)
            .into_iter()
            .flat_map(|element| {
                element
                    .attributes
                    .iter()
                    .map(|(name, value)| (name.as_str(), value.as_str()))
            })
    }

    /// Set one attribute. Re-setting an existing name keeps its slot.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) -> Result<()> {
        let name = cleaned(name, "attribute")?;
        self.element_mut(id)?.attributes.insert(name, value.into());
        Ok(())
    }

    /// Replace the whole attribute set.
    ///
    /// Every name is cleaned before anything changes, so a bad name leaves
    /// the current attributes untouched.
    pub fn set_attributes<I, K, V>(&mut self, id: NodeId, attributes: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let attributes = attributes
            .into_iter()
            .map(|(name, value)| Ok((cleaned(name.as_ref(), "attribute")?, value.into())))
            .collect::<Result<Vec<_>>>()?;

        let element = self.element_mut(id)?;
        element.attributes.clear();
        element.attributes.extend(attributes);
        Ok(())
    }

    /// Remove an attribute, keeping the order of the others
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>> {
        let name = clean_name(name);
        Ok(self.element_mut(id)?.attributes.shift_remove(&name))
    }

    /// Number of children; zero for data entities
    pub fn child_count(&self, id: NodeId) -> usize {
        self.get(id)
            .and_then(NodeData::as_element)
            .map_or(0, |element| element.children.len())
    }

    pub fn has_children(&self, id: NodeId, filter: Option<&str>) -> bool {
        self.child_ids(id)
            .iter()
            .any(|child| self.get(*child).is_some_and(|node| node.matches(filter)))
    }

    /// Children in document order; a filter keeps only elements with that name
    pub fn children(&self, id: NodeId, filter: Option<&str>) -> Vec<NodeId> {
        self.child_ids(id)
            .iter()
            .copied()
            .filter(|child| self.get(*child).is_some_and(|node| node.matches(filter)))
            .collect()
    }

    fn child_ids(&self, id: NodeId) -> &[NodeId] {
        self.get(id)
            .and_then(NodeData::as_element)
            .map(|element| element.children.as_slice())
            .unwrap_or_default()
    }

    /// Child at `position`
    ///
    /// # Errors
    ///
    /// `NotFound` when `position` is past the last child.
    pub fn child(&self, id: NodeId, position: usize) -> Result<NodeId> {
        self.element(id)?
            .children
            .get(position)
            .copied()
            .ok_or_else(|| Error::not_found(format!("no child at position {position}")))
    }

    pub fn first(&self, id: NodeId, filter: Option<&str>) -> Option<NodeId> {
        self.child_ids(id)
            .iter()
            .copied()
            .find(|child| self.get(*child).is_some_and(|node| node.matches(filter)))
    }

    pub fn last(&self, id: NodeId, filter: Option<&str>) -> Option<NodeId> {
        self.child_ids(id)
            .iter()
            .rev()
            .copied()
            .find(|child| self.get(*child).is_some_and(|node| node.matches(filter)))
    }

    /// Append `child` to `parent`, detaching it from any previous parent.
    /// Attaching the document element clears the document root.
    ///
    /// When `parent` holds text, the text first moves into a leading data
    /// child so that nothing is lost.
    ///
    /// # Errors
    ///
    /// - `InvalidArgument` when `parent` is a data entity
    /// - `PreconditionFailed` when `child` is `parent` or one of its ancestors
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.check_attach(parent, child)?;
        self.release(child)?;
        self.migrate_text(parent)?;

        let position = self.element(parent)?.children.len();
        self.element_mut(parent)?.children.push(child);
        self.node_mut(child)?.parent = Some(parent);
        self.set_position(child, Some(position))?;
        trace!(?parent, ?child, position, "attached child");
        Ok(child)
    }

    /// Create an element named `name` and append it to `parent`
    pub fn add_element(&mut self, parent: NodeId, name: &str) -> Result<NodeId> {
        self.element(parent)?;
        let child = self.create_element(name)?;
        self.add_child(parent, child)
    }

    /// Wrap `text` in a data entity and append it to `parent`
    pub fn add_data(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId> {
        self.element(parent)?;
        let child = self.create_data(text);
        self.add_child(parent, child)
    }

    /// Insert `child` at `position`, shifting later children one slot right.
    ///
    /// A child that already sits in `parent` is taken out first, so an
    /// entity moved forward lands one slot before `position`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` when `position` is greater than the child count,
    /// plus everything [`add_child`](Self::add_child) rejects.
    pub fn set_child(&mut self, parent: NodeId, position: usize, child: NodeId) -> Result<NodeId> {
        self.check_attach(parent, child)?;
        let count = self.element(parent)?.children.len();
        if position > count {
            return Err(Error::invalid_argument(format!(
                "position {position} is past the end ({count} children)"
            )));
        }

        self.release(child)?;
        let migrated = self.migrate_text(parent)?;

        let children = &mut self.element_mut(parent)?.children;
        let position = if migrated {
            children.len()
        } else {
            position.min(children.len())
        };
        children.insert(position, child);
        self.node_mut(child)?.parent = Some(parent);
        self.renumber(parent, position)?;
        Ok(child)
    }

    /// Detach `child` from `parent` and renumber the later siblings.
    ///
    /// The removed entity keeps its own subtree.
    ///
    /// # Errors
    ///
    /// `PreconditionFailed` when `child` is not a direct child of `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<NodeId> {
        self.element(parent)?;
        let node = self.node(child)?;
        if node.parent != Some(parent) {
            return Err(Error::precondition(format!(
                "{child:?} is not a child of {parent:?}"
            )));
        }
        let position = self.position(child)?;

        let children = &mut self.element_mut(parent)?.children;
        if children.get(position) != Some(&child) {
            return Err(Error::precondition(format!(
                "{child:?} is not at its recorded position {position}"
            )));
        }
        children.remove(position);
        self.set_position(child, None)?;
        self.renumber(parent, position)?;
        trace!(?parent, ?child, position, "detached child");
        Ok(child)
    }

    /// Remove the child at `position`
    ///
    /// # Errors
    ///
    /// `NotFound` when there is no child at `position`.
    pub fn remove_child_at(&mut self, parent: NodeId, position: usize) -> Result<NodeId> {
        let child = self.child(parent, position)?;
        self.remove_child(parent, child)
    }

    fn check_attach(&self, parent: NodeId, child: NodeId) -> Result<()> {
        self.element(parent)?;
        self.node(child)?;
        if self.is_self_or_ancestor(child, parent) {
            return Err(Error::precondition(format!(
                "{child:?} cannot be attached inside itself"
            )));
        }
        Ok(())
    }

    /// Detach `child` from its current parent. An attached entity is no
    /// longer the document element, so the root marker goes too.
    fn release(&mut self, child: NodeId) -> Result<()> {
        if self.root() == Some(child) {
            self.take_root();
        }
        if let Some(previous) = self.node(child)?.parent {
            self.remove_child(previous, child)?;
        }
        Ok(())
    }

    /// Move an element's text into a leading data child.
    fn migrate_text(&mut self, parent: NodeId) -> Result<bool> {
        let Some(text) = self.element_mut(parent)?.text.take() else {
            return Ok(false);
        };
        let data = self.create_data(text);
        self.element_mut(parent)?.children.insert(0, data);
        self.node_mut(data)?.parent = Some(parent);
        self.renumber(parent, 0)?;
        Ok(true)
    }

    /// Store `children[i].position = i` for every child from `from` on.
    fn renumber(&mut self, parent: NodeId, from: usize) -> Result<()> {
        let tail = self
            .element(parent)?
            .children
            .get(from..)
            .map(<[NodeId]>::to_vec)
            .unwrap_or_default();
        for (offset, child) in tail.into_iter().enumerate() {
            self.set_position(child, Some(from + offset))?;
        }
        Ok(())
    }
}

fn cleaned(raw: &str, what: &str) -> Result<String> {
    let name = clean_name(raw);
    if name.is_empty() {
        Err(Error::invalid_argument(format!(
            "{what} name {raw:?} is empty after cleaning"
        )))
    } else {
        Ok(name)
    }
}
