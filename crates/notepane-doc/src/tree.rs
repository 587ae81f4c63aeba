#![forbid(unsafe_code)]

//! Document tree abstraction and an arena-backed implementation.
//!
//! [`DocumentTree`] is the minimal read-only view the selection codec needs:
//! parent links, indexed children and the offset range of a container.
//! Hosts with their own node model implement it directly; [`NodeTree`] is the
//! in-process model used by the reference surface and the markup codec.
//!
//! # Invariants
//!
//! 1. The root has no parent and is never detached.
//! 2. A node appears in at most one parent's child list.
//! 3. Text nodes have no children.
//!
//! Detached nodes stay in the arena with no parent. They are unreachable from
//! the root, so encoding a selection inside one fails.

use std::fmt;

use crate::error::TreeError;

/// Read-only structural view of a document.
pub trait DocumentTree {
    /// Cheap handle to a node. Handles are only meaningful for the tree that
    /// produced them.
    type Node: Copy + Eq + fmt::Debug;

    fn root(&self) -> Self::Node;

    fn parent(&self, node: Self::Node) -> Option<Self::Node>;

    fn child_count(&self, node: Self::Node) -> usize;

    fn child(&self, node: Self::Node, index: usize) -> Option<Self::Node>;

    /// Position of `node` among its parent's children.
    fn child_index(&self, node: Self::Node) -> Option<usize> {
        let parent = self.parent(node)?;
        (0..self.child_count(parent)).find(|&i| self.child(parent, i) == Some(node))
    }

    /// Largest valid offset inside `node`: character count for text,
    /// child count for elements.
    fn offset_limit(&self, node: Self::Node) -> usize;
}

/// Arena index of a node in a [`NodeTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// Payload of a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Element {
        tag: String,
        attrs: Vec<(String, String)>,
    },
    Text(String),
}

impl NodeKind {
    #[must_use]
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element {
            tag: tag.into(),
            attrs: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed mutable document tree.
#[derive(Debug, Clone)]
pub struct NodeTree {
    nodes: Vec<NodeData>,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Tag of the implicit root container.
pub const ROOT_TAG: &str = "root";

impl NodeTree {
    /// A tree holding only the root container.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData {
                kind: NodeKind::element(ROOT_TAG),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// A tree whose root holds one text node with `text`.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let mut tree = Self::new();
        let id = NodeId(1);
        tree.nodes.push(NodeData {
            kind: NodeKind::Text(text.into()),
            parent: Some(tree.root()),
            children: Vec::new(),
        });
        tree.nodes[0].children.push(id);
        tree
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    // ====================================================================
    // Accessors
    // ====================================================================

    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    /// Children of `id`; empty for text nodes and unknown ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    #[must_use]
    pub fn text(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    #[must_use]
    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        match self.kind(id)? {
            NodeKind::Element { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            NodeKind::Text(_) => None,
        }
    }

    /// True if `id` is reachable from the root.
    #[must_use]
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut cursor = Some(id);
        while let Some(node) = cursor {
            if node == self.root() {
                return true;
            }
            cursor = self.parent(node);
        }
        false
    }

    /// Concatenated text of every text node below `id`, in document order.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.collect_text(id, &mut out);
        out
    }

    fn collect_text(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element { .. }) => {
                for &child in self.children(id) {
                    self.collect_text(child, out);
                }
            }
            None => {}
        }
    }

    /// Text of the whole document with line breaks at block boundaries.
    ///
    /// Block elements (`p`, `div`, `li`, headings) end a line and `br` is a
    /// line break, so the first line of a note is its first block.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_lines(self.root(), &mut out);
        out
    }

    fn collect_lines(&self, id: NodeId, out: &mut String) {
        match self.kind(id) {
            Some(NodeKind::Text(text)) => out.push_str(text),
            Some(NodeKind::Element { tag, .. }) => {
                if tag == "br" {
                    out.push('\n');
                    return;
                }
                for &child in self.children(id) {
                    self.collect_lines(child, out);
                }
                if is_block(tag) && !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            None => {}
        }
    }

    // ====================================================================
    // Mutation
    // ====================================================================

    /// Append a new element under `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: impl Into<String>) -> Result<NodeId, TreeError> {
        let len = self.element_children(parent)?.len();
        self.insert(parent, len, NodeKind::element(tag))
    }

    /// Append a new text node under `parent`.
    pub fn append_text(&mut self, parent: NodeId, text: impl Into<String>) -> Result<NodeId, TreeError> {
        let len = self.element_children(parent)?.len();
        self.insert(parent, len, NodeKind::Text(text.into()))
    }

    /// Insert a new node at `index` among `parent`'s children.
    pub fn insert(&mut self, parent: NodeId, index: usize, kind: NodeKind) -> Result<NodeId, TreeError> {
        let len = self.element_children(parent)?.len();
        if index > len {
            return Err(TreeError::IndexOutOfRange { index, len });
        }
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.index()].children.insert(index, id);
        Ok(id)
    }

    /// Replace the text of a text node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) -> Result<(), TreeError> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Text(existing)) => {
                *existing = text.into();
                Ok(())
            }
            Some(NodeKind::Element { .. }) => Err(TreeError::NotText(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    /// Set or replace an attribute on an element.
    pub fn set_attr(&mut self, id: NodeId, name: impl Into<String>, value: impl Into<String>) -> Result<(), TreeError> {
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Element { attrs, .. }) => {
                let name = name.into();
                let value = value.into();
                match attrs.iter_mut().find(|(k, _)| *k == name) {
                    Some(slot) => slot.1 = value,
                    None => attrs.push((name, value)),
                }
                Ok(())
            }
            Some(NodeKind::Text(_)) => Err(TreeError::NotAnElement(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    /// Change an element's tag, keeping attributes and children.
    pub fn rename(&mut self, id: NodeId, tag: impl Into<String>) -> Result<(), TreeError> {
        if id == self.root() {
            return Err(TreeError::RootImmovable);
        }
        match self.nodes.get_mut(id.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Element { tag: existing, .. }) => {
                *existing = tag.into();
                Ok(())
            }
            Some(NodeKind::Text(_)) => Err(TreeError::NotAnElement(id)),
            None => Err(TreeError::UnknownNode(id)),
        }
    }

    /// Remove `id` from its parent. The subtree stays in the arena but is
    /// no longer reachable from the root.
    pub fn detach(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root() {
            return Err(TreeError::RootImmovable);
        }
        let parent = self
            .nodes
            .get(id.index())
            .ok_or(TreeError::UnknownNode(id))?
            .parent;
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.retain(|&c| c != id);
            self.nodes[id.index()].parent = None;
        }
        Ok(())
    }

    /// Replace `id` in its parent with a new `tag` element that contains it.
    pub fn wrap(&mut self, id: NodeId, tag: impl Into<String>) -> Result<NodeId, TreeError> {
        if id == self.root() {
            return Err(TreeError::RootImmovable);
        }
        let parent = self.parent(id).ok_or(TreeError::UnknownNode(id))?;
        let index = self.nodes[parent.index()]
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or(TreeError::UnknownNode(id))?;

        let wrapper = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData {
            kind: NodeKind::element(tag),
            parent: Some(parent),
            children: vec![id],
        });
        self.nodes[parent.index()].children[index] = wrapper;
        self.nodes[id.index()].parent = Some(wrapper);
        Ok(wrapper)
    }

    /// Move every child of `id` into its parent at `id`'s position and
    /// detach `id`.
    pub fn unwrap_element(&mut self, id: NodeId) -> Result<(), TreeError> {
        if id == self.root() {
            return Err(TreeError::RootImmovable);
        }
        let parent = self.parent(id).ok_or(TreeError::UnknownNode(id))?;
        let index = self.nodes[parent.index()]
            .children
            .iter()
            .position(|&c| c == id)
            .ok_or(TreeError::UnknownNode(id))?;
        let children = std::mem::take(&mut self.nodes[id.index()].children);
        for &child in &children {
            self.nodes[child.index()].parent = Some(parent);
        }
        let siblings = &mut self.nodes[parent.index()].children;
        siblings.remove(index);
        for (offset, child) in children.into_iter().enumerate() {
            siblings.insert(index + offset, child);
        }
        self.nodes[id.index()].parent = None;
        Ok(())
    }

    fn element_children(&self, id: NodeId) -> Result<&Vec<NodeId>, TreeError> {
        let node = self.nodes.get(id.index()).ok_or(TreeError::UnknownNode(id))?;
        match node.kind {
            NodeKind::Element { .. } => Ok(&node.children),
            NodeKind::Text(_) => Err(TreeError::NotAnElement(id)),
        }
    }
}

impl DocumentTree for NodeTree {
    type Node = NodeId;

    fn root(&self) -> NodeId {
        NodeTree::root(self)
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        NodeTree::parent(self, node)
    }

    fn child_count(&self, node: NodeId) -> usize {
        self.children(node).len()
    }

    fn child(&self, node: NodeId, index: usize) -> Option<NodeId> {
        self.children(node).get(index).copied()
    }

    fn child_index(&self, node: NodeId) -> Option<usize> {
        let parent = NodeTree::parent(self, node)?;
        self.children(parent).iter().position(|&c| c == node)
    }

    fn offset_limit(&self, node: NodeId) -> usize {
        match self.kind(node) {
            Some(NodeKind::Text(text)) => text.chars().count(),
            Some(NodeKind::Element { .. }) => self.children(node).len(),
            None => 0,
        }
    }
}

pub(crate) fn is_block(tag: &str) -> bool {
    matches!(
        tag,
        "p" | "div" | "li" | "ul" | "ol" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "blockquote"
    )
}
