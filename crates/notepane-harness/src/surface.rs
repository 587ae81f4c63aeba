#![forbid(unsafe_code)]

//! In-process editable surface backed by a [`NodeTree`].
//!
//! [`MemorySurface`] plays the role a `contenteditable` element plays in a
//! browser host: it holds the live tree and the selection, accepts typed
//! text, and executes formatting commands with simple tree edits:
//!
//! | Command                  | Effect                                            |
//! |--------------------------|---------------------------------------------------|
//! | `Bold`/`Italic`/`Underline` | wrap the caret's text node in `b`/`i`/`u`, or unwrap it if already wrapped |
//! | `InsertUnorderedList`/`InsertOrderedList` | wrap the caret's block in `li` + `ul`/`ol`; switch list type; same type removes the list |
//! | `Justify*`               | set `data-align` on the caret's block             |
//! | `SetTextSize`            | surface-level state, content untouched            |
//!
//! The surface never emits events. Callers feed
//! [`SurfaceEvent`](notepane_editor::SurfaceEvent)s to the session after
//! editing it, the way a host forwards its `input` notifications.

use notepane_doc::{
    DocumentTree, MarkupError, NodeId, NodeKind, NodeTree, PathError, SelectionRange, TreeError,
    resolve_path,
};
use notepane_editor::{DocumentMutator, EditableSurface, MutationError, PortCommand, TextSize};
use notepane_history::SerializedDocument;
use tracing::{trace, warn};

/// Attribute written by the justify commands.
pub const ALIGN_ATTR: &str = "data-align";

/// Reference [`EditableSurface`] and [`DocumentMutator`].
#[derive(Debug, Clone, Default)]
pub struct MemorySurface {
    tree: NodeTree,
    selection: Option<SelectionRange<NodeId>>,
    text_size: TextSize,
    executed: Vec<PortCommand>,
}

impl MemorySurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface showing `markup`, caret at the end of its text.
    pub fn from_markup(markup: &str) -> Result<Self, MarkupError> {
        let mut surface = Self::new();
        surface.replace_markup(markup)?;
        Ok(surface)
    }

    // ====================================================================
    // Host-side edits
    // ====================================================================

    /// Replace the whole document, as a paste-over-everything edit would.
    /// The caret moves to the end of the new text.
    pub fn replace_markup(&mut self, markup: &str) -> Result<(), MarkupError> {
        self.tree = NodeTree::from_markup(markup)?;
        self.selection = self.end_caret();
        Ok(())
    }

    /// Insert `text` at the selection start, as typing would, and leave the
    /// caret after it. Without a selection the text goes at the end of the
    /// document.
    pub fn type_text(&mut self, text: &str) -> Result<(), TreeError> {
        if text.is_empty() {
            return Ok(());
        }
        let (node, offset) = self.text_caret()?;
        let current = self.tree.text(node).unwrap_or_default();
        let byte = byte_offset(current, offset);
        let mut updated = String::with_capacity(current.len() + text.len());
        updated.push_str(&current[..byte]);
        updated.push_str(text);
        updated.push_str(&current[byte..]);
        self.tree.set_text(node, updated)?;
        self.selection = Some(SelectionRange::caret(node, offset + text.chars().count()));
        Ok(())
    }

    /// Place a collapsed caret at `offset` inside the node at `path`.
    pub fn select_path(&mut self, path: &[usize], offset: usize) -> Result<(), PathError> {
        let node = resolve_path(&self.tree, path)?;
        let offset = offset.min(self.tree.offset_limit(node));
        self.selection = Some(SelectionRange::caret(node, offset));
        Ok(())
    }

    pub fn select(&mut self, range: SelectionRange<NodeId>) {
        self.selection = Some(range);
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
    }

    // ====================================================================
    // Inspection
    // ====================================================================

    #[must_use]
    pub fn markup(&self) -> String {
        self.tree.to_markup()
    }

    #[must_use]
    pub fn plain_text(&self) -> String {
        self.tree.plain_text()
    }

    #[must_use]
    pub fn text_size(&self) -> TextSize {
        self.text_size
    }

    /// Port commands that succeeded, oldest first.
    #[must_use]
    pub fn executed(&self) -> &[PortCommand] {
        &self.executed
    }

    // ====================================================================
    // Internals
    // ====================================================================

    fn last_text(&self) -> Option<NodeId> {
        let mut last = None;
        let mut stack = vec![self.tree.root()];
        while let Some(id) = stack.pop() {
            if self.tree.text(id).is_some() {
                last = Some(id);
            }
            stack.extend(self.tree.children(id).iter().rev().copied());
        }
        last
    }

    fn end_caret(&self) -> Option<SelectionRange<NodeId>> {
        self.last_text()
            .map(|node| SelectionRange::caret(node, self.tree.offset_limit(node)))
    }

    /// Text node and char offset that typed text lands in, creating an
    /// empty text node if the caret sits between elements.
    fn text_caret(&mut self) -> Result<(NodeId, usize), TreeError> {
        let root = self.tree.root();
        let point = match self.selection.or_else(|| self.end_caret()) {
            Some(range) => range.start,
            None => SelectionRange::caret(root, self.tree.children(root).len()).start,
        };
        if self.tree.text(point.node).is_some() {
            return Ok((point.node, point.offset.min(self.tree.offset_limit(point.node))));
        }

        let children = self.tree.children(point.node).to_vec();
        let index = point.offset.min(children.len());
        if let Some(&prev) = index.checked_sub(1).and_then(|i| children.get(i))
            && self.tree.text(prev).is_some()
        {
            return Ok((prev, self.tree.offset_limit(prev)));
        }
        if let Some(&next) = children.get(index)
            && self.tree.text(next).is_some()
        {
            return Ok((next, 0));
        }
        let container = if point.node == root {
            self.tree.insert(root, index, NodeKind::element("p"))?
        } else {
            point.node
        };
        let at = if container == point.node { index } else { 0 };
        let text = self.tree.insert(container, at, NodeKind::Text(String::new()))?;
        Ok((text, 0))
    }

    /// Top-level child of the root that contains the selection start.
    fn caret_block(&self, command: PortCommand) -> Result<NodeId, MutationError> {
        let range = self.selection.ok_or(MutationError::NoSelection(command))?;
        let root = self.tree.root();
        let mut node = range.start.node;
        if node == root {
            let children = self.tree.children(root);
            return children
                .get(range.start.offset)
                .or(children.last())
                .copied()
                .ok_or(MutationError::NoSelection(command));
        }
        while let Some(parent) = self.tree.parent(node) {
            if parent == root {
                return Ok(node);
            }
            node = parent;
        }
        Err(MutationError::NoSelection(command))
    }

    fn toggle_inline(&mut self, command: PortCommand, tag: &str) -> Result<(), MutationError> {
        let range = self.selection.ok_or(MutationError::NoSelection(command))?;
        let node = range.start.node;
        if self.tree.text(node).is_none() {
            return Err(MutationError::Rejected {
                command,
                reason: "selection is not inside text".into(),
            });
        }
        let wrapper = self
            .tree
            .parent(node)
            .filter(|&parent| self.tree.tag(parent) == Some(tag) && self.tree.children(parent).len() == 1);
        let result = match wrapper {
            Some(parent) => self.tree.unwrap_element(parent),
            None => self.tree.wrap(node, tag).map(drop),
        };
        result.map_err(|err| rejected(command, &err))
    }

    fn toggle_list(&mut self, command: PortCommand, list_tag: &str) -> Result<(), MutationError> {
        let block = self.caret_block(command)?;
        let current = self.tree.tag(block).map(str::to_owned);
        let result = match current.as_deref() {
            Some(tag) if tag == list_tag => self.remove_list(block),
            Some("ul" | "ol") => self.tree.rename(block, list_tag),
            _ => self
                .tree
                .wrap(block, "li")
                .and_then(|item| self.tree.wrap(item, list_tag))
                .map(drop),
        };
        result.map_err(|err| rejected(command, &err))
    }

    fn remove_list(&mut self, list: NodeId) -> Result<(), TreeError> {
        let items = self.tree.children(list).to_vec();
        for item in items {
            if self.tree.tag(item) == Some("li") {
                self.tree.unwrap_element(item)?;
            }
        }
        self.tree.unwrap_element(list)
    }

    fn align(&mut self, command: PortCommand, value: &str) -> Result<(), MutationError> {
        let mut block = self.caret_block(command)?;
        if self.tree.text(block).is_some() {
            block = self.tree.wrap(block, "p").map_err(|err| rejected(command, &err))?;
        }
        self.tree
            .set_attr(block, ALIGN_ATTR, value)
            .map_err(|err| rejected(command, &err))
    }

    /// Move a selection left inside a removed wrapper back into the document.
    fn repair_selection(&mut self) {
        if let Some(range) = self.selection
            && !(self.tree.is_attached(range.start.node) && self.tree.is_attached(range.end.node))
        {
            trace!("selection pointed into a removed node; moving caret to end");
            self.selection = self.end_caret();
        }
    }
}

fn rejected(command: PortCommand, err: &TreeError) -> MutationError {
    MutationError::Rejected {
        command,
        reason: err.to_string(),
    }
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices().nth(chars).map_or(text.len(), |(i, _)| i)
}

impl EditableSurface for MemorySurface {
    type Tree = NodeTree;

    fn serialized_content(&self) -> SerializedDocument {
        self.tree.to_markup().into()
    }

    fn set_serialized_content(&mut self, content: &SerializedDocument) {
        self.tree = match NodeTree::from_markup(content.as_str()) {
            Ok(tree) => tree,
            Err(err) => {
                warn!(%err, "content is not valid markup; loading it as text");
                NodeTree::from_text(content.as_str())
            }
        };
        self.selection = None;
    }

    fn tree(&self) -> &NodeTree {
        &self.tree
    }

    fn selection(&self) -> Option<SelectionRange<NodeId>> {
        self.selection
    }

    fn set_selection(&mut self, range: SelectionRange<NodeId>) {
        self.selection = Some(range);
    }

    /// Caret at the start of the document.
    fn collapse_selection(&mut self) {
        self.selection = Some(SelectionRange::caret(self.tree.root(), 0));
    }
}

impl DocumentMutator for MemorySurface {
    fn execute(&mut self, command: PortCommand) -> Result<(), MutationError> {
        let result = match command {
            PortCommand::Bold => self.toggle_inline(command, "b"),
            PortCommand::Italic => self.toggle_inline(command, "i"),
            PortCommand::Underline => self.toggle_inline(command, "u"),
            PortCommand::InsertUnorderedList => self.toggle_list(command, "ul"),
            PortCommand::InsertOrderedList => self.toggle_list(command, "ol"),
            PortCommand::JustifyLeft => self.align(command, "left"),
            PortCommand::JustifyCenter => self.align(command, "center"),
            PortCommand::JustifyRight => self.align(command, "right"),
            PortCommand::SetTextSize(size) => {
                self.text_size = size;
                Ok(())
            }
        };
        if result.is_ok() {
            self.repair_selection();
            self.executed.push(command);
            trace!(?command, "memory surface command applied");
        }
        result
    }
}
