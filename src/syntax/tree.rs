//! Arena-backed syntax tree.
//!
//! Nodes live in a single vector and are addressed by [`NodeId`]. Ids stay
//! stable across in-place edits (`set_text`, `insert_child`,
//! `remove_subtree`), which is what lets a section keep its identity, and
//! therefore its cache, while the user types inside it.

use std::fmt;

use smol_str::SmolStr;

use super::kind::NodeKind;
use crate::base::{TextRange, TextSize};

/// Handle to a node inside one [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    const fn from_index(index: usize) -> Self {
        Self(index as u32)
    }

    #[inline]
    const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

#[derive(Clone, Debug)]
struct NodeData {
    kind: NodeKind,
    text: SmolStr,
    range: TextRange,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    /// Cleared when the node is removed; ids are never reused.
    live: bool,
}

/// A document's syntax tree.
#[derive(Clone, Debug)]
pub struct SyntaxTree {
    nodes: Vec<NodeData>,
}

impl Default for SyntaxTree {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxTree {
    /// Create a tree holding only a `File` root.
    pub fn new() -> Self {
        let root = NodeData {
            kind: NodeKind::File,
            text: SmolStr::default(),
            range: TextRange::empty(TextSize::from(0)),
            parent: None,
            children: Vec::new(),
            live: true,
        };
        Self { nodes: vec![root] }
    }

    /// The `File` root.
    pub fn root(&self) -> NodeId {
        NodeId::from_index(0)
    }

    /// Get a view of a live node.
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.data(id).map(|_| NodeRef { tree: self, id })
    }

    /// View of the root node.
    pub fn root_node(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root(),
        }
    }

    /// Number of live nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.live).count()
    }

    /// Slots held by removed nodes.
    ///
    /// Ids are never reused, so edits only grow the arena. A reparse
    /// builds a fresh tree and starts again from zero.
    pub fn removed_len(&self) -> usize {
        self.nodes.len() - self.len()
    }

    /// A tree always has its root.
    pub fn is_empty(&self) -> bool {
        false
    }

    fn data(&self, id: NodeId) -> Option<&NodeData> {
        self.nodes.get(id.index()).filter(|n| n.live)
    }

    fn data_mut(&mut self, id: NodeId) -> Option<&mut NodeData> {
        self.nodes.get_mut(id.index()).filter(|n| n.live)
    }

    // ========================================================================
    // CONSTRUCTION & EDITING
    // ========================================================================

    /// Append a new child at the end of `parent`'s children.
    ///
    /// Returns `None` if `parent` is not a live node.
    pub fn push(
        &mut self,
        parent: NodeId,
        kind: NodeKind,
        text: impl Into<SmolStr>,
        range: TextRange,
    ) -> Option<NodeId> {
        let position = self.data(parent)?.children.len();
        self.insert_child(parent, position, kind, text, range)
    }

    /// Insert a new child at `position` (clamped to the child count).
    pub fn insert_child(
        &mut self,
        parent: NodeId,
        position: usize,
        kind: NodeKind,
        text: impl Into<SmolStr>,
        range: TextRange,
    ) -> Option<NodeId> {
        self.data(parent)?;
        let id = NodeId::from_index(self.nodes.len());
        self.nodes.push(NodeData {
            kind,
            text: text.into(),
            range,
            parent: Some(parent),
            children: Vec::new(),
            live: true,
        });
        let children = &mut self.data_mut(parent)?.children;
        let position = position.min(children.len());
        children.insert(position, id);
        Some(id)
    }

    /// Replace a node's text. Returns the edited node.
    pub fn set_text(&mut self, id: NodeId, text: impl Into<SmolStr>) -> Option<NodeId> {
        self.data_mut(id)?.text = text.into();
        Some(id)
    }

    /// Detach a node and everything below it. Returns the former parent.
    ///
    /// The root cannot be removed. Removed slots keep no text or children
    /// but stay in the arena; see [`removed_len`](Self::removed_len).
    pub fn remove_subtree(&mut self, id: NodeId) -> Option<NodeId> {
        let parent = self.data(id)?.parent?;
        if let Some(data) = self.data_mut(parent) {
            data.children.retain(|&child| child != id);
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(data) = self.nodes.get_mut(current.index()) {
                data.live = false;
                data.text = SmolStr::default();
                stack.extend(data.children.drain(..));
            }
        }
        Some(parent)
    }
}

/// Borrowed view of one node.
#[derive(Clone, Copy)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    fn data(&self) -> &'t NodeData {
        // A NodeRef is only handed out for live nodes of an immutably
        // borrowed tree.
        &self.tree.nodes[self.id.index()]
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> NodeKind {
        self.data().kind
    }

    pub fn text(&self) -> &'t str {
        self.data().text.as_str()
    }

    pub fn range(&self) -> TextRange {
        self.data().range
    }

    pub fn tree(&self) -> &'t SyntaxTree {
        self.tree
    }

    pub fn parent(&self) -> Option<NodeRef<'t>> {
        self.data().parent.and_then(|p| self.tree.node(p))
    }

    /// Direct children in document order.
    pub fn children(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        self.data()
            .children
            .iter()
            .filter_map(move |&child| tree.node(child))
    }

    /// Direct children of one kind.
    pub fn children_of_kind(self, kind: NodeKind) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().filter(move |child| child.kind() == kind)
    }

    pub fn first_child_of_kind(&self, kind: NodeKind) -> Option<NodeRef<'t>> {
        self.children_of_kind(kind).next()
    }

    /// Strict ancestors, nearest first.
    pub fn ancestors(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        std::iter::successors(self.parent(), |node| node.parent())
    }

    /// Pre-order walk of the subtree, self included.
    pub fn descendants(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        let tree = self.tree;
        let mut stack = vec![self.id];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = tree.node(id)?;
            stack.extend(node.data().children.iter().rev().copied());
            Some(node)
        })
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{:?} {:?}", self.kind(), self.id, self.text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::ImportType;

    fn at(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::from(start), TextSize::from(end))
    }

    #[test]
    fn test_push_and_navigate() {
        let mut tree = SyntaxTree::new();
        let heading = tree
            .push(tree.root(), NodeKind::Heading, "*** Settings ***", at(0, 16))
            .unwrap();
        let import = tree
            .push(heading, NodeKind::Import(ImportType::Library), "Library", at(17, 24))
            .unwrap();
        let arg = tree
            .push(import, NodeKind::Argument, "Collections", at(28, 39))
            .unwrap();

        let node = tree.node(arg).unwrap();
        assert_eq!(node.text(), "Collections");
        assert_eq!(node.parent().unwrap().id(), import);
        let ancestors: Vec<_> = node.ancestors().map(|n| n.id()).collect();
        assert_eq!(ancestors, vec![import, heading, tree.root()]);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let empty = TextRange::default();
        let a = tree.push(root, NodeKind::Heading, "a", empty).unwrap();
        let a1 = tree.push(a, NodeKind::Definition, "a1", empty).unwrap();
        let b = tree.push(root, NodeKind::Heading, "b", empty).unwrap();
        let a2 = tree.push(a, NodeKind::Definition, "a2", empty).unwrap();

        let order: Vec<_> = tree.root_node().descendants().map(|n| n.id()).collect();
        assert_eq!(order, vec![root, a, a1, a2, b]);
    }

    #[test]
    fn test_insert_child_clamps_position() {
        let mut tree = SyntaxTree::new();
        let root = tree.root();
        let empty = TextRange::default();
        let first = tree.push(root, NodeKind::Comment, "first", empty).unwrap();
        let front = tree.insert_child(root, 0, NodeKind::Comment, "front", empty).unwrap();
        let back = tree.insert_child(root, 99, NodeKind::Comment, "back", empty).unwrap();

        let order: Vec<_> = tree.root_node().children().map(|n| n.id()).collect();
        assert_eq!(order, vec![front, first, back]);
    }

    #[test]
    fn test_remove_subtree_kills_descendants() {
        let mut tree = SyntaxTree::new();
        let empty = TextRange::default();
        let heading = tree.push(tree.root(), NodeKind::Heading, "h", empty).unwrap();
        let def = tree.push(heading, NodeKind::Definition, "d", empty).unwrap();
        let stmt = tree.push(def, NodeKind::KeywordStatement, "", empty).unwrap();

        assert_eq!(tree.remove_subtree(def), Some(heading));
        assert!(tree.node(def).is_none());
        assert!(tree.node(stmt).is_none());
        assert_eq!(tree.node(heading).unwrap().children().count(), 0);
        assert!(tree.remove_subtree(tree.root()).is_none());
        assert!(tree.set_text(def, "x").is_none());
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.removed_len(), 2);
    }
}
