//! Tree nodes and the read-only node view.

use slotmap::{new_key_type, SlotMap};

use crate::{EntryKey, PartitionEntry, Sphere};

new_key_type! {
    /// Arena index of a tree node. Never leaves the crate.
    pub(crate) struct NodeId;
}

pub(crate) type NodeArena<C> = SlotMap<NodeId, Node<C>>;

/// What a node holds besides its bound.
#[derive(Debug, Clone)]
pub(crate) enum NodeKind<C> {
    /// Exactly one client entry, addressed by `key`.
    Leaf { key: EntryKey, entry: PartitionEntry<C> },
    /// Exactly two children, exclusively owned by this node.
    Internal { left: NodeId, right: NodeId },
}

/// A node in the bounding-sphere hierarchy.
///
/// A leaf's bound is its entry's sphere; an internal node's bound is the
/// merge of its children's bounds.
#[derive(Debug, Clone)]
pub(crate) struct Node<C> {
    pub(crate) bound: Sphere,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind<C>,
}

impl<C> Node<C> {
    pub(crate) fn leaf(key: EntryKey, entry: PartitionEntry<C>) -> Self {
        Self {
            bound: entry.bound,
            parent: None,
            kind: NodeKind::Leaf { key, entry },
        }
    }

    pub(crate) fn internal(bound: Sphere, left: NodeId, right: NodeId) -> Self {
        Self {
            bound,
            parent: None,
            kind: NodeKind::Internal { left, right },
        }
    }

    #[inline]
    pub(crate) fn children(&self) -> Option<(NodeId, NodeId)> {
        match self.kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            NodeKind::Leaf { .. } => None,
        }
    }
}

/// Read-only view of a node, for debug drawing and inspection.
///
/// Obtained from [`SphereTree::root`](crate::SphereTree::root). The view
/// borrows the tree, so the tree cannot change while it is alive.
pub struct NodeRef<'a, C> {
    arena: &'a NodeArena<C>,
    id: NodeId,
}

impl<C> Clone for NodeRef<'_, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C> Copy for NodeRef<'_, C> {}

impl<'a, C> NodeRef<'a, C> {
    pub(crate) fn new(arena: &'a NodeArena<C>, id: NodeId) -> Self {
        Self { arena, id }
    }

    #[inline]
    fn node(&self) -> &'a Node<C> {
        &self.arena[self.id]
    }

    /// Returns the bounding sphere of this subtree.
    #[inline]
    pub fn bound(&self) -> Sphere {
        self.node().bound
    }

    /// Checks if this node holds an entry rather than two children.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.node().kind, NodeKind::Leaf { .. })
    }

    /// Returns the entry stored in a leaf.
    pub fn entry(&self) -> Option<&'a PartitionEntry<C>> {
        match &self.node().kind {
            NodeKind::Leaf { entry, .. } => Some(entry),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Returns the key of the entry stored in a leaf.
    pub fn key(&self) -> Option<EntryKey> {
        match &self.node().kind {
            NodeKind::Leaf { key, .. } => Some(*key),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Returns the `(left, right)` children of an internal node.
    pub fn children(&self) -> Option<(NodeRef<'a, C>, NodeRef<'a, C>)> {
        self.node()
            .children()
            .map(|(left, right)| (NodeRef::new(self.arena, left), NodeRef::new(self.arena, right)))
    }

    /// Returns the left child of an internal node.
    #[inline]
    pub fn left(&self) -> Option<NodeRef<'a, C>> {
        self.children().map(|(left, _)| left)
    }

    /// Returns the right child of an internal node.
    #[inline]
    pub fn right(&self) -> Option<NodeRef<'a, C>> {
        self.children().map(|(_, right)| right)
    }

    /// Returns the parent node, `None` for the root.
    pub fn parent(&self) -> Option<NodeRef<'a, C>> {
        self.node().parent.map(|id| NodeRef::new(self.arena, id))
    }

    /// Returns the number of entries in this subtree.
    pub fn leaf_count(&self) -> usize {
        match self.children() {
            Some((left, right)) => left.leaf_count() + right.leaf_count(),
            None => 1,
        }
    }

    /// Returns the number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.node_count() + right.node_count(),
            None => 1,
        }
    }

    /// Returns the depth of this subtree (1 for a leaf node).
    pub fn depth(&self) -> usize {
        match self.children() {
            Some((left, right)) => 1 + left.depth().max(right.depth()),
            None => 1,
        }
    }
}
