//! Bounding-sphere tree container and incremental maintenance.

use log::{debug, trace, warn};
use slotmap::{Key, SlotMap};

use crate::{
    EntryKey, Frustum, InvariantViolation, PartitionEntry, PartitionError, PartitionResult,
    QueryStats, Ray, SpatialPartition, Sphere, TreeConfig, UpdatePolicy,
};

use super::node::{Node, NodeArena, NodeId, NodeKind, NodeRef};
use super::selector::{ChildSelector, Side, VolumeGrowth};

/// A dynamic binary tree of bounding spheres over client entries.
///
/// Every leaf holds one [`PartitionEntry`]; every internal node holds two
/// children and the merge of their bounds. The tree is maintained
/// incrementally: each [`insert`](Self::insert), [`update`](Self::update)
/// and [`remove`](Self::remove) restructures only the path from the
/// touched leaf to the root.
///
/// # Insertion
///
/// A new entry descends from the root, and at each internal node the
/// [`ChildSelector`] picks the child to continue into (by default the one
/// whose volume grows least). The leaf it lands on is split into an
/// internal node holding the old leaf and the new one. No rebalancing is
/// performed.
///
/// # Keys
///
/// Each entry is addressed by an [`EntryKey`], which resolves to its leaf
/// in O(1). Stale keys are rejected with [`PartitionError::InvalidKey`]
/// before anything is modified.
///
/// # Queries
///
/// Ray casts, frustum casts and self-queries prune whole subtrees whose
/// bound fails the test. Each query counts its primitive tests in a
/// caller-owned [`QueryStats`].
#[derive(Debug, Clone)]
pub struct SphereTree<C, S = VolumeGrowth> {
    pub(crate) nodes: NodeArena<C>,
    keys: SlotMap<EntryKey, NodeId>,
    pub(crate) root: Option<NodeId>,
    selector: S,
    config: TreeConfig,
}

impl<C> Default for SphereTree<C, VolumeGrowth> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SphereTree<C, VolumeGrowth> {
    /// Creates an empty tree with the default configuration.
    pub fn new() -> Self {
        Self::with_config(TreeConfig::default())
    }

    /// Creates an empty tree with the given configuration.
    pub fn with_config(config: TreeConfig) -> Self {
        Self::with_selector(VolumeGrowth, config)
    }
}

impl<C, S: ChildSelector> SphereTree<C, S> {
    /// Creates an empty tree that places new entries with `selector`.
    pub fn with_selector(selector: S, config: TreeConfig) -> Self {
        let capacity = config.initial_capacity;
        Self {
            // A tree with n leaves has 2n - 1 nodes.
            nodes: SlotMap::with_capacity_and_key((2 * capacity).saturating_sub(1)),
            keys: SlotMap::with_capacity_and_key(capacity),
            root: None,
            selector,
            config,
        }
    }

    #[inline]
    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// Returns `true` if the tree contains no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns the number of nodes, leaves and internal nodes together.
    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the maximum depth of the tree (0 for empty tree).
    pub fn depth(&self) -> usize {
        self.root().map_or(0, |root| root.depth())
    }

    /// Returns a read-only view of the root node, if any.
    pub fn root(&self) -> Option<NodeRef<'_, C>> {
        self.root.map(|id| NodeRef::new(&self.nodes, id))
    }

    /// Returns `true` if `key` addresses a live entry.
    #[inline]
    pub fn contains_key(&self, key: EntryKey) -> bool {
        self.keys.contains_key(key)
    }

    /// Returns the entry behind `key`, if it is live.
    pub fn get(&self, key: EntryKey) -> Option<&PartitionEntry<C>> {
        let leaf = *self.keys.get(key)?;
        match &self.nodes[leaf].kind {
            NodeKind::Leaf { entry, .. } => Some(entry),
            NodeKind::Internal { .. } => None,
        }
    }

    /// Iterates over every live entry and its key. Order is unspecified.
    pub fn entries(&self) -> impl Iterator<Item = (EntryKey, &PartitionEntry<C>)> + '_ {
        self.keys.iter().filter_map(|(key, &leaf)| match &self.nodes[leaf].kind {
            NodeKind::Leaf { entry, .. } => Some((key, entry)),
            NodeKind::Internal { .. } => None,
        })
    }

    /// Removes every entry and invalidates every key.
    pub fn clear(&mut self) {
        trace!("clearing sphere tree with {} entries", self.keys.len());
        self.nodes.clear();
        self.keys.clear();
        self.root = None;
    }

    /// Adds an entry and returns the key that addresses it.
    ///
    /// Never fails. Zero-radius spheres are accepted.
    pub fn insert(&mut self, entry: PartitionEntry<C>) -> EntryKey {
        let key = self.keys.insert(NodeId::null());
        let leaf = self.attach_leaf(key, entry);
        self.keys[key] = leaf;
        trace!(
            "inserted {:?}: {} entries, {} nodes",
            key,
            self.keys.len(),
            self.nodes.len()
        );
        key
    }

    /// Removes the entry behind `key` and returns it.
    ///
    /// The key is invalid afterwards. Fails without modifying the tree if
    /// `key` is stale or was never issued by this tree.
    pub fn remove(&mut self, key: EntryKey) -> PartitionResult<PartitionEntry<C>> {
        let Some(leaf) = self.keys.remove(key) else {
            warn!("remove rejected stale key {:?}", key);
            return Err(PartitionError::InvalidKey(key));
        };
        let entry = self.detach_leaf(leaf);
        trace!(
            "removed {:?}: {} entries, {} nodes",
            key,
            self.keys.len(),
            self.nodes.len()
        );
        Ok(entry)
    }

    /// Replaces the entry behind `key` with `entry`.
    ///
    /// Behaves like a removal followed by an insertion that hands back the
    /// same key. With [`UpdatePolicy::RefitInPlace`] the leaf keeps its
    /// position when the new sphere still fits inside its parent's bound.
    /// Either way every bound is exact afterwards, so queries see the same
    /// result. Fails without modifying the tree if `key` is stale.
    pub fn update(&mut self, key: EntryKey, entry: PartitionEntry<C>) -> PartitionResult<()> {
        let Some(&leaf) = self.keys.get(key) else {
            warn!("update rejected stale key {:?}", key);
            return Err(PartitionError::InvalidKey(key));
        };

        if self.config.update_policy == UpdatePolicy::RefitInPlace
            && self.fits_in_place(leaf, &entry.bound)
        {
            debug!("refitting {:?} in place", key);
            let node = &mut self.nodes[leaf];
            node.bound = entry.bound;
            if let NodeKind::Leaf { entry: slot, .. } = &mut node.kind {
                *slot = entry;
            }
            let parent = node.parent;
            if let Some(parent) = parent {
                self.refit_from(parent);
            }
            return Ok(());
        }

        self.detach_leaf(leaf);
        let leaf = self.attach_leaf(key, entry);
        self.keys[key] = leaf;
        trace!("reinserted {:?}", key);
        Ok(())
    }

    /// Checks every structural and bound invariant of the tree.
    ///
    /// Walks the whole tree, so it is meant for tests and debugging.
    pub fn validate(&self) -> Result<(), InvariantViolation> {
        let mut reachable = 0;
        let mut leaves = 0;

        if let Some(root) = self.root {
            if self.nodes[root].parent.is_some() {
                return Err(InvariantViolation::BrokenParentLink);
            }
            self.validate_node(root, &mut reachable, &mut leaves)?;
        }

        if leaves != self.keys.len() {
            return Err(InvariantViolation::KeyMapMismatch {
                mapped: self.keys.len(),
                reachable: leaves,
            });
        }
        if reachable != self.nodes.len() {
            return Err(InvariantViolation::OrphanNodes {
                stored: self.nodes.len(),
                reachable,
            });
        }
        Ok(())
    }

    fn validate_node(
        &self,
        id: NodeId,
        reachable: &mut usize,
        leaves: &mut usize,
    ) -> Result<(), InvariantViolation> {
        *reachable += 1;
        let node = &self.nodes[id];

        match &node.kind {
            NodeKind::Leaf { key, entry } => {
                *leaves += 1;
                if node.bound != entry.bound {
                    return Err(InvariantViolation::LeafBoundMismatch);
                }
                if self.keys.get(*key) != Some(&id) {
                    return Err(InvariantViolation::UnmappedLeaf);
                }
                Ok(())
            }
            NodeKind::Internal { left, right } => {
                for (side, child) in [("left", *left), ("right", *right)] {
                    let child_node = &self.nodes[child];
                    if child_node.parent != Some(id) {
                        return Err(InvariantViolation::BrokenParentLink);
                    }
                    if !node.bound.contains(&child_node.bound) {
                        return Err(InvariantViolation::UncontainedChild { side });
                    }
                }
                if node.bound != self.nodes[*left].bound.merged(&self.nodes[*right].bound) {
                    return Err(InvariantViolation::StaleBound);
                }
                self.validate_node(*left, reachable, leaves)?;
                self.validate_node(*right, reachable, leaves)
            }
        }
    }

    /// Creates a leaf for `entry` and links it into the tree.
    fn attach_leaf(&mut self, key: EntryKey, entry: PartitionEntry<C>) -> NodeId {
        let bound = entry.bound;
        let leaf = self.nodes.insert(Node::leaf(key, entry));

        let Some(root) = self.root else {
            self.root = Some(leaf);
            return leaf;
        };

        // Split the chosen leaf: old leaf on the left, new one on the right.
        let sibling = self.descend(root, &bound);
        let grandparent = self.nodes[sibling].parent;
        let merged = self.nodes[sibling].bound.merged(&bound);

        let branch = self.nodes.insert(Node::internal(merged, sibling, leaf));
        self.nodes[branch].parent = grandparent;
        self.nodes[sibling].parent = Some(branch);
        self.nodes[leaf].parent = Some(branch);

        match grandparent {
            Some(parent) => {
                self.replace_child(parent, sibling, branch);
                self.refit_from(parent);
            }
            None => self.root = Some(branch),
        }

        leaf
    }

    /// Unlinks `leaf`, splices out its parent, and returns the leaf's entry.
    fn detach_leaf(&mut self, leaf: NodeId) -> PartitionEntry<C> {
        let node = self
            .nodes
            .remove(leaf)
            .expect("key map must point at a live node");
        let NodeKind::Leaf { entry, .. } = node.kind else {
            unreachable!("key map must point at a leaf");
        };

        let Some(parent) = node.parent else {
            self.root = None;
            return entry;
        };

        let sibling = match self.nodes[parent].children() {
            Some((left, right)) if left == leaf => right,
            Some((left, _)) => left,
            None => unreachable!("parent of a leaf must be internal"),
        };
        let grandparent = self
            .nodes
            .remove(parent)
            .and_then(|removed| removed.parent);
        self.nodes[sibling].parent = grandparent;

        match grandparent {
            Some(grandparent) => {
                self.replace_child(grandparent, parent, sibling);
                self.refit_from(grandparent);
            }
            None => self.root = Some(sibling),
        }

        entry
    }

    /// Follows the selector from `start` down to a leaf.
    fn descend(&self, start: NodeId, bound: &Sphere) -> NodeId {
        let mut current = start;
        while let Some((left, right)) = self.nodes[current].children() {
            current = match self.selector.choose(
                &self.nodes[left].bound,
                &self.nodes[right].bound,
                bound,
            ) {
                Side::Left => left,
                Side::Right => right,
            };
        }
        current
    }

    /// Points whichever child slot of `parent` holds `old` at `new`.
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if let NodeKind::Internal { left, right } = &mut self.nodes[parent].kind {
            if *left == old {
                *left = new;
            } else {
                debug_assert_eq!(*right, old, "replaced node must be a child");
                *right = new;
            }
        }
    }

    /// Recomputes bounds from `start` up to the root.
    ///
    /// Stops early once a bound comes out unchanged, since every ancestor
    /// would then recompute to its current value as well.
    fn refit_from(&mut self, start: NodeId) {
        let mut current = Some(start);
        while let Some(id) = current {
            let Some((left, right)) = self.nodes[id].children() else {
                break;
            };
            let bound = self.nodes[left].bound.merged(&self.nodes[right].bound);
            let node = &mut self.nodes[id];
            if node.bound == bound {
                break;
            }
            node.bound = bound;
            current = node.parent;
        }
    }

    /// Whether an updated leaf can keep its slot without loosening its parent.
    fn fits_in_place(&self, leaf: NodeId, bound: &Sphere) -> bool {
        match self.nodes[leaf].parent {
            Some(parent) => self.nodes[parent].bound.contains(bound),
            None => true,
        }
    }
}

impl<C: Clone, S: ChildSelector> SpatialPartition<C> for SphereTree<C, S> {
    fn insert(&mut self, entry: PartitionEntry<C>) -> EntryKey {
        SphereTree::insert(self, entry)
    }

    fn update(&mut self, key: EntryKey, entry: PartitionEntry<C>) -> PartitionResult<()> {
        SphereTree::update(self, key, entry)
    }

    fn remove(&mut self, key: EntryKey) -> PartitionResult<PartitionEntry<C>> {
        SphereTree::remove(self, key)
    }

    fn get(&self, key: EntryKey) -> Option<&PartitionEntry<C>> {
        SphereTree::get(self, key)
    }

    fn len(&self) -> usize {
        SphereTree::len(self)
    }

    fn clear(&mut self) {
        SphereTree::clear(self)
    }

    fn ray_cast(&self, ray: &Ray, stats: &mut QueryStats) -> Vec<C> {
        SphereTree::ray_cast(self, ray, stats)
    }

    fn frustum_cast(&self, frustum: &Frustum, stats: &mut QueryStats) -> Vec<C> {
        SphereTree::frustum_cast(self, frustum, stats)
    }

    fn self_query(&self, stats: &mut QueryStats) -> Vec<(C, C)> {
        SphereTree::self_query(self, stats)
    }
}
