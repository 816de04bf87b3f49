//! Error types returned by the partition and geometry APIs.

use thiserror::Error;

use crate::EntryKey;

/// Result type for partition mutations.
pub type PartitionResult<T> = Result<T, PartitionError>;

/// Errors raised by [`SpatialPartition`](crate::SpatialPartition) mutations.
///
/// A rejected call leaves the partition exactly as it was.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartitionError {
    /// The key was never issued by this partition or its entry was removed
    #[error("invalid or stale entry key: {0:?}")]
    InvalidKey(EntryKey),
}

/// Errors raised by fallible geometry constructors.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeometryError {
    /// Three points were collinear (or coincident), so no plane passes through them
    #[error("points are collinear, no unique plane")]
    DegeneratePlane,

    /// A frustum face collapsed to a line or a point
    #[error("frustum corners do not span a volume")]
    DegenerateFrustum,
}

/// A structural or bound invariant that failed validation.
///
/// Produced by [`SphereTree::validate`](crate::SphereTree::validate).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvariantViolation {
    /// An internal node's bound does not enclose one of its children
    #[error("internal node bound does not contain its {side} child")]
    UncontainedChild {
        /// `"left"` or `"right"`
        side: &'static str,
    },

    /// An internal node's bound differs from the merge of its children
    #[error("internal node bound is not the merge of its children")]
    StaleBound,

    /// A leaf's bound differs from its entry's sphere
    #[error("leaf bound differs from its entry sphere")]
    LeafBoundMismatch,

    /// A leaf's key does not map back to that leaf
    #[error("leaf key does not map back to the leaf")]
    UnmappedLeaf,

    /// A child's parent link does not point back at its parent
    #[error("broken parent link")]
    BrokenParentLink,

    /// The key map and the set of reachable leaves disagree
    #[error("key map references {mapped} leaves but {reachable} are reachable")]
    KeyMapMismatch {
        /// Entries in the key map
        mapped: usize,
        /// Leaves reachable from the root
        reachable: usize,
    },

    /// The arena holds nodes that are not reachable from the root
    #[error("arena holds {stored} nodes but {reachable} are reachable")]
    OrphanNodes {
        /// Nodes in the arena
        stored: usize,
        /// Nodes reachable from the root
        reachable: usize,
    },
}
