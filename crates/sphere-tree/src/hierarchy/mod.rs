//! Bounding-sphere hierarchy.
//!
//! A dynamic binary tree over sphere-bounded entries, maintained
//! incrementally as entries are inserted, moved, and removed. Each internal
//! node's sphere encloses the spheres of its two children, so a query that
//! rejects a node's bound can skip everything below it.
//!
//! # Structure
//!
//! - [`SphereTree`] owns every node and maps [`EntryKey`](crate::EntryKey)s
//!   to their leaves
//! - [`NodeRef`] is a read-only view for inspection and debug drawing
//! - [`ChildSelector`] decides where insertions descend
//! - [`HitVisitor`] receives query results without an intermediate list
//!
//! # Queries
//!
//! Ray casts and frustum casts descend from the root and prune subtrees
//! whose bounds fail the test. The frustum cast additionally drops planes
//! that a node is fully inside of, so descendants never retest them.
//! Self-queries find all overlapping pairs with a dual-tree descent.

mod frustum_cast;
mod node;
mod ray_cast;
mod selector;
mod self_query;
mod tree;
mod visitor;

pub use node::NodeRef;
pub use selector::{ChildSelector, Side, SurfaceGrowth, VolumeGrowth};
pub use tree::SphereTree;
pub use visitor::{CollectingVisitor, FnVisitor, HitVisitor};
