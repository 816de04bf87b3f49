//! Entries, keys, and the interface shared by every spatial partition.

use slotmap::new_key_type;

use crate::{Frustum, PartitionResult, QueryStats, Ray, Sphere};

new_key_type! {
    /// Stable handle to an entry in a partition.
    ///
    /// Keys stay valid across updates of their own entry and across the
    /// insertion or removal of other entries. A key becomes invalid when its
    /// entry is removed; stale keys are detected by the slot generation.
    pub struct EntryKey;
}

/// A client object as seen by a partition: its bounding sphere plus an
/// opaque client handle reported back by queries.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionEntry<C> {
    /// Current bounding sphere of the client object
    pub bound: Sphere,
    /// Opaque handle returned by queries
    pub client: C,
}

impl<C> PartitionEntry<C> {
    pub fn new(bound: Sphere, client: C) -> Self {
        Self { bound, client }
    }
}

/// Interface for spatial partitioning used for picking, culling and
/// broad-phase collision.
///
/// Implemented by the bounding-sphere hierarchy and by the brute-force
/// [`SimpleNSquared`](crate::SimpleNSquared) reference, so one can stand in
/// for the other.
pub trait SpatialPartition<C: Clone> {
    /// Adds an entry and returns its key.
    fn insert(&mut self, entry: PartitionEntry<C>) -> EntryKey;

    /// Replaces the entry behind `key`. The key stays valid.
    fn update(&mut self, key: EntryKey, entry: PartitionEntry<C>) -> PartitionResult<()>;

    /// Removes the entry behind `key` and returns it. The key becomes invalid.
    fn remove(&mut self, key: EntryKey) -> PartitionResult<PartitionEntry<C>>;

    /// Returns the entry behind `key`, if it is live.
    fn get(&self, key: EntryKey) -> Option<&PartitionEntry<C>>;

    /// Number of live entries.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Removes every entry and invalidates every key.
    fn clear(&mut self);

    /// Clients whose sphere is hit by `ray`.
    fn ray_cast(&self, ray: &Ray, stats: &mut QueryStats) -> Vec<C>;

    /// Clients whose sphere is at least partly inside `frustum`.
    fn frustum_cast(&self, frustum: &Frustum, stats: &mut QueryStats) -> Vec<C>;

    /// Every unordered pair of clients whose spheres overlap.
    fn self_query(&self, stats: &mut QueryStats) -> Vec<(C, C)>;
}
