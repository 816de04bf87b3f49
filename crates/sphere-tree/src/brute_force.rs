//! Brute-force reference partition.

use log::{trace, warn};
use slotmap::SlotMap;

use crate::{
    EntryKey, Frustum, MaskStep, PartitionEntry, PartitionError, PartitionResult, PlaneMask,
    QueryStats, Ray, SpatialPartition,
};

/// A partition that keeps a flat list and tests every entry on every query.
///
/// Ray and frustum casts cost O(n), self-queries O(n²). Useful as the
/// ground truth for the hierarchy and as a baseline for its test counts.
#[derive(Debug, Clone)]
pub struct SimpleNSquared<C> {
    entries: SlotMap<EntryKey, PartitionEntry<C>>,
}

impl<C> Default for SimpleNSquared<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> SimpleNSquared<C> {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
        }
    }

    /// Iterates over every live entry and its key.
    pub fn entries(&self) -> impl Iterator<Item = (EntryKey, &PartitionEntry<C>)> + '_ {
        self.entries.iter()
    }
}

impl<C: Clone> SpatialPartition<C> for SimpleNSquared<C> {
    fn insert(&mut self, entry: PartitionEntry<C>) -> EntryKey {
        let key = self.entries.insert(entry);
        trace!("brute force inserted {:?}", key);
        key
    }

    fn update(&mut self, key: EntryKey, entry: PartitionEntry<C>) -> PartitionResult<()> {
        match self.entries.get_mut(key) {
            Some(slot) => {
                *slot = entry;
                Ok(())
            }
            None => {
                warn!("brute force update rejected stale key {:?}", key);
                Err(PartitionError::InvalidKey(key))
            }
        }
    }

    fn remove(&mut self, key: EntryKey) -> PartitionResult<PartitionEntry<C>> {
        self.entries.remove(key).ok_or_else(|| {
            warn!("brute force remove rejected stale key {:?}", key);
            PartitionError::InvalidKey(key)
        })
    }

    fn get(&self, key: EntryKey) -> Option<&PartitionEntry<C>> {
        self.entries.get(key)
    }

    fn len(&self) -> usize {
        self.entries.len()
    }

    fn clear(&mut self) {
        self.entries.clear();
    }

    fn ray_cast(&self, ray: &Ray, stats: &mut QueryStats) -> Vec<C> {
        stats.ray_sphere_tests += self.entries.len() as u64;
        self.entries
            .values()
            .filter(|entry| entry.bound.intersects_ray(ray))
            .map(|entry| entry.client.clone())
            .collect()
    }

    fn frustum_cast(&self, frustum: &Frustum, stats: &mut QueryStats) -> Vec<C> {
        let mut hits = Vec::new();
        for entry in self.entries.values() {
            let (step, tests) = frustum.narrow_mask(&entry.bound, PlaneMask::ALL);
            stats.frustum_sphere_tests += u64::from(tests);
            if let MaskStep::Visible(_) = step {
                hits.push(entry.client.clone());
            }
        }
        hits
    }

    fn self_query(&self, stats: &mut QueryStats) -> Vec<(C, C)> {
        let entries: Vec<_> = self.entries.values().collect();
        let mut pairs = Vec::new();
        for (i, first) in entries.iter().enumerate() {
            for second in &entries[i + 1..] {
                stats.sphere_sphere_tests += 1;
                if first.bound.intersects(&second.bound) {
                    pairs.push((first.client.clone(), second.client.clone()));
                }
            }
        }
        pairs
    }
}
