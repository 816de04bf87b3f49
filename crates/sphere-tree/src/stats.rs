//! Primitive test counters for measuring query pruning.

/// Counts of primitive volume tests performed by queries.
///
/// Counters accumulate across queries; call [`QueryStats::clear`] right
/// before the query you want to measure.
///
/// ```
/// use sphere_tree::QueryStats;
///
/// let mut stats = QueryStats::new();
/// stats.ray_sphere_tests += 3;
/// assert_eq!(stats.total(), 3);
/// stats.clear();
/// assert_eq!(stats, QueryStats::default());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueryStats {
    /// Ray against node bound, one per visited node in a ray cast
    pub ray_sphere_tests: u64,
    /// Sphere against a single frustum plane
    pub frustum_sphere_tests: u64,
    /// Sphere against sphere, one per node pair in a self-query
    pub sphere_sphere_tests: u64,
}

impl QueryStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Sum of all counters.
    pub fn total(&self) -> u64 {
        self.ray_sphere_tests + self.frustum_sphere_tests + self.sphere_sphere_tests
    }
}
