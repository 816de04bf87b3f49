//! Tree configuration.

/// How [`SphereTree::update`](crate::SphereTree::update) relocates an entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Remove the leaf and insert it again from the root, so every update
    /// goes through the insertion heuristic.
    #[default]
    Reinsert,

    /// Keep the leaf where it is when the new sphere still fits inside its
    /// parent's current bound, and only refit the ancestors. Falls back to
    /// [`UpdatePolicy::Reinsert`] otherwise.
    RefitInPlace,
}

/// Configuration for a [`SphereTree`](crate::SphereTree).
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Relocation strategy for updated entries
    pub update_policy: UpdatePolicy,

    /// Number of entries to reserve arena space for
    pub initial_capacity: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            update_policy: UpdatePolicy::Reinsert,
            initial_capacity: 64,
        }
    }
}

impl TreeConfig {
    /// Sets the update policy.
    pub fn with_update_policy(mut self, policy: UpdatePolicy) -> Self {
        self.update_policy = policy;
        self
    }

    /// Sets the number of entries to reserve space for.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }
}
