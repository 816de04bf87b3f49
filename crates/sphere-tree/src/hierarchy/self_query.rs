//! Broad-phase overlap search within one hierarchy.
//!
//! Every unordered pair of leaves shares exactly one lowest common ancestor,
//! and the pair is found by the cross check between that ancestor's two
//! children. A pair of nodes whose bounds are disjoint cannot hold any
//! overlapping pair of descendants, so the cross check prunes there.

use log::debug;

use crate::QueryStats;

use super::node::{NodeArena, NodeId, NodeKind};
use super::tree::SphereTree;
use super::visitor::{CollectingVisitor, HitVisitor};

impl<C, S> SphereTree<C, S> {
    /// Visits every unordered pair of clients whose spheres overlap.
    ///
    /// No pair is visited twice and no entry is paired with itself. Each
    /// bound-against-bound test adds one to
    /// [`QueryStats::sphere_sphere_tests`].
    pub fn visit_overlaps<'a, V: HitVisitor<(&'a C, &'a C)>>(
        &'a self,
        stats: &mut QueryStats,
        visitor: &mut V,
    ) {
        if let Some(root) = self.root {
            self_check(&self.nodes, root, stats, visitor);
        }
    }

    /// Collects every unordered pair of clients whose spheres overlap.
    pub fn self_query(&self, stats: &mut QueryStats) -> Vec<(C, C)>
    where
        C: Clone,
    {
        let tests_before = stats.sphere_sphere_tests;
        let mut visitor = CollectingVisitor::new();
        self.visit_overlaps(stats, &mut visitor);

        let pairs: Vec<(C, C)> = visitor
            .into_hits()
            .into_iter()
            .map(|(a, b)| (a.clone(), b.clone()))
            .collect();
        debug!(
            "self query: {} pairs, {} sphere tests",
            pairs.len(),
            stats.sphere_sphere_tests - tests_before
        );
        pairs
    }
}

fn self_check<'a, C, V: HitVisitor<(&'a C, &'a C)>>(
    nodes: &'a NodeArena<C>,
    id: NodeId,
    stats: &mut QueryStats,
    visitor: &mut V,
) {
    if let Some((left, right)) = nodes[id].children() {
        self_check(nodes, left, stats, visitor);
        self_check(nodes, right, stats, visitor);
        cross_check(nodes, left, right, stats, visitor);
    }
}

fn cross_check<'a, C, V: HitVisitor<(&'a C, &'a C)>>(
    nodes: &'a NodeArena<C>,
    a: NodeId,
    b: NodeId,
    stats: &mut QueryStats,
    visitor: &mut V,
) {
    let (node_a, node_b) = (&nodes[a], &nodes[b]);
    stats.sphere_sphere_tests += 1;
    if !node_a.bound.intersects(&node_b.bound) {
        return;
    }

    match (&node_a.kind, &node_b.kind) {
        (NodeKind::Leaf { entry: first, .. }, NodeKind::Leaf { entry: second, .. }) => {
            visitor.visit((&first.client, &second.client));
        }
        (NodeKind::Internal { left, right }, NodeKind::Leaf { .. }) => {
            cross_check(nodes, *left, b, stats, visitor);
            cross_check(nodes, *right, b, stats, visitor);
        }
        (NodeKind::Leaf { .. }, NodeKind::Internal { left, right }) => {
            cross_check(nodes, a, *left, stats, visitor);
            cross_check(nodes, a, *right, stats, visitor);
        }
        (
            NodeKind::Internal { left: a_left, right: a_right },
            NodeKind::Internal { left: b_left, right: b_right },
        ) => {
            cross_check(nodes, *a_left, *b_left, stats, visitor);
            cross_check(nodes, *a_left, *b_right, stats, visitor);
            cross_check(nodes, *a_right, *b_left, stats, visitor);
            cross_check(nodes, *a_right, *b_right, stats, visitor);
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::{PartitionEntry, SimpleNSquared, SpatialPartition, Sphere, SphereTree};

    use super::*;

    fn entry(x: f32, y: f32, r: f32, client: u32) -> PartitionEntry<u32> {
        PartitionEntry::new(Sphere::new(Point3::new(x, y, 0.0), r), client)
    }

    fn normalized(mut pairs: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
        for pair in &mut pairs {
            if pair.0 > pair.1 {
                *pair = (pair.1, pair.0);
            }
        }
        pairs.sort();
        pairs
    }

    #[test]
    fn empty_and_single_entry_trees_perform_no_tests() {
        let mut tree = SphereTree::new();
        let mut stats = QueryStats::new();
        assert!(tree.self_query(&mut stats).is_empty());

        tree.insert(entry(0.0, 0.0, 1.0, 0));
        assert!(tree.self_query(&mut stats).is_empty());
        assert_eq!(stats.sphere_sphere_tests, 0);
    }

    #[test]
    fn chain_of_overlaps() {
        let mut tree = SphereTree::new();
        tree.insert(entry(0.0, 0.0, 1.0, 0));
        tree.insert(entry(1.5, 0.0, 1.0, 1));
        tree.insert(entry(3.0, 0.0, 1.0, 2));
        tree.insert(entry(20.0, 0.0, 1.0, 3));

        let pairs = normalized(tree.self_query(&mut QueryStats::new()));
        assert_eq!(pairs, vec![(0, 1), (1, 2)]);
    }

    #[test]
    fn touching_spheres_overlap() {
        let mut tree = SphereTree::new();
        tree.insert(entry(0.0, 0.0, 1.0, 0));
        tree.insert(entry(2.0, 0.0, 1.0, 1));
        assert_eq!(normalized(tree.self_query(&mut QueryStats::new())), vec![(0, 1)]);
    }

    #[test]
    fn coincident_points_pair_up() {
        let mut tree = SphereTree::new();
        tree.insert(entry(1.0, 1.0, 0.0, 0));
        tree.insert(entry(1.0, 1.0, 0.0, 1));
        tree.insert(entry(4.0, 1.0, 0.0, 2));
        assert_eq!(normalized(tree.self_query(&mut QueryStats::new())), vec![(0, 1)]);
    }

    #[test]
    fn remove_middle_entry_matches_brute_force() {
        let mut tree = SphereTree::new();
        let mut brute = SimpleNSquared::new();
        let mut keys = Vec::new();
        for e in [entry(0.0, 0.0, 1.0, 0), entry(5.0, 0.0, 1.0, 1), entry(1.5, 0.0, 1.0, 2)] {
            keys.push((tree.insert(e.clone()), brute.insert(e)));
        }
        tree.remove(keys[1].0).unwrap();
        brute.remove(keys[1].1).unwrap();

        let mut stats = QueryStats::new();
        let pairs = normalized(tree.self_query(&mut stats));
        assert_eq!(pairs, normalized(brute.self_query(&mut QueryStats::new())));
        assert_eq!(pairs, vec![(0, 2)]);
        // Two leaves under one root: a single cross check.
        assert_eq!(stats.sphere_sphere_tests, 1);
    }

    #[test]
    fn separated_clusters_are_pruned_at_the_top() {
        let mut tree = SphereTree::new();
        for i in 0..4 {
            tree.insert(entry(-100.0 + i as f32 * 3.0, 0.0, 1.0, i));
        }
        for i in 0..4 {
            tree.insert(entry(100.0 + i as f32 * 3.0, 0.0, 1.0, 4 + i));
        }

        let mut stats = QueryStats::new();
        assert!(tree.self_query(&mut stats).is_empty());
        // Far below the 28 tests of an all-pairs scan.
        assert!(stats.sphere_sphere_tests < 28, "{stats:?}");
    }
}
