//! Ray picking over the hierarchy.

use log::debug;

use crate::{QueryStats, Ray};

use super::node::{NodeArena, NodeId, NodeKind};
use super::tree::SphereTree;
use super::visitor::{CollectingVisitor, HitVisitor};

impl<C, S> SphereTree<C, S> {
    /// Visits the client of every entry whose sphere `ray` hits.
    ///
    /// The ray is a half-line starting at its origin. Each node bound costs
    /// one test in [`QueryStats::ray_sphere_tests`]; a missed bound prunes
    /// the whole subtree below it.
    pub fn visit_ray<'a, V: HitVisitor<&'a C>>(
        &'a self,
        ray: &Ray,
        stats: &mut QueryStats,
        visitor: &mut V,
    ) {
        if let Some(root) = self.root {
            ray_cast_node(&self.nodes, root, ray, stats, visitor);
        }
    }

    /// Collects the clients of every entry whose sphere `ray` hits.
    pub fn ray_cast(&self, ray: &Ray, stats: &mut QueryStats) -> Vec<C>
    where
        C: Clone,
    {
        let tests_before = stats.ray_sphere_tests;
        let mut visitor = CollectingVisitor::new();
        self.visit_ray(ray, stats, &mut visitor);

        let hits: Vec<C> = visitor.into_hits().into_iter().cloned().collect();
        debug!(
            "ray cast: {} hits, {} sphere tests",
            hits.len(),
            stats.ray_sphere_tests - tests_before
        );
        hits
    }
}

fn ray_cast_node<'a, C, V: HitVisitor<&'a C>>(
    nodes: &'a NodeArena<C>,
    id: NodeId,
    ray: &Ray,
    stats: &mut QueryStats,
    visitor: &mut V,
) {
    let node = &nodes[id];
    stats.ray_sphere_tests += 1;
    if !node.bound.intersects_ray(ray) {
        return;
    }

    match &node.kind {
        NodeKind::Leaf { entry, .. } => visitor.visit(&entry.client),
        NodeKind::Internal { left, right } => {
            ray_cast_node(nodes, *left, ray, stats, visitor);
            ray_cast_node(nodes, *right, ray, stats, visitor);
        }
    }
}
