//! View-frustum culling over the hierarchy.
//!
//! Each recursive call carries a [`PlaneMask`] of the planes its subtree
//! may still cross. A node that lies fully in front of a plane drops that
//! plane for all of its descendants, and a node in front of all six planes
//! reports its whole subtree without further tests.

use log::debug;

use crate::{Frustum, MaskStep, PlaneMask, QueryStats};

use super::node::{NodeArena, NodeId, NodeKind};
use super::tree::SphereTree;
use super::visitor::{CollectingVisitor, HitVisitor};

impl<C, S> SphereTree<C, S> {
    /// Visits the client of every entry whose sphere is at least partly
    /// inside `frustum`.
    ///
    /// Every sphere-against-plane test adds one to
    /// [`QueryStats::frustum_sphere_tests`].
    pub fn visit_frustum<'a, V: HitVisitor<&'a C>>(
        &'a self,
        frustum: &Frustum,
        stats: &mut QueryStats,
        visitor: &mut V,
    ) {
        if let Some(root) = self.root {
            frustum_cast_node(&self.nodes, root, frustum, PlaneMask::ALL, stats, visitor);
        }
    }

    /// Collects the clients of every entry whose sphere is at least partly
    /// inside `frustum`.
    pub fn frustum_cast(&self, frustum: &Frustum, stats: &mut QueryStats) -> Vec<C>
    where
        C: Clone,
    {
        let tests_before = stats.frustum_sphere_tests;
        let mut visitor = CollectingVisitor::new();
        self.visit_frustum(frustum, stats, &mut visitor);

        let hits: Vec<C> = visitor.into_hits().into_iter().cloned().collect();
        debug!(
            "frustum cast: {} hits, {} plane tests",
            hits.len(),
            stats.frustum_sphere_tests - tests_before
        );
        hits
    }
}

fn frustum_cast_node<'a, C, V: HitVisitor<&'a C>>(
    nodes: &'a NodeArena<C>,
    id: NodeId,
    frustum: &Frustum,
    mask: PlaneMask,
    stats: &mut QueryStats,
    visitor: &mut V,
) {
    let node = &nodes[id];
    let (step, tests) = frustum.narrow_mask(&node.bound, mask);
    stats.frustum_sphere_tests += u64::from(tests);

    let MaskStep::Visible(mask) = step else {
        return;
    };
    if mask.is_empty() {
        report_subtree(nodes, id, visitor);
        return;
    }

    match &node.kind {
        NodeKind::Leaf { entry, .. } => visitor.visit(&entry.client),
        NodeKind::Internal { left, right } => {
            frustum_cast_node(nodes, *left, frustum, mask, stats, visitor);
            frustum_cast_node(nodes, *right, frustum, mask, stats, visitor);
        }
    }
}

/// Reports every leaf below `id` without testing anything.
fn report_subtree<'a, C, V: HitVisitor<&'a C>>(nodes: &'a NodeArena<C>, id: NodeId, visitor: &mut V) {
    match &nodes[id].kind {
        NodeKind::Leaf { entry, .. } => visitor.visit(&entry.client),
        NodeKind::Internal { left, right } => {
            report_subtree(nodes, *left, visitor);
            report_subtree(nodes, *right, visitor);
        }
    }
}
