//! Child selection strategies for tree insertion.
//!
//! When a new entry descends from the root, every internal node sends it to
//! one of its two children. The choice decides how tight the resulting
//! bounds are and therefore how well queries prune.

use crate::Sphere;

/// Which child of an internal node to descend into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

/// Strategy for choosing which child receives a new entry.
pub trait ChildSelector {
    /// Picks the child whose bound should absorb `incoming`.
    fn choose(&self, left: &Sphere, right: &Sphere, incoming: &Sphere) -> Side;
}

/// Descends into the child whose volume grows least when merged with the
/// new sphere. Ties go left.
///
/// This is the default heuristic. It is greedy and performs no
/// rebalancing, so adversarial insertion orders can produce deep trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct VolumeGrowth;

impl ChildSelector for VolumeGrowth {
    fn choose(&self, left: &Sphere, right: &Sphere, incoming: &Sphere) -> Side {
        let left_cost = left.merged(incoming).volume() - left.volume();
        let right_cost = right.merged(incoming).volume() - right.volume();
        if right_cost < left_cost {
            Side::Right
        } else {
            Side::Left
        }
    }
}

/// Like [`VolumeGrowth`] but measures growth in surface area, which
/// penalises large bounds less steeply.
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceGrowth;

impl ChildSelector for SurfaceGrowth {
    fn choose(&self, left: &Sphere, right: &Sphere, incoming: &Sphere) -> Side {
        let left_cost = left.merged(incoming).surface_area() - left.surface_area();
        let right_cost = right.merged(incoming).surface_area() - right.surface_area();
        if right_cost < left_cost {
            Side::Right
        } else {
            Side::Left
        }
    }
}
