//! Dynamic bounding-sphere hierarchy for ray picking, frustum culling and
//! broad-phase collision.
//!
//! ```
//! use nalgebra::{Point3, Vector3};
//! use sphere_tree::{PartitionEntry, QueryStats, Ray, Sphere, SphereTree};
//!
//! let mut tree = SphereTree::new();
//! let near = tree.insert(PartitionEntry::new(Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0), "near"));
//! tree.insert(PartitionEntry::new(Sphere::new(Point3::new(3.0, 0.0, 0.0), 1.0), "far"));
//!
//! let mut stats = QueryStats::new();
//! let ray = Ray::new(Point3::new(-5.0, 0.0, 0.0), Vector3::x());
//! assert_eq!(tree.ray_cast(&ray, &mut stats).len(), 2);
//!
//! tree.update(near, PartitionEntry::new(Sphere::new(Point3::new(2.5, 0.0, 0.0), 1.0), "near"))?;
//! assert_eq!(tree.self_query(&mut stats), vec![("far", "near")]);
//! # Ok::<(), sphere_tree::PartitionError>(())
//! ```

mod brute_force;
mod config;
mod error;
mod frustum;
pub mod hierarchy;
mod partition;
mod plane;
mod ray;
mod sphere;
mod stats;

pub use brute_force::SimpleNSquared;
pub use config::{TreeConfig, UpdatePolicy};
pub use error::{GeometryError, InvariantViolation, PartitionError, PartitionResult};
pub use frustum::{
    Frustum, MaskStep, PlaneMask, PLANE_BOTTOM, PLANE_COUNT, PLANE_FAR, PLANE_LEFT, PLANE_NEAR,
    PLANE_RIGHT, PLANE_TOP,
};
pub use hierarchy::{
    ChildSelector, CollectingVisitor, FnVisitor, HitVisitor, NodeRef, Side, SphereTree,
    SurfaceGrowth, VolumeGrowth,
};
pub use partition::{EntryKey, PartitionEntry, SpatialPartition};
pub use plane::{Classification, Plane3D};
pub use ray::Ray;
pub use sphere::{Sphere, CONTAINMENT_EPSILON};
pub use stats::QueryStats;
