//! Query results against the brute-force reference, and pruning efficacy.

use nalgebra::{Point3, Vector3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sphere_tree::{
    Frustum, PartitionEntry, QueryStats, Ray, SimpleNSquared, SpatialPartition, Sphere, SphereTree,
};

const HALF_EXTENT: f32 = 100.0;

fn random_point(rng: &mut StdRng) -> Point3<f32> {
    Point3::new(
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
        rng.gen_range(-HALF_EXTENT..HALF_EXTENT),
    )
}

/// Sparse scene of small spheres, mirrored into both partitions.
fn scene(seed: u64, count: u32, max_radius: f32) -> (SphereTree<u32>, SimpleNSquared<u32>) {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut tree = SphereTree::new();
    let mut brute = SimpleNSquared::new();
    for client in 0..count {
        let bound = Sphere::new(random_point(&mut rng), rng.gen_range(0.0..max_radius));
        tree.insert(PartitionEntry::new(bound, client));
        brute.insert(PartitionEntry::new(bound, client));
    }
    (tree, brute)
}

fn sorted(mut hits: Vec<u32>) -> Vec<u32> {
    hits.sort_unstable();
    hits
}

fn sorted_pairs(pairs: Vec<(u32, u32)>) -> Vec<(u32, u32)> {
    let mut pairs: Vec<_> = pairs.into_iter().map(|(a, b)| (a.min(b), a.max(b))).collect();
    pairs.sort_unstable();
    pairs
}

#[test]
fn four_sphere_fixture_ray_cast() {
    let mut tree = SphereTree::new();
    let mut brute = SimpleNSquared::new();
    let spheres = [
        Sphere::new(Point3::new(0.0, 0.0, 0.0), 1.0),
        Sphere::new(Point3::new(3.0, 0.0, 0.0), 1.0),
        Sphere::new(Point3::new(1.5, 1.0, 0.0), 1.5),
        Sphere::new(Point3::new(-1.0, 0.0, 0.0), 0.5),
    ];
    for (client, bound) in spheres.into_iter().enumerate() {
        tree.insert(PartitionEntry::new(bound, client as u32));
        brute.insert(PartitionEntry::new(bound, client as u32));
    }

    let ray = Ray::new(Point3::origin(), Vector3::x());
    let hits = sorted(tree.ray_cast(&ray, &mut QueryStats::new()));
    assert_eq!(hits, sorted(brute.ray_cast(&ray, &mut QueryStats::new())));
    assert_eq!(hits, vec![0, 1, 2]);
}

#[test]
fn ray_casts_match_brute_force() {
    let (tree, brute) = scene(7, 500, 4.0);
    let mut rng = StdRng::seed_from_u64(8);

    for _ in 0..50 {
        let ray = Ray::through(random_point(&mut rng), random_point(&mut rng));
        let expected = sorted(brute.ray_cast(&ray, &mut QueryStats::new()));
        assert_eq!(sorted(tree.ray_cast(&ray, &mut QueryStats::new())), expected);
    }
}

#[test]
fn frustum_casts_match_brute_force() {
    let (tree, brute) = scene(11, 500, 4.0);
    let mut rng = StdRng::seed_from_u64(12);

    for _ in 0..30 {
        let eye = random_point(&mut rng);
        let target = random_point(&mut rng);
        let fovy = rng.gen_range(0.3..1.5);
        let frustum = Frustum::perspective(eye, target, Vector3::y(), fovy, 1.5, 0.5, 120.0);

        let expected = sorted(brute.frustum_cast(&frustum, &mut QueryStats::new()));
        assert_eq!(sorted(tree.frustum_cast(&frustum, &mut QueryStats::new())), expected);
    }
}

#[test]
fn self_query_matches_brute_force() {
    // Dense enough that plenty of pairs overlap.
    let (tree, brute) = scene(21, 400, 15.0);

    let expected = sorted_pairs(brute.self_query(&mut QueryStats::new()));
    assert!(!expected.is_empty());
    assert_eq!(sorted_pairs(tree.self_query(&mut QueryStats::new())), expected);
}

#[test]
fn self_query_never_repeats_or_self_pairs() {
    let (tree, _) = scene(22, 300, 20.0);
    let pairs = sorted_pairs(tree.self_query(&mut QueryStats::new()));

    assert!(pairs.iter().all(|(a, b)| a != b));
    let mut deduped = pairs.clone();
    deduped.dedup();
    assert_eq!(deduped, pairs);
}

#[test]
fn ray_cast_prunes_sparse_scene() {
    let count = 2000;
    let (tree, _) = scene(31, count, 1.0);
    let mut rng = StdRng::seed_from_u64(32);

    let rays = 20;
    let mut stats = QueryStats::new();
    for _ in 0..rays {
        let ray = Ray::through(random_point(&mut rng), random_point(&mut rng));
        tree.ray_cast(&ray, &mut stats);
    }
    assert!(
        stats.ray_sphere_tests < rays * u64::from(count),
        "{} tests over {rays} rays",
        stats.ray_sphere_tests
    );
}

#[test]
fn frustum_cast_prunes_sparse_scene() {
    let (tree, brute) = scene(41, 2000, 1.0);
    let frustum = Frustum::perspective(
        Point3::new(-HALF_EXTENT, 0.0, 0.0),
        Point3::new(0.0, 0.0, 0.0),
        Vector3::y(),
        0.4,
        1.0,
        1.0,
        80.0,
    );

    let mut tree_stats = QueryStats::new();
    let mut brute_stats = QueryStats::new();
    tree.frustum_cast(&frustum, &mut tree_stats);
    brute.frustum_cast(&frustum, &mut brute_stats);
    assert!(
        tree_stats.frustum_sphere_tests < brute_stats.frustum_sphere_tests,
        "tree {tree_stats:?} vs brute {brute_stats:?}"
    );
}

#[test]
fn self_query_prunes_sparse_scene() {
    let count = 1000u64;
    let (tree, brute) = scene(51, count as u32, 1.0);

    let mut tree_stats = QueryStats::new();
    let mut brute_stats = QueryStats::new();
    tree.self_query(&mut tree_stats);
    brute.self_query(&mut brute_stats);

    assert_eq!(brute_stats.sphere_sphere_tests, count * (count - 1) / 2);
    assert!(
        tree_stats.sphere_sphere_tests * 10 < brute_stats.sphere_sphere_tests,
        "{tree_stats:?}"
    );
}

#[test]
fn both_partitions_behave_the_same_behind_the_trait() {
    fn exercise(partition: &mut dyn SpatialPartition<u32>) -> (Vec<u32>, Vec<(u32, u32)>) {
        let a = partition.insert(PartitionEntry::new(Sphere::new(Point3::origin(), 1.0), 1));
        partition.insert(PartitionEntry::new(Sphere::new(Point3::new(1.0, 0.0, 0.0), 1.0), 2));
        partition.insert(PartitionEntry::new(Sphere::new(Point3::new(9.0, 0.0, 0.0), 1.0), 3));
        partition
            .update(a, PartitionEntry::new(Sphere::new(Point3::new(8.0, 0.0, 0.0), 1.0), 1))
            .unwrap();

        let ray = Ray::new(Point3::new(0.0, 0.0, 0.0), Vector3::x());
        let mut stats = QueryStats::new();
        (
            sorted(partition.ray_cast(&ray, &mut stats)),
            sorted_pairs(partition.self_query(&mut stats)),
        )
    }

    let from_tree = exercise(&mut SphereTree::<u32>::new());
    let from_brute = exercise(&mut SimpleNSquared::<u32>::new());
    assert_eq!(from_tree, from_brute);
    assert_eq!(from_tree, (vec![1, 2, 3], vec![(1, 3)]));
}
