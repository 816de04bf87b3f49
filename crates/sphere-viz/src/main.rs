use std::collections::HashSet;

use log::{info, warn};
use macroquad::prelude::*;
use macroquad::rand::{gen_range, srand};
use nalgebra::{Point3, Vector3};
use sphere_tree::{
    EntryKey, PartitionEntry, QueryStats, Ray, SimpleNSquared, SpatialPartition, Sphere,
    SphereTree, TreeConfig, UpdatePolicy,
};
use sphere_viz::{OrbitCamera, TreeNavigator, client_color, draw_bound, to_point3};

const NUM_SPHERES: usize = 150;
const HALF_EXTENT: f32 = 40.0;
const MIN_RADIUS: f32 = 0.5;
const MAX_RADIUS: f32 = 3.0;
const MAX_SPEED: f32 = 12.0;

/// A moving sphere and its handles in both partitions.
struct Ball {
    center: Point3<f32>,
    velocity: Vector3<f32>,
    radius: f32,
    tree_key: EntryKey,
    brute_key: EntryKey,
}

impl Ball {
    fn entry(&self, client: usize) -> PartitionEntry<usize> {
        PartitionEntry::new(Sphere::new(self.center, self.radius), client)
    }

    /// Moves the ball and reflects it off the walls of the box.
    fn step(&mut self, dt: f32) {
        self.center += self.velocity * dt;
        for axis in 0..3 {
            let limit = HALF_EXTENT - self.radius;
            if self.center[axis] < -limit {
                self.center[axis] = -limit;
                self.velocity[axis] = self.velocity[axis].abs();
            } else if self.center[axis] > limit {
                self.center[axis] = limit;
                self.velocity[axis] = -self.velocity[axis].abs();
            }
        }
    }
}

fn random_vector(extent: f32) -> Vector3<f32> {
    Vector3::new(
        gen_range(-extent, extent),
        gen_range(-extent, extent),
        gen_range(-extent, extent),
    )
}

fn spawn_balls(
    tree: &mut SphereTree<usize>,
    brute: &mut SimpleNSquared<usize>,
) -> Vec<Ball> {
    (0..NUM_SPHERES)
        .map(|client| {
            let radius = gen_range(MIN_RADIUS, MAX_RADIUS);
            let center = Point3::from(random_vector(HALF_EXTENT - radius));
            let bound = Sphere::new(center, radius);
            Ball {
                center,
                velocity: random_vector(MAX_SPEED),
                radius,
                tree_key: tree.insert(PartitionEntry::new(bound, client)),
                brute_key: brute.insert(PartitionEntry::new(bound, client)),
            }
        })
        .collect()
}

/// Per-frame query statistics for the tree and the brute-force reference.
#[derive(Default)]
struct FrameStats {
    tree: QueryStats,
    brute: QueryStats,
    visible: usize,
    picked: usize,
    pairs: usize,
}

fn draw_stats_panel(stats: &FrameStats, y_offset: f32) {
    let rows = [
        ("Ray", stats.picked, stats.tree.ray_sphere_tests, stats.brute.ray_sphere_tests),
        (
            "Frustum",
            stats.visible,
            stats.tree.frustum_sphere_tests,
            stats.brute.frustum_sphere_tests,
        ),
        (
            "Self",
            stats.pairs,
            stats.tree.sphere_sphere_tests,
            stats.brute.sphere_sphere_tests,
        ),
    ];

    draw_text("Query    hits    tree tests / brute tests", 10.0, y_offset, 16.0, GRAY);
    for (i, (name, hits, tree, brute)) in rows.into_iter().enumerate() {
        draw_text(
            &format!("{:<8} {:>4}    {:>6} / {:>6}", name, hits, tree, brute),
            10.0,
            y_offset + 18.0 * (i as f32 + 1.0),
            16.0,
            if tree < brute { GREEN } else { ORANGE },
        );
    }
}

#[macroquad::main("Sphere Tree")]
async fn main() {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    srand(42);
    let config = TreeConfig::default().with_update_policy(UpdatePolicy::RefitInPlace);
    let mut tree = SphereTree::with_config(config);
    let mut brute = SimpleNSquared::new();
    let mut balls = spawn_balls(&mut tree, &mut brute);
    info!(
        "spawned {} spheres: {} nodes, depth {}",
        tree.len(),
        tree.node_count(),
        tree.depth()
    );

    let mut camera = OrbitCamera::new(110.0, 0.6, 0.4).with_zoom(5.0, 20.0, 300.0);
    let mut navigator = TreeNavigator::new();
    let mut show_internal = false;
    let mut paused = false;

    loop {
        camera.update();
        navigator.update(&tree);
        if is_key_pressed(KeyCode::V) {
            show_internal = !show_internal;
        }
        if is_key_pressed(KeyCode::Space) {
            paused = !paused;
        }

        if !paused {
            let dt = get_frame_time().min(0.05);
            for (client, ball) in balls.iter_mut().enumerate() {
                ball.step(dt);
                if let Err(err) = tree.update(ball.tree_key, ball.entry(client)) {
                    warn!("tree update failed: {err}");
                }
                if let Err(err) = brute.update(ball.brute_key, ball.entry(client)) {
                    warn!("brute force update failed: {err}");
                }
            }
        }

        let mut stats = FrameStats::default();

        let pairs = tree.self_query(&mut stats.tree);
        stats.pairs = brute.self_query(&mut stats.brute).len();
        let colliding: HashSet<usize> = pairs.iter().flat_map(|&(a, b)| [a, b]).collect();

        let frustum = camera.frustum();
        stats.visible = tree.frustum_cast(&frustum, &mut stats.tree).len();
        brute.frustum_cast(&frustum, &mut stats.brute);

        // Pick along the view axis, through the orbit target.
        let ray = Ray::through(camera.eye_point(), to_point3(camera.target));
        let picked: HashSet<usize> = tree.ray_cast(&ray, &mut stats.tree).into_iter().collect();
        stats.picked = picked.len();
        brute.ray_cast(&ray, &mut stats.brute);

        clear_background(Color::from_rgba(15, 15, 25, 255));
        set_camera(&camera.to_camera3d());

        draw_cube_wires(vec3(0.0, 0.0, 0.0), Vec3::splat(2.0 * HALF_EXTENT), DARKGRAY);
        for (_, entry) in tree.entries() {
            let color = if colliding.contains(&entry.client) {
                RED
            } else if picked.contains(&entry.client) {
                WHITE
            } else {
                client_color(entry.client)
            };
            draw_bound(&entry.bound, color);
        }
        navigator.render(&tree, show_internal);

        set_default_camera();

        draw_text(
            &format!(
                "Sphere Tree - {} entries, {} nodes, depth {}",
                tree.len(),
                tree.node_count(),
                tree.depth()
            ),
            10.0,
            25.0,
            20.0,
            WHITE,
        );
        draw_text(
            &format!("{} overlapping pairs (red)", pairs.len()),
            10.0,
            45.0,
            18.0,
            GRAY,
        );

        navigator.draw_ui(&tree, 70.0);
        draw_stats_panel(&stats, 160.0);

        draw_text(
            "Drag mouse to rotate, scroll to zoom | [V] internal bounds | [Space] pause",
            10.0,
            250.0,
            16.0,
            DARKGRAY,
        );
        draw_text(&format!("FPS: {}", get_fps()), 10.0, 270.0, 16.0, DARKGRAY);

        next_frame().await
    }
}
