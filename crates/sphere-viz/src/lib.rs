//! Shared visualization utilities for the sphere tree viewer.

use std::hash::{Hash, Hasher};

use macroquad::prelude::*;
use nalgebra::{Point3, Vector3};
use sphere_tree::{Frustum, NodeRef, Sphere};

pub mod navigator;
pub use navigator::TreeNavigator;

/// Vertical field of view shared by the render camera and the culling frustum.
pub const FOVY: f32 = std::f32::consts::FRAC_PI_4;
/// Near clip distance of the culling frustum.
pub const Z_NEAR: f32 = 0.1;
/// Far clip distance of the culling frustum.
pub const Z_FAR: f32 = 1000.0;

/// Generates a deterministic color from a client id using hashing.
/// An entry keeps its color while it moves around the tree.
pub fn client_color(client: usize) -> Color {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    client.hash(&mut hasher);
    let hash = hasher.finish();

    let r = ((hash >> 16) & 0xFF) as u8;
    let g = ((hash >> 8) & 0xFF) as u8;
    let b = (hash & 0xFF) as u8;

    // Keep wireframes visible on the dark background
    Color::from_rgba(r.max(60), g.max(60), b.max(60), 255)
}

#[inline]
pub fn to_vec3(p: Point3<f32>) -> Vec3 {
    vec3(p.x, p.y, p.z)
}

#[inline]
pub fn to_point3(v: Vec3) -> Point3<f32> {
    Point3::new(v.x, v.y, v.z)
}

/// Draws a bounding sphere as a wireframe.
pub fn draw_bound(sphere: &Sphere, color: Color) {
    draw_sphere_wires(to_vec3(sphere.center()), sphere.radius().max(0.05), None, color);
}

/// Draws the internal-node bounds of a subtree, fading with depth.
pub fn draw_internal_bounds<C>(node: NodeRef<'_, C>, depth: usize) {
    let Some((left, right)) = node.children() else {
        return;
    };
    let alpha = (0.5 / (depth as f32 + 1.0)).max(0.08);
    draw_bound(&node.bound(), Color::new(0.4, 0.6, 1.0, alpha));
    draw_internal_bounds(left, depth + 1);
    draw_internal_bounds(right, depth + 1);
}

/// Simple orbit camera for 3D scene navigation.
pub struct OrbitCamera {
    pub distance: f32,
    pub yaw: f32,
    pub pitch: f32,
    pub target: Vec3,
    /// Multiplier for scroll wheel zoom
    pub zoom_speed: f32,
    /// Minimum distance from target
    pub min_distance: f32,
    /// Maximum distance from target
    pub max_distance: f32,
}

impl OrbitCamera {
    /// Creates a new orbit camera with the given configuration.
    pub fn new(distance: f32, yaw: f32, pitch: f32) -> Self {
        Self {
            distance,
            yaw,
            pitch,
            target: vec3(0.0, 0.0, 0.0),
            zoom_speed: 5.0,
            min_distance: 10.0,
            max_distance: 300.0,
        }
    }

    /// Sets the zoom configuration (speed and distance limits).
    pub fn with_zoom(mut self, speed: f32, min: f32, max: f32) -> Self {
        self.zoom_speed = speed;
        self.min_distance = min;
        self.max_distance = max;
        self
    }

    /// Updates camera state from user input (mouse drag, scroll, arrow keys).
    pub fn update(&mut self) {
        if is_mouse_button_down(MouseButton::Left) {
            let delta = mouse_delta_position();
            self.yaw -= delta.x * 2.0;
            self.pitch -= delta.y * 2.0;
        }

        // Clamp pitch to avoid gimbal lock
        self.pitch = self.pitch.clamp(-1.5, 1.5);

        let scroll = mouse_wheel().1;
        self.distance -= scroll * self.zoom_speed;
        self.distance = self.distance.clamp(self.min_distance, self.max_distance);

        if is_key_down(KeyCode::Left) {
            self.yaw += 0.02;
        }
        if is_key_down(KeyCode::Right) {
            self.yaw -= 0.02;
        }
        if is_key_down(KeyCode::Up) {
            self.pitch += 0.02;
        }
        if is_key_down(KeyCode::Down) {
            self.pitch -= 0.02;
        }
    }

    /// Returns the camera's world position.
    pub fn position(&self) -> Vec3 {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();
        self.target + vec3(x, y, z)
    }

    /// Converts to macroquad's Camera3D for rendering.
    pub fn to_camera3d(&self) -> Camera3D {
        Camera3D {
            position: self.position(),
            up: vec3(0.0, 1.0, 0.0),
            target: self.target,
            fovy: FOVY,
            ..Default::default()
        }
    }

    /// Returns the eye point as a nalgebra Point3 for ray casts.
    pub fn eye_point(&self) -> Point3<f32> {
        to_point3(self.position())
    }

    /// Returns the culling frustum matching what the camera renders.
    pub fn frustum(&self) -> Frustum {
        Frustum::perspective(
            self.eye_point(),
            to_point3(self.target),
            Vector3::y(),
            FOVY,
            screen_width() / screen_height(),
            Z_NEAR,
            Z_FAR,
        )
    }
}
