//! Sphere tree navigation utilities for interactive visualization.

use macroquad::prelude::*;
use sphere_tree::{NodeRef, Side, SphereTree};

use crate::{draw_bound, draw_internal_bounds};

/// Interactive navigator for exploring tree structure.
///
/// The tree restructures as entries move, so the stored path is cut back to
/// the deepest node that still exists before every use.
pub struct TreeNavigator {
    path: Vec<Side>,
}

impl Default for TreeNavigator {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeNavigator {
    /// Creates a new navigator starting at the root.
    pub fn new() -> Self {
        Self { path: Vec::new() }
    }

    /// Returns the current navigation path.
    pub fn path(&self) -> &[Side] {
        &self.path
    }

    /// Returns the current depth in the tree.
    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Attempts to navigate to the left child. Returns true if successful.
    pub fn go_left<C>(&mut self, tree: &SphereTree<C>) -> bool {
        self.descend(tree, Side::Left)
    }

    /// Attempts to navigate to the right child. Returns true if successful.
    pub fn go_right<C>(&mut self, tree: &SphereTree<C>) -> bool {
        self.descend(tree, Side::Right)
    }

    fn descend<C>(&mut self, tree: &SphereTree<C>, side: Side) -> bool {
        let is_internal = self
            .current_node(tree)
            .is_some_and(|node| node.children().is_some());
        if is_internal {
            self.path.push(side);
        }
        is_internal
    }

    /// Navigates to the parent node. Returns true if not already at root.
    pub fn go_parent(&mut self) -> bool {
        self.path.pop().is_some()
    }

    /// Returns to the root node.
    pub fn go_root(&mut self) {
        self.path.clear();
    }

    /// Handles keyboard input for navigation.
    /// Returns true if navigation state changed.
    pub fn update<C>(&mut self, tree: &SphereTree<C>) -> bool {
        let valid = tree
            .root()
            .map_or(0, |root| node_at_path(root, &self.path).1);
        let mut changed = valid < self.path.len();
        self.path.truncate(valid);

        if is_key_pressed(KeyCode::L) {
            changed |= self.go_left(tree);
        }
        if is_key_pressed(KeyCode::R) {
            changed |= self.go_right(tree);
        }
        if is_key_pressed(KeyCode::P) {
            changed |= self.go_parent();
        }
        if is_key_pressed(KeyCode::Home) && !self.path.is_empty() {
            self.go_root();
            changed = true;
        }

        changed
    }

    /// Returns the current node, if the tree is non-empty.
    pub fn current_node<'a, C>(&self, tree: &'a SphereTree<C>) -> Option<NodeRef<'a, C>> {
        tree.root().map(|root| node_at_path(root, &self.path).0)
    }

    /// Highlights the current subtree: its bound, and optionally the
    /// bounds of the internal nodes below it.
    pub fn render<C>(&self, tree: &SphereTree<C>, show_internal: bool) {
        if let Some(node) = self.current_node(tree) {
            if show_internal {
                draw_internal_bounds(node, self.path.len());
            }
            draw_bound(&node.bound(), YELLOW);
        }
    }

    /// Draws the navigation UI overlay.
    pub fn draw_ui<C>(&self, tree: &SphereTree<C>, y_offset: f32) {
        let (leaves, depth, is_leaf) = match self.current_node(tree) {
            Some(node) => (node.leaf_count(), node.depth(), node.is_leaf()),
            None => (0, 0, true),
        };

        let path_str = if self.path.is_empty() {
            "root".to_string()
        } else {
            self.path
                .iter()
                .map(|side| match side {
                    Side::Left => "L",
                    Side::Right => "R",
                })
                .collect::<Vec<_>>()
                .join(" -> ")
        };

        draw_text(
            &format!("Subtree: {} entries, depth {}", leaves, depth),
            10.0,
            y_offset,
            18.0,
            WHITE,
        );
        draw_text(
            &format!("Path: {} (level {})", path_str, self.path.len()),
            10.0,
            y_offset + 20.0,
            18.0,
            YELLOW,
        );
        draw_text(
            if is_leaf { "Children: (leaf)" } else { "Children: [L]eft [R]ight" },
            10.0,
            y_offset + 40.0,
            18.0,
            if is_leaf { ORANGE } else { GREEN },
        );
        draw_text("[P]arent | [Home] root", 10.0, y_offset + 60.0, 16.0, DARKGRAY);
    }
}

/// Follows `path` from `root` as far as the tree allows.
/// Returns the node reached and the number of steps taken.
fn node_at_path<'a, C>(root: NodeRef<'a, C>, path: &[Side]) -> (NodeRef<'a, C>, usize) {
    let mut current = root;
    for (steps, side) in path.iter().enumerate() {
        let Some((left, right)) = current.children() else {
            return (current, steps);
        };
        current = match side {
            Side::Left => left,
            Side::Right => right,
        };
    }
    (current, path.len())
}
