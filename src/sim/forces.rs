use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};

use super::quadtree::Cell;

const MIN_DISTANCE: f32 = 0.0001;

// Deterministic spread direction for coincident points.
pub(super) fn fallback_direction(a: usize, b: usize) -> Vec2 {
    let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * TAU;
    vec2(angle.cos(), angle.sin())
}

#[derive(Clone, Copy)]
pub(super) struct Repulsion {
    pub(super) strength: f32,
    pub(super) softening: f32,
    pub(super) theta: f32,
}

impl Repulsion {
    fn between(self, point: Vec2, other: Vec2, mass: f32, fallback: Vec2) -> Vec2 {
        let delta = point - other;
        let distance_sq = delta.length_sq();
        let direction = if distance_sq > MIN_DISTANCE * MIN_DISTANCE {
            delta / distance_sq.sqrt()
        } else {
            fallback
        };
        direction * (self.strength * mass / (distance_sq + self.softening))
    }

    pub(super) fn accumulate(self, cell: &Cell, index: usize, positions: &[Vec2], out: &mut Vec2) {
        if cell.mass <= 0.0 {
            return;
        }
        let point = positions[index];

        if cell.is_leaf() {
            for &other in &cell.members {
                if other != index {
                    *out += self.between(
                        point,
                        positions[other],
                        1.0,
                        fallback_direction(index, other),
                    );
                }
            }
            return;
        }

        let distance = (point - cell.center_of_mass).length().max(MIN_DISTANCE);
        let far_enough = !cell.region.contains(point) && cell.region.side() / distance < self.theta;
        if far_enough && cell.mass > 1.0 {
            *out += self.between(
                point,
                cell.center_of_mass,
                cell.mass,
                fallback_direction(index, 0),
            );
            return;
        }

        for child in cell.children() {
            self.accumulate(child, index, positions, out);
        }
    }
}

pub(super) struct CollisionPass<'a> {
    pub(super) positions: &'a [Vec2],
    pub(super) radii: &'a [f32],
    pub(super) pinned: &'a [bool],
    pub(super) strength: f32,
}

impl CollisionPass<'_> {
    pub(super) fn resolve(&self, tree: &Cell, velocities: &mut [Vec2]) {
        for index in 0..self.positions.len() {
            if self.positions[index].is_finite() {
                self.visit(tree, index, velocities);
            }
        }
    }

    fn visit(&self, cell: &Cell, index: usize, velocities: &mut [Vec2]) {
        let reach = self.radii[index] + cell.max_radius;
        if cell.region.distance_to(self.positions[index]) > reach {
            return;
        }

        if cell.is_leaf() {
            for &other in &cell.members {
                // Each unordered pair once; a node never collides with itself.
                if other > index {
                    self.separate(index, other, velocities);
                }
            }
            return;
        }

        for child in cell.children() {
            self.visit(child, index, velocities);
        }
    }

    fn separate(&self, a: usize, b: usize, velocities: &mut [Vec2]) {
        let (pinned_a, pinned_b) = (self.pinned[a], self.pinned[b]);
        if pinned_a && pinned_b {
            return;
        }

        let min_distance = self.radii[a] + self.radii[b];
        let delta = self.positions[a] - self.positions[b];
        let distance_sq = delta.length_sq();
        if distance_sq >= min_distance * min_distance {
            return;
        }

        let distance = distance_sq.sqrt();
        let direction = if distance > MIN_DISTANCE {
            delta / distance
        } else {
            fallback_direction(a, b)
        };
        let push = direction * (min_distance - distance) * self.strength;

        // Larger nodes yield less; a pinned node does not yield at all.
        let (ra_sq, rb_sq) = (self.radii[a].powi(2), self.radii[b].powi(2));
        let share_a = if pinned_a {
            0.0
        } else if pinned_b {
            1.0
        } else if ra_sq + rb_sq > 0.0 {
            rb_sq / (ra_sq + rb_sq)
        } else {
            0.5
        };

        velocities[a] += push * share_a;
        velocities[b] -= push * (1.0 - share_a);
    }
}

pub(super) fn centering(position: Vec2, center: Vec2, strength: Vec2, alpha: f32) -> Vec2 {
    (center - position) * strength * alpha
}

pub(super) fn pointer_pull(position: Vec2, pointer: Vec2, strength: f32, alpha: f32) -> Vec2 {
    (pointer - position) * (strength * alpha)
}
