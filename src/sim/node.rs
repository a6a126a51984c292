use std::fmt;

use eframe::egui::{Pos2, Vec2};

use crate::portfolio::Category;
use crate::sizing::node_radius;

pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn root() -> Self {
        Self(ROOT_ID.to_owned())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

/// What the caller supplies per node when (re)building the node set.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSpec {
    pub id: NodeId,
    pub category: Option<Category>,
    pub radius: f32,
    pub is_root: bool,
}

impl NodeSpec {
    pub fn item(name: &str, category: Category, radius: f32) -> Self {
        Self {
            id: NodeId::from(name),
            category: Some(category),
            radius,
            is_root: false,
        }
    }

    pub fn root(radius: f32) -> Self {
        Self {
            id: NodeId::root(),
            category: None,
            radius,
            is_root: true,
        }
    }
}

/// Per-frame view of one node handed to the drawing layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeFrame<'a> {
    pub id: &'a str,
    pub category: Option<Category>,
    pub position: Pos2,
    pub radius: f32,
    pub hovered: bool,
    pub selected: bool,
    pub is_root: bool,
}

#[derive(Debug, Clone)]
pub(crate) struct SimNode {
    pub(crate) id: NodeId,
    pub(crate) category: Option<Category>,
    pub(crate) is_root: bool,
    pub(crate) position: Vec2,
    pub(crate) velocity: Vec2,
    pub(crate) last_good: Vec2,
    pub(crate) base_radius: f32,
    pub(crate) selection_scale: f32,
    pub(crate) hover_scale: f32,
    pub(crate) pin: Option<Vec2>,
    pub(crate) hovered: bool,
}

impl SimNode {
    pub(crate) fn from_spec(spec: NodeSpec, position: Vec2) -> Self {
        Self {
            id: spec.id,
            category: spec.category,
            is_root: spec.is_root,
            position,
            velocity: Vec2::ZERO,
            last_good: position,
            base_radius: sanitize_radius(spec.radius, 0.0),
            selection_scale: 1.0,
            hover_scale: 1.0,
            pin: spec.is_root.then_some(position),
            hovered: false,
        }
    }

    pub(crate) fn drawn_radius(&self, min_radius: f32) -> f32 {
        node_radius(self.base_radius, self.selection_scale, min_radius)
    }

    pub(crate) fn collision_radius(&self, min_radius: f32) -> f32 {
        node_radius(
            self.base_radius,
            self.selection_scale * self.hover_scale,
            min_radius,
        )
    }

    pub(crate) fn selected(&self) -> bool {
        self.selection_scale > 1.0
    }

    pub(crate) fn frame(&self, min_radius: f32) -> NodeFrame<'_> {
        NodeFrame {
            id: self.id.as_str(),
            category: self.category,
            position: self.position.to_pos2(),
            radius: self.drawn_radius(min_radius),
            hovered: self.hovered,
            selected: self.selected(),
            is_root: self.is_root,
        }
    }
}

// Non-finite or negative radii fall back to `fallback`; the floor is applied
// later, when the effective radius is derived.
pub(crate) fn sanitize_radius(radius: f32, fallback: f32) -> f32 {
    if radius.is_finite() && radius >= 0.0 {
        radius
    } else {
        tracing::debug!(radius, fallback, "rejected radius update");
        fallback
    }
}
