mod forces;
mod node;
mod quadtree;

use std::collections::{HashMap, HashSet};
use std::f32::consts::TAU;

use eframe::egui::{Pos2, Vec2, vec2};

use crate::config::ForceConfig;
use crate::viewport::Dimensions;

use forces::{CollisionPass, Repulsion, centering, pointer_pull};
use node::{SimNode, sanitize_radius};
use quadtree::Cell;

pub use node::{NodeFrame, NodeId, NodeSpec, ROOT_ID};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Uninitialized,
    Running,
    Reconfiguring,
    Stopped,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimEvent {
    Settled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    Idle,
    Moved,
    Settled,
}

type TickListener = Box<dyn FnMut(&[NodeFrame<'_>])>;
type EventListener = Box<dyn FnMut(SimEvent)>;

#[derive(Default)]
struct Scratch {
    positions: Vec<Vec2>,
    predicted: Vec<Vec2>,
    velocities: Vec<Vec2>,
    radii: Vec<f32>,
    pinned: Vec<bool>,
}

/// Owns the node arena and every force acting on it. Callers mutate nodes only
/// through the narrow methods below and read them back as [`NodeFrame`]s.
pub struct Simulation {
    config: ForceConfig,
    min_radius: f32,
    phase: Phase,
    nodes: Vec<SimNode>,
    index_by_id: HashMap<String, usize>,
    dimensions: Option<Dimensions>,
    alpha: f32,
    alpha_target: f32,
    settled: bool,
    pointer: Option<Vec2>,
    pointer_enabled: bool,
    hovered: Option<usize>,
    dragging: Option<usize>,
    ticks: u64,
    scratch: Scratch,
    tick_listener: Option<TickListener>,
    event_listener: Option<EventListener>,
}

impl Simulation {
    pub fn new(config: ForceConfig, min_radius: f32) -> Self {
        Self {
            config,
            min_radius: min_radius.max(0.0),
            phase: Phase::Uninitialized,
            nodes: Vec::new(),
            index_by_id: HashMap::new(),
            dimensions: None,
            alpha: 0.0,
            alpha_target: 0.0,
            settled: false,
            pointer: None,
            pointer_enabled: true,
            hovered: None,
            dragging: None,
            ticks: 0,
            scratch: Scratch::default(),
            tick_listener: None,
            event_listener: None,
        }
    }

    pub fn on_tick(&mut self, listener: impl FnMut(&[NodeFrame<'_>]) + 'static) {
        if self.phase != Phase::Stopped {
            self.tick_listener = Some(Box::new(listener));
        }
    }

    pub fn on_event(&mut self, listener: impl FnMut(SimEvent) + 'static) {
        if self.phase != Phase::Stopped {
            self.event_listener = Some(Box::new(listener));
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Running | Phase::Reconfiguring)
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index_by_id.contains_key(id)
    }

    pub fn frames(&self) -> Vec<NodeFrame<'_>> {
        self.nodes
            .iter()
            .map(|node| node.frame(self.min_radius))
            .collect()
    }

    pub fn frame(&self, id: &str) -> Option<NodeFrame<'_>> {
        let &index = self.index_by_id.get(id)?;
        Some(self.nodes[index].frame(self.min_radius))
    }

    pub fn position(&self, id: &str) -> Option<Pos2> {
        self.frame(id).map(|frame| frame.position)
    }

    pub fn velocity(&self, id: &str) -> Option<Vec2> {
        let &index = self.index_by_id.get(id)?;
        Some(self.nodes[index].velocity)
    }

    pub fn collision_radius(&self, id: &str) -> Option<f32> {
        let &index = self.index_by_id.get(id)?;
        Some(self.nodes[index].collision_radius(self.min_radius))
    }

    pub fn is_pinned(&self, id: &str) -> bool {
        self.index_by_id
            .get(id)
            .is_some_and(|&index| self.nodes[index].pin.is_some())
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.map(|index| self.nodes[index].id.as_str())
    }

    // Node under `point`, smallest distance first; used for hit-testing pointer events.
    pub fn node_at(&self, point: Pos2) -> Option<&str> {
        let point = point.to_vec2();
        self.nodes
            .iter()
            .filter_map(|node| {
                let distance = (node.position - point).length();
                (distance <= node.drawn_radius(self.min_radius)).then_some((node, distance))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(node, _)| node.id.as_str())
    }

    pub fn initialize(&mut self, specs: Vec<NodeSpec>, dimensions: Dimensions) {
        if self.phase == Phase::Stopped {
            tracing::debug!("initialize on a stopped simulation ignored");
            return;
        }

        let mut seen = HashSet::new();
        let mut root_seen = false;
        let specs = specs
            .into_iter()
            .filter(|spec| {
                let fresh = seen.insert(spec.id.clone());
                if !fresh {
                    tracing::warn!(id = %spec.id, "duplicate node id dropped");
                }
                fresh
            })
            .map(|mut spec| {
                if spec.is_root {
                    if root_seen {
                        tracing::warn!(id = %spec.id, "second root demoted to a regular node");
                        spec.is_root = false;
                    }
                    root_seen = true;
                }
                spec
            })
            .collect::<Vec<_>>();

        let center = dimensions.center().to_vec2();
        let item_count = specs.iter().filter(|spec| !spec.is_root).count();
        let mut seeds = seed_grid(item_count, dimensions).into_iter();

        self.nodes = specs
            .into_iter()
            .map(|spec| {
                let position = if spec.is_root {
                    center
                } else {
                    seeds.next().unwrap_or(center)
                };
                SimNode::from_spec(spec, position)
            })
            .collect();
        self.index_by_id = self
            .nodes
            .iter()
            .enumerate()
            .map(|(index, node)| (node.id.0.clone(), index))
            .collect();

        self.dimensions = Some(dimensions);
        self.alpha = self.config.initial_alpha;
        self.alpha_target = 0.0;
        self.settled = false;
        self.hovered = None;
        self.dragging = None;
        self.phase = Phase::Running;

        tracing::info!(
            nodes = self.nodes.len(),
            width = dimensions.width,
            height = dimensions.height,
            "simulation initialized"
        );
    }

    /// The only operation that discards positions: a different node set starts over.
    pub fn replace_nodes(&mut self, specs: Vec<NodeSpec>) {
        match (self.phase, self.dimensions) {
            (Phase::Stopped, _) | (_, None) => {
                tracing::debug!("node replacement without a running simulation ignored");
            }
            (_, Some(dimensions)) => self.initialize(specs, dimensions),
        }
    }

    pub fn reheat(&mut self) {
        if !self.is_active() {
            return;
        }
        self.alpha = self.alpha.max(self.config.reheat_alpha);
        self.settled = false;
    }

    fn reconfigured(&mut self) {
        self.phase = Phase::Reconfiguring;
        self.reheat();
    }

    pub fn resize(&mut self, dimensions: Dimensions) {
        if !self.is_active() || self.dimensions == Some(dimensions) {
            return;
        }

        let center = dimensions.center().to_vec2();
        for node in self.nodes.iter_mut().filter(|node| node.is_root) {
            node.position = center;
            node.last_good = center;
            node.velocity = Vec2::ZERO;
            node.pin = Some(center);
        }
        self.dimensions = Some(dimensions);
        tracing::debug!(
            width = dimensions.width,
            height = dimensions.height,
            "simulation resized"
        );
        self.reconfigured();
    }

    pub fn set_base_radii<'a>(&mut self, radii: impl IntoIterator<Item = (&'a str, f32)>) {
        if !self.is_active() {
            return;
        }

        let mut changed = false;
        for (id, radius) in radii {
            let Some(&index) = self.index_by_id.get(id) else {
                continue;
            };
            let node = &mut self.nodes[index];
            let radius = sanitize_radius(radius, node.base_radius);
            if node.base_radius != radius {
                node.base_radius = radius;
                changed = true;
            }
        }

        if changed {
            self.reconfigured();
        }
    }

    // Nodes missing from `scales` return to their unscaled radius.
    pub fn set_selection_scales(&mut self, scales: &HashMap<String, f32>) {
        if !self.is_active() {
            return;
        }

        let mut changed = false;
        for node in &mut self.nodes {
            let scale = scales
                .get(node.id.as_str())
                .copied()
                .filter(|scale| scale.is_finite() && *scale > 0.0)
                .unwrap_or(1.0);
            if node.selection_scale != scale {
                node.selection_scale = scale;
                changed = true;
            }
        }

        if changed {
            self.reconfigured();
        }
    }

    /// Pins the hovered node where it stands and releases the previous one.
    /// Radii follow in [`Self::refresh_hover_radii`].
    pub fn hover(&mut self, id: Option<&str>) -> bool {
        if !self.is_active() {
            return false;
        }

        let next = id.and_then(|id| self.index_by_id.get(id).copied());
        if next == self.hovered {
            return false;
        }

        if let Some(previous) = self.hovered.take() {
            self.nodes[previous].hovered = false;
            if self.dragging != Some(previous) {
                self.release_pin(previous);
            }
        }

        if let Some(index) = next {
            let node = &mut self.nodes[index];
            node.hovered = true;
            if !node.is_root {
                node.pin = Some(node.position);
                node.velocity = Vec2::ZERO;
            }
        }
        self.hovered = next;
        true
    }

    pub fn refresh_hover_radii(&mut self) {
        if !self.is_active() {
            return;
        }

        let previous = self
            .nodes
            .iter()
            .map(|node| node.hover_scale)
            .collect::<Vec<_>>();
        for node in &mut self.nodes {
            node.hover_scale = 1.0;
        }

        // The root has its own affordance and never grows on hover.
        if let Some(hovered) = self.hovered.filter(|&index| !self.nodes[index].is_root) {
            let origin = self.nodes[hovered].position;
            let origin_radius = self.nodes[hovered].collision_radius(self.min_radius);
            self.nodes[hovered].hover_scale = self.config.hover_scale;

            for (index, node) in self.nodes.iter_mut().enumerate() {
                if index == hovered || node.is_root {
                    continue;
                }
                let reach = (origin_radius + node.collision_radius(self.min_radius))
                    * self.config.neighbor_reach;
                if (node.position - origin).length() < reach {
                    node.hover_scale = self.config.neighbor_scale;
                }
            }
        }

        let changed = self
            .nodes
            .iter()
            .zip(previous)
            .any(|(node, before)| node.hover_scale != before);
        if changed {
            self.reconfigured();
        }
    }

    fn release_pin(&mut self, index: usize) {
        let center = self.dimensions.map(|dimensions| dimensions.center().to_vec2());
        let node = &mut self.nodes[index];
        node.pin = if node.is_root {
            center.or(Some(node.position))
        } else if node.hovered {
            Some(node.position)
        } else {
            None
        };
    }

    pub fn drag_start(&mut self, id: &str, pointer: Pos2) -> bool {
        if !self.is_active() || self.config.touch_primary {
            return false;
        }
        let Some(&index) = self.index_by_id.get(id) else {
            return false;
        };

        let pointer = self.clamp_to_field(pointer.to_vec2());
        self.nodes[index].pin = Some(pointer);
        self.dragging = Some(index);
        self.alpha_target = self.config.drag_alpha_target;
        self.settled = false;
        true
    }

    pub fn drag_move(&mut self, pointer: Pos2) {
        if !self.is_active() {
            return;
        }
        if let Some(index) = self.dragging {
            let pointer = self.clamp_to_field(pointer.to_vec2());
            self.nodes[index].pin = Some(pointer);
        }
    }

    pub fn drag_end(&mut self) {
        if !self.is_active() {
            return;
        }
        let Some(index) = self.dragging.take() else {
            return;
        };
        self.alpha_target = 0.0;
        self.release_pin(index);
        if self.nodes[index].is_root
            && let Some(center) = self.nodes[index].pin
        {
            self.nodes[index].position = center;
        }
    }

    pub fn set_pointer_enabled(&mut self, enabled: bool) {
        self.pointer_enabled = enabled;
        if !enabled {
            self.pointer = None;
        }
    }

    pub fn pointer_move(&mut self, pointer: Option<Pos2>) {
        if !self.is_active() || !self.pointer_enabled {
            self.pointer = None;
            return;
        }
        self.pointer = pointer.map(Pos2::to_vec2).filter(|point| {
            point.is_finite()
                && self.dimensions.is_some_and(|dimensions| {
                    (0.0..=dimensions.width).contains(&point.x)
                        && (0.0..=dimensions.height).contains(&point.y)
                })
        });
    }

    fn clamp_to_field(&self, point: Vec2) -> Vec2 {
        match self.dimensions {
            Some(dimensions) if point.is_finite() => vec2(
                point.x.clamp(0.0, dimensions.width),
                point.y.clamp(0.0, dimensions.height),
            ),
            Some(dimensions) => dimensions.center().to_vec2(),
            None => point,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        if !self.is_active() || self.settled {
            return TickOutcome::Idle;
        }
        let Some(dimensions) = self.dimensions else {
            return TickOutcome::Idle;
        };

        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        self.accumulate_forces(dimensions);
        self.integrate(dimensions);
        self.phase = Phase::Running;
        self.ticks += 1;
        self.emit_frames();

        if self.alpha < self.config.alpha_min && self.alpha_target < self.config.alpha_min {
            self.settled = true;
            tracing::debug!(ticks = self.ticks, "simulation settled");
            if let Some(listener) = self.event_listener.as_mut() {
                listener(SimEvent::Settled);
            }
            return TickOutcome::Settled;
        }
        TickOutcome::Moved
    }

    /// Runs ticks until settled or `budget` ticks have run; returns how many ran.
    pub fn settle(&mut self, budget: usize) -> usize {
        let mut ran = 0;
        while ran < budget && self.is_active() && !self.settled {
            self.tick();
            ran += 1;
        }
        ran
    }

    fn accumulate_forces(&mut self, dimensions: Dimensions) {
        let count = self.nodes.len();
        if count == 0 {
            return;
        }

        let scratch = &mut self.scratch;
        scratch.positions.clear();
        scratch.radii.clear();
        scratch.pinned.clear();
        scratch.velocities.clear();
        let padding = self.config.collision_padding.max(0.0) * 0.5;
        for node in &self.nodes {
            scratch.positions.push(node.position);
            scratch.radii.push(node.collision_radius(self.min_radius) + padding);
            scratch.pinned.push(node.pin.is_some());
            scratch.velocities.push(node.velocity);
        }

        let alpha = self.alpha;
        let center = dimensions.center().to_vec2();
        let center_strength = vec2(self.config.center_strength_x, self.config.center_strength_y);
        let pointer = self.pointer.filter(|_| self.pointer_enabled);
        let pointer_strength = self.config.pointer_strength();
        let repulsion = Repulsion {
            strength: self.config.repulsion_strength * alpha,
            softening: self.config.repulsion_softening.max(1.0),
            theta: self.config.barnes_hut_theta,
        };

        if let Some(tree) = Cell::build(&scratch.positions, &scratch.radii) {
            for index in 0..count {
                if scratch.pinned[index] {
                    continue;
                }
                let position = scratch.positions[index];
                let mut push = Vec2::ZERO;
                repulsion.accumulate(&tree, index, &scratch.positions, &mut push);
                push += centering(position, center, center_strength, alpha);
                if let Some(pointer) = pointer {
                    push += pointer_pull(position, pointer, pointer_strength, alpha);
                }
                scratch.velocities[index] += push;
            }
        }

        scratch.predicted.clear();
        scratch.predicted.extend(
            scratch
                .positions
                .iter()
                .zip(&scratch.velocities)
                .map(|(position, velocity)| *position + *velocity),
        );
        if let Some(tree) = Cell::build(&scratch.predicted, &scratch.radii) {
            CollisionPass {
                positions: &scratch.predicted,
                radii: &scratch.radii,
                pinned: &scratch.pinned,
                strength: self.config.collision_strength,
            }
            .resolve(&tree, &mut scratch.velocities);
        }

        for (node, velocity) in self.nodes.iter_mut().zip(&scratch.velocities) {
            node.velocity = *velocity;
        }
    }

    fn integrate(&mut self, dimensions: Dimensions) {
        let keep = (1.0 - self.config.velocity_decay).clamp(0.0, 1.0);
        let max_speed = self.config.max_speed.max(0.0);

        for node in &mut self.nodes {
            if let Some(pin) = node.pin {
                node.position = pin;
                node.velocity = Vec2::ZERO;
                node.last_good = pin;
                continue;
            }

            node.velocity *= keep;
            let speed = node.velocity.length();
            if speed > max_speed {
                node.velocity *= max_speed / speed;
            }

            let margin = node.drawn_radius(self.min_radius) + self.config.boundary_padding;
            let next = node.position + node.velocity;
            let bounded = vec2(
                clamp_axis(next.x, margin, dimensions.width),
                clamp_axis(next.y, margin, dimensions.height),
            );
            if bounded.x != next.x {
                node.velocity.x = 0.0;
            }
            if bounded.y != next.y {
                node.velocity.y = 0.0;
            }

            // The boundary pulls back gradually; no single tick moves farther than max_speed.
            let mut step = bounded - node.position;
            let step_length = step.length();
            if step_length > max_speed {
                step *= max_speed / step_length;
            }
            node.position += step;

            if node.position.is_finite() && node.velocity.is_finite() {
                node.last_good = node.position;
            } else {
                tracing::warn!(
                    id = %node.id,
                    "non-finite node state, restoring last good position"
                );
                node.position = node.last_good;
                node.velocity = Vec2::ZERO;
            }
        }
    }

    fn emit_frames(&mut self) {
        let Some(listener) = self.tick_listener.as_mut() else {
            return;
        };
        let min_radius = self.min_radius;
        let frames = self
            .nodes
            .iter()
            .map(|node| node.frame(min_radius))
            .collect::<Vec<_>>();
        listener(&frames);
    }

    /// Stops the integrator for good and drops every listener. Later calls are no-ops.
    pub fn teardown(&mut self) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.phase = Phase::Stopped;
        self.tick_listener = None;
        self.event_listener = None;
        self.pointer = None;
        self.dragging = None;
        tracing::debug!(ticks = self.ticks, "simulation torn down");
    }
}

fn clamp_axis(value: f32, margin: f32, extent: f32) -> f32 {
    if extent <= margin * 2.0 {
        extent * 0.5
    } else {
        value.clamp(margin, extent - margin)
    }
}

// Spreads `count` nodes over a grid covering the viewport, with a small
// deterministic offset so no two nodes (or a node and the root) coincide.
fn seed_grid(count: usize, dimensions: Dimensions) -> Vec<Vec2> {
    if count == 0 {
        return Vec::new();
    }

    let aspect = (dimensions.width / dimensions.height.max(1.0)).clamp(0.2, 5.0);
    let columns = ((count as f32 * aspect).sqrt().ceil() as usize).max(1);
    let rows = count.div_ceil(columns);
    let cell = vec2(
        dimensions.width / columns as f32,
        dimensions.height / rows as f32,
    );
    let jitter = cell.min_elem() * 0.12;

    (0..count)
        .map(|index| {
            let column = index % columns;
            let row = index / columns;
            let angle = ((index as f32) * 0.618_034 + 0.11) * TAU;
            vec2(
                cell.x * (column as f32 + 0.5),
                cell.y * (row as f32 + 0.5),
            ) + vec2(angle.cos(), angle.sin()) * jitter
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::Category;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn dims() -> Dimensions {
        Dimensions::new(800.0, 600.0)
    }

    fn specs(count: usize) -> Vec<NodeSpec> {
        let mut specs = vec![NodeSpec::root(60.0)];
        specs.extend((0..count).map(|i| {
            NodeSpec::item(
                &format!("item-{i}"),
                Category::ALL[i % 6],
                20.0 + (i % 4) as f32 * 6.0,
            )
        }));
        specs
    }

    fn running(count: usize) -> Simulation {
        let mut sim = Simulation::new(ForceConfig::default(), 22.0);
        sim.initialize(specs(count), dims());
        sim
    }

    #[test]
    fn starts_uninitialized_and_idle() {
        let mut sim = Simulation::new(ForceConfig::default(), 22.0);
        assert_eq!(sim.phase(), Phase::Uninitialized);
        assert_eq!(sim.tick(), TickOutcome::Idle);
        sim.resize(dims());
        assert_eq!(sim.dimensions(), None);
    }

    #[test]
    fn root_stays_at_center() {
        let mut sim = running(20);
        for _ in 0..50 {
            sim.tick();
        }
        assert_eq!(sim.position(ROOT_ID), Some(dims().center()));

        let wider = Dimensions::new(1000.0, 600.0);
        sim.resize(wider);
        assert_eq!(sim.phase(), Phase::Reconfiguring);
        sim.tick();
        assert_eq!(sim.phase(), Phase::Running);
        assert_eq!(sim.position(ROOT_ID), Some(wider.center()));
    }

    #[test]
    fn seeding_avoids_degenerate_start() {
        let sim = running(30);
        let frames = sim.frames();
        for (i, a) in frames.iter().enumerate() {
            for b in &frames[i + 1..] {
                assert!(a.position.distance(b.position) > 1.0, "{} and {}", a.id, b.id);
            }
        }
    }

    #[test]
    fn settles_and_reports_once() {
        let mut sim = running(12);
        let settled = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&settled);
        sim.on_event(move |event| {
            if event == SimEvent::Settled {
                *counter.borrow_mut() += 1;
            }
        });

        let ran = sim.settle(5_000);
        assert!(sim.is_settled());
        assert!(ran < 5_000);
        assert_eq!(sim.tick(), TickOutcome::Idle);
        assert_eq!(*settled.borrow(), 1);
    }

    #[test]
    fn tick_listener_sees_every_node() {
        let mut sim = running(8);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        sim.on_tick(move |frames| sink.borrow_mut().push(frames.len()));
        sim.tick();
        sim.tick();
        assert_eq!(*seen.borrow(), vec![9, 9]);
    }

    #[test]
    fn settled_layout_keeps_nodes_apart_and_inside() {
        let mut sim = running(16);
        sim.settle(5_000);
        let frames = sim.frames();
        for frame in &frames {
            assert!(frame.position.x >= 0.0 && frame.position.x <= 800.0);
            assert!(frame.position.y >= 0.0 && frame.position.y <= 600.0);
        }
        for (i, a) in frames.iter().enumerate() {
            for b in &frames[i + 1..] {
                let gap = a.position.distance(b.position) - (a.radius + b.radius);
                assert!(gap > -4.0, "{} overlaps {} by {}", a.id, b.id, -gap);
            }
        }
    }

    #[test]
    fn radius_floor_applies_to_degenerate_radii() {
        let mut sim = Simulation::new(ForceConfig::default(), 22.0);
        sim.initialize(
            vec![
                NodeSpec::root(60.0),
                NodeSpec::item("zero", Category::Data, 0.0),
                NodeSpec::item("nan", Category::Data, f32::NAN),
            ],
            dims(),
        );
        assert_eq!(sim.collision_radius("zero"), Some(22.0));
        assert_eq!(sim.collision_radius("nan"), Some(22.0));

        sim.set_base_radii([("zero", -3.0), ("nan", f32::INFINITY)]);
        assert_eq!(sim.collision_radius("zero"), Some(22.0));
        for _ in 0..20 {
            sim.tick();
        }
        assert!(
            sim.frames()
                .iter()
                .all(|f| f.position.x.is_finite() && f.position.y.is_finite())
        );
    }

    #[test]
    fn hover_pins_and_bumps_neighbours() {
        let mut sim = running(10);
        let before = sim.collision_radius("item-3").expect("node");
        assert!(sim.hover(Some("item-3")));
        assert!(!sim.hover(Some("item-3")));
        assert!(sim.is_pinned("item-3"));

        sim.refresh_hover_radii();
        let after = sim.collision_radius("item-3").expect("node");
        assert!((after - before * ForceConfig::default().hover_scale).abs() < 1e-3);

        let pinned_at = sim.position("item-3");
        for _ in 0..10 {
            sim.tick();
        }
        assert_eq!(sim.position("item-3"), pinned_at);

        assert!(sim.hover(None));
        sim.refresh_hover_radii();
        assert!(!sim.is_pinned("item-3"));
        assert_eq!(sim.collision_radius("item-3"), Some(before));
    }

    #[test]
    fn drag_pins_to_pointer_and_root_snaps_back() {
        let mut sim = running(6);
        assert!(sim.drag_start(ROOT_ID, Pos2::new(100.0, 100.0)));
        sim.tick();
        assert_eq!(sim.position(ROOT_ID), Some(Pos2::new(100.0, 100.0)));
        sim.drag_move(Pos2::new(5_000.0, 120.0));
        sim.tick();
        assert_eq!(sim.position(ROOT_ID), Some(Pos2::new(800.0, 120.0)));
        sim.drag_end();
        assert_eq!(sim.position(ROOT_ID), Some(dims().center()));

        assert!(sim.drag_start("item-1", Pos2::new(50.0, 50.0)));
        sim.drag_end();
        assert!(!sim.is_pinned("item-1"));
    }

    #[test]
    fn drag_is_suppressed_on_touch_devices() {
        let config = ForceConfig {
            touch_primary: true,
            ..ForceConfig::default()
        };
        let mut sim = Simulation::new(config, 22.0);
        sim.initialize(specs(3), dims());
        assert!(!sim.drag_start("item-0", Pos2::new(10.0, 10.0)));
        assert!(!sim.is_pinned("item-0"));
    }

    #[test]
    fn pointer_outside_field_is_ignored() {
        let mut sim = running(3);
        sim.pointer_move(Some(Pos2::new(-10.0, 20.0)));
        assert_eq!(sim.pointer, None);
        sim.pointer_move(Some(Pos2::new(10.0, 20.0)));
        assert_eq!(sim.pointer, Some(vec2(10.0, 20.0)));
        sim.set_pointer_enabled(false);
        assert_eq!(sim.pointer, None);
    }

    #[test]
    fn teardown_makes_everything_a_no_op() {
        let mut sim = running(5);
        sim.tick();
        let frozen = sim
            .frames()
            .iter()
            .map(|frame| frame.position)
            .collect::<Vec<_>>();

        sim.teardown();
        assert_eq!(sim.tick(), TickOutcome::Idle);
        sim.resize(Dimensions::new(300.0, 300.0));
        sim.set_base_radii([("item-0", 80.0)]);
        assert!(!sim.hover(Some("item-1")));
        sim.initialize(specs(2), dims());

        assert_eq!(sim.phase(), Phase::Stopped);
        let after = sim
            .frames()
            .iter()
            .map(|frame| frame.position)
            .collect::<Vec<_>>();
        assert_eq!(frozen, after);
    }

    #[test]
    fn duplicate_ids_and_roots_are_normalized() {
        let mut sim = Simulation::new(ForceConfig::default(), 22.0);
        sim.initialize(
            vec![
                NodeSpec::root(60.0),
                NodeSpec::item("a", Category::Data, 20.0),
                NodeSpec::item("a", Category::Data, 20.0),
                NodeSpec {
                    id: NodeId::from("b"),
                    category: None,
                    radius: 30.0,
                    is_root: true,
                },
            ],
            dims(),
        );
        assert_eq!(sim.len(), 3);
        assert!(!sim.frame("b").expect("b").is_root);
    }

    #[test]
    fn grid_seed_covers_viewport() {
        let seeds = seed_grid(12, dims());
        assert_eq!(seeds.len(), 12);
        assert!(seeds.iter().all(|p| p.x > 0.0 && p.x < 800.0 && p.y > 0.0 && p.y < 600.0));
    }
}
