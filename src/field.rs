//! Mount lifecycle of the technology field. Owns every piece of mutable state
//! and routes viewer input to it.
//!
//! Work comes in two tiers. Clicks and keyboard activation are urgent: their
//! intent is produced and returned in the same call. Derived highlight
//! propagation (selection scales, hover radius growth, the reheat that
//! follows) is queued and applied at the start of the next [`Field::frame`].

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use eframe::egui::{Pos2, Vec2};

use crate::config::FieldConfig;
use crate::experience::ExperienceTable;
use crate::portfolio::{Category, Portfolio};
use crate::selection::{
    self, HoverState, SelectionIntent, SelectionState, ShareState, selection_scales,
};
use crate::sim::{NodeFrame, NodeSpec, Phase, ROOT_ID, Simulation, TickOutcome};
use crate::sizing::{node_radius, scale_factor, scale_level};
use crate::sphere::{self, SpherePoint};
use crate::summary::RootSummary;
use crate::viewport::{DimensionProvider, Dimensions};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FieldEvent {
    Settled,
    HoverChanged(HoverState),
    SelectionIntent(SelectionIntent),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Deferred {
    ApplySelection,
    RefreshHover,
}

pub struct Field {
    config: FieldConfig,
    portfolio: Portfolio,
    table: ExperienceTable,
    summary: RootSummary,
    specs: Vec<NodeSpec>,
    sim: Simulation,
    viewport: DimensionProvider,
    share: ShareState,
    hover: HoverState,
    selection: SelectionState,
    deferred: VecDeque<Deferred>,
    events: Vec<FieldEvent>,
    mounted: bool,
}

impl Field {
    pub fn mount(portfolio: Portfolio, config: FieldConfig, today: NaiveDate) -> Self {
        let table = ExperienceTable::build(&portfolio, today);
        let summary = RootSummary::build(
            &table,
            config.sizing.root_radius,
            config.selection.segment_ring_width,
        );
        let specs = node_specs(&portfolio, &table, &config);
        let mut sim = Simulation::new(config.forces.clone(), config.sizing.min_radius);
        sim.set_pointer_enabled(!config.motion.reduced_motion);
        let viewport = DimensionProvider::new(&config.viewport);

        tracing::info!(nodes = specs.len(), %today, "field mounted");

        Self {
            config,
            portfolio,
            table,
            summary,
            specs,
            sim,
            viewport,
            share: ShareState::default(),
            hover: HoverState::default(),
            selection: SelectionState::default(),
            deferred: VecDeque::new(),
            events: Vec::new(),
            mounted: true,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn table(&self) -> &ExperienceTable {
        &self.table
    }

    pub fn summary(&self) -> &RootSummary {
        &self.summary
    }

    pub fn simulation(&self) -> &Simulation {
        &self.sim
    }

    pub fn share_state(&self) -> &ShareState {
        &self.share
    }

    pub fn hover_state(&self) -> &HoverState {
        &self.hover
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn dimensions(&self) -> Option<Dimensions> {
        self.sim.dimensions()
    }

    pub fn frames(&self) -> Vec<NodeFrame<'_>> {
        self.sim.frames()
    }

    pub fn has_deferred_work(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn drain_events(&mut self) -> Vec<FieldEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn reduced_motion(&self) -> bool {
        self.config.motion.reduced_motion
    }

    pub fn transition_duration(&self) -> Duration {
        if self.reduced_motion() {
            Duration::ZERO
        } else {
            Duration::from_millis(self.config.motion.transition_ms)
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if !self.mounted || self.config.motion.reduced_motion == reduced {
            return;
        }
        self.config.motion.reduced_motion = reduced;
        self.sim.set_pointer_enabled(!reduced);
        tracing::debug!(reduced, "reduced motion changed");
        self.settle_if_reduced();
    }

    /// Size tier of a node, `0..levels`, for renderers that draw discrete sizes.
    pub fn node_level(&self, node: &str) -> usize {
        let months = self.node_months();
        let value = self.table.node(node).total_months as f32;
        scale_level(value, &months, self.config.sizing.levels)
    }

    /// Static sphere arrangement of the same nodes, in node order.
    pub fn sphere_layout(&self, radius: f64) -> Vec<(&str, SpherePoint)> {
        let items = self
            .specs
            .iter()
            .filter(|spec| !spec.is_root)
            .collect::<Vec<_>>();
        items
            .iter()
            .map(|spec| spec.id.as_str())
            .zip(sphere::distribute(items.len(), radius))
            .collect()
    }

    fn node_months(&self) -> Vec<f32> {
        self.table.node_months(
            self.specs
                .iter()
                .filter(|spec| !spec.is_root)
                .map(|spec| spec.id.as_str()),
        )
    }

    pub fn observe_size(&mut self, width: f32, height: f32, now: Instant) {
        if self.mounted {
            self.viewport.observe(width, height, now);
        }
    }

    /// Replaces the node set; the simulation restarts from a fresh seed.
    pub fn set_portfolio(&mut self, portfolio: Portfolio, today: NaiveDate) {
        if !self.mounted {
            return;
        }
        self.table = ExperienceTable::build(&portfolio, today);
        self.summary = RootSummary::build(
            &self.table,
            self.config.sizing.root_radius,
            self.config.selection.segment_ring_width,
        );
        self.specs = node_specs(&portfolio, &self.table, &self.config);
        self.portfolio = portfolio;
        self.hover = HoverState::default();
        self.selection = selection::resolve(&self.share, &self.hover, &self.portfolio);

        if self.sim.phase() != Phase::Uninitialized {
            self.sim.replace_nodes(self.specs.clone());
            self.queue(Deferred::ApplySelection);
        }
    }

    pub fn set_share_state(&mut self, share: ShareState) {
        if !self.mounted || self.share == share {
            return;
        }
        self.share = share;
        self.reselect();
        self.queue(Deferred::ApplySelection);
    }

    pub fn hover_node(&mut self, node: Option<&str>) {
        // Ids the simulation does not hold hover nothing.
        let node = node.filter(|id| self.sim.contains(id));
        if !self.mounted || !self.sim.is_active() || self.hover.node.as_deref() == node {
            return;
        }
        // Pinning is immediate so the node stops under the pointer; radii follow.
        self.sim.hover(node);
        self.hover.node = node.map(str::to_owned);
        self.hover_changed();
        self.queue(Deferred::RefreshHover);
    }

    pub fn hover_category(&mut self, category: Option<Category>) {
        if !self.mounted || self.hover.category == category {
            return;
        }
        self.hover.category = category;
        self.hover_changed();
    }

    /// Hit-tests the root ring; `offset` is relative to the root center.
    pub fn hover_summary_at(&mut self, offset: Option<Vec2>) {
        let category = offset.and_then(|offset| {
            self.summary
                .segment_at(offset, self.selection.active_category)
                .map(|segment| segment.category)
        });
        self.hover_category(category);
    }

    fn hover_changed(&mut self) {
        self.reselect();
        self.events.push(FieldEvent::HoverChanged(self.hover.clone()));
    }

    fn reselect(&mut self) {
        self.selection = selection::resolve(&self.share, &self.hover, &self.portfolio);
    }

    pub fn click_node(&mut self, node: &str) -> Option<SelectionIntent> {
        if !self.mounted {
            return None;
        }
        let intent = selection::click_node(&self.portfolio, node)?;
        self.events.push(FieldEvent::SelectionIntent(intent.clone()));
        Some(intent)
    }

    pub fn click_category(&mut self, category: Category) -> Option<SelectionIntent> {
        if !self.mounted {
            return None;
        }
        let intent = selection::click_category(category);
        self.events.push(FieldEvent::SelectionIntent(intent.clone()));
        Some(intent)
    }

    pub fn node_at(&self, point: Pos2) -> Option<&str> {
        self.sim.node_at(point)
    }

    pub fn pointer_move(&mut self, pointer: Option<Pos2>) {
        if self.mounted {
            self.sim.pointer_move(pointer);
        }
    }

    pub fn drag_start(&mut self, node: &str, pointer: Pos2) -> bool {
        self.mounted && self.sim.drag_start(node, pointer)
    }

    pub fn drag_move(&mut self, pointer: Pos2) {
        if self.mounted {
            self.sim.drag_move(pointer);
        }
    }

    pub fn drag_end(&mut self) {
        if self.mounted {
            self.sim.drag_end();
            self.settle_if_reduced();
        }
    }

    /// One animation frame: settled resize, then deferred work, then exactly
    /// one integrator step. Frames missed by the caller are not replayed.
    pub fn frame(&mut self, now: Instant) -> TickOutcome {
        if !self.mounted {
            return TickOutcome::Idle;
        }

        if let Some(dimensions) = self.viewport.poll(now) {
            self.apply_dimensions(dimensions);
        }
        self.drain_deferred();

        let outcome = self.sim.tick();
        if outcome == TickOutcome::Settled {
            self.events.push(FieldEvent::Settled);
        }
        outcome
    }

    fn apply_dimensions(&mut self, dimensions: Dimensions) {
        match self.sim.phase() {
            Phase::Uninitialized => {
                self.sim.initialize(self.specs.clone(), dimensions);
                self.queue(Deferred::ApplySelection);
            }
            Phase::Running | Phase::Reconfiguring => {
                self.sim.resize(dimensions);
                self.settle_if_reduced();
            }
            Phase::Stopped => {}
        }
    }

    fn queue(&mut self, work: Deferred) {
        if !self.deferred.contains(&work) {
            self.deferred.push_back(work);
        }
    }

    fn drain_deferred(&mut self) {
        if !self.sim.is_active() {
            return;
        }
        let mut ran = false;
        while let Some(work) = self.deferred.pop_front() {
            match work {
                Deferred::ApplySelection => {
                    let scales =
                        selection_scales(&self.selection, self.config.selection.selected_scale);
                    self.sim.set_selection_scales(&scales);
                }
                Deferred::RefreshHover => self.sim.refresh_hover_radii(),
            }
            ran = true;
        }
        if ran {
            self.settle_if_reduced();
        }
    }

    fn settle_if_reduced(&mut self) {
        if self.reduced_motion() && self.sim.is_active() {
            let was_settled = self.sim.is_settled();
            let ticks = self.sim.settle(self.config.motion.settle_tick_budget);
            tracing::trace!(ticks, "settled synchronously");
            if !was_settled && self.sim.is_settled() {
                self.events.push(FieldEvent::Settled);
            }
        }
    }

    /// Stops the integrator, drops callbacks and cancels pending resize and
    /// deferred work. Every later call is a no-op.
    pub fn unmount(&mut self) {
        if !self.mounted {
            return;
        }
        self.mounted = false;
        self.sim.teardown();
        self.viewport.cancel();
        self.deferred.clear();
        self.events.clear();
        tracing::info!("field unmounted");
    }
}

impl Drop for Field {
    fn drop(&mut self) {
        self.unmount();
    }
}

fn node_specs(
    portfolio: &Portfolio,
    table: &ExperienceTable,
    config: &FieldConfig,
) -> Vec<NodeSpec> {
    let sizing = &config.sizing;
    let items = portfolio
        .visual_items()
        .filter(|item| {
            let reserved = item.name == ROOT_ID;
            if reserved {
                tracing::warn!(
                    item = %item.name,
                    "item name collides with the root node, skipped"
                );
            }
            !reserved
        })
        .collect::<Vec<_>>();
    let months = table.node_months(items.iter().map(|item| item.name.as_str()));

    let mut specs = Vec::with_capacity(items.len() + 1);
    // The root collides with its summary ring at full (active) thickness.
    let ring_reach = config.selection.segment_ring_width.max(0.0) * 2.0;
    specs.push(NodeSpec::root(node_radius(
        sizing.root_radius + ring_reach,
        1.0,
        sizing.min_radius,
    )));
    specs.extend(items.iter().zip(&months).map(|(item, &value)| {
        let factor = scale_factor(value, &months, sizing.range);
        NodeSpec::item(
            &item.name,
            item.category,
            node_radius(sizing.base_radius, factor, sizing.min_radius),
        )
    }));
    specs
}
