use std::cell::Cell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::{Duration, Instant};

use chrono::NaiveDate;
use eframe::egui::{Pos2, Vec2};

use folio_field::config::ForceConfig;
use folio_field::experience::aggregate_at;
use folio_field::selection::{self, HoverState};
use folio_field::sim::{NodeSpec, Phase, ROOT_ID, Simulation};
use folio_field::sizing::{SizeRange, scale_factor};
use folio_field::sphere::{distribute, min_angular_separation};
use folio_field::{
    Category, Dimensions, Engagement, EngagementEnd, Field, FieldConfig, FieldEvent, Portfolio,
    ShareState, TickOutcome,
};

const SAMPLE: &str = include_str!("../assets/portfolio.json");

fn ymd(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).expect("valid date")
}

fn specs(count: usize) -> Vec<NodeSpec> {
    let mut specs = vec![NodeSpec::root(64.0)];
    specs.extend((0..count).map(|i| {
        NodeSpec::item(&format!("tech-{i}"), Category::ALL[i % 6], 18.0 + (i % 5) as f32 * 5.0)
    }));
    specs
}

fn positions(sim: &Simulation) -> HashMap<String, Pos2> {
    sim.frames()
        .into_iter()
        .map(|frame| (frame.id.to_owned(), frame.position))
        .collect()
}

#[test]
fn sphere_points_are_evenly_spread_with_valid_depth() {
    assert!(distribute(0, 100.0).is_empty());
    let single = distribute(1, 100.0);
    assert_eq!(single.len(), 1);
    assert_eq!(single[0].depth, 0.0);

    for count in [8, 40, 200] {
        let points = distribute(count, 100.0);
        assert_eq!(points.len(), count);
        assert!(points.iter().all(|p| (0.0..=1.0).contains(&p.depth)));

        let ideal = (4.0 * std::f64::consts::PI / count as f64).sqrt();
        let spacing = min_angular_separation(&points);
        assert!(spacing > ideal * 0.5, "n={count}: {spacing} vs {ideal}");
    }
}

#[test]
fn overlapping_ranges_union_and_present_keeps_growing() {
    let overlapping = [
        Engagement::new("Rust", ymd(2020, 1), EngagementEnd::On(ymd(2020, 6))),
        Engagement::new("Rust", ymd(2020, 3), EngagementEnd::On(ymd(2020, 9))),
    ];
    let totals = aggregate_at(&overlapping, ymd(2024, 1));
    assert_eq!(totals["Rust"].total_months, 9);
    assert_eq!(totals["Rust"].engagement_count, 2);

    let ongoing = [Engagement::new("Nix", ymd(2023, 1), EngagementEnd::Present)];
    let now = aggregate_at(&ongoing, ymd(2024, 5))["Nix"].total_months;
    let later = aggregate_at(&ongoing, ymd(2024, 6))["Nix"].total_months;
    assert_eq!(later, now + 1);
}

#[test]
fn scale_factor_is_monotonic_with_degenerate_midpoint() {
    let values = [2.0, 5.0, 9.0, 30.0, 61.0];
    let range = SizeRange { min: 1.0, max: 3.0 };
    let mapped = values
        .iter()
        .map(|value| scale_factor(*value, &values, range))
        .collect::<Vec<_>>();
    assert!(mapped.windows(2).all(|pair| pair[0] <= pair[1]));
    assert_eq!(scale_factor(7.0, &[7.0, 7.0], range), 2.0);
    assert_eq!(scale_factor(7.0, &[], range), 2.0);
}

fn motion(sim: &Simulation) -> HashMap<String, (Pos2, Vec2)> {
    sim.frames()
        .into_iter()
        .filter(|frame| !frame.is_root)
        .map(|frame| {
            let velocity = sim.velocity(frame.id).unwrap_or(Vec2::ZERO);
            (frame.id.to_owned(), (frame.position, velocity))
        })
        .collect()
}

fn warmed_up(count: usize) -> Simulation {
    let mut sim = Simulation::new(ForceConfig::default(), 22.0);
    sim.initialize(specs(count), Dimensions::new(900.0, 640.0));
    for _ in 0..40 {
        sim.tick();
    }
    sim
}

#[test]
fn reconfigures_keep_positions_and_velocities() {
    let mut sim = warmed_up(24);
    let grown = (0..24).map(|i| format!("tech-{i}")).collect::<Vec<_>>();
    let before = motion(&sim);
    sim.set_base_radii(grown.iter().map(|id| (id.as_str(), 70.0)));
    assert_eq!(sim.phase(), Phase::Reconfiguring);
    assert_eq!(motion(&sim), before);

    let mut sim = warmed_up(24);
    let before = motion(&sim);
    sim.resize(Dimensions::new(1200.0, 800.0));
    assert_eq!(sim.phase(), Phase::Reconfiguring);
    assert_eq!(motion(&sim), before);
    assert_eq!(sim.position(ROOT_ID), Some(Pos2::new(600.0, 400.0)));

    let mut sim = warmed_up(24);
    let before = motion(&sim);
    let scales = (0..6)
        .map(|i| (format!("tech-{i}"), 1.3))
        .collect::<HashMap<_, _>>();
    sim.set_selection_scales(&scales);
    assert_eq!(sim.phase(), Phase::Reconfiguring);
    assert_eq!(motion(&sim), before);
}

#[test]
fn radius_reconfigure_never_jumps_a_node() {
    let config = ForceConfig::default();
    let max_speed = config.max_speed;
    let mut sim = Simulation::new(config, 22.0);
    sim.initialize(specs(24), Dimensions::new(900.0, 640.0));
    for _ in 0..40 {
        sim.tick();
    }

    let grown = (0..24)
        .map(|i| (format!("tech-{i}"), 70.0))
        .collect::<Vec<_>>();
    sim.set_base_radii(grown.iter().map(|(id, radius)| (id.as_str(), *radius)));
    assert_eq!(sim.phase(), Phase::Reconfiguring);

    let mut before = positions(&sim);
    for _ in 0..60 {
        sim.tick();
        let after = positions(&sim);
        for (id, position) in &after {
            let moved = position.distance(before[id]);
            assert!(moved <= max_speed + 1e-3, "{id} moved {moved}");
        }
        before = after;
    }
}

#[test]
fn hover_release_lets_the_node_move_again() {
    let mut sim = Simulation::new(ForceConfig::default(), 22.0);
    sim.initialize(specs(12), Dimensions::new(800.0, 600.0));
    for _ in 0..10 {
        sim.tick();
    }

    sim.hover(Some("tech-3"));
    sim.refresh_hover_radii();
    let pinned = sim.position("tech-3");
    for _ in 0..20 {
        sim.tick();
    }
    assert_eq!(sim.position("tech-3"), pinned);

    sim.hover(None);
    sim.refresh_hover_radii();
    assert!(!sim.is_pinned("tech-3"));
    let moved = (0..30).any(|_| {
        sim.tick();
        sim.position("tech-3") != pinned
    });
    assert!(moved);
}

#[test]
fn query_and_filter_channels_stay_independent() {
    let portfolio = Portfolio::from_json(SAMPLE).expect("sample portfolio");
    let share = ShareState::from_search("query=Rust&filter=DevOps");
    let state = selection::resolve(&share, &HoverState::default(), &portfolio);

    assert_eq!(state.active_category, Some(Category::DevOps));
    assert_eq!(state.active_item.as_deref(), Some("Rust"));
    assert!(state.selected.contains("Kubernetes"));
    assert!(state.selected.contains("Rust"));
}

#[test]
fn late_tick_after_teardown_mutates_nothing() {
    let mut sim = Simulation::new(ForceConfig::default(), 22.0);
    sim.initialize(specs(6), Dimensions::new(600.0, 600.0));
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    sim.on_tick(move |_| counter.set(counter.get() + 1));
    sim.tick();
    assert_eq!(calls.get(), 1);

    let frozen = positions(&sim);
    sim.teardown();
    assert_eq!(sim.tick(), TickOutcome::Idle);
    sim.drag_start("tech-1", Pos2::new(10.0, 10.0));
    sim.pointer_move(Some(Pos2::new(20.0, 20.0)));
    sim.reheat();
    assert_eq!(sim.tick(), TickOutcome::Idle);

    assert_eq!(calls.get(), 1);
    assert_eq!(positions(&sim), frozen);
}

#[test]
fn field_runs_end_to_end_on_the_sample() {
    let portfolio = Portfolio::from_json(SAMPLE).expect("sample portfolio");
    let mut field = Field::mount(portfolio, FieldConfig::default(), ymd(2025, 1));
    let start = Instant::now();
    field.observe_size(1024.0, 720.0, start);
    field.observe_size(1030.0, 722.0, start + Duration::from_millis(40));

    let settled_at = start + Duration::from_secs(1);
    field.frame(settled_at);
    let dimensions = field.dimensions().expect("initialized");
    assert_eq!(field.simulation().position(ROOT_ID), Some(dimensions.center()));

    // Variants merge into their parent node.
    assert!(field.simulation().contains("React"));
    assert!(!field.simulation().contains("Next.js"));

    field.set_share_state(ShareState::from_search("filter=Data"));
    field.frame(settled_at);
    assert!(field.simulation().frame("Redis").expect("redis").selected);

    let mut settled = false;
    for _ in 0..2_000 {
        field.frame(settled_at);
        if field.drain_events().contains(&FieldEvent::Settled) {
            settled = true;
            break;
        }
    }
    assert!(settled);

    field.unmount();
    assert_eq!(field.frame(settled_at), TickOutcome::Idle);
}
