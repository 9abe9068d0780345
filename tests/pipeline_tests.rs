//! Transition pipeline tests for treemapview
//!
//! End-to-end checks over the plain-data side of a transition: diff, cell
//! buffer rewrite, hit-test trees, tween timing and props rate limiting.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::cast_possible_truncation,
    clippy::panic
)]

use treemapview::render::{
    search_for_hit, PersistentBuffer, UpdateType, HALF_STROKE_WIDTH,
    NUM_FLOATS_PER_CELL_INSTANCE, NUM_INSTANCES_PER_CELL, STROKE_COLOR,
    TRANSITION_DURATION_MS,
};
use treemapview::types::{Cell, NumCellsTier, TextLayout};
use treemapview::viewer::animation::{ease_out_cubic, TransitionPlan, Tween};
use treemapview::viewer::rate_limit::PropsChangeRateLimiter;

fn cell(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> Cell {
    Cell {
        id: id.to_owned(),
        value: (x1 - x0) * (y1 - y0),
        color: "#4488cc".to_owned(),
        x0,
        y0,
        x1,
        y1,
        text_layout: TextLayout::ShowNone,
        comparison: false,
    }
}

#[test]
fn plan_writes_two_instances_per_pattern_entry() {
    let prev = vec![cell("a", 0.0, 0.0, 50.0, 50.0), cell("b", 50.0, 0.0, 100.0, 50.0)];
    let next = vec![cell("b", 0.0, 0.0, 60.0, 50.0), cell("c", 60.0, 0.0, 100.0, 50.0)];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plan = TransitionPlan::build(
        &prev,
        &next,
        None,
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();

    // Keys a (exit), b (update), c (enter).
    assert_eq!(plan.pattern.len(), 3);
    assert_eq!(plan.instance_count, 3 * NUM_INSTANCES_PER_CELL);
    assert_eq!(
        buffer.len(),
        plan.instance_count * NUM_FLOATS_PER_CELL_INSTANCE
    );
}

#[test]
fn surviving_keys_skip_exits_and_keep_pattern_order() {
    let prev = vec![cell("a", 0.0, 0.0, 50.0, 50.0), cell("b", 50.0, 0.0, 100.0, 50.0)];
    let next = vec![cell("b", 0.0, 0.0, 60.0, 50.0), cell("c", 60.0, 0.0, 100.0, 50.0)];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plan = TransitionPlan::build(
        &prev,
        &next,
        None,
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();

    let surviving: Vec<&str> = plan.surviving_keys().collect();
    assert_eq!(surviving, vec!["b", "c"]);
    let exits: Vec<&str> = plan
        .pattern
        .iter()
        .filter(|item| item.kind == UpdateType::Exit)
        .map(|item| item.key.as_str())
        .collect();
    assert_eq!(exits, vec!["a"]);
}

#[test]
fn hit_testing_resolves_against_the_final_layout() {
    let prev = vec![cell("old", 0.0, 0.0, 100.0, 100.0)];
    let next = vec![
        cell("left", 0.0, 0.0, 40.0, 100.0),
        cell("right", 40.0, 0.0, 100.0, 100.0),
    ];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plan = TransitionPlan::build(
        &prev,
        &next,
        None,
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();

    let hit = |x, y| search_for_hit(&plan.x_tree, &plan.y_tree, 100.0, 100.0, x, y);
    assert_eq!(hit(10.0, 50.0), Some("left".to_owned()));
    assert_eq!(hit(80.0, 50.0), Some("right".to_owned()));
    // The exited cell is not in the trees.
    assert_eq!(hit(-5.0, 50.0), None);
    assert_eq!(hit(10.0, 150.0), None);
}

#[test]
fn highlighting_desaturates_every_other_cell() {
    let next = vec![
        cell("focus", 0.0, 0.0, 50.0, 50.0),
        cell("other", 50.0, 0.0, 100.0, 50.0),
    ];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plain = TransitionPlan::build(&[], &next, None, HALF_STROKE_WIDTH, STROKE_COLOR, &mut buffer)
        .unwrap();
    let highlighted = TransitionPlan::build(
        &[],
        &next,
        Some("focus"),
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();

    assert_eq!(
        plain.cell_map["focus"].fill_color,
        highlighted.cell_map["focus"].fill_color
    );
    assert_ne!(
        plain.cell_map["other"].fill_color,
        highlighted.cell_map["other"].fill_color
    );
}

#[test]
fn highlighting_tolerates_transparent_comparison_cells() {
    // Comparison datasets anchor their labels on transparent cells; a hover
    // highlight over such a dataset must still build a plan.
    let mut anchor = cell("text-cell-a", 0.0, 0.0, 50.0, 50.0);
    anchor.color = "transparent".to_owned();
    anchor.comparison = false;
    let next = vec![anchor, cell("primary-cell-a", 0.0, 0.0, 50.0, 50.0)];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plan = TransitionPlan::build(
        &next,
        &next,
        Some("primary-cell-a"),
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();
    assert_eq!(
        plan.cell_map["text-cell-a"].fill_color,
        [0.0, 0.0, 0.0, 0.0]
    );
}

#[test]
fn buffer_survives_consecutive_plans() {
    let first = vec![cell("a", 0.0, 0.0, 100.0, 100.0)];
    let second = vec![
        cell("a", 0.0, 0.0, 50.0, 100.0),
        cell("b", 50.0, 0.0, 100.0, 100.0),
    ];
    let mut buffer = PersistentBuffer::for_tier(NumCellsTier::Small);

    let plan1 =
        TransitionPlan::build(&[], &first, None, HALF_STROKE_WIDTH, STROKE_COLOR, &mut buffer)
            .unwrap();
    assert_eq!(plan1.instance_count, 2);

    let plan2 = TransitionPlan::build(
        &first,
        &second,
        None,
        HALF_STROKE_WIDTH,
        STROKE_COLOR,
        &mut buffer,
    )
    .unwrap();
    assert_eq!(plan2.instance_count, 4);
    assert_eq!(buffer.len(), 4 * NUM_FLOATS_PER_CELL_INSTANCE);
    assert_eq!(buffer.tier(), NumCellsTier::Small);
}

#[test]
fn tween_progress_is_eased_and_clamped() {
    let tween = Tween::starting_at(1_000.0);
    assert_eq!(tween.progress(0.0), 0.0);
    assert_eq!(tween.progress(1_000.0), 0.0);
    assert_eq!(tween.progress(1_000.0 + TRANSITION_DURATION_MS), 1.0);
    assert_eq!(tween.progress(10_000.0), 1.0);

    let halfway = tween.progress(1_000.0 + TRANSITION_DURATION_MS / 2.0);
    let expected = ease_out_cubic(0.5) as f32;
    assert!((halfway - expected).abs() < 1e-6);
    // Ease-out front-loads the motion.
    assert!(halfway > 0.5);
}

#[test]
fn tween_reports_done_only_after_its_duration() {
    let tween = Tween::starting_at(0.0);
    assert!(!tween.is_done(TRANSITION_DURATION_MS - 1.0));
    assert!(tween.is_done(TRANSITION_DURATION_MS));
    assert!(tween.is_done(TRANSITION_DURATION_MS + 500.0));
}

#[test]
fn rate_limiter_coalesces_updates_during_a_transition() {
    let mut limiter: PropsChangeRateLimiter<u32> = PropsChangeRateLimiter::new();

    let first = limiter.request(1).expect("first request starts");
    assert_eq!(first.next, 1);
    assert!(limiter.is_in_progress());

    // Arrivals while running are parked; only the latest survives.
    assert!(limiter.request(2).is_none());
    assert!(limiter.request(3).is_none());

    let drained = limiter.complete().expect("pending change drains");
    assert_eq!(drained.prev, Some(1));
    assert_eq!(drained.next, 3);

    // Draining the latest leaves nothing pending.
    assert!(limiter.complete().is_none());
    assert!(!limiter.is_in_progress());
}

#[test]
fn rate_limiter_drops_no_op_requests() {
    let mut limiter: PropsChangeRateLimiter<u32> = PropsChangeRateLimiter::new();
    limiter.request(7).unwrap();
    limiter.complete();
    assert!(limiter.request(7).is_none(), "identical props are skipped");
    let change = limiter.request(8).expect("changed props go through");
    assert_eq!(change.prev, Some(7));
}
