//! Layout engine tests for treemapview
//!
//! Property-style checks on the squarified packing: containment,
//! area proportionality, group discipline and aspect-ratio quality.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use treemapview::layout::{layout, LayoutRecord, Placed};
use treemapview::types::Rect;

const EPSILON: f64 = 1e-6;

fn record(index: usize, value: f64, group: &str) -> LayoutRecord {
    LayoutRecord {
        index,
        value,
        group: group.to_owned(),
    }
}

fn container() -> Rect {
    Rect::new(0.0, 0.0, 400.0, 300.0)
}

fn contained(inner: Rect, outer: Rect) -> bool {
    inner.x0 >= outer.x0 - EPSILON
        && inner.y0 >= outer.y0 - EPSILON
        && inner.x1 <= outer.x1 + EPSILON
        && inner.y1 <= outer.y1 + EPSILON
}

fn overlap_area(a: Rect, b: Rect) -> f64 {
    let w = (a.x1.min(b.x1) - a.x0.max(b.x0)).max(0.0);
    let h = (a.y1.min(b.y1) - a.y0.max(b.y0)).max(0.0);
    w * h
}

fn mixed_records(n: usize) -> Vec<LayoutRecord> {
    (0..n)
        .map(|i| {
            let group = match i % 3 {
                0 => "alpha",
                1 => "beta",
                _ => "gamma",
            };
            record(i, 5.0 + ((i * 37) % 100) as f64, group)
        })
        .collect()
}

#[test]
fn every_record_gets_exactly_one_rect() {
    let records = mixed_records(60);
    let placed = layout(&records, container());
    assert_eq!(placed.len(), records.len());
    let mut indices: Vec<usize> = placed.iter().map(|p| p.index).collect();
    indices.sort_unstable();
    let expected: Vec<usize> = (0..records.len()).collect();
    assert_eq!(indices, expected);
}

#[test]
fn all_rects_stay_inside_the_container() {
    let placed = layout(&mixed_records(80), container());
    for p in &placed {
        assert!(contained(p.rect, container()), "escaped: {:?}", p.rect);
        assert!(p.rect.width() >= 0.0 && p.rect.height() >= 0.0);
    }
}

#[test]
fn rects_tile_the_container_without_overlap() {
    let placed = layout(&mixed_records(40), container());
    let total: f64 = placed.iter().map(|p| p.rect.area()).sum();
    assert!(
        (total - container().area()).abs() < 1.0,
        "area sum {total} vs container {}",
        container().area()
    );
    for (i, a) in placed.iter().enumerate() {
        for b in placed.iter().skip(i + 1) {
            assert!(
                overlap_area(a.rect, b.rect) < EPSILON,
                "overlap between {:?} and {:?}",
                a.rect,
                b.rect
            );
        }
    }
}

#[test]
fn areas_are_proportional_to_values() {
    let records = vec![
        record(0, 50.0, "a"),
        record(1, 30.0, "b"),
        record(2, 20.0, "c"),
    ];
    let placed = layout(&records, container());
    let total_area = container().area();
    for p in &placed {
        let expected = records[p.index].value / 100.0 * total_area;
        assert!(
            (p.rect.area() - expected).abs() < 1.0,
            "index {} has area {} expected {expected}",
            p.index,
            p.rect.area()
        );
    }
}

#[test]
fn groups_occupy_disjoint_regions() {
    let records = vec![
        record(0, 10.0, "left"),
        record(1, 20.0, "left"),
        record(2, 30.0, "right"),
        record(3, 40.0, "right"),
    ];
    let placed = layout(&records, container());
    let hull = |members: &[&Placed]| {
        members.iter().fold(
            Rect::new(f64::MAX, f64::MAX, f64::MIN, f64::MIN),
            |acc, p| {
                Rect::new(
                    acc.x0.min(p.rect.x0),
                    acc.y0.min(p.rect.y0),
                    acc.x1.max(p.rect.x1),
                    acc.y1.max(p.rect.y1),
                )
            },
        )
    };
    let left: Vec<&Placed> = placed.iter().filter(|p| p.index < 2).collect();
    let right: Vec<&Placed> = placed.iter().filter(|p| p.index >= 2).collect();
    assert!(overlap_area(hull(&left), hull(&right)) < EPSILON);
}

#[test]
fn single_member_group_fills_its_allotment() {
    // One group with one record among multi-member groups: the lone record
    // must fill exactly the area its value warrants, as one rectangle.
    let records = vec![
        record(0, 40.0, "solo"),
        record(1, 30.0, "duo"),
        record(2, 30.0, "duo"),
    ];
    let placed = layout(&records, container());
    let solo = placed.iter().find(|p| p.index == 0).unwrap();
    let expected = 0.4 * container().area();
    assert!((solo.rect.area() - expected).abs() < 1.0);
}

#[test]
fn zero_records_produce_empty_layout() {
    assert!(layout(&[], container()).is_empty());
}

#[test]
fn single_record_fills_the_whole_container() {
    let placed = layout(&[record(0, 7.0, "only")], container());
    assert_eq!(placed.len(), 1);
    let rect = placed[0].rect;
    assert!((rect.area() - container().area()).abs() < EPSILON);
}

#[test]
fn aspect_ratios_stay_reasonable() {
    // Squarified packing should avoid extreme slivers for same-magnitude
    // values.
    let records: Vec<LayoutRecord> =
        (0..16).map(|i| record(i, 10.0 + (i as f64), "g")).collect();
    let placed = layout(&records, Rect::new(0.0, 0.0, 400.0, 400.0));
    for p in &placed {
        let ratio = p.rect.width().max(p.rect.height()) / p.rect.width().min(p.rect.height());
        assert!(ratio < 8.0, "degenerate aspect {ratio} for {:?}", p.rect);
    }
}

#[test]
fn layout_is_deterministic() {
    let records = mixed_records(25);
    let a = layout(&records, container());
    let b = layout(&records, container());
    for (x, y) in a.iter().zip(b.iter()) {
        assert_eq!(x.index, y.index);
        assert_eq!(x.rect, y.rect);
    }
}
