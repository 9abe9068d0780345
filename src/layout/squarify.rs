//! Squarified treemap packer.
//!
//! Records are grouped by top-level category, packed as groups first and then
//! recursively within each group's rectangle, using the classic squarify
//! heuristic (grow a row along the container's shorter side until adding the
//! next item would worsen the row's worst aspect ratio, then place the row
//! and recurse on the remainder).
//!
//! Values fed to the packer must be strictly positive; filtering null or
//! non-positive values is the caller's responsibility.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::types::Rect;

/// Minimal view of one record as seen by the packer.
#[derive(Debug, Clone)]
pub struct LayoutRecord {
    /// Index into the caller's record list.
    pub index: usize,
    pub value: f64,
    /// Top-level category id; records sharing it are packed together.
    pub group: String,
}

/// One packed rectangle, tied back to the caller's record list.
#[derive(Debug, Clone, Copy)]
pub struct Placed {
    pub index: usize,
    pub rect: Rect,
}

/// Pack `records` into `container`.
///
/// Groups keep their first-seen relative identity; both the group list and
/// each group's members are laid out in descending value order. A group with
/// a single member occupies its entire allotted rectangle.
pub fn layout(records: &[LayoutRecord], container: Rect) -> Vec<Placed> {
    if records.is_empty() {
        return Vec::new();
    }

    // Group by category, preserving first-seen group order.
    let mut group_order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&LayoutRecord>> = HashMap::new();
    for record in records {
        let members = groups.entry(record.group.as_str()).or_insert_with(|| {
            group_order.push(record.group.as_str());
            Vec::new()
        });
        members.push(record);
    }

    // Sort members within each group descending by value, and build one
    // synthetic node per group carrying the aggregate.
    let mut group_nodes: Vec<(f64, Vec<&LayoutRecord>)> = group_order
        .iter()
        .map(|group| {
            let mut members = groups.remove(group).unwrap_or_default();
            members.sort_by(|a, b| descending(a.value, b.value));
            let aggregate: f64 = members.iter().map(|m| m.value).sum();
            (aggregate, members)
        })
        .collect();
    group_nodes.sort_by(|a, b| descending(a.0, b.0));

    let aggregates: Vec<f64> = group_nodes.iter().map(|(sum, _)| *sum).collect();
    let group_rects = squarify(&aggregates, container);

    let mut placed = Vec::with_capacity(records.len());
    for ((_, members), group_rect) in group_nodes.iter().zip(group_rects) {
        if members.len() == 1 {
            // A lone member fills the group's rectangle with no further split.
            if let Some(member) = members.first() {
                placed.push(Placed {
                    index: member.index,
                    rect: group_rect,
                });
            }
            continue;
        }
        let values: Vec<f64> = members.iter().map(|m| m.value).collect();
        let rects = squarify(&values, group_rect);
        for (member, rect) in members.iter().zip(rects) {
            placed.push(Placed {
                index: member.index,
                rect,
            });
        }
    }
    placed
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Lay out `values` (strictly positive, in placement order) inside `container`.
/// Returns one rectangle per value, in input order.
// Indices stay within `areas`: `start < areas.len()` is the loop condition
// and `end` only advances while `end < areas.len()`.
#[allow(clippy::indexing_slicing)]
fn squarify(values: &[f64], container: Rect) -> Vec<Rect> {
    let mut rects = Vec::with_capacity(values.len());
    let total: f64 = values.iter().sum();
    if values.is_empty() || total <= 0.0 {
        return rects;
    }

    // Scale values so they sum to the container's area.
    let scale = container.area() / total;
    let areas: Vec<f64> = values.iter().map(|v| v * scale).collect();

    let mut remaining = container;
    let mut start = 0;
    while start < areas.len() {
        let side = remaining.width().min(remaining.height());

        // Grow the row while the worst aspect ratio keeps improving.
        let mut end = start + 1;
        let mut row_sum = areas[start];
        let mut row_min = areas[start];
        let mut row_max = areas[start];
        let mut current_worst = worst_aspect(row_sum, row_min, row_max, side);
        while end < areas.len() {
            let next = areas[end];
            let candidate = worst_aspect(
                row_sum + next,
                row_min.min(next),
                row_max.max(next),
                side,
            );
            if candidate > current_worst {
                break;
            }
            row_sum += next;
            row_min = row_min.min(next);
            row_max = row_max.max(next);
            current_worst = candidate;
            end += 1;
        }

        remaining = place_row(&areas[start..end], row_sum, remaining, &mut rects);
        start = end;
    }
    rects
}

/// Worst aspect ratio among a row of areas summing to `row_sum`, laid along a
/// container side of length `side`.
fn worst_aspect(row_sum: f64, row_min: f64, row_max: f64, side: f64) -> f64 {
    let s2 = row_sum * row_sum;
    let w2 = side * side;
    (w2 * row_max / s2).max(s2 / (w2 * row_min))
}

/// Place one finished row along the shorter side of `remaining`, appending a
/// rectangle per item, and return the leftover container.
fn place_row(row: &[f64], row_sum: f64, remaining: Rect, rects: &mut Vec<Rect>) -> Rect {
    if remaining.width() >= remaining.height() {
        // Vertical strip on the left, items stacked top to bottom.
        let strip_width = if remaining.height() > 0.0 {
            row_sum / remaining.height()
        } else {
            0.0
        };
        let mut y = remaining.y0;
        for &area in row {
            let item_height = if strip_width > 0.0 { area / strip_width } else { 0.0 };
            rects.push(Rect::new(
                remaining.x0,
                y,
                remaining.x0 + strip_width,
                y + item_height,
            ));
            y += item_height;
        }
        Rect::new(
            remaining.x0 + strip_width,
            remaining.y0,
            remaining.x1,
            remaining.y1,
        )
    } else {
        // Horizontal strip on top, items running left to right.
        let strip_height = if remaining.width() > 0.0 {
            row_sum / remaining.width()
        } else {
            0.0
        };
        let mut x = remaining.x0;
        for &area in row {
            let item_width = if strip_height > 0.0 { area / strip_height } else { 0.0 };
            rects.push(Rect::new(
                x,
                remaining.y0,
                x + item_width,
                remaining.y0 + strip_height,
            ));
            x += item_width;
        }
        Rect::new(
            remaining.x0,
            remaining.y0 + strip_height,
            remaining.x1,
            remaining.y1,
        )
    }
}
