//! Point-in-cell lookups via a pair of one-dimensional interval trees.
//!
//! Build cost is paid once per transition; each hover event then stabs the
//! x-tree and y-tree independently and intersects the candidate id sets.
//! With treemap cells this beats walking the full cell list once the data
//! set grows past a few hundred rows, and the stab order is deterministic
//! so repeated queries on a boundary always resolve to the same cell.

use std::collections::HashMap;
use std::collections::HashSet;

use super::InternalCell;

#[derive(Debug, Clone)]
struct Interval {
    lo: f64,
    hi: f64,
    id: String,
}

#[derive(Debug)]
struct Node {
    center: f64,
    /// Intervals crossing `center`, ascending by low endpoint.
    by_lo: Vec<Interval>,
    /// Same intervals, descending by high endpoint.
    by_hi: Vec<Interval>,
    left: Option<Box<Node>>,
    right: Option<Box<Node>>,
}

/// Centered interval tree over closed intervals `[lo, hi]`.
#[derive(Debug, Default)]
pub struct IntervalTree {
    root: Option<Box<Node>>,
}

impl IntervalTree {
    pub fn build(mut intervals: Vec<(f64, f64, String)>) -> Self {
        intervals.retain(|(lo, hi, _)| lo <= hi);
        Self {
            root: build_node(
                intervals
                    .into_iter()
                    .map(|(lo, hi, id)| Interval { lo, hi, id })
                    .collect(),
            ),
        }
    }

    /// Ids of every interval containing `point`, endpoints included.
    pub fn stab(&self, point: f64) -> Vec<&str> {
        let mut hits = Vec::new();
        let mut node = self.root.as_deref();
        while let Some(current) = node {
            if point < current.center {
                for interval in &current.by_lo {
                    if interval.lo > point {
                        break;
                    }
                    if interval.hi >= point {
                        hits.push(interval.id.as_str());
                    }
                }
                node = current.left.as_deref();
            } else if point > current.center {
                for interval in &current.by_hi {
                    if interval.hi < point {
                        break;
                    }
                    if interval.lo <= point {
                        hits.push(interval.id.as_str());
                    }
                }
                node = current.right.as_deref();
            } else {
                hits.extend(
                    current
                        .by_lo
                        .iter()
                        .filter(|i| i.lo <= point && point <= i.hi)
                        .map(|i| i.id.as_str()),
                );
                break;
            }
        }
        hits
    }
}

fn build_node(intervals: Vec<Interval>) -> Option<Box<Node>> {
    if intervals.is_empty() {
        return None;
    }
    let mut endpoints: Vec<f64> = intervals
        .iter()
        .flat_map(|i| [i.lo, i.hi])
        .collect();
    endpoints.sort_by(f64::total_cmp);
    let center = endpoints
        .get(endpoints.len() / 2)
        .copied()
        .unwrap_or_default();

    let mut crossing = Vec::new();
    let mut left = Vec::new();
    let mut right = Vec::new();
    for interval in intervals {
        if interval.hi < center {
            left.push(interval);
        } else if interval.lo > center {
            right.push(interval);
        } else {
            crossing.push(interval);
        }
    }
    // Degenerate split: everything crosses or piles on one side, so stop
    // recursing and keep the lot at this node.
    if crossing.is_empty() && (left.is_empty() || right.is_empty()) {
        let mut all = left;
        all.append(&mut right);
        let mut by_lo = all;
        let mut by_hi = by_lo.clone();
        by_lo.sort_by(|a, b| a.lo.total_cmp(&b.lo));
        by_hi.sort_by(|a, b| b.hi.total_cmp(&a.hi));
        return Some(Box::new(Node {
            center,
            by_lo,
            by_hi,
            left: None,
            right: None,
        }));
    }

    let mut by_lo = crossing;
    let mut by_hi = by_lo.clone();
    by_lo.sort_by(|a, b| a.lo.total_cmp(&b.lo));
    by_hi.sort_by(|a, b| b.hi.total_cmp(&a.hi));
    Some(Box::new(Node {
        center,
        by_lo,
        by_hi,
        left: build_node(left),
        right: build_node(right),
    }))
}

/// Build the x- and y-axis trees for the given cells, in key order.
#[allow(clippy::implicit_hasher)]
pub fn build_interval_trees(
    keys: &[String],
    cells: &HashMap<String, InternalCell>,
) -> (IntervalTree, IntervalTree) {
    let mut x_intervals = Vec::with_capacity(keys.len());
    let mut y_intervals = Vec::with_capacity(keys.len());
    for key in keys {
        if let Some(cell) = cells.get(key) {
            x_intervals.push((cell.x0, cell.x1, key.clone()));
            y_intervals.push((cell.y0, cell.y1, key.clone()));
        }
    }
    (IntervalTree::build(x_intervals), IntervalTree::build(y_intervals))
}

/// Resolve a pointer position to the cell under it, or `None` when the
/// point is outside the canvas or over no cell.
pub fn search_for_hit(
    x_tree: &IntervalTree,
    y_tree: &IntervalTree,
    x_max: f64,
    y_max: f64,
    x: f64,
    y: f64,
) -> Option<String> {
    if x < 0.0 || x > x_max || y < 0.0 || y > y_max {
        return None;
    }
    let y_hits: HashSet<&str> = y_tree.stab(y).into_iter().collect();
    x_tree
        .stab(x)
        .into_iter()
        .find(|id| y_hits.contains(id))
        .map(str::to_owned)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::TextLayout;

    fn tree(intervals: &[(f64, f64, &str)]) -> IntervalTree {
        IntervalTree::build(
            intervals
                .iter()
                .map(|(lo, hi, id)| (*lo, *hi, (*id).to_owned()))
                .collect(),
        )
    }

    fn cell(id: &str, x0: f64, y0: f64, x1: f64, y1: f64) -> InternalCell {
        InternalCell {
            id: id.to_owned(),
            fill_color: [0.0; 4],
            stroke_opacity: 1.0,
            x0,
            y0,
            x1,
            y1,
            text_layout: TextLayout::ShowNone,
            is_comparison_cell: false,
        }
    }

    #[test]
    fn stab_includes_closed_endpoints() {
        let t = tree(&[(0.0, 10.0, "a"), (10.0, 20.0, "b")]);
        let hits = t.stab(10.0);
        assert!(hits.contains(&"a"));
        assert!(hits.contains(&"b"));
    }

    #[test]
    fn stab_misses_gaps() {
        let t = tree(&[(0.0, 5.0, "a"), (10.0, 20.0, "b")]);
        assert!(t.stab(7.0).is_empty());
    }

    #[test]
    fn stab_agrees_with_linear_scan() {
        let intervals: Vec<(f64, f64, String)> = (0_u32..50)
            .map(|i| {
                let lo = f64::from(i) * 3.0;
                (lo, lo + 10.0, format!("iv{i}"))
            })
            .collect();
        let t = IntervalTree::build(intervals.clone());
        for probe in [0.0, 11.5, 40.0, 149.0, 160.0] {
            let mut expected: Vec<&str> = intervals
                .iter()
                .filter(|(lo, hi, _)| *lo <= probe && probe <= *hi)
                .map(|(_, _, id)| id.as_str())
                .collect();
            let mut actual = t.stab(probe);
            expected.sort_unstable();
            actual.sort_unstable();
            assert_eq!(actual, expected, "probe {probe}");
        }
    }

    #[test]
    fn hit_search_intersects_both_axes() {
        let cells: HashMap<String, InternalCell> = [
            cell("top-left", 0.0, 0.0, 50.0, 50.0),
            cell("bottom-right", 50.0, 50.0, 100.0, 100.0),
        ]
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect();
        let keys = vec!["top-left".to_owned(), "bottom-right".to_owned()];
        let (x_tree, y_tree) = build_interval_trees(&keys, &cells);
        assert_eq!(
            search_for_hit(&x_tree, &y_tree, 100.0, 100.0, 10.0, 10.0),
            Some("top-left".to_owned())
        );
        assert_eq!(
            search_for_hit(&x_tree, &y_tree, 100.0, 100.0, 75.0, 75.0),
            Some("bottom-right".to_owned())
        );
        // x matches one cell, y the other.
        assert_eq!(
            search_for_hit(&x_tree, &y_tree, 100.0, 100.0, 10.0, 75.0),
            None
        );
    }

    #[test]
    fn out_of_bounds_points_miss() {
        let cells: HashMap<String, InternalCell> =
            [cell("only", 0.0, 0.0, 100.0, 100.0)]
                .into_iter()
                .map(|c| (c.id.clone(), c))
                .collect();
        let keys = vec!["only".to_owned()];
        let (x_tree, y_tree) = build_interval_trees(&keys, &cells);
        assert_eq!(search_for_hit(&x_tree, &y_tree, 100.0, 100.0, -1.0, 50.0), None);
        assert_eq!(search_for_hit(&x_tree, &y_tree, 100.0, 100.0, 50.0, 101.0), None);
    }
}
