//! Transition planning and tween timing.
//!
//! A transition is planned once (diff, buffer rewrite, interval trees) and
//! then driven frame by frame through a single eased progress value. All of
//! this is plain data so it runs under native tests; the DOM and GL sides
//! consume the plan.

use std::collections::HashMap;

use crate::error::Result;
use crate::render::{
    build_interval_trees, convert_to_internal_cells, update_pattern, write_cell_buffer,
    IntervalTree, InternalCell, PersistentBuffer, UpdatePatternItem, UpdateType,
    TRANSITION_DURATION_MS,
};
use crate::types::Cell;

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Nothing rendered yet.
    Initial,
    /// A tween is running; hover hit testing is suspended.
    InProgress,
    /// The last transition ran to completion and the canvas shows the
    /// final state.
    FinishedCompletely,
}

pub fn ease_out_cubic(t: f64) -> f64 {
    let inverse = 1.0 - t.clamp(0.0, 1.0);
    1.0 - inverse * inverse * inverse
}

/// Clock-driven progress for one transition.
#[derive(Debug, Clone, Copy)]
pub struct Tween {
    start_ms: f64,
    duration_ms: f64,
}

impl Tween {
    pub fn starting_at(start_ms: f64) -> Self {
        Self {
            start_ms,
            duration_ms: TRANSITION_DURATION_MS,
        }
    }

    /// Eased progress in `0..=1` at `now_ms`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn progress(&self, now_ms: f64) -> f32 {
        let linear = ((now_ms - self.start_ms) / self.duration_ms).clamp(0.0, 1.0);
        ease_out_cubic(linear) as f32
    }

    pub fn is_done(&self, now_ms: f64) -> bool {
        now_ms - self.start_ms >= self.duration_ms
    }
}

/// Everything a transition needs beyond per-frame drawing: the rewritten
/// instance buffer length, the post-transition cell index and the hit-test
/// trees for the final layout.
pub struct TransitionPlan {
    pub instance_count: usize,
    pub keys: Vec<String>,
    pub cell_map: HashMap<String, InternalCell>,
    pub x_tree: IntervalTree,
    pub y_tree: IntervalTree,
    pub pattern: Vec<UpdatePatternItem>,
}

impl TransitionPlan {
    /// Diff the previous cells against the next, rewrite `buffer` and index
    /// the final layout.
    pub fn build(
        prev_cells: &[Cell],
        next_cells: &[Cell],
        highlighted_id: Option<&str>,
        half_stroke_width: f32,
        stroke_color: [f32; 4],
        buffer: &mut PersistentBuffer,
    ) -> Result<Self> {
        let (prev_keys, prev_map) = convert_to_internal_cells(prev_cells, None)?;
        let (next_keys, next_map) = convert_to_internal_cells(next_cells, highlighted_id)?;
        let pattern = update_pattern(&prev_keys, &next_keys);
        let instance_count = write_cell_buffer(
            &prev_map,
            &next_map,
            &pattern,
            half_stroke_width,
            stroke_color,
            buffer,
        )?;
        let (x_tree, y_tree) = build_interval_trees(&next_keys, &next_map);
        Ok(Self {
            instance_count,
            keys: next_keys,
            cell_map: next_map,
            x_tree,
            y_tree,
            pattern,
        })
    }

    /// Keys that survive into the final layout, in pattern order. Only
    /// these get text labels.
    pub fn surviving_keys(&self) -> impl Iterator<Item = &str> {
        self.pattern
            .iter()
            .filter(|item| item.kind != UpdateType::Exit)
            .map(|item| item.key.as_str())
    }
}
