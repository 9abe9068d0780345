//! Packs cells into the interleaved instance buffer consumed by the
//! rectangle shader.
//!
//! Each cell contributes two instances: a stroke rectangle drawn behind a
//! slightly inset fill rectangle, so the stroke reads as a border. Every
//! instance carries both its start and end state; the shader interpolates
//! between them with a single tween-progress uniform, so the CPU writes this
//! buffer once per transition rather than once per frame.

use std::collections::HashMap;

use crate::error::{Result, TreemapError};
use crate::types::NumCellsTier;

use super::diff::{UpdatePatternItem, UpdateType};
use super::{max_cells_for, InternalCell, NUM_FLOATS_PER_CELL_INSTANCE, NUM_INSTANCES_PER_CELL};

const FLOATS_PER_CELL: usize = NUM_FLOATS_PER_CELL_INSTANCE * NUM_INSTANCES_PER_CELL;

/// Preallocated instance data with a logical length, sized to a cell tier.
///
/// Allocating for the tier ceiling up front lets the GPU buffer be created
/// once per tier and refilled with sub-data uploads. Upgrading to the large
/// tier preserves existing contents and never shrinks back.
#[derive(Debug)]
pub struct PersistentBuffer {
    data: Vec<f32>,
    len: usize,
    tier: NumCellsTier,
}

impl PersistentBuffer {
    pub fn for_tier(tier: NumCellsTier) -> Self {
        Self {
            data: vec![0.0; max_cells_for(tier) * FLOATS_PER_CELL],
            len: 0,
            tier,
        }
    }

    pub fn tier(&self) -> NumCellsTier {
        self.tier
    }

    /// Number of floats currently written.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Total float capacity for the current tier.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        self.data.get(..self.len).unwrap_or_default()
    }

    /// Grow to `tier` if it is larger, keeping written contents. Returns
    /// true when the backing allocation changed and the GPU-side buffer
    /// must be recreated.
    pub fn ensure_tier(&mut self, tier: NumCellsTier) -> bool {
        let target = max_cells_for(tier) * FLOATS_PER_CELL;
        if target <= self.data.len() {
            return false;
        }
        self.data.resize(target, 0.0);
        self.tier = tier;
        true
    }

    fn reset(&mut self) {
        self.len = 0;
    }

    fn push_instance(&mut self, instance: &[f32; NUM_FLOATS_PER_CELL_INSTANCE]) -> Result<()> {
        let end = self.len + NUM_FLOATS_PER_CELL_INSTANCE;
        let slot = self.data.get_mut(self.len..end).ok_or_else(|| {
            TreemapError::Invariant("cell buffer capacity exceeded for tier".to_owned())
        })?;
        slot.copy_from_slice(instance);
        self.len = end;
        Ok(())
    }
}

/// Pack one 17-float instance record. Attribute order matches the shader:
/// initial/final top-left, initial/final bottom-right, initial/final RGBA,
/// half stroke width.
#[allow(clippy::cast_possible_truncation)]
fn pack_instance(
    initial: &InternalCell,
    finish: &InternalCell,
    initial_color: [f32; 4],
    final_color: [f32; 4],
    half_stroke_width: f32,
) -> [f32; NUM_FLOATS_PER_CELL_INSTANCE] {
    let [ir, ig, ib, ia] = initial_color;
    let [fr, fg, fb, fa] = final_color;
    [
        initial.x0 as f32,
        initial.y0 as f32,
        finish.x0 as f32,
        finish.y0 as f32,
        initial.x1 as f32,
        initial.y1 as f32,
        finish.x1 as f32,
        finish.y1 as f32,
        ir,
        ig,
        ib,
        ia,
        fr,
        fg,
        fb,
        fa,
        half_stroke_width,
    ]
}

fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    let [r, g, b, _] = color;
    [r, g, b, alpha]
}

/// Rewrite `buffer` from the diff pattern, returning the instance count to
/// draw. Keys in the pattern must resolve in `prev_cells` (for exits) or
/// `next_cells` (for enters); updates need both.
#[allow(clippy::implicit_hasher)]
pub fn write_cell_buffer(
    prev_cells: &HashMap<String, InternalCell>,
    next_cells: &HashMap<String, InternalCell>,
    pattern: &[UpdatePatternItem],
    half_stroke_width: f32,
    stroke_color: [f32; 4],
    buffer: &mut PersistentBuffer,
) -> Result<usize> {
    buffer.reset();
    for item in pattern {
        let lookup = |cells: &HashMap<String, InternalCell>| -> Result<InternalCell> {
            cells.get(&item.key).cloned().ok_or_else(|| {
                TreemapError::Invariant(format!("diff key missing from cell map: {}", item.key))
            })
        };
        let (stroke, fill) = match item.kind {
            UpdateType::Enter => {
                let cell = lookup(next_cells)?;
                // Entered cells appear in place: geometry is frozen at the
                // final rect and only the alpha tweens up.
                let fill_width = if cell.is_comparison_cell {
                    0.0
                } else {
                    half_stroke_width
                };
                (
                    pack_instance(
                        &cell,
                        &cell,
                        with_alpha(stroke_color, 0.0),
                        stroke_color,
                        0.0,
                    ),
                    pack_instance(
                        &cell,
                        &cell,
                        with_alpha(cell.fill_color, 0.0),
                        cell.fill_color,
                        fill_width,
                    ),
                )
            }
            UpdateType::Exit => {
                let cell = lookup(prev_cells)?;
                let fill_width = if cell.is_comparison_cell {
                    0.0
                } else {
                    half_stroke_width
                };
                (
                    pack_instance(
                        &cell,
                        &cell,
                        with_alpha(stroke_color, cell.stroke_opacity),
                        with_alpha(stroke_color, 0.0),
                        0.0,
                    ),
                    pack_instance(
                        &cell,
                        &cell,
                        cell.fill_color,
                        with_alpha(cell.fill_color, 0.0),
                        fill_width,
                    ),
                )
            }
            UpdateType::Update => {
                let prev = lookup(prev_cells)?;
                let next = lookup(next_cells)?;
                (
                    pack_instance(
                        &prev,
                        &next,
                        with_alpha(stroke_color, prev.stroke_opacity),
                        with_alpha(stroke_color, next.stroke_opacity),
                        0.0,
                    ),
                    pack_instance(
                        &prev,
                        &next,
                        prev.fill_color,
                        next.fill_color,
                        half_stroke_width,
                    ),
                )
            }
        };
        buffer.push_instance(&stroke)?;
        buffer.push_instance(&fill)?;
    }
    Ok(pattern.len() * NUM_INSTANCES_PER_CELL)
}
