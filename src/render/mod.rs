//! GPU-facing render layer: instance buffer packing, keyed diffing,
//! spatial hit testing and color resolution.

pub mod cell_buffer;
pub mod colors;
pub mod diff;
pub mod spatial;
#[cfg(target_arch = "wasm32")]
pub mod webgl;

use std::collections::HashMap;

use crate::error::Result;
use crate::types::{Cell, NumCellsTier, TextLayout};

pub use cell_buffer::{write_cell_buffer, PersistentBuffer};
pub use diff::{update_pattern, UpdatePatternItem, UpdateType};
pub use spatial::{build_interval_trees, search_for_hit, IntervalTree};

/// Floats per rectangle instance: 4 corner pairs, 2 RGBA colors, 1 width.
pub const NUM_FLOATS_PER_CELL_INSTANCE: usize = 17;
/// Each cell draws a stroke instance and a fill instance.
pub const NUM_INSTANCES_PER_CELL: usize = 2;

pub const MAX_CELLS_SMALL_TIER: usize = 2600;
pub const MAX_CELLS_LARGE_TIER: usize = 8000;

pub const TRANSITION_DURATION_MS: f64 = 350.0;
pub const STROKE_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
pub const HALF_STROKE_WIDTH: f32 = 0.5;

/// Unit-quad corner selectors shared by every instance; the vertex shader
/// mixes the per-instance corner attributes with these.
pub const RECTANGLE_REFERENCE_POSITIONS: [f32; 8] = [1.0, 1.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0];
pub const RECTANGLE_INDICES: [u16; 6] = [1, 0, 2, 2, 0, 3];

/// Cell with its color resolved to floats, keyed by id in the render maps.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalCell {
    pub id: String,
    pub fill_color: [f32; 4],
    pub stroke_opacity: f32,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub text_layout: TextLayout,
    pub is_comparison_cell: bool,
}

/// Resolve colors and index cells by id, preserving input order in the
/// returned key list. While `highlighted_id` is set, every other cell is
/// desaturated to push the highlighted one forward.
pub fn convert_to_internal_cells(
    cells: &[Cell],
    highlighted_id: Option<&str>,
) -> Result<(Vec<String>, HashMap<String, InternalCell>)> {
    let mut keys = Vec::with_capacity(cells.len());
    let mut by_id = HashMap::with_capacity(cells.len());
    for cell in cells {
        let color = match highlighted_id {
            Some(highlighted) if highlighted != cell.id => {
                colors::desaturate(&cell.color, 0.3)?
            }
            _ => cell.color.clone(),
        };
        let fill_color = colors::parse_color(&color)?;
        keys.push(cell.id.clone());
        by_id.insert(
            cell.id.clone(),
            InternalCell {
                id: cell.id.clone(),
                fill_color,
                stroke_opacity: 1.0,
                x0: cell.x0,
                y0: cell.y0,
                x1: cell.x1,
                y1: cell.y1,
                text_layout: cell.text_layout.clone(),
                is_comparison_cell: cell.comparison,
            },
        );
    }
    Ok((keys, by_id))
}

/// True when a new cell list needs a re-layout of buffers and labels.
pub fn have_cells_changed(prev: &[Cell], next: &[Cell]) -> bool {
    prev != next
}

/// Pick the smallest buffer tier that holds `num_cells`, or `None` when the
/// data set exceeds the large tier.
pub fn tier_for(num_cells: usize) -> Option<NumCellsTier> {
    if num_cells <= MAX_CELLS_SMALL_TIER {
        Some(NumCellsTier::Small)
    } else if num_cells <= MAX_CELLS_LARGE_TIER {
        Some(NumCellsTier::Large)
    } else {
        None
    }
}

pub fn max_cells_for(tier: NumCellsTier) -> usize {
    match tier {
        NumCellsTier::Small => MAX_CELLS_SMALL_TIER,
        NumCellsTier::Large => MAX_CELLS_LARGE_TIER,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing, clippy::float_cmp)]
mod tests {
    use super::*;

    fn cell(id: &str, color: &str) -> Cell {
        Cell {
            id: id.to_owned(),
            value: 1.0,
            color: color.to_owned(),
            x0: 0.0,
            y0: 0.0,
            x1: 10.0,
            y1: 10.0,
            text_layout: TextLayout::ShowNone,
            comparison: false,
        }
    }

    #[test]
    fn keys_preserve_input_order() {
        let cells = vec![cell("b", "#ff0000"), cell("a", "#00ff00")];
        let (keys, by_id) = convert_to_internal_cells(&cells, None).unwrap();
        assert_eq!(keys, vec!["b".to_owned(), "a".to_owned()]);
        assert_eq!(by_id["a"].fill_color, [0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn highlight_desaturates_only_other_cells() {
        let cells = vec![cell("keep", "#ff0000"), cell("dim", "#ff0000")];
        let (_, by_id) = convert_to_internal_cells(&cells, Some("keep")).unwrap();
        assert_eq!(by_id["keep"].fill_color, [1.0, 0.0, 0.0, 1.0]);
        assert_ne!(by_id["dim"].fill_color, by_id["keep"].fill_color);
    }

    #[test]
    fn highlight_keeps_transparent_cells_convertible() {
        // Comparison text-anchor cells carry a transparent fill; highlighting
        // some other cell must not reject them.
        let cells = vec![cell("keep", "#ff0000"), cell("text-cell-a", "transparent")];
        let (_, by_id) = convert_to_internal_cells(&cells, Some("keep")).unwrap();
        assert_eq!(by_id["text-cell-a"].fill_color, [0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn tier_selection_covers_both_boundaries() {
        assert_eq!(tier_for(1), Some(NumCellsTier::Small));
        assert_eq!(tier_for(MAX_CELLS_SMALL_TIER), Some(NumCellsTier::Small));
        assert_eq!(tier_for(MAX_CELLS_SMALL_TIER + 1), Some(NumCellsTier::Large));
        assert_eq!(tier_for(MAX_CELLS_LARGE_TIER + 1), None);
    }

    #[test]
    fn cells_changed_compares_structurally() {
        let a = vec![cell("a", "#ff0000")];
        let same = vec![cell("a", "#ff0000")];
        let moved = {
            let mut c = cell("a", "#ff0000");
            c.x1 = 20.0;
            vec![c]
        };
        assert!(!have_cells_changed(&a, &same));
        assert!(have_cells_changed(&a, &moved));
    }
}
