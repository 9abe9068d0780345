//! Wire types for the data contract with the host page.
//!
//! Field names are camelCase to match the JSON the data-prep layer produces.

use serde::{Deserialize, Serialize};

use super::cell::Cell;

/// One raw data record before layout.
///
/// `id` must be unique within one dataset and stable across successive
/// datasets describing the same semantic entity — animated continuity between
/// treemaps is keyed on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputRecord {
    pub id: String,
    /// `None` and non-positive values are filtered out before layout.
    pub value: Option<f64>,
    pub title: String,
    pub top_level_parent_id: String,
    /// Overrides the color-map lookup for this record when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_override: Option<String>,
}

/// Maps a top-level category id to its fill color.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorMapEntry {
    pub id: String,
    pub color: String,
}

/// Input to the record→cell transform.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformInput {
    pub data: Vec<InputRecord>,
    /// When present, every base cell expands into the fixed 5-cell
    /// comparison decoration tuple.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comparison_data: Option<Vec<InputRecord>>,
    pub width: f64,
    pub height: f64,
    pub color_map: Vec<ColorMapEntry>,
}

/// Output of the transform: cells ready for the render surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub tree_map_cells: Vec<Cell>,
}
