//! Record → cell transform: filtering, layout, text assignment, coloring.

pub mod comparison;

use std::collections::HashMap;

use crate::error::{Result, TreemapError};
use crate::layout::{assign_text_layout, layout, LayoutRecord, TextConstants};
use crate::types::{Cell, InputRecord, Rect, TransformInput, TransformOutput};

use comparison::{create_comparison_cells, merge_comparison_data};

/// Convert a share in `0..=1` to a display percentage with two decimals.
pub fn format_percentage(share: f64) -> String {
    format!("{:.2}%", share * 100.0)
}

/// Run the full transform: filter unusable records, lay out the survivors,
/// assign per-cell text and resolve colors.
///
/// Records with a missing or non-positive value are dropped before layout.
/// Every surviving record's `top_level_parent_id` must appear in the color
/// map unless the record carries a `color_override`.
pub fn transform(input: &TransformInput) -> Result<TransformOutput> {
    let comparison = input
        .comparison_data
        .as_ref()
        .map(|secondary| merge_comparison_data(&input.data, secondary));
    let (records, splits) = match &comparison {
        Some((merged, splits)) => (merged.as_slice(), Some(splits)),
        None => (input.data.as_slice(), None),
    };

    let usable: Vec<&InputRecord> = records
        .iter()
        .filter(|r| r.value.is_some_and(|v| v > 0.0))
        .collect();
    let total: f64 = usable.iter().filter_map(|r| r.value).sum();

    let layout_records: Vec<LayoutRecord> = usable
        .iter()
        .enumerate()
        .map(|(index, r)| LayoutRecord {
            index,
            value: r.value.unwrap_or(0.0),
            group: r.top_level_parent_id.clone(),
        })
        .collect();
    let container = Rect::new(0.0, 0.0, input.width, input.height);
    let placed = layout(&layout_records, container);

    let color_map: HashMap<&str, &str> = input
        .color_map
        .iter()
        .map(|entry| (entry.id.as_str(), entry.color.as_str()))
        .collect();
    let constants = TextConstants::default();

    let mut cells = Vec::with_capacity(placed.len());
    for item in &placed {
        let record = usable.get(item.index).copied().ok_or_else(|| {
            TreemapError::Invariant(format!("layout produced unknown record index {}", item.index))
        })?;
        let value = record.value.unwrap_or(0.0);
        let share_text = format_percentage(value / total);
        let text_layout = assign_text_layout(item.rect, &record.title, &share_text, &constants);
        let color = match &record.color_override {
            Some(color) => color.clone(),
            None => color_map
                .get(record.top_level_parent_id.as_str())
                .map(|c| (*c).to_owned())
                .ok_or_else(|| TreemapError::Config(record.top_level_parent_id.clone()))?,
        };
        let cell = Cell {
            id: record.id.clone(),
            value,
            color,
            x0: item.rect.x0,
            y0: item.rect.y0,
            x1: item.rect.x1,
            y1: item.rect.y1,
            text_layout,
            comparison: false,
        };
        match splits {
            Some(splits) => cells.extend(create_comparison_cells(&cell, splits)?),
            None => cells.push(cell),
        }
    }

    Ok(TransformOutput {
        tree_map_cells: cells,
    })
}

/// JS-facing wrapper: `transform(input)` with camelCase JSON field names.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen::prelude::wasm_bindgen(js_name = transform)]
pub fn transform_js(
    input: wasm_bindgen::JsValue,
) -> std::result::Result<wasm_bindgen::JsValue, wasm_bindgen::JsValue> {
    let input: TransformInput = serde_wasm_bindgen::from_value(input)
        .map_err(|e| wasm_bindgen::JsValue::from_str(&format!("bad transform input: {e}")))?;
    let output = transform(&input)?;
    serde_wasm_bindgen::to_value(&output)
        .map_err(|e| wasm_bindgen::JsValue::from_str(&format!("serialize failed: {e}")))
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::float_cmp,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use crate::types::ColorMapEntry;

    fn record(id: &str, value: Option<f64>, group: &str) -> InputRecord {
        InputRecord {
            id: id.to_owned(),
            value,
            title: format!("Title {id}"),
            top_level_parent_id: group.to_owned(),
            color_override: None,
        }
    }

    fn input(data: Vec<InputRecord>) -> TransformInput {
        TransformInput {
            data,
            comparison_data: None,
            width: 100.0,
            height: 100.0,
            color_map: vec![
                ColorMapEntry {
                    id: "g1".to_owned(),
                    color: "#ff0000".to_owned(),
                },
                ColorMapEntry {
                    id: "g2".to_owned(),
                    color: "#00ff00".to_owned(),
                },
            ],
        }
    }

    #[test]
    fn percentage_formatting_uses_two_decimals() {
        assert_eq!(format_percentage(0.6), "60.00%");
        assert_eq!(format_percentage(0.004_32), "0.43%");
        assert_eq!(format_percentage(0.000_05), "0.01%");
        assert_eq!(format_percentage(0.000_005), "0.00%");
        assert_eq!(format_percentage(1.0), "100.00%");
    }

    #[test]
    fn filters_missing_and_non_positive_values() {
        let output = transform(&input(vec![
            record("a", Some(60.0), "g1"),
            record("b", None, "g1"),
            record("c", Some(0.0), "g1"),
            record("d", Some(-5.0), "g1"),
            record("e", Some(40.0), "g2"),
        ]))
        .unwrap();
        let ids: Vec<&str> = output
            .tree_map_cells
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(ids, vec!["a", "e"]);
    }

    #[test]
    fn areas_are_proportional_to_values() {
        let output = transform(&input(vec![
            record("a", Some(60.0), "g1"),
            record("b", Some(40.0), "g2"),
        ]))
        .unwrap();
        let area =
            |c: &Cell| (c.x1 - c.x0) * (c.y1 - c.y0);
        let total: f64 = output.tree_map_cells.iter().map(|c| area(c)).sum();
        assert!((total - 10_000.0).abs() < 1.0);
        let a = output.tree_map_cells.iter().find(|c| c.id == "a").unwrap();
        assert!((area(a) - 6_000.0).abs() < 1.0);
        assert_eq!(a.color, "#ff0000");
    }

    #[test]
    fn color_override_beats_the_color_map() {
        let mut r = record("a", Some(1.0), "g1");
        r.color_override = Some("#123456".to_owned());
        let output = transform(&input(vec![r])).unwrap();
        assert_eq!(output.tree_map_cells[0].color, "#123456");
    }

    #[test]
    fn missing_color_mapping_is_a_config_error() {
        let result = transform(&input(vec![record("a", Some(1.0), "unmapped")]));
        match result {
            Err(TreemapError::Config(id)) => assert_eq!(id, "unmapped"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn comparison_mode_expands_every_cell_fivefold() {
        let mut i = input(vec![
            record("a", Some(6.0), "g1"),
            record("b", Some(2.0), "g2"),
        ]);
        i.comparison_data = Some(vec![record("a", Some(4.0), "g1")]);
        let output = transform(&i).unwrap();
        assert_eq!(output.tree_map_cells.len(), 10);
        let ids: Vec<&str> = output
            .tree_map_cells
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert!(ids.contains(&"text-cell-a"));
        assert!(ids.contains(&"primary-cell-a"));
        assert!(ids.contains(&"secondary-cell-a"));
        assert!(ids.contains(&"border-bottom-b"));
        assert!(ids.contains(&"border-right-b"));
    }

    #[test]
    fn empty_input_produces_no_cells() {
        let output = transform(&input(Vec::new())).unwrap();
        assert!(output.tree_map_cells.is_empty());
    }
}
