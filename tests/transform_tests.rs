//! Transform integration tests for treemapview
//!
//! Runs the record→cell transform on JSON payloads shaped like the ones the
//! host page sends, and checks the wire format of the output.
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use serde_json::json;
use treemapview::transform::transform;
use treemapview::types::{Cell, TextLayout, TransformInput, TransformOutput};
use treemapview::TreemapError;

fn parse_input(value: serde_json::Value) -> TransformInput {
    serde_json::from_value(value).expect("input deserializes")
}

fn sample_input() -> TransformInput {
    parse_input(json!({
        "data": [
            { "id": "veh", "value": 550.0, "title": "Vehicles",
              "topLevelParentId": "industrial" },
            { "id": "mach", "value": 300.0, "title": "Machinery",
              "topLevelParentId": "industrial" },
            { "id": "oil", "value": 150.0, "title": "Crude oil",
              "topLevelParentId": "minerals" }
        ],
        "width": 800.0,
        "height": 600.0,
        "colorMap": [
            { "id": "industrial", "color": "#1f77b4" },
            { "id": "minerals", "color": "#ff7f0e" }
        ]
    }))
}

fn area(cell: &Cell) -> f64 {
    (cell.x1 - cell.x0) * (cell.y1 - cell.y0)
}

#[test]
fn camel_case_json_deserializes_into_the_input_type() {
    let input = sample_input();
    assert_eq!(input.data.len(), 3);
    assert_eq!(input.data[0].top_level_parent_id, "industrial");
    assert!(input.comparison_data.is_none());
    assert_eq!(input.color_map[1].color, "#ff7f0e");
}

#[test]
fn transform_tiles_the_full_container() {
    let output = transform(&sample_input()).unwrap();
    assert_eq!(output.tree_map_cells.len(), 3);
    let total: f64 = output.tree_map_cells.iter().map(area).sum();
    assert!((total - 800.0 * 600.0).abs() < 1.0);
    for cell in &output.tree_map_cells {
        assert!(cell.x0 >= -1e-9 && cell.x1 <= 800.0 + 1e-9);
        assert!(cell.y0 >= -1e-9 && cell.y1 <= 600.0 + 1e-9);
    }
}

#[test]
fn cells_inherit_their_category_color() {
    let output = transform(&sample_input()).unwrap();
    let by_id = |id: &str| {
        output
            .tree_map_cells
            .iter()
            .find(|c| c.id == id)
            .unwrap()
    };
    assert_eq!(by_id("veh").color, "#1f77b4");
    assert_eq!(by_id("mach").color, "#1f77b4");
    assert_eq!(by_id("oil").color, "#ff7f0e");
}

#[test]
fn large_cells_carry_wrapped_label_text() {
    let output = transform(&sample_input()).unwrap();
    let veh = output
        .tree_map_cells
        .iter()
        .find(|c| c.id == "veh")
        .unwrap();
    // 55% of 800x600 is far more than enough for both texts.
    match &veh.text_layout {
        TextLayout::ShowBoth { share, .. } => {
            let treemapview::types::ShareLayout::Text { text, .. } = share else {
                panic!("share text expected on the largest cell");
            };
            assert_eq!(text, "55.00%");
        }
        other => panic!("unexpected layout {other:?}"),
    }
}

#[test]
fn output_serializes_with_camel_case_keys() {
    let output = transform(&sample_input()).unwrap();
    let value = serde_json::to_value(&output).unwrap();
    let cells = value
        .get("treeMapCells")
        .and_then(serde_json::Value::as_array)
        .expect("treeMapCells array");
    let first = cells.first().expect("at least one cell");
    assert!(first.get("textLayout").is_some());
    assert!(first.get("comparison").is_some());
    assert!(first.get("text_layout").is_none());
}

#[test]
fn output_round_trips_through_json() {
    let output = transform(&sample_input()).unwrap();
    let text = serde_json::to_string(&output).unwrap();
    let back: TransformOutput = serde_json::from_str(&text).unwrap();
    assert_eq!(back.tree_map_cells, output.tree_map_cells);
}

#[test]
fn comparison_payload_expands_and_flags_decoration_cells() {
    let input = parse_input(json!({
        "data": [
            { "id": "veh", "value": 600.0, "title": "Vehicles",
              "topLevelParentId": "industrial" }
        ],
        "comparisonData": [
            { "id": "veh", "value": 400.0, "title": "Vehicles",
              "topLevelParentId": "industrial" }
        ],
        "width": 400.0,
        "height": 300.0,
        "colorMap": [ { "id": "industrial", "color": "#1f77b4" } ]
    }));
    let output = transform(&input).unwrap();
    assert_eq!(output.tree_map_cells.len(), 5);

    let by_id = |id: &str| {
        output
            .tree_map_cells
            .iter()
            .find(|c| c.id == id)
            .unwrap()
    };
    let primary = by_id("primary-cell-veh");
    let secondary = by_id("secondary-cell-veh");
    let text = by_id("text-cell-veh");

    // The secondary slice takes 40% of the width, the primary the rest.
    assert!((secondary.x1 - secondary.x0 - 160.0).abs() < 1e-6);
    assert!((primary.x1 - primary.x0 - 240.0).abs() < 1e-6);
    assert_eq!(text.color, "transparent");
    // The text cell is the only one that renders text; it draws a stroke,
    // the decoration cells do not.
    assert!(!text.comparison);
    for id in [
        "primary-cell-veh",
        "secondary-cell-veh",
        "border-bottom-veh",
        "border-right-veh",
    ] {
        let cell = by_id(id);
        assert!(cell.comparison, "{id} must be a decoration cell");
        assert_eq!(cell.text_layout, TextLayout::ShowNone);
    }
}

#[test]
fn secondary_only_records_still_get_cells() {
    let input = parse_input(json!({
        "data": [
            { "id": "a", "value": 300.0, "title": "A",
              "topLevelParentId": "industrial" }
        ],
        "comparisonData": [
            { "id": "a", "value": 100.0, "title": "A",
              "topLevelParentId": "industrial" },
            { "id": "b", "value": 200.0, "title": "B",
              "topLevelParentId": "industrial" }
        ],
        "width": 400.0,
        "height": 300.0,
        "colorMap": [ { "id": "industrial", "color": "#1f77b4" } ]
    }));
    let output = transform(&input).unwrap();
    // Two merged records, five cells each.
    assert_eq!(output.tree_map_cells.len(), 10);
    assert!(output.tree_map_cells.iter().any(|c| c.id == "text-cell-b"));
    // "b" has no primary value, so its primary slice is zero width.
    let primary_b = output
        .tree_map_cells
        .iter()
        .find(|c| c.id == "primary-cell-b")
        .unwrap();
    assert!((primary_b.x1 - primary_b.x0).abs() < 1e-6);
}

#[test]
fn unknown_category_surfaces_the_offending_id() {
    let input = parse_input(json!({
        "data": [
            { "id": "x", "value": 1.0, "title": "X",
              "topLevelParentId": "nowhere" }
        ],
        "width": 100.0,
        "height": 100.0,
        "colorMap": []
    }));
    match transform(&input) {
        Err(TreemapError::Config(id)) => assert_eq!(id, "nowhere"),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn color_override_survives_the_wire_format() {
    let input = parse_input(json!({
        "data": [
            { "id": "x", "value": 1.0, "title": "X",
              "topLevelParentId": "nowhere", "colorOverride": "#abcdef" }
        ],
        "width": 100.0,
        "height": 100.0,
        "colorMap": []
    }));
    let output = transform(&input).unwrap();
    assert_eq!(output.tree_map_cells[0].color, "#abcdef");
}
