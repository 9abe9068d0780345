//! Comparison-mode dataset merge and cell expansion.
//!
//! In comparison mode each record's value is the sum of its primary and
//! secondary dataset values, the layout runs over the merged values, and
//! every laid-out cell expands into a fixed five-cell decoration tuple:
//! an invisible text-anchor cell, the primary and secondary share cells
//! splitting the rect horizontally, and two 1px white border cells.

use std::collections::HashMap;

use crate::error::{Result, TreemapError};
use crate::render::colors::lighten;
use crate::types::{Cell, InputRecord, ShareLayout, TextLayout};

const BORDER_COLOR: &str = "#ffffff";
const BORDER_THICKNESS: f64 = 1.0;

/// Per-id value split retained through layout for the cell expansion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueSplit {
    pub primary: f64,
    pub secondary: f64,
}

impl ValueSplit {
    pub fn total(&self) -> f64 {
        self.primary + self.secondary
    }
}

/// Merge the secondary dataset into the primary one. Every id keeps the sum
/// of both values; ids present only in the secondary dataset are appended
/// with a zero primary share. Records without a usable value count as zero.
pub fn merge_comparison_data(
    primary: &[InputRecord],
    secondary: &[InputRecord],
) -> (Vec<InputRecord>, HashMap<String, ValueSplit>) {
    let secondary_by_id: HashMap<&str, &InputRecord> =
        secondary.iter().map(|r| (r.id.as_str(), r)).collect();

    let mut merged = Vec::with_capacity(primary.len());
    let mut splits = HashMap::with_capacity(primary.len());
    for record in primary {
        let primary_value = record.value.unwrap_or(0.0);
        let secondary_value = secondary_by_id
            .get(record.id.as_str())
            .and_then(|r| r.value)
            .unwrap_or(0.0);
        let split = ValueSplit {
            primary: primary_value,
            secondary: secondary_value,
        };
        let mut combined = record.clone();
        combined.value = Some(split.total());
        merged.push(combined);
        splits.insert(record.id.clone(), split);
    }

    for record in secondary {
        if splits.contains_key(&record.id) {
            continue;
        }
        let secondary_value = record.value.unwrap_or(0.0);
        let split = ValueSplit {
            primary: 0.0,
            secondary: secondary_value,
        };
        let mut combined = record.clone();
        combined.value = Some(split.total());
        merged.push(combined);
        splits.insert(record.id.clone(), split);
    }

    (merged, splits)
}

/// Expand one laid-out cell into its five comparison decoration cells.
pub fn create_comparison_cells(
    cell: &Cell,
    splits: &HashMap<String, ValueSplit>,
) -> Result<[Cell; 5]> {
    let split = splits.get(&cell.id).ok_or_else(|| {
        TreemapError::Invariant(format!("no comparison data for laid-out cell: {}", cell.id))
    })?;

    // The anchor keeps the label but never the share text; it stays a
    // stroked non-comparison cell so the white outline still draws.
    let text_layout = match &cell.text_layout {
        TextLayout::ShowBoth { label, .. } => TextLayout::ShowBoth {
            label: label.clone(),
            share: ShareLayout::NoText,
        },
        _ => TextLayout::ShowNone,
    };
    let text_cell = Cell {
        id: format!("text-cell-{}", cell.id),
        color: "transparent".to_owned(),
        text_layout,
        ..cell.clone()
    };

    let width = cell.x1 - cell.x0;
    let secondary_share = if split.total() > 0.0 {
        split.secondary / split.total()
    } else {
        0.0
    };
    let split_x = cell.x1 - width * secondary_share;

    let primary_cell = Cell {
        id: format!("primary-cell-{}", cell.id),
        x1: split_x,
        text_layout: TextLayout::ShowNone,
        comparison: true,
        ..cell.clone()
    };
    let secondary_cell = Cell {
        id: format!("secondary-cell-{}", cell.id),
        x0: split_x,
        color: lighten(&cell.color, 0.1)?,
        text_layout: TextLayout::ShowNone,
        comparison: true,
        ..cell.clone()
    };
    let border_bottom = Cell {
        id: format!("border-bottom-{}", cell.id),
        y0: cell.y1 - BORDER_THICKNESS,
        color: BORDER_COLOR.to_owned(),
        text_layout: TextLayout::ShowNone,
        comparison: true,
        ..cell.clone()
    };
    let border_right = Cell {
        id: format!("border-right-{}", cell.id),
        x0: cell.x1 - BORDER_THICKNESS,
        color: BORDER_COLOR.to_owned(),
        text_layout: TextLayout::ShowNone,
        comparison: true,
        ..cell.clone()
    };

    Ok([
        text_cell,
        primary_cell,
        secondary_cell,
        border_bottom,
        border_right,
    ])
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
    use crate::types::LabelLayout;

    fn record(id: &str, value: Option<f64>) -> InputRecord {
        InputRecord {
            id: id.to_owned(),
            value,
            title: id.to_owned(),
            top_level_parent_id: "group".to_owned(),
            color_override: None,
        }
    }

    fn cell(id: &str) -> Cell {
        Cell {
            id: id.to_owned(),
            value: 10.0,
            color: "#336699".to_owned(),
            x0: 0.0,
            y0: 0.0,
            x1: 100.0,
            y1: 50.0,
            text_layout: TextLayout::ShowNone,
            comparison: false,
        }
    }

    #[test]
    fn merge_sums_values_and_appends_secondary_only_ids() {
        let primary = vec![record("a", Some(6.0)), record("b", Some(2.0))];
        let secondary = vec![record("a", Some(4.0)), record("c", Some(3.0))];
        let (merged, splits) = merge_comparison_data(&primary, &secondary);

        assert_eq!(merged.len(), 3);
        assert_eq!(merged[0].value, Some(10.0));
        assert_eq!(merged[1].value, Some(2.0));
        assert_eq!(merged[2].id, "c");
        assert_eq!(merged[2].value, Some(3.0));
        assert_eq!(splits["a"], ValueSplit { primary: 6.0, secondary: 4.0 });
        assert_eq!(splits["c"], ValueSplit { primary: 0.0, secondary: 3.0 });
    }

    #[test]
    fn expansion_splits_the_rect_by_secondary_share() {
        let splits: HashMap<String, ValueSplit> = [(
            "a".to_owned(),
            ValueSplit {
                primary: 6.0,
                secondary: 4.0,
            },
        )]
        .into();
        let cells = create_comparison_cells(&cell("a"), &splits).unwrap();

        assert_eq!(cells[0].id, "text-cell-a");
        assert_eq!(cells[0].color, "transparent");
        assert!(!cells[0].comparison);

        assert_eq!(cells[1].id, "primary-cell-a");
        assert_eq!(cells[1].x1, 60.0);
        assert!(cells[1].comparison);

        assert_eq!(cells[2].id, "secondary-cell-a");
        assert_eq!(cells[2].x0, 60.0);
        assert_ne!(cells[2].color, cells[1].color);

        assert_eq!(cells[3].id, "border-bottom-a");
        assert_eq!(cells[3].y0, 49.0);
        assert_eq!(cells[4].id, "border-right-a");
        assert_eq!(cells[4].x0, 99.0);
    }

    #[test]
    fn anchor_keeps_label_but_drops_share_text() {
        let mut base = cell("a");
        base.text_layout = TextLayout::ShowBoth {
            label: LabelLayout::Text {
                font_size: 12.0,
                use_margin: true,
                lines: vec!["Label".to_owned()],
                unwrapped: "Label".to_owned(),
            },
            share: ShareLayout::Text {
                font_size: 10.0,
                text: "40.0%".to_owned(),
            },
        };
        let splits: HashMap<String, ValueSplit> = [(
            "a".to_owned(),
            ValueSplit {
                primary: 1.0,
                secondary: 0.0,
            },
        )]
        .into();
        let cells = create_comparison_cells(&base, &splits).unwrap();
        match &cells[0].text_layout {
            TextLayout::ShowBoth { share, .. } => assert_eq!(*share, ShareLayout::NoText),
            other => panic!("unexpected layout: {other:?}"),
        }
    }

    #[test]
    fn unknown_id_is_an_invariant_error() {
        let result = create_comparison_cells(&cell("ghost"), &HashMap::new());
        assert!(matches!(result, Err(TreemapError::Invariant(_))));
    }
}
