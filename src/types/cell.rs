//! Cell geometry and text-layout types.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle. Invariant: `x0 <= x1`, `y0 <= y1`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl Rect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// Layout decision for a cell's name label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum LabelLayout {
    /// The cell is too small for any label text.
    NoText,
    Text {
        font_size: f64,
        /// Whether the label region kept its horizontal/top margins.
        use_margin: bool,
        /// Wrapped lines, for renderers without native text wrapping.
        lines: Vec<String>,
        /// The same text unsplit, for DOM nodes that wrap on their own.
        unwrapped: String,
    },
}

/// Layout decision for a cell's share (percentage) text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ShareLayout {
    NoText,
    Text { font_size: f64, text: String },
}

/// The three presentation modes of a cell's text. If there is enough space we
/// show both the label and the share; if only the share fits on its own we
/// show just that; otherwise nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TextLayout {
    ShowBoth {
        label: LabelLayout,
        share: ShareLayout,
    },
    ShowOnlyShare {
        share: ShareLayout,
    },
    ShowNone,
}

/// One rectangle in the tiling, representing a record or a comparison
/// decoration element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cell {
    /// Transition-animation key. No two cells across all datasets rendered
    /// into one viewer may share an id.
    pub id: String,
    pub value: f64,
    pub color: String,
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
    pub text_layout: TextLayout,
    /// Comparison decoration cells never draw a stroke.
    pub comparison: bool,
}

impl Cell {
    pub fn rect(&self) -> Rect {
        Rect::new(self.x0, self.y0, self.x1, self.y1)
    }
}

/// Capacity class bounding the maximum simultaneous cell count.
///
/// Chosen by the caller from the known maximum cardinality of the dataset
/// family; it sizes the persistent GPU buffer. Upgrading `Small` → `Large`
/// mid-session is supported (copy-preserving); downgrading is not.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumCellsTier {
    Small,
    Large,
}
