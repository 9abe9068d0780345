//! Core data model shared across layout, transform and render.

pub mod cell;
pub mod record;

pub use cell::{
    Cell, LabelLayout, NumCellsTier, Rect, ShareLayout, TextLayout,
};
pub use record::{ColorMapEntry, InputRecord, TransformInput, TransformOutput};
