//! Layout computation: squarified packing and per-cell text layout.

pub mod squarify;
pub mod text_assign;
pub mod text_fit;

pub use squarify::{layout, LayoutRecord, Placed};
pub use text_assign::{assign_text_layout, TextConstants};
pub use text_fit::{fit_font_size, truncate, FontFit, FontMeasurement};
