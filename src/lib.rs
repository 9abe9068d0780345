//! treemapview - animated squarified treemaps for the web
//!
//! Turns a flat list of (id, value, category) records into a squarified
//! rectangular tiling and renders it in the browser via WebAssembly and
//! WebGL, with DOM text overlays for labels and percentage shares:
//! - Squarified packing grouped by top-level category
//! - GPU-tweened transitions between successive datasets (enter/update/exit)
//! - Per-cell font fitting, wrapping and truncation
//! - Interval-tree hit testing for hover and click
//! - Side-by-side comparison mode splitting each cell into two shares
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { TreeMapView, transform } from 'treemapview';
//! await init();
//! const view = new TreeMapView(canvas, container, false);
//! const { treeMapCells } = transform({ data, width, height, colorMap });
//! view.setCells(treeMapCells);
//! ```

// Data model and record → cell pipeline
pub mod error;
pub mod layout;
pub mod transform;
pub mod types;

// Rendering modules (WebGL + DOM labels)
pub mod render;
pub mod viewer;

pub use error::{Result, TreemapError};
pub use transform::transform;
pub use types::*;
pub use viewer::TreeMapView;
