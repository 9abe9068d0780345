//! Structured error types for treemapview.
//!
//! Transform-time failures abort the current update; render-capability
//! failures degrade to a no-op renderer instead of propagating.

/// All errors that can occur while transforming data or rendering cells.
#[derive(Debug, thiserror::Error)]
pub enum TreemapError {
    /// A category id has no entry in the supplied color map.
    #[error("No color mapping for category: {0}")]
    Config(String),

    /// An id referenced during the comparison-cell merge is missing from the
    /// merged dataset.
    #[error("Invariant violation: {0}")]
    Invariant(String),

    /// A WebGL object (shader, program, buffer) could not be created.
    #[error("Render error: {0}")]
    Render(String),

    /// The WebGL context or a required extension is unavailable. The viewer
    /// treats this as non-fatal and disables itself.
    #[error("GPU capability unavailable: {0}")]
    Resource(String),

    /// Malformed input data (bad color string, invalid record set).
    #[error("Parse error: {0}")]
    Parse(String),

    /// Catch-all for string errors.
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TreemapError>;

impl From<String> for TreemapError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

impl From<&str> for TreemapError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

#[cfg(target_arch = "wasm32")]
impl From<TreemapError> for wasm_bindgen::JsValue {
    fn from(e: TreemapError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
