//! Decides how (and whether) a cell's label and share text are shown.

use crate::types::{LabelLayout, Rect, ShareLayout, TextLayout};

use super::text_fit::{fit_font_size, truncate, FontFit, FontMeasurement};

/// Immutable text-layout configuration.
///
/// The measurement values describe the widest glyph (`W`) of the UI font
/// ("Source Sans Pro") at the reference size.
#[derive(Debug, Clone, Copy)]
pub struct TextConstants {
    /// Labels never render below this size.
    pub min_font_size: f64,
    /// Horizontal label margin as a fraction of cell width (each side).
    pub label_horizontal_margin: f64,
    /// Top label margin as a fraction of the label region height.
    pub label_top_margin: f64,
    /// Fraction of the cell height reserved for the share band.
    pub share_band_proportion: f64,
    pub reference_font_size: f64,
    pub measurement: FontMeasurement,
}

impl Default for TextConstants {
    fn default() -> Self {
        Self {
            min_font_size: 8.0,
            label_horizontal_margin: 0.05,
            label_top_margin: 0.05,
            share_band_proportion: 0.2,
            reference_font_size: 16.0,
            measurement: FontMeasurement {
                max_character_width: 12.3,
                max_character_height: 18.0,
            },
        }
    }
}

impl TextConstants {
    /// Line height at the minimum font size.
    pub fn line_height_at_min_font_size(&self) -> f64 {
        self.measurement.max_character_height / self.reference_font_size * self.min_font_size
    }
}

/// Pick one of the three text presentation modes for a cell.
///
/// Label policy, in order: fit with margins, fit without margins, truncate at
/// the minimum font size (only when the label region is at least three lines
/// tall). Share policy: alongside a visible label the share must fit on a
/// single line inside the reserved bottom band — if it cannot, the whole cell
/// shows nothing rather than an orphaned label. With no label the share may
/// claim the entire cell, still single-line.
pub fn assign_text_layout(
    rect: Rect,
    label: &str,
    share_text: &str,
    constants: &TextConstants,
) -> TextLayout {
    let full_width = rect.width();
    let full_height = rect.height();

    let width_minus_margin = full_width * (1.0 - 2.0 * constants.label_horizontal_margin);
    let label_region_height = full_height * (1.0 - constants.share_band_proportion);
    let height_minus_margin = label_region_height * (1.0 - constants.label_top_margin);

    let label_layout = decide_label_layout(
        label,
        width_minus_margin,
        height_minus_margin,
        full_width,
        label_region_height,
        constants,
    );

    let share_band_height = full_height * constants.share_band_proportion;
    match label_layout {
        LabelLayout::Text { .. } => {
            // Label shown: the share only gets the reserved band.
            match fit_single_line(share_text, full_width, share_band_height, constants) {
                Some(fit) => TextLayout::ShowBoth {
                    label: label_layout,
                    share: ShareLayout::Text {
                        font_size: fit.font_size,
                        text: share_text.to_string(),
                    },
                },
                // Deliberate: a label without its share collapses to nothing,
                // not to a label-only cell.
                None => TextLayout::ShowNone,
            }
        }
        LabelLayout::NoText => {
            match fit_single_line(share_text, full_width, full_height, constants) {
                Some(fit) => TextLayout::ShowOnlyShare {
                    share: ShareLayout::Text {
                        font_size: fit.font_size,
                        text: share_text.to_string(),
                    },
                },
                None => TextLayout::ShowNone,
            }
        }
    }
}

fn decide_label_layout(
    label: &str,
    width_minus_margin: f64,
    height_minus_margin: f64,
    full_width: f64,
    label_region_height: f64,
    constants: &TextConstants,
) -> LabelLayout {
    // First try to fit the label with margins present.
    if let Some(fit) = fit_above_min(label, width_minus_margin, height_minus_margin, constants) {
        return label_from_fit(fit, true);
    }

    // Margins removed, same region.
    if let Some(fit) = fit_above_min(label, full_width, label_region_height, constants) {
        return label_from_fit(fit, false);
    }

    // Truncation is only attempted when the label region can hold at least
    // three lines at the minimum font size.
    if label_region_height > 3.0 * constants.line_height_at_min_font_size() {
        let lines = truncate(
            label,
            full_width,
            label_region_height,
            constants.measurement,
            constants.reference_font_size,
            constants.min_font_size,
        );
        if !lines.is_empty() {
            let unwrapped = lines.join(" ");
            return LabelLayout::Text {
                font_size: constants.min_font_size,
                use_margin: false,
                lines,
                unwrapped,
            };
        }
    }
    LabelLayout::NoText
}

fn label_from_fit(fit: FontFit, use_margin: bool) -> LabelLayout {
    let unwrapped = fit.lines.join(" ");
    LabelLayout::Text {
        font_size: fit.font_size,
        use_margin,
        lines: fit.lines,
        unwrapped,
    }
}

fn fit_above_min(
    text: &str,
    width: f64,
    height: f64,
    constants: &TextConstants,
) -> Option<FontFit> {
    fit_font_size(
        text,
        width,
        height,
        constants.measurement,
        constants.reference_font_size,
    )
    .filter(|fit| fit.font_size > constants.min_font_size)
}

/// Fit that additionally rejects results spilling onto a second line.
fn fit_single_line(
    text: &str,
    width: f64,
    height: f64,
    constants: &TextConstants,
) -> Option<FontFit> {
    fit_above_min(text, width, height, constants).filter(|fit| fit.lines.len() <= 1)
}
