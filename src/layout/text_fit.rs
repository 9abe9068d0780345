//! Fits text into rectangles by estimated glyph measurements.
//!
//! Widths are estimated from a reference measurement (the widest glyph of the
//! UI font at a reference size) scaled linearly to the candidate font size;
//! no DOM measurement happens here, which keeps the whole layout pass pure.

const WORD_SEPARATOR: char = ' ';
const ELLIPSIS: char = '\u{2026}';

/// Convergence tolerance for the font-size bisection.
const BISECTION_TOLERANCE: f64 = 0.01;

/// Empirically measured dimensions of the widest glyph at a reference font
/// size.
#[derive(Debug, Clone, Copy)]
pub struct FontMeasurement {
    pub max_character_width: f64,
    pub max_character_height: f64,
}

impl FontMeasurement {
    fn scaled(&self, reference_font_size: f64, font_size: f64) -> (f64, f64) {
        let factor = font_size / reference_font_size;
        (
            factor * self.max_character_width,
            factor * self.max_character_height,
        )
    }
}

/// A successful fit: the chosen font size and the wrapped lines.
#[derive(Debug, Clone)]
pub struct FontFit {
    pub font_size: f64,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone)]
struct Line {
    text: String,
    width: f64,
}

struct Attempt {
    fits: bool,
    lines: Vec<Line>,
}

/// Greedy word-wrap of `text` at one candidate font size.
///
/// Fails outright when any single word is wider than the rectangle or a
/// single line of text is taller than it; otherwise wraps and reports whether
/// the line count fits vertically.
fn attempt_fit(
    text: &str,
    measurement: FontMeasurement,
    reference_font_size: f64,
    rect_width: f64,
    rect_height: f64,
    font_size: f64,
) -> Attempt {
    let (char_width, char_height) = measurement.scaled(reference_font_size, font_size);
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_line_count = (rect_height / char_height).floor() as usize;

    let words: Vec<(&str, f64)> = text
        .split(WORD_SEPARATOR)
        .map(|word| (word, word.chars().count() as f64 * char_width))
        .collect();

    let every_word_fits = words.iter().all(|(_, width)| *width < rect_width);
    if !every_word_fits || char_height > rect_height {
        return Attempt {
            fits: false,
            lines: Vec::new(),
        };
    }

    let mut lines: Vec<Vec<(&str, f64)>> = Vec::new();
    let mut current: Vec<(&str, f64)> = Vec::new();
    let mut width_left = rect_width;
    for (word, width) in words {
        if current.is_empty() {
            width_left = rect_width - width;
            current.push((word, width));
        } else if width < width_left {
            // Account for the separating space as one character width.
            width_left = width_left - width - char_width;
            current.push((word, width));
        } else {
            lines.push(std::mem::take(&mut current));
            // The word that opens a wrapped line still pays for the separator
            // that would have preceded it.
            width_left = rect_width - width - char_width;
            current.push((word, width));
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    let lines: Vec<Line> = lines
        .into_iter()
        .map(|words_in_line| {
            let text = words_in_line
                .iter()
                .map(|(word, _)| *word)
                .collect::<Vec<_>>()
                .join(" ");
            let separators = words_in_line.len().saturating_sub(1) as f64;
            let width = words_in_line.iter().map(|(_, w)| *w).sum::<f64>()
                + separators * char_width;
            Line { text, width }
        })
        .collect();

    Attempt {
        fits: lines.len() <= max_line_count,
        lines,
    }
}

/// Find the largest font size at which `text` wraps into the rectangle.
///
/// Bisects between zero and an analytic upper bound (the size at which the
/// total glyph area equals the rectangle area), narrowing to within 0.01 and
/// keeping the last fitting attempt. Returns `None` when no evaluated size
/// fits; the caller must fall back (usually to truncation or no text).
pub fn fit_font_size(
    text: &str,
    rect_width: f64,
    rect_height: f64,
    measurement: FontMeasurement,
    reference_font_size: f64,
) -> Option<FontFit> {
    let glyph_area = text.chars().count() as f64
        * measurement.max_character_height
        * measurement.max_character_width;
    if glyph_area <= 0.0 {
        return None;
    }
    // Font size at which the total glyph area equals the rectangle's area;
    // no larger size can possibly fit.
    let max_font_size =
        ((rect_width * rect_height / glyph_area) * reference_font_size * reference_font_size)
            .sqrt();

    let mut upper = max_font_size;
    let mut lower = 0.0_f64;
    let mut best: Option<FontFit> = None;
    while (upper - lower).abs() > BISECTION_TOLERANCE {
        let size_to_try = (upper + lower) / 2.0;
        let attempt = attempt_fit(
            text,
            measurement,
            reference_font_size,
            rect_width,
            rect_height,
            size_to_try,
        );
        if attempt.fits {
            best = Some(FontFit {
                font_size: size_to_try,
                lines: attempt.lines.into_iter().map(|line| line.text).collect(),
            });
            lower = size_to_try;
        } else {
            upper = size_to_try;
        }
    }
    best
}

/// Wrap `text` at a fixed font size, keeping only the lines that fit
/// vertically and ending the kept text with an ellipsis.
///
/// If even the first word alone is wider than the rectangle, it is trimmed to
/// the widest prefix that fits and the ellipsis is appended to that.
pub fn truncate(
    text: &str,
    rect_width: f64,
    rect_height: f64,
    measurement: FontMeasurement,
    reference_font_size: f64,
    font_size: f64,
) -> Vec<String> {
    let (char_width, char_height) = measurement.scaled(reference_font_size, font_size);

    let every_word_fits = text
        .split(WORD_SEPARATOR)
        .all(|word| word.chars().count() as f64 * char_width < rect_width);

    if !every_word_fits {
        // The wrap algorithm cannot place an over-wide word; trim the first
        // word to the prefix that fits.
        let first_word = text.split(WORD_SEPARATOR).next().unwrap_or_default();
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_chars = (rect_width / char_width).floor() as usize;
        let mut trimmed: String = first_word.chars().take(max_chars).collect();
        trimmed.push(ELLIPSIS);
        return vec![trimmed];
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let max_line_count = (rect_height / char_height).floor() as usize;
    let attempt = attempt_fit(
        text,
        measurement,
        reference_font_size,
        rect_width,
        rect_height,
        font_size,
    );
    if attempt.lines.is_empty() || max_line_count == 0 {
        return Vec::new();
    }

    let mut retained: Vec<Line> = attempt.lines.into_iter().take(max_line_count).collect();
    if let Some(last) = retained.last_mut() {
        if last.width < rect_width - char_width {
            // Enough slack on the last line for one more glyph: append.
            last.text.push(ELLIPSIS);
        } else {
            // Otherwise replace the final character with the ellipsis.
            last.text.pop();
            last.text.push(ELLIPSIS);
        }
    }
    retained.into_iter().map(|line| line.text).collect()
}
