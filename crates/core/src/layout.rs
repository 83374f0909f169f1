//! Page text-layout records consumed by the outline pipeline.
//!
//! These types are produced by whatever decodes the source document (see the
//! `outline_pdf` crate) and carry no knowledge of the container format.

use serde::{Deserialize, Serialize};

/// Font size assumed when a run carries neither a usable transform scale nor a
/// height.
pub const DEFAULT_FONT_SIZE: f64 = 12.0;

/// Largest font size magnitude taken at face value. Anything beyond is
/// treated like a missing value.
pub const MAX_FONT_SIZE: f64 = 10_000.0;

/// A positioned piece of text as emitted by a document's text layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Raw, untrimmed string content.
    pub text: String,
    /// Affine transform `[a, b, c, d, e, f]`. `a` is the horizontal scale
    /// (used as the font size proxy) and `(e, f)` is the translation.
    pub transform: [f64; 6],
    /// Glyph height in user-space units.
    #[serde(default)]
    pub height: f64,
}

impl TextRun {
    /// Build a run from an explicit font size and position.
    pub fn new(text: impl Into<String>, font_size: f64, x: f64, y: f64) -> Self {
        TextRun {
            text: text.into(),
            transform: [font_size, 0.0, 0.0, font_size, x, y],
            height: font_size,
        }
    }

    pub fn x(&self) -> f64 {
        self.transform[4]
    }

    pub fn y(&self) -> f64 {
        self.transform[5]
    }

    /// Rounded font size, falling back from the horizontal scale to the
    /// height and finally to [`DEFAULT_FONT_SIZE`]. Zero, non-finite and
    /// out-of-range values are skipped.
    pub fn font_size(&self) -> i64 {
        let size = [self.transform[0], self.height]
            .into_iter()
            .find(|v| *v != 0.0 && v.abs() <= MAX_FONT_SIZE)
            .unwrap_or(DEFAULT_FONT_SIZE);
        round_half_up(size)
    }
}

/// All text runs of one page, in content order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageLayout {
    /// 1-based page number.
    pub number: usize,
    pub runs: Vec<TextRun>,
}

impl PageLayout {
    pub fn new(number: usize, runs: Vec<TextRun>) -> Self {
        PageLayout { number, runs }
    }
}

/// Round to the nearest integer with halves going toward positive infinity
/// (`2.5 -> 3`, `-2.5 -> -2`).
///
/// Non-finite input rounds to zero.
pub fn round_half_up(value: f64) -> i64 {
    if !value.is_finite() {
        return 0;
    }
    (value + 0.5).floor() as i64
}
