//! Glyph collection: filter raw text runs and tally the font histogram.

use crate::fonts::FontHistogram;
use crate::layout::{round_half_up, PageLayout};

/// Runs whose trimmed text is shorter than this are dropped.
pub const MIN_RUN_CHARS: usize = 2;

/// A trimmed text run with rounded geometry, tagged with its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GlyphRun {
    pub text: String,
    pub font_size: i64,
    pub x: i64,
    pub y: i64,
    pub page: usize,
}

/// Per-document accumulator for the collection pass.
///
/// Pages are pushed one at a time in page order; [`Collector::finish`]
/// hands the runs and histogram on to the later stages.
#[derive(Debug, Default)]
pub struct Collector {
    runs: Vec<GlyphRun>,
    histogram: FontHistogram,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect every usable run of `page`. Returns the number kept.
    pub fn push_page(&mut self, page: &PageLayout) -> usize {
        let before = self.runs.len();

        for run in &page.runs {
            let text = run.text.trim();
            let chars = text.chars().count();
            if chars < MIN_RUN_CHARS {
                continue;
            }

            let font_size = run.font_size();
            self.histogram.record(font_size, chars);
            self.runs.push(GlyphRun {
                text: text.to_string(),
                font_size,
                x: round_half_up(run.x()),
                y: round_half_up(run.y()),
                page: page.number,
            });
        }

        self.runs.len() - before
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }

    pub fn finish(self) -> (Vec<GlyphRun>, FontHistogram) {
        (self.runs, self.histogram)
    }
}
