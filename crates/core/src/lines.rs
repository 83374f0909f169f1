//! Line assembly: glyph runs on the same page and vertical band become one
//! visual line.

use indexmap::IndexMap;

use crate::collect::GlyphRun;
use crate::layout::round_half_up;

/// Height of the vertical band that groups runs into one line. Absorbs
/// baseline jitter between mixed-size runs.
pub const LINE_BAND: i64 = 3;

/// A visual line built from one or more glyph runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Member texts, left to right, joined by single spaces.
    pub text: String,
    /// Rounded unweighted mean of the members' font sizes.
    pub font_size: i64,
    pub page: usize,
    /// Quantized vertical position.
    pub band: i64,
    /// Number of glyph runs merged into this line.
    pub run_count: usize,
}

impl Line {
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// A line made of a single glyph run.
    pub fn is_isolated(&self) -> bool {
        self.run_count == 1
    }
}

fn band_of(y: i64) -> i64 {
    round_half_up(y as f64 / LINE_BAND as f64).saturating_mul(LINE_BAND)
}

/// Group runs by `(page, band)` and reduce each group to a [`Line`].
///
/// Lines come out in order of the first run that opened each group.
pub fn assemble_lines(runs: Vec<GlyphRun>) -> Vec<Line> {
    let mut groups: IndexMap<(usize, i64), Vec<GlyphRun>> = IndexMap::new();
    for run in runs {
        groups.entry((run.page, band_of(run.y))).or_default().push(run);
    }

    groups
        .into_iter()
        .map(|((page, band), members)| build_line(page, band, members))
        .collect()
}

fn build_line(page: usize, band: i64, mut members: Vec<GlyphRun>) -> Line {
    members.sort_by_key(|run| run.x);

    let text = members
        .iter()
        .map(|run| run.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
        .trim()
        .to_string();

    let total: f64 = members.iter().map(|run| run.font_size as f64).sum();
    let font_size = round_half_up(total / members.len() as f64);

    Line {
        text,
        font_size,
        page,
        band,
        run_count: members.len(),
    }
}
