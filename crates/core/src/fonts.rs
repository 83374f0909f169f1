//! Document-wide font statistics and the size -> heading-level hierarchy.

use std::collections::BTreeMap;

use crate::types::HeadingLevel;

/// Weight of the character-frequency term in the size ranking comparator.
pub const FREQUENCY_WEIGHT: f64 = 0.05;

/// At most this many sizes above body text are treated as heading tiers.
pub const MAX_HEADING_TIERS: usize = 4;

/// Character count per rounded font size across a whole document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FontHistogram {
    counts: BTreeMap<i64, usize>,
}

impl FontHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `chars` characters at `size`.
    pub fn record(&mut self, size: i64, chars: usize) {
        *self.counts.entry(size).or_insert(0) += chars;
    }

    pub fn count(&self, size: i64) -> usize {
        self.counts.get(&size).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Number of distinct sizes.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Distinct sizes in ascending order.
    pub fn sizes(&self) -> impl Iterator<Item = i64> + '_ {
        self.counts.keys().copied()
    }

    /// Distinct sizes ranked largest-first, with the frequency term able to
    /// swap sizes whose magnitudes are close.
    ///
    /// The comparator `(b - a) + (freq(a) - freq(b)) * FREQUENCY_WEIGHT` is not
    /// a total order, so the ranking uses a stable insertion sort starting
    /// from ascending size order rather than `sort_by`.
    pub fn ranked_sizes(&self) -> Vec<i64> {
        let mut sizes: Vec<i64> = self.sizes().collect();
        for i in 1..sizes.len() {
            let mut j = i;
            while j > 0 && self.rank_order(sizes[j - 1], sizes[j]) > 0.0 {
                sizes.swap(j - 1, j);
                j -= 1;
            }
        }
        sizes
    }

    /// Negative when `a` ranks before `b`.
    fn rank_order(&self, a: i64, b: i64) -> f64 {
        let size_weight = b as f64 - a as f64;
        let freq_weight = (self.count(a) as f64 - self.count(b) as f64) * FREQUENCY_WEIGHT;
        size_weight + freq_weight
    }
}

/// Body text size plus up to four heading sizes above it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingTiers {
    pub body: i64,
    /// Heading sizes in rank order; index 0 is the H1 size.
    pub sizes: Vec<i64>,
}

impl HeadingTiers {
    /// Infer tiers from a histogram. Returns `None` for an empty histogram.
    pub fn from_histogram(histogram: &FontHistogram) -> Option<Self> {
        let ranked = histogram.ranked_sizes();

        // First maximum in rank order wins ties.
        let body = ranked.iter().copied().reduce(|prev, curr| {
            if histogram.count(curr) > histogram.count(prev) {
                curr
            } else {
                prev
            }
        })?;

        let sizes = ranked
            .into_iter()
            .filter(|&size| size > body)
            .take(MAX_HEADING_TIERS)
            .collect();

        Some(HeadingTiers { body, sizes })
    }

    fn tier(&self, index: usize) -> Option<i64> {
        self.sizes.get(index).copied()
    }

    pub fn h1(&self) -> Option<i64> {
        self.tier(0)
    }

    pub fn h2(&self) -> Option<i64> {
        self.tier(1)
    }

    pub fn h3(&self) -> Option<i64> {
        self.tier(2)
    }

    /// The fourth tier, which folds into H3.
    pub fn h4(&self) -> Option<i64> {
        self.tier(3)
    }

    /// Level implied by font size alone.
    ///
    /// Each band is bounded above by the previous tier. When the ranking put
    /// tiers out of magnitude order a band can be empty.
    pub fn level_for_size(&self, size: i64) -> Option<HeadingLevel> {
        let h1 = self.h1()?;
        if size >= h1 {
            return Some(HeadingLevel::H1);
        }

        let bands = [
            (self.h2(), h1, HeadingLevel::H2),
            (self.h3(), self.h2().unwrap_or(h1), HeadingLevel::H3),
            (self.h4(), self.h3().unwrap_or(h1), HeadingLevel::H3),
        ];

        bands.into_iter().find_map(|(lower, upper, level)| {
            let lower = lower?;
            (size >= lower && size < upper).then_some(level)
        })
    }
}
