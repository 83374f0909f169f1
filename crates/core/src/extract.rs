//! The outline pipeline: collect -> histogram -> lines -> classify -> dedupe.
//!
//! ```text
//! PageLayout[] -> GlyphRun[] + FontHistogram -> Line[] -> HeadingCandidate[] -> OutlineResult
//!                 Collector      HeadingTiers    assemble   Classifier          dedupe
//! ```
//!
//! Every stage only reads what the previous one produced. All state lives in
//! locals of a single call, so independent documents can be processed in
//! parallel.

use std::fmt;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

use crate::classify::Classifier;
use crate::collect::Collector;
use crate::dedup::dedupe;
use crate::fonts::HeadingTiers;
use crate::layout::PageLayout;
use crate::lines::assemble_lines;
use crate::types::{fallback_outline, OutlineResult, DEFAULT_TITLE};

/// Provider of page layouts, read one page at a time.
pub trait PageSource {
    type Error: fmt::Display;

    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Text layout of the 1-based page `number`.
    fn page(&self, number: usize) -> Result<PageLayout, Self::Error>;
}

#[derive(Debug, Error)]
pub enum OutlineError {
    #[error("page {page}: {message}")]
    Page { page: usize, message: String },
}

/// Build the outline for already-extracted pages.
pub fn extract_outline(pages: &[PageLayout]) -> OutlineResult {
    let mut collector = Collector::new();
    for page in pages {
        collect_page(&mut collector, page);
    }
    finish(collector)
}

/// Read every page from `source` in order and build the outline.
///
/// Never fails: a page that cannot be read turns the whole result into the
/// error outline stamped with `now`.
pub fn extract_from_source<S>(source: &S, now: DateTime<Utc>) -> OutlineResult
where
    S: PageSource + ?Sized,
{
    match collect_source(source) {
        Ok(collector) => finish(collector),
        Err(err) => {
            warn!("outline extraction failed: {err}");
            OutlineResult::failure(err.to_string(), now)
        }
    }
}

fn collect_source<S>(source: &S) -> Result<Collector, OutlineError>
where
    S: PageSource + ?Sized,
{
    let count = source.page_count();
    debug!("reading {count} pages");

    let mut collector = Collector::new();
    for number in 1..=count {
        let page = source.page(number).map_err(|e| OutlineError::Page {
            page: number,
            message: e.to_string(),
        })?;
        collect_page(&mut collector, &page);
    }
    Ok(collector)
}

fn collect_page(collector: &mut Collector, page: &PageLayout) {
    let kept = collector.push_page(page);
    if page.number <= 5 || page.number % 10 == 0 {
        debug!("page {}: {} text runs", page.number, kept);
    }
}

fn finish(collector: Collector) -> OutlineResult {
    debug!("total text runs: {}", collector.run_count());

    let (runs, histogram) = collector.finish();
    let Some(tiers) = HeadingTiers::from_histogram(&histogram) else {
        debug!("no text found, returning the empty-document outline");
        return OutlineResult::no_text();
    };

    debug!(
        "font sizes: {:?}, body size: {}, heading sizes: {:?}",
        histogram.sizes().collect::<Vec<_>>(),
        tiers.body,
        tiers.sizes
    );

    let lines = assemble_lines(runs);
    debug!("{} text lines", lines.len());

    let mut classifier = Classifier::new(tiers);
    let candidates: Vec<_> = lines
        .iter()
        .filter_map(|line| classifier.classify(line))
        .collect();
    debug!("{} heading candidates", candidates.len());

    let mut outline = dedupe(candidates);
    if outline.is_empty() {
        debug!("no headings survived, using the fallback outline");
        outline = fallback_outline();
    }

    let title = classifier
        .into_title()
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    OutlineResult::new(title, outline)
}
