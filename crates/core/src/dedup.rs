//! Near-duplicate removal and page ordering of heading candidates.

use crate::classify::{HeadingCandidate, MIN_LINE_CHARS};
use crate::types::OutlineEntry;

/// Containment only counts as a duplicate when the two texts differ in length
/// by less than this many characters.
pub const CONTAINMENT_SLACK: usize = 10;

/// Whether two heading texts name the same heading: equal ignoring case, or
/// one containing the other (ignoring case) with a small length difference.
pub fn is_near_duplicate(a: &str, b: &str) -> bool {
    let (la, lb) = (a.to_lowercase(), b.to_lowercase());
    if la == lb {
        return true;
    }

    let diff = a.chars().count().abs_diff(b.chars().count());
    diff < CONTAINMENT_SLACK && (la.contains(&lb) || lb.contains(&la))
}

/// Keep the first of every group of near-duplicate candidates and order the
/// survivors by page. Candidates on the same page keep discovery order.
pub fn dedupe(candidates: Vec<HeadingCandidate>) -> Vec<OutlineEntry> {
    let mut kept: Vec<OutlineEntry> = Vec::with_capacity(candidates.len());

    for candidate in candidates {
        if candidate.text.chars().count() < MIN_LINE_CHARS {
            continue;
        }
        if kept
            .iter()
            .any(|existing| is_near_duplicate(&existing.text, &candidate.text))
        {
            continue;
        }
        kept.push(OutlineEntry::new(
            candidate.level,
            candidate.text,
            candidate.page,
        ));
    }

    kept.sort_by_key(|entry| entry.page);
    kept
}
