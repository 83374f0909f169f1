//! Heading classification of assembled lines.
//!
//! Font size decides first. When the size tiers say nothing, a typographic
//! heuristic (casing, numbering, trailing punctuation, isolation) gets a
//! chance, and the level is then derived from the distance to body size.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::fonts::HeadingTiers;
use crate::lines::Line;
use crate::types::HeadingLevel;

/// Shortest line text that can become a heading.
pub const MIN_LINE_CHARS: usize = 3;

/// A size-promoted H1 only becomes the title below this length.
pub const MAX_TITLE_CHARS: usize = 100;

/// The heuristic only looks at lines strictly between these lengths.
const HEURISTIC_MIN_CHARS: usize = 5;
const HEURISTIC_MAX_CHARS: usize = 150;

/// Upper bound of a "reasonable" heading length for the heuristic.
const REASONABLE_MAX_CHARS: usize = 100;

static NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\.?\s").unwrap());

/// A line that was assigned a heading level, before deduplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadingCandidate {
    pub level: HeadingLevel,
    pub text: String,
    pub page: usize,
    pub font_size: i64,
}

/// Boolean typographic signals used by the fallback heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeadingSignals {
    pub reasonable_length: bool,
    pub starts_uppercase: bool,
    pub all_caps: bool,
    pub no_trailing_punctuation: bool,
    pub numbered: bool,
    pub isolated: bool,
}

impl HeadingSignals {
    pub fn of(line: &Line) -> Self {
        let text = line.text.as_str();
        let chars = line.char_count();

        HeadingSignals {
            reasonable_length: (HEURISTIC_MIN_CHARS..=REASONABLE_MAX_CHARS).contains(&chars),
            starts_uppercase: text.chars().next().is_some_and(|c| c.is_ascii_uppercase()),
            all_caps: chars > 2 && text.to_uppercase() == text,
            no_trailing_punctuation: !text.ends_with(['.', '!', '?', ';', ',']),
            numbered: NUMBERED.is_match(text),
            isolated: line.is_isolated(),
        }
    }

    /// Whether the line looks like a heading regardless of its size.
    pub fn qualifies(&self) -> bool {
        self.reasonable_length
            && (self.all_caps
                || self.numbered
                || (self.starts_uppercase && self.no_trailing_punctuation && self.isolated))
    }
}

/// Per-document classification state: the size tiers, the texts already
/// emitted as headings and the title once one is found.
#[derive(Debug)]
pub struct Classifier {
    tiers: HeadingTiers,
    seen: HashSet<String>,
    title: Option<String>,
}

impl Classifier {
    pub fn new(tiers: HeadingTiers) -> Self {
        Classifier {
            tiers,
            seen: HashSet::new(),
            title: None,
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn into_title(self) -> Option<String> {
        self.title
    }

    /// Classify one line. Lines are expected in assembly order; the first
    /// line to claim H1 becomes the title.
    pub fn classify(&mut self, line: &Line) -> Option<HeadingCandidate> {
        let chars = line.char_count();
        if chars < MIN_LINE_CHARS {
            return None;
        }

        let key = line.text.to_lowercase();
        if self.seen.contains(&key) {
            return None;
        }

        let level = match self.tiers.level_for_size(line.font_size) {
            Some(HeadingLevel::H1) => {
                if chars < MAX_TITLE_CHARS {
                    self.claim_title(&line.text);
                }
                HeadingLevel::H1
            }
            Some(level) => level,
            None => self.heuristic_level(line, chars)?,
        };

        self.seen.insert(key);
        Some(HeadingCandidate {
            level,
            text: line.text.clone(),
            page: line.page,
            font_size: line.font_size,
        })
    }

    fn heuristic_level(&mut self, line: &Line, chars: usize) -> Option<HeadingLevel> {
        if chars <= HEURISTIC_MIN_CHARS || chars >= HEURISTIC_MAX_CHARS {
            return None;
        }

        let signals = HeadingSignals::of(line);
        if !signals.qualifies() {
            return None;
        }

        let body = self.tiers.body;
        let size = line.font_size;
        if size >= body.saturating_add(3) {
            self.claim_title(&line.text);
            Some(HeadingLevel::H1)
        } else if size >= body.saturating_add(1) {
            Some(HeadingLevel::H2)
        } else if size >= body || signals.all_caps || signals.numbered {
            Some(HeadingLevel::H3)
        } else {
            None
        }
    }

    fn claim_title(&mut self, text: &str) {
        if self.title.is_none() {
            self.title = Some(text.to_string());
        }
    }
}
