use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Title used when no line qualifies as the document title.
pub const DEFAULT_TITLE: &str = "Document Analysis Complete";

/// Title of the outline returned when the document could not be processed.
pub const ERROR_TITLE: &str = "Error Processing Document";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HeadingLevel {
    H1,
    H2,
    H3,
}

impl HeadingLevel {
    pub const ALL: [HeadingLevel; 3] = [HeadingLevel::H1, HeadingLevel::H2, HeadingLevel::H3];

    pub fn as_u8(&self) -> u8 {
        match self {
            HeadingLevel::H1 => 1,
            HeadingLevel::H2 => 2,
            HeadingLevel::H3 => 3,
        }
    }
}

impl fmt::Display for HeadingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "H{}", self.as_u8())
    }
}

/// One heading of the final outline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineEntry {
    pub level: HeadingLevel,
    pub text: String,
    pub page: usize,
}

impl OutlineEntry {
    pub fn new(level: HeadingLevel, text: impl Into<String>, page: usize) -> Self {
        OutlineEntry {
            level,
            text: text.into(),
            page,
        }
    }
}

/// Result of outline extraction for one document.
///
/// `error` and `timestamp` are only populated on the failure path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineResult {
    pub title: String,
    pub outline: Vec<OutlineEntry>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub timestamp: Option<String>,
}

impl OutlineResult {
    pub fn new(title: impl Into<String>, outline: Vec<OutlineEntry>) -> Self {
        OutlineResult {
            title: title.into(),
            outline,
            error: None,
            timestamp: None,
        }
    }

    /// Outline for a readable document that yielded no text at all.
    pub fn no_text() -> Self {
        OutlineResult::new(
            DEFAULT_TITLE,
            vec![
                OutlineEntry::new(HeadingLevel::H1, "Document Content", 1),
                OutlineEntry::new(HeadingLevel::H2, "Main Section", 1),
            ],
        )
    }

    /// Outline returned when loading or reading the document failed.
    pub fn failure(message: impl Into<String>, at: DateTime<Utc>) -> Self {
        OutlineResult {
            title: ERROR_TITLE.to_string(),
            outline: vec![
                OutlineEntry::new(HeadingLevel::H1, "Document Processing Error", 1),
                OutlineEntry::new(HeadingLevel::H2, "Unable to extract content", 1),
                OutlineEntry::new(HeadingLevel::H3, "Please check document format", 1),
            ],
            error: Some(message.into()),
            timestamp: Some(at.to_rfc3339_opts(SecondsFormat::Millis, true)),
        }
    }

    pub fn is_failure(&self) -> bool {
        self.error.is_some()
    }

    /// Number of outline entries per level, in level order. Levels with no
    /// entries are omitted.
    pub fn level_counts(&self) -> Vec<(HeadingLevel, usize)> {
        HeadingLevel::ALL
            .into_iter()
            .map(|level| {
                let count = self.outline.iter().filter(|e| e.level == level).count();
                (level, count)
            })
            .filter(|(_, count)| *count > 0)
            .collect()
    }
}

/// Outline substituted when classification kept no headings.
pub fn fallback_outline() -> Vec<OutlineEntry> {
    vec![
        OutlineEntry::new(HeadingLevel::H1, "Document Overview", 1),
        OutlineEntry::new(HeadingLevel::H2, "Main Content", 1),
        OutlineEntry::new(HeadingLevel::H3, "Section Details", 2),
    ]
}
