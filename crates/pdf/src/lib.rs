//! PDF front end for pdfoutline.
//!
//! Loads documents with `lopdf`, turns each page's content stream into
//! positioned text runs and hands them to [`outline_core`] for heading
//! inference.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use log::{debug, warn};
use thiserror::Error;

use outline_core::{OutlineResult, PageLayout, PageSource};
use parser::backend::{LopdfBackend, PageId, PdfBackend};

pub mod parser;
pub mod types;

pub use types::*;

#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF parsing error: {0}")]
    Parse(String),
    #[error("Document is encrypted")]
    Encrypted,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// A loaded PDF document.
///
/// Constructed via [`PdfDocument::from_bytes`]. Pages are decoded lazily,
/// one at a time, through its [`PageSource`] implementation.
pub struct PdfDocument {
    backend: LopdfBackend,
    /// 1-based page number to page object, read once at load.
    pages: BTreeMap<u32, PageId>,
}

impl PdfDocument {
    /// Parse PDF bytes. Fails on malformed or encrypted input.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PdfError> {
        let backend = LopdfBackend::load_bytes(bytes)?;
        let pages = backend.pages();
        debug!("loaded PDF with {} pages", pages.len());
        Ok(Self { backend, pages })
    }

    pub fn metadata(&self) -> DocumentMetadata {
        let mut raw = self.backend.metadata();
        DocumentMetadata {
            title: raw.remove("Title"),
            author: raw.remove("Author"),
            creator: raw.remove("Creator"),
            producer: raw.remove("Producer"),
            page_count: self.pages.len(),
        }
    }

    /// Infer the heading outline, stamping failures with `now`.
    pub fn outline_at(&self, now: DateTime<Utc>) -> OutlineResult {
        outline_core::extract_from_source(self, now)
    }
}

impl PageSource for PdfDocument {
    type Error = PdfError;

    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn page(&self, number: usize) -> Result<PageLayout, PdfError> {
        let page_id = u32::try_from(number)
            .ok()
            .and_then(|n| self.pages.get(&n).copied())
            .ok_or_else(|| PdfError::Parse(format!("page {number} does not exist")))?;

        let spans = parser::text::extract_page_spans(&self.backend, page_id)?;
        Ok(parser::text::page_layout(number, spans))
    }
}

// ---------------------------------------------------------------------------
// Convenience free functions
// ---------------------------------------------------------------------------

/// Infer the heading outline of a PDF.
///
/// Never fails: unreadable documents yield the error outline with the
/// failure message and the current time.
pub fn outline(bytes: &[u8]) -> OutlineResult {
    outline_at(bytes, Utc::now())
}

/// [`outline`] with an explicit clock reading for failure timestamps.
pub fn outline_at(bytes: &[u8], now: DateTime<Utc>) -> OutlineResult {
    match PdfDocument::from_bytes(bytes) {
        Ok(doc) => doc.outline_at(now),
        Err(err) => {
            warn!("cannot load PDF: {err}");
            OutlineResult::failure(err.to_string(), now)
        }
    }
}

/// Get document metadata without running outline inference.
pub fn info(bytes: &[u8]) -> Result<DocumentMetadata, PdfError> {
    Ok(PdfDocument::from_bytes(bytes)?.metadata())
}
