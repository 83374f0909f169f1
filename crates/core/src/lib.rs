//! Core library for pdfoutline
//!
//! This crate implements the **Functional Core** of the pdfoutline application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The workspace splits responsibilities across three crates:
//!
//! - **`outline_core`** (this crate): heading-outline inference over page
//!   text layouts, with zero I/O
//! - **`outline_pdf`**: decodes PDF documents into page text layouts
//! - **`pdfoutline`**: file plumbing, output writing and orchestration (the
//!   Imperative Shell)
//!
//! ## Functional Core Principles
//!
//! - **Pure functions**: the same page layouts always produce the same outline
//! - **No side effects**: no file access; the only clock reading is passed in
//!   by the caller
//! - **Never fails**: every entry point returns a structurally valid
//!   [`OutlineResult`] with a non-empty outline
//!
//! # Pipeline
//!
//! 1. [`collect`]: trim and filter text runs, tally characters per font size
//! 2. [`fonts`]: infer body size and up to four heading size tiers
//! 3. [`lines`]: merge runs on the same page and vertical band into lines
//! 4. [`classify`]: assign H1/H2/H3 by size, falling back to typographic cues
//! 5. [`dedup`]: drop near-duplicate headings and order by page
//!
//! # Example Usage
//!
//! ```rust
//! use outline_core::{extract_outline, HeadingLevel, PageLayout, TextRun};
//!
//! let pages = vec![PageLayout::new(
//!     1,
//!     vec![
//!         TextRun::new("Getting Started", 20.0, 72.0, 760.0),
//!         TextRun::new("plain body text that fills the page", 10.0, 72.0, 700.0),
//!     ],
//! )];
//!
//! let result = extract_outline(&pages);
//! assert_eq!(result.title, "Getting Started");
//! assert_eq!(result.outline[0].level, HeadingLevel::H1);
//! ```

pub mod classify;
pub mod collect;
pub mod dedup;
pub mod extract;
pub mod fonts;
pub mod layout;
pub mod lines;
pub mod types;

pub use extract::{extract_from_source, extract_outline, OutlineError, PageSource};
pub use layout::{PageLayout, TextRun};
pub use types::*;
