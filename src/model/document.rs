//! Lines, pages and documents produced by the pipeline.

use super::PositionedFragment;
use serde::Serialize;

/// Fragments judged to lie on one visual text line.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Line {
    /// Fragments ordered left to right.
    pub fragments: Vec<PositionedFragment>,
}

impl Line {
    /// Creates a line from already ordered fragments.
    pub fn new(fragments: Vec<PositionedFragment>) -> Self {
        Self { fragments }
    }

    /// Joins the fragment texts with single spaces.
    pub fn text(&self) -> String {
        self.fragments
            .iter()
            .map(|f| f.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Returns true if the line holds no fragments.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }
}

/// Finalized lines of one rasterized page.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Page {
    /// Zero-based page index within the document.
    pub index: usize,
    /// Normalized and re-merged lines, top to bottom.
    pub lines: Vec<String>,
}

impl Page {
    /// Creates a page.
    pub fn new(index: usize, lines: Vec<String>) -> Self {
        Self { index, lines }
    }

    /// Returns true if the page produced no text.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// A page that was skipped because rasterization or OCR failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageFailure {
    /// Zero-based page index within the document.
    pub index: usize,
    /// Error message.
    pub message: String,
}

/// Result of processing one document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Document {
    /// Pages that were processed, in page order.
    pub pages: Vec<Page>,
    /// Pages that were skipped.
    pub failed_pages: Vec<PageFailure>,
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of pages attempted.
    pub fn page_count(&self) -> usize {
        self.pages.len() + self.failed_pages.len()
    }

    /// Total number of lines over all pages.
    pub fn line_count(&self) -> usize {
        self.pages.iter().map(|p| p.lines.len()).sum()
    }

    /// Returns the assembled document text.
    pub fn text(&self) -> String {
        crate::assemble::assemble_pages(&self.pages)
    }
}
