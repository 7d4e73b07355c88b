//! # unocr
//!
//! Reconstructs readable text from the raw output of an OCR engine run over
//! scanned PDF documents.
//!
//! ## Pipeline
//!
//! Each page flows through five stages:
//!
//! 1. **Ingest** - decode the engine's per-page result into detections
//! 2. **Group** - cluster detections into reading-order lines
//! 3. **Normalize** - clean whitespace, particles, punctuation and parentheses
//! 4. **Remerge** - rejoin short lines split off a sentence
//! 5. **Assemble** - join pages into the document text
//!
//! Rasterization and recognition are external collaborators behind the
//! [`Rasterizer`] and [`OcrEngine`] traits.
//!
//! ## Quick Start
//!
//! ```
//! use unocr::reconstruct_page_text;
//!
//! let raw = serde_json::json!([[
//!     [[[0, 5], [40, 5], [40, 15], [0, 15]], ["Hello", 0.95]],
//!     [[[60, 7], [100, 7], [100, 17], [60, 17]], ["World", 0.9]],
//!     [[[0, 45], [10, 45], [10, 55], [0, 55]], ["1.", 0.9]],
//!     [[[20, 47], [60, 47], [60, 57], [20, 57]], ["Item", 0.9]]
//! ]]);
//!
//! let text = reconstruct_page_text(&raw)?;
//! assert_eq!(text, "Hello World\n1. Item");
//! # Ok::<(), unocr::Error>(())
//! ```
//!
//! ## Batch conversion
//!
//! ```no_run
//! use unocr::{CommandOcrEngine, Unocr};
//!
//! let engine = CommandOcrEngine::new("python3")
//!     .with_arg("paddle_bridge.py")
//!     .with_lang("korean");
//! let summary = Unocr::new()
//!     .with_language("korean")
//!     .with_dpi(300)
//!     .run("./ex_pdf", "./output_texts", &engine)?;
//! println!("Succeeded: {}, Failed: {}", summary.succeeded, summary.failed);
//! # Ok::<(), unocr::Error>(())
//! ```

pub mod assemble;
pub mod batch;
pub mod error;
pub mod ingest;
pub mod language;
pub mod layout;
pub mod model;
pub mod normalize;
pub mod ocr;
pub mod options;
pub mod pipeline;
pub mod raster;
pub mod remerge;

// Re-exports
pub use assemble::{assemble_pages, finalize_text};
pub use batch::{
    discover_pdfs, run_batch, run_batch_documents, BatchSummary, DocumentOutcome, DocumentStatus,
};
pub use error::{Error, Result};
pub use ingest::{ingest, ingest_str, RawOcrOutput};
pub use language::LanguageProfile;
pub use layout::{group_line_texts, group_lines};
pub use model::{Detection, Document, Line, Page, PageDetections, Point, Quad};
pub use normalize::Normalizer;
pub use ocr::{CommandOcrEngine, OcrEngine, PageImage};
pub use options::{BatchConfig, LayoutOptions, NormalizeOptions, ProcessOptions, RemergeOptions};
pub use pipeline::DocumentProcessor;
pub use raster::{PopplerRasterizer, Rasterizer};
pub use remerge::{LineKind, Remerger};

use std::path::PathBuf;
use std::time::Duration;

/// Reconstructs the lines of one page from raw OCR output with default options.
pub fn reconstruct_page(raw: &RawOcrOutput) -> Result<Page> {
    reconstruct_page_with_options(raw, &ProcessOptions::default())
}

/// Reconstructs the lines of one page with custom options.
pub fn reconstruct_page_with_options(raw: &RawOcrOutput, options: &ProcessOptions) -> Result<Page> {
    let processor = DocumentProcessor::new(options.clone())?;
    Ok(processor.process_raw(0, raw))
}

/// Reconstructs the text of one page from raw OCR output.
pub fn reconstruct_page_text(raw: &RawOcrOutput) -> Result<String> {
    let page = reconstruct_page(raw)?;
    Ok(assemble_pages(&[page]))
}

/// Builder for configuring and running conversions.
///
/// # Example
///
/// ```
/// use unocr::Unocr;
///
/// let processor = Unocr::new()
///     .with_language("en")
///     .with_y_thresh(15.0)
///     .with_min_length(8)
///     .processor()?;
/// assert_eq!(processor.options().remerge.min_length, 8);
/// # Ok::<(), unocr::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Unocr {
    options: ProcessOptions,
}

impl Unocr {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language for OCR and for the text rules.
    pub fn with_language(mut self, code: &str) -> Self {
        self.options = self.options.with_language(code);
        self
    }

    /// Sets the vertical line grouping threshold in pixels.
    pub fn with_y_thresh(mut self, y_thresh: f64) -> Self {
        self.options.layout.y_thresh = y_thresh;
        self
    }

    /// Sets the horizontal gap threshold in pixels.
    pub fn with_x_thresh(mut self, x_thresh: f64) -> Self {
        self.options.layout.x_thresh = x_thresh;
        self
    }

    /// Sets the minimum detection confidence.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.options.layout.min_confidence = min_confidence;
        self
    }

    /// Sets the length below which unfinished lines are re-merged.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.options = self.options.with_min_length(min_length);
        self
    }

    /// Sets the rasterization DPI.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.options = self.options.with_dpi(dpi);
        self
    }

    /// Sets the per-document time limit.
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_document_timeout(timeout);
        self
    }

    /// Processes batch documents in parallel.
    pub fn parallel(mut self) -> Self {
        self.options = self.options.parallel();
        self
    }

    /// Returns the configured options.
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Builds a document processor.
    pub fn processor(&self) -> Result<DocumentProcessor> {
        DocumentProcessor::new(self.options.clone())
    }

    /// Returns a poppler rasterizer at the configured DPI.
    pub fn rasterizer(&self) -> PopplerRasterizer {
        PopplerRasterizer::from_options(&self.options)
    }

    /// Converts every PDF in `input_dir` into a text file in `output_dir`,
    /// rasterizing with [`Unocr::rasterizer`].
    pub fn run(
        self,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        engine: &dyn OcrEngine,
    ) -> Result<BatchSummary> {
        let rasterizer = self.rasterizer();
        self.run_with_rasterizer(input_dir, output_dir, engine, &rasterizer)
    }

    /// Converts every PDF in `input_dir` with a caller-supplied rasterizer.
    pub fn run_with_rasterizer(
        self,
        input_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        engine: &dyn OcrEngine,
        rasterizer: &dyn Rasterizer,
    ) -> Result<BatchSummary> {
        let config = BatchConfig::new(input_dir, output_dir).with_options(self.options);
        run_batch(&config, engine, rasterizer, |_| {})
    }
}
