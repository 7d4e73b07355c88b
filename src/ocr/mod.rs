//! The OCR engine boundary.
//!
//! The engine itself is an external collaborator. It is created once by the
//! caller and passed by reference into the pipeline, so tests and embedders
//! can substitute their own implementation, including a plain closure.

pub mod bridge;

pub use bridge::CommandOcrEngine;

use crate::error::Result;
use crate::ingest::RawOcrOutput;
use std::path::PathBuf;

/// A rasterized page image on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageImage {
    /// Zero-based page index within its document.
    pub page_idx: usize,
    /// Location of the image file.
    pub path: PathBuf,
}

impl PageImage {
    pub fn new(page_idx: usize, path: impl Into<PathBuf>) -> Self {
        Self {
            page_idx,
            path: path.into(),
        }
    }
}

/// Recognizes text on a page image.
pub trait OcrEngine: Send + Sync {
    /// Returns the engine's raw result for one page; see [`crate::ingest`]
    /// for the accepted shapes. `null` means nothing was recognized.
    fn recognize(&self, image: &PageImage) -> Result<RawOcrOutput>;
}

impl<F> OcrEngine for F
where
    F: Fn(&PageImage) -> Result<RawOcrOutput> + Send + Sync,
{
    fn recognize(&self, image: &PageImage) -> Result<RawOcrOutput> {
        self(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use serde_json::json;

    #[test]
    fn test_closure_engine() {
        let engine = |image: &PageImage| -> Result<RawOcrOutput> {
            if image.page_idx == 1 {
                Err(Error::Ocr("unreadable".into()))
            } else {
                Ok(json!({ "rec_texts": ["페이지"] }))
            }
        };

        let dyn_engine: &dyn OcrEngine = &engine;
        assert!(dyn_engine.recognize(&PageImage::new(0, "p0.png")).is_ok());
        assert!(dyn_engine.recognize(&PageImage::new(1, "p1.png")).is_err());
    }
}
