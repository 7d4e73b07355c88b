//! Data model shared by the pipeline stages.
//!
//! Detections come from the OCR engine and are never mutated; fragments,
//! lines and pages are derived from them stage by stage.

mod detection;
mod document;

pub use detection::*;
pub use document::*;
