//! Error types for unocr library.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for unocr operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for unocr library.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// OCR output could not be decoded as JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// The input directory does not exist.
    #[error("Input directory not found: {}", .0.display())]
    InputNotFound(PathBuf),

    /// The input directory contains no PDF files.
    #[error("No PDF files found in {}", .0.display())]
    NoDocuments(PathBuf),

    /// Rasterization of a document or page failed.
    #[error("Rasterization error: {0}")]
    Rasterize(String),

    /// The OCR engine failed on a page.
    #[error("OCR error: {0}")]
    Ocr(String),

    /// An external command exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    ExternalTool { tool: String, message: String },

    /// The document did not finish within the configured time limit.
    #[error("Document processing exceeded {limit:?}")]
    Timeout { limit: Duration },

    /// No page of the document produced any text.
    #[error("No text could be extracted from the document")]
    EmptyDocument,

    /// Invalid option values.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}

impl Error {
    /// Returns true if the error is an environment problem that should stop a
    /// batch before any document is attempted.
    pub fn is_environment(&self) -> bool {
        matches!(self, Error::InputNotFound(_) | Error::NoDocuments(_))
    }
}
