//! Batch conversion of a directory of PDFs into text files.

use crate::error::{Error, Result};
use crate::ocr::OcrEngine;
use crate::options::BatchConfig;
use crate::pipeline::DocumentProcessor;
use crate::raster::Rasterizer;
use rayon::prelude::*;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentStatus {
    /// Text was written to `output`.
    Succeeded {
        output: PathBuf,
        pages: usize,
        failed_pages: usize,
    },
    /// The document produced no output.
    Failed { message: String },
}

/// One processed document.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentOutcome {
    pub input: PathBuf,
    pub status: DocumentStatus,
}

impl DocumentOutcome {
    /// Returns true if the document's text was written.
    pub fn is_success(&self) -> bool {
        matches!(self.status, DocumentStatus::Succeeded { .. })
    }
}

/// Aggregate result of a batch run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
    /// Per-document outcomes in discovery order.
    pub outcomes: Vec<DocumentOutcome>,
}

impl BatchSummary {
    fn from_outcomes(outcomes: Vec<DocumentOutcome>) -> Self {
        let succeeded = outcomes.iter().filter(|o| o.is_success()).count();
        Self {
            succeeded,
            failed: outcomes.len() - succeeded,
            outcomes,
        }
    }

    /// Total number of documents attempted.
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Lists the PDF files directly inside `dir`, sorted by path.
///
/// The extension check is case-insensitive; subdirectories are not searched.
pub fn discover_pdfs(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::InputNotFound(dir.to_path_buf()));
    }

    let mut pdfs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_pdf(&path) {
            pdfs.push(path);
        }
    }
    pdfs.sort();
    Ok(pdfs)
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("pdf"))
}

/// Path of the text file written for `pdf`.
pub fn output_path(pdf: &Path, output_dir: &Path) -> PathBuf {
    let stem = pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    output_dir.join(format!("{stem}.txt"))
}

/// Converts every PDF in `config.input_dir` and writes `<stem>.txt` files.
///
/// Document failures are counted in the summary and never stop the batch.
/// Only a missing input directory, an input directory without PDFs, invalid
/// options or an unwritable output directory return an error. `progress` is
/// called once per finished document, possibly from worker threads.
pub fn run_batch<P>(
    config: &BatchConfig,
    engine: &dyn OcrEngine,
    rasterizer: &dyn Rasterizer,
    progress: P,
) -> Result<BatchSummary>
where
    P: Fn(&DocumentOutcome) + Sync,
{
    let pdfs = discover_pdfs(&config.input_dir)?;
    if pdfs.is_empty() {
        return Err(Error::NoDocuments(config.input_dir.clone()));
    }
    run_batch_documents(config, &pdfs, engine, rasterizer, progress)
}

/// Converts an already discovered list of PDFs, e.g. from [`discover_pdfs`].
///
/// Outcomes keep the order of `pdfs`.
pub fn run_batch_documents<P>(
    config: &BatchConfig,
    pdfs: &[PathBuf],
    engine: &dyn OcrEngine,
    rasterizer: &dyn Rasterizer,
    progress: P,
) -> Result<BatchSummary>
where
    P: Fn(&DocumentOutcome) + Sync,
{
    let processor = DocumentProcessor::new(config.options.clone())?;
    fs::create_dir_all(&config.output_dir)?;
    log::info!(
        "Converting {} PDF files from {}",
        pdfs.len(),
        config.input_dir.display()
    );

    let convert = |pdf: &PathBuf| {
        let outcome = convert_document(&processor, engine, rasterizer, pdf, &config.output_dir);
        progress(&outcome);
        outcome
    };

    let outcomes: Vec<DocumentOutcome> = if config.options.parallel {
        pdfs.par_iter().map(convert).collect()
    } else {
        pdfs.iter().map(convert).collect()
    };

    let summary = BatchSummary::from_outcomes(outcomes);
    log::info!(
        "Batch finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );
    Ok(summary)
}

fn convert_document(
    processor: &DocumentProcessor,
    engine: &dyn OcrEngine,
    rasterizer: &dyn Rasterizer,
    pdf: &Path,
    output_dir: &Path,
) -> DocumentOutcome {
    let status = match write_document(processor, engine, rasterizer, pdf, output_dir) {
        Ok(status) => status,
        Err(e) => {
            log::error!("Failed to process {}: {}", pdf.display(), e);
            DocumentStatus::Failed {
                message: e.to_string(),
            }
        }
    };

    DocumentOutcome {
        input: pdf.to_path_buf(),
        status,
    }
}

fn write_document(
    processor: &DocumentProcessor,
    engine: &dyn OcrEngine,
    rasterizer: &dyn Rasterizer,
    pdf: &Path,
    output_dir: &Path,
) -> Result<DocumentStatus> {
    let document = processor.process_pdf(engine, rasterizer, pdf)?;
    let output = output_path(pdf, output_dir);
    fs::write(&output, document.text())?;
    log::info!("Saved {}", output.display());

    Ok(DocumentStatus::Succeeded {
        output,
        pages: document.pages.len(),
        failed_pages: document.failed_pages.len(),
    })
}
