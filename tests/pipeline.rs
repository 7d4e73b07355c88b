//! End-to-end tests with stub rasterizer and OCR engine.

use serde_json::json;
use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use unocr::{
    discover_pdfs, run_batch, run_batch_documents, BatchConfig, DocumentProcessor, DocumentStatus, Error, PageImage, ProcessOptions,
    RawOcrOutput, Rasterizer, Result,
};

/// Reads the page count from the "PDF" file body and writes empty images.
struct StubRasterizer;

impl Rasterizer for StubRasterizer {
    fn page_count(&self, pdf: &Path) -> Result<usize> {
        fs::read_to_string(pdf)?
            .trim()
            .parse()
            .map_err(|_| Error::Rasterize(format!("corrupt file {}", pdf.display())))
    }

    fn render_page(&self, pdf: &Path, page_idx: usize, out_dir: &Path) -> Result<PageImage> {
        let stem = pdf.file_stem().unwrap().to_string_lossy();
        let path = out_dir.join(format!("{stem}-{page_idx}.png"));
        fs::write(&path, b"")?;
        Ok(PageImage::new(page_idx, path))
    }
}

fn bbox(y: f64, x: f64) -> serde_json::Value {
    json!([[x, y - 4.0], [x + 40.0, y - 4.0], [x + 40.0, y + 4.0], [x, y + 4.0]])
}

/// Engine that reports a fixed page per image and fails on `report-1.png`.
fn stub_engine(image: &PageImage) -> Result<RawOcrOutput> {
    let name = image.path.file_name().unwrap().to_string_lossy().into_owned();
    if name == "report-1.png" {
        return Err(Error::Ocr("model crashed".into()));
    }
    Ok(json!([[
        [bbox(10.0, 0.0), ["Page", 0.95]],
        [bbox(12.0, 60.0), [format!("{} text", image.page_idx + 1), 0.9]],
        [bbox(40.0, 0.0), ["noise", 0.3]]
    ]]))
}

fn write_pdf(dir: &Path, name: &str, body: &str) {
    fs::write(dir.join(name), body).unwrap();
}

#[test]
fn test_end_to_end_scenario() {
    let raw = json!([
        [bbox(10.0, 0.0), ["Hello", 0.95]],
        [bbox(12.0, 60.0), ["World", 0.9]],
        [bbox(50.0, 0.0), ["1.", 0.9]],
        [bbox(52.0, 30.0), ["Item", 0.9]]
    ]);

    let page = unocr::reconstruct_page(&raw).unwrap();
    assert_eq!(page.lines, vec!["Hello World", "1. Item"]);
    assert_eq!(unocr::reconstruct_page_text(&raw).unwrap(), "Hello World\n1. Item");
}

#[test]
fn test_page_failure_isolation() {
    let input = TempDir::new().unwrap();
    write_pdf(input.path(), "report.pdf", "3");

    let processor = DocumentProcessor::new(ProcessOptions::default()).unwrap();
    let document = processor
        .process_pdf(&stub_engine, &StubRasterizer, &input.path().join("report.pdf"))
        .unwrap();

    assert_eq!(document.text(), "Page 1 text\n\nPage 3 text");
    assert_eq!(document.failed_pages.len(), 1);
    assert_eq!(document.failed_pages[0].index, 1);
}

#[test]
fn test_batch_counts_and_outputs() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(input.path(), "report.pdf", "3");
    write_pdf(input.path(), "memo.PDF", "1");
    write_pdf(input.path(), "broken.pdf", "not a pdf");
    write_pdf(input.path(), "readme.txt", "2");

    let out_dir = output.path().join("texts");
    let config = BatchConfig::new(input.path(), &out_dir);
    let seen = AtomicUsize::new(0);

    let summary = run_batch(&config, &stub_engine, &StubRasterizer, |_| {
        seen.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();

    assert_eq!(summary.succeeded, 2);
    assert_eq!(summary.failed, 1);
    assert_eq!(seen.load(Ordering::SeqCst), 3);

    let names: Vec<_> = summary
        .outcomes
        .iter()
        .map(|o| o.input.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["broken.pdf", "memo.PDF", "report.pdf"]);
    assert!(matches!(
        summary.outcomes[0].status,
        DocumentStatus::Failed { .. }
    ));

    assert_eq!(
        fs::read_to_string(out_dir.join("report.txt")).unwrap(),
        "Page 1 text\n\nPage 3 text"
    );
    assert_eq!(fs::read_to_string(out_dir.join("memo.txt")).unwrap(), "Page 1 text");
    assert!(!out_dir.join("broken.txt").exists());
}

#[test]
fn test_parallel_batch_keeps_discovery_order() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    for i in 0..6 {
        write_pdf(input.path(), &format!("doc{i}.pdf"), "2");
    }

    let config = BatchConfig::new(input.path(), output.path())
        .with_options(ProcessOptions::default().parallel());
    let summary = run_batch(&config, &stub_engine, &StubRasterizer, |_| {}).unwrap();

    assert_eq!(summary.succeeded, 6);
    let names: Vec<_> = summary
        .outcomes
        .iter()
        .map(|o| o.input.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec!["doc0.pdf", "doc1.pdf", "doc2.pdf", "doc3.pdf", "doc4.pdf", "doc5.pdf"]
    );
}

#[test]
fn test_batch_environment_errors() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();

    let config = BatchConfig::new(input.path(), output.path());
    let result = run_batch(&config, &stub_engine, &StubRasterizer, |_| {});
    assert!(matches!(result, Err(Error::NoDocuments(_))));

    let config = BatchConfig::new(input.path().join("missing"), output.path());
    let result = run_batch(&config, &stub_engine, &StubRasterizer, |_| {});
    assert!(matches!(result, Err(ref e) if e.is_environment()));
}

#[test]
fn test_batch_over_discovered_list() {
    let input = TempDir::new().unwrap();
    let output = TempDir::new().unwrap();
    write_pdf(input.path(), "memo.pdf", "1");
    write_pdf(input.path(), "report.pdf", "3");

    let pdfs = discover_pdfs(input.path()).unwrap();
    let config = BatchConfig::new(input.path(), output.path());
    let summary =
        run_batch_documents(&config, &pdfs[1..], &stub_engine, &StubRasterizer, |_| {}).unwrap();

    assert_eq!(summary.total(), 1);
    assert!(output.path().join("report.txt").exists());
    assert!(!output.path().join("memo.txt").exists());
}
