//! Per-document processing: rasterize, recognize and reconstruct each page,
//! then fold the pages into a [`Document`].

use crate::error::{Error, Result};
use crate::ingest::{ingest, RawOcrOutput};
use crate::layout::page_line_texts;
use crate::model::{Document, Page, PageDetections, PageFailure};
use crate::normalize::Normalizer;
use crate::ocr::{OcrEngine, PageImage};
use crate::options::ProcessOptions;
use crate::raster::Rasterizer;
use crate::remerge::Remerger;
use std::path::Path;
use std::time::Instant;

/// Reconstructs document text from OCR results.
///
/// Patterns are compiled once in [`DocumentProcessor::new`]; a processor is
/// immutable afterwards and can be shared across threads.
#[derive(Debug)]
pub struct DocumentProcessor {
    options: ProcessOptions,
    normalizer: Normalizer,
    remerger: Remerger,
}

impl DocumentProcessor {
    /// Validates `options` and compiles the text rules.
    pub fn new(options: ProcessOptions) -> Result<Self> {
        options.validate()?;
        let normalizer = Normalizer::new(&options.normalize)?;
        let remerger = Remerger::new(&options.remerge)?;
        Ok(Self {
            options,
            normalizer,
            remerger,
        })
    }

    /// Creates a processor with default options.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ProcessOptions::default())
    }

    /// Returns the processing options.
    pub fn options(&self) -> &ProcessOptions {
        &self.options
    }

    /// Groups, normalizes and re-merges the detections of one page.
    pub fn process_detections(&self, index: usize, detections: &PageDetections) -> Page {
        let raw_lines = page_line_texts(detections, &self.options.layout);
        let normalized = self.normalizer.normalize_lines(&raw_lines);
        let lines = self.remerger.remerge(&normalized);
        log::debug!(
            "Page {}: {} detections, {} lines",
            index + 1,
            detections.len(),
            lines.len()
        );
        Page::new(index, lines)
    }

    /// Reconstructs one page from raw engine output.
    pub fn process_raw(&self, index: usize, raw: &RawOcrOutput) -> Page {
        self.process_detections(index, &ingest(raw))
    }

    /// Runs OCR on one page image and reconstructs its lines.
    pub fn process_page(&self, engine: &dyn OcrEngine, image: &PageImage) -> Result<Page> {
        let raw = engine.recognize(image)?;
        Ok(self.process_raw(image.page_idx, &raw))
    }

    /// Processes already rasterized page images in order.
    ///
    /// A page whose OCR fails is logged and recorded in
    /// [`Document::failed_pages`]; the remaining pages still run.
    pub fn process_pages(&self, engine: &dyn OcrEngine, images: &[PageImage]) -> Result<Document> {
        self.collect_pages(images.len(), |i| self.process_page(engine, &images[i]))
    }

    /// Rasterizes a PDF into a temporary directory and processes every page.
    pub fn process_pdf(
        &self,
        engine: &dyn OcrEngine,
        rasterizer: &dyn Rasterizer,
        pdf: &Path,
    ) -> Result<Document> {
        let page_count = rasterizer.page_count(pdf)?;
        log::info!("Processing {} ({} pages)", pdf.display(), page_count);

        let scratch = tempfile::Builder::new().prefix("unocr-").tempdir()?;
        self.collect_pages(page_count, |page_idx| {
            let image = rasterizer.render_page(pdf, page_idx, scratch.path())?;
            let page = self.process_page(engine, &image);
            // images are large at 300 DPI; drop each one once it has been read
            if let Err(e) = std::fs::remove_file(&image.path) {
                log::debug!("Could not remove {}: {}", image.path.display(), e);
            }
            page
        })
    }

    fn collect_pages<F>(&self, page_count: usize, mut process: F) -> Result<Document>
    where
        F: FnMut(usize) -> Result<Page>,
    {
        let started = Instant::now();
        let mut document = Document::new();

        for page_idx in 0..page_count {
            if let Some(limit) = self.options.document_timeout {
                if started.elapsed() > limit {
                    log::error!(
                        "Time limit of {:?} exceeded before page {} of {}",
                        limit,
                        page_idx + 1,
                        page_count
                    );
                    return Err(Error::Timeout { limit });
                }
            }

            match process(page_idx) {
                Ok(page) => document.pages.push(page),
                Err(e) => {
                    log::warn!("Skipping page {}: {}", page_idx + 1, e);
                    document.failed_pages.push(PageFailure {
                        index: page_idx,
                        message: e.to_string(),
                    });
                }
            }
        }

        if document.text().is_empty() {
            return Err(Error::EmptyDocument);
        }
        Ok(document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Detection, Quad};
    use serde_json::json;
    use std::path::PathBuf;
    use std::time::Duration;

    fn detection(y: f64, x: f64, text: &str, confidence: f64) -> Detection {
        Detection::new(Quad::from_rect(x, y - 5.0, x + 40.0, y + 5.0), text, confidence)
    }

    fn images(count: usize) -> Vec<PageImage> {
        (0..count)
            .map(|i| PageImage::new(i, format!("page_{:03}.png", i + 1)))
            .collect()
    }

    #[test]
    fn test_process_detections() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let detections = PageDetections::Positioned(vec![
            detection(10.0, 0.0, "Hello", 0.95),
            detection(12.0, 60.0, "World", 0.9),
            detection(50.0, 0.0, "1.", 0.9),
            detection(52.0, 30.0, "Item", 0.9),
        ]);

        let page = processor.process_detections(0, &detections);
        assert_eq!(page.lines, vec!["Hello World", "1. Item"]);
    }

    #[test]
    fn test_particle_repair_in_page() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let detections = PageDetections::Positioned(vec![
            detection(10.0, 0.0, "계약서", 0.9),
            detection(11.0, 80.0, "를", 0.9),
            detection(12.0, 100.0, "검토하였습니다 .", 0.9),
        ]);

        let page = processor.process_detections(0, &detections);
        assert_eq!(page.lines, vec!["계약서를 검토하였습니다."]);
    }

    #[test]
    fn test_page_failure_is_contained() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let engine = |image: &PageImage| -> Result<RawOcrOutput> {
            match image.page_idx {
                1 => Err(Error::Ocr("engine crashed".into())),
                i => Ok(json!({ "rec_texts": [format!("page {} content here", i + 1)] })),
            }
        };

        let document = processor.process_pages(&engine, &images(3)).unwrap();
        assert_eq!(document.text(), "page 1 content here\n\npage 3 content here");
        assert_eq!(document.failed_pages.len(), 1);
        assert_eq!(document.failed_pages[0].index, 1);
        assert_eq!(document.page_count(), 3);
    }

    #[test]
    fn test_all_pages_failed_is_empty_document() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let engine =
            |_: &PageImage| -> Result<RawOcrOutput> { Err(Error::Ocr("no model".into())) };

        let result = processor.process_pages(&engine, &images(2));
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_blank_pages_are_empty_document() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let engine = |_: &PageImage| -> Result<RawOcrOutput> { Ok(RawOcrOutput::Null) };

        let result = processor.process_pages(&engine, &images(2));
        assert!(matches!(result, Err(Error::EmptyDocument)));
    }

    #[test]
    fn test_timeout_aborts_remaining_pages() {
        let options = ProcessOptions::default().with_document_timeout(Duration::from_millis(10));
        let processor = DocumentProcessor::new(options).unwrap();
        let engine = |_: &PageImage| -> Result<RawOcrOutput> {
            std::thread::sleep(Duration::from_millis(30));
            Ok(json!({ "rec_texts": ["slow page text"] }))
        };

        let result = processor.process_pages(&engine, &images(3));
        assert!(matches!(result, Err(Error::Timeout { .. })));
    }

    #[test]
    fn test_invalid_options_rejected() {
        let options = ProcessOptions::default().with_dpi(0);
        assert!(matches!(
            DocumentProcessor::new(options),
            Err(Error::InvalidConfig(_))
        ));
    }

    /// Writes an empty image per page and remembers where it put it.
    #[derive(Default)]
    struct RecordingRasterizer {
        rendered: std::sync::Mutex<Vec<PathBuf>>,
    }

    impl Rasterizer for RecordingRasterizer {
        fn page_count(&self, _pdf: &Path) -> Result<usize> {
            Ok(2)
        }

        fn render_page(&self, _: &Path, page_idx: usize, out_dir: &Path) -> Result<PageImage> {
            let path = out_dir.join(format!("page_{page_idx}.png"));
            std::fs::write(&path, b"png")?;
            self.rendered.lock().unwrap().push(path.clone());
            Ok(PageImage::new(page_idx, path))
        }
    }

    #[test]
    fn test_rendered_images_removed() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let rasterizer = RecordingRasterizer::default();
        let engine = |image: &PageImage| -> Result<RawOcrOutput> {
            assert!(image.path.exists());
            Ok(json!({ "rec_texts": ["이미지 페이지 본문입니다."] }))
        };

        let document = processor
            .process_pdf(&engine, &rasterizer, Path::new("scan.pdf"))
            .unwrap();
        assert_eq!(document.pages.len(), 2);

        let rendered = rasterizer.rendered.lock().unwrap();
        assert_eq!(rendered.len(), 2);
        assert!(rendered.iter().all(|path| !path.exists()));
    }

    struct FailingRasterizer;

    impl Rasterizer for FailingRasterizer {
        fn page_count(&self, _pdf: &Path) -> Result<usize> {
            Err(Error::Rasterize("not a PDF".into()))
        }

        fn render_page(&self, _: &Path, _: usize, _: &Path) -> Result<PageImage> {
            unreachable!("page_count fails first")
        }
    }

    #[test]
    fn test_rasterize_failure_is_document_level() {
        let processor = DocumentProcessor::with_defaults().unwrap();
        let engine = |_: &PageImage| -> Result<RawOcrOutput> { Ok(RawOcrOutput::Null) };

        let result = processor.process_pdf(&engine, &FailingRasterizer, &PathBuf::from("x.pdf"));
        assert!(matches!(result, Err(Error::Rasterize(_))));
    }
}
