//! PDF rasterization through poppler-utils.
//!
//! `pdfinfo` reports the page count and `pdftoppm` renders one page at a time
//! to PNG, so a failure on one page leaves the others unaffected.

use crate::error::{Error, Result};
use crate::ocr::PageImage;
use crate::options::ProcessOptions;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Converts document pages into images for OCR.
pub trait Rasterizer: Send + Sync {
    /// Returns the number of pages in the document.
    fn page_count(&self, pdf: &Path) -> Result<usize>;

    /// Renders page `page_idx` (zero-based) into `out_dir`.
    fn render_page(&self, pdf: &Path, page_idx: usize, out_dir: &Path) -> Result<PageImage>;
}

/// Rasterizer backed by the `pdfinfo` and `pdftoppm` commands.
#[derive(Debug, Clone)]
pub struct PopplerRasterizer {
    dpi: u32,
}

impl Default for PopplerRasterizer {
    fn default() -> Self {
        Self::new(300)
    }
}

impl PopplerRasterizer {
    /// Creates a rasterizer rendering at `dpi`.
    pub fn new(dpi: u32) -> Self {
        Self { dpi }
    }

    /// Creates a rasterizer rendering at the configured `dpi`.
    pub fn from_options(options: &ProcessOptions) -> Self {
        Self::new(options.dpi)
    }

    /// Rendering resolution.
    pub fn dpi(&self) -> u32 {
        self.dpi
    }

    fn render_command(&self, pdf: &Path, page_idx: usize, prefix: &Path) -> Command {
        // pdftoppm pages are 1-based
        let page_number = (page_idx + 1).to_string();
        let mut command = Command::new("pdftoppm");
        command
            .arg("-png")
            .arg("-r")
            .arg(self.dpi.to_string())
            .arg("-f")
            .arg(&page_number)
            .arg("-l")
            .arg(&page_number)
            .arg("-singlefile")
            .arg(pdf)
            .arg(prefix);
        command
    }
}

impl Rasterizer for PopplerRasterizer {
    fn page_count(&self, pdf: &Path) -> Result<usize> {
        let output = run("pdfinfo", Command::new("pdfinfo").arg(pdf))?;
        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_page_count(&stdout).ok_or_else(|| {
            Error::Rasterize(format!("no page count reported for {}", pdf.display()))
        })
    }

    fn render_page(&self, pdf: &Path, page_idx: usize, out_dir: &Path) -> Result<PageImage> {
        std::fs::create_dir_all(out_dir)?;

        let prefix = out_dir.join(format!("page_{:03}", page_idx + 1));
        run("pdftoppm", &mut self.render_command(pdf, page_idx, &prefix))?;

        let path = with_png_extension(&prefix);
        if !path.exists() {
            return Err(Error::Rasterize(format!(
                "expected rendered image not found: {}",
                path.display()
            )));
        }

        log::debug!("Rendered page {} of {}", page_idx + 1, pdf.display());
        Ok(PageImage::new(page_idx, path))
    }
}

fn run(tool: &str, command: &mut Command) -> Result<Output> {
    let output = command.output().map_err(|e| {
        Error::Rasterize(format!(
            "failed to invoke {tool}; is poppler-utils installed? ({e})"
        ))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::ExternalTool {
            tool: tool.to_string(),
            message: format!("{} ({})", stderr.trim(), output.status),
        });
    }
    Ok(output)
}

fn with_png_extension(prefix: &Path) -> PathBuf {
    let mut path = prefix.as_os_str().to_owned();
    path.push(".png");
    PathBuf::from(path)
}

/// Extracts the `Pages:` field from `pdfinfo` output.
fn parse_page_count(info: &str) -> Option<usize> {
    info.lines()
        .find_map(|line| line.strip_prefix("Pages:"))
        .and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_count() {
        let info = "Title:          report\nProducer:       scanner\nPages:          12\nEncrypted:      no\n";
        assert_eq!(parse_page_count(info), Some(12));
        assert_eq!(parse_page_count("Title: x\n"), None);
        assert_eq!(parse_page_count("Pages: many\n"), None);
    }

    #[test]
    fn test_render_command() {
        let rasterizer = PopplerRasterizer::new(150);
        let command = rasterizer.render_command(Path::new("in.pdf"), 2, Path::new("out/page_003"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(
            args,
            vec![
                "-png",
                "-r",
                "150",
                "-f",
                "3",
                "-l",
                "3",
                "-singlefile",
                "in.pdf",
                "out/page_003"
            ]
        );
    }

    #[test]
    fn test_configured_dpi_reaches_command() {
        let options = ProcessOptions::default().with_dpi(150);
        let rasterizer = PopplerRasterizer::from_options(&options);
        assert_eq!(rasterizer.dpi(), 150);

        let command = rasterizer.render_command(Path::new("in.pdf"), 0, Path::new("page_001"));
        let args: Vec<_> = command.get_args().collect();
        assert_eq!(args[1..3], ["-r", "150"]);
    }

    #[test]
    fn test_png_path() {
        assert_eq!(
            with_png_extension(Path::new("tmp/page_001")),
            PathBuf::from("tmp/page_001.png")
        );
    }
}
