//! Options for layout reconstruction and batch processing.

use crate::error::{Error, Result};
use crate::language::LanguageProfile;
use std::path::PathBuf;
use std::time::Duration;

/// Options for grouping detections into lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutOptions {
    /// Maximum vertical distance (px) from a line's anchor for a fragment to join it.
    pub y_thresh: f64,

    /// Horizontal gap threshold (px). Reserved for intra-line gap detection;
    /// not used when grouping.
    pub x_thresh: f64,

    /// Detections below this confidence are dropped. The bound is inclusive.
    pub min_confidence: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            y_thresh: 20.0,
            x_thresh: 10.0,
            min_confidence: 0.7,
        }
    }
}

impl LayoutOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the vertical grouping threshold.
    pub fn with_y_thresh(mut self, y_thresh: f64) -> Self {
        self.y_thresh = y_thresh;
        self
    }

    /// Sets the horizontal gap threshold.
    pub fn with_x_thresh(mut self, x_thresh: f64) -> Self {
        self.x_thresh = x_thresh;
        self
    }

    /// Sets the minimum detection confidence.
    pub fn with_min_confidence(mut self, min_confidence: f64) -> Self {
        self.min_confidence = min_confidence;
        self
    }
}

/// Options for per-line text cleanup.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizeOptions {
    /// Language rules for particle repair.
    pub profile: LanguageProfile,

    /// Compose decomposed characters (Unicode NFC) before cleanup.
    pub unicode_nfc: bool,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            profile: LanguageProfile::korean(),
            unicode_nfc: true,
        }
    }
}

impl NormalizeOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language profile.
    pub fn with_profile(mut self, profile: LanguageProfile) -> Self {
        self.profile = profile;
        self
    }

    /// Disables NFC composition.
    pub fn without_nfc(mut self) -> Self {
        self.unicode_nfc = false;
        self
    }
}

/// Options for re-merging over-segmented lines.
#[derive(Debug, Clone, PartialEq)]
pub struct RemergeOptions {
    /// Body lines shorter than this (in characters) are merge candidates.
    pub min_length: usize,

    /// All-uppercase lines shorter than this are treated as titles.
    pub max_title_length: usize,

    /// Language rules for enumerators, chapter markers and sentence endings.
    pub profile: LanguageProfile,
}

impl Default for RemergeOptions {
    fn default() -> Self {
        Self {
            min_length: 10,
            max_title_length: 20,
            profile: LanguageProfile::korean(),
        }
    }
}

impl RemergeOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the minimum length below which lines are merge candidates.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.min_length = min_length;
        self
    }

    /// Sets the language profile.
    pub fn with_profile(mut self, profile: LanguageProfile) -> Self {
        self.profile = profile;
        self
    }
}

/// Options for processing a whole document.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOptions {
    /// Line grouping options.
    pub layout: LayoutOptions,

    /// Text cleanup options.
    pub normalize: NormalizeOptions,

    /// Line re-merging options.
    pub remerge: RemergeOptions,

    /// Rasterization resolution, read by [`crate::PopplerRasterizer::from_options`].
    pub dpi: u32,

    /// Language code passed to the OCR engine.
    pub ocr_language: String,

    /// Abort a document when it takes longer than this.
    pub document_timeout: Option<Duration>,

    /// Process documents of a batch in parallel.
    pub parallel: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            layout: LayoutOptions::default(),
            normalize: NormalizeOptions::default(),
            remerge: RemergeOptions::default(),
            dpi: 300,
            ocr_language: "korean".to_string(),
            document_timeout: None,
            parallel: false,
        }
    }
}

impl ProcessOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the language for both the OCR engine and the text rules.
    pub fn with_language(mut self, code: &str) -> Self {
        let profile = LanguageProfile::from_code(code);
        self.ocr_language = code.to_string();
        self.normalize.profile = profile.clone();
        self.remerge.profile = profile;
        self
    }

    /// Sets the language profile used by the text rules only.
    pub fn with_profile(mut self, profile: LanguageProfile) -> Self {
        self.normalize.profile = profile.clone();
        self.remerge.profile = profile;
        self
    }

    /// Sets the layout options.
    pub fn with_layout(mut self, layout: LayoutOptions) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the minimum line length for re-merging.
    pub fn with_min_length(mut self, min_length: usize) -> Self {
        self.remerge.min_length = min_length;
        self
    }

    /// Sets the rasterization DPI.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Sets the per-document time limit.
    pub fn with_document_timeout(mut self, timeout: Duration) -> Self {
        self.document_timeout = Some(timeout);
        self
    }

    /// Enables parallel document processing.
    pub fn parallel(mut self) -> Self {
        self.parallel = true;
        self
    }

    /// Disables parallel processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Checks option values for consistency.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.layout.min_confidence) {
            return Err(Error::InvalidConfig(format!(
                "confidence threshold must be within [0, 1], got {}",
                self.layout.min_confidence
            )));
        }
        if !self.layout.y_thresh.is_finite() || self.layout.y_thresh < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "y_thresh must be a non-negative number, got {}",
                self.layout.y_thresh
            )));
        }
        if !self.layout.x_thresh.is_finite() || self.layout.x_thresh < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "x_thresh must be a non-negative number, got {}",
                self.layout.x_thresh
            )));
        }
        if self.dpi == 0 {
            return Err(Error::InvalidConfig("dpi must be positive".into()));
        }
        Ok(())
    }
}

/// Input and output locations for a batch run.
#[derive(Debug, Clone)]
pub struct BatchConfig {
    /// Directory scanned for PDF files.
    pub input_dir: PathBuf,

    /// Directory receiving one `.txt` file per document.
    pub output_dir: PathBuf,

    /// Processing options shared by every document.
    pub options: ProcessOptions,
}

impl BatchConfig {
    /// Creates a batch configuration with default processing options.
    pub fn new(input_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            input_dir: input_dir.into(),
            output_dir: output_dir.into(),
            options: ProcessOptions::default(),
        }
    }

    /// Sets the processing options.
    pub fn with_options(mut self, options: ProcessOptions) -> Self {
        self.options = options;
        self
    }
}
