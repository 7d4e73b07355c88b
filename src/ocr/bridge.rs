//! Process bridge to an external OCR engine.
//!
//! The bridge runs a program once per page:
//!
//! ```text
//! <program> [args...] --image <page.png> --lang <code>
//! ```
//!
//! and expects the engine's per-page result as JSON on stdout. Empty stdout is
//! read as "nothing recognized". The program is not part of this crate; any
//! wrapper around an OCR engine that follows this contract will do.

use crate::error::{Error, Result};
use crate::ingest::RawOcrOutput;
use crate::ocr::{OcrEngine, PageImage};
use std::ffi::OsString;
use std::process::Command;

/// OCR engine running as an external command.
#[derive(Debug, Clone)]
pub struct CommandOcrEngine {
    program: OsString,
    args: Vec<OsString>,
    lang: String,
}

impl CommandOcrEngine {
    /// Creates a bridge invoking `program`.
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            lang: "korean".to_string(),
        }
    }

    /// Appends a fixed argument placed before `--image`.
    pub fn with_arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Sets the language code passed to the engine.
    pub fn with_lang(mut self, lang: impl Into<String>) -> Self {
        self.lang = lang.into();
        self
    }

    /// Language code passed to the engine.
    pub fn lang(&self) -> &str {
        &self.lang
    }

    fn command(&self, image: &PageImage) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .arg("--image")
            .arg(&image.path)
            .arg("--lang")
            .arg(&self.lang);
        command
    }
}

impl OcrEngine for CommandOcrEngine {
    fn recognize(&self, image: &PageImage) -> Result<RawOcrOutput> {
        let tool = self.program.to_string_lossy().into_owned();
        log::debug!("Running {} on {}", tool, image.path.display());

        let output = self
            .command(image)
            .output()
            .map_err(|e| Error::Ocr(format!("failed to invoke {tool}: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalTool {
                tool,
                message: format!("{} ({})", stderr.trim(), output.status),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            return Ok(RawOcrOutput::Null);
        }

        Ok(serde_json::from_str(&stdout)?)
    }
}
