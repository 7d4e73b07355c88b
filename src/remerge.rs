//! Structural re-merging of over-segmented lines.
//!
//! OCR often splits one sentence over several short detections that end up on
//! separate lines. This module rejoins a short, unfinished line with the line
//! after it, while leaving structural lines alone:
//!
//! - numbered items (`1. 서론`)
//! - bullets (`•`, `-`, `*`)
//! - syllabic enumerators (`가) 항목`)
//! - chapter and article markers (`제1장`, `제 3 조`)
//! - Roman numerals (`IV. 결론`)
//! - short all-uppercase titles (`ABSTRACT`)
//!
//! The pass is greedy and never revisits a merged line.

use crate::error::{Error, Result};
use crate::language::LanguageProfile;
use crate::options::RemergeOptions;
use regex::Regex;
use std::sync::LazyLock;

static RE_NUMBERED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+\.").unwrap());

static RE_BULLET: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[•\-\*]").unwrap());

static RE_ROMAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[IVX]+\.").unwrap());

/// Structural classification of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Heading, list item or title; never merged.
    TitleOrList,
    /// Ordinary body text.
    Body,
}

/// Line re-merger with the profile's patterns compiled once.
#[derive(Debug, Clone)]
pub struct Remerger {
    enumerator: Option<Regex>,
    chapter: Option<Regex>,
    profile: LanguageProfile,
    min_length: usize,
    max_title_length: usize,
}

impl Remerger {
    /// Compiles the language-specific patterns.
    pub fn new(options: &RemergeOptions) -> Result<Self> {
        let profile = &options.profile;

        let enumerator = profile
            .syllable_class
            .as_deref()
            .map(|class| compile(&format!(r"^[{class}]\)")))
            .transpose()?;

        let chapter = profile
            .chapter_marker
            .as_deref()
            .filter(|marker| !marker.is_empty())
            .map(|marker| compile(&format!(r"^{}\s*\d+", regex::escape(marker))))
            .transpose()?;

        Ok(Self {
            enumerator,
            chapter,
            profile: profile.clone(),
            min_length: options.min_length,
            max_title_length: options.max_title_length,
        })
    }

    /// Re-merger for the default (Korean) profile.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&RemergeOptions::default())
    }

    /// Classifies a line as structural or body text.
    pub fn classify(&self, line: &str) -> LineKind {
        let structural = RE_NUMBERED.is_match(line)
            || RE_BULLET.is_match(line)
            || self.enumerator.as_ref().is_some_and(|re| re.is_match(line))
            || self.chapter.as_ref().is_some_and(|re| re.is_match(line))
            || RE_ROMAN.is_match(line)
            || (line.chars().count() < self.max_title_length && is_upper(line));

        if structural {
            LineKind::TitleOrList
        } else {
            LineKind::Body
        }
    }

    /// Returns true if the line is a heading, list item or title.
    pub fn is_title_or_list(&self, line: &str) -> bool {
        self.classify(line) == LineKind::TitleOrList
    }

    /// Returns true if a body line is short and unfinished, so it may absorb
    /// the following line.
    fn is_merge_candidate(&self, line: &str) -> bool {
        line.chars().count() < self.min_length && !self.profile.ends_sentence(line)
    }

    /// Merges short unfinished lines with their successor in one left-to-right pass.
    pub fn remerge(&self, lines: &[String]) -> Vec<String> {
        let mut merged = Vec::with_capacity(lines.len());
        let mut i = 0;

        while i < lines.len() {
            let current = lines[i].trim();
            if current.is_empty() {
                i += 1;
                continue;
            }

            if self.is_title_or_list(current) {
                merged.push(current.to_string());
                i += 1;
                continue;
            }

            if self.is_merge_candidate(current) && i + 1 < lines.len() {
                let next = lines[i + 1].trim();
                if !next.is_empty() && !self.is_title_or_list(next) {
                    merged.push(format!("{current} {next}"));
                    i += 2;
                    continue;
                }
            }

            merged.push(current.to_string());
            i += 1;
        }

        merged
    }
}

/// Re-merges lines with the given options.
pub fn remerge_lines(lines: &[String], options: &RemergeOptions) -> Result<Vec<String>> {
    Ok(Remerger::new(options)?.remerge(lines))
}

fn compile(source: &str) -> Result<Regex> {
    Regex::new(source)
        .map_err(|e| Error::InvalidConfig(format!("invalid structural pattern '{source}': {e}")))
}

/// True if the text has at least one cased character and none in lowercase.
fn is_upper(text: &str) -> bool {
    text.chars().any(char::is_uppercase) && !text.chars().any(char::is_lowercase)
}
