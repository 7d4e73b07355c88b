//! # Text Normalizer
//!
//! Per-line cleanup of joined OCR lines.
//!
//! ## Stages
//!
//! 1. **Whitespace** - Unicode NFC composition, trim, collapse whitespace runs
//! 2. **Particles** - Rejoin particles split off the preceding word (`학교 에서` → `학교에서`)
//! 3. **Punctuation** - Drop whitespace before `. , ! ? ; :`
//! 4. **Parentheses** - Drop whitespace just inside `(` and `)`
//!
//! Empty lines are page-break markers and pass through untouched.

use crate::error::{Error, Result};
use crate::language::LanguageProfile;
use crate::options::NormalizeOptions;
use regex::{Captures, Regex};
use std::borrow::Cow;
use std::sync::LazyLock;
use unicode_normalization::UnicodeNormalization;

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static RE_SPACE_BEFORE_PUNCT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+([.,!?;:])").unwrap());

static RE_SPACE_AFTER_OPEN_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(\s+").unwrap());

static RE_SPACE_BEFORE_CLOSE_PAREN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+\)").unwrap());

/// A particle and the pattern that finds it split from its word.
#[derive(Debug, Clone)]
struct ParticleRule {
    particle: String,
    pattern: Regex,
}

/// Line normalizer with the profile's particle patterns compiled once.
#[derive(Debug, Clone)]
pub struct Normalizer {
    rules: Vec<ParticleRule>,
    unicode_nfc: bool,
}

impl Normalizer {
    /// Compiles the particle patterns of the configured language profile.
    pub fn new(options: &NormalizeOptions) -> Result<Self> {
        Ok(Self {
            rules: compile_particle_rules(&options.profile)?,
            unicode_nfc: options.unicode_nfc,
        })
    }

    /// Normalizer for the default (Korean) profile.
    pub fn with_defaults() -> Result<Self> {
        Self::new(&NormalizeOptions::default())
    }

    /// Normalizes every line; empty lines are kept as separators.
    pub fn normalize_lines(&self, lines: &[String]) -> Vec<String> {
        lines.iter().map(|line| self.normalize_line(line)).collect()
    }

    /// Runs all stages on one line.
    pub fn normalize_line(&self, line: &str) -> String {
        if line.is_empty() {
            return String::new();
        }

        let composed: Cow<str> = if self.unicode_nfc {
            Cow::Owned(line.nfc().collect())
        } else {
            Cow::Borrowed(line)
        };

        let mut result = stage1_collapse_whitespace(&composed);
        result = self.stage2_repair_particles(result);
        result = stage3_remove_space_before_punctuation(&result);
        stage4_tighten_parentheses(&result)
    }

    /// Stage 2: Rejoins particles separated from the preceding syllable.
    ///
    /// Each rule runs until it no longer matches, so overlapping runs like
    /// `한 이 이` are fully repaired in one pass.
    pub fn stage2_repair_particles(&self, mut line: String) -> String {
        for rule in &self.rules {
            loop {
                let next = match rule
                    .pattern
                    .replace_all(&line, |caps: &Captures| format!("{}{}", &caps[1], rule.particle))
                {
                    Cow::Borrowed(_) => break,
                    Cow::Owned(next) => next,
                };
                line = next;
            }
        }
        line
    }
}

fn compile_particle_rules(profile: &LanguageProfile) -> Result<Vec<ParticleRule>> {
    let class = profile.syllable_class.as_deref().unwrap_or(r"\w");

    profile
        .particles
        .iter()
        .filter(|p| !p.is_empty())
        .map(|particle| {
            let source = format!(r"([{}])\s+{}\b", class, regex::escape(particle));
            let pattern = Regex::new(&source).map_err(|e| {
                Error::InvalidConfig(format!("invalid particle pattern '{source}': {e}"))
            })?;
            Ok(ParticleRule {
                particle: particle.clone(),
                pattern,
            })
        })
        .collect()
}

/// Stage 1: Trims the line and collapses whitespace runs to one space.
pub fn stage1_collapse_whitespace(line: &str) -> String {
    RE_WHITESPACE.replace_all(line.trim(), " ").into_owned()
}

/// Stage 3: Removes whitespace preceding sentence punctuation.
pub fn stage3_remove_space_before_punctuation(line: &str) -> String {
    RE_SPACE_BEFORE_PUNCT.replace_all(line, "$1").into_owned()
}

/// Stage 4: Removes whitespace just inside parentheses.
pub fn stage4_tighten_parentheses(line: &str) -> String {
    let opened = RE_SPACE_AFTER_OPEN_PAREN.replace_all(line, "(");
    RE_SPACE_BEFORE_CLOSE_PAREN
        .replace_all(&opened, ")")
        .into_owned()
}

/// Normalizes lines with the given options.
///
/// # Example
///
/// ```
/// use unocr::normalize::normalize_lines;
/// use unocr::NormalizeOptions;
///
/// let lines = vec!["학교 에서  공부 를 했다 .".to_string()];
/// let cleaned = normalize_lines(&lines, &NormalizeOptions::default())?;
/// assert_eq!(cleaned, vec!["학교에서 공부를 했다."]);
/// # Ok::<(), unocr::Error>(())
/// ```
pub fn normalize_lines(lines: &[String], options: &NormalizeOptions) -> Result<Vec<String>> {
    Ok(Normalizer::new(options)?.normalize_lines(lines))
}
