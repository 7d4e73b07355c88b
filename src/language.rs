//! Language profiles for particle repair and structural classification.
//!
//! A profile is plain data: the closed sets of strings and character classes
//! that the normalizer and the remerger compile into patterns. The Korean
//! profile carries the sets used for Korean scanned documents; the generic
//! profile disables every language-specific rule.

use serde::{Deserialize, Serialize};

/// Korean particles and case markers, in the order they are repaired.
const KOREAN_PARTICLES: &[&str] = &[
    "이", "가", "을", "를", "에", "의", "와", "과", "로", "으로", "부터", "까지", "에서", "에게",
    "한테", "께", "라", "아", "야",
];

/// Endings after which a Korean line is considered a finished sentence.
const KOREAN_SENTENCE_ENDINGS: &[&str] = &[".", "!", "?", "다", "음", "임", "요", "니다", "습니다"];

const GENERIC_SENTENCE_ENDINGS: &[&str] = &[".", "!", "?"];

/// Language-specific closed sets used by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageProfile {
    /// Language code this profile was built for.
    pub code: String,

    /// Particles whose spurious leading space is removed, applied in order.
    pub particles: Vec<String>,

    /// Line endings that mark a complete sentence.
    pub sentence_endings: Vec<String>,

    /// Regex character-class body for one syllable of the script
    /// (e.g. `가-힣`). Drives particle repair and `가)` style enumerators.
    pub syllable_class: Option<String>,

    /// Word that prefixes numbered chapters and articles (e.g. `제` in `제1장`).
    pub chapter_marker: Option<String>,
}

impl Default for LanguageProfile {
    fn default() -> Self {
        Self::korean()
    }
}

impl LanguageProfile {
    /// Profile for Korean documents.
    pub fn korean() -> Self {
        Self {
            code: "korean".to_string(),
            particles: to_strings(KOREAN_PARTICLES),
            sentence_endings: to_strings(KOREAN_SENTENCE_ENDINGS),
            syllable_class: Some("가-힣".to_string()),
            chapter_marker: Some("제".to_string()),
        }
    }

    /// Profile without any language-specific rules.
    pub fn generic(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            particles: Vec::new(),
            sentence_endings: to_strings(GENERIC_SENTENCE_ENDINGS),
            syllable_class: None,
            chapter_marker: None,
        }
    }

    /// Resolves a language code to a profile.
    ///
    /// `korean`, `ko` and `kor` select the Korean profile; every other code
    /// gets the generic profile.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_ascii_lowercase().as_str() {
            "korean" | "ko" | "kor" | "kor+eng" => Self::korean(),
            "en" | "eng" | "english" | "latin" => Self::generic(code.trim()),
            other => {
                log::warn!("No language profile for '{other}', using generic rules");
                Self::generic(code.trim())
            }
        }
    }

    /// Replaces the particle set.
    pub fn with_particles<I, S>(mut self, particles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.particles = particles.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the sentence-terminal endings.
    pub fn with_sentence_endings<I, S>(mut self, endings: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sentence_endings = endings.into_iter().map(Into::into).collect();
        self
    }

    /// Returns true if the line ends with one of the sentence-terminal endings.
    pub fn ends_sentence(&self, line: &str) -> bool {
        self.sentence_endings
            .iter()
            .any(|ending| line.ends_with(ending.as_str()))
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
