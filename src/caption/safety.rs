//! Word-list caption masking.
//!
//! Matching is literal substring matching only: a listed word is masked wherever it appears,
//! including inside longer words. Overlapping entries are masked in list order.

use regex::{Regex, RegexBuilder};

use crate::caption::model::CaptionRecord;
use crate::foundation::error::{MemeError, MemeResult};

/// Character used to mask a matched word.
pub const MASK_CHAR: char = '*';

const BAD_WORDS_EN: &[&str] = &["badword1", "badword2"];
const BAD_WORDS_JA: &[&str] = &["悪い言葉1", "悪い言葉2"];

struct MaskRule {
    pattern: Regex,
    mask: String,
}

/// Replaces listed words with an equal-length run of [`MASK_CHAR`].
pub struct SafetyFilter {
    rules: Vec<MaskRule>,
}

impl std::fmt::Debug for SafetyFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SafetyFilter")
            .field("rules", &self.rules.len())
            .finish()
    }
}

impl Default for SafetyFilter {
    fn default() -> Self {
        // The built-in lists are plain literals and always compile.
        Self::with_lists(BAD_WORDS_EN, BAD_WORDS_JA).unwrap_or(Self { rules: Vec::new() })
    }
}

impl SafetyFilter {
    /// Build a filter from a case-insensitive list and a case-sensitive list.
    ///
    /// Empty entries are ignored.
    pub fn with_lists<S: AsRef<str>>(
        case_insensitive: &[S],
        case_sensitive: &[S],
    ) -> MemeResult<Self> {
        let mut rules = Vec::with_capacity(case_insensitive.len() + case_sensitive.len());
        let lists = [(case_insensitive, true), (case_sensitive, false)];
        for (words, fold_case) in lists {
            for word in words.iter().map(AsRef::as_ref).filter(|w| !w.is_empty()) {
                let pattern = RegexBuilder::new(&regex::escape(word))
                    .case_insensitive(fold_case)
                    .build()
                    .map_err(|e| {
                        MemeError::validation(format!("invalid safety word '{word}': {e}"))
                    })?;
                rules.push(MaskRule {
                    pattern,
                    mask: MASK_CHAR.to_string().repeat(word.chars().count()),
                });
            }
        }
        Ok(Self { rules })
    }

    /// Mask every listed word in `text`.
    pub fn sanitize(&self, text: &str) -> String {
        let mut out = text.to_string();
        for rule in &self.rules {
            if rule.pattern.is_match(&out) {
                out = rule
                    .pattern
                    .replace_all(&out, regex::NoExpand(&rule.mask))
                    .into_owned();
            }
        }
        out
    }

    /// Sanitize the three text fields of a caption; style is kept as-is.
    pub fn sanitize_record(&self, record: &CaptionRecord) -> CaptionRecord {
        CaptionRecord {
            style: record.style,
            top: self.sanitize(&record.top),
            bottom: self.sanitize(&record.bottom),
            alt_text: self.sanitize(&record.alt_text),
        }
    }

    /// Sanitize each caption in order.
    pub fn sanitize_all(&self, records: &[CaptionRecord]) -> Vec<CaptionRecord> {
        records.iter().map(|r| self.sanitize_record(r)).collect()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/caption/safety.rs"]
mod tests;
