//! Corruption detection: score how trustworthy a page's extracted text is.
//!
//! ## Why score instead of a boolean?
//!
//! Garbled text extraction is a spectrum — a stray symbol or two is normal,
//! a page of `(cid:241)` placeholders is useless. Three independent signals
//! are combined into one score in [0, 1]:
//!
//! 1. suspicious-character ratio: replacement characters, control characters
//!    outside whitespace, and `(cid:NNN)` unmapped-glyph placeholders;
//! 2. whether the backend itself emitted decode warnings for the page;
//! 3. the fraction of words containing no alphanumeric character.
//!
//! The score is monotonically non-decreasing in each signal, and the verdict
//! flips to `Corrupted` above a configured threshold. The weights are policy,
//! not contract — tuned so that a predominantly garbled page is flagged while
//! a handful of stray symbols is not.
//!
//! This never fails: a page the backend could not extract at all maps to a
//! saturated score with reason [`CorruptionSignal::ExtractionFailed`], and a
//! legitimately blank page (no spans, no tables) is `Clean`.

use crate::backend::RawPageArtifacts;
use crate::config::ExtractorConfig;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Weight of the suspicious-character ratio in the combined score.
pub const WEIGHT_SUSPICIOUS_CHARS: f64 = 0.5;
/// Weight of the backend-warning signal.
pub const WEIGHT_BACKEND_WARNINGS: f64 = 0.3;
/// Weight of the junk-word ratio.
pub const WEIGHT_JUNK_WORDS: f64 = 0.2;

/// Backend decode warnings at or above this count flip the warning signal.
const WARNING_COUNT_CUTOFF: u32 = 3;

/// Per-signal cutoff for listing a signal in the `reasons` set.
const SIGNAL_REASON_CUTOFF: f64 = 0.1;

static RE_CID_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    // pdfminer-style marker for a glyph with no Unicode mapping.
    Regex::new(r"\(cid:\d+\)").unwrap()
});

/// Named signal that contributed to a corruption verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorruptionSignal {
    /// Replacement/control/placeholder character ratio exceeded.
    SuspiciousChars,
    /// The backend emitted decode warnings while extracting the page.
    BackendWarnings,
    /// Too many extracted "words" contain no alphanumeric character.
    NonAlphanumericWords,
    /// Spans exist but contain no usable characters at all.
    NoUsableText,
    /// The backend failed outright for this page.
    ExtractionFailed,
}

/// Trustworthiness verdict for one page's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Clean,
    Corrupted,
}

/// Per-page corruption assessment. Computed once, immutable afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorruptionAssessment {
    /// Combined score in [0, 1].
    pub score: f64,
    pub verdict: Verdict,
    pub reasons: BTreeSet<CorruptionSignal>,
}

impl CorruptionAssessment {
    pub fn is_corrupted(&self) -> bool {
        self.verdict == Verdict::Corrupted
    }

    /// The assessment for a page the backend failed to extract: maximal
    /// corruption, never a fatal error for the request.
    pub fn extraction_failed() -> Self {
        let mut reasons = BTreeSet::new();
        reasons.insert(CorruptionSignal::ExtractionFailed);
        Self {
            score: 1.0,
            verdict: Verdict::Corrupted,
            reasons,
        }
    }
}

/// Assess one page's extracted text against the configured threshold.
///
/// Pure function of the page's artifacts and the config; table cell content
/// is included in the scan so a page whose only text lives in garbled tables
/// is still caught.
pub fn assess(artifacts: &RawPageArtifacts, config: &ExtractorConfig) -> CorruptionAssessment {
    let text = concat_page_text(artifacts);

    // Legitimately blank page: nothing extracted, no warnings.
    if text.trim().is_empty() {
        if artifacts.decode_warnings >= WARNING_COUNT_CUTOFF {
            // The backend choked on content it then failed to deliver.
            let mut reasons = BTreeSet::new();
            reasons.insert(CorruptionSignal::BackendWarnings);
            reasons.insert(CorruptionSignal::NoUsableText);
            return CorruptionAssessment {
                score: 1.0,
                verdict: Verdict::Corrupted,
                reasons,
            };
        }
        if artifacts.spans.iter().any(|s| !s.text.is_empty()) {
            // Spans exist but hold only whitespace/empties: no usable text.
            let mut reasons = BTreeSet::new();
            reasons.insert(CorruptionSignal::NoUsableText);
            return CorruptionAssessment {
                score: 1.0,
                verdict: Verdict::Corrupted,
                reasons,
            };
        }
        return CorruptionAssessment {
            score: 0.0,
            verdict: Verdict::Clean,
            reasons: BTreeSet::new(),
        };
    }

    let char_ratio = suspicious_char_ratio(&text);
    let warned = artifacts.decode_warnings >= WARNING_COUNT_CUTOFF;
    let junk_ratio = junk_word_ratio(&text);

    let score = (WEIGHT_SUSPICIOUS_CHARS * char_ratio
        + WEIGHT_BACKEND_WARNINGS * if warned { 1.0 } else { 0.0 }
        + WEIGHT_JUNK_WORDS * junk_ratio)
        .clamp(0.0, 1.0);

    let mut reasons = BTreeSet::new();
    if char_ratio > SIGNAL_REASON_CUTOFF {
        reasons.insert(CorruptionSignal::SuspiciousChars);
    }
    if warned {
        reasons.insert(CorruptionSignal::BackendWarnings);
    }
    if junk_ratio > SIGNAL_REASON_CUTOFF {
        reasons.insert(CorruptionSignal::NonAlphanumericWords);
    }

    let verdict = if score > config.corruption_threshold {
        Verdict::Corrupted
    } else {
        Verdict::Clean
    };

    CorruptionAssessment {
        score,
        verdict,
        reasons,
    }
}

/// All of the page's text: spans plus table cells, in extraction order.
fn concat_page_text(artifacts: &RawPageArtifacts) -> String {
    let mut text = String::new();
    for span in &artifacts.spans {
        text.push_str(&span.text);
        text.push('\n');
    }
    for table in &artifacts.tables {
        for row in &table.rows {
            for cell in row.iter().flatten() {
                text.push_str(cell);
                text.push(' ');
            }
            text.push('\n');
        }
    }
    text
}

/// Fraction of characters in the suspicious class.
///
/// Each `(cid:NNN)` placeholder counts as one suspicious glyph standing in
/// for the whole sequence, so a page full of them saturates without the
/// digits inside the marker diluting the ratio.
fn suspicious_char_ratio(text: &str) -> f64 {
    let cid_count = RE_CID_PLACEHOLDER.find_iter(text).count();
    let stripped = RE_CID_PLACEHOLDER.replace_all(text, "");

    let mut total = cid_count;
    let mut suspicious = cid_count;
    for ch in stripped.chars() {
        total += 1;
        if ch == '\u{FFFD}' {
            suspicious += 1;
        } else if ch.is_control() && !matches!(ch, '\t' | '\n' | '\r') {
            suspicious += 1;
        } else if is_outside_plausible_glyphs(ch) {
            suspicious += 1;
        }
    }

    if total == 0 {
        0.0
    } else {
        suspicious as f64 / total as f64
    }
}

/// Characters no font in a text document plausibly maps: unassigned planes,
/// private-use areas, and the noncharacter range.
fn is_outside_plausible_glyphs(ch: char) -> bool {
    matches!(ch,
        '\u{E000}'..='\u{F8FF}'        // private use area
        | '\u{FDD0}'..='\u{FDEF}'      // noncharacters
        | '\u{FFF0}'..='\u{FFFB}'      // specials (minus U+FFFD, handled above)
    )
}

/// Fraction of whitespace-separated words with no alphanumeric character.
fn junk_word_ratio(text: &str) -> f64 {
    let mut words = 0usize;
    let mut junk = 0usize;
    for word in text.split_whitespace() {
        words += 1;
        if !word.chars().any(|c| c.is_alphanumeric()) {
            junk += 1;
        }
    }
    if words == 0 {
        0.0
    } else {
        junk as f64 / words as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{BBox, TextSpan};

    fn page_with_text(text: &str) -> RawPageArtifacts {
        RawPageArtifacts {
            page_width: 612.0,
            page_height: 792.0,
            spans: vec![TextSpan {
                bbox: BBox::new(0.0, 0.0, 612.0, 20.0),
                text: text.to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn clean_prose_is_clean() {
        let a = assess(
            &page_with_text("The quick brown fox jumps over the lazy dog."),
            &ExtractorConfig::default(),
        );
        assert_eq!(a.verdict, Verdict::Clean);
        assert!(a.score < 0.1, "score = {}", a.score);
    }

    #[test]
    fn stray_symbols_do_not_flag_the_page() {
        let a = assess(
            &page_with_text("Revenue grew 12% — see §4.2 and footnote †3."),
            &ExtractorConfig::default(),
        );
        assert_eq!(a.verdict, Verdict::Clean);
    }

    #[test]
    fn replacement_character_soup_is_corrupted() {
        let garbled = "\u{FFFD}".repeat(200);
        let a = assess(&page_with_text(&garbled), &ExtractorConfig::default());
        assert_eq!(a.verdict, Verdict::Corrupted);
        assert!(a.reasons.contains(&CorruptionSignal::SuspiciousChars));
    }

    #[test]
    fn cid_placeholders_are_suspicious() {
        let garbled = "(cid:112)(cid:97)(cid:103)(cid:101)".repeat(20);
        let a = assess(&page_with_text(&garbled), &ExtractorConfig::default());
        assert_eq!(a.verdict, Verdict::Corrupted);
        assert!(a.reasons.contains(&CorruptionSignal::SuspiciousChars));
    }

    #[test]
    fn score_is_monotone_in_replacement_ratio() {
        // Holds the other signals fixed while ramping the replacement share.
        let config = ExtractorConfig::default();
        let mut prev = -1.0;
        for bad in 0..=10 {
            let text: String = "a".repeat(100 - bad * 10) + &"\u{FFFD}".repeat(bad * 10);
            let a = assess(&page_with_text(&text), &config);
            assert!(
                a.score >= prev,
                "score decreased: {} -> {} at {bad}",
                prev,
                a.score
            );
            prev = a.score;
        }
    }

    #[test]
    fn backend_warnings_raise_the_score() {
        let config = ExtractorConfig::default();
        let mut quiet = page_with_text("ordinary page text here");
        let mut noisy = quiet.clone();
        quiet.decode_warnings = 0;
        noisy.decode_warnings = 5;
        let a = assess(&quiet, &config);
        let b = assess(&noisy, &config);
        assert!(b.score > a.score);
        assert!(b.reasons.contains(&CorruptionSignal::BackendWarnings));
    }

    #[test]
    fn blank_page_is_clean() {
        let a = assess(&RawPageArtifacts::default(), &ExtractorConfig::default());
        assert_eq!(a.verdict, Verdict::Clean);
        assert_eq!(a.score, 0.0);
        assert!(a.reasons.is_empty());
    }

    #[test]
    fn whitespace_only_spans_saturate() {
        let a = assess(&page_with_text("   \t  "), &ExtractorConfig::default());
        assert_eq!(a.verdict, Verdict::Corrupted);
        assert!(a.reasons.contains(&CorruptionSignal::NoUsableText));
    }

    #[test]
    fn junk_words_alone_stay_below_threshold() {
        // Symbol-only words contribute at most WEIGHT_JUNK_WORDS (0.2) which
        // is under the 0.3 default threshold; combined with suspicious chars
        // they tip pages over, alone they do not.
        let a = assess(
            &page_with_text("--- === ::: +++ ///"),
            &ExtractorConfig::default(),
        );
        assert!(a.score <= WEIGHT_JUNK_WORDS + 1e-9);
    }

    #[test]
    fn extraction_failure_is_maximal() {
        let a = CorruptionAssessment::extraction_failed();
        assert_eq!(a.score, 1.0);
        assert!(a.is_corrupted());
        assert!(a.reasons.contains(&CorruptionSignal::ExtractionFailed));
    }

    #[test]
    fn tables_participate_in_the_scan() {
        use crate::backend::TableRegion;
        let mut page = RawPageArtifacts {
            page_width: 612.0,
            page_height: 792.0,
            ..Default::default()
        };
        page.tables.push(TableRegion {
            bbox: BBox::new(0.0, 100.0, 612.0, 300.0),
            rows: vec![vec![Some("\u{FFFD}\u{FFFD}\u{FFFD}".into()); 4]; 6],
        });
        let a = assess(&page, &ExtractorConfig::default());
        assert_eq!(a.verdict, Verdict::Corrupted);
    }
}
