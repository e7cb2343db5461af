//! Mode resolution: the single decision point between the block assembler
//! and the page-image passthrough.
//!
//! Implemented as a pure total function over the (mode, verdict) case table
//! rather than nested conditionals, so adding a mode or verdict variant is a
//! compile error here and nowhere else. No other component may override the
//! resolution.

use crate::pipeline::corruption::Verdict;
use crate::request::ExtractionMode;

/// Terminal resolution for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Run the block assembler. `corrupted` records a distrusted verdict that
    /// the caller chose to extract anyway (text_only mode).
    Text { corrupted: bool },
    /// Emit the full-page raster instead of blocks. `text_corrupted` is true
    /// only when a corruption verdict forced the fallback — never in
    /// image_only mode, where corruption is not assessed at all.
    PageImage { text_corrupted: bool },
}

/// Resolve the path for one page from the requested mode and the page's
/// corruption verdict.
pub fn resolve(mode: ExtractionMode, verdict: Verdict) -> Resolution {
    match (mode, verdict) {
        // text_only: corruption is recorded but never triggers fallback.
        (ExtractionMode::TextOnly, Verdict::Clean) => Resolution::Text { corrupted: false },
        (ExtractionMode::TextOnly, Verdict::Corrupted) => Resolution::Text { corrupted: true },

        // image_only: text extraction is skipped entirely upstream, so the
        // verdict passed here is a placeholder and never marks corruption.
        (ExtractionMode::ImageOnly, _) => Resolution::PageImage {
            text_corrupted: false,
        },

        (ExtractionMode::Auto, Verdict::Clean) => Resolution::Text { corrupted: false },
        (ExtractionMode::Auto, Verdict::Corrupted) => Resolution::PageImage {
            text_corrupted: true,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_case_table() {
        use ExtractionMode::*;
        use Verdict::*;

        assert_eq!(resolve(TextOnly, Clean), Resolution::Text { corrupted: false });
        assert_eq!(resolve(TextOnly, Corrupted), Resolution::Text { corrupted: true });
        assert_eq!(
            resolve(ImageOnly, Clean),
            Resolution::PageImage { text_corrupted: false }
        );
        assert_eq!(
            resolve(ImageOnly, Corrupted),
            Resolution::PageImage { text_corrupted: false }
        );
        assert_eq!(resolve(Auto, Clean), Resolution::Text { corrupted: false });
        assert_eq!(
            resolve(Auto, Corrupted),
            Resolution::PageImage { text_corrupted: true }
        );
    }
}
