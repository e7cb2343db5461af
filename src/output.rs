//! Output types: the block stream, per-page results, and the pagination
//! advisory.
//!
//! Heterogeneous block output is a closed tagged enum with an exhaustive
//! match at the serialization boundary — never a stringly-typed map — so
//! adding a block variant is a compile error everywhere it matters.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One typed unit of page content in reading-order position.
///
/// A block's position is implicit: its index in the page's block sequence
/// *is* its reading order. Serializes as `{"type": "text" | "table" |
/// "image", "content": ..., ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBlock {
    /// A run of body text.
    Text { content: String },
    /// A table serialized to GFM markdown, emitted as a single block at its
    /// geometric position so its cells are never scattered as fragments.
    Table { content: String },
    /// An embedded image that survived filtering, base64-encoded.
    Image {
        content: String,
        width: u32,
        height: u32,
    },
}

impl ContentBlock {
    pub fn is_image(&self) -> bool {
        matches!(self, ContentBlock::Image { .. })
    }
}

/// The result for one page: either an ordered block sequence, or a page-image
/// fallback with empty blocks. The two shapes are mutually exclusive.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult {
    /// Page number, 1-based.
    pub page_number: u32,
    /// Ordered content blocks. Empty on the image-fallback path.
    pub content_blocks: Vec<ContentBlock>,
    /// Present and true only when corrupted text forced the image fallback,
    /// so the consumer can distinguish "no text because blank" from "no text
    /// because blocked".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_corrupted: Option<bool>,
    /// Corruption score that triggered the fallback (0.0–1.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corruption_score: Option<f64>,
    /// Full page as a base64 JPEG, on the image path.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_image_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_image_height: Option<u32>,
}

impl PageResult {
    /// A text-path result carrying assembled blocks.
    pub(crate) fn text(page_number: u32, content_blocks: Vec<ContentBlock>) -> Self {
        Self {
            page_number,
            content_blocks,
            text_corrupted: None,
            corruption_score: None,
            page_image: None,
            page_image_width: None,
            page_image_height: None,
        }
    }
}

/// The full result of one extraction request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractOutput {
    pub file_path: PathBuf,
    /// Per-page results, ordered by page number.
    pub pages: Vec<PageResult>,
    pub total_pages_read: usize,
    /// Images emitted across all pages, page rasters included.
    pub total_images: usize,
}

// ── Pagination advisory ──────────────────────────────────────────────────

/// Which configured limit an oversized request breached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LimitKind {
    #[serde(rename = "PAGE_LIMIT_EXCEEDED")]
    PageLimitExceeded,
    #[serde(rename = "IMAGE_LIMIT_EXCEEDED")]
    ImageLimitExceeded,
}

/// One suggested compliant sub-range of an oversized request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedRange {
    pub start_page: u32,
    pub end_page: u32,
    pub page_count: u32,
    /// Estimated images in the range. An estimate only: derived from observed
    /// density when prior pages of the document were processed, otherwise a
    /// flat per-page guess.
    pub estimated_images: u32,
}

/// A non-executing advisory describing how to split an oversized request.
///
/// Returned instead of running extraction when a limit is breached. The
/// caller resubmits one suggested range as a new request; nothing about the
/// document is mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginationAdvisory {
    pub error: LimitKind,
    /// Pages the caller asked for (after clamping to the document).
    pub requested_pages: u32,
    /// The configured cap that was breached.
    pub limit: u32,
    pub total_pages: u32,
    /// Observed image count in the requested range, when the breach was the
    /// image cap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_images: Option<u32>,
    /// Ordered, consecutive sub-ranges covering the start of the request.
    pub suggested_ranges: Vec<SuggestedRange>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_block_tags_are_lowercase() {
        let block = ContentBlock::Table {
            content: "| a |".into(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "table");
        assert_eq!(json["content"], "| a |");
    }

    #[test]
    fn image_block_carries_dimensions() {
        let block = ContentBlock::Image {
            content: "AAAA".into(),
            width: 120,
            height: 80,
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["width"], 120);
        assert_eq!(json["height"], 80);
    }

    #[test]
    fn text_page_result_omits_fallback_fields() {
        let page = PageResult::text(3, vec![ContentBlock::Text { content: "hi".into() }]);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("text_corrupted").is_none());
        assert!(json.get("page_image").is_none());
        assert_eq!(json["page_number"], 3);
    }

    #[test]
    fn limit_kind_uses_wire_identifiers() {
        let json = serde_json::to_string(&LimitKind::PageLimitExceeded).unwrap();
        assert_eq!(json, "\"PAGE_LIMIT_EXCEEDED\"");
    }
}
