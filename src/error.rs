//! Error types for the extraction pipeline.
//!
//! Three distinct failure classes get three distinct treatments:
//!
//! * **Input errors** (missing file, bad range, invalid document) abort the
//!   whole request with no partial output — variants of [`ExtractError`].
//!
//! * **Limit breaches** are not failures of the document or the caller's
//!   intent; they carry a full [`PaginationAdvisory`] payload telling the
//!   caller exactly how to resubmit, never a bare message.
//!
//! * **Per-page failures** never appear here at all. A page the backend
//!   cannot extract is treated as maximally corrupted and degrades to the
//!   image-fallback path for that page only; the request still completes.

use crate::backend::BackendError;
use crate::output::PaginationAdvisory;
use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the extraction entry points.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Document was not found at the given path.
    #[error("PDF file not found: '{path}'")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the document.
    #[error("Permission denied reading '{detail}'")]
    PermissionDenied { detail: String },

    /// The container exists but cannot be read as a document.
    #[error("Invalid or corrupted PDF: {detail}")]
    InvalidDocument { detail: String },

    /// The requested range does not intersect the document.
    #[error(
        "Invalid page range {start_page}-{end_page}: document has {total_pages} pages. \
         Request pages between 1 and {total_pages}."
    )]
    InvalidPageRange {
        start_page: u32,
        end_page: u32,
        total_pages: u32,
    },

    /// A configured cap was breached. Not executed; the advisory payload
    /// carries suggested compliant sub-ranges to resubmit.
    #[error("{} pages requested, limit is {} per request", .0.requested_pages, .0.limit)]
    LimitExceeded(Box<PaginationAdvisory>),

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Unexpected internal error (task panic and the like).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ExtractError {
    /// Map a document-level backend error to the matching input error.
    pub(crate) fn from_backend(err: BackendError, path: &std::path::Path) -> Self {
        match err {
            BackendError::NotFound(_) => ExtractError::FileNotFound {
                path: path.to_path_buf(),
            },
            BackendError::PermissionDenied(detail) => ExtractError::PermissionDenied { detail },
            BackendError::InvalidDocument(detail) => ExtractError::InvalidDocument { detail },
            BackendError::PageFailed { page, detail } => ExtractError::InvalidDocument {
                detail: format!("page {page}: {detail}"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::{LimitKind, SuggestedRange};

    #[test]
    fn invalid_range_display_names_bounds() {
        let e = ExtractError::InvalidPageRange {
            start_page: 12,
            end_page: 20,
            total_pages: 8,
        };
        let msg = e.to_string();
        assert!(msg.contains("12-20"), "got: {msg}");
        assert!(msg.contains("8 pages"), "got: {msg}");
    }

    #[test]
    fn limit_exceeded_serializes_structured_advisory() {
        let advisory = PaginationAdvisory {
            error: LimitKind::PageLimitExceeded,
            requested_pages: 25,
            limit: 10,
            total_pages: 40,
            total_images: None,
            suggested_ranges: vec![SuggestedRange {
                start_page: 1,
                end_page: 10,
                page_count: 10,
                estimated_images: 20,
            }],
        };
        let e = ExtractError::LimitExceeded(Box::new(advisory));
        assert!(e.to_string().contains("25 pages"));
        if let ExtractError::LimitExceeded(plan) = e {
            let json = serde_json::to_value(&*plan).unwrap();
            assert_eq!(json["error"], "PAGE_LIMIT_EXCEEDED");
            assert_eq!(json["suggested_ranges"][0]["end_page"], 10);
        } else {
            unreachable!();
        }
    }
}
