//! # pdf-blockstream
//!
//! Turn raw per-page PDF artifacts into a clean, ordered, LLM-consumable
//! content block stream.
//!
//! ## Why this crate?
//!
//! Parsing a PDF is a solved problem; deciding what to *do* with the output
//! is not. Extracted text can be garbled beyond use, embedded images are
//! mostly divider lines and logo furniture, tables shatter into loose
//! fragments, and a naive "read pages 1-200" request can flood a model's
//! context window. This crate is the decision and assembly layer that sits
//! on top of any PDF backend:
//!
//! - score each page's text and fall back to a page image when it cannot be
//!   trusted;
//! - interleave text, tables, and images back into visual reading order;
//! - drop decorative/noise images and rescale the rest to a token-budget-
//!   aware size;
//! - gate oversized requests behind a structured pagination advisory instead
//!   of silently overflowing the consumer.
//!
//! ## Pipeline Overview
//!
//! ```text
//! ExtractionRequest
//!  │
//!  ├─ 1. Gate      page/image caps → PaginationAdvisory if breached
//!  ├─ 2. Score     per-page corruption assessment of extracted text
//!  ├─ 3. Resolve   auto | text_only | image_only → blocks or page image
//!  ├─ 4. Filter    drop decorative images, downscale the rest
//!  ├─ 5. Assemble  text + tables + images in reading order
//!  └─ 6. Output    ordered ContentBlocks (or page raster) per page, as JSON
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pdf_blockstream::{ExtractionRequest, Extractor, ExtractorConfig, PageBackend};
//! use std::sync::Arc;
//!
//! # async fn run(backend: Arc<dyn PageBackend>) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExtractorConfig::from_env();
//! let request = ExtractionRequest::new("report.pdf", &config).pages(1, 5);
//!
//! let extractor = Extractor::new(backend, config);
//! let output = extractor.extract(&request).await?;
//! println!("{}", serde_json::to_string_pretty(&output)?);
//! # Ok(())
//! # }
//! ```
//!
//! The PDF parsing/rendering engine itself is an external collaborator:
//! implement [`PageBackend`] over pdfium, a pdfplumber-style parser, or an
//! in-memory fixture, and the pipeline does the rest.

// ── Modules ──────────────────────────────────────────────────────────────

pub mod backend;
pub mod config;
pub mod error;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod request;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use backend::{
    BBox, BackendError, PageBackend, PageRaster, RasterFormat, RawImage, RawPageArtifacts,
    TableRegion, TextSpan,
};
pub use config::{ExtractorConfig, ExtractorConfigBuilder};
pub use error::ExtractError;
pub use extract::Extractor;
pub use output::{
    ContentBlock, ExtractOutput, LimitKind, PageResult, PaginationAdvisory, SuggestedRange,
};
pub use pipeline::corruption::{CorruptionAssessment, CorruptionSignal, Verdict};
pub use request::{ExtractionMode, ExtractionRequest};
