//! Request orchestration: gate, per-page pipeline, result assembly.
//!
//! ## Why spawn_blocking?
//!
//! Per-page work (corruption scanning, image decode/rescale, assembly) is
//! CPU-bound, and the backend's `artifacts`/`render_page` calls may block on
//! the parsing engine. `tokio::task::spawn_blocking` keeps that work off the
//! async worker threads; `buffer_unordered` bounds how many pages run at
//! once. Pages share no state, so the fan-out needs no coordination — results
//! are re-sorted by page number at the end for deterministic output.
//!
//! ## Failure containment
//!
//! Only input-class errors abort a request. A backend failure on one page is
//! converted into a maximal corruption signal for that page, which routes it
//! down the image-fallback path; every other page proceeds untouched.

use crate::backend::{BackendError, PageBackend};
use crate::config::ExtractorConfig;
use crate::error::ExtractError;
use crate::output::{ExtractOutput, LimitKind, PageResult};
use crate::pipeline::corruption::{self, CorruptionAssessment, Verdict};
use crate::pipeline::imaging::{self, ImageOptions};
use crate::pipeline::mode::{self, Resolution};
use crate::pipeline::{assemble, paginate};
use crate::request::{ExtractionMode, ExtractionRequest};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The extraction pipeline bound to one document backend.
///
/// Requests are independent synchronous pipelines; the only state an
/// `Extractor` accumulates across them is the approximate image-density
/// observation feeding the pagination advisor's estimates, kept in relaxed
/// atomics since the advisor is allowed to be approximate.
pub struct Extractor {
    backend: Arc<dyn PageBackend>,
    config: ExtractorConfig,
    pages_observed: AtomicU64,
    images_observed: AtomicU64,
}

impl Extractor {
    pub fn new(backend: Arc<dyn PageBackend>, config: ExtractorConfig) -> Self {
        Self {
            backend,
            config,
            pages_observed: AtomicU64::new(0),
            images_observed: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Run one extraction request.
    ///
    /// # Errors
    /// Fatal only for input problems ([`ExtractError::FileNotFound`],
    /// [`ExtractError::InvalidPageRange`], ...) or a breached cap
    /// ([`ExtractError::LimitExceeded`], carrying the batch plan). Per-page
    /// failures degrade to the image-fallback path and never abort.
    pub async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractOutput, ExtractError> {
        let request = request.clone().validated();
        info!(
            "extracting {:?} pages {}-{} mode {:?}",
            request.file_path,
            request.start_page,
            request
                .end_page
                .map(|e| e.to_string())
                .unwrap_or_else(|| "end".into()),
            request.extraction_mode
        );

        let total_pages = self
            .backend
            .page_count()
            .map_err(|e| ExtractError::from_backend(e, &request.file_path))?;

        let (start, end) = self.validated_range(&request, total_pages)?;
        self.gate(&request, start, end, total_pages)?;

        // ── Per-page fan-out ────────────────────────────────────────────
        let mut pages: Vec<PageResult> = stream::iter(start..=end)
            .map(|page| {
                let backend = Arc::clone(&self.backend);
                let config = self.config.clone();
                let request = request.clone();
                async move {
                    tokio::task::spawn_blocking(move || {
                        process_page(backend.as_ref(), page, &request, &config)
                    })
                    .await
                    .unwrap_or_else(|e| {
                        warn!("page {page} task panicked: {e}");
                        failed_page(page, 1.0)
                    })
                }
            })
            .buffer_unordered(self.config.concurrency)
            .collect()
            .await;

        pages.sort_by_key(|p| p.page_number);

        let total_images = pages
            .iter()
            .map(|p| {
                p.content_blocks.iter().filter(|b| b.is_image()).count()
                    + usize::from(p.page_image.is_some())
            })
            .sum();

        // Feed the advisor's density estimate for later oversized requests.
        self.pages_observed
            .fetch_add(pages.len() as u64, Ordering::Relaxed);
        self.images_observed
            .fetch_add(total_images as u64, Ordering::Relaxed);

        info!(
            "extracted {} pages, {} images from {:?}",
            pages.len(),
            total_images,
            request.file_path
        );

        Ok(ExtractOutput {
            file_path: request.file_path,
            total_pages_read: pages.len(),
            total_images,
            pages,
        })
    }

    /// Blocking wrapper around [`extract`](Self::extract); creates a
    /// temporary runtime internally.
    pub fn extract_sync(&self, request: &ExtractionRequest) -> Result<ExtractOutput, ExtractError> {
        tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ExtractError::Internal(format!("failed to create runtime: {e}")))?
            .block_on(self.extract(request))
    }

    /// Validate the request range against the document and clamp the end.
    ///
    /// An end page past the document is clamped, not rejected — a request for
    /// pages 10-19 of a 15-page document reads 10-15.
    fn validated_range(
        &self,
        request: &ExtractionRequest,
        total_pages: u32,
    ) -> Result<(u32, u32), ExtractError> {
        let start = request.start_page;
        let requested_end = request.end_page.unwrap_or(total_pages);

        if total_pages == 0 || start > total_pages || requested_end < start {
            return Err(ExtractError::InvalidPageRange {
                start_page: start,
                end_page: requested_end,
                total_pages,
            });
        }

        Ok((start, requested_end.min(total_pages)))
    }

    /// The pagination gate: page-count cap, then image-count cap.
    ///
    /// Runs before any heavy work; on a breach it builds the batch plan and
    /// returns without executing anything.
    fn gate(
        &self,
        request: &ExtractionRequest,
        start: u32,
        end: u32,
        total_pages: u32,
    ) -> Result<(), ExtractError> {
        let page_count = end - start + 1;

        if page_count > self.config.max_pages_per_request {
            let plan = paginate::build_plan(
                LimitKind::PageLimitExceeded,
                start,
                end,
                total_pages,
                None,
                self.observed_density(),
                &self.config,
            );
            return Err(ExtractError::LimitExceeded(Box::new(plan)));
        }

        // Cheap metadata pre-scan; a page the backend cannot count on is
        // treated as imageless here — the cap is a guardrail, not accounting.
        let mut range_images: u32 = 0;
        for page in start..=end {
            range_images += match self.backend.image_count(page) {
                Ok(n) => n,
                Err(BackendError::PageFailed { page, detail }) => {
                    debug!("image pre-scan failed for page {page}: {detail}");
                    0
                }
                Err(e) => return Err(ExtractError::from_backend(e, &request.file_path)),
            };
        }

        if range_images > self.config.max_images_per_request {
            let plan = paginate::build_plan(
                LimitKind::ImageLimitExceeded,
                start,
                end,
                total_pages,
                Some(range_images),
                self.observed_density(),
                &self.config,
            );
            return Err(ExtractError::LimitExceeded(Box::new(plan)));
        }

        Ok(())
    }

    /// Images-per-page density across everything this extractor has
    /// completed, if anything.
    fn observed_density(&self) -> Option<f64> {
        let pages = self.pages_observed.load(Ordering::Relaxed);
        if pages == 0 {
            return None;
        }
        let images = self.images_observed.load(Ordering::Relaxed);
        Some(images as f64 / pages as f64)
    }
}

// ── Per-page pipeline ────────────────────────────────────────────────────

/// Process a single page end to end. Never fails: backend trouble degrades
/// to the image-fallback shape for this page only.
fn process_page(
    backend: &dyn PageBackend,
    page: u32,
    request: &ExtractionRequest,
    config: &ExtractorConfig,
) -> PageResult {
    let opts = ImageOptions {
        filter_header_footer: request.filter_header_footer,
        crop_images: request.crop_images,
        max_image_dimension: request.max_image_dimension,
    };

    // image_only skips text extraction entirely — artifacts are never
    // fetched and corruption is never assessed.
    if request.extraction_mode == ExtractionMode::ImageOnly {
        let resolution = mode::resolve(request.extraction_mode, Verdict::Clean);
        debug_assert!(matches!(resolution, Resolution::PageImage { .. }));
        return page_image_result(backend, page, request, config, opts, false, None);
    }

    let (artifacts, assessment) = match backend.artifacts(page) {
        Ok(artifacts) => {
            let assessment = corruption::assess(&artifacts, config);
            (Some(artifacts), assessment)
        }
        Err(e) => {
            warn!("page {page}: extraction failed, falling back to image: {e}");
            (None, CorruptionAssessment::extraction_failed())
        }
    };

    debug!(
        "page {page}: corruption score {:.3} ({:?})",
        assessment.score, assessment.reasons
    );

    match mode::resolve(request.extraction_mode, assessment.verdict) {
        Resolution::Text { corrupted } => match artifacts {
            Some(artifacts) => {
                let images = imaging::filter_and_crop(
                    &artifacts.images,
                    artifacts.page_height,
                    opts,
                    config,
                );
                let blocks =
                    assemble::assemble(&artifacts.spans, &artifacts.tables, images, config);
                let mut result = PageResult::text(page, blocks);
                if corrupted {
                    // text_only on a distrusted page: extract anyway, record
                    // the score so the consumer can judge for itself.
                    result.corruption_score = Some(assessment.score);
                }
                result
            }
            // text_only with a failed backend: nothing to extract and no
            // fallback allowed, so the page is empty and marked corrupted.
            None => failed_page(page, assessment.score),
        },
        Resolution::PageImage { text_corrupted } => page_image_result(
            backend,
            page,
            request,
            config,
            opts,
            text_corrupted,
            text_corrupted.then_some(assessment.score),
        ),
    }
}

/// Render and process the full-page raster for the image path.
fn page_image_result(
    backend: &dyn PageBackend,
    page: u32,
    request: &ExtractionRequest,
    config: &ExtractorConfig,
    opts: ImageOptions,
    text_corrupted: bool,
    corruption_score: Option<f64>,
) -> PageResult {
    let raster = match backend.render_page(page, request.page_image_dpi) {
        Ok(r) => r,
        Err(e) => {
            warn!("page {page}: raster render failed: {e}");
            return PageResult {
                page_number: page,
                content_blocks: Vec::new(),
                text_corrupted: Some(true),
                corruption_score,
                page_image: None,
                page_image_width: None,
                page_image_height: None,
            };
        }
    };

    match imaging::process_page_raster(raster, opts, config) {
        Ok(img) => PageResult {
            page_number: page,
            content_blocks: Vec::new(),
            text_corrupted: text_corrupted.then_some(true),
            corruption_score,
            page_image: Some(img.content),
            page_image_width: Some(img.width),
            page_image_height: Some(img.height),
        },
        Err(e) => {
            warn!("page {page}: raster encode failed: {e}");
            PageResult {
                page_number: page,
                content_blocks: Vec::new(),
                text_corrupted: Some(true),
                corruption_score,
                page_image: None,
                page_image_width: None,
                page_image_height: None,
            }
        }
    }
}

/// The shape for a page that produced neither blocks nor a raster.
fn failed_page(page: u32, score: f64) -> PageResult {
    PageResult {
        page_number: page,
        content_blocks: Vec::new(),
        text_corrupted: Some(true),
        corruption_score: Some(score),
        page_image: None,
        page_image_width: None,
        page_image_height: None,
    }
}
