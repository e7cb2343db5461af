//! Pagination advisory: the gate in front of the pipeline.
//!
//! Oversized requests are never executed and never silently truncated.
//! The advisor partitions the requested range into consecutive chunks of
//! exactly `max_pages_per_request` pages (the last may be shorter) and
//! annotates each with an estimated image count, so the caller can resubmit
//! one compliant chunk at a time instead of blowing through a consumer's
//! context window. The chunks always cover the full requested range;
//! `max_suggested_ranges` is an opt-in truncation knob, off by default.
//!
//! The image estimate is advisory, not contractual: it uses the
//! images-per-page density observed on previously processed pages of the same
//! document when available, and a configured flat estimate otherwise.

use crate::config::ExtractorConfig;
use crate::output::{LimitKind, PaginationAdvisory, SuggestedRange};

/// Build the batch plan for a request that breached a limit.
///
/// `start`/`end` are the clamped, validated 1-based bounds of the original
/// request. `observed_density` is images-per-page from prior completed pages
/// of this document, if any exist.
pub fn build_plan(
    kind: LimitKind,
    start: u32,
    end: u32,
    total_pages: u32,
    total_images: Option<u32>,
    observed_density: Option<f64>,
    config: &ExtractorConfig,
) -> PaginationAdvisory {
    let density =
        observed_density.unwrap_or(config.flat_images_per_page_estimate as f64);

    let chunk = config.max_pages_per_request.max(1);
    let cap = match config.max_suggested_ranges {
        0 => usize::MAX,
        n => n,
    };
    let mut ranges = Vec::new();
    let mut cursor = start;
    while cursor <= end && ranges.len() < cap {
        let chunk_end = (cursor + chunk - 1).min(end);
        let page_count = chunk_end - cursor + 1;
        ranges.push(SuggestedRange {
            start_page: cursor,
            end_page: chunk_end,
            page_count,
            estimated_images: (density * page_count as f64).ceil() as u32,
        });
        cursor = chunk_end + 1;
    }

    PaginationAdvisory {
        error: kind,
        requested_pages: end - start + 1,
        limit: match kind {
            LimitKind::PageLimitExceeded => config.max_pages_per_request,
            LimitKind::ImageLimitExceeded => config.max_images_per_request,
        },
        total_pages,
        total_images,
        suggested_ranges: ranges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(start: u32, end: u32, config: &ExtractorConfig) -> PaginationAdvisory {
        build_plan(
            LimitKind::PageLimitExceeded,
            start,
            end,
            100,
            None,
            None,
            config,
        )
    }

    #[test]
    fn partitions_into_ceil_n_over_m_chunks() {
        let config = ExtractorConfig::default(); // max 10 per request
        let advisory = plan(1, 25, &config);
        // ceil(25 / 10) = 3
        assert_eq!(advisory.suggested_ranges.len(), 3);
        assert_eq!(advisory.requested_pages, 25);
        assert_eq!(advisory.limit, 10);
    }

    #[test]
    fn chunks_cover_the_range_without_gaps_or_overlaps() {
        let config = ExtractorConfig::default();
        let advisory = plan(5, 32, &config);
        let ranges = &advisory.suggested_ranges;

        assert_eq!(ranges[0].start_page, 5);
        assert_eq!(ranges.last().unwrap().end_page, 32);
        for pair in ranges.windows(2) {
            assert_eq!(pair[1].start_page, pair[0].end_page + 1);
        }
        for r in ranges {
            assert!(r.page_count <= config.max_pages_per_request);
            assert_eq!(r.page_count, r.end_page - r.start_page + 1);
        }
    }

    #[test]
    fn last_chunk_may_be_shorter() {
        let config = ExtractorConfig::default();
        let advisory = plan(1, 25, &config);
        assert_eq!(advisory.suggested_ranges[2].page_count, 5);
    }

    #[test]
    fn plan_covers_ranges_beyond_fifty_pages() {
        // 60 pages at 10 per chunk: all six chunks, ending at the range end.
        let config = ExtractorConfig::default();
        let advisory = plan(1, 60, &config);
        assert_eq!(advisory.suggested_ranges.len(), 6);
        assert_eq!(advisory.suggested_ranges.last().unwrap().end_page, 60);
    }

    #[test]
    fn opt_in_cap_truncates_the_plan() {
        let config = ExtractorConfig::builder()
            .max_suggested_ranges(5)
            .build()
            .unwrap();
        let advisory = plan(1, 100, &config);
        assert_eq!(advisory.suggested_ranges.len(), 5);
        assert_eq!(advisory.suggested_ranges.last().unwrap().end_page, 50);
    }

    #[test]
    fn flat_estimate_applies_without_prior_data() {
        let config = ExtractorConfig::default(); // flat estimate: 2/page
        let advisory = plan(1, 25, &config);
        assert_eq!(advisory.suggested_ranges[0].estimated_images, 20);
        assert_eq!(advisory.suggested_ranges[2].estimated_images, 10);
    }

    #[test]
    fn observed_density_overrides_flat_estimate() {
        let config = ExtractorConfig::default();
        let advisory = build_plan(
            LimitKind::ImageLimitExceeded,
            1,
            20,
            50,
            Some(80),
            Some(3.5),
            &config,
        );
        assert_eq!(advisory.suggested_ranges[0].estimated_images, 35);
        assert_eq!(advisory.total_images, Some(80));
        assert_eq!(advisory.limit, config.max_images_per_request);
    }

    #[test]
    fn estimates_are_present_and_non_negative() {
        // The estimate is advisory; the only contract is that it exists.
        let config = ExtractorConfig::builder()
            .flat_images_per_page_estimate(0)
            .build()
            .unwrap();
        let advisory = plan(1, 30, &config);
        assert!(advisory
            .suggested_ranges
            .iter()
            .all(|r| r.estimated_images == 0));
    }
}
