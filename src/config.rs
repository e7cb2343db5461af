//! Pipeline configuration.
//!
//! Every limit and threshold lives in one immutable [`ExtractorConfig`] value
//! threaded explicitly through the pipeline. Nothing reads ambient/global
//! state, so tests can construct arbitrary configurations without
//! process-wide side effects, and two runs with equal configs are
//! byte-for-byte reproducible.
//!
//! # Design choice: builder over constructor
//! A dozen-field constructor is unreadable and breaks on every new field.
//! The builder lets callers set only what they care about and rely on the
//! documented defaults for the rest.

use crate::error::ExtractError;
use serde::{Deserialize, Serialize};

/// Configuration for the extraction pipeline.
///
/// Built via [`ExtractorConfig::builder()`], [`ExtractorConfig::default()`],
/// or [`ExtractorConfig::from_env()`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Maximum pages a single request may cover. Default: 10.
    ///
    /// Larger ranges are not executed; the pagination advisor returns a
    /// structured batch plan instead, so a consumer's context window is never
    /// silently overflowed.
    pub max_pages_per_request: u32,

    /// Maximum embedded images a single request may pull in. Default: 50.
    pub max_images_per_request: u32,

    /// Cap on suggested sub-ranges in a batch plan; 0 means uncapped.
    /// Default: 0.
    ///
    /// Uncapped, the plan's chunks always cover the whole requested range.
    /// Setting a cap trades coverage for a shorter advisory payload.
    pub max_suggested_ranges: usize,

    /// Maximum output image dimension (width or height) in pixels. Default: 842.
    ///
    /// 842 px is A4 height at 72 DPI — enough for a vision model to read
    /// embedded figures while keeping per-image token cost bounded.
    pub max_image_dimension: u32,

    /// Images with **both** dimensions below this are dropped. Default: 28.
    ///
    /// Removes decorative glyphs, icons, and bullet ornaments that carry no
    /// visual meaning for a reader.
    pub min_image_dimension: u32,

    /// Aspect-ratio cutoff (long side / short side). Default: 15.0.
    ///
    /// Anything more elongated than 15:1 is virtually always a rule or
    /// divider line, not content. Set to 0 to disable.
    pub max_aspect_ratio: f64,

    /// DPI for full-page raster rendering. Default: 100.
    ///
    /// Bounds the token cost of the image-fallback path directly; 100 DPI is
    /// readable for vision consumption at a fraction of print-quality size.
    pub page_image_dpi: u32,

    /// JPEG encode quality for page rasters and JPEG-sourced images. Default: 85.
    pub jpeg_quality: u8,

    /// Header/footer band as a fraction of page height, per side. Default: 0.10.
    ///
    /// With `filter_header_footer` on, embedded images whose vertical center
    /// falls in an outer band are dropped and page rasters get the bands
    /// whited out.
    pub header_footer_margin: f64,

    /// Corruption score above which a page's text is distrusted. Default: 0.3.
    pub corruption_threshold: f64,

    /// Vertical tolerance (points) within which two items count as the same
    /// line group and are ordered left-to-right. Default: 5.0.
    pub line_tolerance: f64,

    /// Maximum vertical gap (points) across which adjacent text spans are
    /// coalesced into a single block. Default: 14.0.
    pub text_merge_gap: f64,

    /// Flat images-per-page estimate used by the pagination advisor when no
    /// prior pages of the document have been processed. Default: 2.
    pub flat_images_per_page_estimate: u32,

    /// Number of pages processed concurrently within one request. Default: 8.
    ///
    /// Per-page work is independent (no cross-page state), so this is a pure
    /// throughput knob.
    pub concurrency: usize,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            max_pages_per_request: 10,
            max_images_per_request: 50,
            max_suggested_ranges: 0,
            max_image_dimension: 842,
            min_image_dimension: 28,
            max_aspect_ratio: 15.0,
            page_image_dpi: 100,
            jpeg_quality: 85,
            header_footer_margin: 0.10,
            corruption_threshold: 0.3,
            line_tolerance: 5.0,
            text_merge_gap: 14.0,
            flat_images_per_page_estimate: 2,
            concurrency: 8,
        }
    }
}

impl ExtractorConfig {
    /// Create a new builder.
    pub fn builder() -> ExtractorConfigBuilder {
        ExtractorConfigBuilder {
            config: Self::default(),
        }
    }

    /// Build a configuration from `PDF_`-prefixed environment variables.
    ///
    /// Recognised variables: `PDF_MAX_PAGES_PER_REQUEST`,
    /// `PDF_MAX_IMAGES_PER_REQUEST`, `PDF_MAX_IMAGE_DIMENSION`,
    /// `PDF_MIN_IMAGE_DIMENSION`, `PDF_MAX_ASPECT_RATIO`,
    /// `PDF_PAGE_IMAGE_DPI`, `PDF_CORRUPTION_THRESHOLD`. Unset or
    /// unparseable variables fall back to the default, so a deployment with
    /// no configuration at all gets the documented defaults.
    pub fn from_env() -> Self {
        fn var<T: std::str::FromStr>(name: &str, default: T) -> T {
            match std::env::var(name) {
                Ok(v) => v.parse().unwrap_or(default),
                Err(_) => default,
            }
        }

        let d = Self::default();
        Self {
            max_pages_per_request: var("PDF_MAX_PAGES_PER_REQUEST", d.max_pages_per_request),
            max_images_per_request: var("PDF_MAX_IMAGES_PER_REQUEST", d.max_images_per_request),
            max_image_dimension: var("PDF_MAX_IMAGE_DIMENSION", d.max_image_dimension),
            min_image_dimension: var("PDF_MIN_IMAGE_DIMENSION", d.min_image_dimension),
            max_aspect_ratio: var("PDF_MAX_ASPECT_RATIO", d.max_aspect_ratio),
            page_image_dpi: var("PDF_PAGE_IMAGE_DPI", d.page_image_dpi),
            corruption_threshold: var("PDF_CORRUPTION_THRESHOLD", d.corruption_threshold),
            ..d
        }
    }
}

/// Builder for [`ExtractorConfig`].
#[derive(Debug)]
pub struct ExtractorConfigBuilder {
    config: ExtractorConfig,
}

impl ExtractorConfigBuilder {
    pub fn max_pages_per_request(mut self, n: u32) -> Self {
        self.config.max_pages_per_request = n.max(1);
        self
    }

    pub fn max_images_per_request(mut self, n: u32) -> Self {
        self.config.max_images_per_request = n;
        self
    }

    /// 0 disables the cap.
    pub fn max_suggested_ranges(mut self, n: usize) -> Self {
        self.config.max_suggested_ranges = n;
        self
    }

    pub fn max_image_dimension(mut self, px: u32) -> Self {
        self.config.max_image_dimension = px.clamp(28, 4096);
        self
    }

    pub fn min_image_dimension(mut self, px: u32) -> Self {
        self.config.min_image_dimension = px;
        self
    }

    pub fn max_aspect_ratio(mut self, ratio: f64) -> Self {
        self.config.max_aspect_ratio = ratio.max(0.0);
        self
    }

    pub fn page_image_dpi(mut self, dpi: u32) -> Self {
        self.config.page_image_dpi = dpi.clamp(50, 300);
        self
    }

    pub fn jpeg_quality(mut self, q: u8) -> Self {
        self.config.jpeg_quality = q.clamp(1, 100);
        self
    }

    pub fn header_footer_margin(mut self, ratio: f64) -> Self {
        self.config.header_footer_margin = ratio.clamp(0.0, 0.4);
        self
    }

    pub fn corruption_threshold(mut self, t: f64) -> Self {
        self.config.corruption_threshold = t.clamp(0.0, 1.0);
        self
    }

    pub fn line_tolerance(mut self, pts: f64) -> Self {
        self.config.line_tolerance = pts.max(0.0);
        self
    }

    pub fn text_merge_gap(mut self, pts: f64) -> Self {
        self.config.text_merge_gap = pts.max(0.0);
        self
    }

    pub fn flat_images_per_page_estimate(mut self, n: u32) -> Self {
        self.config.flat_images_per_page_estimate = n;
        self
    }

    pub fn concurrency(mut self, n: usize) -> Self {
        self.config.concurrency = n.max(1);
        self
    }

    /// Build the configuration, validating cross-field constraints.
    pub fn build(self) -> Result<ExtractorConfig, ExtractError> {
        let c = &self.config;
        if c.min_image_dimension > c.max_image_dimension {
            return Err(ExtractError::InvalidConfig(format!(
                "min_image_dimension ({}) exceeds max_image_dimension ({})",
                c.min_image_dimension, c.max_image_dimension
            )));
        }
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_consistent() {
        let c = ExtractorConfig::default();
        assert!(c.min_image_dimension <= c.max_image_dimension);
        assert!(c.corruption_threshold > 0.0 && c.corruption_threshold < 1.0);
        assert_eq!(c.max_pages_per_request, 10);
    }

    #[test]
    fn builder_clamps_dpi() {
        let c = ExtractorConfig::builder().page_image_dpi(1000).build().unwrap();
        assert_eq!(c.page_image_dpi, 300);
        let c = ExtractorConfig::builder().page_image_dpi(10).build().unwrap();
        assert_eq!(c.page_image_dpi, 50);
    }

    #[test]
    fn builder_rejects_inverted_image_bounds() {
        let err = ExtractorConfig::builder()
            .min_image_dimension(5000)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("min_image_dimension"));
    }
}
