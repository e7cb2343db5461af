//! The extraction request: what to read and how.

use crate::config::ExtractorConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Content extraction mode for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMode {
    /// Extract text/tables/images; fall back to a page image only when the
    /// page's text is assessed as corrupted. (default)
    #[default]
    Auto,
    /// Extract text/tables only; never fall back to a page image even when
    /// the text is corrupted (corruption is still recorded).
    TextOnly,
    /// Skip text extraction entirely and provide full-page images. For
    /// scanned documents with no usable text layer.
    ImageOnly,
}

/// One extraction request. Immutable once validated.
///
/// `start_page`/`end_page` are 1-based and inclusive; `end_page = None` means
/// the last page of the document. Values unrelated to the range are clamped
/// to safe bounds during [`validated`](ExtractionRequest::validated) rather
/// than rejected, matching how the configuration builder treats its knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Document identity. Opening and reading the file is the backend's job;
    /// the pipeline treats this as an opaque identifier for logs and output.
    pub file_path: PathBuf,
    pub start_page: u32,
    pub end_page: Option<u32>,
    pub extraction_mode: ExtractionMode,
    /// Drop embedded images in the header/footer bands and white those bands
    /// out of page rasters. Default: true.
    pub filter_header_footer: bool,
    /// Downscale surviving images to `max_image_dimension`. Default: true.
    pub crop_images: bool,
    /// Maximum output image dimension in pixels (28–4096).
    pub max_image_dimension: u32,
    /// DPI for full-page raster rendering (50–300).
    pub page_image_dpi: u32,
}

impl ExtractionRequest {
    /// A request for the whole document with configuration defaults.
    pub fn new(file_path: impl Into<PathBuf>, config: &ExtractorConfig) -> Self {
        Self {
            file_path: file_path.into(),
            start_page: 1,
            end_page: None,
            extraction_mode: ExtractionMode::default(),
            filter_header_footer: true,
            crop_images: true,
            max_image_dimension: config.max_image_dimension,
            page_image_dpi: config.page_image_dpi,
        }
    }

    pub fn pages(mut self, start: u32, end: u32) -> Self {
        self.start_page = start;
        self.end_page = Some(end);
        self
    }

    pub fn mode(mut self, mode: ExtractionMode) -> Self {
        self.extraction_mode = mode;
        self
    }

    pub fn filter_header_footer(mut self, v: bool) -> Self {
        self.filter_header_footer = v;
        self
    }

    pub fn crop_images(mut self, v: bool) -> Self {
        self.crop_images = v;
        self
    }

    pub fn max_image_dimension(mut self, px: u32) -> Self {
        self.max_image_dimension = px;
        self
    }

    pub fn page_image_dpi(mut self, dpi: u32) -> Self {
        self.page_image_dpi = dpi;
        self
    }

    /// Clamp tunables to their documented bounds. Range validity against the
    /// actual document is the pagination gate's job, not this function's.
    pub(crate) fn validated(mut self) -> Self {
        self.start_page = self.start_page.max(1);
        self.max_image_dimension = self.max_image_dimension.clamp(28, 4096);
        self.page_image_dpi = self.page_image_dpi.clamp(50, 300);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_come_from_config() {
        let config = ExtractorConfig::default();
        let req = ExtractionRequest::new("doc.pdf", &config);
        assert_eq!(req.start_page, 1);
        assert_eq!(req.end_page, None);
        assert_eq!(req.extraction_mode, ExtractionMode::Auto);
        assert!(req.filter_header_footer);
        assert_eq!(req.max_image_dimension, config.max_image_dimension);
    }

    #[test]
    fn validated_clamps_out_of_bounds_values() {
        let config = ExtractorConfig::default();
        let req = ExtractionRequest::new("doc.pdf", &config)
            .max_image_dimension(9999)
            .page_image_dpi(20);
        let req = req.validated();
        assert_eq!(req.max_image_dimension, 4096);
        assert_eq!(req.page_image_dpi, 50);
    }

    #[test]
    fn mode_serializes_snake_case() {
        let json = serde_json::to_string(&ExtractionMode::ImageOnly).unwrap();
        assert_eq!(json, "\"image_only\"");
    }
}
