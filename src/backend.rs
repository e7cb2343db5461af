//! The collaborator boundary: raw per-page artifacts and the backend trait.
//!
//! This crate deliberately does **not** parse PDFs. Glyph decoding, font table
//! resolution, and page rasterisation belong to an external engine; everything
//! it hands us is modelled here as plain data. The [`PageBackend`] trait is
//! the only seam between that engine and the decision/assembly pipeline, so
//! tests can drive the whole pipeline from an in-memory fixture and a real
//! deployment can plug in pdfium, a pdfplumber-style parser, or anything else
//! that can produce positioned spans, cell grids, and raster bytes.

use thiserror::Error;

/// Axis-aligned bounding box in page coordinate space (points, origin top-left).
///
/// `top` grows downward, matching the convention of every PDF text extractor
/// we consume: smaller `top` means higher on the page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub top: f64,
    pub x1: f64,
    pub bottom: f64,
}

impl BBox {
    pub fn new(x0: f64, top: f64, x1: f64, bottom: f64) -> Self {
        Self { x0, top, x1, bottom }
    }

    /// Vertical center, used by the header/footer band filter.
    pub fn v_center(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

/// One extracted text run with its position.
#[derive(Debug, Clone)]
pub struct TextSpan {
    pub bbox: BBox,
    pub text: String,
}

/// A detected table: its position and the grid of cell strings.
///
/// `None` cells are empty or merged-away cells; the markdown serializer
/// forward-fills them column-wise.
#[derive(Debug, Clone)]
pub struct TableRegion {
    pub bbox: BBox,
    pub rows: Vec<Vec<Option<String>>>,
}

/// Pixel format of an embedded raster image as handed over by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

/// An embedded raster image: placement on the page plus the encoded pixels.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bbox: BBox,
    /// Pixel width of the decoded image (not the display width on the page).
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
    pub format: RasterFormat,
}

/// Everything the parsing engine extracted from one page.
///
/// Artifact vectors preserve the backend's extraction order; the assembler
/// relies on that order as the tie-breaker for items at identical positions.
#[derive(Debug, Clone, Default)]
pub struct RawPageArtifacts {
    /// Page width in points.
    pub page_width: f64,
    /// Page height in points.
    pub page_height: f64,
    pub spans: Vec<TextSpan>,
    pub tables: Vec<TableRegion>,
    pub images: Vec<RawImage>,
    /// Number of decode warnings the backend emitted while extracting this
    /// page (unmapped glyphs, dangling object references). Three or more is
    /// treated as a corruption signal in its own right.
    pub decode_warnings: u32,
}

/// A full-page raster rendered by the backend at a requested DPI.
#[derive(Debug, Clone)]
pub struct PageRaster {
    pub width: u32,
    pub height: u32,
    /// Tightly packed RGB8 pixels, row-major, `width * height * 3` bytes.
    pub pixels: Vec<u8>,
}

/// Errors surfaced by a [`PageBackend`] implementation.
///
/// Document-level failures abort the request; page-level failures are
/// contained to the page that raised them.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("document not found: {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("not a valid document: {0}")]
    InvalidDocument(String),

    /// Extraction or rendering failed for a single page.
    #[error("page {page}: {detail}")]
    PageFailed { page: u32, detail: String },
}

/// The PDF parsing/rendering engine, seen from this crate's side.
///
/// Implementations must be cheap to query for `page_count` and `image_count`
/// — both run inside the pagination gate before any heavy work is allowed to
/// start. `artifacts` and `render_page` may be arbitrarily expensive; the
/// pipeline calls them from a blocking task.
pub trait PageBackend: Send + Sync {
    /// Total number of pages in the document.
    fn page_count(&self) -> Result<u32, BackendError>;

    /// Extract all artifacts for one page (1-based).
    fn artifacts(&self, page: u32) -> Result<RawPageArtifacts, BackendError>;

    /// Number of embedded images on a page, without decoding them.
    ///
    /// Used by the pagination gate for the image-count cap pre-scan.
    fn image_count(&self, page: u32) -> Result<u32, BackendError>;

    /// Render the full page as an RGB bitmap at the given DPI.
    fn render_page(&self, page: u32, dpi: u32) -> Result<PageRaster, BackendError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v_center_is_midpoint() {
        let b = BBox::new(0.0, 10.0, 100.0, 30.0);
        assert_eq!(b.v_center(), 20.0);
    }
}
