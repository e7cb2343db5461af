//! Image filtering, rescaling, and page-raster processing.
//!
//! ## Two pipelines, one module
//!
//! Embedded images go through exclusion predicates and an optional downscale;
//! full-page rasters (the image-only/fallback path) are rendered by the
//! backend at the request DPI and only get band white-out, a downscale, and
//! JPEG encoding here. Both are pure functions of their inputs — the only
//! output is transformed bytes.
//!
//! ## Why exclusion, not flagging?
//!
//! A dropped image never appears anywhere in the output. Decorative glyphs,
//! divider rules, and header/footer furniture cost vision tokens and carry no
//! meaning; marking them "decorative" would still make the consumer pay for
//! the bytes.

use crate::backend::{PageRaster, RawImage};
use crate::config::ExtractorConfig;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use tracing::{debug, warn};

/// Per-request switches for the image pipeline, split off the request so the
/// filter functions do not need to see the whole request.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptions {
    pub filter_header_footer: bool,
    pub crop_images: bool,
    pub max_image_dimension: u32,
}

/// An embedded image that survived filtering, encoded and ready for output.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    /// Top coordinate on the page, for reading-order placement.
    pub top: f64,
    /// Left coordinate, for same-line ordering.
    pub left: f64,
    /// Base64-encoded PNG or JPEG bytes.
    pub content: String,
    pub width: u32,
    pub height: u32,
}

/// A processed full-page raster (base64 JPEG).
#[derive(Debug, Clone)]
pub struct PageImage {
    pub content: String,
    pub width: u32,
    pub height: u32,
}

/// Apply the exclusion predicates and, for survivors, the downscale.
///
/// Predicates are independent; an image is dropped as soon as any fires.
/// Extraction order of survivors is preserved.
pub fn filter_and_crop(
    images: &[RawImage],
    page_height: f64,
    opts: ImageOptions,
    config: &ExtractorConfig,
) -> Vec<ProcessedImage> {
    images
        .iter()
        .filter_map(|img| {
            if let Some(reason) = exclusion_reason(img, page_height, opts, config) {
                debug!(
                    "dropping {}x{} image at top={:.1}: {}",
                    img.width, img.height, img.bbox.top, reason
                );
                return None;
            }
            process_embedded(img, opts, config)
        })
        .collect()
}

/// Which predicate, if any, excludes this image.
fn exclusion_reason(
    img: &RawImage,
    page_height: f64,
    opts: ImageOptions,
    config: &ExtractorConfig,
) -> Option<&'static str> {
    // A zero dimension has no pixels to show.
    if img.width == 0 || img.height == 0 {
        return Some("degenerate dimensions");
    }

    // Decorative glyph / icon removal.
    if img.width < config.min_image_dimension && img.height < config.min_image_dimension {
        return Some("below minimum dimension");
    }

    // Rule / divider line removal. max_aspect_ratio = 0 disables the check.
    if config.max_aspect_ratio > 0.0 {
        let (long, short) = if img.width > img.height {
            (img.width as f64, img.height as f64)
        } else {
            (img.height as f64, img.width as f64)
        };
        if long / short > config.max_aspect_ratio {
            return Some("aspect ratio exceeds cutoff");
        }
    }

    // Header/footer band: judged by the vertical bbox center.
    if opts.filter_header_footer && page_height > 0.0 {
        let center = img.bbox.v_center();
        let band = page_height * config.header_footer_margin;
        if center <= band || center >= page_height - band {
            return Some("inside header/footer band");
        }
    }

    None
}

/// Decode, optionally downscale, re-encode, and base64 one surviving image.
///
/// A single downscale only — images already within `max_image_dimension` are
/// passed through with their original bytes, and nothing is ever upscaled
/// past its source resolution.
fn process_embedded(
    img: &RawImage,
    opts: ImageOptions,
    config: &ExtractorConfig,
) -> Option<ProcessedImage> {
    let needs_downscale = opts.crop_images
        && (img.width > opts.max_image_dimension || img.height > opts.max_image_dimension);

    if !needs_downscale {
        return Some(ProcessedImage {
            top: img.bbox.top,
            left: img.bbox.x0,
            content: STANDARD.encode(&img.bytes),
            width: img.width,
            height: img.height,
        });
    }

    let decoded = match image::load_from_memory(&img.bytes) {
        Ok(d) => d,
        Err(e) => {
            // Undecodable but already within the predicates: pass the
            // original bytes through rather than losing the image.
            warn!("image decode failed, passing through unscaled: {e}");
            return Some(ProcessedImage {
                top: img.bbox.top,
                left: img.bbox.x0,
                content: STANDARD.encode(&img.bytes),
                width: img.width,
                height: img.height,
            });
        }
    };

    let resized = decoded.resize(
        opts.max_image_dimension,
        opts.max_image_dimension,
        FilterType::Lanczos3,
    );
    let (w, h) = (resized.width(), resized.height());

    let bytes = match img.format {
        crate::backend::RasterFormat::Jpeg => encode_jpeg(&resized, config.jpeg_quality),
        crate::backend::RasterFormat::Png => encode_png(&resized),
    };
    match bytes {
        Ok(bytes) => Some(ProcessedImage {
            top: img.bbox.top,
            left: img.bbox.x0,
            content: STANDARD.encode(&bytes),
            width: w,
            height: h,
        }),
        Err(e) => {
            warn!("image re-encode failed, dropping: {e}");
            None
        }
    }
}

/// Process a full-page raster for the image-only/fallback path.
///
/// Band white-out happens before the downscale so the margin fractions apply
/// in the raster's own coordinate space.
pub fn process_page_raster(
    raster: PageRaster,
    opts: ImageOptions,
    config: &ExtractorConfig,
) -> Result<PageImage, image::ImageError> {
    // A buffer that does not match width*height*3 is a broken backend
    // contract; fail the page rather than serving a blank raster as content.
    let mut rgb = RgbImage::from_raw(raster.width, raster.height, raster.pixels).ok_or_else(
        || {
            image::ImageError::Parameter(image::error::ParameterError::from_kind(
                image::error::ParameterErrorKind::DimensionMismatch,
            ))
        },
    )?;

    if opts.filter_header_footer {
        whiteout_bands(&mut rgb, config.header_footer_margin);
    }

    let mut img = DynamicImage::ImageRgb8(rgb);
    if img.width() > opts.max_image_dimension || img.height() > opts.max_image_dimension {
        img = img.resize(
            opts.max_image_dimension,
            opts.max_image_dimension,
            FilterType::Lanczos3,
        );
    }

    let bytes = encode_jpeg(&img, config.jpeg_quality)?;
    Ok(PageImage {
        content: STANDARD.encode(&bytes),
        width: img.width(),
        height: img.height(),
    })
}

/// Paint the top and bottom margin bands white, hiding page furniture from
/// the vision consumer.
fn whiteout_bands(img: &mut RgbImage, margin: f64) {
    let h = img.height();
    let band = (h as f64 * margin) as u32;
    let white = image::Rgb([255u8, 255, 255]);
    for y in (0..band).chain(h.saturating_sub(band)..h) {
        for x in 0..img.width() {
            img.put_pixel(x, y, white);
        }
    }
}

fn encode_jpeg(img: &DynamicImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    // JPEG has no alpha channel; flatten first.
    let rgb = DynamicImage::ImageRgb8(img.to_rgb8());
    let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buf, quality);
    rgb.write_with_encoder(encoder)?;
    Ok(buf)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}
