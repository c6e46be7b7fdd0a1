//! Geometric normalization to exact target dimensions.
//!
//! Generators honor aspect ratio hints only approximately; every asset is
//! therefore resampled to its exact target size before matting. Resampling
//! uses a Lanczos3 kernel. No cropping, no letterboxing — callers request
//! the correct aspect ratio from the generator.

use std::path::Path;

use image::imageops::FilterType;
use image::{imageops, DynamicImage, GenericImageView, RgbaImage};

use crate::error::Result;

/// Original and final dimensions of a normalization call.
///
/// Equal dimensions are the explicit no-op signal: the image was already at
/// target size and the buffer was not resampled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeReport {
    /// Dimensions before normalization.
    pub original: (u32, u32),
    /// Dimensions after normalization (always the requested target).
    pub resized: (u32, u32),
}

impl ResizeReport {
    /// Whether the image was actually resampled.
    #[must_use]
    pub fn was_resized(&self) -> bool {
        self.original != self.resized
    }
}

/// Resize an image to exactly `target_w` x `target_h`.
///
/// Returns the image unchanged (same buffer, byte for byte) when it is
/// already at the target size; otherwise performs a single Lanczos3
/// resampling pass.
#[must_use]
pub fn normalize(image: RgbaImage, target_w: u32, target_h: u32) -> (RgbaImage, ResizeReport) {
    let original = image.dimensions();
    if original == (target_w, target_h) {
        let report = ResizeReport {
            original,
            resized: original,
        };
        return (image, report);
    }

    let resized = imageops::resize(&image, target_w, target_h, FilterType::Lanczos3);
    log::debug!(
        "resized {}x{} -> {target_w}x{target_h}",
        original.0,
        original.1
    );
    (
        resized,
        ResizeReport {
            original,
            resized: (target_w, target_h),
        },
    )
}

/// Resize an image file in place to exactly `target_w` x `target_h`.
///
/// The resized buffer is re-encoded as PNG to the same path. When the file
/// is already at the target size nothing is written.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the file cannot be decoded, or an
/// I/O / encode error if persisting the result fails.
pub fn normalize_file(path: &Path, target_w: u32, target_h: u32) -> Result<ResizeReport> {
    let decoded = image::open(path).map_err(crate::Error::Decode)?;
    let original = decoded.dimensions();
    if original == (target_w, target_h) {
        return Ok(ResizeReport {
            original,
            resized: original,
        });
    }

    let (resized, report) = normalize(decoded.to_rgba8(), target_w, target_h);
    DynamicImage::ImageRgba8(resized).save_with_format(path, image::ImageFormat::Png)?;
    Ok(report)
}

/// Read the dimensions of an image file without decoding pixel data.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the file cannot be probed.
pub fn image_dimensions(path: &Path) -> Result<(u32, u32)> {
    image::image_dimensions(path).map_err(crate::Error::Decode)
}

/// Whether an image file carries an alpha channel.
///
/// # Errors
///
/// Returns [`crate::Error::Decode`] if the file cannot be decoded.
pub fn has_alpha_file(path: &Path) -> Result<bool> {
    let decoded = image::open(path).map_err(crate::Error::Decode)?;
    Ok(decoded.color().has_alpha())
}
