//! The alpha extraction seam shared by all matting strategies.
//!
//! Each strategy turns an opaque render into a transparent asset in place.
//! Strategies are peers, selected explicitly by the caller per asset type:
//! no dispatch table, no string keys, adding a strategy is additive.

use image::{Rgb, RgbaImage};

use crate::error::Result;

/// A per-pixel alpha extraction strategy.
///
/// `extract` mutates the image in place and returns a strategy-specific
/// report. A strategy that fails must leave the buffer untouched; partial
/// mutation is never visible to the caller.
pub trait AlphaExtractor {
    /// Strategy-specific summary returned on success.
    type Report;

    /// Compute per-pixel alpha (and where relevant, decontaminated color)
    /// in place.
    ///
    /// # Errors
    ///
    /// Strategy-specific; see each implementation.
    fn extract(&self, image: &mut RgbaImage) -> Result<Self::Report>;
}

/// Which background convention an asset was rendered against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackgroundKind {
    /// Rendered over the dark reference background.
    Dark,
    /// Rendered over the light reference background.
    Light,
}

/// Distance thresholds for uniform background matting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatteThresholds {
    /// At or below this distance from the background a pixel is fully
    /// transparent.
    pub bg_threshold: f32,
    /// At or above this distance a pixel is fully opaque.
    pub fg_threshold: f32,
}

impl Default for MatteThresholds {
    fn default() -> Self {
        Self {
            bg_threshold: 15.0,
            fg_threshold: 80.0,
        }
    }
}

/// Statistics from uniform alpha matte processing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlphaMatteStats {
    /// Background color detected from the image corners.
    pub actual_bg: Rgb<u8>,
    /// Percentage of pixels made fully transparent.
    pub transparent_pct: f32,
    /// Percentage of edge pixels given graduated alpha.
    pub edges_pct: f32,
    /// Percentage of pixels left fully opaque.
    pub opaque_pct: f32,
}

/// Statistics from two-pass difference matting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DifferenceMatteStats {
    /// Percentage of pixels with alpha 0.
    pub transparent_pct: f32,
    /// Percentage of pixels with alpha strictly between 0 and 255.
    pub semi_transparent_pct: f32,
    /// Percentage of pixels with alpha 255.
    pub opaque_pct: f32,
}

/// Percentage of `count` over `total` pixels.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn pct(count: usize, total: usize) -> f32 {
    if total == 0 {
        0.0
    } else {
        count as f32 / total as f32 * 100.0
    }
}
