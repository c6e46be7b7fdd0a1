//! Artificial transparency-checkerboard detection and removal.
//!
//! Some generators cannot emit true alpha and instead paint the editor-style
//! two-color checkerboard where transparency was requested. The pattern is
//! hypothesized from corner-block color frequencies and, when confirmed,
//! converted back to real alpha.

use image::{Rgb, RgbaImage};

use crate::background::{self, CORNER_BLOCK_INSET, CORNER_BLOCK_SIZE};
use crate::blending;
use crate::error::Result;
use crate::extract::AlphaExtractor;

/// Minimum share of sampled pixels each checkerboard color must cover.
const MIN_COLOR_COVERAGE: f32 = 0.25;

/// Minimum joint share of sampled pixels both colors must cover.
const MIN_JOINT_COVERAGE: f32 = 0.80;

/// Checkerboard-pattern detector.
#[derive(Debug, Clone, Copy)]
pub struct CheckerboardDetect {
    /// Maximum RGB distance to either checkerboard color for removal.
    pub tolerance: f32,
}

impl Default for CheckerboardDetect {
    fn default() -> Self {
        Self { tolerance: 40.0 }
    }
}

impl CheckerboardDetect {
    /// Create a detector with the given removal tolerance.
    #[must_use]
    pub fn new(tolerance: f32) -> Self {
        Self { tolerance }
    }
}

impl AlphaExtractor for CheckerboardDetect {
    type Report = Option<(Rgb<u8>, Rgb<u8>)>;

    /// Detect and remove a two-color checkerboard background.
    ///
    /// Returns the detected color pair, or `None` when no pattern is found
    /// — a normal outcome, not an error. The image is only mutated on a
    /// confirmed detection.
    ///
    /// # Errors
    ///
    /// Infallible; the `Result` is part of the shared extractor seam.
    fn extract(&self, image: &mut RgbaImage) -> Result<Self::Report> {
        let tally = background::corner_block_tally(image, CORNER_BLOCK_SIZE, CORNER_BLOCK_INSET);
        if tally.sampled == 0 || tally.entries.len() < 2 {
            return Ok(None);
        }

        #[allow(clippy::cast_precision_loss)]
        let sampled = tally.sampled as f32;
        let (first, first_count) = tally.entries[0];
        let (second, second_count) = tally.entries[1];
        #[allow(clippy::cast_precision_loss)]
        let first_share = first_count as f32 / sampled;
        #[allow(clippy::cast_precision_loss)]
        let second_share = second_count as f32 / sampled;

        if first_share < MIN_COLOR_COVERAGE
            || second_share < MIN_COLOR_COVERAGE
            || first_share + second_share < MIN_JOINT_COVERAGE
        {
            log::debug!(
                "checkerboard: no pattern (shares {:.0}% + {:.0}%)",
                first_share * 100.0,
                second_share * 100.0
            );
            return Ok(None);
        }

        for px in image.pixels_mut() {
            let color = Rgb([px[0], px[1], px[2]]);
            if blending::color_distance(color, first) < self.tolerance
                || blending::color_distance(color, second) < self.tolerance
            {
                px[3] = 0;
            }
        }
        log::debug!("checkerboard: detected {first:?} / {second:?}");
        Ok(Some((first, second)))
    }
}
