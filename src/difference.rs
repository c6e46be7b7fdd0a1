//! Two-pass difference matting over white and black backgrounds.
//!
//! The generator renders the identical foreground twice, composited over
//! pure white and pure black. A pixel's alpha follows directly from how far
//! the two observations drift apart, and the black-composited sample
//! un-premultiplies to the exact foreground color with no contamination
//! term to subtract.

use image::{Rgb, RgbaImage};

use crate::blending::{self, EDGE_NOISE_FLOOR, MAX_RGB_DISTANCE};
use crate::error::{Error, Result};
use crate::extract::{pct, AlphaExtractor, DifferenceMatteStats};

/// Difference matte holding the white-composited reference render.
///
/// `extract` is applied to the black-composited render, which is rewritten
/// in place into the recovered transparent asset.
#[derive(Debug, Clone)]
pub struct DifferenceMatte {
    white: RgbaImage,
}

impl DifferenceMatte {
    /// Capture the white-composited reference render.
    #[must_use]
    pub fn with_white_reference(white: RgbaImage) -> Self {
        Self { white }
    }
}

impl AlphaExtractor for DifferenceMatte {
    type Report = DifferenceMatteStats;

    /// Recover alpha and true foreground color from the render pair.
    ///
    /// For each pixel: `alpha = clamp(1 - |white - black| / sqrt(3*255^2))`,
    /// and color = `black / alpha` (clamped) when alpha is above the noise
    /// floor, else black.
    ///
    /// # Errors
    ///
    /// [`Error::DimensionMismatch`] if the two renders differ in size. The
    /// check runs before any pixel is written, so a failed call leaves the
    /// image untouched.
    fn extract(&self, image: &mut RgbaImage) -> Result<Self::Report> {
        let (ww, wh) = self.white.dimensions();
        let (bw, bh) = image.dimensions();
        if (ww, wh) != (bw, bh) {
            return Err(Error::DimensionMismatch {
                white_w: ww,
                white_h: wh,
                black_w: bw,
                black_h: bh,
            });
        }

        let mut transparent = 0usize;
        let mut semi = 0usize;
        let mut opaque = 0usize;

        for (white_px, black_px) in self.white.pixels().zip(image.pixels_mut()) {
            let white = Rgb([white_px[0], white_px[1], white_px[2]]);
            let black = Rgb([black_px[0], black_px[1], black_px[2]]);

            let pixel_dist = blending::color_distance(white, black);
            let alpha = (1.0 - pixel_dist / MAX_RGB_DISTANCE).clamp(0.0, 1.0);

            let color = if alpha > EDGE_NOISE_FLOOR {
                blending::unpremultiply(black, alpha)
            } else {
                Rgb([0, 0, 0])
            };

            let alpha_byte = blending::clamp_channel(alpha * 255.0);
            match alpha_byte {
                0 => transparent += 1,
                255 => opaque += 1,
                _ => semi += 1,
            }
            black_px.0 = [color[0], color[1], color[2], alpha_byte];
        }

        let total = (bw as usize) * (bh as usize);
        let stats = DifferenceMatteStats {
            transparent_pct: pct(transparent, total),
            semi_transparent_pct: pct(semi, total),
            opaque_pct: pct(opaque, total),
        };
        log::debug!(
            "difference matte: {:.1}% transparent / {:.1}% semi / {:.1}% opaque",
            stats.transparent_pct,
            stats.semi_transparent_pct,
            stats.opaque_pct
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mismatched_dimensions_fail_before_mutation() {
        let white = RgbaImage::new(4, 4);
        let mut black = RgbaImage::from_pixel(4, 5, Rgba([9, 9, 9, 255]));
        let before = black.clone();

        let err = DifferenceMatte::with_white_reference(white)
            .extract(&mut black)
            .unwrap_err();
        assert!(matches!(err, Error::DimensionMismatch { .. }));
        assert_eq!(black, before, "failed call must not touch the buffer");
    }

    #[test]
    fn identical_composites_yield_full_alpha_and_exact_color() {
        // An alpha=1 foreground composites identically over both backgrounds
        let fg = Rgba([120, 200, 40, 255]);
        let white = RgbaImage::from_pixel(6, 6, fg);
        let mut black = RgbaImage::from_pixel(6, 6, fg);

        let stats = DifferenceMatte::with_white_reference(white)
            .extract(&mut black)
            .unwrap();

        assert!((stats.opaque_pct - 100.0).abs() < f32::EPSILON);
        for px in black.pixels() {
            assert_eq!(px.0, [120, 200, 40, 255]);
        }
    }

    #[test]
    fn pure_background_pixel_yields_zero_alpha() {
        let white = RgbaImage::from_pixel(3, 3, Rgba([255, 255, 255, 255]));
        let mut black = RgbaImage::from_pixel(3, 3, Rgba([0, 0, 0, 255]));

        let stats = DifferenceMatte::with_white_reference(white)
            .extract(&mut black)
            .unwrap();

        assert!((stats.transparent_pct - 100.0).abs() < f32::EPSILON);
        for px in black.pixels() {
            assert_eq!(px.0, [0, 0, 0, 0]);
        }
    }

    #[test]
    fn half_transparent_gray_recovers_foreground() {
        // fg = (200, 100, 50) at alpha 0.5:
        // over black -> (100, 50, 25); over white -> (227, 177, 152)
        let white = RgbaImage::from_pixel(2, 2, Rgba([227, 177, 152, 255]));
        let mut black = RgbaImage::from_pixel(2, 2, Rgba([100, 50, 25, 255]));

        let stats = DifferenceMatte::with_white_reference(white)
            .extract(&mut black)
            .unwrap();

        assert!((stats.semi_transparent_pct - 100.0).abs() < f32::EPSILON);
        let px = black.get_pixel(0, 0);
        let alpha = f32::from(px[3]) / 255.0;
        assert!((alpha - 0.5).abs() < 0.02, "expected ~0.5 alpha, got {alpha}");
        for (ch, expected) in [200i32, 100, 50].into_iter().enumerate() {
            let diff = (i32::from(px[ch]) - expected).abs();
            assert!(diff <= 6, "channel {ch}: {} vs {expected}", px[ch]);
        }
    }
}
