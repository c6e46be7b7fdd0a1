//! Uniform background subtraction with color decontamination.
//!
//! The workhorse strategy for logo renders: the generator is asked for a
//! solid background, the corners tell us what it actually delivered, and
//! every pixel is classified by its RGB distance to that color. Edge pixels
//! get graduated alpha and have the background's contribution removed from
//! their color.

use image::{Rgb, RgbaImage};

use crate::background;
use crate::blending::{self, EDGE_NOISE_FLOOR};
use crate::error::Result;
use crate::extract::{pct, AlphaExtractor, AlphaMatteStats, MatteThresholds};

/// Uniform background matte.
///
/// The detected corner background drives both classification and
/// decontamination; the nominal reference color the generator was asked for
/// lives in the pipeline configuration and is not consulted here.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformMatte {
    /// Transparent/opaque distance thresholds.
    pub thresholds: MatteThresholds,
}

impl UniformMatte {
    /// Create a matte with the given thresholds.
    #[must_use]
    pub fn new(thresholds: MatteThresholds) -> Self {
        Self { thresholds }
    }
}

impl AlphaExtractor for UniformMatte {
    type Report = AlphaMatteStats;

    /// Classify every pixel against the corner-detected background.
    ///
    /// - distance <= `bg_threshold`: alpha 0, color unchanged
    /// - distance >= `fg_threshold`: alpha 255, color unchanged
    /// - otherwise: graduated alpha with color decontamination
    ///
    /// # Errors
    ///
    /// Infallible for well-formed buffers; the `Result` is part of the
    /// shared extractor seam.
    fn extract(&self, image: &mut RgbaImage) -> Result<Self::Report> {
        let actual_bg = background::detect_background(image);
        let MatteThresholds {
            bg_threshold,
            fg_threshold,
        } = self.thresholds;
        let span = fg_threshold - bg_threshold;

        let mut fully_transparent = 0usize;
        let mut partially_transparent = 0usize;
        let mut fully_opaque = 0usize;

        for px in image.pixels_mut() {
            let color = Rgb([px[0], px[1], px[2]]);
            let dist = blending::color_distance(color, actual_bg);

            if dist <= bg_threshold {
                px[3] = 0;
                fully_transparent += 1;
            } else if dist >= fg_threshold {
                px[3] = 255;
                fully_opaque += 1;
            } else {
                let t = (dist - bg_threshold) / span;
                px[3] = blending::clamp_channel(t * 255.0);
                if t > EDGE_NOISE_FLOOR {
                    let recovered = blending::decontaminate(color, actual_bg, t);
                    px[0] = recovered[0];
                    px[1] = recovered[1];
                    px[2] = recovered[2];
                }
                partially_transparent += 1;
            }
        }

        let total = (image.width() * image.height()) as usize;
        let stats = AlphaMatteStats {
            actual_bg,
            transparent_pct: pct(fully_transparent, total),
            edges_pct: pct(partially_transparent, total),
            opaque_pct: pct(fully_opaque, total),
        };
        log::debug!(
            "uniform matte: bg {:?}, {:.1}% transparent / {:.1}% edge / {:.1}% opaque",
            stats.actual_bg,
            stats.transparent_pct,
            stats.edges_pct,
            stats.opaque_pct
        );
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn matte() -> UniformMatte {
        UniformMatte::default()
    }

    #[test]
    fn background_pixels_become_transparent_with_color_kept() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        let stats = matte().extract(&mut img).unwrap();

        assert_eq!(stats.actual_bg, Rgb([255, 255, 255]));
        assert!((stats.transparent_pct - 100.0).abs() < f32::EPSILON);
        for px in img.pixels() {
            assert_eq!(px.0, [255, 255, 255, 0]);
        }
    }

    #[test]
    fn foreground_pixels_stay_opaque_with_color_unchanged() {
        // White background with a dark center block well past fg_threshold
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([255, 255, 255, 255]));
        for y in 1..3 {
            for x in 1..3 {
                img.put_pixel(x, y, Rgba([10, 10, 10, 255]));
            }
        }

        let stats = matte().extract(&mut img).unwrap();
        assert_eq!(stats.actual_bg, Rgb([255, 255, 255]));
        for y in 1..3 {
            for x in 1..3 {
                assert_eq!(img.get_pixel(x, y).0, [10, 10, 10, 255]);
            }
        }
        assert!((stats.transparent_pct - 75.0).abs() < 0.01);
        assert!((stats.opaque_pct - 25.0).abs() < 0.01);
        assert!(stats.edges_pct.abs() < f32::EPSILON);
    }

    #[test]
    fn edge_pixel_gets_graduated_alpha_and_decontaminated_color() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([255, 255, 255, 255]));
        // Distance from white: sqrt(3 * 45^2) ~ 77.9, inside (15, 80)
        img.put_pixel(4, 4, Rgba([210, 210, 210, 255]));

        matte().extract(&mut img).unwrap();
        let px = img.get_pixel(4, 4);
        assert!(px[3] > 0 && px[3] < 255, "edge alpha, got {}", px[3]);
        // Decontamination pushes the mixed gray toward the true (darker) color
        assert!(px[0] < 210, "expected decontaminated channel, got {}", px[0]);
    }

    #[test]
    fn alpha_is_monotone_in_distance_between_thresholds() {
        let mut img = RgbaImage::from_pixel(8, 1, Rgba([255, 255, 255, 255]));
        // Increasingly distant grays across the edge band
        let grays = [250u8, 240, 230, 220, 210, 205];
        for (i, &g) in grays.iter().enumerate() {
            #[allow(clippy::cast_possible_truncation)]
            img.put_pixel(i as u32 + 1, 0, Rgba([g, g, g, 255]));
        }
        matte().extract(&mut img).unwrap();

        let mut last = 0u8;
        for i in 1..=grays.len() {
            #[allow(clippy::cast_possible_truncation)]
            let a = img.get_pixel(i as u32, 0)[3];
            assert!(a >= last, "alpha must not decrease with distance");
            last = a;
        }
    }
}
