//! Hard chroma-key background removal.
//!
//! Used when the generator is instructed to render a pure, saturated key
//! color behind a hard-edged subject. Matching pixels drop straight to
//! alpha 0; there is no graduated edge and no decontamination.

use image::RgbaImage;

use crate::error::Result;
use crate::extract::AlphaExtractor;

/// Key color convention the generator was instructed to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyColor {
    /// Saturated green screen.
    Green,
    /// Near-pure white.
    White,
}

impl KeyColor {
    /// Whether an RGB triple reads as this key color.
    #[must_use]
    pub fn matches(self, r: u8, g: u8, b: u8) -> bool {
        match self {
            KeyColor::Green => {
                u16::from(g) > u16::from(r) + 30 && u16::from(g) > u16::from(b) + 30 && g > 100
            }
            KeyColor::White => r > 240 && g > 240 && b > 240,
        }
    }
}

/// Hard chroma key against a single key color.
#[derive(Debug, Clone, Copy)]
pub struct ChromaKey {
    /// The key color to remove.
    pub key: KeyColor,
}

impl ChromaKey {
    /// Key out the given color.
    #[must_use]
    pub fn new(key: KeyColor) -> Self {
        Self { key }
    }
}

impl AlphaExtractor for ChromaKey {
    type Report = ();

    /// Zero the alpha of every pixel matching the key color.
    ///
    /// # Errors
    ///
    /// Infallible; the `Result` is part of the shared extractor seam.
    fn extract(&self, image: &mut RgbaImage) -> Result<()> {
        let mut keyed = 0usize;
        for px in image.pixels_mut() {
            if self.key.matches(px[0], px[1], px[2]) {
                px[3] = 0;
                keyed += 1;
            }
        }
        log::debug!("chroma key {:?}: {keyed} pixels keyed out", self.key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn run(key: KeyColor, rgb: [u8; 3]) -> u8 {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([rgb[0], rgb[1], rgb[2], 255]));
        ChromaKey::new(key).extract(&mut img).unwrap();
        img.get_pixel(0, 0)[3]
    }

    #[test]
    fn pure_green_is_keyed_out() {
        assert_eq!(run(KeyColor::Green, [0, 255, 0]), 0);
    }

    #[test]
    fn dark_pixel_is_unaffected_by_green_key() {
        assert_eq!(run(KeyColor::Green, [10, 10, 10]), 255);
    }

    #[test]
    fn mid_green_passes_all_three_rules() {
        // G=150 > R+30, > B+30, > 100
        assert_eq!(run(KeyColor::Green, [0, 150, 0]), 0);
    }

    #[test]
    fn dim_green_fails_the_brightness_rule() {
        // G=90 clears the margins but not G > 100
        assert_eq!(run(KeyColor::Green, [0, 90, 0]), 255);
    }

    #[test]
    fn saturated_green_margin_is_strict() {
        // G exceeds R by exactly 30: not keyed
        assert_eq!(run(KeyColor::Green, [120, 150, 0]), 255);
    }

    #[test]
    fn white_key_requires_all_channels_bright() {
        assert_eq!(run(KeyColor::White, [255, 255, 255]), 0);
        assert_eq!(run(KeyColor::White, [241, 241, 241]), 0);
        assert_eq!(run(KeyColor::White, [240, 255, 255]), 255);
        assert_eq!(run(KeyColor::White, [200, 200, 200]), 255);
    }

    #[test]
    fn bright_green_near_255_does_not_overflow_margin_check() {
        // R=250: G=255 is not > 280, must stay opaque rather than wrap
        assert_eq!(run(KeyColor::Green, [250, 255, 250]), 255);
    }
}
