//! Background color classification via corner sampling.
//!
//! Generators are instructed to render the subject centered on a solid
//! background, so the image corners are assumed to lie outside the subject.
//! The dominant corner color is taken as ground truth for the extraction
//! strategies that do not receive the background as an explicit parameter.

use image::{Rgb, RgbaImage};

/// Side length of the corner blocks sampled by [`corner_block_tally`].
pub const CORNER_BLOCK_SIZE: u32 = 64;

/// Inset applied to corner blocks, skipping border artifacts.
pub const CORNER_BLOCK_INSET: u32 = 5;

/// The four corner colors of an image and the plurality winner among them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackgroundSample {
    /// Corner colors in encounter order: top-left, top-right, bottom-left,
    /// bottom-right.
    pub corners: [Rgb<u8>; 4],
    /// The most frequent corner color (ties broken by encounter order).
    pub dominant: Rgb<u8>,
}

/// Color frequency tally over the corner blocks of an image.
///
/// Entries are sorted most-frequent first; among equal counts the color seen
/// first wins, keeping the ordering deterministic.
#[derive(Debug, Clone)]
pub struct ColorTally {
    /// Distinct colors with their occurrence counts, most frequent first.
    pub entries: Vec<(Rgb<u8>, usize)>,
    /// Total number of pixels sampled.
    pub sampled: usize,
}

/// Detect the dominant background color from the four corner pixels.
#[must_use]
pub fn detect_background(image: &RgbaImage) -> Rgb<u8> {
    sample_background(image).dominant
}

/// Sample the four corner pixels and vote for the dominant background color.
#[must_use]
pub fn sample_background(image: &RgbaImage) -> BackgroundSample {
    let (w, h) = image.dimensions();
    let corner = |x: u32, y: u32| -> Rgb<u8> {
        let px = image.get_pixel(x, y);
        Rgb([px[0], px[1], px[2]])
    };
    let corners = [
        corner(0, 0),
        corner(w - 1, 0),
        corner(0, h - 1),
        corner(w - 1, h - 1),
    ];

    let mut dominant = corners[0];
    let mut best = 0usize;
    for (i, candidate) in corners.iter().enumerate() {
        let count = corners.iter().filter(|c| *c == candidate).count();
        // Strict > keeps the first-encountered color on ties
        if count > best {
            best = count;
            dominant = corners[i];
        }
    }

    BackgroundSample { corners, dominant }
}

/// Tally color frequencies over four corner blocks.
///
/// Samples up to `block` x `block` pixels at each corner, inset by `inset`
/// from the image edges. Blocks are clamped to the image interior, so small
/// images yield fewer samples rather than panicking; an image too small to
/// produce any sample yields an empty tally.
#[must_use]
pub fn corner_block_tally(image: &RgbaImage, block: u32, inset: u32) -> ColorTally {
    let (w, h) = image.dimensions();
    if w <= inset * 2 || h <= inset * 2 {
        return ColorTally {
            entries: Vec::new(),
            sampled: 0,
        };
    }

    let span_w = block.min(w - inset * 2);
    let span_h = block.min(h - inset * 2);
    let origins = [
        (inset, inset),
        (w - inset - span_w, inset),
        (inset, h - inset - span_h),
        (w - inset - span_w, h - inset - span_h),
    ];

    // first-seen index rides along for deterministic tie ordering
    let mut counts: std::collections::HashMap<[u8; 3], (usize, usize)> =
        std::collections::HashMap::new();
    let mut sampled = 0usize;
    let mut next_seen = 0usize;

    for (ox, oy) in origins {
        for y in oy..oy + span_h {
            for x in ox..ox + span_w {
                let px = image.get_pixel(x, y);
                let key = [px[0], px[1], px[2]];
                let entry = counts.entry(key).or_insert_with(|| {
                    let seen = next_seen;
                    next_seen += 1;
                    (seen, 0)
                });
                entry.1 += 1;
                sampled += 1;
            }
        }
    }

    let mut entries: Vec<(usize, Rgb<u8>, usize)> = counts
        .into_iter()
        .map(|(color, (seen, count))| (seen, Rgb(color), count))
        .collect();
    entries.sort_by(|a, b| b.2.cmp(&a.2).then(a.0.cmp(&b.0)));

    ColorTally {
        entries: entries.into_iter().map(|(_, color, count)| (color, count)).collect(),
        sampled,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(w: u32, h: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(w, h, Rgba(color))
    }

    #[test]
    fn uniform_image_detects_its_own_color() {
        let img = solid(16, 16, [37, 40, 59, 255]);
        assert_eq!(detect_background(&img), Rgb([37, 40, 59]));
    }

    #[test]
    fn plurality_wins_over_single_outlier() {
        let mut img = solid(16, 16, [255, 255, 255, 255]);
        // One corner belongs to the subject
        img.put_pixel(15, 15, Rgba([10, 10, 10, 255]));
        assert_eq!(detect_background(&img), Rgb([255, 255, 255]));
    }

    #[test]
    fn two_two_tie_breaks_by_encounter_order() {
        let mut img = solid(8, 8, [0, 200, 0, 255]);
        img.put_pixel(0, 7, Rgba([200, 0, 0, 255]));
        img.put_pixel(7, 7, Rgba([200, 0, 0, 255]));
        // top-left and top-right are green, bottom corners red: green seen first
        assert_eq!(detect_background(&img), Rgb([0, 200, 0]));
    }

    #[test]
    fn sample_background_reports_corner_colors() {
        let mut img = solid(8, 8, [1, 2, 3, 255]);
        img.put_pixel(7, 0, Rgba([4, 5, 6, 255]));
        let sample = sample_background(&img);
        assert_eq!(sample.corners[0], Rgb([1, 2, 3]));
        assert_eq!(sample.corners[1], Rgb([4, 5, 6]));
        assert_eq!(sample.dominant, Rgb([1, 2, 3]));
    }

    #[test]
    fn tally_counts_every_sampled_pixel() {
        let img = solid(200, 200, [128, 128, 128, 255]);
        let tally = corner_block_tally(&img, CORNER_BLOCK_SIZE, CORNER_BLOCK_INSET);
        assert_eq!(tally.sampled, 4 * 64 * 64);
        assert_eq!(tally.entries.len(), 1);
        assert_eq!(tally.entries[0], (Rgb([128, 128, 128]), 4 * 64 * 64));
    }

    #[test]
    fn tally_orders_most_frequent_first() {
        // Left half dark, right half light: both colors land in corner blocks
        let mut img = solid(40, 40, [0, 0, 0, 255]);
        for y in 0..40 {
            for x in 20..40 {
                img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
            }
        }
        let tally = corner_block_tally(&img, CORNER_BLOCK_SIZE, CORNER_BLOCK_INSET);
        assert_eq!(tally.entries.len(), 2);
        assert!(tally.entries[0].1 >= tally.entries[1].1);
    }

    #[test]
    fn tally_on_tiny_image_is_empty_not_panicking() {
        let img = solid(8, 8, [9, 9, 9, 255]);
        let tally = corner_block_tally(&img, CORNER_BLOCK_SIZE, CORNER_BLOCK_INSET);
        // 8x8 with 5px inset leaves no interior to sample
        assert_eq!(tally.sampled, 0);
        assert!(tally.entries.is_empty());
    }
}
