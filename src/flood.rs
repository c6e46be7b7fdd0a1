//! Flood-fill plus erosion background removal.
//!
//! For imperfectly keyed renders where a single global threshold either
//! leaves fringe or eats the subject. Three passes:
//!
//! 1. flood fill from every border pixel, removing all border-connected
//!    background within `tolerance`;
//! 2. a global sweep at `0.6 * tolerance` catching background trapped
//!    inside concavities, plus a hue cleanup for green-dominant backgrounds;
//! 3. iterative erosion converging anti-aliased edge pixels toward full
//!    transparency without a single global threshold.

use std::collections::VecDeque;

use image::{Rgb, RgbaImage};

use crate::background;
use crate::blending;
use crate::error::Result;
use crate::extract::AlphaExtractor;

/// Factor applied to `tolerance` for the trapped-background sweep.
const SWEEP_TOLERANCE_FACTOR: f32 = 0.6;

/// Minimum green channel for the green-spill cleanup pass.
const GREEN_SPILL_FLOOR: u8 = 80;

/// Flood-fill-plus-erosion background removal.
#[derive(Debug, Clone, Copy)]
pub struct FloodErode {
    /// Maximum RGB distance to the detected background for removal.
    pub tolerance: f32,
    /// Upper bound on erosion rounds; each round stops early at a fixed
    /// point.
    pub erosion_passes: u32,
}

impl Default for FloodErode {
    fn default() -> Self {
        Self {
            tolerance: 40.0,
            erosion_passes: 8,
        }
    }
}

impl FloodErode {
    /// Create a remover with the given tolerance and erosion pass budget.
    #[must_use]
    pub fn new(tolerance: f32, erosion_passes: u32) -> Self {
        Self {
            tolerance,
            erosion_passes,
        }
    }
}

impl AlphaExtractor for FloodErode {
    type Report = Rgb<u8>;

    /// Remove the corner-detected background; returns the detected color.
    ///
    /// # Errors
    ///
    /// Infallible; the `Result` is part of the shared extractor seam.
    fn extract(&self, image: &mut RgbaImage) -> Result<Self::Report> {
        let bg = background::detect_background(image);

        flood_fill_borders(image, bg, self.tolerance);
        sweep_trapped(image, bg, self.tolerance * SWEEP_TOLERANCE_FACTOR);
        if is_green_dominant(bg) {
            remove_green_spill(image);
        }
        let rounds = erode(image, bg, self.tolerance, self.erosion_passes);
        log::debug!("flood-erode: bg {bg:?}, converged after {rounds} erosion rounds");

        Ok(bg)
    }
}

fn is_green_dominant(bg: Rgb<u8>) -> bool {
    bg[1] > bg[0] && bg[1] > bg[2]
}

fn within(px: &image::Rgba<u8>, bg: Rgb<u8>, tolerance: f32) -> bool {
    blending::color_distance(Rgb([px[0], px[1], px[2]]), bg) < tolerance
}

/// Pass 1: BFS from all border pixels, clearing connected background.
fn flood_fill_borders(image: &mut RgbaImage, bg: Rgb<u8>, tolerance: f32) {
    let (w, h) = image.dimensions();
    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;

    let mut visited = vec![false; (w as usize) * (h as usize)];
    let mut queue: VecDeque<(u32, u32)> = VecDeque::new();

    let seed = |x: u32,
                y: u32,
                image: &RgbaImage,
                visited: &mut Vec<bool>,
                queue: &mut VecDeque<(u32, u32)>| {
        if !visited[idx(x, y)] && within(image.get_pixel(x, y), bg, tolerance) {
            visited[idx(x, y)] = true;
            queue.push_back((x, y));
        }
    };

    for x in 0..w {
        seed(x, 0, image, &mut visited, &mut queue);
        seed(x, h - 1, image, &mut visited, &mut queue);
    }
    for y in 0..h {
        seed(0, y, image, &mut visited, &mut queue);
        seed(w - 1, y, image, &mut visited, &mut queue);
    }

    while let Some((x, y)) = queue.pop_front() {
        image.get_pixel_mut(x, y)[3] = 0;

        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx < w && ny < h && !visited[idx(nx, ny)] && within(image.get_pixel(nx, ny), bg, tolerance)
            {
                visited[idx(nx, ny)] = true;
                queue.push_back((nx, ny));
            }
        }
    }
}

/// Pass 2: tight-tolerance sweep for background trapped in concavities.
fn sweep_trapped(image: &mut RgbaImage, bg: Rgb<u8>, tolerance: f32) {
    for px in image.pixels_mut() {
        if px[3] > 0 && within(px, bg, tolerance) {
            px[3] = 0;
        }
    }
}

/// Pass 2b: remove shadowed/reflected green spill that fails the distance
/// test. Only runs when the detected background is green-dominant.
fn remove_green_spill(image: &mut RgbaImage) {
    for px in image.pixels_mut() {
        if px[3] > 0 && px[1] >= px[0] && px[1] >= px[2] && px[1] > GREEN_SPILL_FLOOR {
            px[3] = 0;
        }
    }
}

/// Pass 3: iterative boundary erosion of near-background pixels.
///
/// Each round clears opaque pixels within `tolerance` of the background that
/// touch (8-connected) an already transparent pixel. Rounds read a snapshot
/// of the previous round's transparency, so the result is independent of
/// scan order. Returns the number of rounds that made changes.
fn erode(image: &mut RgbaImage, bg: Rgb<u8>, tolerance: f32, max_passes: u32) -> u32 {
    let (w, h) = image.dimensions();
    let idx = |x: u32, y: u32| (y as usize) * (w as usize) + x as usize;

    let mut rounds = 0u32;
    for _ in 0..max_passes {
        let transparent: Vec<bool> = image.pixels().map(|px| px[3] == 0).collect();
        let mut to_clear: Vec<(u32, u32)> = Vec::new();

        for y in 0..h {
            for x in 0..w {
                if transparent[idx(x, y)] || !within(image.get_pixel(x, y), bg, tolerance) {
                    continue;
                }
                let has_transparent_neighbor = neighbors8(x, y, w, h)
                    .into_iter()
                    .flatten()
                    .any(|(nx, ny)| transparent[idx(nx, ny)]);
                if has_transparent_neighbor {
                    to_clear.push((x, y));
                }
            }
        }

        if to_clear.is_empty() {
            break;
        }
        for (x, y) in to_clear {
            image.get_pixel_mut(x, y)[3] = 0;
        }
        rounds += 1;
    }
    rounds
}

/// The 8-connected neighborhood of `(x, y)`, `None` where it falls outside
/// the image.
fn neighbors8(x: u32, y: u32, w: u32, h: u32) -> [Option<(u32, u32)>; 8] {
    let mut out = [None; 8];
    let mut i = 0;
    for dy in -1i64..=1 {
        for dx in -1i64..=1 {
            if dx == 0 && dy == 0 {
                continue;
            }
            let nx = i64::from(x) + dx;
            let ny = i64::from(y) + dy;
            if nx >= 0 && ny >= 0 && nx < i64::from(w) && ny < i64::from(h) {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                {
                    out[i] = Some((nx as u32, ny as u32));
                }
            }
            i += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn uniform_background_is_fully_removed() {
        let mut img = RgbaImage::from_pixel(10, 10, Rgba([0, 200, 0, 255]));
        let bg = FloodErode::default().extract(&mut img).unwrap();
        assert_eq!(bg, Rgb([0, 200, 0]));
        assert!(img.pixels().all(|px| px[3] == 0));
    }

    #[test]
    fn subject_far_from_background_survives_all_passes() {
        let mut img = RgbaImage::from_pixel(12, 12, Rgba([0, 200, 0, 255]));
        for y in 4..8 {
            for x in 4..8 {
                img.put_pixel(x, y, Rgba([200, 30, 120, 255]));
            }
        }
        FloodErode::default().extract(&mut img).unwrap();
        for y in 4..8 {
            for x in 4..8 {
                assert_eq!(img.get_pixel(x, y)[3], 255, "subject pixel ({x},{y}) eaten");
            }
        }
    }

    #[test]
    fn trapped_background_inside_subject_ring_is_swept() {
        // Ring of subject pixels enclosing one near-background pixel the
        // border flood cannot reach
        let mut img = RgbaImage::from_pixel(9, 9, Rgba([250, 250, 250, 255]));
        for y in 3..6 {
            for x in 3..6 {
                img.put_pixel(x, y, Rgba([10, 10, 200, 255]));
            }
        }
        img.put_pixel(4, 4, Rgba([248, 248, 248, 255]));

        FloodErode::new(30.0, 4).extract(&mut img).unwrap();
        assert_eq!(img.get_pixel(4, 4)[3], 0, "trapped background must be swept");
        assert_eq!(img.get_pixel(3, 3)[3], 255);
    }

    #[test]
    fn green_spill_is_removed_for_green_backgrounds() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([0, 255, 0, 255]));
        // Shadowed green: far from pure green by distance, but green-maximal
        img.put_pixel(4, 4, Rgba([60, 120, 60, 255]));
        FloodErode::new(40.0, 2).extract(&mut img).unwrap();
        assert_eq!(img.get_pixel(4, 4)[3], 0);
    }

    #[test]
    fn green_spill_rule_is_inert_for_non_green_backgrounds() {
        let mut img = RgbaImage::from_pixel(8, 8, Rgba([250, 250, 250, 255]));
        img.put_pixel(4, 4, Rgba([60, 120, 60, 255]));
        FloodErode::new(30.0, 2).extract(&mut img).unwrap();
        assert_eq!(img.get_pixel(4, 4)[3], 255);
    }

    #[test]
    fn erosion_converges_on_fully_transparent_image() {
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([5, 5, 5, 0]));
        // Must terminate despite a zero-change fixed point on round one
        let rounds = erode(&mut img, Rgb([5, 5, 5]), 40.0, 1000);
        assert_eq!(rounds, 0);
    }

    #[test]
    fn erosion_converges_on_fully_opaque_far_image() {
        let mut img = RgbaImage::from_pixel(6, 6, Rgba([200, 30, 120, 255]));
        let rounds = erode(&mut img, Rgb([0, 255, 0]), 40.0, 1000);
        assert_eq!(rounds, 0);
        assert!(img.pixels().all(|px| px[3] == 255));
    }

    #[test]
    fn erosion_peels_fringe_from_the_transparent_side() {
        // Transparent left half, near-background fringe column, subject right
        let mut img = RgbaImage::from_pixel(6, 3, Rgba([200, 30, 120, 255]));
        for y in 0..3 {
            for x in 0..2 {
                img.put_pixel(x, y, Rgba([0, 200, 0, 0]));
            }
            img.put_pixel(2, y, Rgba([20, 190, 20, 255])); // fringe
        }
        let rounds = erode(&mut img, Rgb([0, 200, 0]), 40.0, 8);
        assert_eq!(rounds, 1);
        for y in 0..3 {
            assert_eq!(img.get_pixel(2, y)[3], 0, "fringe must erode");
            assert_eq!(img.get_pixel(3, y)[3], 255, "subject must survive");
        }
    }
}
