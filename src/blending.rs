//! Compositing math shared by the extraction strategies.
//!
//! Generators composite the foreground over a solid background:
//! `observed = alpha * foreground + (1 - alpha) * background`
//!
//! This module provides the inverse operations used to recover true
//! foreground colors from background-mixed edge pixels.

use image::Rgb;

/// Alpha weight below which decontamination is skipped (edge noise floor).
///
/// Dividing by a near-zero weight amplifies sensor/codec noise into garbage
/// colors, so pixels this close to the background keep their observed color.
pub const EDGE_NOISE_FLOOR: f32 = 0.01;

/// Euclidean RGB distance between pure white and pure black: `sqrt(3 * 255^2)`.
pub const MAX_RGB_DISTANCE: f32 = 441.672_96;

/// Euclidean distance between two colors in RGB space.
#[must_use]
pub fn color_distance(a: Rgb<u8>, b: Rgb<u8>) -> f32 {
    let dr = f32::from(a[0]) - f32::from(b[0]);
    let dg = f32::from(a[1]) - f32::from(b[1]);
    let db = f32::from(a[2]) - f32::from(b[2]);
    (dr * dr + dg * dg + db * db).sqrt()
}

/// Round and clamp a float channel value to `[0, 255]`.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn clamp_channel(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Recover the true foreground color of a background-mixed edge pixel.
///
/// Inverts the compositing equation per channel:
/// `foreground = (observed - (1 - weight) * background) / weight`
///
/// `weight` is the recovered foreground weight in `[0, 1]`. Below
/// [`EDGE_NOISE_FLOOR`] the observed color is returned unchanged.
#[must_use]
pub fn decontaminate(observed: Rgb<u8>, background: Rgb<u8>, weight: f32) -> Rgb<u8> {
    if weight <= EDGE_NOISE_FLOOR {
        return observed;
    }
    let inv = 1.0 - weight;
    let mut out = [0u8; 3];
    for ch in 0..3 {
        let recovered = (f32::from(observed[ch]) - inv * f32::from(background[ch])) / weight;
        out[ch] = clamp_channel(recovered);
    }
    Rgb(out)
}

/// Recover the foreground color of a pixel composited over pure black.
///
/// Over black the contamination term vanishes, so `observed = alpha * fg`
/// exactly and recovery is a plain division:
/// `foreground = observed / alpha`, clamped per channel.
///
/// Below [`EDGE_NOISE_FLOOR`] the division is unstable and black is returned;
/// at that alpha the color is invisible anyway.
#[must_use]
pub fn unpremultiply(observed: Rgb<u8>, alpha: f32) -> Rgb<u8> {
    if alpha <= EDGE_NOISE_FLOOR {
        return Rgb([0, 0, 0]);
    }
    Rgb([
        clamp_channel(f32::from(observed[0]) / alpha),
        clamp_channel(f32::from(observed[1]) / alpha),
        clamp_channel(f32::from(observed[2]) / alpha),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_between_identical_colors_is_zero() {
        let c = Rgb([37, 40, 59]);
        assert!(color_distance(c, c).abs() < f32::EPSILON);
    }

    #[test]
    fn distance_between_white_and_black_matches_constant() {
        let d = color_distance(Rgb([255, 255, 255]), Rgb([0, 0, 0]));
        assert!(
            (d - MAX_RGB_DISTANCE).abs() < 0.01,
            "expected ~{MAX_RGB_DISTANCE}, got {d}"
        );
    }

    #[test]
    fn distance_is_symmetric() {
        let a = Rgb([10, 200, 30]);
        let b = Rgb([250, 5, 90]);
        assert!((color_distance(a, b) - color_distance(b, a)).abs() < f32::EPSILON);
    }

    #[test]
    fn clamp_channel_saturates_at_both_ends() {
        assert_eq!(clamp_channel(-12.0), 0);
        assert_eq!(clamp_channel(300.0), 255);
        assert_eq!(clamp_channel(127.4), 127);
        assert_eq!(clamp_channel(127.6), 128);
    }

    #[test]
    fn decontaminate_round_trips_forward_composite() {
        let foreground: Rgb<u8> = Rgb([200, 30, 120]);
        let background = Rgb([37, 40, 59]);

        for &weight in &[0.1_f32, 0.25, 0.5, 0.75, 0.9] {
            // Forward composite, quantized to u8 as a generator would emit it
            let observed = Rgb([
                clamp_channel(weight * f32::from(foreground[0]) + (1.0 - weight) * f32::from(background[0])),
                clamp_channel(weight * f32::from(foreground[1]) + (1.0 - weight) * f32::from(background[1])),
                clamp_channel(weight * f32::from(foreground[2]) + (1.0 - weight) * f32::from(background[2])),
            ]);

            let recovered = decontaminate(observed, background, weight);
            for ch in 0..3 {
                let diff = (i32::from(recovered[ch]) - i32::from(foreground[ch])).abs();
                assert!(
                    diff <= 6,
                    "weight {weight} ch {ch}: recovered {} vs true {} (diff {diff})",
                    recovered[ch],
                    foreground[ch]
                );
            }
        }
    }

    #[test]
    fn decontaminate_below_noise_floor_keeps_observed_color() {
        let observed = Rgb([38, 41, 60]);
        let background = Rgb([37, 40, 59]);
        assert_eq!(decontaminate(observed, background, 0.005), observed);
        assert_eq!(decontaminate(observed, background, 0.0), observed);
    }

    #[test]
    fn decontaminate_clamps_blown_out_channels() {
        // Observed brighter than the mix can explain: recovery saturates at 255
        let recovered = decontaminate(Rgb([250, 250, 250]), Rgb([0, 0, 0]), 0.5);
        assert_eq!(recovered, Rgb([255, 255, 255]));
    }

    #[test]
    fn unpremultiply_is_exact_at_full_alpha() {
        let observed = Rgb([123, 45, 210]);
        assert_eq!(unpremultiply(observed, 1.0), observed);
    }

    #[test]
    fn unpremultiply_recovers_halved_color() {
        let recovered = unpremultiply(Rgb([60, 100, 20]), 0.5);
        assert_eq!(recovered, Rgb([120, 200, 40]));
    }

    #[test]
    fn unpremultiply_returns_black_below_noise_floor() {
        assert_eq!(unpremultiply(Rgb([200, 200, 200]), 0.005), Rgb([0, 0, 0]));
    }
}
