//! Derived presentation variants of an extracted asset.
//!
//! A logo family ships four variants derived from one canonical extracted
//! color logo: the color original re-exported for each background
//! convention, plus flat-black and flat-white monochrome derivatives.

use image::{Rgb, RgbaImage};

/// A named derived image with its output buffer.
#[derive(Debug, Clone)]
pub struct AssetVariant {
    /// Variant name, e.g. `"Logo - Dark Black"`.
    pub name: String,
    /// Canonical output file name, e.g. `"logo_dark_black.png"`.
    pub file_name: String,
    /// The derived pixel buffer.
    pub image: RgbaImage,
    /// Whether the buffer actually contains alpha values below 255.
    ///
    /// Computed from the buffer, never assumed from the generation path.
    pub has_alpha: bool,
}

impl AssetVariant {
    /// Build a variant, scanning the buffer for its alpha-presence flag.
    #[must_use]
    pub fn new(name: &str, file_name: &str, image: RgbaImage) -> Self {
        let has_alpha = has_partial_alpha(&image);
        Self {
            name: name.to_string(),
            file_name: file_name.to_string(),
            image,
            has_alpha,
        }
    }

    /// Pixel dimensions of the variant buffer.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }
}

/// The fixed logo variant family derived from one canonical color logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoVariant {
    /// Color original for dark UI backgrounds.
    DarkColor,
    /// Flat black silhouette for dark UI backgrounds.
    DarkBlack,
    /// Color original for light UI backgrounds.
    LightColor,
    /// Flat white silhouette for light UI backgrounds.
    LightWhite,
}

impl LogoVariant {
    /// All variants in output order.
    pub const ALL: [LogoVariant; 4] = [
        LogoVariant::DarkColor,
        LogoVariant::DarkBlack,
        LogoVariant::LightColor,
        LogoVariant::LightWhite,
    ];

    /// Human-readable variant name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LogoVariant::DarkColor => "Logo - Dark Color",
            LogoVariant::DarkBlack => "Logo - Dark Black",
            LogoVariant::LightColor => "Logo - Light Color",
            LogoVariant::LightWhite => "Logo - Light White",
        }
    }

    /// Canonical output file name.
    #[must_use]
    pub fn file_name(self) -> &'static str {
        match self {
            LogoVariant::DarkColor => "logo_dark_color.png",
            LogoVariant::DarkBlack => "logo_dark_black.png",
            LogoVariant::LightColor => "logo_light_color.png",
            LogoVariant::LightWhite => "logo_light_white.png",
        }
    }

    /// Derive this variant's buffer from the canonical color logo.
    #[must_use]
    pub fn derive(self, canonical: &RgbaImage) -> RgbaImage {
        match self {
            LogoVariant::DarkColor | LogoVariant::LightColor => duplicate(canonical),
            LogoVariant::DarkBlack => monochrome(canonical, Rgb([0, 0, 0])),
            LogoVariant::LightWhite => monochrome(canonical, Rgb([255, 255, 255])),
        }
    }
}

/// Flat-color recolor preserving the alpha channel exactly.
///
/// RGB is replaced with `target` wherever alpha > 0; fully transparent
/// pixels are left untouched, original RGB included (cosmetically
/// irrelevant once alpha is 0).
#[must_use]
pub fn monochrome(source: &RgbaImage, target: Rgb<u8>) -> RgbaImage {
    let mut out = source.clone();
    for px in out.pixels_mut() {
        if px[3] > 0 {
            px[0] = target[0];
            px[1] = target[1];
            px[2] = target[2];
        }
    }
    out
}

/// Byte-identical copy, used when a color variant is a re-export of the
/// canonical extracted asset.
#[must_use]
pub fn duplicate(source: &RgbaImage) -> RgbaImage {
    source.clone()
}

/// Whether any pixel carries alpha below 255.
#[must_use]
pub fn has_partial_alpha(image: &RgbaImage) -> bool {
    image.pixels().any(|px| px[3] < 255)
}

/// Derive the full four-variant logo family from a canonical extracted
/// color logo.
#[must_use]
pub fn derive_logo_variants(canonical: &RgbaImage) -> Vec<AssetVariant> {
    LogoVariant::ALL
        .iter()
        .map(|variant| {
            AssetVariant::new(
                variant.name(),
                variant.file_name(),
                variant.derive(canonical),
            )
        })
        .collect()
}
