//! Optional lossy palette quantization of encoded PNG output.
//!
//! Purely an output-size optimization, never required for correctness: any
//! internal failure (undecodable input, unreachable quality floor, encode
//! error, or a result that did not shrink) returns the original bytes
//! unchanged with zero-reduction stats.

use std::str::FromStr;

/// Quality floor and ceiling for palette quantization, pngquant-style.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QualityRange {
    /// Minimum acceptable quality; below this the pass is abandoned.
    pub min: u8,
    /// Target quality ceiling.
    pub max: u8,
}

impl Default for QualityRange {
    fn default() -> Self {
        Self { min: 65, max: 80 }
    }
}

impl FromStr for QualityRange {
    type Err = String;

    /// Parse the `"min-max"` syntax used in tool configuration, e.g.
    /// `"65-80"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (min, max) = s
            .split_once('-')
            .ok_or_else(|| format!("expected \"min-max\", got {s:?}"))?;
        let min: u8 = min
            .trim()
            .parse()
            .map_err(|_| format!("invalid quality floor in {s:?}"))?;
        let max: u8 = max
            .trim()
            .parse()
            .map_err(|_| format!("invalid quality ceiling in {s:?}"))?;
        if min > max || max > 100 {
            return Err(format!("quality range {s:?} out of order or above 100"));
        }
        Ok(Self { min, max })
    }
}

/// Size statistics from a quantization pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeStats {
    /// Byte size of the input.
    pub original_size: usize,
    /// Byte size of the returned output.
    pub final_size: usize,
    /// Whether the quantized result was actually used.
    pub applied: bool,
}

impl QuantizeStats {
    fn unchanged(size: usize) -> Self {
        Self {
            original_size: size,
            final_size: size,
            applied: false,
        }
    }

    /// Size reduction as a percentage of the original.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn reduction_pct(&self) -> f32 {
        if self.original_size == 0 {
            0.0
        } else {
            (1.0 - self.final_size as f32 / self.original_size as f32) * 100.0
        }
    }
}

/// Output of a quantization pass: the bytes to ship plus stats.
#[derive(Debug, Clone)]
pub struct QuantizeOutcome {
    /// Encoded PNG bytes — quantized on success, the original input on any
    /// fallback.
    pub bytes: Vec<u8>,
    /// Size statistics.
    pub stats: QuantizeStats,
}

/// Reduce a PNG's palette within the given quality range.
///
/// On success returns an indexed-color PNG with alpha carried in `tRNS`.
/// Every failure path falls back to the original bytes with
/// `applied = false`; this function is never fatal to the pipeline.
#[must_use]
pub fn quantize_png(png: &[u8], quality: QualityRange) -> QuantizeOutcome {
    match try_quantize(png, quality) {
        Ok(bytes) if bytes.len() < png.len() => {
            let stats = QuantizeStats {
                original_size: png.len(),
                final_size: bytes.len(),
                applied: true,
            };
            log::debug!(
                "quantized {} -> {} bytes ({:.0}% smaller)",
                stats.original_size,
                stats.final_size,
                stats.reduction_pct()
            );
            QuantizeOutcome { bytes, stats }
        }
        Ok(_) => {
            log::debug!("quantization did not shrink output, keeping original");
            QuantizeOutcome {
                bytes: png.to_vec(),
                stats: QuantizeStats::unchanged(png.len()),
            }
        }
        Err(reason) => {
            log::debug!("quantization skipped: {reason}");
            QuantizeOutcome {
                bytes: png.to_vec(),
                stats: QuantizeStats::unchanged(png.len()),
            }
        }
    }
}

fn try_quantize(png: &[u8], quality: QualityRange) -> Result<Vec<u8>, String> {
    let decoded = image::load_from_memory_with_format(png, image::ImageFormat::Png)
        .map_err(|e| format!("decode: {e}"))?
        .to_rgba8();
    let (width, height) = decoded.dimensions();

    let pixels: Vec<imagequant::RGBA> = decoded
        .pixels()
        .map(|px| imagequant::RGBA::new(px[0], px[1], px[2], px[3]))
        .collect();

    let mut attrs = imagequant::new();
    attrs
        .set_quality(quality.min, quality.max)
        .map_err(|e| format!("quality: {e}"))?;
    let mut liq_image = attrs
        .new_image(pixels, width as usize, height as usize, 0.0)
        .map_err(|e| format!("image: {e}"))?;
    let mut result = attrs
        .quantize(&mut liq_image)
        .map_err(|e| format!("quantize: {e}"))?;
    result
        .set_dithering_level(1.0)
        .map_err(|e| format!("dithering: {e}"))?;
    let (palette, indices) = result
        .remapped(&mut liq_image)
        .map_err(|e| format!("remap: {e}"))?;

    encode_indexed_png(width, height, &palette, &indices).map_err(|e| format!("encode: {e}"))
}

fn encode_indexed_png(
    width: u32,
    height: u32,
    palette: &[imagequant::RGBA],
    indices: &[u8],
) -> Result<Vec<u8>, png::EncodingError> {
    let mut plte = Vec::with_capacity(palette.len() * 3);
    let mut trns = Vec::with_capacity(palette.len());
    for entry in palette {
        plte.extend_from_slice(&[entry.r, entry.g, entry.b]);
        trns.push(entry.a);
    }

    let mut out = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut out, width, height);
        encoder.set_color(png::ColorType::Indexed);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_palette(plte);
        encoder.set_trns(trns);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(indices)?;
    }
    Ok(out)
}
