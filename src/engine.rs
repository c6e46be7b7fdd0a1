//! Asset pipeline orchestration.
//!
//! Ties the stages together the way the asset tool drives them:
//! decode -> normalize -> extract -> derive variants -> encode (+ optional
//! quantization). Also provides the file-level batch driver used by the CLI.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat, Rgb, RgbaImage};

use crate::checkerboard::CheckerboardDetect;
use crate::chroma::{ChromaKey, KeyColor};
use crate::error::{Error, Result};
use crate::extract::{AlphaExtractor, AlphaMatteStats, BackgroundKind, MatteThresholds};
use crate::flood::FloodErode;
use crate::normalize::{self, ResizeReport};
use crate::quantize::{self, QualityRange, QuantizeStats};
use crate::uniform::UniformMatte;
use crate::variants::{self, AssetVariant};

/// The explicit configuration value object for a pipeline instance.
///
/// Extraction behavior is fully reproducible from an input image plus this
/// configuration; there are no process-wide defaults.
#[derive(Debug, Clone, Copy)]
pub struct PipelineConfig {
    /// Target dimensions for device renders.
    pub device_size: (u32, u32),
    /// Target dimensions for logo renders.
    pub logo_size: (u32, u32),
    /// Uniform matte thresholds.
    pub thresholds: MatteThresholds,
    /// Nominal dark reference background (`#25283B`).
    pub bg_dark: Rgb<u8>,
    /// Nominal light reference background (`#FFFFFF`).
    pub bg_light: Rgb<u8>,
    /// Tolerance for flood-fill and checkerboard removal.
    pub chroma_tolerance: f32,
    /// Erosion pass budget for flood-fill removal.
    pub erosion_passes: u32,
    /// Whether to run the lossy palette quantization post-pass.
    pub quantize: bool,
    /// Quality range for the quantization post-pass.
    pub quality: QualityRange,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            device_size: (2160, 2160),
            logo_size: (1920, 510),
            thresholds: MatteThresholds::default(),
            bg_dark: Rgb([37, 40, 59]),
            bg_light: Rgb([255, 255, 255]),
            chroma_tolerance: 40.0,
            erosion_passes: 8,
            quantize: true,
            quality: QualityRange::default(),
        }
    }
}

impl PipelineConfig {
    /// Nominal reference background for a convention.
    #[must_use]
    pub fn reference_background(&self, kind: BackgroundKind) -> Rgb<u8> {
        match kind {
            BackgroundKind::Dark => self.bg_dark,
            BackgroundKind::Light => self.bg_light,
        }
    }
}

/// Asset class, selecting the normalization target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetClass {
    /// Square device render, shipped opaque.
    Device,
    /// Wide logo render, matted to transparency.
    Logo,
}

/// Extraction strategy selection for the file-level driver.
///
/// Difference matting needs a paired white/black input and is driven
/// directly through [`crate::DifferenceMatte`] rather than this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyChoice {
    /// Uniform background subtraction with decontamination.
    Uniform,
    /// Hard chroma key.
    Chroma(KeyColor),
    /// Flood fill plus erosion.
    FloodErode,
    /// Checkerboard pattern detection.
    Checkerboard,
}

/// Options controlling the file-level driver.
#[derive(Debug, Clone, Copy)]
pub struct ProcessOptions {
    /// Extraction strategy to apply.
    pub strategy: StrategyChoice,
    /// Asset class; picks the normalization target.
    pub class: AssetClass,
    /// Normalize to the class target size before extraction.
    pub resize: bool,
    /// Run the quantization post-pass on outputs.
    pub quantize: bool,
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            strategy: StrategyChoice::Uniform,
            class: AssetClass::Logo,
            resize: false,
            quantize: false,
        }
    }
}

/// Result of processing a single image file.
#[derive(Debug)]
pub struct ProcessResult {
    /// Path of the processed file.
    pub path: PathBuf,
    /// Whether processing succeeded.
    pub success: bool,
    /// Whether the file was skipped (no checkerboard pattern found).
    pub skipped: bool,
    /// Human-readable status message.
    pub message: String,
}

/// An encoded output buffer with its reporting metadata.
#[derive(Debug, Clone)]
pub struct EncodedAsset {
    /// Variant or asset name.
    pub name: String,
    /// Output file name.
    pub file_name: String,
    /// PNG bytes (quantized when the post-pass applied).
    pub png: Vec<u8>,
    /// Final pixel dimensions.
    pub dimensions: (u32, u32),
    /// Whether the buffer carries alpha below 255.
    pub has_alpha: bool,
    /// Quantization stats for the encode.
    pub quantize: QuantizeStats,
}

/// Finalized logo family: matte diagnostics plus the encoded variants.
#[derive(Debug, Clone)]
pub struct LogoAssets {
    /// Resize performed during normalization.
    pub resize: ResizeReport,
    /// Uniform matte statistics.
    pub stats: AlphaMatteStats,
    /// The four encoded variants.
    pub variants: Vec<EncodedAsset>,
}

/// The asset pipeline.
///
/// Create once with a configuration and reuse across assets; each call owns
/// its image buffer for the duration of the transformation. Unrelated assets
/// may be processed from separate threads with no coordination.
#[derive(Debug, Clone, Default)]
pub struct AssetPipeline {
    config: PipelineConfig,
}

impl AssetPipeline {
    /// Create a pipeline with the given configuration.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// The pipeline's configuration.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Decode raw generator output into an owned RGBA buffer.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the bytes are not a decodable raster image.
    pub fn decode(&self, bytes: &[u8]) -> Result<RgbaImage> {
        let decoded = image::load_from_memory(bytes).map_err(Error::Decode)?;
        Ok(decoded.to_rgba8())
    }

    /// Target dimensions for an asset class.
    #[must_use]
    pub fn target_size(&self, class: AssetClass) -> (u32, u32) {
        match class {
            AssetClass::Device => self.config.device_size,
            AssetClass::Logo => self.config.logo_size,
        }
    }

    /// Decode and normalize generator output for an asset class.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] if the bytes are not a decodable raster image.
    pub fn prepare(&self, bytes: &[u8], class: AssetClass) -> Result<(RgbaImage, ResizeReport)> {
        let image = self.decode(bytes)?;
        let (w, h) = self.target_size(class);
        Ok(normalize::normalize(image, w, h))
    }

    /// Encode a buffer as PNG bytes.
    ///
    /// # Errors
    ///
    /// [`Error::Image`] if encoding fails.
    pub fn encode_png(&self, image: &RgbaImage) -> Result<Vec<u8>> {
        let mut bytes = Cursor::new(Vec::new());
        DynamicImage::ImageRgba8(image.clone()).write_to(&mut bytes, ImageFormat::Png)?;
        Ok(bytes.into_inner())
    }

    /// Encode a variant and run the optional quantization post-pass.
    ///
    /// # Errors
    ///
    /// [`Error::Image`] if encoding fails. Quantization failure is not an
    /// error: the unquantized bytes ship with zero-reduction stats.
    pub fn finalize_variant(&self, variant: &AssetVariant) -> Result<EncodedAsset> {
        let png = self.encode_png(&variant.image)?;
        let outcome = if self.config.quantize {
            quantize::quantize_png(&png, self.config.quality)
        } else {
            quantize::QuantizeOutcome {
                stats: QuantizeStats {
                    original_size: png.len(),
                    final_size: png.len(),
                    applied: false,
                },
                bytes: png,
            }
        };
        Ok(EncodedAsset {
            name: variant.name.clone(),
            file_name: variant.file_name.clone(),
            png: outcome.bytes,
            dimensions: variant.dimensions(),
            has_alpha: variant.has_alpha,
            quantize: outcome.stats,
        })
    }

    /// Full logo flow: decode, normalize, uniform matte, derive the
    /// four-variant family, encode.
    ///
    /// `kind` names the background convention the generator was asked to
    /// render against; the matte itself is driven by the corner-detected
    /// actual background.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] on undecodable input, [`Error::Image`] on encode
    /// failure.
    pub fn process_logo(&self, bytes: &[u8], kind: BackgroundKind) -> Result<LogoAssets> {
        let (mut image, resize) = self.prepare(bytes, AssetClass::Logo)?;
        log::info!(
            "logo: {}x{} ({} convention)",
            image.width(),
            image.height(),
            match kind {
                BackgroundKind::Dark => "dark",
                BackgroundKind::Light => "light",
            }
        );

        let stats = UniformMatte::new(self.config.thresholds).extract(&mut image)?;

        let variants = variants::derive_logo_variants(&image)
            .iter()
            .map(|v| self.finalize_variant(v))
            .collect::<Result<Vec<_>>>()?;

        Ok(LogoAssets {
            resize,
            stats,
            variants,
        })
    }

    /// Full device flow: decode, normalize, encode. Devices ship opaque;
    /// no matting is applied.
    ///
    /// # Errors
    ///
    /// [`Error::Decode`] on undecodable input, [`Error::Image`] on encode
    /// failure.
    pub fn process_device(&self, bytes: &[u8]) -> Result<EncodedAsset> {
        let (image, _resize) = self.prepare(bytes, AssetClass::Device)?;
        let variant = AssetVariant::new("Device", "device.png", image);
        self.finalize_variant(&variant)
    }

    /// Process a single image file: load, normalize, extract, save.
    ///
    /// Returns a [`ProcessResult`] indicating success, skip, or failure.
    /// Failures are reported per file rather than propagated, so a batch
    /// continues past bad assets.
    #[must_use]
    pub fn process_file(&self, input: &Path, output: &Path, opts: &ProcessOptions) -> ProcessResult {
        let mut result = ProcessResult {
            path: input.to_path_buf(),
            success: false,
            skipped: false,
            message: String::new(),
        };

        let decoded = match image::open(input) {
            Ok(img) => img,
            Err(e) => {
                result.message = format!("failed to load: {e}");
                return result;
            }
        };
        let mut image = decoded.to_rgba8();

        if opts.resize {
            let (w, h) = self.target_size(opts.class);
            let (resized, report) = normalize::normalize(image, w, h);
            image = resized;
            if report.was_resized() {
                log::info!(
                    "resized {}x{} -> {}x{}",
                    report.original.0,
                    report.original.1,
                    report.resized.0,
                    report.resized.1
                );
            }
        }

        let extraction = self.run_strategy(opts.strategy, &mut image);
        match extraction {
            Ok(StrategyOutcome::Extracted(message)) => result.message = message,
            Ok(StrategyOutcome::NoPattern) => {
                result.skipped = true;
                result.success = true;
                result.message = "no checkerboard pattern found".to_string();
                return result;
            }
            Err(e) => {
                result.message = e.to_string();
                return result;
            }
        }

        match self.save_output(&image, output, opts.quantize) {
            Ok(()) => result.success = true,
            Err(e) => result.message = format!("failed to save: {e}"),
        }
        result
    }

    /// Process all supported images in a directory.
    ///
    /// Uses parallel iteration when the `cli` feature is enabled (via
    /// rayon). Returns a [`ProcessResult`] for each image found.
    #[must_use]
    pub fn process_directory(
        &self,
        input_dir: &Path,
        output_dir: &Path,
        opts: &ProcessOptions,
    ) -> Vec<ProcessResult> {
        let entries: Vec<_> = match std::fs::read_dir(input_dir) {
            Ok(rd) => rd
                .filter_map(std::result::Result::ok)
                .filter(|e| e.file_type().map(|ft| ft.is_file()).unwrap_or(false))
                .filter(|e| is_supported_image(e.path().as_path()))
                .collect(),
            Err(e) => {
                return vec![ProcessResult {
                    path: input_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    message: format!("failed to read directory: {e}"),
                }];
            }
        };

        if !output_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(output_dir) {
                return vec![ProcessResult {
                    path: output_dir.to_path_buf(),
                    success: false,
                    skipped: false,
                    message: format!("failed to create output directory: {e}"),
                }];
            }
        }

        let run = |entry: &std::fs::DirEntry| {
            let input_path = entry.path();
            let file_name = input_path
                .file_name()
                .map(std::ffi::OsStr::to_os_string)
                .unwrap_or_default();
            let mut output_path = output_dir.join(file_name);
            output_path.set_extension("png");
            self.process_file(&input_path, &output_path, opts)
        };

        #[cfg(feature = "cli")]
        {
            use rayon::prelude::*;
            entries.par_iter().map(run).collect()
        }

        #[cfg(not(feature = "cli"))]
        {
            entries.iter().map(run).collect()
        }
    }

    fn run_strategy(
        &self,
        strategy: StrategyChoice,
        image: &mut RgbaImage,
    ) -> Result<StrategyOutcome> {
        match strategy {
            StrategyChoice::Uniform => {
                let stats = UniformMatte::new(self.config.thresholds).extract(image)?;
                Ok(StrategyOutcome::Extracted(format!(
                    "bg {:?}: {:.1}% transparent, {:.1}% edge, {:.1}% opaque",
                    stats.actual_bg, stats.transparent_pct, stats.edges_pct, stats.opaque_pct
                )))
            }
            StrategyChoice::Chroma(key) => {
                ChromaKey::new(key).extract(image)?;
                Ok(StrategyOutcome::Extracted(format!("chroma key {key:?}")))
            }
            StrategyChoice::FloodErode => {
                let bg = FloodErode::new(self.config.chroma_tolerance, self.config.erosion_passes)
                    .extract(image)?;
                Ok(StrategyOutcome::Extracted(format!("removed bg {bg:?}")))
            }
            StrategyChoice::Checkerboard => {
                match CheckerboardDetect::new(self.config.chroma_tolerance).extract(image)? {
                    Some((a, b)) => Ok(StrategyOutcome::Extracted(format!(
                        "checkerboard {a:?} / {b:?}"
                    ))),
                    None => Ok(StrategyOutcome::NoPattern),
                }
            }
        }
    }

    fn save_output(&self, image: &RgbaImage, output: &Path, quantize: bool) -> Result<()> {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let format = ImageFormat::from_path(output)
            .map_err(|e| Error::UnsupportedFormat(e.to_string()))?;
        if format != ImageFormat::Png {
            // Alpha output requires PNG
            return Err(Error::UnsupportedFormat(format!("{format:?}")));
        }

        if quantize {
            let png = self.encode_png(image)?;
            let outcome = quantize::quantize_png(&png, self.config.quality);
            std::fs::write(output, outcome.bytes)?;
        } else {
            DynamicImage::ImageRgba8(image.clone()).save_with_format(output, ImageFormat::Png)?;
        }
        Ok(())
    }
}

enum StrategyOutcome {
    Extracted(String),
    NoPattern,
}

/// Check if a file has a supported input image extension.
#[must_use]
pub fn is_supported_image(path: &Path) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => matches!(
            ext.to_lowercase().as_str(),
            "jpg" | "jpeg" | "png" | "webp" | "bmp"
        ),
        None => false,
    }
}
