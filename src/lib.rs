//! Turn opaque AI-generated renders into production assets with accurate
//! transparency and derived color variants.
//!
//! Generators deliver the subject composited over an opaque background.
//! This crate recovers a real alpha channel from that output — five
//! interchangeable matting strategies behind one [`AlphaExtractor`] seam —
//! then derives the monochrome presentation variants an asset pack ships
//! with.
//!
//! # Quick Start
//!
//! ```no_run
//! use render_matte::{AlphaExtractor, MatteThresholds, UniformMatte};
//!
//! let mut img = image::open("logo_render.png").unwrap().to_rgba8();
//! let stats = UniformMatte::new(MatteThresholds::default())
//!     .extract(&mut img)
//!     .unwrap();
//! println!("background {:?}, {:.1}% transparent", stats.actual_bg, stats.transparent_pct);
//! img.save("logo.png").unwrap();
//! ```
//!
//! # Pipeline
//!
//! The full asset flow — decode, exact-size normalization, matting, variant
//! derivation, optional palette quantization — lives in [`AssetPipeline`]:
//!
//! ```no_run
//! use render_matte::{AssetPipeline, BackgroundKind, PipelineConfig};
//!
//! let pipeline = AssetPipeline::new(PipelineConfig::default());
//! let bytes = std::fs::read("logo_render.png").unwrap();
//! let assets = pipeline.process_logo(&bytes, BackgroundKind::Light).unwrap();
//! for variant in &assets.variants {
//!     std::fs::write(&variant.file_name, &variant.png).unwrap();
//! }
//! ```

#![deny(missing_docs)]

pub mod background;
pub mod blending;
mod checkerboard;
mod chroma;
mod difference;
mod engine;
pub mod error;
mod extract;
mod flood;
pub mod normalize;
pub mod quantize;
mod uniform;
pub mod variants;

pub use checkerboard::CheckerboardDetect;
pub use chroma::{ChromaKey, KeyColor};
pub use difference::DifferenceMatte;
pub use engine::{
    is_supported_image, AssetClass, AssetPipeline, EncodedAsset, LogoAssets, PipelineConfig,
    ProcessOptions, ProcessResult, StrategyChoice,
};
pub use error::{Error, Result};
pub use extract::{
    AlphaExtractor, AlphaMatteStats, BackgroundKind, DifferenceMatteStats, MatteThresholds,
};
pub use flood::FloodErode;
pub use uniform::UniformMatte;
