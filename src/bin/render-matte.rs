use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, ValueEnum};

use render_matte::{
    AlphaExtractor, AssetClass, AssetPipeline, DifferenceMatte, KeyColor, MatteThresholds,
    PipelineConfig, ProcessOptions, ProcessResult, StrategyChoice,
};

#[derive(Parser)]
#[command(
    name = "render-matte",
    about = "Extract accurate transparency from opaque AI-generated renders",
    version,
    after_help = "Simple usage: render-matte <image>  (uniform matte, writes {name}_matted.png)\n\n\
                  Difference matting needs the paired renders:\n\
                  render-matte --strategy difference --white white.png <black.png>"
)]
struct Cli {
    /// Input image file or directory
    input: String,

    /// Output file or directory (default: {name}_matted.png)
    #[arg(short, long)]
    output: Option<String>,

    /// Extraction strategy
    #[arg(short, long, value_enum, default_value = "uniform")]
    strategy: Strategy,

    /// White-composited render for difference matting
    #[arg(long)]
    white: Option<String>,

    /// Fully-transparent distance threshold for the uniform matte
    #[arg(long, default_value = "15")]
    bg_threshold: f32,

    /// Fully-opaque distance threshold for the uniform matte
    #[arg(long, default_value = "80")]
    fg_threshold: f32,

    /// Removal tolerance for flood-erode and checkerboard strategies
    #[arg(long, default_value = "40")]
    tolerance: f32,

    /// Erosion pass budget for the flood-erode strategy
    #[arg(long, default_value = "8")]
    erosion_passes: u32,

    /// Resize to the logo target size before extraction
    #[arg(long)]
    resize: bool,

    /// Treat inputs as device renders (square target, no matting defaults)
    #[arg(long)]
    device: bool,

    /// Run lossy palette quantization on outputs
    #[arg(long)]
    quantize: bool,

    /// Quantization quality range, e.g. 65-80
    #[arg(long, default_value = "65-80")]
    quality: String,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Strategy {
    /// Uniform background subtraction with decontamination
    Uniform,
    /// Two-pass white/black difference matting
    Difference,
    /// Hard green-screen key
    ChromaGreen,
    /// Hard white key
    ChromaWhite,
    /// Flood fill plus erosion
    Flood,
    /// Transparency-checkerboard detection
    Checkerboard,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.bg_threshold >= cli.fg_threshold {
        eprintln!("Error: --bg-threshold must be below --fg-threshold");
        process::exit(1);
    }

    let quality = match cli.quality.parse() {
        Ok(q) => q,
        Err(e) => {
            eprintln!("Error: --quality: {e}");
            process::exit(1);
        }
    };

    let config = PipelineConfig {
        thresholds: MatteThresholds {
            bg_threshold: cli.bg_threshold,
            fg_threshold: cli.fg_threshold,
        },
        chroma_tolerance: cli.tolerance,
        erosion_passes: cli.erosion_passes,
        quantize: cli.quantize,
        quality,
        ..PipelineConfig::default()
    };
    let pipeline = AssetPipeline::new(config);

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if cli.strategy == Strategy::Difference {
        run_difference(&cli, input_path);
        return;
    }

    let opts = ProcessOptions {
        strategy: match cli.strategy {
            Strategy::Uniform => StrategyChoice::Uniform,
            Strategy::ChromaGreen => StrategyChoice::Chroma(KeyColor::Green),
            Strategy::ChromaWhite => StrategyChoice::Chroma(KeyColor::White),
            Strategy::Flood => StrategyChoice::FloodErode,
            Strategy::Checkerboard => StrategyChoice::Checkerboard,
            Strategy::Difference => unreachable!("handled above"),
        },
        class: if cli.device {
            AssetClass::Device
        } else {
            AssetClass::Logo
        },
        resize: cli.resize,
        quantize: cli.quantize,
    };

    let results = if input_path.is_dir() {
        let Some(output_dir) = cli.output.as_deref() else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: render-matte <input_dir> -o <output_dir>");
            process::exit(1);
        };
        pipeline.process_directory(input_path, Path::new(output_dir), &opts)
    } else {
        let output_path = cli
            .output
            .as_deref()
            .map_or_else(|| default_output_path(input_path), PathBuf::from);
        vec![pipeline.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut skip_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, cli.quiet);
        if r.skipped {
            skip_count += 1;
        } else if r.success {
            success_count += 1;
        } else {
            fail_count += 1;
        }
    }

    if results.len() > 1 && !cli.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if skip_count > 0 {
            eprint!(", Skipped: {skip_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

fn run_difference(cli: &Cli, black_path: &Path) {
    let Some(white_path) = cli.white.as_deref() else {
        eprintln!("Error: --strategy difference requires --white <white_render>");
        process::exit(1);
    };

    let load = |path: &Path| match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            eprintln!("Error: Failed to load {}: {e}", path.display());
            process::exit(1);
        }
    };

    let white = load(Path::new(white_path));
    let mut black = load(black_path);

    let stats = match DifferenceMatte::with_white_reference(white).extract(&mut black) {
        Ok(stats) => stats,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let output_path = cli
        .output
        .as_deref()
        .map_or_else(|| default_output_path(black_path), PathBuf::from);
    if let Err(e) = black.save(&output_path) {
        eprintln!("Error: Failed to save {}: {e}", output_path.display());
        process::exit(1);
    }

    if !cli.quiet {
        eprintln!(
            "[OK] {} ({:.1}% transparent, {:.1}% semi, {:.1}% opaque)",
            output_path.display(),
            stats.transparent_pct,
            stats.semi_transparent_pct,
            stats.opaque_pct
        );
    }
}

fn print_result(result: &ProcessResult, quiet: bool) {
    if quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if result.skipped {
        if !quiet {
            eprintln!("[SKIP] {filename}: {}", result.message);
        }
    } else if result.success {
        if !quiet {
            if result.message.is_empty() {
                eprintln!("[OK] {filename}");
            } else {
                eprintln!("[OK] {filename}: {}", result.message);
            }
        }
    } else {
        eprintln!("[FAIL] {filename}: {}", result.message);
    }
}

/// Generate a default output path from an input path.
///
/// Example: `"logo.png"` becomes `"logo_matted.png"`.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let parent = input.parent().unwrap_or(Path::new("."));
    parent.join(format!("{stem}_matted.png"))
}
