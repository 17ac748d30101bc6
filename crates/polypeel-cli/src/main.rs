//! polypeel: decompose a raster into nested polygon layers.
//!
//! Reads a raster text file (or an image with `--image`), peels it into
//! alternating foreground/background layers, and writes the geometry
//! interchange text. Per-stage diagnostics are printed alongside, which
//! makes the tool double as a timing harness (`--runs`).
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin polypeel -- [OPTIONS] <INPUT>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use polypeel_pipeline::diagnostics::{self, Clock, DecomposeDiagnostics};
use polypeel_pipeline::{DecomposeConfig, Dimensions, Geometry, Grid, Threshold};

/// Decompose a binary raster into nested layers of axis-aligned polygons.
///
/// Layer 0 holds the outermost foreground regions, layer 1 the holes in
/// them, layer 2 the islands in those holes, and so on.
#[derive(Parser)]
#[command(name = "polypeel", version)]
struct Cli {
    /// Raster text file, or an image file with `--image`.
    input: PathBuf,

    /// Treat INPUT as an image (PNG, JPEG, BMP, WebP) and binarize it.
    #[arg(long)]
    image: bool,

    /// Fixed binarization threshold; luma at or below it is foreground.
    #[arg(long, default_value_t = DecomposeConfig::DEFAULT_THRESHOLD)]
    threshold: u8,

    /// Pick the threshold per image with Otsu's method.
    #[arg(long, conflicts_with = "threshold")]
    otsu: bool,

    /// Swap foreground and background after binarization.
    #[arg(long)]
    invert: bool,

    /// Stop after this many layers.
    #[arg(long)]
    max_layers: Option<usize>,

    /// Full decomposition config as a JSON string.
    ///
    /// When provided, the threshold, otsu, invert and max-layers flags are
    /// ignored. The JSON must be a valid `DecomposeConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,

    /// Write geometry interchange text here instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write SVG output to file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,
}

/// Build a [`DecomposeConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<DecomposeConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(DecomposeConfig {
        threshold: if cli.otsu {
            Threshold::Otsu
        } else {
            Threshold::Fixed(cli.threshold)
        },
        invert: cli.invert,
        max_layers: cli.max_layers,
    })
}

/// What INPUT turned out to hold.
enum Input {
    /// Parsed raster text.
    Raster(Grid),
    /// Undecoded image bytes.
    Image(Vec<u8>),
}

fn read_input(cli: &Cli) -> Result<Input, String> {
    let path = &cli.input;
    if cli.image {
        let bytes =
            std::fs::read(path).map_err(|e| format!("Error reading {}: {e}", path.display()))?;
        eprintln!("Image: {} ({} bytes)", path.display(), bytes.len());
        return Ok(Input::Image(bytes));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    let grid = polypeel_export::parse_raster(&text)
        .map_err(|e| format!("Error parsing {}: {e}", path.display()))?;
    eprintln!(
        "Raster: {} ({}x{})",
        path.display(),
        grid.height(),
        grid.width(),
    );
    Ok(Input::Raster(grid))
}

/// One decomposition of `input`.
fn run_once(
    input: &Input,
    config: &DecomposeConfig,
) -> Result<(Geometry, Dimensions, DecomposeDiagnostics), String> {
    match input {
        Input::Raster(grid) => {
            let (geometry, diagnostics) =
                diagnostics::decompose_with_diagnostics(grid, config, &StdClock);
            Ok((geometry, grid.dimensions(), diagnostics))
        }
        Input::Image(bytes) => {
            let (result, diagnostics) =
                diagnostics::process_with_diagnostics(bytes, config, &StdClock)
                    .map_err(|e| format!("Pipeline error: {e}"))?;
            Ok((result.geometry, result.dimensions, diagnostics))
        }
    }
}

/// Write the interchange text to `--output`, or stdout without it.
fn write_geometry(geometry: &Geometry, output: Option<&Path>) -> Result<(), String> {
    let text = polypeel_export::to_geometry_text(geometry);
    match output {
        Some(path) => {
            std::fs::write(path, &text)
                .map_err(|e| format!("Error writing geometry to {}: {e}", path.display()))?;
            eprintln!(
                "Geometry written to {} ({} bytes)",
                path.display(),
                text.len(),
            );
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn write_svg(
    cli: &Cli,
    config: &DecomposeConfig,
    geometry: &Geometry,
    dimensions: Dimensions,
    svg_path: &Path,
) {
    let title = cli
        .input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("polypeel");
    let desc = format!("{config:?}");
    let config_json = serde_json::to_string(config).ok();
    let metadata = polypeel_export::SvgMetadata {
        title: Some(title),
        description: Some(&desc),
        config_json: config_json.as_deref(),
    };
    let svg = polypeel_export::to_svg(geometry, dimensions, &metadata);
    match std::fs::write(svg_path, &svg) {
        Ok(()) => {
            eprintln!(
                "SVG written to {} ({} bytes)",
                svg_path.display(),
                svg.len(),
            );
        }
        Err(e) => {
            eprintln!("Error writing SVG to {}: {e}", svg_path.display());
        }
    }
}

/// Diagnostics share stdout only when the geometry went to a file.
fn emit(text: &str, to_stdout: bool) {
    if to_stdout {
        println!("{text}");
    } else {
        eprintln!("{text}");
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let input = match read_input(&cli) {
        Ok(input) => input,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!("Config: {config:?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let diagnostics_to_stdout = cli.output.is_some();
    let mut all_diagnostics = Vec::with_capacity(cli.runs);

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let (geometry, dimensions, diagnostics) = match run_once(&input, &config) {
            Ok(outcome) => outcome,
            Err(msg) => {
                eprintln!("{msg}");
                return ExitCode::FAILURE;
            }
        };

        if cli.json {
            match serde_json::to_string_pretty(&diagnostics) {
                Ok(json) => emit(&json, diagnostics_to_stdout),
                Err(e) => {
                    eprintln!("Error serializing diagnostics: {e}");
                    return ExitCode::FAILURE;
                }
            }
        } else {
            emit(&diagnostics.report(), diagnostics_to_stdout);
        }

        // Outputs are deterministic, so only the first run writes them.
        if run == 0 {
            if let Err(msg) = write_geometry(&geometry, cli.output.as_deref()) {
                eprintln!("{msg}");
                return ExitCode::FAILURE;
            }
            if let Some(ref svg_path) = cli.svg {
                write_svg(&cli, &config, &geometry, dimensions, svg_path);
            }
        }

        all_diagnostics.push(diagnostics);

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        emit(
            &multi_run_summary(&all_diagnostics),
            diagnostics_to_stdout,
        );
    }

    ExitCode::SUCCESS
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Function pointer type for extracting a stage duration from diagnostics.
type StageExtractor = fn(&DecomposeDiagnostics) -> Option<Duration>;

/// Aggregated statistics across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn multi_run_summary(all_diagnostics: &[DecomposeDiagnostics]) -> String {
    let mut lines = vec![
        String::new(),
        format!("Summary ({} runs)\n{}", all_diagnostics.len(), "=".repeat(60)),
    ];

    if all_diagnostics.is_empty() {
        lines.push("Warning: no diagnostics to summarize".to_string());
        return lines.join("\n");
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.total_duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    lines.push(format!(
        "Total duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms"
    ));

    lines.push(String::new());
    lines.push(format!("{:<24} {:>12}", "Stage", "Mean (ms)"));
    lines.push("-".repeat(40));

    let stage_extractors: &[(&str, StageExtractor)] = &[
        ("Decode", |d| d.decode.as_ref().map(|s| s.duration)),
        ("Binarize", |d| d.binarize.as_ref().map(|s| s.duration)),
        ("Prepare", |d| Some(d.prepare.duration)),
        ("Peeling", |d| Some(d.peeling.duration)),
        ("Normalize", |d| Some(d.normalize.duration)),
    ];

    for (name, extractor) in stage_extractors {
        let stage_durations: Vec<f64> = all_diagnostics
            .iter()
            .filter_map(extractor)
            .map(|dur| dur.as_secs_f64() * 1000.0)
            .collect();

        if stage_durations.is_empty() {
            continue;
        }

        let stage_mean = stage_durations.iter().sum::<f64>() / stage_durations.len() as f64;
        lines.push(format!("{name:<24} {stage_mean:>10.3}ms"));
    }

    lines.join("\n")
}
