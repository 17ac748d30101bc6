//! Decomposition diagnostics: timing, counts, and per-layer metrics.
//!
//! [`decompose_with_diagnostics`] and [`process_with_diagnostics`] produce
//! the same geometry as their plain counterparts and record how long each
//! stage took and what it produced along the way.
//!
//! Time is read through the [`Clock`] trait so this crate never touches a
//! platform time API; the caller supplies the clock.
//!
//! Durations are serialized as fractional seconds (`f64`) for JSON
//! compatibility, since `std::time::Duration` does not implement serde
//! traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::decompose::{Peeler, normalize_layer};
use crate::grid::Grid;
use crate::raster;
use crate::types::{
    Color, DecomposeConfig, Dimensions, Geometry, Layer, PipelineError, ProcessResult,
};

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Source of timestamps for diagnostics.
pub trait Clock {
    /// Opaque timestamp.
    type Instant;

    /// The current time.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Diagnostics collected from a single decomposition.
///
/// Image stages are `None` when the input was already a [`Grid`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecomposeDiagnostics {
    /// Image decoding and grayscale conversion.
    pub decode: Option<StageDiagnostics>,
    /// Thresholding into a grid.
    pub binarize: Option<StageDiagnostics>,
    /// Doubling and padding the grid.
    pub prepare: StageDiagnostics,
    /// The whole peeling loop, including the terminating fill.
    pub peeling: StageDiagnostics,
    /// One entry per emitted layer, outermost first.
    pub layers: Vec<LayerDiagnostics>,
    /// Mapping traced vertices back to source coordinates.
    pub normalize: StageDiagnostics,
    /// Total wall-clock duration (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts.
    pub summary: DecomposeSummary,
}

/// Diagnostics for a single stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Image decoding metrics.
    Decode {
        /// Size of the input image bytes.
        input_bytes: usize,
        /// Decoded image width in pixels.
        width: u32,
        /// Decoded image height in pixels.
        height: u32,
    },
    /// Thresholding metrics.
    Binarize {
        /// Luma level at or below which pixels became foreground.
        level: u8,
        /// Whether foreground and background were swapped afterwards.
        inverted: bool,
        /// Foreground cells in the resulting grid.
        foreground_count: usize,
    },
    /// Grid preparation metrics.
    Prepare {
        /// Source grid dimensions.
        source: Dimensions,
        /// Working grid dimensions after doubling and padding.
        working: Dimensions,
    },
    /// Peeling loop metrics.
    Peeling {
        /// Fills run, including a terminating one.
        iterations: usize,
        /// Layers emitted.
        layer_count: usize,
        /// Layer limit in effect, if any.
        max_layers: Option<usize>,
    },
    /// Coordinate normalization metrics.
    Normalize {
        /// Polygons normalized.
        polygon_count: usize,
        /// Vertices normalized.
        vertex_count: usize,
    },
}

/// Diagnostics for one emitted layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayerDiagnostics {
    /// Zero-based layer index.
    pub index: usize,
    /// Color the fill painted.
    pub fill: Color,
    /// Working cells recolored by the fill.
    pub filled: usize,
    /// Working cells the fill did not reach.
    pub unchanged: usize,
    /// Polygons traced.
    pub polygon_count: usize,
    /// Vertices across those polygons.
    pub vertex_count: usize,
    /// Fill, difference and tracing time (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

/// High-level summary counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecomposeSummary {
    /// Source grid dimensions.
    pub dimensions: Dimensions,
    /// Foreground cells in the source grid.
    pub foreground_count: usize,
    /// Layers in the output geometry.
    pub layer_count: usize,
    /// Polygons in the output geometry.
    pub polygon_count: usize,
    /// Vertices in the output geometry.
    pub vertex_count: usize,
}

impl DecomposeDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Decomposition Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Grid: {}x{} ({} cells, {} foreground)",
            self.summary.dimensions.width,
            self.summary.dimensions.height,
            self.summary.dimensions.cell_count(),
            self.summary.foreground_count,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let mut stages: Vec<(&str, &StageDiagnostics)> = Vec::new();
        if let Some(ref decode) = self.decode {
            stages.push(("Decode", decode));
        }
        if let Some(ref binarize) = self.binarize {
            stages.push(("Binarize", binarize));
        }
        stages.push(("Prepare", &self.prepare));
        stages.push(("Peeling", &self.peeling));
        stages.push(("Normalize", &self.normalize));

        for (name, diag) in &stages {
            let ms = duration_ms(diag.duration);
            let pct = percent(ms, total_ms);
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        if !self.layers.is_empty() {
            lines.push(String::new());
            lines.push(format!(
                "{:<8} {:<6} {:>10} {:>10} {:>9} {:>9} {:>10}",
                "Layer", "Fill", "Filled", "Unchanged", "Polygons", "Vertices", "Duration"
            ));
            lines.push("-".repeat(68));
            for layer in &self.layers {
                let fill = match layer.fill {
                    Color::On => "on",
                    Color::Off => "off",
                };
                lines.push(format!(
                    "{:<8} {:<6} {:>10} {:>10} {:>9} {:>9} {:>8.3}ms",
                    layer.index,
                    fill,
                    layer.filled,
                    layer.unchanged,
                    layer.polygon_count,
                    layer.vertex_count,
                    duration_ms(layer.duration),
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "Layers: {}  |  Polygons: {}  |  Vertices: {}",
            self.summary.layer_count, self.summary.polygon_count, self.summary.vertex_count,
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

fn percent(part_ms: f64, total_ms: f64) -> f64 {
    if total_ms > 0.0 {
        part_ms / total_ms * 100.0
    } else {
        0.0
    }
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Decode {
            input_bytes,
            width,
            height,
        } => format!("{input_bytes} bytes -> {width}x{height}"),
        StageMetrics::Binarize {
            level,
            inverted,
            foreground_count,
        } => {
            let inverted = if *inverted { " inverted" } else { "" };
            format!("level={level}{inverted} foreground={foreground_count}")
        }
        StageMetrics::Prepare { source, working } => format!(
            "{}x{} -> {}x{}",
            source.width, source.height, working.width, working.height
        ),
        StageMetrics::Peeling {
            iterations,
            layer_count,
            max_layers,
        } => {
            let limit = max_layers.map_or_else(String::new, |n| format!(" (max {n})"));
            format!("{iterations} fills, {layer_count} layers{limit}")
        }
        StageMetrics::Normalize {
            polygon_count,
            vertex_count,
        } => format!("{polygon_count} polygons, {vertex_count} vertices"),
    }
}

/// Decompose `grid` like [`decompose_with_config`](crate::decompose_with_config),
/// recording diagnostics.
#[must_use]
pub fn decompose_with_diagnostics<C: Clock>(
    grid: &Grid,
    config: &DecomposeConfig,
    clock: &C,
) -> (Geometry, DecomposeDiagnostics) {
    let start = clock.now();
    let (geometry, mut diagnostics) = peel_with_diagnostics(grid, config, clock);
    diagnostics.total_duration = clock.elapsed(&start);
    (geometry, diagnostics)
}

/// Decode, binarize and decompose an image like [`process`](crate::process),
/// recording diagnostics.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] for empty bytes and
/// [`PipelineError::ImageDecode`] for data that is not a supported image.
pub fn process_with_diagnostics<C: Clock>(
    image_bytes: &[u8],
    config: &DecomposeConfig,
    clock: &C,
) -> Result<(ProcessResult, DecomposeDiagnostics), PipelineError> {
    let start = clock.now();

    let t = clock.now();
    let gray = raster::decode(image_bytes)?;
    let decode = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Decode {
            input_bytes: image_bytes.len(),
            width: gray.width(),
            height: gray.height(),
        },
    };

    let t = clock.now();
    let level = raster::level(&gray, config.threshold);
    let grid = raster::binarize_at(&gray, level, config.invert);
    let binarize = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Binarize {
            level,
            inverted: config.invert,
            foreground_count: grid.count(Color::On),
        },
    };

    let (geometry, mut diagnostics) = peel_with_diagnostics(&grid, config, clock);
    diagnostics.decode = Some(decode);
    diagnostics.binarize = Some(binarize);
    diagnostics.total_duration = clock.elapsed(&start);

    let result = ProcessResult {
        geometry,
        dimensions: grid.dimensions(),
    };
    Ok((result, diagnostics))
}

/// Prepare, peel and normalize with per-stage timing. `total_duration` is
/// left for the caller to fill in.
fn peel_with_diagnostics<C: Clock>(
    grid: &Grid,
    config: &DecomposeConfig,
    clock: &C,
) -> (Geometry, DecomposeDiagnostics) {
    let t = clock.now();
    let mut peeler = Peeler::new(grid);
    let prepare = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Prepare {
            source: grid.dimensions(),
            working: peeler.working().dimensions(),
        },
    };

    let limit = config.max_layers.unwrap_or(usize::MAX);
    let peeling_start = clock.now();
    let mut traced: Vec<Layer> = Vec::new();
    let mut layers = Vec::new();
    while traced.len() < limit {
        let t = clock.now();
        let Some(peel) = peeler.next() else {
            break;
        };
        layers.push(LayerDiagnostics {
            index: peel.index,
            fill: peel.fill,
            filled: peel.filled,
            unchanged: peel.unchanged,
            polygon_count: peel.layer.len(),
            vertex_count: peel.layer.vertex_count(),
            duration: clock.elapsed(&t),
        });
        traced.push(peel.layer);
    }
    let peeling = StageDiagnostics {
        duration: clock.elapsed(&peeling_start),
        metrics: StageMetrics::Peeling {
            iterations: peeler.iterations(),
            layer_count: traced.len(),
            max_layers: config.max_layers,
        },
    };

    let t = clock.now();
    let geometry = Geometry::new(traced.iter().map(normalize_layer).collect());
    let normalize = StageDiagnostics {
        duration: clock.elapsed(&t),
        metrics: StageMetrics::Normalize {
            polygon_count: geometry.polygon_count(),
            vertex_count: geometry.vertex_count(),
        },
    };

    let summary = DecomposeSummary {
        dimensions: grid.dimensions(),
        foreground_count: grid.count(Color::On),
        layer_count: geometry.len(),
        polygon_count: geometry.polygon_count(),
        vertex_count: geometry.vertex_count(),
    };

    let diagnostics = DecomposeDiagnostics {
        decode: None,
        binarize: None,
        prepare,
        peeling,
        layers,
        normalize,
        total_duration: Duration::ZERO,
        summary,
    };
    (geometry, diagnostics)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::cell::Cell as StdCell;

    use super::*;
    use crate::decompose::{decompose, decompose_with_config};

    /// Deterministic clock: every `now()` advances one millisecond.
    struct TickClock(StdCell<u64>);

    impl TickClock {
        const fn new() -> Self {
            Self(StdCell::new(0))
        }
    }

    impl Clock for TickClock {
        type Instant = u64;

        fn now(&self) -> u64 {
            let t = self.0.get() + 1;
            self.0.set(t);
            t
        }

        fn elapsed(&self, since: &u64) -> Duration {
            Duration::from_millis(self.0.get() - since)
        }
    }

    fn nested_rings() -> Grid {
        Grid::from_fn(5, 5, |r, c| {
            let depth = r.min(c).min(4 - r).min(4 - c);
            Color::from(depth % 2 == 0)
        })
    }

    #[test]
    fn duration_ms_converts_correctly() {
        let ms = duration_ms(Duration::from_millis(1234));
        assert!((ms - 1234.0).abs() < 0.01);
    }

    #[test]
    fn geometry_matches_plain_decompose() {
        let grid = nested_rings();
        let (geometry, diag) =
            decompose_with_diagnostics(&grid, &DecomposeConfig::default(), &TickClock::new());
        assert_eq!(geometry, decompose(&grid));
        assert_eq!(diag.layers.len(), 3);
        assert_eq!(diag.summary.layer_count, 3);
        assert_eq!(diag.summary.polygon_count, 3);
        assert_eq!(diag.summary.vertex_count, 12);
        assert!(diag.decode.is_none());
    }

    #[test]
    fn peeling_counts_terminating_fill() {
        let (_, diag) = decompose_with_diagnostics(
            &nested_rings(),
            &DecomposeConfig::default(),
            &TickClock::new(),
        );
        assert!(matches!(
            diag.peeling.metrics,
            StageMetrics::Peeling {
                iterations: 4,
                layer_count: 3,
                max_layers: None,
            }
        ));
        let fills: Vec<Color> = diag.layers.iter().map(|l| l.fill).collect();
        assert_eq!(fills, vec![Color::On, Color::Off, Color::On]);
    }

    #[test]
    fn max_layers_is_honored() {
        let grid = nested_rings();
        let config = DecomposeConfig {
            max_layers: Some(1),
            ..DecomposeConfig::default()
        };
        let (geometry, diag) = decompose_with_diagnostics(&grid, &config, &TickClock::new());
        assert_eq!(geometry, decompose_with_config(&grid, &config));
        assert_eq!(diag.layers.len(), 1);
        assert!(matches!(
            diag.peeling.metrics,
            StageMetrics::Peeling { iterations: 1, .. }
        ));
    }

    #[test]
    fn total_covers_all_stages() {
        let (_, diag) = decompose_with_diagnostics(
            &nested_rings(),
            &DecomposeConfig::default(),
            &TickClock::new(),
        );
        let stages = diag.prepare.duration + diag.peeling.duration + diag.normalize.duration;
        assert!(diag.total_duration >= stages);
        let per_layer: Duration = diag.layers.iter().map(|l| l.duration).sum();
        assert!(diag.peeling.duration >= per_layer);
    }

    #[test]
    fn report_lists_stages_and_layers() {
        let (_, diag) = decompose_with_diagnostics(
            &nested_rings(),
            &DecomposeConfig::default(),
            &TickClock::new(),
        );
        let report = diag.report();
        assert!(report.contains("Decomposition Diagnostics Report"));
        assert!(report.contains("Peeling"));
        assert!(report.contains("4 fills, 3 layers"));
        assert!(report.contains("Layers: 3  |  Polygons: 3  |  Vertices: 12"));
        assert!(!report.contains("Decode"));
    }

    #[test]
    fn diagnostics_serde_round_trip() {
        let (_, diag) = decompose_with_diagnostics(
            &nested_rings(),
            &DecomposeConfig::default(),
            &TickClock::new(),
        );
        let json = serde_json::to_string(&diag).unwrap();
        let back: DecomposeDiagnostics = serde_json::from_str(&json).unwrap();
        assert_eq!(back.layers.len(), diag.layers.len());
        assert_eq!(back.total_duration, diag.total_duration);
    }

    #[test]
    fn negative_duration_is_rejected() {
        let json = r#"{"duration":-1.0,"metrics":{"Normalize":{"polygon_count":0,"vertex_count":0}}}"#;
        assert!(serde_json::from_str::<StageDiagnostics>(json).is_err());
    }

    #[test]
    fn process_records_image_stages() {
        let img = image::GrayImage::from_fn(4, 4, |x, y| {
            if (1..3).contains(&x) && (1..3).contains(&y) {
                image::Luma([0])
            } else {
                image::Luma([255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::L8,
        )
        .ok();

        let (result, diag) =
            process_with_diagnostics(&buf, &DecomposeConfig::default(), &TickClock::new())
                .unwrap();
        assert_eq!(result.geometry.len(), 1);
        assert!(matches!(
            diag.decode.as_ref().map(|d| &d.metrics),
            Some(StageMetrics::Decode {
                width: 4,
                height: 4,
                ..
            })
        ));
        assert!(matches!(
            diag.binarize.as_ref().map(|d| &d.metrics),
            Some(StageMetrics::Binarize {
                level: 127,
                foreground_count: 4,
                ..
            })
        ));
        assert!(diag.report().contains("Binarize"));
    }
}
