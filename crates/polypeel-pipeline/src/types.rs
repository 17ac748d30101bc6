//! Shared types for the polypeel decomposition pipeline.

use serde::{Deserialize, Serialize};

/// Raw raster code for a background cell.
pub const OFF: i64 = 0;

/// Raw raster code for a foreground cell.
pub const ON: i64 = 255;

/// Color of a single grid cell.
///
/// [`On`](Self::On) is the foreground ("ink"), [`Off`](Self::Off) the
/// background. Raw rasters encode them as [`ON`] and [`OFF`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Color {
    /// Background.
    #[default]
    Off,
    /// Foreground.
    On,
}

impl Color {
    /// The other color.
    #[must_use]
    pub const fn inverted(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }

    /// Raw raster code for this color.
    #[must_use]
    pub const fn code(self) -> i64 {
        match self {
            Self::Off => OFF,
            Self::On => ON,
        }
    }

    /// Parse a raw raster code. Returns `None` for anything but [`OFF`]/[`ON`].
    #[must_use]
    pub const fn from_code(code: i64) -> Option<Self> {
        match code {
            OFF => Some(Self::Off),
            ON => Some(Self::On),
            _ => None,
        }
    }
}

impl From<bool> for Color {
    fn from(on: bool) -> Self {
        if on { Self::On } else { Self::Off }
    }
}

/// Address of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cell {
    /// Row index, top to bottom.
    pub row: usize,
    /// Column index, left to right.
    pub col: usize,
}

impl Cell {
    /// The top-left cell.
    pub const ORIGIN: Self = Self::new(0, 0);

    /// Create a new cell address.
    #[must_use]
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Step by a signed `(d_row, d_col)` offset. `None` if either
    /// coordinate would go negative.
    #[must_use]
    pub const fn offset(self, (d_row, d_col): (isize, isize)) -> Option<Self> {
        match (
            self.row.checked_add_signed(d_row),
            self.col.checked_add_signed(d_col),
        ) {
            (Some(row), Some(col)) => Some(Self { row, col }),
            _ => None,
        }
    }
}

/// An integer vertex position `(row, col)`.
///
/// Traced polygons use cell positions; decomposed geometry uses
/// pixel-corner positions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// Vertical position.
    pub row: i32,
    /// Horizontal position.
    pub col: i32,
}

impl Point {
    /// Create a new point.
    #[must_use]
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// `true` if `other` differs from `self` in exactly one coordinate.
    #[must_use]
    pub const fn is_axis_aligned_with(self, other: Self) -> bool {
        (self.row == other.row) != (self.col == other.col)
    }
}

impl From<Cell> for Point {
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn from(cell: Cell) -> Self {
        Self::new(cell.row as i32, cell.col as i32)
    }
}

/// A closed polygon: the last vertex connects back to the first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Polygon(Vec<Point>);

impl Polygon {
    /// Create a polygon from its vertices in order.
    #[must_use]
    pub const fn new(points: Vec<Point>) -> Self {
        Self(points)
    }

    /// Returns `true` if the polygon has no vertices.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of vertices.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all vertices.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.0
    }

    /// Consumes the polygon and returns the underlying vertices.
    #[must_use]
    pub fn into_points(self) -> Vec<Point> {
        self.0
    }

    /// Edges as `(from, to)` pairs, including the closing edge.
    pub fn edges(&self) -> impl Iterator<Item = (Point, Point)> + '_ {
        self.0
            .iter()
            .zip(self.0.iter().cycle().skip(1))
            .map(|(&a, &b)| (a, b))
    }

    /// `true` if every edge, including the closing one, is horizontal
    /// or vertical.
    #[must_use]
    pub fn is_axis_aligned(&self) -> bool {
        self.edges().all(|(a, b)| a.is_axis_aligned_with(b))
    }
}

/// All polygons found at one nesting depth.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Layer(Vec<Polygon>);

impl Layer {
    /// Create a layer from its polygons.
    #[must_use]
    pub const fn new(polygons: Vec<Polygon>) -> Self {
        Self(polygons)
    }

    /// Returns `true` if the layer has no polygons.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of polygons.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all polygons.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        &self.0
    }

    /// Consumes the layer and returns the underlying polygons.
    #[must_use]
    pub fn into_polygons(self) -> Vec<Polygon> {
        self.0
    }

    /// Total vertices across all polygons.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.0.iter().map(Polygon::len).sum()
    }
}

/// Nested layers of polygons, outermost first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Geometry(Vec<Layer>);

impl Geometry {
    /// Create a geometry from its layers, outermost first.
    #[must_use]
    pub const fn new(layers: Vec<Layer>) -> Self {
        Self(layers)
    }

    /// Returns `true` if there are no layers.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of layers.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns a slice of all layers.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.0
    }

    /// Consumes the geometry and returns the underlying layers.
    #[must_use]
    pub fn into_layers(self) -> Vec<Layer> {
        self.0
    }

    /// Total polygons across all layers.
    #[must_use]
    pub fn polygon_count(&self) -> usize {
        self.0.iter().map(Layer::len).sum()
    }

    /// Total vertices across all layers.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.0.iter().map(Layer::vertex_count).sum()
    }
}

/// Grid dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    /// Number of rows.
    pub height: usize,
    /// Number of columns.
    pub width: usize,
}

impl Dimensions {
    /// Total cell count (`height * width`).
    #[must_use]
    pub const fn cell_count(self) -> usize {
        self.height * self.width
    }
}

/// How grayscale pixels are split into foreground and background.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Threshold {
    /// Pixels with luma at or below the level are foreground.
    Fixed(u8),
    /// Level chosen per image by Otsu's method.
    Otsu,
}

impl Default for Threshold {
    fn default() -> Self {
        Self::Fixed(DecomposeConfig::DEFAULT_THRESHOLD)
    }
}

/// Configuration for a decomposition run.
///
/// `threshold` and `invert` only apply when the input is an image that
/// has to be binarized first; a [`Grid`](crate::Grid) is used as-is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecomposeConfig {
    /// Binarization threshold for image input.
    pub threshold: Threshold,

    /// Swap foreground and background after thresholding.
    pub invert: bool,

    /// Stop after this many layers. `None` peels to the fixed point.
    pub max_layers: Option<usize>,
}

impl DecomposeConfig {
    /// Default fixed binarization level (mid-gray, dark side inclusive).
    pub const DEFAULT_THRESHOLD: u8 = 127;

    /// Default inversion setting.
    pub const DEFAULT_INVERT: bool = false;
}

impl Default for DecomposeConfig {
    fn default() -> Self {
        Self {
            threshold: Threshold::default(),
            invert: Self::DEFAULT_INVERT,
            max_layers: None,
        }
    }
}

/// Result of decomposing an image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessResult {
    /// Nested polygon layers, outermost first.
    pub geometry: Geometry,

    /// Dimensions of the source raster in pixels.
    ///
    /// Export serializers use this to set coordinate spaces
    /// (e.g., SVG `viewBox`).
    pub dimensions: Dimensions,
}

/// Errors that can occur while building a grid or decomposing it.
///
/// All variants except [`ImageDecode`](Self::ImageDecode) are caller
/// precondition violations, reported before any grid is touched.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The input has no cells (no rows, no columns, or empty image bytes).
    #[error("input is empty")]
    EmptyInput,

    /// A row's length differs from the first row's.
    #[error("row {row} has {actual} cells, expected {expected}")]
    InvalidShape {
        /// Index of the offending row.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        actual: usize,
    },

    /// A cell holds a value other than [`OFF`] or [`ON`].
    #[error("cell ({row}, {col}) holds {value}, expected {OFF} or {ON}")]
    InvalidColor {
        /// Row of the offending cell.
        row: usize,
        /// Column of the offending cell.
        col: usize,
        /// The value found.
        value: i64,
    },

    /// Flood fill connectivity other than 4 or 8.
    #[error("connectivity must be 4 or 8, got {0}")]
    InvalidConnectivity(u32),

    /// Failed to decode an input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),
}
