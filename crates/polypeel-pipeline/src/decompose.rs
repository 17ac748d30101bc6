//! Layer peeling: nested polygon decomposition of a two-color grid.
//!
//! The grid is first doubled (every cell becomes a 2×2 block, so no
//! region is thinner than two cells) and framed by a one-cell
//! [`Color::Off`] border that connects all outside background to the
//! corner `(0, 0)`.
//!
//! Each iteration flood-fills from that corner, alternating between
//! [`Color::On`] and [`Color::Off`]. The cells the fill did *not* reach
//! form a mask of everything enclosed by the current front; segmenting
//! that mask yields one layer. The next fill, in the other color, swallows
//! exactly the layer just emitted, so the front moves one nesting level
//! inward per iteration. Peeling stops when a fill reaches every cell.
//!
//! Traced vertices are cell positions in the doubled, padded grid.
//! [`normalize_polygon`] maps them back to pixel-corner coordinates of the
//! source image.

use std::iter::FusedIterator;

use crate::fill::{Connectivity, flood_fill};
use crate::grid::Grid;
use crate::segment::segment;
use crate::types::{Cell, Color, DecomposeConfig, Geometry, Layer, PipelineError, Point, Polygon};

/// Working cells per source pixel along each axis.
pub const SCALE: usize = 2;

/// [`SCALE`] as a coordinate offset.
const PIXEL: i32 = 2;

/// One peeling iteration that produced a layer.
#[derive(Debug, Clone)]
pub struct Peel {
    /// Zero-based iteration (and layer) index.
    pub index: usize,
    /// Color the fill painted.
    pub fill: Color,
    /// Cells recolored by the fill.
    pub filled: usize,
    /// Cells the fill did not reach.
    pub unchanged: usize,
    /// Traced polygons in working-grid coordinates, before
    /// [`normalize_layer`].
    pub layer: Layer,
}

/// Iterator over the layers of a grid, outermost first.
///
/// Yields one [`Peel`] per layer and ends at the fixed point. The number
/// of iterations is bounded by `min(H, W) + 2` of the source grid.
#[derive(Debug, Clone)]
pub struct Peeler {
    working: Grid,
    index: usize,
    max_iterations: usize,
    done: bool,
}

impl Peeler {
    /// Prepare `grid` for peeling: scale by [`SCALE`], then pad with
    /// [`Color::Off`].
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            working: grid.scaled(SCALE).padded(Color::Off),
            index: 0,
            max_iterations: grid.height().min(grid.width()) + 2,
            done: false,
        }
    }

    /// The working grid as left by the most recent fill.
    #[must_use]
    pub const fn working(&self) -> &Grid {
        &self.working
    }

    /// Number of fills run so far, including a terminating one.
    #[must_use]
    pub const fn iterations(&self) -> usize {
        self.index
    }

    /// Color painted by fill number `index`.
    ///
    /// Code 255 ([`Color::On`]) is ink here, so the padding border is
    /// background and the first fill paints foreground. Raster files that
    /// store white paper as 255 have to be inverted before peeling.
    #[must_use]
    pub const fn fill_color(index: usize) -> Color {
        if index % 2 == 0 { Color::On } else { Color::Off }
    }
}

impl Iterator for Peeler {
    type Item = Peel;

    fn next(&mut self) -> Option<Peel> {
        if self.done || self.index >= self.max_iterations {
            self.done = true;
            return None;
        }

        let index = self.index;
        let fill = Self::fill_color(index);
        self.index += 1;

        let mut after = self.working.clone();
        let filled = flood_fill(&mut after, Cell::ORIGIN, fill, Connectivity::Four);
        let mask = Grid::unchanged_between(&self.working, &after);
        self.working = after;

        let unchanged = mask.count(Color::On);
        if unchanged == 0 {
            self.done = true;
            return None;
        }

        Some(Peel {
            index,
            fill,
            filled,
            unchanged,
            layer: segment(&mask),
        })
    }
}

impl FusedIterator for Peeler {}

/// Decompose `grid` into nested layers of axis-aligned polygons,
/// outermost first, in pixel-corner coordinates.
#[must_use]
pub fn decompose(grid: &Grid) -> Geometry {
    Geometry::new(Peeler::new(grid).map(|peel| normalize_layer(&peel.layer)).collect())
}

/// Validate raw raster rows and decompose them.
///
/// # Errors
///
/// Returns the validation error from [`Grid::from_rows`] for ragged rows,
/// values other than [`OFF`](crate::OFF)/[`ON`](crate::ON), or empty input.
pub fn decompose_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Geometry, PipelineError> {
    Ok(decompose(&Grid::from_rows(rows)?))
}

/// [`decompose`], stopping after `config.max_layers` layers if set.
#[must_use]
pub fn decompose_with_config(grid: &Grid, config: &DecomposeConfig) -> Geometry {
    let limit = config.max_layers.unwrap_or(usize::MAX);
    Geometry::new(
        Peeler::new(grid)
            .take(limit)
            .map(|peel| normalize_layer(&peel.layer))
            .collect(),
    )
}

/// Map every polygon of a traced layer back to source coordinates.
#[must_use]
pub fn normalize_layer(layer: &Layer) -> Layer {
    Layer::new(layer.polygons().iter().map(normalize_polygon).collect())
}

/// Map a polygon traced on the doubled, padded grid to pixel-corner
/// coordinates of the source image.
///
/// Traced vertices sit on boundary cells, not on cell corners. A vertex
/// whose incoming or outgoing edge runs toward negative columns lies on
/// the bottom side of the region and is pushed down by one source pixel
/// (two working cells); likewise a vertex on an edge running toward
/// positive rows lies on the right side and is pushed right. Then the
/// padding is removed and the doubling undone.
#[must_use]
pub fn normalize_polygon(polygon: &Polygon) -> Polygon {
    let points = polygon.points();
    let n = points.len();
    let corrected = (0..n)
        .map(|i| {
            let prev = points[(i + n - 1) % n];
            let here = points[i];
            let next = points[(i + 1) % n];

            let toward_left = here.col < prev.col || next.col < here.col;
            let toward_down = here.row > prev.row || next.row > here.row;
            let row_shift = if toward_left { PIXEL } else { 0 };
            let col_shift = if toward_down { PIXEL } else { 0 };

            Point::new(
                (here.row + row_shift - 1) / PIXEL,
                (here.col + col_shift - 1) / PIXEL,
            )
        })
        .collect();
    Polygon::new(corrected)
}
