//! Paint a [`Geometry`] back into a [`Grid`].
//!
//! Layers alternate between foreground and background: layer 0 paints
//! [`Color::On`], layer 1 carves [`Color::Off`] holes into it, layer 2
//! paints islands inside those holes, and so on. A pixel is inside a
//! polygon when its center is.

use crate::grid::Grid;
use crate::types::{Cell, Color, Dimensions, Geometry, Polygon};

/// `true` if the center of pixel `(row, col)` lies inside `polygon`,
/// by the even-odd rule.
///
/// Works on doubled coordinates (vertex `v` becomes `2v`, the pixel
/// center becomes `(2row + 1, 2col + 1)`) so the test ray never passes
/// through a vertex and no floating point is needed.
#[must_use]
pub fn contains(polygon: &Polygon, row: i64, col: i64) -> bool {
    let y = 2 * row + 1;
    let x = 2 * col + 1;
    let mut inside = false;
    for (a, b) in polygon.edges() {
        let (ay, ax) = (2 * i64::from(a.row), 2 * i64::from(a.col));
        let (by, bx) = (2 * i64::from(b.row), 2 * i64::from(b.col));
        if (ay > y) == (by > y) {
            continue;
        }
        // Crossing column: ax + (y - ay) * (bx - ax) / (by - ay).
        // Compare x against it without dividing.
        let dy = by - ay;
        let lhs = (x - ax) * dy;
        let rhs = (y - ay) * (bx - ax);
        let left_of_crossing = if dy > 0 { lhs < rhs } else { lhs > rhs };
        if left_of_crossing {
            inside = !inside;
        }
    }
    inside
}

/// Rasterize `geometry` onto a `dimensions`-sized grid.
///
/// Starts all [`Color::Off`]; even layers paint [`Color::On`], odd layers
/// paint [`Color::Off`], outermost first.
#[must_use]
pub fn rasterize(dimensions: Dimensions, geometry: &Geometry) -> Grid {
    let mut grid = Grid::filled(dimensions.height, dimensions.width, Color::Off);
    for (index, layer) in geometry.layers().iter().enumerate() {
        let color = Color::from(index % 2 == 0);
        for polygon in layer.polygons() {
            paint(&mut grid, polygon, color);
        }
    }
    grid
}

#[allow(clippy::cast_possible_wrap)]
fn paint(grid: &mut Grid, polygon: &Polygon, color: Color) {
    let Some((rows, cols)) = bounds(polygon, grid.dimensions()) else {
        return;
    };
    for row in rows {
        for col in cols.clone() {
            if contains(polygon, row as i64, col as i64) {
                grid.set(Cell::new(row, col), color);
            }
        }
    }
}

/// Pixel rows and columns covered by the polygon's bounding box, clipped
/// to the grid.
fn bounds(
    polygon: &Polygon,
    dimensions: Dimensions,
) -> Option<(std::ops::Range<usize>, std::ops::Range<usize>)> {
    let points = polygon.points();
    let min_row = points.iter().map(|p| p.row).min()?;
    let max_row = points.iter().map(|p| p.row).max()?;
    let min_col = points.iter().map(|p| p.col).min()?;
    let max_col = points.iter().map(|p| p.col).max()?;

    let clamp = |v: i32, limit: usize| usize::try_from(v.max(0)).map_or(0, |v| v.min(limit));
    let rows = clamp(min_row, dimensions.height)..clamp(max_row, dimensions.height);
    let cols = clamp(min_col, dimensions.width)..clamp(max_col, dimensions.width);
    Some((rows, cols))
}
