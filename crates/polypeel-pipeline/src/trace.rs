//! Boundary tracing of a single same-color region.
//!
//! The tracer walks the outer boundary of the region containing a start
//! cell, keeping the region on its right: at each step it tries the four
//! compass directions beginning with the one after the last turn, takes
//! the first that stays inside the region, and then rotates its search
//! start one quarter-turn counter-clockwise. The walk ends when it returns
//! to the start cell.
//!
//! The start cell must be the region's top-left-most cell (smallest
//! row-major index), which the segmenter guarantees. From there the walk
//! is clockwise in screen coordinates (row down, column right).

use crate::grid::Grid;
use crate::types::{Cell, Point, Polygon};

/// Compass steps as `(d_row, d_col)` in search order: E, S, W, N.
pub const COMPASS: [(isize, isize); 4] = [(0, 1), (1, 0), (0, -1), (-1, 0)];

/// Trace the boundary of the region containing `start` and reduce it to
/// its corner vertices.
///
/// A region that is a single isolated cell has no boundary to walk; it is
/// returned as the unit square `(r, c), (r, c+1), (r+1, c+1), (r+1, c)`
/// spanning the cell. An out-of-bounds `start` yields an empty polygon.
#[must_use]
pub fn trace_boundary(grid: &Grid, start: Cell) -> Polygon {
    let walk = walk_boundary(grid, start);
    match walk.as_slice() {
        [] => Polygon::new(Vec::new()),
        [lone] => Polygon::new(unit_square(*lone)),
        _ => Polygon::new(simplify_trace(&walk)),
    }
}

/// The raw boundary walk: every visited cell in order, ending with the
/// start cell again once the loop closes.
///
/// The walk is bounded by four steps per grid cell, which a closed
/// boundary never reaches; a walk that hits the bound is returned as-is.
fn walk_boundary(grid: &Grid, start: Cell) -> Vec<Point> {
    let Some(color) = grid.get(start) else {
        return Vec::new();
    };

    let max_steps = 4 * grid.len();
    let mut walk = vec![Point::from(start)];
    let mut cursor = 0;
    let mut here = start;

    for _ in 0..max_steps {
        let step = (0..COMPASS.len())
            .map(|k| (cursor + k) % COMPASS.len())
            .find_map(|dir| {
                grid.neighbor(here, COMPASS[dir])
                    .filter(|&next| grid.get(next) == Some(color))
                    .map(|next| (dir, next))
            });

        // No same-color neighbor at all: an isolated cell.
        let Some((dir, next)) = step else {
            break;
        };

        walk.push(Point::from(next));
        here = next;
        cursor = (dir + COMPASS.len() - 1) % COMPASS.len();

        if next == start {
            break;
        }
    }

    walk
}

/// Reduce a closed walk (last point equal to the first) to its corners.
///
/// The first point is always kept. Each interior point is dropped when
/// it lies on a straight run, i.e. shares its row or its column with both
/// of its neighbors on the walk. The closing point is never emitted.
#[must_use]
pub fn simplify_trace(walk: &[Point]) -> Vec<Point> {
    let Some(&first) = walk.first() else {
        return Vec::new();
    };
    let mut vertices = vec![first];
    vertices.extend(
        walk.windows(3)
            .filter(|w| is_corner(w[0], w[1], w[2]))
            .map(|w| w[1]),
    );
    vertices
}

/// Drop straight-run vertices from an already closed polygon.
///
/// Unlike [`simplify_trace`], every vertex is judged against its cyclic
/// neighbors, so applying this twice changes nothing.
#[must_use]
pub fn simplify_polygon(polygon: &Polygon) -> Polygon {
    let points = polygon.points();
    if points.len() < 3 {
        return polygon.clone();
    }
    let n = points.len();
    let kept = (0..n)
        .filter(|&i| is_corner(points[(i + n - 1) % n], points[i], points[(i + 1) % n]))
        .map(|i| points[i])
        .collect();
    Polygon::new(kept)
}

/// `false` when `here` sits on a straight run between `prev` and `next`.
const fn is_corner(prev: Point, here: Point, next: Point) -> bool {
    let same_row = prev.row == here.row && here.row == next.row;
    let same_col = prev.col == here.col && here.col == next.col;
    !(same_row || same_col)
}

fn unit_square(cell: Point) -> Vec<Point> {
    vec![
        cell,
        Point::new(cell.row, cell.col + 1),
        Point::new(cell.row + 1, cell.col + 1),
        Point::new(cell.row + 1, cell.col),
    ]
}
