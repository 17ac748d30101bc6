//! Split a grid into same-color regions and trace the foreground ones.

use crate::disjoint::DisjointSet;
use crate::grid::Grid;
use crate::trace::trace_boundary;
use crate::types::{Color, Layer};

/// Trace one polygon per 4-connected [`Color::On`] region of `grid`.
///
/// Regions are found by merging every pair of edge-adjacent cells of the
/// same color. Each region is traced from its seed, the cell with the
/// smallest row-major index, and polygons are emitted in ascending seed
/// order. [`Color::Off`] regions are grouped too but produce nothing.
#[must_use]
pub fn segment(grid: &Grid) -> Layer {
    let mut regions = DisjointSet::new(grid.len());
    for index in 0..grid.len() {
        let cell = grid.cell_at(index);
        let color = grid.get(cell);
        // East and south cover every edge-adjacent pair once.
        for step in [(0, 1), (1, 0)] {
            if let Some(next) = grid.neighbor(cell, step)
                && grid.get(next) == color
                && let Some(next_index) = grid.index_of(next)
            {
                regions.merge(index, next_index);
            }
        }
    }

    let polygons = regions
        .group_members()
        .into_keys()
        .map(|seed| grid.cell_at(seed))
        .filter(|&seed| grid.get(seed) == Some(Color::On))
        .map(|seed| trace_boundary(grid, seed))
        .collect();
    Layer::new(polygons)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::Point;

    /// Parse an ascii grid: `#` is on, `.` is off.
    fn grid(rows: &[&str]) -> Grid {
        Grid::from_fn(rows.len(), rows[0].len(), |r, c| {
            Color::from(rows[r].as_bytes()[c] == b'#')
        })
    }

    fn pts(coords: &[(i32, i32)]) -> Vec<Point> {
        coords.iter().map(|&(r, c)| Point::new(r, c)).collect()
    }

    #[test]
    fn all_off_has_no_polygons() {
        let g = grid(&["....", "...."]);
        assert!(segment(&g).is_empty());
    }

    #[test]
    fn single_block() {
        let g = grid(&[
            "....", //
            ".##.", //
            ".##.", //
            "....",
        ]);
        let layer = segment(&g);
        assert_eq!(layer.len(), 1);
        assert_eq!(
            layer.polygons()[0].points(),
            pts(&[(1, 1), (1, 2), (2, 2), (2, 1)])
        );
    }

    #[test]
    fn polygons_ordered_by_seed() {
        let g = grid(&[
            "...##", //
            "...##", //
            "##...", //
            "##...",
        ]);
        let layer = segment(&g);
        assert_eq!(layer.len(), 2);
        assert_eq!(layer.polygons()[0].points()[0], Point::new(0, 3));
        assert_eq!(layer.polygons()[1].points()[0], Point::new(2, 0));
    }

    #[test]
    fn diagonal_touch_is_two_regions() {
        let g = grid(&[
            "##..", //
            "##..", //
            "..##", //
            "..##",
        ]);
        assert_eq!(segment(&g).len(), 2);
    }

    #[test]
    fn u_shape_is_one_region() {
        let g = grid(&[
            "##..##", //
            "##..##", //
            "######", //
            "######",
        ]);
        let layer = segment(&g);
        assert_eq!(layer.len(), 1);
        assert_eq!(
            layer.polygons()[0].points(),
            pts(&[
                (0, 0),
                (0, 1),
                (2, 1),
                (2, 4),
                (0, 4),
                (0, 5),
                (3, 5),
                (3, 0)
            ])
        );
    }
}
