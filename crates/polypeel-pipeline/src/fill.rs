//! Flood fill over a [`Grid`].
//!
//! Breadth-first: a cell is recolored as soon as it is enqueued, so every
//! cell enters the queue at most once and the fill is linear in the size
//! of the connected region.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::grid::Grid;
use crate::types::{Cell, Color, PipelineError};

/// Neighbor offsets as `(d_row, d_col)`. The first four are the
/// edge-adjacent directions (E, S, W, N); the last four add the diagonals
/// (SE, SW, NW, NE).
pub const OFFSETS: [(isize, isize); 8] = [
    (0, 1),
    (1, 0),
    (0, -1),
    (-1, 0),
    (1, 1),
    (1, -1),
    (-1, -1),
    (-1, 1),
];

/// Which neighbors a flood fill may spread to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Connectivity {
    /// Edge-adjacent cells only.
    #[default]
    Four,
    /// Edge- and corner-adjacent cells.
    Eight,
}

impl Connectivity {
    /// Offsets visited by this connectivity.
    #[must_use]
    pub fn offsets(self) -> &'static [(isize, isize)] {
        match self {
            Self::Four => &OFFSETS[..4],
            Self::Eight => &OFFSETS,
        }
    }
}

impl TryFrom<u32> for Connectivity {
    type Error = PipelineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::Four),
            8 => Ok(Self::Eight),
            other => Err(PipelineError::InvalidConnectivity(other)),
        }
    }
}

/// Recolor the region of `start`'s color connected to `start` with
/// `replacement`.
///
/// Returns the number of cells recolored. Nothing happens (and 0 is
/// returned) if `start` is out of bounds or already holds `replacement`.
pub fn flood_fill(
    grid: &mut Grid,
    start: Cell,
    replacement: Color,
    connectivity: Connectivity,
) -> usize {
    let Some(target) = grid.get(start) else {
        return 0;
    };
    if target == replacement {
        return 0;
    }

    let mut queue = VecDeque::from([start]);
    grid.set(start, replacement);
    let mut filled = 1;

    while let Some(cell) = queue.pop_front() {
        for &step in connectivity.offsets() {
            let Some(next) = grid.neighbor(cell, step) else {
                continue;
            };
            if grid.get(next) == Some(target) {
                grid.set(next, replacement);
                queue.push_back(next);
                filled += 1;
            }
        }
    }

    filled
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{OFF, ON};

    /// Parse an ascii grid: `#` is on, `.` is off.
    fn grid(rows: &[&str]) -> Grid {
        Grid::from_fn(rows.len(), rows[0].len(), |r, c| {
            Color::from(rows[r].as_bytes()[c] == b'#')
        })
    }

    fn render(grid: &Grid) -> Vec<String> {
        grid.rows()
            .map(|row| {
                row.iter()
                    .map(|&c| if c == Color::On { '#' } else { '.' })
                    .collect()
            })
            .collect()
    }

    #[test]
    fn fills_enclosed_region_only() {
        let mut g = grid(&[
            ".....", //
            ".###.", //
            ".#.#.", //
            ".###.", //
            ".....",
        ]);
        let filled = flood_fill(&mut g, Cell::ORIGIN, Color::On, Connectivity::Four);
        assert_eq!(filled, 16);
        assert_eq!(
            render(&g),
            vec!["#####", "#####", "##.##", "#####", "#####"]
        );
    }

    #[test]
    fn four_connectivity_stops_at_diagonal_gap() {
        let mut g = grid(&[
            "#.", //
            ".#",
        ]);
        let filled = flood_fill(&mut g, Cell::ORIGIN, Color::Off, Connectivity::Four);
        assert_eq!(filled, 1);
        assert_eq!(render(&g), vec!["..", ".#"]);
    }

    #[test]
    fn eight_connectivity_crosses_diagonal() {
        let mut g = grid(&[
            "#.", //
            ".#",
        ]);
        let filled = flood_fill(&mut g, Cell::ORIGIN, Color::Off, Connectivity::Eight);
        assert_eq!(filled, 2);
        assert_eq!(g.count(Color::On), 0);
    }

    #[test]
    fn same_color_is_noop() {
        let mut g = grid(&["##", "#."]);
        let before = g.clone();
        assert_eq!(
            flood_fill(&mut g, Cell::ORIGIN, Color::On, Connectivity::Four),
            0
        );
        assert_eq!(g, before);
    }

    #[test]
    fn out_of_bounds_start_is_noop() {
        let mut g = grid(&["#."]);
        let before = g.clone();
        assert_eq!(
            flood_fill(&mut g, Cell::new(3, 0), Color::Off, Connectivity::Four),
            0
        );
        assert_eq!(g, before);
    }

    #[test]
    fn codes_after_fill() {
        let mut g = Grid::from_rows(&[vec![OFF, OFF], vec![OFF, ON]]).unwrap();
        flood_fill(&mut g, Cell::ORIGIN, Color::On, Connectivity::Four);
        assert_eq!(g.to_codes(), vec![vec![ON, ON], vec![ON, ON]]);
    }

    #[test]
    fn connectivity_from_u32() {
        assert_eq!(Connectivity::try_from(4).unwrap(), Connectivity::Four);
        assert_eq!(Connectivity::try_from(8).unwrap(), Connectivity::Eight);
        assert!(matches!(
            Connectivity::try_from(6),
            Err(PipelineError::InvalidConnectivity(6))
        ));
    }

    #[test]
    fn offsets_order() {
        assert_eq!(
            Connectivity::Four.offsets(),
            &[(0, 1), (1, 0), (0, -1), (-1, 0)]
        );
        assert_eq!(Connectivity::Eight.offsets().len(), 8);
    }
}
