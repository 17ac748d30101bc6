//! Two-color raster grid.
//!
//! A [`Grid`] is always rectangular and binary: the only ways to build one
//! from untrusted data ([`Grid::from_rows`]) validate both properties
//! before anything is stored.

use crate::types::{Cell, Color, Dimensions, PipelineError};

/// An H×W grid of [`Color`] cells stored row-major.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grid {
    height: usize,
    width: usize,
    cells: Vec<Color>,
}

impl Grid {
    /// A grid with every cell set to `color`.
    #[must_use]
    pub fn filled(height: usize, width: usize, color: Color) -> Self {
        Self {
            height,
            width,
            cells: vec![color; height * width],
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every cell.
    #[must_use]
    pub fn from_fn(height: usize, width: usize, mut f: impl FnMut(usize, usize) -> Color) -> Self {
        let mut cells = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                cells.push(f(row, col));
            }
        }
        Self {
            height,
            width,
            cells,
        }
    }

    /// Validate raw raster rows and build a grid from them.
    ///
    /// Every row must have the length of the first, and every value must
    /// be [`OFF`](crate::OFF) or [`ON`](crate::ON). The shape is checked
    /// for all rows before any value is inspected.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::EmptyInput`] if there are no rows or the
    /// first row is empty, [`PipelineError::InvalidShape`] for a row of
    /// the wrong length, and [`PipelineError::InvalidColor`] for a value
    /// outside the two raster codes.
    pub fn from_rows<R: AsRef<[i64]>>(rows: &[R]) -> Result<Self, PipelineError> {
        let width = rows.first().map_or(0, |r| r.as_ref().len());
        if width == 0 {
            return Err(PipelineError::EmptyInput);
        }

        if let Some((row, actual)) = rows
            .iter()
            .map(|r| r.as_ref().len())
            .enumerate()
            .find(|&(_, len)| len != width)
        {
            return Err(PipelineError::InvalidShape {
                row,
                expected: width,
                actual,
            });
        }

        let mut cells = Vec::with_capacity(rows.len() * width);
        for (row, values) in rows.iter().enumerate() {
            for (col, &value) in values.as_ref().iter().enumerate() {
                let color = Color::from_code(value)
                    .ok_or(PipelineError::InvalidColor { row, col, value })?;
                cells.push(color);
            }
        }

        Ok(Self {
            height: rows.len(),
            width,
            cells,
        })
    }

    /// Number of rows.
    #[must_use]
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    #[must_use]
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height and width together.
    #[must_use]
    pub const fn dimensions(&self) -> Dimensions {
        Dimensions {
            height: self.height,
            width: self.width,
        }
    }

    /// Total number of cells.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the grid has no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major linear index of `cell`, or `None` if out of bounds.
    #[must_use]
    pub const fn index_of(&self, cell: Cell) -> Option<usize> {
        if cell.row < self.height && cell.col < self.width {
            Some(cell.row * self.width + cell.col)
        } else {
            None
        }
    }

    /// Cell at a row-major linear index.
    #[must_use]
    pub const fn cell_at(&self, index: usize) -> Cell {
        Cell::new(index / self.width, index % self.width)
    }

    /// Color at `cell`, or `None` if out of bounds.
    #[must_use]
    pub fn get(&self, cell: Cell) -> Option<Color> {
        self.index_of(cell).map(|i| self.cells[i])
    }

    /// Set the color at `cell`. Returns `false` if out of bounds.
    pub fn set(&mut self, cell: Cell, color: Color) -> bool {
        match self.index_of(cell) {
            Some(i) => {
                self.cells[i] = color;
                true
            }
            None => false,
        }
    }

    /// The in-bounds cell one `(d_row, d_col)` step away from `cell`.
    #[must_use]
    pub fn neighbor(&self, cell: Cell, step: (isize, isize)) -> Option<Cell> {
        cell.offset(step)
            .filter(|n| n.row < self.height && n.col < self.width)
    }

    /// All cells in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[Color] {
        &self.cells
    }

    /// Iterate over rows as slices.
    pub fn rows(&self) -> impl Iterator<Item = &[Color]> {
        self.cells.chunks_exact(self.width.max(1))
    }

    /// Number of cells holding `color`.
    #[must_use]
    pub fn count(&self, color: Color) -> usize {
        self.cells.iter().filter(|&&c| c == color).count()
    }

    /// Raw raster codes, one `Vec` per row.
    #[must_use]
    pub fn to_codes(&self) -> Vec<Vec<i64>> {
        self.rows()
            .map(|row| row.iter().map(|c| c.code()).collect())
            .collect()
    }

    /// Each cell expanded into a `factor`×`factor` block of its color.
    #[must_use]
    pub fn scaled(&self, factor: usize) -> Self {
        Self::from_fn(self.height * factor, self.width * factor, |row, col| {
            self.cells[(row / factor) * self.width + col / factor]
        })
    }

    /// The grid surrounded by a one-cell border of `border`.
    #[must_use]
    pub fn padded(&self, border: Color) -> Self {
        Self::from_fn(self.height + 2, self.width + 2, |row, col| {
            let inside = (1..=self.height).contains(&row) && (1..=self.width).contains(&col);
            if inside {
                self.cells[(row - 1) * self.width + (col - 1)]
            } else {
                border
            }
        })
    }

    /// Mask of the cells whose color is the same in `before` and `after`:
    /// [`Color::On`] where unchanged, [`Color::Off`] where changed.
    ///
    /// Both grids must have the same dimensions.
    #[must_use]
    pub fn unchanged_between(before: &Self, after: &Self) -> Self {
        debug_assert_eq!(before.dimensions(), after.dimensions());
        Self {
            height: before.height,
            width: before.width,
            cells: before
                .cells
                .iter()
                .zip(&after.cells)
                .map(|(a, b)| Color::from(a == b))
                .collect(),
        }
    }
}
