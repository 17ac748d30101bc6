//! Raster text format.
//!
//! ```text
//! H W
//! v v v ...   (H lines of W values, each 0 or 255)
//! ```

use std::fmt::Write;

use polypeel_pipeline::Grid;

use crate::error::{ParseError, Tokens};

/// Parse raster text into a [`Grid`].
///
/// # Errors
///
/// Returns a [`ParseError`] for missing or malformed tokens, trailing
/// tokens, or values that do not form a valid grid (zero size, or a value
/// other than 0 or 255).
pub fn parse_raster(text: &str) -> Result<Grid, ParseError> {
    let mut tokens = Tokens::new(text);
    let height = tokens.count("raster height")?;
    let width = tokens.count("raster width")?;

    // Header counts are untrusted; rows grow as values actually arrive.
    let mut rows = Vec::new();
    for _ in 0..height {
        let mut row = Vec::new();
        for _ in 0..width {
            row.push(tokens.int("raster value")?);
        }
        rows.push(row);
    }
    tokens.finish()?;

    Ok(Grid::from_rows(&rows)?)
}

/// Serialize a [`Grid`] as raster text.
#[must_use]
pub fn to_raster_text(grid: &Grid) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", grid.height(), grid.width());
    for row in grid.to_codes() {
        let line: Vec<String> = row.iter().map(ToString::to_string).collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use polypeel_pipeline::{Cell, Color, PipelineError};

    use super::*;

    #[test]
    fn parses_rows() {
        let grid = parse_raster("2 3\n255 0 255\n0 0 255\n").unwrap();
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.width(), 3);
        assert_eq!(grid.get(Cell::new(0, 2)), Some(Color::On));
        assert_eq!(grid.get(Cell::new(1, 1)), Some(Color::Off));
    }

    #[test]
    fn line_breaks_are_not_significant() {
        let a = parse_raster("2 2 255 0 0 255").unwrap();
        let b = parse_raster("2 2\n255 0\n0 255\n").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn writes_header_and_rows() {
        let grid = parse_raster("2 3 255 0 255 0 0 255").unwrap();
        assert_eq!(to_raster_text(&grid), "2 3\n255 0 255\n0 0 255\n");
    }

    #[test]
    fn missing_value_is_eof() {
        assert!(matches!(
            parse_raster("2 2\n255 0\n0"),
            Err(ParseError::UnexpectedEof {
                expected: "raster value"
            })
        ));
    }

    #[test]
    fn extra_value_is_trailing_data() {
        assert!(matches!(
            parse_raster("1 1\n255 0"),
            Err(ParseError::TrailingData { .. })
        ));
    }

    #[test]
    fn value_128_is_grid_error() {
        assert!(matches!(
            parse_raster("1 2\n255 128"),
            Err(ParseError::Grid(PipelineError::InvalidColor { value: 128, .. }))
        ));
    }

    #[test]
    fn zero_size_is_empty_input() {
        assert!(matches!(
            parse_raster("0 0"),
            Err(ParseError::Grid(PipelineError::EmptyInput))
        ));
    }

    #[test]
    fn oversized_header_is_eof_not_allocation() {
        for header in ["4611686018427387904 1\n255", "100000000000 1\n255", "1 100000000000\n255"] {
            assert!(
                matches!(
                    parse_raster(header),
                    Err(ParseError::UnexpectedEof {
                        expected: "raster value"
                    })
                ),
                "{header}"
            );
        }
    }

    #[test]
    fn negative_height_is_rejected() {
        assert!(matches!(
            parse_raster("-1 2"),
            Err(ParseError::NegativeCount { .. })
        ));
    }
}
