//! Geometry interchange text.
//!
//! ```text
//! N                     layer count
//!
//! M v1 v2 ... vM        polygon count, then each polygon's vertex count
//! r c                   v1 vertices of polygon 1, then polygon 2, ...
//! ...
//!
//! M ...                 next layer
//! ```
//!
//! Writing is canonical: reading and writing back reproduces the input
//! byte for byte.

use std::fmt::Write;

use polypeel_pipeline::{Geometry, Layer, Point, Polygon};

use crate::error::{ParseError, Tokens};

/// Serialize a [`Geometry`] as interchange text.
#[must_use]
pub fn to_geometry_text(geometry: &Geometry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", geometry.len());
    for layer in geometry.layers() {
        let _ = write!(out, "\n{}", layer.len());
        for polygon in layer.polygons() {
            let _ = write!(out, " {}", polygon.len());
        }
        out.push('\n');
        for point in layer.polygons().iter().flat_map(Polygon::points) {
            let _ = writeln!(out, "{} {}", point.row, point.col);
        }
    }
    out
}

/// Parse interchange text into a [`Geometry`].
///
/// # Errors
///
/// Returns a [`ParseError`] for missing or malformed tokens, negative
/// counts, or tokens left after the last vertex.
pub fn parse_geometry_text(text: &str) -> Result<Geometry, ParseError> {
    let mut tokens = Tokens::new(text);
    let layer_count = tokens.count("layer count")?;

    let mut layers = Vec::new();
    for _ in 0..layer_count {
        let polygon_count = tokens.count("polygon count")?;
        let vertex_counts = (0..polygon_count)
            .map(|_| tokens.count("vertex count"))
            .collect::<Result<Vec<_>, _>>()?;

        let mut polygons = Vec::with_capacity(polygon_count);
        for vertex_count in vertex_counts {
            let mut points = Vec::new();
            for _ in 0..vertex_count {
                let row = tokens.coord("vertex row")?;
                let col = tokens.coord("vertex column")?;
                points.push(Point::new(row, col));
            }
            polygons.push(Polygon::new(points));
        }
        layers.push(Layer::new(polygons));
    }
    tokens.finish()?;

    Ok(Geometry::new(layers))
}
