//! polypeel-pipeline: nested polygon decomposition of binary rasters (sans-IO).
//!
//! Turns a two-color raster into layers of axis-aligned polygons, one
//! layer per nesting depth: outlines of the foreground, then the holes in
//! it, then the islands in those holes, and so on.
//!
//! ```text
//! grid -> double + pad -> { flood fill -> diff -> segment -> trace }* -> normalize
//! ```
//!
//! Image input is decoded and thresholded into a grid first.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! values and byte slices and returns structured data. Text formats live
//! in `polypeel-export`, the command line in `polypeel-cli`.

pub mod decompose;
pub mod diagnostics;
pub mod disjoint;
pub mod fill;
pub mod grid;
pub mod raster;
pub mod render;
pub mod segment;
pub mod trace;
pub mod types;

pub use decompose::{Peel, Peeler, decompose, decompose_rows, decompose_with_config};
pub use diagnostics::{Clock, DecomposeDiagnostics, decompose_with_diagnostics};
pub use disjoint::DisjointSet;
pub use fill::{Connectivity, flood_fill};
pub use grid::Grid;
pub use render::rasterize;
pub use segment::segment;
pub use trace::{simplify_polygon, simplify_trace, trace_boundary};
pub use types::{
    Cell, Color, DecomposeConfig, Dimensions, Geometry, Layer, OFF, ON, PipelineError, Point,
    Polygon, ProcessResult, Threshold,
};

/// Decode an image, threshold it, and decompose it.
///
/// Takes raw image bytes (PNG, JPEG, BMP, WebP). Dark pixels are
/// foreground unless `config.invert` is set.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `image_bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is unrecognized.
pub fn process(
    image_bytes: &[u8],
    config: &DecomposeConfig,
) -> Result<ProcessResult, PipelineError> {
    let gray = raster::decode(image_bytes)?;
    let grid = raster::binarize(&gray, config);
    Ok(ProcessResult {
        geometry: decompose_with_config(&grid, config),
        dimensions: grid.dimensions(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    /// PNG of a white image with a black rectangle over `rows` x `cols`.
    fn dark_rect_png(
        width: u32,
        height: u32,
        rows: std::ops::Range<u32>,
        cols: std::ops::Range<u32>,
    ) -> Vec<u8> {
        let img = image::RgbaImage::from_fn(width, height, |x, y| {
            if rows.contains(&y) && cols.contains(&x) {
                image::Rgba([0, 0, 0, 255])
            } else {
                image::Rgba([255, 255, 255, 255])
            }
        });
        let mut buf = Vec::new();
        let encoder = image::codecs::png::PngEncoder::new(&mut buf);
        image::ImageEncoder::write_image(
            encoder,
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
        buf
    }

    #[test]
    fn process_empty_input() {
        let result = process(&[], &DecomposeConfig::default());
        assert!(matches!(result, Err(PipelineError::EmptyInput)));
    }

    #[test]
    fn process_corrupt_input() {
        let result = process(&[0xFF, 0x00], &DecomposeConfig::default());
        assert!(matches!(result, Err(PipelineError::ImageDecode(_))));
    }

    #[test]
    fn process_dark_square_gives_one_layer() {
        let png = dark_rect_png(8, 6, 1..4, 2..7);
        let result = process(&png, &DecomposeConfig::default()).unwrap();
        assert_eq!(
            result.dimensions,
            Dimensions {
                width: 8,
                height: 6
            }
        );
        assert_eq!(
            result.geometry,
            Geometry::new(vec![Layer::new(vec![Polygon::new(vec![
                Point::new(1, 2),
                Point::new(1, 7),
                Point::new(4, 7),
                Point::new(4, 2),
            ])])])
        );
    }

    #[test]
    fn process_white_image_has_no_layers() {
        let png = dark_rect_png(5, 5, 0..0, 0..0);
        let result = process(&png, &DecomposeConfig::default()).unwrap();
        assert!(result.geometry.is_empty());
    }

    #[test]
    fn process_inverted_white_image_is_one_rectangle() {
        let png = dark_rect_png(5, 3, 0..0, 0..0);
        let config = DecomposeConfig {
            invert: true,
            ..DecomposeConfig::default()
        };
        let result = process(&png, &config).unwrap();
        assert_eq!(result.geometry.len(), 1);
        assert_eq!(
            result.geometry.layers()[0].polygons()[0].points()[2],
            Point::new(3, 5)
        );
    }

    #[test]
    fn process_honors_max_layers() {
        // Dark frame with a white hole: two layers unless limited.
        let img = image::GrayImage::from_fn(6, 6, |x, y| {
            let inner = (2..4).contains(&x) && (2..4).contains(&y);
            image::Luma([if inner { 255 } else { 0 }])
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
        .unwrap();

        let full = process(&buf, &DecomposeConfig::default()).unwrap();
        assert_eq!(full.geometry.len(), 2);

        let config = DecomposeConfig {
            max_layers: Some(1),
            ..DecomposeConfig::default()
        };
        let limited = process(&buf, &config).unwrap();
        assert_eq!(limited.geometry.layers(), &full.geometry.layers()[..1]);
    }

    #[test]
    fn public_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Grid>();
        assert_send_sync::<Geometry>();
        assert_send_sync::<DecomposeConfig>();
        assert_send_sync::<DecomposeDiagnostics>();
        assert_send_sync::<PipelineError>();
    }
}
