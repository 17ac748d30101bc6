//! Image decoding and binarization.
//!
//! Turns raw image bytes (PNG, JPEG, BMP, WebP) into the two-color
//! [`Grid`] the peeler consumes. Dark pixels are foreground.

use image::GrayImage;
use imageproc::contrast::{ThresholdType, otsu_level, threshold};

use crate::grid::Grid;
use crate::types::{Color, DecomposeConfig, PipelineError, Threshold};

/// Decode raw image bytes and convert to grayscale.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
#[must_use = "returns the decoded grayscale image"]
pub fn decode(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    let img = image::load_from_memory(bytes)?;
    Ok(img.to_luma8())
}

/// The luma level at or below which a pixel is foreground.
#[must_use]
pub fn level(gray: &GrayImage, method: Threshold) -> u8 {
    match method {
        Threshold::Fixed(t) => t,
        Threshold::Otsu => otsu_level(gray),
    }
}

/// Threshold a grayscale image into a [`Grid`].
///
/// Pixels with luma at or below the configured level become
/// [`Color::On`], brighter pixels [`Color::Off`]. With `config.invert`
/// the two are swapped.
#[must_use]
pub fn binarize(gray: &GrayImage, config: &DecomposeConfig) -> Grid {
    binarize_at(gray, level(gray, config.threshold), config.invert)
}

/// Threshold at an already chosen `level`, as returned by [`level`].
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn binarize_at(gray: &GrayImage, level: u8, invert: bool) -> Grid {
    let binary = threshold(gray, level, ThresholdType::BinaryInverted);
    Grid::from_fn(binary.height() as usize, binary.width() as usize, |row, col| {
        let color = Color::from(binary.get_pixel(col as u32, row as u32).0[0] > 0);
        if invert { color.inverted() } else { color }
    })
}
