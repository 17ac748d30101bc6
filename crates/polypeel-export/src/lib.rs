//! polypeel-export: Pure format (de)serializers (sans-IO)
//!
//! Reads and writes the text formats around the decomposition core:
//! raster text in, geometry interchange text and SVG out. Every function
//! works on strings; file access belongs to the caller.

pub mod error;
pub mod geometry;
pub mod raster;
pub mod svg;

pub use error::ParseError;
pub use geometry::{parse_geometry_text, to_geometry_text};
pub use raster::{parse_raster, to_raster_text};
pub use svg::{SvgMetadata, build_path_data, to_svg};
