//! SVG export serializer.
//!
//! Converts a [`Geometry`] into an SVG string using the [`svg`] crate for
//! document construction, XML escaping, and path data formatting.
//!
//! Each layer becomes a `<g>` group, filled black for foreground layers
//! (even indices) and white for hole layers (odd indices). Groups are
//! emitted outermost first so inner layers paint over outer ones. Each
//! polygon is one closed `<path>`. Coordinates map `col` to x and `row`
//! to y, with the `viewBox` spanning the source raster.
//!
//! Optional [`SvgMetadata`] embeds `<title>` and `<desc>` elements for
//! accessibility and to help file managers identify exported files.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Description, Element, Group, Path, Title};
use svg::node::{Node, Text, Value};

use polypeel_pipeline::{Dimensions, Geometry, Polygon};

/// Fill for foreground layers.
const FOREGROUND_FILL: &str = "black";

/// Fill for hole layers.
const BACKGROUND_FILL: &str = "white";

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically by
/// the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    ///
    /// Typically the source file name without extension.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized [`DecomposeConfig`](polypeel_pipeline::DecomposeConfig)
    /// JSON, emitted inside `<metadata>` in a namespaced
    /// `<polypeel:config>` element so exported files carry their settings.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute string for a closed polygon.
///
/// Uses `M` for the first vertex, `L` for the rest and `z` to close.
/// Returns an empty string for polygons with fewer than 3 vertices.
///
/// # Examples
///
/// ```
/// use polypeel_pipeline::{Point, Polygon};
/// use polypeel_export::build_path_data;
///
/// let square = Polygon::new(vec![
///     Point::new(0, 0),
///     Point::new(0, 2),
///     Point::new(2, 2),
///     Point::new(2, 0),
/// ]);
/// assert_eq!(build_path_data(&square), "M0,0 L2,0 L2,2 L0,2 z");
/// ```
#[must_use]
pub fn build_path_data(polygon: &Polygon) -> String {
    let points = polygon.points();
    if points.len() < 3 {
        return String::new();
    }

    let xy = |p: &polypeel_pipeline::Point| (f64::from(p.col), f64::from(p.row));
    let mut data = Data::new().move_to(xy(&points[0]));
    for p in &points[1..] {
        data = data.line_to(xy(p));
    }
    String::from(Value::from(data.close()))
}

/// Serialize a [`Geometry`] as an SVG document string.
///
/// The document is `dimensions.width` by `dimensions.height` user units.
/// Degenerate polygons (fewer than 3 vertices) are skipped; a layer left
/// with no paths still gets its (empty) group so layer indices line up.
#[must_use]
pub fn to_svg(geometry: &Geometry, dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("polypeel:config");
        config_el.assign("xmlns:polypeel", "https://polypeel.dev/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    for (index, layer) in geometry.layers().iter().enumerate() {
        let fill = if index % 2 == 0 {
            FOREGROUND_FILL
        } else {
            BACKGROUND_FILL
        };
        let mut group = Group::new()
            .set("id", format!("layer-{index}"))
            .set("fill", fill)
            .set("stroke", "none");
        for polygon in layer.polygons() {
            let d = build_path_data(polygon);
            if d.is_empty() {
                continue;
            }
            group = group.add(Path::new().set("d", d));
        }
        doc = doc.add(group);
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
