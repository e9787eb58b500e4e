//! Drawn-region parser.
//!
//! Regions arrive as a GeoJSON `FeatureCollection`, the format drawing tools
//! export. Circles are `Point` features carrying a `radius` property in
//! meters; polygons and rectangles are `Polygon` features.

use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::error::InputError;
use crate::parser::util::open_input;
use crate::session::DrawingSession;
use crate::types::Shape;

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
struct Feature {
    geometry: Option<Geometry>,
    #[serde(default)]
    properties: Option<Properties>,
}

#[derive(Debug, Default, Deserialize)]
struct Properties {
    color: Option<String>,
    radius: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum Geometry {
    Point { coordinates: Vec<f64> },
    Polygon { coordinates: Vec<Vec<Vec<f64>>> },
    #[serde(other)]
    Unsupported,
}

/// Parse a region file and append its regions to `session` in file order.
///
/// Returns the number of regions added.
pub fn parse_regions(path: &Path, session: &mut DrawingSession) -> Result<usize, InputError> {
    let reader = open_input(path)?;
    let added = parse_regions_reader(reader, session)?;
    info!(path = %path.display(), regions = added, "loaded drawn regions");
    Ok(added)
}

/// Parse regions from a reader.
///
/// The whole collection is validated before any region is appended, so a bad
/// feature leaves `session` unchanged.
pub fn parse_regions_reader<R: Read>(
    reader: R,
    session: &mut DrawingSession,
) -> Result<usize, InputError> {
    let collection: FeatureCollection = serde_json::from_reader(reader)?;

    let mut parsed = Vec::with_capacity(collection.features.len());
    for (index, feature) in collection.features.into_iter().enumerate() {
        let properties = feature.properties.unwrap_or_default();
        let geometry = feature.geometry.ok_or_else(|| invalid(index, "feature has no geometry"))?;
        let shape = to_shape(index, geometry, properties.radius)?;
        debug!(feature = index, kind = %shape.kind(), "parsed drawn region");
        parsed.push((shape, properties.color));
    }

    let added = parsed.len();
    for (shape, color) in parsed {
        session.draw(shape, color);
    }
    Ok(added)
}

fn to_shape(index: usize, geometry: Geometry, radius: Option<f64>) -> Result<Shape, InputError> {
    match geometry {
        Geometry::Point { coordinates } => {
            let (lon, lat) = position(index, &coordinates)?;
            let radius_m = radius.ok_or_else(|| invalid(index, "point feature without radius"))?;
            if !radius_m.is_finite() || radius_m < 0.0 {
                return Err(invalid(index, format!("invalid radius {}", radius_m)));
            }
            Ok(Shape::Circle { lat, lon, radius_m })
        }
        Geometry::Polygon { coordinates } => {
            let exterior = coordinates
                .into_iter()
                .next()
                .ok_or_else(|| invalid(index, "polygon has no rings"))?;
            if exterior.len() < 4 {
                return Err(invalid(
                    index,
                    format!("ring has {} positions, expected at least 4", exterior.len()),
                ));
            }
            let ring = exterior
                .iter()
                .map(|p| position(index, p))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Shape::Polygon { ring })
        }
        Geometry::Unsupported => Err(invalid(index, "unsupported geometry type")),
    }
}

/// `(lon, lat)` of a GeoJSON position.
fn position(index: usize, coordinates: &[f64]) -> Result<(f64, f64), InputError> {
    match coordinates {
        [lon, lat, ..] => Ok((*lon, *lat)),
        _ => Err(invalid(index, "position needs longitude and latitude")),
    }
}

fn invalid(index: usize, reason: impl Into<String>) -> InputError {
    InputError::InvalidGeometry {
        index,
        reason: reason.into(),
    }
}
