//! Point-in-region containment and export aggregation.
//!
//! Circles are tested with the haversine distance on the same spherical
//! earth the drawing map uses; polygons with a boundary-inclusive
//! point-in-polygon test on `(lon, lat)` coordinates.

use ahash::AHashSet;
use geo::{Coord, Intersects, LineString, Polygon};
use rayon::prelude::*;
use tracing::debug;

use crate::types::{Attributes, ExportedRow, Point, Region, Shape};

/// Earth radius in meters used by the map for distance queries.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Calculate the haversine distance between two points in meters.
///
/// # Arguments
/// * `lat1` - Latitude of first point in degrees
/// * `lon1` - Longitude of first point in degrees
/// * `lat2` - Latitude of second point in degrees
/// * `lon2` - Longitude of second point in degrees
#[inline]
pub fn haversine_distance_m(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lon = (lon2 - lon1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// A region with its geometry converted once for repeated containment tests.
#[derive(Debug, Clone)]
pub enum PreparedShape {
    Circle { lat: f64, lon: f64, radius_m: f64 },
    Polygon(Polygon<f64>),
}

impl PreparedShape {
    /// Prepare a shape. Polygon rings are taken as drawn.
    pub fn new(shape: &Shape) -> Self {
        match shape {
            Shape::Circle { lat, lon, radius_m } => PreparedShape::Circle {
                lat: *lat,
                lon: *lon,
                radius_m: *radius_m,
            },
            Shape::Polygon { ring } => {
                PreparedShape::Polygon(Polygon::new(LineString::from(ring.clone()), vec![]))
            }
        }
    }

    /// True if `point` lies inside or on the boundary of this shape.
    pub fn contains(&self, point: &Point) -> bool {
        match self {
            PreparedShape::Circle { lat, lon, radius_m } => {
                haversine_distance_m(*lat, *lon, point.lat, point.lon) <= *radius_m
            }
            PreparedShape::Polygon(polygon) => polygon.intersects(&Coord {
                x: point.lon,
                y: point.lat,
            }),
        }
    }
}

impl Region {
    /// Containment test for a single point.
    ///
    /// Prefer [`points_in_region`] for many points, which prepares the geometry once.
    pub fn contains(&self, point: &Point) -> bool {
        PreparedShape::new(&self.shape).contains(point)
    }
}

/// Points contained in `region`, in point order.
pub fn points_in_region<'a>(region: &Region, points: &'a [Point]) -> Vec<&'a Point> {
    let shape = PreparedShape::new(&region.shape);
    points.iter().filter(|p| shape.contains(p)).collect()
}

/// Copy `attributes` without the excluded keys.
pub fn strip_attributes(attributes: &Attributes, excluded: &AHashSet<String>) -> Attributes {
    attributes
        .iter()
        .filter(|(k, _)| !excluded.contains(k.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// Rows exported for one region.
pub fn export_region(
    region: &Region,
    points: &[Point],
    excluded: &AHashSet<String>,
) -> Vec<ExportedRow> {
    points_in_region(region, points)
        .into_iter()
        .map(|p| ExportedRow {
            attributes: strip_attributes(&p.attributes, excluded),
            region_color: region.color.clone(),
        })
        .collect()
}

/// Rows for every region, in drawing order, then point order.
///
/// A point inside `k` regions appears `k` times, once per region color.
pub fn export_regions(
    regions: &[Region],
    points: &[Point],
    excluded: &AHashSet<String>,
) -> Vec<ExportedRow> {
    export_regions_counted(regions, points, excluded).0
}

/// Like [`export_regions`], also returning the row count of each region.
pub fn export_regions_counted(
    regions: &[Region],
    points: &[Point],
    excluded: &AHashSet<String>,
) -> (Vec<ExportedRow>, Vec<usize>) {
    let per_region: Vec<Vec<ExportedRow>> = regions
        .par_iter()
        .map(|region| export_region(region, points, excluded))
        .collect();

    let counts: Vec<usize> = per_region.iter().map(Vec::len).collect();
    for (i, rows) in counts.iter().enumerate() {
        debug!(
            region = i,
            kind = %regions[i].shape.kind(),
            color = %regions[i].color,
            rows,
            "region matched"
        );
    }

    (per_region.into_iter().flatten().collect(), counts)
}

/// Counts over a region export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    pub regions: usize,
    pub rows: usize,
    /// Regions that contained no points.
    pub empty_regions: usize,
}

impl ExportSummary {
    /// Summarize an export from its per-region row counts.
    pub fn from_counts(counts: &[usize]) -> Self {
        ExportSummary {
            regions: counts.len(),
            rows: counts.iter().sum(),
            empty_regions: counts.iter().filter(|&&n| n == 0).count(),
        }
    }
}
