//! Core data structures for cepmatch.
//!
//! This module contains the records passed between the loaders, the two
//! matchers and the exporter.

use indexmap::IndexMap;
use std::fmt;

/// Ordered pass-through columns of an input row.
///
/// Keys keep the order of the input header so that exported files keep the
/// column layout the user supplied.
pub type Attributes = IndexMap<String, String>;

/// An inclusive numeric interval (postal code bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: i64,
    pub end: i64,
}

impl Range {
    /// Create a new range. Inverted bounds are accepted as given.
    pub fn new(start: i64, end: i64) -> Self {
        Range { start, end }
    }

    /// True when `start > end`.
    pub fn is_malformed(&self) -> bool {
        self.start > self.end
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// A range under test plus the row it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub range: Range,
    pub attributes: Attributes,
    /// Set by the overlap matcher; false until then.
    pub belongs: bool,
}

impl Candidate {
    /// Create a new, unmatched candidate.
    pub fn new(range: Range, attributes: Attributes) -> Self {
        Candidate {
            range,
            attributes,
            belongs: false,
        }
    }

    /// Copy of this candidate with the match result recorded.
    pub fn with_belongs(&self, belongs: bool) -> Self {
        Candidate {
            range: self.range,
            attributes: self.attributes.clone(),
            belongs,
        }
    }
}

/// A geo-located record.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub lat: f64,
    pub lon: f64,
    pub attributes: Attributes,
}

impl Point {
    /// Create a new point.
    pub fn new(lat: f64, lon: f64, attributes: Attributes) -> Self {
        Point {
            lat,
            lon,
            attributes,
        }
    }

    /// Look up a pass-through attribute.
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Geometry of a drawn region.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Center in degrees, radius in meters.
    Circle { lat: f64, lon: f64, radius_m: f64 },
    /// Exterior ring as `(lon, lat)` pairs, in the order the drawing tool
    /// emitted them.
    Polygon { ring: Vec<(f64, f64)> },
}

impl Shape {
    /// Kind of this shape.
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Circle { .. } => ShapeKind::Circle,
            Shape::Polygon { .. } => ShapeKind::Polygon,
        }
    }
}

/// Geometry kind, as named in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Circle,
    Polygon,
}

impl ShapeKind {
    /// Convert shape kind to string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            ShapeKind::Circle => "circle",
            ShapeKind::Polygon => "polygon",
        }
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A drawn shape tagged with the color it was drawn in.
#[derive(Debug, Clone, PartialEq)]
pub struct Region {
    pub color: String,
    pub shape: Shape,
}

impl Region {
    /// Create a new region.
    pub fn new(color: impl Into<String>, shape: Shape) -> Self {
        Region {
            color: color.into(),
            shape,
        }
    }

    /// Circle region centered on `(lat, lon)`.
    pub fn circle(color: impl Into<String>, lat: f64, lon: f64, radius_m: f64) -> Self {
        Region::new(color, Shape::Circle { lat, lon, radius_m })
    }

    /// Polygon region from a `(lon, lat)` ring.
    pub fn polygon(color: impl Into<String>, ring: Vec<(f64, f64)>) -> Self {
        Region::new(color, Shape::Polygon { ring })
    }
}

/// A point's attributes as exported for one region.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportedRow {
    pub attributes: Attributes,
    pub region_color: String,
}
