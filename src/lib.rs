//! cepmatch - Postal-code range coverage and drawn-region point matching library.
//!
//! This library answers two membership questions over tabular address data:
//! whether postal-code (CEP) ranges overlap a reference coverage set, and
//! which geo-located records fall inside regions drawn on a map.
//!
//! # Features
//!
//! - Closed-interval overlap of candidate ranges against a reference set,
//!   with a sorted index for large references
//! - Circle (haversine, meters) and polygon (boundary-inclusive) containment
//! - Export of contained points tagged with the region color, one row per
//!   region a point falls in
//! - State/city filter selection and an append-only drawing session
//! - Delimited range/point loaders and GeoJSON region loader (with gzip support)
//!
//! # Example
//!
//! ```ignore
//! use cepmatch::config::Config;
//! use cepmatch::matcher::{match_candidates_indexed, ReferenceIndex};
//! use cepmatch::parser::parse_ranges;
//! use std::path::Path;
//!
//! let config = Config::default();
//! let base = parse_ranges(Path::new("base.csv"), &config)?;
//! let streets = parse_ranges(Path::new("logradouros.csv"), &config)?;
//!
//! let index = ReferenceIndex::new(&base.ranges());
//! let matched = match_candidates_indexed(&streets.candidates, &index);
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod session;
pub mod types;

pub use config::Config;
pub use error::{ExportError, InputError};
pub use session::DrawingSession;
pub use types::{Attributes, Candidate, ExportedRow, Point, Range, Region, Shape, ShapeKind};
