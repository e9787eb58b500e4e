//! Loaders for range, point and drawn-region files.

pub mod points;
pub mod ranges;
pub mod regions;
pub mod util;

pub use points::{parse_points, PointData};
pub use ranges::{parse_ranges, RangeData};
pub use regions::parse_regions;
