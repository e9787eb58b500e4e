//! Membership matching: range overlap and point-in-region containment.

pub mod filter;
pub mod overlap;
pub mod region;

pub use filter::{filter_options, FilterSelection};
pub use overlap::{
    match_candidates, match_candidates_indexed, overlaps_any, ranges_overlap, MatchSummary,
    ReferenceIndex,
};
pub use region::{
    export_regions, export_regions_counted, haversine_distance_m, points_in_region,
    ExportSummary,
};
