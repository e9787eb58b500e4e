//! Append-only list of regions drawn during one session.

use ahash::AHashSet;
use tracing::info;

use crate::config::DEFAULT_REGION_COLOR;
use crate::error::ExportError;
use crate::matcher::filter::FilterSelection;
use crate::matcher::region::{export_regions_counted, ExportSummary};
use crate::types::{ExportedRow, Point, Region, Shape};

/// Regions drawn so far, in drawing order.
#[derive(Debug, Clone)]
pub struct DrawingSession {
    regions: Vec<Region>,
    default_color: String,
}

impl Default for DrawingSession {
    fn default() -> Self {
        DrawingSession::new(DEFAULT_REGION_COLOR)
    }
}

impl DrawingSession {
    /// Create an empty session.
    pub fn new(default_color: impl Into<String>) -> Self {
        DrawingSession {
            regions: Vec::new(),
            default_color: default_color.into(),
        }
    }

    /// Append a finalized region and return its index.
    pub fn draw(&mut self, shape: Shape, color: Option<String>) -> usize {
        let color = color.unwrap_or_else(|| self.default_color.clone());
        self.regions.push(Region::new(color, shape));
        self.regions.len() - 1
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Re-filter `points` with `selection` and export every drawn region.
    pub fn export(
        &self,
        points: &[Point],
        selection: &FilterSelection,
        excluded: &AHashSet<String>,
    ) -> Result<Vec<ExportedRow>, ExportError> {
        self.export_with_summary(points, selection, excluded)
            .map(|(rows, _)| rows)
    }

    /// Same as [`DrawingSession::export`], with counts gathered during the export.
    pub fn export_with_summary(
        &self,
        points: &[Point],
        selection: &FilterSelection,
        excluded: &AHashSet<String>,
    ) -> Result<(Vec<ExportedRow>, ExportSummary), ExportError> {
        if self.regions.is_empty() {
            return Err(ExportError::NoRegions);
        }

        let visible = selection.apply(points);
        info!(
            points = points.len(),
            visible = visible.len(),
            regions = self.regions.len(),
            "exporting drawn regions"
        );

        let (rows, counts) = export_regions_counted(&self.regions, &visible, excluded);
        if rows.is_empty() {
            return Err(ExportError::NoPoints);
        }
        Ok((rows, ExportSummary::from_counts(&counts)))
    }
}
