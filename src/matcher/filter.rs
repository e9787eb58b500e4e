//! State/city filter selection over a point dataset.
//!
//! The selection is an explicit value passed to every re-filter call; there
//! is no ambient UI state.

use ahash::AHashSet;
use std::collections::BTreeSet;

use crate::config::{CITY_FILTER_KEY, STATE_FILTER_KEY};
use crate::types::Point;

/// Selected states and cities. `None` for a dimension selects every value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    states: Option<AHashSet<String>>,
    cities: Option<AHashSet<String>>,
}

impl FilterSelection {
    /// Select everything.
    pub fn all() -> Self {
        Self::default()
    }

    /// Build a selection from explicit lists.
    pub fn from_lists(states: Option<Vec<String>>, cities: Option<Vec<String>>) -> Self {
        FilterSelection {
            states: states.map(|v| v.into_iter().collect()),
            cities: cities.map(|v| v.into_iter().collect()),
        }
    }

    /// True if no dimension is restricted.
    pub fn is_all(&self) -> bool {
        self.states.is_none() && self.cities.is_none()
    }

    /// A point passes when both its state and its city are selected.
    ///
    /// A point lacking a filter attribute only passes an unrestricted dimension.
    pub fn matches(&self, point: &Point) -> bool {
        selected(&self.states, point.attribute(STATE_FILTER_KEY))
            && selected(&self.cities, point.attribute(CITY_FILTER_KEY))
    }

    /// Points passing the selection, in input order.
    pub fn apply(&self, points: &[Point]) -> Vec<Point> {
        if self.is_all() {
            return points.to_vec();
        }
        points.iter().filter(|p| self.matches(p)).cloned().collect()
    }
}

fn selected(set: &Option<AHashSet<String>>, value: Option<&str>) -> bool {
    match set {
        None => true,
        Some(set) => value.is_some_and(|v| set.contains(v)),
    }
}

/// Sorted distinct states and cities present in `points`.
pub fn filter_options(points: &[Point]) -> (Vec<String>, Vec<String>) {
    let mut states = BTreeSet::new();
    let mut cities = BTreeSet::new();

    for point in points {
        if let Some(s) = point.attribute(STATE_FILTER_KEY) {
            states.insert(s.to_string());
        }
        if let Some(c) = point.attribute(CITY_FILTER_KEY) {
            cities.insert(c.to_string());
        }
    }

    (states.into_iter().collect(), cities.into_iter().collect())
}
