//! Range-to-reference overlap matching logic.
//!
//! This module decides whether candidate postal-code ranges belong to a
//! reference coverage set. Bounds are closed on both sides: ranges that only
//! touch at an endpoint overlap.

use rayon::prelude::*;
use tracing::warn;

use crate::types::{Candidate, Range};

/// Closed-interval overlap test.
///
/// Applied literally to whatever bounds are given; inverted ranges are not
/// normalized.
#[inline]
pub fn ranges_overlap(a: &Range, b: &Range) -> bool {
    a.start <= b.end && a.end >= b.start
}

/// Check whether `range` overlaps any range of `reference` with a linear scan.
pub fn overlaps_any(range: &Range, reference: &[Range]) -> bool {
    reference.iter().any(|r| ranges_overlap(r, range))
}

/// Match candidates against a reference set using a linear scan per candidate.
///
/// Returns fresh candidates, in input order, with `belongs` set.
pub fn match_candidates(candidates: &[Candidate], reference: &[Range]) -> Vec<Candidate> {
    warn_malformed(candidates, reference);

    candidates
        .par_iter()
        .map(|c| c.with_belongs(overlaps_any(&c.range, reference)))
        .collect()
}

/// Match candidates against a pre-built [`ReferenceIndex`].
///
/// Produces the same result as [`match_candidates`] in O(log m) per candidate.
pub fn match_candidates_indexed(
    candidates: &[Candidate],
    index: &ReferenceIndex,
) -> Vec<Candidate> {
    warn_malformed(candidates, &[]);
    if index.malformed > 0 {
        warn!(
            count = index.malformed,
            "reference set has ranges with start > end; overlap applied as-is"
        );
    }

    candidates
        .par_iter()
        .map(|c| c.with_belongs(index.overlaps(&c.range)))
        .collect()
}

fn warn_malformed(candidates: &[Candidate], reference: &[Range]) {
    let bad_candidates = candidates.iter().filter(|c| c.range.is_malformed()).count();
    let bad_reference = reference.iter().filter(|r| r.is_malformed()).count();

    if bad_candidates > 0 {
        warn!(
            count = bad_candidates,
            "candidate ranges with start > end; overlap applied as-is"
        );
    }
    if bad_reference > 0 {
        warn!(
            count = bad_reference,
            "reference set has ranges with start > end; overlap applied as-is"
        );
    }
}

/// Reference set sorted by start, for binary-search lookups.
///
/// For the first `k` ranges in start order, `max_end[k - 1]` holds the largest
/// end seen. A query `[s, e]` overlaps some reference range iff, among the
/// ranges with `start <= e`, the largest end is `>= s`.
#[derive(Debug, Clone, Default)]
pub struct ReferenceIndex {
    starts: Vec<i64>,
    max_end: Vec<i64>,
    malformed: usize,
}

impl ReferenceIndex {
    /// Build an index over `reference`.
    pub fn new(reference: &[Range]) -> Self {
        let mut sorted: Vec<Range> = reference.to_vec();
        sorted.sort_by_key(|r| r.start);

        let mut starts = Vec::with_capacity(sorted.len());
        let mut max_end = Vec::with_capacity(sorted.len());
        let mut running = i64::MIN;

        for r in &sorted {
            running = running.max(r.end);
            starts.push(r.start);
            max_end.push(running);
        }

        ReferenceIndex {
            starts,
            max_end,
            malformed: reference.iter().filter(|r| r.is_malformed()).count(),
        }
    }

    /// Number of indexed ranges.
    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    /// Number of indexed ranges with `start > end`.
    pub fn malformed(&self) -> usize {
        self.malformed
    }

    /// Same predicate as [`overlaps_any`].
    pub fn overlaps(&self, range: &Range) -> bool {
        let k = find_search_end_index(&self.starts, range.end);
        k > 0 && self.max_end[k - 1] >= range.start
    }
}

/// Number of sorted starts that are `<= end`.
pub fn find_search_end_index(starts: &[i64], end: i64) -> usize {
    starts.partition_point(|&s| s <= end)
}

/// Counts over a match result.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    pub total: usize,
    pub belonging: usize,
    pub malformed: usize,
}

impl MatchSummary {
    /// Summarize matched candidates.
    pub fn from_candidates(candidates: &[Candidate]) -> Self {
        MatchSummary {
            total: candidates.len(),
            belonging: candidates.iter().filter(|c| c.belongs).count(),
            malformed: candidates.iter().filter(|c| c.range.is_malformed()).count(),
        }
    }
}
