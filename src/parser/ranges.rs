//! Delimited range file parser.
//!
//! Each row carries a lower and an upper postal-code bound plus any number of
//! pass-through columns.

use std::io::Read;
use std::path::Path;

use crate::config::Config;
use crate::error::InputError;
use crate::parser::util::{clean_headers, column_index, delimited_reader, open_input, record_line};
use crate::types::{Attributes, Candidate, Range};

/// Result of parsing a range file.
#[derive(Debug, Clone, Default)]
pub struct RangeData {
    /// Column names in file order.
    pub headers: Vec<String>,
    /// One unmatched candidate per data row.
    pub candidates: Vec<Candidate>,
}

impl RangeData {
    /// Bounds only, for use as a reference set.
    pub fn ranges(&self) -> Vec<Range> {
        self.candidates.iter().map(|c| c.range).collect()
    }
}

/// Parse a range file. Supports plain and gzip-compressed input.
pub fn parse_ranges(path: &Path, config: &Config) -> Result<RangeData, InputError> {
    let reader = open_input(path)?;
    parse_ranges_reader(reader, config)
}

/// Parse range data from a reader.
pub fn parse_ranges_reader<R: Read>(reader: R, config: &Config) -> Result<RangeData, InputError> {
    let mut csv_reader = delimited_reader(reader, config.delimiter);
    let headers = clean_headers(csv_reader.headers()?);

    let start_idx = column_index(&headers, &config.start_column)?;
    let end_idx = column_index(&headers, &config.end_column)?;

    let mut candidates = Vec::new();

    for result in csv_reader.records() {
        let record = result?;

        // Skip blank rows
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }

        let line = record_line(&record);
        let bound = |idx: usize, column: &str| -> Result<i64, InputError> {
            let raw = record.get(idx).unwrap_or("");
            parse_bound(raw).ok_or_else(|| InputError::InvalidBound {
                line,
                column: column.to_string(),
                value: raw.to_string(),
            })
        };

        let start = bound(start_idx, &config.start_column)?;
        let end = bound(end_idx, &config.end_column)?;

        let attributes: Attributes = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();

        candidates.push(Candidate::new(Range::new(start, end), attributes));
    }

    Ok(RangeData {
        headers,
        candidates,
    })
}

/// Coerce a cell to an integer bound.
///
/// Accepts plain integers and floats with no fractional part, which is how
/// spreadsheet tools often write whole numbers.
pub fn parse_bound(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    let f: f64 = s.parse().ok()?;
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
