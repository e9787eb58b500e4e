//! Utility functions for file parsing.

use ahash::AHashSet;
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use crate::error::InputError;

/// Creates a buffered reader that automatically handles gzip-compressed files.
///
/// This function checks if the file path ends with ".gz" and wraps the file
/// in a GzDecoder if so. Otherwise, it returns a plain buffered reader.
pub fn create_buffered_reader(file: File, path: &Path) -> Box<dyn Read + Send> {
    if path.to_string_lossy().ends_with(".gz") {
        Box::new(BufReader::new(GzDecoder::new(file)))
    } else {
        Box::new(BufReader::new(file))
    }
}

/// Open `path` for reading, decompressing `.gz` files.
pub fn open_input(path: &Path) -> Result<Box<dyn Read + Send>, InputError> {
    let file = File::open(path)?;
    Ok(create_buffered_reader(file, path))
}

/// Delimited reader with a header row. Short rows are allowed.
pub fn delimited_reader<R: Read>(reader: R, delimiter: u8) -> csv::Reader<R> {
    ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader)
}

/// Header names with a leading UTF-8 BOM and surrounding whitespace removed.
///
/// Repeated names are made unique, see [`unique_headers`].
pub fn clean_headers(headers: &StringRecord) -> Vec<String> {
    let cleaned = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let h = if i == 0 { h.trim_start_matches('\u{feff}') } else { h };
            h.trim().to_string()
        })
        .collect();
    unique_headers(cleaned)
}

/// Rename repeated header names to `name.1`, `name.2`, ... so every column
/// keeps its own key. The first occurrence keeps its name.
pub fn unique_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: AHashSet<String> = AHashSet::with_capacity(headers.len());
    let mut result = Vec::with_capacity(headers.len());

    for header in headers {
        let name = if seen.contains(&header) {
            let mut n = 1;
            loop {
                let candidate = format!("{}.{}", header, n);
                if !seen.contains(&candidate) {
                    break candidate;
                }
                n += 1;
            }
        } else {
            header
        };
        seen.insert(name.clone());
        result.push(name);
    }
    result
}

/// Index of the column named `name`.
pub fn column_index(headers: &[String], name: &str) -> Result<usize, InputError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| InputError::MissingColumn(name.to_string()))
}

/// 1-based line number of a record, for error messages.
pub fn record_line(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}
