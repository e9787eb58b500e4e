//! Configuration and defaults for cepmatch.
//!
//! This module contains the configuration structure and default values
//! that control column lookup, filtering and export.

use ahash::AHashSet;

/// Attribute key holding the normalized state of a point.
pub const STATE_FILTER_KEY: &str = "estado_filtro";

/// Attribute key holding the normalized city of a point.
pub const CITY_FILTER_KEY: &str = "cidade_filtro";

/// Header names accepted as the state column.
pub const DEFAULT_STATE_ALIASES: [&str; 2] = ["estado", "uf"];

/// Header names accepted as the city column.
pub const DEFAULT_CITY_ALIASES: [&str; 4] = ["cidade", "municipio", "localidade", "city"];

/// Color given to regions drawn without an explicit color.
pub const DEFAULT_REGION_COLOR: &str = "#3388ff";

/// Configuration for loading, matching and exporting.
#[derive(Debug, Clone)]
pub struct Config {
    /// Column holding the lower bound of a range.
    pub start_column: String,
    /// Column holding the upper bound of a range.
    pub end_column: String,
    /// Column added to candidates with the match result.
    pub result_column: String,
    /// Column holding point latitude.
    pub latitude_column: String,
    /// Column holding point longitude.
    pub longitude_column: String,
    /// Lowercase header names recognized as the state column.
    pub state_aliases: Vec<String>,
    /// Lowercase header names recognized as the city column.
    pub city_aliases: Vec<String>,
    /// Value used when a point file has no state or city column.
    pub missing_value: String,
    /// Attributes dropped from exported rows.
    pub excluded_attributes: AHashSet<String>,
    /// Color for regions drawn without one.
    pub default_region_color: String,
    /// Column added to exported rows with the region color.
    pub region_color_column: String,
    /// Delimiter of input files and of the candidate output.
    pub delimiter: u8,
    /// Delimiter of the region export.
    pub export_delimiter: u8,
    /// Worker threads (0 = one per CPU).
    pub threads: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            start_column: "CEP inicial".to_string(),
            end_column: "CEP final".to_string(),
            result_column: "belongs".to_string(),
            latitude_column: "latitude".to_string(),
            longitude_column: "longitude".to_string(),
            state_aliases: DEFAULT_STATE_ALIASES.iter().map(|s| s.to_string()).collect(),
            city_aliases: DEFAULT_CITY_ALIASES.iter().map(|s| s.to_string()).collect(),
            missing_value: "Não Informado".to_string(),
            excluded_attributes: [STATE_FILTER_KEY, CITY_FILTER_KEY]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            default_region_color: DEFAULT_REGION_COLOR.to_string(),
            region_color_column: "COR_POLIGONO".to_string(),
            delimiter: b',',
            export_delimiter: b';',
            threads: 0,
        }
    }
}

impl Config {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the excluded attributes with a comma-separated list.
    ///
    /// An empty string clears the set, so every column is exported.
    pub fn parse_excluded(&mut self, list: &str) {
        self.excluded_attributes = parse_list(list).into_iter().collect();
    }

    /// Set the input delimiter from its textual form.
    ///
    /// Returns false (leaving the delimiter unchanged) if the value is not a
    /// single ASCII character or one of `tab`, `\t`.
    pub fn set_delimiter(&mut self, value: &str) -> bool {
        match parse_delimiter(value) {
            Some(d) => {
                self.delimiter = d;
                true
            }
            None => false,
        }
    }

    /// Number of worker threads to actually use.
    pub fn effective_threads(&self) -> usize {
        if self.threads == 0 {
            num_cpus::get()
        } else {
            self.threads
        }
    }
}

/// Split a comma-separated list, trimming entries and dropping empty ones.
pub fn parse_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a delimiter given on the command line.
pub fn parse_delimiter(value: &str) -> Option<u8> {
    match value {
        "tab" | "\\t" | "\t" => Some(b'\t'),
        _ => {
            let bytes = value.as_bytes();
            if bytes.len() == 1 && bytes[0].is_ascii() {
                Some(bytes[0])
            } else {
                None
            }
        }
    }
}
