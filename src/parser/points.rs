//! Delimited point file parser.
//!
//! Rows need numeric latitude and longitude columns. State and city columns
//! are located through header aliases and renamed to the filter keys.

use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::config::{Config, CITY_FILTER_KEY, STATE_FILTER_KEY};
use crate::error::InputError;
use crate::parser::util::{
    clean_headers, column_index, delimited_reader, open_input, record_line, unique_headers,
};
use crate::types::{Attributes, Point};

/// Result of parsing a point file.
#[derive(Debug, Clone, Default)]
pub struct PointData {
    /// Attribute keys in order, after alias renaming.
    pub headers: Vec<String>,
    pub points: Vec<Point>,
    /// Rows dropped for a missing coordinate.
    pub dropped: usize,
}

/// Parse a point file. Supports plain and gzip-compressed input.
pub fn parse_points(path: &Path, config: &Config) -> Result<PointData, InputError> {
    let reader = open_input(path)?;
    let data = parse_points_reader(reader, config)?;
    info!(
        path = %path.display(),
        points = data.points.len(),
        dropped = data.dropped,
        "loaded points"
    );
    Ok(data)
}

/// Parse point data from a reader.
pub fn parse_points_reader<R: Read>(reader: R, config: &Config) -> Result<PointData, InputError> {
    let mut csv_reader = delimited_reader(reader, config.delimiter);
    let raw_headers = clean_headers(csv_reader.headers()?);

    let lat_idx = column_index(&raw_headers, &config.latitude_column)?;
    let lon_idx = column_index(&raw_headers, &config.longitude_column)?;
    let state_idx = find_alias(&raw_headers, &config.state_aliases);
    let city_idx = find_alias(&raw_headers, &config.city_aliases);

    let renamed: Vec<String> = raw_headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            if Some(i) == state_idx {
                STATE_FILTER_KEY.to_string()
            } else if Some(i) == city_idx {
                CITY_FILTER_KEY.to_string()
            } else {
                h.clone()
            }
        })
        .collect();
    let mut headers = unique_headers(renamed);

    // A filter column is filled only when no column already carries its key
    let fill_state = !headers.iter().any(|h| h == STATE_FILTER_KEY);
    let fill_city = !headers.iter().any(|h| h == CITY_FILTER_KEY);
    if fill_state {
        headers.push(STATE_FILTER_KEY.to_string());
    }
    if fill_city {
        headers.push(CITY_FILTER_KEY.to_string());
    }

    let mut points = Vec::new();
    let mut dropped = 0;

    for result in csv_reader.records() {
        let record = result?;
        let line = record_line(&record);

        let coordinate = |idx: usize, column: &str| -> Result<Option<f64>, InputError> {
            let raw = record.get(idx).unwrap_or("").trim();
            if raw.is_empty() {
                return Ok(None);
            }
            match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Some(v)),
                Ok(_) => Ok(None),
                Err(_) => Err(InputError::InvalidCoordinate {
                    line,
                    column: column.to_string(),
                    value: raw.to_string(),
                }),
            }
        };

        let lat = coordinate(lat_idx, &config.latitude_column)?;
        let lon = coordinate(lon_idx, &config.longitude_column)?;
        let (lat, lon) = match (lat, lon) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => {
                dropped += 1;
                continue;
            }
        };

        let mut attributes: Attributes = headers
            .iter()
            .take(raw_headers.len())
            .enumerate()
            .map(|(i, h)| (h.clone(), record.get(i).unwrap_or("").to_string()))
            .collect();
        if fill_state {
            attributes.insert(STATE_FILTER_KEY.to_string(), config.missing_value.clone());
        }
        if fill_city {
            attributes.insert(CITY_FILTER_KEY.to_string(), config.missing_value.clone());
        }

        points.push(Point::new(lat, lon, attributes));
    }

    if dropped > 0 {
        warn!(dropped, "rows without coordinates were skipped");
    }

    Ok(PointData {
        headers,
        points,
        dropped,
    })
}

/// Index of the first header whose lowercase form is one of `aliases`.
pub fn find_alias(headers: &[String], aliases: &[String]) -> Option<usize> {
    headers
        .iter()
        .position(|h| aliases.iter().any(|a| a == &h.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::BufReader;

    fn parse(content: &str) -> Result<PointData, InputError> {
        parse_points_reader(BufReader::new(content.as_bytes()), &Config::default())
    }

    #[test]
    fn test_parse_points_basic() {
        let data = parse("bairro,latitude,longitude,UF,Municipio\nCentro,-15.79,-47.88,DF,Brasília\n").unwrap();

        assert_eq!(data.points.len(), 1);
        let p = &data.points[0];
        assert_eq!(p.lat, -15.79);
        assert_eq!(p.lon, -47.88);
        assert_eq!(p.attribute("bairro"), Some("Centro"));
        assert_eq!(p.attribute(STATE_FILTER_KEY), Some("DF"));
        assert_eq!(p.attribute(CITY_FILTER_KEY), Some("Brasília"));
        assert_eq!(p.attribute("UF"), None);
        assert_eq!(
            data.headers,
            vec!["bairro", "latitude", "longitude", STATE_FILTER_KEY, CITY_FILTER_KEY]
        );
    }

    #[test]
    fn test_parse_points_keeps_column_order() {
        let data = parse("estado,latitude,longitude,nome\nGO,-16.6,-49.2,x\n").unwrap();
        let keys: Vec<&str> = data.points[0].attributes.keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec![STATE_FILTER_KEY, "latitude", "longitude", "nome", CITY_FILTER_KEY]
        );
    }

    #[test]
    fn test_parse_points_fills_missing_filter_columns() {
        let data = parse("latitude,longitude\n-15.0,-47.0\n").unwrap();
        let p = &data.points[0];
        assert_eq!(p.attribute(STATE_FILTER_KEY), Some("Não Informado"));
        assert_eq!(p.attribute(CITY_FILTER_KEY), Some("Não Informado"));
    }

    #[test]
    fn test_parse_points_first_alias_wins() {
        let data = parse("cidade,city,latitude,longitude\nA,B,0,0\n").unwrap();
        let p = &data.points[0];
        assert_eq!(p.attribute(CITY_FILTER_KEY), Some("A"));
        assert_eq!(p.attribute("city"), Some("B"));
    }

    #[test]
    fn test_parse_points_repeated_columns_kept() {
        let data = parse("obs,latitude,longitude,obs\nfirst,0,0,second\n").unwrap();
        let p = &data.points[0];
        assert_eq!(p.attribute("obs"), Some("first"));
        assert_eq!(p.attribute("obs.1"), Some("second"));
        assert_eq!(data.headers[3], "obs.1");
    }

    #[test]
    fn test_parse_points_existing_filter_column_not_overwritten() {
        let data = parse("estado,estado_filtro,latitude,longitude\nDF,x,0,0\n").unwrap();
        let p = &data.points[0];
        assert_eq!(p.attribute(STATE_FILTER_KEY), Some("DF"));
        assert_eq!(p.attribute("estado_filtro.1"), Some("x"));
        assert_eq!(p.attribute(CITY_FILTER_KEY), Some("Não Informado"));
    }

    #[test]
    fn test_parse_points_drops_missing_coordinates() {
        let data = parse("latitude,longitude\n-15.0,-47.0\n,-47.0\n-15.0,\nNaN,-47.0\n").unwrap();
        assert_eq!(data.points.len(), 1);
        assert_eq!(data.dropped, 3);
    }

    #[test]
    fn test_parse_points_invalid_coordinate() {
        let err = parse("latitude,longitude\nabc,-47.0\n").unwrap_err();
        match err {
            InputError::InvalidCoordinate { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "latitude");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_parse_points_missing_latitude_column() {
        let err = parse("lat,longitude\n1,2\n").unwrap_err();
        assert!(matches!(err, InputError::MissingColumn(c) if c == "latitude"));
    }

    #[test]
    fn test_find_alias_case_insensitive() {
        let headers = vec!["Nome".to_string(), "LOCALIDADE".to_string()];
        let aliases = vec!["cidade".to_string(), "localidade".to_string()];
        assert_eq!(find_alias(&headers, &aliases), Some(1));
        assert_eq!(find_alias(&headers, &["uf".to_string()]), None);
    }
}
