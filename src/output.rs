//! Output formatting for cepmatch results.
//!
//! This module writes matched candidates and region exports as delimited
//! text with stable column ordering.

use anyhow::Result;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use indexmap::IndexSet;

use std::io::Write;

use crate::config::Config;
use crate::types::{Candidate, ExportedRow};

/// Byte order mark written at the start of region exports so spreadsheet
/// tools detect UTF-8.
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Format a match result the way it is written out.
pub fn format_belongs(belongs: bool) -> &'static str {
    if belongs {
        "true"
    } else {
        "false"
    }
}

/// Write candidates with their input columns followed by the result column.
pub fn write_candidates<W: Write>(
    writer: &mut W,
    headers: &[String],
    candidates: &[Candidate],
    config: &Config,
) -> Result<()> {
    let mut csv_writer = WriterBuilder::new()
        .delimiter(config.delimiter)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(writer);

    let mut header: Vec<&str> = headers.iter().map(String::as_str).collect();
    header.push(&config.result_column);
    csv_writer.write_record(&header)?;

    for candidate in candidates {
        let mut record: Vec<&str> = headers
            .iter()
            .map(|h| candidate.attributes.get(h).map(String::as_str).unwrap_or(""))
            .collect();
        record.push(format_belongs(candidate.belongs));
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Union of attribute keys over `rows`, in first-seen order.
pub fn export_headers(rows: &[ExportedRow]) -> Vec<String> {
    let mut keys: IndexSet<&str> = IndexSet::new();
    for row in rows {
        for key in row.attributes.keys() {
            keys.insert(key);
        }
    }
    keys.into_iter().map(str::to_string).collect()
}

/// Write region export rows.
///
/// The file starts with a UTF-8 BOM. The header is unquoted; every data field
/// is quoted with embedded quotes doubled. Rows lacking a column get an empty
/// field.
pub fn write_exported_rows<W: Write>(
    writer: &mut W,
    rows: &[ExportedRow],
    config: &Config,
) -> Result<()> {
    writer.write_all(UTF8_BOM)?;

    let headers = export_headers(rows);
    let builder = |style: QuoteStyle| {
        let mut b = WriterBuilder::new();
        b.delimiter(config.export_delimiter)
            .terminator(Terminator::Any(b'\n'))
            .quote_style(style);
        b
    };

    {
        let mut header_writer = builder(QuoteStyle::Necessary).from_writer(&mut *writer);
        let mut header: Vec<&str> = headers.iter().map(String::as_str).collect();
        header.push(&config.region_color_column);
        header_writer.write_record(&header)?;
        header_writer.flush()?;
    }

    let mut csv_writer = builder(QuoteStyle::Always).from_writer(&mut *writer);
    for row in rows {
        let mut record: Vec<&str> = headers
            .iter()
            .map(|h| row.attributes.get(h).map(String::as_str).unwrap_or(""))
            .collect();
        record.push(&row.region_color);
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Attributes, Range};

    fn attributes(pairs: &[(&str, &str)]) -> Attributes {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_write_candidates() {
        let headers = vec!["CEP inicial".to_string(), "CEP final".to_string()];
        let candidates = vec![
            Candidate::new(
                Range::new(1500, 1600),
                attributes(&[("CEP inicial", "1500"), ("CEP final", "1600")]),
            )
            .with_belongs(true),
            Candidate::new(
                Range::new(2000, 2100),
                attributes(&[("CEP inicial", "2000"), ("CEP final", "2100")]),
            ),
        ];

        let mut output = Vec::new();
        write_candidates(&mut output, &headers, &candidates, &Config::default()).unwrap();
        let text = String::from_utf8(output).unwrap();

        assert_eq!(
            text,
            "CEP inicial,CEP final,belongs\n1500,1600,true\n2000,2100,false\n"
        );
    }

    #[test]
    fn test_write_candidates_quotes_delimiter() {
        let headers = vec!["logradouro".to_string()];
        let candidates = vec![Candidate::new(
            Range::new(1, 2),
            attributes(&[("logradouro", "Rua A, 10")]),
        )];

        let mut output = Vec::new();
        write_candidates(&mut output, &headers, &candidates, &Config::default()).unwrap();
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("\"Rua A, 10\",false"));
    }

    #[test]
    fn test_export_headers_union_in_order() {
        let rows = vec![
            ExportedRow {
                attributes: attributes(&[("a", "1"), ("b", "2")]),
                region_color: "#ff0000".to_string(),
            },
            ExportedRow {
                attributes: attributes(&[("b", "3"), ("c", "4")]),
                region_color: "#00ff00".to_string(),
            },
        ];
        assert_eq!(export_headers(&rows), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_write_exported_rows() {
        let rows = vec![
            ExportedRow {
                attributes: attributes(&[("bairro", "Asa \"Sul\""), ("latitude", "-15.8")]),
                region_color: "#ff0000".to_string(),
            },
            ExportedRow {
                attributes: attributes(&[("bairro", "Lago")]),
                region_color: "#00ff00".to_string(),
            },
        ];

        let mut output = Vec::new();
        write_exported_rows(&mut output, &rows, &Config::default()).unwrap();

        assert!(output.starts_with(UTF8_BOM));
        let text = String::from_utf8(output[UTF8_BOM.len()..].to_vec()).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "bairro;latitude;COR_POLIGONO");
        assert_eq!(lines[1], "\"Asa \"\"Sul\"\"\";\"-15.8\";\"#ff0000\"");
        assert_eq!(lines[2], "\"Lago\";\"\";\"#00ff00\"");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_write_exported_rows_empty() {
        let mut output = Vec::new();
        write_exported_rows(&mut output, &[], &Config::default()).unwrap();
        let text = String::from_utf8(output[UTF8_BOM.len()..].to_vec()).unwrap();
        assert_eq!(text, "COR_POLIGONO\n");
    }

    #[test]
    fn test_format_belongs() {
        assert_eq!(format_belongs(true), "true");
        assert_eq!(format_belongs(false), "false");
    }
}
