use csv::{ReaderBuilder, StringRecord};
use shared::models::Row;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{LoaderError, Result};

// Cell typing for dashboard CSVs: booleans, numbers, ISO timestamps, null for empty cells
pub mod dynamic_typing {
    use chrono::{DateTime, Utc};
    use once_cell::sync::Lazy;
    use regex::Regex;
    use shared::models::Scalar;

    // Integers beyond 2^53 lose precision as f64, so they stay text.
    const MAX_SAFE_FLOAT: f64 = 9_007_199_254_740_992.0;

    // ASCII digits only, in both patterns.
    static FLOAT: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^\s*-?([0-9]+\.?|\.[0-9]+|[0-9]+\.[0-9]+)([eE][-+]?[0-9]+)?\s*$")
            .expect("float pattern is valid")
    });

    static ISO_DATE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(concat!(
            r"^[0-9]{4}-[01][0-9]-[0-3][0-9]",
            r"T[0-2][0-9]:[0-5][0-9](:[0-5][0-9](\.[0-9]+)?)?",
            r"([+-][0-2][0-9]:[0-5][0-9]|Z)$",
        ))
        .expect("ISO date pattern is valid")
    });

    pub fn infer_scalar(raw: &str) -> Scalar {
        match raw {
            "" => Scalar::Null,
            "true" | "TRUE" => Scalar::Bool(true),
            "false" | "FALSE" => Scalar::Bool(false),
            _ => parse_number(raw)
                .or_else(|| parse_timestamp(raw).map(Scalar::Timestamp))
                .unwrap_or_else(|| Scalar::Text(raw.to_string())),
        }
    }

    fn parse_number(raw: &str) -> Option<Scalar> {
        if !FLOAT.is_match(raw) {
            return None;
        }
        let n: f64 = raw.trim().parse().ok()?;
        (n.abs() <= MAX_SAFE_FLOAT).then_some(Scalar::Number(n))
    }

    pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
        let caps = ISO_DATE.captures(raw)?;
        // Minute precision ("2024-03-01T08:30Z") needs seconds for RFC 3339.
        let normalized = if caps.get(1).is_none() {
            let (minutes, zone) = (raw.get(..16)?, raw.get(16..)?);
            format!("{}:00{}", minutes, zone)
        } else {
            raw.to_string()
        };
        DateTime::parse_from_rfc3339(&normalized)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

}

/// Parses dashboard CSV text (header row first) into typed rows.
pub struct CsvDatasetParser {
    strict_columns: bool,
}

impl CsvDatasetParser {
    pub fn new(strict_columns: bool) -> Self {
        CsvDatasetParser { strict_columns }
    }

    /// Parses `text` into rows, dropping lines and rows that carry no data.
    ///
    /// `filename` only labels errors and log lines.
    pub fn parse(&self, filename: &str, text: &str) -> Result<Vec<Row>> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let mut rdr = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|source| Self::csv_error(filename, source))?
            .clone();
        let columns: Arc<[String]> = Self::column_names(&headers).into();

        let mut rows = Vec::new();
        let mut skipped_lines = 0usize;
        let mut dropped_cells = 0usize;

        for result in rdr.records() {
            let record = result.map_err(|source| Self::csv_error(filename, source))?;

            let values = record.iter().map(dynamic_typing::infer_scalar).collect();
            let row = Row::new(columns.clone(), values);
            // Lines with nothing but blanks are skipped before any shape checks.
            if row.is_blank() {
                skipped_lines += 1;
                continue;
            }

            if record.len() != columns.len() {
                if self.strict_columns {
                    return Err(LoaderError::ColumnMismatch {
                        filename: filename.to_string(),
                        line: record.position().map_or(0, |pos| pos.line()),
                        expected: columns.len(),
                        found: record.len(),
                    });
                }
                dropped_cells += record.len().saturating_sub(columns.len());
            }

            rows.push(row);
        }

        if dropped_cells > 0 {
            warn!(
                filename = %filename,
                dropped_cells,
                "Rows had more fields than the header; extra cells were dropped"
            );
        }
        debug!(
            filename = %filename,
            rows = rows.len(),
            columns = columns.len(),
            skipped_lines,
            "Parsed CSV dataset"
        );
        Ok(rows)
    }

    fn csv_error(filename: &str, source: csv::Error) -> LoaderError {
        LoaderError::CsvParse {
            filename: filename.to_string(),
            source,
        }
    }

    // Header cells are trimmed; repeated names get _1, _2, ... suffixes.
    fn column_names(headers: &StringRecord) -> Vec<String> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut names = Vec::with_capacity(headers.len());
        for header in headers.iter() {
            let base = header.trim();
            let mut name = base.to_string();
            let mut suffix = 1;
            while seen.contains(&name) {
                name = format!("{}_{}", base, suffix);
                suffix += 1;
            }
            seen.insert(name.clone());
            names.push(name);
        }
        names
    }
}

impl Default for CsvDatasetParser {
    fn default() -> Self {
        Self::new(false)
    }
}
