//! CSV parsing and column-wide type inference.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use serde_json::Value;
use thiserror::Error;

use crate::storage::models::{ColumnType, PreviewRow};

/// Number of rows kept in a file's preview
pub const PREVIEW_ROWS: usize = 5;

/// Cell contents treated as missing values.
const NA_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

const BOOL_TRUE: &[&str] = &["True", "TRUE", "true"];
const BOOL_FALSE: &[&str] = &["False", "FALSE", "false"];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("CSV input is empty")]
    Empty,
    #[error("CSV header has no columns")]
    NoColumns,
    #[error("CSV header column {0} is blank")]
    BlankHeader(usize),
    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// A single typed CSV value
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Boolean(bool),
    Text(String),
}

impl Cell {
    pub fn to_json(&self) -> Value {
        match self {
            Cell::Null => Value::Null,
            Cell::Integer(i) => Value::from(*i),
            // Non-finite floats have no JSON form
            Cell::Real(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Cell::Boolean(b) => Value::Bool(*b),
            Cell::Text(s) => Value::String(s.clone()),
        }
    }
}

/// A fully parsed CSV file with one inferred type per column
#[derive(Debug, Clone)]
pub struct ParsedCsv {
    pub columns: Vec<String>,
    pub column_types: Vec<ColumnType>,
    pub rows: Vec<Vec<Cell>>,
}

impl ParsedCsv {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn type_map(&self) -> HashMap<String, ColumnType> {
        self.columns
            .iter()
            .cloned()
            .zip(self.column_types.iter().copied())
            .collect()
    }

    pub fn preview(&self) -> Vec<PreviewRow> {
        self.rows
            .iter()
            .take(PREVIEW_ROWS)
            .map(|row| {
                self.columns
                    .iter()
                    .zip(row)
                    .map(|(column, cell)| (column.clone(), cell.to_json()))
                    .collect()
            })
            .collect()
    }
}

/// Parse CSV bytes with a header row, inferring each column's type from every value in it.
pub fn parse_csv(data: &[u8]) -> Result<ParsedCsv, ParseError> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(ParseError::Empty);
    }

    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(data);

    let headers = rdr.headers()?.clone();
    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(ParseError::NoColumns);
    }
    if let Some(idx) = headers.iter().position(|h| h.trim().is_empty()) {
        return Err(ParseError::BlankHeader(idx + 1));
    }
    let columns = dedupe_columns(headers.iter());

    let mut raw_rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        raw_rows.push(record);
    }

    let column_types: Vec<ColumnType> = (0..columns.len())
        .map(|idx| infer_column_type(raw_rows.iter().map(|r| r.get(idx).unwrap_or(""))))
        .collect();

    let rows = raw_rows
        .iter()
        .map(|record| {
            column_types
                .iter()
                .enumerate()
                .map(|(idx, ty)| typed_cell(record.get(idx).unwrap_or(""), *ty))
                .collect()
        })
        .collect();

    Ok(ParsedCsv {
        columns,
        column_types,
        rows,
    })
}

/// Later occurrences of a repeated header get a `.N` suffix so column names stay unique.
fn dedupe_columns<'a>(headers: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();

    for header in headers {
        let mut name = header.to_string();
        let mut suffix = 0;
        while columns.contains(&name) {
            suffix += 1;
            name = format!("{header}.{suffix}");
        }
        columns.push(name);
    }

    columns
}

fn is_missing(raw: &str) -> bool {
    NA_MARKERS.contains(&raw)
}

fn parse_bool(raw: &str) -> Option<bool> {
    if BOOL_TRUE.contains(&raw) {
        Some(true)
    } else if BOOL_FALSE.contains(&raw) {
        Some(false)
    } else {
        None
    }
}

fn is_datetime(raw: &str) -> bool {
    let trimmed = raw.trim();
    DateTime::parse_from_rfc3339(trimmed).is_ok()
        || NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).is_ok())
}

/// Infer a column type from all of the column's raw values.
fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut total = 0usize;
    let mut missing = 0usize;
    let mut all_int = true;
    let mut all_numeric = true;
    let mut all_bool = true;
    let mut all_datetime = true;

    for raw in values {
        total += 1;
        if is_missing(raw) {
            missing += 1;
            continue;
        }
        let trimmed = raw.trim();
        if trimmed.parse::<i64>().is_err() {
            all_int = false;
            if trimmed.parse::<f64>().is_err() {
                all_numeric = false;
            }
        }
        if parse_bool(raw).is_none() {
            all_bool = false;
        }
        if all_datetime && !is_datetime(raw) {
            all_datetime = false;
        }
    }

    if total == 0 {
        return ColumnType::Text;
    }
    // A column of nothing but missing values is numeric NaN
    if missing == total {
        return ColumnType::Real;
    }
    if all_int {
        return if missing == 0 {
            ColumnType::Integer
        } else {
            ColumnType::Real
        };
    }
    if all_numeric {
        return ColumnType::Real;
    }
    if all_bool && missing == 0 {
        return ColumnType::Boolean;
    }
    if all_datetime {
        return ColumnType::Datetime;
    }
    ColumnType::Text
}

/// Convert a raw value into its column's native form.
fn typed_cell(raw: &str, column_type: ColumnType) -> Cell {
    if is_missing(raw) {
        return Cell::Null;
    }
    let trimmed = raw.trim();
    match column_type {
        ColumnType::Integer => trimmed
            .parse()
            .map(Cell::Integer)
            .unwrap_or_else(|_| Cell::Text(raw.to_string())),
        ColumnType::Real => trimmed
            .parse()
            .map(Cell::Real)
            .unwrap_or_else(|_| Cell::Text(raw.to_string())),
        ColumnType::Boolean => parse_bool(raw)
            .map(Cell::Boolean)
            .unwrap_or_else(|| Cell::Text(raw.to_string())),
        ColumnType::Datetime | ColumnType::Text => Cell::Text(raw.to_string()),
    }
}
