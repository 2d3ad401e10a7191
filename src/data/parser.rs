use std::path::Path;

use thiserror::Error;

use crate::state::chrono_series::ChronoSeries;

#[derive(Error, Debug)]
pub enum ReadError {
    #[error("cannot read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Outcome of parsing a single-series file.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseResult {
    Valid(ChronoSeries),
    Invalid(String),
}

impl ParseResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, ParseResult::Valid(_))
    }

    pub fn into_series(self) -> Option<ChronoSeries> {
        match self {
            ParseResult::Valid(series) => Some(series),
            ParseResult::Invalid(_) => None,
        }
    }
}

/// Decode raw bytes as UTF-8, falling back to Latin-1 so odd device exports
/// still produce text.
pub fn decode_text(content: &[u8]) -> String {
    match std::str::from_utf8(content) {
        Ok(s) => s.to_string(),
        // Latin-1: each byte maps to the same Unicode code point
        Err(_) => content.iter().map(|&b| b as char).collect(),
    }
}

/// Split text into rows of cells with the given delimiter.
///
/// Rows keep their original positions (empty lines become empty rows) because
/// the LabRadar format is addressed by absolute row index.
pub fn split_rows(text: &str, delimiter: u8) -> Result<Vec<Vec<String>>, ReadError> {
    let mut rows = Vec::new();
    for line in text.lines() {
        if line.trim().is_empty() {
            rows.push(Vec::new());
            continue;
        }
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(line.as_bytes());
        match reader.records().next() {
            Some(record) => rows.push(record?.iter().map(|s| s.to_string()).collect()),
            None => rows.push(Vec::new()),
        }
    }
    Ok(rows)
}

/// Read a file into delimited rows. NUL bytes are dropped before splitting.
pub fn read_rows(path: &Path, delimiter: u8) -> Result<Vec<Vec<String>>, ReadError> {
    let content = std::fs::read(path)?;
    let text = decode_text(&content).replace('\0', "");
    split_rows(&text, delimiter)
}

/// Fetch a cell, reporting the position when the row is too short.
pub(crate) fn cell<'a>(row: &'a [String], col: usize, row_idx: usize) -> Result<&'a str, String> {
    row.get(col)
        .map(|s| s.as_str())
        .ok_or_else(|| format!("row {row_idx} has no column {col}"))
}

pub(crate) fn parse_int<T: std::str::FromStr>(value: &str, what: &str) -> Result<T, String> {
    value
        .trim()
        .parse::<T>()
        .map_err(|_| format!("{what} is not a number: {value:?}"))
}
