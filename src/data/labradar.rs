use std::path::Path;

use crate::data::parser::{self, cell, parse_int, ParseResult};
use crate::state::chrono_series::{ChronoSeries, VelocityUnit};

pub const DELIMITER: u8 = b';';

const SERIES_NUMBER_ROW: usize = 3;
const TOTAL_SHOTS_ROW: usize = 4;
const UNITS_ROW: usize = 6;
const FIRST_SHOT_ROW: usize = 18;
const DATE_COL: usize = 15;
const TIME_COL: usize = 16;

/// Parse an already split LabRadar report.
///
/// Each `SR####/` directory on the device holds one `SR#### Report.csv` with a
/// fixed, `;`-delimited layout: summary fields at known row indices followed by
/// one row per shot starting at row 18. `display_name` is normally the series
/// directory name.
pub fn parse_rows(rows: &[Vec<String>], display_name: &str) -> ParseResult {
    match extract(rows, display_name) {
        Ok(series) => ParseResult::Valid(series),
        Err(reason) => {
            tracing::debug!("Not a valid LabRadar series: {reason}");
            ParseResult::Invalid(reason)
        }
    }
}

/// Read and parse a report file. I/O failures are reported as `Invalid` too.
pub fn parse_file(path: &Path, display_name: &str) -> ParseResult {
    match parser::read_rows(path, DELIMITER) {
        Ok(rows) => parse_rows(&rows, display_name),
        Err(e) => {
            tracing::warn!("Skipping {:?}: {e}", path);
            ParseResult::Invalid(e.to_string())
        }
    }
}

fn extract(rows: &[Vec<String>], display_name: &str) -> Result<ChronoSeries, String> {
    let mut series_number: Option<u32> = None;
    let mut total_shots: Option<u32> = None;
    let mut unit: Option<VelocityUnit> = None;
    let mut date: Option<String> = None;
    let mut time: Option<String> = None;
    let mut velocities: Vec<u32> = Vec::new();

    for (idx, row) in rows.iter().enumerate() {
        match idx {
            SERIES_NUMBER_ROW => {
                series_number = Some(parse_int(cell(row, 1, idx)?, "series number")?);
            }
            TOTAL_SHOTS_ROW => {
                total_shots = Some(parse_int(cell(row, 1, idx)?, "total shots")?);
            }
            UNITS_ROW => {
                let raw = cell(row, 1, idx)?;
                unit = Some(
                    VelocityUnit::parse(raw)
                        .ok_or_else(|| format!("unknown velocity unit {raw:?}"))?,
                );
            }
            i if i >= FIRST_SHOT_ROW => {
                if row.iter().all(|c| c.trim().is_empty()) {
                    continue;
                }
                if i == FIRST_SHOT_ROW {
                    date = Some(cell(row, DATE_COL, idx)?.trim().to_string());
                    time = Some(cell(row, TIME_COL, idx)?.trim().to_string());
                }
                velocities.push(parse_int(cell(row, 1, idx)?, "velocity")?);
            }
            _ => {}
        }
    }

    let series_number = series_number.ok_or("missing series number")?;
    let total_shots = total_shots.ok_or("missing total shot count")?;
    let unit = unit.ok_or("missing velocity unit")?;
    let date = date.ok_or("missing capture date")?;
    let time = time.ok_or("missing capture time")?;

    if velocities.is_empty() {
        // Deleted series keep their report file but have no shot rows
        return Err("series has no velocities".to_string());
    }
    if total_shots as usize != velocities.len() {
        tracing::debug!(
            "Series {series_number} reports {total_shots} shots but has {} rows",
            velocities.len()
        );
    }

    Ok(ChronoSeries::new(series_number, display_name.to_string(), velocities, unit)
        .with_capture(Some(date), Some(time)))
}
