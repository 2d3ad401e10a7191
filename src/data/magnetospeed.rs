use std::path::Path;

use crate::data::datetime;
use crate::data::parser::{self, cell, parse_int};
use crate::state::chrono_series::{ChronoSeries, VelocityUnit};

pub const DELIMITER: u8 = b',';

const SEPARATOR: &str = "----";

#[derive(Debug, Default)]
struct PendingSeries {
    series_number: Option<u32>,
    total_shots: Option<u32>,
    unit: Option<VelocityUnit>,
    name: Option<String>,
    date: Option<String>,
    time: Option<String>,
    velocities: Vec<u32>,
}

impl PendingSeries {
    fn finish(self, xfr: bool) -> Result<ChronoSeries, &'static str> {
        if self.velocities.is_empty() {
            return Err("series has no velocities");
        }
        let unit = self.unit.ok_or("missing velocity unit")?;
        let (series_number, total_shots) = if xfr {
            // Renumbered once the whole file is read
            (0, Some(self.velocities.len() as u32))
        } else {
            (self.series_number.ok_or("missing series number")?, self.total_shots)
        };
        if total_shots.is_none() {
            return Err("missing total shot count");
        }
        let name = self
            .name
            .unwrap_or_else(|| format!("Series {series_number}"));
        Ok(ChronoSeries::new(series_number, name, self.velocities, unit)
            .with_capture(self.date, self.time))
    }
}

fn is_shot_index(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}

/// Parse every complete series in a MagnetoSpeed export.
///
/// One file holds any number of series back to back. Each series starts with a
/// `Series,<n>,Shots:,<count>` header, has one row per shot, and ends with a
/// `----` separator row. Files exported by the XFR app carry a `Synced on:`
/// row, put a date in the `Series` header and shift the shot columns left.
///
/// Series missing a field are dropped; a structurally malformed file yields no
/// series.
pub fn parse_rows(rows: &[Vec<String>]) -> Vec<ChronoSeries> {
    match extract(rows) {
        Ok(all) => all,
        Err(reason) => {
            tracing::debug!("Not a well-formed MagnetoSpeed file: {reason}");
            Vec::new()
        }
    }
}

/// Read and parse a CSV file; unreadable files yield no series.
pub fn parse_file(path: &Path) -> Vec<ChronoSeries> {
    match parser::read_rows(path, DELIMITER) {
        Ok(rows) => parse_rows(&rows),
        Err(e) => {
            tracing::warn!("Skipping {:?}: {e}", path);
            Vec::new()
        }
    }
}

fn extract(rows: &[Vec<String>]) -> Result<Vec<ChronoSeries>, String> {
    let mut all = Vec::new();
    let mut cur = PendingSeries::default();
    let mut xfr = false;

    for (idx, raw) in rows.iter().enumerate() {
        // The device pads its fields
        let row: Vec<String> = raw.iter().map(|c| c.trim().to_string()).collect();
        let Some(first) = row.first() else {
            continue;
        };

        if first == SEPARATOR {
            match std::mem::take(&mut cur).finish(xfr) {
                Ok(series) => all.push(series),
                Err(reason) => tracing::debug!("Skipping series ending at row {idx}: {reason}"),
            }
        } else if first == "Synced on:" {
            xfr = true;
            match datetime::split_date_time(cell(&row, 1, idx)?) {
                Some((date, time)) => {
                    cur.date = Some(date);
                    cur.time = Some(time);
                }
                None => tracing::debug!("Could not split sync time at row {idx}"),
            }
        } else if first == "Series" && row.get(2).map(|s| s.as_str()) == Some("Shots:") {
            if !xfr {
                cur.series_number = Some(parse_int(cell(&row, 1, idx)?, "series number")?);
            }
            cur.total_shots = Some(parse_int(cell(&row, 3, idx)?, "shot count")?);
        } else if first == "Notes" {
            let note = row.get(1).map(|s| s.as_str()).unwrap_or("");
            cur.name = Some(if note.is_empty() { "Unnamed".to_string() } else { note.to_string() });
        } else if is_shot_index(first) {
            let (velocity_col, unit_col) = if xfr { (1, 2) } else { (2, 3) };
            cur.velocities.push(parse_int(cell(&row, velocity_col, idx)?, "velocity")?);
            if cur.velocities.len() == 1 {
                let raw_unit = cell(&row, unit_col, idx)?;
                cur.unit = VelocityUnit::parse(raw_unit);
                if cur.unit.is_none() {
                    tracing::debug!("Unknown velocity unit {raw_unit:?} at row {idx}");
                }
            }
        }
    }

    if !cur.velocities.is_empty() {
        tracing::debug!("Ignoring {} shots after the last separator", cur.velocities.len());
    }

    if xfr {
        for (i, series) in all.iter_mut().enumerate() {
            series.series_number = i as u32 + 1;
        }
    }

    Ok(all)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::data::parser::split_rows;

    pub(crate) fn series_block(number: u32, velocities: &[u32]) -> String {
        let mut lines = vec![
            format!("Series,{number},Shots:,{}", velocities.len()),
            "Min, 2900 ,ft/s".to_string(),
            "Max,2990,ft/s".to_string(),
            "Mean,2950,ft/s".to_string(),
            "SD,5.1,ft/s".to_string(),
            "ES,90,ft/s".to_string(),
            String::new(),
        ];
        for (i, v) in velocities.iter().enumerate() {
            lines.push(format!(" {}, {}, {v} , ft/s ", i + 1, i + 1));
        }
        lines.push("----,----,----,----".to_string());
        lines.join("\n")
    }

    fn parse(text: &str) -> Vec<ChronoSeries> {
        parse_rows(&split_rows(text, DELIMITER).unwrap())
    }

    #[test]
    fn parses_concatenated_series_in_order() {
        let text = [series_block(1, &[2950, 2960]), series_block(2, &[2970, 2980, 2975])].join("\n");
        let all = parse(&text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].series_number, 1);
        assert_eq!(all[0].display_name, "Series 1");
        assert_eq!(all[0].velocities, vec![2950, 2960]);
        assert_eq!(all[1].velocities, vec![2970, 2980, 2975]);
        assert_eq!(all[1].highest(), Some(2980));
        assert_eq!(all[1].lowest(), Some(2970));
        assert!(all[0].capture_date.is_none());
    }

    #[test]
    fn empty_series_is_dropped() {
        let text = [
            series_block(1, &[2950]),
            series_block(2, &[]),
            series_block(3, &[3001, 3005]),
        ]
        .join("\n");
        let numbers: Vec<u32> = parse(&text).iter().map(|s| s.series_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn series_without_header_is_dropped() {
        let text = "1,1,2950,ft/s\n----,----,----,----\n".to_string() + &series_block(4, &[2900]);
        let all = parse(&text);
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].series_number, 4);
    }

    #[test]
    fn malformed_file_yields_nothing() {
        let text = series_block(1, &[2950]).replace(" 2950 ", " abc ");
        assert!(parse(&text).is_empty());
        assert!(parse("name,age\nbob,42\n").is_empty());
    }

    #[test]
    fn unknown_unit_drops_only_its_series() {
        let text = [
            series_block(1, &[2950, 2960]),
            series_block(2, &[2970]).replace(" ft/s ", " mph "),
            series_block(3, &[2990]),
        ]
        .join("\n");
        let numbers: Vec<u32> = parse(&text).iter().map(|s| s.series_number).collect();
        assert_eq!(numbers, vec![1, 3]);
    }

    #[test]
    fn notes_row_names_series() {
        let text = series_block(1, &[2950])
            .replace("----,----,----,----", "Notes,  40.5gr H4350\n----,----,----,----");
        let all = parse(&text);
        assert_eq!(all[0].display_name, "40.5gr H4350");
    }

    #[test]
    fn xfr_export_is_renumbered() {
        let text = "\
Synced on:,2021-05-01 12:30:00
Series,2021-05-01,Shots:,2
Notes,
1,2950,ft/s
2,2960,ft/s
----,----,----,----
Synced on:,2021-05-02 08:00:00
Series,2021-05-02,Shots:,1
Notes,Load B
1,2999,ft/s
----,----,----,----
";
        let all = parse(text);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].series_number, 1);
        assert_eq!(all[0].display_name, "Unnamed");
        assert_eq!(all[0].velocities, vec![2950, 2960]);
        assert_eq!(all[0].capture_date.as_deref(), Some("2021-05-01"));
        assert_eq!(all[0].capture_time.as_deref(), Some("12:30:00"));
        assert_eq!(all[1].series_number, 2);
        assert_eq!(all[1].display_name, "Load B");
    }
}
