use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Date formats seen in chronograph exports, most common first.
pub const DATE_FORMATS: &[&str] = &[
    "%m-%d-%Y",
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%d/%m/%Y",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
];

pub const TIME_FORMATS: &[&str] = &["%H:%M:%S", "%H:%M", "%I:%M:%S %p", "%I:%M %p"];

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
}

/// Combine separate date and time cells. A missing or unparseable time falls
/// back to midnight; an unparseable date gives `None`.
pub fn combine_date_time(date: &str, time: &str) -> Option<NaiveDateTime> {
    let d = parse_date(date)?;
    let t = parse_time(time).unwrap_or(NaiveTime::MIN);
    Some(d.and_time(t))
}

/// Split a single "date time" cell (MagnetoSpeed XFR "Synced on:" row).
pub fn split_date_time(value: &str) -> Option<(String, String)> {
    let mut parts = value.split_whitespace();
    let date = parts.next()?;
    let time: Vec<&str> = parts.collect();
    if time.is_empty() {
        return None;
    }
    Some((date.to_string(), time.join(" ")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labradar_style_dates_parse() {
        let d = parse_date("06-21-2020").unwrap();
        assert_eq!(d, NaiveDate::from_ymd_opt(2020, 6, 21).unwrap());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn time_falls_back_to_midnight() {
        let ts = combine_date_time("2021-03-04", "").unwrap();
        assert_eq!(ts.format("%H:%M:%S").to_string(), "00:00:00");
    }

    #[test]
    fn splits_synced_on_cell() {
        assert_eq!(
            split_date_time("2021-05-01 1:02 PM"),
            Some(("2021-05-01".to_string(), "1:02 PM".to_string()))
        );
        assert_eq!(split_date_time("2021-05-01"), None);
    }
}
