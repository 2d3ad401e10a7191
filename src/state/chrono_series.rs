use serde::{Deserialize, Serialize};

use crate::data::datetime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityUnit {
    Fps,
    Mps,
}

impl Default for VelocityUnit {
    fn default() -> Self {
        VelocityUnit::Fps
    }
}

impl VelocityUnit {
    /// Normalize a unit string as written by the devices ("fps", "ft/s", "m/s", ...).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "fps" | "ft/s" => Some(VelocityUnit::Fps),
            "mps" | "m/s" => Some(VelocityUnit::Mps),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VelocityUnit::Fps => "fps",
            VelocityUnit::Mps => "m/s",
        }
    }
}

/// One string of shots from one chronograph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChronoSeries {
    pub series_number: u32,
    pub display_name: String,
    pub velocities: Vec<u32>,
    pub velocity_unit: VelocityUnit,
    pub capture_date: Option<String>,
    pub capture_time: Option<String>,
    /// 0.0 means the user hasn't entered a weight yet.
    pub charge_weight: f64,
    pub enabled: bool,
}

impl ChronoSeries {
    pub fn new(
        series_number: u32,
        display_name: String,
        velocities: Vec<u32>,
        velocity_unit: VelocityUnit,
    ) -> Self {
        Self {
            series_number,
            display_name,
            velocities,
            velocity_unit,
            capture_date: None,
            capture_time: None,
            charge_weight: 0.0,
            enabled: true,
        }
    }

    pub fn with_capture(mut self, date: Option<String>, time: Option<String>) -> Self {
        self.capture_date = date;
        self.capture_time = time;
        self
    }

    pub fn shot_count(&self) -> usize {
        self.velocities.len()
    }

    pub fn lowest(&self) -> Option<u32> {
        self.velocities.iter().copied().min()
    }

    pub fn highest(&self) -> Option<u32> {
        self.velocities.iter().copied().max()
    }

    pub fn has_charge_weight(&self) -> bool {
        self.charge_weight != 0.0
    }

    /// Best-effort timestamp from the informational date/time fields.
    pub fn captured_at(&self) -> Option<chrono::NaiveDateTime> {
        let date = self.capture_date.as_deref()?;
        datetime::combine_date_time(date, self.capture_time.as_deref().unwrap_or(""))
    }

    /// Short summary shown next to the series, e.g. "10 shots, 2810-2855 fps".
    pub fn summary(&self) -> String {
        let n = self.shot_count();
        format!(
            "{} shot{}, {}-{} {}",
            n,
            if n == 1 { "" } else { "s" },
            self.lowest().unwrap_or(0),
            self.highest().unwrap_or(0),
            self.velocity_unit.label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_strings_normalize() {
        assert_eq!(VelocityUnit::parse("fps"), Some(VelocityUnit::Fps));
        assert_eq!(VelocityUnit::parse(" ft/s "), Some(VelocityUnit::Fps));
        assert_eq!(VelocityUnit::parse("M/S"), Some(VelocityUnit::Mps));
        assert_eq!(VelocityUnit::parse("knots"), None);
    }

    #[test]
    fn extremes_follow_velocities() {
        let mut s = ChronoSeries::new(1, "Series 1".into(), vec![2950, 2940, 2961], VelocityUnit::Fps);
        assert_eq!(s.lowest(), Some(2940));
        assert_eq!(s.highest(), Some(2961));
        s.velocities.push(2999);
        assert_eq!(s.highest(), Some(2999));
        assert_eq!(s.summary(), "4 shots, 2940-2999 fps");
    }

    #[test]
    fn captured_at_combines_fields() {
        let s = ChronoSeries::new(1, "SR0001".into(), vec![2900], VelocityUnit::Fps)
            .with_capture(Some("06-21-2020".into()), Some("10:15:03".into()));
        let ts = s.captured_at().unwrap();
        assert_eq!(ts.format("%Y-%m-%d %H:%M:%S").to_string(), "2020-06-21 10:15:03");

        let undated = ChronoSeries::new(2, "x".into(), vec![2900], VelocityUnit::Fps);
        assert!(undated.captured_at().is_none());
    }
}
