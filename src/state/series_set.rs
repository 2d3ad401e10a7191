use thiserror::Error;

use crate::processing::transforms::{self, AutofillDirection, TransformError};
use crate::render::chart::ChartDescription;
use crate::render::layout::{self, LayoutError};
use crate::state::chart_options::ChartOptions;
use crate::state::chrono_series::ChronoSeries;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SeriesSetError {
    #[error("no series numbered {0}")]
    UnknownSeries(u32),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

/// The loaded series, owned in one place.
///
/// Front-ends mutate it only through these commands; transforms replace the
/// whole list or leave it untouched.
#[derive(Debug, Clone, Default)]
pub struct SeriesSet {
    series: Vec<ChronoSeries>,
}

impl SeriesSet {
    pub fn new(mut series: Vec<ChronoSeries>) -> Self {
        series.sort_by_key(|s| s.series_number);
        Self { series }
    }

    /// Series in display order.
    pub fn series(&self) -> &[ChronoSeries] {
        &self.series
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn enabled(&self) -> impl Iterator<Item = &ChronoSeries> {
        self.series.iter().filter(|s| s.enabled)
    }

    pub fn get(&self, series_number: u32) -> Option<&ChronoSeries> {
        self.series.iter().find(|s| s.series_number == series_number)
    }

    fn get_mut(&mut self, series_number: u32) -> Result<&mut ChronoSeries, SeriesSetError> {
        self.series
            .iter_mut()
            .find(|s| s.series_number == series_number)
            .ok_or(SeriesSetError::UnknownSeries(series_number))
    }

    pub fn set_series_enabled(&mut self, series_number: u32, enabled: bool) -> Result<(), SeriesSetError> {
        self.get_mut(series_number)?.enabled = enabled;
        Ok(())
    }

    pub fn set_all_enabled(&mut self, enabled: bool) {
        for s in &mut self.series {
            s.enabled = enabled;
        }
    }

    pub fn set_charge_weight(&mut self, series_number: u32, weight: f64) -> Result<(), SeriesSetError> {
        self.get_mut(series_number)?.charge_weight = weight;
        Ok(())
    }

    /// Replace the set with its round-robin conversion. On error nothing changes.
    pub fn round_robin(&mut self) -> Result<(), SeriesSetError> {
        let converted = transforms::round_robin(&self.series)?;
        self.series = converted;
        Ok(())
    }

    pub fn autofill(&mut self, start: f64, interval: f64, direction: AutofillDirection) {
        transforms::autofill(&mut self.series, start, interval, direction);
    }

    pub fn build_chart(&self, options: &ChartOptions) -> Result<ChartDescription, SeriesSetError> {
        Ok(layout::build_chart(&self.series, options)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::chrono_series::VelocityUnit;

    fn set() -> SeriesSet {
        SeriesSet::new(vec![
            ChronoSeries::new(2, "SR0002".into(), vec![2960, 2965, 2970], VelocityUnit::Fps),
            ChronoSeries::new(1, "SR0001".into(), vec![2950, 2955, 2945], VelocityUnit::Fps),
            ChronoSeries::new(3, "SR0003".into(), vec![2980, 2990], VelocityUnit::Fps),
        ])
    }

    #[test]
    fn keeps_display_order() {
        let s = set();
        let numbers: Vec<u32> = s.series().iter().map(|s| s.series_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn commands_touch_only_the_named_series() {
        let mut s = set();
        s.set_series_enabled(2, false).unwrap();
        s.set_charge_weight(3, 41.2).unwrap();
        assert_eq!(s.enabled().count(), 2);
        assert_eq!(s.get(3).unwrap().charge_weight, 41.2);
        assert_eq!(s.get(1).unwrap().charge_weight, 0.0);
        assert_eq!(s.set_series_enabled(9, true), Err(SeriesSetError::UnknownSeries(9)));

        s.set_all_enabled(true);
        assert_eq!(s.enabled().count(), 3);
    }

    #[test]
    fn failed_round_robin_leaves_set_untouched() {
        let mut s = set();
        let before = s.series().to_vec();
        assert!(matches!(s.round_robin(), Err(SeriesSetError::Transform(_))));
        assert_eq!(s.series(), before.as_slice());

        s.set_series_enabled(3, false).unwrap();
        s.round_robin().unwrap();
        assert_eq!(s.len(), 3);
        assert_eq!(s.series()[0].velocities, vec![2950, 2960]);
    }

    #[test]
    fn autofill_then_chart() {
        let mut s = set();
        s.autofill(40.0, 0.3, AutofillDirection::Increasing);
        let chart = s.build_chart(&ChartOptions::default()).unwrap();
        assert_eq!(chart.summaries.len(), 3);

        s.set_charge_weight(1, 0.0).unwrap();
        assert_eq!(
            s.build_chart(&ChartOptions::default()).unwrap_err(),
            SeriesSetError::Layout(LayoutError::MissingChargeWeight("SR0001".into()))
        );
    }
}
