use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::chrono_series::ChronoSeries;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TransformError {
    #[error("no series are enabled")]
    NoEnabledSeries,

    #[error("'{name}' has {found} shots but the other series have {expected}; round-robin needs equal shot counts")]
    MismatchedShotCounts {
        name: String,
        expected: usize,
        found: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AutofillDirection {
    Increasing,
    Decreasing,
}

impl Default for AutofillDirection {
    fn default() -> Self {
        AutofillDirection::Increasing
    }
}

/// Convert round-robin shooting into one series per charge.
///
/// Given N enabled series of K shots, returns K series of N shots where new
/// series `i` holds shot `i` of every input series, in input order.
pub fn round_robin(series: &[ChronoSeries]) -> Result<Vec<ChronoSeries>, TransformError> {
    let enabled: Vec<&ChronoSeries> = series.iter().filter(|s| s.enabled).collect();
    let first = enabled.first().ok_or(TransformError::NoEnabledSeries)?;
    let shots = first.shot_count();

    if let Some(bad) = enabled.iter().find(|s| s.shot_count() != shots) {
        return Err(TransformError::MismatchedShotCounts {
            name: bad.display_name.clone(),
            expected: shots,
            found: bad.shot_count(),
        });
    }

    let converted = (0..shots)
        .map(|i| {
            let velocities: Vec<u32> = enabled.iter().map(|s| s.velocities[i]).collect();
            let number = i as u32 + 1;
            ChronoSeries::new(number, format!("Series {number}"), velocities, first.velocity_unit)
        })
        .collect::<Vec<_>>();

    tracing::info!(
        "Round-robin converted {} series of {} shots into {} series",
        enabled.len(),
        shots,
        converted.len()
    );
    Ok(converted)
}

/// Assign sequential charge weights to the enabled series in display order.
pub fn autofill(
    series: &mut [ChronoSeries],
    start: f64,
    interval: f64,
    direction: AutofillDirection,
) {
    let mut order: Vec<usize> = (0..series.len()).filter(|&i| series[i].enabled).collect();
    order.sort_by_key(|&i| series[i].series_number);

    let step = match direction {
        AutofillDirection::Increasing => interval,
        AutofillDirection::Decreasing => -interval,
    };

    for (n, idx) in order.into_iter().enumerate() {
        let weight = start + step * n as f64;
        tracing::debug!("Setting {} to {weight}", series[idx].display_name);
        series[idx].charge_weight = weight;
    }
}
