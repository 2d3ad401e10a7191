use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StatsError {
    #[error("cannot compute statistics of an empty series")]
    Empty,

    #[error("a line fit needs at least two points")]
    TooFewPoints,

    #[error("a line fit needs at least two distinct x values")]
    DegenerateX,
}

/// Summary statistics for a string of shots.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesStats {
    pub count: usize,
    pub lowest: u32,
    pub highest: u32,
    pub extreme_spread: u32,
    pub average: f64,
    /// Sample standard deviation; `None` for a single shot.
    pub stdev: Option<f64>,
}

impl SeriesStats {
    pub fn compute(velocities: &[u32]) -> Result<Self, StatsError> {
        let lowest = velocities.iter().copied().min().ok_or(StatsError::Empty)?;
        let highest = velocities.iter().copied().max().ok_or(StatsError::Empty)?;

        let count = velocities.len();
        let average = velocities.iter().map(|&v| v as f64).sum::<f64>() / count as f64;

        let stdev = if count < 2 {
            None
        } else {
            let variance = velocities
                .iter()
                .map(|&v| (v as f64 - average).powi(2))
                .sum::<f64>()
                / (count - 1) as f64;
            Some(variance.sqrt())
        };

        Ok(SeriesStats {
            count,
            lowest,
            highest,
            extreme_spread: highest - lowest,
            average,
            stdev,
        })
    }

    /// Format as a multi-line report string.
    pub fn report(&self, label: &str) -> String {
        let sd = match self.stdev {
            Some(sd) => format!("{sd:.1}"),
            None => "undefined".to_string(),
        };
        format!(
            "{}:\n  Shots: {}\n  Lowest: {}\n  Highest: {}\n  ES: {}\n  Average: {:.1}\n  SD: {}\n",
            label, self.count, self.lowest, self.highest, self.extreme_spread, self.average, sd
        )
    }
}

/// y = intercept + slope * x
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    pub slope: f64,
    pub intercept: f64,
}

impl LinearFit {
    pub fn at(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }
}

/// Ordinary least-squares line through `points`.
pub fn linear_fit(points: &[(f64, f64)]) -> Result<LinearFit, StatsError> {
    if points.len() < 2 {
        return Err(StatsError::TooFewPoints);
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;

    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    if sxx.abs() < f64::EPSILON {
        return Err(StatsError::DegenerateX);
    }

    let slope = sxy / sxx;
    Ok(LinearFit {
        slope,
        intercept: mean_y - slope * mean_x,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_standard_deviation() {
        let stats = SeriesStats::compute(&[2950, 2955, 2960, 2945]).unwrap();
        assert_eq!(stats.lowest, 2945);
        assert_eq!(stats.highest, 2960);
        assert_eq!(stats.extreme_spread, 15);
        assert!((stats.average - 2952.5).abs() < 1e-9);
        // (n-1) denominator: sqrt(125 / 3); the population value would be ~5.59
        let sd = stats.stdev.unwrap();
        assert!((sd - 6.4550).abs() < 1e-3, "sd = {sd}");
    }

    #[test]
    fn single_shot_has_undefined_stdev() {
        let stats = SeriesStats::compute(&[3000]).unwrap();
        assert_eq!(stats.stdev, None);
        assert_eq!(stats.extreme_spread, 0);
        assert!(stats.report("Series 1").contains("SD: undefined"));
    }

    #[test]
    fn empty_is_an_error() {
        assert_eq!(SeriesStats::compute(&[]), Err(StatsError::Empty));
    }

    #[test]
    fn fits_a_line() {
        let fit = linear_fit(&[(0.0, 1.0), (1.0, 3.0), (2.0, 5.0)]).unwrap();
        assert!((fit.slope - 2.0).abs() < 1e-12);
        assert!((fit.intercept - 1.0).abs() < 1e-12);
        assert!((fit.at(3.0) - 7.0).abs() < 1e-12);
    }

    #[test]
    fn fit_rejects_vertical_data() {
        assert_eq!(linear_fit(&[(1.0, 1.0)]), Err(StatsError::TooFewPoints));
        assert_eq!(linear_fit(&[(1.0, 1.0), (1.0, 2.0)]), Err(StatsError::DegenerateX));
    }
}
