pub mod chart_options;
pub mod chrono_series;
pub mod series_set;
