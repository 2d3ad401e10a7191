pub mod data;
pub mod processing;
pub mod render;
pub mod state;

pub use data::loader::{scan_directory, Candidate, DeviceKind, ScanError};
pub use render::chart::ChartDescription;
pub use render::layout::{build_chart, LayoutError};
pub use state::chart_options::ChartOptions;
pub use state::chrono_series::{ChronoSeries, VelocityUnit};
pub use state::series_set::SeriesSet;
