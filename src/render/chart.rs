use serde::Serialize;

use crate::render::plot_transform::{DataPoint, PlotTransform};
use crate::state::chart_options::LineStyle;

pub const SHOT_COLOR: &str = "#0536b0";
pub const AVERAGE_LINE_COLOR: &str = "#1c57eb";
pub const TREND_LINE_COLOR: &str = "#ff0000";
pub const ERROR_BAR_COLOR: &str = "#000000";
pub const DELTA_HIGHLIGHT_COLOR: &str = "#00e810";
pub const TEXT_COLOR: &str = "#4d4d4d";

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum DrawStyle {
    Markers { size: f64 },
    Line { width: f64, style: LineStyle },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PointSeries {
    pub label: String,
    pub style: DrawStyle,
    pub color: &'static str,
    pub opacity: f64,
    pub points: Vec<DataPoint>,
}

/// Vertical error bar centered on `center`, extending `half_height` both ways.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorBar {
    pub center: DataPoint,
    pub half_height: f64,
    pub color: &'static str,
}

impl ErrorBar {
    pub fn low(&self) -> DataPoint {
        DataPoint::new(self.center.x, self.center.y - self.half_height)
    }

    pub fn high(&self) -> DataPoint {
        DataPoint::new(self.center.x, self.center.y + self.half_height)
    }
}

/// Unfilled rectangle from `min` (bottom-left) to `max` (top-right).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RectShape {
    pub min: DataPoint,
    pub max: DataPoint,
    pub color: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HorizontalAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum VerticalAlign {
    Top,
    Center,
    Baseline,
}

/// Background tint behind an annotation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Highlight {
    pub color: &'static str,
    pub alpha: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextAnnotation {
    /// One entry per line, drawn top to bottom.
    pub lines: Vec<String>,
    pub anchor: DataPoint,
    pub h_align: HorizontalAlign,
    pub v_align: VerticalAlign,
    pub highlight: Option<Highlight>,
}

impl TextAnnotation {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tick {
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Axis {
    pub title: String,
    pub min: f64,
    pub max: f64,
    pub ticks: Vec<Tick>,
}

/// One row of the per-series summary that accompanies the chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesSummary {
    pub name: String,
    pub charge_weight: f64,
    pub position: f64,
    pub shots: usize,
    pub extreme_spread: u32,
    pub average: f64,
    pub stdev: Option<f64>,
    pub velocity_delta: Option<i64>,
}

/// Renderer-facing chart. Everything is in data coordinates; the renderer only
/// has to draw what is listed here.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartDescription {
    pub title: String,
    pub subtitle: String,
    /// Colour for titles, axis labels and annotations.
    pub text_color: &'static str,
    pub x_axis: Axis,
    pub y_axis: Axis,
    pub series: Vec<PointSeries>,
    pub error_bars: Vec<ErrorBar>,
    pub rects: Vec<RectShape>,
    pub annotations: Vec<TextAnnotation>,
    pub summaries: Vec<SeriesSummary>,
    /// Mapping used to place boxes and labels; the renderer must use the same axes.
    pub transform: PlotTransform,
}
