use serde::{Deserialize, Serialize};

use crate::state::chrono_series::VelocityUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphKind {
    Scatter,
    LineWithErrorBars,
}

impl Default for GraphKind {
    fn default() -> Self {
        GraphKind::Scatter
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    Grain,
    Gram,
}

impl Default for WeightUnit {
    fn default() -> Self {
        WeightUnit::Grain
    }
}

impl WeightUnit {
    pub fn label(&self) -> &'static str {
        match self {
            WeightUnit::Grain => "gr",
            WeightUnit::Gram => "g",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    Above,
    Below,
}

impl Default for Placement {
    fn default() -> Self {
        Placement::Above
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineStyle {
    Solid,
    Dashed,
}

impl Default for LineStyle {
    fn default() -> Self {
        LineStyle::Solid
    }
}

/// How series are spread along the x axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum XAxisSpacing {
    /// Evenly spaced by sorted position, ticks labeled with the weight.
    Constant,
    /// Placed at the literal charge weight.
    Proportional,
}

impl Default for XAxisSpacing {
    fn default() -> Self {
        XAxisSpacing::Constant
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnnotationToggle {
    pub enabled: bool,
    pub placement: Placement,
}

impl AnnotationToggle {
    pub fn new(enabled: bool, placement: Placement) -> Self {
        Self { enabled, placement }
    }

    pub fn shows_at(&self, placement: Placement) -> bool {
        self.enabled && self.placement == placement
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendLine {
    pub enabled: bool,
    pub style: LineStyle,
}

/// Free text printed in the title and subtitle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartMetadata {
    pub title: String,
    pub rifle: String,
    pub projectile: String,
    pub propellant: String,
    pub brass: String,
    pub primer: String,
    pub weather: String,
}

impl ChartMetadata {
    /// Non-empty fields joined with ", ".
    pub fn subtitle(&self) -> String {
        [
            &self.rifle,
            &self.propellant,
            &self.projectile,
            &self.brass,
            &self.primer,
            &self.weather,
        ]
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(", ")
    }
}

/// Figure size in pixels and where the plot area sits inside it.
///
/// Fractions are measured from the left and from the bottom of the figure.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasGeometry {
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub right: f64,
    pub bottom: f64,
    pub top: f64,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            width: 2000.0,
            height: 800.0,
            left: 0.125,
            right: 0.9,
            bottom: 0.11,
            top: 0.8,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartOptions {
    pub graph_kind: GraphKind,
    pub weight_unit: WeightUnit,
    pub velocity_unit: VelocityUnit,
    pub extreme_spread: AnnotationToggle,
    pub standard_deviation: AnnotationToggle,
    pub average: AnnotationToggle,
    pub velocity_delta: AnnotationToggle,
    pub trend_line: TrendLine,
    pub x_axis_spacing: XAxisSpacing,
    pub metadata: ChartMetadata,
    pub canvas: CanvasGeometry,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            graph_kind: GraphKind::default(),
            weight_unit: WeightUnit::default(),
            velocity_unit: VelocityUnit::default(),
            extreme_spread: AnnotationToggle::new(true, Placement::Above),
            standard_deviation: AnnotationToggle::new(true, Placement::Above),
            average: AnnotationToggle::new(false, Placement::Below),
            velocity_delta: AnnotationToggle::new(true, Placement::Below),
            trend_line: TrendLine::default(),
            x_axis_spacing: XAxisSpacing::default(),
            metadata: ChartMetadata::default(),
            canvas: CanvasGeometry::default(),
        }
    }
}
