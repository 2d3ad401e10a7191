use thiserror::Error;

use crate::processing::statistics::{linear_fit, SeriesStats};
use crate::render::chart::{
    Axis, ChartDescription, DrawStyle, ErrorBar, Highlight, HorizontalAlign, PointSeries,
    RectShape, SeriesSummary, TextAnnotation, Tick, VerticalAlign, AVERAGE_LINE_COLOR,
    DELTA_HIGHLIGHT_COLOR, ERROR_BAR_COLOR, SHOT_COLOR, TEXT_COLOR, TREND_LINE_COLOR,
};
use crate::render::plot_transform::{
    format_charge_weight, velocity_ticks, DataBounds, DataPoint, PixelRect, PlotTransform,
};
use crate::state::chart_options::{ChartOptions, GraphKind, LineStyle, Placement, XAxisSpacing};
use crate::state::chrono_series::ChronoSeries;

/// Pixels added around a shot string's bounding box.
pub const BOX_MARGIN_PX: f64 = 10.0;
pub const SCATTER_LABEL_ABOVE_PX: f64 = 25.0;
pub const SCATTER_LABEL_BELOW_PX: f64 = 20.0;
pub const ERROR_BAR_LABEL_ABOVE_PX: f64 = 20.0;
pub const ERROR_BAR_LABEL_BELOW_PX: f64 = 15.0;
/// Velocity deltas smaller than this are tinted, stronger the smaller they are.
pub const DELTA_HIGHLIGHT_LIMIT: i64 = 25;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("at least two series are required to graph ({0} enabled)")]
    NotEnoughSeries(usize),

    #[error("'{0}' is missing charge weight")]
    MissingChargeWeight(String),

    #[error("'{0}' has no velocities")]
    EmptySeries(String),

    #[error("'{first}' and '{second}' both use charge weight {weight}; proportional spacing needs distinct weights")]
    DuplicateChargeWeight {
        first: String,
        second: String,
        weight: f64,
    },

    #[error("'{0}' has a single shot, so its standard deviation is undefined")]
    UndefinedDeviation(String),
}

struct Plotted<'a> {
    series: &'a ChronoSeries,
    x: f64,
    stats: SeriesStats,
}

/// Rounded difference between consecutive averages, as shown on the chart.
pub fn velocity_delta(previous_average: f64, average: f64) -> i64 {
    (average - previous_average).round() as i64
}

/// "+25" / "-7"; zero counts as positive.
pub fn format_delta(delta: i64) -> String {
    let sign = if delta < 0 { "-" } else { "+" };
    format!("{sign}{}", delta.abs())
}

fn delta_highlight(delta: i64) -> Option<Highlight> {
    let magnitude = delta.abs();
    if magnitude >= DELTA_HIGHLIGHT_LIMIT {
        return None;
    }
    Some(Highlight {
        color: DELTA_HIGHLIGHT_COLOR,
        alpha: (1.0 - magnitude as f64 / DELTA_HIGHLIGHT_LIMIT as f64) * 0.6,
    })
}

fn validate<'a>(
    series: &'a [ChronoSeries],
    options: &ChartOptions,
) -> Result<Vec<Plotted<'a>>, LayoutError> {
    let enabled: Vec<&ChronoSeries> = series.iter().filter(|s| s.enabled).collect();

    if let Some(s) = enabled.iter().find(|s| !s.has_charge_weight()) {
        return Err(LayoutError::MissingChargeWeight(s.display_name.clone()));
    }
    if enabled.len() < 2 {
        return Err(LayoutError::NotEnoughSeries(enabled.len()));
    }

    let needs_stdev = options.graph_kind == GraphKind::LineWithErrorBars
        || options.standard_deviation.enabled;

    let mut plotted = Vec::with_capacity(enabled.len());
    for s in enabled {
        let stats = SeriesStats::compute(&s.velocities)
            .map_err(|_| LayoutError::EmptySeries(s.display_name.clone()))?;
        if needs_stdev && stats.stdev.is_none() {
            return Err(LayoutError::UndefinedDeviation(s.display_name.clone()));
        }
        if s.velocity_unit != options.velocity_unit {
            tracing::warn!(
                "{} was recorded in {} but the chart is labeled {}",
                s.display_name,
                s.velocity_unit.label(),
                options.velocity_unit.label()
            );
        }
        plotted.push(Plotted { series: s, x: 0.0, stats });
    }

    // Stable, so equal weights keep display order
    plotted.sort_by(|a, b| a.series.charge_weight.total_cmp(&b.series.charge_weight));

    if options.x_axis_spacing == XAxisSpacing::Proportional {
        for pair in plotted.windows(2) {
            if pair[0].series.charge_weight == pair[1].series.charge_weight {
                return Err(LayoutError::DuplicateChargeWeight {
                    first: pair[0].series.display_name.clone(),
                    second: pair[1].series.display_name.clone(),
                    weight: pair[0].series.charge_weight,
                });
            }
        }
    }

    for (ordinal, p) in plotted.iter_mut().enumerate() {
        p.x = match options.x_axis_spacing {
            XAxisSpacing::Constant => ordinal as f64,
            XAxisSpacing::Proportional => p.series.charge_weight,
        };
    }

    Ok(plotted)
}

/// Lay out the enabled series as a chart.
///
/// Plotting happens in two passes. The first emits every data-space element so
/// the axis bounds (and with them the pixel mapping) are final. The second
/// uses that mapping to pad shot strings with fixed pixel margins and to place
/// labels a fixed number of pixels away from the data, converting the result
/// back into data coordinates for the renderer.
///
/// Fails without producing anything if fewer than two series are enabled, an
/// enabled series has no charge weight, or a needed standard deviation is
/// undefined.
pub fn build_chart(
    series: &[ChronoSeries],
    options: &ChartOptions,
) -> Result<ChartDescription, LayoutError> {
    let plotted = validate(series, options)?;
    tracing::info!("Laying out {} series", plotted.len());

    // ------------------------------------------------------------------
    // Pass 1: everything in data space
    // ------------------------------------------------------------------
    let mut point_series = Vec::new();
    let mut error_bars = Vec::new();
    let mut averages = Vec::with_capacity(plotted.len());
    let mut all_shots = Vec::new();

    for p in &plotted {
        tracing::debug!("{}", p.stats.report(&p.series.display_name));
        let center = DataPoint::new(p.x, p.stats.average);
        averages.push(center);

        let shots: Vec<DataPoint> = p
            .series
            .velocities
            .iter()
            .map(|&v| DataPoint::new(p.x, v as f64))
            .collect();
        all_shots.extend(shots.iter().copied());

        match options.graph_kind {
            GraphKind::Scatter => point_series.push(PointSeries {
                label: p.series.display_name.clone(),
                style: DrawStyle::Markers { size: 6.0 },
                color: SHOT_COLOR,
                opacity: 1.0,
                points: shots,
            }),
            GraphKind::LineWithErrorBars => {
                point_series.push(PointSeries {
                    label: p.series.display_name.clone(),
                    style: DrawStyle::Markers { size: 5.0 },
                    color: SHOT_COLOR,
                    opacity: 1.0,
                    points: vec![center],
                });
                error_bars.push(ErrorBar {
                    center,
                    half_height: p.stats.stdev.unwrap_or(0.0),
                    color: ERROR_BAR_COLOR,
                });
            }
        }
    }

    point_series.push(PointSeries {
        label: "Average".to_string(),
        style: DrawStyle::Line { width: 1.5, style: LineStyle::Solid },
        color: AVERAGE_LINE_COLOR,
        opacity: if options.graph_kind == GraphKind::Scatter { 0.65 } else { 1.0 },
        points: averages,
    });

    if options.trend_line.enabled {
        match linear_fit(&all_shots.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>()) {
            Ok(fit) => {
                let x_min = all_shots.iter().map(|p| p.x).fold(f64::INFINITY, f64::min);
                let x_max = all_shots.iter().map(|p| p.x).fold(f64::NEG_INFINITY, f64::max);
                point_series.push(PointSeries {
                    label: "Trend".to_string(),
                    style: DrawStyle::Line { width: 1.5, style: options.trend_line.style },
                    color: TREND_LINE_COLOR,
                    opacity: 0.65,
                    points: vec![
                        DataPoint::new(x_min, fit.at(x_min)),
                        DataPoint::new(x_max, fit.at(x_max)),
                    ],
                });
            }
            Err(e) => tracing::warn!("Skipping trend line: {e}"),
        }
    }

    // Axis limits are final once every element above is known
    let extents = point_series
        .iter()
        .flat_map(|s| s.points.iter().copied())
        .chain(error_bars.iter().flat_map(|b| [b.low(), b.high()]));
    let bounds = DataBounds::enclosing(extents)
        .unwrap_or(DataBounds { x_min: 0.0, x_max: 1.0, y_min: 0.0, y_max: 1.0 })
        .padded();
    let transform = PlotTransform::new(bounds, PixelRect::plot_area(&options.canvas));

    // ------------------------------------------------------------------
    // Pass 2: boxes and labels through the pixel mapping
    // ------------------------------------------------------------------
    let mut rects = Vec::new();
    let mut annotations = Vec::new();
    let mut summaries = Vec::with_capacity(plotted.len());
    let mut previous_average: Option<f64> = None;

    for p in &plotted {
        let stats = &p.stats;

        let (top_anchor, bottom_anchor) = match options.graph_kind {
            GraphKind::Scatter => {
                let low = transform.data_to_pixel(DataPoint::new(p.x, stats.lowest as f64));
                let high = transform.data_to_pixel(DataPoint::new(p.x, stats.highest as f64));

                rects.push(RectShape {
                    min: transform.pixel_to_data(low.offset(-BOX_MARGIN_PX, BOX_MARGIN_PX)),
                    max: transform.pixel_to_data(high.offset(BOX_MARGIN_PX, -BOX_MARGIN_PX)),
                    color: SHOT_COLOR,
                });

                (
                    transform.pixel_to_data(high.offset(0.0, -SCATTER_LABEL_ABOVE_PX)),
                    transform.pixel_to_data(low.offset(0.0, SCATTER_LABEL_BELOW_PX)),
                )
            }
            GraphKind::LineWithErrorBars => {
                let sd = stats.stdev.unwrap_or(0.0);
                let low = transform.data_to_pixel(DataPoint::new(p.x, stats.average - sd));
                let high = transform.data_to_pixel(DataPoint::new(p.x, stats.average + sd));
                (
                    transform.pixel_to_data(high.offset(0.0, -ERROR_BAR_LABEL_ABOVE_PX)),
                    transform.pixel_to_data(low.offset(0.0, ERROR_BAR_LABEL_BELOW_PX)),
                )
            }
        };

        let delta = previous_average.map(|prev| velocity_delta(prev, stats.average));

        for (placement, anchor, v_align) in [
            (Placement::Above, top_anchor, VerticalAlign::Baseline),
            (Placement::Below, bottom_anchor, VerticalAlign::Top),
        ] {
            let mut lines = Vec::new();
            let mut highlight = None;

            if options.extreme_spread.shows_at(placement) {
                lines.push(format!("ES: {}", stats.extreme_spread));
            }
            if options.standard_deviation.shows_at(placement) {
                if let Some(sd) = stats.stdev {
                    lines.push(format!("SD: {sd:.1}"));
                }
            }
            if options.average.shows_at(placement) {
                lines.push(format!("x\u{0304}: {:.1}", stats.average));
            }
            if options.velocity_delta.shows_at(placement) {
                if let Some(d) = delta {
                    lines.push(format_delta(d));
                    highlight = delta_highlight(d);
                }
            }

            if !lines.is_empty() {
                annotations.push(TextAnnotation {
                    lines,
                    anchor: DataPoint::new(p.x, anchor.y),
                    h_align: HorizontalAlign::Center,
                    v_align,
                    highlight,
                });
            }
        }

        summaries.push(SeriesSummary {
            name: p.series.display_name.clone(),
            charge_weight: p.series.charge_weight,
            position: p.x,
            shots: stats.count,
            extreme_spread: stats.extreme_spread,
            average: stats.average,
            stdev: stats.stdev,
            velocity_delta: delta,
        });
        previous_average = Some(stats.average);
    }

    let x_axis = Axis {
        title: format!("Powder Charge ({})", options.weight_unit.label()),
        min: bounds.x_min,
        max: bounds.x_max,
        ticks: plotted
            .iter()
            .map(|p| Tick {
                position: p.x,
                label: format_charge_weight(p.series.charge_weight),
            })
            .collect(),
    };
    let y_axis = Axis {
        title: format!("Velocity ({})", options.velocity_unit.label()),
        min: bounds.y_min,
        max: bounds.y_max,
        ticks: velocity_ticks(bounds.y_min, bounds.y_max)
            .into_iter()
            .map(|(position, label)| Tick { position, label })
            .collect(),
    };

    Ok(ChartDescription {
        title: options.metadata.title.clone(),
        subtitle: options.metadata.subtitle(),
        text_color: TEXT_COLOR,
        x_axis,
        y_axis,
        series: point_series,
        error_bars,
        rects,
        annotations,
        summaries,
        transform,
    })
}
