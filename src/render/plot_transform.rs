use serde::Serialize;

use crate::state::chart_options::CanvasGeometry;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataPoint {
    pub x: f64,
    pub y: f64,
}

impl DataPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A position on the canvas in pixels, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}

/// Axis-aligned bounds in data coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DataBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DataBounds {
    /// Smallest bounds holding every finite point, `None` when there are none.
    pub fn enclosing(points: impl IntoIterator<Item = DataPoint>) -> Option<Self> {
        let mut x_min = f64::INFINITY;
        let mut x_max = f64::NEG_INFINITY;
        let mut y_min = f64::INFINITY;
        let mut y_max = f64::NEG_INFINITY;

        for p in points {
            if p.x.is_finite() && p.y.is_finite() {
                x_min = x_min.min(p.x);
                x_max = x_max.max(p.x);
                y_min = y_min.min(p.y);
                y_max = y_max.max(p.y);
            }
        }

        if !x_min.is_finite() || !y_min.is_finite() {
            return None;
        }
        Some(Self { x_min, x_max, y_min, y_max })
    }

    /// Add 5% padding on each side, or 0.5 when an axis has no extent.
    pub fn padded(self) -> Self {
        let x_pad = (self.x_max - self.x_min) * 0.05;
        let y_pad = (self.y_max - self.y_min) * 0.05;
        let x_pad = if x_pad.abs() < 1e-15 { 0.5 } else { x_pad };
        let y_pad = if y_pad.abs() < 1e-15 { 0.5 } else { y_pad };

        Self {
            x_min: self.x_min - x_pad,
            x_max: self.x_max + x_pad,
            y_min: self.y_min - y_pad,
            y_max: self.y_max + y_pad,
        }
    }
}

/// The plot area on the canvas, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PixelRect {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl PixelRect {
    pub fn plot_area(canvas: &CanvasGeometry) -> Self {
        Self {
            left: canvas.left * canvas.width,
            right: canvas.right * canvas.width,
            top: (1.0 - canvas.top) * canvas.height,
            bottom: (1.0 - canvas.bottom) * canvas.height,
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }
}

/// Data <-> pixel mapping, fixed once all data has been plotted.
///
/// Built from the final axis bounds so later label placement never depends on
/// renderer state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlotTransform {
    pub bounds: DataBounds,
    pub area: PixelRect,
}

impl PlotTransform {
    pub fn new(bounds: DataBounds, area: PixelRect) -> Self {
        Self { bounds, area }
    }

    pub fn data_to_pixel(&self, p: DataPoint) -> PixelPoint {
        let b = &self.bounds;
        let t_x = (p.x - b.x_min) / (b.x_max - b.x_min);
        let t_y = 1.0 - (p.y - b.y_min) / (b.y_max - b.y_min);
        PixelPoint::new(
            self.area.left + t_x * self.area.width(),
            self.area.top + t_y * self.area.height(),
        )
    }

    pub fn pixel_to_data(&self, p: PixelPoint) -> DataPoint {
        let b = &self.bounds;
        let t_x = (p.x - self.area.left) / self.area.width();
        let t_y = 1.0 - (p.y - self.area.top) / self.area.height();
        DataPoint::new(
            b.x_min + t_x * (b.x_max - b.x_min),
            b.y_min + t_y * (b.y_max - b.y_min),
        )
    }
}

const TARGET_TICKS: f64 = 6.0;

/// Spacing between velocity ticks: a 1, 2 or 5 multiple of a power of ten.
fn tick_step(range: f64) -> f64 {
    let raw = range / TARGET_TICKS;
    let order = 10f64.powf(raw.log10().floor());
    let step = match raw / order {
        n if n <= 1.0 => 1.0,
        n if n <= 2.0 => 2.0,
        n if n <= 5.0 => 5.0,
        _ => 10.0,
    };
    step * order
}

/// Labeled ticks for the velocity axis between `min` and `max`.
///
/// Labels carry exactly as many decimals as the step needs, so whole-number
/// velocities never show a fraction.
pub fn velocity_ticks(min: f64, max: f64) -> Vec<(f64, String)> {
    let range = max - min;
    if range <= 0.0 || !range.is_finite() {
        return Vec::new();
    }
    let step = tick_step(range);
    let decimals = if step >= 1.0 { 0 } else { (-step.log10() - 1e-9).ceil() as usize };

    let first = (min / step - 1e-9).ceil() as i64;
    let last = (max / step + 1e-9).floor() as i64;
    (first..=last)
        .map(|i| {
            let v = i as f64 * step;
            (v, format!("{v:.decimals$}"))
        })
        .collect()
}

/// Charge weight label as the loader entered it: up to three decimals, no
/// trailing zeros.
pub fn format_charge_weight(weight: f64) -> String {
    let s = format!("{weight:.3}");
    s.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> PlotTransform {
        let bounds = DataBounds::enclosing([DataPoint::new(0.0, 2900.0), DataPoint::new(4.0, 3010.0)])
            .unwrap()
            .padded();
        PlotTransform::new(bounds, PixelRect::plot_area(&CanvasGeometry::default()))
    }

    #[test]
    fn plot_area_from_canvas() {
        let area = PixelRect::plot_area(&CanvasGeometry::default());
        assert!((area.left - 250.0).abs() < 1e-9);
        assert!((area.right - 1800.0).abs() < 1e-9);
        assert!((area.top - 160.0).abs() < 1e-9);
        assert!((area.bottom - 712.0).abs() < 1e-9);
    }

    #[test]
    fn higher_values_are_higher_on_screen() {
        let t = sample();
        let low = t.data_to_pixel(DataPoint::new(1.0, 2950.0));
        let high = t.data_to_pixel(DataPoint::new(1.0, 2990.0));
        assert!(high.y < low.y);
        assert!((low.x - high.x).abs() < 1e-9);
    }

    #[test]
    fn pixel_round_trip() {
        let t = sample();
        for &(x, y) in &[(260.0, 170.0), (1000.5, 433.25), (1799.0, 700.0)] {
            let p = PixelPoint::new(x, y);
            let back = t.data_to_pixel(t.pixel_to_data(p));
            assert!((back.x - x).abs() < 1e-6 && (back.y - y).abs() < 1e-6);
        }
    }

    #[test]
    fn flat_axis_gets_fixed_padding() {
        let b = DataBounds::enclosing([DataPoint::new(1.0, 5.0), DataPoint::new(1.0, 5.0)])
            .unwrap()
            .padded();
        assert_eq!((b.x_min, b.x_max), (0.5, 1.5));
        assert_eq!((b.y_min, b.y_max), (4.5, 5.5));
    }

    #[test]
    fn velocity_ticks_follow_step_precision() {
        let ticks = velocity_ticks(2900.0, 3010.0);
        let positions: Vec<f64> = ticks.iter().map(|(v, _)| *v).collect();
        assert_eq!(positions, vec![2900.0, 2920.0, 2940.0, 2960.0, 2980.0, 3000.0]);
        assert_eq!(ticks[0].1, "2900");

        let fine = velocity_ticks(2950.0, 2951.0);
        assert!(!fine.is_empty());
        assert!(fine.iter().all(|(_, l)| l.split('.').nth(1).map(str::len) == Some(1)));

        assert!(velocity_ticks(5.0, 5.0).is_empty());
    }

    #[test]
    fn charge_weight_labels() {
        assert_eq!(format_charge_weight(40.3), "40.3");
        assert_eq!(format_charge_weight(41.0), "41");
        assert_eq!(format_charge_weight(2.125), "2.125");
        assert_eq!(format_charge_weight(40.30000000001), "40.3");
    }
}
