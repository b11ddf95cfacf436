//! Choropleth rendering: county polygons shaded by a numeric measure.

use std::path::Path;

use geo::BoundingRect;
use plotters::prelude::*;

use crate::error::{CohortError, Result};
use crate::figures::boundaries::CountyShape;

/// Fill for counties with no matching measure
pub const MISSING_FILL: RGBColor = RGBColor(189, 189, 189);

/// Light end of the sequential ramp
const RAMP_LOW: (f64, f64, f64) = (255.0, 247.0, 188.0);
/// Dark end of the sequential ramp
const RAMP_HIGH: (f64, f64, f64) = (140.0, 45.0, 4.0);

/// Layout of one choropleth figure
#[derive(Debug, Clone)]
pub struct ChoroplethSpec {
    pub title: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
}

impl ChoroplethSpec {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            width: 1200,
            height: 1400,
        }
    }
}

/// Render a choropleth to a bitmap file
///
/// Fill color comes from a log-like (log1p-normalized) sequential ramp to
/// keep heavily skewed measures readable; counties with a missing measure
/// render in the neutral fill, never as an error.
///
/// # Errors
/// Returns a `Render` error if drawing or writing the image fails
pub fn render_choropleth(
    joined: &[(&CountyShape, Option<f64>)],
    spec: &ChoroplethSpec,
    out: &Path,
) -> Result<()> {
    if joined.is_empty() {
        return Err(CohortError::Render(
            "no county boundaries to render".to_string(),
        ));
    }

    let (min_x, max_x, min_y, max_y) = bounds(joined)?;
    let scale = LogScale::from_values(joined.iter().filter_map(|(_, v)| *v));

    let root = BitMapBackend::new(out, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(10)
        .build_cartesian_2d(min_x..max_x, min_y..max_y)
        .map_err(render_err)?;

    for (shape, value) in joined {
        let fill = match value {
            Some(v) => scale.color(*v),
            None => MISSING_FILL,
        };
        for polygon in &shape.polygons.0 {
            // Exterior rings only; county boundaries carry no holes
            let points: Vec<(f64, f64)> =
                polygon.exterior().coords().map(|c| (c.x, c.y)).collect();
            chart
                .draw_series(std::iter::once(Polygon::new(
                    points.clone(),
                    fill.filled(),
                )))
                .map_err(render_err)?;
            chart
                .draw_series(std::iter::once(PathElement::new(points, WHITE)))
                .map_err(render_err)?;
        }
    }

    root.present().map_err(render_err)?;
    log::info!("Wrote choropleth to {}", out.display());
    Ok(())
}

/// log1p-normalized mapping from a measure value into the color ramp
struct LogScale {
    min: f64,
    span: f64,
}

impl LogScale {
    fn from_values(values: impl Iterator<Item = f64>) -> Self {
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in values {
            min = min.min(v);
            max = max.max(v);
        }
        if !min.is_finite() {
            // No measures at all; every county renders as missing anyway
            return Self { min: 0.0, span: 0.0 };
        }
        Self {
            min,
            span: (1.0 + (max - min)).ln(),
        }
    }

    fn color(&self, value: f64) -> RGBColor {
        let t = if self.span > 0.0 {
            ((1.0 + (value - self.min).max(0.0)).ln() / self.span).clamp(0.0, 1.0)
        } else {
            0.5
        };
        lerp_color(RAMP_LOW, RAMP_HIGH, t)
    }
}

fn lerp_color(low: (f64, f64, f64), high: (f64, f64, f64), t: f64) -> RGBColor {
    RGBColor(
        (low.0 + (high.0 - low.0) * t).round() as u8,
        (low.1 + (high.1 - low.1) * t).round() as u8,
        (low.2 + (high.2 - low.2) * t).round() as u8,
    )
}

fn bounds(joined: &[(&CountyShape, Option<f64>)]) -> Result<(f64, f64, f64, f64)> {
    let mut min_x = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_y = f64::NEG_INFINITY;

    for (shape, _) in joined {
        if let Some(rect) = shape.polygons.bounding_rect() {
            min_x = min_x.min(rect.min().x);
            max_x = max_x.max(rect.max().x);
            min_y = min_y.min(rect.min().y);
            max_y = max_y.max(rect.max().y);
        }
    }

    if !min_x.is_finite() {
        return Err(CohortError::Render(
            "county boundaries carry no coordinates".to_string(),
        ));
    }

    // Small margin so border strokes are not clipped
    let pad_x = (max_x - min_x).max(f64::EPSILON) * 0.02;
    let pad_y = (max_y - min_y).max(f64::EPSILON) * 0.02;
    Ok((min_x - pad_x, max_x + pad_x, min_y - pad_y, max_y + pad_y))
}

fn render_err(e: impl std::fmt::Display) -> CohortError {
    CohortError::Render(e.to_string())
}
