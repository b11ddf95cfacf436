//! LOESS regression figure: scatter of daily counts over a day-offset
//! axis, with the smoothed mean and a 95% confidence ribbon.

use std::path::Path;

use plotters::prelude::*;

use crate::error::{CohortError, Result};
use crate::figures::loess::{loess, LoessPoint};
use crate::figures::tables::RegressionPoint;

/// Layout of one regression figure
#[derive(Debug, Clone)]
pub struct RegressionSpec {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Output width in pixels
    pub width: u32,
    /// Output height in pixels
    pub height: u32,
    /// LOESS span
    pub frac: f64,
}

impl RegressionSpec {
    #[must_use]
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_label: "Days from outage start".to_string(),
            y_label: "Respiratory infection count".to_string(),
            width: 1200,
            height: 900,
            frac: 0.6,
        }
    }
}

/// Render the smoothed scatter to a bitmap file
///
/// # Errors
/// Returns a `Render` error if too few observations are given or drawing
/// fails
pub fn render_loess_scatter(
    points: &[RegressionPoint],
    spec: &RegressionSpec,
    out: &Path,
) -> Result<()> {
    let observations: Vec<(f64, f64)> = points.iter().map(|p| (p.day, p.count)).collect();
    let smoothed = loess(&observations, spec.frac)?;

    let (x_min, x_max) = axis_range(observations.iter().map(|&(x, _)| x));
    let (y_min, y_max) = axis_range(
        observations
            .iter()
            .map(|&(_, y)| y)
            .chain(smoothed.iter().map(LoessPoint::lower))
            .chain(smoothed.iter().map(LoessPoint::upper)),
    );

    let root = BitMapBackend::new(out, (spec.width, spec.height)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(&spec.title, ("sans-serif", 28))
        .margin(10)
        .x_label_area_size(50)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, y_min..y_max)
        .map_err(render_err)?;

    chart
        .configure_mesh()
        .x_desc(&spec.x_label)
        .y_desc(&spec.y_label)
        .draw()
        .map_err(render_err)?;

    // Ribbon: upper edge out, lower edge back
    let ribbon: Vec<(f64, f64)> = smoothed
        .iter()
        .map(|p| (p.x, p.upper()))
        .chain(smoothed.iter().rev().map(|p| (p.x, p.lower())))
        .collect();
    chart
        .draw_series(std::iter::once(Polygon::new(ribbon, BLUE.mix(0.15))))
        .map_err(render_err)?;

    chart
        .draw_series(LineSeries::new(
            smoothed.iter().map(|p| (p.x, p.fitted)),
            BLUE.stroke_width(2),
        ))
        .map_err(render_err)?;

    chart
        .draw_series(
            observations
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BLACK.filled())),
        )
        .map_err(render_err)?;

    root.present().map_err(render_err)?;
    log::info!("Wrote regression figure to {}", out.display());
    Ok(())
}

fn axis_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() {
        return (0.0, 1.0);
    }
    let pad = (max - min).max(1.0) * 0.05;
    (min - pad, max + pad)
}

fn render_err(e: impl std::fmt::Display) -> CohortError {
    CohortError::Render(e.to_string())
}
