//! Locally weighted scatterplot smoothing.
//!
//! A tricube-weighted local linear smoother with pointwise standard
//! errors of the fitted mean, evaluated at the observed x positions. The
//! 95% confidence ribbon drawn around the fit is ±1.96 standard errors.

use crate::error::{CohortError, Result};

/// Multiplier for a 95% confidence ribbon
pub const CI_95: f64 = 1.96;

/// One smoothed point
#[derive(Debug, Clone, PartialEq)]
pub struct LoessPoint {
    pub x: f64,
    /// Fitted mean at `x`
    pub fitted: f64,
    /// Standard error of the fitted mean
    pub std_err: f64,
}

impl LoessPoint {
    /// Lower edge of the 95% ribbon
    #[must_use]
    pub fn lower(&self) -> f64 {
        self.fitted - CI_95 * self.std_err
    }

    /// Upper edge of the 95% ribbon
    #[must_use]
    pub fn upper(&self) -> f64 {
        self.fitted + CI_95 * self.std_err
    }
}

/// Smooth `(x, y)` observations with span `frac`
///
/// Returns one fitted point per observation, ordered by x. `frac` is the
/// fraction of observations contributing to each local fit.
///
/// # Errors
/// Returns an error if fewer than three observations are given or the
/// span is outside `(0, 1]`
pub fn loess(points: &[(f64, f64)], frac: f64) -> Result<Vec<LoessPoint>> {
    if points.len() < 3 {
        return Err(CohortError::Render(format!(
            "LOESS smoothing needs at least 3 observations, got {}",
            points.len()
        )));
    }
    if !(0.0..=1.0).contains(&frac) || frac == 0.0 {
        return Err(CohortError::Render(format!(
            "LOESS span must be in (0, 1], got {frac}"
        )));
    }

    let mut sorted: Vec<(f64, f64)> = points.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    let n = sorted.len();
    let window = ((frac * n as f64).ceil() as usize).clamp(2, n);

    // First pass: fitted value and the squared norm of the equivalent
    // kernel at every observation
    let mut fitted = Vec::with_capacity(n);
    let mut kernel_norms = Vec::with_capacity(n);
    for &(x0, _) in &sorted {
        let (fit, norm) = local_fit(&sorted, x0, window);
        fitted.push(fit);
        kernel_norms.push(norm);
    }

    // Residual variance from the smoothed fit
    let rss: f64 = sorted
        .iter()
        .zip(&fitted)
        .map(|(&(_, y), &fit)| (y - fit) * (y - fit))
        .sum();
    let sigma2 = rss / (n - 2) as f64;

    Ok(sorted
        .iter()
        .zip(fitted.iter().zip(&kernel_norms))
        .map(|(&(x, _), (&fit, &norm))| LoessPoint {
            x,
            fitted: fit,
            std_err: (sigma2 * norm).sqrt(),
        })
        .collect())
}

/// Weighted local linear fit at `x0`
///
/// Returns the fitted value and Σ lᵢ² for the equivalent kernel l, which
/// scales the residual variance into the variance of the fitted mean.
fn local_fit(sorted: &[(f64, f64)], x0: f64, window: usize) -> (f64, f64) {
    // Bandwidth: distance to the window-th nearest neighbor
    let distances: Vec<f64> = sorted.iter().map(|&(x, _)| (x - x0).abs()).collect();
    let mut ordered = distances.clone();
    ordered.sort_by(f64::total_cmp);
    let bandwidth = ordered[window - 1];

    let weights: Vec<f64> = if bandwidth > 0.0 {
        distances.iter().map(|&d| tricube(d / bandwidth)).collect()
    } else {
        // All in-window points share x0; weight them equally
        distances
            .iter()
            .map(|&d| if d == 0.0 { 1.0 } else { 0.0 })
            .collect()
    };

    let s0: f64 = weights.iter().sum();
    let s1: f64 = weights.iter().zip(sorted).map(|(w, &(x, _))| w * x).sum();
    let s2: f64 = weights
        .iter()
        .zip(sorted)
        .map(|(w, &(x, _))| w * x * x)
        .sum();
    let det = s0 * s2 - s1 * s1;

    let mut fit = 0.0;
    let mut norm = 0.0;
    if det.abs() > f64::EPSILON * s2.max(1.0) {
        // Equivalent kernel of the local line evaluated at x0
        for (w, &(x, y)) in weights.iter().zip(sorted) {
            let l = w * ((s2 - x0 * s1) + x * (x0 * s0 - s1)) / det;
            fit += l * y;
            norm += l * l;
        }
    } else {
        // Degenerate window (constant x): weighted mean
        for (w, &(_, y)) in weights.iter().zip(sorted) {
            let l = w / s0;
            fit += l * y;
            norm += l * l;
        }
    }

    (fit, norm)
}

fn tricube(u: f64) -> f64 {
    if u >= 1.0 {
        return 0.0;
    }
    let t = 1.0 - u * u * u;
    t * t * t
}
