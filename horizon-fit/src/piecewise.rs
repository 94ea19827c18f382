use horizon_core::error::{HorizonError, Result};
use horizon_core::weekly::AvailabilitySample;
use horizon_utils::stats::{linear_regression, median, total_sum_of_squares};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::optimizer::{minimize, PiecewiseCost};

/// Breakpoint, slope below it, slope above it, intercept.
pub(crate) const N_PARAMS: usize = 4;

/// Smallest sample count that can pin down four parameters.
pub const MIN_FIT_SAMPLES: usize = 4;

/// Evaluate `intercept + slope1 * min(a, bp) + slope2 * max(0, a - bp)`.
pub fn piecewise_linear(a: f64, breakpoint: f64, slope1: f64, slope2: f64, intercept: f64) -> f64 {
    intercept + slope1 * a.min(breakpoint) + slope2 * (a - breakpoint).max(0.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Nelder-Mead iterations allowed per restart
    pub max_iters: u64,
    /// Simplex spread and restart improvement below which the fit is settled,
    /// on the cost normalized by the total sum of squares
    pub tolerance: f64,
    pub max_restarts: usize,
}

impl Default for FitOptions {
    fn default() -> Self {
        FitOptions {
            max_iters: 5000,
            tolerance: 1e-10,
            max_restarts: 10,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResidualSummary {
    pub n: usize,
    pub sse: f64,
    pub rmse: f64,
    /// 1 - sse / sst; 1.0 when the releases are all equal and fit exactly
    pub r_squared: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PiecewisePolicyFit {
    pub breakpoint_x: f64,
    pub slope1: f64,
    pub slope2: f64,
    pub intercept: f64,
    /// Always `true`: a fit that does not converge is returned as
    /// `HorizonError::FitDidNotConverge` instead.
    pub is_converged: bool,
    pub residual_summary: ResidualSummary,
    /// Nelder-Mead iterations summed over restarts
    pub iterations: u64,
}

impl PiecewisePolicyFit {
    /// Release predicted for availability `a`.
    pub fn predict(&self, a: f64) -> f64 {
        piecewise_linear(a, self.breakpoint_x, self.slope1, self.slope2, self.intercept)
    }
}

/// Fit the two-segment policy with default [`FitOptions`].
pub fn fit_piecewise(samples: &[AvailabilitySample]) -> Result<PiecewisePolicyFit> {
    fit_piecewise_with(samples, &FitOptions::default())
}

pub fn fit_piecewise_with(
    samples: &[AvailabilitySample],
    options: &FitOptions,
) -> Result<PiecewisePolicyFit> {
    if samples.len() < MIN_FIT_SAMPLES {
        return Err(HorizonError::InsufficientSamples {
            needed: MIN_FIT_SAMPLES,
            found: samples.len(),
        });
    }
    if let Some(bad) = samples
        .iter()
        .find(|s| !s.availability.is_finite() || !s.release.is_finite())
    {
        return Err(HorizonError::NonFiniteSample { year: bad.year });
    }

    let x: Vec<f64> = samples.iter().map(|s| s.availability).collect();
    let y: Vec<f64> = samples.iter().map(|s| s.release).collect();
    let sst = total_sum_of_squares(&y);
    let cost = PiecewiseCost {
        x: &x,
        y: &y,
        scale: if sst > 0.0 { sst } else { 1.0 },
    };

    let start = initial_guess(&x, &y);
    let steps = initial_steps(&x, &y, &start);
    debug!("Initial policy guess {:?}, simplex steps {:?}", start, steps);

    let minimum = minimize(cost, start, steps, options)?;
    let [breakpoint_x, slope1, slope2, intercept] = [
        minimum.params[0],
        minimum.params[1],
        minimum.params[2],
        minimum.params[3],
    ];
    let sse = cost.sse(&minimum.params);
    let n = samples.len();
    let r_squared = if sst > 0.0 {
        1.0 - sse / sst
    } else if sse == 0.0 {
        1.0
    } else {
        0.0
    };
    let fit = PiecewisePolicyFit {
        breakpoint_x,
        slope1,
        slope2,
        intercept,
        is_converged: true,
        residual_summary: ResidualSummary {
            n,
            sse,
            rmse: (sse / n as f64).sqrt(),
            r_squared,
        },
        iterations: minimum.iterations,
    };
    info!(
        "Fit policy on {} samples: breakpoint {:.3}, slopes {:.4}/{:.4}, R^2 {:.3}",
        n, fit.breakpoint_x, fit.slope1, fit.slope2, r_squared
    );
    Ok(fit)
}

/// Breakpoint at the median availability, each slope from a regression on
/// its side of the median, intercept chosen so the lower line passes through
/// its own regression.
fn initial_guess(x: &[f64], y: &[f64]) -> [f64; N_PARAMS] {
    let breakpoint = median(x).unwrap_or(0.0);
    let overall = linear_regression(x, y);
    let (lower_x, lower_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, _)| **a <= breakpoint)
        .map(|(a, r)| (*a, *r))
        .unzip();
    let (upper_x, upper_y): (Vec<f64>, Vec<f64>) = x
        .iter()
        .zip(y)
        .filter(|(a, _)| **a > breakpoint)
        .map(|(a, r)| (*a, *r))
        .unzip();

    let lower = linear_regression(&lower_x, &lower_y).or(overall);
    let upper = linear_regression(&upper_x, &upper_y).or(overall);
    let y_mean = y.iter().sum::<f64>() / y.len() as f64;
    let (intercept, slope1) = lower.unwrap_or((y_mean, 0.0));
    let slope2 = upper.map_or(slope1, |(_, slope)| slope);
    [breakpoint, slope1, slope2, intercept]
}

fn initial_steps(x: &[f64], y: &[f64], start: &[f64; N_PARAMS]) -> [f64; N_PARAMS] {
    let range = |values: &[f64]| {
        let lo = values.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        hi - lo
    };
    let x_range = range(x);
    let y_range = range(y);
    let typical_slope = if x_range > 0.0 { y_range / x_range } else { 1.0 };
    let slope_step = |slope: f64| 0.1 * slope.abs().max(typical_slope).max(1e-3);
    [
        if x_range > 0.0 { 0.1 * x_range } else { 1.0 },
        slope_step(start[1]),
        slope_step(start[2]),
        0.1 * start[3].abs().max(0.1 * y_range).max(1e-3),
    ]
}
