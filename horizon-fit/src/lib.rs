//! Two-segment piecewise-linear release policy fitted to availability samples.
//!
//! `release = intercept + slope1 * min(a, bp) + slope2 * max(0, a - bp)`,
//! with all four parameters fitted jointly by Nelder-Mead least squares.

mod optimizer;
pub mod piecewise;

pub use piecewise::{
    fit_piecewise, fit_piecewise_with, piecewise_linear, FitOptions, PiecewisePolicyFit,
    ResidualSummary, MIN_FIT_SAMPLES,
};
