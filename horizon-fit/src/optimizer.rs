//! Nelder-Mead least squares for the piecewise policy.
//!
//! Wraps the `argmin` crate. The simplex is restarted around the best vertex
//! until a restart stops improving the cost.
//!
//! **Not part of the public API.**

use argmin::core::{CostFunction, Executor, TerminationReason, TerminationStatus};
use argmin::solver::neldermead::NelderMead;
use horizon_core::error::{HorizonError, Result};
use log::debug;

use crate::piecewise::{piecewise_linear, FitOptions, N_PARAMS};

/// Sum of squared residuals over `(x, y)`, divided by `scale`.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PiecewiseCost<'a> {
    pub x: &'a [f64],
    pub y: &'a [f64],
    pub scale: f64,
}

impl PiecewiseCost<'_> {
    pub fn sse(&self, params: &[f64]) -> f64 {
        self.x
            .iter()
            .zip(self.y)
            .map(|(&a, &r)| {
                let predicted = piecewise_linear(a, params[0], params[1], params[2], params[3]);
                (r - predicted).powi(2)
            })
            .sum()
    }
}

impl CostFunction for PiecewiseCost<'_> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, argmin::core::Error> {
        let sse = self.sse(params) / self.scale;
        if sse.is_finite() {
            Ok(sse)
        } else {
            Ok(f64::MAX)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Minimum {
    pub params: Vec<f64>,
    /// Scaled cost at `params`
    pub cost: f64,
    pub iterations: u64,
}

/// Starting vertex plus one vertex per parameter, offset by that parameter's step.
fn build_simplex(start: &[f64], steps: &[f64; N_PARAMS]) -> Vec<Vec<f64>> {
    let mut simplex = Vec::with_capacity(N_PARAMS + 1);
    simplex.push(start.to_vec());
    for (i, step) in steps.iter().enumerate() {
        let mut vertex = start.to_vec();
        vertex[i] += step;
        simplex.push(vertex);
    }
    simplex
}

pub(crate) fn minimize(
    cost: PiecewiseCost<'_>,
    start: [f64; N_PARAMS],
    steps: [f64; N_PARAMS],
    options: &FitOptions,
) -> Result<Minimum> {
    let mut best = start.to_vec();
    let mut best_cost = cost.sse(&best) / cost.scale;
    let mut iterations: u64 = 0;

    for restart in 0..=options.max_restarts {
        let not_converged = |iterations: u64, best_cost: f64| HorizonError::FitDidNotConverge {
            iterations,
            best_cost: best_cost * cost.scale,
        };
        let solver = NelderMead::new(build_simplex(&best, &steps))
            .with_sd_tolerance(options.tolerance)
            .map_err(|_| not_converged(iterations, best_cost))?;
        let result = Executor::new(cost, solver)
            .configure(|state| state.max_iters(options.max_iters))
            .run()
            .map_err(|_| not_converged(iterations, best_cost))?;

        let state = result.state();
        iterations += state.iter;
        let converged = matches!(
            state.termination_status,
            TerminationStatus::Terminated(TerminationReason::SolverConverged)
        );
        let candidate_cost = state.best_cost;
        if !converged {
            return Err(not_converged(iterations, best_cost.min(candidate_cost)));
        }

        let improvement = best_cost - candidate_cost;
        if candidate_cost < best_cost {
            if let Some(params) = state.best_param.clone() {
                best = params;
                best_cost = candidate_cost;
            }
        }
        if restart > 0 && improvement <= options.tolerance {
            return Ok(Minimum {
                params: best,
                cost: best_cost,
                iterations,
            });
        }
        debug!(
            "Restarting simplex (restart {}, cost {:.3e}, improvement {:.3e})",
            restart + 1,
            best_cost,
            improvement
        );
    }

    Err(HorizonError::FitDidNotConverge {
        iterations,
        best_cost: best_cost * cost.scale,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_data() -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..40).map(|i| i as f64).collect();
        let y: Vec<f64> = x
            .iter()
            .map(|&a| piecewise_linear(a, 20.0, 1.0, 0.25, 5.0))
            .collect();
        (x, y)
    }

    #[test]
    fn cost_is_zero_at_truth() {
        let (x, y) = line_data();
        let cost = PiecewiseCost {
            x: &x,
            y: &y,
            scale: 1.0,
        };
        assert!(cost.sse(&[20.0, 1.0, 0.25, 5.0]) < 1e-20);
        assert!(cost.sse(&[20.0, 1.0, 0.5, 5.0]) > 1.0);
    }

    #[test]
    fn build_simplex_offsets_one_parameter_per_vertex() {
        let simplex = build_simplex(&[1.0, 2.0, 3.0, 4.0], &[0.5, 0.1, 0.1, 1.0]);
        assert_eq!(simplex.len(), 5);
        assert_eq!(simplex[0], vec![1.0, 2.0, 3.0, 4.0]);
        assert_eq!(simplex[1], vec![1.5, 2.0, 3.0, 4.0]);
        assert_eq!(simplex[4], vec![1.0, 2.0, 3.0, 5.0]);
    }

    #[test]
    fn minimize_recovers_noise_free_parameters() {
        let (x, y) = line_data();
        let cost = PiecewiseCost {
            x: &x,
            y: &y,
            scale: 1.0,
        };
        let minimum = minimize(
            cost,
            [18.0, 0.9, 0.3, 4.0],
            [2.0, 0.1, 0.1, 1.0],
            &FitOptions::default(),
        )
        .unwrap();
        assert!((minimum.params[0] - 20.0).abs() < 0.5, "{:?}", minimum.params);
        assert!((minimum.params[1] - 1.0).abs() < 0.02);
        assert!((minimum.params[2] - 0.25).abs() < 0.02);
        assert!(minimum.cost < 1e-3);
    }

    #[test]
    fn minimize_reports_iteration_cap() {
        let (x, y) = line_data();
        let cost = PiecewiseCost {
            x: &x,
            y: &y,
            scale: 1.0,
        };
        let options = FitOptions {
            max_iters: 2,
            ..FitOptions::default()
        };
        let result = minimize(cost, [5.0, 0.0, 0.0, 0.0], [2.0, 0.1, 0.1, 1.0], &options);
        assert!(matches!(result, Err(HorizonError::FitDidNotConverge { .. })));
    }
}
