//! Single-exponential decay fit, `y = a * exp(-b * x)`.
//!
//! Nonlinear least squares by Levenberg-Marquardt, started from a
//! log-linear regression of the positive samples. Trial steps whose
//! model overflows are rejected like any other step that does not reduce
//! the cost.
#![allow(clippy::cast_precision_loss, clippy::many_single_char_names)]

use std::f64::consts::LN_2;

use crate::error::FitError;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Parameters of a fitted exponential decay.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ExponentialFit {
    /// Amplitude.
    pub a: f64,
    /// Decay constant.
    pub b: f64,
    /// Sum of squared residuals at the solution.
    pub cost: f64,
    /// Iterations used.
    pub iterations: usize,
}

impl ExponentialFit {
    /// Model value at `x`.
    #[must_use]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.a * (-self.b * x).exp()
    }

    /// Half-life `ln(2) / b`, in the unit of x.
    #[must_use]
    pub fn half_life(&self) -> f64 {
        LN_2 / self.b
    }

    /// Samples the model at `n` evenly spaced points on `[start, end]`.
    #[must_use]
    pub fn curve(&self, start: f64, end: f64, n: usize) -> Vec<(f64, f64)> {
        match n {
            0 => Vec::new(),
            1 => vec![(start, self.evaluate(start))],
            _ => {
                let step = (end - start) / (n - 1) as f64;
                (0..n)
                    .map(|i| {
                        let x = start + step * i as f64;
                        (x, self.evaluate(x))
                    })
                    .collect()
            }
        }
    }
}

/// Fit settings.
#[derive(Debug, Clone)]
pub struct FitConfig {
    /// Iteration budget.
    pub max_iterations: usize,
    /// Relative parameter change below which the fit has converged.
    pub x_tolerance: f64,
    /// Relative cost change below which the fit has converged.
    pub f_tolerance: f64,
    /// Initial damping.
    pub initial_lambda: f64,
}

impl Default for FitConfig {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            x_tolerance: 1e-10,
            f_tolerance: 1e-12,
            initial_lambda: 1e-3,
        }
    }
}

impl FitConfig {
    /// Set iteration budget.
    #[must_use]
    pub fn with_max_iterations(mut self, iterations: usize) -> Self {
        self.max_iterations = iterations;
        self
    }

    /// Set parameter tolerance.
    #[must_use]
    pub fn with_x_tolerance(mut self, tolerance: f64) -> Self {
        self.x_tolerance = tolerance;
        self
    }
}

// Above this damping no step can reduce the cost: the estimate is a
// stationary point.
const MAX_LAMBDA: f64 = 1e16;

fn cost(x: &[f64], y: &[f64], a: f64, b: f64) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&xi, &yi)| {
            let r = yi - a * (-b * xi).exp();
            r * r
        })
        .sum()
}

/// Starting point from `ln y = ln a - b x` over positive samples,
/// `(1, 1)` when that regression is not possible.
fn initial_estimate(x: &[f64], y: &[f64]) -> (f64, f64) {
    let points: Vec<(f64, f64)> = x
        .iter()
        .zip(y)
        .filter(|(_, &yi)| yi > 0.0)
        .map(|(&xi, &yi)| (xi, yi.ln()))
        .collect();
    if points.len() < 2 {
        return (1.0, 1.0);
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points
        .iter()
        .map(|p| (p.0 - mean_x) * (p.1 - mean_y))
        .sum();
    if sxx == 0.0 {
        return (1.0, 1.0);
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;
    let (a, b) = (intercept.exp(), -slope);
    if a.is_finite() && b.is_finite() {
        (a, b)
    } else {
        (1.0, 1.0)
    }
}

/// Fits `y = a * exp(-b * x)` with default settings.
///
/// # Errors
/// See [`fit_exponential_with`].
pub fn fit_exponential(x: &[f64], y: &[f64]) -> Result<ExponentialFit, FitError> {
    fit_exponential_with(x, y, &FitConfig::default())
}

/// Fits `y = a * exp(-b * x)` by Levenberg-Marquardt.
///
/// # Errors
/// Returns an error if fewer than two points are given, the inputs
/// differ in length, the starting cost is not finite, or the iteration
/// budget runs out.
pub fn fit_exponential_with(
    x: &[f64],
    y: &[f64],
    config: &FitConfig,
) -> Result<ExponentialFit, FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(FitError::InsufficientData {
            required: 2,
            provided: x.len(),
        });
    }

    let (mut a, mut b) = initial_estimate(x, y);
    let mut current = cost(x, y, a, b);
    if !current.is_finite() {
        (a, b) = (1.0, 1.0);
        current = cost(x, y, a, b);
        if !current.is_finite() {
            return Err(FitError::NonFinite);
        }
    }
    let mut lambda = config.initial_lambda;

    for iteration in 1..=config.max_iterations {
        // Normal equations J^T J delta = J^T r
        let (mut jaa, mut jab, mut jbb) = (0.0, 0.0, 0.0);
        let (mut ga, mut gb) = (0.0, 0.0);
        for (&xi, &yi) in x.iter().zip(y) {
            let e = (-b * xi).exp();
            let da = e;
            let db = -a * xi * e;
            let r = yi - a * e;
            jaa += da * da;
            jab += da * db;
            jbb += db * db;
            ga += da * r;
            gb += db * r;
        }

        loop {
            let daa = jaa + lambda * jaa.max(1e-300);
            let dbb = jbb + lambda * jbb.max(1e-300);
            let det = daa * dbb - jab * jab;
            let step = if det.is_finite() && det != 0.0 {
                Some(((dbb * ga - jab * gb) / det, (daa * gb - jab * ga) / det))
            } else {
                None
            };

            if let Some((step_a, step_b)) = step {
                let (trial_a, trial_b) = (a + step_a, b + step_b);
                let trial = cost(x, y, trial_a, trial_b);
                if trial.is_finite() && trial <= current {
                    let reduction = current - trial;
                    (a, b) = (trial_a, trial_b);
                    current = trial;
                    lambda = (lambda / 10.0).max(1e-12);

                    let small_step = step_a.abs() <= config.x_tolerance * (a.abs() + 1e-300)
                        && step_b.abs() <= config.x_tolerance * (b.abs() + 1e-300);
                    let small_reduction = reduction <= config.f_tolerance * current;
                    if small_step || small_reduction || current == 0.0 {
                        log::debug!("exponential fit converged in {iteration} iterations");
                        return Ok(ExponentialFit {
                            a,
                            b,
                            cost: current,
                            iterations: iteration,
                        });
                    }
                    break;
                }
            }

            lambda *= 10.0;
            if lambda > MAX_LAMBDA {
                log::debug!("exponential fit stationary after {iteration} iterations");
                return Ok(ExponentialFit {
                    a,
                    b,
                    cost: current,
                    iterations: iteration,
                });
            }
        }
    }

    Err(FitError::NoConvergence {
        iterations: config.max_iterations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn samples(a: f64, b: f64, n: usize, dx: f64) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| i as f64 * dx).collect();
        let y = x.iter().map(|&xi| a * (-b * xi).exp()).collect();
        (x, y)
    }

    #[test]
    fn test_recovers_noiseless_parameters() {
        let (x, y) = samples(2.5, 0.3, 40, 0.25);
        let fit = fit_exponential(&x, &y).unwrap();
        assert_relative_eq!(fit.a, 2.5, max_relative = 1e-8);
        assert_relative_eq!(fit.b, 0.3, max_relative = 1e-8);
        assert_relative_eq!(fit.half_life(), LN_2 / 0.3, max_relative = 1e-8);
    }

    #[test]
    fn test_recovers_slow_decay_density_scale() {
        // Oxygen-15 like decay: half-life 122.24 s, density normalised
        let b = LN_2 / 122.24;
        let (x, y) = samples(b, b, 60, 5.0);
        let fit = fit_exponential(&x, &y).unwrap();
        assert_relative_eq!(fit.half_life(), 122.24, max_relative = 1e-6);
    }

    #[test]
    fn test_refines_noisy_data() {
        let (x, mut y) = samples(10.0, 0.5, 30, 0.2);
        for (i, value) in y.iter_mut().enumerate() {
            *value *= if i % 2 == 0 { 1.01 } else { 0.99 };
        }
        let fit = fit_exponential(&x, &y).unwrap();
        assert_relative_eq!(fit.b, 0.5, max_relative = 0.05);
        assert!(fit.cost < 0.1);
        // Least squares never ends above its starting point
        let (a0, b0) = initial_estimate(&x, &y);
        assert!(fit.cost <= cost(&x, &y, a0, b0));
    }

    #[test]
    fn test_non_positive_samples_start_from_unit_guess() {
        let x = [0.0, 1.0, 2.0];
        let y = [0.0, 0.0, 0.0];
        assert_eq!(initial_estimate(&x, &y), (1.0, 1.0));
        let fit = fit_exponential(&x, &y).unwrap();
        assert!(fit.evaluate(0.0).abs() < 1e-3);
    }

    #[test]
    fn test_insufficient_data() {
        assert_eq!(
            fit_exponential(&[1.0], &[1.0]),
            Err(FitError::InsufficientData {
                required: 2,
                provided: 1
            })
        );
        assert!(matches!(
            fit_exponential(&[1.0, 2.0], &[1.0]),
            Err(FitError::LengthMismatch { x: 2, y: 1 })
        ));
    }

    #[test]
    fn test_curve_sampling() {
        let fit = ExponentialFit {
            a: 1.0,
            b: LN_2,
            cost: 0.0,
            iterations: 0,
        };
        let curve = fit.curve(0.0, 2.0, 3);
        assert_eq!(curve.len(), 3);
        assert_relative_eq!(curve[1].1, 0.5, epsilon = 1e-12);
        assert_relative_eq!(curve[2].1, 0.25, epsilon = 1e-12);
        assert!(fit.curve(0.0, 1.0, 0).is_empty());
    }
}
