//! # Maximum likelihood
//!
//! $$
//! \hat\theta=\arg\max_{\theta}\ \ell(\theta),\qquad
//! \left\{\theta:\ 2\left(\ell(\hat\theta)-\ell(\theta)\right)\le\chi^2_{1,\,1-\alpha}\right\}
//! $$
//!
//! Bounded Brent search over the family domain, with a quasi-Newton rerun when
//! the estimate lands on a search edge, followed by profile-likelihood
//! confidence bounds.
use std::cell::Cell;
use std::fmt;

use ndarray::Array2;
use statrs::distribution::ChiSquared;
use statrs::distribution::ContinuousCDF;
use tracing::info;
use tracing::warn;

use super::log_likelihood;
use super::ArchimedeanCopula;
use crate::error::CopulaError;
use crate::generator::GeneratorExt;
use crate::optimize::bfgs_minimize;
use crate::optimize::bisection;
use crate::optimize::brent_minimize;
use crate::optimize::Minimum;
use crate::optimize::OptimizeError;

/// Settings for [`ArchimedeanCopula::fit_with`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitConfig {
  /// x-tolerance of the minimizers.
  pub tolerance: f64,
  /// Distance to a search edge below which the BFGS rerun kicks in.
  pub boundary_tolerance: f64,
  /// Upper search limit for families with an unbounded domain.
  pub theta_cap: f64,
  /// Both search edges are moved inside the domain by this much.
  pub edge_margin: f64,
  /// Confidence level of the bounds.
  pub level: f64,
  /// Bisection tolerance of the bounds.
  pub bound_tolerance: f64,
}

impl Default for FitConfig {
  fn default() -> Self {
    Self {
      tolerance: 1e-6,
      boundary_tolerance: 1e-2,
      theta_cap: 10.0,
      edge_margin: 1e-6,
      level: 0.95,
      bound_tolerance: 1e-8,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitMethod {
  Brent,
  BfgsFallback,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FitResult {
  pub theta: f64,
  pub log_likelihood: f64,
  pub lower_bound: f64,
  pub upper_bound: f64,
  pub level: f64,
  /// Objective evaluations over both optimizer runs.
  pub evals: usize,
  pub method: FitMethod,
  /// Whether the optimizer that produced `theta` converged and the bound
  /// search completed.
  pub converged: bool,
  pub message: String,
}

impl FitResult {
  pub fn is_success(&self) -> bool {
    self.converged
  }
}

impl fmt::Display for FitResult {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let level = format!("{:.0}%", self.level * 100.0);
    writeln!(f, "{:>8} {:.6}", "ℓ", self.log_likelihood)?;
    writeln!(f, "{:>8} {:.6}", "𝜃", self.theta)?;
    writeln!(
      f,
      "{:>8} [{:.3}, {:.3}]",
      level, self.lower_bound, self.upper_bound
    )?;
    writeln!(f, "{:>8} {}", "Evals", self.evals)?;
    write!(f, "{:>8} {}", "Message", self.message)
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceBounds {
  pub lower: f64,
  pub upper: f64,
}

impl ArchimedeanCopula {
  /// Maximum likelihood fit with [`FitConfig::default`].
  pub fn fit(&mut self, data: &Array2<f64>) -> FitResult {
    self.fit_with(data, &FitConfig::default())
  }

  /// Estimates theta from the rows of `data` and stores it on `self`.
  ///
  /// Never fails: optimizer errors are reported in [`FitResult::message`] and
  /// the best estimate reached is kept.
  pub fn fit_with(&mut self, data: &Array2<f64>, config: &FitConfig) -> FitResult {
    let generator = *self.generator();
    let domain = generator.domain();
    let (a, b) = domain.search_interval(config.theta_cap, config.edge_margin);
    assert!(a < b, "empty search interval [{a}, {b}]");

    let evals = Cell::new(0usize);
    let objective = |theta: f64| {
      evals.set(evals.get() + 1);
      if domain.contains(theta) {
        -log_likelihood(&generator, data, theta)
      } else {
        f64::INFINITY
      }
    };

    let mut message = String::new();
    let mut method = FitMethod::Brent;
    let mut outcome = brent_minimize(&objective, a, b, config.tolerance);

    if let Some(x) = estimate(&outcome) {
      if (x - a).abs().min((x - b).abs()) < config.boundary_tolerance {
        warn!(
          family = %self.family(),
          theta = x,
          "estimate on the search edge, falling back to BFGS"
        );
        message.push_str("Falling back to BFGS. ");
        method = FitMethod::BfgsFallback;
        outcome = bfgs_minimize(&objective, 0.5 * (a + b), config.tolerance);
      }
    }

    let mut converged = outcome.is_ok();
    match &outcome {
      Ok(_) => message.push_str("Success"),
      Err(err) => message.push_str(&format!("Error: {err}")),
    }

    self.set_theta(estimate(&outcome).unwrap_or(self.theta()).clamp(a, b));
    let theta = self.theta();
    let log_likelihood = self.log_likelihood(data);

    let (lower_bound, upper_bound) = match self.confidence_bounds_with(data, config) {
      Ok(bounds) => (bounds.lower, bounds.upper),
      Err(err) => {
        converged = false;
        message.push_str(&format!("; confidence bounds Error: {err}"));
        (theta, theta)
      }
    };

    info!(
      family = %self.family(),
      theta,
      log_likelihood,
      lower_bound,
      upper_bound,
      evals = evals.get(),
      "fit finished: {message}"
    );

    FitResult {
      theta,
      log_likelihood,
      lower_bound,
      upper_bound,
      level: config.level,
      evals: evals.get(),
      method,
      converged,
      message,
    }
  }

  /// Profile-likelihood bounds around the current theta at `level`, searched
  /// inside the default search interval.
  pub fn confidence_bounds(
    &self,
    data: &Array2<f64>,
    level: f64,
  ) -> Result<ConfidenceBounds, CopulaError> {
    self.confidence_bounds_with(
      data,
      &FitConfig {
        level,
        ..FitConfig::default()
      },
    )
  }

  /// Points where the log-likelihood has dropped by half the chi-squared(1)
  /// quantile from its value at the current theta. A side on which it never
  /// drops that far is bounded by the search edge.
  pub fn confidence_bounds_with(
    &self,
    data: &Array2<f64>,
    config: &FitConfig,
  ) -> Result<ConfidenceBounds, CopulaError> {
    let level = config.level;
    if !(level > 0.0 && level < 1.0) {
      return Err(CopulaError::InvalidLevel(level));
    }

    let chi2 = ChiSquared::new(1.0).map_err(|e| CopulaError::Statistics(e.to_string()))?;
    let q = chi2.inverse_cdf(level);

    let generator = *self.generator();
    let theta = self.theta();
    let (a, b) = generator
      .domain()
      .search_interval(config.theta_cap, config.edge_margin);
    let peak = self.log_likelihood(data);
    let deficit = |t: f64| -log_likelihood(&generator, data, t) + peak - 0.5 * q;

    let upper = bound_or_edge(
      bisection(&deficit, theta, b, config.bound_tolerance),
      b,
      "upper",
    )?;
    let lower = bound_or_edge(
      bisection(&deficit, a, theta, config.bound_tolerance),
      a,
      "lower",
    )?;

    Ok(ConfidenceBounds {
      lower: lower.min(theta),
      upper: upper.max(theta),
    })
  }
}

fn estimate(outcome: &Result<Minimum, OptimizeError>) -> Option<f64> {
  match outcome {
    Ok(min) => Some(min.x),
    Err(err) => err.best().map(|min| min.x),
  }
}

fn bound_or_edge(
  found: Result<f64, OptimizeError>,
  edge: f64,
  side: &str,
) -> Result<f64, CopulaError> {
  match found {
    Ok(x) => Ok(x),
    Err(OptimizeError::NoSignChange { .. } | OptimizeError::InvalidBracket { .. }) => {
      warn!(side, edge, "likelihood stays within the confidence region up to the search edge");
      Ok(edge)
    }
    Err(err) => Err(err.into()),
  }
}
