//! # Optimize
//!
//! $$
//! \text{find } x^\ast:\ f(x^\ast)=0 \quad\text{or}\quad x^\ast=\arg\min_{x\in[a,b]} f(x)
//! $$
//!
//! Scalar root finders and minimizers. Every routine takes the objective as a
//! closure, so whatever the objective depends on (observations, a target
//! probability, ...) travels in its captured environment.
use thiserror::Error;

pub mod minimize;
pub mod root;

pub use minimize::bfgs_minimize;
pub use minimize::brent_minimize;
pub use root::bisection;
pub use root::brent_root;
pub use root::secant;

/// Iteration budget shared by all solvers.
pub const MAX_ITER: usize = 500;

/// Best point reached by a solver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Minimum {
  pub x: f64,
  pub fx: f64,
  /// Objective evaluations spent.
  pub evals: usize,
  pub iterations: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum OptimizeError {
  #[error("no sign change on [{lo}, {hi}]: f(lo) = {f_lo}, f(hi) = {f_hi}")]
  NoSignChange {
    lo: f64,
    hi: f64,
    f_lo: f64,
    f_hi: f64,
  },
  #[error("invalid bracket [{lo}, {hi}]")]
  InvalidBracket { lo: f64, hi: f64 },
  #[error("no convergence after {iterations} iterations (best x = {})", .best.x)]
  NoConvergence { iterations: usize, best: Minimum },
  #[error("line search found no decrease from x = {}", .best.x)]
  LineSearchFailed { best: Minimum },
  #[error("secant step stalled at x = {x}")]
  Stalled { x: f64 },
  #[error("objective is not finite at the starting point x = {x}")]
  NonFinite { x: f64 },
}

impl OptimizeError {
  /// Best estimate a failed run still produced, if it got that far.
  pub fn best(&self) -> Option<Minimum> {
    match self {
      OptimizeError::NoConvergence { best, .. } | OptimizeError::LineSearchFailed { best } => {
        Some(*best)
      }
      _ => None,
    }
  }
}

/// Objective wrapper counting evaluations.
pub(crate) struct Counted<F> {
  f: F,
  pub(crate) evals: usize,
}

impl<F: FnMut(f64) -> f64> Counted<F> {
  pub(crate) fn new(f: F) -> Self {
    Self { f, evals: 0 }
  }

  pub(crate) fn call(&mut self, x: f64) -> f64 {
    self.evals += 1;
    (self.f)(x)
  }
}

/// `true` when `a` and `b` lie strictly on opposite sides of zero.
pub(crate) fn opposite_signs(a: f64, b: f64) -> bool {
  !a.is_nan() && !b.is_nan() && ((a < 0.0) != (b < 0.0))
}
