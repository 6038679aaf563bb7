use thiserror::Error;

use crate::optimize::OptimizeError;

/// Failures surfaced by copula operations.
///
/// Numerical failures are recoverable at the call site that produced them:
/// the sampler retries, `fit` folds them into its status message.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CopulaError {
  #[error("unknown copula family '{0}' (expected Clayton, Frank, Gumbel, Joe or AMH)")]
  UnknownFamily(String),
  #[error("probability {0} is outside (0, 1)")]
  ProbabilityOutOfRange(f64),
  #[error("confidence level {0} is outside (0, 1)")]
  InvalidLevel(f64),
  #[error("radial cdf stays below {p} up to x = {x}")]
  BracketExhausted { p: f64, x: f64 },
  #[error("radial quantile failed {attempts} times in a row, last error: {last}")]
  SamplingFailed {
    attempts: usize,
    #[source]
    last: Box<CopulaError>,
  },
  #[error("statistics error: {0}")]
  Statistics(String),
  #[error(transparent)]
  Optimize(#[from] OptimizeError),
}
