//! # Archimedean copula
//!
//! $$
//! \ell(\theta)=\sum_{n=1}^N \log c_\theta\left(u^{(n)}\right)
//! $$
//!
//! A generator family paired with a parameter value. Evaluation delegates to
//! the closed forms in [`crate::generator`]; estimation lives in [`fit`] and
//! simulation in [`radial`].
use ndarray::Array2;
use tracing::debug;

use crate::generator::Family;
use crate::generator::Generator;
use crate::generator::GeneratorExt;

pub mod fit;
pub mod radial;

pub use fit::ConfidenceBounds;
pub use fit::FitConfig;
pub use fit::FitMethod;
pub use fit::FitResult;
pub use radial::RadialSearch;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchimedeanCopula {
  generator: Generator,
  theta: f64,
}

impl ArchimedeanCopula {
  /// Builds a copula of `family`. A `theta` outside the family domain (or not
  /// finite) is replaced by the family's default.
  pub fn new(family: Family, theta: f64) -> Self {
    let generator = Generator::from(family);
    Self {
      generator,
      theta: Self::admissible(&generator, theta),
    }
  }

  /// Case-insensitive lookup by family name; `None` for unknown names.
  pub fn from_name(name: &str, theta: f64) -> Option<Self> {
    name.parse::<Family>().ok().map(|family| Self::new(family, theta))
  }

  fn admissible(generator: &Generator, theta: f64) -> f64 {
    if theta.is_finite() && generator.domain().contains(theta) {
      theta
    } else {
      generator.default_theta()
    }
  }

  pub fn family(&self) -> Family {
    self.generator.family()
  }

  pub fn generator(&self) -> &Generator {
    &self.generator
  }

  pub fn theta(&self) -> f64 {
    self.theta
  }

  /// Same clamping rule as [`ArchimedeanCopula::new`].
  pub fn set_theta(&mut self, theta: f64) {
    self.theta = Self::admissible(&self.generator, theta);
  }

  pub fn cdf(&self, u: &[f64]) -> f64 {
    self.generator.cdf(u, self.theta)
  }

  pub fn pdf(&self, u: &[f64]) -> f64 {
    self.generator.pdf(u, self.theta)
  }

  pub fn log_pdf(&self, u: &[f64]) -> f64 {
    self.generator.log_pdf(u, self.theta)
  }

  /// Log-likelihood of the rows of `data` at the current parameter.
  pub fn log_likelihood(&self, data: &Array2<f64>) -> f64 {
    log_likelihood(&self.generator, data, self.theta)
  }
}

/// Sum of row log densities. Rows whose log density is NaN are left out.
pub(crate) fn log_likelihood(generator: &Generator, data: &Array2<f64>, theta: f64) -> f64 {
  let mut buf = Vec::with_capacity(data.ncols());
  let mut skipped = 0usize;
  let mut total = 0.0;

  for row in data.rows() {
    let value = match row.as_slice() {
      Some(u) => generator.log_pdf(u, theta),
      None => {
        buf.clear();
        buf.extend(row.iter().copied());
        generator.log_pdf(&buf, theta)
      }
    };

    if value.is_nan() {
      skipped += 1;
    } else {
      total += value;
    }
  }

  if skipped > 0 {
    debug!(skipped, theta, "skipped rows with undefined log density");
  }

  total
}
