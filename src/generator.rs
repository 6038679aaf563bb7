//! # Generator
//!
//! $$
//! C_\theta(u)=\psi_\theta\left(\sum_{i=1}^d \psi_\theta^{-1}(u_i)\right),\qquad
//! c_\theta(u)=\psi_\theta^{(d)}\left(\sum_i \psi_\theta^{-1}(u_i)\right)\prod_i \left(\psi_\theta^{-1}\right)'(u_i)
//! $$
//!
use std::fmt;
use std::str::FromStr;

use enum_dispatch::enum_dispatch;

use crate::error::CopulaError;

pub mod amh;
pub mod clayton;
pub mod frank;
pub mod gumbel;
pub mod joe;

pub use amh::Amh;
pub use clayton::Clayton;
pub use frank::Frank;
pub use gumbel::Gumbel;
pub use joe::Joe;

/// Supported one-parameter generator families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
  Clayton,
  Frank,
  Gumbel,
  Joe,
  Amh,
}

impl Family {
  pub const ALL: [Family; 5] = [
    Family::Clayton,
    Family::Frank,
    Family::Gumbel,
    Family::Joe,
    Family::Amh,
  ];

  pub fn name(&self) -> &'static str {
    match self {
      Family::Clayton => "Clayton",
      Family::Frank => "Frank",
      Family::Gumbel => "Gumbel",
      Family::Joe => "Joe",
      Family::Amh => "AMH",
    }
  }

  pub fn generator(self) -> Generator {
    match self {
      Family::Clayton => Clayton.into(),
      Family::Frank => Frank.into(),
      Family::Gumbel => Gumbel.into(),
      Family::Joe => Joe.into(),
      Family::Amh => Amh.into(),
    }
  }
}

impl fmt::Display for Family {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Family {
  type Err = CopulaError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Family::ALL
      .into_iter()
      .find(|family| family.name().eq_ignore_ascii_case(s.trim()))
      .ok_or_else(|| CopulaError::UnknownFamily(s.to_string()))
  }
}

/// Interval of admissible parameters, each end open or closed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThetaDomain {
  pub lower: f64,
  pub upper: f64,
  pub lower_inclusive: bool,
  pub upper_inclusive: bool,
}

impl ThetaDomain {
  /// `(lower, upper)`
  pub const fn open(lower: f64, upper: f64) -> Self {
    Self {
      lower,
      upper,
      lower_inclusive: false,
      upper_inclusive: false,
    }
  }

  /// `[lower, upper)`
  pub const fn closed_open(lower: f64, upper: f64) -> Self {
    Self {
      lower,
      upper,
      lower_inclusive: true,
      upper_inclusive: false,
    }
  }

  pub fn contains(&self, theta: f64) -> bool {
    if theta.is_nan() {
      return false;
    }

    let above = if self.lower_inclusive {
      theta >= self.lower
    } else {
      theta > self.lower
    };
    let below = if self.upper_inclusive {
      theta <= self.upper
    } else {
      theta < self.upper
    };

    above && below
  }

  /// Finite interval the optimizers search: the upper end is capped at `cap`
  /// and both ends are pulled inside by `margin`.
  pub fn search_interval(&self, cap: f64, margin: f64) -> (f64, f64) {
    (self.lower + margin, self.upper.min(cap) - margin)
  }
}

/// `(-1)^d`
pub(crate) fn alternating_sign(d: usize) -> f64 {
  if d % 2 == 1 {
    -1.0
  } else {
    1.0
  }
}

/// Density vanishes on the lower faces of the unit cube.
pub(crate) fn on_lower_boundary(u: &[f64]) -> bool {
  u.iter().any(|&x| x <= 0.0)
}

/// Generator function of an Archimedean family together with its closed-form
/// derivatives, distribution and density.
#[enum_dispatch]
pub trait GeneratorExt {
  fn family(&self) -> Family;

  fn domain(&self) -> ThetaDomain;

  /// In-domain value used when an instance is built with an invalid parameter.
  fn default_theta(&self) -> f64;

  /// Generator $\psi_\theta(t)$, mapping $[0,\infty)$ onto $(0,1]$.
  fn psi(&self, t: f64, theta: f64) -> f64;

  /// Inverse generator $\psi_\theta^{-1}(u)$.
  fn psi_inv(&self, u: f64, theta: f64) -> f64;

  /// `d`-th derivative $\psi_\theta^{(d)}(t)$; `d = 0` is the generator itself.
  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64;

  /// $\sum_i \psi_\theta^{-1}(u_i)$
  fn t(&self, u: &[f64], theta: f64) -> f64 {
    u.iter().map(|&x| self.psi_inv(x, theta)).sum()
  }

  fn cdf(&self, u: &[f64], theta: f64) -> f64 {
    self.psi(self.t(u, theta), theta)
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64;

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64;
}

/// Statically dispatched generator family.
#[enum_dispatch(GeneratorExt)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Generator {
  Clayton,
  Frank,
  Gumbel,
  Joe,
  Amh,
}

impl From<Family> for Generator {
  fn from(family: Family) -> Self {
    family.generator()
  }
}
