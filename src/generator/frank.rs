//! # Frank
//!
//! $$
//! \psi_\theta(t)=-\frac1\theta\ln\left(1-(1-e^{-\theta})e^{-t}\right),\qquad
//! \psi_\theta^{(d)}(t)=\frac{(-1)^d}{\theta}\mathrm{Li}_{-(d-1)}\left((1-e^{-\theta})e^{-t}\right)
//! $$
//!
use super::alternating_sign;
use super::on_lower_boundary;
use super::Family;
use super::GeneratorExt;
use super::ThetaDomain;
use crate::special::negative_integer_polylog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Frank;

impl Frank {
  /// `1 - exp(-theta)`
  fn r(theta: f64) -> f64 {
    -(-theta).exp_m1()
  }

  /// Polylog argument `h` of the density and the log of the factors
  /// `1 - exp(-theta u_j)` it is built from.
  fn h(u: &[f64], theta: f64, r: f64) -> (f64, f64) {
    let dim = u.len() as f64;
    let log_w: f64 = u.iter().map(|&x| (-(-theta * x).exp_m1()).ln()).sum();
    ((log_w + (1.0 - dim) * r.ln()).exp(), log_w)
  }
}

impl GeneratorExt for Frank {
  fn family(&self) -> Family {
    Family::Frank
  }

  fn domain(&self) -> ThetaDomain {
    ThetaDomain::open(0.0, f64::INFINITY)
  }

  fn default_theta(&self) -> f64 {
    1.0
  }

  fn psi(&self, t: f64, theta: f64) -> f64 {
    -(-Self::r(theta) * (-t).exp()).ln_1p() / theta
  }

  fn psi_inv(&self, u: f64, theta: f64) -> f64 {
    -((-theta * u).exp_m1() / (-theta).exp_m1()).ln()
  }

  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64 {
    if d == 0 {
      return self.psi(t, theta);
    }

    alternating_sign(d) / theta * negative_integer_polylog(Self::r(theta) * (-t).exp(), d - 1)
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return 0.0;
    }

    let dim = u.len() as f64;
    let r = Self::r(theta);
    let (h, _) = Self::h(u, theta, r);
    let sum: f64 = u.iter().sum();

    (theta / r).powf(dim - 1.0) * negative_integer_polylog(h, u.len() - 1) * (-theta * sum).exp() / h
  }

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return f64::NEG_INFINITY;
    }

    let dim = u.len() as f64;
    let r = Self::r(theta);
    let (h, log_w) = Self::h(u, theta, r);
    let sum: f64 = u.iter().sum();

    let s1 = (dim - 1.0) * (theta / r).ln();
    let s2 = negative_integer_polylog(h, u.len() - 1).ln();
    let s3 = theta * sum;
    let s4 = (1.0 - dim) * r.ln() + log_w;

    s1 + s2 - s3 - s4
  }
}
