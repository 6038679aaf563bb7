//! # Joe
//!
//! $$
//! \psi_\theta(t)=1-\left(1-e^{-t}\right)^{1/\theta},\qquad
//! \psi_\theta^{(d)}(t)=(-1)^d\,\alpha\,\frac{e^{-t}}{(1-e^{-t})^{1-\alpha}}\,Q_{d,\alpha}\left(\frac{e^{-t}}{1-e^{-t}}\right)
//! $$
//!
use super::alternating_sign;
use super::on_lower_boundary;
use super::Family;
use super::GeneratorExt;
use super::ThetaDomain;
use crate::special::joe_polynomial;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Joe;

impl Joe {
  /// `(h, 1 - h)` with `h = prod(1 - (1 - u_j)^theta)`; the complement is
  /// taken through `expm1` so it keeps its digits near the upper corner.
  fn h(u: &[f64], theta: f64) -> (f64, f64) {
    let log_h: f64 = u.iter().map(|&x| (-(1.0 - x).powf(theta)).ln_1p()).sum();
    (log_h.exp(), -log_h.exp_m1())
  }
}

/// `ln(1 - e^{-t})` for `t > 0`, through `expm1` for small `t` and `ln_1p` for
/// large `t`.
fn ln_one_minus_exp_neg(t: f64) -> f64 {
  if t > std::f64::consts::LN_2 {
    (-(-t).exp()).ln_1p()
  } else {
    (-(-t).exp_m1()).ln()
  }
}

impl GeneratorExt for Joe {
  fn family(&self) -> Family {
    Family::Joe
  }

  fn domain(&self) -> ThetaDomain {
    ThetaDomain::closed_open(1.0, f64::INFINITY)
  }

  fn default_theta(&self) -> f64 {
    2.0
  }

  fn psi(&self, t: f64, theta: f64) -> f64 {
    -(ln_one_minus_exp_neg(t) / theta).exp_m1()
  }

  fn psi_inv(&self, u: f64, theta: f64) -> f64 {
    -(-(1.0 - u).powf(theta)).ln_1p()
  }

  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64 {
    if d == 0 {
      return self.psi(t, theta);
    }

    let alpha = 1.0 / theta;
    let e = (-t).exp();
    let one_minus_e = -(-t).exp_m1();

    alternating_sign(d) * alpha * e * joe_polynomial(e / one_minus_e, d, alpha)
      / one_minus_e.powf(1.0 - alpha)
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return 0.0;
    }

    let dim = u.len();
    let alpha = 1.0 / theta;
    let (h, one_minus_h) = Self::h(u, theta);
    let num: f64 = u.iter().map(|&x| (1.0 - x).powf(theta - 1.0)).product();

    theta.powi(dim as i32 - 1) * num * joe_polynomial(h / one_minus_h, dim, alpha)
      / one_minus_h.powf(1.0 - alpha)
  }

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return f64::NEG_INFINITY;
    }

    let dim = u.len();
    let alpha = 1.0 / theta;
    let (h, one_minus_h) = Self::h(u, theta);

    let s1 = (dim as f64 - 1.0) * theta.ln();
    let s2 = (theta - 1.0) * u.iter().map(|&x| (1.0 - x).ln()).sum::<f64>();
    let s3 = (1.0 - alpha) * one_minus_h.ln();
    let s4 = joe_polynomial(h / one_minus_h, dim, alpha).ln();

    s1 + s2 - s3 + s4
  }
}
