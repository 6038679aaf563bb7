//! # Gumbel
//!
//! $$
//! \psi_\theta(t)=\exp\left(-t^{1/\theta}\right),\qquad
//! \psi_\theta^{(d)}(t)=(-1)^d\,\psi_\theta(t)\,\frac{P_{d,\alpha}(t^{\alpha})}{t^d}
//! $$
//!
use super::alternating_sign;
use super::on_lower_boundary;
use super::Family;
use super::GeneratorExt;
use super::ThetaDomain;
use crate::special::gumbel_polynomial;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Gumbel;

impl GeneratorExt for Gumbel {
  fn family(&self) -> Family {
    Family::Gumbel
  }

  fn domain(&self) -> ThetaDomain {
    ThetaDomain::closed_open(1.0, f64::INFINITY)
  }

  fn default_theta(&self) -> f64 {
    2.0
  }

  fn psi(&self, t: f64, theta: f64) -> f64 {
    (-t.powf(1.0 / theta)).exp()
  }

  fn psi_inv(&self, u: f64, theta: f64) -> f64 {
    (-u.ln()).powf(theta)
  }

  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64 {
    if d == 0 {
      return self.psi(t, theta);
    }

    let alpha = 1.0 / theta;
    alternating_sign(d) * self.psi(t, theta) * gumbel_polynomial(t.powf(alpha), d, alpha)
      / t.powi(d as i32)
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return 0.0;
    }

    let dim = u.len();
    let alpha = 1.0 / theta;
    let t = self.t(u, theta);
    let t_alpha = t.powf(alpha);

    let p1 = (theta / t).powi(dim as i32) * (-t_alpha).exp();
    let p2: f64 = u
      .iter()
      .map(|&x| (-x.ln()).powf(theta - 1.0) / x)
      .product();

    p1 * p2 * gumbel_polynomial(t_alpha, dim, alpha)
  }

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return f64::NEG_INFINITY;
    }

    let dim = u.len();
    let alpha = 1.0 / theta;
    let t = self.t(u, theta);
    let t_alpha = t.powf(alpha);

    let s1 = dim as f64 * (theta / t).ln();
    let s3: f64 = u
      .iter()
      .map(|&x| {
        let lx = x.ln();
        (theta - 1.0) * (-lx).ln() - lx
      })
      .sum();
    let s4 = gumbel_polynomial(t_alpha, dim, alpha).ln();

    s1 - t_alpha + s3 + s4
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn reference_values() {
    assert_abs_diff_eq!(Gumbel.pdf(&[0.5, 0.5], 2.0), 1.516, epsilon = 1e-3);
    assert_abs_diff_eq!(Gumbel.cdf(&[0.25, 0.75], 2.5), 0.2473, epsilon = 1e-4);
    assert_abs_diff_eq!(Gumbel.log_pdf(&[0.35, 0.85], 5.4), -6.399161, epsilon = 1e-5);
  }

  #[test]
  fn theta_one_is_independence() {
    let u = [0.3, 0.8, 0.55];
    assert_abs_diff_eq!(Gumbel.cdf(&u, 1.0), 0.3 * 0.8 * 0.55, epsilon = 1e-12);
    assert_abs_diff_eq!(Gumbel.pdf(&u, 1.0), 1.0, epsilon = 1e-10);
  }
}
