//! # Ali-Mikhail-Haq
//!
//! $$
//! \psi_\theta(t)=\frac{1-\theta}{e^t-\theta},\qquad
//! \psi_\theta^{(d)}(t)=(-1)^d\,\frac{1-\theta}{\theta}\,\mathrm{Li}_{-d}\left(\theta e^{-t}\right)
//! $$
//!
use super::alternating_sign;
use super::on_lower_boundary;
use super::Family;
use super::GeneratorExt;
use super::ThetaDomain;
use crate::special::negative_integer_polylog;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Amh;

impl GeneratorExt for Amh {
  fn family(&self) -> Family {
    Family::Amh
  }

  fn domain(&self) -> ThetaDomain {
    ThetaDomain::open(0.0, 1.0)
  }

  fn default_theta(&self) -> f64 {
    0.5
  }

  fn psi(&self, t: f64, theta: f64) -> f64 {
    (1.0 - theta) / (t.exp() - theta)
  }

  fn psi_inv(&self, u: f64, theta: f64) -> f64 {
    (theta + (1.0 - theta) / u).ln()
  }

  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64 {
    if d == 0 {
      return self.psi(t, theta);
    }

    alternating_sign(d) * (1.0 - theta) * negative_integer_polylog(theta * (-t).exp(), d) / theta
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return 0.0;
    }

    let dim = u.len();
    let p1 = (1.0 - theta).powi(dim as i32 + 1) / (theta * theta);

    let mut h = theta;
    let mut p2 = theta;
    for &x in u {
      let w = 1.0 - theta * (1.0 - x);
      h *= x / w;
      p2 /= x * w;
    }

    p1 * p2 * negative_integer_polylog(h, dim)
  }

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return f64::NEG_INFINITY;
    }

    let dim = u.len();
    let s1 = (dim as f64 + 1.0) * (1.0 - theta).ln() - 2.0 * theta.ln();

    let mut h = theta;
    let mut log_w = 0.0;
    for &x in u {
      let w = 1.0 - theta * (1.0 - x);
      h *= x / w;
      log_w += (x * w).ln();
    }
    let s2 = theta.ln() - log_w;
    let s3 = negative_integer_polylog(h, dim).ln();

    s1 + s2 + s3
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn bivariate_cdf_closed_form() {
    let theta = 0.6;
    let (u, v) = (0.25, 0.75);
    let expected = u * v / (1.0 - theta * (1.0 - u) * (1.0 - v));
    assert_abs_diff_eq!(Amh.cdf(&[u, v], theta), expected, epsilon = 1e-12);
  }

  #[test]
  fn bivariate_pdf_closed_form() {
    let theta: f64 = 0.5;
    let (u, v): (f64, f64) = (0.5, 0.5);
    let d = 1.0 - theta * (1.0 - u) * (1.0 - v);
    let expected = (1.0 + theta * ((1.0 + u) * (1.0 + v) - 3.0) + theta * theta * (1.0 - u) * (1.0 - v))
      / d.powi(3);
    assert_abs_diff_eq!(Amh.pdf(&[u, v], theta), expected, epsilon = 1e-12);
    assert_abs_diff_eq!(Amh.pdf(&[u, v], theta), 1.026239, epsilon = 1e-6);
  }
}
