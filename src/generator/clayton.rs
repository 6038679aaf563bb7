//! # Clayton
//!
//! $$
//! \psi_\theta(t)=(1+t)^{-1/\theta},\qquad \theta\in(0,\infty)
//! $$
//!
use super::alternating_sign;
use super::on_lower_boundary;
use super::Family;
use super::GeneratorExt;
use super::ThetaDomain;
use crate::special::rising_factorial;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Clayton;

impl GeneratorExt for Clayton {
  fn family(&self) -> Family {
    Family::Clayton
  }

  fn domain(&self) -> ThetaDomain {
    ThetaDomain::open(0.0, f64::INFINITY)
  }

  fn default_theta(&self) -> f64 {
    1.0
  }

  fn psi(&self, t: f64, theta: f64) -> f64 {
    (-t.ln_1p() / theta).exp()
  }

  fn psi_inv(&self, u: f64, theta: f64) -> f64 {
    (-theta * u.ln()).exp_m1()
  }

  fn psi_d(&self, d: usize, t: f64, theta: f64) -> f64 {
    let alpha = 1.0 / theta;
    alternating_sign(d) * (1.0 + t).powf(-alpha - d as f64) * rising_factorial(alpha, d)
  }

  fn pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return 0.0;
    }

    let dim = u.len() as f64;
    let alpha = 1.0 / theta;

    let p1: f64 = (0..u.len()).map(|i| 1.0 + theta * i as f64).product();
    let p2 = u.iter().product::<f64>().powf(-1.0 - theta);
    let p3 = (1.0 + self.t(u, theta)).powf(-dim - alpha);

    p1 * p2 * p3
  }

  fn log_pdf(&self, u: &[f64], theta: f64) -> f64 {
    if on_lower_boundary(u) {
      return f64::NEG_INFINITY;
    }

    let dim = u.len() as f64;
    let alpha = 1.0 / theta;

    let s1: f64 = (1..u.len()).map(|i| (theta * i as f64).ln_1p()).sum();
    let s2 = (1.0 + theta) * u.iter().map(|x| x.ln()).sum::<f64>();
    let s3 = (dim + alpha) * self.t(u, theta).ln_1p();

    s1 - s2 - s3
  }
}
