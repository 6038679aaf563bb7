//! # Radial decomposition
//!
//! $$
//! U \overset{d}{=} \psi_\theta(R\,S),\qquad
//! F_R(x)=1-\sum_{k=0}^{d-2}\frac{(-x)^k\psi^{(k)}(x)}{k!}-\frac{x^{d-1}\left((-1)^{d-1}\psi^{(d-1)}(x)\right)_+}{(d-1)!}
//! $$
//!
//! $S$ is uniform on the unit simplex and $R$ follows the Williamson
//! $d$-transform inverse of $\psi$. Quantiles of $R$ are found by bisection on
//! $z$ with $x=z^c$, which spreads the search more evenly for heavy tails. The
//! bracket is grown or shrunk by factors of two until it straddles the
//! quantile, and bisection stops on a width relative to its upper end, so tiny
//! quantiles keep their precision.
//!
use impl_new_derive::ImplNew;
use ndarray::parallel::prelude::*;
use ndarray::Array2;
use ndarray::ArrayViewMut1;
use ndarray::Axis;
use ndarray_rand::RandomExt;
use rand::Rng;
use rand_distr::Exp1;
use tracing::debug;

use super::ArchimedeanCopula;
use crate::error::CopulaError;
use crate::generator::alternating_sign;
use crate::generator::Family;
use crate::generator::GeneratorExt;
use crate::optimize::bisection;
use crate::special::factorial;

/// Bracket doublings (or halvings) tried before `radial_ppf` gives up.
const MAX_DOUBLINGS: usize = 1000;

/// Consecutive failed quantile draws tolerated for a single sample row.
const MAX_RETRIES: usize = 1000;

/// Search settings for the radial quantile: `x = z^exponent`, bisection on `z`
/// until the bracket width is below `tolerance` times its upper end.
#[derive(ImplNew, Debug, Clone, Copy, PartialEq)]
pub struct RadialSearch {
  pub exponent: f64,
  pub tolerance: f64,
}

impl RadialSearch {
  pub fn for_family(family: Family) -> Self {
    match family {
      Family::Clayton => Self::new(0.95, 1e-6),
      Family::Joe => Self::new(1.25, 1e-10),
      Family::Frank | Family::Gumbel | Family::Amh => Self::default(),
    }
  }
}

impl Default for RadialSearch {
  fn default() -> Self {
    Self::new(0.95, 1e-8)
  }
}

impl ArchimedeanCopula {
  /// Distribution function of the radial part in dimension `dim`.
  pub fn radial_cdf(&self, x: f64, dim: usize) -> f64 {
    assert!(dim >= 1, "dimension must be at least 1");
    if x <= 0.0 {
      return 0.0;
    }

    let generator = self.generator();
    let theta = self.theta();
    let last = dim - 1;

    let mut head = 0.0;
    let mut coef = 1.0;
    for k in 0..last {
      if k > 0 {
        coef *= -x / k as f64;
      }
      head += coef * generator.psi_d(k, x, theta);
    }

    let tail = (alternating_sign(last) * generator.psi_d(last, x, theta)).max(0.0);
    1.0 - head - x.powi(last as i32) * tail / factorial(last)
  }

  /// Quantile of the radial part with the family's default search settings.
  pub fn radial_ppf(&self, p: f64, dim: usize) -> Result<f64, CopulaError> {
    self.radial_ppf_with(p, dim, &RadialSearch::for_family(self.family()))
  }

  pub fn radial_ppf_with(
    &self,
    p: f64,
    dim: usize,
    search: &RadialSearch,
  ) -> Result<f64, CopulaError> {
    if !(p > 0.0 && p < 1.0) {
      return Err(CopulaError::ProbabilityOutOfRange(p));
    }

    let c = search.exponent;
    let target = |z: f64| self.radial_cdf(z.powf(c), dim) - p;

    // Invariant: target(lo) < 0 <= target(hi), with lo > 0.
    let mut lo = 0.1;
    let mut hi = 0.2;
    let mut steps = 0;
    if target(hi) < 0.0 {
      while target(hi) < 0.0 {
        if steps == MAX_DOUBLINGS {
          return Err(CopulaError::BracketExhausted {
            p,
            x: hi.powf(c),
          });
        }
        lo = hi;
        hi *= 2.0;
        steps += 1;
      }
      debug!(p, dim, steps, hi, "grew radial bracket");
    } else {
      while target(lo) >= 0.0 {
        if steps == MAX_DOUBLINGS {
          return Err(CopulaError::BracketExhausted {
            p,
            x: lo.powf(c),
          });
        }
        hi = lo;
        lo *= 0.5;
        steps += 1;
      }
      if steps > 0 {
        debug!(p, dim, steps, lo, "shrank radial bracket");
      }
    }

    let z = bisection(target, lo, hi, search.tolerance * hi)?;
    Ok(z.powf(c))
  }

  /// `size` draws of dimension `dim` using the thread-local generator.
  pub fn sample(&self, size: usize, dim: usize) -> Result<Array2<f64>, CopulaError> {
    self.sample_with_rng(&mut rand::thread_rng(), size, dim)
  }

  /// `size` draws of dimension `dim` from a caller supplied generator, so a
  /// seeded generator gives reproducible output.
  ///
  /// A failed radial quantile is redrawn with a fresh uniform. Only a row that
  /// fails 1000 times in a row turns into [`CopulaError::SamplingFailed`].
  ///
  /// # Panics
  ///
  /// If `size` or `dim` is zero.
  pub fn sample_with_rng<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    size: usize,
    dim: usize,
  ) -> Result<Array2<f64>, CopulaError> {
    assert!(size > 0, "sample size must be positive");
    assert!(dim > 0, "dimension must be positive");

    let mut out = Array2::<f64>::random_using((size, dim), Exp1, rng);
    for row in out.axis_iter_mut(Axis(0)) {
      self.fill_row(rng, row)?;
    }

    Ok(out)
  }

  /// Same as [`ArchimedeanCopula::sample`] with rows drawn in parallel, each
  /// worker on its own thread-local generator.
  pub fn par_sample(&self, size: usize, dim: usize) -> Result<Array2<f64>, CopulaError> {
    assert!(size > 0, "sample size must be positive");
    assert!(dim > 0, "dimension must be positive");

    let mut out = Array2::<f64>::random((size, dim), Exp1);
    out
      .axis_iter_mut(Axis(0))
      .into_par_iter()
      .try_for_each(|row| self.fill_row(&mut rand::thread_rng(), row))?;

    Ok(out)
  }

  /// Turns a row of standard exponentials into one draw: normalised they are
  /// uniform on the simplex, then `psi(R * w_j)` with `R` from the radial
  /// quantile.
  fn fill_row<R: Rng + ?Sized>(
    &self,
    rng: &mut R,
    mut row: ArrayViewMut1<f64>,
  ) -> Result<(), CopulaError> {
    let dim = row.len();
    let total = row.sum();
    row /= total;

    let generator = self.generator();
    let theta = self.theta();
    let mut failures = 0;
    loop {
      let p: f64 = rng.gen();
      match self.radial_ppf(p, dim) {
        Ok(r) => {
          row.mapv_inplace(|w| generator.psi(r * w, theta));
          return Ok(());
        }
        Err(err) => {
          failures += 1;
          if failures == MAX_RETRIES {
            return Err(CopulaError::SamplingFailed {
              attempts: failures,
              last: Box::new(err),
            });
          }
          debug!(failures, p, %err, "radial quantile failed, redrawing");
        }
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use rand::rngs::StdRng;
  use rand::SeedableRng;
  use tracing_test::traced_test;

  use super::*;

  #[test]
  fn radial_cdf_reference_values() {
    let cases = [
      (Family::Clayton, 0.021184),
      (Family::Frank, 0.131331),
      (Family::Gumbel, 0.147170),
      (Family::Joe, 0.142949),
    ];
    for (family, expected) in cases {
      let copula = ArchimedeanCopula::new(family, 1.45);
      assert_abs_diff_eq!(copula.radial_cdf(0.5, 3), expected, epsilon = 1e-5);
    }
  }

  #[test]
  fn radial_cdf_is_a_distribution() {
    for family in Family::ALL {
      let copula = ArchimedeanCopula::new(family, copula_theta(family));
      for dim in [2, 3, 4, 5] {
        assert_eq!(copula.radial_cdf(0.0, dim), 0.0);
        assert_eq!(copula.radial_cdf(-1.0, dim), 0.0);

        let mut previous = 0.0;
        for i in 1..=60 {
          let x = 0.05 * i as f64;
          let value = copula.radial_cdf(x, dim);
          assert!(
            value >= previous - 1e-10,
            "{family} d={dim}: F({x}) = {value} < {previous}"
          );
          assert!(value <= 1.0 + 1e-10);
          previous = value;
        }
      }
    }
  }

  #[test]
  fn one_dimensional_radial_law() {
    let copula = ArchimedeanCopula::new(Family::Clayton, 2.0);
    let psi = copula.generator().psi(0.7, 2.0);
    assert_abs_diff_eq!(copula.radial_cdf(0.7, 1), 1.0 - psi, epsilon = 1e-12);
  }

  #[test]
  fn ppf_inverts_cdf() {
    for family in Family::ALL {
      let copula = ArchimedeanCopula::new(family, copula_theta(family));
      for dim in [2, 3, 5] {
        for p in [0.1, 0.25, 0.5, 0.75, 0.9] {
          let x = copula.radial_ppf(p, dim).unwrap();
          assert_abs_diff_eq!(copula.radial_cdf(x, dim), p, epsilon = 1e-5);
        }
      }
    }
  }

  #[test]
  fn ppf_resolves_lower_tail_under_strong_dependence() {
    // Gumbel and Joe at theta = 8 put a few percent of the radial mass below 1e-10.
    for family in [Family::Gumbel, Family::Joe] {
      let copula = ArchimedeanCopula::new(family, 8.0);
      for dim in [2, 3] {
        let mut previous = 0.0;
        for p in [1e-3, 1e-2, 5e-2] {
          let x = copula.radial_ppf(p, dim).unwrap();
          assert!(x > previous, "{family} d={dim}: ppf({p}) = {x} <= {previous}");
          assert_relative_eq!(copula.radial_cdf(x, dim), p, max_relative = 1e-6);
          previous = x;
        }
      }
    }
  }

  #[test]
  fn ppf_rejects_invalid_probabilities() {
    let copula = ArchimedeanCopula::new(Family::Gumbel, 2.0);
    for p in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
      assert!(matches!(
        copula.radial_ppf(p, 3),
        Err(CopulaError::ProbabilityOutOfRange(_))
      ));
    }
  }

  #[test]
  fn custom_search_settings() {
    let copula = ArchimedeanCopula::new(Family::Frank, 3.0);
    let search = RadialSearch::new(1.0, 1e-12);
    let x = copula.radial_ppf_with(0.6, 4, &search).unwrap();
    assert_abs_diff_eq!(copula.radial_cdf(x, 4), 0.6, epsilon = 1e-9);
    assert_eq!(RadialSearch::for_family(Family::Joe), RadialSearch::new(1.25, 1e-10));
  }

  #[test]
  fn seeded_sampling_is_reproducible() {
    let copula = ArchimedeanCopula::new(Family::Joe, 2.2);
    let a = copula.sample_with_rng(&mut StdRng::seed_from_u64(7), 50, 3).unwrap();
    let b = copula.sample_with_rng(&mut StdRng::seed_from_u64(7), 50, 3).unwrap();
    assert_eq!(a, b);
    assert_eq!(a.dim(), (50, 3));
    assert!(a.iter().all(|&u| u > 0.0 && u <= 1.0));
  }

  #[test]
  #[traced_test]
  fn samples_reproduce_dependence() {
    // Clayton: Kendall's tau = theta / (theta + 2).
    let theta = 2.0;
    let copula = ArchimedeanCopula::new(Family::Clayton, theta);
    let data = copula
      .sample_with_rng(&mut StdRng::seed_from_u64(42), 2000, 2)
      .unwrap();

    let (u, v) = (data.column(0), data.column(1));
    let mut concordant = 0i64;
    let mut discordant = 0i64;
    for i in 0..u.len() {
      for j in (i + 1)..u.len() {
        let s = (u[i] - u[j]) * (v[i] - v[j]);
        if s > 0.0 {
          concordant += 1;
        } else if s < 0.0 {
          discordant += 1;
        }
      }
    }
    let tau = (concordant - discordant) as f64 / (concordant + discordant) as f64;
    assert_abs_diff_eq!(tau, theta / (theta + 2.0), epsilon = 0.05);
  }

  #[test]
  fn margins_are_uniform() {
    let copula = ArchimedeanCopula::new(Family::Gumbel, 3.0);
    let data = copula.par_sample(4000, 3).unwrap();
    assert_eq!(data.dim(), (4000, 3));
    for column in data.columns() {
      let mean = column.mean().unwrap();
      assert_abs_diff_eq!(mean, 0.5, epsilon = 0.03);
    }
  }

  #[test]
  fn upper_tail_survives_strong_dependence() {
    let n = 4000;
    for family in [Family::Gumbel, Family::Joe] {
      let copula = ArchimedeanCopula::new(family, 8.0);
      let data = copula
        .sample_with_rng(&mut StdRng::seed_from_u64(4), n, 2)
        .unwrap();

      for column in data.columns() {
        let mut bins = [0usize; 10];
        for &u in column {
          bins[((u * 10.0) as usize).min(9)] += 1;
        }
        for (k, &count) in bins.iter().enumerate() {
          assert!(
            (320..=480).contains(&count),
            "{family}: {count} draws in decile {k}"
          );
        }

        let top = column.iter().filter(|&&u| u > 0.95).count();
        assert!((150..=250).contains(&top), "{family}: {top} draws above 0.95");
      }

      if family == Family::Gumbel {
        // Joint exceedance: 1 - 2 * 0.95 + C(0.95, 0.95) = 0.0456.
        let both = data.rows().into_iter().filter(|r| r[0] > 0.95 && r[1] > 0.95).count();
        assert!((130..=240).contains(&both), "joint upper tail: {both}");
      }
    }
  }

  #[test]
  fn sampling_succeeds_at_extreme_theta() {
    let cases = [
      (Family::Clayton, 8.0),
      (Family::Frank, 20.0),
      (Family::Gumbel, 8.0),
      (Family::Joe, 8.0),
      (Family::Amh, -0.9),
    ];
    for (family, theta) in cases {
      let copula = ArchimedeanCopula::new(family, theta);
      let data = copula
        .sample_with_rng(&mut StdRng::seed_from_u64(1), 300, 4)
        .unwrap();
      assert!(
        data.iter().all(|&u| (0.0..=1.0).contains(&u)),
        "{family} theta={theta}"
      );
    }
  }

  #[test]
  #[should_panic(expected = "sample size must be positive")]
  fn empty_sample_panics() {
    let _ = ArchimedeanCopula::new(Family::Frank, 2.0).sample(0, 2);
  }

  fn copula_theta(family: Family) -> f64 {
    match family {
      Family::Amh => 0.6,
      _ => 2.5,
    }
  }
}
