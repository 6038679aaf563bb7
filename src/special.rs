//! # Special
//!
//! $$
//! \mathrm{Li}_{-n}(x)=\sum_{k=0}^{n} k!\,S(n+1,k+1)\left(\frac{x}{1-x}\right)^{k+1}
//! $$
//!
//! Combinatorial tables and the finite closed forms the generator derivatives
//! reduce to.
use std::sync::OnceLock;

/// Largest copula dimension the closed-form derivatives are tabulated for.
pub const MAX_DIM: usize = 12;

/// The AMH density reads `S(d + 1, .)` and the Gumbel/Joe polynomials read
/// index `d`, so two extra rows cover every dimension up to [`MAX_DIM`].
const TABLE_SIZE: usize = MAX_DIM + 2;

struct StirlingTables {
  first: [[f64; TABLE_SIZE]; TABLE_SIZE],
  second: [[f64; TABLE_SIZE]; TABLE_SIZE],
}

static STIRLING_TABLES: OnceLock<StirlingTables> = OnceLock::new();

fn stirling_tables() -> &'static StirlingTables {
  STIRLING_TABLES.get_or_init(|| {
    let mut first = [[0.0; TABLE_SIZE]; TABLE_SIZE];
    let mut second = [[0.0; TABLE_SIZE]; TABLE_SIZE];
    first[0][0] = 1.0;
    second[0][0] = 1.0;

    for i in 1..TABLE_SIZE {
      for j in 1..TABLE_SIZE {
        first[i][j] = first[i - 1][j - 1] - (i - 1) as f64 * first[i - 1][j];
        second[i][j] = second[i - 1][j - 1] + j as f64 * second[i - 1][j];
      }
    }

    StirlingTables { first, second }
  })
}

fn check_index(n: usize, k: usize) {
  assert!(
    n < TABLE_SIZE && k < TABLE_SIZE,
    "Stirling numbers are tabulated up to index {} (dimension {}), got ({n}, {k})",
    TABLE_SIZE - 1,
    MAX_DIM
  );
}

/// Signed Stirling number of the first kind `s(n, k)`.
pub fn stirling_first(n: usize, k: usize) -> f64 {
  check_index(n, k);
  stirling_tables().first[n][k]
}

/// Stirling number of the second kind `S(n, k)`.
pub fn stirling_second(n: usize, k: usize) -> f64 {
  check_index(n, k);
  stirling_tables().second[n][k]
}

/// `n!` as a float; exact for every `n` the tables can reach.
pub fn factorial(n: usize) -> f64 {
  (1..=n).fold(1.0, |acc, k| acc * k as f64)
}

/// Rising factorial `(x)_n = x (x + 1) ... (x + n - 1) = Γ(x + n) / Γ(x)`.
pub fn rising_factorial(x: f64, n: usize) -> f64 {
  (0..n).fold(1.0, |acc, i| acc * (x + i as f64))
}

/// Polylogarithm of negative integer order `Li_{-n}(x)` through Wood's finite
/// sum. Defined for `x < 1`.
pub fn negative_integer_polylog(x: f64, n: usize) -> f64 {
  let ratio = x / (1.0 - x);
  let mut power = ratio;
  let mut li = 0.0;

  for k in 0..=n {
    li += factorial(k) * stirling_second(n + 1, k + 1) * power;
    power *= ratio;
  }

  li
}

/// Coefficient `a_{dk}(alpha)` of the Gumbel derivative polynomial.
pub fn gumbel_coefficient(dim: usize, k: usize, alpha: f64) -> f64 {
  let mut a = alpha.powi(k as i32);
  let mut s = 0.0;

  for j in k..=dim {
    s += a * stirling_first(dim, j) * stirling_second(j, k);
    a *= alpha;
  }

  if (dim - k) % 2 == 0 {
    s
  } else {
    -s
  }
}

/// $P_d(x)=\sum_{k=1}^{d} a_{dk}(\alpha)\,x^k$
pub fn gumbel_polynomial(x: f64, dim: usize, alpha: f64) -> f64 {
  let mut xk = x;
  let mut p = 0.0;

  for k in 1..=dim {
    p += gumbel_coefficient(dim, k, alpha) * xk;
    xk *= x;
  }

  p
}

/// Coefficient `S(d, k+1) Γ(k+1-α) / Γ(1-α)` of the Joe derivative polynomial.
///
/// The gamma ratio is expanded as `(1-α)_k`, which stays finite at `α = 1`.
pub fn joe_coefficient(dim: usize, k: usize, alpha: f64) -> f64 {
  stirling_second(dim, k + 1) * rising_factorial(1.0 - alpha, k)
}

/// $Q_d(x)=\sum_{k=0}^{d-1} S(d,k+1)\frac{\Gamma(k+1-\alpha)}{\Gamma(1-\alpha)}x^k$
pub fn joe_polynomial(x: f64, dim: usize, alpha: f64) -> f64 {
  let mut xk = 1.0;
  let mut p = 0.0;

  for k in 0..dim {
    p += joe_coefficient(dim, k, alpha) * xk;
    xk *= x;
  }

  p
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;

  use super::*;

  #[test]
  fn stirling_tables_match_known_rows() {
    // s(5, k) = 0, 24, -50, 35, -10, 1
    let first: Vec<f64> = (0..=5).map(|k| stirling_first(5, k)).collect();
    assert_eq!(first, vec![0.0, 24.0, -50.0, 35.0, -10.0, 1.0]);

    // S(5, k) = 0, 1, 15, 25, 10, 1
    let second: Vec<f64> = (0..=5).map(|k| stirling_second(5, k)).collect();
    assert_eq!(second, vec![0.0, 1.0, 15.0, 25.0, 10.0, 1.0]);
  }

  #[test]
  fn stirling_tables_cover_max_dim() {
    let n = MAX_DIM + 1;
    assert_eq!(stirling_second(n, n), 1.0);
    assert_eq!(stirling_second(n, 1), 1.0);
    // S(n, 2) = 2^(n-1) - 1
    assert_eq!(stirling_second(n, 2), 2f64.powi(n as i32 - 1) - 1.0);
  }

  #[test]
  #[should_panic(expected = "Stirling numbers are tabulated")]
  fn stirling_out_of_range_panics() {
    stirling_second(MAX_DIM + 2, 1);
  }

  #[test]
  fn factorial_small_values() {
    assert_eq!(factorial(0), 1.0);
    assert_eq!(factorial(6), 720.0);
    assert_eq!(factorial(13), 6_227_020_800.0);
  }

  #[test]
  fn rising_factorial_is_gamma_ratio() {
    use statrs::function::gamma::gamma;

    for &x in &[0.3, 1.0, 2.5] {
      for n in 0..6 {
        assert_relative_eq!(
          rising_factorial(x, n),
          gamma(x + n as f64) / gamma(x),
          max_relative = 1e-12
        );
      }
    }
  }

  #[test]
  fn polylog_matches_closed_forms() {
    let x: f64 = 0.3;
    // Li_0(x) = x / (1 - x), Li_{-1}(x) = x / (1 - x)^2, Li_{-2}(x) = x (1 + x) / (1 - x)^3
    assert_relative_eq!(negative_integer_polylog(x, 0), x / (1.0 - x), epsilon = 1e-14);
    assert_relative_eq!(
      negative_integer_polylog(x, 1),
      x / (1.0 - x).powi(2),
      epsilon = 1e-14
    );
    assert_relative_eq!(
      negative_integer_polylog(x, 2),
      x * (1.0 + x) / (1.0 - x).powi(3),
      epsilon = 1e-14
    );
  }

  #[test]
  fn polylog_matches_power_series() {
    let x: f64 = 0.4;
    for n in 0..6 {
      let series: f64 = (1..400).map(|k| (k as f64).powi(n as i32) * x.powi(k)).sum();
      assert_relative_eq!(negative_integer_polylog(x, n), series, max_relative = 1e-10);
    }
  }

  #[test]
  fn gumbel_polynomial_first_orders() {
    let alpha = 0.4;
    let x = 1.7;
    // P_1(x) = alpha x
    assert_abs_diff_eq!(gumbel_polynomial(x, 1, alpha), alpha * x, epsilon = 1e-14);
    // P_2(x) = alpha (1 - alpha) x + alpha^2 x^2
    assert_abs_diff_eq!(
      gumbel_polynomial(x, 2, alpha),
      alpha * (1.0 - alpha) * x + alpha * alpha * x * x,
      epsilon = 1e-14
    );
  }

  #[test]
  fn joe_polynomial_first_orders() {
    let alpha = 0.4;
    let x = 0.8;
    assert_abs_diff_eq!(joe_polynomial(x, 1, alpha), 1.0, epsilon = 1e-14);
    // Q_2(x) = 1 + (1 - alpha) x
    assert_abs_diff_eq!(
      joe_polynomial(x, 2, alpha),
      1.0 + (1.0 - alpha) * x,
      epsilon = 1e-12
    );
  }
}
