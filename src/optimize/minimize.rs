use super::Counted;
use super::Minimum;
use super::OptimizeError;
use super::MAX_ITER;

/// Golden section ratio `(3 - sqrt(5)) / 2`.
const CGOLD: f64 = 0.381_966_011_250_105_1;

/// Sufficient decrease constant of the Armijo line search.
const ARMIJO_C1: f64 = 1e-4;

/// Step halvings tried before the line search gives up.
const MAX_BACKTRACK: usize = 60;

/// Brent's minimizer on `[lo, hi]`: golden section steps with successive
/// parabolic interpolation.
///
/// Stops when the bracket around the best point is narrower than roughly
/// `2 * tol`. The objective may return `+inf` where it is undefined; such
/// points never become the incumbent.
pub fn brent_minimize<F>(f: F, lo: f64, hi: f64, tol: f64) -> Result<Minimum, OptimizeError>
where
  F: FnMut(f64) -> f64,
{
  if !(lo < hi) {
    return Err(OptimizeError::InvalidBracket { lo, hi });
  }

  let mut f = Counted::new(f);
  let eps = f64::EPSILON.sqrt();
  let (mut a, mut b) = (lo, hi);

  let mut x = a + CGOLD * (b - a);
  let (mut v, mut w) = (x, x);
  let mut fx = f.call(x);
  let (mut fv, mut fw) = (fx, fx);
  let mut d: f64 = 0.0;
  let mut e: f64 = 0.0;

  for iteration in 0..MAX_ITER {
    let xm = 0.5 * (a + b);
    let tol1 = eps * x.abs() + tol / 3.0;
    let tol2 = 2.0 * tol1;

    if (x - xm).abs() <= tol2 - 0.5 * (b - a) {
      return Ok(Minimum {
        x,
        fx,
        evals: f.evals,
        iterations: iteration,
      });
    }

    let mut golden = true;
    if e.abs() > tol1 {
      // Trial parabola through x, v and w.
      let r = (x - w) * (fx - fv);
      let mut q = (x - v) * (fx - fw);
      let mut p = (x - v) * q - (x - w) * r;
      q = 2.0 * (q - r);
      if q > 0.0 {
        p = -p;
      }
      q = q.abs();
      let r = e;
      e = d;

      if p.is_finite()
        && q.is_finite()
        && p.abs() < (0.5 * q * r).abs()
        && p > q * (a - x)
        && p < q * (b - x)
      {
        d = p / q;
        let u = x + d;
        if u - a < tol2 || b - u < tol2 {
          d = tol1.copysign(xm - x);
        }
        golden = false;
      }
    }

    if golden {
      e = if x < xm { b - x } else { a - x };
      d = CGOLD * e;
    }

    let u = if d.abs() >= tol1 {
      x + d
    } else {
      x + tol1.copysign(d)
    };
    let fu = f.call(u);

    if fu <= fx {
      if u < x {
        b = x;
      } else {
        a = x;
      }
      v = w;
      fv = fw;
      w = x;
      fw = fx;
      x = u;
      fx = fu;
    } else {
      if u < x {
        a = u;
      } else {
        b = u;
      }
      if fu <= fw || w == x {
        v = w;
        fv = fw;
        w = u;
        fw = fu;
      } else if fu <= fv || v == x || v == w {
        v = u;
        fv = fu;
      }
    }
  }

  Err(OptimizeError::NoConvergence {
    iterations: MAX_ITER,
    best: Minimum {
      x,
      fx,
      evals: f.evals,
      iterations: MAX_ITER,
    },
  })
}

/// Quasi-Newton minimization from `x0` with a finite-difference gradient.
///
/// In one dimension the BFGS inverse Hessian update reduces to the secant
/// curvature `s / y`; steps are accepted by Armijo backtracking, which also
/// keeps iterates out of regions where the objective is `+inf`.
pub fn bfgs_minimize<F>(f: F, x0: f64, tol: f64) -> Result<Minimum, OptimizeError>
where
  F: FnMut(f64) -> f64,
{
  let mut f = Counted::new(f);
  let mut x = x0;
  let mut fx = f.call(x);
  if !fx.is_finite() {
    return Err(OptimizeError::NonFinite { x });
  }

  let mut g = gradient(&mut f, x, fx);
  let mut h_inv = if g.abs() > 1.0 { 1.0 / g.abs() } else { 1.0 };

  for iteration in 0..MAX_ITER {
    if g.abs() <= tol * (1.0 + fx.abs()) {
      return Ok(Minimum {
        x,
        fx,
        evals: f.evals,
        iterations: iteration,
      });
    }

    let direction = -h_inv * g;
    let mut step = 1.0;
    let mut accepted = None;
    for _ in 0..MAX_BACKTRACK {
      let candidate = x + step * direction;
      let fc = f.call(candidate);
      if fc.is_finite() && fc <= fx + ARMIJO_C1 * step * g * direction {
        accepted = Some((candidate, fc));
        break;
      }
      step *= 0.5;
    }

    let Some((x_new, f_new)) = accepted else {
      return Err(OptimizeError::LineSearchFailed {
        best: Minimum {
          x,
          fx,
          evals: f.evals,
          iterations: iteration,
        },
      });
    };

    let s = x_new - x;
    let g_new = gradient(&mut f, x_new, f_new);
    let y = g_new - g;
    if y * s > 0.0 {
      h_inv = s / y;
    }

    x = x_new;
    fx = f_new;
    g = g_new;

    if s.abs() <= tol * (1.0 + x.abs()) {
      return Ok(Minimum {
        x,
        fx,
        evals: f.evals,
        iterations: iteration + 1,
      });
    }
  }

  Err(OptimizeError::NoConvergence {
    iterations: MAX_ITER,
    best: Minimum {
      x,
      fx,
      evals: f.evals,
      iterations: MAX_ITER,
    },
  })
}

/// Central difference, one-sided when either neighbour is not finite.
fn gradient<F>(f: &mut Counted<F>, x: f64, fx: f64) -> f64
where
  F: FnMut(f64) -> f64,
{
  let h = 1e-6 * x.abs().max(1.0);
  let forward = f.call(x + h);
  let backward = f.call(x - h);

  match (forward.is_finite(), backward.is_finite()) {
    (true, true) => (forward - backward) / (2.0 * h),
    (true, false) => (forward - fx) / h,
    (false, true) => (fx - backward) / h,
    (false, false) => 0.0,
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;

  use super::*;

  #[test]
  fn brent_finds_parabola_vertex() {
    let min = brent_minimize(|x| 1.0 + (x - 2.0).powi(2), -10.0, 50.0, 1e-8).unwrap();
    assert_abs_diff_eq!(min.x, 2.0, epsilon = 1e-6);
    assert_abs_diff_eq!(min.fx, 1.0, epsilon = 1e-12);
    assert!(min.evals > 0);
  }

  #[test]
  fn brent_handles_wide_bracket() {
    let min = brent_minimize(|x| -x.powi(7) * (-x).exp(), -10.0, 200.0, 1e-2).unwrap();
    assert_abs_diff_eq!(min.x, 7.0, epsilon = 2e-2);
  }

  #[test]
  fn brent_minimum_on_boundary() {
    let min = brent_minimize(|x| x, 0.0, 1.0, 1e-8).unwrap();
    assert!(min.x < 1e-6);
  }

  #[test]
  fn brent_rejects_empty_bracket() {
    let err = brent_minimize(|x| x, 1.0, 1.0, 1e-8).unwrap_err();
    assert!(matches!(err, OptimizeError::InvalidBracket { .. }));
  }

  #[test]
  fn bfgs_finds_quadratic_minimum() {
    let min = bfgs_minimize(|x| 3.0 * (x + 1.5).powi(2) - 4.0, 10.0, 1e-8).unwrap();
    assert_abs_diff_eq!(min.x, -1.5, epsilon = 1e-5);
    assert_abs_diff_eq!(min.fx, -4.0, epsilon = 1e-8);
  }

  #[test]
  fn bfgs_stays_inside_finite_region() {
    // -ln x + x has its minimum at 1 and is undefined for x <= 0.
    let f = |x: f64| if x > 0.0 { x - x.ln() } else { f64::INFINITY };
    let min = bfgs_minimize(f, 0.2, 1e-8).unwrap();
    assert_abs_diff_eq!(min.x, 1.0, epsilon = 1e-4);
  }

  #[test]
  fn bfgs_rejects_infinite_start() {
    let err = bfgs_minimize(|_| f64::INFINITY, 0.0, 1e-8).unwrap_err();
    assert!(matches!(err, OptimizeError::NonFinite { .. }));
  }
}
