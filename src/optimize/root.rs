use super::opposite_signs;
use super::Counted;
use super::Minimum;
use super::OptimizeError;
use super::MAX_ITER;

/// Root of `f` in `[lo, hi]` by repeated halving.
///
/// `f(lo)` and `f(hi)` must have opposite signs. Returns the bracket midpoint
/// once its width drops below `tol`, or any midpoint where `f` vanishes.
pub fn bisection<F>(f: F, lo: f64, hi: f64, tol: f64) -> Result<f64, OptimizeError>
where
  F: FnMut(f64) -> f64,
{
  if !(lo < hi) {
    return Err(OptimizeError::InvalidBracket { lo, hi });
  }

  let mut f = Counted::new(f);
  let (mut a, mut b) = (lo, hi);
  let mut fa = f.call(a);
  let fb = f.call(b);

  if fa == 0.0 {
    return Ok(a);
  }
  if fb == 0.0 {
    return Ok(b);
  }
  if !opposite_signs(fa, fb) {
    return Err(OptimizeError::NoSignChange {
      lo,
      hi,
      f_lo: fa,
      f_hi: fb,
    });
  }

  for _ in 0..MAX_ITER {
    let mid = 0.5 * (a + b);
    // Width below tolerance, or below the float spacing around `mid`.
    if b - a < tol || mid <= a || mid >= b {
      return Ok(mid);
    }

    let fm = f.call(mid);
    if fm == 0.0 {
      return Ok(mid);
    }

    if (fm < 0.0) == (fa < 0.0) {
      a = mid;
      fa = fm;
    } else {
      b = mid;
    }
  }

  let x = 0.5 * (a + b);
  Err(OptimizeError::NoConvergence {
    iterations: MAX_ITER,
    best: Minimum {
      x,
      fx: f.call(x),
      evals: f.evals,
      iterations: MAX_ITER,
    },
  })
}

/// Secant iteration from `x0`, `x1`; stops when consecutive iterates are
/// closer than `tol`. No bracket, so convergence is only local.
pub fn secant<F>(f: F, x0: f64, x1: f64, tol: f64) -> Result<f64, OptimizeError>
where
  F: FnMut(f64) -> f64,
{
  let mut f = Counted::new(f);
  let (mut x0, mut x1) = (x0, x1);
  let mut f0 = f.call(x0);
  let mut f1 = f.call(x1);

  for _ in 0..MAX_ITER {
    if f1 == 0.0 {
      return Ok(x1);
    }
    if f1 == f0 {
      return Err(OptimizeError::Stalled { x: x1 });
    }

    let x2 = x1 - f1 * (x1 - x0) / (f1 - f0);
    if !x2.is_finite() {
      return Err(OptimizeError::Stalled { x: x1 });
    }
    if (x2 - x1).abs() < tol {
      return Ok(x2);
    }

    x0 = x1;
    f0 = f1;
    x1 = x2;
    f1 = f.call(x2);
  }

  Err(OptimizeError::NoConvergence {
    iterations: MAX_ITER,
    best: Minimum {
      x: x1,
      fx: f1,
      evals: f.evals,
      iterations: MAX_ITER,
    },
  })
}

/// Brent-Dekker root finder on a sign-changing bracket: inverse quadratic
/// interpolation and secant steps, falling back to bisection whenever the
/// interpolated step leaves the bracket or shrinks too slowly.
pub fn brent_root<F>(f: F, lo: f64, hi: f64, tol: f64) -> Result<f64, OptimizeError>
where
  F: FnMut(f64) -> f64,
{
  if !(lo < hi) {
    return Err(OptimizeError::InvalidBracket { lo, hi });
  }

  let mut f = Counted::new(f);
  let (mut a, mut b) = (lo, hi);
  let (mut fa, mut fb) = (f.call(a), f.call(b));

  if fa == 0.0 {
    return Ok(a);
  }
  if fb == 0.0 {
    return Ok(b);
  }
  if !opposite_signs(fa, fb) {
    return Err(OptimizeError::NoSignChange {
      lo,
      hi,
      f_lo: fa,
      f_hi: fb,
    });
  }

  let (mut c, mut fc) = (b, fb);
  let mut d = b - a;
  let mut e = d;

  for _ in 0..MAX_ITER {
    if (fb > 0.0 && fc > 0.0) || (fb < 0.0 && fc < 0.0) {
      c = a;
      fc = fa;
      d = b - a;
      e = d;
    }
    if fc.abs() < fb.abs() {
      a = b;
      b = c;
      c = a;
      fa = fb;
      fb = fc;
      fc = fa;
    }

    let tol1 = 2.0 * f64::EPSILON * b.abs() + 0.5 * tol;
    let xm = 0.5 * (c - b);
    if xm.abs() <= tol1 || fb == 0.0 {
      return Ok(b);
    }

    if e.abs() >= tol1 && fa.abs() > fb.abs() {
      let s = fb / fa;
      let (mut p, mut q) = if a == c {
        (2.0 * xm * s, 1.0 - s)
      } else {
        let q = fa / fc;
        let r = fb / fc;
        (
          s * (2.0 * xm * q * (q - r) - (b - a) * (r - 1.0)),
          (q - 1.0) * (r - 1.0) * (s - 1.0),
        )
      };
      if p > 0.0 {
        q = -q;
      }
      p = p.abs();

      let min1 = 3.0 * xm * q - (tol1 * q).abs();
      let min2 = (e * q).abs();
      if 2.0 * p < min1.min(min2) {
        e = d;
        d = p / q;
      } else {
        d = xm;
        e = d;
      }
    } else {
      d = xm;
      e = d;
    }

    a = b;
    fa = fb;
    b += if d.abs() > tol1 { d } else { tol1.copysign(xm) };
    fb = f.call(b);
  }

  Err(OptimizeError::NoConvergence {
    iterations: MAX_ITER,
    best: Minimum {
      x: b,
      fx: fb,
      evals: f.evals,
      iterations: MAX_ITER,
    },
  })
}
