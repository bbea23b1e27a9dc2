//! Scalar root finding used by the iterative profile cases.
//!
//! A residual is first sampled over its admissible interval to find sign
//! changes, then every bracket is refined by Newton steps that fall back to
//! bisection whenever a step leaves the bracket or stops shrinking the residual.
//!
//! Residuals of the profile families are only defined on part of their
//! interval (a hold or cruise cannot be negative). Roots often sit right at the
//! border of that part, so the scan bisects towards every border it passes and
//! samples the last defined point as well.

/// Iteration cap of a single bracket refinement.
pub const MAX_ITERATIONS: usize = 100;

/// Number of evenly spaced samples taken while scanning for brackets.
pub const SCAN_SAMPLES: usize = 64;

/// Bisection steps spent locating the border of the defined region.
pub const EDGE_STEPS: usize = 48;

const MAX_EXTRA_SAMPLES: usize = 8;
const MAX_BRACKETS: usize = 8;

/// Interval `[lo, hi]` whose residuals have opposite signs (or one is zero).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Bracket {
    pub lo: f64,
    pub hi: f64,
    pub f_lo: f64,
    pub f_hi: f64,
}

/// Sign-change brackets of a residual, in increasing order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Brackets {
    items: [Bracket; MAX_BRACKETS],
    len: usize,
}

impl Brackets {
    fn push(&mut self, bracket: Bracket) {
        if self.len < MAX_BRACKETS {
            self.items[self.len] = bracket;
            self.len += 1;
        }
    }

    pub fn as_slice(&self) -> &[Bracket] {
        &self.items[..self.len]
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Samples `f` over `[lo, hi]` and returns the sign-change brackets.
///
/// `extra` adds sample points that are known to be interesting (for example the
/// boundary velocities); points outside `[lo, hi]` are ignored. `f` returns
/// `None` where the residual is not defined, such intervals never form a bracket.
pub fn scan<F>(lo: f64, hi: f64, extra: &[f64], mut f: F) -> Brackets
where
    F: FnMut(f64) -> Option<f64>,
{
    let mut xs = [0.0; SCAN_SAMPLES + 1 + MAX_EXTRA_SAMPLES];
    let mut n = 0;
    for i in 0..=SCAN_SAMPLES {
        xs[n] = lo + (hi - lo) * i as f64 / SCAN_SAMPLES as f64;
        n += 1;
    }
    for &x in extra.iter().take(MAX_EXTRA_SAMPLES) {
        if x.is_finite() && x > lo && x < hi {
            xs[n] = x;
            n += 1;
        }
    }
    let xs = &mut xs[..n];
    xs.sort_by(f64::total_cmp);

    let mut brackets = Brackets::default();
    let mut last = None;
    let mut prev: Option<(f64, Option<f64>)> = None;
    for &x in xs.iter() {
        let fx = f(x).filter(|v| v.is_finite());
        match (prev, fx) {
            (Some((px, Some(pf))), None) => {
                let (ex, ef) = edge(px, pf, x, &mut f);
                record(&mut brackets, &mut last, ex, Some(ef));
            }
            (Some((px, None)), Some(fx)) => {
                let (ex, ef) = edge(x, fx, px, &mut f);
                record(&mut brackets, &mut last, ex, Some(ef));
            }
            _ => {}
        }
        record(&mut brackets, &mut last, x, fx);
        prev = Some((x, fx));
    }
    brackets
}

/// Adds sample `(x, fx)` and pushes a bracket if the sign changed since the
/// last defined sample. An undefined sample breaks the chain.
fn record(brackets: &mut Brackets, last: &mut Option<(f64, f64)>, x: f64, fx: Option<f64>) {
    if let Some(fx) = fx {
        if fx == 0.0 {
            brackets.push(Bracket {
                lo: x,
                hi: x,
                f_lo: 0.0,
                f_hi: 0.0,
            });
        } else if let Some((px, pf)) = *last {
            if pf != 0.0 && pf.signum() != fx.signum() {
                brackets.push(Bracket {
                    lo: px,
                    hi: x,
                    f_lo: pf,
                    f_hi: fx,
                });
            }
        }
    }
    *last = fx.map(|v| (x, v));
}

/// Last defined point between `inside` (defined) and `outside` (undefined).
fn edge<F>(mut inside: f64, mut f_inside: f64, mut outside: f64, f: &mut F) -> (f64, f64)
where
    F: FnMut(f64) -> Option<f64>,
{
    for _ in 0..EDGE_STEPS {
        let mid = 0.5 * (inside + outside);
        match f(mid).filter(|v| v.is_finite()) {
            Some(fm) => {
                inside = mid;
                f_inside = fm;
            }
            None => outside = mid,
        }
    }
    (inside, f_inside)
}

/// Refines a bracket until `|f(x)| <= tolerance` or the bracket collapses.
///
/// Returns `None` if the iteration cap is reached or the residual becomes
/// undefined inside the bracket.
pub fn refine<F>(bracket: Bracket, tolerance: f64, mut f: F) -> Option<f64>
where
    F: FnMut(f64) -> Option<f64>,
{
    let Bracket {
        mut lo,
        mut hi,
        mut f_lo,
        f_hi,
    } = bracket;
    if f_lo == 0.0 {
        return Some(lo);
    }
    if f_hi == 0.0 {
        return Some(hi);
    }

    let width_tolerance = 1e-14 * (1.0 + lo.abs().max(hi.abs()));

    // secant start
    let mut x = lo - f_lo * (hi - lo) / (f_hi - f_lo);
    if !(x > lo && x < hi) {
        x = 0.5 * (lo + hi);
    }
    let mut last_residual = f64::INFINITY;

    for _ in 0..MAX_ITERATIONS {
        let fx = f(x)?;
        if !fx.is_finite() {
            return None;
        }
        if fx.abs() <= tolerance {
            return Some(x);
        }

        if fx.signum() == f_lo.signum() {
            lo = x;
            f_lo = fx;
        } else {
            hi = x;
        }
        if hi - lo <= width_tolerance {
            return Some(x);
        }

        let mut next = 0.5 * (lo + hi);
        if fx.abs() < 0.5 * last_residual {
            let h = 1e-7 * (hi - lo).max(1e-12);
            if let Some(fh) = f(x + h).filter(|v| v.is_finite()) {
                let slope = (fh - fx) / h;
                if slope != 0.0 {
                    let newton = x - fx / slope;
                    if newton > lo && newton < hi {
                        next = newton;
                    }
                }
            }
        }
        last_residual = fx.abs();
        x = next;
    }
    None
}
