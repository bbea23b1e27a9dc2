/// Describes a single constant-jerk phase of an S-curve profile.
///
/// `pos`, `vel` and `acc` are the state at the start of the phase, `jrk` is the
/// jerk held for `time` seconds.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct MotionPolynomial {
    pub time: f64,
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
    pub jrk: f64,
}

impl MotionPolynomial {
    /// Creates a new MotionPolynomial.
    pub fn new(time: f64, pos: f64, vel: f64, acc: f64, jrk: f64) -> Self {
        Self {
            time,
            pos,
            vel,
            acc,
            jrk,
        }
    }

    /// State `(pos, vel, acc)` after `t` seconds inside this phase.
    ///
    /// `t` is not clamped: values past `time` extrapolate the same polynomial.
    pub fn at(&self, t: f64) -> (f64, f64, f64) {
        let (j0, a0, v0, s0) = (self.jrk, self.acc, self.vel, self.pos);

        // acc(t) = a0 + j0*t
        let acc = a0 + j0 * t;

        // vel(t) = v0 + a0*t + j0*t^2/2
        let vel = v0 + (a0 + acc) * t * 0.5;

        // pos(t) = s0 + v0*t + a0*t^2/2 + j0*t^3/6
        let vel_avg = v0 + (2.0 * a0 + acc) * t / 6.0;
        let pos = s0 + vel_avg * t;

        (pos, vel, acc)
    }

    /// State at the end of the phase.
    pub fn end(&self) -> (f64, f64, f64) {
        self.at(self.time)
    }

    /// Times in `(0, time)` where the velocity crosses zero.
    ///
    /// These are the only interior points where the position can reach an extremum.
    pub fn velocity_roots(&self) -> [Option<f64>; 2] {
        // 0 = v0 + a0*t + j0/2*t^2
        let (a, b, c) = (0.5 * self.jrk, self.acc, self.vel);
        let inside = |t: f64| (t > 0.0 && t < self.time).then_some(t);

        if a.abs() < f64::EPSILON {
            if b.abs() < f64::EPSILON {
                return [None, None];
            }
            return [inside(-c / b), None];
        }

        let disc = b * b - 4.0 * a * c;
        if disc < 0.0 {
            return [None, None];
        }
        let sq = disc.sqrt();
        [inside((-b + sq) / (2.0 * a)), inside((-b - sq) / (2.0 * a))]
    }

    /// Largest and smallest velocity reached inside the phase.
    pub fn velocity_bounds(&self) -> (f64, f64) {
        let (_, v_end, _) = self.end();
        let mut lo = self.vel.min(v_end);
        let mut hi = self.vel.max(v_end);

        // acc(t) = 0 inside the phase marks a velocity extremum
        if self.jrk != 0.0 {
            let t = -self.acc / self.jrk;
            if t > 0.0 && t < self.time {
                let (_, v, _) = self.at(t);
                lo = lo.min(v);
                hi = hi.max(v);
            }
        }
        (lo, hi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn constant_jerk_closed_form() {
        let phase = MotionPolynomial::new(2.0, 1.0, 0.5, -1.0, 3.0);
        let (p, v, a) = phase.at(2.0);
        assert_abs_diff_eq!(a, -1.0 + 3.0 * 2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(v, 0.5 - 2.0 + 1.5 * 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p, 1.0 + 1.0 - 2.0 + 0.5 * 8.0, epsilon = 1e-12);
    }

    #[test]
    fn velocity_root_inside_phase() {
        // v(t) = 1 - t
        let phase = MotionPolynomial::new(3.0, 0.0, 1.0, -1.0, 0.0);
        assert_eq!(phase.velocity_roots(), [Some(1.0), None]);

        let (lo, hi) = phase.velocity_bounds();
        assert_abs_diff_eq!(lo, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(hi, 1.0, epsilon = 1e-12);
    }
}
