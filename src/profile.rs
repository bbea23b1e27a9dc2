use crate::motion_polynomial::MotionPolynomial;
use crate::state::{AxisLimits, AxisState};

/// Canonical kinematic case a profile was solved with.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProfileCase {
    /// Already at the target, nothing to do.
    #[default]
    AtTarget,
    /// Velocity control: one acceleration plateau from current to target velocity.
    VelocityShift,
    /// Accelerate, cruise at a velocity limit, decelerate.
    CruiseAtLimit,
    /// Accelerate to a peak velocity and decelerate without cruising. Covers
    /// profiles that first reverse direction.
    PeakVelocity,
    /// Two acceleration peaks of opposite direction joined by a single ramp,
    /// each either turning at once or held at its limit. An empty first ramp
    /// gives the profile that never returns to zero acceleration.
    TwoPeak,
    /// Profile of a prescribed duration: the minimal-time profile at a reduced
    /// jerk, or a full-jerk profile with a free cruise or hold.
    Stretched,
    /// Copy of another axis' profile scaled to this axis' displacement.
    Scaled,
}

/// One axis' S-curve: up to four brake phases followed by the seven phases
/// of the main profile.
///
/// Each phase is a [`MotionPolynomial`] holding its start state, so evaluation
/// at any time only needs the containing phase.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Profile {
    pub brake: [MotionPolynomial; 4],
    pub phases: [MotionPolynomial; 7],
    pub case: ProfileCase,
    /// Total time of brake and main phases.
    pub duration: f64,
    /// State at `duration`.
    pub end: AxisState,
}

/// `(jerk, duration)` of one phase before it is chained onto a start state.
pub(crate) type Segment = (f64, f64);

impl Profile {
    /// Chains `brake` and `main` segments onto `start`.
    pub(crate) fn build(
        start: AxisState,
        brake: &[Segment],
        main: &[Segment],
        case: ProfileCase,
    ) -> Self {
        let mut profile = Profile {
            case,
            ..Profile::default()
        };
        let mut state = (start.pos, start.vel, start.acc);
        let mut duration = 0.0;

        for (slot, &(jrk, time)) in profile.brake.iter_mut().zip(brake) {
            *slot = MotionPolynomial::new(time, state.0, state.1, state.2, jrk);
            state = slot.end();
            duration += time;
        }
        // unused slots still carry the running state so lookups stay continuous
        for slot in profile.brake.iter_mut().skip(brake.len()) {
            *slot = MotionPolynomial::new(0.0, state.0, state.1, state.2, 0.0);
        }
        for (slot, &(jrk, time)) in profile.phases.iter_mut().zip(main) {
            *slot = MotionPolynomial::new(time, state.0, state.1, state.2, jrk);
            state = slot.end();
            duration += time;
        }
        for slot in profile.phases.iter_mut().skip(main.len()) {
            *slot = MotionPolynomial::new(0.0, state.0, state.1, state.2, 0.0);
        }

        profile.duration = duration;
        profile.end = AxisState::from_tuple(state);
        profile
    }

    pub fn start(&self) -> AxisState {
        let first = &self.brake[0];
        AxisState::new(first.pos, first.vel, first.acc)
    }

    /// State where the main profile begins (after braking).
    pub fn main_start(&self) -> AxisState {
        let first = &self.phases[0];
        AxisState::new(first.pos, first.vel, first.acc)
    }

    pub fn brake_duration(&self) -> f64 {
        self.brake.iter().map(|p| p.time).sum()
    }

    /// Phases with non-zero duration, in time order.
    pub fn active_phases(&self) -> impl Iterator<Item = &MotionPolynomial> {
        self.brake
            .iter()
            .chain(self.phases.iter())
            .filter(|p| p.time > 0.0)
    }

    /// State at time `t` from the start of the profile.
    ///
    /// Past `duration` the end state is extrapolated with zero jerk.
    pub fn state_at(&self, t: f64) -> AxisState {
        let mut t = t.max(0.0);
        for phase in self.active_phases() {
            if t <= phase.time {
                return AxisState::from_tuple(phase.at(t));
            }
            t -= phase.time;
        }
        let tail = MotionPolynomial::new(t, self.end.pos, self.end.vel, self.end.acc, 0.0);
        AxisState::from_tuple(tail.end())
    }

    /// `(min, t_min, max, t_max)` of the position over the profile followed by
    /// `hold` seconds of zero-jerk extrapolation.
    pub fn position_extrema(&self, hold: f64) -> (f64, f64, f64, f64) {
        let start = self.start();
        let mut ext = (start.pos, 0.0, start.pos, 0.0);
        let mut offset = 0.0;

        let mut visit = |phase: &MotionPolynomial, offset: f64| {
            let (p_end, _, _) = phase.end();
            let mut candidates = [(phase.time, p_end), (0.0, 0.0), (0.0, 0.0)];
            let mut n = 1;
            for t in phase.velocity_roots().into_iter().flatten() {
                candidates[n] = (t, phase.at(t).0);
                n += 1;
            }
            for &(t, p) in &candidates[..n] {
                if p < ext.0 {
                    ext.0 = p;
                    ext.1 = offset + t;
                }
                if p > ext.2 {
                    ext.2 = p;
                    ext.3 = offset + t;
                }
            }
        };

        for phase in self.active_phases() {
            visit(phase, offset);
            offset += phase.time;
        }
        if hold > 0.0 {
            let tail = MotionPolynomial::new(hold, self.end.pos, self.end.vel, self.end.acc, 0.0);
            visit(&tail, offset);
        }
        ext
    }

    /// Checks the main phases against `limits`; the brake prefix is exempt.
    ///
    /// Velocity bounds are skipped when `check_velocity` is false (velocity control).
    pub fn respects(&self, limits: &AxisLimits, check_velocity: bool) -> bool {
        let v_tol = 1e-8 * (1.0 + limits.max_velocity.abs().max(limits.min_velocity.abs()));
        let a_tol = 1e-8 * (1.0 + limits.max_acceleration.max(-limits.min_acceleration));
        let j_tol = 1e-9 * limits.max_jerk;

        self.phases.iter().filter(|p| p.time > 0.0).all(|phase| {
            if !phase.time.is_finite() || phase.jrk.abs() > limits.max_jerk + j_tol {
                return false;
            }
            let (_, _, a_end) = phase.end();
            let a_ok = phase.acc.max(a_end) <= limits.max_acceleration + a_tol
                && phase.acc.min(a_end) >= limits.min_acceleration - a_tol;
            if !a_ok {
                return false;
            }
            if !check_velocity {
                return true;
            }
            let (v_lo, v_hi) = phase.velocity_bounds();
            v_hi <= limits.max_velocity + v_tol && v_lo >= limits.min_velocity - v_tol
        })
    }

    /// Same phase durations with jerk (and so velocity, acceleration and
    /// displacement) multiplied by `factor`, starting from `start`.
    pub fn scaled(&self, factor: f64, start: AxisState) -> Self {
        let mut main = [(0.0, 0.0); 7];
        for (dst, src) in main.iter_mut().zip(&self.phases) {
            *dst = (src.jrk * factor, src.time);
        }
        Self::build(start, &[], &main, ProfileCase::Scaled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn rest_to_rest() -> Profile {
        // +j, 0, -j, cruise, -j, 0, +j with j = 1
        let main = [
            (1.0, 1.0),
            (0.0, 1.0),
            (-1.0, 1.0),
            (0.0, 2.0),
            (-1.0, 1.0),
            (0.0, 1.0),
            (1.0, 1.0),
        ];
        Profile::build(AxisState::default(), &[], &main, ProfileCase::CruiseAtLimit)
    }

    #[test]
    fn build_chains_phase_states() {
        let profile = rest_to_rest();
        assert_abs_diff_eq!(profile.duration, 8.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.end.vel, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.end.acc, 0.0, epsilon = 1e-12);
        // peak velocity 2, ramps cover 3 each way, cruise 4
        assert_abs_diff_eq!(profile.end.pos, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(profile.state_at(4.0).vel, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn extrapolates_past_the_end() {
        let profile = Profile::build(
            AxisState::new(1.0, 1.0, 0.0),
            &[],
            &[(0.0, 1.0)],
            ProfileCase::VelocityShift,
        );
        let s = profile.state_at(3.0);
        assert_abs_diff_eq!(s.pos, 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(s.vel, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn extrema_find_reversal_point() {
        // moving backwards at 1 m/s, then accelerating forward at 1 m/s^2
        let profile = Profile::build(
            AxisState::new(0.0, -1.0, 1.0),
            &[],
            &[(0.0, 3.0)],
            ProfileCase::PeakVelocity,
        );
        let (min, t_min, max, _) = profile.position_extrema(0.0);
        assert_abs_diff_eq!(t_min, 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(min, -0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(max, 1.5, epsilon = 1e-12);
    }

    #[test]
    fn respects_detects_overspeed() {
        let profile = rest_to_rest();
        assert!(profile.respects(&AxisLimits::new(2.0, 1.0, 1.0), true));
        assert!(!profile.respects(&AxisLimits::new(1.5, 1.0, 1.0), true));
        assert!(profile.respects(&AxisLimits::new(1.5, 1.0, 1.0), false));
        assert!(!profile.respects(&AxisLimits::new(2.0, 0.5, 1.0), true));
    }

    #[test]
    fn scaling_keeps_timing() {
        let profile = rest_to_rest();
        let half = profile.scaled(0.5, AxisState::new(1.0, 0.0, 0.0));
        assert_abs_diff_eq!(half.duration, profile.duration, epsilon = 1e-12);
        assert_abs_diff_eq!(half.end.pos, 6.0, epsilon = 1e-12);
    }
}
