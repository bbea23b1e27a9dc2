//! Single-axis time-optimal S-curve planner.
//!
//! Every request is dispatched over a small set of canonical [`ProfileCase`]s.
//! Closed forms are used where they exist (cruise at a velocity limit, pure
//! velocity shift); the remaining cases are one-dimensional root finds over the
//! peak velocity, a peak acceleration or a hold time. All valid candidates
//! compete and the shortest one wins.
//!
//! The planner is stateless: it knows nothing about previous trajectories.

use crate::error::{OtgError, Result};
use crate::input::ControlInterface;
use crate::motion_polynomial::MotionPolynomial;
use crate::profile::{Profile, ProfileCase, Segment};
use crate::roots::{self, Bracket};
use crate::state::{AxisLimits, AxisState};

/// Solver for one axis with given limits and control interface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SCurve {
    limits: AxisLimits,
    interface: ControlInterface,
}

/// Brake prefix and the state where the main profile starts.
#[derive(Clone, Copy, Debug)]
struct Request {
    origin: AxisState,
    start: AxisState,
    target: AxisState,
    brake: [Segment; 4],
    brake_len: usize,
}

impl Request {
    fn brake(&self) -> &[Segment] {
        &self.brake[..self.brake_len]
    }

    fn brake_duration(&self) -> f64 {
        self.brake().iter().map(|s| s.1).sum()
    }
}

/// Acceleration path `a0 -> a1 -> a2 -> af` ramped with jerk `sign`, `-sign`,
/// `sign`, holding `h1` at the first peak and `h2` at the second.
#[derive(Clone, Copy, Debug)]
struct TwoPeak {
    sign: f64,
    a1: f64,
    h1: f64,
    a2: f64,
    h2: f64,
}

/// Peaks of a minimal-time two-peak profile that hold at their limit.
#[derive(Clone, Copy, Debug)]
enum Holds {
    /// Both peaks turn at once. Parameter: first peak.
    Neither,
    /// Parameter: hold time at the first peak.
    First,
    /// Parameter: hold time at the second peak.
    Second,
    /// Parameter: hold time at the first peak.
    Both,
}

impl SCurve {
    // Physical constraints to avoid math overflow
    const T_MIN: f64 = 1e-12;
    const T_MAX: f64 = 31556736.0; // 1 year in seconds

    /// Residual tolerance of the root finder, relative to the travelled distance.
    const ROOT_TOLERANCE: f64 = 1e-10;
    /// Accepted end-state error, relative to the travelled distance.
    const END_TOLERANCE: f64 = 1e-7;
    /// Accepted error of a prescribed duration, relative to that duration.
    const DURATION_TOLERANCE: f64 = 1e-9;
    /// Jerk halvings tried before giving up on a reduced-jerk stretch.
    const JERK_HALVINGS: usize = 64;

    pub fn new(limits: AxisLimits, interface: ControlInterface) -> Self {
        Self { limits, interface }
    }

    pub fn limits(&self) -> &AxisLimits {
        &self.limits
    }

    /// Minimal-duration profile from `current` to `target`.
    pub fn minimum_time(&self, axis: usize, current: AxisState, target: AxisState) -> Result<Profile> {
        self.check_limits(axis)?;
        let request = self.request(current, target);

        match self.solve(&request) {
            Some(profile) => Ok(profile),
            None => {
                tracing::debug!(axis, ?current, ?target, "no profile case converged");
                Err(OtgError::DurationComputationFailed { axis })
            }
        }
    }

    /// Profile from `current` to `target` that takes exactly `duration`.
    ///
    /// The minimal-time profile at the lowest jerk that still arrives in time
    /// is preferred. When the minimal duration jumps over `duration` as the
    /// jerk falls, full-jerk profiles with a free cruise or hold are searched.
    ///
    /// `minimal` is the axis' minimal-duration profile. When no profile of the
    /// requested duration exists but the axis may wait at its target (target at
    /// rest, or velocity control with zero target acceleration), `minimal` is
    /// returned and the remaining time is spent holding the target state.
    pub fn fixed_duration(
        &self,
        axis: usize,
        current: AxisState,
        target: AxisState,
        minimal: &Profile,
        duration: f64,
    ) -> Result<Profile> {
        if duration <= minimal.duration + Self::T_MIN {
            return Ok(*minimal);
        }
        let request = self.request(current, target);
        let main_duration = duration - request.brake_duration();

        let stretched = self.reduced_jerk(&request, duration).or_else(|| match self.interface {
            ControlInterface::Position => self
                .stretch_cruise(&request, main_duration, minimal)
                .or_else(|| self.stretch_holds(&request, main_duration)),
            ControlInterface::Velocity => self.stretch_velocity(&request, main_duration, minimal),
        });
        if let Some(profile) = stretched {
            return Ok(profile);
        }
        if self.may_hold(&target) {
            return Ok(*minimal);
        }
        Err(OtgError::SynchronizationInfeasible { axis, duration })
    }

    /// Whether a profile that reaches `target` early may simply hold it.
    pub fn may_hold(&self, target: &AxisState) -> bool {
        target.acc == 0.0
            && (target.vel == 0.0 || self.interface == ControlInterface::Velocity)
    }

    fn check_limits(&self, axis: usize) -> Result<()> {
        let l = &self.limits;
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(l.max_jerk) || !positive(l.max_acceleration) || !(l.min_acceleration < 0.0) {
            return Err(OtgError::invalid(format!(
                "axis {axis}: acceleration and jerk limits must be non-degenerate"
            )));
        }
        if self.interface == ControlInterface::Position
            && (!positive(l.max_velocity) || l.min_velocity > 0.0)
        {
            return Err(OtgError::invalid(format!(
                "axis {axis}: velocity limits must satisfy min <= 0 < max"
            )));
        }
        Ok(())
    }

    fn is_at_target(&self, start: &AxisState, target: &AxisState) -> bool {
        let same_motion = start.vel == target.vel && start.acc == target.acc;
        match self.interface {
            ControlInterface::Position => same_motion && start.pos == target.pos && target.is_at_rest(),
            ControlInterface::Velocity => same_motion,
        }
    }

    /// Signed acceleration limit in the direction of `sign`.
    fn acc_limit(&self, sign: f64) -> f64 {
        if sign > 0.0 {
            self.limits.max_acceleration
        } else {
            self.limits.min_acceleration
        }
    }

    // -----------------------------------------------------------------
    //  Brake pre-profile
    // -----------------------------------------------------------------

    /// Brings a state that violates the limits back inside them.
    ///
    /// First the acceleration is ramped into `[min_acc, max_acc]`, then (position
    /// control only) the velocity it settles at is shifted into the velocity band.
    fn request(&self, current: AxisState, target: AxisState) -> Request {
        let l = &self.limits;
        let j = l.max_jerk;
        let mut brake = [(0.0, 0.0); 4];
        let mut n = 0;
        let mut state = current;

        if state.acc > l.max_acceleration {
            brake[n] = (-j, (state.acc - l.max_acceleration) / j);
            n += 1;
        } else if state.acc < l.min_acceleration {
            brake[n] = (j, (l.min_acceleration - state.acc) / j);
            n += 1;
        }
        state = chain_end(current, &brake[..n]);

        if self.interface == ControlInterface::Position {
            let settle = state.vel + state.acc * state.acc.abs() / (2.0 * j);
            let bound = if settle > l.max_velocity {
                Some(l.max_velocity)
            } else if settle < l.min_velocity {
                Some(l.min_velocity)
            } else {
                None
            };
            if let Some(v) = bound {
                let shift = self.velocity_shift(state.acc, 0.0, v - state.vel);
                brake[n..n + 3].copy_from_slice(&shift);
                n += 3;
                state = chain_end(current, &brake[..n]);
            }
        }

        Request {
            origin: current,
            start: state,
            target,
            brake,
            brake_len: n,
        }
    }

    // -----------------------------------------------------------------
    //  Case dispatch
    // -----------------------------------------------------------------

    /// Shortest valid profile over all cases of the control interface.
    fn solve(&self, req: &Request) -> Option<Profile> {
        if self.is_at_target(&req.start, &req.target) {
            return Some(Profile::build(req.origin, req.brake(), &[], ProfileCase::AtTarget));
        }

        let cases: &[ProfileCase] = match self.interface {
            ControlInterface::Velocity => &[ProfileCase::VelocityShift],
            ControlInterface::Position => &[
                ProfileCase::CruiseAtLimit,
                ProfileCase::PeakVelocity,
                ProfileCase::TwoPeak,
            ],
        };

        let mut best: Option<Profile> = None;
        for &case in cases {
            self.solve_case(case, req, &mut best);
        }
        best
    }

    fn solve_case(&self, case: ProfileCase, req: &Request, best: &mut Option<Profile>) {
        let distance = req.target.pos - req.start.pos;
        let tolerance = Self::ROOT_TOLERANCE * (1.0 + distance.abs());

        match case {
            ProfileCase::VelocityShift => {
                let shift =
                    self.velocity_shift(req.start.acc, req.target.acc, req.target.vel - req.start.vel);
                self.consider(req, &shift, case, best);
            }
            ProfileCase::CruiseAtLimit => {
                for v_peak in [self.limits.max_velocity, self.limits.min_velocity] {
                    if v_peak == 0.0 {
                        continue;
                    }
                    let mut segments = self.peak_velocity(req, v_peak, 0.0);
                    let ramps = chain_end(req.start, &segments).pos - req.start.pos;
                    let cruise = (distance - ramps) / v_peak;
                    if cruise >= 0.0 {
                        segments[3] = (0.0, Self::safe_t(cruise));
                        self.consider(req, &segments, case, best);
                    }
                }
            }
            ProfileCase::PeakVelocity => {
                let residual = |v_peak: f64| {
                    let segments = self.peak_velocity(req, v_peak, 0.0);
                    Some(chain_end(req.start, &segments).pos - req.target.pos)
                };
                let brackets = roots::scan(
                    self.limits.min_velocity,
                    self.limits.max_velocity,
                    &[req.start.vel, req.target.vel, 0.0],
                    residual,
                );
                for bracket in brackets.as_slice() {
                    if let Some(v_peak) = roots::refine(*bracket, tolerance, residual) {
                        let segments = self.peak_velocity(req, v_peak, 0.0);
                        self.consider(req, &segments, case, best);
                    }
                }
            }
            ProfileCase::TwoPeak => {
                for sign in [1.0, -1.0] {
                    for (holds, root) in [
                        (Holds::Neither, 1.0),
                        (Holds::Neither, -1.0),
                        (Holds::First, 1.0),
                        (Holds::First, -1.0),
                        (Holds::Second, 1.0),
                        (Holds::Second, -1.0),
                        (Holds::Both, 1.0),
                    ] {
                        self.solve_two_peak(req, sign, holds, root, tolerance, best);
                    }
                }
            }
            ProfileCase::AtTarget | ProfileCase::Stretched | ProfileCase::Scaled => {}
        }
    }

    /// Root find over the free parameter of one two-peak family.
    fn solve_two_peak(
        &self,
        req: &Request,
        sign: f64,
        holds: Holds,
        root: f64,
        tolerance: f64,
        best: &mut Option<Profile>,
    ) {
        let (lo, hi) = self.two_peak_domain(req, sign, holds);
        if !(hi > lo) {
            return;
        }
        let segments_for =
            |x: f64| self.two_peak_member(req, sign, holds, root, x).and_then(|p| self.two_peak(req, p));
        let residual =
            |x: f64| segments_for(x).map(|segments| chain_end(req.start, &segments).pos - req.target.pos);

        let brackets = roots::scan(lo, hi, &[0.0, req.target.acc], residual);
        for bracket in brackets.as_slice() {
            if let Some(segments) = roots::refine(*bracket, tolerance, residual).and_then(segments_for) {
                self.consider(req, &segments, ProfileCase::TwoPeak, best);
            }
        }
    }

    /// Two-peak profile with parameter `x` whose velocity change matches the
    /// request. `root` picks the sign of the peak solved from the velocity
    /// equation.
    fn two_peak_member(&self, req: &Request, sign: f64, holds: Holds, root: f64, x: f64) -> Option<TwoPeak> {
        let j = self.limits.max_jerk;
        let (a0, af) = (req.start.acc, req.target.acc);
        let dv = req.target.vel - req.start.vel;
        let base = 0.5 * (af * af - a0 * a0);
        let near = self.acc_limit(sign);
        let far = self.acc_limit(-sign);
        let peak = |square: f64| (square >= 0.0).then(|| root * square.sqrt());

        let member = match holds {
            Holds::Neither => TwoPeak {
                sign,
                a1: x,
                h1: 0.0,
                a2: peak(x * x + base - sign * j * dv)?,
                h2: 0.0,
            },
            Holds::First => TwoPeak {
                sign,
                a1: near,
                h1: x,
                a2: peak(near * near + base - sign * j * (dv - near * x))?,
                h2: 0.0,
            },
            Holds::Second => TwoPeak {
                sign,
                a1: peak(far * far - base + sign * j * (dv - far * x))?,
                h1: 0.0,
                a2: far,
                h2: x,
            },
            Holds::Both => {
                let ramps = sign * (2.0 * near * near - 2.0 * far * far - a0 * a0 + af * af) / (2.0 * j);
                TwoPeak {
                    sign,
                    a1: near,
                    h1: x,
                    a2: far,
                    h2: (dv - ramps - near * x) / far,
                }
            }
        };
        Some(member)
    }

    /// Parameter interval of a two-peak family.
    ///
    /// Holds are bounded by the velocity band they would sweep and by the
    /// acceleration range the other peak can reach.
    fn two_peak_domain(&self, req: &Request, sign: f64, holds: Holds) -> (f64, f64) {
        let l = &self.limits;
        let j = l.max_jerk;
        let (a0, af) = (req.start.acc, req.target.acc);
        let dv = req.target.vel - req.start.vel;
        let base = 0.5 * (af * af - a0 * a0);
        let near = self.acc_limit(sign);
        let far = self.acc_limit(-sign);
        let span = l.max_velocity - l.min_velocity;
        let widest = l.max_acceleration.max(-l.min_acceleration);

        match holds {
            Holds::Neither => (a0.min(near), a0.max(near)),
            Holds::First => {
                let square = near * near + base - sign * j * dv;
                (0.0, (span.min((widest * widest - square) / j) / near.abs()).max(0.0))
            }
            Holds::Second => {
                let square = far * far - base + sign * j * dv;
                (0.0, (span.min((widest * widest - square) / j) / far.abs()).max(0.0))
            }
            Holds::Both => {
                let ramps = sign * (2.0 * near * near - 2.0 * far * far - a0 * a0 + af * af) / (2.0 * j);
                let lo = (sign * (dv - ramps) / near.abs()).max(0.0);
                (lo, lo.max(span / near.abs()))
            }
        }
    }

    /// Keeps `segments` in `best` if they reach the target within limits faster.
    fn consider(&self, req: &Request, segments: &[Segment], case: ProfileCase, best: &mut Option<Profile>) {
        let profile = Profile::build(req.origin, req.brake(), segments, case);
        if !self.accepts(&profile, &req.target) {
            return;
        }
        if best.as_ref().map_or(true, |b| profile.duration < b.duration) {
            *best = Some(profile);
        }
    }

    fn accepts(&self, profile: &Profile, target: &AxisState) -> bool {
        let check_velocity = self.interface == ControlInterface::Position;
        if !profile.duration.is_finite() || !profile.respects(&self.limits, check_velocity) {
            return false;
        }
        let end = &profile.end;
        let vel_ok = (end.vel - target.vel).abs() <= Self::END_TOLERANCE * (1.0 + target.vel.abs());
        let acc_ok = (end.acc - target.acc).abs() <= Self::END_TOLERANCE * (1.0 + target.acc.abs());
        let pos_ok = !check_velocity || {
            let distance = (target.pos - profile.start().pos).abs();
            (end.pos - target.pos).abs() <= Self::END_TOLERANCE * (1.0 + distance)
        };
        vel_ok && acc_ok && pos_ok
    }

    fn takes(profile: &Profile, duration: f64) -> bool {
        (profile.duration - duration).abs() <= Self::DURATION_TOLERANCE * (1.0 + duration)
    }

    // -----------------------------------------------------------------
    //  Fixed-duration solves
    // -----------------------------------------------------------------

    /// Minimal-time profile at the lowest jerk that arrives after `duration`.
    ///
    /// The minimal duration grows as the jerk falls. The jerk is halved until
    /// the profile becomes too slow, then the bracket is refined in log-jerk.
    /// The brake prefix keeps the full jerk.
    fn reduced_jerk(&self, req: &Request, duration: f64) -> Option<Profile> {
        let fastest = |log_jerk: f64| {
            let limits = AxisLimits {
                max_jerk: log_jerk.exp(),
                ..self.limits
            };
            SCurve::new(limits, self.interface).solve(req)
        };
        let residual = |log_jerk: f64| fastest(log_jerk).map(|p| p.duration - duration);

        let hi = self.limits.max_jerk.ln();
        let f_hi = residual(hi)?;
        if f_hi >= 0.0 {
            return None;
        }
        let mut lo = hi;
        let mut f_lo = f_hi;
        for _ in 0..Self::JERK_HALVINGS {
            lo -= std::f64::consts::LN_2;
            f_lo = residual(lo)?;
            if f_lo >= 0.0 {
                break;
            }
        }
        if f_lo < 0.0 {
            return None;
        }

        let bracket = Bracket { lo, hi, f_lo, f_hi };
        let log_jerk = roots::refine(bracket, Self::ROOT_TOLERANCE * (1.0 + duration), residual)?;
        let mut profile = fastest(log_jerk)?;
        if !Self::takes(&profile, duration) {
            // the minimal duration jumped over the requested one
            return None;
        }
        profile.case = ProfileCase::Stretched;
        Some(profile)
    }

    /// Peak-velocity profile whose cruise absorbs the extra time.
    ///
    /// The peak of `minimal` is sampled too: for durations barely above the
    /// minimum the root sits right next to it.
    fn stretch_cruise(&self, req: &Request, duration: f64, minimal: &Profile) -> Option<Profile> {
        let distance = req.target.pos - req.start.pos;
        let tolerance = Self::ROOT_TOLERANCE * (1.0 + distance.abs());

        let cruise_for = |v_peak: f64| {
            let segments = self.peak_velocity(req, v_peak, 0.0);
            let ramps: f64 = segments.iter().map(|s| s.1).sum();
            let cruise = duration - ramps;
            (cruise >= 0.0).then_some((segments, cruise))
        };
        let residual = |v_peak: f64| {
            let (segments, cruise) = cruise_for(v_peak)?;
            Some(chain_end(req.start, &segments).pos + v_peak * cruise - req.target.pos)
        };

        let brackets = roots::scan(
            self.limits.min_velocity,
            self.limits.max_velocity,
            &[req.start.vel, req.target.vel, 0.0, minimal.phases[3].vel],
            residual,
        );

        let mut chosen: Option<(f64, Profile)> = None;
        for bracket in brackets.as_slice() {
            let Some(v_peak) = roots::refine(*bracket, tolerance, residual) else {
                continue;
            };
            let Some((mut segments, cruise)) = cruise_for(v_peak) else {
                continue;
            };
            segments[3] = (0.0, cruise);
            let profile = Profile::build(req.origin, req.brake(), &segments, ProfileCase::Stretched);
            if !self.accepts(&profile, &req.target) {
                continue;
            }
            if chosen.as_ref().map_or(true, |(v, _)| v_peak.abs() < *v) {
                chosen = Some((v_peak.abs(), profile));
            }
        }
        chosen.map(|(_, profile)| profile)
    }

    /// Two-peak profile holding one peak at a free acceleration for the time
    /// left over by the ramps.
    fn stretch_holds(&self, req: &Request, duration: f64) -> Option<Profile> {
        let j = self.limits.max_jerk;
        let (a0, af) = (req.start.acc, req.target.acc);
        let dv = req.target.vel - req.start.vel;
        let distance = req.target.pos - req.start.pos;
        let tolerance = Self::ROOT_TOLERANCE * (1.0 + distance.abs());
        let total = duration + req.brake_duration();

        let mut chosen: Option<(f64, Profile)> = None;
        for sign in [1.0, -1.0] {
            for hold_first in [true, false] {
                // x is the held peak; the other peak follows from the duration
                // and the velocity change
                let segments_for = |x: f64| {
                    let (a1, a2) = if hold_first {
                        let c = 0.5 * (2.0 * x * x - a0 * a0 + af * af) + sign * j * x * duration
                            - x * (2.0 * x - a0 + af)
                            - sign * j * dv;
                        let square = x * x + c;
                        (square >= 0.0).then(|| (x, x - sign * square.sqrt()))?
                    } else {
                        let c = 0.5 * (-2.0 * x * x - a0 * a0 + af * af) + sign * j * x * duration
                            - x * (-2.0 * x - a0 + af)
                            - sign * j * dv;
                        let square = x * x - c;
                        (square >= 0.0).then(|| (x + sign * square.sqrt(), x))?
                    };
                    let hold = duration - sign * (2.0 * a1 - 2.0 * a2 - a0 + af) / j;
                    let (h1, h2) = if hold_first { (hold, 0.0) } else { (0.0, hold) };
                    self.two_peak(req, TwoPeak { sign, a1, h1, a2, h2 })
                };
                let residual =
                    |x: f64| segments_for(x).map(|segments| chain_end(req.start, &segments).pos - req.target.pos);

                let brackets = roots::scan(
                    self.limits.min_acceleration,
                    self.limits.max_acceleration,
                    &[a0, af, 0.0],
                    residual,
                );
                for bracket in brackets.as_slice() {
                    let Some(x) = roots::refine(*bracket, tolerance, residual) else {
                        continue;
                    };
                    let Some(segments) = segments_for(x) else {
                        continue;
                    };
                    let profile = Profile::build(req.origin, req.brake(), &segments, ProfileCase::Stretched);
                    if !self.accepts(&profile, &req.target) || !Self::takes(&profile, total) {
                        continue;
                    }
                    if chosen.as_ref().map_or(true, |(a, _)| x.abs() < *a) {
                        chosen = Some((x.abs(), profile));
                    }
                }
            }
        }
        chosen.map(|(_, profile)| profile)
    }

    /// Single acceleration plateau whose height is chosen to take `duration`.
    fn stretch_velocity(&self, req: &Request, duration: f64, minimal: &Profile) -> Option<Profile> {
        let (a0, a1) = (req.start.acc, req.target.acc);
        let dv = req.target.vel - req.start.vel;
        let tolerance = Self::ROOT_TOLERANCE * (1.0 + dv.abs());

        let segments_for = |a_peak: f64| {
            let (ramp_in, ramp_out, area) = self.plateau(a0, a1, a_peak);
            let hold = duration - ramp_in.1 - ramp_out.1;
            (hold >= 0.0).then_some(([ramp_in, (0.0, hold), ramp_out], area + a_peak * hold))
        };
        let residual = |a_peak: f64| segments_for(a_peak).map(|(_, gained)| gained - dv);

        let brackets = roots::scan(
            self.limits.min_acceleration,
            self.limits.max_acceleration,
            &[a0, a1, 0.0, minimal.phases[1].acc],
            residual,
        );

        let mut chosen: Option<(f64, Profile)> = None;
        for bracket in brackets.as_slice() {
            let Some(a_peak) = roots::refine(*bracket, tolerance, residual) else {
                continue;
            };
            let Some((segments, _)) = segments_for(a_peak) else {
                continue;
            };
            let profile = Profile::build(req.origin, req.brake(), &segments, ProfileCase::Stretched);
            if !self.accepts(&profile, &req.target) {
                continue;
            }
            if chosen.as_ref().map_or(true, |(a, _)| a_peak.abs() < *a) {
                chosen = Some((a_peak.abs(), profile));
            }
        }
        chosen.map(|(_, profile)| profile)
    }

    // -----------------------------------------------------------------
    //  Segment builders
    // -----------------------------------------------------------------

    /// `start -> (v_peak, 0) -> cruise -> target` as seven segments.
    fn peak_velocity(&self, req: &Request, v_peak: f64, cruise: f64) -> [Segment; 7] {
        let up = self.velocity_shift(req.start.acc, 0.0, v_peak - req.start.vel);
        let down = self.velocity_shift(0.0, req.target.acc, req.target.vel - v_peak);
        [up[0], up[1], up[2], (0.0, cruise), down[0], down[1], down[2]]
    }

    /// Five segments of `p`, or `None` if its peaks are out of order or out of
    /// limits, or a hold is negative.
    fn two_peak(&self, req: &Request, p: TwoPeak) -> Option<[Segment; 5]> {
        let l = &self.limits;
        let j = l.max_jerk;
        let (a0, af) = (req.start.acc, req.target.acc);
        let eps = Self::ROOT_TOLERANCE * (1.0 + l.max_acceleration.max(-l.min_acceleration));

        let ordered = p.sign * (p.a1 - a0) >= -eps
            && p.sign * (p.a1 - p.a2) >= -eps
            && p.sign * (af - p.a2) >= -eps;
        let inside = |a: f64| a <= l.max_acceleration + eps && a >= l.min_acceleration - eps;
        let holds_ok = p.h1 >= -Self::T_MIN && p.h2 >= -Self::T_MIN && p.h1.is_finite() && p.h2.is_finite();
        if !ordered || !inside(p.a1) || !inside(p.a2) || !holds_ok {
            return None;
        }

        let ramp = |from: f64, to: f64| Self::safe_t((to - from).abs() / j);
        Some([
            (p.sign * j, ramp(a0, p.a1)),
            (0.0, Self::safe_t(p.h1)),
            (-p.sign * j, ramp(p.a1, p.a2)),
            (0.0, Self::safe_t(p.h2)),
            (p.sign * j, ramp(p.a2, af)),
        ])
    }

    /// Ramps `a0 -> a_peak` and `a_peak -> a1` at full jerk, with the velocity
    /// they gain together.
    fn plateau(&self, a0: f64, a1: f64, a_peak: f64) -> (Segment, Segment, f64) {
        let j = self.limits.max_jerk;
        let t_in = Self::safe_t((a_peak - a0).abs() / j);
        let t_out = Self::safe_t((a1 - a_peak).abs() / j);
        let area = 0.5 * (a0 + a_peak) * t_in + 0.5 * (a_peak + a1) * t_out;
        (
            (Self::jerk_towards(a0, a_peak, j), t_in),
            (Self::jerk_towards(a_peak, a1, j), t_out),
            area,
        )
    }

    /// Minimal-time change of velocity by `dv` while the acceleration moves
    /// from `a0` to `a1`: ramp, optional plateau at the acceleration limit, ramp.
    fn velocity_shift(&self, a0: f64, a1: f64, dv: f64) -> [Segment; 3] {
        let l = &self.limits;
        let j = l.max_jerk;

        // velocity gained by ramping straight from a0 to a1
        let direct = 0.5 * (a0 + a1) * (a1 - a0).abs() / j;
        let half_sq = 0.5 * (a0 * a0 + a1 * a1);

        let a_peak = if dv >= direct {
            (j * dv + half_sq).max(0.0).sqrt().min(l.max_acceleration)
        } else {
            let depth = (half_sq - j * dv).max(0.0).sqrt();
            (-depth).max(l.min_acceleration)
        };

        let (ramp_in, ramp_out, area) = self.plateau(a0, a1, a_peak);
        let hold = if a_peak.abs() > f64::EPSILON {
            Self::safe_t(((dv - area) / a_peak).max(0.0))
        } else {
            0.0
        };
        [ramp_in, (0.0, hold), ramp_out]
    }

    fn jerk_towards(from: f64, to: f64, j: f64) -> f64 {
        if to > from {
            j
        } else if to < from {
            -j
        } else {
            0.0
        }
    }

    /// Ensures time `t` is within [0.0 ... T_MAX], or zero if < T_MIN
    fn safe_t(t: f64) -> f64 {
        if t >= Self::T_MAX {
            Self::T_MAX
        } else if t >= Self::T_MIN {
            t
        } else {
            0.0
        }
    }
}

/// State reached after running `segments` from `start`.
pub(crate) fn chain_end(start: AxisState, segments: &[Segment]) -> AxisState {
    let mut state = (start.pos, start.vel, start.acc);
    for &(jrk, time) in segments {
        state = MotionPolynomial::new(time, state.0, state.1, state.2, jrk).end();
    }
    AxisState::from_tuple(state)
}
