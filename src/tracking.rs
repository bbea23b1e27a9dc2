//! Following a moving target state.
//!
//! Every cycle the caller samples its target function and hands the sample to
//! [`TrackingGenerator::update`]. The sample is blended into the committed
//! target by the reactiveness factor and the wrapped online generator re-plans
//! a minimal-time trajectory towards it.

use crate::config::GeneratorConfig;
use crate::error::{OtgError, Result};
use crate::input::{ControlInterface, InputParameter, Synchronization};
use crate::online::OnlineGenerator;
use crate::output::{OutputParameter, Status};
use crate::state::{AxisLimits, AxisState, KinematicState};
use crate::vector::AxisVector;

/// Sampled state of the moving target.
pub type TargetState<V> = KinematicState<V>;

#[derive(Debug, Clone)]
pub struct TrackingGenerator<V> {
    otg: OnlineGenerator<V>,
    reactiveness: f64,
    committed: Option<KinematicState<V>>,
    request: InputParameter<V>,
}

impl<V: AxisVector> TrackingGenerator<V> {
    /// Tracking generator with reactiveness 1.
    pub fn new(dofs: usize, delta_time: f64) -> Self {
        Self {
            otg: OnlineGenerator::new(dofs, delta_time),
            reactiveness: 1.0,
            committed: None,
            request: InputParameter::new(dofs),
        }
    }

    pub fn from_config(dofs: usize, config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        let mut tracking = Self::new(dofs, config.delta_time);
        tracking.reactiveness = config.reactiveness;
        Ok(tracking)
    }

    pub fn reactiveness(&self) -> f64 {
        self.reactiveness
    }

    /// Share of the gap to a new sample committed per cycle, in `[0, 1]`.
    pub fn set_reactiveness(&mut self, reactiveness: f64) -> Result<()> {
        if !(0.0..=1.0).contains(&reactiveness) {
            return Err(OtgError::invalid(format!("reactiveness {reactiveness} is outside [0, 1]")));
        }
        self.reactiveness = reactiveness;
        Ok(())
    }

    pub fn output(&self) -> OutputParameter<V> {
        self.otg.output()
    }

    /// Forgets the committed target; the next cycle starts from the current state.
    pub fn reset(&mut self) {
        self.committed = None;
    }

    /// Runs one cycle towards `sample`.
    ///
    /// Only the current state, limits and position window of `input` are used;
    /// axes are never synchronized.
    /// Reaching the committed target is reported as `Working`: tracking never
    /// finishes on its own.
    pub fn update(
        &mut self,
        sample: &TargetState<V>,
        input: &InputParameter<V>,
        output: &mut OutputParameter<V>,
    ) -> Status {
        let dofs = input.dofs();
        let position_control = input.control_interface == ControlInterface::Position;
        let committed = self.committed.get_or_insert_with(|| input.current_state());

        self.request.clone_from(input);
        self.request.intermediate_positions.clear();
        self.request.per_section_minimum_duration = None;
        self.request.minimum_duration = None;
        // each axis tracks its own target as fast as it can
        self.request.synchronization = Synchronization::None;

        for dof in 0..dofs {
            let previous = committed.axis(dof);
            let wanted = sample.axis(dof);
            let r = self.reactiveness;
            let blended = AxisState::new(
                previous.pos + r * (wanted.pos - previous.pos),
                previous.vel + r * (wanted.vel - previous.vel),
                previous.acc + r * (wanted.acc - previous.acc),
            );
            committed.set_axis(dof, blended);

            let target = reachable(blended, &input.axis_limits(dof), window(input, dof), position_control);
            self.request.target_position[dof] = target.pos;
            self.request.target_velocity[dof] = target.vel;
            self.request.target_acceleration[dof] = target.acc;
        }

        match self.otg.update(&self.request, output) {
            Status::Finished => Status::Working,
            status => status,
        }
    }
}

fn window<V: AxisVector>(input: &InputParameter<V>, dof: usize) -> (f64, f64) {
    (
        input.min_position.as_ref().map_or(f64::NEG_INFINITY, |lo| lo[dof]),
        input.max_position.as_ref().map_or(f64::INFINITY, |hi| hi[dof]),
    )
}

/// Clamps a target into the position window and the kinematic limits.
///
/// Velocity bounds only apply under position control.
fn reachable(target: AxisState, limits: &AxisLimits, (lo, hi): (f64, f64), position_control: bool) -> AxisState {
    if target.pos < lo || target.pos > hi {
        // rest on the bound
        return AxisState::new(target.pos.max(lo).min(hi), 0.0, 0.0);
    }
    let pos = target.pos;
    let mut acc = target.acc.max(limits.min_acceleration).min(limits.max_acceleration);
    if !position_control {
        return AxisState::new(pos, target.vel, acc);
    }
    let vel = target.vel.max(limits.min_velocity).min(limits.max_velocity);

    // ramping the acceleration out must not cross a velocity limit
    let j2 = 2.0 * limits.max_jerk * (1.0 - 1e-9);
    if acc < 0.0 && vel + acc * acc / j2 > limits.max_velocity {
        acc = -((limits.max_velocity - vel) * j2).max(0.0).sqrt();
    } else if acc > 0.0 && vel - acc * acc / j2 < limits.min_velocity {
        acc = ((vel - limits.min_velocity) * j2).max(0.0).sqrt();
    }
    AxisState::new(pos, vel, acc)
}
