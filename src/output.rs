//! Result record filled by the generator every control cycle.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::OtgError;
use crate::input::InputParameter;
use crate::state::KinematicState;
use crate::trajectory::Trajectory;
use crate::vector::{assign, AxisVector};

/// State of the online generator after a cycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Status {
    /// No cycle has run yet.
    #[default]
    Idle,
    /// The trajectory is being followed.
    Working,
    /// The end of the trajectory has been reached.
    Finished,
    ErrorInvalidInput,
    ErrorSynchronizationFailed,
    ErrorTrajectoryDuration,
    ErrorPositionalLimits,
}

impl Status {
    /// Finished or any error.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Status::Idle | Status::Working)
    }

    pub fn is_error(self) -> bool {
        matches!(
            self,
            Status::ErrorInvalidInput
                | Status::ErrorSynchronizationFailed
                | Status::ErrorTrajectoryDuration
                | Status::ErrorPositionalLimits
        )
    }
}

impl From<&OtgError> for Status {
    fn from(err: &OtgError) -> Self {
        match err {
            OtgError::InvalidInput(_) => Status::ErrorInvalidInput,
            OtgError::SynchronizationInfeasible { .. } => Status::ErrorSynchronizationFailed,
            OtgError::DurationComputationFailed { .. } => Status::ErrorTrajectoryDuration,
            OtgError::PositionalLimits { .. } => Status::ErrorPositionalLimits,
        }
    }
}

/// New kinematic state and bookkeeping of one cycle.
#[derive(Clone, Debug)]
pub struct OutputParameter<V> {
    /// Time on the current trajectory in seconds.
    pub time: f64,

    pub new_position: V,
    pub new_velocity: V,
    pub new_acceleration: V,

    /// A new trajectory was calculated in this cycle.
    pub new_calculation: bool,
    /// A re-plan was due but exceeded its budget; the previous trajectory is kept.
    pub was_calculation_interrupted: bool,
    /// Duration of the last calculation in microseconds.
    pub calculation_duration: f64,

    pub trajectory: Trajectory<V>,
    pub status: Status,
}

impl<V: AxisVector> OutputParameter<V> {
    pub fn new(dofs: usize) -> Self {
        Self::with_capacity(dofs, 0)
    }

    /// Output whose trajectory has room for `waypoints` intermediate positions.
    pub fn with_capacity(dofs: usize, waypoints: usize) -> Self {
        Self {
            time: 0.0,
            new_position: V::zeros(dofs),
            new_velocity: V::zeros(dofs),
            new_acceleration: V::zeros(dofs),
            new_calculation: false,
            was_calculation_interrupted: false,
            calculation_duration: 0.0,
            trajectory: Trajectory::with_capacity(dofs, waypoints + 1),
            status: Status::Idle,
        }
    }

    pub fn new_state(&self) -> KinematicState<V> {
        KinematicState {
            position: self.new_position.clone(),
            velocity: self.new_velocity.clone(),
            acceleration: self.new_acceleration.clone(),
        }
    }

    pub(crate) fn set_state(&mut self, state: &KinematicState<V>) {
        assign(&mut self.new_position, &state.position);
        assign(&mut self.new_velocity, &state.velocity);
        assign(&mut self.new_acceleration, &state.acceleration);
    }

    /// Copies the new state into the current state of `input`.
    pub fn pass_to_input(&self, input: &mut InputParameter<V>) {
        assign(&mut input.current_position, &self.new_position);
        assign(&mut input.current_velocity, &self.new_velocity);
        assign(&mut input.current_acceleration, &self.new_acceleration);
    }
}
