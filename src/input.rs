//! Request record handed to the generator every control cycle.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{OtgError, Result};
use crate::state::{AxisLimits, AxisState, KinematicState};
use crate::vector::AxisVector;

/// Whether the target position is enforced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlInterface {
    /// Reach target position, velocity and acceleration.
    #[default]
    Position,
    /// Reach target velocity and acceleration; the position is free.
    Velocity,
}

/// How the finish times of multiple axes are aligned.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Synchronization {
    /// Every axis finishes at the same time.
    #[default]
    Time,
    /// Only axes with a moving target state are stretched to the common time.
    TimeIfNecessary,
    /// Every axis finishes at its own minimal time.
    None,
    /// Every axis shares one profile shape, scaled to its displacement.
    Phase,
}

/// Current state, target state and bounds of every axis.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InputParameter<V> {
    pub current_position: V,
    pub current_velocity: V,
    pub current_acceleration: V,

    pub target_position: V,
    pub target_velocity: V,
    pub target_acceleration: V,

    pub max_velocity: V,
    pub max_acceleration: V,
    pub max_jerk: V,

    /// Braking bounds, defaulting to the negated maxima.
    pub min_velocity: Option<V>,
    pub min_acceleration: Option<V>,

    pub min_position: Option<V>,
    pub max_position: Option<V>,

    /// Positions the trajectory must pass through before the target.
    pub intermediate_positions: Vec<V>,
    /// Lower bound on each block's duration, one entry per block.
    pub per_section_minimum_duration: Option<Vec<f64>>,
    /// Lower bound on the total duration.
    pub minimum_duration: Option<f64>,

    pub control_interface: ControlInterface,
    pub synchronization: Synchronization,

    /// Calculation budget in microseconds.
    pub interrupt_calculation_duration: Option<f64>,
}

impl<V: AxisVector> InputParameter<V> {
    /// Input for `dofs` axes at rest at the origin with zero limits.
    pub fn new(dofs: usize) -> Self {
        Self {
            current_position: V::zeros(dofs),
            current_velocity: V::zeros(dofs),
            current_acceleration: V::zeros(dofs),
            target_position: V::zeros(dofs),
            target_velocity: V::zeros(dofs),
            target_acceleration: V::zeros(dofs),
            max_velocity: V::zeros(dofs),
            max_acceleration: V::zeros(dofs),
            max_jerk: V::zeros(dofs),
            min_velocity: None,
            min_acceleration: None,
            min_position: None,
            max_position: None,
            intermediate_positions: Vec::new(),
            per_section_minimum_duration: None,
            minimum_duration: None,
            control_interface: ControlInterface::default(),
            synchronization: Synchronization::default(),
            interrupt_calculation_duration: None,
        }
    }

    pub fn dofs(&self) -> usize {
        self.current_position.dofs()
    }

    pub fn current_state(&self) -> KinematicState<V> {
        KinematicState {
            position: self.current_position.clone(),
            velocity: self.current_velocity.clone(),
            acceleration: self.current_acceleration.clone(),
        }
    }

    pub fn target_state(&self) -> KinematicState<V> {
        KinematicState {
            position: self.target_position.clone(),
            velocity: self.target_velocity.clone(),
            acceleration: self.target_acceleration.clone(),
        }
    }

    pub fn current_axis(&self, dof: usize) -> AxisState {
        AxisState::new(
            self.current_position[dof],
            self.current_velocity[dof],
            self.current_acceleration[dof],
        )
    }

    pub fn target_axis(&self, dof: usize) -> AxisState {
        AxisState::new(
            self.target_position[dof],
            self.target_velocity[dof],
            self.target_acceleration[dof],
        )
    }

    /// Limits of one axis with the minimum bounds resolved.
    pub fn axis_limits(&self, dof: usize) -> AxisLimits {
        let limits = AxisLimits::new(self.max_velocity[dof], self.max_acceleration[dof], self.max_jerk[dof]);
        let min_v = self.min_velocity.as_ref().map_or(limits.min_velocity, |v| v[dof]);
        let min_a = self.min_acceleration.as_ref().map_or(limits.min_acceleration, |v| v[dof]);
        limits.with_min(min_v, min_a)
    }

    /// Number of blocks the request decomposes into.
    pub fn sections(&self) -> usize {
        self.intermediate_positions.len() + 1
    }

    /// Checks array sizes, limit signs and target reachability.
    ///
    /// `waypoint_capacity` is the number of intermediate positions the generator
    /// reserved room for.
    pub fn validate(&self, waypoint_capacity: usize) -> Result<()> {
        let dofs = self.dofs();
        if dofs == 0 {
            return Err(OtgError::invalid("at least one degree of freedom is required"));
        }

        let sized = [
            ("current_velocity", &self.current_velocity),
            ("current_acceleration", &self.current_acceleration),
            ("target_position", &self.target_position),
            ("target_velocity", &self.target_velocity),
            ("target_acceleration", &self.target_acceleration),
            ("max_velocity", &self.max_velocity),
            ("max_acceleration", &self.max_acceleration),
            ("max_jerk", &self.max_jerk),
        ];
        for (name, values) in sized {
            check_len(name, values, dofs)?;
        }
        let optional = [
            ("min_velocity", &self.min_velocity),
            ("min_acceleration", &self.min_acceleration),
            ("min_position", &self.min_position),
            ("max_position", &self.max_position),
        ];
        for (name, values) in optional {
            if let Some(values) = values {
                check_len(name, values, dofs)?;
            }
        }

        let position_control = self.control_interface == ControlInterface::Position;
        for dof in 0..dofs {
            self.validate_axis(dof, position_control)?;
        }

        self.validate_waypoints(waypoint_capacity, position_control)?;

        if let Some(min) = self.minimum_duration {
            if !min.is_finite() || min < 0.0 {
                return Err(OtgError::invalid(format!("minimum_duration {min} must be a non-negative number")));
            }
        }
        if let Some(budget) = self.interrupt_calculation_duration {
            if !(budget > 0.0) {
                return Err(OtgError::invalid("interrupt_calculation_duration must be positive"));
            }
        }
        Ok(())
    }

    fn validate_axis(&self, dof: usize, position_control: bool) -> Result<()> {
        let l = self.axis_limits(dof);
        let current = self.current_axis(dof);
        let target = self.target_axis(dof);

        let finite = [current.pos, current.vel, current.acc, target.pos, target.vel, target.acc];
        if finite.iter().any(|v| !v.is_finite()) {
            return Err(OtgError::invalid(format!("axis {dof}: state must be finite")));
        }
        if !(l.max_jerk > 0.0) || !l.max_jerk.is_finite() {
            return Err(OtgError::invalid(format!("max_jerk[{dof}] must be positive")));
        }
        if !(l.max_acceleration > 0.0) || !l.max_acceleration.is_finite() {
            return Err(OtgError::invalid(format!("max_acceleration[{dof}] must be positive")));
        }
        if !(l.min_acceleration < 0.0) {
            return Err(OtgError::invalid(format!("min_acceleration[{dof}] must be negative")));
        }
        if position_control && (!(l.max_velocity > 0.0) || !l.max_velocity.is_finite()) {
            return Err(OtgError::invalid(format!("max_velocity[{dof}] must be positive")));
        }
        if l.min_velocity > 0.0 {
            return Err(OtgError::invalid(format!("min_velocity[{dof}] must not be positive")));
        }

        if target.acc > l.max_acceleration || target.acc < l.min_acceleration {
            return Err(OtgError::invalid(format!(
                "target_acceleration[{dof}] = {} is outside [{}, {}]",
                target.acc, l.min_acceleration, l.max_acceleration
            )));
        }
        if position_control {
            if target.vel > l.max_velocity || target.vel < l.min_velocity {
                return Err(OtgError::invalid(format!(
                    "target_velocity[{dof}] = {} is outside [{}, {}]",
                    target.vel, l.min_velocity, l.max_velocity
                )));
            }
            // the target acceleration must be reachable without crossing a velocity limit
            let swing = target.acc * target.acc / (2.0 * l.max_jerk);
            if (target.acc < 0.0 && target.vel + swing > l.max_velocity)
                || (target.acc > 0.0 && target.vel - swing < l.min_velocity)
            {
                return Err(OtgError::invalid(format!(
                    "target state of axis {dof} cannot be reached within the velocity limits"
                )));
            }
        }

        if let (Some(lo), Some(hi)) = (&self.min_position, &self.max_position) {
            if lo[dof] > hi[dof] {
                return Err(OtgError::invalid(format!("min_position[{dof}] exceeds max_position[{dof}]")));
            }
        }
        if position_control && !self.inside_window(dof, target.pos) {
            return Err(OtgError::invalid(format!("target_position[{dof}] is outside the position window")));
        }
        Ok(())
    }

    fn validate_waypoints(&self, capacity: usize, position_control: bool) -> Result<()> {
        let waypoints = self.intermediate_positions.len();
        if waypoints > 0 && !position_control {
            return Err(OtgError::invalid("intermediate positions require position control"));
        }
        if waypoints > capacity {
            return Err(OtgError::invalid(format!(
                "{waypoints} intermediate positions exceed the reserved capacity of {capacity}"
            )));
        }
        for (i, waypoint) in self.intermediate_positions.iter().enumerate() {
            check_len("intermediate_positions", waypoint, self.dofs())?;
            for dof in 0..self.dofs() {
                if !waypoint[dof].is_finite() || !self.inside_window(dof, waypoint[dof]) {
                    return Err(OtgError::invalid(format!(
                        "intermediate position {i} is invalid on axis {dof}"
                    )));
                }
            }
        }

        if let Some(floors) = &self.per_section_minimum_duration {
            if floors.len() != self.sections() {
                return Err(OtgError::invalid(format!(
                    "per_section_minimum_duration has {} entries, expected {}",
                    floors.len(),
                    self.sections()
                )));
            }
            if floors.iter().any(|t| !t.is_finite() || *t < 0.0) {
                return Err(OtgError::invalid("per_section_minimum_duration entries must be non-negative"));
            }
        }
        Ok(())
    }

    fn inside_window(&self, dof: usize, position: f64) -> bool {
        let above = self.min_position.as_ref().map_or(true, |lo| position >= lo[dof]);
        let below = self.max_position.as_ref().map_or(true, |hi| position <= hi[dof]);
        above && below
    }
}

fn check_len<V: AxisVector>(name: &str, values: &V, dofs: usize) -> Result<()> {
    if values.dofs() != dofs {
        return Err(OtgError::invalid(format!(
            "{name} has {} entries, expected {dofs}",
            values.dofs()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_axis() -> InputParameter<[f64; 1]> {
        let mut input = InputParameter::new(1);
        input.target_position = [5.0];
        input.max_velocity = [3.0];
        input.max_acceleration = [3.0];
        input.max_jerk = [4.0];
        input
    }

    #[test]
    fn accepts_plain_request() {
        assert_eq!(single_axis().validate(0), Ok(()));
    }

    #[test]
    fn min_limits_default_to_negated_max() {
        let input = single_axis();
        let limits = input.axis_limits(0);
        assert_eq!(limits.min_velocity, -3.0);
        assert_eq!(limits.min_acceleration, -3.0);
    }

    #[test]
    fn rejects_non_positive_jerk() {
        let mut input = single_axis();
        input.max_jerk = [0.0];
        assert!(matches!(input.validate(0), Err(OtgError::InvalidInput(_))));
    }

    #[test]
    fn rejects_mismatched_lengths() {
        let mut input = InputParameter::<Vec<f64>>::new(2);
        input.max_velocity = vec![1.0, 1.0];
        input.max_acceleration = vec![1.0, 1.0];
        input.max_jerk = vec![1.0];
        let err = input.validate(0).unwrap_err();
        assert!(err.to_string().contains("max_jerk"));
    }

    #[test]
    fn per_section_length_must_match_waypoints() {
        let mut input = single_axis();
        input.intermediate_positions = vec![[1.0]];
        input.per_section_minimum_duration = Some(vec![0.0]);
        assert!(input.validate(1).is_err());
        input.per_section_minimum_duration = Some(vec![0.0, 2.0]);
        assert_eq!(input.validate(1), Ok(()));
    }

    #[test]
    fn waypoints_beyond_capacity() {
        let mut input = single_axis();
        input.intermediate_positions = vec![[1.0], [2.0]];
        assert!(input.validate(1).is_err());
    }

    #[test]
    fn unreachable_target_acceleration() {
        let mut input = single_axis();
        // decelerating at 2 from 2.9 overshoots vmax = 3 when ramping back: 2.9 + 4/8 > 3
        input.target_velocity = [2.9];
        input.target_acceleration = [-2.0];
        assert!(input.validate(0).is_err());
        input.target_velocity = [2.0];
        assert_eq!(input.validate(0), Ok(()));
    }

    #[test]
    fn target_outside_window() {
        let mut input = single_axis();
        input.max_position = Some([4.0]);
        assert!(input.validate(0).is_err());
    }
}
