//! Kinematic state and per-axis limit records.

use crate::vector::AxisVector;

/// Position, velocity and acceleration of every axis.
#[derive(Clone, Debug, PartialEq)]
pub struct KinematicState<V> {
    pub position: V,
    pub velocity: V,
    pub acceleration: V,
}

impl<V: AxisVector> KinematicState<V> {
    /// State of `dofs` axes at rest at the origin.
    pub fn new(dofs: usize) -> Self {
        Self {
            position: V::zeros(dofs),
            velocity: V::zeros(dofs),
            acceleration: V::zeros(dofs),
        }
    }

    pub fn dofs(&self) -> usize {
        self.position.dofs()
    }

    /// Scalar state of one axis.
    pub fn axis(&self, dof: usize) -> AxisState {
        AxisState::new(self.position[dof], self.velocity[dof], self.acceleration[dof])
    }

    pub fn set_axis(&mut self, dof: usize, state: AxisState) {
        self.position[dof] = state.pos;
        self.velocity[dof] = state.vel;
        self.acceleration[dof] = state.acc;
    }
}

/// Scalar state `(pos, vel, acc)` of a single axis.
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct AxisState {
    pub pos: f64,
    pub vel: f64,
    pub acc: f64,
}

impl AxisState {
    pub fn new(pos: f64, vel: f64, acc: f64) -> Self {
        Self { pos, vel, acc }
    }

    pub fn from_tuple((pos, vel, acc): (f64, f64, f64)) -> Self {
        Self { pos, vel, acc }
    }

    pub fn is_at_rest(&self) -> bool {
        self.vel == 0.0 && self.acc == 0.0
    }
}

/// Kinematic bounds of a single axis.
///
/// The minimum bounds default to the negated maximum bounds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AxisLimits {
    pub max_velocity: f64,
    pub min_velocity: f64,
    pub max_acceleration: f64,
    pub min_acceleration: f64,
    pub max_jerk: f64,
}

impl AxisLimits {
    /// Symmetric limits.
    pub fn new(max_velocity: f64, max_acceleration: f64, max_jerk: f64) -> Self {
        Self {
            max_velocity,
            min_velocity: -max_velocity,
            max_acceleration,
            min_acceleration: -max_acceleration,
            max_jerk,
        }
    }

    /// Replaces the braking bounds.
    pub fn with_min(mut self, min_velocity: f64, min_acceleration: f64) -> Self {
        self.min_velocity = min_velocity;
        self.min_acceleration = min_acceleration;
        self
    }

    /// Velocity limit in the direction of `sign`.
    pub fn velocity_towards(&self, sign: f64) -> f64 {
        if sign >= 0.0 {
            self.max_velocity
        } else {
            -self.min_velocity
        }
    }

    /// Acceleration limit in the direction of `sign`.
    pub fn acceleration_towards(&self, sign: f64) -> f64 {
        if sign >= 0.0 {
            self.max_acceleration
        } else {
            -self.min_acceleration
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn axis_round_trip_through_vectors() {
        let mut state = KinematicState::<[f64; 2]>::new(2);
        state.set_axis(1, AxisState::new(1.0, -2.0, 3.0));
        assert_eq!(state.axis(1), AxisState::new(1.0, -2.0, 3.0));
        assert_eq!(state.axis(0), AxisState::default());
    }

    #[test]
    fn asymmetric_limits() {
        let limits = AxisLimits::new(3.0, 2.0, 4.0).with_min(-1.0, -0.5);
        assert_eq!(limits.velocity_towards(1.0), 3.0);
        assert_eq!(limits.velocity_towards(-1.0), 1.0);
        assert_eq!(limits.acceleration_towards(-1.0), 0.5);
    }
}
