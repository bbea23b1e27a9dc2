//! Validation and planning of a complete trajectory from one input.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::{OtgError, Result};
use crate::input::InputParameter;
use crate::synchronizer::AxisRequest;
use crate::trajectory::Trajectory;
use crate::vector::AxisVector;
use crate::waypoints;

/// Reason a calculation stopped before producing a trajectory.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Halt {
    Failed(OtgError),
    /// The calculation budget ran out.
    Interrupted,
}

impl From<OtgError> for Halt {
    fn from(err: OtgError) -> Self {
        Halt::Failed(err)
    }
}

/// Soft deadline checked between axis solves and blocks.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Deadline {
    start: Instant,
    budget: Option<Duration>,
}

impl Deadline {
    pub fn new(budget: Option<Duration>) -> Self {
        Self {
            start: Instant::now(),
            budget,
        }
    }

    #[cfg(test)]
    pub fn unbounded() -> Self {
        Self::new(None)
    }

    pub fn check(&self) -> std::result::Result<(), Halt> {
        match self.budget {
            Some(budget) if self.start.elapsed() > budget => Err(Halt::Interrupted),
            _ => Ok(()),
        }
    }
}

/// Plans trajectories into caller-owned storage.
///
/// Scratch buffers are reserved at construction so that planning a request of
/// the reserved size does not allocate.
#[derive(Debug, Clone)]
pub(crate) struct Calculator {
    dofs: usize,
    waypoint_capacity: usize,
    requests: Vec<AxisRequest>,
}

impl Calculator {
    pub fn new(dofs: usize, waypoint_capacity: usize) -> Self {
        Self {
            dofs,
            waypoint_capacity,
            requests: Vec::with_capacity(dofs),
        }
    }

    pub fn waypoint_capacity(&self) -> usize {
        self.waypoint_capacity
    }

    /// Plans `input` to completion, without a calculation budget.
    pub fn plan<V: AxisVector>(&mut self, input: &InputParameter<V>, trajectory: &mut Trajectory<V>) -> Result<()> {
        self.calculate(input, trajectory, None).map_err(|halt| match halt {
            Halt::Failed(err) => err,
            Halt::Interrupted => OtgError::invalid("calculation interrupted without a budget"),
        })
    }

    /// Validates `input` and plans it into `trajectory`.
    ///
    /// On failure `trajectory` holds an unspecified partial plan.
    pub fn calculate<V: AxisVector>(
        &mut self,
        input: &InputParameter<V>,
        trajectory: &mut Trajectory<V>,
        budget: Option<Duration>,
    ) -> std::result::Result<(), Halt> {
        let deadline = Deadline::new(budget);
        if input.dofs() != self.dofs {
            return Err(OtgError::invalid(format!(
                "input has {} axes, generator was built for {}",
                input.dofs(),
                self.dofs
            ))
            .into());
        }
        input.validate(self.waypoint_capacity)?;

        waypoints::plan(input, trajectory, &mut self.requests, &deadline)?;
        check_positional_limits(input, trajectory)?;

        debug!(
            duration = trajectory.duration(),
            blocks = trajectory.blocks().len(),
            "trajectory planned"
        );
        Ok(())
    }
}

/// Fails if any axis leaves `[min_position, max_position]`.
fn check_positional_limits<V: AxisVector>(input: &InputParameter<V>, trajectory: &Trajectory<V>) -> Result<()> {
    if input.min_position.is_none() && input.max_position.is_none() {
        return Ok(());
    }
    for dof in 0..input.dofs() {
        let ext = trajectory.axis_extrema(dof);
        let tolerance = 1e-9 * (1.0 + ext.min.abs().max(ext.max.abs()));
        let below = input.min_position.as_ref().is_some_and(|lo| ext.min < lo[dof] - tolerance);
        let above = input.max_position.as_ref().is_some_and(|hi| ext.max > hi[dof] + tolerance);
        if below || above {
            return Err(OtgError::PositionalLimits {
                axis: dof,
                min: ext.min,
                max: ext.max,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input() -> InputParameter<[f64; 1]> {
        let mut input = InputParameter::new(1);
        input.current_velocity = [2.0];
        input.target_position = [1.0];
        input.max_velocity = [3.0];
        input.max_acceleration = [1.0];
        input.max_jerk = [1.0];
        input
    }

    #[test]
    fn overshoot_breaks_position_window() {
        let mut calculator = Calculator::new(1, 0);
        let mut trajectory = Trajectory::with_capacity(1, 1);
        let mut request = input();
        request.max_position = Some([1.5]);
        let halt = calculator.calculate(&request, &mut trajectory, None).unwrap_err();
        assert!(matches!(halt, Halt::Failed(OtgError::PositionalLimits { axis: 0, .. })));

        request.max_position = None;
        assert_eq!(calculator.calculate(&request, &mut trajectory, None), Ok(()));
        assert_eq!(calculator.plan(&request, &mut trajectory), Ok(()));
    }

    #[test]
    fn axis_count_must_match() {
        let mut calculator = Calculator::new(2, 0);
        let mut trajectory = Trajectory::<Vec<f64>>::with_capacity(3, 1);
        let mut request = InputParameter::<Vec<f64>>::new(3);
        request.target_position = vec![1.0, 1.0, 1.0];
        request.max_velocity = vec![1.0; 3];
        request.max_acceleration = vec![1.0; 3];
        request.max_jerk = vec![1.0; 3];
        let halt = calculator.calculate(&request, &mut trajectory, None).unwrap_err();
        assert!(matches!(halt, Halt::Failed(OtgError::InvalidInput(_))));
    }

    #[test]
    fn zero_budget_interrupts() {
        let deadline = Deadline::new(Some(Duration::ZERO));
        std::thread::sleep(Duration::from_millis(1));
        assert_eq!(deadline.check(), Err(Halt::Interrupted));
        assert_eq!(Deadline::unbounded().check(), Ok(()));
    }
}
