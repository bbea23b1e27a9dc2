//! Per-cycle driver of the trajectory generator.
//!
//! Every call to [`OnlineGenerator::update`] decides whether the request
//! changed, re-plans if it did, advances the time cursor by one control cycle
//! and writes the state at the new time into the output.

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::calculator::{Calculator, Halt};
use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::input::InputParameter;
use crate::output::{OutputParameter, Status};
use crate::state::KinematicState;
use crate::trajectory::Trajectory;
use crate::vector::{assign, AxisVector};

/// What a cycle does with its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    /// Plan a new trajectory.
    Replan,
    /// Keep following the current trajectory.
    Continue,
    /// Same request after a terminal state: report it again.
    Repeat,
}

/// Re-plan iff there is no previous request or the request changed.
///
/// `previous` is the request the current trajectory was planned for, with its
/// current state advanced to the last output.
pub fn decide<V: PartialEq>(
    previous: Option<&InputParameter<V>>,
    input: &InputParameter<V>,
    status: Status,
) -> Decision {
    match previous {
        Some(previous) if previous == input => {
            if status.is_terminal() {
                Decision::Repeat
            } else {
                Decision::Continue
            }
        }
        _ => Decision::Replan,
    }
}

/// Online trajectory generator for `V`-sized axis vectors.
#[derive(Debug, Clone)]
pub struct OnlineGenerator<V> {
    /// Control cycle in seconds.
    pub delta_time: f64,
    calculator: Calculator,
    fingerprint: Option<InputParameter<V>>,
    scratch: Trajectory<V>,
    state: KinematicState<V>,
    time: f64,
    status: Status,
    has_trajectory: bool,
}

impl<V: AxisVector> OnlineGenerator<V> {
    pub fn new(dofs: usize, delta_time: f64) -> Self {
        Self::with_waypoints(dofs, delta_time, 0)
    }

    /// Generator that reserves room for up to `capacity` intermediate positions.
    pub fn with_waypoints(dofs: usize, delta_time: f64, capacity: usize) -> Self {
        Self {
            delta_time,
            calculator: Calculator::new(dofs, capacity),
            fingerprint: None,
            scratch: Trajectory::with_capacity(dofs, capacity + 1),
            state: KinematicState::new(dofs),
            time: 0.0,
            status: Status::Idle,
            has_trajectory: false,
        }
    }

    pub fn from_config(dofs: usize, config: &GeneratorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::with_waypoints(dofs, config.delta_time, config.max_number_of_waypoints))
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn waypoint_capacity(&self) -> usize {
        self.calculator.waypoint_capacity()
    }

    /// Output with a trajectory sized like this generator's.
    pub fn output(&self) -> OutputParameter<V> {
        OutputParameter::with_capacity(self.state.dofs(), self.waypoint_capacity())
    }

    /// Plans the complete trajectory for `input` without running a control loop.
    pub fn calculate(&mut self, input: &InputParameter<V>) -> Result<Trajectory<V>> {
        let mut trajectory = Trajectory::with_capacity(input.dofs(), input.sections());
        self.calculator.plan(input, &mut trajectory)?;
        Ok(trajectory)
    }

    /// Runs one control cycle.
    ///
    /// On error the output is left untouched and the error status is returned
    /// until the input changes.
    pub fn update(&mut self, input: &InputParameter<V>, output: &mut OutputParameter<V>) -> Status {
        match decide(self.fingerprint.as_ref(), input, self.status) {
            Decision::Repeat => return self.status,
            Decision::Continue => {
                output.new_calculation = false;
                output.was_calculation_interrupted = false;
            }
            Decision::Replan => {
                if let Err(status) = self.replan(input, output) {
                    return status;
                }
            }
        }

        self.time += self.delta_time;
        output.trajectory.at_time(self.time, &mut self.state);
        output.set_state(&self.state);
        output.time = self.time;

        self.status = if self.time >= output.trajectory.duration() {
            Status::Finished
        } else {
            Status::Working
        };

        // a caller feeding the output back must not trigger a re-plan
        if let Some(fingerprint) = self.fingerprint.as_mut() {
            if !output.was_calculation_interrupted {
                assign(&mut fingerprint.current_position, &self.state.position);
                assign(&mut fingerprint.current_velocity, &self.state.velocity);
                assign(&mut fingerprint.current_acceleration, &self.state.acceleration);
            }
        }
        trace!(time = self.time, status = ?self.status, "cycle");
        self.status
    }

    fn replan(&mut self, input: &InputParameter<V>, output: &mut OutputParameter<V>) -> std::result::Result<(), Status> {
        let started = Instant::now();
        // nothing to fall back on before the first trajectory
        let budget = if self.has_trajectory {
            input
                .interrupt_calculation_duration
                .map(|us| Duration::from_secs_f64(us * 1e-6))
        } else {
            None
        };

        let result = self.calculator.calculate(input, &mut self.scratch, budget);
        let elapsed = started.elapsed().as_secs_f64() * 1e6;

        match result {
            Ok(()) => {
                std::mem::swap(&mut output.trajectory, &mut self.scratch);
                match self.fingerprint.as_mut() {
                    Some(fingerprint) => fingerprint.clone_from(input),
                    None => self.fingerprint = Some(input.clone()),
                }
                self.time = 0.0;
                self.has_trajectory = true;
                output.new_calculation = true;
                output.was_calculation_interrupted = false;
                output.calculation_duration = elapsed;
                debug!(
                    duration = output.trajectory.duration(),
                    blocks = output.trajectory.blocks().len(),
                    calculation_us = elapsed,
                    "re-planned"
                );
                Ok(())
            }
            Err(Halt::Interrupted) => {
                debug!(calculation_us = elapsed, "calculation interrupted, keeping previous trajectory");
                output.new_calculation = false;
                output.was_calculation_interrupted = true;
                output.calculation_duration = elapsed;
                Ok(())
            }
            Err(Halt::Failed(err)) => {
                warn!(%err, "trajectory calculation failed");
                match self.fingerprint.as_mut() {
                    Some(fingerprint) => fingerprint.clone_from(input),
                    None => self.fingerprint = Some(input.clone()),
                }
                self.status = Status::from(&err);
                Err(self.status)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ControlInterface;

    fn input() -> InputParameter<[f64; 1]> {
        let mut input = InputParameter::new(1);
        input.target_position = [1.0];
        input.max_velocity = [1.0];
        input.max_acceleration = [1.0];
        input.max_jerk = [1.0];
        input
    }

    #[test]
    fn decision_is_a_pure_function_of_fingerprint_and_input() {
        let a = input();
        let mut b = input();
        assert_eq!(decide(None, &a, Status::Idle), Decision::Replan);
        assert_eq!(decide(Some(&a), &b, Status::Working), Decision::Continue);
        assert_eq!(decide(Some(&a), &b, Status::Finished), Decision::Repeat);
        b.target_position = [2.0];
        assert_eq!(decide(Some(&a), &b, Status::Finished), Decision::Replan);
    }

    #[test]
    fn feeding_output_back_does_not_replan() {
        let mut otg = OnlineGenerator::new(1, 0.01);
        let mut input = input();
        let mut output = otg.output();

        assert_eq!(otg.update(&input, &mut output), Status::Working);
        assert!(output.new_calculation);
        output.pass_to_input(&mut input);

        assert_eq!(otg.update(&input, &mut output), Status::Working);
        assert!(!output.new_calculation);
        assert!((output.time - 0.02).abs() < 1e-12);
    }

    #[test]
    fn error_is_sticky_and_keeps_output() {
        let mut otg = OnlineGenerator::new(1, 0.01);
        let mut input = input();
        input.max_jerk = [-1.0];
        let mut output = otg.output();
        output.new_position = [0.25];

        assert_eq!(otg.update(&input, &mut output), Status::ErrorInvalidInput);
        assert_eq!(otg.update(&input, &mut output), Status::ErrorInvalidInput);
        assert_eq!(output.new_position, [0.25]);
        assert!(!output.new_calculation);
    }

    #[test]
    fn finished_repeats_until_input_changes() {
        let mut otg = OnlineGenerator::new(1, 0.1);
        let mut input = input();
        input.control_interface = ControlInterface::Position;
        let mut output = otg.output();
        let mut status = Status::Working;
        for _ in 0..1000 {
            status = otg.update(&input, &mut output);
            output.pass_to_input(&mut input);
            if status != Status::Working {
                break;
            }
        }
        assert_eq!(status, Status::Finished);
        let time = output.time;
        assert_eq!(otg.update(&input, &mut output), Status::Finished);
        assert_eq!(output.time, time);
    }

    #[test]
    fn interrupted_replan_keeps_trajectory_and_retries() {
        let mut otg = OnlineGenerator::new(1, 0.01);
        let mut input = input();
        let mut output = otg.output();
        assert_eq!(otg.update(&input, &mut output), Status::Working);
        output.pass_to_input(&mut input);
        let duration = output.trajectory.duration();
        let blocks = output.trajectory.blocks().to_vec();

        // a femtosecond budget runs out during the first axis solve
        input.target_position = [2.0];
        input.interrupt_calculation_duration = Some(1e-9);
        assert_eq!(otg.update(&input, &mut output), Status::Working);
        assert!(output.was_calculation_interrupted);
        assert!(!output.new_calculation);
        assert_eq!(output.trajectory.duration(), duration);
        assert_eq!(output.trajectory.blocks(), &blocks[..]);
        assert!((output.time - 0.02).abs() < 1e-12);
        output.pass_to_input(&mut input);

        input.interrupt_calculation_duration = None;
        assert_eq!(otg.update(&input, &mut output), Status::Working);
        assert!(output.new_calculation);
        assert!(!output.was_calculation_interrupted);
        assert!(output.trajectory.duration() > duration);
    }

    #[test]
    fn axis_count_mismatch_is_invalid_input() {
        let mut otg = OnlineGenerator::<Vec<f64>>::new(2, 0.01);
        let mut output = otg.output();
        let mut input = InputParameter::<Vec<f64>>::new(3);
        input.target_position = vec![1.0; 3];
        input.max_velocity = vec![1.0; 3];
        input.max_acceleration = vec![1.0; 3];
        input.max_jerk = vec![1.0; 3];

        assert_eq!(otg.update(&input, &mut output), Status::ErrorInvalidInput);
        assert!(otg.calculate(&input).is_err());
    }
}
