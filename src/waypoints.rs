//! Decomposition of a request into blocks through its intermediate positions.
//!
//! Blocks are chained forward: each block starts in the exact end state of the
//! previous one, so position, velocity and acceleration stay continuous across
//! every waypoint.
//!
//! The state a block is planned towards at a waypoint follows a fixed rule
//! rather than being solved for: zero acceleration, and a velocity that keeps
//! the motion going when the axis does not change direction (see
//! `junction_velocity`). The next block starts from whatever the previous
//! one really reached, holds included.

use tracing::{debug, trace};

use crate::calculator::{Deadline, Halt};
use crate::error::OtgError;
use crate::input::{InputParameter, Synchronization};
use crate::scurve::SCurve;
use crate::state::{AxisLimits, AxisState};
use crate::synchronizer::{synchronize, AxisRequest};
use crate::trajectory::Trajectory;
use crate::vector::AxisVector;

/// Plans every block of `input` into `trajectory`.
pub(crate) fn plan<V: AxisVector>(
    input: &InputParameter<V>,
    trajectory: &mut Trajectory<V>,
    requests: &mut Vec<AxisRequest>,
    deadline: &Deadline,
) -> Result<(), Halt> {
    let dofs = input.dofs();
    let sections = input.sections();
    let flying = sections > 1 && input.synchronization != Synchronization::None;
    trajectory.reset(dofs);

    let mut elapsed = 0.0;
    for section in 0..sections {
        let last = section + 1 == sections;

        requests.clear();
        for dof in 0..dofs {
            let current = match trajectory.last_block() {
                Some(block) => block.end_state(dof),
                None => input.current_axis(dof),
            };
            let target = if last {
                input.target_axis(dof)
            } else {
                let velocity = if flying { junction_velocity(input, section, dof) } else { 0.0 };
                AxisState::new(input.intermediate_positions[section][dof], velocity, 0.0)
            };
            requests.push(AxisRequest {
                planner: SCurve::new(input.axis_limits(dof), input.control_interface),
                current,
                target,
            });
        }

        let mut floor = input
            .per_section_minimum_duration
            .as_ref()
            .map_or(0.0, |floors| floors[section]);
        if last {
            if let Some(total) = input.minimum_duration {
                floor = floor.max(total - elapsed);
            }
        }

        let block = trajectory.next_block();
        let result = synchronize(
            block,
            requests,
            input.synchronization,
            input.control_interface,
            floor,
            deadline,
        );
        match result {
            Err(Halt::Failed(err)) if !last && is_infeasible(&err) => {
                debug!(section, %err, "re-planning block with a resting junction");
                for request in requests.iter_mut() {
                    request.target.vel = 0.0;
                }
                synchronize(
                    block,
                    requests,
                    input.synchronization,
                    input.control_interface,
                    floor,
                    deadline,
                )?;
            }
            other => other?,
        }

        trace!(section, duration = block.duration, "block planned");
        elapsed += block.duration;
        trajectory.commit_block();
        deadline.check()?;
    }
    Ok(())
}

fn is_infeasible(err: &OtgError) -> bool {
    matches!(
        err,
        OtgError::SynchronizationInfeasible { .. } | OtgError::DurationComputationFailed { .. }
    )
}

/// Velocity of axis `dof` when passing intermediate position `index`.
///
/// Non-zero only if the axis keeps its direction through the waypoint. The
/// magnitude is bounded so that the shorter adjacent section can absorb it.
fn junction_velocity<V: AxisVector>(input: &InputParameter<V>, index: usize, dof: usize) -> f64 {
    let waypoints = &input.intermediate_positions;
    let before = if index == 0 {
        input.current_position[dof]
    } else {
        waypoints[index - 1][dof]
    };
    let here = waypoints[index][dof];
    let after = waypoints
        .get(index + 1)
        .map_or(input.target_position[dof], |next| next[dof]);

    let incoming = here - before;
    let outgoing = after - here;
    if incoming * outgoing <= 0.0 {
        return 0.0;
    }
    pass_velocity(&input.axis_limits(dof), incoming.signum(), incoming.abs().min(outgoing.abs()))
}

fn pass_velocity(limits: &AxisLimits, direction: f64, distance: f64) -> f64 {
    let acceleration = limits
        .acceleration_towards(direction)
        .min(limits.acceleration_towards(-direction));
    let magnitude = limits
        .velocity_towards(direction)
        .min((acceleration * distance / 2.0).sqrt());
    direction * magnitude
}
