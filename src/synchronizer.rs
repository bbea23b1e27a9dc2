//! Alignment of the per-axis profiles of one block.

use tracing::warn;

use crate::block::Block;
use crate::calculator::{Deadline, Halt};
use crate::input::{ControlInterface, Synchronization};
use crate::scurve::SCurve;
use crate::state::AxisState;

/// One axis' planning request inside a block.
#[derive(Clone, Copy, Debug)]
pub(crate) struct AxisRequest {
    pub planner: SCurve,
    pub current: AxisState,
    pub target: AxisState,
}

/// Fills `block` with synchronized profiles for `requests`.
///
/// `floor` is the lower bound on the block duration.
pub(crate) fn synchronize(
    block: &mut Block,
    requests: &[AxisRequest],
    mode: Synchronization,
    interface: ControlInterface,
    floor: f64,
    deadline: &Deadline,
) -> Result<(), Halt> {
    let mut limiting = 0;
    let mut longest = 0.0;
    for (dof, request) in requests.iter().enumerate() {
        let profile = request.planner.minimum_time(dof, request.current, request.target)?;
        block.profiles[dof] = profile;
        block.minimal_durations[dof] = profile.duration;
        if profile.duration > longest {
            longest = profile.duration;
            limiting = dof;
        }
        deadline.check()?;
    }

    let duration = longest.max(floor);
    block.duration = duration;

    match mode {
        Synchronization::None => Ok(()),
        Synchronization::Time => stretch(block, requests, duration, |_| true, deadline),
        Synchronization::TimeIfNecessary => {
            stretch(block, requests, duration, |r| !r.target.is_at_rest(), deadline)
        }
        Synchronization::Phase => {
            if duration > block.minimal_durations[limiting] {
                let r = &requests[limiting];
                let minimal = block.profiles[limiting];
                block.profiles[limiting] =
                    r.planner
                        .fixed_duration(limiting, r.current, r.target, &minimal, duration)?;
            }
            if scale_to(block, requests, limiting, interface) {
                return Ok(());
            }
            warn!(limiting, "phase synchronization not applicable, falling back to time synchronization");
            stretch(block, requests, duration, |_| true, deadline)
        }
    }
}

/// Re-solves every selected axis that is faster than `duration`.
fn stretch<F>(
    block: &mut Block,
    requests: &[AxisRequest],
    duration: f64,
    selected: F,
    deadline: &Deadline,
) -> Result<(), Halt>
where
    F: Fn(&AxisRequest) -> bool,
{
    for (dof, request) in requests.iter().enumerate() {
        let minimal = block.profiles[dof];
        if !selected(request) || minimal.duration >= duration {
            continue;
        }
        block.profiles[dof] = request
            .planner
            .fixed_duration(dof, request.current, request.target, &minimal, duration)?;
        deadline.check()?;
    }
    Ok(())
}

/// Replaces every profile with the limiting one scaled to the axis' own
/// displacement. Returns false, leaving `block` untouched, when the boundary
/// states are not proportional or a scaled profile breaks a limit.
fn scale_to(
    block: &mut Block,
    requests: &[AxisRequest],
    limiting: usize,
    interface: ControlInterface,
) -> bool {
    let reference = block.profiles[limiting];
    let lead = &requests[limiting];
    if reference.brake_duration() > 0.0 {
        return false;
    }

    let position_control = interface == ControlInterface::Position;
    let span = |r: &AxisRequest| {
        if position_control {
            r.target.pos - r.current.pos
        } else {
            r.target.vel - r.current.vel
        }
    };
    let lead_span = span(lead);
    if lead_span.abs() < f64::EPSILON {
        return false;
    }

    // validate every axis before touching the block
    for (dof, request) in requests.iter().enumerate() {
        if dof == limiting {
            continue;
        }
        let k = span(request) / lead_span;
        let proportional = near(request.current.acc, k * lead.current.acc)
            && near(request.target.acc, k * lead.target.acc)
            && (!position_control
                || (near(request.current.vel, k * lead.current.vel)
                    && near(request.target.vel, k * lead.target.vel)));
        if !proportional {
            return false;
        }
        let scaled = reference.scaled(k, request.current);
        if !scaled.respects(request.planner.limits(), position_control) {
            return false;
        }
    }

    for (dof, request) in requests.iter().enumerate() {
        if dof != limiting {
            let k = span(request) / lead_span;
            block.profiles[dof] = reference.scaled(k, request.current);
        }
    }
    true
}

fn near(a: f64, b: f64) -> bool {
    (a - b).abs() <= 1e-9 * (1.0 + a.abs().max(b.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileCase;
    use crate::state::AxisLimits;
    use approx::assert_abs_diff_eq;

    fn request(distance: f64, limits: AxisLimits) -> AxisRequest {
        AxisRequest {
            planner: SCurve::new(limits, ControlInterface::Position),
            current: AxisState::default(),
            target: AxisState::new(distance, 0.0, 0.0),
        }
    }

    fn requests() -> [AxisRequest; 2] {
        let limits = AxisLimits::new(1.0, 1.0, 1.0);
        [request(4.0, limits), request(1.0, limits)]
    }

    #[test]
    fn time_mode_shares_duration() {
        let reqs = requests();
        let mut block = Block::with_dofs(2);
        synchronize(&mut block, &reqs, Synchronization::Time, ControlInterface::Position, 0.0, &Deadline::unbounded())
            .unwrap();
        assert!(block.minimal_durations[1] < block.minimal_durations[0]);
        assert_abs_diff_eq!(block.profiles[1].duration, block.duration, epsilon = 1e-9);
        assert_abs_diff_eq!(block.profiles[1].end.pos, 1.0, epsilon = 1e-7);
        assert_abs_diff_eq!(block.duration, block.minimal_durations[0], epsilon = 1e-12);
    }

    #[test]
    fn none_mode_keeps_minimal_profiles() {
        let reqs = requests();
        let mut block = Block::with_dofs(2);
        synchronize(&mut block, &reqs, Synchronization::None, ControlInterface::Position, 0.0, &Deadline::unbounded())
            .unwrap();
        assert_eq!(block.profiles[1].duration, block.minimal_durations[1]);
        assert_abs_diff_eq!(block.end_state(1).pos, 1.0, epsilon = 1e-7);
    }

    #[test]
    fn phase_mode_scales_limiting_profile() {
        let reqs = requests();
        let mut block = Block::with_dofs(2);
        synchronize(&mut block, &reqs, Synchronization::Phase, ControlInterface::Position, 0.0, &Deadline::unbounded())
            .unwrap();
        assert_eq!(block.profiles[1].case, ProfileCase::Scaled);
        assert_abs_diff_eq!(block.profiles[1].end.pos, 1.0, epsilon = 1e-7);
        for (a, b) in block.profiles[0].phases.iter().zip(&block.profiles[1].phases) {
            assert_abs_diff_eq!(a.time, b.time, epsilon = 1e-12);
        }
    }

    #[test]
    fn floor_extends_every_axis() {
        let reqs = requests();
        let mut block = Block::with_dofs(2);
        synchronize(&mut block, &reqs, Synchronization::Time, ControlInterface::Position, 20.0, &Deadline::unbounded())
            .unwrap();
        assert_eq!(block.duration, 20.0);
        assert_abs_diff_eq!(block.profiles[0].duration, 20.0, epsilon = 1e-9);
        assert_abs_diff_eq!(block.profiles[1].duration, 20.0, epsilon = 1e-9);
    }
}
