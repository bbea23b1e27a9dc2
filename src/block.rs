use crate::profile::Profile;
use crate::state::AxisState;

/// Synchronized profiles of every axis over one section of a trajectory.
///
/// An axis whose profile is shorter than the block holds its end state,
/// extrapolated with zero jerk, until the block ends.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Block {
    pub profiles: Vec<Profile>,
    /// Minimal duration each axis would need on its own.
    pub minimal_durations: Vec<f64>,
    pub duration: f64,
}

impl Block {
    pub fn with_dofs(dofs: usize) -> Self {
        Self {
            profiles: vec![Profile::default(); dofs],
            minimal_durations: vec![0.0; dofs],
            duration: 0.0,
        }
    }

    pub fn dofs(&self) -> usize {
        self.profiles.len()
    }

    /// State of axis `dof` at time `t` from the start of the block.
    pub fn axis_state_at(&self, dof: usize, t: f64) -> AxisState {
        self.profiles[dof].state_at(t.clamp(0.0, self.duration))
    }

    pub fn end_state(&self, dof: usize) -> AxisState {
        self.profiles[dof].state_at(self.duration)
    }

    /// `(min, t_min, max, t_max)` of the position of axis `dof` inside the block.
    pub fn position_extrema(&self, dof: usize) -> (f64, f64, f64, f64) {
        let profile = &self.profiles[dof];
        profile.position_extrema((self.duration - profile.duration).max(0.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::ProfileCase;
    use approx::assert_abs_diff_eq;

    #[test]
    fn short_axis_holds_its_end_state() {
        let mut block = Block::with_dofs(2);
        block.profiles[0] = Profile::build(AxisState::default(), &[], &[(0.0, 2.0)], ProfileCase::Stretched);
        block.profiles[1] = Profile::build(
            AxisState::new(0.0, 0.0, 1.0),
            &[],
            &[(-1.0, 1.0)],
            ProfileCase::PeakVelocity,
        );
        block.duration = 2.0;

        let end = block.end_state(1);
        assert_abs_diff_eq!(end.vel, 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(end.acc, 0.0, epsilon = 1e-12);
        // 1/3 during the ramp, then 0.5 m/s for the remaining second
        assert_abs_diff_eq!(end.pos, 1.0 / 3.0 + 0.5, epsilon = 1e-12);

        let (_, _, max, t_max) = block.position_extrema(1);
        assert_abs_diff_eq!(max, end.pos, epsilon = 1e-12);
        assert_abs_diff_eq!(t_max, 2.0, epsilon = 1e-12);
    }
}
