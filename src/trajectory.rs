//! Planned multi-axis trajectory and its time queries.

use std::marker::PhantomData;

use crate::block::Block;
use crate::profile::Profile;
use crate::state::KinematicState;
use crate::vector::AxisVector;

/// Global position extremum of one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PositionExtrema {
    pub min: f64,
    pub max: f64,
    pub t_min: f64,
    pub t_max: f64,
}

/// Ordered blocks from the current state through every waypoint to the target.
///
/// Block storage is reserved up front and reused by every re-plan.
#[derive(Clone, Debug)]
pub struct Trajectory<V> {
    blocks: Vec<Block>,
    count: usize,
    duration: f64,
    dofs: usize,
    _vector: PhantomData<V>,
}

impl<V: AxisVector> Trajectory<V> {
    /// Empty trajectory with room for `sections` blocks of `dofs` axes.
    pub fn with_capacity(dofs: usize, sections: usize) -> Self {
        Self {
            blocks: (0..sections.max(1)).map(|_| Block::with_dofs(dofs)).collect(),
            count: 0,
            duration: 0.0,
            dofs,
            _vector: PhantomData,
        }
    }

    pub fn dofs(&self) -> usize {
        self.dofs
    }

    /// Total duration in seconds.
    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks[..self.count]
    }

    /// Profiles of every axis inside block `block`.
    pub fn profiles(&self, block: usize) -> Option<&[Profile]> {
        self.blocks().get(block).map(|b| b.profiles.as_slice())
    }

    /// Drops every block while keeping the storage.
    pub(crate) fn reset(&mut self, dofs: usize) {
        self.count = 0;
        self.duration = 0.0;
        if dofs != self.dofs {
            self.dofs = dofs;
            self.blocks.iter_mut().for_each(|b| *b = Block::with_dofs(dofs));
        }
    }

    /// Storage for the next block. Grows only if more blocks are planned than
    /// were reserved.
    pub(crate) fn next_block(&mut self) -> &mut Block {
        if self.count == self.blocks.len() {
            self.blocks.push(Block::with_dofs(self.dofs));
        }
        &mut self.blocks[self.count]
    }

    /// Appends the block prepared by [`next_block`](Self::next_block).
    pub(crate) fn commit_block(&mut self) {
        self.duration += self.blocks[self.count].duration;
        self.count += 1;
    }

    pub(crate) fn last_block(&self) -> Option<&Block> {
        self.blocks().last()
    }

    /// Writes the state at time `time` into `state`.
    ///
    /// `time` outside `[0, duration]` is clamped.
    pub fn at_time(&self, time: f64, state: &mut KinematicState<V>) {
        let Some((block, local)) = self.locate(time) else {
            return;
        };
        for dof in 0..self.dofs {
            state.set_axis(dof, block.axis_state_at(dof, local));
        }
    }

    pub fn state_at(&self, time: f64) -> KinematicState<V> {
        let mut state = KinematicState::new(self.dofs);
        self.at_time(time, &mut state);
        state
    }

    /// Block containing `time` and the time relative to its start.
    fn locate(&self, time: f64) -> Option<(&Block, f64)> {
        let blocks = self.blocks();
        let last = blocks.last()?;
        let mut t = time.clamp(0.0, self.duration);
        for block in blocks {
            if t <= block.duration {
                return Some((block, t));
            }
            t -= block.duration;
        }
        Some((last, last.duration))
    }

    /// Minimum and maximum position of every axis over the whole trajectory.
    pub fn position_extrema(&self) -> Vec<PositionExtrema> {
        (0..self.dofs).map(|dof| self.axis_extrema(dof)).collect()
    }

    pub(crate) fn axis_extrema(&self, dof: usize) -> PositionExtrema {
        let mut out: Option<PositionExtrema> = None;
        let mut offset = 0.0;
        for block in self.blocks() {
            let (min, t_min, max, t_max) = block.position_extrema(dof);
            let ext = out.get_or_insert(PositionExtrema {
                min,
                max,
                t_min: offset + t_min,
                t_max: offset + t_max,
            });
            if min < ext.min {
                ext.min = min;
                ext.t_min = offset + t_min;
            }
            if max > ext.max {
                ext.max = max;
                ext.t_max = offset + t_max;
            }
            offset += block.duration;
        }
        out.unwrap_or_default()
    }

    /// Time at which each intermediate position is reached.
    pub fn intermediate_durations(&self) -> Vec<f64> {
        let blocks = self.blocks();
        let mut elapsed = 0.0;
        blocks
            .iter()
            .take(blocks.len().saturating_sub(1))
            .map(|b| {
                elapsed += b.duration;
                elapsed
            })
            .collect()
    }

    /// Minimal duration every axis would need on its own for the first block.
    pub fn independent_min_durations(&self) -> V {
        match self.blocks().first() {
            Some(block) => V::from_slice(&block.minimal_durations),
            None => V::zeros(self.dofs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Profile, ProfileCase};
    use crate::state::AxisState;
    use approx::assert_abs_diff_eq;

    /// Two blocks of constant velocity 1, lasting 1 s and 2 s.
    fn two_blocks() -> Trajectory<[f64; 1]> {
        let mut trajectory = Trajectory::with_capacity(1, 2);
        let mut start = AxisState::new(0.0, 1.0, 0.0);
        for duration in [1.0, 2.0] {
            let block = trajectory.next_block();
            block.profiles[0] = Profile::build(start, &[], &[(0.0, duration)], ProfileCase::Stretched);
            block.minimal_durations[0] = duration;
            block.duration = duration;
            start = block.end_state(0);
            trajectory.commit_block();
        }
        trajectory
    }

    #[test]
    fn locates_blocks_by_cumulative_time() {
        let trajectory = two_blocks();
        assert_eq!(trajectory.duration(), 3.0);
        assert_abs_diff_eq!(trajectory.state_at(0.5).position[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(trajectory.state_at(2.5).position[0], 2.5, epsilon = 1e-12);
    }

    #[test]
    fn clamps_outside_duration() {
        let trajectory = two_blocks();
        assert_eq!(trajectory.state_at(-1.0), trajectory.state_at(0.0));
        assert_eq!(trajectory.state_at(10.0), trajectory.state_at(3.0));
    }

    #[test]
    fn queries() {
        let trajectory = two_blocks();
        assert_eq!(trajectory.intermediate_durations(), vec![1.0]);
        assert_eq!(trajectory.independent_min_durations(), [1.0]);
        let ext = trajectory.position_extrema();
        assert_abs_diff_eq!(ext[0].min, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ext[0].max, 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(ext[0].t_max, 3.0, epsilon = 1e-12);
    }

    #[test]
    fn empty_trajectory_leaves_state_alone() {
        let trajectory = Trajectory::<[f64; 1]>::with_capacity(1, 1);
        let mut state = KinematicState { position: [7.0], velocity: [0.0], acceleration: [0.0] };
        trajectory.at_time(0.0, &mut state);
        assert_eq!(state.position, [7.0]);
        assert!(trajectory.is_empty());
    }
}
