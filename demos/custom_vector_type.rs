//! Drives the generator with a user-defined axis container.

use std::ops::{Index, IndexMut};

use scurve_otg::{join, AxisVector, InputParameter, OnlineGenerator, Status};

/// Bare fixed-size storage with nothing but indexing and equality.
#[derive(Clone, Debug, PartialEq)]
struct MinimalVector<const N: usize> {
    data: [f64; N],
}

impl<const N: usize> Index<usize> for MinimalVector<N> {
    type Output = f64;

    fn index(&self, i: usize) -> &f64 {
        &self.data[i]
    }
}

impl<const N: usize> IndexMut<usize> for MinimalVector<N> {
    fn index_mut(&mut self, i: usize) -> &mut f64 {
        &mut self.data[i]
    }
}

impl<const N: usize> AxisVector for MinimalVector<N> {
    fn dofs(&self) -> usize {
        N
    }

    fn filled(_dofs: usize, value: f64) -> Self {
        Self { data: [value; N] }
    }

    fn from_slice(values: &[f64]) -> Self {
        let mut data = [0.0; N];
        data.iter_mut().zip(values).for_each(|(d, v)| *d = *v);
        Self { data }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut otg = OnlineGenerator::<MinimalVector<3>>::new(3, 0.01);
    let mut input = InputParameter::new(3);
    let mut output = otg.output();

    input.current_position = MinimalVector::from_slice(&[0.0, 0.0, 0.5]);
    input.current_velocity = MinimalVector::from_slice(&[0.0, -2.2, -0.5]);
    input.current_acceleration = MinimalVector::from_slice(&[0.0, 2.5, -0.5]);

    input.target_position = MinimalVector::from_slice(&[5.0, -2.0, -3.5]);
    input.target_velocity = MinimalVector::from_slice(&[0.0, -0.5, -2.0]);
    input.target_acceleration = MinimalVector::from_slice(&[0.0, 0.0, 0.5]);

    input.max_velocity = MinimalVector::from_slice(&[3.0, 1.0, 3.0]);
    input.max_acceleration = MinimalVector::from_slice(&[3.0, 2.0, 1.0]);
    input.max_jerk = MinimalVector::from_slice(&[4.0, 3.0, 2.0]);

    println!("t | position");
    while otg.update(&input, &mut output) == Status::Working {
        println!("{:.2} | {}", output.time, join(&output.new_position));
        output.pass_to_input(&mut input);
    }
    println!("Trajectory duration: {:.4} [s].", output.trajectory.duration());
}
