//! Plans a complete trajectory up front and samples it at arbitrary times.

use scurve_otg::{join, InputParameter, OnlineGenerator};

fn main() -> scurve_otg::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut otg = OnlineGenerator::<[f64; 3]>::new(3, 0.01);
    let mut input = InputParameter::new(3);

    input.current_position = [0.0, 0.0, 0.5];
    input.current_velocity = [0.0, -2.2, -0.5];
    input.current_acceleration = [0.0, 2.5, -0.5];

    input.target_position = [5.0, -2.0, -3.5];
    input.target_velocity = [0.0, -0.5, -2.0];
    input.target_acceleration = [0.0, 0.0, 0.5];

    input.max_velocity = [3.0, 1.0, 3.0];
    input.max_acceleration = [3.0, 2.0, 1.0];
    input.max_jerk = [4.0, 3.0, 2.0];

    let trajectory = otg.calculate(&input)?;
    println!("Trajectory duration: {:.4} [s]", trajectory.duration());

    let new_time = 1.0;
    let state = trajectory.state_at(new_time);
    println!("Position at time {new_time:.4} [s]: {}", join(&state.position));

    for (dof, ext) in trajectory.position_extrema().iter().enumerate() {
        println!(
            "Axis {dof}: position in [{:.4}, {:.4}], reached at {:.4} s and {:.4} s",
            ext.min, ext.max, ext.t_min, ext.t_max
        );
    }
    Ok(())
}
