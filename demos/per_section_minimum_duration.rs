//! Offline trajectory through waypoints with a lower bound on each section.

use scurve_otg::{InputParameter, OnlineGenerator};

fn main() -> scurve_otg::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut otg = OnlineGenerator::<[f64; 3]>::with_waypoints(3, 0.01, 8);
    let mut input = InputParameter::new(3);

    input.current_position = [0.8, 0.0, 0.5];
    input.target_position = [0.5, -3.0, 3.0];

    input.intermediate_positions = vec![
        [1.4, -1.6, 1.0],
        [-0.6, -0.5, 0.4],
        [-0.4, -0.35, 0.0],
        [-0.2, 0.35, -0.1],
        [0.2, 0.5, -0.1],
        [0.8, 1.8, -0.1],
    ];

    input.max_velocity = [3.0, 2.0, 2.0];
    input.max_acceleration = [6.0, 4.0, 4.0];
    input.max_jerk = [16.0, 10.0, 20.0];

    // one entry per section, 0 leaves a section unconstrained
    input.per_section_minimum_duration = Some(vec![0.0, 2.0, 0.0, 1.0, 0.0, 2.0, 0.0]);

    let trajectory = otg.calculate(&input)?;
    println!("Trajectory duration: {:.4} [s]", trajectory.duration());
    for (i, block) in trajectory.blocks().iter().enumerate() {
        println!("Section {i}: {:.4} [s]", block.duration);
    }
    Ok(())
}
