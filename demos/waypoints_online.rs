//! Online generation through intermediate positions.

use scurve_otg::{join, GeneratorConfig, InputParameter, OnlineGenerator, Status};

fn main() -> scurve_otg::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = GeneratorConfig {
        max_number_of_waypoints: 10,
        ..Default::default()
    };
    let mut otg = OnlineGenerator::<[f64; 3]>::from_config(3, &config)?;
    let mut input = InputParameter::new(3);
    let mut output = otg.output();

    input.current_position = [0.2, 0.0, -0.3];
    input.current_velocity = [0.0, 0.2, 0.0];
    input.current_acceleration = [0.0, 0.6, 0.0];

    input.intermediate_positions = vec![
        [1.4, -1.6, 1.0],
        [-0.6, -0.5, 0.4],
        [-0.4, -0.35, 0.0],
        [0.8, 1.8, -0.1],
    ];

    input.target_position = [0.5, 1.0, 0.0];
    input.target_velocity = [0.2, 0.0, 0.3];
    input.target_acceleration = [0.0, 0.1, -0.1];

    input.max_velocity = [1.0, 2.0, 1.0];
    input.max_acceleration = [3.0, 2.0, 2.0];
    input.max_jerk = [6.0, 10.0, 20.0];

    input.interrupt_calculation_duration = Some(500.0); // [us]

    println!("t | position");
    let mut status = otg.update(&input, &mut output);
    while status == Status::Working {
        if output.new_calculation {
            println!("Updated the trajectory in {:.1} [us].", output.calculation_duration);
        }
        println!("{:.2} | {}", output.time, join(&output.new_position));
        output.pass_to_input(&mut input);
        status = otg.update(&input, &mut output);
    }

    println!("Reached target after {:.4} [s].", output.trajectory.duration());
    for (i, t) in output.trajectory.intermediate_durations().iter().enumerate() {
        println!("Waypoint {i} passed at {t:.4} [s].");
    }
    Ok(())
}
