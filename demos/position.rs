//! Online generation of a 3-axis trajectory in a 10 ms control loop.
//!
//! ```text
//! RUST_LOG=scurve_otg=debug cargo run --example position
//! ```

use scurve_otg::{join, InputParameter, OnlineGenerator, Status};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut otg = OnlineGenerator::<[f64; 3]>::new(3, 0.01);
    let mut input = InputParameter::new(3);
    let mut output = otg.output();

    input.current_position = [0.0, 0.0, 0.5];
    input.current_velocity = [0.0, -2.2, -0.5];
    input.current_acceleration = [0.0, 2.5, -0.5];

    input.target_position = [5.0, -2.0, -3.5];
    input.target_velocity = [0.0, -0.5, -2.0];
    input.target_acceleration = [0.0, 0.0, 0.5];

    input.max_velocity = [3.0, 1.0, 3.0];
    input.max_acceleration = [3.0, 2.0, 1.0];
    input.max_jerk = [4.0, 3.0, 2.0];

    println!("t | position");
    let mut status = otg.update(&input, &mut output);
    while status == Status::Working {
        println!("{:.2} | {}", output.time, join(&output.new_position));
        output.pass_to_input(&mut input);
        status = otg.update(&input, &mut output);
    }

    match status {
        Status::Finished => println!("Trajectory duration: {:.4} [s].", output.trajectory.duration()),
        error => eprintln!("Generation stopped with {error:?}"),
    }
}
