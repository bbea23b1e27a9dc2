//! Switches to velocity control after one second to stop every axis
//! independently as fast as possible.

use scurve_otg::{join, ControlInterface, InputParameter, OnlineGenerator, Status, Synchronization};

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
    let mut on_stop_trajectory = false;
    let mut status = otg.update(&input, &mut output);
    while status == Status::Working {
        println!("{:.2} | {}", output.time, join(&output.new_position));

        if output.time >= 1.0 && !on_stop_trajectory {
            println!("Stop immediately.");
            on_stop_trajectory = true;

            input.control_interface = ControlInterface::Velocity;
            input.synchronization = Synchronization::None;
            input.target_velocity = [0.0; 3];
            input.target_acceleration = [0.0; 3];
            input.max_jerk = [12.0, 10.0, 8.0];
        }

        output.pass_to_input(&mut input);
        status = otg.update(&input, &mut output);
    }

    println!("Stop trajectory duration: {:.4} [s].", output.trajectory.duration());
}
