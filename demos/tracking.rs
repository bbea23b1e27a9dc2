//! Follows a sinusoidal target that is only known sample by sample.

use scurve_otg::{join, InputParameter, TargetState, TrackingGenerator};

fn model_sinus(t: f64, rate: f64) -> TargetState<[f64; 1]> {
    TargetState {
        position: [(rate * t).sin()],
        velocity: [rate * (rate * t).cos()],
        acceleration: [-rate * rate * (rate * t).sin()],
    }
}

fn main() -> scurve_otg::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let delta_time = 0.01;
    let mut otg = TrackingGenerator::<[f64; 1]>::new(1, delta_time);
    otg.set_reactiveness(1.0)?;
    let mut input = InputParameter::new(1);
    let mut output = otg.output();

    input.max_velocity = [0.8];
    input.max_acceleration = [2.0];
    input.max_jerk = [5.0];
    input.min_position = Some([-2.5]);
    input.max_position = Some([2.5]);

    println!("target | follow");
    for step in 0..500 {
        let target = model_sinus(delta_time * step as f64, 0.4);
        let status = otg.update(&target, &input, &mut output);
        if status.is_error() {
            eprintln!("Tracking stopped with {status:?}");
            break;
        }
        println!("{} {}", join(&target.position), join(&output.new_position));
        output.pass_to_input(&mut input);
    }
    Ok(())
}
