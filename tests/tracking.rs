use scurve_otg::{InputParameter, Status, TargetState, TrackingGenerator};

fn sinus(t: f64) -> TargetState<[f64; 1]> {
    let w = 0.4;
    TargetState {
        position: [(w * t).sin()],
        velocity: [w * (w * t).cos()],
        acceleration: [-w * w * (w * t).sin()],
    }
}

fn input() -> InputParameter<[f64; 1]> {
    let mut input = InputParameter::new(1);
    input.max_velocity = [0.8];
    input.max_acceleration = [2.0];
    input.max_jerk = [50.0];
    input
}

#[test]
fn follows_a_sinus() {
    let dt = 0.01;
    let mut otg = TrackingGenerator::new(1, dt);
    let mut input = input();
    let mut output = otg.output();

    let mut errors = Vec::new();
    for step in 0..500 {
        let target = sinus(dt * step as f64);
        let status = otg.update(&target, &input, &mut output);
        assert_eq!(status, Status::Working);
        errors.push((output.new_position[0] - target.position[0]).abs());
        output.pass_to_input(&mut input);
    }

    let steady = &errors[400..];
    let worst = steady.iter().cloned().fold(0.0, f64::max);
    assert!(worst < 0.05, "steady-state error {worst}");
}

#[test]
fn zero_reactiveness_does_not_move() {
    let dt = 0.01;
    let mut otg = TrackingGenerator::new(1, dt);
    otg.set_reactiveness(0.0).unwrap();
    let mut input = input();
    let mut output = otg.output();

    for step in 0..100 {
        let status = otg.update(&sinus(dt * step as f64), &input, &mut output);
        assert!(!status.is_error());
        assert_eq!(output.new_position, [0.0]);
        assert_eq!(output.new_velocity, [0.0]);
        output.pass_to_input(&mut input);
    }
}

#[test]
fn axes_track_independently() {
    // the input keeps its default time synchronization
    let dt = 0.01;
    let mut otg = TrackingGenerator::new(2, dt);
    let mut input = InputParameter::new(2);
    input.max_velocity = [0.8, 1.0];
    input.max_acceleration = [2.0, 2.0];
    input.max_jerk = [50.0, 20.0];
    let mut output = otg.output();

    for step in 0..500 {
        let t = dt * step as f64;
        let wave = sinus(t);
        // ramp for one second, then hold
        let (ramp_pos, ramp_vel) = if t < 1.0 { (0.5 * t, 0.5) } else { (0.5, 0.0) };
        let target = TargetState {
            position: [wave.position[0], ramp_pos],
            velocity: [wave.velocity[0], ramp_vel],
            acceleration: [wave.acceleration[0], 0.0],
        };
        let status = otg.update(&target, &input, &mut output);
        assert_eq!(status, Status::Working, "step {step}");
        output.pass_to_input(&mut input);
    }
    assert!((output.new_position[1] - 0.5).abs() < 1e-6);
}
