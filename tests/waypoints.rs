use approx::assert_abs_diff_eq;
use scurve_otg::{InputParameter, OnlineGenerator, Status, Synchronization};

fn route() -> InputParameter<[f64; 2]> {
    let mut input = InputParameter::new(2);
    input.target_position = [3.0, 0.0];
    input.intermediate_positions = vec![[1.0, 0.5], [2.0, -0.5]];
    input.max_velocity = [1.0, 1.0];
    input.max_acceleration = [2.0, 2.0];
    input.max_jerk = [5.0, 5.0];
    input
}

#[test]
fn passes_through_every_waypoint() {
    let mut otg = OnlineGenerator::with_waypoints(2, 0.01, 4);
    let input = route();
    let trajectory = otg.calculate(&input).unwrap();

    let passes = trajectory.intermediate_durations();
    assert_eq!(passes.len(), 2);
    for (waypoint, &t) in input.intermediate_positions.iter().zip(&passes) {
        let state = trajectory.state_at(t);
        assert_abs_diff_eq!(state.position[0], waypoint[0], epsilon = 1e-6);
        assert_abs_diff_eq!(state.position[1], waypoint[1], epsilon = 1e-6);
    }
    let end = trajectory.state_at(trajectory.duration());
    assert_abs_diff_eq!(end.position[0], 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(end.position[1], 0.0, epsilon = 1e-6);
}

#[test]
fn motion_is_continuous_across_junctions() {
    let mut otg = OnlineGenerator::with_waypoints(2, 0.01, 4);
    let trajectory = otg.calculate(&route()).unwrap();

    let blocks = trajectory.blocks();
    for pair in blocks.windows(2) {
        for dof in 0..2 {
            let end = pair[0].end_state(dof);
            let start = pair[1].profiles[dof].start();
            assert_eq!(end, start);
        }
    }

    let eps = 1e-7;
    for &t in &trajectory.intermediate_durations() {
        let before = trajectory.state_at(t - eps);
        let after = trajectory.state_at(t + eps);
        for dof in 0..2 {
            assert!((before.velocity[dof] - after.velocity[dof]).abs() < 1e-5);
            assert!((before.acceleration[dof] - after.acceleration[dof]).abs() < 1e-4);
        }
    }
}

#[test]
fn per_section_floor_is_applied() {
    let mut otg = OnlineGenerator::with_waypoints(2, 0.01, 4);
    let mut input = route();
    input.per_section_minimum_duration = Some(vec![0.0, 2.0, 0.0]);
    let trajectory = otg.calculate(&input).unwrap();

    let blocks = trajectory.blocks();
    assert_eq!(blocks.len(), 3);
    let minimal = blocks[1].minimal_durations.iter().cloned().fold(0.0, f64::max);
    assert_eq!(blocks[1].duration, minimal.max(2.0));
    assert!(blocks[1].duration >= 2.0);
}

#[test]
fn too_many_waypoints_is_invalid() {
    let mut otg = OnlineGenerator::with_waypoints(2, 0.01, 1);
    let input = route();
    let mut output = otg.output();
    assert_eq!(otg.update(&input, &mut output), Status::ErrorInvalidInput);
}

#[test]
fn online_run_reaches_target_through_waypoints() {
    let mut otg = OnlineGenerator::with_waypoints(2, 0.01, 4);
    let mut input = route();
    let mut output = otg.output();
    let mut status = otg.update(&input, &mut output);
    let mut cycles = 0;
    while status == Status::Working && cycles < 100_000 {
        output.pass_to_input(&mut input);
        status = otg.update(&input, &mut output);
        cycles += 1;
    }
    assert_eq!(status, Status::Finished);
    assert_abs_diff_eq!(output.new_position[0], 3.0, epsilon = 1e-6);
    assert_abs_diff_eq!(output.new_position[1], 0.0, epsilon = 1e-6);
}

#[test]
fn junctions_rest_in_acceleration_and_join_smoothly() {
    let mut input = InputParameter::new(3);
    input.current_velocity = [0.3, 0.0, -0.2];
    input.target_position = [3.0, 0.0, -3.0];
    // axis 1 reverses at both waypoints, the others keep their direction
    input.intermediate_positions = vec![[1.0, 0.5, -1.0], [2.0, -0.5, -1.5]];
    input.max_velocity = [1.0, 1.0, 1.5];
    input.max_acceleration = [2.0, 1.5, 2.0];
    input.max_jerk = [5.0, 4.0, 8.0];
    input.synchronization = Synchronization::Time;

    let mut otg = OnlineGenerator::with_waypoints(3, 0.01, 4);
    let trajectory = otg.calculate(&input).unwrap();
    let blocks = trajectory.blocks();
    assert_eq!(blocks.len(), 3);

    // each block starts where the previous one actually ended
    for pair in blocks.windows(2) {
        for dof in 0..3 {
            assert_eq!(pair[0].end_state(dof), pair[1].profiles[dof].start());
        }
    }

    let eps = 1e-7;
    for (waypoint, &t) in input.intermediate_positions.iter().zip(&trajectory.intermediate_durations()) {
        let at = trajectory.state_at(t);
        let before = trajectory.state_at(t - eps);
        let after = trajectory.state_at(t + eps);
        for dof in 0..3 {
            assert_abs_diff_eq!(at.position[dof], waypoint[dof], epsilon = 1e-6);
            assert_abs_diff_eq!(at.acceleration[dof], 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(before.position[dof], after.position[dof], epsilon = 1e-6);
            assert_abs_diff_eq!(before.velocity[dof], after.velocity[dof], epsilon = 1e-5);
            assert_abs_diff_eq!(before.acceleration[dof], after.acceleration[dof], epsilon = 1e-4);
        }
        assert!(at.velocity[0] >= -1e-9);
        assert_abs_diff_eq!(at.velocity[1], 0.0, epsilon = 1e-6);
        assert!(at.velocity[2] <= 1e-9);
    }
}

#[test]
fn moving_boundaries_through_four_waypoints() {
    let mut input = InputParameter::new(3);
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

    let mut otg = OnlineGenerator::with_waypoints(3, 0.01, 10);
    let trajectory = otg.calculate(&input).unwrap();
    assert_eq!(trajectory.blocks().len(), 5);

    let end = trajectory.state_at(trajectory.duration());
    for dof in 0..3 {
        assert_abs_diff_eq!(end.position[dof], input.target_position[dof], epsilon = 1e-6);
        assert_abs_diff_eq!(end.velocity[dof], input.target_velocity[dof], epsilon = 1e-6);
        assert_abs_diff_eq!(end.acceleration[dof], input.target_acceleration[dof], epsilon = 1e-6);
    }
}
