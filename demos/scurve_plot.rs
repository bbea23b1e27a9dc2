use std::error::Error;

use gnuplot::*;
use scurve_otg::{AxisLimits, AxisState, ControlInterface, SCurve};

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // -----------------------
    // 1. Set up parameters
    // -----------------------
    let start = AxisState::new(0.0, 0.0, 0.0);
    let target = AxisState::new(50.0, 0.0, 0.0);

    // Motion limits
    let v_lim = 20.0; // Maximum velocity
    let a_lim = 10.0; // Maximum acceleration
    let j_lim = 40.0; // Maximum jerk

    // ---------------------
    // 2. Process S-curve
    // ---------------------
    let scurve = SCurve::new(AxisLimits::new(v_lim, a_lim, j_lim), ControlInterface::Position);
    let profile = scurve.minimum_time(0, start, target)?;
    let total_time = profile.duration;
    println!("Profile case: {:?}", profile.case);

    // -------------------------
    // 3. Sample the profile
    // -------------------------
    let sampling_rate = 1000.0; // points per second
    let num_points = (sampling_rate * total_time).ceil() as usize + 1;

    let mut time_axis = Vec::with_capacity(num_points);
    let mut positions = Vec::with_capacity(num_points);
    let mut velocities = Vec::with_capacity(num_points);
    let mut accelerations = Vec::with_capacity(num_points);

    for i in 0..num_points {
        let t = i as f64 / sampling_rate;
        let state = profile.state_at(t.min(total_time));
        time_axis.push(t);
        positions.push(state.pos);
        velocities.push(state.vel);
        accelerations.push(state.acc);
    }

    let position_error = (profile.end.pos - target.pos).abs();
    if position_error > 1e-6 {
        eprintln!("Warning: final position is off by {position_error:e} units.");
    }

    // --------------
    // 4. Plot data
    // --------------
    let mut fg = Figure::new();
    {
        let axes = fg.axes2d();
        axes.set_title("Position, Velocity, Acceleration vs. Time", &[]);
        axes.set_x_label("Time (s)", &[]);
        axes.set_y_label("Position derivatives", &[]);
        axes.lines(&time_axis, &positions, &[Color("blue"), Caption("Position")]);
        axes.lines(&time_axis, &velocities, &[Color("red"), Caption("Velocity")]);
        axes.lines(&time_axis, &accelerations, &[Color("green"), Caption("Acceleration")]);
    }

    // Attempt to show in a pop-up window (requires gnuplot installed)
    fg.show().map_err(|e| format!("Failed to display plot: {e}"))?;

    println!("Plot generated. Total motion time: {:.3} seconds.", total_time);
    Ok(())
}
