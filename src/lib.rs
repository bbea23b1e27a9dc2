//! # scurve_otg
//!
//! Online and offline jerk-limited trajectory generation for multi-axis systems.
//!
//! The library is organised in the following modules:
//! - `scurve` for the time-optimal profile of a single axis.
//! - `synchronizer` for aligning the profiles of all axes of one block.
//! - `waypoints` for chaining blocks through intermediate positions.
//! - `trajectory` for evaluating a planned trajectory at any time.
//! - `online` for the per-cycle generator driving a control loop.
//! - `tracking` for following a moving target.
//!
//! Author: Anton Khrustalev, creapunk

pub mod block;
mod calculator;
pub mod config;
pub mod error;
pub mod input;
pub mod motion_polynomial;
pub mod online;
pub mod output;
pub mod profile;
pub mod roots;
pub mod scurve;
pub mod state;
mod synchronizer;
pub mod tracking;
pub mod trajectory;
pub mod vector;
mod waypoints;

// Re-export main structs for convenience:
pub use block::Block;
pub use config::GeneratorConfig;
pub use error::{OtgError, Result};
pub use input::{ControlInterface, InputParameter, Synchronization};
pub use motion_polynomial::MotionPolynomial;
pub use online::{decide, Decision, OnlineGenerator};
pub use output::{OutputParameter, Status};
pub use profile::{Profile, ProfileCase};
pub use scurve::SCurve;
pub use state::{AxisLimits, AxisState, KinematicState};
pub use tracking::{TargetState, TrackingGenerator};
pub use trajectory::{PositionExtrema, Trajectory};
pub use vector::{join, AxisVector};
