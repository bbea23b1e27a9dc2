//! Error taxonomy of the trajectory generator.

use thiserror::Error;

/// Failure raised while validating or planning a trajectory.
///
/// Planning never panics on user input. Every failure surfaces as one of these
/// variants and the online generator turns it into a terminal [`Status`](crate::Status).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OtgError {
    /// Malformed limits, mismatched array sizes or contradictory bounds.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// No common duration satisfies the bounds of every axis.
    #[error("Synchronization infeasible: axis {axis} cannot be stretched to {duration:.6} s")]
    SynchronizationInfeasible { axis: usize, duration: f64 },

    /// The root finder did not converge within its iteration cap.
    #[error("Duration computation failed for axis {axis}")]
    DurationComputationFailed { axis: usize },

    /// The trajectory leaves the `[min_position, max_position]` window.
    #[error("Positional limits violated on axis {axis}: reaches [{min:.6}, {max:.6}]")]
    PositionalLimits { axis: usize, min: f64, max: f64 },
}

impl OtgError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        OtgError::InvalidInput(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, OtgError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages() {
        let err = OtgError::invalid("max_jerk[1] must be positive");
        assert_eq!(err.to_string(), "Invalid input: max_jerk[1] must be positive");

        let err = OtgError::SynchronizationInfeasible { axis: 2, duration: 1.5 };
        assert_eq!(
            err.to_string(),
            "Synchronization infeasible: axis 2 cannot be stretched to 1.500000 s"
        );

        let err = OtgError::DurationComputationFailed { axis: 0 };
        assert!(err.to_string().contains("axis 0"));
    }
}
