//! Generator construction settings.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{OtgError, Result};

/// Settings shared by [`OnlineGenerator`](crate::OnlineGenerator) and
/// [`TrackingGenerator`](crate::TrackingGenerator).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GeneratorConfig {
    /// Control cycle in seconds (default: 0.01)
    pub delta_time: f64,

    /// Intermediate positions reserved at construction (default: 0)
    pub max_number_of_waypoints: usize,

    /// Tracking blend factor in `[0, 1]` (default: 1.0)
    pub reactiveness: f64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            delta_time: 0.01,
            max_number_of_waypoints: 0,
            reactiveness: 1.0,
        }
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.delta_time > 0.0) || !self.delta_time.is_finite() {
            return Err(OtgError::invalid(format!(
                "delta_time {} must be a positive number of seconds",
                self.delta_time
            )));
        }
        if !(0.0..=1.0).contains(&self.reactiveness) {
            return Err(OtgError::invalid(format!(
                "reactiveness {} is outside [0, 1]",
                self.reactiveness
            )));
        }
        Ok(())
    }

    /// Parses and validates a TOML document. Missing keys take their defaults.
    #[cfg(feature = "toml")]
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(source).map_err(|e| OtgError::invalid(format!("config: {e}")))?;
        config.validate()?;
        Ok(config)
    }
}
