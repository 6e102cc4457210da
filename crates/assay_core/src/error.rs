//! Configuration issues
//!
//! The runtime never fails on bad input: animators clamp to a safe default
//! and log. These errors exist so that tooling can report what was clamped.

use thiserror::Error;

/// A configuration value that an animator will not use as given
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("duration must be positive, got {0}s")]
    NonPositiveDuration(f64),

    #[error("delay must not be negative, got {0}s")]
    NegativeDelay(f64),

    #[error("loop period must be positive, got {0}s")]
    NonPositivePeriod(f64),

    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("spring {field} = {value} is outside the stable range {min}..={max}")]
    SpringOutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
}

/// Check that a value is finite
pub fn ensure_finite(field: &'static str, value: f64) -> Result<f64, ConfigError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ConfigError::NonFinite { field, value })
    }
}
