//! Animation error types
//!
//! Every failure surfaces once, when a config is built or a motion file is
//! parsed. Stepping a frame never fails.

use thiserror::Error;

/// Construction-time animation errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// Spring mass must be positive and finite
    #[error("Invalid mass for '{name}': {mass} (must be positive and finite)")]
    InvalidMass { name: String, mass: f64 },

    /// from/to endpoint lists differ in length
    #[error("Endpoint length mismatch for '{name}': {from} from values, {to} to values")]
    LengthMismatch { name: String, from: usize, to: usize },

    /// Per-index velocities don't line up with the endpoints
    #[error("Velocity length mismatch for '{name}': expected {expected}, got {actual}")]
    VelocityLength {
        name: String,
        expected: usize,
        actual: usize,
    },

    /// A motion parameter is out of range
    #[error("Invalid parameter '{parameter}' for '{name}': {reason}")]
    InvalidParameter {
        name: String,
        parameter: &'static str,
        reason: String,
    },

    /// Motion configuration could not be parsed or resolved
    #[error("Motion config error: {0}")]
    Config(String),
}

impl From<toml::de::Error> for AnimationError {
    fn from(err: toml::de::Error) -> Self {
        AnimationError::Config(err.to_string())
    }
}

/// Result type for animation construction
pub type Result<T> = std::result::Result<T, AnimationError>;
