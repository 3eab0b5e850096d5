//! Validation errors surfaced at the simulator boundary
//!
//! The simulation itself has no recoverable runtime failures (no I/O, no
//! external calls); every error here is a rejection of invalid input,
//! carrying the offending value and the allowed domain.

use thiserror::Error;

/// Boundary validation failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Algorithm name not in the closed enum
    #[error("unknown load balancing algorithm '{requested}', valid algorithms: {valid:?}")]
    UnknownAlgorithm {
        requested: String,
        valid: &'static [&'static str],
    },

    /// History window outside the supported range
    #[error("history window must be between 1 and {max_minutes} minutes, got {requested}")]
    InvalidWindow { requested: i64, max_minutes: i64 },

    /// Failure injection duration outside the supported range
    #[error("failure duration must be between {min_secs} and {max_secs} seconds, got {requested}")]
    InvalidDuration {
        requested: i64,
        min_secs: i64,
        max_secs: i64,
    },

    /// Pod pool bounds are inverted
    #[error("min_pods ({min_pods}) must not exceed max_pods ({max_pods})")]
    InvalidPodBounds { min_pods: u32, max_pods: u32 },
}
