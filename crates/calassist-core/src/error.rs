//! Core error types.
//!
//! These errors are raised before any remote mutation is attempted: an
//! invalid interval or a malformed workday configuration is rejected up
//! front so callers never observe a partial write caused by bad input.

use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors produced by the pure core (validation, reconciliation, scheduling).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An interval whose start is not strictly before its end, or whose
    /// endpoints mix all-day and timed representations.
    #[error("invalid interval for {what}: {start} .. {end}")]
    InvalidInterval {
        /// What the interval belongs to (event summary, query range, ...).
        what: String,
        /// Rendered start point.
        start: String,
        /// Rendered end point.
        end: String,
    },

    /// Malformed scheduling configuration (workday bounds, durations, zones).
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

impl CoreError {
    /// Creates an invalid interval error.
    pub fn invalid_interval(
        what: impl Into<String>,
        start: impl ToString,
        end: impl ToString,
    ) -> Self {
        Self::InvalidInterval {
            what: what.into(),
            start: start.to_string(),
            end: end.to_string(),
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Returns true if this is an invalid interval error.
    pub fn is_invalid_interval(&self) -> bool {
        matches!(self, Self::InvalidInterval { .. })
    }
}
