//! Error handling for towercal
//!
//! Provides structured error types for every layer of the pipeline:
//! - Validation errors (malformed or out-of-range input)
//! - Schedule errors (defensive interpolation invariants)
//! - Engine errors (toolpath generation failures, passed through opaque)
//!
//! All error types use `thiserror` for ergonomic error handling. Every
//! failure carries the offending field identifier and enough structure
//! for a caller to render a localized message without this crate knowing
//! about localization.

use crate::types::Field;
use thiserror::Error;

/// Validation error type
///
/// Returned by the parameter validator. The variant is the failure
/// category; range failures carry the violated closed bounds.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// The raw value could not be parsed as the expected type
    #[error("Malformed value for '{field}'")]
    Format {
        /// The field whose raw value failed to parse.
        field: Field,
    },

    /// The parsed value falls outside its closed valid range
    #[error("Value for '{field}' out of range: {value} (valid: {min}..{max})")]
    OutOfRange {
        /// The field whose value is out of range.
        field: Field,
        /// The offending value.
        value: f64,
        /// Lower bound of the valid range, inclusive.
        min: f64,
        /// Upper bound of the valid range, inclusive.
        max: f64,
    },

    /// A required exclusive selection was not made, or was made twice
    #[error("No valid selection for '{field}'")]
    MissingSelection {
        /// The field requiring exactly one selection.
        field: Field,
    },
}

impl ValidationError {
    /// The field the failure is attached to.
    pub fn field(&self) -> Field {
        match self {
            Self::Format { field }
            | Self::OutOfRange { field, .. }
            | Self::MissingSelection { field } => *field,
        }
    }
}

/// Schedule error type
///
/// Defensive failure raised when interpolation is handed a parameter set
/// violating its own invariants. Indicates a validator bug, never a
/// normal user-facing outcome.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScheduleError {
    /// An interpolation precondition did not hold
    #[error("Schedule invariant violated: {reason}")]
    InvariantViolation {
        /// Description of the violated precondition.
        reason: String,
    },
}

/// Engine error type
///
/// Failures reported by a toolpath engine. Reasons are opaque to the
/// core and surfaced unmodified to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// The engine rejected the request configuration
    #[error("Engine rejected request: {reason}")]
    Rejected {
        /// The engine's rejection reason.
        reason: String,
    },

    /// The requested geometry cannot be produced
    #[error("Geometry infeasible: {reason}")]
    Infeasible {
        /// The engine's infeasibility reason.
        reason: String,
    },

    /// Generic engine error
    #[error("Engine error: {message}")]
    Other {
        /// The error message.
        message: String,
    },
}

/// Main error type for towercal
///
/// A unified error type that can represent any error from all layers.
/// This is the primary error type used in public APIs.
#[derive(Error, Debug)]
pub enum Error {
    /// Validation error
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Schedule error
    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    /// Engine error
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Error::Validation(_))
    }

    /// Check if this is an engine error
    pub fn is_engine_error(&self) -> bool {
        matches!(self, Error::Engine(_))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_display() {
        let err = ValidationError::Format {
            field: Field::BedSizeX,
        };
        assert_eq!(err.to_string(), "Malformed value for 'bed_size_x'");

        let err = ValidationError::OutOfRange {
            field: Field::LayerHeight,
            value: 0.01,
            min: 0.05,
            max: 0.3,
        };
        assert_eq!(
            err.to_string(),
            "Value for 'layer_height' out of range: 0.01 (valid: 0.05..0.3)"
        );

        let err = ValidationError::MissingSelection {
            field: Field::Firmware,
        };
        assert_eq!(err.to_string(), "No valid selection for 'firmware'");
    }

    #[test]
    fn test_validation_error_field() {
        let err = ValidationError::OutOfRange {
            field: Field::PrintSpeed,
            value: 5.0,
            min: 10.0,
            max: 1000.0,
        };
        assert_eq!(err.field(), Field::PrintSpeed);
    }

    #[test]
    fn test_engine_error_display() {
        let err = EngineError::Infeasible {
            reason: "towers do not fit on the bed".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Geometry infeasible: towers do not fit on the bed"
        );
    }

    #[test]
    fn test_error_conversion() {
        let validation_err = ValidationError::Format {
            field: Field::Flow,
        };
        let err: Error = validation_err.into();
        assert!(err.is_validation_error());
        assert!(!err.is_engine_error());

        let engine_err = EngineError::Other {
            message: "module not initialized".to_string(),
        };
        let err: Error = engine_err.into();
        assert!(err.is_engine_error());
    }
}
