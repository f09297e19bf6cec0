//! Configuration validation utilities and rules

use std::fmt;

use crate::errors::NcnError;

/// Configuration validation result
pub type ValidationResult = Result<(), ValidationError>;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Value is out of acceptable range
    OutOfRange {
        /// Offending field
        field: String,
        /// Inclusive lower bound, if any
        min: Option<u64>,
        /// Inclusive upper bound, if any
        max: Option<u64>,
        /// Value found
        actual: u64,
    },
    /// Value format is invalid
    InvalidFormat {
        /// Offending field
        field: String,
        /// Shape the field should have
        expected: String,
        /// Value found
        actual: String,
    },
    /// Custom validation failed
    Custom {
        /// Offending field
        field: String,
        /// What is wrong with it
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => {
                let range_desc = match (min, max) {
                    (Some(min), Some(max)) => format!("between {min} and {max}"),
                    (Some(min), None) => format!("at least {min}"),
                    (None, Some(max)) => format!("at most {max}"),
                    (None, None) => "in valid range".to_string(),
                };
                write!(f, "Field '{field}' must be {range_desc} (got {actual})")
            }
            ValidationError::InvalidFormat {
                field,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "Field '{field}' has invalid format. Expected: {expected}, got: {actual}"
                )
            }
            ValidationError::Custom { field, message } => {
                write!(f, "Field '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl From<ValidationError> for NcnError {
    fn from(err: ValidationError) -> Self {
        NcnError::invalid(err.to_string())
    }
}

/// Trait for configuration validation
pub trait ConfigValidation {
    /// Validate this configuration
    fn validate(&self) -> ValidationResult;
}

/// Require `actual >= min`.
pub fn at_least(field: &str, actual: u64, min: u64) -> ValidationResult {
    if actual < min {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: Some(min),
            max: None,
            actual,
        });
    }
    Ok(())
}
