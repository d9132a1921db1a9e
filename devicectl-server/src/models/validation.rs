//! Validation error types

use std::fmt;

/// Validation error for request input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Field is empty when it shouldn't be
    Empty { field: &'static str },

    /// Required query parameter is absent
    Missing { field: &'static str },

    /// Device id in path or query is not an integer
    InvalidId { raw: String },

    /// Request body is not valid JSON for the expected shape
    MalformedBody { detail: String },

    /// Query string does not match the expected parameters
    MalformedQuery { detail: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty { field } => write!(f, "{} cannot be empty", field),
            Self::Missing { field } => write!(f, "{} is required", field),
            Self::InvalidId { raw } => write!(f, "Invalid device ID: '{}'", raw),
            Self::MalformedBody { detail } => write!(f, "Invalid request body: {}", detail),
            Self::MalformedQuery { detail } => write!(f, "Invalid query string: {}", detail),
        }
    }
}

impl std::error::Error for ValidationError {}
