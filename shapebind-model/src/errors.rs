//! Error types for description parsing, graph construction and the structural codec.

use thiserror::Error;

/// Errors raised while building a shape graph or converting values against it.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The service description cannot be resolved into a finite shape graph.
    #[error("Malformed service description: {message}")]
    MalformedDescription { message: String },

    /// A required member had no value while encoding a request.
    #[error("Missing required field '{field}' of shape {shape} at {path}")]
    MissingRequiredField {
        shape: String,
        /// Model-cased member name, as the caller spells it.
        field: String,
        path: String,
    },

    /// A value is not part of a closed enumeration.
    #[error("Invalid value '{value}' for enum {shape} at {path}, expected one of [{allowed}]")]
    InvalidEnumValue {
        shape: String,
        value: String,
        allowed: String,
        path: String,
    },

    /// A value has a different kind than its shape.
    #[error("Type mismatch at {path}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        path: String,
    },

    /// A record field that is not a member of the target structure.
    #[error("Unknown field '{field}' for shape {shape} at {path}")]
    UnknownField {
        shape: String,
        field: String,
        path: String,
    },

    /// Recursion went deeper than the configured limit.
    #[error("Nesting depth limit of {limit} exceeded at {path}")]
    DepthLimitExceeded { limit: usize, path: String },

    /// JSON parsing or serialization failed.
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ModelError {
    /// Create a malformed-description error.
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedDescription {
            message: message.into(),
        }
    }

    /// Create a type mismatch error.
    pub fn type_mismatch(
        expected: impl Into<String>,
        found: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
            path: path.into(),
        }
    }

    /// Create an invalid enum value error; `allowed` is rendered comma-separated.
    pub fn invalid_enum<S: AsRef<str>>(
        shape: impl Into<String>,
        value: impl Into<String>,
        allowed: &[S],
        path: impl Into<String>,
    ) -> Self {
        Self::InvalidEnumValue {
            shape: shape.into(),
            value: value.into(),
            allowed: allowed
                .iter()
                .map(AsRef::as_ref)
                .collect::<Vec<_>>()
                .join(", "),
            path: path.into(),
        }
    }
}

/// Result alias for model operations.
pub type Result<T> = std::result::Result<T, ModelError>;
