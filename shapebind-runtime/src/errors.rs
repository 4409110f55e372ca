//! Error types for the runtime layer.

use std::fmt;
use std::time::Duration;

use shapebind_model::{ModelError, Record};
use thiserror::Error;

use crate::defaults::DefaultsError;
use crate::resources::UnsupportedResource;

/// Service error after decoding its members against the error shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceError {
    pub operation: String,
    pub code: String,
    pub message: String,
    /// Error members decoded into a record of the error shape, when known
    pub details: Option<Record>,
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed with {}: {}", self.operation, self.code, self.message)
    }
}

/// Errors raised by service bindings, resources and waiters.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Defaults(#[from] DefaultsError),

    #[error(transparent)]
    UnsupportedResource(#[from] UnsupportedResource),

    #[error("{0}")]
    Api(ServiceError),

    #[error("Operation {0} is not part of the service description")]
    UnknownOperation(String),

    #[error("Resource {resource} does not support {verb}")]
    OperationNotSupported { resource: String, verb: String },

    #[error("Timed out after {elapsed:?} waiting for {resource}; last status: {}", .status.as_deref().unwrap_or("unknown"))]
    WaitTimeout {
        resource: String,
        status: Option<String>,
        elapsed: Duration,
    },

    #[error("{resource} reached failure status {status}{}", .reason.as_ref().map(|r| format!(": {}", r)).unwrap_or_default())]
    WaitFailure {
        resource: String,
        status: String,
        reason: Option<String>,
    },

    #[error("Wait for {resource} was cancelled")]
    Cancelled { resource: String },

    #[error("Pagination protocol violated by {operation}: token '{token}' returned twice in a row")]
    Pagination { operation: String, token: String },
}

impl RuntimeError {
    pub fn not_supported(resource: impl Into<String>, verb: impl fmt::Display) -> Self {
        Self::OperationNotSupported {
            resource: resource.into(),
            verb: verb.to_string(),
        }
    }

    /// Error code of an API failure.
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::Api(error) => Some(&error.code),
            _ => None,
        }
    }
}

/// Result alias for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wait_failure_message_includes_reason() {
        let error = RuntimeError::WaitFailure {
            resource: "Endpoint my-endpoint".to_string(),
            status: "Failed".to_string(),
            reason: Some("image not found".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Endpoint my-endpoint reached failure status Failed: image not found"
        );
    }

    #[test]
    fn test_wait_timeout_message_without_status() {
        let error = RuntimeError::WaitTimeout {
            resource: "TrainingJob job".to_string(),
            status: None,
            elapsed: Duration::from_secs(3),
        };
        assert!(error.to_string().contains("last status: unknown"));
    }

    #[test]
    fn test_api_code() {
        let error = RuntimeError::Api(ServiceError {
            operation: "DescribeModel".to_string(),
            code: "ResourceNotFound".to_string(),
            message: "missing".to_string(),
            details: None,
        });
        assert_eq!(error.api_code(), Some("ResourceNotFound"));
        assert_eq!(error.to_string(), "DescribeModel failed with ResourceNotFound: missing");
    }
}
