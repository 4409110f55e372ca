//! The seam to the API client.
//!
//! Transport, authentication, signing and retries live behind [`Invoker`];
//! this crate only hands it an operation name plus a wire request and reads
//! back a wire response or an [`ApiError`].

use std::fmt;

use shapebind_model::WireValue;
use thiserror::Error;

/// Error reported by the service, keyed by error-shape name.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{code}: {message}")]
pub struct ApiError {
    /// Error shape name (e.g. "ResourceNotFound")
    pub code: String,
    pub message: String,
    /// Remaining error members in wire format
    pub fields: WireValue,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            fields: WireValue::object(),
        }
    }

    #[must_use]
    pub fn with_fields(mut self, fields: WireValue) -> Self {
        self.fields = fields;
        self
    }
}

/// Synchronous operation invoker.
///
/// Implementations must be shareable across threads: concurrent waits on
/// different resources call the same invoker.
pub trait Invoker: Send + Sync {
    fn invoke(&self, operation: &str, request: &WireValue) -> Result<WireValue, ApiError>;
}

impl<F> Invoker for F
where
    F: Fn(&str, &WireValue) -> Result<WireValue, ApiError> + Send + Sync,
{
    fn invoke(&self, operation: &str, request: &WireValue) -> Result<WireValue, ApiError> {
        self(operation, request)
    }
}

/// How an invoker error affects a wait in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The resource does not exist (anymore)
    NotFound,
    /// Worth another poll
    Transient,
    /// Stops the wait
    Fatal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotFound => "not-found",
            Self::Transient => "transient",
            Self::Fatal => "fatal",
        };
        f.write_str(name)
    }
}

/// Classifies [`ApiError`]s by substring match on the error code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorClassifier {
    pub not_found_codes: Vec<String>,
    pub transient_codes: Vec<String>,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self {
            not_found_codes: vec!["ResourceNotFound".to_string(), "NotFound".to_string()],
            transient_codes: vec![
                "Throttling".to_string(),
                "ThrottledException".to_string(),
                "ServiceUnavailable".to_string(),
                "InternalFailure".to_string(),
                "RequestTimeout".to_string(),
            ],
        }
    }
}

impl ErrorClassifier {
    pub fn classify_code(&self, error_code: &str) -> ErrorClass {
        let matches = |codes: &[String]| codes.iter().any(|code| error_code.contains(code.as_str()));
        if matches(&self.not_found_codes) {
            ErrorClass::NotFound
        } else if matches(&self.transient_codes) {
            ErrorClass::Transient
        } else {
            ErrorClass::Fatal
        }
    }
}
