//! Configurable defaults for operation inputs.
//!
//! A [`DefaultsDocument`] holds global and per-resource default values keyed
//! by model field paths. The process-wide document is loaded once, on first
//! use, from the file named by [`DEFAULTS_PATH_ENV`]; bindings may be handed a
//! document directly instead. [`DefaultsResolver`] merges a document into a
//! caller's input without ever replacing a value the caller provided.

mod document;
mod resolver;

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use thiserror::Error;

pub use document::{DefaultsDocument, DEFAULTS_PATH_ENV, SUPPORTED_VERSION};
pub use resolver::DefaultsResolver;

/// Errors raised while loading, validating or applying defaults.
#[derive(Debug, Error)]
pub enum DefaultsError {
    #[error("Defaults file not found: {}", .path.display())]
    ConfigNotFound { path: PathBuf },

    #[error("Failed to read defaults file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse defaults document: {0}")]
    Parse(String),

    #[error("Unsupported defaults document version '{0}', expected '{expected}'", expected = SUPPORTED_VERSION)]
    UnsupportedVersion(String),

    #[error("Invalid default for {path}: {reason}")]
    InvalidDefault { path: String, reason: String },

    #[error("Defaults document does not match the service description: {0}")]
    SchemaValidation(String),
}

static GLOBAL_DEFAULTS: OnceLock<Arc<DefaultsDocument>> = OnceLock::new();

/// Process-wide defaults document.
///
/// Loaded from the environment on first successful call and never reloaded.
/// A failed load is not cached, so a later call may still succeed.
pub fn global() -> Result<Arc<DefaultsDocument>, DefaultsError> {
    if let Some(document) = GLOBAL_DEFAULTS.get() {
        return Ok(Arc::clone(document));
    }
    let loaded = Arc::new(DefaultsDocument::from_env()?);
    log::debug!(
        "Loaded defaults document: {} global entries, {} resources",
        loaded.global.len(),
        loaded.per_resource.len()
    );
    Ok(Arc::clone(GLOBAL_DEFAULTS.get_or_init(|| loaded)))
}
