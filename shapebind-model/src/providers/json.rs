//! JSON provider backed by `serde_json`.
//!
//! Every description document and defaults file passes through here, so JSON
//! errors reach callers as [`ModelError::Json`] with line and column details.

use serde::de::DeserializeOwned;

use crate::errors::{ModelError, Result};

/// Stateless JSON provider using `serde_json`.
///
/// Object key order is preserved (`preserve_order`), which keeps structure
/// members in description order.
#[derive(Debug, Clone)]
pub struct NativeJsonProvider;

impl NativeJsonProvider {
    /// Parse JSON bytes into a typed value.
    pub fn parse_slice<T>(bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(ModelError::from)
    }

    /// Parse a JSON string into a typed value.
    pub fn parse<T>(json_str: &str) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_str(json_str).map_err(ModelError::from)
    }
}
