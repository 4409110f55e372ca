//! Shims around serialization primitives shared by both crates.

pub(crate) mod json;

/// Type alias for the JSON provider implementation.
///
/// Resolves to [`NativeJsonProvider`](json::NativeJsonProvider).
pub type JsonProvider = json::NativeJsonProvider;
