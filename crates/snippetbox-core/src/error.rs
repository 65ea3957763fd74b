//! Error types for the codec layer.
//!
//! Each Snippetbox crate defines its own error enum. A `CodecError` always
//! means a value could not be turned into bytes or back, never that a store
//! or a user record misbehaved.

/// Errors that can occur while encoding or decoding session values.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Serialization failed (Rust value → bytes).
    #[cfg(feature = "json")]
    #[error("encode failed: {0}")]
    Encode(serde_json::Error),

    /// Deserialization failed (bytes → Rust value).
    ///
    /// Usually means a session value was written as one type and read back
    /// as another, e.g. a flash string read as an integer identity.
    #[cfg(feature = "json")]
    #[error("decode failed: {0}")]
    Decode(serde_json::Error),
}
