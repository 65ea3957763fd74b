//! Codec trait and implementations for session values.
//!
//! A session store only ever sees bytes. The session manager turns typed
//! values (`String` flashes, `UserId` identities, ...) into bytes through a
//! [`Codec`] before handing them over, and back again when a request reads
//! them. Swapping the codec never touches the store or the manager.

use serde::{Serialize, de::DeserializeOwned};

use crate::CodecError;

/// Encodes Rust values to bytes and decodes them back.
///
/// ## Trait bounds
///
/// - `Send + Sync` → one codec instance is shared by every request the
///   session manager serves, possibly from several Tokio worker threads.
/// - `'static` → the codec owns everything it needs.
///
/// `decode` asks for `DeserializeOwned` rather than `Deserialize<'de>`: the
/// decoded value must not borrow from the stored bytes, because those bytes
/// belong to the session record and may be replaced on the next `put`.
pub trait Codec: Send + Sync + 'static {
    /// Serializes a value into bytes.
    ///
    /// # Errors
    /// Returns `CodecError::Encode` if the value cannot be represented.
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError>;

    /// Deserializes bytes back into a value.
    ///
    /// # Errors
    /// Returns `CodecError::Decode` if the bytes are malformed or were
    /// written as a different type.
    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError>;
}

// ---------------------------------------------------------------------------
// JsonCodec
// ---------------------------------------------------------------------------

/// A [`Codec`] backed by `serde_json`.
///
/// JSON keeps stored sessions readable when debugging a store by hand.
/// Behind the `json` feature flag (enabled by default).
///
/// ## Example
///
/// ```rust
/// use snippetbox_core::{Codec, JsonCodec, UserId};
///
/// let codec = JsonCodec;
///
/// let bytes = codec.encode(&UserId(7)).unwrap();
/// assert_eq!(bytes, b"7");
///
/// let decoded: UserId = codec.decode(&bytes).unwrap();
/// assert_eq!(decoded, UserId(7));
/// ```
#[cfg(feature = "json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

#[cfg(feature = "json")]
impl Codec for JsonCodec {
    fn encode<T: Serialize + ?Sized>(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        serde_json::to_vec(value).map_err(CodecError::Encode)
    }

    fn decode<T: DeserializeOwned>(&self, data: &[u8]) -> Result<T, CodecError> {
        serde_json::from_slice(data).map_err(CodecError::Decode)
    }
}
