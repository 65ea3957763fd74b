//! Error types for the session layer.

use snippetbox_core::CodecError;

/// Errors that can occur while loading, changing, or persisting a session.
///
/// Every variant is fatal to the request that hit it: the handler layer
/// answers with a generic server error and never shows these details to the
/// visitor.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// A value could not be encoded for storage, or a stored value could
    /// not be decoded as the type the caller asked for.
    #[error("session value codec failed: {0}")]
    Codec(#[from] CodecError),

    /// The session store failed. When this comes out of
    /// [`renew_token`](crate::SessionManager::renew_token) the visitor's
    /// privilege change must be treated as not having happened.
    #[error("session store failed: {0}")]
    Store(#[from] StoreError),
}

/// Errors reported by a [`SessionStore`](crate::SessionStore)
/// implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The backing storage could not be reached or refused the operation.
    #[error("session store unavailable: {0}")]
    Unavailable(String),
}
