//! Error types for the model layer.

/// Everything that can go wrong when talking to the snippet or user store.
///
/// The enum is closed: handlers match it exhaustively, and
/// each variant maps to exactly one visible outcome.
///
/// | Variant              | Visitor sees                               |
/// |----------------------|--------------------------------------------|
/// | `NotFound`           | 404 page                                   |
/// | `InvalidCredentials` | login form re-rendered with a form error   |
/// | `DuplicateEmail`     | signup form re-rendered with an email error|
/// | `Storage`            | generic server error                       |
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    /// No matching record (missing or expired snippet, unknown user id).
    #[error("no matching record found")]
    NotFound,

    /// Email unknown OR password wrong. Which one is never revealed.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Another user already registered this email address.
    #[error("duplicate email")]
    DuplicateEmail,

    /// Anything else the store or the password hasher reported.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl From<argon2::password_hash::Error> for ModelError {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Storage(format!("password hash: {value}"))
    }
}
