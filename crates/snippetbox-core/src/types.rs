//! Identity types shared across Snippetbox crates.

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// UserId
// ---------------------------------------------------------------------------

/// Opaque reference to a registered user.
///
/// A `UserId` only ever lives in two places: the user store, which hands it
/// out on successful authentication, and the session, where it is kept under
/// the authenticated-identity key. It is not an entity of its own.
///
/// `#[serde(transparent)]` keeps the wire form a bare integer, so a session
/// holding `UserId(7)` stores just `7`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "U-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// SnippetId
// ---------------------------------------------------------------------------

/// Identifier of a stored snippet.
///
/// Snippet ids appear in URLs (`/snippet/view/{id}`), so unlike `UserId`
/// this type knows how to parse itself from text. Only positive integers
/// are valid ids.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct SnippetId(pub i64);

impl fmt::Display for SnippetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a path segment is not a usable snippet id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseSnippetIdError {
    #[error("snippet id is not an integer: {0}")]
    NotInteger(#[from] ParseIntError),

    #[error("snippet id must be positive, got {0}")]
    NotPositive(i64),
}

impl FromStr for SnippetId {
    type Err = ParseSnippetIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id: i64 = s.parse()?;
        if id < 1 {
            return Err(ParseSnippetIdError::NotPositive(id));
        }
        Ok(Self(id))
    }
}
