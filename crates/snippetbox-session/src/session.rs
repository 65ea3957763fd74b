//! Session types: the per-visitor state carried through one request.
//!
//! A [`Session`] is the in-memory view of one visitor's server-side state
//! while a request is being handled. It tracks:
//! - WHICH token identifies it (none yet for brand-new visitors)
//! - WHAT values it holds (encoded bytes, keyed by name)
//! - WHEN it stops being valid (absolute deadline)
//! - WHETHER it changed and needs to be written back

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::CookieConfig;

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Absolute lifetime of a session, counted from creation or from the
    /// last token renewal. After it elapses the session and all its values
    /// are discarded.
    ///
    /// Default: 12 hours.
    pub lifetime: Duration,

    /// How the session token travels to the visitor.
    pub cookie: CookieConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime: Duration::from_secs(12 * 60 * 60),
            cookie: CookieConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// SessionStatus
// ---------------------------------------------------------------------------

/// What needs to happen to a session when the request finishes.
///
/// ```text
///   Unmodified ──(put / remove / renew)──→ Modified
///       │                                     │
///       └──────────(destroy)──→ Destroyed ←───┘
///                                   │
///                                   └──(put)──→ Modified (new token)
/// ```
///
/// - **Unmodified**: loaded and only read. Nothing to write, no cookie.
/// - **Modified**: values or token changed. Written back on commit and the
///   cookie is (re)sent.
/// - **Destroyed**: server state deleted. The cookie is expired on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Unmodified,
    Modified,
    Destroyed,
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// One visitor's session, as seen by the request currently handling it.
///
/// Values are stored already encoded; use the typed accessors on
/// [`SessionManager`](crate::SessionManager) to read and write them.
#[derive(Debug, Clone)]
pub struct Session {
    /// The token the visitor presents. `None` until the session is first
    /// committed or renewed.
    pub(crate) token: Option<String>,

    pub(crate) values: HashMap<String, Vec<u8>>,

    /// Absolute expiry. Reset by token renewal.
    pub(crate) deadline: Instant,

    pub(crate) status: SessionStatus,
}

impl Session {
    /// A brand-new, empty session that expires `lifetime` from now.
    pub(crate) fn fresh(lifetime: Duration) -> Self {
        Self {
            token: None,
            values: HashMap::new(),
            deadline: Instant::now() + lifetime,
            status: SessionStatus::Unmodified,
        }
    }

    /// The current token, if one has been issued.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// `true` if a value is stored under `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Names of every stored value, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Marks the session as needing a write, reviving a destroyed one.
    pub(crate) fn touch(&mut self) {
        self.status = SessionStatus::Modified;
    }
}
