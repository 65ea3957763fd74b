//! Server-side session management for Snippetbox.
//!
//! This crate handles the lifecycle of a visitor's session:
//!
//! 1. **Loading** — turning the token from the visitor's cookie into the
//!    session state kept in a [`SessionStore`]
//! 2. **Values** — typed `put`/`get`/`pop`/`remove` of per-visitor values
//!    (flash messages, the authenticated identity)
//! 3. **Renewal** — swapping the token for a fresh one after every privilege
//!    change, so a token seen before login is worthless after it
//! 4. **Committing** — persisting changes and producing the cookie to send
//!    back ([`SessionCookie`])
//!
//! # How it fits in the stack
//!
//! ```text
//! App / Auth (above)  ← decides WHEN to renew, what identity to store
//!     ↕
//! Session Layer (this crate)  ← tokens, values, expiry, cookie policy
//!     ↕
//! SessionStore (below)  ← durable token → bytes storage with TTL
//! ```
//!
//! # Per-request flow
//!
//! ```rust
//! # async fn demo() -> Result<(), snippetbox_session::SessionError> {
//! use snippetbox_session::{MemoryStore, SessionConfig, SessionManager};
//!
//! let manager = SessionManager::new(MemoryStore::new(), SessionConfig::default());
//!
//! // No cookie yet: a fresh session without a token.
//! let mut session = manager.load(None).await?;
//! manager.put(&mut session, "flash", "Hello!")?;
//!
//! // Commit mints the token and tells us what cookie to set.
//! let cookie = manager.commit(&mut session).await?.expect("modified session sets a cookie");
//!
//! // Next request comes back with that token.
//! let mut next = manager.load(Some(cookie.value())).await?;
//! let flash: Option<String> = manager.pop(&mut next, "flash")?;
//! assert_eq!(flash.as_deref(), Some("Hello!"));
//! # Ok(())
//! # }
//! ```

#![allow(async_fn_in_trait)]

mod cookie;
mod error;
mod manager;
mod session;
mod store;

pub use crate::cookie::{CookieConfig, SameSite, SessionCookie};
pub use error::{SessionError, StoreError};
pub use manager::SessionManager;
pub use session::{Session, SessionConfig, SessionStatus};
pub use store::{MemoryStore, Record, SessionStore};
