//! The session manager: binds visitor tokens to server-side state.
//!
//! This is the central piece of the session layer. It's responsible for:
//! - Loading a session from the token a visitor presents
//! - Typed reads and writes of session values
//! - Renewing tokens on privilege changes (session-fixation defence)
//! - Destroying sessions
//! - Writing changes back and deciding which cookie to send
//!
//! # Concurrency note
//!
//! `SessionManager` holds no per-visitor state of its own; everything lives
//! either in the [`Session`] owned by the current request or in the
//! [`SessionStore`]. One manager can therefore serve any number of requests
//! at once through a shared reference. Two requests carrying the same token
//! each work on their own copy of the values; the last commit wins, except
//! that a commit never writes to a token another request has already
//! renewed or destroyed.

use std::collections::HashMap;
use std::time::Instant;

use rand::Rng;
use serde::{Serialize, de::DeserializeOwned};
use snippetbox_core::{Codec, JsonCodec};

use crate::{
    Record, Session, SessionConfig, SessionCookie, SessionError, SessionStatus, SessionStore,
};

/// Manages visitor sessions on top of a [`SessionStore`].
///
/// ## Lifecycle of one request
///
/// ```text
/// load(token) ──→ put / get / pop / remove ──→ commit() ──→ cookie
///                        │
///                        ├── renew_token()   (login, logout)
///                        └── destroy()
/// ```
///
/// `C` is the codec used for session values; [`JsonCodec`] unless you pick
/// another one with [`with_codec`](Self::with_codec).
#[derive(Debug, Clone)]
pub struct SessionManager<S: SessionStore, C: Codec = JsonCodec> {
    store: S,
    codec: C,
    config: SessionConfig,
}

impl<S: SessionStore> SessionManager<S> {
    /// Creates a manager that encodes values as JSON.
    pub fn new(store: S, config: SessionConfig) -> Self {
        Self::with_codec(store, JsonCodec, config)
    }
}

impl<S: SessionStore, C: Codec> SessionManager<S, C> {
    /// Creates a manager with an explicit value codec.
    pub fn with_codec(store: S, codec: C, config: SessionConfig) -> Self {
        Self {
            store,
            codec,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Loads the session identified by `token`.
    ///
    /// A missing, unknown, or expired token yields a fresh session with no
    /// token. The client's token is never adopted for a new session: a
    /// token only exists once this server has minted it.
    ///
    /// # Errors
    /// - [`SessionError::Store`]: the store lookup failed
    /// - [`SessionError::Codec`]: the stored record is unreadable
    pub async fn load(&self, token: Option<&str>) -> Result<Session, SessionError> {
        let Some(token) = token.filter(|t| !t.is_empty()) else {
            return Ok(Session::fresh(self.config.lifetime));
        };

        match self.store.find(token).await? {
            Some(record) => {
                let values: HashMap<String, Vec<u8>> = self.codec.decode(&record.data)?;
                tracing::debug!(values = values.len(), "session loaded");
                Ok(Session {
                    token: Some(token.to_string()),
                    values,
                    deadline: record.expiry,
                    status: SessionStatus::Unmodified,
                })
            }
            None => {
                tracing::debug!("unknown or expired session token, starting fresh");
                Ok(Session::fresh(self.config.lifetime))
            }
        }
    }

    /// Stores `value` under `key`, replacing any previous value.
    ///
    /// Only touches the in-request session; nothing reaches the store until
    /// [`commit`](Self::commit) or [`renew_token`](Self::renew_token).
    ///
    /// # Errors
    /// Returns [`SessionError::Codec`] if `value` cannot be encoded.
    pub fn put<T: Serialize + ?Sized>(
        &self,
        session: &mut Session,
        key: &str,
        value: &T,
    ) -> Result<(), SessionError> {
        let bytes = self.codec.encode(value)?;
        session.values.insert(key.to_string(), bytes);
        session.touch();
        Ok(())
    }

    /// Reads the value under `key`. Absent keys give `Ok(None)`.
    ///
    /// # Errors
    /// Returns [`SessionError::Codec`] if the value was stored as a
    /// different type.
    pub fn get<T: DeserializeOwned>(
        &self,
        session: &Session,
        key: &str,
    ) -> Result<Option<T>, SessionError> {
        session
            .values
            .get(key)
            .map(|bytes| self.codec.decode(bytes))
            .transpose()
            .map_err(SessionError::from)
    }

    /// Reads and removes the value under `key`.
    ///
    /// This is the read-once accessor for flash messages: whoever pops the
    /// flash is the only reader that ever sees it.
    pub fn pop<T: DeserializeOwned>(
        &self,
        session: &mut Session,
        key: &str,
    ) -> Result<Option<T>, SessionError> {
        let Some(bytes) = session.values.remove(key) else {
            return Ok(None);
        };
        session.touch();
        Ok(Some(self.codec.decode(&bytes)?))
    }

    /// Deletes a single value without ending the session.
    pub fn remove(&self, session: &mut Session, key: &str) {
        if session.values.remove(key).is_some() {
            session.touch();
        }
    }

    /// Replaces the session token while keeping every stored value.
    ///
    /// Call this immediately after ANY privilege change (login, logout).
    /// An attacker who planted or observed the token before the change
    /// holds a token that no longer resolves afterwards. The deadline is
    /// reset to a full lifetime from now.
    ///
    /// The swap is persisted before this returns, through
    /// [`SessionStore::rotate`].
    ///
    /// # Errors
    /// [`SessionError::Store`] if the new token could not be persisted. The
    /// caller must abort the request: continuing would leave the visitor's
    /// privileges changed under a token the store doesn't know.
    pub async fn renew_token(&self, session: &mut Session) -> Result<(), SessionError> {
        let token = generate_token();
        let deadline = Instant::now() + self.config.lifetime;
        let record = Record {
            data: self.codec.encode(&session.values)?,
            expiry: deadline,
        };

        self.store
            .rotate(session.token.as_deref(), &token, record)
            .await?;

        session.token = Some(token);
        session.deadline = deadline;
        session.touch();

        tracing::info!("session token renewed");
        Ok(())
    }

    /// Deletes the session from the store and clears its values.
    ///
    /// The next [`commit`](Self::commit) returns a cookie that removes the
    /// token from the browser. Putting a value afterwards starts a new
    /// session with a new token.
    pub async fn destroy(&self, session: &mut Session) -> Result<(), SessionError> {
        if let Some(token) = session.token.as_deref() {
            self.store.delete(token).await?;
        }
        session.token = None;
        session.values.clear();
        session.deadline = Instant::now() + self.config.lifetime;
        session.status = SessionStatus::Destroyed;

        tracing::info!("session destroyed");
        Ok(())
    }

    /// Persists the session if it changed and returns the cookie to send.
    ///
    /// - `Unmodified` → `None`, the visitor's cookie is still correct
    /// - `Modified` → written to the store (a token is minted if the
    ///   session never had one) and `Some(cookie)` carrying the token
    /// - `Destroyed` → `Some(cookie)` that expires the token
    ///
    /// A session loaded under a token that the store no longer holds
    /// (another request renewed or destroyed it, or it expired meanwhile)
    /// is not written back: its changes are dropped and `None` is returned,
    /// so a rotated-away token can never become valid again.
    ///
    /// # Errors
    /// [`SessionError::Store`] or [`SessionError::Codec`] if the write fails.
    pub async fn commit(
        &self,
        session: &mut Session,
    ) -> Result<Option<SessionCookie>, SessionError> {
        match session.status {
            SessionStatus::Unmodified => Ok(None),
            SessionStatus::Destroyed => Ok(Some(SessionCookie::expire(&self.config.cookie))),
            SessionStatus::Modified => {
                let record = Record {
                    data: self.codec.encode(&session.values)?,
                    expiry: session.deadline,
                };

                let token = match session.token.clone() {
                    Some(token) => {
                        if !self.store.update(&token, record).await? {
                            tracing::warn!(
                                "session token no longer in store, dropping changes"
                            );
                            session.status = SessionStatus::Unmodified;
                            return Ok(None);
                        }
                        token
                    }
                    None => {
                        let token = generate_token();
                        self.store.commit(&token, record).await?;
                        session.token = Some(token.clone());
                        tracing::debug!("session created");
                        token
                    }
                };
                session.status = SessionStatus::Unmodified;

                let remaining = session.deadline.saturating_duration_since(Instant::now());
                tracing::debug!(values = session.values.len(), "session committed");
                Ok(Some(SessionCookie::issue(
                    &self.config.cookie,
                    &token,
                    remaining,
                )))
            }
        }
    }
}

/// Generates a random 64-character hex string (256 bits of entropy).
///
/// `rand::rng()` is the thread-local CSPRNG, so tokens are unpredictable as
/// well as unique.
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `SessionManager`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //!
    //! Expiry is tested with a zero lifetime (sessions are dead the moment
    //! they are written) rather than by sleeping.

    use std::time::Duration;

    use snippetbox_core::UserId;

    use super::*;
    use crate::MemoryStore;

    // -- Helpers ----------------------------------------------------------

    fn manager() -> SessionManager<MemoryStore> {
        SessionManager::new(MemoryStore::new(), SessionConfig::default())
    }

    fn manager_with_instant_expiry() -> SessionManager<MemoryStore> {
        SessionManager::new(
            MemoryStore::new(),
            SessionConfig {
                lifetime: Duration::ZERO,
                ..SessionConfig::default()
            },
        )
    }

    /// Puts a value and commits, returning the minted token.
    async fn committed_token(mgr: &SessionManager<MemoryStore>) -> String {
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "flash", "hi").unwrap();
        mgr.commit(&mut session).await.unwrap().unwrap().value().to_string()
    }

    // =====================================================================
    // generate_token()
    // =====================================================================

    #[test]
    fn test_generate_token_is_64_hex_chars_and_unique() {
        let a = generate_token();
        let b = generate_token();

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    // =====================================================================
    // load()
    // =====================================================================

    #[tokio::test]
    async fn test_load_without_token_returns_fresh_session() {
        let mgr = manager();

        let session = mgr.load(None).await.unwrap();

        assert!(session.token().is_none());
        assert!(session.is_empty());
        assert_eq!(session.status(), SessionStatus::Unmodified);
    }

    #[tokio::test]
    async fn test_load_unknown_token_does_not_adopt_it() {
        // A client-chosen token must never become a session id.
        let mgr = manager();

        let mut session = mgr.load(Some("attacker-chosen")).await.unwrap();
        mgr.put(&mut session, "flash", "x").unwrap();
        let cookie = mgr.commit(&mut session).await.unwrap().unwrap();

        assert_ne!(cookie.value(), "attacker-chosen");
        assert!(mgr.store().find("attacker-chosen").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_load_empty_token_is_treated_as_missing() {
        let mgr = manager();
        let session = mgr.load(Some("")).await.unwrap();
        assert!(session.token().is_none());
    }

    #[tokio::test]
    async fn test_load_known_token_restores_values() {
        let mgr = manager();
        let token = committed_token(&mgr).await;

        let session = mgr.load(Some(&token)).await.unwrap();

        assert_eq!(session.token(), Some(token.as_str()));
        let flash: Option<String> = mgr.get(&session, "flash").unwrap();
        assert_eq!(flash.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_load_expired_token_returns_fresh_session() {
        let mgr = manager_with_instant_expiry();
        let token = committed_token(&mgr).await;

        let session = mgr.load(Some(&token)).await.unwrap();

        assert!(session.token().is_none());
        assert!(session.is_empty());
    }

    // =====================================================================
    // put() / get() / pop() / remove()
    // =====================================================================

    #[tokio::test]
    async fn test_get_absent_key_returns_none() {
        let mgr = manager();
        let session = mgr.load(None).await.unwrap();

        let value: Option<String> = mgr.get(&session, "flash").unwrap();

        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_put_overwrites_and_marks_modified() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();

        mgr.put(&mut session, "authenticatedUserID", &UserId(1)).unwrap();
        mgr.put(&mut session, "authenticatedUserID", &UserId(2)).unwrap();

        assert_eq!(session.status(), SessionStatus::Modified);
        let id: Option<UserId> = mgr.get(&session, "authenticatedUserID").unwrap();
        assert_eq!(id, Some(UserId(2)));
    }

    #[tokio::test]
    async fn test_get_with_wrong_type_returns_codec_error() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "authenticatedUserID", "not-an-id").unwrap();

        let result: Result<Option<UserId>, _> = mgr.get(&session, "authenticatedUserID");

        assert!(matches!(result, Err(SessionError::Codec(_))));
    }

    #[tokio::test]
    async fn test_get_does_not_consume_value() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "flash", "twice").unwrap();

        let first: Option<String> = mgr.get(&session, "flash").unwrap();
        let second: Option<String> = mgr.get(&session, "flash").unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_pop_reads_once() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "flash", "once").unwrap();

        let first: Option<String> = mgr.pop(&mut session, "flash").unwrap();
        let second: Option<String> = mgr.pop(&mut session, "flash").unwrap();

        assert_eq!(first.as_deref(), Some("once"));
        assert!(second.is_none());
    }

    #[tokio::test]
    async fn test_pop_absent_key_leaves_session_unmodified() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();

        let value: Option<String> = mgr.pop(&mut session, "flash").unwrap();

        assert!(value.is_none());
        assert_eq!(session.status(), SessionStatus::Unmodified);
    }

    #[tokio::test]
    async fn test_remove_keeps_other_values() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "a", &1).unwrap();
        mgr.put(&mut session, "b", &2).unwrap();

        mgr.remove(&mut session, "a");

        assert!(!session.contains("a"));
        assert!(session.contains("b"));
    }

    // =====================================================================
    // renew_token()
    // =====================================================================

    #[tokio::test]
    async fn test_renew_token_changes_token_and_keeps_values() {
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut session = mgr.load(Some(&token)).await.unwrap();

        mgr.renew_token(&mut session).await.unwrap();

        let renewed = session.token().unwrap().to_string();
        assert_ne!(renewed, token);
        let flash: Option<String> = mgr.get(&session, "flash").unwrap();
        assert_eq!(flash.as_deref(), Some("hi"));
    }

    #[tokio::test]
    async fn test_renew_token_invalidates_old_token_immediately() {
        // No commit needed: the rotation is persisted by renew itself.
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut session = mgr.load(Some(&token)).await.unwrap();

        mgr.renew_token(&mut session).await.unwrap();

        assert!(mgr.store().find(&token).await.unwrap().is_none());
        let renewed = session.token().unwrap();
        assert!(mgr.store().find(renewed).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_renew_token_on_fresh_session_mints_token() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();

        mgr.renew_token(&mut session).await.unwrap();

        assert!(session.token().is_some());
        assert_eq!(session.status(), SessionStatus::Modified);
    }

    #[tokio::test]
    async fn test_renew_token_resets_deadline() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        let before = session.deadline();

        mgr.renew_token(&mut session).await.unwrap();

        assert!(session.deadline() >= before);
    }

    // =====================================================================
    // destroy()
    // =====================================================================

    #[tokio::test]
    async fn test_destroy_removes_record_and_expires_cookie() {
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut session = mgr.load(Some(&token)).await.unwrap();

        mgr.destroy(&mut session).await.unwrap();
        let cookie = mgr.commit(&mut session).await.unwrap().unwrap();

        assert!(cookie.is_removal());
        assert!(session.is_empty());
        assert!(mgr.store().find(&token).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_put_after_destroy_starts_new_session() {
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut session = mgr.load(Some(&token)).await.unwrap();
        mgr.destroy(&mut session).await.unwrap();

        mgr.put(&mut session, "flash", "bye").unwrap();
        let cookie = mgr.commit(&mut session).await.unwrap().unwrap();

        assert!(!cookie.is_removal());
        assert_ne!(cookie.value(), token);
    }

    // =====================================================================
    // commit()
    // =====================================================================

    #[tokio::test]
    async fn test_commit_unmodified_returns_no_cookie() {
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut session = mgr.load(Some(&token)).await.unwrap();

        let cookie = mgr.commit(&mut session).await.unwrap();

        assert!(cookie.is_none());
    }

    #[tokio::test]
    async fn test_commit_modified_issues_secure_cookie() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "flash", "x").unwrap();

        let cookie = mgr.commit(&mut session).await.unwrap().unwrap();

        assert_eq!(cookie.name(), "session");
        assert!(cookie.secure());
        assert!(cookie.http_only());
        assert!(cookie.max_age().unwrap() <= Duration::from_secs(12 * 60 * 60));
        assert_eq!(session.status(), SessionStatus::Unmodified);
        assert_eq!(session.token(), Some(cookie.value()));
    }

    #[tokio::test]
    async fn test_commit_after_concurrent_destroy_drops_changes() {
        let mgr = manager();
        let token = committed_token(&mgr).await;
        let mut stale = mgr.load(Some(&token)).await.unwrap();
        let mut other = mgr.load(Some(&token)).await.unwrap();
        mgr.destroy(&mut other).await.unwrap();

        mgr.put(&mut stale, "flash", "late").unwrap();
        let cookie = mgr.commit(&mut stale).await.unwrap();

        assert!(cookie.is_none());
        assert!(mgr.store().find(&token).await.unwrap().is_none());
        assert!(mgr.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_commit_twice_keeps_same_token() {
        let mgr = manager();
        let mut session = mgr.load(None).await.unwrap();
        mgr.put(&mut session, "a", &1).unwrap();
        let first = mgr.commit(&mut session).await.unwrap().unwrap();

        mgr.put(&mut session, "b", &2).unwrap();
        let second = mgr.commit(&mut session).await.unwrap().unwrap();

        assert_eq!(first.value(), second.value());
    }
}
