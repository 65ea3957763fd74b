//! Session storage backends.
//!
//! The session manager doesn't persist anything itself. It hands encoded
//! session bytes to a [`SessionStore`], keyed by token, together with the
//! instant after which the store may forget them.
//!
//! # Why a trait?
//!
//! Production deployments keep sessions in a database or a cache shared by
//! every server process; tests and single-process setups are happy with a
//! map in memory. The trait lets both plug into the same manager:
//! - [`MemoryStore`] for tests, demos, and single-instance deployments
//! - your own implementation over SQL, Redis, etc.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::Mutex;

use crate::StoreError;

/// What a store keeps for one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    /// The encoded session values.
    pub data: Vec<u8>,

    /// After this instant the record must be treated as absent.
    pub expiry: Instant,
}

impl Record {
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expiry
    }
}

/// Durable token → session-bytes storage with expiry.
///
/// # Contract
///
/// - `find`, `commit`, `update` and `delete` are atomic per token.
/// - `find` never returns an expired record.
/// - `update` never brings a token back: once a token has been rotated
///   away, deleted or has expired, writing to it must fail with `false`.
/// - `rotate` moves a session from one token to another. A store that can
///   do so should make it atomic, so there is no moment in which both
///   tokens resolve: that window is exactly what a session-fixation attack
///   would race for. The provided implementation deletes first and then
///   commits, which never leaves both tokens valid but can lose the session
///   if the commit fails.
///
/// # Trait bounds
///
/// - `Send + Sync` → one store is shared by every in-flight request.
/// - `'static` → it lives as long as the application.
pub trait SessionStore: Send + Sync + 'static {
    /// Looks up the record for `token`.
    ///
    /// Returns `Ok(None)` for unknown or expired tokens.
    fn find(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Record>, StoreError>> + Send;

    /// Inserts or replaces the record for `token`.
    fn commit(
        &self,
        token: &str,
        record: Record,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Replaces the record for `token` only if the store still holds a live
    /// record under it.
    ///
    /// Returns `Ok(false)` and writes nothing when the token is unknown or
    /// expired.
    fn update(
        &self,
        token: &str,
        record: Record,
    ) -> impl Future<Output = Result<bool, StoreError>> + Send;

    /// Removes `token`. Removing an unknown token is not an error.
    fn delete(&self, token: &str) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Stores `record` under `new` and forgets `old`.
    fn rotate(
        &self,
        old: Option<&str>,
        new: &str,
        record: Record,
    ) -> impl Future<Output = Result<(), StoreError>> + Send {
        async move {
            if let Some(old) = old {
                self.delete(old).await?;
            }
            self.commit(new, record).await
        }
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

/// An in-process [`SessionStore`] backed by a `HashMap`.
///
/// Cloning is cheap and every clone shares the same map, so the store can
/// be handed to several components (session manager, tests) at once.
///
/// Expired records are dropped lazily when `find` runs into them. Call
/// [`purge_expired`](Self::purge_expired) to sweep the rest.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Arc<Mutex<HashMap<String, Record>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every expired record. Returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut records = self.records.lock().await;
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        let purged = before - records.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired sessions");
        }
        purged
    }

    /// Number of records held, expired or not.
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl SessionStore for MemoryStore {
    async fn find(&self, token: &str) -> Result<Option<Record>, StoreError> {
        let mut records = self.records.lock().await;
        let expired = match records.get(token) {
            Some(record) => record.is_expired(Instant::now()),
            None => return Ok(None),
        };
        if expired {
            records.remove(token);
            return Ok(None);
        }
        Ok(records.get(token).cloned())
    }

    async fn commit(&self, token: &str, record: Record) -> Result<(), StoreError> {
        self.records.lock().await.insert(token.to_string(), record);
        Ok(())
    }

    async fn update(&self, token: &str, record: Record) -> Result<bool, StoreError> {
        let mut records = self.records.lock().await;
        match records.get_mut(token) {
            Some(existing) if !existing.is_expired(Instant::now()) => {
                *existing = record;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete(&self, token: &str) -> Result<(), StoreError> {
        self.records.lock().await.remove(token);
        Ok(())
    }

    /// Swaps tokens under a single lock: no other request can observe the
    /// old and new token at the same time.
    async fn rotate(
        &self,
        old: Option<&str>,
        new: &str,
        record: Record,
    ) -> Result<(), StoreError> {
        let mut records = self.records.lock().await;
        if let Some(old) = old {
            records.remove(old);
        }
        records.insert(new.to_string(), record);
        Ok(())
    }
}
