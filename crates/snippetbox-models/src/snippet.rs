//! Snippets: short texts that expire after a chosen number of days.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use snippetbox_core::SnippetId;
use tokio::sync::Mutex;

use crate::ModelError;

/// How many snippets [`SnippetModel::latest`] returns at most.
pub const LATEST_LIMIT: usize = 10;

/// A stored snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: SnippetId,
    pub title: String,
    pub content: String,
    pub created: DateTime<Utc>,
    pub expires: DateTime<Utc>,
}

impl Snippet {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires
    }
}

/// Storage for snippets.
///
/// Expired snippets are invisible through this trait: `get` reports them as
/// [`ModelError::NotFound`] and `latest` skips them.
pub trait SnippetModel: Send + Sync + 'static {
    /// Stores a new snippet expiring `expires_days` from now.
    fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
    ) -> impl Future<Output = Result<SnippetId, ModelError>> + Send;

    /// Fetches one unexpired snippet.
    fn get(&self, id: SnippetId) -> impl Future<Output = Result<Snippet, ModelError>> + Send;

    /// Up to [`LATEST_LIMIT`] unexpired snippets, newest first.
    fn latest(&self) -> impl Future<Output = Result<Vec<Snippet>, ModelError>> + Send;
}

// ---------------------------------------------------------------------------
// MemorySnippets
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SnippetTable {
    next_id: i64,
    rows: BTreeMap<SnippetId, Snippet>,
}

impl Default for SnippetTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }
}

/// An in-process [`SnippetModel`].
///
/// Ids are assigned sequentially from 1, so a higher id is always a newer
/// snippet. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct MemorySnippets {
    table: Arc<Mutex<SnippetTable>>,
}

impl MemorySnippets {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnippetModel for MemorySnippets {
    async fn insert(
        &self,
        title: &str,
        content: &str,
        expires_days: i32,
    ) -> Result<SnippetId, ModelError> {
        let created = Utc::now();
        let expires = TimeDelta::try_days(i64::from(expires_days))
            .and_then(|ttl| created.checked_add_signed(ttl))
            .ok_or_else(|| {
                ModelError::Storage(format!("expiry of {expires_days} days is out of range"))
            })?;

        let mut table = self.table.lock().await;
        let id = SnippetId(table.next_id);
        table.next_id += 1;
        table.rows.insert(
            id,
            Snippet {
                id,
                title: title.to_string(),
                content: content.to_string(),
                created,
                expires,
            },
        );

        tracing::info!(snippet_id = %id, expires_days, "snippet inserted");
        Ok(id)
    }

    async fn get(&self, id: SnippetId) -> Result<Snippet, ModelError> {
        let table = self.table.lock().await;
        table
            .rows
            .get(&id)
            .filter(|snippet| !snippet.is_expired(Utc::now()))
            .cloned()
            .ok_or(ModelError::NotFound)
    }

    async fn latest(&self) -> Result<Vec<Snippet>, ModelError> {
        let now = Utc::now();
        let table = self.table.lock().await;
        Ok(table
            .rows
            .values()
            .rev()
            .filter(|snippet| !snippet.is_expired(now))
            .take(LATEST_LIMIT)
            .cloned()
            .collect())
    }
}
