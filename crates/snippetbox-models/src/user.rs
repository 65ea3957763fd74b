//! Users and their credentials.
//!
//! Passwords are stored as Argon2id PHC strings
//! (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so the parameters a hash
//! was made with travel with it and verification never needs them
//! configured separately.

use std::future::Future;
use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordVerifier,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use chrono::{DateTime, Utc};
use snippetbox_core::UserId;
use tokio::sync::Mutex;

use crate::ModelError;

/// A registered user's credential record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub hashed_password: String,
    pub created: DateTime<Utc>,
}

/// Storage and credential checks for users.
pub trait UserModel: Send + Sync + 'static {
    /// Registers a user, hashing `password` before it is stored.
    ///
    /// # Errors
    /// - [`ModelError::DuplicateEmail`]: the email is taken. Detected by
    ///   the store's uniqueness rule at insert time, never by a separate
    ///   lookup beforehand.
    /// - [`ModelError::Storage`]: anything else.
    fn insert(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserId, ModelError>> + Send;

    /// Checks `email` and `password` and returns the user's identity.
    ///
    /// # Errors
    /// - [`ModelError::InvalidCredentials`]: no such email, or wrong
    ///   password. The two cases are indistinguishable to the caller.
    /// - [`ModelError::Storage`]: anything else.
    fn authenticate(
        &self,
        email: &str,
        password: &str,
    ) -> impl Future<Output = Result<UserId, ModelError>> + Send;

    /// `true` if a user with this id is still registered.
    fn exists(&self, id: UserId) -> impl Future<Output = Result<bool, ModelError>> + Send;
}

// ---------------------------------------------------------------------------
// MemoryUsers
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct UserTable {
    next_id: i64,
    rows: Vec<User>,
}

impl Default for UserTable {
    fn default() -> Self {
        Self {
            next_id: 1,
            rows: Vec::new(),
        }
    }
}

/// An in-process [`UserModel`] with Argon2id password hashing.
///
/// Email addresses are unique and compared exactly (no case folding).
/// Clones share the same table.
#[derive(Clone)]
pub struct MemoryUsers {
    table: Arc<Mutex<UserTable>>,
    hasher: Argon2<'static>,

    /// A hash of a throwaway password, verified against when the email is
    /// unknown so that both failure paths cost one Argon2 run. `None` only
    /// if preparing it failed; unknown emails then pay for a hash instead.
    dummy_hash: Option<String>,
}

impl MemoryUsers {
    /// Creates a store using Argon2id with the crate's default parameters.
    pub fn new() -> Self {
        Self::with_hasher(Argon2::default())
    }

    /// Creates a store with a specific Argon2 configuration.
    ///
    /// Tests use this with minimal cost parameters; production should
    /// stick to [`new`](Self::new) or stronger settings.
    pub fn with_hasher(hasher: Argon2<'static>) -> Self {
        let salt = SaltString::generate(&mut OsRng);
        let dummy_hash = match hasher.hash_password(b"snippetbox-unknown-user", &salt) {
            Ok(hash) => Some(hash.to_string()),
            Err(e) => {
                tracing::warn!(error = %e, "could not prepare dummy password hash");
                None
            }
        };

        Self {
            table: Arc::new(Mutex::new(UserTable::default())),
            hasher,
            dummy_hash,
        }
    }

    fn hash(&self, password: &str) -> Result<String, ModelError> {
        let salt = SaltString::generate(&mut OsRng);
        Ok(self
            .hasher
            .hash_password(password.as_bytes(), &salt)?
            .to_string())
    }

    /// Spends one Argon2 run on a login for an email nobody registered.
    fn verify_unknown_user(&self, password: &str) {
        let spent = match &self.dummy_hash {
            Some(dummy) => self.verify(password, dummy).map(|_| ()),
            None => self.hash(password).map(|_| ()),
        };
        if let Err(e) = spent {
            tracing::warn!(error = %e, "unknown-user password check failed");
        }
    }

    fn verify(&self, password: &str, hashed: &str) -> Result<bool, ModelError> {
        let parsed = PasswordHash::new(hashed)?;
        match self.hasher.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

impl Default for MemoryUsers {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryUsers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryUsers").finish_non_exhaustive()
    }
}

impl UserModel for MemoryUsers {
    async fn insert(&self, name: &str, email: &str, password: &str) -> Result<UserId, ModelError> {
        // Hash outside the lock; it is the slow part.
        let hashed_password = self.hash(password)?;

        let mut table = self.table.lock().await;
        // Uniqueness is checked under the same lock as the insert, which is
        // what a UNIQUE index does for a relational store.
        if table.rows.iter().any(|user| user.email == email) {
            return Err(ModelError::DuplicateEmail);
        }

        let id = UserId(table.next_id);
        table.next_id += 1;
        table.rows.push(User {
            id,
            name: name.to_string(),
            email: email.to_string(),
            hashed_password,
            created: Utc::now(),
        });

        tracing::info!(user_id = %id, "user inserted");
        Ok(id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<UserId, ModelError> {
        let found = {
            let table = self.table.lock().await;
            table
                .rows
                .iter()
                .find(|user| user.email == email)
                .map(|user| (user.id, user.hashed_password.clone()))
        };

        let Some((id, hashed)) = found else {
            self.verify_unknown_user(password);
            return Err(ModelError::InvalidCredentials);
        };

        if self.verify(password, &hashed)? {
            Ok(id)
        } else {
            Err(ModelError::InvalidCredentials)
        }
    }

    async fn exists(&self, id: UserId) -> Result<bool, ModelError> {
        let table = self.table.lock().await;
        Ok(table.rows.iter().any(|user| user.id == id))
    }
}

#[cfg(test)]
mod tests {
    use argon2::{Algorithm, Params, Version};

    use super::*;

    /// Argon2id with the smallest allowed cost, to keep tests fast.
    fn users() -> MemoryUsers {
        let params = Params::new(8, 1, 1, None).unwrap();
        MemoryUsers::with_hasher(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    #[tokio::test]
    async fn test_insert_stores_phc_hash_not_password() {
        let users = users();

        users
            .insert("Alice", "alice@example.com", "pa55word!")
            .await
            .unwrap();

        let table = users.table.lock().await;
        let stored = &table.rows[0].hashed_password;
        assert!(stored.starts_with("$argon2id$"));
        assert!(!stored.contains("pa55word!"));
    }

    #[tokio::test]
    async fn test_insert_duplicate_email_returns_duplicate_email() {
        let users = users();
        users.insert("A", "a@b.com", "password1").await.unwrap();

        let result = users.insert("B", "a@b.com", "password2").await;

        assert!(matches!(result, Err(ModelError::DuplicateEmail)));
    }

    #[tokio::test]
    async fn test_insert_email_match_is_exact() {
        let users = users();
        users.insert("A", "a@b.com", "password1").await.unwrap();

        let result = users.insert("B", "A@b.com", "password2").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_authenticate_correct_password_returns_id() {
        let users = users();
        let id = users.insert("A", "a@b.com", "password1").await.unwrap();

        assert_eq!(users.authenticate("a@b.com", "password1").await.unwrap(), id);
    }

    #[tokio::test]
    async fn test_authenticate_wrong_password_and_unknown_email_are_indistinguishable() {
        let users = users();
        users.insert("A", "a@b.com", "password1").await.unwrap();

        let wrong_password = users.authenticate("a@b.com", "nope-nope").await;
        let unknown_email = users.authenticate("who@b.com", "password1").await;

        let (Err(a), Err(b)) = (wrong_password, unknown_email) else {
            panic!("both attempts must fail");
        };
        assert!(matches!(a, ModelError::InvalidCredentials));
        assert!(matches!(b, ModelError::InvalidCredentials));
        assert_eq!(a.to_string(), b.to_string());
    }

    #[tokio::test]
    async fn test_authenticate_corrupt_hash_is_storage_error() {
        let users = users();
        let id = users.insert("A", "a@b.com", "password1").await.unwrap();
        users.table.lock().await.rows[0].hashed_password = "garbage".into();

        let result = users.authenticate("a@b.com", "password1").await;

        assert!(matches!(result, Err(ModelError::Storage(_))));
        assert!(users.exists(id).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists() {
        let users = users();
        let id = users.insert("A", "a@b.com", "password1").await.unwrap();

        assert!(users.exists(id).await.unwrap());
        assert!(!users.exists(UserId(999)).await.unwrap());
    }

    #[test]
    fn test_dummy_hash_is_prepared() {
        assert!(users().dummy_hash.is_some());
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_without_dummy_hash_still_rejects() {
        let mut users = users();
        users.dummy_hash = None;
        users.insert("A", "a@b.com", "password1").await.unwrap();

        let result = users.authenticate("who@b.com", "password1").await;

        assert!(matches!(result, Err(ModelError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_authenticate_unknown_email_with_unreadable_dummy_hash_still_rejects() {
        let mut users = users();
        users.dummy_hash = Some("not-a-phc-string".into());

        let result = users.authenticate("who@b.com", "password1").await;

        assert!(matches!(result, Err(ModelError::InvalidCredentials)));
    }
}
