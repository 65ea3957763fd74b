//! Authentication: who the visitor is, and the transitions between
//! anonymous and logged in.
//!
//! ```text
//!              login (renew, put identity)
//!   Anonymous ─────────────────────────────→ Authenticated(UserId)
//!       ↑                                          │
//!       └──────────────────────────────────────────┘
//!          logout (renew, remove identity, flash)
//! ```
//!
//! Both transitions renew the session token BEFORE changing the identity,
//! so whatever token the visitor carried beforehand stops resolving.

use std::sync::Arc;

use snippetbox_core::UserId;
use snippetbox_models::{ModelError, UserModel};
use snippetbox_session::{Session, SessionError, SessionManager, SessionStore};

use crate::AppError;

/// Session key holding the logged-in user's [`UserId`].
pub const AUTHENTICATED_USER_ID: &str = "authenticatedUserID";

/// Session key holding a one-shot message for the next rendered page.
pub const FLASH: &str = "flash";

/// Session key holding the protected path a visitor was bounced from.
pub const REDIRECT_PATH_AFTER_LOGIN: &str = "redirectPathAfterLogin";

const LOGGED_OUT_FLASH: &str = "You've been logged out successfully!";

/// Where a visitor stands for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Anonymous,
    Authenticated(UserId),
}

impl AuthState {
    pub fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn user_id(self) -> Option<UserId> {
        match self {
            Self::Authenticated(id) => Some(id),
            Self::Anonymous => None,
        }
    }
}

/// Credential checks plus the session side of logging in and out.
///
/// Holds no per-visitor state. All of it lives in the [`Session`] handed in
/// by the caller.
pub struct AuthService<U: UserModel, S: SessionStore> {
    users: Arc<U>,
    sessions: Arc<SessionManager<S>>,
}

impl<U: UserModel, S: SessionStore> AuthService<U, S> {
    pub fn new(users: Arc<U>, sessions: Arc<SessionManager<S>>) -> Self {
        Self { users, sessions }
    }

    /// Checks credentials.
    ///
    /// Unknown email and wrong password both come back as
    /// [`ModelError::InvalidCredentials`], and cost the same.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<UserId, ModelError> {
        let result = self.users.authenticate(email, password).await;
        if let Err(ModelError::InvalidCredentials) = &result {
            tracing::info!("login rejected");
        }
        result
    }

    /// Registers a new user. Fails with [`ModelError::DuplicateEmail`] if the
    /// address is taken.
    pub async fn insert(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<UserId, ModelError> {
        self.users.insert(name, email, password).await
    }

    /// Marks the session as belonging to `user_id`.
    ///
    /// # Errors
    /// [`SessionError`] if the token could not be renewed. The identity is
    /// not stored in that case and the request must end in a server error.
    pub async fn login(&self, session: &mut Session, user_id: UserId) -> Result<(), SessionError> {
        self.sessions.renew_token(session).await?;
        self.sessions.put(session, AUTHENTICATED_USER_ID, &user_id)?;

        tracing::info!(%user_id, "user logged in");
        Ok(())
    }

    /// Ends the login: renews the token, drops the identity, and leaves a
    /// flash for the next page.
    pub async fn logout(&self, session: &mut Session) -> Result<(), SessionError> {
        let user_id: Option<UserId> = self.sessions.get(session, AUTHENTICATED_USER_ID)?;

        self.sessions.renew_token(session).await?;
        self.sessions.remove(session, AUTHENTICATED_USER_ID);
        self.sessions.put(session, FLASH, LOGGED_OUT_FLASH)?;

        if let Some(user_id) = user_id {
            tracing::info!(%user_id, "user logged out");
        }
        Ok(())
    }

    /// Resolves the visitor's state from the session.
    ///
    /// An identity only counts while the user it names still exists; a
    /// session pointing at a deleted account is anonymous.
    pub async fn state(&self, session: &Session) -> Result<AuthState, AppError> {
        let Some(user_id) = self.sessions.get::<UserId>(session, AUTHENTICATED_USER_ID)? else {
            return Ok(AuthState::Anonymous);
        };

        if self.users.exists(user_id).await? {
            Ok(AuthState::Authenticated(user_id))
        } else {
            tracing::debug!(%user_id, "session names a user that no longer exists");
            Ok(AuthState::Anonymous)
        }
    }

    pub async fn is_authenticated(&self, session: &Session) -> Result<bool, AppError> {
        Ok(self.state(session).await?.is_authenticated())
    }
}

impl<U: UserModel, S: SessionStore> Clone for AuthService<U, S> {
    fn clone(&self) -> Self {
        Self {
            users: Arc::clone(&self.users),
            sessions: Arc::clone(&self.sessions),
        }
    }
}

#[cfg(test)]
mod tests {
    use argon2::{Algorithm, Argon2, Params, Version};
    use snippetbox_models::MemoryUsers;
    use snippetbox_session::{MemoryStore, SessionConfig};

    use super::*;

    struct Fixture {
        auth: AuthService<MemoryUsers, MemoryStore>,
        sessions: Arc<SessionManager<MemoryStore>>,
    }

    fn fixture() -> Fixture {
        let params = Params::new(8, 1, 1, None).unwrap();
        let users = Arc::new(MemoryUsers::with_hasher(Argon2::new(
            Algorithm::Argon2id,
            Version::V0x13,
            params,
        )));
        let sessions = Arc::new(SessionManager::new(
            MemoryStore::new(),
            SessionConfig::default(),
        ));
        Fixture {
            auth: AuthService::new(users, Arc::clone(&sessions)),
            sessions,
        }
    }

    #[tokio::test]
    async fn test_state_empty_session_is_anonymous() {
        let f = fixture();
        let session = f.sessions.load(None).await.unwrap();

        assert_eq!(f.auth.state(&session).await.unwrap(), AuthState::Anonymous);
        assert!(!f.auth.is_authenticated(&session).await.unwrap());
    }

    #[tokio::test]
    async fn test_login_renews_token_then_stores_identity() {
        let f = fixture();
        let id = f.auth.insert("A", "a@b.com", "password1").await.unwrap();
        let mut session = f.sessions.load(None).await.unwrap();
        f.sessions.put(&mut session, FLASH, "hello").unwrap();
        let before = f.sessions.commit(&mut session).await.unwrap().unwrap().value().to_string();

        f.auth.login(&mut session, id).await.unwrap();

        assert_ne!(session.token(), Some(before.as_str()));
        assert_eq!(
            f.auth.state(&session).await.unwrap(),
            AuthState::Authenticated(id)
        );
        // Values from before the login survive the renewal.
        assert!(session.contains(FLASH));
    }

    #[tokio::test]
    async fn test_logout_renews_removes_identity_and_flashes() {
        let f = fixture();
        let id = f.auth.insert("A", "a@b.com", "password1").await.unwrap();
        let mut session = f.sessions.load(None).await.unwrap();
        f.auth.login(&mut session, id).await.unwrap();
        let logged_in = session.token().map(str::to_string);

        f.auth.logout(&mut session).await.unwrap();

        assert_ne!(session.token().map(str::to_string), logged_in);
        assert!(!session.contains(AUTHENTICATED_USER_ID));
        let flash: Option<String> = f.sessions.get(&session, FLASH).unwrap();
        assert_eq!(flash.as_deref(), Some(LOGGED_OUT_FLASH));
        assert_eq!(f.auth.state(&session).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_state_unknown_user_is_anonymous() {
        let f = fixture();
        let mut session = f.sessions.load(None).await.unwrap();
        f.sessions
            .put(&mut session, AUTHENTICATED_USER_ID, &UserId(404))
            .unwrap();

        assert_eq!(f.auth.state(&session).await.unwrap(), AuthState::Anonymous);
    }

    #[tokio::test]
    async fn test_state_garbled_identity_is_session_error() {
        let f = fixture();
        let mut session = f.sessions.load(None).await.unwrap();
        f.sessions
            .put(&mut session, AUTHENTICATED_USER_ID, "not-a-number")
            .unwrap();

        let result = f.auth.state(&session).await;

        assert!(matches!(result, Err(AppError::Session(SessionError::Codec(_)))));
    }

    #[tokio::test]
    async fn test_authenticate_failures_are_indistinguishable() {
        let f = fixture();
        f.auth.insert("A", "a@b.com", "password1").await.unwrap();

        let wrong = f.auth.authenticate("a@b.com", "password2").await.unwrap_err();
        let unknown = f.auth.authenticate("z@b.com", "password1").await.unwrap_err();

        assert!(matches!(wrong, ModelError::InvalidCredentials));
        assert!(matches!(unknown, ModelError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[test]
    fn test_auth_state_accessors() {
        assert_eq!(AuthState::Authenticated(UserId(3)).user_id(), Some(UserId(3)));
        assert_eq!(AuthState::Anonymous.user_id(), None);
        assert!(!AuthState::Anonymous.is_authenticated());
    }
}
