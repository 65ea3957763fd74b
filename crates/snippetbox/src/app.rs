//! The application context and per-request driver.
//!
//! [`App`] owns every shared dependency (models, the session manager, the
//! auth service) and exposes a single entry point, [`App::handle`], that a
//! web layer calls once per request with the visitor's session token.

use std::sync::Arc;
use std::time::Duration;

use snippetbox_models::{SnippetModel, UserModel};
use snippetbox_session::{CookieConfig, Session, SessionConfig, SessionManager, SessionStore};

use crate::auth::{AuthService, REDIRECT_PATH_AFTER_LOGIN};
use crate::forms::{SnippetCreateInput, UserLoginForm, UserSignupForm};
use crate::response::{Reply, Response};
use crate::AppError;

/// A request, already routed.
///
/// Form bodies arrive decoded. `SnippetView` carries the raw path segment
/// so that a malformed id is handled like a missing snippet.
#[derive(Debug, Clone)]
pub enum Request {
    Home,
    SnippetView { id: String },
    SnippetCreate,
    SnippetCreatePost(SnippetCreateInput),
    UserSignup,
    UserSignupPost(UserSignupForm),
    UserLogin,
    UserLoginPost(UserLoginForm),
    UserLogoutPost,
}

impl Request {
    /// The path this request was made to.
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::SnippetView { id } => format!("/snippet/view/{id}"),
            Self::SnippetCreate | Self::SnippetCreatePost(_) => "/snippet/create".to_string(),
            Self::UserSignup | Self::UserSignupPost(_) => "/user/signup".to_string(),
            Self::UserLogin | Self::UserLoginPost(_) => "/user/login".to_string(),
            Self::UserLogoutPost => "/user/logout".to_string(),
        }
    }

    /// `true` for routes only logged-in visitors may reach.
    pub fn requires_authentication(&self) -> bool {
        matches!(
            self,
            Self::SnippetCreate | Self::SnippetCreatePost(_) | Self::UserLogoutPost
        )
    }
}

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Builder for configuring an [`App`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use snippetbox::prelude::*;
///
/// let app = AppBuilder::new()
///     .lifetime(Duration::from_secs(3600))
///     .build(MemorySnippets::new(), MemoryUsers::new(), MemoryStore::new());
/// assert_eq!(app.sessions().config().lifetime, Duration::from_secs(3600));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AppBuilder {
    session_config: SessionConfig,
}

impl AppBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the whole session configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets how long a session lives after its token is issued.
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.session_config.lifetime = lifetime;
        self
    }

    /// Sets the session cookie attributes.
    pub fn cookie(mut self, cookie: CookieConfig) -> Self {
        self.session_config.cookie = cookie;
        self
    }

    /// Wires the models and the session store into an [`App`].
    pub fn build<P, U, S>(self, snippets: P, users: U, store: S) -> App<P, U, S>
    where
        P: SnippetModel,
        U: UserModel,
        S: SessionStore,
    {
        let users = Arc::new(users);
        let sessions = Arc::new(SessionManager::new(store, self.session_config));
        let auth = AuthService::new(Arc::clone(&users), Arc::clone(&sessions));

        App {
            snippets: Arc::new(snippets),
            users,
            sessions,
            auth,
        }
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// The application: shared dependencies plus request handling.
///
/// Cheap to clone; clones share everything.
pub struct App<P: SnippetModel, U: UserModel, S: SessionStore> {
    pub(crate) snippets: Arc<P>,
    pub(crate) users: Arc<U>,
    pub(crate) sessions: Arc<SessionManager<S>>,
    pub(crate) auth: AuthService<U, S>,
}

impl<P: SnippetModel, U: UserModel, S: SessionStore> App<P, U, S> {
    pub fn snippets(&self) -> &P {
        &self.snippets
    }

    pub fn users(&self) -> &U {
        &self.users
    }

    pub fn sessions(&self) -> &SessionManager<S> {
        &self.sessions
    }

    pub fn auth(&self) -> &AuthService<U, S> {
        &self.auth
    }

    /// Handles one request for the visitor holding `token`.
    ///
    /// Loads the session, resolves who the visitor is, turns anonymous
    /// visitors away from protected routes, runs the handler, and commits
    /// the session. Any failure along the way is logged and answered with
    /// [`Response::ServerError`] and no cookie. The session is not committed
    /// then. A token renewal that already went through stays in the store:
    /// the old token is gone, and the visitor never receives the new one.
    pub async fn handle(&self, token: Option<&str>, request: Request) -> Reply {
        let mut session = match self.sessions.load(token).await {
            Ok(session) => session,
            Err(e) => return self.server_error(&e.into()),
        };

        let response = match self.dispatch(&mut session, request).await {
            Ok(response) => response,
            Err(e) => return self.server_error(&e),
        };

        match self.sessions.commit(&mut session).await {
            Ok(cookie) => Reply { response, cookie },
            Err(e) => self.server_error(&e.into()),
        }
    }

    async fn dispatch(
        &self,
        session: &mut Session,
        request: Request,
    ) -> Result<Response, AppError> {
        let auth = self.auth.state(session).await?;

        if request.requires_authentication() && !auth.is_authenticated() {
            return self.require_authentication(session, &request);
        }

        tracing::debug!(
            path = %request.path(),
            authenticated = auth.is_authenticated(),
            "dispatching"
        );

        match request {
            Request::Home => self.home(session, auth).await,
            Request::SnippetView { id } => self.snippet_view(session, auth, &id).await,
            Request::SnippetCreate => self.snippet_create(session, auth),
            Request::SnippetCreatePost(input) => {
                self.snippet_create_post(session, auth, input).await
            }
            Request::UserSignup => self.user_signup(session, auth),
            Request::UserSignupPost(form) => self.user_signup_post(session, auth, form).await,
            Request::UserLogin => self.user_login(session, auth),
            Request::UserLoginPost(form) => self.user_login_post(session, auth, form).await,
            Request::UserLogoutPost => self.user_logout_post(session).await,
        }
    }

    /// Remembers where the visitor was headed and sends them to log in.
    fn require_authentication(
        &self,
        session: &mut Session,
        request: &Request,
    ) -> Result<Response, AppError> {
        self.sessions
            .put(session, REDIRECT_PATH_AFTER_LOGIN, &request.path())?;
        Ok(Response::redirect("/user/login"))
    }

    fn server_error(&self, err: &AppError) -> Reply {
        tracing::error!(error = %err, "request failed");
        Reply {
            response: Response::ServerError,
            cookie: None,
        }
    }
}

impl<P: SnippetModel, U: UserModel, S: SessionStore> Clone for App<P, U, S> {
    fn clone(&self) -> Self {
        Self {
            snippets: Arc::clone(&self.snippets),
            users: Arc::clone(&self.users),
            sessions: Arc::clone(&self.sessions),
            auth: self.auth.clone(),
        }
    }
}
