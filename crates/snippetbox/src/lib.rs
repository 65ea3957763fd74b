//! # Snippetbox
//!
//! The session-authentication and form-handling core of a server-rendered
//! snippet sharing site.
//!
//! Visitors browse short-lived text snippets. Registered users log in and
//! create snippets that expire after a day, a week, or a year. This crate
//! ties together the layers that make that safe:
//!
//! ```text
//! App::handle ──→ handlers ──→ forms (snippetbox-validator)
//!      │              │
//!      │              └──→ AuthService ──→ UserModel (snippetbox-models)
//!      │                        │
//!      └────────────────────────┴──→ SessionManager (snippetbox-session)
//! ```
//!
//! Every login and logout renews the session token before it changes the
//! stored identity, so a token planted or observed before the change is
//! useless afterwards.
//!
//! ## Quick Start
//!
//! ```rust
//! # async fn demo() {
//! use snippetbox::prelude::*;
//!
//! let app = AppBuilder::new().build(
//!     MemorySnippets::new(),
//!     MemoryUsers::new(),
//!     MemoryStore::new(),
//! );
//!
//! let reply = app.handle(None, Request::Home).await;
//! assert_eq!(reply.response.status_code(), 200);
//! # }
//! ```

mod app;
pub mod auth;
mod error;
pub mod forms;
mod handlers;
pub mod response;

pub use app::{App, AppBuilder, Request};
pub use error::AppError;

/// Convenience re-exports for common usage.
///
/// ```rust
/// use snippetbox::prelude::*;
/// ```
pub mod prelude {
    pub use crate::auth::{AuthService, AuthState};
    pub use crate::forms::{SnippetCreateForm, SnippetCreateInput, UserLoginForm, UserSignupForm};
    pub use crate::response::{Page, Reply, Response, Status, TemplateData};
    pub use crate::{App, AppBuilder, AppError, Request};

    pub use snippetbox_core::{SnippetId, UserId};
    pub use snippetbox_models::{
        MemorySnippets, MemoryUsers, ModelError, Snippet, SnippetModel, UserModel,
    };
    pub use snippetbox_session::{
        CookieConfig, MemoryStore, SameSite, SessionConfig, SessionCookie, SessionError,
        SessionManager, SessionStore,
    };
    pub use snippetbox_validator::{Form, Validator};
}
