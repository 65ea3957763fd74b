//! What a handler produces, independent of any HTTP library.
//!
//! A [`Response`] says what the visitor should get; turning it into status
//! lines, headers, and HTML is left to whichever web layer embeds
//! Snippetbox.

use chrono::{Datelike, Utc};
use serde::Serialize;
use snippetbox_models::Snippet;
use snippetbox_session::SessionCookie;

use crate::forms::{SnippetCreateForm, UserLoginForm, UserSignupForm};

/// The pages the application renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    View,
    Create,
    Signup,
    Login,
}

impl Page {
    /// File name of the page template.
    pub fn template(self) -> &'static str {
        match self {
            Self::Home => "home.tmpl",
            Self::View => "view.tmpl",
            Self::Create => "create.tmpl",
            Self::Signup => "signup.tmpl",
            Self::Login => "login.tmpl",
        }
    }
}

/// Status of a rendered page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    /// A submitted form failed validation and is shown again.
    UnprocessableEntity,
}

impl Status {
    pub fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::UnprocessableEntity => 422,
        }
    }
}

/// Any of the forms, as carried in template data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum FormData {
    SnippetCreate(SnippetCreateForm),
    Signup(UserSignupForm),
    Login(UserLoginForm),
}

/// Everything a page template can read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    pub current_year: i32,
    pub flash: Option<String>,
    pub is_authenticated: bool,
    pub snippet: Option<Snippet>,
    pub snippets: Vec<Snippet>,
    pub form: Option<FormData>,
}

impl TemplateData {
    pub fn new(flash: Option<String>, is_authenticated: bool) -> Self {
        Self {
            current_year: Utc::now().year(),
            flash,
            is_authenticated,
            snippet: None,
            snippets: Vec::new(),
            form: None,
        }
    }
}

/// The outcome of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    Render {
        status: Status,
        page: Page,
        data: Box<TemplateData>,
    },
    /// See-other redirect to a path.
    Redirect(String),
    BadRequest,
    NotFound,
    /// Something failed on our side. Details went to the log, not here.
    ServerError,
}

impl Response {
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(location.into())
    }

    pub fn status_code(&self) -> u16 {
        match self {
            Self::Render { status, .. } => status.code(),
            Self::Redirect(_) => 303,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::ServerError => 500,
        }
    }

    /// The template data, if this response renders a page.
    pub fn data(&self) -> Option<&TemplateData> {
        match self {
            Self::Render { data, .. } => Some(data.as_ref()),
            _ => None,
        }
    }

    /// Where this response redirects to, if it is a redirect.
    pub fn location(&self) -> Option<&str> {
        match self {
            Self::Redirect(location) => Some(location.as_str()),
            _ => None,
        }
    }
}

/// A response plus the session cookie to set alongside it, if any.
#[derive(Debug, Clone)]
pub struct Reply {
    pub response: Response,
    pub cookie: Option<SessionCookie>,
}
