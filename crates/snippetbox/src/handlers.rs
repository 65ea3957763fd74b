//! One method per route.
//!
//! Handlers run after [`App::handle`](crate::App::handle) has loaded the
//! session and checked authentication. They return `Ok` for every outcome
//! the visitor is meant to see, including failed forms and missing
//! snippets, and `Err` only for failures that end in a server error.

use snippetbox_core::{SnippetId, UserId};
use snippetbox_models::{ModelError, SnippetModel, UserModel};
use snippetbox_session::{Session, SessionStore};
use snippetbox_validator::Form;

use crate::auth::{AuthState, FLASH, REDIRECT_PATH_AFTER_LOGIN};
use crate::forms::{SnippetCreateForm, SnippetCreateInput, UserLoginForm, UserSignupForm};
use crate::response::{FormData, Page, Response, Status, TemplateData};
use crate::{App, AppError};

impl<P: SnippetModel, U: UserModel, S: SessionStore> App<P, U, S> {
    /// Template data every page starts from. Pops the flash, so a message
    /// is shown on exactly one page.
    fn template_data(
        &self,
        session: &mut Session,
        auth: AuthState,
    ) -> Result<TemplateData, AppError> {
        let flash: Option<String> = self.sessions.pop(session, FLASH)?;
        Ok(TemplateData::new(flash, auth.is_authenticated()))
    }

    fn render(&self, status: Status, page: Page, data: TemplateData) -> Result<Response, AppError> {
        Ok(Response::Render {
            status,
            page,
            data: Box::new(data),
        })
    }

    // -- Snippets ---------------------------------------------------------

    pub(crate) async fn home(
        &self,
        session: &mut Session,
        auth: AuthState,
    ) -> Result<Response, AppError> {
        let snippets = self.snippets.latest().await?;

        let mut data = self.template_data(session, auth)?;
        data.snippets = snippets;
        self.render(Status::Ok, Page::Home, data)
    }

    pub(crate) async fn snippet_view(
        &self,
        session: &mut Session,
        auth: AuthState,
        id: &str,
    ) -> Result<Response, AppError> {
        let Ok(id) = id.parse::<SnippetId>() else {
            return Ok(Response::NotFound);
        };

        let snippet = match self.snippets.get(id).await {
            Ok(snippet) => snippet,
            Err(ModelError::NotFound) => return Ok(Response::NotFound),
            Err(e) => return Err(e.into()),
        };

        let mut data = self.template_data(session, auth)?;
        data.snippet = Some(snippet);
        self.render(Status::Ok, Page::View, data)
    }

    pub(crate) fn snippet_create(
        &self,
        session: &mut Session,
        auth: AuthState,
    ) -> Result<Response, AppError> {
        let mut data = self.template_data(session, auth)?;
        data.form = Some(FormData::SnippetCreate(SnippetCreateForm::default()));
        self.render(Status::Ok, Page::Create, data)
    }

    pub(crate) async fn snippet_create_post(
        &self,
        session: &mut Session,
        auth: AuthState,
        input: SnippetCreateInput,
    ) -> Result<Response, AppError> {
        let Ok(mut form) = SnippetCreateForm::try_from(input) else {
            return Ok(Response::BadRequest);
        };

        form.validate();
        if !form.valid() {
            let mut data = self.template_data(session, auth)?;
            data.form = Some(FormData::SnippetCreate(form));
            return self.render(Status::UnprocessableEntity, Page::Create, data);
        }

        let id = self
            .snippets
            .insert(&form.title, &form.content, form.expires)
            .await?;

        self.sessions
            .put(session, FLASH, "Snippet successfully created!")?;
        Ok(Response::redirect(format!("/snippet/view/{id}")))
    }

    // -- Users ------------------------------------------------------------

    pub(crate) fn user_signup(
        &self,
        session: &mut Session,
        auth: AuthState,
    ) -> Result<Response, AppError> {
        let mut data = self.template_data(session, auth)?;
        data.form = Some(FormData::Signup(UserSignupForm::default()));
        self.render(Status::Ok, Page::Signup, data)
    }

    pub(crate) async fn user_signup_post(
        &self,
        session: &mut Session,
        auth: AuthState,
        mut form: UserSignupForm,
    ) -> Result<Response, AppError> {
        form.validate();
        if !form.valid() {
            return self.signup_failed(session, auth, form);
        }

        match self.auth.insert(&form.name, &form.email, &form.password).await {
            Ok(_) => {}
            Err(ModelError::DuplicateEmail) => {
                form.add_field_error("email", "Email address is already in use");
                return self.signup_failed(session, auth, form);
            }
            Err(e) => return Err(e.into()),
        }

        self.sessions
            .put(session, FLASH, "Your signup was successful. Please log in.")?;
        Ok(Response::redirect("/user/login"))
    }

    fn signup_failed(
        &self,
        session: &mut Session,
        auth: AuthState,
        form: UserSignupForm,
    ) -> Result<Response, AppError> {
        let mut data = self.template_data(session, auth)?;
        data.form = Some(FormData::Signup(form));
        self.render(Status::UnprocessableEntity, Page::Signup, data)
    }

    pub(crate) fn user_login(
        &self,
        session: &mut Session,
        auth: AuthState,
    ) -> Result<Response, AppError> {
        let mut data = self.template_data(session, auth)?;
        data.form = Some(FormData::Login(UserLoginForm::default()));
        self.render(Status::Ok, Page::Login, data)
    }

    pub(crate) async fn user_login_post(
        &self,
        session: &mut Session,
        auth: AuthState,
        mut form: UserLoginForm,
    ) -> Result<Response, AppError> {
        form.validate();
        if !form.valid() {
            return self.login_failed(session, auth, form);
        }

        let user_id: UserId = match self.auth.authenticate(&form.email, &form.password).await {
            Ok(id) => id,
            Err(ModelError::InvalidCredentials) => {
                form.add_non_field_error("Email or password is incorrect");
                return self.login_failed(session, auth, form);
            }
            Err(e) => return Err(e.into()),
        };

        self.auth.login(session, user_id).await?;

        let target: Option<String> = self.sessions.pop(session, REDIRECT_PATH_AFTER_LOGIN)?;
        Ok(Response::redirect(
            target.unwrap_or_else(|| "/snippet/create".to_string()),
        ))
    }

    fn login_failed(
        &self,
        session: &mut Session,
        auth: AuthState,
        form: UserLoginForm,
    ) -> Result<Response, AppError> {
        let mut data = self.template_data(session, auth)?;
        data.form = Some(FormData::Login(form));
        self.render(Status::UnprocessableEntity, Page::Login, data)
    }

    pub(crate) async fn user_logout_post(
        &self,
        session: &mut Session,
    ) -> Result<Response, AppError> {
        self.auth.logout(session).await?;
        Ok(Response::redirect("/"))
    }
}
