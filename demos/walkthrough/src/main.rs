//! Walks one visitor through the whole site: signup, a failed login, a
//! bounce off a protected page, login, snippet creation, and logout.
//!
//! Run with `RUST_LOG=debug` to see session loads and commits too.

use snippetbox::prelude::*;
use snippetbox::response::FormData;
use tracing_subscriber::EnvFilter;

/// Holds the session cookie between requests, like a browser would.
#[derive(Default)]
struct Browser {
    token: Option<String>,
}

impl Browser {
    async fn send(
        &mut self,
        app: &App<MemorySnippets, MemoryUsers, MemoryStore>,
        request: Request,
    ) -> Response {
        let path = request.path();
        let reply = app.handle(self.token.as_deref(), request).await;

        if let Some(cookie) = &reply.cookie {
            println!("  Set-Cookie: {cookie}");
            self.token = (!cookie.is_removal()).then(|| cookie.value().to_string());
        }
        println!("{path} -> {}", describe(&reply.response));
        reply.response
    }
}

fn describe(response: &Response) -> String {
    match response {
        Response::Render { status, page, data } => {
            let mut line = format!("{} {}", status.code(), page.template());
            if let Some(flash) = &data.flash {
                line.push_str(&format!(" flash={flash:?}"));
            }
            if data.is_authenticated {
                line.push_str(" (logged in)");
            }
            if let Some(errors) = form_errors(data.form.as_ref()) {
                line.push_str(&format!(" errors={errors:?}"));
            }
            line
        }
        Response::Redirect(location) => format!("303 see {location}"),
        other => other.status_code().to_string(),
    }
}

fn form_errors(form: Option<&FormData>) -> Option<Vec<String>> {
    let validator = match form? {
        FormData::SnippetCreate(form) => form.validator(),
        FormData::Signup(form) => form.validator(),
        FormData::Login(form) => form.validator(),
    };
    if validator.valid() {
        return None;
    }
    let mut errors: Vec<String> = validator
        .field_errors()
        .iter()
        .map(|(field, message)| format!("{field}: {message}"))
        .collect();
    errors.sort();
    errors.extend(validator.non_field_errors().iter().cloned());
    Some(errors)
}

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let app = AppBuilder::new().build(
        MemorySnippets::new(),
        MemoryUsers::new(),
        MemoryStore::new(),
    );
    let mut browser = Browser::default();

    browser.send(&app, Request::Home).await;

    browser
        .send(
            &app,
            Request::UserSignupPost(UserSignupForm::new("Alice", "alice-at-example", "short")),
        )
        .await;
    let signup = UserSignupForm::new("Alice", "alice@example.com", "pa55word!");
    browser.send(&app, Request::UserSignupPost(signup)).await;
    browser.send(&app, Request::UserLogin).await;

    browser
        .send(
            &app,
            Request::UserLoginPost(UserLoginForm::new("alice@example.com", "wrong-password")),
        )
        .await;

    browser.send(&app, Request::SnippetCreate).await;
    browser
        .send(
            &app,
            Request::UserLoginPost(UserLoginForm::new("alice@example.com", "pa55word!")),
        )
        .await;

    let input = SnippetCreateInput {
        title: "An old silent pond".into(),
        content: "An old silent pond...\nA frog jumps into the pond,\nsplash! Silence again."
            .into(),
        expires: "7".into(),
    };
    let created = browser.send(&app, Request::SnippetCreatePost(input)).await;
    if let Some(location) = created.location() {
        let id = location.rsplit('/').next().unwrap_or_default().to_string();
        browser.send(&app, Request::SnippetView { id }).await;
    }

    browser.send(&app, Request::UserLogoutPost).await;
    browser.send(&app, Request::Home).await;
}
