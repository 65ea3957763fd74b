//! The three forms a visitor can submit, and the rules each one enforces.
//!
//! Every form keeps the submitted values next to its [`Validator`] so a
//! failed submission can be rendered again with the input filled in and
//! the messages beside it. Passwords are the exception: they are never
//! serialized, so they never reach template data.

use std::fmt;
use std::num::ParseIntError;

use serde::{Deserialize, Serialize};
use snippetbox_validator::{
    EMAIL_RX, Form, Validator, matches, max_chars, min_chars, not_blank, permitted_int,
};

const BLANK: &str = "This field cannot be blank";

/// Lifetimes a snippet may be created with, in days.
pub const PERMITTED_EXPIRES: [i32; 3] = [1, 7, 365];

// ---------------------------------------------------------------------------
// Snippet creation
// ---------------------------------------------------------------------------

/// The raw snippet submission, as posted.
///
/// `expires` stays a string here: a value that isn't a number at all is a
/// malformed request, not a validation failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SnippetCreateInput {
    pub title: String,
    pub content: String,
    pub expires: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SnippetCreateForm {
    pub title: String,
    pub content: String,
    pub expires: i32,
    validator: Validator,
}

impl Default for SnippetCreateForm {
    /// The empty form shown on the create page; a year is preselected.
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            expires: 365,
            validator: Validator::new(),
        }
    }
}

impl TryFrom<SnippetCreateInput> for SnippetCreateForm {
    type Error = ParseIntError;

    fn try_from(input: SnippetCreateInput) -> Result<Self, Self::Error> {
        Ok(Self {
            expires: input.expires.trim().parse()?,
            title: input.title,
            content: input.content,
            validator: Validator::new(),
        })
    }
}

impl SnippetCreateForm {
    pub fn validate(&mut self) {
        let title_ok = not_blank(&self.title);
        self.check_field(title_ok, "title", BLANK);
        let title_short = max_chars(&self.title, 100);
        self.check_field(
            title_short,
            "title",
            "This field cannot be more than 100 characters long",
        );

        let content_ok = not_blank(&self.content);
        self.check_field(content_ok, "content", BLANK);

        let expires_ok = permitted_int(self.expires, &PERMITTED_EXPIRES);
        self.check_field(expires_ok, "expires", "This field must equal 1, 7 or 365");
    }
}

impl Form for SnippetCreateForm {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }
}

// ---------------------------------------------------------------------------
// Signup
// ---------------------------------------------------------------------------

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSignupForm {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    validator: Validator,
}

impl UserSignupForm {
    pub fn new(name: &str, email: &str, password: &str) -> Self {
        Self {
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
            validator: Validator::new(),
        }
    }

    pub fn validate(&mut self) {
        let name_ok = not_blank(&self.name);
        self.check_field(name_ok, "name", BLANK);

        let email_ok = not_blank(&self.email);
        self.check_field(email_ok, "email", BLANK);
        let email_valid = matches(&self.email, &EMAIL_RX);
        self.check_field(email_valid, "email", "This field must be a valid email address");

        let password_ok = not_blank(&self.password);
        self.check_field(password_ok, "password", BLANK);
        let password_long = min_chars(&self.password, 8);
        self.check_field(
            password_long,
            "password",
            "This field must be at least 8 characters long",
        );
    }
}

impl Form for UserSignupForm {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }
}

impl fmt::Debug for UserSignupForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserSignupForm")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("validator", &self.validator)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Login
// ---------------------------------------------------------------------------

#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserLoginForm {
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    #[serde(skip_deserializing)]
    validator: Validator,
}

impl UserLoginForm {
    pub fn new(email: &str, password: &str) -> Self {
        Self {
            email: email.to_string(),
            password: password.to_string(),
            validator: Validator::new(),
        }
    }

    pub fn validate(&mut self) {
        let email_ok = not_blank(&self.email);
        self.check_field(email_ok, "email", BLANK);
        let email_valid = matches(&self.email, &EMAIL_RX);
        self.check_field(email_valid, "email", "This field must be a valid email address");

        let password_ok = not_blank(&self.password);
        self.check_field(password_ok, "password", BLANK);
    }
}

impl Form for UserLoginForm {
    fn validator(&self) -> &Validator {
        &self.validator
    }

    fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }
}

impl fmt::Debug for UserLoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserLoginForm")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .field("validator", &self.validator)
            .finish()
    }
}
