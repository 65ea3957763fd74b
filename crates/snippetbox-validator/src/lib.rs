//! Form validation for Snippetbox.
//!
//! Validation is split in two halves that callers compose:
//!
//! 1. **Checks** ([`not_blank`], [`max_chars`], [`min_chars`],
//!    [`permitted_int`], [`matches`]) — pure functions that answer "is this
//!    input acceptable?" with a `bool`.
//! 2. **Accumulation** ([`Validator`]) — collects the messages for failed
//!    checks, one per field plus any number of form-wide messages.
//!
//! Form types hold a `Validator` and implement [`Form`] to expose it:
//!
//! ```rust
//! use snippetbox_validator::{Form, Validator, not_blank, max_chars};
//!
//! #[derive(Default)]
//! struct CommentForm {
//!     body: String,
//!     validator: Validator,
//! }
//!
//! impl Form for CommentForm {
//!     fn validator(&self) -> &Validator { &self.validator }
//!     fn validator_mut(&mut self) -> &mut Validator { &mut self.validator }
//! }
//!
//! let mut form = CommentForm::default();
//! let body_ok = not_blank(&form.body);
//! form.check_field(body_ok, "body", "This field cannot be blank");
//! let body_short = max_chars(&form.body, 500);
//! form.check_field(body_short, "body", "Too long");
//!
//! assert!(!form.valid());
//! assert_eq!(form.field_error("body"), Some("This field cannot be blank"));
//! ```

mod checks;
mod form;
mod validator;

pub use checks::{EMAIL_RX, matches, max_chars, min_chars, not_blank, permitted_int};
pub use form::Form;
pub use validator::Validator;
