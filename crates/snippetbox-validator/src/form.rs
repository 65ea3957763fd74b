//! The "has validation" capability shared by every form type.

use crate::Validator;

/// A form that carries a [`Validator`].
///
/// Implementors only supply the two accessors; everything else is provided
/// and forwards to the validator. Handlers can then write
/// `form.check_field(...)` and `form.valid()` on any form type, and generic
/// code can accept `impl Form` to inspect errors without knowing which form
/// it has.
pub trait Form {
    fn validator(&self) -> &Validator;

    fn validator_mut(&mut self) -> &mut Validator;

    fn valid(&self) -> bool {
        self.validator().valid()
    }

    fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        self.validator_mut().check_field(ok, field, message);
    }

    fn add_field_error(&mut self, field: &str, message: &str) {
        self.validator_mut().add_field_error(field, message);
    }

    fn add_non_field_error(&mut self, message: &str) {
        self.validator_mut().add_non_field_error(message);
    }

    fn field_error(&self, field: &str) -> Option<&str> {
        self.validator().field_error(field)
    }

    fn non_field_errors(&self) -> &[String] {
        self.validator().non_field_errors()
    }
}
