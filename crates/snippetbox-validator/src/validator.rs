//! The error accumulator.

use std::collections::HashMap;

use serde::Serialize;

/// Collects validation messages for one form submission.
///
/// Two containers:
///
/// - **field errors** — at most one message per field. The first failure
///   recorded for a field is the one kept; later failures for the same field
///   are dropped so the form shows a single message next to each input.
/// - **non-field errors** — an ordered list of form-wide messages such as
///   "Email or password is incorrect". Duplicates are kept.
///
/// A `Validator` is built fresh for each request and thrown away once the
/// response is produced. It serializes so template data can carry it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Validator {
    field_errors: HashMap<String, String>,
    non_field_errors: Vec<String>,
}

impl Validator {
    /// Creates an empty validator.
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` iff no field error and no non-field error has been recorded.
    pub fn valid(&self) -> bool {
        self.field_errors.is_empty() && self.non_field_errors.is_empty()
    }

    /// Records `message` under `field` unless `field` already has one.
    pub fn add_field_error(&mut self, field: &str, message: &str) {
        // `entry().or_insert_with` only runs the closure for a vacant key,
        // which is exactly the first-wins rule.
        self.field_errors
            .entry(field.to_string())
            .or_insert_with(|| message.to_string());
    }

    /// Appends a form-wide message.
    pub fn add_non_field_error(&mut self, message: &str) {
        self.non_field_errors.push(message.to_string());
    }

    /// Records `message` under `field` when `ok` is `false`.
    ///
    /// The check itself has already run by the time this is called; this
    /// only decides whether its message is kept.
    pub fn check_field(&mut self, ok: bool, field: &str, message: &str) {
        if !ok {
            self.add_field_error(field, message);
        }
    }

    /// The message recorded for `field`, if any.
    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field).map(String::as_str)
    }

    pub fn field_errors(&self) -> &HashMap<String, String> {
        &self.field_errors
    }

    pub fn non_field_errors(&self) -> &[String] {
        &self.non_field_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validator_is_valid() {
        let v = Validator::new();
        assert!(v.valid());
        assert!(v.field_errors().is_empty());
        assert!(v.non_field_errors().is_empty());
    }

    #[test]
    fn test_check_field_first_failure_wins() {
        let mut v = Validator::new();

        v.check_field(false, "x", "m1");
        v.check_field(false, "x", "m2");

        assert_eq!(v.field_error("x"), Some("m1"));
        assert_eq!(v.field_errors().len(), 1);
    }

    #[test]
    fn test_check_field_passing_check_records_nothing() {
        let mut v = Validator::new();

        v.check_field(true, "x", "never shown");

        assert!(v.valid());
        assert_eq!(v.field_error("x"), None);
    }

    #[test]
    fn test_check_field_pass_then_fail_records_failure() {
        let mut v = Validator::new();

        v.check_field(true, "x", "m1");
        v.check_field(false, "x", "m2");

        assert_eq!(v.field_error("x"), Some("m2"));
    }

    #[test]
    fn test_add_field_error_respects_existing_message() {
        let mut v = Validator::new();

        v.check_field(false, "email", "This field cannot be blank");
        v.add_field_error("email", "Email address is already in use");

        assert_eq!(v.field_error("email"), Some("This field cannot be blank"));
    }

    #[test]
    fn test_failures_on_different_fields_are_all_kept() {
        let mut v = Validator::new();

        v.check_field(false, "title", "t");
        v.check_field(false, "content", "c");
        v.check_field(false, "expires", "e");

        assert_eq!(v.field_errors().len(), 3);
    }

    #[test]
    fn test_add_non_field_error_appends_duplicates_in_order() {
        let mut v = Validator::new();

        v.add_non_field_error("Email or password is incorrect");
        v.add_non_field_error("Email or password is incorrect");

        assert_eq!(v.non_field_errors().len(), 2);
        assert!(!v.valid());
    }

    #[test]
    fn test_valid_false_with_only_non_field_errors() {
        let mut v = Validator::new();
        v.add_non_field_error("nope");
        assert!(v.field_errors().is_empty());
        assert!(!v.valid());
    }
}
