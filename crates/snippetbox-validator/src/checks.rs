//! Pure validation checks.
//!
//! Each function returns `true` when the input is acceptable. None of them
//! record anything; feed the result to [`Validator::check_field`](crate::Validator::check_field).

use std::sync::LazyLock;

use regex::Regex;

/// Email syntax accepted by the signup and login forms.
///
/// This is the pattern browsers use for `<input type="email">`: a local part
/// of printable characters, then a dot-separated domain whose labels are at
/// most 63 characters and never start or end with a hyphen.
pub static EMAIL_RX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .unwrap()
});

/// `false` iff `value` is empty once surrounding whitespace is trimmed.
pub fn not_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// `false` iff `value` holds more than `n` characters.
///
/// Counts Unicode scalar values, not bytes: `"héllo"` is 5 characters even
/// though it is 6 bytes long.
pub fn max_chars(value: &str, n: usize) -> bool {
    value.chars().count() <= n
}

/// `false` iff `value` holds fewer than `n` characters.
pub fn min_chars(value: &str, n: usize) -> bool {
    value.chars().count() >= n
}

/// `false` iff `value` is not one of the `permitted` integers.
///
/// Used for enumerated choices such as snippet expiry (`1`, `7` or `365`
/// days). It is a membership test, not a range: `permitted_int(2, &[1, 7])`
/// is `false`.
pub fn permitted_int(value: i32, permitted: &[i32]) -> bool {
    permitted.contains(&value)
}

/// `false` iff `value` does not match `rx`.
pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}
