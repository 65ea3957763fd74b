//! Cookie transport policy for session tokens.
//!
//! The session layer doesn't write HTTP headers, but it does own the rules
//! for the cookie that carries the token: its name, that it is only ever
//! sent over HTTPS, that scripts cannot read it, and how long the browser
//! should keep it. [`SessionCookie`] is the finished decision, built on a
//! [`Cookie`]; its `Display` output is a ready-to-send `Set-Cookie`
//! value.

use std::fmt;
use std::time::Duration;

use ::cookie::Cookie;

pub use ::cookie::SameSite;

/// How the session cookie is issued.
#[derive(Debug, Clone)]
pub struct CookieConfig {
    /// Cookie name. Default: `"session"`.
    pub name: String,

    /// Cookie path. Default: `"/"`.
    pub path: String,

    /// Optional cookie domain. Default: host-only.
    pub domain: Option<String>,

    /// Only send the cookie over HTTPS. Default: `true`.
    pub secure: bool,

    /// Hide the cookie from client-side scripts. Default: `true`.
    pub http_only: bool,

    /// Default: [`SameSite::Lax`].
    pub same_site: SameSite,

    /// When `true` the cookie carries `Max-Age` equal to the time left in the
    /// session, so it survives a browser restart. When `false` it is a
    /// browser-session cookie. Default: `true`.
    pub persist: bool,
}

impl Default for CookieConfig {
    fn default() -> Self {
        Self {
            name: "session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            persist: true,
        }
    }
}

impl CookieConfig {
    fn build(&self, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((self.name.clone(), value))
            .path(self.path.clone())
            .secure(self.secure)
            .http_only(self.http_only)
            .same_site(self.same_site)
            .build();
        if let Some(domain) = &self.domain {
            cookie.set_domain(domain.clone());
        }
        cookie
    }
}

/// A cookie the caller must send back to the visitor.
#[derive(Debug, Clone)]
pub struct SessionCookie(Cookie<'static>);

impl SessionCookie {
    /// A cookie carrying `token`, alive for `remaining` when persistent.
    pub(crate) fn issue(config: &CookieConfig, token: &str, remaining: Duration) -> Self {
        let mut cookie = config.build(token.to_string());
        if config.persist {
            let secs = i64::try_from(remaining.as_secs()).unwrap_or(i64::MAX);
            cookie.set_max_age(::cookie::time::Duration::seconds(secs));
        }
        Self(cookie)
    }

    /// A cookie that makes the browser forget the session token.
    pub(crate) fn expire(config: &CookieConfig) -> Self {
        let mut cookie = config.build(String::new());
        cookie.make_removal();
        Self(cookie)
    }

    pub fn name(&self) -> &str {
        self.0.name()
    }

    /// The session token, or empty when expiring a destroyed session.
    pub fn value(&self) -> &str {
        self.0.value()
    }

    /// `Some(Duration::ZERO)` tells the browser to drop the cookie now.
    pub fn max_age(&self) -> Option<Duration> {
        self.0
            .max_age()
            .map(|age| Duration::from_secs(u64::try_from(age.whole_seconds()).unwrap_or(0)))
    }

    pub fn secure(&self) -> bool {
        self.0.secure().unwrap_or(false)
    }

    pub fn http_only(&self) -> bool {
        self.0.http_only().unwrap_or(false)
    }

    pub fn same_site(&self) -> Option<SameSite> {
        self.0.same_site()
    }

    /// `true` if this cookie removes the session from the browser.
    pub fn is_removal(&self) -> bool {
        self.0.max_age() == Some(::cookie::time::Duration::ZERO)
    }

    /// The underlying cookie, for web layers that set it themselves.
    pub fn as_cookie(&self) -> &Cookie<'static> {
        &self.0
    }

    pub fn into_cookie(self) -> Cookie<'static> {
        self.0
    }
}

impl fmt::Display for SessionCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_persistent_cookie_header() {
        let cookie = SessionCookie::issue(
            &CookieConfig::default(),
            "abc123",
            Duration::from_secs(3600),
        );

        let header = cookie.to_string();
        assert!(header.starts_with("session=abc123"));
        assert!(header.contains("Path=/"));
        assert!(header.contains("Max-Age=3600"));
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
        assert!(header.contains("SameSite=Lax"));
        assert_eq!(cookie.max_age(), Some(Duration::from_secs(3600)));
        assert!(!cookie.is_removal());
    }

    #[test]
    fn test_issue_non_persistent_cookie_has_no_max_age() {
        let config = CookieConfig {
            persist: false,
            ..CookieConfig::default()
        };

        let cookie = SessionCookie::issue(&config, "abc", Duration::from_secs(10));

        assert_eq!(cookie.max_age(), None);
        assert!(!cookie.to_string().contains("Max-Age"));
    }

    #[test]
    fn test_issue_insecure_strict_config_is_respected() {
        let config = CookieConfig {
            secure: false,
            same_site: SameSite::Strict,
            ..CookieConfig::default()
        };

        let cookie = SessionCookie::issue(&config, "abc", Duration::from_secs(10));

        assert!(!cookie.secure());
        assert!(cookie.http_only());
        assert_eq!(cookie.same_site(), Some(SameSite::Strict));
        assert!(!cookie.to_string().contains("Secure"));
    }

    #[test]
    fn test_expire_cookie_clears_value() {
        let config = CookieConfig {
            domain: Some("example.com".into()),
            ..CookieConfig::default()
        };

        let cookie = SessionCookie::expire(&config);

        assert!(cookie.is_removal());
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
        let header = cookie.to_string();
        assert!(header.starts_with("session=;"));
        assert!(header.contains("Domain=example.com"));
        assert!(header.contains("Max-Age=0"));
    }
}
