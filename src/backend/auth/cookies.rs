/**
 * Session Cookies
 *
 * Helpers for the `accessToken` / `refreshToken` cookies. Both are set
 * `HttpOnly; Secure; Path=/` and cleared with the same flags plus an epoch
 * expiry, so the browser matches and drops the stored cookie.
 */

use axum::http::{header, HeaderMap};
use axum::response::AppendHeaders;
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::Cookie;

use crate::backend::auth::sessions::TokenPair;

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie carrying the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// `Set-Cookie` headers for both session cookies
pub type SessionCookies = AppendHeaders<[(header::HeaderName, String); 2]>;

/// Build an HttpOnly, Secure session cookie
pub fn session_cookie(name: &'static str, value: impl Into<String>) -> Cookie<'static> {
    Cookie::build((name, value.into()))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

/// Build a cookie that removes `name` from the browser
pub fn removal_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(CookieDuration::ZERO)
        .expires(OffsetDateTime::UNIX_EPOCH)
        .build()
}

/// Read a non-empty cookie value from the request's `Cookie` headers
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| Cookie::split_parse(value.to_string()))
        .filter_map(Result::ok)
        .find(|c| c.name() == name && !c.value().is_empty())
        .map(|c| c.value().to_string())
}

/// Set both session cookies from a freshly issued pair
pub fn token_cookies(pair: &TokenPair) -> SessionCookies {
    AppendHeaders([
        (
            header::SET_COOKIE,
            session_cookie(ACCESS_TOKEN_COOKIE, pair.access_token.clone()).to_string(),
        ),
        (
            header::SET_COOKIE,
            session_cookie(REFRESH_TOKEN_COOKIE, pair.refresh_token.clone()).to_string(),
        ),
    ])
}

/// Clear both session cookies
pub fn cleared_cookies() -> SessionCookies {
    AppendHeaders([
        (header::SET_COOKIE, removal_cookie(ACCESS_TOKEN_COOKIE).to_string()),
        (header::SET_COOKIE, removal_cookie(REFRESH_TOKEN_COOKIE).to_string()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_session_cookie_flags() {
        let cookie = session_cookie(ACCESS_TOKEN_COOKIE, "abc");
        assert_eq!(cookie.name(), "accessToken");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }

    #[test]
    fn test_removal_cookie_expires_in_the_past() {
        let cookie = removal_cookie(REFRESH_TOKEN_COOKIE);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(CookieDuration::ZERO));
        assert_eq!(cookie.expires_datetime(), Some(OffsetDateTime::UNIX_EPOCH));

        let header = cookie.to_string();
        assert!(header.contains("HttpOnly"));
        assert!(header.contains("Secure"));
    }

    #[test]
    fn test_read_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; accessToken=tok123; refreshToken="),
        );

        assert_eq!(read_cookie(&headers, ACCESS_TOKEN_COOKIE).as_deref(), Some("tok123"));
        assert_eq!(read_cookie(&headers, REFRESH_TOKEN_COOKIE), None);
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn test_read_cookie_across_headers() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(header::COOKIE, HeaderValue::from_static("refreshToken=r1"));

        assert_eq!(read_cookie(&headers, REFRESH_TOKEN_COOKIE).as_deref(), Some("r1"));
    }
}
