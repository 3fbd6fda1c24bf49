//! Cookie transport for session tokens.

use axum::http::header;

use crate::jwt::{ACCESS_TOKEN_DURATION_SECS, REFRESH_TOKEN_DURATION_SECS, TokenPair};

/// Cookie name for the access token (24 hours).
pub const ACCESS_COOKIE_NAME: &str = "access_token";

/// Cookie name for the refresh token (7 days).
pub const REFRESH_COOKIE_NAME: &str = "refresh_token";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    for part in cookie_header.split(';') {
        let part = part.trim();
        if let Some((key, value)) = part.split_once('=') {
            if key.trim() == name {
                return Some(value.trim());
            }
        }
    }
    None
}

/// Like [`get_cookie`], but treats an empty value as absent.
pub fn get_token_cookie<'a>(headers: &'a axum::http::HeaderMap, name: &str) -> Option<&'a str> {
    get_cookie(headers, name).filter(|value| !value.is_empty())
}

/// Build a `Set-Cookie` value for a session token.
pub fn token_cookie(name: &str, value: &str, max_age: u64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Strict; Path=/; Max-Age={}{}",
        name, value, max_age, secure
    )
}

/// Build a `Set-Cookie` value that removes the cookie.
pub fn clear_cookie(name: &str, secure: bool) -> String {
    token_cookie(name, "", 0, secure)
}

/// Cookies carrying a freshly issued pair: `[access, refresh]`.
pub fn pair_cookies(pair: &TokenPair, secure: bool) -> [String; 2] {
    [
        token_cookie(
            ACCESS_COOKIE_NAME,
            &pair.access_token,
            ACCESS_TOKEN_DURATION_SECS,
            secure,
        ),
        token_cookie(
            REFRESH_COOKIE_NAME,
            &pair.refresh_token,
            REFRESH_TOKEN_DURATION_SECS,
            secure,
        ),
    ]
}

/// Cookies that clear both tokens: `[access, refresh]`.
pub fn cleared_cookies(secure: bool) -> [String; 2] {
    [
        clear_cookie(ACCESS_COOKIE_NAME, secure),
        clear_cookie(REFRESH_COOKIE_NAME, secure),
    ]
}
