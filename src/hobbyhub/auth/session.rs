//! Cookie names and `Set-Cookie` builders for the session layer.

use axum::http::{header::COOKIE, HeaderMap};

use super::state::AuthConfig;

pub const SESSION_COOKIE_NAME: &str = "hobbyhub_session";
pub const REMEMBER_COOKIE_NAME: &str = "remember_me";
pub const STATE_COOKIE_NAME: &str = "oauth_state";

/// How long the OAuth CSRF state cookie may sit between redirect and callback.
const STATE_COOKIE_MAX_AGE_SECONDS: i64 = 600;

/// `Secure` attribute for every cookie this app sets, keyed off the site URL.
pub(crate) fn secure_suffix(config: &AuthConfig) -> &'static str {
    if config.cookies_secure() {
        "; Secure"
    } else {
        ""
    }
}

/// `Set-Cookie` value carrying the session token.
#[must_use]
pub fn session_cookie(config: &AuthConfig, token: &str) -> String {
    format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; Max-Age={}; HttpOnly; SameSite=Lax{}",
        config.session_ttl_seconds(),
        secure_suffix(config)
    )
}

/// `Set-Cookie` value that removes the session cookie.
#[must_use]
pub fn clear_session_cookie(config: &AuthConfig) -> String {
    format!(
        "{SESSION_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// `Set-Cookie` value carrying the remember-me token.
///
/// Scoped to `/welcome` so the token only travels on the one request that
/// can redeem it.
#[must_use]
pub fn remember_cookie(config: &AuthConfig, token: &str) -> String {
    format!(
        "{REMEMBER_COOKIE_NAME}={token}; Path=/welcome; Max-Age={}; HttpOnly; SameSite=Lax{}",
        config.remember_ttl_seconds(),
        secure_suffix(config)
    )
}

/// `Set-Cookie` value that removes the remember-me cookie.
#[must_use]
pub fn clear_remember_cookie(config: &AuthConfig) -> String {
    format!(
        "{REMEMBER_COOKIE_NAME}=; Path=/welcome; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// `Set-Cookie` value carrying the OAuth CSRF state, scoped to `/auth`.
#[must_use]
pub fn state_cookie(config: &AuthConfig, state: &str) -> String {
    format!(
        "{STATE_COOKIE_NAME}={state}; Path=/auth; Max-Age={STATE_COOKIE_MAX_AGE_SECONDS}; \
         HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// `Set-Cookie` value that removes the OAuth state cookie.
#[must_use]
pub fn clear_state_cookie(config: &AuthConfig) -> String {
    format!(
        "{STATE_COOKIE_NAME}=; Path=/auth; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// Extract one cookie's value from the request `Cookie` headers.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
        .next()
}
