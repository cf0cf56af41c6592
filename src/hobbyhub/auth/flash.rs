//! One-shot flash messages carried in a short-lived cookie.
//!
//! Validation failures render on the next page load and nowhere else; the
//! cookie is cleared as soon as the messages are read, so concurrent users
//! never see each other's errors.

use axum::http::HeaderMap;
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};

use super::session::{cookie_value, secure_suffix};
use super::state::AuthConfig;

pub const FLASH_COOKIE_NAME: &str = "flash";

/// Long enough to survive one redirect, short enough not to linger.
const FLASH_MAX_AGE_SECONDS: i64 = 120;

/// `Set-Cookie` value carrying messages to show on the next page render.
#[must_use]
pub fn flash_cookie(config: &AuthConfig, messages: &[String]) -> String {
    let payload = serde_json::to_string(messages).unwrap_or_else(|_| "[]".to_string());
    let encoded = URL_SAFE_NO_PAD.encode(payload);
    format!(
        "{FLASH_COOKIE_NAME}={encoded}; Path=/; Max-Age={FLASH_MAX_AGE_SECONDS}; \
         HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// `Set-Cookie` value that removes the flash cookie.
#[must_use]
pub fn clear_flash_cookie(config: &AuthConfig) -> String {
    format!(
        "{FLASH_COOKIE_NAME}=; Path=/; Max-Age=0; HttpOnly; SameSite=Lax{}",
        secure_suffix(config)
    )
}

/// Decode pending flash messages from the request cookies.
///
/// A missing or malformed cookie yields no messages.
#[must_use]
pub fn take_flash(headers: &HeaderMap) -> Vec<String> {
    cookie_value(headers, FLASH_COOKIE_NAME)
        .and_then(|encoded| URL_SAFE_NO_PAD.decode(encoded.as_bytes()).ok())
        .and_then(|payload| serde_json::from_slice(&payload).ok())
        .unwrap_or_default()
}
