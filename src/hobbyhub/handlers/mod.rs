pub mod health;
pub use self::health::health;

pub mod pages;
pub mod user_login;
pub mod user_register;

pub mod hobbies;
pub mod oauth;

// common functions for the handlers
use axum::{
    http::{header::SET_COOKIE, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

use crate::hobbyhub::auth::{session, AuthState, Principal};
use crate::hobbyhub::views;

/// Resolve the requester's principal from the session cookie, if any.
pub async fn current_principal(state: &AuthState, headers: &HeaderMap) -> Option<Principal> {
    let token = session::cookie_value(headers, session::SESSION_COOKIE_NAME)?;
    match state.resolve_session(&token).await {
        Ok(principal) => principal,
        Err(err) => {
            error!("failed to resolve session: {err}");
            None
        }
    }
}

/// 303 redirect carrying any number of `Set-Cookie` values.
pub fn redirect_with_cookies(location: &str, cookies: &[String]) -> Response {
    let mut response = (StatusCode::SEE_OTHER, ()).into_response();
    if let Ok(value) = HeaderValue::from_str(location) {
        response
            .headers_mut()
            .insert(axum::http::header::LOCATION, value);
    }
    for cookie in cookies {
        if let Ok(value) = HeaderValue::from_str(cookie) {
            response.headers_mut().append(SET_COOKIE, value);
        }
    }
    response
}

/// The generic failure page. Details stay in the logs.
pub fn server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, Html(views::server_error())).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn redirect_sets_location_and_cookies() {
        let response = redirect_with_cookies(
            "/welcome",
            &["a=1; Path=/".to_string(), "b=2; Path=/".to_string()],
        );
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers().get(LOCATION).unwrap(), "/welcome");
        assert_eq!(response.headers().get_all(SET_COOKIE).iter().count(), 2);
    }

    #[test]
    fn redirect_without_cookies() {
        let response = redirect_with_cookies("/login", &[]);
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }

    #[test]
    fn server_error_is_500() {
        assert_eq!(server_error().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
