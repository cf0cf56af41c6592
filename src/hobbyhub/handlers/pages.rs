//! The public pages and the hobby submission form.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use super::{current_principal, redirect_with_cookies};
use crate::hobbyhub::auth::{flash, session, AuthConfig, AuthState};
use crate::hobbyhub::views;

// axum handler for the landing page
#[instrument(skip_all)]
pub async fn home() -> impl IntoResponse {
    Html(views::home())
}

/// Render a form page, draining any pending flash messages into it.
///
/// The flash cookie is consumed by this read, so it is cleared whenever the
/// request carried one, even if it failed to decode.
fn form_page(
    config: &AuthConfig,
    headers: &HeaderMap,
    render: impl Fn(&[String]) -> String,
) -> Response {
    let messages = flash::take_flash(headers);
    let mut response = Html(render(&messages)).into_response();
    if session::cookie_value(headers, flash::FLASH_COOKIE_NAME).is_some() {
        if let Ok(value) = flash::clear_flash_cookie(config).parse() {
            response
                .headers_mut()
                .append(axum::http::header::SET_COOKIE, value);
        }
    }
    response
}

// axum handler for the login form
#[instrument(skip_all)]
pub async fn login_form(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    form_page(&state.config, &headers, views::login)
}

// axum handler for the registration form
#[instrument(skip_all)]
pub async fn register_form(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    form_page(&state.config, &headers, views::register)
}

// axum handler for the hobby submission form, login required
#[instrument(skip_all)]
pub async fn submit_form(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if current_principal(&state, &headers).await.is_none() {
        return redirect_with_cookies("/login", &[]);
    }
    Html(views::submit_form()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::{COOKIE, SET_COOKIE};
    use axum::http::HeaderValue;

    fn config() -> AuthConfig {
        AuthConfig::new("http://localhost:8080")
    }

    fn clears_flash(response: &Response) -> bool {
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .any(|cookie| cookie.starts_with("flash=;") && cookie.contains("Max-Age=0"))
    }

    #[test]
    fn form_page_clears_a_decodable_flash_cookie() {
        let messages = vec!["Invalid username or password".to_string()];
        let cookie = flash::flash_cookie(&config(), &messages);
        let value = cookie.split(';').next().unwrap().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_str(&value).unwrap());

        let response = form_page(&config(), &headers, views::login);
        assert!(clears_flash(&response));
    }

    #[test]
    fn form_page_clears_a_malformed_flash_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("flash=%%%garbage"));

        let response = form_page(&config(), &headers, views::login);
        assert!(clears_flash(&response));
    }

    #[test]
    fn form_page_without_flash_sets_no_cookie() {
        let headers = HeaderMap::new();
        let response = form_page(&config(), &headers, views::login);
        assert!(response.headers().get(SET_COOKIE).is_none());
    }
}
