use std::sync::Arc;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::{redirect_with_cookies, server_error};
use crate::hobbyhub::auth::{flash, session, AuthError, AuthState};

#[derive(Deserialize, Debug)]
pub struct LoginForm {
    username: String,
    password: String,
    remember_me: Option<String>,
}

// axum handler for username/password login
#[instrument(skip_all)]
pub async fn login(
    Extension(state): Extension<Arc<AuthState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    let handle = match state.authenticate_local(&form.username, &form.password).await {
        Ok(handle) => handle,
        Err(AuthError::InvalidCredentials) => {
            warn!("login rejected");
            return redirect_with_cookies(
                "/login",
                &[flash::flash_cookie(
                    &state.config,
                    &["Invalid username or password".to_string()],
                )],
            );
        }
        Err(err) => {
            error!("login failed: {err}");
            return server_error();
        }
    };

    let mut cookies = vec![session::session_cookie(&state.config, &handle.token)];

    if form.remember_me.is_some() {
        match state.issue_remember_token(handle.principal.user_id).await {
            Ok(token) => cookies.push(session::remember_cookie(&state.config, &token)),
            Err(err) => {
                // The session is already established; log in without the
                // persistent cookie rather than failing the request.
                error!("failed to issue remember-me token: {err}");
            }
        }
    }

    info!(user_id = %handle.principal.user_id, "user logged in");
    redirect_with_cookies("/welcome", &cookies)
}

// axum handler for logout; clears both auth cookies
#[instrument(skip_all)]
pub async fn logout(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if let Some(token) = session::cookie_value(&headers, session::SESSION_COOKIE_NAME) {
        if let Err(err) = state.logout(&token).await {
            error!("failed to delete session: {err}");
        }
    }
    redirect_with_cookies(
        "/",
        &[
            session::clear_session_cookie(&state.config),
            session::clear_remember_cookie(&state.config),
        ],
    )
}
