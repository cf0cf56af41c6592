//! The welcome page and hobby submission.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
    Form,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use super::{current_principal, redirect_with_cookies, server_error};
use crate::hobbyhub::auth::{session, AuthError, AuthState};
use crate::hobbyhub::views;

// axum handler for the welcome page
//
// Falls back to the remember-me cookie when no session is live: the token is
// redeemed for a fresh session and removed, so it cannot be replayed.
#[instrument(skip_all)]
pub async fn welcome(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
) -> Response {
    if let Some(principal) = current_principal(&state, &headers).await {
        return Html(views::welcome(&principal)).into_response();
    }

    let Some(token) = session::cookie_value(&headers, session::REMEMBER_COOKIE_NAME) else {
        return redirect_with_cookies("/login", &[]);
    };

    match state.authenticate_remember_me(&token).await {
        Ok(handle) => {
            info!(user_id = %handle.principal.user_id, "session restored from remember-me token");
            redirect_with_cookies(
                "/welcome",
                &[
                    session::session_cookie(&state.config, &handle.token),
                    session::clear_remember_cookie(&state.config),
                ],
            )
        }
        Err(AuthError::InvalidToken) => {
            warn!("remember-me token rejected");
            redirect_with_cookies(
                "/login",
                &[session::clear_remember_cookie(&state.config)],
            )
        }
        Err(err) => {
            error!("remember-me login failed: {err}");
            server_error()
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct HobbyForm {
    hobby: String,
}

// axum handler for adding a hobby, login required
#[instrument(skip_all)]
pub async fn submit(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Form(form): Form<HobbyForm>,
) -> Response {
    let Some(principal) = current_principal(&state, &headers).await else {
        return redirect_with_cookies("/login", &[]);
    };

    // The submitted text is stored as-is: no trimming, no dedup.
    match state.append_hobby(principal.user_id, &form.hobby).await {
        Ok(()) => redirect_with_cookies("/welcome", &[]),
        Err(err) => {
            error!("failed to append hobby: {err}");
            server_error()
        }
    }
}
