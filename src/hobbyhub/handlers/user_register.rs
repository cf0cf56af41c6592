use std::sync::Arc;

use axum::{extract::Extension, response::IntoResponse, Form};
use serde::Deserialize;
use tracing::{error, info, instrument};

use super::{redirect_with_cookies, server_error};
use crate::hobbyhub::auth::{flash, session, AuthError, AuthState};

#[derive(Deserialize, Debug)]
pub struct RegisterForm {
    username: String,
    password: String,
}

// axum handler for registration; a new account is logged in right away
#[instrument(skip_all)]
pub async fn register(
    Extension(state): Extension<Arc<AuthState>>,
    Form(form): Form<RegisterForm>,
) -> impl IntoResponse {
    match state.register(&form.username, &form.password).await {
        Ok(handle) => {
            info!(user_id = %handle.principal.user_id, "user registered");
            redirect_with_cookies(
                "/welcome",
                &[session::session_cookie(&state.config, &handle.token)],
            )
        }
        Err(AuthError::Validation(messages)) => redirect_with_cookies(
            "/register",
            &[flash::flash_cookie(&state.config, &messages)],
        ),
        Err(AuthError::DuplicateUsername) => redirect_with_cookies(
            "/register",
            &[flash::flash_cookie(
                &state.config,
                &["That username is already registered".to_string()],
            )],
        ),
        Err(err) => {
            error!("registration failed: {err}");
            server_error()
        }
    }
}
