//! OAuth login round trips for Google and Facebook.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::HeaderMap,
    response::Response,
};
use secrecy::ExposeSecret;
use tracing::{error, info, instrument, warn};

use super::{redirect_with_cookies, server_error};
use crate::hobbyhub::auth::{flash, session, tokens, AuthState, Provider};

fn provider_unavailable(state: &AuthState, provider: Provider) -> Response {
    redirect_with_cookies(
        "/login",
        &[flash::flash_cookie(
            &state.config,
            &[format!("{provider} sign-in is not available")],
        )],
    )
}

fn login_failed(state: &AuthState, provider: Provider) -> Response {
    redirect_with_cookies(
        "/login",
        &[
            flash::flash_cookie(
                &state.config,
                &[format!("{provider} sign-in failed, please try again")],
            ),
            session::clear_state_cookie(&state.config),
        ],
    )
}

/// Start the authorization round trip: remember a CSRF state value in a
/// short-lived cookie and send the browser to the provider.
async fn begin(state: &AuthState, provider: Provider) -> Response {
    let Some(client) = state.oauth_client(provider) else {
        warn!("{provider} login requested but the provider is not configured");
        return provider_unavailable(state, provider);
    };

    let csrf_state = match tokens::generate_state_token() {
        Ok(token) => token,
        Err(err) => {
            error!("failed to generate oauth state: {err}");
            return server_error();
        }
    };

    redirect_with_cookies(
        &client.authorization_url(&csrf_state),
        &[session::state_cookie(&state.config, &csrf_state)],
    )
}

/// Finish the round trip: verify the CSRF state, trade the code for an
/// access token, fetch the identity, and log the user in.
async fn finish(
    state: &AuthState,
    provider: Provider,
    headers: &HeaderMap,
    params: &HashMap<String, String>,
) -> Response {
    let Some(client) = state.oauth_client(provider) else {
        return provider_unavailable(state, provider);
    };

    let expected_state = session::cookie_value(headers, session::STATE_COOKIE_NAME);
    let returned_state = params.get("state").map(String::as_str);
    if expected_state.is_none() || expected_state.as_deref() != returned_state {
        warn!("{provider} callback state mismatch");
        return login_failed(state, provider);
    }

    let Some(code) = params.get("code") else {
        // The provider reports denial via `error` instead of a code.
        warn!(
            "{provider} callback without code: {}",
            params.get("error").map_or("unknown", String::as_str)
        );
        return login_failed(state, provider);
    };

    let identity = match client.exchange_code(code).await {
        Ok(access_token) => match client.fetch_identity(access_token.expose_secret()).await {
            Ok(identity) => identity,
            Err(err) => {
                error!("{provider} identity fetch failed: {err}");
                return login_failed(state, provider);
            }
        },
        Err(err) => {
            error!("{provider} code exchange failed: {err}");
            return login_failed(state, provider);
        }
    };

    match state.authenticate_oauth(provider, &identity).await {
        Ok(handle) => {
            info!(user_id = %handle.principal.user_id, "{provider} login succeeded");
            redirect_with_cookies(
                "/welcome",
                &[
                    session::session_cookie(&state.config, &handle.token),
                    session::clear_state_cookie(&state.config),
                ],
            )
        }
        Err(err) => {
            error!("{provider} login failed: {err}");
            server_error()
        }
    }
}

// axum handler starting Google sign-in
#[instrument(skip_all)]
pub async fn google_begin(Extension(state): Extension<Arc<AuthState>>) -> Response {
    begin(&state, Provider::Google).await
}

// axum handler for the Google callback
#[instrument(skip_all)]
pub async fn google_finish(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    finish(&state, Provider::Google, &headers, &params).await
}

// axum handler starting Facebook sign-in
#[instrument(skip_all)]
pub async fn facebook_begin(Extension(state): Extension<Arc<AuthState>>) -> Response {
    begin(&state, Provider::Facebook).await
}

// axum handler for the Facebook callback
#[instrument(skip_all)]
pub async fn facebook_finish(
    Extension(state): Extension<Arc<AuthState>>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    finish(&state, Provider::Facebook, &headers, &params).await
}
