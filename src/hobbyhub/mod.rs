pub mod auth;
pub mod handlers;
pub mod views;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum::{
    body::Body,
    http::{HeaderName, HeaderValue, Request},
    routing::get,
    Extension, Router,
};
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{debug_span, info, Span};
use ulid::Ulid;

use self::auth::{
    oauth::{OAuthClient, OAuthProviderConfig, Provider},
    storage::PgAccountStore,
    AuthConfig, AuthState,
};

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

/// router
/// # Errors
/// Returns an error if the server fails to start
pub async fn new(
    port: u16,
    dsn: String,
    config: AuthConfig,
    google: Option<OAuthProviderConfig>,
    facebook: Option<OAuthProviderConfig>,
) -> Result<()> {
    // Connect to database
    let pool = PgPoolOptions::new()
        .min_connections(1)
        .max_connections(5)
        .max_lifetime(Duration::from_secs(60 * 2))
        .test_before_acquire(true)
        .connect(&dsn)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    let google = google
        .map(|provider| OAuthClient::new(Provider::Google, provider))
        .transpose()
        .context("Failed to build Google OAuth client")?;
    let facebook = facebook
        .map(|provider| OAuthClient::new(Provider::Facebook, provider))
        .transpose()
        .context("Failed to build Facebook OAuth client")?;

    let state = Arc::new(AuthState::new(
        config,
        Arc::new(PgAccountStore::new(pool)),
        google,
        facebook,
    ));

    let app = router(state);

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}", port);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            info!("Gracefully shutdown");
        })
        .await?;

    Ok(())
}

fn router(state: Arc<AuthState>) -> Router {
    Router::new()
        .route("/", get(handlers::pages::home))
        .route(
            "/login",
            get(handlers::pages::login_form).post(handlers::user_login::login),
        )
        .route(
            "/register",
            get(handlers::pages::register_form).post(handlers::user_register::register),
        )
        .route("/logout", get(handlers::user_login::logout))
        .route("/welcome", get(handlers::hobbies::welcome))
        .route(
            "/submit",
            get(handlers::pages::submit_form).post(handlers::hobbies::submit),
        )
        .route("/auth/google", get(handlers::oauth::google_begin))
        .route("/auth/google/welcome", get(handlers::oauth::google_finish))
        .route("/auth/facebook", get(handlers::oauth::facebook_begin))
        .route(
            "/auth/facebook/welcome",
            get(handlers::oauth::facebook_finish),
        )
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state.clone())),
        )
        .route("/health", get(handlers::health).options(handlers::health))
        .layer(Extension(state))
}

// span
fn make_span(request: &Request<Body>) -> Span {
    let headers = request.headers();
    let path = request.uri().path();
    let request_id = headers
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");

    debug_span!("http-request", path, request_id)
}
