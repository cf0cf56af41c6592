//! Runtime configuration and shared state for the authentication layer.

use std::sync::Arc;

use super::oauth::{OAuthClient, Provider};
use super::storage::AccountStore;

/// Sessions last half a day; a restart or expiry falls back to remember-me.
pub const DEFAULT_SESSION_TTL_SECONDS: i64 = 12 * 60 * 60;

/// Remember-me tokens last a week.
pub const DEFAULT_REMEMBER_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Settings that shape cookies and token lifetimes.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    base_url: String,
    session_ttl_seconds: i64,
    remember_ttl_seconds: i64,
}

impl AuthConfig {
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            remember_ttl_seconds: DEFAULT_REMEMBER_TTL_SECONDS,
        }
    }

    #[must_use]
    pub const fn with_session_ttl(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub const fn with_remember_ttl(mut self, seconds: i64) -> Self {
        self.remember_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub const fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub const fn remember_ttl_seconds(&self) -> i64 {
        self.remember_ttl_seconds
    }

    /// Cookies are marked `Secure` only when the site is served over TLS,
    /// so local plain-http development still works.
    #[must_use]
    pub fn cookies_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

/// Shared state handed to every request handler.
pub struct AuthState {
    pub config: AuthConfig,
    pub store: Arc<dyn AccountStore>,
    google: Option<OAuthClient>,
    facebook: Option<OAuthClient>,
}

impl AuthState {
    #[must_use]
    pub fn new(
        config: AuthConfig,
        store: Arc<dyn AccountStore>,
        google: Option<OAuthClient>,
        facebook: Option<OAuthClient>,
    ) -> Self {
        Self {
            config,
            store,
            google,
            facebook,
        }
    }

    /// The configured client for a provider, or None when the deployment
    /// runs without that provider's credentials.
    #[must_use]
    pub fn oauth_client(&self, provider: Provider) -> Option<&OAuthClient> {
        match provider {
            Provider::Google => self.google.as_ref(),
            Provider::Facebook => self.facebook.as_ref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults() {
        let config = AuthConfig::new("http://localhost:8080");
        assert_eq!(config.base_url(), "http://localhost:8080");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert_eq!(config.remember_ttl_seconds(), DEFAULT_REMEMBER_TTL_SECONDS);
        assert!(!config.cookies_secure());
    }

    #[test]
    fn config_strips_trailing_slash() {
        let config = AuthConfig::new("https://hobbyhub.example.com/");
        assert_eq!(config.base_url(), "https://hobbyhub.example.com");
        assert!(config.cookies_secure());
    }

    #[test]
    fn config_overrides_ttls() {
        let config = AuthConfig::new("http://localhost:8080")
            .with_session_ttl(60)
            .with_remember_ttl(120);
        assert_eq!(config.session_ttl_seconds(), 60);
        assert_eq!(config.remember_ttl_seconds(), 120);
    }
}
