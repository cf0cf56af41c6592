//! OAuth 2.0 authorization-code clients for the supported providers.
//!
//! Only the server-side half of the flow lives here: building the consent
//! URL, exchanging the callback code for an access token, and fetching the
//! provider's identity (subject id + display name). CSRF `state` handling is
//! the caller's job; the handlers round-trip it through a short-lived cookie.

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use url::Url;

use crate::hobbyhub::APP_USER_AGENT;

const GOOGLE_AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

const FACEBOOK_AUTHORIZE_URL: &str = "https://www.facebook.com/v12.0/dialog/oauth";
const FACEBOOK_TOKEN_URL: &str = "https://graph.facebook.com/v12.0/oauth/access_token";
const FACEBOOK_USERINFO_URL: &str = "https://graph.facebook.com/v12.0/me";

/// External identity providers the app can delegate sign-in to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    Facebook,
}

impl Provider {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Facebook => "facebook",
        }
    }

    /// Route the provider redirects back to after consent.
    #[must_use]
    pub fn callback_path(self) -> &'static str {
        match self {
            Self::Google => "/auth/google/welcome",
            Self::Facebook => "/auth/facebook/welcome",
        }
    }

    fn authorize_url(self) -> &'static str {
        match self {
            Self::Google => GOOGLE_AUTHORIZE_URL,
            Self::Facebook => FACEBOOK_AUTHORIZE_URL,
        }
    }

    fn token_url(self) -> &'static str {
        match self {
            Self::Google => GOOGLE_TOKEN_URL,
            Self::Facebook => FACEBOOK_TOKEN_URL,
        }
    }

    fn userinfo_url(self) -> &'static str {
        match self {
            Self::Google => GOOGLE_USERINFO_URL,
            Self::Facebook => FACEBOOK_USERINFO_URL,
        }
    }

    fn default_scopes(self) -> Vec<String> {
        match self {
            Self::Google => vec![
                "openid".to_string(),
                "email".to_string(),
                "profile".to_string(),
            ],
            Self::Facebook => vec!["public_profile".to_string()],
        }
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during OAuth operations.
#[derive(Debug, thiserror::Error)]
pub enum OAuthError {
    /// The HTTP round trip to the provider failed (network error, timeout).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// The provider's response could not be parsed as expected.
    #[error("failed to parse response: {0}")]
    Parse(String),

    /// The provider rejected the request (invalid code, expired token, etc.).
    #[error("provider error: {0}")]
    Provider(String),
}

/// Credentials and settings for one provider.
#[derive(Debug, Clone)]
pub struct OAuthProviderConfig {
    pub client_id: String,
    pub client_secret: SecretString,
    pub redirect_uri: String,
    pub scopes: Vec<String>,
}

impl OAuthProviderConfig {
    #[must_use]
    pub fn new(
        provider: Provider,
        client_id: String,
        client_secret: SecretString,
        base_url: &str,
    ) -> Self {
        let base = base_url.trim_end_matches('/');
        Self {
            client_id,
            client_secret,
            redirect_uri: format!("{base}{}", provider.callback_path()),
            scopes: provider.default_scopes(),
        }
    }

    fn scopes_string(&self) -> String {
        self.scopes.join(" ")
    }
}

/// Verified identity assertion, normalized across providers.
#[derive(Debug, Clone)]
pub struct ProviderIdentity {
    /// The provider's stable unique user identifier.
    pub subject: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GoogleUserInfo {
    sub: String,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FacebookUserInfo {
    id: String,
    name: Option<String>,
}

/// OAuth client for one configured provider.
pub struct OAuthClient {
    provider: Provider,
    config: OAuthProviderConfig,
    http_client: reqwest::Client,
}

impl OAuthClient {
    pub fn new(provider: Provider, config: OAuthProviderConfig) -> Result<Self, OAuthError> {
        let http_client = reqwest::Client::builder()
            .user_agent(APP_USER_AGENT)
            .build()?;

        Ok(Self {
            provider,
            config,
            http_client,
        })
    }

    #[must_use]
    pub fn provider(&self) -> Provider {
        self.provider
    }

    /// Build the consent URL the user is redirected to.
    ///
    /// `state` must be an unguessable value stored browser-side and verified
    /// on the callback.
    #[must_use]
    pub fn authorization_url(&self, state: &str) -> String {
        // The authorize endpoints are compile-time constants; parsing them
        // cannot fail at runtime.
        let mut url = Url::parse(self.provider.authorize_url()).expect("invalid authorize URL");

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes_string())
            .append_pair("state", state);

        url.to_string()
    }

    /// Exchange the callback authorization code for an access token.
    #[tracing::instrument(skip(self, code), fields(provider = %self.provider))]
    pub async fn exchange_code(&self, code: &str) -> Result<SecretString, OAuthError> {
        tracing::debug!("exchanging authorization code for tokens");

        let request = match self.provider {
            // Google only accepts the exchange as a form POST.
            Provider::Google => self.http_client.post(self.provider.token_url()).form(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
                ("grant_type", "authorization_code"),
            ]),
            // The Graph API exchanges via GET with query parameters.
            Provider::Facebook => self.http_client.get(self.provider.token_url()).query(&[
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.expose_secret()),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ]),
        };

        let body = request.send().await?.text().await?;
        let value: serde_json::Value = serde_json::from_str(&body)
            .map_err(|err| OAuthError::Parse(format!("failed to parse token response: {err}")))?;

        if value.get("error").is_some() {
            return Err(OAuthError::Provider(provider_error_message(&value)));
        }

        value
            .get("access_token")
            .and_then(|token| token.as_str())
            .map(|token| SecretString::from(token.to_string()))
            .ok_or_else(|| OAuthError::Parse("token response missing access_token".to_string()))
    }

    /// Fetch the user's identity with a freshly exchanged access token.
    #[tracing::instrument(skip(self, access_token), fields(provider = %self.provider))]
    pub async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, OAuthError> {
        tracing::debug!("fetching provider user info");

        let request = match self.provider {
            Provider::Google => self
                .http_client
                .get(self.provider.userinfo_url())
                .bearer_auth(access_token),
            Provider::Facebook => self
                .http_client
                .get(self.provider.userinfo_url())
                .query(&[("fields", "id,name"), ("access_token", access_token)]),
        };

        let response = request.send().await?;
        if !response.status().is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OAuthError::Provider(format!(
                "failed to get user info: {body}"
            )));
        }

        match self.provider {
            Provider::Google => {
                let info: GoogleUserInfo = response.json().await.map_err(|err| {
                    OAuthError::Parse(format!("failed to parse user info response: {err}"))
                })?;
                Ok(ProviderIdentity {
                    subject: info.sub,
                    display_name: info.name,
                })
            }
            Provider::Facebook => {
                let info: FacebookUserInfo = response.json().await.map_err(|err| {
                    OAuthError::Parse(format!("failed to parse user info response: {err}"))
                })?;
                Ok(ProviderIdentity {
                    subject: info.id,
                    display_name: info.name,
                })
            }
        }
    }
}

fn provider_error_message(body: &serde_json::Value) -> String {
    // Google returns {"error": "...", "error_description": "..."}; the Graph
    // API nests {"error": {"message": "..."}}.
    body.get("error_description")
        .or_else(|| body.get("error").and_then(|error| error.get("message")))
        .or_else(|| body.get("error"))
        .and_then(|message| message.as_str())
        .map_or_else(|| body.to_string(), ToString::to_string)
}
