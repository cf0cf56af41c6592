use crate::cli::actions::Action;
use crate::hobbyhub::{
    self,
    auth::{
        oauth::{OAuthProviderConfig, Provider},
        AuthConfig,
    },
};
use anyhow::Result;
use secrecy::SecretString;

/// Handle the server action
pub async fn handle(action: Action) -> Result<()> {
    match action {
        Action::Server {
            port,
            dsn,
            base_url,
            google_client_id,
            google_client_secret,
            facebook_client_id,
            facebook_client_secret,
        } => {
            let config = AuthConfig::new(&base_url);

            let google = provider_config(
                Provider::Google,
                &base_url,
                google_client_id,
                google_client_secret,
            );
            let facebook = provider_config(
                Provider::Facebook,
                &base_url,
                facebook_client_id,
                facebook_client_secret,
            );

            hobbyhub::new(port, dsn, config, google, facebook).await?;
        }
    }

    Ok(())
}

fn provider_config(
    provider: Provider,
    base_url: &str,
    client_id: Option<String>,
    client_secret: Option<SecretString>,
) -> Option<OAuthProviderConfig> {
    match (client_id, client_secret) {
        (Some(id), Some(secret)) => Some(OAuthProviderConfig::new(provider, id, secret, base_url)),
        _ => None,
    }
}
