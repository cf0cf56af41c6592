use crate::cli::actions::Action;
use anyhow::Result;
use secrecy::SecretString;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let secret = |name: &str| -> Option<SecretString> {
        matches
            .get_one::<String>(name)
            .map(|s| SecretString::from(s.clone()))
    };

    Ok(Action::Server {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        dsn: matches
            .get_one("dsn")
            .map(|s: &String| s.to_string())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --dsn"))?,
        base_url: matches
            .get_one("base-url")
            .map_or_else(|| "http://localhost:8080".to_string(), |s: &String| s.to_string()),
        google_client_id: matches
            .get_one::<String>("google-client-id")
            .map(String::to_string),
        google_client_secret: secret("google-client-secret"),
        facebook_client_id: matches
            .get_one::<String>("facebook-client-id")
            .map(String::to_string),
        facebook_client_secret: secret("facebook-client-secret"),
    })
}
