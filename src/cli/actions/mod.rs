pub mod server;

use secrecy::SecretString;

#[derive(Debug)]
pub enum Action {
    Server {
        port: u16,
        dsn: String,
        base_url: String,
        google_client_id: Option<String>,
        google_client_secret: Option<SecretString>,
        facebook_client_id: Option<String>,
        facebook_client_secret: Option<SecretString>,
    },
}
