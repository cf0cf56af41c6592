//! Authentication core: strategies, sessions, and the credential store seam.

pub mod flash;
pub mod oauth;
pub mod password;
pub mod service;
pub mod session;
pub mod state;
pub mod storage;
pub mod tokens;

#[cfg(test)]
mod memory;
#[cfg(test)]
mod tests;

pub use self::oauth::{OAuthClient, OAuthProviderConfig, Provider};
pub use self::service::{AuthError, Principal, SessionHandle};
pub use self::state::{AuthConfig, AuthState};
