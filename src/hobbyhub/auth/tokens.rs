//! Opaque token generation and hashing.
//!
//! Raw tokens are only ever handed to the browser; the database stores a
//! SHA-256 hash and lookups go through the hash.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};

/// Create a new session token for the auth cookie.
pub(crate) fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate session token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Create a new remember-me token.
///
/// 48 random bytes encode to exactly 64 characters, the token length the
/// persistent-login cookie carries.
pub(crate) fn generate_remember_token() -> Result<String> {
    let mut bytes = [0u8; 48];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate remember-me token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Create the CSRF `state` value for an OAuth authorization round trip.
pub(crate) fn generate_state_token() -> Result<String> {
    let mut bytes = [0u8; 32];
    OsRng
        .try_fill_bytes(&mut bytes)
        .context("failed to generate state token")?;
    Ok(URL_SAFE_NO_PAD.encode(bytes))
}

/// Hash a token so raw values never touch the database.
pub(crate) fn hash_token(token: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher.finalize().to_vec()
}
