//! Password hashing and the registration validation policy.

use anyhow::{anyhow, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use regex::Regex;

/// Normalize a username for lookup/uniqueness checks.
pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Basic email format check on already-normalized input.
pub(crate) fn valid_email(email_normalized: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email_normalized))
}

/// Check a registration attempt against the account policy.
///
/// Returns the ordered list of human-readable messages for every violated
/// rule; an empty list means the attempt passes.
pub(crate) fn validate_registration(email_normalized: &str, password: &str) -> Vec<String> {
    let mut messages = Vec::new();

    if !valid_email(email_normalized) {
        messages.push("Username must be a valid email address".to_string());
    }
    if password.chars().count() < 8 {
        messages.push("Password must be at least 8 characters long".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        messages.push("Password must contain at least one number".to_string());
    }
    if !password.chars().any(char::is_uppercase) {
        messages.push("Password must contain at least one uppercase letter".to_string());
    }

    messages
}

/// Hash a password with a per-user random salt (argon2id, PHC string output).
pub(crate) fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| anyhow!("failed to hash password: {err}"))
}

/// Verify a password against a stored PHC hash string.
///
/// An unparseable stored hash counts as a failed verification, not an error;
/// callers only need to know whether the credential matches.
pub(crate) fn verify_password(stored_hash: &str, password: &str) -> bool {
    PasswordHash::new(stored_hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_email_trims_and_lowercases() {
        assert_eq!(normalize_email(" Alice@Example.COM "), "alice@example.com");
    }

    #[test]
    fn valid_email_accepts_basic_format() {
        assert!(valid_email("a@example.com"));
        assert!(valid_email("name.surname@example.co"));
    }

    #[test]
    fn valid_email_rejects_missing_parts() {
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("missing-at.example.com"));
        assert!(!valid_email("missing-domain@"));
    }

    #[test]
    fn short_password_mentions_minimum_length() {
        let messages = validate_registration("a@example.com", "Ab1");
        assert!(messages.iter().any(|m| m.contains('8')));
    }

    #[test]
    fn digitless_password_mentions_number() {
        let messages = validate_registration("a@example.com", "Abcdefgh");
        assert!(messages.iter().any(|m| m.contains("number")));
    }

    #[test]
    fn lowercase_password_mentions_uppercase() {
        let messages = validate_registration("a@example.com", "abcdefg1");
        assert!(messages.iter().any(|m| m.contains("uppercase")));
    }

    #[test]
    fn invalid_username_mentions_email() {
        let messages = validate_registration("not-an-email", "Abcdefg1");
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("email"));
    }

    #[test]
    fn conforming_attempt_passes() {
        assert!(validate_registration("a@example.com", "Abcdefg1").is_empty());
    }

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("Sup3rSecret").unwrap();
        assert!(verify_password(&hash, "Sup3rSecret"));
        assert!(!verify_password(&hash, "Sup3rSecret!"));
    }

    #[test]
    fn verify_rejects_garbage_hash() {
        assert!(!verify_password("not-a-phc-string", "whatever"));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("Sup3rSecret").unwrap();
        let second = hash_password("Sup3rSecret").unwrap();
        assert_ne!(first, second);
    }
}
