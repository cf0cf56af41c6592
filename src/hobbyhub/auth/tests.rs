//! Behavioral tests for the authentication operations, run against the
//! in-memory store.

use std::sync::Arc;

use super::memory::MemoryAccountStore;
use super::oauth::{Provider, ProviderIdentity};
use super::service::AuthError;
use super::state::{AuthConfig, AuthState};

fn state() -> AuthState {
    AuthState::new(
        AuthConfig::new("http://localhost:8080"),
        Arc::new(MemoryAccountStore::default()),
        None,
        None,
    )
}

#[tokio::test]
async fn register_logs_the_user_in() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();
    assert_eq!(session.principal.name, "alice@example.com");

    let principal = state.resolve_session(&session.token).await.unwrap();
    assert_eq!(
        principal.map(|p| p.user_id),
        Some(session.principal.user_id)
    );
}

#[tokio::test]
async fn register_normalizes_the_username() {
    let state = state();
    let session = state
        .register("  Alice@Example.COM ", "Abcdefg1")
        .await
        .unwrap();
    assert_eq!(session.principal.name, "alice@example.com");

    // Login with a differently-cased spelling reaches the same account.
    let again = state
        .authenticate_local("ALICE@example.com", "Abcdefg1")
        .await
        .unwrap();
    assert_eq!(again.principal.user_id, session.principal.user_id);
}

#[tokio::test]
async fn weak_password_lists_every_violation() {
    let state = state();
    let err = state.register("alice@example.com", "ab").await.unwrap_err();
    let AuthError::Validation(messages) = err else {
        panic!("expected validation failure, got {err:?}");
    };
    assert!(messages.iter().any(|m| m.contains('8')));
    assert!(messages.iter().any(|m| m.contains("number")));
    assert!(messages.iter().any(|m| m.contains("uppercase")));
}

#[tokio::test]
async fn duplicate_registration_preserves_the_first_account() {
    let state = state();
    let first = state.register("alice@example.com", "Abcdefg1").await.unwrap();

    let err = state
        .register("alice@example.com", "Different9X")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::DuplicateUsername));

    // The original credential still works.
    let session = state
        .authenticate_local("alice@example.com", "Abcdefg1")
        .await
        .unwrap();
    assert_eq!(session.principal.user_id, first.principal.user_id);
}

#[tokio::test]
async fn login_rejects_wrong_password() {
    let state = state();
    state.register("alice@example.com", "Abcdefg1").await.unwrap();

    let err = state
        .authenticate_local("alice@example.com", "Wrongpass1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn login_rejects_unknown_username_with_the_same_error() {
    let state = state();
    let err = state
        .authenticate_local("nobody@example.com", "Abcdefg1")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();

    state.logout(&session.token).await.unwrap();
    assert!(state
        .resolve_session(&session.token)
        .await
        .unwrap()
        .is_none());

    // Logging out again is a no-op.
    state.logout(&session.token).await.unwrap();
}

#[tokio::test]
async fn resolve_rejects_unknown_token() {
    let state = state();
    assert!(state
        .resolve_session("made-up-token")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn oauth_login_is_idempotent_per_subject() {
    let state = state();
    let identity = ProviderIdentity {
        subject: "google-sub-1".to_string(),
        display_name: Some("Alice".to_string()),
    };

    let first = state
        .authenticate_oauth(Provider::Google, &identity)
        .await
        .unwrap();
    let second = state
        .authenticate_oauth(Provider::Google, &identity)
        .await
        .unwrap();

    assert_eq!(first.principal.user_id, second.principal.user_id);
    assert_eq!(second.principal.name, "Alice");
}

#[tokio::test]
async fn oauth_subjects_are_scoped_per_provider() {
    let state = state();
    let identity = ProviderIdentity {
        subject: "sub-1".to_string(),
        display_name: None,
    };

    let google = state
        .authenticate_oauth(Provider::Google, &identity)
        .await
        .unwrap();
    let facebook = state
        .authenticate_oauth(Provider::Facebook, &identity)
        .await
        .unwrap();

    assert_ne!(google.principal.user_id, facebook.principal.user_id);
}

#[tokio::test]
async fn remember_token_round_trip() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();

    let token = state
        .issue_remember_token(session.principal.user_id)
        .await
        .unwrap();
    assert_eq!(token.len(), 64);

    let restored = state.authenticate_remember_me(&token).await.unwrap();
    assert_eq!(restored.principal.user_id, session.principal.user_id);
}

#[tokio::test]
async fn remember_token_is_single_use() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();
    let token = state
        .issue_remember_token(session.principal.user_id)
        .await
        .unwrap();

    state.authenticate_remember_me(&token).await.unwrap();
    let err = state.authenticate_remember_me(&token).await.unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn remember_rejects_unknown_token() {
    let state = state();
    let err = state
        .authenticate_remember_me("made-up-token")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn hobbies_append_in_order() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();
    let user_id = session.principal.user_id;

    state.append_hobby(user_id, "reading").await.unwrap();
    state.append_hobby(user_id, "chess").await.unwrap();

    let principal = state.resolve_session(&session.token).await.unwrap().unwrap();
    assert_eq!(
        principal.hobbies,
        vec!["reading".to_string(), "chess".to_string()]
    );
}

#[tokio::test]
async fn hobbies_are_stored_exactly_as_submitted() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();
    let user_id = session.principal.user_id;

    // No trimming, no dedup, no rejection of odd input.
    state.append_hobby(user_id, " chess ").await.unwrap();
    state.append_hobby(user_id, "").await.unwrap();
    state.append_hobby(user_id, " chess ").await.unwrap();

    let principal = state.resolve_session(&session.token).await.unwrap().unwrap();
    assert_eq!(
        principal.hobbies,
        vec![" chess ".to_string(), String::new(), " chess ".to_string()]
    );
}

#[tokio::test]
async fn first_hobby_lands_in_an_empty_list() {
    let state = state();
    let session = state.register("alice@example.com", "Abcdefg1").await.unwrap();
    assert!(session.principal.hobbies.is_empty());

    state
        .append_hobby(session.principal.user_id, "gardening")
        .await
        .unwrap();
    let principal = state.resolve_session(&session.token).await.unwrap().unwrap();
    assert_eq!(principal.hobbies, vec!["gardening".to_string()]);
}

#[tokio::test]
async fn hobby_append_for_unknown_user_fails() {
    let state = state();
    let err = state
        .append_hobby(uuid::Uuid::new_v4(), "reading")
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Unauthenticated));
}
