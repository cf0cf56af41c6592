//! Authentication operations: login, registration, sessions, remember-me.

use anyhow::anyhow;
use thiserror::Error;
use uuid::Uuid;

use super::oauth::{OAuthError, Provider, ProviderIdentity};
use super::password::{hash_password, normalize_email, validate_registration, verify_password};
use super::state::AuthState;
use super::storage::{CreateUserOutcome, UserRecord};
use super::tokens::{generate_remember_token, generate_session_token, hash_token};

/// Attempts to find an unused session token before giving up. Collisions on
/// 32 random bytes are theoretical; the retry keeps the failure mode sane.
const TOKEN_RETRY_LIMIT: usize = 3;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("username is already registered")]
    DuplicateUsername,

    #[error("registration rejected")]
    Validation(Vec<String>),

    #[error("authentication required")]
    Unauthenticated,

    #[error("identity provider error: {0}")]
    Provider(#[from] OAuthError),

    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// The authenticated user as the rest of the app sees them.
#[derive(Debug, Clone)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub hobbies: Vec<String>,
}

impl Principal {
    fn from_record(record: UserRecord) -> Self {
        // OAuth users have a display name, local users an email; a user with
        // neither cannot exist (the schema requires a credential).
        let name = record
            .display_name
            .or(record.email)
            .unwrap_or_else(|| record.id.to_string());
        Self {
            user_id: record.id,
            name,
            hobbies: record.hobbies,
        }
    }
}

/// A freshly established session: the principal plus the raw token to set
/// in the browser cookie.
#[derive(Debug)]
pub struct SessionHandle {
    pub principal: Principal,
    pub token: String,
}

impl AuthState {
    async fn start_session(&self, record: UserRecord) -> Result<SessionHandle, AuthError> {
        for _ in 0..TOKEN_RETRY_LIMIT {
            let token = generate_session_token()?;
            let inserted = self
                .store
                .insert_session(
                    &hash_token(&token),
                    record.id,
                    self.config.session_ttl_seconds(),
                )
                .await?;
            if inserted {
                return Ok(SessionHandle {
                    principal: Principal::from_record(record),
                    token,
                });
            }
        }
        Err(AuthError::Store(anyhow!(
            "failed to allocate a unique session token"
        )))
    }

    /// Resolve a session cookie to its principal, if the session is live.
    pub async fn resolve_session(&self, token: &str) -> Result<Option<Principal>, AuthError> {
        let Some(user_id) = self.store.lookup_session(&hash_token(token)).await? else {
            return Ok(None);
        };
        // A session may outlive its user row; treat that as signed out.
        let record = self.store.find_user_by_id(user_id).await?;
        Ok(record.map(Principal::from_record))
    }

    /// Username/password login.
    ///
    /// Wrong username and wrong password produce the same error, so the
    /// response never confirms whether an account exists.
    pub async fn authenticate_local(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionHandle, AuthError> {
        let email = normalize_email(username);
        let record = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let verified = record
            .password_hash
            .as_deref()
            .is_some_and(|hash| verify_password(hash, password));
        if !verified {
            return Err(AuthError::InvalidCredentials);
        }

        self.start_session(record).await
    }

    /// Redeem a remember-me token for a new session.
    ///
    /// The token is consumed whether or not it resolves; a replay finds
    /// nothing to redeem.
    pub async fn authenticate_remember_me(&self, token: &str) -> Result<SessionHandle, AuthError> {
        let user_id = self
            .store
            .consume_remember_token(&hash_token(token))
            .await?
            .ok_or(AuthError::InvalidToken)?;
        let record = self
            .store
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::InvalidToken)?;
        self.start_session(record).await
    }

    /// Log in (creating the account on first sight) from a verified
    /// provider identity.
    pub async fn authenticate_oauth(
        &self,
        provider: Provider,
        identity: &ProviderIdentity,
    ) -> Result<SessionHandle, AuthError> {
        let record = self
            .store
            .find_or_create_oauth_user(
                provider,
                &identity.subject,
                identity.display_name.as_deref(),
            )
            .await?;
        self.start_session(record).await
    }

    /// Mint a remember-me token for an authenticated user and return the
    /// raw value for the cookie.
    pub async fn issue_remember_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let token = generate_remember_token()?;
        self.store
            .insert_remember_token(
                &hash_token(&token),
                user_id,
                self.config.remember_ttl_seconds(),
            )
            .await?;
        Ok(token)
    }

    /// Register a local account and log the new user in.
    pub async fn register(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SessionHandle, AuthError> {
        let email = normalize_email(username);
        let messages = validate_registration(&email, password);
        if !messages.is_empty() {
            return Err(AuthError::Validation(messages));
        }

        let password_hash = hash_password(password)?;
        match self.store.create_local_user(&email, &password_hash).await? {
            CreateUserOutcome::Created(record) => self.start_session(record).await,
            CreateUserOutcome::DuplicateEmail => Err(AuthError::DuplicateUsername),
        }
    }

    /// Tear down a session. Idempotent: logging out twice is not an error.
    pub async fn logout(&self, token: &str) -> Result<(), AuthError> {
        self.store.delete_session(&hash_token(token)).await?;
        Ok(())
    }

    /// Append one hobby to the user's list.
    pub async fn append_hobby(&self, user_id: Uuid, hobby: &str) -> Result<(), AuthError> {
        let appended = self.store.append_hobby(user_id, hobby).await?;
        if !appended {
            return Err(AuthError::Unauthenticated);
        }
        Ok(())
    }
}
