//! Credential, session, and remember-me token persistence.
//!
//! The authentication core talks to an [`AccountStore`] so its contract can
//! be exercised without a database; [`PgAccountStore`] is the Postgres
//! implementation used by the server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::Instrument;
use uuid::Uuid;

use super::oauth::Provider;

/// A stored user, re-fetched on every request that needs one.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub display_name: Option<String>,
    pub hobbies: Vec<String>,
}

/// Outcome when attempting to create a local-credential user.
#[derive(Debug)]
pub enum CreateUserOutcome {
    Created(UserRecord),
    DuplicateEmail,
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>>;

    async fn create_local_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<CreateUserOutcome>;

    /// Find-or-create keyed by `(provider, subject)`; idempotent.
    async fn find_or_create_oauth_user(
        &self,
        provider: Provider,
        subject: &str,
        display_name: Option<&str>,
    ) -> Result<UserRecord>;

    /// Append one hobby; returns false when the user does not exist.
    async fn append_hobby(&self, user_id: Uuid, hobby: &str) -> Result<bool>;

    /// Returns false on a token-hash collision so the caller can retry with
    /// a fresh token.
    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<bool>;

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<Uuid>>;

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()>;

    async fn insert_remember_token(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<()>;

    /// Atomically remove an unexpired token, returning its owner. A consumed
    /// token can never establish a second session.
    async fn consume_remember_token(&self, token_hash: &[u8]) -> Result<Option<Uuid>>;
}

pub(crate) fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

const USER_COLUMNS: &str = "id, email, password_hash, display_name, hobbies";

fn row_to_user(row: &sqlx::postgres::PgRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        display_name: row.get("display_name"),
        hobbies: row.get("hobbies"),
    }
}

/// Postgres-backed [`AccountStore`].
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by email")?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup user by id")?;

        Ok(row.as_ref().map(row_to_user))
    }

    async fn create_local_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<CreateUserOutcome> {
        let query = format!(
            "INSERT INTO users (email, password_hash) VALUES ($1, $2) RETURNING {USER_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(email)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .instrument(span)
            .await;

        match row {
            Ok(row) => Ok(CreateUserOutcome::Created(row_to_user(&row))),
            Err(err) if is_unique_violation(&err) => Ok(CreateUserOutcome::DuplicateEmail),
            Err(err) => Err(err).context("failed to insert user"),
        }
    }

    async fn find_or_create_oauth_user(
        &self,
        provider: Provider,
        subject: &str,
        display_name: Option<&str>,
    ) -> Result<UserRecord> {
        let column = match provider {
            Provider::Google => "google_id",
            Provider::Facebook => "facebook_id",
        };
        // Upsert keyed on the provider subject; first login creates the user,
        // later logins refresh the display name only.
        let query = format!(
            "INSERT INTO users ({column}, display_name) VALUES ($1, $2) \
             ON CONFLICT ({column}) DO UPDATE \
             SET display_name = COALESCE(EXCLUDED.display_name, users.display_name) \
             RETURNING {USER_COLUMNS}"
        );
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query.as_str()
        );
        let row = sqlx::query(&query)
            .bind(subject)
            .bind(display_name)
            .fetch_one(&self.pool)
            .instrument(span)
            .await
            .context("failed to find-or-create oauth user")?;

        Ok(row_to_user(&row))
    }

    async fn append_hobby(&self, user_id: Uuid, hobby: &str) -> Result<bool> {
        // Single-statement append keeps the write atomic; concurrent appends
        // interleave but never clobber the array wholesale.
        let query = "UPDATE users SET hobbies = array_append(hobbies, $2) WHERE id = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(user_id)
            .bind(hobby)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to append hobby")?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<bool> {
        let query = r"
            INSERT INTO user_sessions (session_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        let result = sqlx::query(query)
            .bind(token_hash)
            .bind(user_id)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await;

        match result {
            Ok(_) => Ok(true),
            Err(err) if is_unique_violation(&err) => Ok(false),
            Err(err) => Err(err).context("failed to insert session"),
        }
    }

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<Uuid>> {
        let query = r"
            SELECT user_id
            FROM user_sessions
            WHERE session_hash = $1
              AND expires_at > NOW()
            LIMIT 1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "SELECT",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to lookup session")?;

        let Some(row) = row else {
            return Ok(None);
        };

        // Record activity for audit/visibility without extending the session TTL.
        let query = r"
            UPDATE user_sessions
            SET last_seen_at = NOW()
            WHERE session_hash = $1
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "UPDATE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to update session last_seen_at")?;

        Ok(Some(row.get("user_id")))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()> {
        // Logout is idempotent; it's fine if no rows are deleted.
        let query = "DELETE FROM user_sessions WHERE session_hash = $1";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_hash)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to delete session")?;
        Ok(())
    }

    async fn insert_remember_token(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<()> {
        let query = r"
            INSERT INTO remember_tokens (token_hash, user_id, expires_at)
            VALUES ($1, $2, NOW() + ($3 * INTERVAL '1 second'))
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "INSERT",
            db.statement = query
        );
        sqlx::query(query)
            .bind(token_hash)
            .bind(user_id)
            .bind(ttl_seconds)
            .execute(&self.pool)
            .instrument(span)
            .await
            .context("failed to insert remember-me token")?;
        Ok(())
    }

    async fn consume_remember_token(&self, token_hash: &[u8]) -> Result<Option<Uuid>> {
        // The delete is the consume; a replayed token finds no row.
        let query = r"
            DELETE FROM remember_tokens
            WHERE token_hash = $1
              AND expires_at > NOW()
            RETURNING user_id
        ";
        let span = tracing::info_span!(
            "db.query",
            db.system = "postgresql",
            db.operation = "DELETE",
            db.statement = query
        );
        let row = sqlx::query(query)
            .bind(token_hash)
            .fetch_optional(&self.pool)
            .instrument(span)
            .await
            .context("failed to consume remember-me token")?;

        Ok(row.map(|row| row.get("user_id")))
    }
}
