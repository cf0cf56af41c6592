//! In-memory [`AccountStore`] used by the authentication unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime};

use anyhow::Result;
use async_trait::async_trait;
use uuid::Uuid;

use super::oauth::Provider;
use super::storage::{AccountStore, CreateUserOutcome, UserRecord};

#[derive(Debug, Clone)]
struct StoredUser {
    id: Uuid,
    email: Option<String>,
    password_hash: Option<String>,
    google_id: Option<String>,
    facebook_id: Option<String>,
    display_name: Option<String>,
    hobbies: Vec<String>,
}

impl StoredUser {
    fn to_record(&self) -> UserRecord {
        UserRecord {
            id: self.id,
            email: self.email.clone(),
            password_hash: self.password_hash.clone(),
            display_name: self.display_name.clone(),
            hobbies: self.hobbies.clone(),
        }
    }
}

#[derive(Debug, Clone)]
struct StoredToken {
    user_id: Uuid,
    expires_at: SystemTime,
}

#[derive(Default)]
pub struct MemoryAccountStore {
    users: Mutex<Vec<StoredUser>>,
    sessions: Mutex<HashMap<Vec<u8>, StoredToken>>,
    remember_tokens: Mutex<HashMap<Vec<u8>, StoredToken>>,
}

fn expires(ttl_seconds: i64) -> SystemTime {
    SystemTime::now() + Duration::from_secs(ttl_seconds.max(0) as u64)
}

fn live(token: &StoredToken) -> bool {
    token.expires_at > SystemTime::now()
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn find_user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|user| user.email.as_deref() == Some(email))
            .map(StoredUser::to_record))
    }

    async fn find_user_by_id(&self, id: Uuid) -> Result<Option<UserRecord>> {
        let users = self.users.lock().unwrap();
        Ok(users
            .iter()
            .find(|user| user.id == id)
            .map(StoredUser::to_record))
    }

    async fn create_local_user(
        &self,
        email: &str,
        password_hash: &str,
    ) -> Result<CreateUserOutcome> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|user| user.email.as_deref() == Some(email)) {
            return Ok(CreateUserOutcome::DuplicateEmail);
        }
        let user = StoredUser {
            id: Uuid::new_v4(),
            email: Some(email.to_string()),
            password_hash: Some(password_hash.to_string()),
            google_id: None,
            facebook_id: None,
            display_name: None,
            hobbies: Vec::new(),
        };
        let record = user.to_record();
        users.push(user);
        Ok(CreateUserOutcome::Created(record))
    }

    async fn find_or_create_oauth_user(
        &self,
        provider: Provider,
        subject: &str,
        display_name: Option<&str>,
    ) -> Result<UserRecord> {
        let mut users = self.users.lock().unwrap();
        let existing = users.iter_mut().find(|user| {
            let id = match provider {
                Provider::Google => user.google_id.as_deref(),
                Provider::Facebook => user.facebook_id.as_deref(),
            };
            id == Some(subject)
        });
        if let Some(user) = existing {
            if let Some(name) = display_name {
                user.display_name = Some(name.to_string());
            }
            return Ok(user.to_record());
        }
        let mut user = StoredUser {
            id: Uuid::new_v4(),
            email: None,
            password_hash: None,
            google_id: None,
            facebook_id: None,
            display_name: display_name.map(ToString::to_string),
            hobbies: Vec::new(),
        };
        match provider {
            Provider::Google => user.google_id = Some(subject.to_string()),
            Provider::Facebook => user.facebook_id = Some(subject.to_string()),
        }
        let record = user.to_record();
        users.push(user);
        Ok(record)
    }

    async fn append_hobby(&self, user_id: Uuid, hobby: &str) -> Result<bool> {
        let mut users = self.users.lock().unwrap();
        let Some(user) = users.iter_mut().find(|user| user.id == user_id) else {
            return Ok(false);
        };
        user.hobbies.push(hobby.to_string());
        Ok(true)
    }

    async fn insert_session(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        if sessions.contains_key(token_hash) {
            return Ok(false);
        }
        sessions.insert(
            token_hash.to_vec(),
            StoredToken {
                user_id,
                expires_at: expires(ttl_seconds),
            },
        );
        Ok(true)
    }

    async fn lookup_session(&self, token_hash: &[u8]) -> Result<Option<Uuid>> {
        let sessions = self.sessions.lock().unwrap();
        Ok(sessions
            .get(token_hash)
            .filter(|token| live(token))
            .map(|token| token.user_id))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> Result<()> {
        self.sessions.lock().unwrap().remove(token_hash);
        Ok(())
    }

    async fn insert_remember_token(
        &self,
        token_hash: &[u8],
        user_id: Uuid,
        ttl_seconds: i64,
    ) -> Result<()> {
        self.remember_tokens.lock().unwrap().insert(
            token_hash.to_vec(),
            StoredToken {
                user_id,
                expires_at: expires(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn consume_remember_token(&self, token_hash: &[u8]) -> Result<Option<Uuid>> {
        let mut tokens = self.remember_tokens.lock().unwrap();
        Ok(tokens
            .remove(token_hash)
            .filter(|token| live(token))
            .map(|token| token.user_id))
    }
}
