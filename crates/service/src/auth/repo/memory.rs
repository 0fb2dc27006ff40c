use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use configs::SeedUser;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::auth::domain::{NewUser, User};
use crate::auth::errors::{StoreError, UniqueField};
use crate::auth::repository::UserStore;

/// SHA-256 of `1234567`, the password of every demo user.
pub const DEMO_PASSWORD_DIGEST: &str =
    "8bb0cf6eb9b17d0f7d22b456f121257dc1254e1f01665370476383ea776df414";

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, User>,
    // username/email -> id
    by_username: HashMap<String, String>,
    by_email: HashMap<String, String>,
}

impl Inner {
    // Email is checked first so a dual conflict always reports the email.
    fn check_unique(&self, username: &str, email: &str) -> Result<(), StoreError> {
        if self.by_email.contains_key(email) {
            return Err(StoreError::UniquenessViolation { field: UniqueField::Email });
        }
        if self.by_username.contains_key(username) {
            return Err(StoreError::UniquenessViolation { field: UniqueField::Username });
        }
        Ok(())
    }

    fn insert(&mut self, user: User) {
        self.by_username.insert(user.username.clone(), user.id.clone());
        self.by_email.insert(user.email.clone(), user.id.clone());
        self.by_id.insert(user.id.clone(), user);
    }

    fn lookup(&self, index: &HashMap<String, String>, key: &str) -> Option<User> {
        index.get(key).and_then(|id| self.by_id.get(id)).cloned()
    }
}

/// Reference store keeping every user in process memory.
///
/// One `RwLock` guards the whole map, so the uniqueness check and the insert
/// in `store` form a single critical section.
#[derive(Default)]
pub struct InMemoryUserStore {
    inner: RwLock<Inner>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload records as-is (ids included). Fails on duplicate username/email,
    /// an empty id or an empty digest.
    pub fn with_users(users: Vec<User>) -> Result<Self, StoreError> {
        let mut inner = Inner::default();
        for user in users {
            if user.id.is_empty() {
                return Err(StoreError::InvalidState(format!("seed user {} has an empty id", user.username)));
            }
            if user.password_digest.is_empty() {
                return Err(StoreError::InvalidState(format!(
                    "seed user {} has an empty password digest",
                    user.username
                )));
            }
            inner.check_unique(&user.username, &user.email)?;
            if inner.by_id.contains_key(&user.id) {
                return Err(StoreError::InvalidState(format!("duplicate seed id {}", user.id)));
            }
            inner.insert(user);
        }
        Ok(Self { inner: RwLock::new(inner) })
    }

    /// Store preloaded with the demo users `jack`, `john` and `jill`.
    pub fn seeded() -> Self {
        let mut inner = Inner::default();
        for user in demo_users() {
            inner.insert(user);
        }
        Self { inner: RwLock::new(inner) }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.lookup(&inner.by_username, username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.lookup(&inner.by_email, email))
    }

    async fn store(&self, candidate: NewUser) -> Result<User, StoreError> {
        if let Some(id) = candidate.id.as_deref() {
            if Uuid::parse_str(id).is_ok() {
                return Err(StoreError::InvalidState(format!(
                    "can't store a user that already has an id ({id})"
                )));
            }
        }
        if candidate.password_digest.is_empty() {
            return Err(StoreError::InvalidState("password digest is empty".into()));
        }

        let mut inner = self.inner.write().await;
        inner.check_unique(&candidate.username, &candidate.email)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            username: candidate.username,
            email: candidate.email,
            password_digest: candidate.password_digest,
            created_at: now,
            updated_at: now,
        };
        inner.insert(user.clone());
        debug!(user_id = %user.id, "user stored");
        Ok(user)
    }
}

/// Convert a configured seed entry, assigning an id when none is given.
pub fn seed_user(seed: &SeedUser) -> User {
    let now = Utc::now();
    User {
        id: seed.id.clone().unwrap_or_else(|| Uuid::new_v4().to_string()),
        username: seed.username.clone(),
        email: seed.email.clone(),
        password_digest: seed.password_digest.clone(),
        created_at: now,
        updated_at: now,
    }
}

pub fn demo_users() -> Vec<User> {
    [
        ("54215f2a-b752-11eb-8529-0242ac130003", "jack"),
        ("5a823a9c-b752-11eb-8529-0242ac130003", "john"),
        ("601427c2-b752-11eb-8529-0242ac130003", "jill"),
    ]
    .into_iter()
    .map(|(id, name)| {
        seed_user(&SeedUser {
            id: Some(id.to_string()),
            username: name.to_string(),
            email: format!("{name}@gmail.com"),
            password_digest: DEMO_PASSWORD_DIGEST.to_string(),
        })
    })
    .collect()
}
