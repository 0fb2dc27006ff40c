use async_trait::async_trait;

use super::domain::{NewUser, User};
use super::errors::StoreError;

/// Persistence capability the auth service depends on.
///
/// Implementations own their synchronization: `store` must check uniqueness
/// and write as one atomic step, and readers must never observe a partially
/// written record.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persist a candidate and return it with its assigned id and timestamps.
    ///
    /// Fails with `UniquenessViolation` when the username or email is already
    /// present, and with `InvalidState` when the candidate carries a
    /// well-formed id or an empty digest.
    async fn store(&self, candidate: NewUser) -> Result<User, StoreError>;
}
